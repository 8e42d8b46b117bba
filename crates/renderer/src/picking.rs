//! Hit-testing spheres under a window point.
//!
//! Two implementations share the [`Picker`] trait: [`GpuPicker`] rasterizes
//! each target into its own texel of a one-row target through a pick matrix
//! and reads the row back, [`AnalyticPicker`] casts a ray on the CPU. Both
//! report every target covering the point, occluded or not.

use glam::{Mat4, Vec2, Vec3};

use crate::mesh::Mesh;
use crate::pipeline::{create_camera_bind_group_layout, create_pick_pipeline};
use crate::vertex::{InstanceData, Material};

/// Most targets one GPU pick can report.
pub const MAX_PICK_TARGETS: usize = 64;
/// Readback rows are padded to the copy alignment.
const PICK_ROW_BYTES: u32 = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;

/// A sphere that can be hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickTarget {
    pub id: usize,
    pub center: Vec3,
    pub radius: f32,
}

pub trait Picker {
    /// Ids of every target covering `point` (window pixels, origin top-left).
    fn pick(&mut self, view_proj: Mat4, viewport: Vec2, point: Vec2, targets: &[PickTarget]) -> Vec<usize>;
}

/// Window pixel to normalized device coordinates.
pub fn window_to_ndc(point: Vec2, viewport: Vec2) -> Vec2 {
    Vec2::new(
        2.0 * point.x / viewport.x.max(1.0) - 1.0,
        1.0 - 2.0 * point.y / viewport.y.max(1.0),
    )
}

/// Clip-space transform that blows a 1x1 pixel region around `point` up to
/// the whole viewport. Premultiply onto the view-projection matrix.
pub fn pick_matrix(point: Vec2, viewport: Vec2) -> Mat4 {
    let ndc = window_to_ndc(point, viewport);
    Mat4::from_scale(Vec3::new(viewport.x, viewport.y, 1.0)) * Mat4::from_translation(ndc.extend(0.0) * -1.0)
}

/// CPU ray cast against bounding spheres.
#[derive(Debug, Default, Clone, Copy)]
pub struct AnalyticPicker;

impl Picker for AnalyticPicker {
    fn pick(&mut self, view_proj: Mat4, viewport: Vec2, point: Vec2, targets: &[PickTarget]) -> Vec<usize> {
        let ndc = window_to_ndc(point, viewport);
        let inverse = view_proj.inverse();
        let near = inverse.project_point3(ndc.extend(0.0));
        let far = inverse.project_point3(ndc.extend(1.0));
        targets
            .iter()
            .filter(|t| t.radius > 0.0 && segment_hits_sphere(near, far, t.center, t.radius))
            .map(|t| t.id)
            .collect()
    }
}

fn segment_hits_sphere(start: Vec3, end: Vec3, center: Vec3, radius: f32) -> bool {
    let segment = end - start;
    let len_sq = segment.length_squared();
    let t = if len_sq > 0.0 {
        ((center - start).dot(segment) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    (start + segment * t).distance_squared(center) <= radius * radius
}

/// Rasterized picking into a one-texel-per-target row.
pub struct GpuPicker {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    instance_buffer: wgpu::Buffer,
    target: wgpu::Texture,
    target_view: wgpu::TextureView,
    readback: wgpu::Buffer,
}

impl GpuPicker {
    pub fn new(device: &wgpu::Device) -> Self {
        let layout = create_camera_bind_group_layout(device);
        let pipeline = create_pick_pipeline(device, &layout);

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Pick Uniform"),
            size: std::mem::size_of::<[[f32; 4]; 4]>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Pick Bind Group"),
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });
        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Pick Instances"),
            size: (MAX_PICK_TARGETS * std::mem::size_of::<InstanceData>()) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let target = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Pick Target"),
            size: wgpu::Extent3d {
                width: MAX_PICK_TARGETS as u32,
                height: 1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::R8Unorm,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let target_view = target.create_view(&wgpu::TextureViewDescriptor::default());
        let readback = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Pick Readback"),
            size: PICK_ROW_BYTES as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        Self {
            pipeline,
            uniform_buffer,
            bind_group,
            instance_buffer,
            target,
            target_view,
            readback,
        }
    }

    /// Draw each target into texel `k` through the pick matrix and read the row back.
    /// Blocks until the GPU is done.
    #[allow(clippy::too_many_arguments)]
    pub fn pick(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        sphere: &Mesh,
        view_proj: Mat4,
        viewport: Vec2,
        point: Vec2,
        targets: &[PickTarget],
    ) -> Vec<usize> {
        if targets.len() > MAX_PICK_TARGETS {
            log::warn!("Picking {} targets, only the first {MAX_PICK_TARGETS} are tested", targets.len());
        }
        let targets = &targets[..targets.len().min(MAX_PICK_TARGETS)];
        if targets.is_empty() {
            return Vec::new();
        }

        let pick_view_proj = pick_matrix(point, viewport) * view_proj;
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&pick_view_proj.to_cols_array_2d()));
        let instances: Vec<InstanceData> = targets
            .iter()
            .map(|t| {
                let model = Mat4::from_translation(t.center) * Mat4::from_scale(Vec3::splat(t.radius));
                InstanceData::new(model, [1.0; 4], Material::MATTE)
            })
            .collect();
        queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances));

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Pick Encoder"),
        });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Pick Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.target_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.bind_group, &[]);
            pass.set_vertex_buffer(0, sphere.vertex_buffer.slice(..));
            pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
            pass.set_index_buffer(sphere.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            for k in 0..targets.len() as u32 {
                pass.set_viewport(k as f32, 0.0, 1.0, 1.0, 0.0, 1.0);
                pass.draw_indexed(0..sphere.num_indices, 0, k..k + 1);
            }
        }
        encoder.copy_texture_to_buffer(
            wgpu::ImageCopyTexture {
                texture: &self.target,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::ImageCopyBuffer {
                buffer: &self.readback,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(PICK_ROW_BYTES),
                    rows_per_image: Some(1),
                },
            },
            wgpu::Extent3d {
                width: MAX_PICK_TARGETS as u32,
                height: 1,
                depth_or_array_layers: 1,
            },
        );
        queue.submit(std::iter::once(encoder.finish()));

        let slice = self.readback.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        device.poll(wgpu::Maintain::Wait);

        match rx.recv() {
            Ok(Ok(())) => {
                let hits = {
                    let row = slice.get_mapped_range();
                    row.iter()
                        .zip(targets)
                        .filter(|(texel, _)| **texel > 0)
                        .map(|(_, t)| t.id)
                        .collect()
                };
                self.readback.unmap();
                hits
            }
            Ok(Err(e)) => {
                log::warn!("Pick readback failed: {e}");
                Vec::new()
            }
            Err(_) => {
                log::warn!("Pick readback never completed");
                Vec::new()
            }
        }
    }
}
