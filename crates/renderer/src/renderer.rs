//! Device, surface and per-pass pipelines; replays a [`FramePlan`] each frame.

use crate::{
    camera::{Camera, CameraUniform},
    frame::{FrameLights, FramePlan, MeshKind, Pass},
    mesh::{Mesh, MeshData},
    picking::{GpuPicker, PickTarget, Picker},
    pipeline::{
        create_camera_bind_group_layout, create_overlay_pipeline, create_scene_pipeline,
        create_texture_bind_group_layout, pass_state, ShaderKind,
    },
    texture::{floor_pattern, DepthStencil, Texture},
    vertex::{InstanceData, OverlayVertex},
};
use glam::{Mat4, Vec2};
use std::collections::HashMap;
use std::sync::Arc;
use wgpu::util::DeviceExt;
use winit::window::Window;

/// Stencil bits the reflection and shadow passes need.
pub const MIN_STENCIL_BITS: u32 = 2;

/// Depth-stencil formats to try, in order of preference.
const DEPTH_STENCIL_CANDIDATES: [wgpu::TextureFormat; 2] = [
    wgpu::TextureFormat::Depth24PlusStencil8,
    wgpu::TextureFormat::Depth32FloatStencil8,
];

/// Sphere tessellation (segments, rings).
const SPHERE_DETAIL: (u32, u32) = (20, 20);
/// Wheel torus: ring radius, tube radius, sides, rings.
const TORUS_SHAPE: (f32, f32, u32, u32) = (0.25, 0.25, 10, 10);

const INITIAL_INSTANCE_CAPACITY: usize = 256;

#[derive(Debug, thiserror::Error)]
pub enum RendererError {
    #[error("no suitable GPU adapter")]
    NoAdapter,
    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("failed to create device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("Sorry, I need at least 2 bits of stencil.")]
    StencilUnsupported,
}

/// Stencil bits carried by a texture format.
pub fn stencil_bits(format: wgpu::TextureFormat) -> u32 {
    match format {
        wgpu::TextureFormat::Stencil8
        | wgpu::TextureFormat::Depth24PlusStencil8
        | wgpu::TextureFormat::Depth32FloatStencil8 => 8,
        _ => 0,
    }
}

/// First candidate with enough stencil that `renderable` accepts.
pub fn choose_depth_stencil_format(
    renderable: impl Fn(wgpu::TextureFormat) -> bool,
) -> Result<wgpu::TextureFormat, RendererError> {
    DEPTH_STENCIL_CANDIDATES
        .into_iter()
        .find(|&format| stencil_bits(format) >= MIN_STENCIL_BITS && renderable(format))
        .ok_or(RendererError::StencilUnsupported)
}

/// Shared GPU meshes, addressed by [`MeshKind`].
struct SceneMeshes {
    sphere: Mesh,
    torus: Mesh,
    cube: Mesh,
    floor: Mesh,
}

impl SceneMeshes {
    fn get(&self, kind: MeshKind) -> &Mesh {
        match kind {
            MeshKind::Sphere => &self.sphere,
            MeshKind::Torus => &self.torus,
            MeshKind::Cube => &self.cube,
            MeshKind::Floor => &self.floor,
        }
    }
}

/// GPU state for the scene, overlay and picking.
pub struct Renderer {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub size: winit::dpi::PhysicalSize<u32>,
    pub window: Arc<Window>,

    pipelines: HashMap<Pass, wgpu::RenderPipeline>,
    overlay_pipeline: wgpu::RenderPipeline,

    camera_uniform: CameraUniform,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    /// Same view, lit by the light mirrored below the floor.
    mirrored_camera_buffer: wgpu::Buffer,
    mirrored_camera_bind_group: wgpu::BindGroup,
    floor_bind_group: wgpu::BindGroup,
    overlay_bind_group: wgpu::BindGroup,

    meshes: SceneMeshes,
    instance_buffer: wgpu::Buffer,
    instance_capacity: usize,

    depth_format: wgpu::TextureFormat,
    depth_texture: DepthStencil,
    picker: GpuPicker,
}

impl Renderer {
    /// Create a renderer for `window`. `floor` is uploaded as the floor mesh.
    pub async fn new(window: Arc<Window>, vsync: bool, floor: &MeshData) -> Result<Self, RendererError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RendererError::NoAdapter)?;

        log::info!("Using GPU: {:?}", adapter.get_info().name);

        let required_features = adapter.features() & wgpu::Features::DEPTH32FLOAT_STENCIL8;
        let depth_format = choose_depth_stencil_format(|format| {
            let feature_ok = format != wgpu::TextureFormat::Depth32FloatStencil8
                || required_features.contains(wgpu::Features::DEPTH32FLOAT_STENCIL8);
            feature_ok
                && adapter
                    .get_texture_format_features(format)
                    .allowed_usages
                    .contains(wgpu::TextureUsages::RENDER_ATTACHMENT)
        })?;
        log::info!("Depth-stencil format: {depth_format:?}");

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Main Device"),
                    required_features,
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let present_mode = if vsync {
            surface_caps
                .present_modes
                .iter()
                .find(|m| matches!(m, wgpu::PresentMode::Mailbox))
                .copied()
                .unwrap_or(wgpu::PresentMode::AutoVsync)
        } else {
            wgpu::PresentMode::AutoNoVsync
        };

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 1,
        };
        surface.configure(&device, &config);

        let camera_bind_group_layout = create_camera_bind_group_layout(&device);
        let texture_bind_group_layout = create_texture_bind_group_layout(&device);

        let camera_uniform = CameraUniform::new();
        let (camera_buffer, camera_bind_group) =
            create_camera_binding(&device, &camera_bind_group_layout, &camera_uniform, "Camera");
        let (mirrored_camera_buffer, mirrored_camera_bind_group) =
            create_camera_binding(&device, &camera_bind_group_layout, &camera_uniform, "Mirrored Camera");

        let floor_texture = Texture::from_image(&device, &queue, &floor_pattern(), "Floor Texture");
        let floor_bind_group = create_texture_binding(&device, &texture_bind_group_layout, &floor_texture, "Floor");
        let font_texture = Texture::font_atlas(&device, &queue);
        let overlay_bind_group = create_texture_binding(&device, &texture_bind_group_layout, &font_texture, "Overlay");

        let passes = [
            Pass::StencilMask,
            Pass::Reflection,
            Pass::FloorUnderside,
            Pass::FloorTop,
            Pass::Lit,
            Pass::Highlight,
            Pass::Shadow,
            Pass::Marker,
        ];
        let pipelines = passes
            .into_iter()
            .map(|pass| {
                let pipeline = create_scene_pipeline(
                    &device,
                    config.format,
                    depth_format,
                    &camera_bind_group_layout,
                    &texture_bind_group_layout,
                    pass,
                );
                (pass, pipeline)
            })
            .collect();
        let overlay_pipeline = create_overlay_pipeline(&device, &config, &texture_bind_group_layout);

        let (segments, rings) = SPHERE_DETAIL;
        let (ring_radius, tube_radius, sides, torus_rings) = TORUS_SHAPE;
        let meshes = SceneMeshes {
            sphere: MeshData::sphere(segments, rings).upload(&device, "Sphere"),
            torus: MeshData::torus(ring_radius, tube_radius, sides, torus_rings).upload(&device, "Torus"),
            cube: MeshData::cube().upload(&device, "Cube"),
            floor: floor.upload(&device, "Floor"),
        };

        let instance_buffer = create_instance_buffer(&device, INITIAL_INSTANCE_CAPACITY);
        let depth_texture =
            DepthStencil::new(&device, depth_format, config.width, config.height, "Depth Stencil");
        let picker = GpuPicker::new(&device);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            window,
            pipelines,
            overlay_pipeline,
            camera_uniform,
            camera_buffer,
            camera_bind_group,
            mirrored_camera_buffer,
            mirrored_camera_bind_group,
            floor_bind_group,
            overlay_bind_group,
            meshes,
            instance_buffer,
            instance_capacity: INITIAL_INSTANCE_CAPACITY,
            depth_format,
            depth_texture,
            picker,
        })
    }

    /// Handle window resize. Zero-sized (minimized) windows are ignored.
    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.depth_texture = DepthStencil::new(
                &self.device,
                self.depth_format,
                self.config.width,
                self.config.height,
                "Depth Stencil",
            );
        }
    }

    /// Reconfigure the surface at its current size (after `Lost`/`Outdated`).
    pub fn reconfigure(&mut self) {
        self.resize(self.size);
    }

    /// Viewport size in pixels.
    pub fn viewport(&self) -> Vec2 {
        Vec2::new(self.config.width as f32, self.config.height as f32)
    }

    /// Surface size in physical pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Upload the view and both lights.
    pub fn update_scene(&mut self, camera: &Camera, lights: &FrameLights) {
        self.camera_uniform.update(camera, lights.position, lights.color);
        self.queue
            .write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&[self.camera_uniform]));

        let mut mirrored = self.camera_uniform;
        mirrored.light_position = lights.mirrored.to_array();
        self.queue
            .write_buffer(&self.mirrored_camera_buffer, 0, bytemuck::cast_slice(&[mirrored]));
    }

    /// Begin a new frame, returns the surface texture and a command encoder.
    pub fn begin_frame(&mut self) -> Result<(wgpu::SurfaceTexture, wgpu::CommandEncoder), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });
        Ok((output, encoder))
    }

    /// Replay `plan` in one render pass, clearing colour, depth and stencil first.
    pub fn render_scene(&mut self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView, plan: &FramePlan) {
        let instances: Vec<InstanceData> = plan
            .batches()
            .iter()
            .flat_map(|batch| batch.instances.iter().copied())
            .collect();
        if instances.len() > self.instance_capacity {
            self.instance_capacity = instances.len().next_power_of_two();
            self.instance_buffer = create_instance_buffer(&self.device, self.instance_capacity);
            log::debug!("Instance buffer grown to {}", self.instance_capacity);
        }
        if !instances.is_empty() {
            self.queue
                .write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances));
        }

        let [r, g, b, a] = plan.clear_color;
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_texture.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(0),
                    store: wgpu::StoreOp::Store,
                }),
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        render_pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
        let mut offset = 0u32;
        for batch in plan.batches() {
            let count = batch.instances.len() as u32;
            let Some(pipeline) = self.pipelines.get(&batch.pass) else {
                offset += count;
                continue;
            };
            render_pass.set_pipeline(pipeline);
            render_pass.set_stencil_reference(batch.pass.stencil_reference());
            let camera = if batch.pass.uses_mirrored_light() {
                &self.mirrored_camera_bind_group
            } else {
                &self.camera_bind_group
            };
            render_pass.set_bind_group(0, camera, &[]);
            if pass_state(batch.pass).shader == ShaderKind::Floor {
                render_pass.set_bind_group(1, &self.floor_bind_group, &[]);
            }

            let mesh = self.meshes.get(batch.mesh);
            render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            render_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..mesh.num_indices, 0, offset..offset + count);
            offset += count;
        }
    }

    /// Draw HUD quads over the finished scene, without depth or stencil.
    pub fn render_overlay(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        vertices: &[OverlayVertex],
        indices: &[u32],
    ) {
        if vertices.is_empty() || indices.is_empty() {
            return;
        }

        let vertex_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Overlay Vertex Buffer"),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Overlay Index Buffer"),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Overlay Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        render_pass.set_pipeline(&self.overlay_pipeline);
        render_pass.set_bind_group(0, &self.overlay_bind_group, &[]);
        render_pass.set_vertex_buffer(0, vertex_buffer.slice(..));
        render_pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..indices.len() as u32, 0, 0..1);
    }

    /// Submit and present.
    pub fn end_frame(&self, output: wgpu::SurfaceTexture, encoder: wgpu::CommandEncoder) {
        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }
}

impl Picker for Renderer {
    fn pick(&mut self, view_proj: Mat4, viewport: Vec2, point: Vec2, targets: &[PickTarget]) -> Vec<usize> {
        self.picker.pick(
            &self.device,
            &self.queue,
            &self.meshes.sphere,
            view_proj,
            viewport,
            point,
            targets,
        )
    }
}

fn create_camera_binding(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    uniform: &CameraUniform,
    label: &str,
) -> (wgpu::Buffer, wgpu::BindGroup) {
    let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{label} Buffer")),
        contents: bytemuck::cast_slice(&[*uniform]),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(&format!("{label} Bind Group")),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
    });
    (buffer, bind_group)
}

fn create_texture_binding(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    texture: &Texture,
    label: &str,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(&format!("{label} Bind Group")),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&texture.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&texture.sampler),
            },
        ],
    })
}

fn create_instance_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Instance Buffer"),
        size: (capacity * std::mem::size_of::<InstanceData>()) as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_depth24_stencil8() {
        let format = choose_depth_stencil_format(|_| true);
        assert!(matches!(format, Ok(wgpu::TextureFormat::Depth24PlusStencil8)));
    }

    #[test]
    fn falls_back_to_depth32_stencil8() {
        let format = choose_depth_stencil_format(|f| f == wgpu::TextureFormat::Depth32FloatStencil8);
        assert!(matches!(format, Ok(wgpu::TextureFormat::Depth32FloatStencil8)));
    }

    #[test]
    fn no_stencil_is_an_error() {
        let err = choose_depth_stencil_format(|_| false).unwrap_err();
        assert!(matches!(err, RendererError::StencilUnsupported));
        assert_eq!(err.to_string(), "Sorry, I need at least 2 bits of stencil.");
    }

    #[test]
    fn stencil_bits_per_format() {
        assert_eq!(stencil_bits(wgpu::TextureFormat::Depth24PlusStencil8), 8);
        assert_eq!(stencil_bits(wgpu::TextureFormat::Depth32Float), 0);
        assert_eq!(stencil_bits(wgpu::TextureFormat::Depth24Plus), 0);
    }
}
