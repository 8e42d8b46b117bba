//! Render pipeline creation.
//!
//! Scene pipelines are built per [`Pass`]: the pass fixes the shader entry
//! point, winding, depth test, stencil test and blending.

use crate::frame::Pass;
use crate::vertex::{InstanceData, OverlayVertex, Vertex};

/// Which fragment program a pass runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderKind {
    Lit,
    Unlit,
    Floor,
}

/// Fixed-function state for one scene pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassState {
    pub shader: ShaderKind,
    pub front_face: wgpu::FrontFace,
    pub cull_mode: Option<wgpu::Face>,
    pub depth_write: bool,
    pub depth_compare: wgpu::CompareFunction,
    pub stencil: wgpu::StencilFaceState,
    pub blend: Option<wgpu::BlendState>,
    pub color_writes: wgpu::ColorWrites,
}

/// Stencil test `reference <compare> stored`, replacing the stored value when it passes.
fn stamp(compare: wgpu::CompareFunction) -> wgpu::StencilFaceState {
    wgpu::StencilFaceState {
        compare,
        fail_op: wgpu::StencilOperation::Keep,
        depth_fail_op: wgpu::StencilOperation::Keep,
        pass_op: wgpu::StencilOperation::Replace,
    }
}

/// Stencil test without writes.
fn test_only(compare: wgpu::CompareFunction) -> wgpu::StencilFaceState {
    wgpu::StencilFaceState {
        compare,
        ..wgpu::StencilFaceState::IGNORE
    }
}

pub fn pass_state(pass: Pass) -> PassState {
    use wgpu::CompareFunction::{Always, Equal, Less};

    let solid = PassState {
        shader: ShaderKind::Lit,
        front_face: wgpu::FrontFace::Ccw,
        cull_mode: Some(wgpu::Face::Back),
        depth_write: true,
        depth_compare: Less,
        stencil: wgpu::StencilFaceState::IGNORE,
        blend: None,
        color_writes: wgpu::ColorWrites::ALL,
    };
    match pass {
        Pass::StencilMask => PassState {
            shader: ShaderKind::Floor,
            depth_write: false,
            depth_compare: Always,
            stencil: stamp(Always),
            color_writes: wgpu::ColorWrites::empty(),
            ..solid
        },
        // Mirroring flips handedness, so the front face flips with it.
        Pass::Reflection => PassState {
            front_face: wgpu::FrontFace::Cw,
            stencil: test_only(Equal),
            ..solid
        },
        Pass::FloorUnderside => PassState {
            shader: ShaderKind::Floor,
            front_face: wgpu::FrontFace::Cw,
            ..solid
        },
        Pass::FloorTop => PassState {
            shader: ShaderKind::Floor,
            stencil: stamp(Always),
            blend: Some(wgpu::BlendState::ALPHA_BLENDING),
            ..solid
        },
        Pass::Lit => PassState {
            stencil: stamp(Always),
            ..solid
        },
        Pass::Highlight => PassState {
            shader: ShaderKind::Unlit,
            depth_write: false,
            blend: Some(wgpu::BlendState::ALPHA_BLENDING),
            ..solid
        },
        // Flattened geometry is coplanar with the floor.
        Pass::Shadow => PassState {
            shader: ShaderKind::Unlit,
            cull_mode: None,
            depth_write: false,
            depth_compare: Always,
            stencil: stamp(Less),
            blend: Some(wgpu::BlendState::ALPHA_BLENDING),
            ..solid
        },
        Pass::Marker => PassState {
            shader: ShaderKind::Unlit,
            ..solid
        },
    }
}

/// Bind group layout for the per-pass scene uniform (view-projection and light).
pub fn create_camera_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Camera Bind Group Layout"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

/// Bind group layout for a filterable 2D texture and its sampler.
pub fn create_texture_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Texture Bind Group Layout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    })
}

/// Build the scene pipeline for `pass`.
pub fn create_scene_pipeline(
    device: &wgpu::Device,
    color_format: wgpu::TextureFormat,
    depth_format: wgpu::TextureFormat,
    camera_layout: &wgpu::BindGroupLayout,
    texture_layout: &wgpu::BindGroupLayout,
    pass: Pass,
) -> wgpu::RenderPipeline {
    let state = pass_state(pass);
    let label = format!("{pass:?} Pipeline");

    let (shader, fragment_entry, bind_group_layouts) = match state.shader {
        ShaderKind::Lit | ShaderKind::Unlit => {
            let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("Scene Shader"),
                source: wgpu::ShaderSource::Wgsl(include_str!("shaders/scene.wgsl").into()),
            });
            let entry = if state.shader == ShaderKind::Lit { "fs_lit" } else { "fs_unlit" };
            (module, entry, vec![camera_layout])
        }
        ShaderKind::Floor => {
            let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("Floor Shader"),
                source: wgpu::ShaderSource::Wgsl(include_str!("shaders/floor.wgsl").into()),
            });
            (module, "fs_main", vec![camera_layout, texture_layout])
        }
    };

    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(&label),
        bind_group_layouts: &bind_group_layouts,
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(&label),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[Vertex::layout(), InstanceData::layout()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some(fragment_entry),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend: state.blend,
                write_mask: state.color_writes,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: state.front_face,
            cull_mode: state.cull_mode,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: depth_format,
            depth_write_enabled: state.depth_write,
            depth_compare: state.depth_compare,
            stencil: wgpu::StencilState {
                front: state.stencil,
                back: state.stencil,
                read_mask: 0xff,
                write_mask: 0xff,
            },
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

/// Screen-space HUD pipeline. Drawn after the scene, no depth.
pub fn create_overlay_pipeline(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    texture_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Overlay Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("shaders/overlay.wgsl").into()),
    });

    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Overlay Pipeline Layout"),
        bind_group_layouts: &[texture_layout],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Overlay Pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[OverlayVertex::layout()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: config.format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

/// Pipeline for hit-testing into an R8 row. No depth, so occluded targets still hit.
pub fn create_pick_pipeline(device: &wgpu::Device, uniform_layout: &wgpu::BindGroupLayout) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Pick Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("shaders/pick.wgsl").into()),
    });

    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Pick Pipeline Layout"),
        bind_group_layouts: &[uniform_layout],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Pick Pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[Vertex::layout(), InstanceData::layout()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: wgpu::TextureFormat::R8Unorm,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: Some(wgpu::Face::Back),
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}
