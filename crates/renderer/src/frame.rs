//! Retained draw-command list for one frame.
//!
//! The scene is described as an ordered list of batches. Each batch names a
//! [`Pass`], which fixes the depth, stencil and blend state used to draw it,
//! and a [`MeshKind`]. The renderer replays the list in order.

use glam::{Mat4, Vec3, Vec4};

use crate::vertex::{InstanceData, Material};

/// Render state a batch is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pass {
    /// Colour and depth writes off; stamps stencil = 1 wherever drawn.
    StencilMask,
    /// Lit with the mirrored light, only where stencil == 1, winding flipped.
    Reflection,
    /// Flat colour, visible from below only.
    FloorUnderside,
    /// Textured, alpha blended over the reflection; stamps stencil = 3.
    FloorTop,
    /// Lit solid geometry; clears stencil so shadows never land on it.
    Lit,
    /// Unlit translucent overlay, no depth writes.
    Highlight,
    /// Unlit translucent, no depth test; only where stencil == 3, then
    /// stamps 2 so overlapping shadows darken once.
    Shadow,
    /// Unlit solid colour.
    Marker,
}

impl Pass {
    /// Stencil reference the pass is drawn with.
    pub fn stencil_reference(self) -> u32 {
        match self {
            Pass::StencilMask | Pass::Reflection => 1,
            Pass::FloorTop => 3,
            Pass::Shadow => 2,
            Pass::FloorUnderside | Pass::Lit | Pass::Highlight | Pass::Marker => 0,
        }
    }

    /// Whether the pass lights geometry with the mirrored light.
    pub fn uses_mirrored_light(self) -> bool {
        matches!(self, Pass::Reflection)
    }
}

/// Shared meshes owned by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshKind {
    /// Unit-radius sphere.
    Sphere,
    /// Wheel torus.
    Torus,
    /// Unit cube.
    Cube,
    /// Textured floor quad, already in world space.
    Floor,
}

/// Instances of one mesh drawn in one pass.
#[derive(Debug, Clone)]
pub struct DrawBatch {
    pub pass: Pass,
    pub mesh: MeshKind,
    pub instances: Vec<InstanceData>,
}

/// Lights for the normal and mirrored halves of the frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameLights {
    pub position: Vec4,
    pub mirrored: Vec4,
    pub color: [f32; 4],
}

/// Everything the renderer needs to draw one frame's 3D scene.
#[derive(Debug, Clone)]
pub struct FramePlan {
    pub lights: FrameLights,
    pub clear_color: [f64; 4],
    batches: Vec<DrawBatch>,
    /// Transform applied to everything drawn in the Reflection pass.
    reflection: Mat4,
    /// Transform applied to everything drawn in the Shadow pass.
    shadow_projection: Mat4,
}

impl FramePlan {
    pub fn new(lights: FrameLights) -> Self {
        Self {
            lights,
            clear_color: [0.0, 0.0, 0.0, 1.0],
            batches: Vec::new(),
            reflection: Mat4::IDENTITY,
            shadow_projection: Mat4::IDENTITY,
        }
    }

    /// Set the mirror transform used by the Reflection pass.
    pub fn set_reflection(&mut self, mirror: Mat4) {
        self.reflection = mirror;
    }

    /// Set the projective flattening used by the Shadow pass.
    pub fn apply_shadow_projection(&mut self, shadow: Mat4) {
        self.shadow_projection = shadow;
    }

    /// Stamp the floor footprint into the stencil buffer.
    pub fn begin_stencil_mask(&mut self) {
        self.draw_floor(Pass::StencilMask, [1.0; 4]);
    }

    /// Draw the floor quad tinted by `color`.
    pub fn draw_floor(&mut self, pass: Pass, color: [f32; 4]) {
        self.draw_mesh(pass, MeshKind::Floor, Mat4::IDENTITY, color, Material::MATTE);
    }

    /// Draw a sphere of `radius` centred at `center`.
    pub fn draw_sphere_at(&mut self, pass: Pass, center: Vec3, radius: f32, color: [f32; 4], material: Material) {
        let model = Mat4::from_translation(center) * Mat4::from_scale(Vec3::splat(radius));
        self.draw_mesh(pass, MeshKind::Sphere, model, color, material);
    }

    /// Draw any mesh. Reflection and Shadow passes pre-multiply their transform.
    pub fn draw_mesh(&mut self, pass: Pass, mesh: MeshKind, model: Mat4, color: [f32; 4], material: Material) {
        let model = match pass {
            Pass::Reflection => self.reflection * model,
            Pass::Shadow => self.shadow_projection * model,
            _ => model,
        };
        let instance = InstanceData::new(model, color, material);
        match self.batches.last_mut() {
            Some(batch) if batch.pass == pass && batch.mesh == mesh => batch.instances.push(instance),
            _ => self.batches.push(DrawBatch {
                pass,
                mesh,
                instances: vec![instance],
            }),
        }
    }

    pub fn batches(&self) -> &[DrawBatch] {
        &self.batches
    }

    /// Passes in draw order, one entry per batch.
    pub fn pass_order(&self) -> Vec<Pass> {
        self.batches.iter().map(|b| b.pass).collect()
    }

    /// Total instances drawn in `pass`.
    pub fn instance_count(&self, pass: Pass) -> usize {
        self.batches
            .iter()
            .filter(|b| b.pass == pass)
            .map(|b| b.instances.len())
            .sum()
    }
}
