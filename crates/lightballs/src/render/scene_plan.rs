//! Builds the frame's draw-command list from the scene.

use engine_core::{reflect_light, reflection_matrix, shadow_matrix};
use renderer::{FrameLights, FramePlan, Material, Pass};

use crate::scene::{Scene, Sphere, FLOOR_Y, LIGHT_COLOR};

const SPHERE_COLOR: [f32; 4] = [0.05, 0.35, 0.05, 1.0];
const SPHERE_MATERIAL: Material = Material {
    specular: 0.8,
    shininess: 100.0,
    emission: 0.1,
};
const PLAYER_COLOR: [f32; 4] = [0.1, 1.0, 0.1, 1.0];
const PLAYER_MATERIAL: Material = Material {
    specular: 0.8,
    shininess: 100.0,
    emission: 0.02,
};
const FLOOR_UNDERSIDE_COLOR: [f32; 4] = [0.1, 0.1, 0.7, 1.0];
/// Floor top is mostly transparent so the reflection shows through.
const FLOOR_TOP_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 0.3];
const SHADOW_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 0.5];
const HIGHLIGHT_COLOR: [f32; 4] = [128.0 / 255.0, 0.0, 1.0, 64.0 / 255.0];
const HIGHLIGHT_SCALE: f32 = 1.5;
const MARKER_COLOR: [f32; 4] = [1.0, 1.0, 0.0, 1.0];
const MARKER_RADIUS: f32 = 2.0;

/// Everything drawn this frame, in draw order.
pub fn build(scene: &Scene) -> FramePlan {
    let light = scene.light.position();
    let mut plan = FramePlan::new(FrameLights {
        position: light,
        mirrored: reflect_light(light, FLOOR_Y),
        color: LIGHT_COLOR,
    });
    plan.set_reflection(reflection_matrix(FLOOR_Y));
    plan.apply_shadow_projection(shadow_matrix(scene.floor_plane, light));

    for part in scene.bike.parts() {
        let model = scene.camera.rig_to_world(part.local);
        plan.draw_mesh(Pass::Lit, part.mesh, model, PLAYER_COLOR, PLAYER_MATERIAL);
    }

    plan.begin_stencil_mask();
    draw_spheres(&mut plan, scene, Pass::Reflection, SPHERE_COLOR, SPHERE_MATERIAL);

    plan.draw_floor(Pass::FloorUnderside, FLOOR_UNDERSIDE_COLOR);
    plan.draw_floor(Pass::FloorTop, FLOOR_TOP_COLOR);

    draw_spheres(&mut plan, scene, Pass::Lit, SPHERE_COLOR, SPHERE_MATERIAL);
    for sphere in visible(scene).filter(|s| s.selected) {
        plan.draw_sphere_at(
            Pass::Highlight,
            sphere.draw_position(),
            sphere.size * HIGHLIGHT_SCALE,
            HIGHLIGHT_COLOR,
            Material::MATTE,
        );
    }

    draw_spheres(&mut plan, scene, Pass::Shadow, SHADOW_COLOR, Material::MATTE);

    plan.draw_sphere_at(Pass::Marker, light.truncate(), MARKER_RADIUS, MARKER_COLOR, Material::MATTE);
    plan
}

fn visible(scene: &Scene) -> impl Iterator<Item = &Sphere> {
    scene.spheres.iter().filter(|s| s.is_targetable())
}

fn draw_spheres(plan: &mut FramePlan, scene: &Scene, pass: Pass, color: [f32; 4], material: Material) {
    for sphere in visible(scene) {
        plan.draw_sphere_at(pass, sphere.draw_position(), sphere.size, color, material);
    }
}
