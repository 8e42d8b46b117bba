//! Per-frame rendering: simulation tick, preselection, scene and HUD passes.

mod overlay;
mod scene_plan;

use anyhow::Result;

use crate::hud::HudData;
use crate::selection;
use crate::simulation;
use crate::GameState;

/// Advance one frame and draw it. Called on every redraw.
pub fn run(state: &mut GameState) -> Result<()> {
    state.time.update();
    simulation::step(&mut state.scene, state.time.now());

    let viewport = state.renderer.viewport();
    selection::preselect(&mut state.scene, &mut state.renderer, viewport);

    let plan = scene_plan::build(&state.scene);
    state.renderer.update_scene(&state.scene.camera, &plan.lights);

    let (output, mut encoder) = match state.renderer.begin_frame() {
        Ok(frame) => frame,
        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
            log::debug!("Surface lost, reconfiguring");
            state.renderer.reconfigure();
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());

    state.renderer.render_scene(&mut encoder, &view, &plan);

    let (sw, sh) = state.renderer.dimensions();
    let hud = HudData::new(state.scene.camera.position, state.scene.score, &state.time);
    let tb = overlay::build(&hud, sw as f32, sh as f32);
    state.renderer.render_overlay(&mut encoder, &view, &tb.vertices, &tb.indices);

    state.renderer.end_frame(output, encoder);
    Ok(())
}
