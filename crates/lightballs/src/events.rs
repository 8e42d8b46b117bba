//! Window event handling for GameState.

use std::time::Instant;

use winit::event::WindowEvent;
use winit::keyboard::PhysicalKey;

use crate::{controls, render, selection};

impl crate::GameState {
    /// Handle a window event. Returns true if the app should exit.
    pub(crate) fn handle_window_event(&mut self, event: WindowEvent) -> bool {
        match event {
            WindowEvent::CloseRequested => {
                self.running = false;
                true
            }
            WindowEvent::Resized(size) => {
                self.renderer.resize(size);
                self.scene.camera.set_aspect(size.width, size.height);
                false
            }
            WindowEvent::KeyboardInput { event, .. } => {
                let PhysicalKey::Code(key) = event.physical_key else {
                    return false;
                };
                if let Some(action) = self.input.process_keyboard(key, event.state) {
                    if !controls::apply_action(&mut self.scene, action) {
                        log::info!("Quit requested, final score {}", self.scene.score);
                        self.running = false;
                        return true;
                    }
                }
                false
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let Some(delta) = self.input.process_cursor_position((position.x, position.y)) {
                    controls::pointer_moved(&mut self.scene, &self.input, delta, self.config.sensitivity);
                }
                false
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.input.process_mouse_button(button, state);
                let pressed = state.is_pressed();
                controls::mouse_button(&mut self.scene, button, pressed);
                if pressed && button == input::MouseButton::Left {
                    self.fire();
                }
                false
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = render::run(self) {
                    log::error!("Render error: {}", e);
                }
                self.renderer.window.request_redraw();
                false
            }
            _ => false,
        }
    }

    /// Shoot at the pointer, or at the crosshair when configured to.
    /// Kills are stamped with the click time, not the last frame's.
    fn fire(&mut self) {
        let clicked = Instant::now();
        let viewport = self.renderer.viewport();
        let point = selection::aim_point(self.input.cursor_position(), viewport, self.config.fire_at_crosshair);
        let kills = selection::fire(&mut self.scene, &mut self.renderer, viewport, point, clicked);
        if kills > 0 {
            log::info!("{} down, score {}", kills, self.scene.score);
        }
    }
}
