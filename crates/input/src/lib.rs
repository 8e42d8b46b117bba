//! Input handling for keyboard and mouse.

use glam::Vec2;
use std::collections::HashSet;

/// Discrete commands bound to keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// `w`: ride forward along the current yaw.
    Forward,
    /// `s`: ride backward.
    Backward,
    /// `a`: strafe left.
    StrafeLeft,
    /// `d`: strafe right.
    StrafeRight,
    /// `q`: pitch the camera up one degree.
    PitchUp,
    /// `z`: pitch the camera down one degree.
    PitchDown,
    /// Escape: leave immediately.
    Quit,
}

impl Action {
    /// Default key binding.
    pub fn from_key(key: KeyCode) -> Option<Self> {
        match key {
            KeyCode::KeyW => Some(Self::Forward),
            KeyCode::KeyS => Some(Self::Backward),
            KeyCode::KeyA => Some(Self::StrafeLeft),
            KeyCode::KeyD => Some(Self::StrafeRight),
            KeyCode::KeyQ => Some(Self::PitchUp),
            KeyCode::KeyZ => Some(Self::PitchDown),
            KeyCode::Escape => Some(Self::Quit),
            _ => None,
        }
    }
}

/// Tracks held mouse buttons and the last cursor position.
#[derive(Debug, Default)]
pub struct InputState {
    /// Mouse buttons currently held.
    mouse_held: HashSet<MouseButton>,
    /// Cursor position in window pixels, once the cursor has entered the window.
    cursor_position: Option<Vec2>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a keyboard event. Returns the bound action for presses and
    /// auto-repeats, `None` for releases and unbound keys.
    pub fn process_keyboard(&self, key: KeyCode, state: ElementState) -> Option<Action> {
        match state {
            ElementState::Pressed => Action::from_key(key),
            ElementState::Released => None,
        }
    }

    /// Process a mouse button event.
    pub fn process_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        match state {
            ElementState::Pressed => {
                self.mouse_held.insert(button);
            }
            ElementState::Released => {
                self.mouse_held.remove(&button);
            }
        }
    }

    /// Process a cursor position update. Returns the movement since the
    /// previous position; the first event only records the position.
    pub fn process_cursor_position(&mut self, position: (f64, f64)) -> Option<Vec2> {
        let position = Vec2::new(position.0 as f32, position.1 as f32);
        let delta = self.cursor_position.map(|last| position - last);
        self.cursor_position = Some(position);
        delta
    }

    /// Check if a mouse button is held.
    pub fn is_mouse_held(&self, button: MouseButton) -> bool {
        self.mouse_held.contains(&button)
    }

    /// True while any mouse button is down (pointer motion is then a drag).
    pub fn any_mouse_held(&self) -> bool {
        !self.mouse_held.is_empty()
    }

    /// Last cursor position in window pixels.
    pub fn cursor_position(&self) -> Option<Vec2> {
        self.cursor_position
    }
}

// Re-export for convenience
pub use winit::event::{ElementState, MouseButton};
pub use winit::keyboard::KeyCode;
