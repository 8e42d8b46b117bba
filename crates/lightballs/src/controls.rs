//! Keyboard and pointer controls applied to the scene.

use glam::Vec2;
use input::{Action, InputState, MouseButton};

use crate::player::Lean;
use crate::scene::Scene;

/// Degrees per `q`/`z` press.
const PITCH_STEP: f32 = 1.0;

/// Apply a key action. Returns false when the action asks to quit.
pub fn apply_action(scene: &mut Scene, action: Action) -> bool {
    match action {
        Action::Forward => {
            scene.camera.ride(1.0);
            scene.bike.roll(1.0);
        }
        Action::Backward => {
            scene.camera.ride(-1.0);
            scene.bike.roll(-1.0);
        }
        Action::StrafeLeft => {
            scene.camera.strafe(-1.0);
            scene.bike.lean = Lean::Left;
        }
        Action::StrafeRight => {
            scene.camera.strafe(1.0);
            scene.bike.lean = Lean::Right;
        }
        Action::PitchUp => scene.camera.step_pitch(PITCH_STEP),
        Action::PitchDown => scene.camera.step_pitch(-PITCH_STEP),
        Action::Quit => return false,
    }
    true
}

/// Apply pointer motion. With the middle button held the light is dragged;
/// with any other button held the motion is only tracked; otherwise the
/// camera turns by the raw delta and the handlebars lean with it.
pub fn pointer_moved(scene: &mut Scene, input: &InputState, delta: Vec2, sensitivity: f32) {
    if input.is_mouse_held(MouseButton::Middle) {
        scene.light.drag(delta);
    } else if !input.any_mouse_held() {
        scene.camera.rotate(delta * sensitivity);
        scene.bike.lean = Lean::from_delta(delta.y);
    }
}

/// Middle button starts and stops the light drag.
pub fn mouse_button(scene: &mut Scene, button: MouseButton, pressed: bool) {
    if button == MouseButton::Middle {
        scene.light.dragging = pressed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use input::ElementState;
    use renderer::{PITCH_MAX, PITCH_MIN};

    fn scene() -> Scene {
        Scene::with_spheres(Vec::new(), 10.0)
    }

    #[test]
    fn escape_quits() {
        let mut scene = scene();
        assert!(!apply_action(&mut scene, Action::Quit));
        assert!(apply_action(&mut scene, Action::Forward));
    }

    #[test]
    fn riding_moves_and_spins_wheels() {
        let mut scene = scene();
        apply_action(&mut scene, Action::Forward);
        assert!((scene.camera.position.z + 1.0).abs() < 1e-6);
        assert_eq!(scene.bike.wheel_angle, -10.0);
        apply_action(&mut scene, Action::Backward);
        assert!(scene.camera.position.z.abs() < 1e-6);
        assert_eq!(scene.bike.wheel_angle, 0.0);
    }

    #[test]
    fn strafing_leans() {
        let mut scene = scene();
        apply_action(&mut scene, Action::StrafeLeft);
        assert_eq!(scene.bike.lean, Lean::Left);
        assert!((scene.camera.position.x + 0.5).abs() < 1e-6);
        apply_action(&mut scene, Action::StrafeRight);
        assert_eq!(scene.bike.lean, Lean::Right);
        apply_action(&mut scene, Action::Forward);
        assert_eq!(scene.bike.lean, Lean::Straight);
    }

    #[test]
    fn no_input_escapes_the_pitch_clamp() {
        let mut scene = scene();
        let input = InputState::new();
        for _ in 0..500 {
            apply_action(&mut scene, Action::PitchUp);
        }
        assert_eq!(scene.camera.pitch(), PITCH_MAX);
        pointer_moved(&mut scene, &input, Vec2::new(0.0, -10_000.0), 1.0);
        assert_eq!(scene.camera.pitch(), PITCH_MIN);
        for _ in 0..500 {
            apply_action(&mut scene, Action::PitchDown);
            assert!((PITCH_MIN..=PITCH_MAX).contains(&scene.camera.pitch()));
        }
    }

    #[test]
    fn free_motion_turns_camera_and_leans() {
        let mut scene = scene();
        let input = InputState::new();
        pointer_moved(&mut scene, &input, Vec2::new(6.0, 2.0), 0.5);
        assert_eq!(scene.camera.yaw, 3.0);
        assert_eq!(scene.camera.pitch(), 1.0);
        assert_eq!(scene.bike.lean, Lean::Right);
        pointer_moved(&mut scene, &input, Vec2::new(1.0, 0.0), 1.0);
        assert_eq!(scene.bike.lean, Lean::Straight);
    }

    #[test]
    fn held_buttons_suppress_rotation() {
        let mut scene = scene();
        let mut input = InputState::new();
        input.process_mouse_button(MouseButton::Left, ElementState::Pressed);
        pointer_moved(&mut scene, &input, Vec2::new(30.0, 30.0), 1.0);
        assert_eq!(scene.camera.yaw, 0.0);
        assert_eq!(scene.camera.pitch(), 0.0);
    }

    #[test]
    fn middle_drag_moves_light_and_pauses_orbit() {
        let mut scene = scene();
        let mut input = InputState::new();
        input.process_mouse_button(MouseButton::Middle, ElementState::Pressed);
        mouse_button(&mut scene, MouseButton::Middle, true);
        assert!(scene.light.dragging);

        pointer_moved(&mut scene, &input, Vec2::new(40.0, 0.0), 1.0);
        assert!((scene.light.angle - 1.0).abs() < 1e-6);
        assert_eq!(scene.camera.yaw, 0.0);
        scene.light.advance();
        assert!((scene.light.angle - 1.0).abs() < 1e-6);

        mouse_button(&mut scene, MouseButton::Middle, false);
        assert!(!scene.light.dragging);
    }
}
