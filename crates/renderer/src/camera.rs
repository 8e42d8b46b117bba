//! Third-person follow camera.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3, Vec4};

/// Lowest allowed pitch in degrees.
pub const PITCH_MIN: f32 = -30.0;
/// Highest allowed pitch in degrees.
pub const PITCH_MAX: f32 = 90.0;

/// Fixed eye the follow rig hangs from.
const BASE_EYE: Vec3 = Vec3::new(0.0, 8.0, 60.0);
const BASE_TARGET: Vec3 = Vec3::new(0.0, 8.0, 0.0);
/// Rig drop below the base eye before pitching.
const RIG_DROP: f32 = 2.0;
/// Sideways offset between the rig and the yaw pivot.
const RIG_SIDE: f32 = 8.0;
/// Height of the world relative to the camera after yaw.
const EYE_HEIGHT: f32 = 2.2;
/// Strafe distance per key press.
const STRAFE_STEP: f32 = 0.5;

/// Camera orbiting behind the player.
///
/// Angles are degrees. The view is built as base eye, pull back by
/// `radius`, pitch, side offset, yaw, then the negated player position.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Player/camera world position.
    pub position: Vec3,
    /// Rotation about X in degrees, kept within [PITCH_MIN, PITCH_MAX].
    pitch: f32,
    /// Rotation about Y in degrees.
    pub yaw: f32,
    /// Follow distance.
    pub radius: f32,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    /// Near clipping plane.
    pub near: f32,
    /// Far clipping plane.
    pub far: f32,
    /// Aspect ratio (width / height).
    pub aspect: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            pitch: 0.0,
            yaw: 0.0,
            radius: 10.0,
            fov_degrees: 45.0,
            near: 0.1,
            far: 500.0,
            aspect: 800.0 / 600.0,
        }
    }
}

impl Camera {
    /// Create a camera following at `radius`.
    pub fn new(radius: f32) -> Self {
        Self {
            radius,
            ..Default::default()
        }
    }

    /// Update aspect ratio (call on window resize).
    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Set pitch, clamped to [PITCH_MIN, PITCH_MAX].
    pub fn set_pitch(&mut self, pitch: f32) {
        self.pitch = pitch.clamp(PITCH_MIN, PITCH_MAX);
    }

    /// Apply a raw pointer delta: x turns yaw, y turns pitch, one degree per pixel.
    pub fn rotate(&mut self, delta: Vec2) {
        self.yaw += delta.x;
        self.set_pitch(self.pitch + delta.y);
    }

    /// Step pitch by `degrees`, wrapping at ±360 before clamping.
    pub fn step_pitch(&mut self, degrees: f32) {
        let mut pitch = self.pitch + degrees;
        if pitch > 360.0 {
            pitch -= 360.0;
        } else if pitch < -360.0 {
            pitch += 360.0;
        }
        self.set_pitch(pitch);
    }

    /// Ride along the yaw direction; `dir` is +1 forward, -1 backward.
    pub fn ride(&mut self, dir: f32) {
        let (sin_yaw, cos_yaw) = self.yaw.to_radians().sin_cos();
        self.position.x += sin_yaw * dir;
        self.position.z -= cos_yaw * dir;
        self.position.y -= self.pitch.to_radians().sin() * dir;
    }

    /// Strafe perpendicular to yaw; `dir` is +1 right, -1 left.
    pub fn strafe(&mut self, dir: f32) {
        let (sin_yaw, cos_yaw) = self.yaw.to_radians().sin_cos();
        self.position.x += cos_yaw * STRAFE_STEP * dir;
        self.position.z += sin_yaw * STRAFE_STEP * dir;
    }

    /// View space of the rig before the side offset and yaw; the player hangs here.
    pub fn rig_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(BASE_EYE, BASE_TARGET, Vec3::Y)
            * Mat4::from_translation(Vec3::new(0.0, -RIG_DROP, -self.radius))
            * Mat4::from_rotation_x(self.pitch.to_radians())
    }

    /// World to eye: fixed base eye, then the follow rig.
    pub fn view_matrix(&self) -> Mat4 {
        self.rig_matrix()
            * Mat4::from_translation(Vec3::new(RIG_SIDE, 0.0, 0.0))
            * Mat4::from_rotation_y(self.yaw.to_radians())
            * Mat4::from_translation(Vec3::new(-self.position.x, EYE_HEIGHT, -self.position.z))
    }

    /// World matrix for a model given relative to the rig.
    pub fn rig_to_world(&self, local: Mat4) -> Mat4 {
        self.view_matrix().inverse() * self.rig_matrix() * local
    }

    /// Perspective shared by drawing and picking.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    /// `projection * view`.
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Eye position in world space.
    pub fn eye_position(&self) -> Vec3 {
        self.view_matrix().inverse().transform_point3(Vec3::ZERO)
    }
}

/// Per-pass scene uniform (matches `Scene` in the WGSL shaders).
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    /// xyz = eye, w unused
    pub eye_position: [f32; 4],
    /// w = 0 for a directional light
    pub light_position: [f32; 4],
    pub light_color: [f32; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        Self {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            eye_position: [0.0, 0.0, 0.0, 1.0],
            light_position: [0.0, 1.0, 0.0, 0.0],
            light_color: [1.0; 4],
        }
    }

    pub fn update(&mut self, camera: &Camera, light_position: Vec4, light_color: [f32; 4]) {
        self.view_proj = camera.view_projection_matrix().to_cols_array_2d();
        self.eye_position = camera.eye_position().extend(1.0).to_array();
        self.light_position = light_position.to_array();
        self.light_color = light_color;
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).abs().max_element() < 1e-3
    }

    #[test]
    fn pitch_stays_clamped() {
        let mut camera = Camera::default();
        camera.rotate(Vec2::new(0.0, 500.0));
        assert_eq!(camera.pitch(), PITCH_MAX);
        camera.rotate(Vec2::new(0.0, -1000.0));
        assert_eq!(camera.pitch(), PITCH_MIN);
        for _ in 0..400 {
            camera.step_pitch(1.0);
        }
        assert_eq!(camera.pitch(), PITCH_MAX);
        for _ in 0..400 {
            camera.step_pitch(-1.0);
        }
        assert_eq!(camera.pitch(), PITCH_MIN);
    }

    #[test]
    fn rotate_is_pixel_rate() {
        let mut camera = Camera::default();
        camera.rotate(Vec2::new(12.0, 5.0));
        assert_eq!(camera.yaw, 12.0);
        assert_eq!(camera.pitch(), 5.0);
    }

    #[test]
    fn ride_and_strafe_follow_yaw() {
        let mut camera = Camera::default();
        camera.ride(1.0);
        assert!(approx(camera.position, Vec3::new(0.0, 0.0, -1.0)));
        camera.yaw = 90.0;
        camera.strafe(1.0);
        assert!(approx(camera.position, Vec3::new(0.0, 0.0, -0.5)));
        camera.ride(-1.0);
        assert!(approx(camera.position, Vec3::new(-1.0, 0.0, -0.5)));
    }

    #[test]
    fn ride_descends_with_pitch() {
        let mut camera = Camera::default();
        camera.set_pitch(30.0);
        camera.ride(1.0);
        assert!((camera.position.y + 0.5).abs() < 1e-5);
    }

    #[test]
    fn default_view_offsets() {
        let camera = Camera::default();
        // Base eye (0,8,60), rig (0,-2,-10), side +8, eye height 2.2.
        let origin = camera.view_matrix().transform_point3(Vec3::ZERO);
        assert!(approx(origin, Vec3::new(8.0, -7.8, -70.0)));
        assert!(approx(camera.eye_position(), Vec3::new(-8.0, 7.8, 70.0)));
    }

    #[test]
    fn rig_to_world_round_trips_through_view() {
        let mut camera = Camera::default();
        camera.yaw = 35.0;
        camera.set_pitch(20.0);
        camera.position = Vec3::new(4.0, 0.0, -3.0);
        let local = Mat4::from_translation(Vec3::new(0.0, 1.5, -1.5));
        let world = camera.rig_to_world(local);
        let in_view = camera.view_matrix() * world;
        let expected = camera.rig_matrix() * local;
        assert!(approx(in_view.w_axis.truncate(), expected.w_axis.truncate()));
    }
}
