//! The lightcycle: pose driven by input and the parts it is drawn from.

use glam::{Mat4, Vec3};
use renderer::MeshKind;

/// Degrees the wheels turn per ride step.
pub const WHEEL_STEP: f32 = 10.0;
/// Handlebar rotation for a full lean, in degrees.
const HANDLEBAR_TURN: f32 = 40.0;
/// Overall model scale.
const BIKE_SCALE: f32 = 2.0;
/// Bike origin relative to the camera rig.
const BIKE_OFFSET: Vec3 = Vec3::new(0.0, 1.5, -1.5);

/// Handlebar lean, a tri-state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lean {
    Left,
    #[default]
    Straight,
    Right,
}

impl Lean {
    /// Lean from the sign of a vertical pointer delta.
    pub fn from_delta(dy: f32) -> Self {
        if dy > 0.0 {
            Lean::Right
        } else if dy < 0.0 {
            Lean::Left
        } else {
            Lean::Straight
        }
    }
}

/// Cosmetic pose of the bike. The body always faces along the rig; only
/// the wheels and handlebars move.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BikePose {
    /// Wheel spin in degrees.
    pub wheel_angle: f32,
    pub lean: Lean,
}

impl BikePose {
    /// Spin the wheels for a ride step; `dir` is +1 forward, -1 backward.
    pub fn roll(&mut self, dir: f32) {
        self.wheel_angle -= WHEEL_STEP * dir;
        self.lean = Lean::Straight;
    }

    /// Solid parts of the model, relative to the camera rig.
    pub fn parts(&self) -> Vec<BikePart> {
        let root = Mat4::from_translation(BIKE_OFFSET)
            * Mat4::from_scale(Vec3::splat(BIKE_SCALE))
            * Mat4::from_translation(Vec3::new(0.0, 0.0, -1.8));

        let body = root
            * Mat4::from_scale(Vec3::new(1.0, 1.0, 3.0))
            * Mat4::from_rotation_z(180f32.to_radians())
            * Mat4::from_scale(Vec3::splat(0.5));

        let wheel = |z: f32| {
            root * Mat4::from_translation(Vec3::new(0.0, -0.3, z))
                * Mat4::from_scale(Vec3::new(2.4, 1.0, 1.0))
                * Mat4::from_rotation_y(90f32.to_radians())
                * Mat4::from_rotation_z(self.wheel_angle.to_radians())
        };

        let turn = match self.lean {
            Lean::Left => HANDLEBAR_TURN,
            Lean::Straight => 0.0,
            Lean::Right => -HANDLEBAR_TURN,
        };
        let handlebar = root
            * Mat4::from_translation(Vec3::new(0.0, 0.4, -0.8))
            * Mat4::from_rotation_y(turn.to_radians())
            * Mat4::from_scale(Vec3::new(1.2, 0.1, 0.1));

        vec![
            BikePart { mesh: MeshKind::Sphere, local: body },
            BikePart { mesh: MeshKind::Torus, local: wheel(1.2) },
            BikePart { mesh: MeshKind::Torus, local: wheel(-1.2) },
            BikePart { mesh: MeshKind::Cube, local: handlebar },
        ]
    }
}

/// A mesh placed relative to the camera rig.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BikePart {
    pub mesh: MeshKind,
    pub local: Mat4,
}
