//! Scene state: the sphere pool, light, camera, bike pose and score.

use std::time::{Duration, Instant};

use engine_core::{find_plane, Plane};
use glam::{Vec2, Vec3, Vec4};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use renderer::{Camera, MeshData, PickTarget};

use crate::player::BikePose;

pub const SPHERE_COUNT: usize = 20;
/// Radius of a live sphere.
pub const SPHERE_SIZE: f32 = 2.0;
/// Height spheres rest at.
pub const REST_HEIGHT: f32 = 2.0;
/// Height a respawned sphere drops in from.
pub const RESPAWN_HEIGHT: f32 = 50.0;
/// Radius lost per frame while dying.
pub const SHRINK_STEP: f32 = 0.1;
/// Height lost per frame while falling.
pub const FALL_STEP: f32 = 0.5;
pub const RESPAWN_DELAY: Duration = Duration::from_millis(5000);
pub const KILL_SCORE: u32 = 100;

pub const FLOOR_HALF_SIZE: f32 = 50.0;
pub const FLOOR_Y: f32 = -0.75;
/// Pattern repeats across the floor.
pub const FLOOR_TILES: f32 = 32.0;

pub const LIGHT_ORBIT_RADIUS: f32 = 40.0;
pub const LIGHT_HEIGHT: f32 = 20.0;
/// Orbit advance per frame in radians.
pub const LIGHT_STEP: f32 = 0.03;
pub const LIGHT_COLOR: [f32; 4] = [0.8, 1.0, 0.8, 1.0];
/// Drag can't push the light below this.
pub const LIGHT_MIN_HEIGHT: f32 = 1.0;
/// Pointer pixels per radian of drag.
const LIGHT_DRAG_ANGLE_PX: f32 = 40.0;
/// Pointer pixels per unit of drag height.
const LIGHT_DRAG_HEIGHT_PX: f32 = 20.0;

/// One slot of the fixed sphere pool.
#[derive(Debug, Clone, PartialEq)]
pub struct Sphere {
    pub position: Vec3,
    /// Under the crosshair this frame.
    pub selected: bool,
    pub dead: bool,
    pub death_time: Option<Instant>,
    /// Drawn radius, shrinks to 0 while dead.
    pub size: f32,
    /// Distance to the camera in the mirrored x/z frame.
    pub distance: f32,
}

impl Sphere {
    pub fn resting_at(x: f32, z: f32) -> Self {
        Self {
            position: Vec3::new(x, REST_HEIGHT, z),
            selected: false,
            dead: false,
            death_time: None,
            size: SPHERE_SIZE,
            distance: 0.0,
        }
    }

    /// Fully shrunk spheres can't be selected or shot.
    pub fn is_targetable(&self) -> bool {
        self.size != 0.0
    }

    /// Where the sphere is drawn: x and z are mirrored through the origin.
    pub fn draw_position(&self) -> Vec3 {
        Vec3::new(-self.position.x, self.position.y, -self.position.z)
    }

    pub fn kill(&mut self, now: Instant) {
        self.dead = true;
        self.death_time = Some(now);
    }

    /// Whether the respawn delay has fully elapsed.
    pub fn respawn_due(&self, now: Instant) -> bool {
        match self.death_time {
            Some(t) => now.saturating_duration_since(t) > RESPAWN_DELAY,
            None => true,
        }
    }
}

/// Directional light orbiting the origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    /// Orbit angle in radians.
    pub angle: f32,
    pub height: f32,
    /// Middle-button drag in progress; suspends the orbit.
    pub dragging: bool,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            angle: 0.0,
            height: LIGHT_HEIGHT,
            dragging: false,
        }
    }
}

impl Light {
    /// Position with `w = 0`: the light is treated as a direction.
    pub fn position(&self) -> Vec4 {
        let (sin, cos) = self.angle.sin_cos();
        Vec4::new(LIGHT_ORBIT_RADIUS * cos, self.height, LIGHT_ORBIT_RADIUS * sin, 0.0)
    }

    /// Per-frame orbit; does nothing while dragging.
    pub fn advance(&mut self) {
        if !self.dragging {
            self.angle += LIGHT_STEP;
        }
    }

    /// Apply a pointer delta while dragging.
    pub fn drag(&mut self, delta: Vec2) {
        self.angle += delta.x / LIGHT_DRAG_ANGLE_PX;
        self.height = (self.height - delta.y / LIGHT_DRAG_HEIGHT_PX).max(LIGHT_MIN_HEIGHT);
    }
}

/// Everything the simulation, picking and rendering share.
pub struct Scene {
    pub spheres: Vec<Sphere>,
    pub light: Light,
    pub camera: Camera,
    pub bike: BikePose,
    pub score: u32,
    /// Normalised plane of the floor top.
    pub floor_plane: Plane,
}

impl Scene {
    /// New scene with spheres placed by `seed`, or randomly when `None`.
    pub fn new(seed: Option<u64>, follow_radius: f32) -> Self {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let spheres = (0..SPHERE_COUNT)
            .map(|_| {
                let x = rng.gen_range(-49i32..=50) as f32;
                let z = rng.gen_range(-49i32..=50) as f32;
                Sphere::resting_at(x, z)
            })
            .collect();
        Self::with_spheres(spheres, follow_radius)
    }

    /// Scene around an explicit sphere pool.
    pub fn with_spheres(spheres: Vec<Sphere>, follow_radius: f32) -> Self {
        let corners = floor_corners();
        Self {
            spheres,
            light: Light::default(),
            camera: Camera::new(follow_radius),
            bike: BikePose::default(),
            score: 0,
            floor_plane: find_plane(corners[1], corners[2], corners[3]).normalized(),
        }
    }

    /// Hit-test targets for every targetable sphere, tagged with its pool index.
    pub fn pick_targets(&self) -> Vec<PickTarget> {
        self.spheres
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_targetable())
            .map(|(id, s)| PickTarget {
                id,
                center: s.draw_position(),
                radius: s.size,
            })
            .collect()
    }
}

/// Floor corners, counter-clockwise seen from above.
pub fn floor_corners() -> [Vec3; 4] {
    let s = FLOOR_HALF_SIZE;
    [
        Vec3::new(-s, FLOOR_Y, s),
        Vec3::new(s, FLOOR_Y, s),
        Vec3::new(s, FLOOR_Y, -s),
        Vec3::new(-s, FLOOR_Y, -s),
    ]
}

pub fn floor_mesh() -> MeshData {
    MeshData::floor(FLOOR_HALF_SIZE, FLOOR_Y, FLOOR_TILES)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_pool_is_deterministic_and_in_range() {
        let a = Scene::new(Some(42), 10.0);
        let b = Scene::new(Some(42), 10.0);
        assert_eq!(a.spheres, b.spheres);
        assert_eq!(a.spheres.len(), SPHERE_COUNT);
        for s in &a.spheres {
            assert!((-49.0..=50.0).contains(&s.position.x));
            assert!((-49.0..=50.0).contains(&s.position.z));
            assert_eq!(s.position.x.fract(), 0.0);
            assert_eq!(s.position.y, REST_HEIGHT);
            assert_eq!(s.size, SPHERE_SIZE);
            assert!(!s.dead && !s.selected);
        }
    }

    #[test]
    fn floor_plane_faces_up() {
        let scene = Scene::new(Some(1), 10.0);
        assert!((scene.floor_plane.normal() - Vec3::Y).length() < 1e-6);
        assert!((scene.floor_plane.d - 0.75).abs() < 1e-6);
    }

    #[test]
    fn targets_skip_shrunk_spheres_and_use_mirrored_positions() {
        let mut spheres = vec![Sphere::resting_at(3.0, -4.0), Sphere::resting_at(1.0, 1.0)];
        spheres[1].size = 0.0;
        let scene = Scene::with_spheres(spheres, 10.0);
        let targets = scene.pick_targets();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].id, 0);
        assert_eq!(targets[0].center, Vec3::new(-3.0, 2.0, 4.0));
        assert_eq!(targets[0].radius, 2.0);
    }

    #[test]
    fn light_orbits_unless_dragged() {
        let mut light = Light::default();
        light.advance();
        assert!((light.angle - LIGHT_STEP).abs() < 1e-6);
        light.dragging = true;
        light.advance();
        assert!((light.angle - LIGHT_STEP).abs() < 1e-6);

        let p = Light::default().position();
        assert_eq!(p, Vec4::new(40.0, 20.0, 0.0, 0.0));
    }

    #[test]
    fn drag_moves_light_and_keeps_it_above_floor() {
        let mut light = Light::default();
        light.drag(Vec2::new(40.0, -20.0));
        assert!((light.angle - 1.0).abs() < 1e-6);
        assert!((light.height - 21.0).abs() < 1e-6);
        light.drag(Vec2::new(0.0, 10_000.0));
        assert_eq!(light.height, LIGHT_MIN_HEIGHT);
    }

    #[test]
    fn respawn_waits_for_the_full_delay() {
        let t0 = Instant::now();
        let mut sphere = Sphere::resting_at(0.0, 0.0);
        sphere.kill(t0);
        assert!(!sphere.respawn_due(t0 + RESPAWN_DELAY));
        assert!(sphere.respawn_due(t0 + RESPAWN_DELAY + Duration::from_millis(1)));
    }
}
