//! Per-frame simulation: light orbit, sphere life-cycle, camera distance, falling.

use std::time::Instant;

use engine_core::distance;
use glam::Vec3;

use crate::scene::{Scene, Sphere, FALL_STEP, REST_HEIGHT, RESPAWN_HEIGHT, SHRINK_STEP, SPHERE_SIZE};

/// Advance the scene by one frame.
pub fn step(scene: &mut Scene, now: Instant) {
    scene.light.advance();
    let camera = scene.camera.position;
    for (index, sphere) in scene.spheres.iter_mut().enumerate() {
        update_sphere(index, sphere, camera, now);
    }
}

/// Life-cycle, distance and fall for one sphere, in that order.
fn update_sphere(index: usize, sphere: &mut Sphere, camera: Vec3, now: Instant) {
    let mut respawned = false;
    if sphere.dead {
        if sphere.size > 0.0 {
            sphere.size = (sphere.size - SHRINK_STEP).max(0.0);
        }
        if sphere.respawn_due(now) {
            sphere.dead = false;
            sphere.death_time = None;
            sphere.size = SPHERE_SIZE;
            sphere.position.y = RESPAWN_HEIGHT;
            respawned = true;
            log::debug!("Sphere {index} respawned");
        }
    }

    // Spheres are drawn at (-x, y, -z); measure in that frame.
    let mirrored_camera = Vec3::new(-camera.x, 0.0, -camera.z);
    sphere.distance = distance(mirrored_camera, sphere.position);

    // A fresh respawn starts falling next frame.
    if !respawned && sphere.position.y > REST_HEIGHT {
        sphere.position.y = (sphere.position.y - FALL_STEP).max(REST_HEIGHT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{LIGHT_STEP, RESPAWN_DELAY};
    use std::time::Duration;

    fn scene_with(spheres: Vec<Sphere>) -> Scene {
        Scene::with_spheres(spheres, 10.0)
    }

    #[test]
    fn dead_spheres_shrink_to_exactly_zero() {
        let t0 = Instant::now();
        let mut scene = scene_with(vec![Sphere::resting_at(0.0, 0.0)]);
        scene.spheres[0].kill(t0);
        for frame in 1..=25 {
            step(&mut scene, t0 + Duration::from_millis(frame));
            let size = scene.spheres[0].size;
            assert!((0.0..=SPHERE_SIZE).contains(&size));
        }
        assert_eq!(scene.spheres[0].size, 0.0);
        assert!(!scene.spheres[0].is_targetable());
        assert!(scene.spheres[0].dead);
    }

    #[test]
    fn respawn_drops_in_then_falls_to_rest() {
        let t0 = Instant::now();
        let mut scene = scene_with(vec![Sphere::resting_at(0.0, 0.0)]);
        scene.spheres[0].kill(t0);
        step(&mut scene, t0 + RESPAWN_DELAY);
        assert!(scene.spheres[0].dead);

        let later = t0 + RESPAWN_DELAY + Duration::from_millis(1);
        step(&mut scene, later);
        let sphere = &scene.spheres[0];
        assert!(!sphere.dead);
        assert_eq!(sphere.size, SPHERE_SIZE);
        assert_eq!(sphere.position.y, RESPAWN_HEIGHT);

        step(&mut scene, later);
        assert_eq!(scene.spheres[0].position.y, RESPAWN_HEIGHT - FALL_STEP);
        for _ in 0..200 {
            step(&mut scene, later);
        }
        assert_eq!(scene.spheres[0].position.y, REST_HEIGHT);
    }

    #[test]
    fn distance_uses_mirrored_camera() {
        let mut scene = scene_with(vec![Sphere::resting_at(3.0, 4.0)]);
        scene.camera.position = Vec3::new(-3.0, 5.0, -4.0);
        step(&mut scene, Instant::now());
        // Mirrored camera sits at (3, 0, 4): only the height separates them.
        assert!((scene.spheres[0].distance - REST_HEIGHT).abs() < 1e-6);
    }

    #[test]
    fn light_advances_each_step() {
        let mut scene = scene_with(Vec::new());
        step(&mut scene, Instant::now());
        step(&mut scene, Instant::now());
        assert!((scene.light.angle - 2.0 * LIGHT_STEP).abs() < 1e-6);
    }

    #[test]
    fn live_spheres_are_untouched() {
        let mut scene = scene_with(vec![Sphere::resting_at(-7.0, 9.0)]);
        let before = scene.spheres[0].clone();
        step(&mut scene, Instant::now());
        let after = &scene.spheres[0];
        assert_eq!(after.position, before.position);
        assert_eq!(after.size, before.size);
        assert!(!after.dead);
    }
}
