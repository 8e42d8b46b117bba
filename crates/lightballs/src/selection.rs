//! Crosshair preselection and firing, on top of a [`Picker`].

use std::time::Instant;

use glam::Vec2;
use renderer::Picker;

use crate::scene::{Scene, KILL_SCORE};

/// Hit-test targetable spheres at `point` with the current camera.
fn hits_at<P: Picker + ?Sized>(scene: &Scene, picker: &mut P, viewport: Vec2, point: Vec2) -> Vec<usize> {
    let targets = scene.pick_targets();
    if targets.is_empty() {
        return Vec::new();
    }
    picker.pick(scene.camera.view_projection_matrix(), viewport, point, &targets)
}

/// Mark exactly the spheres under the viewport centre as selected.
pub fn preselect<P: Picker + ?Sized>(scene: &mut Scene, picker: &mut P, viewport: Vec2) {
    let hits = hits_at(scene, picker, viewport, viewport / 2.0);
    for sphere in &mut scene.spheres {
        sphere.selected = false;
    }
    for id in hits {
        if let Some(sphere) = scene.spheres.get_mut(id) {
            sphere.selected = true;
        }
    }
}

/// Where a click shoots: the pointer, or the viewport centre when firing at
/// the crosshair or before the pointer has entered the window.
pub fn aim_point(cursor: Option<Vec2>, viewport: Vec2, at_crosshair: bool) -> Vec2 {
    match cursor {
        Some(cursor) if !at_crosshair => cursor,
        _ => viewport / 2.0,
    }
}

/// Kill every sphere under `point`. Returns the number of kills.
pub fn fire<P: Picker + ?Sized>(scene: &mut Scene, picker: &mut P, viewport: Vec2, point: Vec2, now: Instant) -> usize {
    let hits = hits_at(scene, picker, viewport, point);
    let mut kills = 0;
    for id in hits {
        let Some(sphere) = scene.spheres.get_mut(id) else {
            continue;
        };
        if !sphere.is_targetable() {
            continue;
        }
        sphere.kill(now);
        scene.score += KILL_SCORE;
        kills += 1;
        log::debug!("Sphere {id} hit, score {}", scene.score);
    }
    kills
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Sphere, RESPAWN_DELAY};
    use crate::simulation;
    use glam::Vec3;
    use renderer::AnalyticPicker;
    use std::time::Duration;

    const VIEWPORT: Vec2 = Vec2::new(800.0, 600.0);

    /// One sphere drawn at (0, 2, 0) in front of the camera, decoys far behind it.
    fn target_scene() -> Scene {
        let mut spheres = vec![Sphere::resting_at(0.0, 0.0)];
        for x in [-20.0, 0.0, 20.0] {
            spheres.push(Sphere::resting_at(x, -150.0));
        }
        let mut scene = Scene::with_spheres(spheres, 10.0);
        scene.camera.set_aspect(VIEWPORT.x as u32, VIEWPORT.y as u32);
        scene
    }

    fn screen_point(scene: &Scene, world: Vec3) -> Vec2 {
        let clip = scene.camera.view_projection_matrix() * world.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        Vec2::new((ndc.x + 1.0) * 0.5 * VIEWPORT.x, (1.0 - ndc.y) * 0.5 * VIEWPORT.y)
    }

    #[test]
    fn firing_at_a_sphere_scores_once() {
        let mut scene = target_scene();
        let mut picker = AnalyticPicker;
        let t0 = Instant::now();
        let point = screen_point(&scene, scene.spheres[0].draw_position());

        assert_eq!(fire(&mut scene, &mut picker, VIEWPORT, point, t0), 1);
        assert_eq!(scene.score, KILL_SCORE);
        assert!(scene.spheres[0].dead);
        assert_eq!(scene.spheres[0].death_time, Some(t0));
        assert!(scene.spheres[1..].iter().all(|s| !s.dead));

        for frame in 1..=10 {
            let now = t0 + Duration::from_millis(16 * frame);
            simulation::step(&mut scene, now);
            preselect(&mut scene, &mut picker, VIEWPORT);
        }
        assert_eq!(scene.score, KILL_SCORE);
    }

    #[test]
    fn seeded_pool_sphere_scores_once() {
        let mut scene = Scene::new(Some(7), 10.0);
        scene.camera.set_aspect(VIEWPORT.x as u32, VIEWPORT.y as u32);
        let mut picker = AnalyticPicker;
        let targets = scene.pick_targets();

        // First sphere on screen that nothing else overlaps at its centre.
        let (id, point) = scene
            .spheres
            .iter()
            .enumerate()
            .filter_map(|(id, s)| {
                let clip = scene.camera.view_projection_matrix() * s.draw_position().extend(1.0);
                (clip.w > 0.0).then(|| (id, screen_point(&scene, s.draw_position())))
            })
            .find(|&(id, p)| {
                let on_screen = p.x >= 0.0 && p.y >= 0.0 && p.x < VIEWPORT.x && p.y < VIEWPORT.y;
                on_screen && picker.pick(scene.camera.view_projection_matrix(), VIEWPORT, p, &targets) == vec![id]
            })
            .expect("seed 7 puts a sphere on screen");

        let t0 = Instant::now();
        assert_eq!(fire(&mut scene, &mut picker, VIEWPORT, point, t0), 1);
        assert_eq!(scene.score, KILL_SCORE);
        assert!(scene.spheres[id].dead);
        assert_eq!(scene.spheres.iter().filter(|s| s.dead).count(), 1);

        for frame in 1..=30 {
            simulation::step(&mut scene, t0 + Duration::from_millis(16 * frame));
            preselect(&mut scene, &mut picker, VIEWPORT);
        }
        assert_eq!(scene.score, KILL_SCORE);
    }

    #[test]
    fn respawn_counts_from_the_click() {
        let mut scene = target_scene();
        let mut picker = AnalyticPicker;
        let frame = Instant::now();
        simulation::step(&mut scene, frame);
        let clicked = frame + Duration::from_millis(12);
        let point = screen_point(&scene, scene.spheres[0].draw_position());
        fire(&mut scene, &mut picker, VIEWPORT, point, clicked);
        assert_eq!(scene.spheres[0].death_time, Some(clicked));

        simulation::step(&mut scene, clicked + RESPAWN_DELAY);
        assert!(scene.spheres[0].dead);
        simulation::step(&mut scene, clicked + RESPAWN_DELAY + Duration::from_millis(1));
        assert!(!scene.spheres[0].dead);
    }

    #[test]
    fn aim_point_prefers_the_pointer() {
        let cursor = Some(Vec2::new(10.0, 20.0));
        assert_eq!(aim_point(cursor, VIEWPORT, false), Vec2::new(10.0, 20.0));
        assert_eq!(aim_point(cursor, VIEWPORT, true), Vec2::new(400.0, 300.0));
        assert_eq!(aim_point(None, VIEWPORT, false), Vec2::new(400.0, 300.0));
    }

    #[test]
    fn missing_scores_nothing() {
        let mut scene = target_scene();
        let mut picker = AnalyticPicker;
        assert_eq!(fire(&mut scene, &mut picker, VIEWPORT, Vec2::new(5.0, 5.0), Instant::now()), 0);
        assert_eq!(scene.score, 0);
    }

    #[test]
    fn shrunk_spheres_cannot_be_hit() {
        let mut scene = target_scene();
        let mut picker = AnalyticPicker;
        let point = screen_point(&scene, scene.spheres[0].draw_position());
        scene.spheres[0].size = 0.0;
        assert_eq!(fire(&mut scene, &mut picker, VIEWPORT, point, Instant::now()), 0);
        preselect(&mut scene, &mut picker, VIEWPORT);
        assert!(!scene.spheres[0].selected);
    }

    #[test]
    fn preselect_tracks_the_crosshair() {
        let mut scene = target_scene();
        let mut picker = AnalyticPicker;
        // The default camera looks past the target.
        preselect(&mut scene, &mut picker, VIEWPORT);
        assert!(scene.spheres.iter().all(|s| !s.selected));

        // Move the target under the crosshair by placing it on the centre ray.
        let eye = scene.camera.eye_position();
        let inverse = scene.camera.view_projection_matrix().inverse();
        let far = inverse.project_point3(Vec3::new(0.0, 0.0, 1.0));
        let on_ray = eye + (far - eye).normalize() * 40.0;
        scene.spheres[0].position = Vec3::new(-on_ray.x, on_ray.y, -on_ray.z);
        preselect(&mut scene, &mut picker, VIEWPORT);
        assert!(scene.spheres[0].selected);
        assert!(scene.spheres[1..].iter().all(|s| !s.selected));

        // Moving it away clears the flag on the next frame.
        scene.spheres[0].position.y += 50.0;
        preselect(&mut scene, &mut picker, VIEWPORT);
        assert!(!scene.spheres[0].selected);
    }
}
