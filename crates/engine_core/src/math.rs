//! Vector and plane helpers for planar reflections and projected shadows.

use glam::{Mat4, Vec3, Vec4};

/// Euclidean distance between two points.
pub fn distance(a: Vec3, b: Vec3) -> f32 {
    (a - b).length()
}

/// Plane `a*x + b*y + c*z + d = 0`. The normal `(a, b, c)` is not normalized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
}

impl Plane {
    pub fn new(a: f32, b: f32, c: f32, d: f32) -> Self {
        Self { a, b, c, d }
    }

    /// Plane normal as stored (not normalized).
    pub fn normal(&self) -> Vec3 {
        Vec3::new(self.a, self.b, self.c)
    }

    /// Same plane scaled so the normal has unit length.
    pub fn normalized(&self) -> Self {
        let len = self.normal().length();
        if len <= f32::EPSILON {
            return *self;
        }
        Self::new(self.a / len, self.b / len, self.c / len, self.d / len)
    }

    /// Signed distance in units of the stored normal length.
    pub fn signed_distance(&self, p: Vec3) -> f32 {
        self.normal().dot(p) + self.d
    }

    pub fn as_vec4(&self) -> Vec4 {
        Vec4::new(self.a, self.b, self.c, self.d)
    }
}

/// Plane through three points.
///
/// Uses the edges `v1 - v0` and `v2 - v0`. The B term is written as the
/// negated `x*z` minor, which is the cross product's y component.
pub fn find_plane(v0: Vec3, v1: Vec3, v2: Vec3) -> Plane {
    let e0 = v1 - v0;
    let e1 = v2 - v0;

    let a = e0.y * e1.z - e0.z * e1.y;
    let b = -(e0.x * e1.z - e0.z * e1.x);
    let c = e0.x * e1.y - e0.y * e1.x;
    let d = -(a * v0.x + b * v0.y + c * v0.z);

    Plane::new(a, b, c, d)
}

/// Projective matrix that flattens geometry onto `ground` along rays from `light`.
///
/// `light.w == 0` gives a directional (parallel) projection. Entry `[j][i]`
/// (column `j`, row `i`) is `-light[i] * ground[j]`, plus `ground · light`
/// on the diagonal.
pub fn shadow_matrix(ground: Plane, light: Vec4) -> Mat4 {
    let g = ground.as_vec4().to_array();
    let l = light.to_array();
    let dot = ground.as_vec4().dot(light);

    let mut cols = [[0.0f32; 4]; 4];
    for (j, col) in cols.iter_mut().enumerate() {
        for (i, entry) in col.iter_mut().enumerate() {
            *entry = -l[i] * g[j];
            if i == j {
                *entry += dot;
            }
        }
    }
    Mat4::from_cols_array_2d(&cols)
}

/// Mirror across the horizontal plane `y = plane_y`.
pub fn reflection_matrix(plane_y: f32) -> Mat4 {
    Mat4::from_translation(Vec3::new(0.0, 2.0 * plane_y, 0.0)) * Mat4::from_scale(Vec3::new(1.0, -1.0, 1.0))
}

/// Mirror a light position (point or direction) across `y = plane_y`.
pub fn reflect_light(light: Vec4, plane_y: f32) -> Vec4 {
    reflection_matrix(plane_y) * light
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).abs().max_element() < 1e-4
    }

    #[test]
    fn distance_uses_all_axes() {
        let d = distance(Vec3::new(1.0, 2.0, 3.0), Vec3::new(4.0, 6.0, 3.0));
        assert!((d - 5.0).abs() < 1e-6);
        assert!((distance(Vec3::ZERO, Vec3::new(0.0, 0.0, -2.0)) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn find_plane_floor_corners_point_up() {
        // Floor corners 1..3 of the classic 40x40 floor at y = 0.
        let plane = find_plane(
            Vec3::new(20.0, 0.0, 20.0),
            Vec3::new(20.0, 0.0, -20.0),
            Vec3::new(-20.0, 0.0, -20.0),
        );
        assert_eq!(plane.a, 0.0);
        assert_eq!(plane.c, 0.0);
        assert_eq!(plane.d, 0.0);
        assert!(plane.b > 0.0);
        assert!(approx(plane.normalized().normal(), Vec3::Y));
    }

    #[test]
    fn find_plane_offset_floor() {
        let y = -0.75;
        let plane = find_plane(
            Vec3::new(50.0, y, 50.0),
            Vec3::new(50.0, y, -50.0),
            Vec3::new(-50.0, y, -50.0),
        )
        .normalized();
        assert!(approx(plane.normal(), Vec3::Y));
        assert!((plane.d - 0.75).abs() < 1e-5);
        assert!(plane.signed_distance(Vec3::new(3.0, y, -7.0)).abs() < 1e-5);
    }

    #[test]
    fn shadow_matrix_fixes_floor_points() {
        let ground = Plane::new(0.0, 1.0, 0.0, 0.75);
        let light = Vec4::new(40.0, 20.0, 0.0, 0.0);
        let m = shadow_matrix(ground, light);

        for corner in [
            Vec3::new(20.0, -0.75, 20.0),
            Vec3::new(-20.0, -0.75, 20.0),
            Vec3::new(-20.0, -0.75, -20.0),
        ] {
            let projected = m.project_point3(corner);
            assert!(approx(projected, corner), "{projected:?} != {corner:?}");
        }
    }

    #[test]
    fn shadow_matrix_flattens_onto_plane() {
        let ground = Plane::new(0.0, 1.0, 0.0, 0.75);
        let light = Vec4::new(40.0, 20.0, 0.0, 0.0);
        let m = shadow_matrix(ground, light);

        let p = m.project_point3(Vec3::new(3.0, 10.0, -4.0));
        assert!((p.y + 0.75).abs() < 1e-4);
        // Parallel projection along the light direction: 10.75 units down moves x by -21.5.
        assert!((p.x - (3.0 - 21.5)).abs() < 1e-3);
        assert!((p.z + 4.0).abs() < 1e-4);
    }

    #[test]
    fn shadow_matrix_index_convention() {
        let ground = Plane::new(0.0, 1.0, 0.0, 0.75);
        let light = Vec4::new(40.0, 20.0, 0.0, 0.0);
        let cols = shadow_matrix(ground, light).to_cols_array_2d();
        let dot = 20.0;
        // Column 1 (ground.b = 1) carries -light[i] off the diagonal.
        assert_eq!(cols[1][0], -40.0);
        assert_eq!(cols[1][1], dot - 20.0);
        assert_eq!(cols[0][1], 0.0);
        assert_eq!(cols[3][0], -40.0 * 0.75);
        assert_eq!(cols[3][3], dot);
    }

    #[test]
    fn reflection_mirrors_about_floor() {
        let m = reflection_matrix(-0.75);
        let p = m.transform_point3(Vec3::new(1.0, 2.0, 3.0));
        assert!(approx(p, Vec3::new(1.0, -3.5, 3.0)));
        let l = reflect_light(Vec4::new(40.0, 20.0, 0.0, 0.0), -0.75);
        assert_eq!(l, Vec4::new(40.0, -20.0, 0.0, 0.0));
    }
}
