//! Mesh data structures and primitive generation.

use crate::vertex::Vertex;
use glam::Vec3;
use std::f32::consts::{PI, TAU};
use wgpu::util::DeviceExt;

/// A GPU mesh with vertex and index buffers.
pub struct Mesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_indices: u32,
}

impl Mesh {
    /// Create a mesh from vertex and index data.
    pub fn new(device: &wgpu::Device, label: &str, vertices: &[Vertex], indices: &[u32]) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Vertex Buffer")),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Index Buffer")),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            vertex_buffer,
            index_buffer,
            num_indices: indices.len() as u32,
        }
    }
}

/// Mesh data before GPU upload. Front faces wind counter-clockwise.
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn upload(&self, device: &wgpu::Device, label: &str) -> Mesh {
        Mesh::new(device, label, &self.vertices, &self.indices)
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Unit cube centered at origin.
    pub fn cube() -> Self {
        let mut data = Self::default();
        // (normal, u axis, v axis) per face; u x v == normal keeps winding CCW.
        let faces = [
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
            (Vec3::Y, Vec3::X, Vec3::NEG_Z),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::X, Vec3::NEG_Z, Vec3::Y),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        ];
        for (normal, u, v) in faces {
            let base = data.vertices.len() as u32;
            for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                let p = (normal + u * su + v * sv) * 0.5;
                let uv = [(su + 1.0) * 0.5, (1.0 - sv) * 0.5];
                data.vertices.push(Vertex::new(p.into(), normal.into(), uv));
            }
            data.indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
        data
    }

    /// Unit-radius UV sphere.
    pub fn sphere(segments: u32, rings: u32) -> Self {
        let mut data = Self::default();

        for ring in 0..=rings {
            let phi = PI * ring as f32 / rings as f32;
            let (ring_radius, y) = phi.sin_cos();
            for segment in 0..=segments {
                let theta = TAU * segment as f32 / segments as f32;
                let p = Vec3::new(ring_radius * theta.cos(), y, ring_radius * theta.sin());
                let uv = [segment as f32 / segments as f32, ring as f32 / rings as f32];
                data.vertices.push(Vertex::new(p.into(), p.normalize_or_zero().into(), uv));
            }
        }

        let stride = segments + 1;
        for ring in 0..rings {
            for segment in 0..segments {
                let current = ring * stride + segment;
                let below = current + stride;
                data.indices.extend_from_slice(&[current, current + 1, below]);
                data.indices.extend_from_slice(&[current + 1, below + 1, below]);
            }
        }
        data
    }

    /// Torus lying in the XY plane around the Z axis.
    pub fn torus(ring_radius: f32, tube_radius: f32, sides: u32, rings: u32) -> Self {
        let mut data = Self::default();

        for ring in 0..=rings {
            let u = TAU * ring as f32 / rings as f32;
            let (su, cu) = u.sin_cos();
            for side in 0..=sides {
                let v = TAU * side as f32 / sides as f32;
                let (sv, cv) = v.sin_cos();
                let normal = Vec3::new(cv * cu, cv * su, sv);
                let p = Vec3::new(ring_radius * cu, ring_radius * su, 0.0) + normal * tube_radius;
                let uv = [ring as f32 / rings as f32, side as f32 / sides as f32];
                data.vertices.push(Vertex::new(p.into(), normal.into(), uv));
            }
        }

        let stride = sides + 1;
        for ring in 0..rings {
            for side in 0..sides {
                let a = ring * stride + side;
                let b = a + stride;
                data.indices.extend_from_slice(&[a, b, a + 1]);
                data.indices.extend_from_slice(&[b, b + 1, a + 1]);
            }
        }
        data
    }

    /// Square floor at height `y`, facing up, with UVs repeating `tiles` times.
    pub fn floor(half_size: f32, y: f32, tiles: f32) -> Self {
        let s = half_size;
        let up = [0.0, 1.0, 0.0];
        let vertices = vec![
            Vertex::new([-s, y, -s], up, [0.0, 0.0]),
            Vertex::new([-s, y, s], up, [0.0, tiles]),
            Vertex::new([s, y, s], up, [tiles, tiles]),
            Vertex::new([s, y, -s], up, [tiles, 0.0]),
        ];
        Self {
            vertices,
            indices: vec![0, 1, 2, 0, 2, 3],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every triangle's geometric normal agrees with its vertex normals.
    fn assert_outward(data: &MeshData) {
        for tri in data.indices.chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| data.vertices[i as usize]);
            let pa = Vec3::from(a.position);
            let face = (Vec3::from(b.position) - pa).cross(Vec3::from(c.position) - pa);
            if face.length_squared() < 1e-12 {
                continue; // collapsed pole triangles
            }
            let n = Vec3::from(a.normal) + Vec3::from(b.normal) + Vec3::from(c.normal);
            assert!(face.dot(n) > 0.0, "inward triangle {tri:?}");
        }
    }

    #[test]
    fn sphere_is_unit_and_outward() {
        let sphere = MeshData::sphere(20, 20);
        assert_eq!(sphere.vertices.len(), 21 * 21);
        assert_eq!(sphere.triangle_count(), 20 * 20 * 2);
        for v in &sphere.vertices {
            assert!((Vec3::from(v.position).length() - 1.0).abs() < 1e-5);
        }
        assert_outward(&sphere);
    }

    #[test]
    fn torus_is_outward() {
        let torus = MeshData::torus(0.25, 0.25, 10, 10);
        assert_eq!(torus.triangle_count(), 10 * 10 * 2);
        assert_outward(&torus);
    }

    #[test]
    fn cube_is_outward() {
        let cube = MeshData::cube();
        assert_eq!(cube.vertices.len(), 24);
        assert_outward(&cube);
        for v in &cube.vertices {
            assert_eq!(Vec3::from(v.position).abs().max_element(), 0.5);
        }
    }

    #[test]
    fn floor_faces_up() {
        let floor = MeshData::floor(50.0, -0.75, 32.0);
        assert_outward(&floor);
        assert!(floor.vertices.iter().all(|v| v.position[1] == -0.75));
        assert_eq!(floor.vertices[2].tex_coords, [32.0, 32.0]);
    }
}
