//! Indexed triangle list shared by every geometry generator.

use glam::Vec3;

/// Indexed triangle mesh.
///
/// Triangles wind counter-clockwise when seen from the side they face.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TriangleMesh {
    /// Vertex positions in object space.
    pub positions: Vec<[f32; 3]>,
    /// Triangle indices, 3 per triangle.
    pub indices: Vec<u32>,
}

impl TriangleMesh {
    /// Creates an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a vertex and returns its index.
    pub fn push_vertex(&mut self, position: Vec3) -> u32 {
        let index = self.positions.len() as u32;
        self.positions.push(position.to_array());
        index
    }

    /// Appends a triangle with its own three vertices.
    pub fn push_triangle(&mut self, a: Vec3, b: Vec3, c: Vec3) {
        let ia = self.push_vertex(a);
        let ib = self.push_vertex(b);
        let ic = self.push_vertex(c);
        self.indices.extend_from_slice(&[ia, ib, ic]);
    }

    /// Appends a planar quad `a b c d` as the triangles `a b c` and `a c d`.
    pub fn push_quad(&mut self, a: Vec3, b: Vec3, c: Vec3, d: Vec3) {
        let base = self.positions.len() as u32;
        for p in [a, b, c, d] {
            self.positions.push(p.to_array());
        }
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Iterates triangles as position triples.
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).map(|tri| {
            [
                Vec3::from_array(self.positions[tri[0] as usize]),
                Vec3::from_array(self.positions[tri[1] as usize]),
                Vec3::from_array(self.positions[tri[2] as usize]),
            ]
        })
    }

    /// Reverses the winding of every triangle.
    pub fn flip_winding(&mut self) {
        for tri in self.indices.chunks_exact_mut(3) {
            tri.swap(1, 2);
        }
    }

    /// Signed enclosed volume. Positive when the mesh is closed and wound outward.
    pub fn signed_volume(&self) -> f32 {
        self.triangles()
            .map(|[a, b, c]| a.dot(b.cross(c)) / 6.0)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_quad_emits_two_triangles() {
        let mut mesh = TriangleMesh::new();
        mesh.push_quad(Vec3::ZERO, Vec3::X, Vec3::X + Vec3::Y, Vec3::Y);
        assert_eq!(mesh.positions.len(), 4);
        assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(mesh.triangle_count(), 2);
    }

    #[test]
    fn test_flip_winding_negates_volume() {
        let mut mesh = crate::unit_cuboid();
        let before = mesh.signed_volume();
        mesh.flip_winding();
        assert!((mesh.signed_volume() + before).abs() < 1e-6);
    }

    #[test]
    fn test_empty_mesh() {
        let mesh = TriangleMesh::new();
        assert_eq!(mesh.triangle_count(), 0);
        assert_eq!(mesh.signed_volume(), 0.0);
    }
}
