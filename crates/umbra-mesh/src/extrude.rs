//! Extrusion of closed x/z outlines into prisms along the Y axis.
//!
//! The caps are triangle fans anchored at the first path point, so concave
//! or bridged outlines (an outer loop joined to a reversed inner loop) give
//! overlapping fan triangles. Their signed contributions cancel under
//! wrap-counted stencil rasterization, which is all a shadow volume needs.

use glam::{Vec2, Vec3};

use crate::TriangleMesh;

/// Signed area of a closed x/z path. Positive for `x -> z` rotation order.
pub fn signed_area(path: &[Vec2]) -> f32 {
    let n = path.len();
    (0..n)
        .map(|i| path[i].perp_dot(path[(i + 1) % n]))
        .sum::<f32>()
        * 0.5
}

/// Extrudes `path` (x, z pairs) between `low` and `high` on the Y axis.
///
/// Emits a top fan, a bottom fan and one side quad per edge, including the
/// closing edge from the last point back to the first. Winding is picked
/// from the path orientation so the solid always faces outward. Paths with
/// fewer than three points produce an empty mesh.
pub fn extrude_polygon(path: &[Vec2], low: f32, high: f32) -> TriangleMesh {
    let mut mesh = TriangleMesh::new();
    if path.len() < 3 {
        return mesh;
    }

    let at = |p: Vec2, y: f32| Vec3::new(p.x, y, p.y);
    let positive = signed_area(path) > 0.0;
    let origin = path[0];

    for pair in path[1..].windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if positive {
            mesh.push_triangle(at(origin, high), at(b, high), at(a, high));
            mesh.push_triangle(at(origin, low), at(a, low), at(b, low));
        } else {
            mesh.push_triangle(at(origin, high), at(a, high), at(b, high));
            mesh.push_triangle(at(origin, low), at(b, low), at(a, low));
        }
    }

    let n = path.len();
    for i in 0..n {
        let (a, b) = (path[i], path[(i + 1) % n]);
        if positive {
            mesh.push_quad(at(b, low), at(a, low), at(a, high), at(b, high));
        } else {
            mesh.push_quad(at(a, low), at(b, low), at(b, high), at(a, high));
        }
    }

    mesh
}
