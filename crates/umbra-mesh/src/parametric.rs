//! Grid surfaces sampled from a `(u, v) -> position` function.

use glam::Vec3;

use crate::TriangleMesh;

/// Samples `f` on a `(slices + 1) × (stacks + 1)` grid over `[0, 1]²`.
///
/// `u` runs along slices and `v` along stacks. Each cell emits the
/// triangles `(a, b, d)` and `(b, c, d)` where `a = (u, v)`,
/// `b = (u + du, v)`, `c = (u + du, v + dv)`, `d = (u, v + dv)`.
pub fn parametric_surface(
    slices: u32,
    stacks: u32,
    f: impl Fn(f32, f32) -> Vec3,
) -> TriangleMesh {
    let slices = slices.max(1);
    let stacks = stacks.max(1);
    let row = slices + 1;

    let mut mesh = TriangleMesh::new();
    mesh.positions.reserve((row * (stacks + 1)) as usize);
    for i in 0..=stacks {
        let v = i as f32 / stacks as f32;
        for j in 0..=slices {
            let u = j as f32 / slices as f32;
            mesh.push_vertex(f(u, v));
        }
    }

    mesh.indices.reserve((slices * stacks * 6) as usize);
    for i in 0..stacks {
        for j in 0..slices {
            let a = i * row + j;
            let b = i * row + j + 1;
            let c = (i + 1) * row + j + 1;
            let d = (i + 1) * row + j;
            mesh.indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }
    mesh
}

/// The rolling 5×5 terrain patch centered on the origin, facing +Y.
pub fn rolling_terrain(segments: u32) -> TriangleMesh {
    parametric_surface(segments, segments, |u, v| {
        Vec3::new(
            -((u - 0.5) * 5.0),
            ((u * u * 6.0).sin() - (v * v * 6.0).sin()) * 0.2,
            (v - 0.5) * 5.0,
        )
    })
}
