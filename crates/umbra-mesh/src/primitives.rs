//! Simple closed solids.

use glam::Vec3;

use crate::TriangleMesh;

/// Unit cube centered at the origin with outward-facing winding.
pub fn unit_cuboid() -> TriangleMesh {
    let h = 0.5;
    let v = |x: f32, y: f32, z: f32| Vec3::new(x * h, y * h, z * h);

    let mut mesh = TriangleMesh::new();
    // +X
    mesh.push_quad(v(1., -1., 1.), v(1., -1., -1.), v(1., 1., -1.), v(1., 1., 1.));
    // -X
    mesh.push_quad(v(-1., -1., -1.), v(-1., -1., 1.), v(-1., 1., 1.), v(-1., 1., -1.));
    // +Y
    mesh.push_quad(v(-1., 1., 1.), v(1., 1., 1.), v(1., 1., -1.), v(-1., 1., -1.));
    // -Y
    mesh.push_quad(v(-1., -1., -1.), v(1., -1., -1.), v(1., -1., 1.), v(-1., -1., 1.));
    // +Z
    mesh.push_quad(v(-1., -1., 1.), v(1., -1., 1.), v(1., 1., 1.), v(-1., 1., 1.));
    // -Z
    mesh.push_quad(v(1., -1., -1.), v(-1., -1., -1.), v(-1., 1., -1.), v(1., 1., -1.));
    mesh
}
