//! Geometry for the base scene and the shadow volumes.
//!
//! Produces plain CPU-side triangle meshes; uploading them to a backend is
//! the renderer's job.

pub mod extrude;
pub mod mesh;
pub mod parametric;
pub mod primitives;
pub mod transform;

pub use extrude::{extrude_polygon, signed_area};
pub use mesh::TriangleMesh;
pub use parametric::{parametric_surface, rolling_terrain};
pub use primitives::unit_cuboid;
pub use transform::Transform;
