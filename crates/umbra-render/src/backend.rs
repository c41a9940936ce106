//! The surface through which the shadow volume sequencer drives a renderer.

use umbra_mesh::TriangleMesh;

use crate::camera::Camera;
use crate::scene::{MeshHandle, SceneObject};
use crate::state::PipelineState;

/// Planes affected by a clear.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClearTargets {
    pub color: bool,
    pub depth: bool,
    pub stencil: bool,
}

impl ClearTargets {
    pub const ALL: Self = Self {
        color: true,
        depth: true,
        stencil: true,
    };
    pub const STENCIL: Self = Self {
        color: false,
        depth: false,
        stencil: true,
    };

    pub fn any(self) -> bool {
        self.color || self.depth || self.stencil
    }

    /// Union of two clear requests.
    pub fn merge(self, other: Self) -> Self {
        Self {
            color: self.color || other.color,
            depth: self.depth || other.depth,
            stencil: self.stencil || other.stencil,
        }
    }
}

/// Commands a renderer accepts, in submission order.
///
/// Implementations must honor the exact order of calls: stencil and depth
/// results depend on which draw ran first.
pub trait RenderBackend {
    /// Value later stencil clears write.
    fn set_clear_stencil(&mut self, value: u8);

    fn clear(&mut self, targets: ClearTargets);

    /// Rasterizes `object` with the fixed-function state as it is right now.
    fn draw(&mut self, object: &SceneObject, camera: &Camera, state: &PipelineState);
}

/// Moves CPU geometry into a backend's own storage.
pub trait MeshUploader {
    fn upload_mesh(&mut self, label: &str, mesh: &TriangleMesh) -> MeshHandle;
}
