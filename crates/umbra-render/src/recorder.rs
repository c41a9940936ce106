//! Backend that records commands instead of executing them.

use umbra_mesh::TriangleMesh;

use crate::backend::{ClearTargets, MeshUploader, RenderBackend};
use crate::camera::Camera;
use crate::scene::{MeshHandle, SceneObject};
use crate::state::PipelineState;

/// One submitted command together with the state it ran under.
#[derive(Clone, Debug, PartialEq)]
pub enum RenderCommand {
    SetClearStencil(u8),
    Clear(ClearTargets),
    Draw {
        mesh: MeshHandle,
        color: [f32; 4],
        state: PipelineState,
    },
}

/// Captures the exact command stream a frame produces.
#[derive(Debug, Default)]
pub struct CommandRecorder {
    commands: Vec<RenderCommand>,
    meshes: Vec<String>,
}

impl CommandRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    /// Takes the recorded commands, leaving the recorder empty.
    pub fn take(&mut self) -> Vec<RenderCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Pipeline states of the recorded draws, in order.
    pub fn draw_states(&self) -> Vec<PipelineState> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                RenderCommand::Draw { state, .. } => Some(*state),
                _ => None,
            })
            .collect()
    }

    /// Label a mesh was uploaded with.
    pub fn mesh_label(&self, handle: MeshHandle) -> Option<&str> {
        self.meshes.get(handle.0 as usize).map(String::as_str)
    }
}

impl RenderBackend for CommandRecorder {
    fn set_clear_stencil(&mut self, value: u8) {
        self.commands.push(RenderCommand::SetClearStencil(value));
    }

    fn clear(&mut self, targets: ClearTargets) {
        self.commands.push(RenderCommand::Clear(targets));
    }

    fn draw(&mut self, object: &SceneObject, _camera: &Camera, state: &PipelineState) {
        self.commands.push(RenderCommand::Draw {
            mesh: object.mesh,
            color: object.color,
            state: *state,
        });
    }
}

impl MeshUploader for CommandRecorder {
    fn upload_mesh(&mut self, label: &str, _mesh: &TriangleMesh) -> MeshHandle {
        self.meshes.push(label.to_string());
        MeshHandle(self.meshes.len() as u32 - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use umbra_mesh::Transform;

    #[test]
    fn test_recorder_captures_state_snapshot() {
        let mut recorder = CommandRecorder::new();
        let handle = recorder.upload_mesh("cube", &umbra_mesh::unit_cuboid());
        let object = SceneObject {
            mesh: handle,
            transform: Transform::IDENTITY,
            color: [1.0; 4],
        };
        let mut state = PipelineState::BASELINE;
        state.set_depth_write(false);
        recorder.draw(&object, &Camera::default(), &state);
        state.set_depth_write(true);

        assert_eq!(recorder.draw_states().len(), 1);
        assert!(!recorder.draw_states()[0].depth_write());
        assert_eq!(recorder.mesh_label(handle), Some("cube"));
    }

    #[test]
    fn test_take_empties_recorder() {
        let mut recorder = CommandRecorder::new();
        recorder.clear(ClearTargets::ALL);
        assert_eq!(recorder.take(), vec![RenderCommand::Clear(ClearTargets::ALL)]);
        assert!(recorder.commands().is_empty());
    }
}
