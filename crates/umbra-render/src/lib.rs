//! Stencil shadow volume rendering: pipeline state, pass sequencing and backends.
//!
//! [`ShadowVolumeRenderer`] drives any [`RenderBackend`]. Three backends are
//! provided: [`WgpuRenderer`] for the window, [`SoftwareRasterizer`] as a CPU
//! reference, and [`CommandRecorder`] for inspecting the command stream.

pub mod backend;
pub mod buffer;
pub mod camera;
pub mod depth;
pub mod gpu;
pub mod pass;
pub mod pipeline;
pub mod raster;
pub mod recorder;
pub mod renderer;
pub mod scene;
pub mod scope;
pub mod shadow_volume;
pub mod state;
pub mod surface;

pub use backend::{ClearTargets, MeshUploader, RenderBackend};
pub use buffer::{BufferAllocator, MeshBuffer, VertexPosition};
pub use camera::Camera;
pub use depth::DepthStencilBuffer;
pub use gpu::{RenderContext, RenderContextError, SurfaceError, init_render_context_blocking};
pub use pipeline::{DrawUniform, FLAT_SHADER_SOURCE, FlatPipelineCache};
pub use raster::SoftwareRasterizer;
pub use recorder::{CommandRecorder, RenderCommand};
pub use renderer::{WgpuFrame, WgpuRenderer};
pub use scene::{
    MeshHandle, Scene, SceneObject, ShadowVolume, VolumeScene, VolumeSceneBuilder,
    base_scene_from_config, volume_scene_from_config,
};
pub use scope::StateScope;
pub use shadow_volume::ShadowVolumeRenderer;
pub use state::{
    BlendFactor, BlendFunc, ColorMask, CompareFunction, CullFace, Face, PipelineState,
    StencilFaceOps, StencilFunc, StencilOp,
};
pub use surface::{PhysicalSize, Viewport};
