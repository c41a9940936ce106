//! Stencil shadow volume frame sequencing.
//!
//! Each volume is handled by two draws of its own mesh:
//!
//! 1. **Mark**: color and depth writes off, both faces rasterized, per-face
//!    stencil ops counting how many volume surfaces lie between the eye and
//!    the visible scene (Z-pass) or behind it (Z-fail).
//! 2. **Composite**: the tint is blended wherever the count differs from the
//!    stencil default, and the touched pixels are reset to the default.
//!
//! Volumes are processed one after another, mark and composite together, so
//! the blended result of overlapping volumes depends on their order.

use umbra_config::{RenderConfig, ShadowAlgorithm};

use crate::backend::{ClearTargets, RenderBackend};
use crate::camera::Camera;
use crate::scene::{Scene, ShadowVolume, VolumeScene};
use crate::scope::StateScope;
use crate::state::{
    BlendFactor, ColorMask, CompareFunction, CullFace, Face, PipelineState, StencilFaceOps,
    StencilOp,
};

/// Per-strategy differences between Z-fail and Z-pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct VolumeRecipe {
    front: StencilFaceOps,
    back: StencilFaceOps,
    composite_depth: CompareFunction,
    composite_cull: CullFace,
}

impl VolumeRecipe {
    const Z_FAIL: Self = Self {
        front: StencilFaceOps::new(StencilOp::Keep, StencilOp::IncrementWrap, StencilOp::Keep),
        back: StencilFaceOps::new(StencilOp::Keep, StencilOp::DecrementWrap, StencilOp::Keep),
        composite_depth: CompareFunction::GreaterEqual,
        composite_cull: CullFace::Front,
    };

    const Z_PASS: Self = Self {
        front: StencilFaceOps::new(StencilOp::Keep, StencilOp::Keep, StencilOp::IncrementWrap),
        back: StencilFaceOps::new(StencilOp::Keep, StencilOp::Keep, StencilOp::DecrementWrap),
        composite_depth: CompareFunction::Less,
        composite_cull: CullFace::Back,
    };

    fn for_algorithm(algorithm: ShadowAlgorithm) -> Self {
        match algorithm {
            ShadowAlgorithm::ZFail => Self::Z_FAIL,
            ShadowAlgorithm::ZPass => Self::Z_PASS,
        }
    }
}

/// Drives a [`RenderBackend`] through the shadow volume frame.
///
/// Owns the pipeline state; it is at baseline between frames.
#[derive(Debug)]
pub struct ShadowVolumeRenderer {
    state: PipelineState,
    algorithm: ShadowAlgorithm,
    stencil_default: u8,
}

impl ShadowVolumeRenderer {
    pub fn new(algorithm: ShadowAlgorithm, stencil_default: u8) -> Self {
        Self {
            state: PipelineState::BASELINE,
            algorithm,
            stencil_default,
        }
    }

    pub fn from_config(config: &RenderConfig) -> Self {
        Self::new(config.shadow_algorithm, config.stencil_default)
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    pub fn algorithm(&self) -> ShadowAlgorithm {
        self.algorithm
    }

    /// Takes effect from the next volume processed.
    pub fn set_algorithm(&mut self, algorithm: ShadowAlgorithm) {
        self.algorithm = algorithm;
    }

    pub fn stencil_default(&self) -> u8 {
        self.stencil_default
    }

    pub fn set_stencil_default(&mut self, value: u8) {
        self.stencil_default = value;
    }

    /// Renders one complete frame.
    ///
    /// `time_ms` is the frame timestamp; time-dependent transforms are
    /// expected to have been applied to `base` and `volumes` already.
    pub fn render_frame<B: RenderBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        base: &Scene,
        volumes: &VolumeScene,
        camera: &Camera,
        time_ms: f64,
    ) {
        log::trace!(
            "frame at {time_ms:.1} ms: {} base objects, {} volumes ({:?})",
            base.len(),
            volumes.len(),
            self.algorithm
        );

        backend.clear(ClearTargets::ALL);

        self.state.set_cull_face(CullFace::Back);
        for object in base.objects() {
            backend.draw(object, camera, &self.state);
        }

        backend.set_clear_stencil(self.stencil_default);
        backend.clear(ClearTargets::STENCIL);

        let recipe = VolumeRecipe::for_algorithm(self.algorithm);
        for volume in volumes.volumes() {
            self.mark_pass(backend, volume, camera, recipe);
            self.composite_pass(backend, volume, camera, recipe);
        }

        debug_assert!(self.state.is_baseline(), "pipeline state leaked: {:?}", self.state);
    }

    fn mark_pass<B: RenderBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        volume: &ShadowVolume,
        camera: &Camera,
        recipe: VolumeRecipe,
    ) {
        let mut state = StateScope::enter(&mut self.state);

        state.set_stencil_func(CompareFunction::Always, 0, 0xFF);
        let VolumeRecipe { front, back, .. } = recipe;
        state.set_stencil_op_separate(Face::Front, front.fail, front.depth_fail, front.pass);
        state.set_stencil_op_separate(Face::Back, back.fail, back.depth_fail, back.pass);
        state.set_depth_write(false);
        state.set_stencil_test(true);
        state.set_cull_enabled(false);
        state.set_color_mask(ColorMask::NONE);
        state.set_cull_face(CullFace::None);

        backend.draw(&volume.as_object(), camera, &state);

        state.set_color_mask(ColorMask::ALL);
        state.set_cull_enabled(true);
        state.set_stencil_test(false);
        state.set_depth_write(true);
    }

    fn composite_pass<B: RenderBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        volume: &ShadowVolume,
        camera: &Camera,
        recipe: VolumeRecipe,
    ) {
        let stencil_default = self.stencil_default;
        let mut state = StateScope::enter(&mut self.state);

        state.set_blend_enabled(true);
        state.set_blend_func(BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha);
        state.set_stencil_func(CompareFunction::NotEqual, stencil_default, 0xFF);
        state.set_depth_func(recipe.composite_depth);
        state.set_stencil_test(true);
        state.set_stencil_op(StencilOp::Keep, StencilOp::Keep, StencilOp::Replace);
        state.set_depth_write(false);
        state.set_cull_face(recipe.composite_cull);

        backend.draw(&volume.as_object(), camera, &state);

        state.set_depth_write(true);
        state.set_stencil_test(false);
        state.set_blend_func(BlendFactor::One, BlendFactor::Zero);
        state.set_depth_func(CompareFunction::Less);
        state.set_blend_enabled(false);
    }
}

impl Default for ShadowVolumeRenderer {
    fn default() -> Self {
        Self::from_config(&RenderConfig::default())
    }
}
