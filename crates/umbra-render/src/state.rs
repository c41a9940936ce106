//! Fixed-function pipeline state: stencil, depth, culling, color mask and blending.
//!
//! [`PipelineState`] is a plain value modelled on the classic GL state
//! machine. Each setter touches exactly one field, so callers can interleave
//! changes in any order without hidden coupling. Backends read a snapshot of
//! the state at every draw.

/// Comparison used by the depth and stencil tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CompareFunction {
    Never,
    Less,
    Equal,
    LessEqual,
    Greater,
    NotEqual,
    GreaterEqual,
    Always,
}

impl CompareFunction {
    /// Evaluates `incoming OP stored`.
    pub fn passes<T: PartialOrd>(self, incoming: T, stored: T) -> bool {
        match self {
            CompareFunction::Never => false,
            CompareFunction::Less => incoming < stored,
            CompareFunction::Equal => incoming == stored,
            CompareFunction::LessEqual => incoming <= stored,
            CompareFunction::Greater => incoming > stored,
            CompareFunction::NotEqual => incoming != stored,
            CompareFunction::GreaterEqual => incoming >= stored,
            CompareFunction::Always => true,
        }
    }

    pub fn to_wgpu(self) -> wgpu::CompareFunction {
        match self {
            CompareFunction::Never => wgpu::CompareFunction::Never,
            CompareFunction::Less => wgpu::CompareFunction::Less,
            CompareFunction::Equal => wgpu::CompareFunction::Equal,
            CompareFunction::LessEqual => wgpu::CompareFunction::LessEqual,
            CompareFunction::Greater => wgpu::CompareFunction::Greater,
            CompareFunction::NotEqual => wgpu::CompareFunction::NotEqual,
            CompareFunction::GreaterEqual => wgpu::CompareFunction::GreaterEqual,
            CompareFunction::Always => wgpu::CompareFunction::Always,
        }
    }
}

/// Update applied to a stencil value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StencilOp {
    Keep,
    Replace,
    /// Add one, wrapping 255 to 0.
    IncrementWrap,
    /// Subtract one, wrapping 0 to 255.
    DecrementWrap,
}

impl StencilOp {
    /// New stencil value given the current one and the reference.
    pub fn apply(self, current: u8, reference: u8) -> u8 {
        match self {
            StencilOp::Keep => current,
            StencilOp::Replace => reference,
            StencilOp::IncrementWrap => current.wrapping_add(1),
            StencilOp::DecrementWrap => current.wrapping_sub(1),
        }
    }

    pub fn to_wgpu(self) -> wgpu::StencilOperation {
        match self {
            StencilOp::Keep => wgpu::StencilOperation::Keep,
            StencilOp::Replace => wgpu::StencilOperation::Replace,
            StencilOp::IncrementWrap => wgpu::StencilOperation::IncrementWrap,
            StencilOp::DecrementWrap => wgpu::StencilOperation::DecrementWrap,
        }
    }
}

/// Which rasterized side of a triangle a stencil op set applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Face {
    Front,
    Back,
}

/// Faces discarded when culling is enabled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CullFace {
    None,
    Front,
    Back,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlendFactor {
    Zero,
    One,
    SrcAlpha,
    OneMinusSrcAlpha,
}

impl BlendFactor {
    /// Scalar weight for a fragment with the given source alpha.
    pub fn weight(self, src_alpha: f32) -> f32 {
        match self {
            BlendFactor::Zero => 0.0,
            BlendFactor::One => 1.0,
            BlendFactor::SrcAlpha => src_alpha,
            BlendFactor::OneMinusSrcAlpha => 1.0 - src_alpha,
        }
    }

    pub fn to_wgpu(self) -> wgpu::BlendFactor {
        match self {
            BlendFactor::Zero => wgpu::BlendFactor::Zero,
            BlendFactor::One => wgpu::BlendFactor::One,
            BlendFactor::SrcAlpha => wgpu::BlendFactor::SrcAlpha,
            BlendFactor::OneMinusSrcAlpha => wgpu::BlendFactor::OneMinusSrcAlpha,
        }
    }
}

/// Stencil compare function with its reference value and read mask.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StencilFunc {
    pub compare: CompareFunction,
    pub reference: u8,
    pub mask: u8,
}

impl StencilFunc {
    /// GL semantics: `(reference & mask) OP (stored & mask)`.
    pub fn passes(&self, stored: u8) -> bool {
        self.compare
            .passes(self.reference & self.mask, stored & self.mask)
    }
}

/// Ops for stencil-fail, depth-fail and depth-pass outcomes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StencilFaceOps {
    pub fail: StencilOp,
    pub depth_fail: StencilOp,
    pub pass: StencilOp,
}

impl StencilFaceOps {
    pub const KEEP: Self = Self::new(StencilOp::Keep, StencilOp::Keep, StencilOp::Keep);

    pub const fn new(fail: StencilOp, depth_fail: StencilOp, pass: StencilOp) -> Self {
        Self {
            fail,
            depth_fail,
            pass,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ColorMask {
    pub red: bool,
    pub green: bool,
    pub blue: bool,
    pub alpha: bool,
}

impl ColorMask {
    pub const ALL: Self = Self {
        red: true,
        green: true,
        blue: true,
        alpha: true,
    };
    pub const NONE: Self = Self {
        red: false,
        green: false,
        blue: false,
        alpha: false,
    };

    pub fn as_array(self) -> [bool; 4] {
        [self.red, self.green, self.blue, self.alpha]
    }

    pub fn to_wgpu(self) -> wgpu::ColorWrites {
        let mut writes = wgpu::ColorWrites::empty();
        if self.red {
            writes |= wgpu::ColorWrites::RED;
        }
        if self.green {
            writes |= wgpu::ColorWrites::GREEN;
        }
        if self.blue {
            writes |= wgpu::ColorWrites::BLUE;
        }
        if self.alpha {
            writes |= wgpu::ColorWrites::ALPHA;
        }
        writes
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BlendFunc {
    pub src: BlendFactor,
    pub dst: BlendFactor,
}

impl BlendFunc {
    /// Source replaces destination.
    pub const OPAQUE: Self = Self {
        src: BlendFactor::One,
        dst: BlendFactor::Zero,
    };
    /// Classic "over" compositing.
    pub const ALPHA: Self = Self {
        src: BlendFactor::SrcAlpha,
        dst: BlendFactor::OneMinusSrcAlpha,
    };
}

/// Complete fixed-function state read by every draw.
///
/// Fields are private; use the setters, each of which changes one field and
/// nothing else.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PipelineState {
    stencil_test: bool,
    stencil_func: StencilFunc,
    stencil_front: StencilFaceOps,
    stencil_back: StencilFaceOps,
    depth_func: CompareFunction,
    depth_write: bool,
    color_mask: ColorMask,
    cull_enabled: bool,
    cull_face: CullFace,
    blend_enabled: bool,
    blend_func: BlendFunc,
}

impl Default for PipelineState {
    fn default() -> Self {
        Self::BASELINE
    }
}

impl PipelineState {
    /// State assumed before and after every shadow volume pass.
    pub const BASELINE: Self = Self {
        stencil_test: false,
        stencil_func: StencilFunc {
            compare: CompareFunction::Always,
            reference: 0,
            mask: 0xFF,
        },
        stencil_front: StencilFaceOps::KEEP,
        stencil_back: StencilFaceOps::KEEP,
        depth_func: CompareFunction::Less,
        depth_write: true,
        color_mask: ColorMask::ALL,
        cull_enabled: true,
        cull_face: CullFace::Back,
        blend_enabled: false,
        blend_func: BlendFunc::OPAQUE,
    };

    pub fn is_baseline(&self) -> bool {
        *self == Self::BASELINE
    }

    // --- setters ---

    pub fn set_stencil_test(&mut self, enabled: bool) {
        self.stencil_test = enabled;
    }

    pub fn set_stencil_func(&mut self, compare: CompareFunction, reference: u8, mask: u8) {
        self.stencil_func = StencilFunc {
            compare,
            reference,
            mask,
        };
    }

    /// Sets the same ops for both faces.
    pub fn set_stencil_op(&mut self, fail: StencilOp, depth_fail: StencilOp, pass: StencilOp) {
        let ops = StencilFaceOps::new(fail, depth_fail, pass);
        self.stencil_front = ops;
        self.stencil_back = ops;
    }

    pub fn set_stencil_op_separate(
        &mut self,
        face: Face,
        fail: StencilOp,
        depth_fail: StencilOp,
        pass: StencilOp,
    ) {
        let ops = StencilFaceOps::new(fail, depth_fail, pass);
        match face {
            Face::Front => self.stencil_front = ops,
            Face::Back => self.stencil_back = ops,
        }
    }

    pub fn set_depth_func(&mut self, compare: CompareFunction) {
        self.depth_func = compare;
    }

    pub fn set_depth_write(&mut self, enabled: bool) {
        self.depth_write = enabled;
    }

    pub fn set_color_mask(&mut self, mask: ColorMask) {
        self.color_mask = mask;
    }

    pub fn set_cull_enabled(&mut self, enabled: bool) {
        self.cull_enabled = enabled;
    }

    pub fn set_cull_face(&mut self, face: CullFace) {
        self.cull_face = face;
    }

    pub fn set_blend_enabled(&mut self, enabled: bool) {
        self.blend_enabled = enabled;
    }

    pub fn set_blend_func(&mut self, src: BlendFactor, dst: BlendFactor) {
        self.blend_func = BlendFunc { src, dst };
    }

    // --- getters ---

    pub fn stencil_test(&self) -> bool {
        self.stencil_test
    }

    pub fn stencil_func(&self) -> StencilFunc {
        self.stencil_func
    }

    pub fn stencil_ops(&self, face: Face) -> StencilFaceOps {
        match face {
            Face::Front => self.stencil_front,
            Face::Back => self.stencil_back,
        }
    }

    pub fn depth_func(&self) -> CompareFunction {
        self.depth_func
    }

    pub fn depth_write(&self) -> bool {
        self.depth_write
    }

    pub fn color_mask(&self) -> ColorMask {
        self.color_mask
    }

    pub fn cull_enabled(&self) -> bool {
        self.cull_enabled
    }

    pub fn cull_face(&self) -> CullFace {
        self.cull_face
    }

    pub fn blend_enabled(&self) -> bool {
        self.blend_enabled
    }

    pub fn blend_func(&self) -> BlendFunc {
        self.blend_func
    }

    /// Face actually discarded by the rasterizer, if any.
    pub fn culled_face(&self) -> Option<Face> {
        if !self.cull_enabled {
            return None;
        }
        match self.cull_face {
            CullFace::None => None,
            CullFace::Front => Some(Face::Front),
            CullFace::Back => Some(Face::Back),
        }
    }

    // --- wgpu translation ---

    pub fn cull_mode(&self) -> Option<wgpu::Face> {
        self.culled_face().map(|face| match face {
            Face::Front => wgpu::Face::Front,
            Face::Back => wgpu::Face::Back,
        })
    }

    /// Stencil state; a disabled test neither rejects fragments nor writes.
    pub fn stencil_state(&self) -> wgpu::StencilState {
        if !self.stencil_test {
            return wgpu::StencilState {
                front: wgpu::StencilFaceState::IGNORE,
                back: wgpu::StencilFaceState::IGNORE,
                read_mask: 0,
                write_mask: 0,
            };
        }
        let face = |ops: StencilFaceOps| wgpu::StencilFaceState {
            compare: self.stencil_func.compare.to_wgpu(),
            fail_op: ops.fail.to_wgpu(),
            depth_fail_op: ops.depth_fail.to_wgpu(),
            pass_op: ops.pass.to_wgpu(),
        };
        wgpu::StencilState {
            front: face(self.stencil_front),
            back: face(self.stencil_back),
            read_mask: u32::from(self.stencil_func.mask),
            write_mask: 0xFF,
        }
    }

    pub fn depth_stencil_state(&self, format: wgpu::TextureFormat) -> wgpu::DepthStencilState {
        wgpu::DepthStencilState {
            format,
            depth_write_enabled: self.depth_write,
            depth_compare: self.depth_func.to_wgpu(),
            stencil: self.stencil_state(),
            bias: wgpu::DepthBiasState::default(),
        }
    }

    pub fn blend_state(&self) -> Option<wgpu::BlendState> {
        if !self.blend_enabled {
            return None;
        }
        let component = wgpu::BlendComponent {
            src_factor: self.blend_func.src.to_wgpu(),
            dst_factor: self.blend_func.dst.to_wgpu(),
            operation: wgpu::BlendOperation::Add,
        };
        Some(wgpu::BlendState {
            color: component,
            alpha: component,
        })
    }

    /// Copy with the dynamic stencil reference zeroed, for pipeline caching.
    pub fn pipeline_key(&self) -> PipelineState {
        let mut key = *self;
        key.stencil_func.reference = 0;
        key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_baseline() {
        let state = PipelineState::default();
        assert!(state.is_baseline());
        assert!(!state.stencil_test());
        assert_eq!(state.depth_func(), CompareFunction::Less);
        assert!(state.depth_write());
        assert_eq!(state.color_mask(), ColorMask::ALL);
        assert!(state.cull_enabled());
        assert_eq!(state.cull_face(), CullFace::Back);
        assert!(!state.blend_enabled());
    }

    #[test]
    fn test_each_setter_touches_only_its_field() {
        let setters: [fn(&mut PipelineState); 11] = [
            |s| s.set_stencil_test(true),
            |s| s.set_stencil_func(CompareFunction::NotEqual, 3, 0x0F),
            |s| {
                s.set_stencil_op_separate(
                    Face::Front,
                    StencilOp::Keep,
                    StencilOp::IncrementWrap,
                    StencilOp::Keep,
                )
            },
            |s| {
                s.set_stencil_op_separate(
                    Face::Back,
                    StencilOp::Keep,
                    StencilOp::DecrementWrap,
                    StencilOp::Keep,
                )
            },
            |s| s.set_depth_func(CompareFunction::GreaterEqual),
            |s| s.set_depth_write(false),
            |s| s.set_color_mask(ColorMask::NONE),
            |s| s.set_cull_enabled(false),
            |s| s.set_cull_face(CullFace::Front),
            |s| s.set_blend_enabled(true),
            |s| s.set_blend_func(BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha),
        ];

        for set in setters {
            let mut state = PipelineState::BASELINE;
            set(&mut state);
            let changed = [
                state.stencil_test() != PipelineState::BASELINE.stencil_test(),
                state.stencil_func() != PipelineState::BASELINE.stencil_func(),
                state.stencil_ops(Face::Front) != StencilFaceOps::KEEP,
                state.stencil_ops(Face::Back) != StencilFaceOps::KEEP,
                state.depth_func() != CompareFunction::Less,
                !state.depth_write(),
                state.color_mask() != ColorMask::ALL,
                !state.cull_enabled(),
                state.cull_face() != CullFace::Back,
                state.blend_enabled(),
                state.blend_func() != BlendFunc::OPAQUE,
            ];
            assert_eq!(changed.iter().filter(|c| **c).count(), 1, "{state:?}");
        }
    }

    #[test]
    fn test_setters_are_idempotent() {
        let mut once = PipelineState::BASELINE;
        once.set_depth_func(CompareFunction::GreaterEqual);
        once.set_stencil_op(StencilOp::Keep, StencilOp::Keep, StencilOp::Replace);
        let mut twice = once;
        twice.set_depth_func(CompareFunction::GreaterEqual);
        twice.set_stencil_op(StencilOp::Keep, StencilOp::Keep, StencilOp::Replace);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_stencil_op_sets_both_faces() {
        let mut state = PipelineState::BASELINE;
        state.set_stencil_op(StencilOp::Keep, StencilOp::Keep, StencilOp::Replace);
        let expected = StencilFaceOps::new(StencilOp::Keep, StencilOp::Keep, StencilOp::Replace);
        assert_eq!(state.stencil_ops(Face::Front), expected);
        assert_eq!(state.stencil_ops(Face::Back), expected);
    }

    #[test]
    fn test_increment_wrap_full_cycle() {
        let mut value = 0u8;
        for _ in 0..256 {
            value = StencilOp::IncrementWrap.apply(value, 0);
        }
        assert_eq!(value, 0);
        assert_eq!(StencilOp::IncrementWrap.apply(255, 0), 0);
    }

    #[test]
    fn test_decrement_wrap_does_not_saturate() {
        assert_eq!(StencilOp::DecrementWrap.apply(0, 0), 255);
        let mut value = 17u8;
        for _ in 0..255 {
            value = StencilOp::DecrementWrap.apply(value, 0);
        }
        assert_eq!(value, 18);
    }

    #[test]
    fn test_replace_uses_reference() {
        assert_eq!(StencilOp::Replace.apply(42, 7), 7);
        assert_eq!(StencilOp::Keep.apply(42, 7), 42);
    }

    #[test]
    fn test_stencil_func_masks_both_sides() {
        let func = StencilFunc {
            compare: CompareFunction::NotEqual,
            reference: 0,
            mask: 0xFF,
        };
        assert!(!func.passes(0));
        assert!(func.passes(255));

        let low_bits = StencilFunc {
            compare: CompareFunction::Equal,
            reference: 0x01,
            mask: 0x0F,
        };
        assert!(low_bits.passes(0xF1));
    }

    #[test]
    fn test_compare_function_depth_semantics() {
        assert!(CompareFunction::Less.passes(0.2, 0.5));
        assert!(!CompareFunction::Less.passes(0.5, 0.5));
        assert!(CompareFunction::GreaterEqual.passes(0.5, 0.5));
        assert!(!CompareFunction::Never.passes(0.0, 1.0));
    }

    #[test]
    fn test_culled_face_respects_enable() {
        let mut state = PipelineState::BASELINE;
        assert_eq!(state.culled_face(), Some(Face::Back));
        state.set_cull_face(CullFace::None);
        assert_eq!(state.culled_face(), None);
        state.set_cull_face(CullFace::Front);
        state.set_cull_enabled(false);
        assert_eq!(state.culled_face(), None);
        assert_eq!(state.cull_mode(), None);
    }

    #[test]
    fn test_disabled_stencil_never_writes() {
        let stencil = PipelineState::BASELINE.stencil_state();
        assert_eq!(stencil.write_mask, 0);
        assert_eq!(stencil.front, wgpu::StencilFaceState::IGNORE);
    }

    #[test]
    fn test_enabled_stencil_maps_per_face_ops() {
        let mut state = PipelineState::BASELINE;
        state.set_stencil_test(true);
        state.set_stencil_op_separate(
            Face::Back,
            StencilOp::Keep,
            StencilOp::DecrementWrap,
            StencilOp::Keep,
        );
        let stencil = state.stencil_state();
        assert_eq!(
            stencil.back.depth_fail_op,
            wgpu::StencilOperation::DecrementWrap
        );
        assert_eq!(stencil.front.depth_fail_op, wgpu::StencilOperation::Keep);
        assert_eq!(stencil.read_mask, 0xFF);
    }

    #[test]
    fn test_blend_state_only_when_enabled() {
        let mut state = PipelineState::BASELINE;
        state.set_blend_func(BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha);
        assert!(state.blend_state().is_none());
        state.set_blend_enabled(true);
        let blend = state.blend_state().unwrap();
        assert_eq!(blend.color.src_factor, wgpu::BlendFactor::SrcAlpha);
        assert_eq!(blend.color.dst_factor, wgpu::BlendFactor::OneMinusSrcAlpha);
    }

    #[test]
    fn test_color_mask_none_writes_nothing() {
        assert!(ColorMask::NONE.to_wgpu().is_empty());
        assert_eq!(ColorMask::ALL.to_wgpu(), wgpu::ColorWrites::ALL);
    }

    #[test]
    fn test_pipeline_key_ignores_reference() {
        let mut a = PipelineState::BASELINE;
        a.set_stencil_func(CompareFunction::NotEqual, 0, 0xFF);
        let mut b = a;
        b.set_stencil_func(CompareFunction::NotEqual, 9, 0xFF);
        assert_ne!(a, b);
        assert_eq!(a.pipeline_key(), b.pipeline_key());
    }
}
