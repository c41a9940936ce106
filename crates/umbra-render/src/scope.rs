//! Scoped pipeline-state mutation.

use std::ops::{Deref, DerefMut};

use crate::state::PipelineState;

/// Exclusive borrow of a [`PipelineState`] that puts the entry snapshot back
/// when dropped, on normal return and during unwinding alike.
///
/// Every shadow volume pass runs inside one of these, so a pass that forgets
/// to undo a change cannot leak it into the next draw.
pub struct StateScope<'a> {
    state: &'a mut PipelineState,
    entry: PipelineState,
}

impl<'a> StateScope<'a> {
    pub fn enter(state: &'a mut PipelineState) -> Self {
        let entry = *state;
        Self { state, entry }
    }

    /// State that will be restored on drop.
    pub fn entry(&self) -> &PipelineState {
        &self.entry
    }
}

impl Deref for StateScope<'_> {
    type Target = PipelineState;

    fn deref(&self) -> &PipelineState {
        self.state
    }
}

impl DerefMut for StateScope<'_> {
    fn deref_mut(&mut self) -> &mut PipelineState {
        self.state
    }
}

impl Drop for StateScope<'_> {
    fn drop(&mut self) {
        if *self.state != self.entry {
            log::trace!("restoring pipeline state: {:?}", self.state);
            *self.state = self.entry;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{CompareFunction, CullFace};

    #[test]
    fn test_scope_restores_on_drop() {
        let mut state = PipelineState::BASELINE;
        {
            let mut scope = StateScope::enter(&mut state);
            scope.set_depth_func(CompareFunction::GreaterEqual);
            scope.set_cull_face(CullFace::Front);
            assert_eq!(scope.depth_func(), CompareFunction::GreaterEqual);
        }
        assert!(state.is_baseline());
    }

    #[test]
    fn test_scope_restores_entry_not_baseline() {
        let mut state = PipelineState::BASELINE;
        state.set_depth_write(false);
        let entry = state;
        {
            let mut scope = StateScope::enter(&mut state);
            scope.set_depth_write(true);
            scope.set_stencil_test(true);
            assert_eq!(scope.entry(), &entry);
        }
        assert_eq!(state, entry);
    }

    #[test]
    fn test_scope_restores_on_early_return() {
        fn bail(state: &mut PipelineState) -> Option<()> {
            let mut scope = StateScope::enter(state);
            scope.set_blend_enabled(true);
            Option::<()>::None?;
            scope.set_blend_enabled(false);
            Some(())
        }

        let mut state = PipelineState::BASELINE;
        assert!(bail(&mut state).is_none());
        assert!(state.is_baseline());
    }

    #[test]
    fn test_scope_restores_during_unwind() {
        let mut state = PipelineState::BASELINE;
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let mut scope = StateScope::enter(&mut state);
            scope.set_stencil_test(true);
            panic!("draw failed");
        }));
        assert!(result.is_err());
        assert!(state.is_baseline());
    }
}
