use crate::pass::{Pass, PassRecord, PassState};
use crate::renderer::Renderer;

/// The base pass: default flags, renders nothing, owns nothing.
#[derive(Debug, Default)]
pub struct BasePass {
    state: PassState,
}

impl BasePass {
    /// Kind tag.
    pub const KIND: &'static str = "Pass";

    /// Fresh pass with default flags.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Identity and flags.
    #[must_use]
    pub const fn state(&self) -> &PassState {
        &self.state
    }

    /// Mutable identity and flags.
    pub fn state_mut(&mut self) -> &mut PassState {
        &mut self.state
    }

    /// The persisted form of this pass.
    #[must_use]
    pub fn record(&self) -> PassRecord {
        PassRecord::from_state(Self::KIND, &self.state)
    }
}

impl<R: Renderer> Pass<R> for BasePass {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn state(&self) -> &PassState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut PassState {
        &mut self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructs_with_contract_defaults() {
        let pass = BasePass::new();
        let state = pass.state();
        assert_eq!(
            (
                state.enabled(),
                state.needs_buffer_swap(),
                state.clear_before_render(),
                state.render_to_screen(),
                state.copy_result_to_screen(),
            ),
            (true, true, false, false, false)
        );
    }

    #[test]
    fn live_passes_have_distinct_ids() {
        let passes: Vec<BasePass> = (0..64).map(|_| BasePass::new()).collect();
        let mut ids: Vec<_> = passes.iter().map(|p| p.state().id()).collect();
        ids.sort_by_key(ToString::to_string);
        ids.dedup();
        assert_eq!(ids.len(), passes.len());
    }

    #[test]
    fn record_carries_kind_and_flags_only() {
        let record = BasePass::new().record();
        assert_eq!(record.kind, "Pass");
        assert!(record.params.is_empty());
    }
}
