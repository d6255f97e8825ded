use super::id::PassId;

/// How a pass relates to the visible framebuffer.
///
/// Folds the `renderToScreen` / `copyResultToScreen` flag pair into one
/// value so copy-to-screen cannot be set on an offscreen pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScreenOutput {
    /// Renders into the composer's write buffer.
    #[default]
    Offscreen,
    /// Renders straight to the visible framebuffer.
    Direct,
    /// Renders into an offscreen target the composer then copies to the
    /// visible framebuffer. The composer's read/write buffers keep their
    /// roles, so a following pass reads the same input this one did.
    Copy,
}

impl ScreenOutput {
    /// Build from the two persisted flags. `copy_result_to_screen` is
    /// dropped when `render_to_screen` is false.
    #[must_use]
    pub const fn from_flags(render_to_screen: bool, copy_result_to_screen: bool) -> Self {
        match (render_to_screen, copy_result_to_screen) {
            (false, _) => Self::Offscreen,
            (true, false) => Self::Direct,
            (true, true) => Self::Copy,
        }
    }

    /// The `renderToScreen` flag.
    #[must_use]
    pub const fn render_to_screen(self) -> bool {
        !matches!(self, Self::Offscreen)
    }

    /// The `copyResultToScreen` flag.
    #[must_use]
    pub const fn copy_result_to_screen(self) -> bool {
        matches!(self, Self::Copy)
    }
}

/// Identity, flags and lifecycle shared by every pass.
///
/// The composer reads these to decide whether to run a pass, where its
/// output goes and whether to swap buffers afterwards.
#[derive(Debug, PartialEq, Eq)]
pub struct PassState {
    id: PassId,
    enabled: bool,
    clear_before_render: bool,
    needs_buffer_swap: bool,
    output: ScreenOutput,
    disposed: bool,
}

impl Default for PassState {
    fn default() -> Self {
        Self::new()
    }
}

impl PassState {
    /// Fresh id, enabled, swapping, not clearing, offscreen.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: PassId::generate(),
            enabled: true,
            clear_before_render: false,
            needs_buffer_swap: true,
            output: ScreenOutput::Offscreen,
            disposed: false,
        }
    }

    pub(crate) fn with_id(id: PassId) -> Self {
        Self { id, ..Self::new() }
    }

    /// The pass identifier.
    #[must_use]
    pub const fn id(&self) -> PassId {
        self.id
    }

    /// Whether the composer runs this pass.
    #[must_use]
    pub const fn enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable the pass.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Whether the pass clears its destination before drawing.
    #[must_use]
    pub const fn clear_before_render(&self) -> bool {
        self.clear_before_render
    }

    /// Set the clear flag.
    pub fn set_clear_before_render(&mut self, clear: bool) {
        self.clear_before_render = clear;
    }

    /// Whether read/write roles flip after this pass runs.
    #[must_use]
    pub const fn needs_buffer_swap(&self) -> bool {
        self.needs_buffer_swap
    }

    /// Set the swap flag.
    pub fn set_needs_buffer_swap(&mut self, swap: bool) {
        self.needs_buffer_swap = swap;
    }

    /// Where the pass output goes.
    #[must_use]
    pub const fn output(&self) -> ScreenOutput {
        self.output
    }

    /// Set where the pass output goes.
    pub fn set_output(&mut self, output: ScreenOutput) {
        self.output = output;
    }

    /// The `renderToScreen` flag.
    #[must_use]
    pub const fn render_to_screen(&self) -> bool {
        self.output.render_to_screen()
    }

    /// Set `renderToScreen`. Turning it off also clears copy-to-screen.
    pub fn set_render_to_screen(&mut self, render_to_screen: bool) {
        self.output = ScreenOutput::from_flags(
            render_to_screen,
            self.output.copy_result_to_screen(),
        );
    }

    /// The `copyResultToScreen` flag; always `false` for offscreen passes.
    #[must_use]
    pub const fn copy_result_to_screen(&self) -> bool {
        self.output.copy_result_to_screen()
    }

    /// Set `copyResultToScreen`. Ignored while the pass renders offscreen.
    pub fn set_copy_result_to_screen(&mut self, copy: bool) {
        if self.output.render_to_screen() {
            self.output = ScreenOutput::from_flags(true, copy);
        } else if copy {
            log::warn!(
                "pass {}: copy-to-screen ignored on an offscreen pass",
                self.id
            );
        }
    }

    /// Whether [`PassState::mark_disposed`] has run.
    #[must_use]
    pub const fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Enter the terminal disposed state. Returns `false` if the pass was
    /// already disposed.
    pub fn mark_disposed(&mut self) -> bool {
        !std::mem::replace(&mut self.disposed, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_pass_contract() {
        let state = PassState::new();
        assert!(state.enabled());
        assert!(state.needs_buffer_swap());
        assert!(!state.clear_before_render());
        assert!(!state.render_to_screen());
        assert!(!state.copy_result_to_screen());
        assert!(!state.is_disposed());
    }

    #[test]
    fn copy_to_screen_requires_render_to_screen() {
        let mut state = PassState::new();
        state.set_copy_result_to_screen(true);
        assert!(!state.copy_result_to_screen());
        assert_eq!(state.output(), ScreenOutput::Offscreen);

        state.set_render_to_screen(true);
        state.set_copy_result_to_screen(true);
        assert_eq!(state.output(), ScreenOutput::Copy);

        state.set_render_to_screen(false);
        assert!(!state.copy_result_to_screen());
        state.set_render_to_screen(true);
        assert_eq!(state.output(), ScreenOutput::Direct);
    }

    #[test]
    fn flags_map_onto_screen_output() {
        assert_eq!(ScreenOutput::from_flags(false, true), ScreenOutput::Offscreen);
        assert_eq!(ScreenOutput::from_flags(true, false), ScreenOutput::Direct);
        assert_eq!(ScreenOutput::from_flags(true, true), ScreenOutput::Copy);
    }

    #[test]
    fn dispose_is_terminal() {
        let mut state = PassState::new();
        assert!(state.mark_disposed());
        assert!(!state.mark_disposed());
        assert!(state.is_disposed());
    }

    #[test]
    fn enable_toggles_any_number_of_times() {
        let mut state = PassState::new();
        for i in 0..5 {
            state.set_enabled(i % 2 == 1);
        }
        assert!(!state.enabled());
    }
}
