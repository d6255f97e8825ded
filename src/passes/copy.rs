use crate::pass::{FullScreenQuad, Pass, PassContext, PassState};
use crate::renderer::{Renderer, TRANSPARENT};

/// Copies the read buffer to the destination through a full-screen quad.
///
/// The quad and the renderer's copy material are created on first render
/// and released on dispose.
#[derive(Debug)]
pub struct CopyPass<M> {
    state: PassState,
    quad: FullScreenQuad<M>,
}

impl<M> Default for CopyPass<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> CopyPass<M> {
    /// Kind tag.
    pub const KIND: &'static str = "CopyPass";

    /// Copy pass with default flags; no GPU resources yet.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: PassState::new(),
            quad: FullScreenQuad::default(),
        }
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

    /// Whether the quad and material exist yet.
    #[must_use]
    pub const fn has_resources(&self) -> bool {
        self.quad.is_created()
    }
}

impl<R: Renderer> Pass<R> for CopyPass<R::Material> {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn state(&self) -> &PassState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut PassState {
        &mut self.state
    }

    fn render(&mut self, ctx: &mut PassContext<'_, R>) {
        let quad = self.quad.ensure();
        if quad.material().is_none() {
            let material = ctx.renderer.copy_material();
            let _ = quad.set_material(material);
        }
        let clear = self.state.clear_before_render().then_some(TRANSPARENT);
        let input = ctx.read_buffer;
        let (renderer, destination) = ctx.output();
        quad.draw(renderer, input, destination, clear);
    }

    fn dispose(&mut self, renderer: &mut R) {
        if let Some(material) = self.quad.take_material() {
            renderer.release_material(material);
        }
    }
}
