//! The pass contract.
//!
//! A [`Pass`] is one stage of a post-processing chain. The composer lends it
//! the current read buffer (input only) and write buffer for the duration of
//! one [`Pass::render`] call, then looks at its [`PassState`] to decide
//! whether to swap the buffers and whether the output needs copying to the
//! screen.
//!
//! Lifecycle: constructed, enabled/disabled any number of times, disposed
//! once. Nothing is valid after disposal; the composer refuses to render or
//! resize a disposed pass.

pub mod id;
pub mod quad;
pub mod record;
pub mod registry;
pub mod state;

pub use id::PassId;
pub use quad::{FullScreenQuad, QuadRenderable};
pub use record::PassRecord;
pub use registry::PassRegistry;
pub use state::{PassState, ScreenOutput};

use crate::error::PostFxError;
use crate::renderer::{RenderDestination, Renderer};

/// Everything a pass gets for one render call.
pub struct PassContext<'a, R: Renderer> {
    /// The backend to draw with.
    pub renderer: &'a mut R,
    /// Destination buffer, unless the pass renders to the screen.
    pub write_buffer: &'a mut R::Target,
    /// Output of the previous pass. Input only.
    pub read_buffer: &'a R::Target,
    /// Wall-clock time since the previous frame, in milliseconds.
    pub delta_ms: f32,
    /// Whether a stencil mask is active in the pipeline.
    pub mask_active: bool,
    /// Scene being rendered.
    pub scene: &'a R::Scene,
    /// Camera the scene is rendered with.
    pub camera: &'a R::Camera,
    to_screen: bool,
}

impl<'a, R: Renderer> PassContext<'a, R> {
    /// Context writing to `write_buffer`, zero delta, no mask.
    pub fn new(
        renderer: &'a mut R,
        write_buffer: &'a mut R::Target,
        read_buffer: &'a R::Target,
        scene: &'a R::Scene,
        camera: &'a R::Camera,
    ) -> Self {
        Self {
            renderer,
            write_buffer,
            read_buffer,
            delta_ms: 0.0,
            mask_active: false,
            scene,
            camera,
            to_screen: false,
        }
    }

    /// Set the frame delta in milliseconds.
    #[must_use]
    pub fn with_delta_ms(mut self, delta_ms: f32) -> Self {
        self.delta_ms = delta_ms;
        self
    }

    /// Set the mask flag.
    #[must_use]
    pub fn with_mask_active(mut self, mask_active: bool) -> Self {
        self.mask_active = mask_active;
        self
    }

    /// Send the pass output to the visible framebuffer instead of the
    /// write buffer.
    #[must_use]
    pub fn to_screen(mut self, to_screen: bool) -> Self {
        self.to_screen = to_screen;
        self
    }

    /// Whether output goes to the visible framebuffer.
    #[must_use]
    pub const fn renders_to_screen(&self) -> bool {
        self.to_screen
    }

    /// The renderer together with where the pass should draw.
    pub fn output(&mut self) -> (&mut R, RenderDestination<'_, R::Target>) {
        let destination = if self.to_screen {
            RenderDestination::Screen
        } else {
            RenderDestination::Target(&mut *self.write_buffer)
        };
        (&mut *self.renderer, destination)
    }
}

/// One stage of a post-processing pipeline.
///
/// Implementors provide their kind tag and state; every other method has a
/// default. The defaults render nothing, own nothing and serialize only the
/// base fields, which is exactly the base pass.
pub trait Pass<R: Renderer> {
    /// Tag identifying the concrete pass type in records.
    fn kind(&self) -> &'static str;

    /// Identity, flags and lifecycle.
    fn state(&self) -> &PassState;

    /// Mutable identity, flags and lifecycle.
    fn state_mut(&mut self) -> &mut PassState;

    /// The pass identifier.
    fn id(&self) -> PassId {
        self.state().id()
    }

    /// Draw this stage. Must not retain the buffers in `ctx`.
    fn render(&mut self, _ctx: &mut PassContext<'_, R>) {}

    /// The output surface changed size. Passes owning targets reallocate
    /// them here.
    fn resize(&mut self, _renderer: &mut R, _width: u32, _height: u32) {}

    /// Release GPU resources this pass allocated.
    fn dispose(&mut self, _renderer: &mut R) {}

    /// Record this pass for persistence. Overrides call the default
    /// ([`PassRecord::from_state`]) and add their parameters.
    ///
    /// # Errors
    ///
    /// Returns [`PostFxError::Record`] if a parameter cannot be serialized.
    fn serialize(&self) -> Result<PassRecord, PostFxError> {
        Ok(PassRecord::from_state(self.kind(), self.state()))
    }

    /// Restore kind-specific fields from `record`. Base fields are already
    /// in place when this runs.
    ///
    /// # Errors
    ///
    /// Returns [`PostFxError::InvalidParam`] for parameters of the wrong
    /// shape.
    fn restore(&mut self, _record: &PassRecord) -> Result<(), PostFxError> {
        Ok(())
    }

    /// Dispose once. A second call is a lifecycle violation: it asserts in
    /// debug builds and is ignored otherwise.
    fn release(&mut self, renderer: &mut R) {
        let id = self.id();
        debug_assert!(
            !self.state().is_disposed(),
            "pass {id} disposed twice"
        );
        if self.state().is_disposed() {
            log::warn!("{} pass {id} disposed twice", self.kind());
            return;
        }
        log::debug!("disposing {} pass {id}", self.kind());
        self.dispose(renderer);
        let _ = self.state_mut().mark_disposed();
    }
}
