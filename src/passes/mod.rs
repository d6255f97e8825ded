//! Built-in structural passes.
//!
//! These drive the pipeline itself: [`ScenePass`] produces the initial
//! buffer from the scene, [`CopyPass`] moves a buffer to the next stage or
//! the screen, and [`BasePass`] is the do-nothing template.

mod base;
mod copy;
mod scene;

pub use base::BasePass;
pub use copy::CopyPass;
pub use scene::ScenePass;

use crate::pass::PassRegistry;
use crate::renderer::Renderer;

/// Register every built-in pass under its kind tag.
pub fn register_builtin_passes<R: Renderer + 'static>(registry: &mut PassRegistry<R>) {
    registry.register::<BasePass>();
    registry.register::<ScenePass>();
    registry.register::<CopyPass<R::Material>>();
}
