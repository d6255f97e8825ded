//! The graphics backend interface passes render through.
//!
//! The pipeline never talks to a graphics API directly. Passes and the
//! composer go through [`Renderer`], which owns draw submission, texture
//! allocation and the visible surface. [`crate::gpu::WgpuRenderer`] is the
//! wgpu implementation.

#[cfg(test)]
pub(crate) mod recording;

use crate::pass::quad::QuadRenderable;
use crate::preset::RenderTargetPreset;

/// RGBA clear color in linear space.
pub type ClearColor = [f32; 4];

/// Transparent black, the clear color used for full-screen quad draws.
pub const TRANSPARENT: ClearColor = [0.0, 0.0, 0.0, 0.0];

/// Where a draw lands.
#[derive(Debug)]
pub enum RenderDestination<'a, T> {
    /// The visible framebuffer.
    Screen,
    /// An offscreen target.
    Target(&'a mut T),
}

impl<T> RenderDestination<'_, T> {
    /// Returns `true` for [`RenderDestination::Screen`].
    #[must_use]
    pub const fn is_screen(&self) -> bool {
        matches!(self, Self::Screen)
    }
}

/// A graphics backend able to run a post-processing pipeline.
///
/// `Target` is an offscreen render target, `Material` the shading state a
/// [`QuadRenderable`] is drawn with. `Scene` and `Camera` are whatever the
/// backend renders the 3D scene from; they are only ever borrowed.
pub trait Renderer {
    /// Offscreen render target.
    type Target;
    /// Full-screen quad shading state.
    type Material;
    /// Scene handed to scene-rendering passes.
    type Scene: ?Sized;
    /// Camera the scene is rendered with.
    type Camera: ?Sized;

    /// Allocate an offscreen target.
    fn create_target(
        &mut self,
        width: u32,
        height: u32,
        preset: RenderTargetPreset,
    ) -> Self::Target;

    /// Reallocate `target` at a new resolution, keeping its preset.
    fn resize_target(&mut self, target: &mut Self::Target, width: u32, height: u32);

    /// Release a target allocated with [`Renderer::create_target`].
    fn release_target(&mut self, target: Self::Target);

    /// Build a material that samples its input and writes it unchanged.
    fn copy_material(&mut self) -> Self::Material;

    /// Release a material obtained from this renderer.
    fn release_material(&mut self, material: Self::Material);

    /// Render `scene` from `camera` into `destination`, clearing it to
    /// `clear` first when given.
    fn render_scene(
        &mut self,
        scene: &Self::Scene,
        camera: &Self::Camera,
        destination: RenderDestination<'_, Self::Target>,
        clear: Option<ClearColor>,
    );

    /// Draw a full-screen quad with `material`, sampling `input`.
    ///
    /// Callers go through [`QuadRenderable::draw`], which resolves the
    /// material and guards the unassigned case.
    fn render_quad(
        &mut self,
        quad: &QuadRenderable<Self::Material>,
        material: &Self::Material,
        input: &Self::Target,
        destination: RenderDestination<'_, Self::Target>,
        clear: Option<ClearColor>,
    );

    /// Blit `source` to the visible framebuffer.
    fn copy_to_screen(&mut self, source: &Self::Target);
}
