//! wgpu backend.
//!
//! Provides device/surface initialization, preset-driven render targets,
//! the full-screen quad material and the [`WgpuRenderer`] that draws
//! passes.

/// Quad shading state and its bind group layouts.
pub mod material;
/// Shared wgpu boilerplate helpers for full-screen quad pipelines.
pub mod pipeline_helpers;
/// wgpu device, surface, and queue initialization.
pub mod render_context;
/// Render targets allocated from presets.
pub mod texture;
/// The wgpu [`crate::renderer::Renderer`].
pub mod wgpu_renderer;

pub use material::QuadMaterial;
pub use render_context::{RenderContext, RenderContextError};
pub use texture::RenderTarget;
pub use wgpu_renderer::{SceneDraw, WgpuRenderer};
