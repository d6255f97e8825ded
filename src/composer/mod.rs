//! Ordered pass chain over an alternating read/write buffer pair.
//!
//! Each frame the composer walks its passes in order. An enabled pass gets
//! the current read buffer as input and the write buffer as output (or the
//! screen); afterwards the two swap roles if the pass asks for it. Disabled
//! passes are skipped outright, so the next enabled pass sees the same read
//! buffer.
//!
//! Passes marked [`ScreenOutput::Copy`] render into a staging target owned
//! by the composer, which is then copied to the screen. The read/write pair
//! is untouched by such a pass and never swaps, whatever its
//! `needs_buffer_swap` flag says.

mod document;

pub use document::{DocumentMetadata, PipelineDocument};

use rustc_hash::FxHashSet;

use crate::error::PostFxError;
use crate::options::ComposerOptions;
use crate::pass::{Pass, PassContext, PassId, PassRegistry, ScreenOutput};
use crate::preset::RenderTargetPreset;
use crate::renderer::Renderer;
use crate::util::frame_clock::FrameClock;

/// The two buffers passes alternate between.
#[derive(Debug)]
pub struct BufferPair<T> {
    read: T,
    write: T,
}

impl<T> BufferPair<T> {
    /// Pair with the given initial roles.
    pub const fn new(read: T, write: T) -> Self {
        Self { read, write }
    }

    /// Buffer the next pass reads.
    pub const fn read(&self) -> &T {
        &self.read
    }

    /// Buffer the next pass writes.
    pub const fn write(&self) -> &T {
        &self.write
    }

    /// Exchange read and write roles.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.read, &mut self.write);
    }

    fn into_inner(self) -> (T, T) {
        (self.read, self.write)
    }
}

/// Owns the pass list and buffer pair and drives the per-frame loop.
pub struct PassComposer<R: Renderer> {
    passes: Vec<Box<dyn Pass<R>>>,
    buffers: BufferPair<R::Target>,
    staging: Option<R::Target>,
    preset: RenderTargetPreset,
    width: u32,
    height: u32,
    mask_active: bool,
    clock: FrameClock,
}

impl<R: Renderer> PassComposer<R> {
    /// Allocate the buffer pair described by `options`. Zero dimensions
    /// are raised to one pixel.
    pub fn new(renderer: &mut R, options: &ComposerOptions) -> Self {
        let width = options.width.max(1);
        let height = options.height.max(1);
        let preset = options.buffer_preset;
        let read = renderer.create_target(width, height, preset);
        let write = renderer.create_target(width, height, preset);
        log::debug!(
            "composer buffers {width}x{height} ({})",
            preset.name()
        );
        Self {
            passes: Vec::new(),
            buffers: BufferPair::new(read, write),
            staging: None,
            preset,
            width,
            height,
            mask_active: false,
            clock: FrameClock::new(),
        }
    }

    /// Append a pass, sized to the composer's current resolution.
    pub fn add_pass(&mut self, renderer: &mut R, pass: impl Pass<R> + 'static) -> PassId {
        self.add_boxed(renderer, Box::new(pass))
    }

    /// Append an already boxed pass.
    pub fn add_boxed(&mut self, renderer: &mut R, pass: Box<dyn Pass<R>>) -> PassId {
        let index = self.passes.len();
        self.insert_boxed(renderer, index, pass)
    }

    /// Insert a pass at `index` (clamped to the list length).
    pub fn insert_pass(
        &mut self,
        renderer: &mut R,
        index: usize,
        pass: impl Pass<R> + 'static,
    ) -> PassId {
        self.insert_boxed(renderer, index, Box::new(pass))
    }

    fn insert_boxed(
        &mut self,
        renderer: &mut R,
        index: usize,
        mut pass: Box<dyn Pass<R>>,
    ) -> PassId {
        let id = pass.id();
        debug_assert!(
            self.index_of(id).is_none(),
            "pass {id} is already in the composer"
        );
        pass.resize(renderer, self.width, self.height);
        let index = index.min(self.passes.len());
        log::debug!("adding {} pass {id} at {index}", pass.kind());
        self.passes.insert(index, pass);
        id
    }

    /// Remove a pass and dispose it. Returns `false` if no pass has `id`.
    pub fn remove_pass(&mut self, renderer: &mut R, id: PassId) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        let mut pass = self.passes.remove(index);
        if !pass.state().is_disposed() {
            pass.release(renderer);
        }
        true
    }

    /// The passes in execution order.
    pub fn passes(&self) -> &[Box<dyn Pass<R>>] {
        &self.passes
    }

    /// Look up a pass by id.
    pub fn pass(&self, id: PassId) -> Option<&(dyn Pass<R> + 'static)> {
        self.passes
            .iter()
            .find(|pass| pass.id() == id)
            .map(|pass| &**pass)
    }

    /// Look up a pass by id for reconfiguration.
    pub fn pass_mut(&mut self, id: PassId) -> Option<&mut (dyn Pass<R> + 'static)> {
        self.passes
            .iter_mut()
            .find(|pass| pass.id() == id)
            .map(|pass| &mut **pass)
    }

    fn index_of(&self, id: PassId) -> Option<usize> {
        self.passes.iter().position(|pass| pass.id() == id)
    }

    /// Number of passes.
    pub fn len(&self) -> usize {
        self.passes.len()
    }

    /// Whether the chain has no passes.
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    /// Buffer the next pass reads; after a frame, the chain's result.
    pub const fn read_buffer(&self) -> &R::Target {
        self.buffers.read()
    }

    /// Buffer the next pass writes.
    pub const fn write_buffer(&self) -> &R::Target {
        self.buffers.write()
    }

    /// Exchange read and write roles.
    pub fn swap_buffers(&mut self) {
        self.buffers.swap();
    }

    /// Current buffer resolution.
    pub const fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Preset the buffers were allocated with.
    pub const fn preset(&self) -> RenderTargetPreset {
        self.preset
    }

    /// Whether a stencil mask is active for the passes that run next.
    pub const fn mask_active(&self) -> bool {
        self.mask_active
    }

    /// Set the mask flag handed to passes.
    pub fn set_mask_active(&mut self, active: bool) {
        self.mask_active = active;
    }

    /// Smoothed frame rate seen by [`PassComposer::render_frame`].
    pub fn fps(&self) -> f32 {
        self.clock.fps()
    }

    /// Resize the buffers and notify every live pass. Zero dimensions and
    /// unchanged sizes are ignored.
    pub fn set_size(&mut self, renderer: &mut R, width: u32, height: u32) {
        if width == 0 || height == 0 || (width, height) == (self.width, self.height) {
            return;
        }
        log::debug!("resizing composer to {width}x{height}");
        self.width = width;
        self.height = height;
        renderer.resize_target(&mut self.buffers.read, width, height);
        renderer.resize_target(&mut self.buffers.write, width, height);
        if let Some(staging) = self.staging.as_mut() {
            renderer.resize_target(staging, width, height);
        }
        for pass in &mut self.passes {
            debug_assert!(
                !pass.state().is_disposed(),
                "resize of disposed pass {}",
                pass.id()
            );
            if pass.state().is_disposed() {
                log::warn!("skipping resize of disposed pass {}", pass.id());
                continue;
            }
            pass.resize(renderer, width, height);
        }
    }

    /// Run one frame, timing it with the composer's own clock.
    pub fn render_frame(&mut self, renderer: &mut R, scene: &R::Scene, camera: &R::Camera) {
        let delta_ms = self.clock.tick();
        self.render(renderer, delta_ms, scene, camera);
    }

    /// Run every enabled pass in order.
    pub fn render(
        &mut self,
        renderer: &mut R,
        delta_ms: f32,
        scene: &R::Scene,
        camera: &R::Camera,
    ) {
        let needs_staging = self.passes.iter().any(|pass| {
            pass.state().enabled() && pass.state().output() == ScreenOutput::Copy
        });
        if needs_staging && self.staging.is_none() {
            self.staging =
                Some(renderer.create_target(self.width, self.height, self.preset));
        }

        for pass in &mut self.passes {
            let state = pass.state();
            if !state.enabled() {
                continue;
            }
            debug_assert!(
                !state.is_disposed(),
                "render of disposed pass {}",
                state.id()
            );
            if state.is_disposed() {
                log::warn!("skipping disposed pass {}", state.id());
                continue;
            }
            let output = state.output();
            let swap = state.needs_buffer_swap() && output != ScreenOutput::Copy;

            if output == ScreenOutput::Copy {
                if let Some(staging) = self.staging.as_mut() {
                    let mut ctx = PassContext::new(
                        renderer,
                        staging,
                        &self.buffers.read,
                        scene,
                        camera,
                    )
                    .with_delta_ms(delta_ms)
                    .with_mask_active(self.mask_active);
                    pass.render(&mut ctx);
                    renderer.copy_to_screen(staging);
                }
            } else {
                let BufferPair { read, write } = &mut self.buffers;
                let mut ctx = PassContext::new(renderer, write, read, scene, camera)
                    .with_delta_ms(delta_ms)
                    .with_mask_active(self.mask_active)
                    .to_screen(output == ScreenOutput::Direct);
                pass.render(&mut ctx);
            }

            if swap {
                self.buffers.swap();
            }
        }
    }

    /// Records of every pass, in order, under a metadata header.
    ///
    /// # Errors
    ///
    /// Whatever a pass's [`Pass::serialize`] reports.
    pub fn to_document(&self) -> Result<PipelineDocument, PostFxError> {
        let passes = self
            .passes
            .iter()
            .map(|pass| pass.serialize())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PipelineDocument {
            metadata: DocumentMetadata::current(),
            passes,
        })
    }

    /// Pretty-printed JSON of [`PassComposer::to_document`].
    ///
    /// # Errors
    ///
    /// See [`PassComposer::to_document`].
    pub fn to_json(&self) -> Result<String, PostFxError> {
        Ok(serde_json::to_string_pretty(&self.to_document()?)?)
    }

    /// Dispose every pass, then release the buffers.
    pub fn dispose(mut self, renderer: &mut R) {
        for mut pass in self.passes.drain(..) {
            if !pass.state().is_disposed() {
                pass.release(renderer);
            }
        }
        if let Some(staging) = self.staging.take() {
            renderer.release_target(staging);
        }
        let (read, write) = self.buffers.into_inner();
        renderer.release_target(read);
        renderer.release_target(write);
    }
}

impl<R: Renderer + 'static> PassComposer<R> {
    /// Build a composer from a document, rebuilding each pass through
    /// `registry`.
    ///
    /// # Errors
    ///
    /// [`PostFxError::UnknownPassKind`] or [`PostFxError::InvalidParam`]
    /// from the registry, [`PostFxError::DuplicatePassId`] if two records
    /// share an id. Nothing is allocated when rebuilding fails.
    pub fn from_document(
        renderer: &mut R,
        registry: &PassRegistry<R>,
        options: &ComposerOptions,
        document: &PipelineDocument,
    ) -> Result<Self, PostFxError> {
        document.metadata.check_version();
        let passes = document
            .passes
            .iter()
            .map(|record| registry.deserialize(record))
            .collect::<Result<Vec<_>, _>>()?;
        let mut ids = FxHashSet::default();
        if let Some(pass) = passes.iter().find(|pass| !ids.insert(pass.id())) {
            return Err(PostFxError::DuplicatePassId(pass.id()));
        }
        let mut composer = Self::new(renderer, options);
        for pass in passes {
            let _ = composer.add_boxed(renderer, pass);
        }
        Ok(composer)
    }

    /// Parse a JSON document and build a composer from it.
    ///
    /// # Errors
    ///
    /// [`PostFxError::Record`] for malformed JSON, otherwise see
    /// [`PassComposer::from_document`].
    pub fn from_json(
        renderer: &mut R,
        registry: &PassRegistry<R>,
        options: &ComposerOptions,
        json: &str,
    ) -> Result<Self, PostFxError> {
        let document: PipelineDocument = serde_json::from_str(json)?;
        Self::from_document(renderer, registry, options, &document)
    }
}
