//! In-memory renderer double for tests.
//!
//! Targets carry an "image" string instead of pixels: a scene render writes
//! the scene name, a quad draw copies its input's image. Live targets and
//! materials are counted so disposal can be checked.

use super::{ClearColor, RenderDestination, Renderer};
use crate::pass::quad::QuadRenderable;
use crate::preset::RenderTargetPreset;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FakeTarget {
    id: u32,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) preset: RenderTargetPreset,
    pub(crate) image: Option<String>,
}

impl FakeTarget {
    pub(crate) const fn id(&self) -> u32 {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FakeMaterial {
    pub(crate) id: u32,
}

/// One recorded draw. `destination: None` means the screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Draw {
    Scene {
        scene: String,
        destination: Option<u32>,
        cleared: bool,
    },
    Quad {
        input: u32,
        destination: Option<u32>,
        cleared: bool,
    },
    CopyToScreen {
        source: u32,
    },
}

#[derive(Debug, Default)]
pub(crate) struct RecordingRenderer {
    next_id: u32,
    live_targets: usize,
    live_materials: usize,
    draws: Vec<Draw>,
    screen: Option<String>,
}

impl RecordingRenderer {
    pub(crate) fn draws(&self) -> &[Draw] {
        &self.draws
    }

    pub(crate) const fn live_targets(&self) -> usize {
        self.live_targets
    }

    pub(crate) const fn live_materials(&self) -> usize {
        self.live_materials
    }

    pub(crate) fn screen(&self) -> Option<&str> {
        self.screen.as_deref()
    }

    fn next_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    fn write(
        &mut self,
        destination: RenderDestination<'_, FakeTarget>,
        image: Option<String>,
    ) -> Option<u32> {
        match destination {
            RenderDestination::Screen => {
                self.screen = image;
                None
            }
            RenderDestination::Target(target) => {
                target.image = image;
                Some(target.id)
            }
        }
    }
}

impl Renderer for RecordingRenderer {
    type Target = FakeTarget;
    type Material = FakeMaterial;
    type Scene = str;
    type Camera = str;

    fn create_target(
        &mut self,
        width: u32,
        height: u32,
        preset: RenderTargetPreset,
    ) -> FakeTarget {
        self.live_targets += 1;
        FakeTarget {
            id: self.next_id(),
            width,
            height,
            preset,
            image: None,
        }
    }

    fn resize_target(&mut self, target: &mut FakeTarget, width: u32, height: u32) {
        target.width = width;
        target.height = height;
        target.image = None;
    }

    fn release_target(&mut self, _target: FakeTarget) {
        self.live_targets -= 1;
    }

    fn copy_material(&mut self) -> FakeMaterial {
        self.live_materials += 1;
        FakeMaterial { id: self.next_id() }
    }

    fn release_material(&mut self, _material: FakeMaterial) {
        self.live_materials -= 1;
    }

    fn render_scene(
        &mut self,
        scene: &str,
        camera: &str,
        destination: RenderDestination<'_, FakeTarget>,
        clear: Option<ClearColor>,
    ) {
        let image = format!("{scene}@{camera}");
        let destination = self.write(destination, Some(image));
        self.draws.push(Draw::Scene {
            scene: scene.to_owned(),
            destination,
            cleared: clear.is_some(),
        });
    }

    fn render_quad(
        &mut self,
        _quad: &QuadRenderable<FakeMaterial>,
        _material: &FakeMaterial,
        input: &FakeTarget,
        destination: RenderDestination<'_, FakeTarget>,
        clear: Option<ClearColor>,
    ) {
        let destination = self.write(destination, input.image.clone());
        self.draws.push(Draw::Quad {
            input: input.id,
            destination,
            cleared: clear.is_some(),
        });
    }

    fn copy_to_screen(&mut self, source: &FakeTarget) {
        self.screen.clone_from(&source.image);
        self.draws.push(Draw::CopyToScreen { source: source.id });
    }
}
