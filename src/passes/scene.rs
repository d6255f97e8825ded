use crate::error::PostFxError;
use crate::pass::{Pass, PassContext, PassRecord, PassState};
use crate::renderer::{ClearColor, Renderer};

/// Renders the scene from the camera, usually the first pass of a chain.
///
/// Clears before drawing by default, using [`ScenePass::clear_color`].
#[derive(Debug)]
pub struct ScenePass {
    state: PassState,
    clear_color: ClearColor,
}

impl Default for ScenePass {
    fn default() -> Self {
        Self::new()
    }
}

impl ScenePass {
    /// Kind tag.
    pub const KIND: &'static str = "RenderPass";

    const CLEAR_COLOR_PARAM: &'static str = "clearColor";

    /// Scene pass clearing to opaque black.
    #[must_use]
    pub fn new() -> Self {
        let mut state = PassState::new();
        state.set_clear_before_render(true);
        Self {
            state,
            clear_color: [0.0, 0.0, 0.0, 1.0],
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

    /// Color the destination is cleared to.
    #[must_use]
    pub const fn clear_color(&self) -> ClearColor {
        self.clear_color
    }

    /// Set the clear color.
    pub fn set_clear_color(&mut self, color: ClearColor) {
        self.clear_color = color;
    }
}

impl<R: Renderer> Pass<R> for ScenePass {
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
        let clear = self
            .state
            .clear_before_render()
            .then_some(self.clear_color);
        let (scene, camera) = (ctx.scene, ctx.camera);
        let (renderer, destination) = ctx.output();
        renderer.render_scene(scene, camera, destination, clear);
    }

    fn serialize(&self) -> Result<PassRecord, PostFxError> {
        let mut record = PassRecord::from_state(Self::KIND, &self.state);
        record.set_param(Self::CLEAR_COLOR_PARAM, &self.clear_color)?;
        Ok(record)
    }

    fn restore(&mut self, record: &PassRecord) -> Result<(), PostFxError> {
        if let Some(color) = record.param(Self::CLEAR_COLOR_PARAM)? {
            self.clear_color = color;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pass::PassRegistry;
    use crate::renderer::recording::{Draw, RecordingRenderer};

    #[test]
    fn clears_by_default() {
        let pass = ScenePass::new();
        assert!(pass.state().clear_before_render());
        assert!(pass.state().needs_buffer_swap());
    }

    #[test]
    fn renders_scene_into_write_buffer_leaving_read_untouched() {
        let mut renderer = RecordingRenderer::default();
        let mut write = renderer.create_target(8, 8, Default::default());
        let mut read = renderer.create_target(8, 8, Default::default());
        read.image = Some("previous".to_owned());
        let mut pass = ScenePass::new();

        let mut ctx =
            PassContext::new(&mut renderer, &mut write, &read, "level", "main");
        Pass::<RecordingRenderer>::render(&mut pass, &mut ctx);

        assert_eq!(write.image.as_deref(), Some("level@main"));
        assert_eq!(read.image.as_deref(), Some("previous"));
        assert_eq!(
            renderer.draws(),
            &[Draw::Scene {
                scene: "level".to_owned(),
                destination: Some(write.id()),
                cleared: true,
            }]
        );
    }

    #[test]
    fn clear_flag_off_skips_the_clear() {
        let mut renderer = RecordingRenderer::default();
        let mut write = renderer.create_target(8, 8, Default::default());
        let read = renderer.create_target(8, 8, Default::default());
        let mut pass = ScenePass::new();
        pass.state_mut().set_clear_before_render(false);

        let mut ctx = PassContext::new(&mut renderer, &mut write, &read, "s", "c");
        Pass::<RecordingRenderer>::render(&mut pass, &mut ctx);

        assert!(matches!(
            renderer.draws(),
            [Draw::Scene { cleared: false, .. }]
        ));
    }

    #[test]
    fn clear_color_survives_a_round_trip() {
        let mut pass = ScenePass::new();
        pass.set_clear_color([0.25, 0.5, 0.75, 1.0]);
        let record = Pass::<RecordingRenderer>::serialize(&pass).unwrap();

        let registry = PassRegistry::<RecordingRenderer>::with_builtins();
        let restored = registry.deserialize(&record).unwrap();
        assert_eq!(restored.serialize().unwrap(), record);
    }

    #[test]
    fn malformed_clear_color_is_rejected() {
        let mut record =
            Pass::<RecordingRenderer>::serialize(&ScenePass::new()).unwrap();
        record.set_param("clearColor", &"red").unwrap();
        let registry = PassRegistry::<RecordingRenderer>::with_builtins();
        assert!(matches!(
            registry.deserialize(&record),
            Err(PostFxError::InvalidParam { .. })
        ));
    }
}
