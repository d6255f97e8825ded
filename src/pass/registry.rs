//! Kind-tag dispatch for rebuilding passes from records.

use rustc_hash::FxHashMap;

use super::record::PassRecord;
use super::Pass;
use crate::error::PostFxError;
use crate::renderer::Renderer;

/// Builds a default-configured pass of one kind.
pub type Constructor<R> = fn() -> Box<dyn Pass<R>>;

fn construct<P, R>() -> Box<dyn Pass<R>>
where
    P: Pass<R> + Default + 'static,
    R: Renderer,
{
    Box::new(P::default())
}

/// Maps pass kind tags to constructors.
pub struct PassRegistry<R: Renderer> {
    constructors: FxHashMap<String, Constructor<R>>,
}

impl<R: Renderer> Default for PassRegistry<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Renderer + 'static> PassRegistry<R> {
    /// Registry pre-filled with the built-in passes.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::passes::register_builtin_passes(&mut registry);
        registry
    }

    /// Register `P` under its own kind tag, built through its `Default`.
    pub fn register<P>(&mut self)
    where
        P: Pass<R> + Default + 'static,
    {
        let kind = <P as Pass<R>>::kind(&P::default());
        self.register_fn(kind, construct::<P, R>);
    }
}

impl<R: Renderer> PassRegistry<R> {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            constructors: FxHashMap::default(),
        }
    }

    /// Register a constructor under `kind`, replacing any previous one.
    ///
    /// The constructor must build passes whose [`Pass::kind`] is `kind`,
    /// otherwise a saved chain changes tags on reload.
    pub fn register_fn(&mut self, kind: &str, constructor: Constructor<R>) {
        let built = constructor().kind();
        if built != kind {
            log::warn!("constructor registered as {kind} builds {built} passes");
        }
        if self
            .constructors
            .insert(kind.to_owned(), constructor)
            .is_some()
        {
            log::debug!("replaced constructor for {kind} passes");
        }
    }

    /// Whether `kind` has a constructor.
    #[must_use]
    pub fn contains(&self, kind: &str) -> bool {
        self.constructors.contains_key(kind)
    }

    /// Registered kind tags, sorted.
    #[must_use]
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> =
            self.constructors.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }

    /// Rebuild a pass: construct by kind, restore the base fields
    /// verbatim (id included), then let the pass restore its own.
    ///
    /// # Errors
    ///
    /// [`PostFxError::UnknownPassKind`] if no constructor is registered
    /// for the record's kind, or whatever the pass's
    /// [`Pass::restore`] reports.
    pub fn deserialize(
        &self,
        record: &PassRecord,
    ) -> Result<Box<dyn Pass<R>>, PostFxError> {
        let constructor = self
            .constructors
            .get(&record.kind)
            .ok_or_else(|| PostFxError::UnknownPassKind(record.kind.clone()))?;
        let mut pass = constructor();
        *pass.state_mut() = record.to_state();
        pass.restore(record)?;
        Ok(pass)
    }

    /// Parse a JSON record and rebuild the pass.
    ///
    /// # Errors
    ///
    /// See [`PassRecord::from_json`] and [`PassRegistry::deserialize`].
    pub fn deserialize_json(
        &self,
        json: &str,
    ) -> Result<Box<dyn Pass<R>>, PostFxError> {
        self.deserialize(&PassRecord::from_json(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pass::state::ScreenOutput;
    use crate::passes::{BasePass, CopyPass, ScenePass};
    use crate::renderer::recording::{FakeMaterial, RecordingRenderer};

    type Registry = PassRegistry<RecordingRenderer>;

    fn sample_passes() -> Vec<Box<dyn Pass<RecordingRenderer>>> {
        let mut base = BasePass::new();
        base.state_mut().set_enabled(false);

        let mut scene = ScenePass::new();
        scene.state_mut().set_needs_buffer_swap(false);
        scene.set_clear_color([0.1, 0.2, 0.3, 1.0]);

        let mut copy = CopyPass::new();
        copy.state_mut().set_output(ScreenOutput::Copy);

        vec![Box::new(base), Box::new(scene), Box::new(copy)]
    }

    #[test]
    fn builtins_cover_every_shipped_kind() {
        let registry = Registry::with_builtins();
        assert_eq!(registry.kinds(), vec!["CopyPass", "Pass", "RenderPass"]);
    }

    #[test]
    fn round_trip_preserves_kind_and_flags() {
        let registry = Registry::with_builtins();
        for pass in sample_passes() {
            let json = pass.serialize().unwrap().to_json().unwrap();
            let restored = registry.deserialize_json(&json).unwrap();

            assert_eq!(restored.kind(), pass.kind());
            assert_eq!(restored.id(), pass.id());
            let (a, b) = (restored.state(), pass.state());
            assert_eq!(a.enabled(), b.enabled());
            assert_eq!(a.clear_before_render(), b.clear_before_render());
            assert_eq!(a.needs_buffer_swap(), b.needs_buffer_swap());
            assert_eq!(a.render_to_screen(), b.render_to_screen());
            assert_eq!(a.copy_result_to_screen(), b.copy_result_to_screen());
            assert_eq!(restored.serialize().unwrap(), pass.serialize().unwrap());
        }
    }

    #[test]
    fn unknown_kind_fails_instead_of_defaulting() {
        let registry = Registry::with_builtins();
        let mut record = BasePass::new().record();
        record.kind = "BloomPass".to_owned();
        match registry.deserialize(&record) {
            Err(PostFxError::UnknownPassKind(kind)) => assert_eq!(kind, "BloomPass"),
            Err(other) => panic!("unexpected error {other}"),
            Ok(_) => panic!("unknown kind produced a pass"),
        }
    }

    #[test]
    fn custom_kinds_can_be_registered() {
        let mut registry = Registry::new();
        assert!(!registry.contains("Pass"));
        registry.register::<BasePass>();
        assert!(registry.contains("Pass"));
        let pass = registry.deserialize(&BasePass::new().record()).unwrap();
        assert_eq!(pass.kind(), "Pass");
    }

    #[test]
    fn registration_is_keyed_on_the_pass_kind() {
        let mut registry = Registry::new();
        registry.register::<ScenePass>();
        registry.register::<CopyPass<FakeMaterial>>();
        assert_eq!(registry.kinds(), vec!["CopyPass", "RenderPass"]);

        let scene: Box<dyn Pass<RecordingRenderer>> = Box::new(ScenePass::new());
        let record = scene.serialize().unwrap();
        let restored = registry.deserialize(&record).unwrap();
        assert_eq!(restored.serialize().unwrap().kind, record.kind);
    }
}
