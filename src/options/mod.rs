//! Pipeline configuration with TOML file support.
//!
//! Options serialize to/from TOML. Every section uses `#[serde(default)]`,
//! so a file only needs the values it overrides.

mod composer;

use std::path::Path;

pub use composer::ComposerOptions;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::PostFxError;

/// Top-level options container.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema,
)]
#[serde(default)]
pub struct Options {
    /// Buffer pair configuration.
    pub composer: ComposerOptions,
}

impl Options {
    /// Generate JSON Schema describing the options.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Options)
    }

    /// Load options from a TOML file. Missing fields use defaults.
    ///
    /// # Errors
    ///
    /// [`PostFxError::Io`] if the file cannot be read,
    /// [`PostFxError::OptionsParse`] if it is not valid options TOML.
    pub fn load(path: &Path) -> Result<Self, PostFxError> {
        let content = std::fs::read_to_string(path).map_err(PostFxError::Io)?;
        Self::from_toml(&content)
    }

    /// Parse options from TOML text.
    ///
    /// # Errors
    ///
    /// [`PostFxError::OptionsParse`] if the text is not valid options TOML.
    pub fn from_toml(content: &str) -> Result<Self, PostFxError> {
        toml::from_str(content)
            .map_err(|e| PostFxError::OptionsParse(e.to_string()))
    }

    /// Save options to a TOML file (pretty-printed).
    ///
    /// # Errors
    ///
    /// [`PostFxError::OptionsParse`] if serialization fails,
    /// [`PostFxError::Io`] if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), PostFxError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| PostFxError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(PostFxError::Io)?;
        }
        std::fs::write(path, content).map_err(PostFxError::Io)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preset::RenderTargetPreset;

    #[test]
    fn default_round_trips_through_toml() {
        let opts = Options::default();
        let toml_str = toml::to_string_pretty(&opts).unwrap();
        let parsed: Options = toml::from_str(&toml_str).unwrap();
        assert_eq!(opts, parsed);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r#"
[composer]
buffer_preset = "RGBANearest"
"#;
        let opts = Options::from_toml(toml_str).unwrap();
        assert_eq!(opts.composer.buffer_preset, RenderTargetPreset::RgbaNearest);
        // Everything else should be default
        assert_eq!(opts.composer.width, 1280);
        assert_eq!(opts.composer.height, 720);
    }

    #[test]
    fn unknown_preset_is_a_parse_error() {
        let err = Options::from_toml("[composer]\nbuffer_preset = \"RGB16\"\n")
            .unwrap_err();
        assert!(matches!(err, PostFxError::OptionsParse(_)));
    }

    #[test]
    fn save_then_load() {
        let dir = std::env::temp_dir()
            .join(format!("postfx-options-{}", std::process::id()));
        let path = dir.join("pipeline.toml");
        let mut opts = Options::default();
        opts.composer.width = 640;
        opts.save(&path).unwrap();
        assert_eq!(Options::load(&path).unwrap(), opts);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn schema_has_expected_properties() {
        let schema_value =
            serde_json::to_value(Options::json_schema()).unwrap();
        let props = schema_value["properties"].as_object().unwrap();
        assert!(props.contains_key("composer"));
        let composer = &props["composer"]["properties"];
        assert!(composer.get("buffer_preset").is_some());
        assert!(composer.get("width").is_some());
    }
}
