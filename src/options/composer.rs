use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::preset::RenderTargetPreset;

/// Settings for the composer's read/write buffer pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Composer", inline)]
#[serde(default)]
pub struct ComposerOptions {
    /// Preset the buffer pair is allocated with.
    #[schemars(title = "Buffer Preset")]
    pub buffer_preset: RenderTargetPreset,
    /// Initial buffer width in pixels.
    #[schemars(title = "Width", range(min = 1))]
    pub width: u32,
    /// Initial buffer height in pixels.
    #[schemars(title = "Height", range(min = 1))]
    pub height: u32,
}

impl Default for ComposerOptions {
    fn default() -> Self {
        Self {
            buffer_preset: RenderTargetPreset::RgbaLinear,
            width: 1280,
            height: 720,
        }
    }
}
