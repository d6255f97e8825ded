//! Named render-target configurations for intermediate buffers.
//!
//! Passes use these when allocating their own offscreen targets, and the
//! composer uses one for its read/write pair. Pick [`RenderTargetPreset::RgbLinear`]
//! when the alpha channel is not needed and [`RenderTargetPreset::RgbaNearest`]
//! whenever the buffer encodes data (object ids, packed masks) rather than
//! color.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Texture sampling filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Filter {
    /// Interpolate between neighboring texels.
    Linear,
    /// Take the closest texel, no interpolation.
    Nearest,
}

/// Channel layout of a render target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// Red, green, blue and alpha.
    Rgba,
    /// Red, green and blue only.
    Rgb,
}

impl PixelFormat {
    /// Whether the format carries an alpha channel.
    #[must_use]
    pub const fn has_alpha(self) -> bool {
        matches!(self, Self::Rgba)
    }
}

/// The (minification filter, magnification filter, pixel format) triple a
/// preset stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetParams {
    /// Filter used when the target is sampled at a smaller size.
    pub min_filter: Filter,
    /// Filter used when the target is sampled at a larger size.
    pub mag_filter: Filter,
    /// Channel layout.
    pub format: PixelFormat,
}

/// One of the three canonical render-target configurations.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    JsonSchema,
)]
pub enum RenderTargetPreset {
    /// Linear-filtered RGBA.
    #[default]
    #[serde(rename = "RGBALinear")]
    RgbaLinear,
    /// Linear-filtered RGB, no alpha.
    #[serde(rename = "RGBLinear")]
    RgbLinear,
    /// Nearest-filtered RGBA for non-color data.
    #[serde(rename = "RGBANearest")]
    RgbaNearest,
}

impl RenderTargetPreset {
    /// Every preset, in declaration order.
    pub const ALL: [Self; 3] = [Self::RgbaLinear, Self::RgbLinear, Self::RgbaNearest];

    /// Filter, filter and format of this preset.
    #[must_use]
    pub const fn params(self) -> TargetParams {
        match self {
            Self::RgbaLinear => TargetParams {
                min_filter: Filter::Linear,
                mag_filter: Filter::Linear,
                format: PixelFormat::Rgba,
            },
            Self::RgbLinear => TargetParams {
                min_filter: Filter::Linear,
                mag_filter: Filter::Linear,
                format: PixelFormat::Rgb,
            },
            Self::RgbaNearest => TargetParams {
                min_filter: Filter::Nearest,
                mag_filter: Filter::Nearest,
                format: PixelFormat::Rgba,
            },
        }
    }

    /// Minification filter.
    #[must_use]
    pub const fn min_filter(self) -> Filter {
        self.params().min_filter
    }

    /// Magnification filter.
    #[must_use]
    pub const fn mag_filter(self) -> Filter {
        self.params().mag_filter
    }

    /// Pixel format.
    #[must_use]
    pub const fn format(self) -> PixelFormat {
        self.params().format
    }

    /// The identifier used in serialized data (`"RGBALinear"`, ...).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::RgbaLinear => "RGBALinear",
            Self::RgbLinear => "RGBLinear",
            Self::RgbaNearest => "RGBANearest",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearest_preset_is_unfiltered_rgba() {
        let params = RenderTargetPreset::RgbaNearest.params();
        assert_eq!(params.min_filter, Filter::Nearest);
        assert_eq!(params.mag_filter, Filter::Nearest);
        assert_eq!(params.format, PixelFormat::Rgba);
    }

    #[test]
    fn rgb_linear_has_no_alpha() {
        let preset = RenderTargetPreset::RgbLinear;
        assert_eq!(preset.min_filter(), Filter::Linear);
        assert_eq!(preset.mag_filter(), Filter::Linear);
        assert_eq!(preset.format(), PixelFormat::Rgb);
        assert!(!preset.format().has_alpha());
    }

    #[test]
    fn rgba_linear_is_the_default() {
        let preset = RenderTargetPreset::default();
        assert_eq!(preset, RenderTargetPreset::RgbaLinear);
        assert!(preset.format().has_alpha());
        assert_eq!(preset.min_filter(), Filter::Linear);
    }

    #[test]
    fn serializes_by_canonical_name() {
        for preset in RenderTargetPreset::ALL {
            let json = serde_json::to_string(&preset).unwrap();
            assert_eq!(json, format!("\"{}\"", preset.name()));
        }
        let parsed: RenderTargetPreset =
            serde_json::from_str("\"RGBANearest\"").unwrap();
        assert_eq!(parsed, RenderTargetPreset::RgbaNearest);
    }
}
