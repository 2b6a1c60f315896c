//! Pixel decoding: RGBM expansion and gamma to linear conversion
//!
//! Cubemap texels carry HDR color packed as RGBM, where alpha is a
//! multiplier over a fixed range:
//!
//! ```text
//! color = rgb * a * RGBM_RANGE
//! ```
//!
//! The decoded value is then optionally moved from gamma-encoded to linear
//! space, depending on the [`ColorSpace`] the lighting is computed in.

use crate::math::Color;
use serde::{Deserialize, Serialize};

/// Fixed RGBM multiplier range
///
/// Calibrated against the downstream ambient lighting units. Changing it
/// changes the absolute brightness of every projection.
pub const RGBM_RANGE: f32 = 8.0;

/// Color space the lighting pipeline works in
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorSpace {
    /// Linear lighting: gamma-encoded texels are converted before use
    #[default]
    Linear,
    /// Gamma lighting: texels are used as stored
    Gamma,
}

impl ColorSpace {
    /// Prepare a decoded color for accumulation in this color space
    pub fn prepare(self, color: Color) -> Color {
        match self {
            ColorSpace::Linear => color.to_linear(),
            ColorSpace::Gamma => color,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ColorSpace::Linear => "linear",
            ColorSpace::Gamma => "gamma",
        }
    }
}

impl std::fmt::Display for ColorSpace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Expand an RGBM texel to HDR color
///
/// Alpha is carried through unchanged.
pub fn decode_rgbm(rgbm: Color) -> Color {
    rgbm.scale(rgbm.a * RGBM_RANGE)
}

/// Pack HDR color back into RGBM
///
/// Alpha is chosen as `max(rgb) / RGBM_RANGE`, clamped to 1.0, so
/// `decode_rgbm(encode_rgbm(c))` reproduces `c`. Colors brighter than the
/// range keep alpha at 1.0 and carry the excess in the color channels.
pub fn encode_rgbm(color: Color) -> Color {
    let peak = color.r.max(color.g).max(color.b);
    if peak <= 0.0 {
        return Color::TRANSPARENT;
    }
    let alpha = (peak / RGBM_RANGE).min(1.0);
    let inv = 1.0 / (alpha * RGBM_RANGE);
    Color::rgba(color.r * inv, color.g * inv, color.b * inv, alpha)
}

/// sRGB transfer function, encoded to linear
///
/// Values above 1.0 follow the same power curve.
pub fn gamma_to_linear(value: f32) -> f32 {
    if value <= 0.04045 {
        value / 12.92
    } else {
        ((value + 0.055) / 1.055).powf(2.4)
    }
}

/// Decode one texel for accumulation
pub fn decode_texel(rgbm: Color, color_space: ColorSpace) -> Color {
    color_space.prepare(decode_rgbm(rgbm))
}
