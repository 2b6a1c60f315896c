//! Second-order (L2) spherical harmonics
//!
//! Nine real SH basis functions per color channel, in the usual order:
//!
//! | index | basis  | polynomial            |
//! |-------|--------|-----------------------|
//! | 0     | Y(0,0) | 0.282095              |
//! | 1     | Y(1,-1)| 0.488603 y            |
//! | 2     | Y(1,0) | 0.488603 z            |
//! | 3     | Y(1,1) | 0.488603 x            |
//! | 4     | Y(2,-2)| 1.092548 xy           |
//! | 5     | Y(2,-1)| 1.092548 yz           |
//! | 6     | Y(2,0) | 0.315392 (3z^2 - 1)   |
//! | 7     | Y(2,1) | 1.092548 xz           |
//! | 8     | Y(2,2) | 0.546274 (x^2 - y^2)  |

use crate::math::{Color, Vec3};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use std::ops::{Add, AddAssign, Mul, MulAssign};

/// Number of L2 basis functions
pub const SH_L2_COUNT: usize = 9;

/// Number of color channels per basis function
pub const SH_CHANNELS: usize = 3;

const Y0: f32 = 0.282_095;
const Y1: f32 = 0.488_603;
const Y2_XY: f32 = 1.092_548;
const Y2_Z: f32 = 0.315_392;
const Y2_XX: f32 = 0.546_274;

/// Clamped-cosine convolution factor per band
const COSINE_LOBE: [f32; 3] = [PI, 2.0 * PI / 3.0, PI / 4.0];

/// Band (l) of each basis index
const BAND: [usize; SH_L2_COUNT] = [0, 1, 1, 1, 2, 2, 2, 2, 2];

/// Evaluate the nine basis functions for a unit direction
pub fn eval_basis(d: Vec3) -> [f32; SH_L2_COUNT] {
    [
        Y0,
        Y1 * d.y,
        Y1 * d.z,
        Y1 * d.x,
        Y2_XY * d.x * d.y,
        Y2_XY * d.y * d.z,
        Y2_Z * (3.0 * d.z * d.z - 1.0),
        Y2_XY * d.x * d.z,
        Y2_XX * (d.x * d.x - d.y * d.y),
    ]
}

/// RGB spherical harmonics, L2
///
/// Stored as `coefficients[basis][channel]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ShL2 {
    coefficients: [[f32; SH_CHANNELS]; SH_L2_COUNT],
}

impl ShL2 {
    /// All coefficients zero
    pub const fn zero() -> Self {
        Self {
            coefficients: [[0.0; SH_CHANNELS]; SH_L2_COUNT],
        }
    }

    pub const fn from_coefficients(coefficients: [[f32; SH_CHANNELS]; SH_L2_COUNT]) -> Self {
        Self { coefficients }
    }

    /// Reset all coefficients to zero
    pub fn clear(&mut self) {
        *self = Self::zero();
    }

    /// Add a directional light
    ///
    /// `direction` is the direction the light travels, so the basis is
    /// evaluated toward the light at `-direction`. `weight` scales the
    /// color contribution.
    pub fn add_directional_light(&mut self, direction: Vec3, color: Color, weight: f32) {
        let basis = eval_basis(-direction);
        let rgb = color.rgb_array();
        for (coefficient, y) in self.coefficients.iter_mut().zip(basis) {
            for (c, channel) in coefficient.iter_mut().zip(rgb) {
                *c += y * channel * weight;
            }
        }
    }

    /// Add a constant term over the whole sphere
    pub fn add_ambient_light(&mut self, color: Color) {
        let rgb = color.rgb_array();
        for (c, channel) in self.coefficients[0].iter_mut().zip(rgb) {
            *c += channel * Y0;
        }
    }

    /// Reconstructed radiance in `direction`
    pub fn evaluate(&self, direction: Vec3) -> [f32; SH_CHANNELS] {
        self.dot_basis(eval_basis(direction), |_| 1.0)
    }

    /// Irradiance for a surface with the given normal
    ///
    /// Applies the clamped-cosine convolution to each band before
    /// reconstruction.
    pub fn irradiance(&self, normal: Vec3) -> [f32; SH_CHANNELS] {
        self.dot_basis(eval_basis(normal), |i| COSINE_LOBE[BAND[i]])
    }

    fn dot_basis(
        &self,
        basis: [f32; SH_L2_COUNT],
        band_scale: impl Fn(usize) -> f32,
    ) -> [f32; SH_CHANNELS] {
        let mut out = [0.0; SH_CHANNELS];
        for (i, (coefficient, y)) in self.coefficients.iter().zip(basis).enumerate() {
            let scale = band_scale(i);
            for (o, c) in out.iter_mut().zip(coefficient) {
                *o += c * y * scale;
            }
        }
        out
    }

    /// DC (band 0) term
    pub fn dc(&self) -> [f32; SH_CHANNELS] {
        self.coefficients[0]
    }

    pub fn coefficient(&self, basis: usize, channel: usize) -> f32 {
        self.coefficients[basis][channel]
    }

    /// One basis function's RGB triple
    pub fn basis(&self, basis: usize) -> [f32; SH_CHANNELS] {
        self.coefficients[basis]
    }

    /// All nine coefficients of one channel
    pub fn channel(&self, channel: usize) -> [f32; SH_L2_COUNT] {
        self.coefficients.map(|c| c[channel])
    }

    pub fn as_array(&self) -> &[[f32; SH_CHANNELS]; SH_L2_COUNT] {
        &self.coefficients
    }

    /// Flattened as 27 floats, channel-major (all red, then green, then blue)
    pub fn to_channel_major(&self) -> [f32; SH_L2_COUNT * SH_CHANNELS] {
        let mut out = [0.0; SH_L2_COUNT * SH_CHANNELS];
        for channel in 0..SH_CHANNELS {
            for basis in 0..SH_L2_COUNT {
                out[channel * SH_L2_COUNT + basis] = self.coefficients[basis][channel];
            }
        }
        out
    }

    /// Largest absolute coefficient difference
    pub fn max_abs_diff(&self, other: &ShL2) -> f32 {
        self.coefficients
            .iter()
            .flatten()
            .zip(other.coefficients.iter().flatten())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f32::max)
    }
}

impl AddAssign for ShL2 {
    fn add_assign(&mut self, rhs: ShL2) {
        for (a, b) in self.coefficients.iter_mut().zip(rhs.coefficients) {
            for (x, y) in a.iter_mut().zip(b) {
                *x += y;
            }
        }
    }
}

impl Add for ShL2 {
    type Output = ShL2;

    fn add(mut self, rhs: ShL2) -> ShL2 {
        self += rhs;
        self
    }
}

impl MulAssign<f32> for ShL2 {
    fn mul_assign(&mut self, rhs: f32) {
        for c in self.coefficients.iter_mut().flatten() {
            *c *= rhs;
        }
    }
}

impl Mul<f32> for ShL2 {
    type Output = ShL2;

    fn mul(mut self, rhs: f32) -> ShL2 {
        self *= rhs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basis_constants() {
        let b = eval_basis(Vec3::Z);
        assert!((b[0] - 0.5 * (1.0 / PI).sqrt()).abs() < 1e-5);
        assert!((b[2] - 0.5 * (3.0 / PI).sqrt()).abs() < 1e-5);
        assert!((b[6] - 2.0 * 0.25 * (5.0 / PI).sqrt()).abs() < 1e-5);
        assert_eq!(b[1], 0.0);
        assert_eq!(b[3], 0.0);
        assert_eq!(b[4], 0.0);
        assert_eq!(b[8], 0.0);
    }

    #[test]
    fn test_directional_light_evaluated_toward_light() {
        let mut sh = ShL2::zero();
        // Light traveling down -Z arrives from +Z.
        sh.add_directional_light(-Vec3::Z, Color::RED, 1.0);
        assert!(sh.coefficient(2, 0) > 0.0);
        assert_eq!(sh.coefficient(2, 1), 0.0);
        assert!(sh.evaluate(Vec3::Z)[0] > sh.evaluate(-Vec3::Z)[0]);
    }

    #[test]
    fn test_zero_is_default() {
        assert_eq!(ShL2::default(), ShL2::zero());
        let mut sh = ShL2::zero();
        sh.add_ambient_light(Color::WHITE);
        sh.clear();
        assert_eq!(sh, ShL2::zero());
    }

    #[test]
    fn test_scale_and_add() {
        let mut a = ShL2::zero();
        a.add_directional_light(Vec3::X, Color::rgb(1.0, 2.0, 3.0), 0.5);
        let b = a * 2.0;
        let c = a + a;
        assert!(b.max_abs_diff(&c) < 1e-6);
        assert!((b.coefficient(0, 2) - 2.0 * a.coefficient(0, 2)).abs() < 1e-6);
    }

    #[test]
    fn test_ambient_irradiance_is_pi_times_radiance() {
        let mut sh = ShL2::zero();
        sh.add_ambient_light(Color::rgb(1.0, 0.5, 0.25));
        let radiance = sh.evaluate(Vec3::Y);
        let irradiance = sh.irradiance(Vec3::Y);
        for (r, e) in radiance.iter().zip(irradiance) {
            assert!((e - PI * r).abs() < 1e-4);
        }
        assert!((radiance[0] - Y0 * Y0).abs() < 1e-6);
    }

    #[test]
    fn test_channel_views() {
        let mut sh = ShL2::zero();
        sh.add_directional_light(-Vec3::Y, Color::GREEN, 1.0);
        let green = sh.channel(1);
        assert_eq!(green[1], sh.coefficient(1, 1));
        assert_eq!(sh.channel(0), [0.0; SH_L2_COUNT]);

        let flat = sh.to_channel_major();
        assert_eq!(flat[SH_L2_COUNT + 1], sh.coefficient(1, 1));
        assert_eq!(sh.basis(0), sh.dc());
    }

    #[test]
    fn test_serialize_shape() {
        let json = serde_json::to_value(ShL2::zero()).unwrap();
        let rows = json["coefficients"].as_array().unwrap();
        assert_eq!(rows.len(), SH_L2_COUNT);
        assert_eq!(rows[0].as_array().unwrap().len(), SH_CHANNELS);
    }
}
