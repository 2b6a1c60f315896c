//! Cubemap to SH projection
//!
//! Every texel of every face is treated as a small directional light:
//!
//! 1. The texel center is mapped to plane coordinates `(fx, fy)` in
//!    `[-1 + 1/size, 1 - 1/size]`.
//! 2. Its direction is `normalize(z + x * fx + y * fy)` in the face frame.
//! 3. Its solid-angle weight is `4 / (sqrt(t) * t)` with
//!    `t = 1 + fx^2 + fy^2`, so texels near face corners count less.
//! 4. The RGBM texel is decoded and added to the SH at that direction,
//!    scaled by `weight * LIGHT_INTENSITY_SCALE`.
//!
//! After all faces the coefficients are multiplied once by
//! `SOLID_ANGLE_NORMALIZATION / weight_sum`.
//!
//! The kernel is a pure function of its inputs. Malformed inputs are caller
//! bugs and panic.

use crate::color::{decode_texel, ColorSpace};
use crate::cubemap::{Cubemap, CubemapFace, FACE_COUNT};
use crate::math::{Color, Vec3};
use crate::sh::ShL2;
use serde::{Deserialize, Serialize};

/// Light intensity calibration applied to every texel
///
/// Matches the reference "normal" light intensity of the consuming
/// lighting system.
pub const LIGHT_INTENSITY_SCALE: f32 = 0.5;

/// Target total of the normalized texel weights
pub const SOLID_ANGLE_NORMALIZATION: f32 = 4.0;

/// Plane coordinate of the center of texel `i` on a face of side `size`
///
/// A 1x1 face has its single texel at the face center.
pub fn texel_coordinate(i: u32, size: u32) -> f32 {
    if size <= 1 {
        return 0.0;
    }
    let size = size as f32;
    let bias = -1.0 + 1.0 / size;
    let scale = 2.0 * (1.0 - 1.0 / size) / (size - 1.0);
    i as f32 * scale + bias
}

/// Solid-angle weight of a texel at plane coordinates `(fx, fy)`
pub fn texel_weight(fx: f32, fy: f32) -> f32 {
    let t = 1.0 + fx * fx + fy * fy;
    4.0 / (t.sqrt() * t)
}

/// Unit direction through plane coordinates `(fx, fy)` of `face`
pub fn texel_direction(face: CubemapFace, fx: f32, fy: f32) -> Vec3 {
    let basis = face.basis();
    (basis.z + basis.x * fx + basis.y * fy).normalize()
}

/// Sum of texel weights over all six faces of side `size`
pub fn total_texel_weight(size: u32) -> f32 {
    assert!(size > 0, "cubemap face size must be > 0");
    let mut face_sum = 0.0f32;
    for y in 0..size {
        let fy = texel_coordinate(y, size);
        for x in 0..size {
            face_sum += texel_weight(texel_coordinate(x, size), fy);
        }
    }
    face_sum * FACE_COUNT as f32
}

/// Result of one projection with its normalization inputs
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    /// Normalized coefficients
    pub coefficients: ShL2,
    /// Sum of raw texel weights over all faces
    pub weight_sum: f32,
    /// Factor applied to the accumulated coefficients
    pub normalization: f32,
    /// Face side length that was projected
    pub size: u32,
}

/// Accumulate one face into a fresh SH, returning it with the face's weight sum
fn accumulate_face(
    face: CubemapFace,
    pixels: &[Color],
    size: u32,
    color_space: ColorSpace,
) -> (ShL2, f32) {
    let mut sh = ShL2::zero();
    let mut weight_sum = 0.0f32;

    for (y, row) in pixels.chunks_exact(size as usize).enumerate() {
        let fy = texel_coordinate(y as u32, size);
        for (x, rgbm) in row.iter().enumerate() {
            let fx = texel_coordinate(x as u32, size);
            let weight = texel_weight(fx, fy);
            let dir = texel_direction(face, fx, fy);

            let color = decode_texel(*rgbm, color_space);
            sh.add_directional_light(-dir, color, weight * LIGHT_INTENSITY_SCALE);
            weight_sum += weight;
        }
    }

    tracing::trace!(?face, weight_sum, "accumulated face");
    (sh, weight_sum)
}

/// Project six faces of side `size` and report the normalization
///
/// # Panics
///
/// If `size` is zero or any face does not hold `size * size` pixels.
pub fn project_faces_with_stats(
    faces: [&[Color]; FACE_COUNT],
    size: u32,
    color_space: ColorSpace,
) -> Projection {
    assert!(size > 0, "cubemap face size must be > 0");
    let expected = (size as usize) * (size as usize);
    for face in CubemapFace::ALL {
        let actual = faces[face.index()].len();
        assert_eq!(
            actual, expected,
            "face {:?} holds {} pixels, expected {} for a {}x{} face",
            face, actual, expected, size, size
        );
    }

    let mut sh = ShL2::zero();
    let mut weight_sum = 0.0f32;
    for face in CubemapFace::ALL {
        let (partial, partial_weight) =
            accumulate_face(face, faces[face.index()], size, color_space);
        sh += partial;
        weight_sum += partial_weight;
    }

    let normalization = SOLID_ANGLE_NORMALIZATION / weight_sum;
    sh *= normalization;

    tracing::debug!(
        size,
        %color_space,
        weight_sum,
        normalization,
        "projected cubemap into SH"
    );

    Projection {
        coefficients: sh,
        weight_sum,
        normalization,
        size,
    }
}

/// Project six faces of side `size` into L2 spherical harmonics
///
/// Faces are given in [`CubemapFace::ALL`] order, each row-major RGBM.
///
/// # Panics
///
/// If `size` is zero or any face does not hold `size * size` pixels.
pub fn project_faces(faces: [&[Color]; FACE_COUNT], size: u32, color_space: ColorSpace) -> ShL2 {
    project_faces_with_stats(faces, size, color_space).coefficients
}

/// Project one resident mip level of `cubemap`
///
/// # Panics
///
/// If `mip_level` is not below `cubemap.mip_count()`.
pub fn project_cubemap(cubemap: &Cubemap, mip_level: u32, color_space: ColorSpace) -> ShL2 {
    project_cubemap_with_stats(cubemap, mip_level, color_space).coefficients
}

/// [`project_cubemap`] with normalization details
pub fn project_cubemap_with_stats(
    cubemap: &Cubemap,
    mip_level: u32,
    color_space: ColorSpace,
) -> Projection {
    let Some(mip) = cubemap.mip(mip_level) else {
        panic!(
            "mip level {} out of range, cubemap has {} levels",
            mip_level,
            cubemap.mip_count()
        );
    };
    tracing::debug!(
        mip_level,
        base_size = cubemap.base_size(),
        size = mip.size(),
        "projecting cubemap mip"
    );
    project_faces_with_stats(mip.faces(), mip.size(), color_space)
}

/// Projection parameters supplied by the rendering configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionSettings {
    /// Mip level to project; coarser levels are cheaper and pre-blurred
    pub mip_level: u32,
    /// Color space the lighting is computed in
    pub color_space: ColorSpace,
}

impl Default for ProjectionSettings {
    fn default() -> Self {
        Self {
            mip_level: 4,
            color_space: ColorSpace::Linear,
        }
    }
}

impl ProjectionSettings {
    pub fn with_mip_level(mut self, mip_level: u32) -> Self {
        self.mip_level = mip_level;
        self
    }

    pub fn with_color_space(mut self, color_space: ColorSpace) -> Self {
        self.color_space = color_space;
        self
    }
}

/// Stateless projector bound to a set of [`ProjectionSettings`]
#[derive(Clone, Copy, Debug, Default)]
pub struct ShProjector {
    settings: ProjectionSettings,
}

impl ShProjector {
    pub fn new(settings: ProjectionSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ProjectionSettings {
        &self.settings
    }

    /// Whether the configured mip level is resident in `cubemap`
    pub fn supports(&self, cubemap: &Cubemap) -> bool {
        (self.settings.mip_level as usize) < cubemap.mip_count()
    }

    /// Project `cubemap` at the configured mip level
    ///
    /// # Panics
    ///
    /// If the configured mip level is not resident in `cubemap`.
    pub fn project(&self, cubemap: &Cubemap) -> ShL2 {
        project_cubemap(cubemap, self.settings.mip_level, self.settings.color_space)
    }

    /// [`project`](Self::project) with normalization details
    pub fn project_with_stats(&self, cubemap: &Cubemap) -> Projection {
        project_cubemap_with_stats(cubemap, self.settings.mip_level, self.settings.color_space)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_texel_coordinates_are_centers() {
        assert_eq!(texel_coordinate(0, 1), 0.0);
        assert!((texel_coordinate(0, 2) + 0.5).abs() < 1e-6);
        assert!((texel_coordinate(1, 2) - 0.5).abs() < 1e-6);
        assert!((texel_coordinate(0, 4) + 0.75).abs() < 1e-6);
        assert!((texel_coordinate(1, 4) + 0.25).abs() < 1e-6);
        assert!((texel_coordinate(3, 4) - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_texel_weight_falls_off_toward_corners() {
        assert!((texel_weight(0.0, 0.0) - 4.0).abs() < 1e-6);
        assert!(texel_weight(0.5, 0.0) < texel_weight(0.0, 0.0));
        assert!(texel_weight(0.9, 0.9) < texel_weight(0.9, 0.0));
        let t: f32 = 3.0;
        assert!((texel_weight(1.0, 1.0) - 4.0 / (t.sqrt() * t)).abs() < 1e-6);
    }

    #[test]
    fn test_texel_direction_center_is_face_normal() {
        for face in CubemapFace::ALL {
            assert_eq!(texel_direction(face, 0.0, 0.0), face.basis().z);
        }
        let d = texel_direction(CubemapFace::PositiveZ, 1.0, 1.0);
        assert!((d.length() - 1.0).abs() < 1e-6);
        assert!((d.x - d.z).abs() < 1e-6);
    }

    #[test]
    fn test_total_weight_single_texel() {
        assert!((total_texel_weight(1) - 24.0).abs() < 1e-5);
    }

    #[test]
    fn test_weight_sum_approaches_full_sphere() {
        // Each texel weight times 1/size^2 approximates its solid angle.
        let size = 64;
        let solid_angle = total_texel_weight(size) / (size * size) as f32;
        assert!((solid_angle - 4.0 * PI).abs() / (4.0 * PI) < 0.01);
    }

    #[test]
    fn test_settings_defaults() {
        let settings = ProjectionSettings::default();
        assert_eq!(settings.mip_level, 4);
        assert_eq!(settings.color_space, ColorSpace::Linear);

        let custom = settings.with_mip_level(0).with_color_space(ColorSpace::Gamma);
        assert_eq!(custom.mip_level, 0);
        assert_eq!(custom.color_space, ColorSpace::Gamma);
    }

    #[test]
    fn test_settings_deserialize_partial() {
        let settings: ProjectionSettings =
            serde_json::from_str(r#"{ "color_space": "gamma" }"#).unwrap();
        assert_eq!(settings.mip_level, 4);
        assert_eq!(settings.color_space, ColorSpace::Gamma);
    }

    #[test]
    fn test_projector_supports() {
        let cube = Cubemap::uniform(4, Color::WHITE).unwrap();
        assert!(!ShProjector::default().supports(&cube));
        let cube = cube.with_generated_mips();
        // 4x4 base gives levels 0..=2
        assert!(!ShProjector::default().supports(&cube));
        let projector = ShProjector::new(ProjectionSettings::default().with_mip_level(2));
        assert!(projector.supports(&cube));
        assert_eq!(projector.project_with_stats(&cube).size, 1);
    }
}
