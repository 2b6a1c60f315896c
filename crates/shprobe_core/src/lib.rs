//! # shprobe core
//!
//! Bakes ambient lighting from a reflection cubemap by projecting it onto
//! second-order (L2) spherical harmonics.
//!
//! This crate provides:
//! - **Cubemap storage** with a validated mip chain and the fixed face frames
//! - **RGBM decoding** and gamma to linear conversion per texel
//! - **Solid-angle weighted projection** into 9 x RGB SH coefficients
//! - **SH evaluation** of radiance and cosine-convolved irradiance
//!
//! ## Quick Start
//!
//! ```rust
//! use shprobe_core::{project_cubemap, Color, ColorSpace, Cubemap};
//!
//! let cubemap = Cubemap::uniform(16, Color::rgba(0.25, 0.25, 0.25, 1.0))
//!     .unwrap()
//!     .with_generated_mips();
//!
//! let sh = project_cubemap(&cubemap, 2, ColorSpace::Gamma);
//! assert!(sh.dc()[0] > 0.0);
//! ```

pub mod color;
pub mod cubemap;
pub mod error;
pub mod math;
pub mod projector;
pub mod sh;

pub use color::{decode_rgbm, decode_texel, encode_rgbm, gamma_to_linear, ColorSpace, RGBM_RANGE};
pub use cubemap::{Cubemap, CubemapFace, CubemapMip, FaceBasis, FACE_BASES, FACE_COUNT};
pub use error::CubemapError;
pub use math::{Color, Vec3};
pub use projector::{
    project_cubemap, project_cubemap_with_stats, project_faces, project_faces_with_stats,
    texel_coordinate, texel_direction, texel_weight, total_texel_weight, Projection,
    ProjectionSettings, ShProjector, LIGHT_INTENSITY_SCALE, SOLID_ANGLE_NORMALIZATION,
};
pub use sh::{eval_basis, ShL2, SH_CHANNELS, SH_L2_COUNT};
