//! Cubemap validation errors

use crate::cubemap::CubemapFace;
use thiserror::Error;

/// Errors raised while assembling a [`Cubemap`](crate::Cubemap) from raw face data
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CubemapError {
    /// Base face size of zero
    #[error("cubemap face size must be > 0")]
    InvalidSize,

    /// Base face size that does not halve evenly down to 1x1
    #[error("cubemap face size {0} is not a power of two")]
    NotPowerOfTwo(u32),

    /// A face buffer holds no pixels
    #[error("face {face:?} at mip {level} is empty")]
    EmptyFace { level: u32, face: CubemapFace },

    /// A face buffer does not hold `size * size` pixels
    #[error("face {face:?} at mip {level}: expected {expected} pixels, got {actual}")]
    FaceLength {
        level: u32,
        face: CubemapFace,
        expected: usize,
        actual: usize,
    },

    /// No mip levels were supplied
    #[error("cubemap has no mip levels")]
    NoMipLevels,

    /// More mip levels than the base size can produce
    #[error("{requested} mip levels requested, base size allows at most {max}")]
    TooManyMips { requested: usize, max: usize },
}

/// Result type for cubemap construction
pub type Result<T> = std::result::Result<T, CubemapError>;
