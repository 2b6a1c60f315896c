//! Cubemap face layout and pixel storage
//!
//! A cubemap is six square faces stored row-major, one per axis direction,
//! in the fixed order of [`CubemapFace::ALL`]. Every face in a mip level has
//! the same side length, `max(1, base_size >> level)`.

use crate::color::{decode_rgbm, encode_rgbm};
use crate::error::{CubemapError, Result};
use crate::math::{Color, Vec3};

/// Number of faces in a cubemap
pub const FACE_COUNT: usize = 6;

/// Cubemap face orientation
///
/// The discriminant is the face's index in every face array.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CubemapFace {
    PositiveX = 0,
    NegativeX = 1,
    PositiveY = 2,
    NegativeY = 3,
    PositiveZ = 4,
    NegativeZ = 5,
}

impl CubemapFace {
    /// All faces in storage order
    pub const ALL: [CubemapFace; FACE_COUNT] = [
        CubemapFace::PositiveX,
        CubemapFace::NegativeX,
        CubemapFace::PositiveY,
        CubemapFace::NegativeY,
        CubemapFace::PositiveZ,
        CubemapFace::NegativeZ,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Face for a storage index
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Plane basis and outward normal of this face
    pub fn basis(self) -> &'static FaceBasis {
        &FACE_BASES[self.index()]
    }

    /// Short name used in file names and config keys
    pub fn name(self) -> &'static str {
        match self {
            CubemapFace::PositiveX => "positive_x",
            CubemapFace::NegativeX => "negative_x",
            CubemapFace::PositiveY => "positive_y",
            CubemapFace::NegativeY => "negative_y",
            CubemapFace::PositiveZ => "positive_z",
            CubemapFace::NegativeZ => "negative_z",
        }
    }
}

/// Orthonormal frame of one cube face
///
/// `x` and `y` span the face plane in texel order, `z` is the outward face
/// normal. A texel at plane coordinates `(fx, fy)` lies along
/// `z + x * fx + y * fy`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FaceBasis {
    pub x: Vec3,
    pub y: Vec3,
    pub z: Vec3,
}

/// Face frames, indexed by [`CubemapFace::index`]
pub static FACE_BASES: [FaceBasis; FACE_COUNT] = [
    // +X
    FaceBasis {
        x: Vec3::new(0.0, 0.0, -1.0),
        y: Vec3::new(0.0, 1.0, 0.0),
        z: Vec3::new(1.0, 0.0, 0.0),
    },
    // -X
    FaceBasis {
        x: Vec3::new(0.0, 0.0, 1.0),
        y: Vec3::new(0.0, 1.0, 0.0),
        z: Vec3::new(-1.0, 0.0, 0.0),
    },
    // +Y
    FaceBasis {
        x: Vec3::new(1.0, 0.0, 0.0),
        y: Vec3::new(0.0, 0.0, -1.0),
        z: Vec3::new(0.0, 1.0, 0.0),
    },
    // -Y
    FaceBasis {
        x: Vec3::new(1.0, 0.0, 0.0),
        y: Vec3::new(0.0, 0.0, 1.0),
        z: Vec3::new(0.0, -1.0, 0.0),
    },
    // +Z
    FaceBasis {
        x: Vec3::new(1.0, 0.0, 0.0),
        y: Vec3::new(0.0, 1.0, 0.0),
        z: Vec3::new(0.0, 0.0, 1.0),
    },
    // -Z
    FaceBasis {
        x: Vec3::new(-1.0, 0.0, 0.0),
        y: Vec3::new(0.0, 1.0, 0.0),
        z: Vec3::new(0.0, 0.0, -1.0),
    },
];

/// Side length of a face at `level`, clamped to 1
pub fn mip_size(base_size: u32, level: u32) -> u32 {
    base_size.checked_shr(level).unwrap_or(0).max(1)
}

/// Number of levels in a full chain down to 1x1
pub fn full_mip_count(base_size: u32) -> usize {
    if base_size == 0 {
        0
    } else {
        (u32::BITS - base_size.leading_zeros()) as usize
    }
}

/// Six faces of a single mip level
#[derive(Clone, Debug, PartialEq)]
pub struct CubemapMip {
    size: u32,
    faces: [Vec<Color>; FACE_COUNT],
}

impl CubemapMip {
    fn new(level: u32, size: u32, faces: [Vec<Color>; FACE_COUNT]) -> Result<Self> {
        let expected = (size as usize) * (size as usize);
        for face in CubemapFace::ALL {
            let actual = faces[face.index()].len();
            if actual == 0 {
                return Err(CubemapError::EmptyFace { level, face });
            }
            if actual != expected {
                return Err(CubemapError::FaceLength {
                    level,
                    face,
                    expected,
                    actual,
                });
            }
        }
        Ok(Self { size, faces })
    }

    /// Side length in pixels
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Row-major pixels of one face
    pub fn face(&self, face: CubemapFace) -> &[Color] {
        &self.faces[face.index()]
    }

    /// All faces as borrowed slices, in storage order
    pub fn faces(&self) -> [&[Color]; FACE_COUNT] {
        [
            &self.faces[0],
            &self.faces[1],
            &self.faces[2],
            &self.faces[3],
            &self.faces[4],
            &self.faces[5],
        ]
    }

    /// Pixel at `(x, y)` on `face`
    pub fn pixel(&self, face: CubemapFace, x: u32, y: u32) -> Color {
        self.faces[face.index()][(y * self.size + x) as usize]
    }

    /// Box-filter this level down to the next one
    ///
    /// Texels are averaged as decoded radiance and re-encoded to RGBM.
    fn downsample(&self) -> CubemapMip {
        let src = self.size;
        let dst = (src / 2).max(1);
        let faces = CubemapFace::ALL.map(|face| {
            let mut out = Vec::with_capacity((dst * dst) as usize);
            for y in 0..dst {
                for x in 0..dst {
                    let x0 = (2 * x).min(src - 1);
                    let x1 = (2 * x + 1).min(src - 1);
                    let y0 = (2 * y).min(src - 1);
                    let y1 = (2 * y + 1).min(src - 1);
                    let radiance = Color::average(&[
                        decode_rgbm(self.pixel(face, x0, y0)),
                        decode_rgbm(self.pixel(face, x1, y0)),
                        decode_rgbm(self.pixel(face, x0, y1)),
                        decode_rgbm(self.pixel(face, x1, y1)),
                    ]);
                    out.push(encode_rgbm(radiance));
                }
            }
            out
        });
        CubemapMip { size: dst, faces }
    }
}

/// Cubemap with a validated mip chain
///
/// Construction checks every face buffer against the expected size of its
/// level, so a `Cubemap` always satisfies the projection preconditions for
/// any level below [`mip_count`](Self::mip_count).
#[derive(Clone, Debug, PartialEq)]
pub struct Cubemap {
    base_size: u32,
    mips: Vec<CubemapMip>,
}

impl Cubemap {
    /// Create a single-level cubemap from six `size * size` faces
    pub fn from_faces(size: u32, faces: [Vec<Color>; FACE_COUNT]) -> Result<Self> {
        Self::from_mips(size, vec![faces])
    }

    /// Create a cubemap from a caller-supplied mip chain
    ///
    /// `base_size` must be a power of two. Level `n` must hold faces of side
    /// `max(1, base_size >> n)`.
    pub fn from_mips(base_size: u32, mips: Vec<[Vec<Color>; FACE_COUNT]>) -> Result<Self> {
        if base_size == 0 {
            return Err(CubemapError::InvalidSize);
        }
        if !base_size.is_power_of_two() {
            return Err(CubemapError::NotPowerOfTwo(base_size));
        }
        if mips.is_empty() {
            return Err(CubemapError::NoMipLevels);
        }
        let max = full_mip_count(base_size);
        if mips.len() > max {
            return Err(CubemapError::TooManyMips {
                requested: mips.len(),
                max,
            });
        }

        let mips = mips
            .into_iter()
            .enumerate()
            .map(|(level, faces)| {
                let level = level as u32;
                CubemapMip::new(level, mip_size(base_size, level), faces)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { base_size, mips })
    }

    /// Create a cubemap where every pixel of every face is `color`
    pub fn uniform(size: u32, color: Color) -> Result<Self> {
        let count = (size as usize) * (size as usize);
        Self::from_faces(size, std::array::from_fn(|_| vec![color; count]))
    }

    /// Fill the mip chain down to 1x1 with box-filtered levels
    ///
    /// Levels already present are kept.
    pub fn with_generated_mips(mut self) -> Self {
        let target = full_mip_count(self.base_size);
        while self.mips.len() < target {
            let next = self.mips[self.mips.len() - 1].downsample();
            self.mips.push(next);
        }
        tracing::debug!(
            base_size = self.base_size,
            mip_count = self.mips.len(),
            "generated cubemap mip chain"
        );
        self
    }

    /// Side length of mip level 0
    pub fn base_size(&self) -> u32 {
        self.base_size
    }

    /// Number of resident mip levels
    pub fn mip_count(&self) -> usize {
        self.mips.len()
    }

    /// Side length at `level`
    pub fn mip_size(&self, level: u32) -> u32 {
        mip_size(self.base_size, level)
    }

    pub fn mip(&self, level: u32) -> Option<&CubemapMip> {
        self.mips.get(level as usize)
    }

    pub fn mips(&self) -> &[CubemapMip] {
        &self.mips
    }

    /// Row-major pixels of `face` at `level`
    pub fn face(&self, level: u32, face: CubemapFace) -> Option<&[Color]> {
        self.mip(level).map(|mip| mip.face(face))
    }
}
