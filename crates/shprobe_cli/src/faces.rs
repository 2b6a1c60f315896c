//! Loading cubemap faces from images

use anyhow::{Context, Result};
use shprobe_core::{Color, Cubemap, CubemapFace};
use std::path::Path;
use tracing::debug;

use crate::config::FacesConfig;

/// Decoded face image as RGBA floats in 0.0-1.0
pub struct FaceImage {
    pub size: u32,
    pub pixels: Vec<Color>,
}

/// Convert 8-bit RGBA pixel data to a square face
pub fn face_from_rgba8(width: u32, height: u32, data: &[u8]) -> Result<FaceImage> {
    if width != height {
        anyhow::bail!("Face is {}x{}, cubemap faces must be square", width, height);
    }
    let expected = (width as usize) * (height as usize) * 4;
    if data.len() != expected {
        anyhow::bail!(
            "Invalid pixel data length: expected {}, got {}",
            expected,
            data.len()
        );
    }

    let pixels = data
        .chunks_exact(4)
        .map(|px| Color::from_rgba8([px[0], px[1], px[2], px[3]]))
        .collect();
    Ok(FaceImage {
        size: width,
        pixels,
    })
}

/// Decode one face image from disk
pub fn load_face(path: &Path) -> Result<FaceImage> {
    let image = image::open(path)
        .with_context(|| format!("Failed to decode {}", path.display()))?
        .to_rgba8();
    let (width, height) = image.dimensions();
    debug!("Loaded {} ({}x{})", path.display(), width, height);
    face_from_rgba8(width, height, image.as_raw())
        .with_context(|| format!("Invalid face image {}", path.display()))
}

/// Assemble a cubemap from six decoded faces in storage order
pub fn assemble(faces: [FaceImage; 6]) -> Result<Cubemap> {
    let size = faces[0].size;
    for (face, image) in CubemapFace::ALL.iter().zip(faces.iter()) {
        if image.size != size {
            anyhow::bail!(
                "Face {} is {}x{}, expected {}x{} like {}",
                face.name(),
                image.size,
                image.size,
                size,
                size,
                CubemapFace::PositiveX.name()
            );
        }
    }
    let pixels = faces.map(|image| image.pixels);
    Ok(Cubemap::from_faces(size, pixels)?)
}

/// Load all six configured faces relative to `base`
pub fn load_cubemap(base: &Path, faces: &FacesConfig) -> Result<Cubemap> {
    let mut images = Vec::with_capacity(6);
    for face in CubemapFace::ALL {
        images.push(load_face(&faces.resolve(base, face))?);
    }
    let images: [FaceImage; 6] = images
        .try_into()
        .map_err(|_| anyhow::anyhow!("Expected six face images"))?;
    assemble(images)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(size: u32, rgba: [u8; 4]) -> FaceImage {
        let data: Vec<u8> = (0..size * size).flat_map(|_| rgba).collect();
        face_from_rgba8(size, size, &data).unwrap()
    }

    #[test]
    fn test_face_from_rgba8() {
        let face = solid(2, [255, 0, 0, 255]);
        assert_eq!(face.size, 2);
        assert_eq!(face.pixels.len(), 4);
        assert_eq!(face.pixels[3], Color::rgba(1.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn test_rejects_non_square() {
        assert!(face_from_rgba8(2, 1, &[0; 8]).is_err());
        assert!(face_from_rgba8(2, 2, &[0; 8]).is_err());
    }

    #[test]
    fn test_assemble_checks_sizes() {
        let faces = [
            solid(2, [0, 0, 0, 255]),
            solid(2, [0, 0, 0, 255]),
            solid(2, [0, 0, 0, 255]),
            solid(1, [0, 0, 0, 255]),
            solid(2, [0, 0, 0, 255]),
            solid(2, [0, 0, 0, 255]),
        ];
        let err = assemble(faces).unwrap_err().to_string();
        assert!(err.contains("negative_y"), "{}", err);

        let ok = assemble(std::array::from_fn(|_| solid(4, [10, 20, 30, 40]))).unwrap();
        assert_eq!(ok.base_size(), 4);
        assert_eq!(ok.mip_count(), 1);
    }

    #[test]
    fn test_assemble_rejects_odd_size() {
        let err = assemble(std::array::from_fn(|_| solid(3, [255, 255, 255, 255])))
            .unwrap_err()
            .to_string();
        assert!(err.contains("power of two"), "{}", err);
    }
}
