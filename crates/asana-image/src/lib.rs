//! Image helpers for the pose pipeline.
//!
//! Decoding always produces 8-bit RGB in HWC layout (`[height, width, 3]`),
//! the layout the keypoint detectors consume. `crop_and_resize` turns a
//! normalized crop rectangle into a fixed-size detector input.

pub mod crop;
pub mod error;

pub use crop::{CropBox, crop_and_resize};
pub use error::ImageError;

use asana_base::Tensor;
use std::path::Path;

/// Decodes an encoded image (JPEG or PNG) into an RGB `Tensor<u8>`.
///
/// Grayscale and alpha images are converted to 3-channel RGB; alpha is dropped.
///
/// # Errors
///
/// Returns `ImageError::Decode` if the data is invalid or the format is unsupported.
pub fn decode_rgb(data: &[u8]) -> Result<Tensor<u8>, ImageError> {
    let rgb = image::load_from_memory(data)?.to_rgb8();
    let (width, height) = rgb.dimensions();
    Ok(Tensor::new(
        vec![height as usize, width as usize, 3],
        rgb.into_raw(),
    )?)
}

/// Reads and decodes an image file. See [`decode_rgb`].
pub fn decode_rgb_file(path: impl AsRef<Path>) -> Result<Tensor<u8>, ImageError> {
    let bytes = std::fs::read(path.as_ref())?;
    decode_rgb(&bytes)
}
