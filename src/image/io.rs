//! Convenience helpers for moving frames in and out of the `image` crate.
//!
//! Available when the `image-io` feature is enabled.

use crate::image::Frame;
use crate::util::{StitchError, StitchResult};
use std::path::Path;

/// Creates a frame from an RGB image buffer.
pub fn frame_from_rgb_image(img: &image::RgbImage) -> StitchResult<Frame> {
    Frame::from_rgb(img.as_raw().clone(), img.width() as usize, img.height() as usize)
}

/// Creates a frame from any decoded image, dropping alpha.
pub fn frame_from_dynamic_image(img: &image::DynamicImage) -> StitchResult<Frame> {
    frame_from_rgb_image(&img.to_rgb8())
}

/// Loads an image from disk as an RGB frame.
pub fn load_frame<P: AsRef<Path>>(path: P) -> StitchResult<Frame> {
    let img = image::open(path).map_err(|err| StitchError::ImageIo {
        reason: err.to_string(),
    })?;
    frame_from_dynamic_image(&img)
}

/// Writes an interleaved RGB buffer to disk; the format follows the extension.
pub fn save_rgb<P: AsRef<Path>>(path: P, rgb: &[u8], width: usize, height: usize) -> StitchResult<()> {
    let (w, h) = match (u32::try_from(width), u32::try_from(height)) {
        (Ok(w), Ok(h)) => (w, h),
        _ => return Err(StitchError::InvalidDimensions { width, height }),
    };
    let img = image::RgbImage::from_raw(w, h, rgb.to_vec()).ok_or(StitchError::BufferTooSmall {
        needed: width * height * 3,
        got: rgb.len(),
    })?;
    img.save(path).map_err(|err| StitchError::ImageIo {
        reason: err.to_string(),
    })
}
