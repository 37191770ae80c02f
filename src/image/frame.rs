//! Owned RGB frames with a lazily derived luminance plane.

use crate::image::ImageView;
use crate::util::{StitchError, StitchResult};
use std::fmt;
use std::sync::OnceLock;

/// Number of interleaved channels per pixel.
pub const CHANNELS: usize = 3;

/// Owned interleaved RGB8 raster.
///
/// The luminance plane is only used for comparison and matching, so it is
/// computed on first access and cached for the lifetime of the frame.
#[derive(Clone)]
pub struct Frame {
    rgb: Vec<u8>,
    width: usize,
    height: usize,
    luma: OnceLock<Vec<u8>>,
}

impl Frame {
    /// Creates a frame from an interleaved RGB buffer of exactly `width * height * 3` bytes.
    pub fn from_rgb(rgb: Vec<u8>, width: usize, height: usize) -> StitchResult<Self> {
        let needed = rgb_len(width, height)?;
        if rgb.len() < needed {
            return Err(StitchError::BufferTooSmall {
                needed,
                got: rgb.len(),
            });
        }
        if rgb.len() > needed {
            return Err(StitchError::InvalidDimensions { width, height });
        }
        Ok(Self {
            rgb,
            width,
            height,
            luma: OnceLock::new(),
        })
    }

    /// Creates a gray frame by replicating a single-channel buffer into RGB.
    pub fn from_gray(gray: &[u8], width: usize, height: usize) -> StitchResult<Self> {
        let view = ImageView::from_slice(gray, width, height)?;
        let mut rgb = Vec::with_capacity(rgb_len(width, height)?);
        for y in 0..height {
            if let Some(row) = view.row(y) {
                for &v in row {
                    rgb.extend_from_slice(&[v, v, v]);
                }
            }
        }
        Self::from_rgb(rgb, width, height)
    }

    /// Returns the frame width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the frame height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns `true` if both frames have identical dimensions.
    pub fn same_dimensions(&self, other: &Frame) -> bool {
        self.width == other.width && self.height == other.height
    }

    /// Returns the interleaved RGB buffer.
    pub fn rgb(&self) -> &[u8] {
        &self.rgb
    }

    /// Returns the interleaved RGB bytes of rows `start..height`.
    pub fn rgb_rows_from(&self, start: usize) -> &[u8] {
        let start = start.min(self.height) * self.width * CHANNELS;
        &self.rgb[start..]
    }

    /// Returns the luminance view, computing it on first use.
    pub fn luma(&self) -> ImageView<'_, u8> {
        let plane = self.luma.get_or_init(|| rgb_to_luma(&self.rgb));
        ImageView::from_parts(plane, self.width, self.height)
    }

    /// Returns the luminance bytes of rows `start..height`.
    pub fn luma_rows_from(&self, start: usize) -> &[u8] {
        let plane = self.luma().as_slice();
        &plane[start.min(self.height) * self.width..]
    }

    /// Consumes the frame and returns its RGB buffer.
    pub fn into_rgb(self) -> Vec<u8> {
        self.rgb
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("luma_ready", &self.luma.get().is_some())
            .finish()
    }
}

fn rgb_len(width: usize, height: usize) -> StitchResult<usize> {
    if width == 0 || height == 0 {
        return Err(StitchError::InvalidDimensions { width, height });
    }
    width
        .checked_mul(height)
        .and_then(|v| v.checked_mul(CHANNELS))
        .ok_or(StitchError::InvalidDimensions { width, height })
}

/// Converts interleaved RGB to luminance with BT.601 weights.
///
/// Weights are 14-bit fixed point (4899, 9617, 1868) summing to 16384.
pub(crate) fn rgb_to_luma(rgb: &[u8]) -> Vec<u8> {
    rgb.chunks_exact(CHANNELS)
        .map(|px| {
            let y = u32::from(px[0]) * 4899 + u32::from(px[1]) * 9617 + u32::from(px[2]) * 1868;
            ((y + 8192) >> 14) as u8
        })
        .collect()
}
