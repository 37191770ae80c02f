//! Image views, frames and resampling.
//!
//! `ImageView` is a borrowed 2D view into a 1D buffer with an explicit stride.
//! The stride counts elements between the starts of consecutive rows, so a
//! stride larger than the width represents padded rows. Tail views taken with
//! [`ImageView::bottom`] borrow the same backing slice and keep its stride.

use crate::util::{StitchError, StitchResult};

pub mod frame;
#[cfg(feature = "image-io")]
pub mod io;
pub mod resize;

pub use frame::Frame;

/// Borrowed 2D image view with an explicit stride.
#[derive(Copy, Clone)]
pub struct ImageView<'a, T> {
    data: &'a [T],
    width: usize,
    height: usize,
    stride: usize,
}

impl<'a, T> ImageView<'a, T> {
    /// Creates a contiguous view with `stride == width`.
    pub fn from_slice(data: &'a [T], width: usize, height: usize) -> StitchResult<Self> {
        Self::new(data, width, height, width)
    }

    /// Creates a view with an explicit stride.
    pub fn new(data: &'a [T], width: usize, height: usize, stride: usize) -> StitchResult<Self> {
        let needed = required_len(width, height, stride)?;
        if data.len() < needed {
            return Err(StitchError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    /// Wraps a contiguous buffer whose dimensions were validated by the owner.
    pub(crate) fn from_parts(data: &'a [T], width: usize, height: usize) -> Self {
        debug_assert!(data.len() >= width * height);
        Self {
            data,
            width,
            height,
            stride: width,
        }
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the stride in elements between row starts.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns the backing slice including any row padding.
    pub fn as_slice(&self) -> &'a [T] {
        self.data
    }

    /// Returns the element at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<&'a T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = y.checked_mul(self.stride)?.checked_add(x)?;
        self.data.get(idx)
    }

    /// Returns a contiguous slice for row `y` with length `width`.
    pub fn row(&self, y: usize) -> Option<&'a [T]> {
        if y >= self.height {
            return None;
        }
        let start = y.checked_mul(self.stride)?;
        let end = start.checked_add(self.width)?;
        self.data.get(start..end)
    }

    /// Returns the last `rows` rows, or the whole view if it is shorter.
    pub fn bottom(&self, rows: usize) -> ImageView<'a, T> {
        let rows = rows.clamp(1, self.height.max(1));
        let skip = self.height.saturating_sub(rows);
        ImageView {
            data: &self.data[skip * self.stride..],
            width: self.width,
            height: rows,
            stride: self.stride,
        }
    }
}

fn required_len(width: usize, height: usize, stride: usize) -> StitchResult<usize> {
    if width == 0 || height == 0 {
        return Err(StitchError::InvalidDimensions { width, height });
    }
    if stride < width {
        return Err(StitchError::InvalidDimensions {
            width: stride,
            height,
        });
    }
    (height - 1)
        .checked_mul(stride)
        .and_then(|v| v.checked_add(width))
        .ok_or(StitchError::InvalidDimensions { width, height })
}

#[cfg(test)]
mod tests {
    use super::ImageView;

    #[test]
    fn bottom_clamps_to_full_height() {
        let data: Vec<u8> = (0..12).collect();
        let view = ImageView::from_slice(&data, 3, 4).unwrap();

        let tail = view.bottom(2);
        assert_eq!(tail.height(), 2);
        assert_eq!(tail.row(0).unwrap(), &[6, 7, 8]);

        let all = view.bottom(10);
        assert_eq!(all.height(), 4);
        assert_eq!(all.row(0).unwrap(), &[0, 1, 2]);
    }

    #[test]
    fn bottom_keeps_padded_stride() {
        let data: Vec<u8> = (0..12).collect();
        let view = ImageView::new(&data, 3, 3, 4).unwrap();

        let tail = view.bottom(1);
        assert_eq!(tail.stride(), 4);
        assert_eq!(tail.height(), 1);
        assert_eq!(tail.row(0).unwrap(), &[8, 9, 10]);
        assert!(tail.row(1).is_none());
    }
}
