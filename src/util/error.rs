//! Error types for scrollstitch.

use thiserror::Error;

/// Result alias for scrollstitch operations.
pub type StitchResult<T> = std::result::Result<T, StitchError>;

/// Errors that can occur while building images or running a stitch.
///
/// Only the first three variants describe a failed run; the rest reject
/// invalid inputs before any frame is processed. Per-frame outcomes such as
/// duplicates or low-confidence matches are never reported through this type.
#[derive(Debug, Error)]
pub enum StitchError {
    /// The frame source could not be opened.
    #[error("frame source unavailable: {reason}")]
    SourceUnavailable { reason: String },
    /// The first frame could not be read.
    #[error("failed to read first frame")]
    EmptySource,
    /// The stream ended with a zero-sized panorama.
    #[error("empty panorama generated ({width}x{height})")]
    EmptyResult { width: usize, height: usize },
    /// Image dimensions are zero or overflow.
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// The backing buffer does not hold enough elements.
    #[error("buffer too small: needed {needed}, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// A region of interest does not fit inside the image.
    #[error("roi {width}x{height} at ({x}, {y}) exceeds image {img_width}x{img_height}")]
    RoiOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        img_width: usize,
        img_height: usize,
    },
    /// A stitch parameter is outside its valid range.
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter {
        name: &'static str,
        reason: String,
    },
    /// A row append was attempted with a frame of the wrong width.
    #[error("width mismatch: expected {expected}, got {got}")]
    WidthMismatch { expected: usize, got: usize },
    /// Image decoding or encoding failed.
    #[error("image io: {reason}")]
    ImageIo { reason: String },
    /// The run exceeded its wall-clock budget.
    #[error("deadline exceeded after {elapsed_secs:.1}s")]
    DeadlineExceeded { elapsed_secs: f64 },
}

impl StitchError {
    /// Returns the process exit status associated with this error.
    ///
    /// Each fatal phase maps to its own non-zero code so that a supervising
    /// process can tell them apart without parsing the message.
    pub fn exit_code(&self) -> i32 {
        match self {
            StitchError::SourceUnavailable { .. } => 2,
            StitchError::EmptySource => 3,
            StitchError::EmptyResult { .. } => 4,
            StitchError::InvalidParameter { .. } => 5,
            StitchError::DeadlineExceeded { .. } => 6,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::StitchError;

    #[test]
    fn fatal_phases_have_distinct_exit_codes() {
        let codes = [
            StitchError::SourceUnavailable {
                reason: "missing".into(),
            }
            .exit_code(),
            StitchError::EmptySource.exit_code(),
            StitchError::EmptyResult {
                width: 0,
                height: 0,
            }
            .exit_code(),
        ];
        assert!(codes.iter().all(|&code| code != 0));
        assert_ne!(codes[0], codes[1]);
        assert_ne!(codes[1], codes[2]);
        assert_ne!(codes[0], codes[2]);
    }
}
