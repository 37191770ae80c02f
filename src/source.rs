//! Ordered frame sources.
//!
//! A source yields frames strictly in capture order and cannot seek. Opening
//! a source is the constructor's job; a source that cannot be opened reports
//! [`StitchError::SourceUnavailable`] there, before any frame is requested.

use crate::image::Frame;
#[cfg(feature = "image-io")]
use crate::util::StitchError;
use crate::util::StitchResult;
use std::collections::VecDeque;
#[cfg(feature = "image-io")]
use std::path::{Path, PathBuf};

/// Sequential supplier of decoded frames.
pub trait FrameSource {
    /// Native width of the stream in pixels.
    fn width(&self) -> usize;

    /// Total number of frames the stream advertises.
    fn frame_count(&self) -> usize;

    /// Capture rate in frames per second.
    fn capture_rate(&self) -> f64;

    /// Returns the next frame, or `None` at end of stream.
    fn next_frame(&mut self) -> StitchResult<Option<Frame>>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn width(&self) -> usize {
        (**self).width()
    }

    fn frame_count(&self) -> usize {
        (**self).frame_count()
    }

    fn capture_rate(&self) -> f64 {
        (**self).capture_rate()
    }

    fn next_frame(&mut self) -> StitchResult<Option<Frame>> {
        (**self).next_frame()
    }
}

/// In-memory frame source.
#[derive(Debug)]
pub struct MemorySource {
    frames: VecDeque<Frame>,
    width: usize,
    count: usize,
    capture_rate: f64,
}

impl MemorySource {
    /// Creates a source that yields `frames` in order.
    pub fn new(frames: Vec<Frame>, capture_rate: f64) -> Self {
        let width = frames.first().map_or(0, Frame::width);
        let count = frames.len();
        Self {
            frames: frames.into(),
            width,
            count,
            capture_rate,
        }
    }

    /// Overrides the advertised frame count.
    ///
    /// Container metadata is often imprecise; this lets tests model a stream
    /// whose advertised length differs from what it actually yields.
    pub fn with_advertised_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }
}

impl FrameSource for MemorySource {
    fn width(&self) -> usize {
        self.width
    }

    fn frame_count(&self) -> usize {
        self.count
    }

    fn capture_rate(&self) -> f64 {
        self.capture_rate
    }

    fn next_frame(&mut self) -> StitchResult<Option<Frame>> {
        Ok(self.frames.pop_front())
    }
}

/// Frame source over a directory of still images, read in file-name order.
///
/// Stands in for a decoded video: each file is one frame. Files with
/// extensions the `image` crate cannot decode are ignored.
#[cfg(feature = "image-io")]
#[derive(Debug)]
pub struct ImageSequenceSource {
    paths: VecDeque<PathBuf>,
    width: usize,
    count: usize,
    capture_rate: f64,
}

#[cfg(feature = "image-io")]
impl ImageSequenceSource {
    const EXTENSIONS: [&'static str; 3] = ["png", "jpg", "jpeg"];

    /// Opens a frame directory.
    ///
    /// The first frame's header is probed for the stream width; an empty
    /// directory opens successfully and fails later on the first read.
    pub fn open<P: AsRef<Path>>(dir: P, capture_rate: f64) -> StitchResult<Self> {
        let dir = dir.as_ref();
        let unavailable = |reason: String| StitchError::SourceUnavailable {
            reason: format!("{}: {reason}", dir.display()),
        };

        let entries = std::fs::read_dir(dir).map_err(|err| unavailable(err.to_string()))?;
        let mut paths = Vec::new();
        for entry in entries {
            let path = entry.map_err(|err| unavailable(err.to_string()))?.path();
            let supported = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| {
                    Self::EXTENSIONS
                        .iter()
                        .any(|known| ext.eq_ignore_ascii_case(known))
                });
            if supported && path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();

        let width = match paths.first() {
            Some(first) => image::image_dimensions(first)
                .map_err(|err| unavailable(err.to_string()))?
                .0 as usize,
            None => 0,
        };

        Ok(Self {
            count: paths.len(),
            paths: paths.into(),
            width,
            capture_rate,
        })
    }
}

#[cfg(feature = "image-io")]
impl FrameSource for ImageSequenceSource {
    fn width(&self) -> usize {
        self.width
    }

    fn frame_count(&self) -> usize {
        self.count
    }

    fn capture_rate(&self) -> f64 {
        self.capture_rate
    }

    fn next_frame(&mut self) -> StitchResult<Option<Frame>> {
        match self.paths.pop_front() {
            Some(path) => crate::image::io::load_frame(path).map(Some),
            None => Ok(None),
        }
    }
}
