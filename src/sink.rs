//! Destinations for the finished panorama.

use crate::panorama::Panorama;
use crate::util::StitchResult;
#[cfg(feature = "image-io")]
use std::path::PathBuf;

/// Persists the final panorama of a successful run.
pub trait ResultSink {
    fn persist(&mut self, panorama: &Panorama) -> StitchResult<()>;
}

/// Keeps the panorama in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub panorama: Option<Panorama>,
}

impl ResultSink for MemorySink {
    fn persist(&mut self, panorama: &Panorama) -> StitchResult<()> {
        self.panorama = Some(panorama.clone());
        Ok(())
    }
}

/// Writes the panorama to an image file; the format follows the extension.
#[cfg(feature = "image-io")]
#[derive(Clone, Debug)]
pub struct ImageFileSink {
    path: PathBuf,
}

#[cfg(feature = "image-io")]
impl ImageFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[cfg(feature = "image-io")]
impl ResultSink for ImageFileSink {
    fn persist(&mut self, panorama: &Panorama) -> StitchResult<()> {
        crate::image::io::save_rgb(
            &self.path,
            panorama.rgb(),
            panorama.width(),
            panorama.height(),
        )
    }
}
