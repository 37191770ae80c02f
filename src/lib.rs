//! scrollstitch turns a recording of a slowly scrolled list into one tall
//! image that contains every row of the list exactly once.
//!
//! Frames are pulled in order from a [`FrameSource`]. Each frame is scaled to
//! the first frame's width, dropped if it duplicates its predecessor, and
//! otherwise searched for the bottom rows of the panorama built so far using
//! zero-mean normalized cross-correlation. Rows below the best match are
//! appended when the match is confident and the surplus is larger than
//! jitter. Parallel scanning and multi-video batches are available with the
//! `rayon` feature; SIMD scoring with the `simd` feature.
//!
//! ```no_run
//! use scrollstitch::{MemorySource, StitchParams, Stitcher};
//! # fn frames() -> Vec<scrollstitch::Frame> { Vec::new() }
//! let source = MemorySource::new(frames(), 30.0);
//! let output = Stitcher::new(source, StitchParams::default())?.run()?;
//! println!("{}", output.summary);
//! # Ok::<(), scrollstitch::StitchError>(())
//! ```

#[cfg(feature = "rayon")]
pub mod batch;
mod candidate;
pub mod dedup;
pub mod driver;
pub mod image;
pub mod kernel;
pub mod lowlevel;
pub mod panorama;
pub mod params;
pub mod progress;
pub mod search;
pub mod sink;
pub mod source;
pub mod template;
mod trace;
pub mod util;

#[cfg(feature = "image-io")]
pub use crate::image::io;
pub use crate::image::{Frame, ImageView};
pub use util::{StitchError, StitchResult};

pub use candidate::topk::Peak;
pub use dedup::is_duplicate;
pub use driver::{FrameOutcome, RunState, StitchOutput, StitchState, StitchSummary, Stitcher};
pub use panorama::{AppendOutcome, Panorama};
pub use params::StitchParams;
pub use progress::{
    parse_progress_line, FrameReport, LogProgress, NoProgress, ProgressEvent, ProgressFraction,
    ProgressSink,
};
pub use search::{EstimatorConfig, MatchResult, ScrollEstimator};
#[cfg(feature = "image-io")]
pub use sink::ImageFileSink;
pub use sink::{MemorySink, ResultSink};
#[cfg(feature = "image-io")]
pub use source::ImageSequenceSource;
pub use source::{FrameSource, MemorySource};
