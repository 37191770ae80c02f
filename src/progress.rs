//! Progress events and their text form.
//!
//! The rendered [`ProgressEvent`] line is a wire format: process supervisors
//! look for the `Progress:` marker followed by `<frame>/<total>` to drive a
//! progress bar, so the text produced by `Display` must stay byte-stable.
//! [`parse_progress_line`] is the reading side of the same format.

use crate::driver::FrameOutcome;
use crate::panorama::AppendOutcome;
use crate::trace::{trace_debug, trace_event};
use std::fmt;
use std::time::Duration;

/// Marker token that starts every progress line.
pub const PROGRESS_MARKER: &str = "Progress:";

/// Periodic run status.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProgressEvent {
    /// Frames consumed so far, including the first frame.
    pub frame_index: usize,
    /// Frame count advertised by the source.
    pub total_frames: usize,
    /// Wall-clock time since the run started.
    pub elapsed: Duration,
    /// Consumed frames per second of wall-clock time.
    pub frames_per_second: f64,
    /// Current panorama height in rows.
    pub panorama_height: usize,
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{PROGRESS_MARKER} {}/{} frames | Elapsed: {:.1}s | FPS: {:.1} | Height: {}px",
            self.frame_index,
            self.total_frames,
            self.elapsed.as_secs_f64(),
            self.frames_per_second,
            self.panorama_height
        )
    }
}

/// What happened to a single frame after the first.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameReport {
    /// Zero-based position of the frame in the stream.
    pub frame_index: usize,
    /// Outcome of the frame.
    pub outcome: FrameOutcome,
    /// Panorama height after the frame.
    pub panorama_height: usize,
}

impl fmt::Display for FrameReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame {}: ", self.frame_index)?;
        match self.outcome {
            FrameOutcome::Duplicate { skipped_total } => {
                write!(f, "Duplicate skipped ({skipped_total} total)")
            }
            FrameOutcome::Matched { matched, append } => {
                write!(
                    f,
                    "Match: {:.2}, Scroll: {}px",
                    matched.score, matched.offset_y
                )?;
                match append {
                    AppendOutcome::Appended(rows) => write!(f, ", Added: {rows}px"),
                    _ => write!(f, ", No new content"),
                }
            }
        }
    }
}

/// Receiver of per-frame reports and periodic progress events.
pub trait ProgressSink {
    /// Called once for every frame after the first.
    fn on_frame(&mut self, _report: &FrameReport) {}

    /// Called every ten frames and once at the end of the run.
    fn on_progress(&mut self, event: &ProgressEvent);
}

impl<F: FnMut(&ProgressEvent)> ProgressSink for F {
    fn on_progress(&mut self, event: &ProgressEvent) {
        self(event)
    }
}

/// Sink that discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_progress(&mut self, _event: &ProgressEvent) {}
}

/// Sink that forwards reports to the crate's tracing events.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn on_frame(&mut self, report: &FrameReport) {
        trace_debug!(
            "frame_outcome",
            frame = report.frame_index,
            height = report.panorama_height,
            status = report.to_string().as_str()
        );
    }

    fn on_progress(&mut self, event: &ProgressEvent) {
        trace_event!(
            "progress",
            frame = event.frame_index,
            total = event.total_frames,
            fps = event.frames_per_second,
            height = event.panorama_height
        );
    }
}

/// `<frame>/<total>` pair read back from a progress line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProgressFraction {
    pub current: u64,
    pub total: u64,
}

impl ProgressFraction {
    /// Completion in whole percent, or `None` when the total is unknown.
    pub fn percent(&self) -> Option<u64> {
        (self.total > 0).then(|| self.current * 100 / self.total)
    }
}

/// Extracts the `<frame>/<total>` pair following the `Progress:` marker.
pub fn parse_progress_line(line: &str) -> Option<ProgressFraction> {
    let (_, rest) = line.split_once(PROGRESS_MARKER)?;
    let (current, rest) = rest.trim_start().split_once('/')?;
    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    Some(ProgressFraction {
        current: current.trim().parse().ok()?,
        total: rest[..digits_end].parse().ok()?,
    })
}
