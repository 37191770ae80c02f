//! Per-frame pipeline and run orchestration.
//!
//! [`StitchState`] owns everything that changes during a run: the panorama,
//! the previous raw frame and the counters. [`StitchState::step`] advances it
//! by one frame:
//!
//! 1. normalize the frame to the reference width,
//! 2. compare it with the previous frame and skip it if it is a duplicate,
//! 3. correlate the panorama's bottom rows against it,
//! 4. offer the surplus below the match to the panorama.
//!
//! [`Stitcher`] pulls frames from a [`FrameSource`], drives the state and
//! emits progress. Only three conditions end a run with an error: the source
//! cannot be opened, the first frame cannot be read, or the panorama is empty
//! at the end. Everything that can go wrong with a later frame only decides
//! whether rows are appended.

use crate::dedup::is_duplicate;
use crate::image::resize::normalize_width;
use crate::image::Frame;
use crate::panorama::{AppendOutcome, Panorama};
use crate::params::StitchParams;
use crate::progress::{FrameReport, NoProgress, ProgressEvent, ProgressSink};
use crate::search::{MatchResult, ScrollEstimator};
use crate::sink::ResultSink;
use crate::source::FrameSource;
use crate::trace::{trace_event, trace_span};
use crate::util::{StitchError, StitchResult};
use std::fmt;
use std::time::{Duration, Instant};

/// Progress is reported whenever the consumed-frame count is a multiple of this.
pub const PROGRESS_INTERVAL: usize = 10;

/// Outcome of one frame after the first.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FrameOutcome {
    /// Visually identical to the previous frame; not matched.
    Duplicate { skipped_total: usize },
    /// Matched against the panorama and offered for appending.
    Matched {
        matched: MatchResult,
        append: AppendOutcome,
    },
}

impl FrameOutcome {
    /// Rows this frame added to the panorama.
    pub fn rows_added(&self) -> usize {
        match self {
            FrameOutcome::Duplicate { .. } => 0,
            FrameOutcome::Matched { append, .. } => append.rows_added(),
        }
    }
}

/// Observational counters; they never influence stitching decisions.
#[derive(Clone, Copy, Debug)]
pub struct RunState {
    /// Frames consumed, including the first.
    pub frames_processed: usize,
    pub duplicates_skipped: usize,
    pub low_confidence_frames: usize,
    pub no_new_content_frames: usize,
    pub trivial_surplus_frames: usize,
    pub frames_appended: usize,
    pub rows_appended: usize,
    started: Instant,
}

impl RunState {
    fn new(started: Instant) -> Self {
        Self {
            frames_processed: 1,
            duplicates_skipped: 0,
            low_confidence_frames: 0,
            no_new_content_frames: 0,
            trivial_surplus_frames: 0,
            frames_appended: 0,
            rows_appended: 0,
            started,
        }
    }

    /// Wall-clock time since the run started.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    fn record(&mut self, outcome: &FrameOutcome) {
        self.frames_processed += 1;
        match outcome {
            FrameOutcome::Duplicate { .. } => self.duplicates_skipped += 1,
            FrameOutcome::Matched { append, .. } => match append {
                AppendOutcome::LowConfidence => self.low_confidence_frames += 1,
                AppendOutcome::NoNewContent => self.no_new_content_frames += 1,
                AppendOutcome::TrivialSurplus(_) => self.trivial_surplus_frames += 1,
                AppendOutcome::Appended(rows) => {
                    self.frames_appended += 1;
                    self.rows_appended += rows;
                }
            },
        }
    }
}

/// Mutable state of one run, threaded through [`StitchState::step`].
pub struct StitchState {
    panorama: Panorama,
    previous: Frame,
    reference_width: usize,
    run: RunState,
}

impl StitchState {
    /// Starts a run from its first frame, which becomes the panorama verbatim.
    pub fn new(first: Frame) -> Self {
        Self::started_at(first, Instant::now())
    }

    fn started_at(first: Frame, started: Instant) -> Self {
        Self {
            panorama: Panorama::from_first_frame(&first),
            reference_width: first.width(),
            previous: first,
            run: RunState::new(started),
        }
    }

    /// Processes the next frame of the stream.
    pub fn step(
        &mut self,
        frame: Frame,
        params: &StitchParams,
        estimator: &ScrollEstimator,
    ) -> StitchResult<FrameOutcome> {
        let frame = normalize_width(frame, self.reference_width)?;

        let outcome = if is_duplicate(
            Some(&self.previous),
            Some(&frame),
            params.duplicate_threshold,
        ) {
            FrameOutcome::Duplicate {
                skipped_total: self.run.duplicates_skipped + 1,
            }
        } else {
            let template = self.panorama.template(params.template_height);
            let matched = match estimator.estimate(template, frame.luma()) {
                Ok(matched) => matched,
                // A frame shorter than the template has no findable position.
                Err(StitchError::RoiOutOfBounds { .. }) => {
                    MatchResult::unmatched(template.height())
                }
                Err(err) => return Err(err),
            };
            let append = self.panorama.try_append(&frame, &matched, params)?;
            FrameOutcome::Matched { matched, append }
        };

        // Duplicates advance the reference too, so long runs of near-identical
        // frames never compare against a stale anchor.
        self.previous = frame;
        self.run.record(&outcome);
        Ok(outcome)
    }

    /// Returns the panorama built so far.
    pub fn panorama(&self) -> &Panorama {
        &self.panorama
    }

    /// Returns the run counters.
    pub fn run_state(&self) -> &RunState {
        &self.run
    }

    /// Returns the width every frame is normalized to.
    pub fn reference_width(&self) -> usize {
        self.reference_width
    }

    fn progress_event(&self, total_frames: usize) -> ProgressEvent {
        let elapsed = self.run.elapsed();
        let secs = elapsed.as_secs_f64();
        ProgressEvent {
            frame_index: self.run.frames_processed,
            total_frames,
            elapsed,
            frames_per_second: if secs > 0.0 {
                self.run.frames_processed as f64 / secs
            } else {
                0.0
            },
            panorama_height: self.panorama.height(),
        }
    }

    /// Finishes the run, checking that the panorama is not empty.
    pub fn finish(self) -> StitchResult<StitchOutput> {
        if self.panorama.is_empty() {
            return Err(StitchError::EmptyResult {
                width: self.panorama.width(),
                height: self.panorama.height(),
            });
        }
        let summary = StitchSummary {
            final_width: self.panorama.width(),
            final_height: self.panorama.height(),
            frames_processed: self.run.frames_processed,
            duplicates_skipped: self.run.duplicates_skipped,
            low_confidence_frames: self.run.low_confidence_frames,
            frames_appended: self.run.frames_appended,
            rows_appended: self.run.rows_appended,
            elapsed: self.run.elapsed(),
        };
        Ok(StitchOutput {
            panorama: self.panorama,
            summary,
        })
    }
}

/// Closing report of a successful run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StitchSummary {
    pub final_width: usize,
    pub final_height: usize,
    pub frames_processed: usize,
    pub duplicates_skipped: usize,
    pub low_confidence_frames: usize,
    pub frames_appended: usize,
    pub rows_appended: usize,
    pub elapsed: Duration,
}

impl fmt::Display for StitchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Final dimensions: {}x{} pixels",
            self.final_width, self.final_height
        )?;
        writeln!(f, "Duplicates skipped: {}", self.duplicates_skipped)?;
        write!(f, "Processing time: {:.1} seconds", self.elapsed.as_secs_f64())
    }
}

/// Panorama and summary of a successful run.
#[derive(Debug)]
pub struct StitchOutput {
    pub panorama: Panorama,
    pub summary: StitchSummary,
}

/// Drives a [`StitchState`] over a whole [`FrameSource`].
pub struct Stitcher<S> {
    source: S,
    params: StitchParams,
    estimator: ScrollEstimator,
    deadline: Option<Duration>,
}

impl<S: FrameSource> Stitcher<S> {
    /// Creates a stitcher; fails if `params` are out of range.
    pub fn new(source: S, params: StitchParams) -> StitchResult<Self> {
        params.validate()?;
        Ok(Self {
            source,
            params,
            estimator: ScrollEstimator::new(),
            deadline: None,
        })
    }

    /// Replaces the scroll estimator.
    pub fn with_estimator(mut self, estimator: ScrollEstimator) -> Self {
        self.estimator = estimator;
        self
    }

    /// Aborts the run with [`StitchError::DeadlineExceeded`] once this much
    /// wall-clock time has passed. Checked between frames only.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Returns the run parameters.
    pub fn params(&self) -> &StitchParams {
        &self.params
    }

    /// Runs to the end of the source without progress reporting.
    pub fn run(self) -> StitchResult<StitchOutput> {
        self.run_with_progress(&mut NoProgress)
    }

    /// Runs to the end of the source and hands the panorama to `sink`.
    pub fn run_into(
        self,
        progress: &mut dyn ProgressSink,
        sink: &mut dyn ResultSink,
    ) -> StitchResult<StitchSummary> {
        let output = self.run_with_progress(progress)?;
        sink.persist(&output.panorama)?;
        Ok(output.summary)
    }

    /// Runs to the end of the source, reporting to `progress`.
    pub fn run_with_progress(
        mut self,
        progress: &mut dyn ProgressSink,
    ) -> StitchResult<StitchOutput> {
        let total_frames = self.source.frame_count();
        let _span = trace_span!(
            "stitch_run",
            total_frames = total_frames,
            width = self.source.width()
        )
        .entered();
        let started = Instant::now();

        let first = match self.source.next_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => return Err(StitchError::EmptySource),
            Err(err) => {
                trace_event!("first_frame_failed", error = err.to_string().as_str());
                return Err(StitchError::EmptySource);
            }
        };
        let mut state = StitchState::started_at(first, started);
        let mut last_reported = None;

        loop {
            let frame = match self.source.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => break,
                // An unreadable frame ends the stream, like a short container.
                Err(err) => {
                    trace_event!("stream_truncated", error = err.to_string().as_str());
                    break;
                }
            };

            let frame_index = state.run.frames_processed;
            let outcome = state.step(frame, &self.params, &self.estimator)?;
            progress.on_frame(&FrameReport {
                frame_index,
                outcome,
                panorama_height: state.panorama.height(),
            });

            let consumed = state.run.frames_processed;
            let is_duplicate = matches!(outcome, FrameOutcome::Duplicate { .. });
            if !is_duplicate && (consumed % PROGRESS_INTERVAL == 0 || consumed == total_frames) {
                progress.on_progress(&state.progress_event(total_frames));
                last_reported = Some(consumed);
            }

            if let Some(deadline) = self.deadline {
                let elapsed = state.run.elapsed();
                if elapsed > deadline {
                    return Err(StitchError::DeadlineExceeded {
                        elapsed_secs: elapsed.as_secs_f64(),
                    });
                }
            }
        }

        if last_reported != Some(state.run.frames_processed) {
            progress.on_progress(&state.progress_event(total_frames));
        }

        let output = state.finish()?;
        trace_event!(
            "run_done",
            width = output.summary.final_width,
            height = output.summary.final_height,
            duplicates = output.summary.duplicates_skipped
        );
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::{FrameOutcome, StitchState};
    use crate::image::Frame;
    use crate::panorama::AppendOutcome;
    use crate::params::StitchParams;
    use crate::search::ScrollEstimator;

    fn noise_rows(width: usize, rows: std::ops::Range<usize>) -> Vec<u8> {
        rows.flat_map(|y| {
            (0..width).map(move |x| {
                let mut h = (x as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
                    ^ (y as u64 + 1).wrapping_mul(0xC2B2_AE3D_27D4_EB4F);
                h ^= h >> 31;
                h = h.wrapping_mul(0x94D0_49BB_1331_11EB);
                (h >> 56) as u8
            })
        })
        .collect()
    }

    fn window(width: usize, top: usize, height: usize) -> Frame {
        Frame::from_gray(&noise_rows(width, top..top + height), width, height).unwrap()
    }

    #[test]
    fn step_appends_scrolled_content() {
        let params = StitchParams::default().with_template_height(50);
        let estimator = ScrollEstimator::new();
        let mut state = StitchState::new(window(32, 0, 120));

        let outcome = state.step(window(32, 30, 120), &params, &estimator).unwrap();
        assert_eq!(outcome.rows_added(), 30);
        assert_eq!(state.panorama().height(), 150);
        assert_eq!(state.run_state().frames_processed, 2);
    }

    #[test]
    fn duplicates_advance_previous_frame() {
        let params = StitchParams::default().with_template_height(50);
        let estimator = ScrollEstimator::new();
        let first = window(16, 0, 80);
        let mut state = StitchState::new(first.clone());

        let outcome = state.step(first, &params, &estimator).unwrap();
        assert_eq!(outcome, FrameOutcome::Duplicate { skipped_total: 1 });
        assert_eq!(state.run_state().duplicates_skipped, 1);

        let outcome = state.step(window(16, 20, 80), &params, &estimator).unwrap();
        assert!(matches!(
            outcome,
            FrameOutcome::Matched {
                append: AppendOutcome::Appended(20),
                ..
            }
        ));
    }

    #[test]
    fn short_frame_after_normalization_is_not_fatal() {
        let params = StitchParams::default().with_template_height(50);
        let estimator = ScrollEstimator::new();
        let mut state = StitchState::new(window(32, 0, 100));

        // 64x60 shrinks to 32x30, shorter than the template.
        let outcome = state.step(window(64, 0, 60), &params, &estimator).unwrap();
        assert!(matches!(
            outcome,
            FrameOutcome::Matched {
                append: AppendOutcome::LowConfidence,
                ..
            }
        ));
        assert_eq!(state.panorama().height(), 100);
        assert_eq!(state.reference_width(), 32);
    }
}
