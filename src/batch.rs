//! Parallel stitching of independent videos (feature-gated).
//!
//! Every job owns its source, panorama and counters; jobs share nothing, so
//! the runner only bounds concurrency, enforces a per-job wall-clock budget
//! and aggregates outcomes. A job that exceeds its budget stops at the next
//! frame boundary with [`StitchError::DeadlineExceeded`].

use crate::driver::{Stitcher, StitchSummary};
use crate::params::StitchParams;
use crate::progress::{ProgressEvent, ProgressSink};
use crate::sink::ResultSink;
use crate::source::FrameSource;
use crate::trace::{trace_event, trace_span};
use crate::util::{StitchError, StitchResult};
use rayon::prelude::*;
use std::time::{Duration, Instant};

/// Valid worker counts.
pub const WORKER_RANGE: std::ops::RangeInclusive<usize> = 1..=6;

/// Opens a job's frame source; called on the worker thread.
pub type OpenSource = Box<dyn FnOnce() -> StitchResult<Box<dyn FrameSource>> + Send>;

/// One video to stitch.
pub struct BatchJob {
    /// Label used in reports, e.g. the video's name.
    pub name: String,
    /// Deferred source constructor.
    pub open: OpenSource,
    /// Where the finished panorama goes.
    pub sink: Box<dyn ResultSink + Send>,
}

impl BatchJob {
    pub fn new(
        name: impl Into<String>,
        open: impl FnOnce() -> StitchResult<Box<dyn FrameSource>> + Send + 'static,
        sink: impl ResultSink + Send + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            open: Box::new(open),
            sink: Box::new(sink),
        }
    }
}

/// Outcome of one job.
#[derive(Debug)]
pub struct JobOutcome {
    pub name: String,
    pub result: StitchResult<StitchSummary>,
    pub elapsed: Duration,
}

/// Aggregated outcome of a batch, in submission order.
#[derive(Debug)]
pub struct BatchReport {
    pub outcomes: Vec<JobOutcome>,
    pub total_elapsed: Duration,
}

impl BatchReport {
    /// Number of jobs that produced a panorama.
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    /// Number of jobs that failed.
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    /// Mean wall-clock time per job in seconds.
    pub fn average_job_secs(&self) -> Option<f64> {
        if self.outcomes.is_empty() {
            return None;
        }
        let total: f64 = self.outcomes.iter().map(|o| o.elapsed.as_secs_f64()).sum();
        Some(total / self.outcomes.len() as f64)
    }
}

/// Runs independent stitch jobs on a bounded rayon pool.
#[derive(Clone, Debug)]
pub struct BatchRunner {
    params: StitchParams,
    max_workers: usize,
    timeout: Option<Duration>,
}

impl BatchRunner {
    /// Creates a runner; fails if the parameters or worker count are invalid.
    pub fn new(params: StitchParams, max_workers: usize) -> StitchResult<Self> {
        params.validate()?;
        if !WORKER_RANGE.contains(&max_workers) {
            return Err(StitchError::InvalidParameter {
                name: "max_workers",
                reason: format!(
                    "{max_workers} is outside {}..={}",
                    WORKER_RANGE.start(),
                    WORKER_RANGE.end()
                ),
            });
        }
        Ok(Self {
            params,
            max_workers,
            timeout: None,
        })
    }

    /// Sets the per-job wall-clock budget.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Runs every job and reports progress lines tagged with the job name.
    ///
    /// `on_progress` may be called concurrently from several workers.
    pub fn run<F>(&self, jobs: Vec<BatchJob>, on_progress: F) -> StitchResult<BatchReport>
    where
        F: Fn(&str, &ProgressEvent) + Sync,
    {
        let _span =
            trace_span!("batch", jobs = jobs.len(), workers = self.max_workers).entered();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_workers)
            .build()
            .map_err(|err| StitchError::InvalidParameter {
                name: "max_workers",
                reason: err.to_string(),
            })?;

        let started = Instant::now();
        let outcomes = pool.install(|| {
            jobs.into_par_iter()
                .map(|job| self.run_job(job, &on_progress))
                .collect::<Vec<_>>()
        });

        let report = BatchReport {
            outcomes,
            total_elapsed: started.elapsed(),
        };
        trace_event!(
            "batch_done",
            succeeded = report.succeeded(),
            failed = report.failed()
        );
        Ok(report)
    }

    fn run_job<F>(&self, job: BatchJob, on_progress: &F) -> JobOutcome
    where
        F: Fn(&str, &ProgressEvent) + Sync,
    {
        let started = Instant::now();
        let BatchJob { name, open, sink } = job;

        let result = self.stitch_job(&name, open, sink, on_progress);
        match &result {
            Ok(summary) => {
                trace_event!("job_done", height = summary.final_height);
            }
            Err(err) => {
                trace_event!("job_failed", error = err.to_string().as_str());
            }
        }

        JobOutcome {
            name,
            result,
            elapsed: started.elapsed(),
        }
    }

    fn stitch_job<F>(
        &self,
        name: &str,
        open: OpenSource,
        mut sink: Box<dyn ResultSink + Send>,
        on_progress: &F,
    ) -> StitchResult<StitchSummary>
    where
        F: Fn(&str, &ProgressEvent) + Sync,
    {
        let mut stitcher = Stitcher::new(open()?, self.params)?;
        if let Some(timeout) = self.timeout {
            stitcher = stitcher.with_deadline(timeout);
        }
        let mut progress = NamedProgress {
            name,
            forward: on_progress,
        };
        stitcher.run_into(&mut progress, sink.as_mut())
    }
}

struct NamedProgress<'a, F> {
    name: &'a str,
    forward: &'a F,
}

impl<F: Fn(&str, &ProgressEvent)> ProgressSink for NamedProgress<'_, F> {
    fn on_progress(&mut self, event: &ProgressEvent) {
        (self.forward)(self.name, event);
    }
}

/// Estimates the seconds left in a batch from the times of finished jobs.
///
/// Remaining jobs are assumed to run `workers` at a time at the average
/// duration seen so far.
pub fn estimate_remaining(
    job_secs: &[f64],
    completed: usize,
    total: usize,
    workers: usize,
) -> Option<f64> {
    if job_secs.is_empty() || completed == 0 || workers == 0 {
        return None;
    }
    let average = job_secs.iter().sum::<f64>() / job_secs.len() as f64;
    let remaining = total.saturating_sub(completed) as f64;
    Some(remaining / workers as f64 * average)
}

/// Formats an estimate as `42s`, `3m07s` or `1h05m`; `...` when unknown.
pub fn format_eta(seconds: Option<f64>) -> String {
    let Some(seconds) = seconds else {
        return "...".to_string();
    };
    let whole = seconds.max(0.0) as u64;
    if whole < 60 {
        format!("{whole}s")
    } else if whole < 3600 {
        format!("{}m{:02}s", whole / 60, whole % 60)
    } else {
        format!("{}h{:02}m", whole / 3600, (whole % 3600) / 60)
    }
}

#[cfg(test)]
mod tests {
    use super::{estimate_remaining, format_eta, BatchRunner};
    use crate::params::StitchParams;

    #[test]
    fn eta_uses_average_and_parallelism() {
        assert_eq!(estimate_remaining(&[], 0, 4, 2), None);
        assert_eq!(estimate_remaining(&[10.0, 20.0], 2, 6, 2), Some(30.0));
        assert_eq!(estimate_remaining(&[5.0], 3, 3, 3), Some(0.0));
    }

    #[test]
    fn eta_formatting() {
        assert_eq!(format_eta(None), "...");
        assert_eq!(format_eta(Some(42.9)), "42s");
        assert_eq!(format_eta(Some(187.0)), "3m07s");
        assert_eq!(format_eta(Some(3900.0)), "1h05m");
    }

    #[test]
    fn worker_count_is_bounded() {
        assert!(BatchRunner::new(StitchParams::default(), 0).is_err());
        assert!(BatchRunner::new(StitchParams::default(), 7).is_err());
        assert!(BatchRunner::new(StitchParams::default(), 3).is_ok());
    }
}
