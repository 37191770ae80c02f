#![cfg(feature = "rayon")]
//! Multi-video batches on the bounded worker pool.

mod common;

use common::{frames_at, Document};
use scrollstitch::batch::{BatchJob, BatchRunner};
use scrollstitch::{
    FrameSource, MemorySource, Panorama, ResultSink, StitchError, StitchParams, StitchResult,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const WIDTH: usize = 48;
const VIEWPORT: usize = 160;

/// Records the height of every persisted panorama under its job name.
struct SharedSink {
    name: &'static str,
    heights: Arc<Mutex<Vec<(&'static str, usize)>>>,
}

impl ResultSink for SharedSink {
    fn persist(&mut self, panorama: &Panorama) -> StitchResult<()> {
        self.heights
            .lock()
            .unwrap()
            .push((self.name, panorama.height()));
        Ok(())
    }
}

fn scrolling_source(seed: u64, scrolls: usize) -> Box<dyn FrameSource> {
    let doc = Document::random(WIDTH, VIEWPORT + scrolls * 20, seed);
    let tops: Vec<usize> = (0..=scrolls).map(|i| i * 20).collect();
    Box::new(MemorySource::new(frames_at(&doc, &tops, VIEWPORT), 30.0))
}

fn params() -> StitchParams {
    StitchParams::default().with_template_height(50)
}

#[test]
fn batch_aggregates_independent_jobs_in_order() {
    let heights = Arc::new(Mutex::new(Vec::new()));
    let sink = |name| SharedSink {
        name,
        heights: Arc::clone(&heights),
    };
    let jobs = vec![
        BatchJob::new("first", || Ok(scrolling_source(31, 3)), sink("first")),
        BatchJob::new(
            "empty",
            || Ok(Box::new(MemorySource::new(Vec::new(), 30.0)) as Box<dyn FrameSource>),
            sink("empty"),
        ),
        BatchJob::new(
            "missing",
            || {
                Err(StitchError::SourceUnavailable {
                    reason: "no such video".to_string(),
                })
            },
            sink("missing"),
        ),
        BatchJob::new("second", || Ok(scrolling_source(32, 5)), sink("second")),
    ];

    let events = Mutex::new(Vec::new());
    let report = BatchRunner::new(params(), 2)
        .unwrap()
        .run(jobs, |name, event| {
            events.lock().unwrap().push((name.to_string(), event.frame_index));
        })
        .unwrap();

    let names: Vec<&str> = report.outcomes.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, vec!["first", "empty", "missing", "second"]);
    assert_eq!(report.succeeded(), 2);
    assert_eq!(report.failed(), 2);
    assert!(report.average_job_secs().is_some());

    let first = report.outcomes[0].result.as_ref().unwrap();
    assert_eq!(first.final_height, VIEWPORT + 60);
    assert!(matches!(
        report.outcomes[1].result,
        Err(StitchError::EmptySource)
    ));
    assert!(matches!(
        report.outcomes[2].result,
        Err(StitchError::SourceUnavailable { .. })
    ));
    let second = report.outcomes[3].result.as_ref().unwrap();
    assert_eq!(second.final_height, VIEWPORT + 100);

    let mut persisted = heights.lock().unwrap().clone();
    persisted.sort();
    assert_eq!(persisted, vec![("first", VIEWPORT + 60), ("second", VIEWPORT + 100)]);

    let events = events.into_inner().unwrap();
    assert!(events.contains(&("first".to_string(), 4)));
    assert!(events.contains(&("second".to_string(), 6)));
}

#[test]
fn job_over_budget_is_cut_off() {
    let jobs = vec![BatchJob::new(
        "slow",
        || Ok(scrolling_source(33, 4)),
        SharedSink {
            name: "slow",
            heights: Arc::new(Mutex::new(Vec::new())),
        },
    )];
    let report = BatchRunner::new(params(), 1)
        .unwrap()
        .with_timeout(Duration::ZERO)
        .run(jobs, |_, _| {})
        .unwrap();

    let err = report.outcomes[0].result.as_ref().unwrap_err();
    assert!(matches!(err, StitchError::DeadlineExceeded { .. }));
    assert_eq!(err.exit_code(), 6);
}

#[test]
fn invalid_parameters_fail_before_any_job_runs() {
    let err = BatchRunner::new(params().with_quality_threshold(2.0), 2).unwrap_err();
    assert!(matches!(err, StitchError::InvalidParameter { .. }));
}
