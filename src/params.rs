//! Run parameters.

use crate::util::{StitchError, StitchResult};
use std::ops::RangeInclusive;

/// Valid template heights in rows.
pub const TEMPLATE_HEIGHT_RANGE: RangeInclusive<usize> = 50..=200;
/// Valid match-quality thresholds.
pub const QUALITY_THRESHOLD_RANGE: RangeInclusive<f32> = 0.5..=1.0;
/// Valid duplicate thresholds in percent of changed pixels.
pub const DUPLICATE_THRESHOLD_RANGE: RangeInclusive<f32> = 0.0..=100.0;

/// Tunable parameters, fixed for the duration of a run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StitchParams {
    /// Rows taken from the bottom of the panorama as the search template.
    pub template_height: usize,
    /// Matches scoring at or below this value append nothing.
    pub quality_threshold: f32,
    /// Surpluses of at most this many rows are treated as jitter.
    pub min_scroll: usize,
    /// Frames with fewer changed pixels than this percentage are duplicates.
    pub duplicate_threshold: f32,
}

impl Default for StitchParams {
    fn default() -> Self {
        Self {
            template_height: 100,
            quality_threshold: 0.8,
            min_scroll: 5,
            duplicate_threshold: 5.0,
        }
    }
}

impl StitchParams {
    /// Sets the template height.
    pub fn with_template_height(mut self, rows: usize) -> Self {
        self.template_height = rows;
        self
    }

    /// Sets the match-quality threshold.
    pub fn with_quality_threshold(mut self, threshold: f32) -> Self {
        self.quality_threshold = threshold;
        self
    }

    /// Sets the minimum scroll in rows.
    pub fn with_min_scroll(mut self, rows: usize) -> Self {
        self.min_scroll = rows;
        self
    }

    /// Sets the duplicate threshold in percent.
    pub fn with_duplicate_threshold(mut self, percent: f32) -> Self {
        self.duplicate_threshold = percent;
        self
    }

    /// Checks every parameter against its valid range.
    pub fn validate(&self) -> StitchResult<()> {
        if !TEMPLATE_HEIGHT_RANGE.contains(&self.template_height) {
            return Err(out_of_range(
                "template_height",
                self.template_height,
                &TEMPLATE_HEIGHT_RANGE,
            ));
        }
        if !QUALITY_THRESHOLD_RANGE.contains(&self.quality_threshold) {
            return Err(out_of_range(
                "quality_threshold",
                self.quality_threshold,
                &QUALITY_THRESHOLD_RANGE,
            ));
        }
        if !DUPLICATE_THRESHOLD_RANGE.contains(&self.duplicate_threshold) {
            return Err(out_of_range(
                "duplicate_threshold",
                self.duplicate_threshold,
                &DUPLICATE_THRESHOLD_RANGE,
            ));
        }
        Ok(())
    }
}

fn out_of_range<T: std::fmt::Display>(
    name: &'static str,
    value: T,
    range: &RangeInclusive<T>,
) -> StitchError {
    StitchError::InvalidParameter {
        name,
        reason: format!(
            "{value} is outside {}..={}",
            range.start(),
            range.end()
        ),
    }
}
