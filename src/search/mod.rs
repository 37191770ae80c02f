//! Scroll-offset estimation by template correlation.
//!
//! The estimator runs a full 2D zero-mean normalized cross-correlation of the
//! panorama's bottom rows against every placement in the incoming frame and
//! reports the single best placement. Frames share the panorama's width, so
//! the horizontal offset is normally zero; callers only consume `offset_y`.

use crate::kernel::{Kernel, ScanParams};
use crate::template::TemplatePlan;
use crate::trace::trace_span;
use crate::util::StitchResult;
use crate::ImageView;

#[cfg(not(feature = "simd"))]
use crate::kernel::scalar::ZnccScalar as Zncc;
#[cfg(feature = "simd")]
use crate::kernel::simd::ZnccSimd as Zncc;

/// Best placement of the template inside a frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MatchResult {
    /// Normalized correlation in `[-1, 1]`.
    pub score: f32,
    /// Column of the best placement (expected to be 0).
    pub offset_x: usize,
    /// Row of the best placement.
    pub offset_y: usize,
    /// Height of the template that produced this match.
    pub template_rows: usize,
}

impl MatchResult {
    /// A result carrying no position information.
    ///
    /// Used when the template is flat or every window is flat; its score of
    /// zero is below any valid quality threshold.
    pub fn unmatched(template_rows: usize) -> Self {
        Self {
            score: 0.0,
            offset_x: 0,
            offset_y: 0,
            template_rows,
        }
    }

    /// First frame row below the matched template region.
    pub fn content_start(&self) -> usize {
        self.offset_y + self.template_rows
    }
}

/// Estimator configuration.
#[derive(Clone, Copy, Debug)]
pub struct EstimatorConfig {
    /// Split the scan across rayon workers (requires the `rayon` feature).
    pub parallel: bool,
    /// Minimum window variance; flatter windows are not scored.
    pub min_var_i: f64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            parallel: false,
            min_var_i: 1e-6,
        }
    }
}

/// Finds where the panorama tail reappears inside a new frame.
#[derive(Clone, Debug, Default)]
pub struct ScrollEstimator {
    cfg: EstimatorConfig,
}

impl ScrollEstimator {
    /// Creates an estimator with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the estimator configuration.
    pub fn with_config(mut self, cfg: EstimatorConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &EstimatorConfig {
        &self.cfg
    }

    /// Locates `template` inside `frame` (both luminance views).
    ///
    /// Returns [`StitchError::RoiOutOfBounds`](crate::StitchError::RoiOutOfBounds)
    /// if the template does not fit inside the frame.
    pub fn estimate(
        &self,
        template: ImageView<'_, u8>,
        frame: ImageView<'_, u8>,
    ) -> StitchResult<MatchResult> {
        let _span = trace_span!(
            "scroll_match",
            template_rows = template.height(),
            frame_rows = frame.height()
        )
        .entered();

        let plan = TemplatePlan::from_view(template)?;
        let params = ScanParams {
            topk: 1,
            min_var_i: self.cfg.min_var_i,
        };
        let peaks = self.scan(frame, &plan, params)?;

        Ok(match peaks.first() {
            Some(peak) => MatchResult {
                score: peak.score,
                offset_x: peak.x,
                offset_y: peak.y,
                template_rows: plan.height(),
            },
            None => MatchResult::unmatched(plan.height()),
        })
    }

    #[cfg(feature = "rayon")]
    fn scan(
        &self,
        frame: ImageView<'_, u8>,
        plan: &TemplatePlan,
        params: ScanParams,
    ) -> StitchResult<Vec<crate::Peak>> {
        if self.cfg.parallel {
            crate::kernel::rayon::scan_full_par::<Zncc>(frame, plan, params)
        } else {
            Zncc::scan_full(frame, plan, params)
        }
    }

    #[cfg(not(feature = "rayon"))]
    fn scan(
        &self,
        frame: ImageView<'_, u8>,
        plan: &TemplatePlan,
        params: ScanParams,
    ) -> StitchResult<Vec<crate::Peak>> {
        Zncc::scan_full(frame, plan, params)
    }
}
