//! Normalized correlation kernels.
//!
//! All kernels compute the zero-mean normalized cross-correlation
//!
//! ```text
//! score(x, y) = sum(T' * I) / sqrt(sum(T'^2) * (sum(I^2) - sum(I)^2 / n))
//! ```
//!
//! over every placement of the template inside the image, where `T'` is the
//! zero-mean template from [`TemplatePlan`]. Placements whose image window has
//! no variance are skipped.

use crate::candidate::topk::{Peak, TopK};
use crate::template::TemplatePlan;
use crate::util::{StitchError, StitchResult};
use crate::ImageView;

/// Scan configuration for kernel evaluations.
#[derive(Clone, Copy, Debug)]
pub struct ScanParams {
    /// Maximum number of peaks to retain.
    pub topk: usize,
    /// Minimum window variance; flatter windows are skipped.
    pub min_var_i: f64,
}

impl Default for ScanParams {
    fn default() -> Self {
        Self {
            topk: 1,
            min_var_i: 1e-6,
        }
    }
}

/// Kernel trait for scoring and scan operations.
pub trait Kernel {
    /// Computes the score at a single placement (top-left coordinates).
    ///
    /// Returns `None` if the placement is out of range or the window is flat.
    fn score_at(
        image: ImageView<'_, u8>,
        plan: &TemplatePlan,
        x: usize,
        y: usize,
        min_var_i: f64,
    ) -> Option<f32>;

    /// Scans the full valid placement range and returns top-K peaks.
    fn scan_full(
        image: ImageView<'_, u8>,
        plan: &TemplatePlan,
        params: ScanParams,
    ) -> StitchResult<Vec<Peak>> {
        let (max_x, max_y) = placement_range(image, plan)?;
        if params.topk == 0 || plan.is_flat() {
            return Ok(Vec::new());
        }

        let mut topk = TopK::new(params.topk);
        for y in 0..=max_y {
            for x in 0..=max_x {
                if let Some(score) = Self::score_at(image, plan, x, y, params.min_var_i) {
                    topk.push(Peak { x, y, score });
                }
            }
        }
        Ok(topk.into_sorted_desc())
    }
}

/// Returns the largest valid top-left placement of `plan` inside `image`.
pub(crate) fn placement_range(
    image: ImageView<'_, u8>,
    plan: &TemplatePlan,
) -> StitchResult<(usize, usize)> {
    let img_width = image.width();
    let img_height = image.height();
    if img_width < plan.width() || img_height < plan.height() {
        return Err(StitchError::RoiOutOfBounds {
            x: 0,
            y: 0,
            width: plan.width(),
            height: plan.height(),
            img_width,
            img_height,
        });
    }
    Ok((img_width - plan.width(), img_height - plan.height()))
}

/// Finishes a score from accumulated sums, clamping rounding excursions to `[-1, 1]`.
#[inline]
pub(crate) fn finish_score(
    dot: f64,
    sum_i: f64,
    sum_i2: f64,
    n: f64,
    var_t: f64,
    min_var_i: f64,
) -> Option<f32> {
    let var_i = sum_i2 - (sum_i * sum_i) / n;
    if var_i <= min_var_i {
        return None;
    }
    let score = dot / (var_t * var_i).sqrt();
    if score.is_finite() {
        Some(score.clamp(-1.0, 1.0) as f32)
    } else {
        None
    }
}

pub mod scalar;

#[cfg(feature = "simd")]
pub mod simd;

#[cfg(feature = "rayon")]
pub mod rayon;
