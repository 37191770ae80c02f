//! Rayon-parallel scan (feature-gated).
//!
//! Placements are split by row; each worker keeps its own best peaks and the
//! per-row collectors are merged afterwards. Tie-breaking is identical to the
//! sequential scan, so both produce the same result.

use crate::candidate::topk::{Peak, TopK};
use crate::kernel::{placement_range, Kernel, ScanParams};
use crate::template::TemplatePlan;
use crate::util::StitchResult;
use crate::ImageView;
use rayon::prelude::*;

/// Row-parallel full scan for any kernel.
pub fn scan_full_par<K: Kernel>(
    image: ImageView<'_, u8>,
    plan: &TemplatePlan,
    params: ScanParams,
) -> StitchResult<Vec<Peak>> {
    let (max_x, max_y) = placement_range(image, plan)?;
    if params.topk == 0 || plan.is_flat() {
        return Ok(Vec::new());
    }

    let merged = (0..=max_y)
        .into_par_iter()
        .map(|y| {
            let mut row_best = TopK::new(params.topk);
            for x in 0..=max_x {
                if let Some(score) = K::score_at(image, plan, x, y, params.min_var_i) {
                    row_best.push(Peak { x, y, score });
                }
            }
            row_best
        })
        .reduce(
            || TopK::new(params.topk),
            |mut acc, row| {
                acc.merge(row);
                acc
            },
        );

    Ok(merged.into_sorted_desc())
}
