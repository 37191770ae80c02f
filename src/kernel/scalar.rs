//! Scalar reference kernel.

use crate::kernel::{finish_score, Kernel};
use crate::template::TemplatePlan;
use crate::ImageView;

/// Scalar ZNCC kernel.
///
/// Window sums of `u8` values are exact integers; only the template dot
/// product is accumulated in floating point, per row in `f32` and across rows
/// in `f64`, since templates span the full frame width.
pub struct ZnccScalar;

impl Kernel for ZnccScalar {
    fn score_at(
        image: ImageView<'_, u8>,
        plan: &TemplatePlan,
        x: usize,
        y: usize,
        min_var_i: f64,
    ) -> Option<f32> {
        let tpl_width = plan.width();
        let tpl_height = plan.height();
        if x + tpl_width > image.width() || y + tpl_height > image.height() {
            return None;
        }
        let t_prime = plan.t_prime();

        let mut dot = 0.0f64;
        let mut sum_i = 0u64;
        let mut sum_i2 = 0u64;
        for ty in 0..tpl_height {
            let img_row = &image.row(y + ty)?[x..x + tpl_width];
            let tpl_row = &t_prime[ty * tpl_width..(ty + 1) * tpl_width];
            let mut row_dot = 0.0f32;
            let mut row_sum = 0u32;
            let mut row_sum2 = 0u32;
            for (&value, &t) in img_row.iter().zip(tpl_row) {
                let v = u32::from(value);
                row_dot += t * value as f32;
                row_sum += v;
                row_sum2 += v * v;
            }
            dot += f64::from(row_dot);
            sum_i += u64::from(row_sum);
            sum_i2 += u64::from(row_sum2);
        }

        let n = (tpl_width * tpl_height) as f64;
        finish_score(dot, sum_i as f64, sum_i2 as f64, n, plan.var_t(), min_var_i)
    }
}
