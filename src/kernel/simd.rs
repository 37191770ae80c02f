//! SIMD-accelerated kernel using the `wide` crate.
//!
//! The inner template row loop is vectorized to process 8 pixels at a time
//! using `f32x8`. Each row is reduced into `f64` totals before moving on, so
//! lane sums stay exact for 8-bit input at any practical frame width.

use crate::kernel::{finish_score, Kernel};
use crate::template::TemplatePlan;
use crate::ImageView;
use wide::f32x8;

const LANES: usize = 8;

#[inline]
fn load_u8x8_as_f32x8(slice: &[u8]) -> f32x8 {
    f32x8::from([
        slice[0] as f32,
        slice[1] as f32,
        slice[2] as f32,
        slice[3] as f32,
        slice[4] as f32,
        slice[5] as f32,
        slice[6] as f32,
        slice[7] as f32,
    ])
}

#[inline]
fn load_f32x8(slice: &[f32]) -> f32x8 {
    f32x8::from([
        slice[0], slice[1], slice[2], slice[3], slice[4], slice[5], slice[6], slice[7],
    ])
}

#[inline]
fn hsum_f64(v: f32x8) -> f64 {
    v.to_array().iter().map(|&lane| f64::from(lane)).sum()
}

/// SIMD ZNCC kernel; numerically equivalent to the scalar kernel within `1e-5`.
pub struct ZnccSimd;

impl Kernel for ZnccSimd {
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
        let simd_end = tpl_width / LANES * LANES;

        let mut dot = 0.0f64;
        let mut sum_i = 0.0f64;
        let mut sum_i2 = 0.0f64;
        for ty in 0..tpl_height {
            let img_row = &image.row(y + ty)?[x..x + tpl_width];
            let tpl_row = &t_prime[ty * tpl_width..(ty + 1) * tpl_width];

            let mut dot_vec = f32x8::ZERO;
            let mut sum_vec = f32x8::ZERO;
            let mut sum2_vec = f32x8::ZERO;
            let mut tx = 0;
            while tx < simd_end {
                let img_vals = load_u8x8_as_f32x8(&img_row[tx..]);
                let tpl_vals = load_f32x8(&tpl_row[tx..]);
                dot_vec += tpl_vals * img_vals;
                sum_vec += img_vals;
                sum2_vec += img_vals * img_vals;
                tx += LANES;
            }
            dot += hsum_f64(dot_vec);
            sum_i += hsum_f64(sum_vec);
            sum_i2 += hsum_f64(sum2_vec);

            for (&value, &t) in img_row[simd_end..].iter().zip(&tpl_row[simd_end..]) {
                let v = f64::from(value);
                dot += f64::from(t) * v;
                sum_i += v;
                sum_i2 += v * v;
            }
        }

        let n = (tpl_width * tpl_height) as f64;
        finish_score(dot, sum_i, sum_i2, n, plan.var_t(), min_var_i)
    }
}
