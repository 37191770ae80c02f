//! Template plan precomputation for zero-mean normalized correlation.

use crate::image::ImageView;
use crate::util::{StitchError, StitchResult};

/// Variance below which a template is considered flat.
pub(crate) const MIN_TEMPLATE_VAR: f64 = 1e-8;

/// Precomputed zero-mean template buffer and its energy.
pub struct TemplatePlan {
    width: usize,
    height: usize,
    t_prime: Vec<f32>,
    var_t: f64,
}

impl TemplatePlan {
    /// Builds a plan from a template view.
    pub fn from_view(tpl: ImageView<'_, u8>) -> StitchResult<Self> {
        let width = tpl.width();
        let height = tpl.height();
        let count = width
            .checked_mul(height)
            .ok_or(StitchError::InvalidDimensions { width, height })?;

        let mut sum = 0.0f64;
        for y in 0..height {
            let row = template_row(tpl, y)?;
            sum += row.iter().map(|&v| f64::from(v)).sum::<f64>();
        }
        let mean = sum / count as f64;

        let mut t_prime = Vec::with_capacity(count);
        let mut var_t = 0.0f64;
        for y in 0..height {
            for &value in template_row(tpl, y)? {
                let centered = f64::from(value) - mean;
                var_t += centered * centered;
                t_prime.push(centered as f32);
            }
        }

        Ok(Self {
            width,
            height,
            t_prime,
            var_t,
        })
    }

    /// Returns the template width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the template height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the zero-mean template buffer in row-major order.
    pub fn t_prime(&self) -> &[f32] {
        &self.t_prime
    }

    /// Returns the sum of squared zero-mean template values.
    pub fn var_t(&self) -> f64 {
        self.var_t
    }

    /// Returns `true` if the template has no intensity variation.
    ///
    /// A flat template correlates equally well everywhere, so it carries no
    /// information about the scroll position.
    pub fn is_flat(&self) -> bool {
        self.var_t <= MIN_TEMPLATE_VAR
    }
}

fn template_row<'a>(tpl: ImageView<'a, u8>, y: usize) -> StitchResult<&'a [u8]> {
    tpl.row(y).ok_or_else(|| StitchError::BufferTooSmall {
        needed: (y + 1)
            .checked_mul(tpl.stride())
            .and_then(|v| v.checked_add(tpl.width()))
            .unwrap_or(usize::MAX),
        got: tpl.as_slice().len(),
    })
}
