//! Low-level building blocks for custom stitching pipelines.
//!
//! These expose the correlation kernels, template statistics and resampling
//! helpers used by [`Stitcher`](crate::Stitcher). Most users should drive a
//! run through `Stitcher` or step a [`StitchState`](crate::StitchState).

pub use crate::candidate::topk::{Peak, TopK};
pub use crate::dedup::{changed_percent, CHANGE_DELTA};
pub use crate::image::resize::{normalize_width, resize_rgb_bilinear};
#[cfg(feature = "rayon")]
pub use crate::kernel::rayon::scan_full_par;
pub use crate::kernel::scalar::ZnccScalar;
#[cfg(feature = "simd")]
pub use crate::kernel::simd::ZnccSimd;
pub use crate::kernel::{Kernel, ScanParams};
pub use crate::template::TemplatePlan;
