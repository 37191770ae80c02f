//! Duplicate-frame rejection.
//!
//! Two frames are duplicates when fewer than `threshold` percent of their
//! luminance pixels differ by more than [`CHANGE_DELTA`].

use crate::image::Frame;

/// Absolute luminance difference above which a pixel counts as changed.
pub const CHANGE_DELTA: u8 = 30;

/// Returns the percentage of pixels whose luminance changed between two
/// frames of identical dimensions, or `None` if the dimensions differ.
pub fn changed_percent(previous: &Frame, current: &Frame) -> Option<f64> {
    if !previous.same_dimensions(current) {
        return None;
    }
    let a = previous.luma().as_slice();
    let b = current.luma().as_slice();
    let changed = a
        .iter()
        .zip(b)
        .filter(|&(&pa, &pb)| pa.abs_diff(pb) > CHANGE_DELTA)
        .count();
    let total = previous.width() * previous.height();
    Some(changed as f64 * 100.0 / total as f64)
}

/// Decides whether `current` is visually identical to `previous`.
///
/// A missing frame or a dimension mismatch is never a duplicate.
pub fn is_duplicate(previous: Option<&Frame>, current: Option<&Frame>, threshold: f32) -> bool {
    match (previous, current) {
        (Some(previous), Some(current)) => changed_percent(previous, current)
            .is_some_and(|percent| percent < f64::from(threshold)),
        _ => false,
    }
}
