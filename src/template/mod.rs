//! Template statistics for normalized correlation.
//!
//! The template itself is never stored: it is a view over the bottom rows of
//! the current panorama, rebuilt for every non-duplicate frame.

mod plan;

pub use plan::TemplatePlan;
