//! Candidate tracking for correlation peaks.

pub(crate) mod topk;
