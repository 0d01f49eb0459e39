//! Growth move detection internals.
//!
//! One scan of a series is an explicit three-state machine driven by
//! [`tracker::run`]: [`lod`] confirms move starts, [`tracker`] extends an
//! active move bar by bar with [`drawdown`] handling pullback bookkeeping,
//! and [`classify`] labels the finished move.

pub mod classify;
pub(crate) mod drawdown;
pub(crate) mod lod;
pub(crate) mod tracker;

/// Percent change from `from` to `to`. Positive when `to` is higher.
#[inline]
pub(crate) fn percent_change(from: f64, to: f64) -> f64 {
    (to - from) / from * 100.0
}

/// Percent decline from `peak` down to `low`. Positive when `low` sits
/// below `peak`.
#[inline]
pub(crate) fn percent_decline(peak: f64, low: f64) -> f64 {
    (peak - low) / peak * 100.0
}
