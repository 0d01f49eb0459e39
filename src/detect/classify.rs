//! Gain/duration classification of completed moves.
//!
//! Two duration buckets carry their own magnitude thresholds; moves shorter
//! than 64 trading days or longer than 504 stay unclassified regardless of
//! gain. The thresholds are fixed properties of the screen, not runtime
//! configuration.

use crate::Classification;

/// Shortest duration (trading days) eligible for classification.
pub const MIN_CLASSIFY_DAYS: usize = 64;
/// First day of the long bucket: durations in `[64, 252)` are short,
/// `[252, 504]` long.
pub const LONG_BUCKET_DAYS: usize = 252;
/// Longest duration still eligible for classification.
pub const MAX_CLASSIFY_DAYS: usize = 504;

/// Growth threshold (percent gain) for the short bucket.
pub const SHORT_GROWTH_PCT: f64 = 100.0;
/// Superperformance threshold for the short bucket.
pub const SHORT_SUPER_PCT: f64 = 300.0;
/// Growth threshold for the long bucket.
pub const LONG_GROWTH_PCT: f64 = 150.0;
/// Superperformance threshold for the long bucket.
pub const LONG_SUPER_PCT: f64 = 500.0;

/// Label a completed move from its duration in trading days and total gain
/// in percent. Pure function; the tracker calls it at termination, and it
/// can be applied directly to historical records.
pub fn classify(duration_days: usize, total_gain_pct: f64) -> Classification {
    let (growth, superperformance) =
        if (MIN_CLASSIFY_DAYS..LONG_BUCKET_DAYS).contains(&duration_days) {
            (SHORT_GROWTH_PCT, SHORT_SUPER_PCT)
        } else if (LONG_BUCKET_DAYS..=MAX_CLASSIFY_DAYS).contains(&duration_days) {
            (LONG_GROWTH_PCT, LONG_SUPER_PCT)
        } else {
            return Classification::None;
        };

    if total_gain_pct >= superperformance {
        Classification::Superperformance
    } else if total_gain_pct >= growth {
        Classification::Growth
    } else {
        Classification::None
    }
}
