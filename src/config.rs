//! Screening thresholds and behavior flags.
//!
//! All knobs live on one value object so a caller (or a deserialized
//! settings file) can hand the engine its entire configuration at once.
//! Defaults mirror the classic superperformance screen; every field is
//! overridable. Validation is fatal at engine construction, never during a
//! scan.

use serde::{Deserialize, Serialize};

use crate::{Result, ScreenError};

/// Default minimum average daily volume a ticker must trade before its
/// series is worth scanning. Applied by the data layer, not re-checked by
/// the engine; carried here so one value object serves both layers.
pub const MIN_DAILY_VOLUME: f64 = 200_000.0;

/// Default rise (percent) off the LOD anchor that confirms a move start.
pub const MIN_GROWTH_PERCENTAGE: f64 = 5.0;

/// Default smallest decline from the running peak that counts as a drawdown.
pub const MIN_DRAWDOWN_PERCENTAGE: f64 = 15.0;

/// Default decline from the running peak that terminates the move instead
/// of recording a drawdown.
pub const MAX_DRAWDOWN_PERCENTAGE: f64 = 30.0;

/// Default confirmation window length in trading days after the LOD anchor.
pub const GROWTH_MOVE_DAYS: usize = 5;

/// Default number of consecutive bars without a new high an active move
/// survives.
pub const MAX_DAYS_WITHOUT_HIGH: usize = 30;

/// Default cap on a move's length in trading days (roughly two years).
pub const MAX_TOTAL_DAYS: usize = 504;

/// Upper bound accepted for any day-count threshold (about forty years of
/// trading days). Bounding the windows keeps scan index arithmetic
/// overflow-free.
pub const MAX_SPAN_DAYS: usize = 10_000;

/// Price series the confirmation-window maximum is taken from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmBasis {
    /// Bar closes: the rally must hold into a session close.
    #[default]
    Close,
    /// Bar highs: any intraday touch of the threshold confirms.
    High,
}

/// Engine configuration. Construct with struct-update syntax over
/// [`ScreenConfig::default()`], or deserialize a partial document (missing
/// fields take their defaults).
///
/// ```rust
/// use movescan::prelude::*;
///
/// let config = ScreenConfig {
///     min_growth_pct: 7.5,
///     ..ScreenConfig::default()
/// };
/// let engine = MoveEngine::new(config).unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    /// Volume floor for the upstream symbol filter (see [`MIN_DAILY_VOLUME`]).
    pub min_daily_volume: f64,
    /// Percent rise off the LOD that confirms a move start.
    pub min_growth_pct: f64,
    /// Lower bound (percent) of the drawdown band.
    pub min_drawdown_pct: f64,
    /// Upper bound (percent): reaching it terminates the move.
    pub max_drawdown_pct: f64,
    /// Confirmation window length in trading days.
    pub growth_move_days: usize,
    /// Consecutive bars without a new high before the move goes stale.
    pub max_days_without_high: usize,
    /// Cap on elapsed trading days since the move start.
    pub max_total_days: usize,
    /// Price series used by the confirmation window.
    pub confirm_basis: ConfirmBasis,
    /// Append the terminating (>= max) drawdown to the move's drawdown list
    /// as a resolved, non-continuation entry instead of dropping it.
    pub record_breach_drawdown: bool,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            min_daily_volume: MIN_DAILY_VOLUME,
            min_growth_pct: MIN_GROWTH_PERCENTAGE,
            min_drawdown_pct: MIN_DRAWDOWN_PERCENTAGE,
            max_drawdown_pct: MAX_DRAWDOWN_PERCENTAGE,
            growth_move_days: GROWTH_MOVE_DAYS,
            max_days_without_high: MAX_DAYS_WITHOUT_HIGH,
            max_total_days: MAX_TOTAL_DAYS,
            confirm_basis: ConfirmBasis::Close,
            record_breach_drawdown: false,
        }
    }
}

impl ScreenConfig {
    /// Check every threshold. Called by `MoveEngine::new`; callers holding a
    /// config from an untrusted source can also call it directly.
    pub fn validate(&self) -> Result<()> {
        if !self.min_daily_volume.is_finite() || self.min_daily_volume < 0.0 {
            return Err(ScreenError::InvalidConfig(
                "min_daily_volume must be finite and non-negative",
            ));
        }
        if !self.min_growth_pct.is_finite() || self.min_growth_pct <= 0.0 {
            return Err(ScreenError::InvalidConfig(
                "min_growth_pct must be finite and positive",
            ));
        }
        if !self.max_drawdown_pct.is_finite()
            || self.max_drawdown_pct <= 0.0
            || self.max_drawdown_pct > 100.0
        {
            return Err(ScreenError::OutOfRange {
                field: "max_drawdown_pct",
                value: self.max_drawdown_pct,
                min: 0.0,
                max: 100.0,
            });
        }
        if !self.min_drawdown_pct.is_finite()
            || self.min_drawdown_pct <= 0.0
            || self.min_drawdown_pct >= self.max_drawdown_pct
        {
            return Err(ScreenError::OutOfRange {
                field: "min_drawdown_pct",
                value: self.min_drawdown_pct,
                min: 0.0,
                max: self.max_drawdown_pct,
            });
        }
        for (field, value) in [
            ("growth_move_days", self.growth_move_days),
            ("max_days_without_high", self.max_days_without_high),
            ("max_total_days", self.max_total_days),
        ] {
            if value == 0 || value > MAX_SPAN_DAYS {
                return Err(ScreenError::OutOfRange {
                    field,
                    value: value as f64,
                    min: 1.0,
                    max: MAX_SPAN_DAYS as f64,
                });
            }
        }
        Ok(())
    }
}
