//! # movescan - growth move detection for daily price history
//!
//! Scans a security's daily OHLCV bars for *growth moves*: sustained
//! advances that begin with a sharp rally off a Lowest-of-Day (LOD) anchor.
//! Each completed move is annotated with its intermediate drawdowns, whether
//! the advance resumed after a drawdown (continuation), and a
//! Growth / Superperformance classification based on gain and duration.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use movescan::prelude::*;
//!
//! // Six daily bars: a 9.98 low followed by a rally past 5% within five days.
//! let start = NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
//! let bars: Vec<Bar> = (0u64..6)
//!     .map(|i| {
//!         let px = 10.0 + i as f64 * 0.12;
//!         Bar::new(
//!             start + chrono::Days::new(i),
//!             px,
//!             px + 0.05,
//!             px - 0.02,
//!             px + 0.03,
//!             250_000.0,
//!         )
//!     })
//!     .collect();
//!
//! let series = BarSeries::new(bars).unwrap();
//! let engine = MoveEngine::with_defaults();
//! let moves = engine.scan("DEMO", &series).unwrap();
//! assert_eq!(moves.len(), 1);
//! ```
//!
//! The engine holds no state between runs: scanning the same series twice
//! yields identical moves, and independent tickers can be scanned in
//! parallel with [`scan_parallel`].

pub mod config;
mod detect;
pub mod report;

pub use detect::classify::classify;

pub mod prelude {
    pub use crate::{
        // Classification
        classify,
        // Configuration
        config::{ConfirmBasis, ScreenConfig},
        // Report helpers
        report::{filter_classified, format_date, to_row, HEADERS},
        // Parallel
        scan_parallel,
        Bar,
        BarSeries,
        Classification,
        Drawdown,
        Move,
        MoveEngine,
        Result,
        ScanError,
        ScanResult,
        // Errors
        ScreenError,
        TerminationCause,
    };
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::ScreenConfig;

// ============================================================
// ERRORS
// ============================================================

pub type Result<T> = std::result::Result<T, ScreenError>;

/// Errors raised by series construction and engine configuration.
///
/// Series errors (`InsufficientData`, `InvalidBar`, `NonMonotonicDates`) are
/// fatal for the ticker they belong to and are never retried by the core;
/// configuration errors (`OutOfRange`, `InvalidConfig`) are fatal at engine
/// construction.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ScreenError {
    #[error("insufficient data: need {need} bars, got {got}")]
    InsufficientData { need: usize, got: usize },

    #[error("invalid bar at index {index}: {reason}")]
    InvalidBar { index: usize, reason: &'static str },

    #[error("bar dates must be strictly increasing (violated at index {index})")]
    NonMonotonicDates { index: usize },

    #[error("{field} = {value} out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

// ============================================================
// BARS
// ============================================================

/// One daily OHLCV bar. Dates are trading days; gaps (weekends, holidays)
/// are expected and carry no meaning beyond ordering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    fn validate(&self) -> std::result::Result<(), &'static str> {
        let fields = [self.open, self.high, self.low, self.close, self.volume];
        if fields.iter().any(|v| !v.is_finite()) {
            return Err("non-finite field");
        }
        if self.open <= 0.0 || self.high <= 0.0 || self.low <= 0.0 || self.close <= 0.0 {
            return Err("non-positive price");
        }
        if self.volume <= 0.0 {
            return Err("non-positive volume");
        }
        if self.high < self.low {
            return Err("high < low");
        }
        Ok(())
    }
}

/// A validated, time-ordered sequence of daily bars for one security.
///
/// Construction is the input contract for the whole engine: once a
/// `BarSeries` exists, every bar is finite and positive, `high >= low`
/// holds, and dates strictly increase (no duplicates). The series is
/// read-only afterwards. Deserialization routes through [`BarSeries::new`],
/// so a decoded series carries the same guarantees.
#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    bars: Vec<Bar>,
}

impl BarSeries {
    /// Fewest bars a series may hold: one LOD anchor plus the default
    /// five-day confirmation window.
    pub const MIN_LEN: usize = config::GROWTH_MOVE_DAYS + 1;

    pub fn new(bars: Vec<Bar>) -> Result<Self> {
        if bars.len() < Self::MIN_LEN {
            return Err(ScreenError::InsufficientData {
                need: Self::MIN_LEN,
                got: bars.len(),
            });
        }
        for (index, bar) in bars.iter().enumerate() {
            bar.validate()
                .map_err(|reason| ScreenError::InvalidBar { index, reason })?;
        }
        for index in 1..bars.len() {
            if bars[index].date <= bars[index - 1].date {
                return Err(ScreenError::NonMonotonicDates { index });
            }
        }
        Ok(Self { bars })
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bar(&self, index: usize) -> Option<&Bar> {
        self.bars.get(index)
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    /// Forward iterator over the bars starting at `index`. Each call starts
    /// fresh; no cursor is kept between calls. An out-of-range `index`
    /// yields an empty iterator.
    pub fn bars_from(&self, index: usize) -> std::slice::Iter<'_, Bar> {
        self.bars[index.min(self.bars.len())..].iter()
    }
}

impl serde::Serialize for BarSeries {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.bars.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for BarSeries {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let bars = Vec::<Bar>::deserialize(d)?;
        BarSeries::new(bars).map_err(serde::de::Error::custom)
    }
}

// ============================================================
// MOVE RECORDS
// ============================================================

/// Magnitude/duration bucket assigned to a completed move.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    /// Recorded but below every threshold for its duration bucket.
    #[default]
    None,
    Growth,
    Superperformance,
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Classification::None => "None",
            Classification::Growth => "Growth",
            Classification::Superperformance => "Superperformance",
        };
        f.write_str(name)
    }
}

/// Why an active move stopped extending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerminationCause {
    /// Price fell from the running peak by `max_drawdown_pct` or more.
    MaxDrawdown,
    /// More than `max_days_without_high` bars passed without a new high.
    NoNewHigh,
    /// The move exceeded `max_total_days` trading days.
    MaxDuration,
    /// The series ran out of bars.
    SeriesEnd,
}

/// A completed pullback inside a move: a decline from the running peak
/// inside the drawdown band.
///
/// `start_*` is the peak the price fell from, `trough_*` the lowest low
/// reached before the drawdown closed. `continuation_confirmed` is set when
/// the close-out was a new peak-high rather than the move terminating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drawdown {
    pub start_date: NaiveDate,
    pub start_price: f64,
    pub trough_date: NaiveDate,
    pub trough_price: f64,
    pub pct_decline: f64,
    pub resolved: bool,
    pub continuation_confirmed: bool,
}

/// A completed growth move. Immutable once emitted by the engine.
///
/// `end_*` is where the move's result is measured: the running peak for
/// staleness/duration/series-end terminations, the breach trough for a
/// max-drawdown termination. `peak_*` always carries the highest high the
/// move reached. `duration_days` counts trading days (bar steps) between
/// start and end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Move {
    pub ticker: String,
    pub start_date: NaiveDate,
    pub start_price: f64,
    pub end_date: NaiveDate,
    pub end_price: f64,
    pub peak_date: NaiveDate,
    pub peak_price: f64,
    pub total_gain_pct: f64,
    pub duration_days: usize,
    pub classification: Classification,
    pub drawdowns: Vec<Drawdown>,
    pub has_continuation: bool,
    pub termination: TerminationCause,
}

impl Move {
    /// True when the move earned a Growth or Superperformance label.
    pub fn is_classified(&self) -> bool {
        self.classification != Classification::None
    }
}

// ============================================================
// ENGINE
// ============================================================

/// Move-detection engine: a validated configuration plus the scan entry
/// point. Stateless between calls; cheap to clone and share across threads.
#[derive(Debug, Clone)]
pub struct MoveEngine {
    config: ScreenConfig,
}

impl MoveEngine {
    /// Build an engine, rejecting out-of-range thresholds up front.
    pub fn new(config: ScreenConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn with_defaults() -> Self {
        Self {
            config: ScreenConfig::default(),
        }
    }

    pub fn config(&self) -> &ScreenConfig {
        &self.config
    }

    /// Scan one ticker's series and return its completed moves in
    /// chronological order (possibly empty). Fails only when the series is
    /// shorter than the configured confirmation window allows.
    pub fn scan(&self, ticker: &str, series: &BarSeries) -> Result<Vec<Move>> {
        let need = self.config.growth_move_days + 1;
        if series.len() < need {
            return Err(ScreenError::InsufficientData {
                need,
                got: series.len(),
            });
        }
        Ok(detect::tracker::run(ticker, series, &self.config))
    }
}

impl Default for MoveEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}

// ============================================================
// PARALLEL SCANNING
// ============================================================

use rayon::prelude::*;

/// Moves found for a single ticker.
#[derive(Debug)]
pub struct ScanResult {
    pub ticker: String,
    pub moves: Vec<Move>,
}

/// Scan failure for a single ticker. Other tickers in the batch are
/// unaffected.
#[derive(Debug)]
pub struct ScanError {
    pub ticker: String,
    pub error: ScreenError,
}

/// Scan many `(ticker, series)` pairs in parallel with one engine.
///
/// One bad series lands in the error vector; the rest of the batch
/// completes.
pub fn scan_parallel<'a, I>(engine: &MoveEngine, tickers: I) -> (Vec<ScanResult>, Vec<ScanError>)
where
    I: IntoParallelIterator<Item = (&'a str, &'a BarSeries)>,
{
    let results: Vec<_> = tickers
        .into_par_iter()
        .map(|(ticker, series)| {
            engine
                .scan(ticker, series)
                .map(|moves| ScanResult {
                    ticker: ticker.to_string(),
                    moves,
                })
                .map_err(|error| ScanError {
                    ticker: ticker.to_string(),
                    error,
                })
        })
        .collect();

    let mut successes = Vec::new();
    let mut errors = Vec::new();

    for result in results {
        match result {
            Ok(r) => successes.push(r),
            Err(e) => errors.push(e),
        }
    }

    (successes, errors)
}

// ============================================================
// TESTS
// ============================================================
