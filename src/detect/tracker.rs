//! The move-tracking state machine.
//!
//! One scan of a series loops over three states: searching for a confirmed
//! LOD anchor, extending an active move bar by bar, and finalizing a
//! terminated move before the search resumes after its end. Termination
//! rules are checked in fixed priority order on every bar: max-drawdown
//! breach, stale high, age cap, then series exhaustion.

use log::debug;

use crate::config::ScreenConfig;
use crate::detect::classify::classify;
use crate::detect::drawdown::{Breach, ClosedDrawdown, DrawdownTracker};
use crate::detect::lod::{self, LodCandidate};
use crate::detect::percent_change;
use crate::{BarSeries, Drawdown, Move, TerminationCause};

/// Scan position. Exactly one variant is live at a time; every loop
/// iteration consumes the state and produces the next.
#[derive(Debug)]
pub(crate) enum ScanState {
    /// No active move; `next` is the anchor index to test.
    Searching { next: usize },
    /// A confirmed move is extending.
    Active(MoveTracker),
    /// A move finished; record it and resume the search after its end.
    Terminated(CompletedMove),
}

/// Walk one series start to finish, emitting completed moves in
/// chronological order. Moves never overlap: the search resumes at the bar
/// after the previous move's end.
pub(crate) fn run(ticker: &str, series: &BarSeries, config: &ScreenConfig) -> Vec<Move> {
    let mut moves = Vec::new();
    let mut state = ScanState::Searching { next: 0 };
    loop {
        state = match state {
            ScanState::Searching { next } => {
                if next + config.growth_move_days >= series.len() {
                    break;
                }
                step_searching(ticker, series, next, config)
            }
            ScanState::Active(tracker) => tracker.on_bar(series, config),
            ScanState::Terminated(completed) => {
                let resume = completed.end_index + 1;
                debug!(
                    "{ticker}: move {} -> {} terminated ({:?})",
                    series.bars()[completed.start_index].date,
                    series.bars()[completed.end_index].date,
                    completed.cause,
                );
                moves.push(completed.into_move(ticker, series));
                ScanState::Searching { next: resume }
            }
        };
    }
    moves
}

/// SEARCHING: test one anchor index, advancing a single bar on failure.
fn step_searching(
    ticker: &str,
    series: &BarSeries,
    next: usize,
    config: &ScreenConfig,
) -> ScanState {
    match lod::confirm_at(series, next, config) {
        Some(candidate) => {
            debug!(
                "{ticker}: move confirmed at {} (lod {:.2})",
                series.bars()[candidate.index].date,
                candidate.low,
            );
            ScanState::Active(MoveTracker::open(candidate))
        }
        None => ScanState::Searching { next: next + 1 },
    }
}

/// ACTIVE-state bookkeeping for one move.
#[derive(Debug)]
pub(crate) struct MoveTracker {
    start_index: usize,
    start_price: f64,
    peak_index: usize,
    peak_price: f64,
    days_since_high: usize,
    cursor: usize,
    drawdowns: DrawdownTracker,
}

impl MoveTracker {
    /// The peak seeds from the anchor low. Confirmation guarantees a higher
    /// trade inside the confirmation window, so the peak advances before
    /// the staleness rule can ever fire.
    fn open(candidate: LodCandidate) -> Self {
        Self {
            start_index: candidate.index,
            start_price: candidate.low,
            peak_index: candidate.index,
            peak_price: candidate.low,
            days_since_high: 0,
            cursor: candidate.index + 1,
            drawdowns: DrawdownTracker::new(),
        }
    }

    /// ACTIVE: consume one bar. Peak update first, then drawdown
    /// bookkeeping, then the termination rules in priority order.
    fn on_bar(mut self, series: &BarSeries, config: &ScreenConfig) -> ScanState {
        let index = self.cursor;
        let Some(bar) = series.bar(index) else {
            return ScanState::Terminated(self.finish_at_peak(TerminationCause::SeriesEnd));
        };
        self.cursor += 1;

        if bar.high > self.peak_price {
            self.peak_price = bar.high;
            self.peak_index = index;
            self.days_since_high = 0;
            self.drawdowns.on_new_peak();
        } else {
            self.days_since_high += 1;
        }

        let breach = self
            .drawdowns
            .on_bar(index, bar.low, self.peak_index, self.peak_price, config);

        if let Some(breach) = breach {
            return ScanState::Terminated(self.finish_at_trough(breach, config));
        }
        if self.days_since_high > config.max_days_without_high {
            return ScanState::Terminated(self.finish_at_peak(TerminationCause::NoNewHigh));
        }
        if index - self.start_index > config.max_total_days {
            return ScanState::Terminated(self.finish_at_peak(TerminationCause::MaxDuration));
        }
        ScanState::Active(self)
    }

    /// Staleness, age, and exhaustion all measure the move through its last
    /// confirmed peak.
    fn finish_at_peak(mut self, cause: TerminationCause) -> CompletedMove {
        self.drawdowns.close_remaining();
        CompletedMove {
            start_index: self.start_index,
            start_price: self.start_price,
            end_index: self.peak_index,
            end_price: self.peak_price,
            peak_index: self.peak_index,
            peak_price: self.peak_price,
            drawdowns: self.drawdowns.into_closed(),
            cause,
        }
    }

    /// A max-drawdown breach ends the move at the breach bar, which is the
    /// drawdown's trough by construction.
    fn finish_at_trough(mut self, breach: Breach, config: &ScreenConfig) -> CompletedMove {
        self.drawdowns.close_breach(
            breach,
            self.peak_index,
            self.peak_price,
            config.record_breach_drawdown,
        );
        CompletedMove {
            start_index: self.start_index,
            start_price: self.start_price,
            end_index: breach.trough_index,
            end_price: breach.trough_price,
            peak_index: self.peak_index,
            peak_price: self.peak_price,
            drawdowns: self.drawdowns.into_closed(),
            cause: TerminationCause::MaxDrawdown,
        }
    }
}

/// TERMINATED-state payload, still in bar-index terms.
#[derive(Debug)]
pub(crate) struct CompletedMove {
    pub start_index: usize,
    pub start_price: f64,
    pub end_index: usize,
    pub end_price: f64,
    pub peak_index: usize,
    pub peak_price: f64,
    pub drawdowns: Vec<ClosedDrawdown>,
    pub cause: TerminationCause,
}

impl CompletedMove {
    fn into_move(self, ticker: &str, series: &BarSeries) -> Move {
        let bars = series.bars();
        let total_gain_pct = percent_change(self.start_price, self.end_price);
        let duration_days = self.end_index - self.start_index;
        let drawdowns: Vec<Drawdown> = self
            .drawdowns
            .iter()
            .map(|d| Drawdown {
                start_date: bars[d.peak_index].date,
                start_price: d.peak_price,
                trough_date: bars[d.trough_index].date,
                trough_price: d.trough_price,
                pct_decline: d.pct_decline,
                resolved: true,
                continuation_confirmed: d.continuation,
            })
            .collect();
        let has_continuation = drawdowns.iter().any(|d| d.continuation_confirmed);
        Move {
            ticker: ticker.to_string(),
            start_date: bars[self.start_index].date,
            start_price: self.start_price,
            end_date: bars[self.end_index].date,
            end_price: self.end_price,
            peak_date: bars[self.peak_index].date,
            peak_price: self.peak_price,
            total_gain_pct,
            duration_days,
            classification: classify(duration_days, total_gain_pct),
            drawdowns,
            has_continuation,
            termination: self.cause,
        }
    }
}
