//! Pullback bookkeeping inside an active move.

use log::trace;

use crate::config::ScreenConfig;

use super::percent_decline;

/// A decline that reached the termination bound. Reported to the move
/// tracker; whether it also lands in the drawdown list is a config choice.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Breach {
    pub trough_index: usize,
    pub trough_price: f64,
    pub pct_decline: f64,
}

/// A closed drawdown, still in bar-index terms. The tracker converts it to
/// the public date-based record at move finalization.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ClosedDrawdown {
    pub peak_index: usize,
    pub peak_price: f64,
    pub trough_index: usize,
    pub trough_price: f64,
    pub pct_decline: f64,
    pub continuation: bool,
}

#[derive(Debug, Clone, Copy)]
struct OpenDrawdown {
    peak_index: usize,
    peak_price: f64,
    trough_index: usize,
    trough_price: f64,
}

impl OpenDrawdown {
    fn close(self, continuation: bool) -> ClosedDrawdown {
        ClosedDrawdown {
            peak_index: self.peak_index,
            peak_price: self.peak_price,
            trough_index: self.trough_index,
            trough_price: self.trough_price,
            pct_decline: percent_decline(self.peak_price, self.trough_price),
            continuation,
        }
    }
}

/// At most one drawdown is open at a time per move; closed ones accumulate
/// in chronological order. The peak never changes while a drawdown is open
/// (a new peak closes it first), so an open drawdown's peak is always the
/// tracker's current peak.
#[derive(Debug, Default)]
pub(crate) struct DrawdownTracker {
    open: Option<OpenDrawdown>,
    closed: Vec<ClosedDrawdown>,
}

impl DrawdownTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// The peak advanced: an open drawdown resolves with continuation
    /// confirmed.
    pub fn on_new_peak(&mut self) {
        if let Some(open) = self.open.take() {
            trace!(
                "drawdown from bar {} resolved with continuation",
                open.peak_index
            );
            self.closed.push(open.close(true));
        }
    }

    /// Evaluate the bar's low against the current peak. Declines inside the
    /// `[min, max)` band open or deepen a drawdown; a decline at or past the
    /// max bound is returned as a breach instead of being recorded here.
    pub fn on_bar(
        &mut self,
        index: usize,
        low: f64,
        peak_index: usize,
        peak_price: f64,
        config: &ScreenConfig,
    ) -> Option<Breach> {
        let decline = percent_decline(peak_price, low);
        if decline >= config.max_drawdown_pct {
            return Some(Breach {
                trough_index: index,
                trough_price: low,
                pct_decline: decline,
            });
        }
        if decline >= config.min_drawdown_pct {
            match &mut self.open {
                None => {
                    trace!("drawdown opened at bar {index} ({decline:.1}% below peak)");
                    self.open = Some(OpenDrawdown {
                        peak_index,
                        peak_price,
                        trough_index: index,
                        trough_price: low,
                    });
                }
                Some(open) if low < open.trough_price => {
                    open.trough_index = index;
                    open.trough_price = low;
                }
                Some(_) => {}
            }
        }
        None
    }

    /// The move terminated without a breach: flush any open drawdown as
    /// resolved without continuation.
    pub fn close_remaining(&mut self) {
        if let Some(open) = self.open.take() {
            self.closed.push(open.close(false));
        }
    }

    /// The move terminated on a breach. The breach supersedes the open
    /// drawdown (its trough is the deepest by construction); it is recorded
    /// as a resolved non-continuation entry only when asked.
    pub fn close_breach(
        &mut self,
        breach: Breach,
        peak_index: usize,
        peak_price: f64,
        record: bool,
    ) {
        self.open = None;
        if record {
            self.closed.push(ClosedDrawdown {
                peak_index,
                peak_price,
                trough_index: breach.trough_index,
                trough_price: breach.trough_price,
                pct_decline: breach.pct_decline,
                continuation: false,
            });
        }
    }

    pub fn into_closed(self) -> Vec<ClosedDrawdown> {
        self.closed
    }
}
