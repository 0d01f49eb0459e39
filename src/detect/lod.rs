//! LOD anchor confirmation.

use crate::config::{ConfirmBasis, ScreenConfig};
use crate::BarSeries;

use super::percent_change;

/// A candidate move anchor: the bar whose low is under test.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LodCandidate {
    pub index: usize,
    pub low: f64,
}

/// Test `bars[index].low` as a Lowest-of-Day anchor.
///
/// The confirmation window is the `growth_move_days` bars after the anchor,
/// end day included, anchor day excluded. The window maximum (closes by
/// default, highs when configured) must sit at least `min_growth_pct` above
/// the anchor low.
///
/// Caller guarantees `index + growth_move_days < series.len()`.
pub(crate) fn confirm_at(
    series: &BarSeries,
    index: usize,
    config: &ScreenConfig,
) -> Option<LodCandidate> {
    let bars = series.bars();
    let low = bars[index].low;
    let window = &bars[index + 1..=index + config.growth_move_days];
    let best = window
        .iter()
        .map(|bar| match config.confirm_basis {
            ConfirmBasis::Close => bar.close,
            ConfirmBasis::High => bar.high,
        })
        .fold(f64::MIN, f64::max);
    (percent_change(low, best) >= config.min_growth_pct).then_some(LodCandidate { index, low })
}
