//! Tabular rendering of completed moves.
//!
//! The reporting collaborator (a spreadsheet writer, a terminal table)
//! consumes six-column rows: Ticker, Start Date, End Date, Superperformance,
//! Drawdowns, Continuation. The helpers here produce exactly those rows so
//! every consumer renders a move the same way.

use chrono::NaiveDate;

use crate::Move;

/// Column headers, in row order.
pub const HEADERS: [&str; 6] = [
    "Ticker",
    "Start Date",
    "End Date",
    "Superperformance",
    "Drawdowns",
    "Continuation",
];

/// Render a date the way the report expects: `Jun 27, 2016` (zero-padded
/// day).
pub fn format_date(date: NaiveDate) -> String {
    date.format("%b %d, %Y").to_string()
}

/// Render one move as a report row.
///
/// The Superperformance column answers "did this move classify at all":
/// `Yes` for Growth as well as Superperformance. The Drawdowns column lists
/// trough dates, or `none` when the move recorded no drawdown.
pub fn to_row(m: &Move) -> [String; 6] {
    let drawdowns = if m.drawdowns.is_empty() {
        "none".to_string()
    } else {
        m.drawdowns
            .iter()
            .map(|d| format_date(d.trough_date))
            .collect::<Vec<_>>()
            .join(", ")
    };
    [
        m.ticker.clone(),
        format_date(m.start_date),
        format_date(m.end_date),
        yes_no(m.is_classified()),
        drawdowns,
        yes_no(m.has_continuation),
    ]
}

/// Keep only the moves the report shows: Growth and Superperformance.
pub fn filter_classified(moves: &[Move]) -> Vec<&Move> {
    moves.iter().filter(|m| m.is_classified()).collect()
}

fn yes_no(value: bool) -> String {
    if value { "Yes" } else { "No" }.to_string()
}
