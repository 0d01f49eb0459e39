//! Integration tests for growth move detection.
//!
//! These walk small hand-built series through the public API and check the
//! emitted move records end to end: confirmation, drawdowns, continuation,
//! termination causes, classification, and report rows.

use chrono::{Days, NaiveDate};
use movescan::prelude::*;

fn day(i: usize) -> NaiveDate {
    NaiveDate::from_ymd_opt(2016, 1, 4).unwrap() + Days::new(i as u64)
}

fn bar(i: usize, open: f64, high: f64, low: f64, close: f64) -> Bar {
    Bar::new(day(i), open, high, low, close, 500_000.0)
}

fn scan(ticker: &str, bars: Vec<Bar>) -> Vec<Move> {
    let series = BarSeries::new(bars).unwrap();
    MoveEngine::with_defaults().scan(ticker, &series).unwrap()
}

/// A 20% pullback that later recovers past the old peak: one continuation
/// drawdown, move ends with the series.
fn continuation_bars() -> Vec<Bar> {
    vec![
        bar(0, 100.5, 101.0, 100.0, 100.5), // anchor, LOD 100
        bar(1, 101.0, 106.0, 100.8, 105.5), // 5.5% close confirms
        bar(2, 106.0, 110.0, 105.0, 109.0),
        bar(3, 109.0, 112.0, 108.0, 111.0),
        bar(4, 111.0, 115.0, 110.0, 114.0), // peak 115
        bar(5, 113.0, 114.0, 96.0, 98.0),   // -16.5% opens the drawdown
        bar(6, 95.0, 97.0, 92.0, 94.0),     // trough: exactly -20%
        bar(7, 95.0, 100.0, 94.0, 99.0),
        bar(8, 100.0, 110.0, 99.0, 108.0),
        bar(9, 110.0, 118.0, 109.0, 117.0), // new high resolves it
        bar(10, 117.0, 120.0, 116.0, 119.0),
    ]
}

// ============================================================
// CONFIRMATION
// ============================================================

#[test]
fn six_percent_rise_within_five_days_confirms_a_move() {
    // LOD 10.00 on day 0; close 10.60 on day 5.
    let moves = scan(
        "UP",
        vec![
            bar(0, 10.05, 10.10, 10.00, 10.05),
            bar(1, 10.10, 10.20, 10.05, 10.15),
            bar(2, 10.15, 10.25, 10.10, 10.20),
            bar(3, 10.20, 10.35, 10.15, 10.30),
            bar(4, 10.30, 10.45, 10.25, 10.40),
            bar(5, 10.45, 10.65, 10.40, 10.60),
        ],
    );

    assert_eq!(moves.len(), 1);
    let m = &moves[0];
    assert_eq!(m.start_date, day(0));
    assert_eq!(m.start_price, 10.0);
    assert_eq!(m.ticker, "UP");
}

#[test]
fn four_percent_rise_does_not_confirm() {
    // Same shape, but day 5 closes at 10.40: a 4% rise off the LOD.
    let moves = scan(
        "FLAT",
        vec![
            bar(0, 10.05, 10.10, 10.00, 10.05),
            bar(1, 10.10, 10.15, 10.05, 10.10),
            bar(2, 10.10, 10.20, 10.05, 10.15),
            bar(3, 10.15, 10.30, 10.10, 10.25),
            bar(4, 10.25, 10.38, 10.20, 10.35),
            bar(5, 10.35, 10.42, 10.30, 10.40),
        ],
    );

    assert!(moves.is_empty());
}

#[test]
fn high_basis_confirms_on_intraday_rallies() {
    // Closes never rise 5% off the LOD, but day 3's high does.
    let bars = vec![
        bar(0, 20.10, 20.20, 20.00, 20.10),
        bar(1, 20.15, 20.40, 20.10, 20.30),
        bar(2, 20.30, 20.60, 20.25, 20.50),
        bar(3, 20.50, 21.10, 20.45, 20.70),
        bar(4, 20.70, 20.90, 20.60, 20.80),
        bar(5, 20.75, 20.85, 20.65, 20.80),
    ];
    let series = BarSeries::new(bars).unwrap();

    let close_based = MoveEngine::with_defaults();
    assert!(close_based.scan("WICK", &series).unwrap().is_empty());

    let high_based = MoveEngine::new(ScreenConfig {
        confirm_basis: ConfirmBasis::High,
        ..ScreenConfig::default()
    })
    .unwrap();
    let moves = high_based.scan("WICK", &series).unwrap();
    assert_eq!(moves.len(), 1);
    assert_eq!(moves[0].start_price, 20.0);
}

// ============================================================
// DRAWDOWNS AND CONTINUATION
// ============================================================

#[test]
fn recovered_pullback_records_a_continuation_drawdown() {
    let moves = scan("CONT", continuation_bars());

    assert_eq!(moves.len(), 1);
    let m = &moves[0];
    assert_eq!(m.termination, TerminationCause::SeriesEnd);
    assert_eq!(m.end_date, day(10));
    assert_eq!(m.end_price, 120.0);
    assert!(m.has_continuation);

    assert_eq!(m.drawdowns.len(), 1);
    let dd = &m.drawdowns[0];
    assert_eq!(dd.start_date, day(4));
    assert_eq!(dd.start_price, 115.0);
    assert_eq!(dd.trough_date, day(6));
    assert_eq!(dd.trough_price, 92.0);
    assert!((dd.pct_decline - 20.0).abs() < 1e-9);
    assert!(dd.resolved);
    assert!(dd.continuation_confirmed);
}

#[test]
fn unrecovered_pullback_has_no_continuation() {
    // Drawdown opens, price drifts sideways below the peak until the move
    // goes stale.
    let mut bars = vec![
        bar(0, 100.5, 101.0, 100.0, 100.5),
        bar(1, 101.0, 108.0, 100.8, 107.0),
        bar(2, 107.0, 120.0, 106.0, 119.0), // peak 120
        bar(3, 110.0, 112.0, 100.0, 102.0), // -16.7% opens the drawdown
    ];
    for i in 4..=33 {
        bars.push(bar(i, 102.0, 104.0, 101.0, 103.0));
    }
    let moves = scan("STALL", bars);

    assert_eq!(moves.len(), 1);
    let m = &moves[0];
    assert_eq!(m.termination, TerminationCause::NoNewHigh);
    assert_eq!(m.end_date, day(2));
    assert_eq!(m.end_price, 120.0);
    assert!(!m.has_continuation);

    assert_eq!(m.drawdowns.len(), 1);
    let dd = &m.drawdowns[0];
    assert_eq!(dd.start_date, day(2));
    assert_eq!(dd.trough_date, day(3));
    assert_eq!(dd.trough_price, 100.0);
    assert!(dd.resolved);
    assert!(!dd.continuation_confirmed);
}

// ============================================================
// TERMINATION
// ============================================================

#[test]
fn thirty_five_percent_collapse_terminates_at_the_trough() {
    let moves = scan(
        "CRASH",
        vec![
            bar(0, 100.5, 101.0, 100.0, 100.5), // anchor, LOD 100
            bar(1, 101.0, 108.0, 100.5, 107.0), // 7% close confirms
            bar(2, 108.0, 115.0, 107.0, 114.0),
            bar(3, 114.0, 120.0, 113.0, 119.0),
            bar(4, 119.0, 121.0, 118.0, 120.0), // peak 121
            bar(5, 100.0, 105.0, 78.65, 80.0),  // exactly -35% from 121
        ],
    );

    assert_eq!(moves.len(), 1);
    let m = &moves[0];
    assert_eq!(m.termination, TerminationCause::MaxDrawdown);
    assert_eq!(m.end_date, day(5));
    assert_eq!(m.end_price, 78.65);
    assert_eq!(m.peak_date, day(4));
    assert_eq!(m.peak_price, 121.0);
    assert_eq!(m.duration_days, 5);
    assert!((m.total_gain_pct - (78.65 - 100.0)).abs() < 1e-9);
    assert_eq!(m.classification, Classification::None);
    // The breach is the termination cause, not a listed drawdown.
    assert!(m.drawdowns.is_empty());
    assert!(!m.has_continuation);
}

#[test]
fn breach_joins_the_drawdown_list_when_configured() {
    let bars = vec![
        bar(0, 100.5, 101.0, 100.0, 100.5),
        bar(1, 101.0, 108.0, 100.5, 107.0),
        bar(2, 108.0, 115.0, 107.0, 114.0),
        bar(3, 114.0, 120.0, 113.0, 119.0),
        bar(4, 119.0, 121.0, 118.0, 120.0),
        bar(5, 100.0, 105.0, 78.65, 80.0),
    ];
    let series = BarSeries::new(bars).unwrap();
    let engine = MoveEngine::new(ScreenConfig {
        record_breach_drawdown: true,
        ..ScreenConfig::default()
    })
    .unwrap();
    let moves = engine.scan("CRASH", &series).unwrap();

    assert_eq!(moves.len(), 1);
    let m = &moves[0];
    assert_eq!(m.termination, TerminationCause::MaxDrawdown);
    assert_eq!(m.drawdowns.len(), 1);
    let dd = &m.drawdowns[0];
    assert_eq!(dd.start_date, day(4));
    assert_eq!(dd.trough_date, day(5));
    assert!((dd.pct_decline - 35.0).abs() < 1e-9);
    assert!(!dd.continuation_confirmed);
    assert!(!m.has_continuation);
}

#[test]
fn stale_move_ends_at_its_last_peak() {
    let mut bars = vec![
        bar(0, 50.2, 50.5, 50.0, 50.3),
        bar(1, 50.5, 53.5, 50.4, 53.0), // 6% close confirms; peak 53.5
    ];
    // 31 bars without a new high, never 15% below the peak.
    for i in 2..=32 {
        bars.push(bar(i, 50.0, 51.0, 49.0, 50.5));
    }
    let moves = scan("IDLE", bars);

    assert_eq!(moves.len(), 1);
    let m = &moves[0];
    assert_eq!(m.termination, TerminationCause::NoNewHigh);
    assert_eq!(m.end_date, day(1));
    assert_eq!(m.end_price, 53.5);
    assert_eq!(m.duration_days, 1);
}

#[test]
fn age_cap_ends_a_still_rising_move() {
    let engine = MoveEngine::new(ScreenConfig {
        max_total_days: 25,
        ..ScreenConfig::default()
    })
    .unwrap();
    // Rises every single day; only the cap can stop it.
    let bars: Vec<Bar> = (0..40)
        .map(|i| {
            let base = 100.0 + 2.0 * i as f64;
            bar(i, base - 1.0, base + 1.0, base - 2.0, base)
        })
        .collect();
    let series = BarSeries::new(bars).unwrap();
    let moves = engine.scan("RAMP", &series).unwrap();

    assert!(!moves.is_empty());
    let m = &moves[0];
    assert_eq!(m.termination, TerminationCause::MaxDuration);
    assert_eq!(m.duration_days, 26);
    assert_eq!(m.end_date, day(26));
    assert_eq!(m.end_date, m.peak_date);
}

// ============================================================
// CLASSIFICATION
// ============================================================

#[test]
fn three_hundred_days_at_520_percent_is_superperformance() {
    let mut bars = vec![bar(0, 101.0, 102.0, 100.0, 101.0)];
    for i in 1..=300 {
        let high = 100.0 + 520.0 * i as f64 / 300.0;
        bars.push(bar(i, high - 0.6, high, high - 1.0, high - 0.3));
    }
    let moves = scan("SUPER", bars);

    assert_eq!(moves.len(), 1);
    let m = &moves[0];
    assert_eq!(m.termination, TerminationCause::SeriesEnd);
    assert_eq!(m.duration_days, 300);
    assert_eq!(m.end_price, 620.0);
    assert!((m.total_gain_pct - 520.0).abs() < 1e-6);
    assert_eq!(m.classification, Classification::Superperformance);
}

#[test]
fn short_moves_stay_unclassified_whatever_the_gain() {
    // 40 trading days, +150%: below the 64-day classification floor.
    let mut bars = vec![bar(0, 101.0, 102.0, 100.0, 101.0)];
    for i in 1..=40 {
        let high = 100.0 + 150.0 * i as f64 / 40.0;
        bars.push(bar(i, high - 0.6, high, high - 1.0, high - 0.3));
    }
    let moves = scan("SPIKE", bars);

    assert_eq!(moves.len(), 1);
    assert_eq!(moves[0].duration_days, 40);
    assert_eq!(moves[0].classification, Classification::None);
}

// ============================================================
// MULTIPLE MOVES
// ============================================================

#[test]
fn moves_on_one_series_never_overlap() {
    let bars = vec![
        // First move: confirmed off LOD 50, collapses on day 6.
        bar(0, 50.2, 50.5, 50.0, 50.3),
        bar(1, 50.5, 52.5, 50.4, 52.0),
        bar(2, 52.0, 54.5, 51.8, 54.0),
        bar(3, 54.0, 56.5, 53.8, 56.0),
        bar(4, 56.0, 58.5, 55.8, 58.0),
        bar(5, 58.0, 60.5, 57.8, 60.0), // peak 60.5
        bar(6, 45.0, 46.0, 41.0, 42.0), // -32% breach ends move 1
        // Second move: fresh anchor at 40 after the first terminates.
        bar(7, 40.5, 41.0, 40.0, 40.8),
        bar(8, 41.0, 42.0, 40.8, 41.5),
        bar(9, 41.5, 42.5, 41.2, 42.0),
        bar(10, 42.0, 43.5, 41.8, 43.0),
        bar(11, 43.0, 44.5, 42.8, 44.0),
        bar(12, 44.0, 45.5, 43.8, 45.0),
        bar(13, 45.0, 46.0, 44.8, 45.5),
        bar(14, 45.5, 46.5, 45.2, 46.0),
    ];
    let moves = scan("TWICE", bars);

    assert_eq!(moves.len(), 2);
    assert_eq!(moves[0].termination, TerminationCause::MaxDrawdown);
    assert_eq!(moves[0].start_date, day(0));
    assert_eq!(moves[0].end_date, day(6));
    assert_eq!(moves[1].termination, TerminationCause::SeriesEnd);
    assert_eq!(moves[1].start_date, day(7));
    assert_eq!(moves[1].start_price, 40.0);
    assert!(moves[0].end_date < moves[1].start_date);
}

#[test]
fn rescanning_the_same_series_is_deterministic() {
    let series = BarSeries::new(continuation_bars()).unwrap();
    let engine = MoveEngine::with_defaults();
    let first = engine.scan("CONT", &series).unwrap();
    let second = engine.scan("CONT", &series).unwrap();
    assert_eq!(first, second);
}

// ============================================================
// RECORDS AND REPORT ROWS
// ============================================================

#[test]
fn move_records_round_trip_through_serde() {
    let moves = scan("CONT", continuation_bars());
    let json = serde_json::to_string(&moves).unwrap();
    let back: Vec<Move> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, moves);

    let value = serde_json::to_value(&moves[0]).unwrap();
    assert_eq!(value["ticker"], "CONT");
    assert_eq!(value["start_date"], "2016-01-04");
    assert_eq!(value["classification"], "None");
    assert_eq!(value["termination"], "SeriesEnd");
    assert_eq!(value["has_continuation"], true);
    assert_eq!(value["drawdowns"][0]["continuation_confirmed"], true);
}

#[test]
fn report_row_renders_a_scanned_move() {
    let mut bars = vec![bar(0, 101.0, 102.0, 100.0, 101.0)];
    for i in 1..=300 {
        let high = 100.0 + 520.0 * i as f64 / 300.0;
        bars.push(bar(i, high - 0.6, high, high - 1.0, high - 0.3));
    }
    let moves = scan("SUPER", bars);
    let classified = filter_classified(&moves);
    assert_eq!(classified.len(), 1);

    let row = to_row(classified[0]);
    assert_eq!(row[0], "SUPER");
    assert_eq!(row[1], format_date(day(0)));
    assert_eq!(row[2], format_date(day(300)));
    assert_eq!(row[3], "Yes");
    assert_eq!(row[4], "none");
    assert_eq!(row[5], "No");
    assert_eq!(HEADERS[3], "Superperformance");
}

// ============================================================
// BATCH SCANNING
// ============================================================

#[test]
fn parallel_batch_isolates_per_ticker_results() {
    let rally = BarSeries::new(continuation_bars()).unwrap();
    let quiet = BarSeries::new(
        (0..20)
            .map(|i| bar(i, 30.0, 30.3, 29.7, 30.0))
            .collect::<Vec<_>>(),
    )
    .unwrap();

    let engine = MoveEngine::with_defaults();
    let (results, errors) = scan_parallel(&engine, vec![("RALLY", &rally), ("QUIET", &quiet)]);

    assert!(errors.is_empty());
    assert_eq!(results.len(), 2);
    let rally_moves = &results.iter().find(|r| r.ticker == "RALLY").unwrap().moves;
    let quiet_moves = &results.iter().find(|r| r.ticker == "QUIET").unwrap().moves;
    assert_eq!(rally_moves.len(), 1);
    assert!(quiet_moves.is_empty());
}
