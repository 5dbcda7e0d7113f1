//! Integration tests for composition in both position modes.
//!
//! Tests:
//! 1. Per-asset mode decides every column from its own history
//! 2. Aggregate mode writes one cross-asset decision per row
//! 3. Positions carry between monthly rebalancing dates
//! 4. Factory-built strategies run through the whole pipeline

use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use rebalab_core::calendar::{Calendar, DateSchedule, Frequency};
use rebalab_core::data::{PriceHistory, PriceTable};
use rebalab_core::domain::{Position, PositionMode};
use rebalab_core::engine::{build_composition, Backtester, RunParameters};
use rebalab_core::error::StrategyError;
use rebalab_core::strategy::{create_strategy, Strategy, StrategyConfig, TopNMomentum};

// ── Helpers ──────────────────────────────────────────────────────────

/// Weekday prices from 2024-01-01: A rises, B falls, C is flat.
fn weekday_prices(n: usize) -> PriceTable {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let end = start + chrono::Duration::days(3 * n as i64);
    let dates: Vec<NaiveDate> = Calendar::new(Frequency::Daily, start, end)
        .unwrap()
        .all_dates()
        .iter()
        .copied()
        .take(n)
        .collect();
    let a = (0..n).map(|i| 100.0 + i as f64).collect();
    let b = (0..n).map(|i| 200.0 - i as f64).collect();
    let c = vec![50.0; n];
    PriceTable::new(dates, vec!["A".into(), "B".into(), "C".into()], vec![a, b, c]).unwrap()
}

/// Long the column whose latest price is highest; reports which columns it saw.
struct SeenColumns {
    seen: Vec<Vec<String>>,
}

impl Strategy for SeenColumns {
    fn name(&self) -> &str {
        "seen_columns"
    }

    fn get_position(
        &mut self,
        history: &PriceHistory<'_>,
        _previous: &Position,
    ) -> Result<Position, StrategyError> {
        self.seen.push(history.assets().to_vec());
        Ok(Position::Scalar(1.0))
    }
}

// ── 1. Per-asset ─────────────────────────────────────────────────────

#[test]
fn per_asset_mode_sees_one_column_at_a_time() {
    let prices = weekday_prices(10);
    let schedule = DateSchedule::every_date(&prices);
    let mut s = SeenColumns { seen: vec![] };
    build_composition(&prices, &schedule, &mut s, 2, PositionMode::PerAsset).unwrap();

    assert_eq!(s.seen.len(), 3 * 8);
    assert!(s.seen[..8].iter().all(|cols| cols == &["A".to_string()]));
    assert!(s.seen[8..16].iter().all(|cols| cols == &["B".to_string()]));
    assert!(s.seen[16..].iter().all(|cols| cols == &["C".to_string()]));
}

#[test]
fn momentum_per_asset_goes_long_and_short_independently() {
    let prices = Arc::new(weekday_prices(30));
    let params = RunParameters {
        special_start: 5,
        rebalancing_frequency: Frequency::Daily,
        ..Default::default()
    };
    let bt = Backtester::new(prices, params).unwrap();
    let config = StrategyConfig::new("momentum")
        .with_param("lookback", 5.0)
        .with_param("allow_short", 1.0);
    let mut strategy = create_strategy(&config).unwrap();
    let out = bt.run_detailed(strategy.as_mut()).unwrap();

    let last = out.composition.row(out.composition.n_rows() - 1);
    assert_eq!(last, &[1.0, -1.0, 0.0]);
    // Applied rows are normalized across assets
    let applied = out.breakdown.positions.row(out.breakdown.positions.n_rows() - 1);
    assert_eq!(applied, &[0.5, -0.5, 0.0]);
}

// ── 2. Aggregate ─────────────────────────────────────────────────────

#[test]
fn aggregate_mode_sees_every_column() {
    let prices = weekday_prices(6);
    let schedule = DateSchedule::every_date(&prices);
    let mut s = SeenColumns { seen: vec![] };
    let m = build_composition(&prices, &schedule, &mut s, 1, PositionMode::Aggregate).unwrap();

    assert_eq!(s.seen.len(), 5);
    assert!(s.seen.iter().all(|cols| cols.len() == 3));
    // Scalar broadcasts to every column
    assert_eq!(m.row(3), &[1.0, 1.0, 1.0]);
}

#[test]
fn top_n_picks_the_leader() {
    let prices = weekday_prices(20);
    let schedule = DateSchedule::every_date(&prices);
    let mut s = TopNMomentum::new(1, 5);
    let m = build_composition(&prices, &schedule, &mut s, 1, PositionMode::Aggregate).unwrap();

    // Flat while no lookback return exists, then all-in on A
    assert_eq!(m.row(3), &[0.0, 0.0, 0.0]);
    assert_eq!(m.row(19), &[1.0, 0.0, 0.0]);
}

// ── 3. Monthly carry ─────────────────────────────────────────────────

struct Counter(f64);

impl Strategy for Counter {
    fn name(&self) -> &str {
        "counter"
    }

    fn get_position(
        &mut self,
        _history: &PriceHistory<'_>,
        previous: &Position,
    ) -> Result<Position, StrategyError> {
        assert_eq!(previous, &Position::Scalar(self.0));
        self.0 += 1.0;
        Ok(Position::Scalar(self.0))
    }
}

#[test]
fn monthly_positions_hold_until_the_next_month() {
    let prices = Arc::new(weekday_prices(70));
    let params = RunParameters {
        multi_assets: true,
        ..Default::default()
    };
    let bt = Backtester::new(prices.clone(), params).unwrap();
    let out = bt.run_detailed(&mut Counter(0.0)).unwrap();

    // January's first weekday is row 0 and skipped by special_start = 1,
    // so the first decision happens on the first weekday of February.
    for (t, date) in out.composition.dates.iter().enumerate() {
        let expected = match date.month() {
            1 => 0.0,
            2 => 1.0,
            3 => 2.0,
            _ => 3.0,
        };
        assert_eq!(out.composition.get(t, 0), expected, "row {t} ({date})");
    }
}

// ── 4. Factory strategies ────────────────────────────────────────────

#[test]
fn every_builtin_strategy_runs_in_its_mode() {
    let prices = Arc::new(weekday_prices(60));
    for (name, multi_assets) in [
        ("constant", false),
        ("momentum", false),
        ("top_n_momentum", true),
        ("inverse_volatility", true),
    ] {
        let params = RunParameters {
            multi_assets,
            special_start: 25,
            rebalancing_frequency: Frequency::Weekly,
            ..Default::default()
        };
        let bt = Backtester::new(prices.clone(), params).unwrap();
        let mut s = create_strategy(&StrategyConfig::new(name)).unwrap();
        let r = bt.run(s.as_mut()).unwrap();
        assert_eq!(r.strategy, name);
        assert_eq!(r.portfolio_returns.len(), 60 - 26);
        assert!(r.cumulative_returns.values.iter().all(|v| v.is_finite()));
    }
}
