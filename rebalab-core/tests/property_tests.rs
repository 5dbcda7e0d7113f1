//! Property tests for return-pipeline invariants.
//!
//! Uses proptest to verify:
//! 1. Normalization: every applied row has gross exposure 0 or 1
//! 2. Compounding identity: cum[t] = (1 + cum[t-1])(1 + r[t]) - 1
//! 3. Cost monotonicity: a higher cost rate lowers returns wherever turnover > 0
//! 4. No NaN: gaps in prices never leak into outputs
//! 5. Idempotence: two runs of a pure strategy are bit-identical

use std::sync::Arc;

use chrono::NaiveDate;
use proptest::prelude::*;
use rebalab_core::calendar::DateSchedule;
use rebalab_core::data::PriceTable;
use rebalab_core::domain::WeightMatrix;
use rebalab_core::engine::{compute_returns, turnover, Backtester, RunParameters};
use rebalab_core::strategy::Momentum;

// ── Strategies (proptest) ────────────────────────────────────────────

fn dates(n: usize) -> Vec<NaiveDate> {
    let base = NaiveDate::from_ymd_opt(2022, 1, 3).unwrap();
    (0..n as i64).map(|i| base + chrono::Duration::days(i)).collect()
}

fn arb_price() -> impl Strategy<Value = f64> {
    (1.0..500.0_f64).prop_map(|p| (p * 100.0).round() / 100.0)
}

fn arb_weight() -> impl Strategy<Value = f64> {
    prop_oneof![
        2 => Just(0.0),
        5 => (-2.0..2.0_f64),
    ]
}

/// (prices, composition) with matching shape: 2..40 rows, 1..5 assets.
fn arb_inputs() -> impl Strategy<Value = (PriceTable, WeightMatrix)> {
    (2usize..40, 1usize..5).prop_flat_map(|(rows, assets)| {
        (
            prop::collection::vec(prop::collection::vec(arb_price(), rows), assets),
            prop::collection::vec(prop::collection::vec(arb_weight(), assets), rows),
        )
            .prop_map(move |(columns, weights)| {
                let names: Vec<String> = (0..assets).map(|a| format!("S{a}")).collect();
                let table = PriceTable::new(dates(rows), names.clone(), columns).unwrap();
                let composition = WeightMatrix {
                    dates: dates(rows),
                    assets: names,
                    rows: weights,
                };
                (table, composition)
            })
    })
}

/// Price table with roughly one in five cells missing.
fn arb_gappy_table() -> impl Strategy<Value = PriceTable> {
    (3usize..30, 1usize..4).prop_flat_map(|(rows, assets)| {
        prop::collection::vec(
            prop::collection::vec(prop::option::weighted(0.8, arb_price()), rows),
            assets,
        )
        .prop_map(move |columns| {
            let names = (0..assets).map(|a| format!("G{a}")).collect();
            let columns = columns
                .into_iter()
                .map(|c| c.into_iter().map(|p| p.unwrap_or(f64::NAN)).collect())
                .collect();
            PriceTable::new(dates(rows), names, columns).unwrap()
        })
    })
}

// ── 1. Normalization ─────────────────────────────────────────────────

proptest! {
    #[test]
    fn applied_rows_have_unit_or_zero_gross((prices, comp) in arb_inputs()) {
        let b = compute_returns(&prices, &comp, 0.0, 0.0, 1).unwrap();
        for t in 0..b.positions.n_rows() {
            let gross: f64 = b.positions.row(t).iter().map(|w| w.abs()).sum();
            prop_assert!(gross == 0.0 || (gross - 1.0).abs() < 1e-9, "row {} gross {}", t, gross);
        }
    }
}

// ── 2. Compounding identity ──────────────────────────────────────────

proptest! {
    #[test]
    fn cumulative_compounds_portfolio_returns(
        (prices, comp) in arb_inputs(),
        special_start in 0usize..3,
    ) {
        prop_assume!(special_start < prices.n_rows());
        let b = compute_returns(&prices, &comp, 0.001, 0.0005, special_start).unwrap();
        let r = &b.portfolio_returns.values;
        let cum = &b.cumulative_returns.values;
        prop_assert_eq!(r.len(), cum.len());
        for t in 1..cum.len() {
            let expected = (1.0 + cum[t - 1]) * (1.0 + r[t]) - 1.0;
            prop_assert!((cum[t] - expected).abs() < 1e-9 * (1.0 + expected.abs()));
        }
    }
}

// ── 3. Cost monotonicity ─────────────────────────────────────────────

proptest! {
    #[test]
    fn higher_cost_rate_lowers_returns_on_turnover(
        (prices, comp) in arb_inputs(),
        low in 0.0..0.01_f64,
        extra in 0.0001..0.01_f64,
    ) {
        let cheap = compute_returns(&prices, &comp, low, 0.0, 1).unwrap();
        let dear = compute_returns(&prices, &comp, low + extra, 0.0, 1).unwrap();
        let turns = turnover(&cheap.positions);
        for (t, turn) in turns.iter().enumerate() {
            let (c, d) = (cheap.portfolio_returns.values[t], dear.portfolio_returns.values[t]);
            if *turn > 1e-12 {
                prop_assert!(d < c, "row {}: {} !< {}", t, d, c);
            } else if *turn > 0.0 {
                // rounding residue from normalization
                prop_assert!(d <= c, "row {}: {} > {}", t, d, c);
            } else {
                prop_assert_eq!(d, c);
            }
        }
    }
}

// ── 4. No NaN ────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn gaps_never_produce_nan(prices in arb_gappy_table()) {
        let prices = Arc::new(prices);
        let schedule = DateSchedule::every_date(&prices);
        let params = RunParameters { special_start: 1, transaction_cost: 0.001, ..Default::default() };
        let bt = Backtester::with_schedule(prices, schedule, params).unwrap();
        let out = bt.run_detailed(&mut Momentum::new(2, true)).unwrap();

        prop_assert!(out.result.portfolio_returns.values.iter().all(|v| v.is_finite()));
        prop_assert!(out.result.cumulative_returns.values.iter().all(|v| v.is_finite()));
        for row in &out.breakdown.asset_contributions.rows {
            prop_assert!(row.iter().all(|v| v.is_finite()));
        }
    }
}

// ── 5. Idempotence ───────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn repeated_runs_are_bit_identical((prices, _comp) in arb_inputs()) {
        let prices = Arc::new(prices);
        let schedule = DateSchedule::every_date(&prices);
        let params = RunParameters { multi_assets: true, ..Default::default() };
        let bt = Backtester::with_schedule(prices, schedule, params).unwrap();

        let first = bt.run(&mut Momentum::new(3, true)).unwrap();
        let second = bt.run(&mut Momentum::new(3, true)).unwrap();
        prop_assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
        prop_assert_eq!(first, second);
    }
}
