//! Return computation: lag, normalize, cost, compound, trim.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::data::PriceTable;
use crate::domain::{DatedSeries, TradeStats, WeightMatrix};
use crate::error::InputShapeError;

use super::params::warmup_rows;
use super::trades::{evaluate_trades, pad_forward};

/// Everything the return pipeline derives from one composition matrix.
///
/// All series are aligned on the same (trimmed) dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnBreakdown {
    pub asset_contributions: WeightMatrix,
    pub portfolio_returns: DatedSeries,
    pub cumulative_asset_returns: WeightMatrix,
    pub cumulative_returns: DatedSeries,
    /// Lagged, row-normalized positions actually applied to returns.
    pub positions: WeightMatrix,
    pub transaction_costs: DatedSeries,
    pub slippage_costs: DatedSeries,
    pub trade_stats: TradeStats,
    /// Dates whose applied position row sums to zero after warm-up.
    pub degenerate_rows: Vec<NaiveDate>,
}

/// Simple returns per asset. Gaps are padded with the last valid price; the first row
/// and any row without a usable previous price are 0.
pub fn asset_returns(prices: &PriceTable) -> WeightMatrix {
    let mut out = WeightMatrix::zeros(prices.dates().to_vec(), prices.assets().to_vec());
    for a in 0..prices.n_assets() {
        let padded = pad_forward(prices.column(a));
        for t in 1..padded.len() {
            let (prev, cur) = (padded[t - 1], padded[t]);
            if prev.is_finite() && prev != 0.0 && cur.is_finite() {
                out.set(t, a, cur / prev - 1.0);
            }
        }
    }
    out
}

/// Shift every row down by one; the first row becomes flat.
pub fn lag_positions(composition: &WeightMatrix) -> WeightMatrix {
    let mut out = WeightMatrix::zeros(composition.dates.clone(), composition.assets.clone());
    for t in 1..composition.n_rows() {
        out.rows[t].copy_from_slice(composition.row(t - 1));
    }
    out
}

/// Scale each row so its absolute weights sum to one. All-zero rows are left as is.
pub fn normalize_rows(positions: &mut WeightMatrix) {
    for row in positions.rows.iter_mut() {
        let gross: f64 = row.iter().map(|w| w.abs()).sum();
        if gross != 0.0 {
            row.iter_mut().for_each(|w| *w /= gross);
        }
    }
}

/// Σ|Δw| per row, 0 on the first row.
pub fn turnover(positions: &WeightMatrix) -> Vec<f64> {
    (0..positions.n_rows())
        .map(|t| {
            if t == 0 {
                return 0.0;
            }
            positions
                .row(t)
                .iter()
                .zip(positions.row(t - 1))
                .map(|(cur, prev)| (cur - prev).abs())
                .sum()
        })
        .collect()
}

fn compound(returns: impl IntoIterator<Item = f64>) -> Vec<f64> {
    let mut growth = 1.0;
    returns
        .into_iter()
        .map(|r| {
            growth *= 1.0 + r;
            growth - 1.0
        })
        .collect()
}

/// Run the full return pipeline for one composition matrix.
///
/// `prices` may contain more dates than `composition`; it is restricted to the
/// composition's dates first. Every composition date must exist in `prices` and the
/// asset columns must match in order.
pub fn compute_returns(
    prices: &PriceTable,
    composition: &WeightMatrix,
    transaction_cost_rate: f64,
    slippage_rate: f64,
    special_start: usize,
) -> Result<ReturnBreakdown, InputShapeError> {
    if composition.assets.as_slice() != prices.assets() {
        return Err(InputShapeError::AssetMismatch);
    }
    let prices = prices.select_dates(&composition.dates);
    if prices.n_rows() != composition.n_rows() {
        return Err(InputShapeError::DateMismatch {
            composition: composition.n_rows(),
            matched: prices.n_rows(),
        });
    }

    let returns = asset_returns(&prices);
    let mut positions = lag_positions(composition);
    normalize_rows(&mut positions);

    let turnover = turnover(&positions);
    let transaction_costs: Vec<f64> = turnover.iter().map(|x| x * transaction_cost_rate).collect();
    let slippage_costs: Vec<f64> = turnover.iter().map(|x| x * slippage_rate).collect();

    let mut contributions = WeightMatrix::zeros(positions.dates.clone(), positions.assets.clone());
    let mut portfolio = Vec::with_capacity(positions.n_rows());
    for t in 0..positions.n_rows() {
        let mut gross = 0.0;
        for a in 0..positions.n_assets() {
            let c = positions.get(t, a) * returns.get(t, a);
            contributions.set(t, a, c);
            gross += c;
        }
        portfolio.push(gross - transaction_costs[t] - slippage_costs[t]);
    }

    let mut cumulative_assets =
        WeightMatrix::zeros(positions.dates.clone(), positions.assets.clone());
    for a in 0..contributions.n_assets() {
        for (t, v) in compound(contributions.column(a)).into_iter().enumerate() {
            cumulative_assets.set(t, a, v);
        }
    }
    let cumulative = compound(portfolio.iter().copied());

    let skip = warmup_rows(special_start);
    let dates = &positions.dates;
    let series = |values: Vec<f64>| DatedSeries::new(dates.clone(), values).skip_rows(skip);

    let trimmed_positions = positions.skip_rows(skip);
    let degenerate_rows: Vec<NaiveDate> = positions
        .rows
        .iter()
        .zip(dates)
        .enumerate()
        .skip(skip.max(special_start.saturating_add(1)))
        .filter(|(_, (row, _))| row.iter().all(|w| *w == 0.0))
        .map(|(_, (_, d))| *d)
        .collect();
    if !degenerate_rows.is_empty() {
        debug!(
            count = degenerate_rows.len(),
            first = %degenerate_rows[0],
            "positions with zero gross exposure"
        );
    }

    let trade_stats = evaluate_trades(&trimmed_positions, &prices);

    Ok(ReturnBreakdown {
        asset_contributions: contributions.skip_rows(skip),
        portfolio_returns: series(portfolio),
        cumulative_asset_returns: cumulative_assets.skip_rows(skip),
        cumulative_returns: series(cumulative),
        positions: trimmed_positions,
        transaction_costs: series(transaction_costs),
        slippage_costs: series(slippage_costs),
        trade_stats,
        degenerate_rows,
    })
}
