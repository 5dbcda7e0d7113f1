//! Composition builder. Walks the trading timeline and asks the strategy for
//! positions on rebalancing dates.
//!
//! The running position is an explicit accumulator: each rebalancing step takes the
//! current position and returns the next one. Between rebalancing dates the last
//! decision is carried forward. Rows before `special_start` stay at zero.

use chrono::NaiveDate;
use tracing::debug;

use crate::calendar::DateSchedule;
use crate::data::{PriceHistory, PriceTable};
use crate::domain::{Position, PositionMode, WeightMatrix};
use crate::error::{BacktestError, InputShapeError};
use crate::strategy::Strategy;

/// Build the date × asset composition matrix.
///
/// The matrix index is the schedule's trading dates that exist in `prices`, the
/// columns are the table's assets. A table without rows or columns yields an empty
/// matrix of matching shape. Strategy failures propagate unmodified.
pub fn build_composition(
    prices: &PriceTable,
    schedule: &DateSchedule,
    strategy: &mut dyn Strategy,
    special_start: usize,
    mode: PositionMode,
) -> Result<WeightMatrix, BacktestError> {
    let timeline: Vec<(NaiveDate, usize)> = schedule
        .trading_dates()
        .iter()
        .filter_map(|d| prices.row_index(*d).map(|row| (*d, row)))
        .collect();

    let dates = timeline.iter().map(|(d, _)| *d).collect();
    let mut matrix = WeightMatrix::zeros(dates, prices.assets().to_vec());
    if matrix.is_empty() {
        return Ok(matrix);
    }

    let mut rebalances = 0usize;
    match mode {
        PositionMode::Aggregate => {
            let mut current = Position::flat();
            for (t, &(date, row)) in timeline.iter().enumerate().skip(special_start) {
                if schedule.is_rebalancing(date) {
                    current = rebalance(strategy, &prices.history(row), current)?;
                    rebalances += 1;
                }
                let weights = current.expand(prices.n_assets())?;
                ensure_finite(&weights, date)?;
                matrix.rows[t] = weights;
            }
        }
        PositionMode::PerAsset => {
            for asset in 0..prices.n_assets() {
                let mut current = Position::flat();
                for (t, &(date, row)) in timeline.iter().enumerate().skip(special_start) {
                    if schedule.is_rebalancing(date) {
                        let next =
                            rebalance(strategy, &prices.asset_history(row, asset), current)?;
                        current = Position::Scalar(next.as_scalar()?);
                        rebalances += 1;
                    }
                    let weight = current.as_scalar()?;
                    ensure_finite(&[weight], date)?;
                    matrix.set(t, asset, weight);
                }
            }
        }
    }

    debug!(
        strategy = strategy.name(),
        ?mode,
        rows = matrix.n_rows(),
        assets = matrix.n_assets(),
        rebalances,
        "composition built"
    );
    Ok(matrix)
}

/// One rebalancing step: previous position in, next position out.
fn rebalance(
    strategy: &mut dyn Strategy,
    history: &PriceHistory<'_>,
    current: Position,
) -> Result<Position, BacktestError> {
    strategy
        .get_position(history, &current)
        .map_err(BacktestError::Strategy)
}

fn ensure_finite(weights: &[f64], date: NaiveDate) -> Result<(), InputShapeError> {
    if weights.iter().all(|w| w.is_finite()) {
        Ok(())
    } else {
        Err(InputShapeError::NonFiniteWeight(date))
    }
}
