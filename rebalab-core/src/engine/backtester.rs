//! Backtester: validated inputs plus the run entry point.
//!
//! A `Backtester` owns the shared price table and the date schedule. Each call to
//! [`Backtester::run`] builds a fresh composition and derived series, so one instance
//! can serve many strategies, sequentially or from several threads.

use std::sync::Arc;

use tracing::info;

use crate::calendar::{Calendar, DateSchedule};
use crate::data::PriceTable;
use crate::domain::WeightMatrix;
use crate::error::{BacktestError, InputShapeError};
use crate::fingerprint::{dataset_hash, DatasetHash};
use crate::strategy::Strategy;

use super::composition::build_composition;
use super::params::RunParameters;
use super::result::{BacktestResult, RunWarning, SCHEMA_VERSION};
use super::returns::{compute_returns, ReturnBreakdown};

/// Composition matrix and every derived series of one run.
#[derive(Debug, Clone)]
pub struct DetailedRun {
    pub composition: WeightMatrix,
    pub breakdown: ReturnBreakdown,
    pub result: BacktestResult,
}

#[derive(Debug, Clone)]
pub struct Backtester {
    /// Prices restricted to the schedule's trading dates.
    prices: Arc<PriceTable>,
    schedule: DateSchedule,
    params: RunParameters,
    dataset_hash: DatasetHash,
}

impl Backtester {
    /// Validate inputs and derive the schedule from a weekday calendar spanning the table.
    pub fn new(prices: Arc<PriceTable>, params: RunParameters) -> Result<Self, BacktestError> {
        params.validate()?;
        prices.ensure_non_empty()?;
        let calendar = Calendar::for_table(params.rebalancing_frequency, &prices)
            .ok_or(InputShapeError::EmptyDates)?;
        let schedule = DateSchedule::from_calendar(&calendar, &prices);
        Self::with_schedule(prices, schedule, params)
    }

    /// Validate inputs against an explicit schedule.
    ///
    /// Table rows that are not trading dates are dropped before any strategy sees them.
    pub fn with_schedule(
        prices: Arc<PriceTable>,
        schedule: DateSchedule,
        params: RunParameters,
    ) -> Result<Self, BacktestError> {
        params.validate()?;
        prices.ensure_non_empty()?;
        let dataset_hash = dataset_hash(&prices);

        let trading = prices.select_dates(schedule.trading_dates());
        if trading.is_empty() {
            return Err(InputShapeError::NoTradingDates.into());
        }
        if params.special_start >= trading.n_rows() || params.warmup_rows() >= trading.n_rows() {
            return Err(InputShapeError::SpecialStartOutOfRange {
                special_start: params.special_start,
                trading_dates: trading.n_rows(),
            }
            .into());
        }
        let prices = if trading.n_rows() == prices.n_rows() {
            prices
        } else {
            Arc::new(trading)
        };

        Ok(Self {
            prices,
            schedule,
            params,
            dataset_hash,
        })
    }

    pub fn prices(&self) -> &PriceTable {
        &self.prices
    }

    pub fn schedule(&self) -> &DateSchedule {
        &self.schedule
    }

    pub fn params(&self) -> &RunParameters {
        &self.params
    }

    pub fn dataset_hash(&self) -> &DatasetHash {
        &self.dataset_hash
    }

    /// Run one strategy and return its result. Strategy errors propagate unmodified.
    pub fn run(&self, strategy: &mut dyn Strategy) -> Result<BacktestResult, BacktestError> {
        Ok(self.run_detailed(strategy)?.result)
    }

    /// Like [`run`](Self::run), also returning the composition and the full breakdown.
    pub fn run_detailed(&self, strategy: &mut dyn Strategy) -> Result<DetailedRun, BacktestError> {
        let p = &self.params;
        info!(
            strategy = strategy.name(),
            rows = self.prices.n_rows(),
            assets = self.prices.n_assets(),
            mode = ?p.mode(),
            frequency = %p.rebalancing_frequency,
            "backtest started"
        );

        let composition =
            build_composition(&self.prices, &self.schedule, strategy, p.special_start, p.mode())?;
        let breakdown = compute_returns(
            &self.prices,
            &composition,
            p.transaction_cost,
            p.slippage,
            p.special_start,
        )?;

        let mut warnings = Vec::new();
        if let Some(&first) = breakdown.degenerate_rows.first() {
            warnings.push(RunWarning::DegenerateRows {
                count: breakdown.degenerate_rows.len(),
                first,
            });
        }

        let result = BacktestResult {
            schema_version: SCHEMA_VERSION,
            strategy: strategy.name().to_string(),
            portfolio_returns: breakdown.portfolio_returns.clone(),
            cumulative_returns: breakdown.cumulative_returns.clone(),
            risk_free_rate: 0.0,
            trade_stats: breakdown.trade_stats,
            params: p.clone(),
            dataset_hash: self.dataset_hash.clone(),
            warnings,
        };

        info!(
            strategy = %result.strategy,
            total_return = result.total_return(),
            trades = result.trade_stats.trade_count,
            wins = result.trade_stats.win_trade_count,
            "backtest finished"
        );

        Ok(DetailedRun {
            composition,
            breakdown,
            result,
        })
    }
}
