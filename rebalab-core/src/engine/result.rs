//! Backtest result: the value handed back to callers and exported by the runner.

use serde::{Deserialize, Serialize};

use crate::domain::{DatedSeries, TradeStats};
use crate::fingerprint::DatasetHash;

use super::params::RunParameters;

/// Bumped whenever the serialized shape of [`BacktestResult`] changes.
pub const SCHEMA_VERSION: u32 = 1;

/// Non-fatal conditions observed during a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunWarning {
    /// Applied position rows with zero gross exposure after warm-up.
    DegenerateRows {
        count: usize,
        first: chrono::NaiveDate,
    },
    /// Prices came from the synthetic generator, not a real dataset.
    SyntheticData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    pub schema_version: u32,
    pub strategy: String,
    pub portfolio_returns: DatedSeries,
    pub cumulative_returns: DatedSeries,
    /// Always 0.0; kept for consumers computing excess returns.
    pub risk_free_rate: f64,
    pub trade_stats: TradeStats,
    pub params: RunParameters,
    pub dataset_hash: DatasetHash,
    #[serde(default)]
    pub warnings: Vec<RunWarning>,
}

impl BacktestResult {
    /// Final cumulative return, 0 for an empty series.
    pub fn total_return(&self) -> f64 {
        self.cumulative_returns.last().unwrap_or(0.0)
    }

    pub fn win_rate(&self) -> f64 {
        self.trade_stats.win_rate()
    }

    pub fn has_synthetic(&self) -> bool {
        self.warnings.contains(&RunWarning::SyntheticData)
    }
}
