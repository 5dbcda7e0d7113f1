//! Engine error types.
//!
//! Shape problems are detected before composition starts. Strategy failures are
//! surfaced unmodified; the engine never retries and never returns a partial result.

use chrono::NaiveDate;
use thiserror::Error;

/// Error returned by a [`Strategy`](crate::strategy::Strategy) implementation.
pub type StrategyError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The price table or a position does not have the shape the engine requires.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputShapeError {
    #[error("price table has no rows")]
    EmptyDates,

    #[error("price table has no asset columns")]
    EmptyAssets,

    #[error("dates must be strictly increasing: {previous} is followed by {current}")]
    NonMonotonicDates {
        previous: NaiveDate,
        current: NaiveDate,
    },

    #[error("duplicate asset column '{0}'")]
    DuplicateAsset(String),

    #[error("asset column at index {0} has an empty name")]
    EmptyAssetName(usize),

    #[error("{actual} price columns supplied for {expected} asset names")]
    ColumnCount { expected: usize, actual: usize },

    #[error("column '{asset}' has {actual} values, expected {expected}")]
    RaggedColumn {
        asset: String,
        expected: usize,
        actual: usize,
    },

    #[error("special_start {special_start} leaves no rows after warm-up ({trading_dates} trading dates)")]
    SpecialStartOutOfRange {
        special_start: usize,
        trading_dates: usize,
    },

    #[error("no price table date falls on the calendar")]
    NoTradingDates,

    #[error("position has {actual} weights but the table has {expected} assets")]
    PositionLength { expected: usize, actual: usize },

    #[error("per-asset mode requires a scalar position, got {0} weights")]
    NonScalarPosition(usize),

    #[error("strategy returned a non-finite weight on {0}")]
    NonFiniteWeight(NaiveDate),

    #[error("composition has {composition} dates but only {matched} exist in the price table")]
    DateMismatch { composition: usize, matched: usize },

    #[error("composition columns do not match the price table columns")]
    AssetMismatch,
}

/// Invalid run parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParameterError {
    #[error("{name} must be a finite, non-negative rate (got {value})")]
    InvalidRate { name: &'static str, value: f64 },

    #[error("calendar start {start} is after end {end}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },
}

/// Any failure of a single backtest run.
#[derive(Debug, Error)]
pub enum BacktestError {
    #[error("input shape error: {0}")]
    InputShape(#[from] InputShapeError),

    #[error("parameter error: {0}")]
    Parameter(#[from] ParameterError),

    #[error(transparent)]
    Strategy(StrategyError),
}

impl BacktestError {
    /// True when the failure originated inside the strategy.
    pub fn is_strategy_failure(&self) -> bool {
        matches!(self, Self::Strategy(_))
    }
}
