//! Backtesting engine.
//!
//! One run flows through three stages:
//!
//! 1. Composition: ask the strategy for positions on rebalancing dates
//! 2. Returns: lag, normalize, apply costs, compound, trim the warm-up
//! 3. Trades: count position changes and classify them as wins or losses

pub mod backtester;
pub mod composition;
pub mod params;
pub mod result;
pub mod returns;
pub mod trades;

pub use backtester::{Backtester, DetailedRun};
pub use composition::build_composition;
pub use params::RunParameters;
pub use result::{BacktestResult, RunWarning, SCHEMA_VERSION};
pub use returns::{
    asset_returns, compute_returns, lag_positions, normalize_rows, turnover, ReturnBreakdown,
};
pub use trades::evaluate_trades;
