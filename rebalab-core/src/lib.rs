//! Rebalab Core: price data, calendars, strategies and the backtesting engine.
//!
//! This crate contains everything needed to evaluate a rebalancing strategy:
//! - The immutable price table and its CSV / Parquet readers
//! - Weekday calendars and rebalancing schedules
//! - The `Strategy` trait and a handful of built-in strategies
//! - The engine: composition, lagged returns with costs, trade statistics
//! - Dataset fingerprinting for reproducible results

pub mod calendar;
pub mod data;
pub mod domain;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod strategy;

pub use calendar::{Calendar, DateSchedule, Frequency};
pub use data::{load_price_table, DataError, PriceHistory, PriceTable};
pub use domain::{DatedSeries, Position, PositionMode, TradeStats, WeightMatrix};
pub use engine::{BacktestResult, Backtester, RunParameters, RunWarning};
pub use error::{BacktestError, InputShapeError, ParameterError, StrategyError};
pub use fingerprint::{dataset_hash, DatasetHash};
pub use strategy::{create_strategy, Strategy, StrategyConfig};
