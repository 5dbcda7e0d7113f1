//! Backtest runner. Wires data loading, the strategy factory and the engine.
//!
//! Entry points:
//! - `run_single_backtest()`: loads data, then runs the configured strategy. Used by CLI.
//! - `run_with_data()`: takes pre-loaded data. No I/O.
//! - `run_batch()`: runs many strategies over one shared table in parallel.
//! - `run_comparison()`: loads once, then `run_batch()` over every configured strategy.

use std::sync::Arc;

use rayon::prelude::*;
use thiserror::Error;
use tracing::{info, warn};

use rebalab_core::data::PriceTable;
use rebalab_core::engine::{BacktestResult, Backtester, RunParameters, RunWarning};
use rebalab_core::error::BacktestError;
use rebalab_core::strategy::{create_strategy, FactoryError, StrategyConfig};

use crate::config::{BacktestConfig, ConfigError};
use crate::data_loader::{load_prices, LoadError, LoadedData};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("strategy error: {0}")]
    Factory(#[from] FactoryError),
    #[error("backtest error: {0}")]
    Backtest(#[from] BacktestError),
}

/// One strategy's outcome in a batch. A failing strategy does not abort the others.
#[derive(Debug)]
pub struct BatchOutcome {
    pub strategy: StrategyConfig,
    pub result: Result<BacktestResult, RunError>,
}

/// Run a single backtest from a `BacktestConfig` (loads data first).
pub fn run_single_backtest(config: &BacktestConfig) -> Result<BacktestResult, RunError> {
    config.validate()?;
    let loaded = load_prices(&config.data)?;
    run_with_data(&loaded, &config.run, &config.strategy)
}

/// Run one strategy on pre-loaded data.
pub fn run_with_data(
    loaded: &LoadedData,
    params: &RunParameters,
    strategy: &StrategyConfig,
) -> Result<BacktestResult, RunError> {
    let backtester = Backtester::new(Arc::clone(&loaded.prices), params.clone())?;
    let mut result = run_on(&backtester, strategy)?;
    if loaded.has_synthetic {
        result.warnings.push(RunWarning::SyntheticData);
    }
    Ok(result)
}

/// Run several strategies over the same prices in parallel.
///
/// The backtester (prices and schedule) is built once and shared; each strategy gets
/// its own instance and its own derived series. Outcomes keep the input order.
pub fn run_batch(
    prices: Arc<PriceTable>,
    params: &RunParameters,
    strategies: &[StrategyConfig],
) -> Result<Vec<BatchOutcome>, RunError> {
    let backtester = Backtester::new(prices, params.clone())?;
    info!(strategies = strategies.len(), "batch started");

    let outcomes: Vec<BatchOutcome> = strategies
        .par_iter()
        .map(|config| BatchOutcome {
            strategy: config.clone(),
            result: run_on(&backtester, config),
        })
        .collect();

    for outcome in &outcomes {
        if let Err(e) = &outcome.result {
            warn!(strategy = %outcome.strategy.strategy_type, error = %e, "strategy failed");
        }
    }
    Ok(outcomes)
}

/// Load the config's data once and run the main strategy plus every `[[compare]]` entry.
pub fn run_comparison(config: &BacktestConfig) -> Result<Vec<BatchOutcome>, RunError> {
    config.validate()?;
    let loaded = load_prices(&config.data)?;
    let mut outcomes = run_batch(
        Arc::clone(&loaded.prices),
        &config.run,
        &config.all_strategies(),
    )?;
    if loaded.has_synthetic {
        for result in outcomes.iter_mut().filter_map(|o| o.result.as_mut().ok()) {
            result.warnings.push(RunWarning::SyntheticData);
        }
    }
    Ok(outcomes)
}

fn run_on(backtester: &Backtester, config: &StrategyConfig) -> Result<BacktestResult, RunError> {
    let mut strategy = create_strategy(config)?;
    Ok(backtester.run(strategy.as_mut())?)
}
