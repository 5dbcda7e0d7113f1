//! Strategy factory: turns a declarative `StrategyConfig` into a runtime strategy.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{ConstantPosition, InverseVolatility, Momentum, Strategy, TopNMomentum};

/// Strategy type name plus numeric parameters.
///
/// Uses `BTreeMap` for deterministic key ordering during serialization → hashing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    #[serde(rename = "type")]
    pub strategy_type: String,
    #[serde(default)]
    pub params: BTreeMap<String, f64>,
}

impl StrategyConfig {
    pub fn new(strategy_type: impl Into<String>) -> Self {
        Self {
            strategy_type: strategy_type.into(),
            params: BTreeMap::new(),
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: f64) -> Self {
        self.params.insert(name.into(), value);
        self
    }
}

/// Errors that can occur during strategy construction.
#[derive(Debug, thiserror::Error)]
pub enum FactoryError {
    #[error("Unknown strategy type: {0}")]
    UnknownStrategy(String),
    #[error("Invalid parameter '{param}' for {strategy}: {reason}")]
    InvalidParam {
        strategy: String,
        param: String,
        reason: String,
    },
}

// ─── Helpers ─────────────────────────────────────────────────────────

/// Extract a named f64 parameter, falling back to `default`.
fn param(config: &StrategyConfig, name: &str, default: f64) -> f64 {
    config.params.get(name).copied().unwrap_or(default)
}

/// Upper bound for window and count parameters.
const MAX_COUNT: usize = 1_000_000;

/// Extract a named whole-number parameter in `min..=MAX_COUNT`.
fn param_count(
    config: &StrategyConfig,
    name: &str,
    default: usize,
    min: usize,
) -> Result<usize, FactoryError> {
    let raw = param(config, name, default as f64);
    if !raw.is_finite() || raw.fract() != 0.0 || raw < min as f64 || raw > MAX_COUNT as f64 {
        return Err(FactoryError::InvalidParam {
            strategy: config.strategy_type.clone(),
            param: name.to_string(),
            reason: format!("expected an integer in {min}..={MAX_COUNT}, got {raw}"),
        });
    }
    Ok(raw as usize)
}

// ─── Strategy factory ────────────────────────────────────────────────

/// Create a strategy from a `StrategyConfig`.
pub fn create_strategy(config: &StrategyConfig) -> Result<Box<dyn Strategy>, FactoryError> {
    match config.strategy_type.as_str() {
        "constant" | "buy_and_hold" => {
            let weight = param(config, "weight", 1.0);
            if !weight.is_finite() {
                return Err(FactoryError::InvalidParam {
                    strategy: config.strategy_type.clone(),
                    param: "weight".into(),
                    reason: "must be finite".into(),
                });
            }
            Ok(Box::new(ConstantPosition::new(weight)))
        }
        "momentum" => {
            let lookback = param_count(config, "lookback", 20, 1)?;
            let allow_short = param(config, "allow_short", 0.0) != 0.0;
            Ok(Box::new(Momentum::new(lookback, allow_short)))
        }
        "top_n_momentum" => {
            let n = param_count(config, "n", 1, 1)?;
            let lookback = param_count(config, "lookback", 20, 1)?;
            Ok(Box::new(TopNMomentum::new(n, lookback)))
        }
        "inverse_volatility" => {
            let lookback = param_count(config, "lookback", 20, 2)?;
            Ok(Box::new(InverseVolatility::new(lookback)))
        }
        other => Err(FactoryError::UnknownStrategy(other.to_string())),
    }
}
