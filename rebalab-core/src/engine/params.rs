//! Run parameters recognized by the backtester.

use serde::{Deserialize, Serialize};

use crate::calendar::Frequency;
use crate::domain::PositionMode;
use crate::error::ParameterError;

/// Parameters of a single run. Every field has a default, so a partial TOML table
/// deserializes cleanly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunParameters {
    /// Aggregate (cross-asset) composition when true, per-asset otherwise.
    pub multi_assets: bool,
    /// Index into the trading dates before which no position is computed.
    pub special_start: usize,
    /// Cost rate per unit of turnover.
    pub transaction_cost: f64,
    /// Slippage rate per unit of turnover.
    pub slippage: f64,
    pub rebalancing_frequency: Frequency,
}

impl Default for RunParameters {
    fn default() -> Self {
        Self {
            multi_assets: false,
            special_start: 1,
            transaction_cost: 0.0,
            slippage: 0.0,
            rebalancing_frequency: Frequency::Monthly,
        }
    }
}

impl RunParameters {
    pub fn mode(&self) -> PositionMode {
        PositionMode::from_multi_assets(self.multi_assets)
    }

    /// Rates must be finite and non-negative.
    pub fn validate(&self) -> Result<(), ParameterError> {
        for (name, value) in [
            ("transaction_cost", self.transaction_cost),
            ("slippage", self.slippage),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ParameterError::InvalidRate { name, value });
            }
        }
        Ok(())
    }

    /// Rows dropped from every output series.
    ///
    /// `special_start + 1` unless `special_start == 1`, in which case nothing is dropped.
    pub fn warmup_rows(&self) -> usize {
        warmup_rows(self.special_start)
    }
}

pub(crate) fn warmup_rows(special_start: usize) -> usize {
    // Fixed offset: published results depend on it, including the special_start == 1 case.
    if special_start != 1 {
        special_start.saturating_add(1)
    } else {
        0
    }
}
