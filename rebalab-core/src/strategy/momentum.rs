//! Time-series momentum: positive lookback return goes long, negative goes short.
//!
//! Works column by column, so it fits per-asset mode naturally. In aggregate mode it
//! returns one weight per asset.

use crate::data::PriceHistory;
use crate::domain::Position;
use crate::error::StrategyError;

use super::{shaped, Strategy};

/// Time-series momentum.
///
/// Weight is `+1` when `p[t] / p[t - lookback] - 1 > 0` and `-1` when negative
/// (`0` when `allow_short` is false). Flat until `lookback` rows of history exist.
#[derive(Debug, Clone)]
pub struct Momentum {
    pub lookback: usize,
    pub allow_short: bool,
}

impl Momentum {
    pub fn new(lookback: usize, allow_short: bool) -> Self {
        assert!(lookback >= 1, "lookback must be >= 1");
        Self {
            lookback,
            allow_short,
        }
    }

    pub fn default_params() -> Self {
        Self::new(20, false)
    }

    fn weight(&self, momentum: Option<f64>) -> f64 {
        match momentum {
            Some(m) if m > 0.0 => 1.0,
            Some(m) if m < 0.0 && self.allow_short => -1.0,
            _ => 0.0,
        }
    }
}

impl Strategy for Momentum {
    fn name(&self) -> &str {
        "momentum"
    }

    fn get_position(
        &mut self,
        history: &PriceHistory<'_>,
        _previous: &Position,
    ) -> Result<Position, StrategyError> {
        let weights = (0..history.n_assets())
            .map(|a| self.weight(history.lookback_return(a, self.lookback)))
            .collect();
        Ok(shaped(history, weights))
    }
}
