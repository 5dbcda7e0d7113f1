//! Naive risk parity: long every asset with weight proportional to 1/σ.

use crate::data::PriceHistory;
use crate::domain::Position;
use crate::error::StrategyError;

use super::{shaped, Strategy};

/// Inverse-volatility weighting over the last `lookback` period returns.
///
/// Assets with fewer than two returns or zero volatility get no weight. Weights sum
/// to one when at least one asset qualifies.
#[derive(Debug, Clone)]
pub struct InverseVolatility {
    pub lookback: usize,
}

impl InverseVolatility {
    pub fn new(lookback: usize) -> Self {
        assert!(lookback >= 2, "lookback must be >= 2");
        Self { lookback }
    }
}

fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Some(var.sqrt())
}

impl Strategy for InverseVolatility {
    fn name(&self) -> &str {
        "inverse_volatility"
    }

    fn get_position(
        &mut self,
        history: &PriceHistory<'_>,
        _previous: &Position,
    ) -> Result<Position, StrategyError> {
        let inverse: Vec<f64> = (0..history.n_assets())
            .map(|a| match sample_std(&history.recent_returns(a, self.lookback)) {
                Some(sd) if sd > 0.0 && sd.is_finite() => 1.0 / sd,
                _ => 0.0,
            })
            .collect();

        let total: f64 = inverse.iter().sum();
        if total == 0.0 {
            return Ok(shaped(history, vec![0.0; history.n_assets()]));
        }
        Ok(shaped(history, inverse.iter().map(|w| w / total).collect()))
    }
}
