use crate::data::PriceHistory;
use crate::domain::Position;
use crate::error::StrategyError;

use super::Strategy;

/// Always holds the same weight. Buy-and-hold when `weight > 0`.
#[derive(Debug, Clone)]
pub struct ConstantPosition {
    pub weight: f64,
}

impl ConstantPosition {
    pub fn new(weight: f64) -> Self {
        Self { weight }
    }
}

impl Strategy for ConstantPosition {
    fn name(&self) -> &str {
        "constant"
    }

    fn get_position(
        &mut self,
        _history: &PriceHistory<'_>,
        _previous: &Position,
    ) -> Result<Position, StrategyError> {
        Ok(Position::Scalar(self.weight))
    }
}
