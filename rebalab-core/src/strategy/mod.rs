//! Strategies decide positions on rebalancing dates.
//!
//! A strategy only ever sees a [`PriceHistory`] truncated at the decision date and
//! the position it returned last time. Whatever state it keeps between calls is its
//! own business; the engine never inspects it.

pub mod constant;
pub mod factory;
pub mod inverse_volatility;
pub mod momentum;
pub mod top_n;

pub use constant::ConstantPosition;
pub use factory::{create_strategy, FactoryError, StrategyConfig};
pub use inverse_volatility::InverseVolatility;
pub use momentum::Momentum;
pub use top_n::TopNMomentum;

use crate::data::PriceHistory;
use crate::domain::Position;
use crate::error::StrategyError;

/// Trait for position-deciding strategies.
///
/// # Architecture invariant
/// `get_position` receives prices up to and including the decision date only.
/// In per-asset mode the history holds a single column and `previous` is that
/// asset's last scalar weight.
pub trait Strategy: Send {
    /// Human-readable name (e.g., "top_n_momentum").
    fn name(&self) -> &str;

    /// Decide the position to hold from the next period on.
    fn get_position(
        &mut self,
        history: &PriceHistory<'_>,
        previous: &Position,
    ) -> Result<Position, StrategyError>;
}

impl<S: Strategy + ?Sized> Strategy for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn get_position(
        &mut self,
        history: &PriceHistory<'_>,
        previous: &Position,
    ) -> Result<Position, StrategyError> {
        (**self).get_position(history, previous)
    }
}

/// Collapse per-column weights into a position of the history's shape:
/// a scalar for a single-asset history, a weight vector otherwise.
pub(crate) fn shaped(history: &PriceHistory<'_>, weights: Vec<f64>) -> Position {
    if history.is_single_asset() {
        Position::Scalar(weights.first().copied().unwrap_or(0.0))
    } else {
        Position::Weights(weights)
    }
}
