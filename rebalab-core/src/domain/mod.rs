//! Domain types shared by the engine and the strategies.

pub mod matrix;
pub mod position;
pub mod trade;

pub use matrix::{DatedSeries, WeightMatrix};
pub use position::{Position, PositionMode};
pub use trade::TradeStats;
