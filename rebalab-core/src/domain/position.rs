use serde::{Deserialize, Serialize};

use crate::error::InputShapeError;

/// Exposure decided by a strategy. The sign gives the direction (long/short).
///
/// A `Scalar` broadcasts to every asset in aggregate mode and is the asset's own
/// weight in per-asset mode. `Weights` assigns one weight per asset column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Position {
    Scalar(f64),
    Weights(Vec<f64>),
}

impl Default for Position {
    fn default() -> Self {
        Position::Scalar(0.0)
    }
}

impl From<f64> for Position {
    fn from(weight: f64) -> Self {
        Position::Scalar(weight)
    }
}

impl From<Vec<f64>> for Position {
    fn from(weights: Vec<f64>) -> Self {
        Position::Weights(weights)
    }
}

impl Position {
    /// No exposure.
    pub fn flat() -> Self {
        Self::default()
    }

    /// Expand into exactly one weight per asset column.
    pub fn expand(&self, n_assets: usize) -> Result<Vec<f64>, InputShapeError> {
        match self {
            Position::Scalar(w) => Ok(vec![*w; n_assets]),
            Position::Weights(ws) if ws.len() == n_assets => Ok(ws.clone()),
            Position::Weights(ws) => Err(InputShapeError::PositionLength {
                expected: n_assets,
                actual: ws.len(),
            }),
        }
    }

    /// The single weight of a per-asset position. A one-element vector is accepted.
    pub fn as_scalar(&self) -> Result<f64, InputShapeError> {
        match self {
            Position::Scalar(w) => Ok(*w),
            Position::Weights(ws) if ws.len() == 1 => Ok(ws[0]),
            Position::Weights(ws) => Err(InputShapeError::NonScalarPosition(ws.len())),
        }
    }
}

/// How the composition builder consults the strategy.
///
/// - `Aggregate`: one decision from the full cross-asset history sets every column.
/// - `PerAsset`: each column is decided independently from its own history only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionMode {
    Aggregate,
    #[default]
    PerAsset,
}

impl PositionMode {
    pub fn from_multi_assets(multi_assets: bool) -> Self {
        if multi_assets {
            PositionMode::Aggregate
        } else {
            PositionMode::PerAsset
        }
    }
}
