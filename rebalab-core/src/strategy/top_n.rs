//! Cross-sectional momentum: equal weight on the N assets with the best lookback return.

use crate::data::PriceHistory;
use crate::domain::Position;
use crate::error::StrategyError;

use super::{shaped, Strategy};

/// Top-N cross-sectional momentum (aggregate mode).
///
/// Assets without a valid lookback return are never selected. When no asset has one
/// yet, the previous position is kept. Ties keep column order.
#[derive(Debug, Clone)]
pub struct TopNMomentum {
    pub n: usize,
    pub lookback: usize,
}

impl TopNMomentum {
    pub fn new(n: usize, lookback: usize) -> Self {
        assert!(n >= 1, "n must be >= 1");
        assert!(lookback >= 1, "lookback must be >= 1");
        Self { n, lookback }
    }
}

impl Strategy for TopNMomentum {
    fn name(&self) -> &str {
        "top_n_momentum"
    }

    fn get_position(
        &mut self,
        history: &PriceHistory<'_>,
        previous: &Position,
    ) -> Result<Position, StrategyError> {
        let mut ranked: Vec<(usize, f64)> = (0..history.n_assets())
            .filter_map(|a| history.lookback_return(a, self.lookback).map(|r| (a, r)))
            .collect();
        if ranked.is_empty() {
            return Ok(previous.clone());
        }

        // Stable sort: equal returns keep column order
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        let selected = &ranked[..self.n.min(ranked.len())];
        let weight = 1.0 / selected.len() as f64;

        let mut weights = vec![0.0; history.n_assets()];
        for (asset, _) in selected {
            weights[*asset] = weight;
        }
        Ok(shaped(history, weights))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::PriceTable;
    use chrono::NaiveDate;

    fn table() -> PriceTable {
        let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        PriceTable::new(
            vec![base, base + chrono::Duration::days(1)],
            vec!["A".into(), "B".into(), "C".into()],
            vec![vec![100.0, 105.0], vec![100.0, 120.0], vec![100.0, 90.0]],
        )
        .unwrap()
    }

    #[test]
    fn picks_best_performers() {
        let t = table();
        let mut s = TopNMomentum::new(2, 1);
        let pos = s.get_position(&t.history(1), &Position::flat()).unwrap();
        assert_eq!(pos, Position::Weights(vec![0.5, 0.5, 0.0]));
    }

    #[test]
    fn keeps_previous_without_history() {
        let t = table();
        let mut s = TopNMomentum::new(1, 5);
        let prev = Position::Weights(vec![0.0, 1.0, 0.0]);
        assert_eq!(s.get_position(&t.history(1), &prev).unwrap(), prev);
    }

    #[test]
    fn n_larger_than_universe_spreads_evenly() {
        let t = table();
        let mut s = TopNMomentum::new(10, 1);
        let pos = s.get_position(&t.history(1), &Position::flat()).unwrap();
        let third = 1.0 / 3.0;
        assert_eq!(pos, Position::Weights(vec![third, third, third]));
    }
}
