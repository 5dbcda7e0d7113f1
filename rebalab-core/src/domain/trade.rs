use serde::{Deserialize, Serialize};

/// Aggregate trade counts across all assets.
///
/// A trade is any change of an asset's applied weight. A win means the price moved in
/// the direction of the outgoing position between the previous trade and this one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeStats {
    pub trade_count: usize,
    pub win_trade_count: usize,
}

impl TradeStats {
    pub fn new(trade_count: usize, win_trade_count: usize) -> Self {
        Self {
            trade_count,
            win_trade_count,
        }
    }

    pub fn loss_trade_count(&self) -> usize {
        self.trade_count - self.win_trade_count
    }

    /// Fraction of winning trades, 0.0 when there were no trades.
    pub fn win_rate(&self) -> f64 {
        if self.trade_count == 0 {
            0.0
        } else {
            self.win_trade_count as f64 / self.trade_count as f64
        }
    }
}

impl std::ops::Add for TradeStats {
    type Output = TradeStats;

    fn add(self, rhs: TradeStats) -> TradeStats {
        TradeStats {
            trade_count: self.trade_count + rhs.trade_count,
            win_trade_count: self.win_trade_count + rhs.win_trade_count,
        }
    }
}

impl std::iter::Sum for TradeStats {
    fn sum<I: Iterator<Item = TradeStats>>(iter: I) -> Self {
        iter.fold(TradeStats::default(), |acc, s| acc + s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn win_rate_without_trades_is_zero() {
        assert_eq!(TradeStats::default().win_rate(), 0.0);
    }

    #[test]
    fn win_rate_and_losses() {
        let stats = TradeStats::new(4, 1);
        assert_eq!(stats.win_rate(), 0.25);
        assert_eq!(stats.loss_trade_count(), 3);
    }

    #[test]
    fn sums_across_assets() {
        let total: TradeStats = vec![TradeStats::new(2, 1), TradeStats::new(3, 2)]
            .into_iter()
            .sum();
        assert_eq!(total, TradeStats::new(5, 3));
    }
}
