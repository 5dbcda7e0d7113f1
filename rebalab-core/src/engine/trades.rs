//! Trade detection on the lagged, normalized position matrix.

use crate::data::PriceTable;
use crate::domain::{TradeStats, WeightMatrix};

/// Count trades and winning trades across all assets.
///
/// A trade happens whenever an asset's weight differs from the weight at the previous
/// trade. It wins when the outgoing position was long and the price rose since that
/// trade, or short and the price fell. Prices are looked up by the position row's
/// date and padded forward over gaps; the reference price starts at the first row of
/// `prices`.
pub fn evaluate_trades(positions: &WeightMatrix, prices: &PriceTable) -> TradeStats {
    if positions.is_empty() || prices.is_empty() {
        return TradeStats::default();
    }

    let mut stats = TradeStats::default();
    for (a, asset) in positions.assets.iter().enumerate() {
        let Some(column) = prices.column_by_name(asset) else {
            continue;
        };
        let padded = pad_forward(column);

        let mut last_position = positions.get(0, a);
        let mut last_trade_value = padded[0];
        for (t, date) in positions.dates.iter().enumerate() {
            let current = positions.get(t, a);
            if current == last_position {
                continue;
            }
            let Some(row) = prices.row_index(*date) else {
                continue;
            };
            let price = padded[row];
            stats.trade_count += 1;
            if (last_position > 0.0 && price > last_trade_value)
                || (last_position < 0.0 && price < last_trade_value)
            {
                stats.win_trade_count += 1;
            }
            last_trade_value = price;
            last_position = current;
        }
    }
    stats
}

/// Replace NaN prices with the last valid one. Leading gaps stay NaN.
pub(crate) fn pad_forward(column: &[f64]) -> Vec<f64> {
    let mut last = f64::NAN;
    column
        .iter()
        .map(|&p| {
            if !p.is_nan() {
                last = p;
            }
            last
        })
        .collect()
}
