use matchcore::prelude::*;

/// Quickly build a limit order for benchmarking.
pub fn make_limit_order(id: u64, symbol: &str, side: Side, price: Price, qty: Quantity, ts: u64) -> Order {
    Order::new(id, symbol, side, OrderType::Limit, price, qty, ts)
}
