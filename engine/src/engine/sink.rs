use crate::prelude::Trade;

/// Pluggable destination for matched trades. Contract: called at least
/// once per trade, in emission order per symbol. Implementations must
/// not block for long — they run on the worker thread that produced the
/// trades.
pub trait TradeSink: Send + Sync {
    fn on_trades(&self, symbol: &str, trades: &[Trade]);

    /// Called when `add_order` rejects a command. Default no-op so
    /// existing sinks don't have to implement it.
    fn on_rejected(&self, _symbol: &str, _order_id: u64, _reason: &str) {}
}

/// Discards everything. Useful as a default and in benchmarks where the
/// sink itself shouldn't be the bottleneck under measurement.
pub struct NullTradeSink;

impl TradeSink for NullTradeSink {
    fn on_trades(&self, _symbol: &str, _trades: &[Trade]) {}
}

/// Emits a `tracing` event per trade and per rejection. Demonstrates that
/// sinks compose: an engine can be given a `LoggingTradeSink`, a
/// `CollectingTradeSink`, or a tuple of both via `Vec<Box<dyn TradeSink>>`.
pub struct LoggingTradeSink;

impl TradeSink for LoggingTradeSink {
    fn on_trades(&self, symbol: &str, trades: &[Trade]) {
        for trade in trades {
            tracing::trace!(
                symbol,
                maker = trade.maker_order_id,
                taker = trade.taker_order_id,
                price = trade.price,
                quantity = trade.quantity,
                "trade"
            );
        }
    }

    fn on_rejected(&self, symbol: &str, order_id: u64, reason: &str) {
        tracing::warn!(symbol, order_id, reason, "order rejected");
    }
}

/// Accumulates every trade it sees, guarded by a mutex. Intended for
/// tests and small demos, not for hot-path production use. `Trade` now
/// carries its own symbol, so there's no need to bolt one on separately.
#[derive(Default)]
pub struct CollectingTradeSink {
    trades: std::sync::Mutex<Vec<Trade>>,
}

impl CollectingTradeSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&self) -> Vec<Trade> {
        std::mem::take(&mut *self.trades.lock().expect("collecting sink poisoned"))
    }
}

impl TradeSink for CollectingTradeSink {
    fn on_trades(&self, _symbol: &str, trades: &[Trade]) {
        let mut guard = self.trades.lock().expect("collecting sink poisoned");
        guard.extend(trades.iter().cloned());
    }
}
