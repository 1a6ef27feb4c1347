use matchcore::prelude::{Command, Order, OrderType, Side};
use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};

/// Default price range collaborators use before converting to ticks,
/// matching the original benchmark driver's generator.
pub const DEFAULT_MIN_PRICE: i64 = 90;
pub const DEFAULT_MAX_PRICE: i64 = 110;
pub const DEFAULT_MIN_QUANTITY: u32 = 1;
pub const DEFAULT_MAX_QUANTITY: u32 = 100;

/// Produces randomized `NewOrder` commands for load-testing the engine.
/// Deliberately does not stamp a timestamp: the core's clock assigns
/// arrival order at ingest, not the generator.
pub struct RandomOrderGenerator {
    next_order_id: AtomicU64,
    min_price: i64,
    max_price: i64,
    min_quantity: u32,
    max_quantity: u32,
}

impl RandomOrderGenerator {
    pub fn new() -> Self {
        Self {
            next_order_id: AtomicU64::new(1),
            min_price: DEFAULT_MIN_PRICE,
            max_price: DEFAULT_MAX_PRICE,
            min_quantity: DEFAULT_MIN_QUANTITY,
            max_quantity: DEFAULT_MAX_QUANTITY,
        }
    }

    fn next_id(&self) -> u64 {
        self.next_order_id.fetch_add(1, Ordering::Relaxed)
    }

    pub fn random_order(&self, rng: &mut impl Rng, symbol: &str) -> Order {
        let side = if rng.random_bool(0.5) { Side::Buy } else { Side::Sell };
        let price = rng.random_range(self.min_price..=self.max_price);
        let quantity = rng.random_range(self.min_quantity..=self.max_quantity);
        Order::new(self.next_id(), symbol, side, OrderType::Limit, price, quantity, 0)
    }

    /// Generates `num_orders` commands round-robined across `symbols`.
    pub fn generate_batch(
        &self,
        rng: &mut impl Rng,
        symbols: &[String],
        num_orders: usize,
    ) -> Vec<Command> {
        (0..num_orders)
            .map(|i| {
                let symbol = &symbols[i % symbols.len()];
                Command::NewOrder(self.random_order(rng, symbol))
            })
            .collect()
    }
}

impl Default for RandomOrderGenerator {
    fn default() -> Self {
        Self::new()
    }
}
