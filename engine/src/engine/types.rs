use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Integer tick price. Never floating point: equality and ordering on ticks
/// are exact, which floating point prices are not when used as a map key.
pub type Price = i64;

/// Resting/requested quantity. Always non-zero while an order is live.
pub type Quantity = u32;

/// Globally unique within a run.
pub type OrderID = u64;

/// Monotonic timestamp used for arrival ordering; not wall-clock.
pub type Timestamp = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

/// Only `Limit` and `Market` participate in matching. `Stop`/`StopLimit`
/// are recognized but rejected by `OrderBook::add_order` — there is no
/// trigger engine behind them yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderType {
    Limit,
    Market,
    Stop,
    StopLimit,
}

/// A single, immutable order request. Once accepted, the book only ever
/// shrinks an order's `quantity`; it never mutates the other fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub order_id: OrderID,
    pub symbol: String,
    pub side: Side,
    pub order_type: OrderType,
    pub price: Price,
    pub quantity: Quantity,
    pub timestamp: Timestamp,
}

impl Order {
    pub fn new(
        order_id: OrderID,
        symbol: impl Into<String>,
        side: Side,
        order_type: OrderType,
        price: Price,
        quantity: Quantity,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            order_id,
            symbol: symbol.into(),
            side,
            order_type,
            price,
            quantity,
            timestamp,
        }
    }
}

/// Arrival-order comparison: earlier timestamp first, ties broken by the
/// smaller order id. Used only for debugging/ordering, never for the
/// book's internal FIFO (which is maintained structurally, not by sort).
impl PartialOrd for Order {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Order {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.timestamp
            .cmp(&other.timestamp)
            .then_with(|| self.order_id.cmp(&other.order_id))
    }
}

/// One fill. `price` is always the maker's resting price: the taker gets
/// whatever price improvement the cross offered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trade {
    pub maker_order_id: OrderID,
    pub taker_order_id: OrderID,
    pub symbol: String,
    pub price: Price,
    pub quantity: Quantity,
    pub timestamp: Timestamp,
}

/// A tagged union of actions the engine accepts. `NewOrder` is the only
/// variant today; adding `Cancel`/`Modify` later is a compile error at
/// every non-exhaustive match site until handled, by design.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    NewOrder(Order),
}

impl Command {
    pub fn symbol(&self) -> &str {
        match self {
            Command::NewOrder(order) => &order.symbol,
        }
    }
}
