use crate::prelude::*;
use std::collections::{BTreeMap, HashMap};

/// One resting order plus the doubly-linked position of it within its
/// price level. Indices are arena slots, not pointers: removing a node
/// elsewhere in the book never invalidates another node's index.
struct Node {
    order: Order,
    prev: Option<usize>,
    next: Option<usize>,
    generation: u32,
}

#[derive(Default)]
struct Level {
    head: Option<usize>,
    tail: Option<usize>,
}

impl Level {
    fn is_empty(&self) -> bool {
        self.head.is_none()
    }
}

/// A single symbol's limit order book: two price-keyed ladders plus an
/// id index for O(1) cancellation, backed by a slot arena so a level's
/// FIFO chain survives unrelated insertions and removals elsewhere in
/// the book (see the design note on generational indices).
pub struct OrderBook {
    symbol: String,
    arena: Vec<Node>,
    free: Vec<usize>,
    bids: BTreeMap<Price, Level>,
    asks: BTreeMap<Price, Level>,
    index: HashMap<OrderID, usize>,
}

impl OrderBook {
    pub fn new(symbol: impl Into<String>) -> Self {
        let symbol = symbol.into();
        tracing::debug!(symbol = %symbol, "order book created");
        Self {
            symbol,
            arena: Vec::new(),
            free: Vec::new(),
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            index: HashMap::new(),
        }
    }

    /// Checks invariants that must hold after any mutation: the id index
    /// tracks exactly the arena slots that are actually live. Aggressively
    /// checked in debug builds; in release builds the check still runs but
    /// only logs, since panicking in production on a matching engine is
    /// worse than a wrong order count.
    fn check_invariants(&self) -> Result<(), BookError> {
        let live = self.arena.len() - self.free.len();
        let ok = self.index.len() == live;
        debug_assert!(
            ok,
            "order count invariant violated: index={} live={}",
            self.index.len(),
            live
        );
        if !ok {
            tracing::error!(
                symbol = %self.symbol,
                index_len = self.index.len(),
                live_count = live,
                "book invariant violated: id index and arena disagree on live order count"
            );
            return Err(BookError::InternalInvariant(
                "id index and arena disagree on live order count",
            ));
        }
        Ok(())
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    fn validate(&self, order: &Order) -> Result<(), BookError> {
        if order.symbol != self.symbol {
            return Err(BookError::InvalidOrder("order symbol does not match book"));
        }
        if order.quantity == 0 {
            return Err(BookError::InvalidOrder("quantity must be non-zero"));
        }
        match order.order_type {
            OrderType::Limit | OrderType::Market => {}
            OrderType::Stop | OrderType::StopLimit => {
                return Err(BookError::InvalidOrder(
                    "stop and stop-limit orders are not supported",
                ));
            }
        }
        if self.index.contains_key(&order.order_id) {
            return Err(BookError::DuplicateOrderId(order.order_id));
        }
        Ok(())
    }

    fn ladder_mut(&mut self, side: Side) -> &mut BTreeMap<Price, Level> {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }

    fn alloc_slot(&mut self, order: Order) -> usize {
        if let Some(idx) = self.free.pop() {
            let generation = self.arena[idx].generation + 1;
            self.arena[idx] = Node {
                order,
                prev: None,
                next: None,
                generation,
            };
            idx
        } else {
            self.arena.push(Node {
                order,
                prev: None,
                next: None,
                generation: 0,
            });
            self.arena.len() - 1
        }
    }

    fn insert_resting(&mut self, order: Order) {
        let side = order.side;
        let price = order.price;
        let order_id = order.order_id;
        let idx = self.alloc_slot(order);
        let level = self.ladder_mut(side).entry(price).or_default();
        if let Some(tail) = level.tail {
            self.arena[tail].next = Some(idx);
            self.arena[idx].prev = Some(tail);
            level.tail = Some(idx);
        } else {
            level.head = Some(idx);
            level.tail = Some(idx);
        }
        self.index.insert(order_id, idx);
        tracing::debug!(order_id, symbol = %self.symbol, ?side, price, "order accepted");
    }

    /// Unlinks the node at `idx` from its level, erasing the level if it
    /// becomes empty, and frees the slot. Does not touch the id index.
    fn unlink(&mut self, idx: usize) {
        let side = self.arena[idx].order.side;
        let price = self.arena[idx].order.price;
        let prev = self.arena[idx].prev;
        let next = self.arena[idx].next;

        if let Some(p) = prev {
            self.arena[p].next = next;
        }
        if let Some(n) = next {
            self.arena[n].prev = prev;
        }

        let ladder = self.ladder_mut(side);
        if let Some(level) = ladder.get_mut(&price) {
            if level.head == Some(idx) {
                level.head = next;
            }
            if level.tail == Some(idx) {
                level.tail = prev;
            }
            if level.is_empty() {
                ladder.remove(&price);
            }
        }

        self.arena[idx].prev = None;
        self.arena[idx].next = None;
        self.free.push(idx);
    }

    pub fn add_order(&mut self, order: Order) -> Result<(), BookError> {
        self.validate(&order)?;
        self.insert_resting(order);
        self.check_invariants()
    }

    /// Validates every order before inserting any of them, so a failing
    /// order in the middle of a batch leaves the book untouched.
    pub fn add_orders_batch(&mut self, orders: Vec<Order>) -> Result<(), BookError> {
        let mut seen = std::collections::HashSet::new();
        for order in &orders {
            self.validate(order)?;
            if !seen.insert(order.order_id) {
                return Err(BookError::DuplicateOrderId(order.order_id));
            }
        }
        for order in orders {
            self.insert_resting(order);
        }
        self.check_invariants()
    }

    pub fn cancel_order(&mut self, order_id: OrderID) -> bool {
        match self.index.remove(&order_id) {
            Some(idx) => {
                self.unlink(idx);
                tracing::debug!(order_id, symbol = %self.symbol, "order cancelled");
                let _ = self.check_invariants();
                true
            }
            None => false,
        }
    }

    pub fn best_bid(&self) -> Option<Price> {
        self.bids.keys().next_back().copied()
    }

    pub fn best_ask(&self) -> Option<Price> {
        self.asks.keys().next().copied()
    }

    pub fn volume_at(&self, side: Side, price: Price) -> Quantity {
        let ladder = match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        };
        let Some(level) = ladder.get(&price) else {
            return 0;
        };
        let mut total: Quantity = 0;
        let mut cursor = level.head;
        while let Some(idx) = cursor {
            total += self.arena[idx].order.quantity;
            cursor = self.arena[idx].next;
        }
        total
    }

    fn best_bid_head(&self) -> Option<usize> {
        let price = self.best_bid()?;
        self.bids.get(&price)?.head
    }

    fn best_ask_head(&self) -> Option<usize> {
        let price = self.best_ask()?;
        self.asks.get(&price)?.head
    }

    /// Runs price-time priority matching to exhaustion, returning every
    /// trade produced in the order it occurred. See the algorithm
    /// description in the component design: repeatedly take the heads of
    /// the best bid and ask levels, the earlier-arrived of the two is the
    /// maker, trade at the maker's price, shrink both, repeat.
    pub fn match_orders(&mut self) -> Vec<Trade> {
        let mut trades = Vec::new();

        loop {
            let (Some(bid_price), Some(ask_price)) = (self.best_bid(), self.best_ask()) else {
                break;
            };
            if bid_price < ask_price {
                break;
            }

            let buy_idx = match self.best_bid_head() {
                Some(idx) => idx,
                None => break,
            };
            let sell_idx = match self.best_ask_head() {
                Some(idx) => idx,
                None => break,
            };

            let buy_order = self.arena[buy_idx].order.clone();
            let sell_order = self.arena[sell_idx].order.clone();

            let buy_is_maker = buy_order.cmp(&sell_order) == std::cmp::Ordering::Less;
            let (maker_id, taker_id, trade_price) = if buy_is_maker {
                (buy_order.order_id, sell_order.order_id, buy_order.price)
            } else {
                (sell_order.order_id, buy_order.order_id, sell_order.price)
            };

            let quantity = buy_order.quantity.min(sell_order.quantity);
            let timestamp = buy_order.timestamp.max(sell_order.timestamp);

            trades.push(Trade {
                maker_order_id: maker_id,
                taker_order_id: taker_id,
                symbol: self.symbol.clone(),
                price: trade_price,
                quantity,
                timestamp,
            });

            self.arena[buy_idx].order.quantity -= quantity;
            self.arena[sell_idx].order.quantity -= quantity;

            if self.arena[buy_idx].order.quantity == 0 {
                self.index.remove(&buy_order.order_id);
                self.unlink(buy_idx);
            }
            if self.arena[sell_idx].order.quantity == 0 {
                self.index.remove(&sell_order.order_id);
                self.unlink(sell_idx);
            }
        }

        trades
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limit(id: u64, side: Side, price: Price, qty: Quantity, ts: u64) -> Order {
        Order::new(id, "TEST", side, OrderType::Limit, price, qty, ts)
    }

    #[test]
    fn simple_cross_produces_one_trade() {
        let mut book = OrderBook::new("TEST");
        book.add_order(limit(1, Side::Buy, 100, 10, 1)).unwrap();
        book.add_order(limit(2, Side::Sell, 100, 5, 2)).unwrap();
        let trades = book.match_orders();
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].maker_order_id, 1);
        assert_eq!(trades[0].taker_order_id, 2);
        assert_eq!(trades[0].price, 100);
        assert_eq!(trades[0].quantity, 5);
        assert_eq!(book.volume_at(Side::Buy, 100), 5);
        assert_eq!(book.best_ask(), None);
    }

    #[test]
    fn sweeps_multiple_ask_levels() {
        let mut book = OrderBook::new("TEST");
        book.add_order(limit(1, Side::Sell, 101, 3, 1)).unwrap();
        book.add_order(limit(2, Side::Sell, 102, 3, 2)).unwrap();
        book.add_order(limit(3, Side::Sell, 103, 3, 3)).unwrap();
        book.add_order(limit(4, Side::Buy, 103, 7, 4)).unwrap();
        let trades = book.match_orders();
        assert_eq!(trades.len(), 3);
        assert_eq!(
            trades
                .iter()
                .map(|t| (t.maker_order_id, t.price, t.quantity))
                .collect::<Vec<_>>(),
            vec![(1, 101, 3), (2, 102, 3), (3, 103, 1)]
        );
        assert_eq!(book.volume_at(Side::Sell, 103), 2);
        assert_eq!(book.best_bid(), None);
    }

    #[test]
    fn fifo_at_same_price() {
        let mut book = OrderBook::new("TEST");
        book.add_order(limit(1, Side::Buy, 100, 5, 1)).unwrap();
        book.add_order(limit(2, Side::Buy, 100, 5, 2)).unwrap();
        book.add_order(limit(3, Side::Sell, 100, 5, 3)).unwrap();
        let trades = book.match_orders();
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].maker_order_id, 1);
        assert_eq!(book.volume_at(Side::Buy, 100), 5);
    }

    #[test]
    fn cancel_then_no_match() {
        let mut book = OrderBook::new("TEST");
        book.add_order(limit(1, Side::Buy, 100, 10, 1)).unwrap();
        assert!(book.cancel_order(1));
        book.add_order(limit(2, Side::Sell, 100, 10, 2)).unwrap();
        assert!(book.match_orders().is_empty());
        assert_eq!(book.volume_at(Side::Sell, 100), 10);
    }

    #[test]
    fn cancel_unknown_returns_false() {
        let mut book = OrderBook::new("TEST");
        assert!(!book.cancel_order(999));
    }

    #[test]
    fn cancel_is_idempotent() {
        let mut book = OrderBook::new("TEST");
        book.add_order(limit(1, Side::Buy, 100, 10, 1)).unwrap();
        assert!(book.cancel_order(1));
        assert!(!book.cancel_order(1));
    }

    #[test]
    fn duplicate_order_id_rejected() {
        let mut book = OrderBook::new("TEST");
        book.add_order(limit(1, Side::Buy, 100, 10, 1)).unwrap();
        let err = book.add_order(limit(1, Side::Buy, 101, 5, 2)).unwrap_err();
        assert_eq!(err, BookError::DuplicateOrderId(1));
    }

    #[test]
    fn stop_orders_are_rejected() {
        let mut book = OrderBook::new("TEST");
        let order = Order::new(1, "TEST", Side::Buy, OrderType::Stop, 100, 1, 1);
        assert!(book.add_order(order).is_err());
    }

    #[test]
    fn arena_slot_reuse_does_not_corrupt_other_levels() {
        let mut book = OrderBook::new("TEST");
        book.add_order(limit(1, Side::Buy, 100, 10, 1)).unwrap();
        book.add_order(limit(2, Side::Buy, 101, 10, 2)).unwrap();
        assert!(book.cancel_order(1));
        book.add_order(limit(3, Side::Buy, 102, 10, 3)).unwrap();
        assert_eq!(book.volume_at(Side::Buy, 101), 10);
        assert_eq!(book.volume_at(Side::Buy, 102), 10);
        assert_eq!(book.volume_at(Side::Buy, 100), 0);
    }
}
