use matchcore::prelude::*;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Add { id: u64, side: Side, price: i64, qty: u32, ts: u64 },
    Cancel { id: u64 },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0u64..64, any::<bool>(), 95i64..106, 1u32..20, 0u64..10_000).prop_map(
            |(id, is_buy, price, qty, ts)| Op::Add {
                id,
                side: if is_buy { Side::Buy } else { Side::Sell },
                price,
                qty,
                ts,
            }
        ),
        1 => (0u64..64).prop_map(|id| Op::Cancel { id }),
    ]
}

fn apply(book: &mut OrderBook, op: &Op) {
    match op {
        Op::Add { id, side, price, qty, ts } => {
            let order = Order::new(*id, "PROP", *side, OrderType::Limit, *price, *qty, *ts);
            let _ = book.add_order(order);
        }
        Op::Cancel { id } => {
            let _ = book.cancel_order(*id);
        }
    }
}

fn all_resting_quantity(book: &OrderBook) -> u32 {
    let mut total = 0u32;
    for price in 90i64..=110 {
        total += book.volume_at(Side::Buy, price);
        total += book.volume_at(Side::Sell, price);
    }
    total
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Invariant: a book that has just been matched to exhaustion is
    /// never crossed (best_bid < best_ask, or one side is empty).
    #[test]
    fn never_crossed_after_matching(ops in prop::collection::vec(op_strategy(), 0..200)) {
        let mut book = OrderBook::new("PROP");
        for op in &ops {
            apply(&mut book, op);
            book.match_orders();
            if let (Some(b), Some(a)) = (book.best_bid(), book.best_ask()) {
                prop_assert!(b < a);
            }
        }
    }

    /// Invariant: matching never creates quantity — resting volume can
    /// only shrink (or stay the same) across a match_orders call.
    #[test]
    fn matching_never_increases_resting_quantity(ops in prop::collection::vec(op_strategy(), 0..200)) {
        let mut book = OrderBook::new("PROP");
        for op in &ops {
            apply(&mut book, op);
            let before = all_resting_quantity(&book);
            book.match_orders();
            let after = all_resting_quantity(&book);
            prop_assert!(after <= before);
        }
    }

    /// Invariant: every trade prices at a level that actually rested in
    /// the book before matching started — never at a synthetic price.
    #[test]
    fn trades_price_at_a_resting_price(ops in prop::collection::vec(op_strategy(), 0..200)) {
        let mut book = OrderBook::new("PROP");
        for op in &ops {
            apply(&mut book, op);
        }
        let resting_prices: std::collections::HashSet<i64> = (90i64..=110)
            .filter(|p| book.volume_at(Side::Buy, *p) > 0 || book.volume_at(Side::Sell, *p) > 0)
            .collect();
        let trades = book.match_orders();
        for trade in &trades {
            prop_assert!(resting_prices.contains(&trade.price));
        }
    }

    /// Invariant: cancelling twice is idempotent — true then false.
    #[test]
    fn cancel_is_idempotent(id in 0u64..64, price in 95i64..106, qty in 1u32..20) {
        let mut book = OrderBook::new("PROP");
        let order = Order::new(id, "PROP", Side::Buy, OrderType::Limit, price, qty, 0);
        book.add_order(order).unwrap();
        let first = book.cancel_order(id);
        let second = book.cancel_order(id);
        prop_assert!(first);
        prop_assert!(!second);
    }
}
