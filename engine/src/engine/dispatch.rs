use crate::prelude::*;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

/// Engine-wide state: the symbol→book map, the worker pool, the shared
/// clock and the trade sink. Cheap to clone-share via `Arc` since the
/// map lock is only ever held for a lookup or an insert.
pub struct MatchingEngine {
    books: Mutex<HashMap<String, Arc<RwLock<OrderBook>>>>,
    pool: WorkerPool,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn TradeSink>,
    config: EngineConfig,
    shutdown: std::sync::atomic::AtomicBool,
}

impl MatchingEngine {
    pub fn new(config: EngineConfig, clock: Arc<dyn Clock>, sink: Arc<dyn TradeSink>) -> Self {
        let pool = WorkerPool::new(config.num_threads);
        Self {
            books: Mutex::new(HashMap::new()),
            pool,
            clock,
            sink,
            config,
            shutdown: std::sync::atomic::AtomicBool::new(false),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(
            EngineConfig::default(),
            Arc::new(SystemClock::new()),
            Arc::new(NullTradeSink),
        )
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Stops the engine from accepting further orders. Idempotent:
    /// calling it more than once is a no-op. In-flight batches already
    /// dispatched to the worker pool still run to completion; only new
    /// calls to `process_order`/`process_batch` are rejected.
    pub fn shutdown(&self) {
        if !self.shutdown.swap(true, std::sync::atomic::Ordering::SeqCst) {
            tracing::info!("engine shutting down");
        }
    }

    fn book_for(&self, symbol: &str) -> Arc<RwLock<OrderBook>> {
        let mut books = self.books.lock().expect("order book map poisoned");
        books
            .entry(symbol.to_string())
            .or_insert_with(|| Arc::new(RwLock::new(OrderBook::new(symbol))))
            .clone()
    }

    pub fn get_order_book(&self, symbol: &str) -> Option<Arc<RwLock<OrderBook>>> {
        self.books
            .lock()
            .expect("order book map poisoned")
            .get(symbol)
            .cloned()
    }

    fn process_one(&self, book: &Arc<RwLock<OrderBook>>, symbol: &str, mut order: Order) {
        order.timestamp = self.clock.now();
        let mut guard = book.write().expect("order book lock poisoned");
        match guard.add_order(order.clone()) {
            Ok(()) => {
                let trades = guard.match_orders();
                drop(guard);
                if !trades.is_empty() {
                    self.sink.on_trades(symbol, &trades);
                }
            }
            Err(err) => {
                drop(guard);
                self.sink.on_rejected(symbol, order.order_id, &err.to_string());
            }
        }
    }

    /// Single-order path: used by callers that don't batch.
    pub fn process_order(&self, order: Order) -> Result<(), EngineError> {
        if self.shutdown.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(EngineError::Shutdown);
        }
        let book = self.book_for(&order.symbol);
        let symbol = order.symbol.clone();
        self.process_one(&book, &symbol, order);
        Ok(())
    }

    /// Partitions `commands` by symbol and hands one job per symbol to
    /// the worker pool, chunking each symbol's orders so insert and
    /// match interleave rather than inserting the whole batch first.
    /// Blocks until every symbol's work has been applied.
    pub fn process_batch(&self, commands: Vec<Command>) -> Result<(), EngineError> {
        if self.shutdown.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(EngineError::Shutdown);
        }

        let num_orders = commands.len();
        let mut grouped: HashMap<String, Vec<Order>> = HashMap::new();
        for command in commands {
            match command {
                Command::NewOrder(order) => {
                    grouped.entry(order.symbol.clone()).or_default().push(order);
                }
            }
        }
        tracing::info!(num_orders, num_symbols = grouped.len(), "batch received");

        let chunk_size = self.config.match_batch_size.max(1);
        let jobs: Vec<Box<dyn FnOnce() + Send>> = grouped
            .into_iter()
            .map(|(symbol, orders)| {
                let book = self.book_for(&symbol);
                let clock = Arc::clone(&self.clock);
                let sink = Arc::clone(&self.sink);
                Box::new(move || {
                    for chunk in orders.chunks(chunk_size) {
                        let mut guard = book.write().expect("order book lock poisoned");
                        let mut stamped = Vec::with_capacity(chunk.len());
                        for mut order in chunk.iter().cloned() {
                            order.timestamp = clock.now();
                            stamped.push(order);
                        }
                        // The whole-chunk path is the common case: every order in
                        // it is valid, so one `add_orders_batch` call inserts them
                        // all before matching starts. If anything in the chunk is
                        // rejected (duplicate id, bad quantity, ...), fall back to
                        // inserting one at a time so a single bad order doesn't
                        // take its valid siblings down with it.
                        if guard.add_orders_batch(stamped.clone()).is_err() {
                            for order in stamped {
                                let order_id = order.order_id;
                                if let Err(err) = guard.add_order(order) {
                                    sink.on_rejected(&symbol, order_id, &err.to_string());
                                }
                            }
                        }
                        let trades = guard.match_orders();
                        drop(guard);
                        if !trades.is_empty() {
                            sink.on_trades(&symbol, &trades);
                        }
                    }
                }) as Box<dyn FnOnce() + Send>
            })
            .collect();

        self.pool.run_batch(jobs);
        Ok(())
    }

    pub fn cancel_order(&self, symbol: &str, order_id: OrderID) -> bool {
        let Some(book) = self.get_order_book(symbol) else {
            return false;
        };
        let mut guard = book.write().expect("order book lock poisoned");
        guard.cancel_order(order_id)
    }
}

impl Drop for MatchingEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}
