/// Runtime tunables for `MatchingEngine`. Kept as a plain struct rather
/// than pulled from a config-file crate: every field here is either a
/// benchmark knob or a hard architectural constant with a sane default,
/// not something that needs layered sources (env/file/flags) to resolve.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Worker threads in the dispatch pool.
    pub num_threads: usize,
    /// Orders inserted before each `match_orders` call inside a worker's
    /// processing of one symbol's batch. Bounds queue depth and improves
    /// cache locality versus inserting the whole batch before matching.
    pub match_batch_size: usize,
    /// Ticks per minor currency unit. The core never sees decimal prices;
    /// this is documentation for collaborators (generators, CLIs) that
    /// convert a human price into ticks before submitting an order.
    pub tick_size: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            num_threads: default_num_threads(),
            match_batch_size: 100,
            tick_size: 100,
        }
    }
}

fn default_num_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(16)
}
