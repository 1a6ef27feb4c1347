use clap::Parser;

/// Flags for a single benchmark run: build an engine, generate random
/// orders across a set of symbols, process them as one batch, record
/// the elapsed time, print the resulting book state.
#[derive(Parser, Debug)]
#[command(name = "matchcore-cli", about = "Trade matching engine benchmark driver")]
pub struct Cli {
    /// Worker threads in the engine's dispatch pool.
    #[arg(long, default_value_t = 4)]
    pub threads: usize,

    /// Total number of orders to generate and submit.
    #[arg(long, default_value_t = 10_000)]
    pub orders: usize,

    /// Number of distinct symbols the orders are spread across.
    #[arg(long, default_value_t = 4)]
    pub symbols: usize,

    /// Orders inserted per match pass within a symbol's batch.
    #[arg(long, default_value_t = 100)]
    pub match_batch_size: usize,

    /// CSV file the run's timing is appended to.
    #[arg(long, default_value = "benchmark_results.csv")]
    pub output: String,

    /// Symbol whose best bid/ask is printed after the run.
    #[arg(long, default_value = "SYM-0")]
    pub report_symbol: String,
}
