mod config;
mod generator;
mod recorder;

use anyhow::Result;
use clap::Parser;
use config::Cli;
use generator::RandomOrderGenerator;
use matchcore::prelude::{EngineConfig, LoggingTradeSink, MatchingEngine, SystemClock};
use recorder::{BenchmarkResult, PerformanceRecorder};
use std::sync::Arc;
use std::time::Instant;

fn run(cli: Cli) -> Result<()> {
    let config = EngineConfig {
        num_threads: cli.threads,
        match_batch_size: cli.match_batch_size,
        ..EngineConfig::default()
    };
    let engine = MatchingEngine::new(config, Arc::new(SystemClock::new()), Arc::new(LoggingTradeSink));

    let symbols: Vec<String> = (0..cli.symbols).map(|i| format!("SYM-{i}")).collect();
    let generator = RandomOrderGenerator::new();
    let mut rng = rand::rng();
    let commands = generator.generate_batch(&mut rng, &symbols, cli.orders);

    tracing::info!(orders = cli.orders, symbols = cli.symbols, threads = cli.threads, "starting batch");
    let start = Instant::now();
    engine.process_batch(commands)?;
    let elapsed = start.elapsed();

    let result = BenchmarkResult {
        total_time_us: elapsed.as_micros(),
        number_of_symbols: cli.symbols,
        number_of_orders: cli.orders,
        description: format!("{} threads, batch size {}", cli.threads, cli.match_batch_size),
    };
    PerformanceRecorder::record_result(&cli.output, &result)?;

    match engine.get_order_book(&cli.report_symbol) {
        Some(book) => {
            let guard = book.read().expect("order book lock poisoned");
            println!(
                "{}: best_bid={:?} best_ask={:?}",
                cli.report_symbol,
                guard.best_bid(),
                guard.best_ask()
            );
        }
        None => println!("{}: no book created", cli.report_symbol),
    }

    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => std::process::exit(0),
        Err(err) => {
            eprintln!("matchcore-cli: {err:#}");
            std::process::exit(1);
        }
    }
}
