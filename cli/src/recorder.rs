use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

const CSV_HEADER: &str =
    "Timestamp,Total_Time_Microseconds,Number_of_Symbols,Number_of_Orders,Time_per_Order_Microseconds,Description";

/// One row of a benchmark run, appended to a CSV file. Mirrors the
/// original benchmark driver's output contract: header written only if
/// the file doesn't exist yet, description field double-quote-wrapped.
pub struct BenchmarkResult {
    pub total_time_us: u128,
    pub number_of_symbols: usize,
    pub number_of_orders: usize,
    pub description: String,
}

impl BenchmarkResult {
    pub fn time_per_order_us(&self) -> f64 {
        if self.number_of_orders == 0 {
            0.0
        } else {
            self.total_time_us as f64 / self.number_of_orders as f64
        }
    }
}

pub struct PerformanceRecorder;

impl PerformanceRecorder {
    /// Appends one row to `path`, creating the file (with header) if it
    /// doesn't already exist.
    pub fn record_result(path: impl AsRef<Path>, result: &BenchmarkResult) -> Result<()> {
        let path = path.as_ref();
        let file_exists = path.exists();

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("opening benchmark output file {}", path.display()))?;

        if !file_exists {
            writeln!(file, "{CSV_HEADER}")?;
        }

        writeln!(
            file,
            "{},{},{},{},{:.3},\"{}\"",
            format_timestamp(),
            result.total_time_us,
            result.number_of_symbols,
            result.number_of_orders,
            result.time_per_order_us(),
            result.description.replace('"', "'"),
        )?;

        Ok(())
    }
}

fn format_timestamp() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}.{:03}", now.as_secs(), now.subsec_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_header_only_once() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("matchcore_recorder_test_{}.csv", std::process::id()));
        let _ = std::fs::remove_file(&path);

        let result = BenchmarkResult {
            total_time_us: 1_000,
            number_of_symbols: 2,
            number_of_orders: 100,
            description: "first run".to_string(),
        };
        PerformanceRecorder::record_result(&path, &result).unwrap();
        PerformanceRecorder::record_result(&path, &result).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let header_count = contents.matches("Timestamp,Total_Time_Microseconds").count();
        assert_eq!(header_count, 1);
        assert_eq!(contents.lines().count(), 3);

        let _ = std::fs::remove_file(&path);
    }
}
