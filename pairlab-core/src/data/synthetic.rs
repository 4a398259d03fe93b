//! Deterministic sample data for trying the pipeline without real prices.
//!
//! A geometric random walk seeded from BLAKE3(symbol): the same symbol always
//! produces the same bars, different symbols produce different ones.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::DataError;
use crate::domain::Bar;

fn seed_for(symbol: &str) -> [u8; 32] {
    *blake3::hash(symbol.as_bytes()).as_bytes()
}

fn next_weekday(mut date: NaiveDate) -> NaiveDate {
    while matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
        date += Duration::days(1);
    }
    date
}

/// `n` daily bars on weekdays starting at (or after) `start`.
pub fn generate_sample_bars(symbol: &str, start: NaiveDate, n: usize) -> Vec<Bar> {
    let mut rng = StdRng::from_seed(seed_for(symbol));
    let mut bars = Vec::with_capacity(n);
    let mut date = next_weekday(start);
    let mut close: f64 = rng.gen_range(20.0..200.0);

    for _ in 0..n {
        let open = close * (1.0 + rng.gen_range(-0.005..0.005));
        close = (open * (1.0 + rng.gen_range(-0.02..0.021))).max(0.01);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
        let volume = rng.gen_range(100_000.0..5_000_000.0_f64).round();
        bars.push(Bar {
            timestamp: date.and_time(NaiveTime::MIN),
            open,
            high,
            low,
            close,
            volume,
        });
        date = next_weekday(date + Duration::days(1));
    }
    bars
}

/// Write sample bars as `{raw_dir}/{symbol}.csv` in the raw ingestion layout.
pub fn write_sample_csv(
    raw_dir: &Path,
    symbol: &str,
    start: NaiveDate,
    n: usize,
) -> Result<PathBuf, DataError> {
    fs::create_dir_all(raw_dir)?;
    let path = raw_dir.join(format!("{symbol}.csv"));
    let mut wtr = csv::Writer::from_path(&path)
        .map_err(|e| DataError::Validation(format!("create {}: {e}", path.display())))?;
    let csv_err = |e: csv::Error| DataError::Validation(format!("write sample csv: {e}"));
    wtr.write_record(["date", "open", "high", "low", "close", "volume"])
        .map_err(csv_err)?;
    for bar in generate_sample_bars(symbol, start, n) {
        wtr.write_record(&[
            bar.timestamp.date().format("%Y-%m-%d").to_string(),
            format!("{:.4}", bar.open),
            format!("{:.4}", bar.high),
            format!("{:.4}", bar.low),
            format!("{:.4}", bar.close),
            format!("{}", bar.volume),
        ])
        .map_err(csv_err)?;
    }
    wtr.flush()?;
    Ok(path)
}
