//! Processed bar store: one Parquet file per symbol.
//!
//! Layout: `{dir}/{SYMBOL}.parquet` with columns
//! `datetime` (ms precision), `open`, `high`, `low`, `close`, `volume`.
//! Writes are atomic: write to `.tmp` then rename into place.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::DateTime;
use polars::prelude::*;
use tracing::debug;

use super::DataError;
use crate::domain::Bar;

const COLUMNS: [&str; 6] = ["datetime", "open", "high", "low", "close", "volume"];

#[derive(Debug, Clone)]
pub struct ProcessedStore {
    dir: PathBuf,
}

impl ProcessedStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{symbol}.parquet"))
    }

    /// Symbols with a processed file, sorted. A missing directory lists nothing.
    pub fn list_symbols(&self) -> Result<Vec<String>, DataError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut symbols = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("parquet") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                symbols.push(stem.to_string());
            }
        }
        symbols.sort();
        Ok(symbols)
    }

    /// Write bars for a symbol, replacing any previous file.
    pub fn write(&self, symbol: &str, bars: &[Bar]) -> Result<PathBuf, DataError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(symbol);
        let tmp_path = path.with_extension("parquet.tmp");

        let mut df = bars_to_dataframe(bars)?;
        write_parquet(&mut df, &tmp_path)?;
        fs::rename(&tmp_path, &path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            DataError::Io(e)
        })?;
        debug!(symbol, rows = bars.len(), path = %path.display(), "wrote processed bars");
        Ok(path)
    }

    /// Load a symbol's bars in stored (time) order.
    pub fn load(&self, symbol: &str) -> Result<Vec<Bar>, DataError> {
        let path = self.path_for(symbol);
        if !path.exists() {
            return Err(DataError::Missing {
                symbol: symbol.to_string(),
            });
        }
        let file = fs::File::open(&path)?;
        let df = ParquetReader::new(file)
            .finish()
            .map_err(|e| DataError::Parquet(format!("read {}: {e}", path.display())))?;
        if df.height() == 0 {
            return Err(DataError::Empty {
                symbol: symbol.to_string(),
            });
        }
        dataframe_to_bars(&df)
    }
}

// ── Parquet I/O helpers ─────────────────────────────────────────────

fn bars_to_dataframe(bars: &[Bar]) -> Result<DataFrame, DataError> {
    let millis: Vec<i64> = bars
        .iter()
        .map(|b| b.timestamp.and_utc().timestamp_millis())
        .collect();
    let opens: Vec<f64> = bars.iter().map(|b| b.open).collect();
    let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let volumes: Vec<f64> = bars.iter().map(|b| b.volume).collect();

    DataFrame::new(vec![
        Column::new("datetime".into(), millis)
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
            .map_err(|e| DataError::Parquet(format!("datetime cast: {e}")))?,
        Column::new("open".into(), opens),
        Column::new("high".into(), highs),
        Column::new("low".into(), lows),
        Column::new("close".into(), closes),
        Column::new("volume".into(), volumes),
    ])
    .map_err(|e| DataError::Parquet(format!("dataframe creation: {e}")))
}

fn write_parquet(df: &mut DataFrame, path: &Path) -> Result<(), DataError> {
    let file = fs::File::create(path)?;
    ParquetWriter::new(file)
        .finish(df)
        .map_err(|e| DataError::Parquet(format!("write parquet: {e}")))?;
    Ok(())
}

fn f64_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Float64Chunked, DataError> {
    df.column(name)
        .map_err(|e| DataError::Validation(format!("missing column '{name}': {e}")))?
        .f64()
        .map_err(|e| DataError::Validation(format!("{name} column type: {e}")))
}

fn dataframe_to_bars(df: &DataFrame) -> Result<Vec<Bar>, DataError> {
    for name in COLUMNS {
        if df.column(name).is_err() {
            return Err(DataError::Validation(format!("missing column '{name}'")));
        }
    }

    let millis = df
        .column("datetime")
        .and_then(|c| c.cast(&DataType::Int64))
        .map_err(|e| DataError::Validation(format!("datetime column: {e}")))?;
    let millis = millis
        .i64()
        .map_err(|e| DataError::Validation(format!("datetime column type: {e}")))?;
    let opens = f64_column(df, "open")?;
    let highs = f64_column(df, "high")?;
    let lows = f64_column(df, "low")?;
    let closes = f64_column(df, "close")?;
    let volumes = f64_column(df, "volume")?;

    let n = df.height();
    let mut bars = Vec::with_capacity(n);
    for i in 0..n {
        let ms = millis
            .get(i)
            .ok_or_else(|| DataError::Validation(format!("null datetime at row {i}")))?;
        let timestamp = DateTime::from_timestamp_millis(ms)
            .ok_or_else(|| DataError::Validation(format!("datetime out of range at row {i}")))?
            .naive_utc();
        bars.push(Bar {
            timestamp,
            open: opens.get(i).unwrap_or(f64::NAN),
            high: highs.get(i).unwrap_or(f64::NAN),
            low: lows.get(i).unwrap_or(f64::NAN),
            close: closes.get(i).unwrap_or(f64::NAN),
            volume: volumes.get(i).unwrap_or(0.0),
        });
    }
    Ok(bars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_bars() -> Vec<Bar> {
        let day = |d| {
            NaiveDate::from_ymd_opt(2024, 1, d)
                .unwrap()
                .and_hms_opt(16, 0, 0)
                .unwrap()
        };
        vec![
            Bar {
                timestamp: day(2),
                open: 100.0,
                high: 102.0,
                low: 99.0,
                close: 101.0,
                volume: 1000.0,
            },
            Bar {
                timestamp: day(3),
                open: 101.0,
                high: 103.0,
                low: 100.0,
                close: 102.0,
                volume: 1100.5,
            },
        ]
    }

    #[test]
    fn write_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProcessedStore::new(dir.path());
        store.write("SPY", &sample_bars()).unwrap();
        assert_eq!(store.load("SPY").unwrap(), sample_bars());
        assert!(!store.path_for("SPY").with_extension("parquet.tmp").exists());
    }

    #[test]
    fn missing_symbol_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProcessedStore::new(dir.path());
        let err = store.load("NOPE").unwrap_err();
        assert!(matches!(err, DataError::Missing { ref symbol } if symbol == "NOPE"));
        assert!(err.is_skippable());
    }

    #[test]
    fn zero_rows_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProcessedStore::new(dir.path());
        store.write("EMPTY", &[]).unwrap();
        assert!(matches!(
            store.load("EMPTY"),
            Err(DataError::Empty { .. })
        ));
    }

    #[test]
    fn lists_parquet_stems_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProcessedStore::new(dir.path());
        store.write("MSFT", &sample_bars()).unwrap();
        store.write("AAPL", &sample_bars()).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignore me").unwrap();
        assert_eq!(store.list_symbols().unwrap(), vec!["AAPL", "MSFT"]);
    }

    #[test]
    fn missing_directory_lists_nothing() {
        let store = ProcessedStore::new("/definitely/not/a/real/dir");
        assert!(store.list_symbols().unwrap().is_empty());
    }
}
