//! Raw CSV ingestion into the processed store.
//!
//! Normalization per file:
//! - header names are trimmed and lower-cased; `date` or `timestamp` is
//!   accepted in place of `datetime`;
//! - rows with a missing or unparseable required field are dropped;
//! - rows are sorted by datetime and duplicate timestamps collapse to the
//!   last occurrence.
//!
//! A file missing a required column is skipped; the other files continue.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use tracing::{info, warn};

use super::store::ProcessedStore;
use super::DataError;
use crate::domain::Bar;

const REQUIRED: [&str; 6] = ["datetime", "open", "high", "low", "close", "volume"];

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%Y%m%d"];

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error(transparent)]
    Store(#[from] DataError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Outcome of one ingestion pass.
#[derive(Debug, Clone, Default)]
pub struct IngestSummary {
    /// (symbol, rows written)
    pub written: Vec<(String, usize)>,
    /// (file, reason)
    pub skipped: Vec<(PathBuf, String)>,
}

/// Symbol for a raw file: the file name up to the first `.`.
pub fn symbol_for(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    let stem = name.split('.').next()?;
    (!stem.is_empty()).then(|| stem.to_string())
}

/// Parse a datetime in any of the accepted layouts.
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d.and_time(NaiveTime::MIN));
        }
    }
    None
}

/// Lower-case headers; `date`/`timestamp` become `datetime` unless the file
/// already has a `datetime` column.
fn canonical_headers(raw: &csv::StringRecord) -> Vec<String> {
    let lower: Vec<String> = raw.iter().map(|h| h.trim().to_lowercase()).collect();
    let has_datetime = lower.iter().any(|h| h == "datetime");
    lower
        .into_iter()
        .map(|h| match h.as_str() {
            "date" | "timestamp" if !has_datetime => "datetime".to_string(),
            _ => h,
        })
        .collect()
}

fn parse_row(record: &csv::StringRecord, idx: &[usize; 6]) -> Option<Bar> {
    let field = |i: usize| record.get(idx[i]).unwrap_or("");
    let number = |i: usize| field(i).parse::<f64>().ok().filter(|v| !v.is_nan());
    Some(Bar {
        timestamp: parse_datetime(field(0))?,
        open: number(1)?,
        high: number(2)?,
        low: number(3)?,
        close: number(4)?,
        volume: number(5)?,
    })
}

/// Parse and normalize one CSV document into ordered bars.
pub fn parse_csv<R: io::Read>(reader: R) -> Result<Vec<Bar>, IngestError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = canonical_headers(rdr.headers()?);
    let mut idx = [0usize; 6];
    for (slot, name) in idx.iter_mut().zip(REQUIRED) {
        *slot = headers
            .iter()
            .position(|h| h == name)
            .ok_or(IngestError::MissingColumn(name))?;
    }

    let mut bars = Vec::new();
    let mut dropped = 0usize;
    for record in rdr.records() {
        let record = match record {
            Ok(r) => r,
            Err(_) => {
                dropped += 1;
                continue;
            }
        };
        let parsed = parse_row(&record, &idx);
        match parsed {
            Some(bar) => bars.push(bar),
            None => dropped += 1,
        }
    }
    if dropped > 0 {
        warn!(dropped, "dropped rows with missing or unparseable fields");
    }

    bars.sort_by_key(|b| b.timestamp);
    let mut deduped: Vec<Bar> = Vec::with_capacity(bars.len());
    for bar in bars {
        match deduped.last_mut() {
            Some(last) if last.timestamp == bar.timestamp => *last = bar,
            _ => deduped.push(bar),
        }
    }
    Ok(deduped)
}

/// Parse one raw file.
pub fn ingest_file(path: &Path) -> Result<Vec<Bar>, IngestError> {
    let file = fs::File::open(path)?;
    parse_csv(io::BufReader::new(file))
}

/// Ingest every `*.csv` in `raw_dir` into `store`.
///
/// A missing raw directory is not an error: there is simply nothing to do.
pub fn ingest_dir(raw_dir: &Path, store: &ProcessedStore) -> Result<IngestSummary, IngestError> {
    let mut summary = IngestSummary::default();
    if !raw_dir.exists() {
        info!(dir = %raw_dir.display(), "raw data directory not found, nothing to ingest");
        return Ok(summary);
    }

    let mut files: Vec<PathBuf> = fs::read_dir(raw_dir)?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
        })
        .collect();
    files.sort();

    for path in files {
        let Some(symbol) = symbol_for(&path) else {
            summary
                .skipped
                .push((path, "cannot derive a symbol from the file name".into()));
            continue;
        };
        match ingest_file(&path).and_then(|bars| {
            store.write(&symbol, &bars)?;
            Ok(bars.len())
        }) {
            Ok(rows) => {
                info!(symbol, rows, "ingested");
                summary.written.push((symbol, rows));
            }
            Err(e) => {
                warn!(file = %path.display(), error = %e, "skipping raw file");
                summary.skipped.push((path, e.to_string()));
            }
        }
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_headers_sorts_and_drops_bad_rows() {
        let csv = "\
Date,Open,High,Low,Close,Volume
2024-01-03,101,103,100,102,1100
2024-01-02,100,102,99,101,1000
2024-01-04,,104,101,103,900
not-a-date,1,1,1,1,1
";
        let bars = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date(), NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(bars[1].close, 102.0);
    }

    #[test]
    fn duplicate_timestamps_keep_last() {
        let csv = "\
datetime,open,high,low,close,volume
2024-01-02 09:30:00,1,2,0.5,1.5,10
2024-01-02 09:30:00,1,2,0.5,1.8,20
";
        let bars = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].close, 1.8);
        assert_eq!(bars[0].volume, 20.0);
    }

    #[test]
    fn missing_column_is_reported() {
        let csv = "date,open,high,low,close\n2024-01-02,1,2,0.5,1.5\n";
        assert!(matches!(
            parse_csv(csv.as_bytes()),
            Err(IngestError::MissingColumn("volume"))
        ));
    }

    #[test]
    fn parses_common_datetime_layouts() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        for raw in ["2024-03-05", "03/05/2024", "2024-03-05 00:00:00", "2024-03-05T00:00:00"] {
            assert_eq!(parse_datetime(raw), Some(expected), "{raw}");
        }
        assert!(parse_datetime("2024-03-05T09:30:00+00:00").is_some());
        assert_eq!(parse_datetime("garbage"), None);
    }

    #[test]
    fn symbol_is_stem_up_to_first_dot() {
        assert_eq!(symbol_for(Path::new("raw/AAPL.daily.csv")), Some("AAPL".into()));
        assert_eq!(symbol_for(Path::new("raw/MSFT.csv")), Some("MSFT".into()));
    }

    #[test]
    fn ingest_dir_skips_bad_files_and_continues() {
        let raw = tempfile::tempdir().unwrap();
        let processed = tempfile::tempdir().unwrap();
        fs::write(
            raw.path().join("GOOD.csv"),
            "date,open,high,low,close,volume\n2024-01-02,1,2,0.5,1.5,10\n",
        )
        .unwrap();
        fs::write(raw.path().join("BAD.csv"), "date,close\n2024-01-02,1\n").unwrap();
        fs::write(raw.path().join("readme.md"), "not data").unwrap();

        let store = ProcessedStore::new(processed.path());
        let summary = ingest_dir(raw.path(), &store).unwrap();
        assert_eq!(summary.written, vec![("GOOD".to_string(), 1)]);
        assert_eq!(summary.skipped.len(), 1);
        assert_eq!(store.list_symbols().unwrap(), vec!["GOOD"]);
    }

    #[test]
    fn missing_raw_dir_is_a_no_op() {
        let processed = tempfile::tempdir().unwrap();
        let store = ProcessedStore::new(processed.path());
        let summary = ingest_dir(Path::new("/no/such/raw/dir"), &store).unwrap();
        assert!(summary.written.is_empty() && summary.skipped.is_empty());
    }
}
