//! Run summary export: one row per task, as CSV and JSON.
//!
//! Rows are sorted by task fingerprint so the same sweep always produces
//! byte-identical files regardless of completion order.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::result::{TaskResult, TaskStatus};

use super::{write_atomic, ReportError};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub fingerprint: String,
    pub instrument: String,
    pub indicator_a: String,
    pub params_a: String,
    pub indicator_b: String,
    pub params_b: String,
    pub status: TaskStatus,
    pub pnl: Option<f64>,
    pub final_value: Option<f64>,
    pub sharpe: Option<f64>,
    pub max_drawdown_pct: Option<f64>,
    pub trades: Option<usize>,
    pub won: Option<usize>,
    pub lost: Option<usize>,
    pub cause: Option<String>,
    pub report: Option<String>,
}

impl SummaryRow {
    pub fn from_result(result: &TaskResult) -> Self {
        let task = &result.task;
        let m = result.metrics();
        Self {
            fingerprint: task.fingerprint(),
            instrument: task.instrument.clone(),
            indicator_a: task.indicator_a.clone(),
            params_a: task.params_a.to_string(),
            indicator_b: task.indicator_b.clone(),
            params_b: task.params_b.to_string(),
            status: result.status(),
            pnl: m.map(|m| m.pnl),
            final_value: m.map(|m| m.final_value),
            sharpe: m.and_then(|m| m.sharpe),
            max_drawdown_pct: m.map(|m| m.max_drawdown_pct),
            trades: m.map(|m| m.trades.total),
            won: m.map(|m| m.trades.won),
            lost: m.map(|m| m.trades.lost),
            cause: result.cause().map(str::to_string),
            report: result.report.as_ref().map(|p| p.display().to_string()),
        }
    }
}

/// Rows for `results`, sorted by fingerprint.
pub fn summary_rows(results: &[TaskResult]) -> Vec<SummaryRow> {
    let mut rows: Vec<SummaryRow> = results.iter().map(SummaryRow::from_result).collect();
    rows.sort_by(|a, b| a.fingerprint.cmp(&b.fingerprint));
    rows
}

fn to_csv(rows: &[SummaryRow]) -> Result<Vec<u8>, ReportError> {
    let render = |e: csv::Error| ReportError::Render(format!("summary CSV: {e}"));
    let mut wtr = csv::Writer::from_writer(vec![]);
    for row in rows {
        wtr.serialize(row).map_err(render)?;
    }
    wtr.into_inner()
        .map_err(|e| ReportError::Render(format!("flush summary CSV: {e}")))
}

/// Write `summary.csv` and `summary.json` into `dir`.
pub fn write_summary(dir: &Path, results: &[TaskResult]) -> Result<(PathBuf, PathBuf), ReportError> {
    let rows = summary_rows(results);

    let csv_path = dir.join("summary.csv");
    write_atomic(&csv_path, &to_csv(&rows)?)?;

    let json_path = dir.join("summary.json");
    let json = serde_json::to_vec_pretty(&rows)
        .map_err(|e| ReportError::Render(format!("summary JSON: {e}")))?;
    write_atomic(&json_path, &json)?;

    Ok((csv_path, json_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::{BacktestMetrics, SkipReason, TaskOutcome};
    use pairlab_core::domain::{ParamValue, ParameterSet, Task};
    use pairlab_core::engine::TradeStats;
    use std::time::Duration;

    fn results() -> Vec<TaskResult> {
        let completed = TaskResult::new(
            Task::new(
                "ACME",
                "EMA",
                "RSI",
                ParameterSet::from_pairs([("period", ParamValue::Int(20))]),
                ParameterSet::new(),
            ),
            TaskOutcome::Completed(BacktestMetrics {
                final_value: 100_050.0,
                pnl: 50.0,
                sharpe: Some(0.8),
                max_drawdown_pct: 1.5,
                trades: TradeStats {
                    total: 2,
                    open: 0,
                    closed: 2,
                    won: 1,
                    lost: 1,
                },
                bars: 300,
                dataset_hash: "h".into(),
            }),
            Duration::from_millis(3),
        );
        let skipped = TaskResult::new(
            Task::new("GONE", "EMA", "RSI", ParameterSet::new(), ParameterSet::new()),
            TaskOutcome::Skipped(SkipReason::Missing),
            Duration::ZERO,
        );
        vec![completed, skipped]
    }

    #[test]
    fn rows_are_sorted_and_independent_of_input_order() {
        let forward = summary_rows(&results());
        let mut reversed_input = results();
        reversed_input.reverse();
        assert_eq!(forward, summary_rows(&reversed_input));
        assert!(forward[0].fingerprint <= forward[1].fingerprint);
    }

    #[test]
    fn writes_csv_and_json() {
        let dir = tempfile::tempdir().unwrap();
        let (csv_path, json_path) = write_summary(dir.path(), &results()).unwrap();

        let csv = std::fs::read_to_string(csv_path).unwrap();
        let mut lines = csv.lines();
        assert!(lines.next().unwrap().starts_with("fingerprint,instrument,indicator_a"));
        assert_eq!(csv.lines().count(), 3);
        assert!(csv.contains("period=20"));

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(json_path).unwrap()).unwrap();
        let rows = json.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        let skipped = rows.iter().find(|r| r["instrument"] == "GONE").unwrap();
        assert_eq!(skipped["status"], "Skipped");
        assert!(skipped["pnl"].is_null());
    }
}
