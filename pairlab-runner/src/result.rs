//! Per-task results and their one-line status form.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

use pairlab_core::domain::Task;
use pairlab_core::engine::{SimulationReport, TradeStats};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TaskStatus {
    Completed,
    Skipped,
    Errored,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskStatus::Completed => "completed",
            TaskStatus::Skipped => "skipped",
            TaskStatus::Errored => "errored",
        };
        f.write_str(s)
    }
}

/// Why a task had nothing to test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    Missing,
    Empty,
}

/// Performance of one completed task.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestMetrics {
    pub final_value: f64,
    pub pnl: f64,
    pub sharpe: Option<f64>,
    pub max_drawdown_pct: f64,
    pub trades: TradeStats,
    pub bars: usize,
    /// BLAKE3 of the bars the task ran on.
    pub dataset_hash: String,
}

impl BacktestMetrics {
    pub fn from_report(report: &SimulationReport, dataset_hash: String) -> Self {
        Self {
            final_value: report.final_value,
            pnl: report.pnl,
            sharpe: report.sharpe,
            max_drawdown_pct: report.max_drawdown_pct,
            trades: report.trades,
            bars: report.bars,
            dataset_hash,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutcome {
    Completed(BacktestMetrics),
    Skipped(SkipReason),
    /// Loading the instrument's bars failed for a reason other than absence.
    LoadFailed(String),
    /// Building the indicators, simulating, reporting or a panic.
    BacktestFailed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskResult {
    pub task: Task,
    pub outcome: TaskOutcome,
    pub report: Option<PathBuf>,
    pub elapsed: Duration,
}

impl TaskResult {
    pub fn new(task: Task, outcome: TaskOutcome, elapsed: Duration) -> Self {
        Self {
            task,
            outcome,
            report: None,
            elapsed,
        }
    }

    pub fn status(&self) -> TaskStatus {
        match self.outcome {
            TaskOutcome::Completed(_) => TaskStatus::Completed,
            TaskOutcome::Skipped(_) => TaskStatus::Skipped,
            TaskOutcome::LoadFailed(_) | TaskOutcome::BacktestFailed(_) => TaskStatus::Errored,
        }
    }

    pub fn metrics(&self) -> Option<&BacktestMetrics> {
        match &self.outcome {
            TaskOutcome::Completed(m) => Some(m),
            _ => None,
        }
    }

    /// Error text for errored tasks.
    pub fn cause(&self) -> Option<&str> {
        match &self.outcome {
            TaskOutcome::LoadFailed(c) | TaskOutcome::BacktestFailed(c) => Some(c),
            _ => None,
        }
    }
}

impl fmt::Display for TaskResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let t = &self.task;
        match &self.outcome {
            TaskOutcome::Completed(m) => write!(
                f,
                "Completed: {} {}/{} with PNL: {:.2}",
                t.instrument, t.indicator_a, t.indicator_b, m.pnl
            ),
            TaskOutcome::Skipped(SkipReason::Missing) => {
                write!(f, "SKIPPED: Data for {} not found.", t.instrument)
            }
            TaskOutcome::Skipped(SkipReason::Empty) => {
                write!(f, "SKIPPED: Data for {} is empty.", t.instrument)
            }
            TaskOutcome::LoadFailed(cause) => {
                write!(f, "ERROR loading data for {}: {cause}", t.instrument)
            }
            TaskOutcome::BacktestFailed(cause) => write!(
                f,
                "ERROR during backtest for {} with {}/{}: {cause}",
                t.instrument, t.indicator_a, t.indicator_b
            ),
        }
    }
}

/// Counts per status over a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunTally {
    pub completed: usize,
    pub skipped: usize,
    pub errored: usize,
}

impl RunTally {
    pub fn from_results(results: &[TaskResult]) -> Self {
        let mut tally = Self::default();
        for r in results {
            match r.status() {
                TaskStatus::Completed => tally.completed += 1,
                TaskStatus::Skipped => tally.skipped += 1,
                TaskStatus::Errored => tally.errored += 1,
            }
        }
        tally
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pairlab_core::domain::ParameterSet;

    fn task() -> Task {
        Task::new("ACME", "EMA", "RSI", ParameterSet::new(), ParameterSet::new())
    }

    fn metrics(pnl: f64) -> BacktestMetrics {
        BacktestMetrics {
            final_value: 100_000.0 + pnl,
            pnl,
            sharpe: None,
            max_drawdown_pct: 0.0,
            trades: TradeStats::default(),
            bars: 10,
            dataset_hash: String::new(),
        }
    }

    fn line(outcome: TaskOutcome) -> String {
        TaskResult::new(task(), outcome, Duration::ZERO).to_string()
    }

    #[test]
    fn status_lines() {
        assert_eq!(
            line(TaskOutcome::Completed(metrics(12.345))),
            "Completed: ACME EMA/RSI with PNL: 12.35"
        );
        assert_eq!(
            line(TaskOutcome::Skipped(SkipReason::Missing)),
            "SKIPPED: Data for ACME not found."
        );
        assert_eq!(
            line(TaskOutcome::Skipped(SkipReason::Empty)),
            "SKIPPED: Data for ACME is empty."
        );
        assert_eq!(
            line(TaskOutcome::LoadFailed("bad parquet".into())),
            "ERROR loading data for ACME: bad parquet"
        );
        assert_eq!(
            line(TaskOutcome::BacktestFailed("boom".into())),
            "ERROR during backtest for ACME with EMA/RSI: boom"
        );
    }

    #[test]
    fn status_and_tally() {
        let results = vec![
            TaskResult::new(task(), TaskOutcome::Completed(metrics(1.0)), Duration::ZERO),
            TaskResult::new(task(), TaskOutcome::Skipped(SkipReason::Empty), Duration::ZERO),
            TaskResult::new(task(), TaskOutcome::LoadFailed("x".into()), Duration::ZERO),
            TaskResult::new(task(), TaskOutcome::BacktestFailed("y".into()), Duration::ZERO),
        ];
        assert_eq!(results[2].status(), TaskStatus::Errored);
        assert_eq!(results[3].cause(), Some("y"));
        assert!(results[0].metrics().is_some());
        assert_eq!(
            RunTally::from_results(&results),
            RunTally {
                completed: 1,
                skipped: 1,
                errored: 2
            }
        );
    }
}
