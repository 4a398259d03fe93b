//! PairLab Runner: sweep orchestration on top of `pairlab-core`.
//!
//! This crate provides:
//! - TOML sweep configuration with the reference parameter grid
//! - Task planning over instruments × indicator pairs × parameter sets
//! - A bounded, private rayon worker pool with per-task failure isolation
//! - The task executor (load → build → simulate → report)
//! - HTML per-task reports and the CSV/JSON run summary

pub mod config;
pub mod data_loader;
pub mod executor;
pub mod report;
pub mod result;
pub mod scheduler;
pub mod tasks;

pub use config::{ConfigError, SweepConfig};
pub use data_loader::{BarSource, InMemorySource, ProcessedSource};
pub use executor::{BacktestExecutor, TaskExecutor};
pub use report::{write_summary, HtmlReportSink, ReportError, ReportSink};
pub use result::{BacktestMetrics, RunTally, SkipReason, TaskOutcome, TaskResult, TaskStatus};
pub use scheduler::{default_workers, Progress, Scheduler, SchedulerError};
pub use tasks::{build_tasks, indicator_pairs, PlanError};
