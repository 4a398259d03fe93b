//! One task end to end: load bars, build the indicator pair, simulate, report.
//!
//! Every failure becomes a `TaskResult`; `execute` never returns an error.

use std::time::Instant;

use thiserror::Error;
use tracing::debug;

use pairlab_core::data::{dataset_hash, DataError};
use pairlab_core::domain::{Bar, Task};
use pairlab_core::engine::{run_simulation, SimulationConfig, SimulationError};
use pairlab_core::registry::{FactoryError, IndicatorRegistry};
use pairlab_core::strategy::DualIndicatorStrategy;

use crate::data_loader::BarSource;
use crate::report::ReportSink;
use crate::result::{BacktestMetrics, SkipReason, TaskOutcome, TaskResult};

/// Runs a single task. Shared by reference across all workers.
pub trait TaskExecutor: Sync {
    fn execute(&self, task: &Task) -> TaskResult;
}

#[derive(Debug, Error)]
enum BacktestError {
    #[error(transparent)]
    Factory(#[from] FactoryError),
    #[error(transparent)]
    Simulation(#[from] SimulationError),
}

pub struct BacktestExecutor<'a> {
    registry: &'a IndicatorRegistry,
    source: &'a dyn BarSource,
    simulation: SimulationConfig,
    sink: Option<&'a dyn ReportSink>,
}

impl<'a> BacktestExecutor<'a> {
    pub fn new(
        registry: &'a IndicatorRegistry,
        source: &'a dyn BarSource,
        simulation: SimulationConfig,
    ) -> Self {
        Self {
            registry,
            source,
            simulation,
            sink: None,
        }
    }

    /// Write a report for every completed task.
    pub fn with_sink(mut self, sink: &'a dyn ReportSink) -> Self {
        self.sink = Some(sink);
        self
    }

    fn backtest(&self, task: &Task, bars: &[Bar]) -> Result<BacktestMetrics, BacktestError> {
        let a = self.registry.build_leg(&task.indicator_a, &task.params_a)?;
        let b = self.registry.build_leg(&task.indicator_b, &task.params_b)?;
        let mut strategy = DualIndicatorStrategy::new(a, b);
        let report = run_simulation(bars, &mut strategy, &self.simulation)?;
        Ok(BacktestMetrics::from_report(&report, dataset_hash(bars)))
    }
}

impl TaskExecutor for BacktestExecutor<'_> {
    fn execute(&self, task: &Task) -> TaskResult {
        let started = Instant::now();

        let outcome = match self.source.load(&task.instrument) {
            Err(DataError::Missing { .. }) => TaskOutcome::Skipped(SkipReason::Missing),
            Err(DataError::Empty { .. }) => TaskOutcome::Skipped(SkipReason::Empty),
            Err(e) => TaskOutcome::LoadFailed(e.to_string()),
            Ok(bars) => match self.backtest(task, &bars) {
                Ok(metrics) => TaskOutcome::Completed(metrics),
                Err(e) => TaskOutcome::BacktestFailed(e.to_string()),
            },
        };

        let mut result = TaskResult::new(task.clone(), outcome, started.elapsed());
        if let (Some(sink), TaskOutcome::Completed(_)) = (self.sink, &result.outcome) {
            match sink.write(&result) {
                Ok(path) => result.report = Some(path),
                Err(e) => result.outcome = TaskOutcome::BacktestFailed(e.to_string()),
            }
        }
        result.elapsed = started.elapsed();
        debug!(task = %task, status = %result.status(), elapsed_ms = result.elapsed.as_millis() as u64, "task finished");
        result
    }
}
