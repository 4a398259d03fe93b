//! Bounded worker pool for sweep tasks.
//!
//! Tasks run on a private rayon pool (never the global one), one task per
//! worker at a time. Results reach the caller's callback on the calling thread
//! in completion order. A panicking task becomes an errored result; nothing a
//! task does can abort the run.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;
use std::thread;
use std::time::Instant;

use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use thiserror::Error;
use tracing::{debug, info};

use pairlab_core::domain::Task;

use crate::executor::TaskExecutor;
use crate::result::{TaskOutcome, TaskResult};

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("failed to build worker pool: {0}")]
    Pool(#[from] ThreadPoolBuildError),
}

/// Completion counter handed to the progress callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

/// Available parallelism minus one, at least one.
pub fn default_workers() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .saturating_sub(1)
        .max(1)
}

pub struct Scheduler {
    pool: ThreadPool,
    workers: usize,
}

impl Scheduler {
    pub fn new(workers: usize) -> Result<Self, SchedulerError> {
        let workers = workers.max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("pairlab-worker-{i}"))
            .build()?;
        Ok(Self { pool, workers })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run every task and return the results in completion order.
    pub fn run<E, F>(&self, tasks: &[Task], executor: &E, mut on_complete: F) -> Vec<TaskResult>
    where
        E: TaskExecutor + ?Sized,
        F: FnMut(Progress, &TaskResult),
    {
        let total = tasks.len();
        let started = Instant::now();
        info!(tasks = total, workers = self.workers, "starting sweep");

        let (tx, rx) = mpsc::channel::<TaskResult>();
        let mut results = Vec::with_capacity(total);

        thread::scope(|scope| {
            scope.spawn(move || {
                self.pool.scope(|s| {
                    for task in tasks {
                        let tx = tx.clone();
                        s.spawn(move |_| {
                            // The receiver outlives every sender.
                            let _ = tx.send(run_isolated(executor, task));
                        });
                    }
                });
            });

            for result in rx.iter() {
                let progress = Progress {
                    completed: results.len() + 1,
                    total,
                };
                on_complete(progress, &result);
                results.push(result);
            }
        });

        info!(
            tasks = total,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "sweep finished"
        );
        results
    }
}

fn run_isolated<E: TaskExecutor + ?Sized>(executor: &E, task: &Task) -> TaskResult {
    let started = Instant::now();
    match panic::catch_unwind(AssertUnwindSafe(|| executor.execute(task))) {
        Ok(result) => result,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            debug!(task = %task, panic = %message, "task panicked");
            TaskResult::new(
                task.clone(),
                TaskOutcome::BacktestFailed(format!("panicked: {message}")),
                started.elapsed(),
            )
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
