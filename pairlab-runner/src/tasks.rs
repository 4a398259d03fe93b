//! Task planning: instruments × indicator pairs × parameter combinations.

use thiserror::Error;
use tracing::debug;

use pairlab_core::domain::{ParameterSet, Task};
use pairlab_core::grid::GridConfig;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanError {
    #[error("no tasks generated from {instruments} instrument(s) and {pairs} indicator pair(s); check the indicator list and parameter grids")]
    NoTasks { instruments: usize, pairs: usize },
}

/// Names taken two at a time without repetition, in list order.
///
/// The list is used as given: a repeated name pairs with itself.
pub fn indicator_pairs(names: &[String]) -> Vec<(&str, &str)> {
    let mut pairs = Vec::new();
    for (i, a) in names.iter().enumerate() {
        for b in &names[i + 1..] {
            pairs.push((a.as_str(), b.as_str()));
        }
    }
    pairs
}

/// Every task of the sweep, in deterministic order.
///
/// A pairing of one indicator with itself under identical parameters is
/// dropped (values compared numerically, in any order); distinct parameter
/// sets of the same indicator are kept.
pub fn build_tasks(
    instruments: &[String],
    indicators: &[String],
    grid: &GridConfig,
) -> Result<Vec<Task>, PlanError> {
    let pairs = indicator_pairs(indicators);
    let mut tasks = Vec::new();

    for instrument in instruments {
        for &(a, b) in &pairs {
            let params_b: Vec<ParameterSet> = grid.combinations(b).collect();
            for pa in grid.combinations(a) {
                for pb in &params_b {
                    if a == b && pa.same_values(pb) {
                        continue;
                    }
                    tasks.push(Task::new(
                        instrument.as_str(),
                        a,
                        b,
                        pa.clone(),
                        pb.clone(),
                    ));
                }
            }
        }
    }

    if tasks.is_empty() {
        return Err(PlanError::NoTasks {
            instruments: instruments.len(),
            pairs: pairs.len(),
        });
    }
    debug!(
        instruments = instruments.len(),
        pairs = pairs.len(),
        tasks = tasks.len(),
        "planned sweep"
    );
    Ok(tasks)
}
