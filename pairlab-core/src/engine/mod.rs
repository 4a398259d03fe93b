//! Simulation engine: drives one strategy over one instrument's bars.
//!
//! Per bar, in order:
//!
//! 1. An order queued on the previous bar executes at this bar's open and the
//!    strategy is told the outcome.
//! 2. The strategy sees the bar and the current position and may place one
//!    market order.
//! 3. The portfolio is marked at the close for the statistics.
//!
//! An order still queued after the last bar is never executed.

pub mod analyzers;
pub mod broker;

use std::time::{Duration, Instant};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use analyzers::{sharpe_ratio, DailyReturns, DrawdownTracker, TradeStats};
pub use broker::Broker;

use crate::domain::{Bar, Order, OrderSide, OrderStatus, PositionView};

/// Decision logic driven by the simulator.
pub trait Strategy {
    /// Called once per bar after pending orders have been processed.
    fn next(&mut self, bar: &Bar, position: PositionView) -> Option<OrderSide>;

    /// Called for every order status change.
    fn notify_order(&mut self, order: &Order);
}

/// Bars between time-limit checks.
const TIME_CHECK_INTERVAL: usize = 64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub initial_cash: f64,
    /// Fraction of traded value charged per fill.
    pub commission: f64,
    /// Units bought per entry order.
    pub stake: f64,
    #[serde(default)]
    pub time_limit: Option<Duration>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            initial_cash: 100_000.0,
            commission: 0.002,
            stake: 1.0,
            time_limit: None,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), SimulationError> {
        if !(self.initial_cash.is_finite() && self.initial_cash > 0.0) {
            return Err(SimulationError::InvalidConfig(format!(
                "initial_cash must be > 0, got {}",
                self.initial_cash
            )));
        }
        if !(self.commission.is_finite() && self.commission >= 0.0) {
            return Err(SimulationError::InvalidConfig(format!(
                "commission must be >= 0, got {}",
                self.commission
            )));
        }
        if !(self.stake.is_finite() && self.stake > 0.0) {
            return Err(SimulationError::InvalidConfig(format!(
                "stake must be > 0, got {}",
                self.stake
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimulationError {
    #[error("no bars to simulate")]
    Empty,
    #[error("bars out of order at index {index}: {current} does not follow {previous}")]
    Unordered {
        index: usize,
        previous: NaiveDateTime,
        current: NaiveDateTime,
    },
    #[error("invalid simulation config: {0}")]
    InvalidConfig(String),
    #[error("time limit of {limit:?} exceeded after {bars_processed} bars")]
    Timeout {
        limit: Duration,
        bars_processed: usize,
    },
}

/// Outcome of one simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub initial_cash: f64,
    pub final_value: f64,
    pub pnl: f64,
    pub sharpe: Option<f64>,
    pub max_drawdown_pct: f64,
    pub trades: TradeStats,
    pub bars: usize,
    pub orders: usize,
}

/// Check the strictly-increasing timestamp invariant.
pub fn check_ordering(bars: &[Bar]) -> Result<(), SimulationError> {
    for (index, pair) in bars.windows(2).enumerate() {
        if pair[1].timestamp <= pair[0].timestamp {
            return Err(SimulationError::Unordered {
                index: index + 1,
                previous: pair[0].timestamp,
                current: pair[1].timestamp,
            });
        }
    }
    Ok(())
}

pub fn run_simulation<S: Strategy + ?Sized>(
    bars: &[Bar],
    strategy: &mut S,
    config: &SimulationConfig,
) -> Result<SimulationReport, SimulationError> {
    config.validate()?;
    if bars.is_empty() {
        return Err(SimulationError::Empty);
    }
    check_ordering(bars)?;

    let started = Instant::now();
    let mut broker = Broker::new(config.initial_cash, config.commission, config.stake);
    let mut drawdown = DrawdownTracker::new(config.initial_cash);
    let mut daily = DailyReturns::new(config.initial_cash);
    let mut orders = 0usize;

    for (i, bar) in bars.iter().enumerate() {
        if let Some(limit) = config.time_limit {
            if i % TIME_CHECK_INTERVAL == 0 && started.elapsed() > limit {
                return Err(SimulationError::Timeout {
                    limit,
                    bars_processed: i,
                });
            }
        }

        if let Some(order) = broker.execute_pending(bar) {
            strategy.notify_order(&order);
        }

        if let Some(side) = strategy.next(bar, broker.position()) {
            orders += 1;
            let order = broker.submit(side, i);
            if order.status == OrderStatus::Accepted {
                let mut submitted = order.clone();
                submitted.status = OrderStatus::Submitted;
                strategy.notify_order(&submitted);
            }
            strategy.notify_order(&order);
        }

        let value = broker.value(bar.close);
        drawdown.record(value);
        daily.record(bar.date(), value);
    }

    let last_close = bars[bars.len() - 1].close;
    let final_value = broker.value(last_close);
    let report = SimulationReport {
        initial_cash: config.initial_cash,
        final_value,
        pnl: final_value - config.initial_cash,
        sharpe: sharpe_ratio(&daily.finish()),
        max_drawdown_pct: drawdown.max_drawdown_pct(),
        trades: broker.trades(),
        bars: bars.len(),
        orders,
    };
    debug!(
        bars = report.bars,
        orders,
        pnl = report.pnl,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "simulation finished"
    );
    Ok(report)
}
