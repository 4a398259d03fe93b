//! Run statistics collected while the simulation walks the bars.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Trade counts. A trade opens on a filled entry and closes on the filled exit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeStats {
    pub total: usize,
    pub open: usize,
    pub closed: usize,
    /// Closed with net PnL (after both commissions) >= 0.
    pub won: usize,
    pub lost: usize,
}

impl TradeStats {
    pub fn record_open(&mut self) {
        self.total += 1;
        self.open += 1;
    }

    pub fn record_close(&mut self, net_pnl: f64) {
        self.open = self.open.saturating_sub(1);
        self.closed += 1;
        if net_pnl >= 0.0 {
            self.won += 1;
        } else {
            self.lost += 1;
        }
    }

    /// Won / closed, or `None` before any trade closed.
    pub fn win_rate(&self) -> Option<f64> {
        (self.closed > 0).then(|| self.won as f64 / self.closed as f64)
    }
}

/// Running maximum drawdown, in percent of the running peak.
#[derive(Debug, Clone)]
pub struct DrawdownTracker {
    peak: f64,
    max_pct: f64,
}

impl DrawdownTracker {
    pub fn new(initial_value: f64) -> Self {
        Self {
            peak: initial_value,
            max_pct: 0.0,
        }
    }

    pub fn record(&mut self, value: f64) {
        if value > self.peak {
            self.peak = value;
        }
        if self.peak > 0.0 {
            let dd = 100.0 * (self.peak - value) / self.peak;
            if dd > self.max_pct {
                self.max_pct = dd;
            }
        }
    }

    pub fn max_drawdown_pct(&self) -> f64 {
        self.max_pct
    }
}

/// Daily returns built from the last portfolio value of each calendar date.
///
/// The first return is measured against the starting cash.
#[derive(Debug, Clone)]
pub struct DailyReturns {
    reference: f64,
    current: Option<(NaiveDate, f64)>,
    returns: Vec<f64>,
}

impl DailyReturns {
    pub fn new(initial_value: f64) -> Self {
        Self {
            reference: initial_value,
            current: None,
            returns: Vec::new(),
        }
    }

    pub fn record(&mut self, date: NaiveDate, value: f64) {
        match self.current {
            Some((d, last)) if d != date => {
                self.push_return(last);
                self.current = Some((date, value));
            }
            _ => self.current = Some((date, value)),
        }
    }

    fn push_return(&mut self, value: f64) {
        if self.reference != 0.0 {
            self.returns.push(value / self.reference - 1.0);
        }
        self.reference = value;
    }

    /// Close the last open day and return all daily returns.
    pub fn finish(mut self) -> Vec<f64> {
        if let Some((_, last)) = self.current.take() {
            self.push_return(last);
        }
        self.returns
    }
}

/// Annualized Sharpe ratio: sqrt(252) * mean / population std of daily returns.
///
/// `None` when there are no returns or their deviation is zero.
pub fn sharpe_ratio(returns: &[f64]) -> Option<f64> {
    if returns.is_empty() {
        return None;
    }
    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let var = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let std = var.sqrt();
    if std < 1e-15 {
        return None;
    }
    Some(mean / std * 252.0_f64.sqrt())
}
