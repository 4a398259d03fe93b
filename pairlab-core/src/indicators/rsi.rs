//! Relative Strength Index (RSI).
//!
//! Uses Wilder smoothing of average gains and average losses.
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! Lookback: period.
//! Edge cases: both averages 0 → 50; avg_loss == 0 → 100; avg_gain == 0 → 0.

use super::rolling::Smoother;
use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    prev_close: Option<f64>,
    gains: Smoother,
    losses: Smoother,
    name: String,
    out: [f64; 1],
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period,
            prev_close: None,
            gains: Smoother::wilder(period),
            losses: Smoother::wilder(period),
            name: format!("rsi_{period}"),
            out: [f64::NAN],
        }
    }
}

fn compute_rsi(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_gain.is_nan() || avg_loss.is_nan() {
        return f64::NAN;
    }
    if avg_loss == 0.0 && avg_gain == 0.0 {
        return 50.0;
    }
    if avg_loss == 0.0 {
        return 100.0;
    }
    if avg_gain == 0.0 {
        return 0.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lines(&self) -> &'static [&'static str] {
        &["rsi"]
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn update(&mut self, bar: &Bar) -> &[f64] {
        if let Some(prev) = self.prev_close {
            let change = bar.close - prev;
            let gain = self.gains.update(change.max(0.0));
            let loss = self.losses.update((-change).max(0.0));
            self.out[0] = compute_rsi(gain, loss);
        }
        self.prev_close = Some(bar.close);
        &self.out
    }
}
