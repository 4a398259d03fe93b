//! Average True Range (ATR).
//!
//! True Range: max(high, prev_close) - min(low, prev_close), from the second bar on.
//! ATR uses Wilder smoothing (alpha = 1/period) seeded with the SMA of the
//! first `period` true ranges.
//! Lookback: period.

use super::rolling::{Smoother, TrueRange};
use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
    tr: TrueRange,
    smoother: Smoother,
    name: String,
    out: [f64; 1],
}

impl Atr {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ATR period must be >= 1");
        Self {
            period,
            tr: TrueRange::default(),
            smoother: Smoother::wilder(period),
            name: format!("atr_{period}"),
            out: [f64::NAN],
        }
    }

    /// Advance and return the ATR value alone. Shared with Supertrend.
    pub fn step(&mut self, bar: &Bar) -> f64 {
        match self.tr.update(bar.high, bar.low, bar.close) {
            Some(tr) => self.smoother.update(tr),
            None => f64::NAN,
        }
    }
}

impl Indicator for Atr {
    fn name(&self) -> &str {
        &self.name
    }

    fn lines(&self) -> &'static [&'static str] {
        &["atr"]
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn update(&mut self, bar: &Bar) -> &[f64] {
        self.out[0] = self.step(bar);
        &self.out
    }
}
