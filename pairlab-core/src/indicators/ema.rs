//! Exponential Moving Average (EMA) of the close.
//!
//! Seeded with the SMA of the first `period` closes, then alpha = 2/(period+1).
//! Lookback: period - 1.

use super::rolling::Smoother;
use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    smoother: Smoother,
    name: String,
    out: [f64; 1],
}

impl Ema {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "EMA period must be >= 1");
        Self {
            period,
            smoother: Smoother::ema(period),
            name: format!("ema_{period}"),
            out: [f64::NAN],
        }
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn lines(&self) -> &'static [&'static str] {
        &["ema"]
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn update(&mut self, bar: &Bar) -> &[f64] {
        self.out[0] = self.smoother.update(bar.close);
        &self.out
    }
}
