//! Commodity Channel Index (CCI).
//!
//! CCI = (tp - SMA(tp)) / (factor * mean deviation), tp = (h+l+c)/3.
//! 0 when the mean deviation is 0.
//! Lookback: period - 1.

use super::rolling::Window;
use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Cci {
    period: usize,
    factor: f64,
    typical: Window,
    name: String,
    out: [f64; 1],
}

impl Cci {
    pub fn new(period: usize, factor: f64) -> Self {
        assert!(period >= 1, "CCI period must be >= 1");
        Self {
            period,
            factor,
            typical: Window::new(period),
            name: format!("cci_{period}"),
            out: [f64::NAN],
        }
    }
}

impl Indicator for Cci {
    fn name(&self) -> &str {
        &self.name
    }

    fn lines(&self) -> &'static [&'static str] {
        &["cci"]
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn update(&mut self, bar: &Bar) -> &[f64] {
        let tp = bar.typical_price();
        self.typical.push(tp);
        if !self.typical.is_full() {
            return &self.out;
        }
        let mean = self.typical.mean();
        let mean_dev =
            self.typical.iter().map(|v| (v - mean).abs()).sum::<f64>() / self.period as f64;
        self.out[0] = if mean_dev > 0.0 {
            (tp - mean) / (self.factor * mean_dev)
        } else {
            0.0
        };
        &self.out
    }
}
