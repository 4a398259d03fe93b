//! Supertrend: ATR-based trailing band.
//!
//! Bands are taken from the bar extremes, not the midpoint:
//! upper = high + multiplier * ATR, lower = low - multiplier * ATR.
//!
//! The trend starts up. While up, the output ratchets upward as
//! max(lower, previous output) until the previous close falls below the
//! previous output, which flips the trend down and resets the output to the
//! upper band. The downtrend mirrors this with min(upper, previous output).
//!
//! Lookback: period (the first ATR value needs `period` true ranges).

use super::atr::Atr;
use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Supertrend {
    period: usize,
    multiplier: f64,
    atr: Atr,
    index: usize,
    uptrend: bool,
    prev_close: f64,
    prev_output: f64,
    name: String,
    out: [f64; 1],
}

impl Supertrend {
    pub fn new(period: usize, multiplier: f64) -> Self {
        assert!(period >= 1, "Supertrend period must be >= 1");
        Self {
            period,
            multiplier,
            atr: Atr::new(period),
            index: 0,
            uptrend: true,
            prev_close: f64::NAN,
            prev_output: f64::NAN,
            name: format!("supertrend_{period}_{multiplier}"),
            out: [f64::NAN],
        }
    }

    pub fn is_uptrend(&self) -> bool {
        self.uptrend
    }

    fn next_output(&mut self, bar: &Bar, atr: f64) -> f64 {
        if self.index < self.period || atr.is_nan() {
            return f64::NAN;
        }
        let upper = bar.high + self.multiplier * atr;
        let lower = bar.low - self.multiplier * atr;
        let prev = self.prev_output;

        if prev.is_nan() {
            return if self.uptrend { lower } else { upper };
        }
        if self.uptrend {
            if self.prev_close < prev {
                self.uptrend = false;
                upper
            } else {
                lower.max(prev)
            }
        } else if self.prev_close > prev {
            self.uptrend = true;
            lower
        } else {
            upper.min(prev)
        }
    }
}

impl Indicator for Supertrend {
    fn name(&self) -> &str {
        &self.name
    }

    fn lines(&self) -> &'static [&'static str] {
        &["supertrend"]
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn update(&mut self, bar: &Bar) -> &[f64] {
        let atr = self.atr.step(bar);
        let value = self.next_output(bar, atr);
        self.index += 1;
        self.prev_close = bar.close;
        self.prev_output = value;
        self.out[0] = value;
        &self.out
    }
}
