//! Classic floor pivot levels from the current bar.
//!
//! p = (h + l + c) / 3
//! s1 = 2p - h, r1 = 2p - l
//! s2 = p - (h - l), r2 = p + (h - l)

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct PivotPoint {
    out: [f64; 5],
}

impl PivotPoint {
    pub fn new() -> Self {
        Self {
            out: [f64::NAN; 5],
        }
    }
}

impl Default for PivotPoint {
    fn default() -> Self {
        Self::new()
    }
}

impl Indicator for PivotPoint {
    fn name(&self) -> &str {
        "pivot_point"
    }

    fn lines(&self) -> &'static [&'static str] {
        &["p", "s1", "s2", "r1", "r2"]
    }

    fn lookback(&self) -> usize {
        0
    }

    fn update(&mut self, bar: &Bar) -> &[f64] {
        let p = bar.typical_price();
        let range = bar.high - bar.low;
        self.out = [
            p,
            2.0 * p - bar.high,
            p - range,
            2.0 * p - bar.low,
            p + range,
        ];
        &self.out
    }
}
