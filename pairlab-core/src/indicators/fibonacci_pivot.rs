//! Fibonacci pivot levels from the current bar.
//!
//! p = (h + l + c) / 3; support/resistance at p ∓ level * (h - l).

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct FibonacciPivotPoint {
    levels: [f64; 3],
    out: [f64; 7],
}

impl FibonacciPivotPoint {
    pub fn new(level1: f64, level2: f64, level3: f64) -> Self {
        Self {
            levels: [level1, level2, level3],
            out: [f64::NAN; 7],
        }
    }
}

impl Default for FibonacciPivotPoint {
    fn default() -> Self {
        Self::new(0.382, 0.618, 1.0)
    }
}

impl Indicator for FibonacciPivotPoint {
    fn name(&self) -> &str {
        "fibonacci_pivot"
    }

    fn lines(&self) -> &'static [&'static str] {
        &["p", "s1", "s2", "s3", "r1", "r2", "r3"]
    }

    fn lookback(&self) -> usize {
        0
    }

    fn update(&mut self, bar: &Bar) -> &[f64] {
        let p = bar.typical_price();
        let range = bar.high - bar.low;
        let [l1, l2, l3] = self.levels;
        self.out = [
            p,
            p - l1 * range,
            p - l2 * range,
            p - l3 * range,
            p + l1 * range,
            p + l2 * range,
            p + l3 * range,
        ];
        &self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, compute_series, make_hlc_bars};

    #[test]
    fn fibonacci_levels() {
        let bars = make_hlc_bars(&[(110.0, 90.0, 100.0)]);
        let rows = compute_series(&mut FibonacciPivotPoint::default(), &bars);
        let expected = [100.0, 92.36, 87.64, 80.0, 107.64, 112.36, 120.0];
        for (v, e) in rows[0].iter().zip(expected) {
            assert_approx(*v, e, 1e-9);
        }
    }
}
