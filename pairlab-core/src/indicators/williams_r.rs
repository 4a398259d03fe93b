//! Williams %R.
//!
//! percR = -100 * (highest high - close) / (highest high - lowest low), in [-100, 0].
//! -50 when the range is flat.

use super::rolling::Window;
use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct WilliamsR {
    period: usize,
    highs: Window,
    lows: Window,
    name: String,
    out: [f64; 1],
}

impl WilliamsR {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "WilliamsR period must be >= 1");
        Self {
            period,
            highs: Window::new(period),
            lows: Window::new(period),
            name: format!("williams_r_{period}"),
            out: [f64::NAN],
        }
    }
}

impl Indicator for WilliamsR {
    fn name(&self) -> &str {
        &self.name
    }

    fn lines(&self) -> &'static [&'static str] {
        &["percR"]
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn update(&mut self, bar: &Bar) -> &[f64] {
        self.highs.push(bar.high);
        self.lows.push(bar.low);
        if self.highs.is_full() {
            let hh = self.highs.max();
            let range = hh - self.lows.min();
            self.out[0] = if range > 0.0 {
                -100.0 * (hh - bar.close) / range
            } else {
                -50.0
            };
        }
        &self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_hlc_bars, primary_series, DEFAULT_EPSILON};

    #[test]
    fn williams_r_extremes() {
        let bars = make_hlc_bars(&[(12.0, 8.0, 10.0), (12.0, 8.0, 12.0), (12.0, 8.0, 8.0)]);
        let result = primary_series(&mut WilliamsR::new(2), &bars);
        assert!(result[0].is_nan());
        assert_approx(result[1], 0.0, DEFAULT_EPSILON);
        assert_approx(result[2], -100.0, DEFAULT_EPSILON);
    }

    #[test]
    fn williams_r_flat_is_minus_fifty() {
        let bars = make_hlc_bars(&[(5.0, 5.0, 5.0); 3]);
        let result = primary_series(&mut WilliamsR::new(2), &bars);
        assert_approx(result[2], -50.0, DEFAULT_EPSILON);
    }
}
