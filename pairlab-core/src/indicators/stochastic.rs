//! Slow Stochastic oscillator.
//!
//! raw %K = 100 * (close - lowest low) / (highest high - lowest low) over
//! `period` bars, or 50 when the range is flat.
//! percK = SMA(raw %K, period_dfast); percD = SMA(percK, period_dslow).
//! Lookback: period + period_dfast - 2.

use super::rolling::{Sma, Window};
use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Stochastic {
    period: usize,
    period_dfast: usize,
    highs: Window,
    lows: Window,
    k_smooth: Sma,
    d_smooth: Sma,
    name: String,
    out: [f64; 2],
}

impl Stochastic {
    pub fn new(period: usize, period_dfast: usize, period_dslow: usize) -> Self {
        assert!(
            period >= 1 && period_dfast >= 1 && period_dslow >= 1,
            "Stochastic periods must be >= 1"
        );
        Self {
            period,
            period_dfast,
            highs: Window::new(period),
            lows: Window::new(period),
            k_smooth: Sma::new(period_dfast),
            d_smooth: Sma::new(period_dslow),
            name: format!("stochastic_{period}_{period_dfast}_{period_dslow}"),
            out: [f64::NAN; 2],
        }
    }
}

impl Indicator for Stochastic {
    fn name(&self) -> &str {
        &self.name
    }

    fn lines(&self) -> &'static [&'static str] {
        &["percK", "percD"]
    }

    fn lookback(&self) -> usize {
        self.period + self.period_dfast - 2
    }

    fn update(&mut self, bar: &Bar) -> &[f64] {
        self.highs.push(bar.high);
        self.lows.push(bar.low);
        if !self.highs.is_full() {
            return &self.out;
        }
        let hh = self.highs.max();
        let ll = self.lows.min();
        let range = hh - ll;
        let raw_k = if range > 0.0 {
            100.0 * (bar.close - ll) / range
        } else {
            50.0
        };
        let k = self.k_smooth.update(raw_k);
        if !k.is_nan() {
            self.out[1] = self.d_smooth.update(k);
        }
        self.out[0] = k;
        &self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, compute_series, make_hlc_bars, DEFAULT_EPSILON};

    #[test]
    fn stochastic_close_at_high_is_hundred() {
        let data: Vec<(f64, f64, f64)> = (0..8)
            .map(|i| {
                let c = 10.0 + i as f64;
                (c, c - 2.0, c)
            })
            .collect();
        let bars = make_hlc_bars(&data);
        let rows = compute_series(&mut Stochastic::new(3, 2, 2), &bars);
        assert!(rows[2][0].is_nan());
        assert_approx(rows[3][0], 100.0, DEFAULT_EPSILON);
        assert!(rows[3][1].is_nan());
        assert_approx(rows[4][1], 100.0, DEFAULT_EPSILON);
    }

    #[test]
    fn stochastic_flat_range_is_fifty() {
        let data = vec![(10.0, 10.0, 10.0); 6];
        let bars = make_hlc_bars(&data);
        let rows = compute_series(&mut Stochastic::new(3, 1, 1), &bars);
        assert_approx(rows[2][0], 50.0, DEFAULT_EPSILON);
        assert_approx(rows[5][1], 50.0, DEFAULT_EPSILON);
    }
}
