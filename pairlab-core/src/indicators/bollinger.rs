//! Bollinger Bands.
//!
//! mid = SMA(close, period); top/bot = mid ± devfactor * population std dev.
//! Lookback: period - 1.

use super::rolling::Window;
use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct BollingerBands {
    period: usize,
    devfactor: f64,
    closes: Window,
    name: String,
    out: [f64; 3],
}

impl BollingerBands {
    pub fn new(period: usize, devfactor: f64) -> Self {
        assert!(period >= 1, "Bollinger period must be >= 1");
        Self {
            period,
            devfactor,
            closes: Window::new(period),
            name: format!("bollinger_{period}_{devfactor}"),
            out: [f64::NAN; 3],
        }
    }
}

impl Indicator for BollingerBands {
    fn name(&self) -> &str {
        &self.name
    }

    fn lines(&self) -> &'static [&'static str] {
        &["mid", "top", "bot"]
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn update(&mut self, bar: &Bar) -> &[f64] {
        self.closes.push(bar.close);
        if self.closes.is_full() {
            let mid = self.closes.mean();
            let width = self.devfactor * self.closes.std_dev();
            self.out = [mid, mid + width, mid - width];
        }
        &self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, compute_series, make_bars, DEFAULT_EPSILON};

    #[test]
    fn bollinger_bands_symmetric_about_mid() {
        let bars = make_bars(&[2.0, 4.0, 4.0, 6.0]);
        let rows = compute_series(&mut BollingerBands::new(4, 2.0), &bars);
        assert!(rows[2][0].is_nan());
        let std = 2.0_f64.sqrt();
        assert_approx(rows[3][0], 4.0, DEFAULT_EPSILON);
        assert_approx(rows[3][1], 4.0 + 2.0 * std, DEFAULT_EPSILON);
        assert_approx(rows[3][2], 4.0 - 2.0 * std, DEFAULT_EPSILON);
    }

    #[test]
    fn bollinger_flat_collapses() {
        let bars = make_bars(&[7.0; 5]);
        let rows = compute_series(&mut BollingerBands::new(3, 2.0), &bars);
        assert_eq!(rows[4], vec![7.0, 7.0, 7.0]);
    }
}
