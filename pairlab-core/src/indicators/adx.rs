//! Average Directional Index (ADX).
//!
//! +DM/-DM and true range are Wilder-smoothed over `period`, giving +DI and -DI.
//! DX = 100 * |+DI - -DI| / (+DI + -DI), or 0 when both DIs are 0.
//! ADX = Wilder smoothing of DX over `period`.
//! Lookback: 2 * period - 1.

use super::rolling::{Smoother, TrueRange};
use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Adx {
    period: usize,
    prev: Option<(f64, f64)>,
    tr: TrueRange,
    smooth_tr: Smoother,
    smooth_plus: Smoother,
    smooth_minus: Smoother,
    smooth_dx: Smoother,
    name: String,
    out: [f64; 1],
}

impl Adx {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ADX period must be >= 1");
        Self {
            period,
            prev: None,
            tr: TrueRange::default(),
            smooth_tr: Smoother::wilder(period),
            smooth_plus: Smoother::wilder(period),
            smooth_minus: Smoother::wilder(period),
            smooth_dx: Smoother::wilder(period),
            name: format!("adx_{period}"),
            out: [f64::NAN],
        }
    }
}

/// Directional movement (+DM, -DM) between two bars.
fn directional_movement(high: f64, low: f64, prev_high: f64, prev_low: f64) -> (f64, f64) {
    let up = high - prev_high;
    let down = prev_low - low;
    let plus = if up > down && up > 0.0 { up } else { 0.0 };
    let minus = if down > up && down > 0.0 { down } else { 0.0 };
    (plus, minus)
}

impl Indicator for Adx {
    fn name(&self) -> &str {
        &self.name
    }

    fn lines(&self) -> &'static [&'static str] {
        &["adx"]
    }

    fn lookback(&self) -> usize {
        2 * self.period - 1
    }

    fn update(&mut self, bar: &Bar) -> &[f64] {
        let tr = self.tr.update(bar.high, bar.low, bar.close);
        if let (Some(tr), Some((prev_high, prev_low))) = (tr, self.prev) {
            let (plus, minus) = directional_movement(bar.high, bar.low, prev_high, prev_low);
            let atr = self.smooth_tr.update(tr);
            let plus = self.smooth_plus.update(plus);
            let minus = self.smooth_minus.update(minus);
            if !atr.is_nan() {
                let (plus_di, minus_di) = if atr > 0.0 {
                    (100.0 * plus / atr, 100.0 * minus / atr)
                } else {
                    (0.0, 0.0)
                };
                let di_sum = plus_di + minus_di;
                let dx = if di_sum > 0.0 {
                    100.0 * (plus_di - minus_di).abs() / di_sum
                } else {
                    0.0
                };
                self.out[0] = self.smooth_dx.update(dx);
            }
        }
        self.prev = Some((bar.high, bar.low));
        &self.out
    }
}
