//! On-Balance Volume.
//!
//! Starts at 0 on the first bar. Afterwards adds the bar's volume on a higher
//! close, subtracts it on a lower close and carries the total on an equal close.

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct OnBalanceVolume {
    prev_close: Option<f64>,
    total: f64,
    out: [f64; 1],
}

impl OnBalanceVolume {
    pub fn new() -> Self {
        Self {
            prev_close: None,
            total: 0.0,
            out: [f64::NAN],
        }
    }
}

impl Default for OnBalanceVolume {
    fn default() -> Self {
        Self::new()
    }
}

impl Indicator for OnBalanceVolume {
    fn name(&self) -> &str {
        "obv"
    }

    fn lines(&self) -> &'static [&'static str] {
        &["obv"]
    }

    fn lookback(&self) -> usize {
        0
    }

    fn update(&mut self, bar: &Bar) -> &[f64] {
        if let Some(prev) = self.prev_close {
            if bar.close > prev {
                self.total += bar.volume;
            } else if bar.close < prev {
                self.total -= bar.volume;
            }
        }
        self.prev_close = Some(bar.close);
        self.out[0] = self.total;
        &self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{make_bars, primary_series};

    #[test]
    fn obv_accumulates_signed_volume() {
        let mut bars = make_bars(&[10.0, 12.0, 12.0, 9.0]);
        for (bar, vol) in bars.iter_mut().zip([100.0, 50.0, 30.0, 80.0]) {
            bar.volume = vol;
        }
        let result = primary_series(&mut OnBalanceVolume::new(), &bars);
        assert_eq!(result, vec![0.0, 50.0, 50.0, -30.0]);
    }
}
