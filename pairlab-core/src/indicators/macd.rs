//! Moving Average Convergence Divergence.
//!
//! macd = EMA(close, me1) - EMA(close, me2)
//! signal = EMA(macd, period_signal), fed only once macd is defined
//! histo = macd - signal

use super::rolling::Smoother;
use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Macd {
    period_me1: usize,
    period_me2: usize,
    fast: Smoother,
    slow: Smoother,
    signal: Smoother,
    name: String,
    out: [f64; 3],
}

impl Macd {
    pub fn new(period_me1: usize, period_me2: usize, period_signal: usize) -> Self {
        assert!(
            period_me1 >= 1 && period_me2 >= 1 && period_signal >= 1,
            "MACD periods must be >= 1"
        );
        Self {
            period_me1,
            period_me2,
            fast: Smoother::ema(period_me1),
            slow: Smoother::ema(period_me2),
            signal: Smoother::ema(period_signal),
            name: format!("macd_{period_me1}_{period_me2}_{period_signal}"),
            out: [f64::NAN; 3],
        }
    }
}

impl Indicator for Macd {
    fn name(&self) -> &str {
        &self.name
    }

    fn lines(&self) -> &'static [&'static str] {
        &["macd", "signal", "histo"]
    }

    fn lookback(&self) -> usize {
        self.period_me1.max(self.period_me2) - 1
    }

    fn update(&mut self, bar: &Bar) -> &[f64] {
        let fast = self.fast.update(bar.close);
        let slow = self.slow.update(bar.close);
        let macd = fast - slow;
        let signal = if macd.is_nan() {
            f64::NAN
        } else {
            self.signal.update(macd)
        };
        self.out = [macd, signal, macd - signal];
        &self.out
    }
}
