//! Ichimoku Kinko Hyo (causal lines only).
//!
//! tenkan_sen / kijun_sen = midpoint of the highest high and lowest low over
//! their periods. senkou_span_a = (tenkan + kijun) / 2 and senkou_span_b =
//! midpoint over `senkou` bars, both plotted `senkou_lead` bars forward, so the
//! value shown at bar t was computed at bar t - senkou_lead.
//!
//! The chikou span plots the close `kijun` bars back and is not computable
//! causally, so it is not produced.

use super::rolling::Window;
use super::Indicator;
use crate::domain::Bar;

/// Rolling (highest high + lowest low) / 2.
#[derive(Debug, Clone)]
struct Midpoint {
    highs: Window,
    lows: Window,
}

impl Midpoint {
    fn new(period: usize) -> Self {
        Self {
            highs: Window::new(period),
            lows: Window::new(period),
        }
    }

    fn update(&mut self, bar: &Bar) -> f64 {
        self.highs.push(bar.high);
        self.lows.push(bar.low);
        if self.highs.is_full() {
            (self.highs.max() + self.lows.min()) / 2.0
        } else {
            f64::NAN
        }
    }
}

/// Delays a series by a fixed number of bars.
#[derive(Debug, Clone)]
struct Lag {
    ring: Window,
}

impl Lag {
    fn new(bars: usize) -> Self {
        Self {
            ring: Window::new(bars + 1),
        }
    }

    fn update(&mut self, value: f64) -> f64 {
        self.ring.push(value);
        if self.ring.is_full() {
            self.ring.oldest().unwrap_or(f64::NAN)
        } else {
            f64::NAN
        }
    }
}

#[derive(Debug, Clone)]
pub struct Ichimoku {
    tenkan_period: usize,
    tenkan: Midpoint,
    kijun: Midpoint,
    senkou: Midpoint,
    lag_a: Lag,
    lag_b: Lag,
    name: String,
    out: [f64; 4],
}

impl Ichimoku {
    pub fn new(tenkan: usize, kijun: usize, senkou: usize, senkou_lead: usize) -> Self {
        assert!(
            tenkan >= 1 && kijun >= 1 && senkou >= 1,
            "Ichimoku periods must be >= 1"
        );
        Self {
            tenkan_period: tenkan,
            tenkan: Midpoint::new(tenkan),
            kijun: Midpoint::new(kijun),
            senkou: Midpoint::new(senkou),
            lag_a: Lag::new(senkou_lead),
            lag_b: Lag::new(senkou_lead),
            name: format!("ichimoku_{tenkan}_{kijun}_{senkou}"),
            out: [f64::NAN; 4],
        }
    }
}

impl Indicator for Ichimoku {
    fn name(&self) -> &str {
        &self.name
    }

    fn lines(&self) -> &'static [&'static str] {
        &["tenkan_sen", "kijun_sen", "senkou_span_a", "senkou_span_b"]
    }

    fn lookback(&self) -> usize {
        self.tenkan_period - 1
    }

    fn update(&mut self, bar: &Bar) -> &[f64] {
        let tenkan = self.tenkan.update(bar);
        let kijun = self.kijun.update(bar);
        let span_b = self.senkou.update(bar);
        let span_a = (tenkan + kijun) / 2.0;
        self.out = [
            tenkan,
            kijun,
            self.lag_a.update(span_a),
            self.lag_b.update(span_b),
        ];
        &self.out
    }
}
