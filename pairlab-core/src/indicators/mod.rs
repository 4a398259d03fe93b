//! Streaming indicator implementations.
//!
//! Every indicator consumes one bar per `update` call and returns the current
//! value of each of its output lines. Values that are not yet defined (warm-up)
//! are `f64::NAN`. Output for bar `t` depends only on bars `0..=t`; the
//! lookahead integration test checks this for every indicator in the registry.
//!
//! Multi-line indicators (MACD, Stochastic, Bollinger, Ichimoku, pivots) expose
//! all lines from one instance. Line 0 is the primary line.

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod cci;
pub mod ema;
pub mod fibonacci_pivot;
pub mod ichimoku;
pub mod macd;
pub mod obv;
pub mod pivot_point;
pub mod rolling;
pub mod rsi;
pub mod stochastic;
pub mod supertrend;
pub mod vwap;
pub mod williams_r;

pub use adx::Adx;
pub use atr::Atr;
pub use bollinger::BollingerBands;
pub use cci::Cci;
pub use ema::Ema;
pub use fibonacci_pivot::FibonacciPivotPoint;
pub use ichimoku::Ichimoku;
pub use macd::Macd;
pub use obv::OnBalanceVolume;
pub use pivot_point::PivotPoint;
pub use rsi::Rsi;
pub use stochastic::Stochastic;
pub use supertrend::Supertrend;
pub use vwap::Vwap;
pub use williams_r::WilliamsR;

use crate::domain::Bar;

/// A causal, stateful transform over a bar stream.
///
/// Instances are created fresh for every task and never shared, so they only
/// need to be `Send` (they move onto a worker thread with their strategy).
pub trait Indicator: Send + std::fmt::Debug {
    /// Human-readable name including parameters, e.g. `rsi_14`.
    fn name(&self) -> &str;

    /// Output line names. Index 0 is the primary line.
    fn lines(&self) -> &'static [&'static str];

    /// Number of bars consumed before the primary line is first defined.
    fn lookback(&self) -> usize;

    /// Advance by one bar and return the current value of every line.
    fn update(&mut self, bar: &Bar) -> &[f64];
}

/// Feed a whole series through an indicator, one row of line values per bar.
pub fn compute_series(indicator: &mut dyn Indicator, bars: &[Bar]) -> Vec<Vec<f64>> {
    bars.iter().map(|bar| indicator.update(bar).to_vec()).collect()
}

/// Create synthetic bars from close prices for testing.
///
/// Generates plausible OHLV: open = prev_close (or close for first bar),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, volume = 1000.
/// One bar per calendar day.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    let base = chrono::NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                timestamp: base + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000.0,
            }
        })
        .collect()
}

/// Bars from explicit (high, low, close) triples, one per day.
#[cfg(test)]
pub fn make_hlc_bars(data: &[(f64, f64, f64)]) -> Vec<Bar> {
    let base = chrono::NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    data.iter()
        .enumerate()
        .map(|(i, &(high, low, close))| Bar {
            timestamp: base + chrono::Duration::days(i as i64),
            open: close,
            high,
            low,
            close,
            volume: 1000.0,
        })
        .collect()
}

/// Primary-line values of a whole series.
#[cfg(test)]
pub fn primary_series(indicator: &mut dyn Indicator, bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|bar| indicator.update(bar)[0]).collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
