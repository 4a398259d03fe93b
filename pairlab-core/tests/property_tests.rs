//! Property tests for indicator, grid and simulator invariants.
//!
//! Uses proptest to verify:
//! 1. Oscillator ranges: RSI and Stochastic %K in [0, 100], Williams %R in [-100, 0]
//! 2. OBV moves by exactly ±volume or not at all
//! 3. Supertrend ratchet: the line never falls while the trend stays up
//! 4. Grid size is the product of candidate counts, combinations are distinct
//! 5. Simulator bookkeeping: trade counts and drawdown stay consistent

use chrono::NaiveDate;
use proptest::prelude::*;
use pairlab_core::domain::{Bar, Order, OrderSide, ParamValue, PositionView};
use pairlab_core::engine::{run_simulation, SimulationConfig, Strategy as SimStrategy};
use pairlab_core::grid::ParamGrid;
use pairlab_core::indicators::{
    Indicator, OnBalanceVolume, Rsi, Stochastic, Supertrend, WilliamsR,
};

// ── Strategies (proptest) ────────────────────────────────────────────

/// (close, spread, volume) triples turned into a daily bar series.
fn arb_bars(max_len: usize) -> impl Strategy<Value = Vec<Bar>> {
    prop::collection::vec((10.0..200.0_f64, 0.0..5.0_f64, 0.0..1e6_f64), 1..max_len).prop_map(
        |rows| {
            let base = NaiveDate::from_ymd_opt(2024, 1, 2)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap();
            let mut prev_close = rows[0].0;
            rows.iter()
                .enumerate()
                .map(|(i, &(close, spread, volume))| {
                    let open = prev_close;
                    prev_close = close;
                    Bar {
                        timestamp: base + chrono::Duration::days(i as i64),
                        open,
                        high: open.max(close) + spread,
                        low: open.min(close) - spread,
                        close,
                        volume: volume.round(),
                    }
                })
                .collect()
        },
    )
}

fn in_range(v: f64, lo: f64, hi: f64) -> bool {
    v.is_nan() || (lo - 1e-9..=hi + 1e-9).contains(&v)
}

// ── 1. Oscillator ranges ─────────────────────────────────────────────

proptest! {
    #[test]
    fn rsi_stays_in_range(bars in arb_bars(120), period in 2usize..30) {
        let mut rsi = Rsi::new(period);
        for bar in &bars {
            let v = rsi.update(bar)[0];
            prop_assert!(in_range(v, 0.0, 100.0), "rsi {v}");
        }
    }

    #[test]
    fn stochastic_k_stays_in_range(bars in arb_bars(120), period in 2usize..20) {
        let mut stoch = Stochastic::new(period, 3, 3);
        for bar in &bars {
            let v = stoch.update(bar)[0];
            prop_assert!(in_range(v, 0.0, 100.0), "percK {v}");
        }
    }

    #[test]
    fn williams_r_stays_in_range(bars in arb_bars(120), period in 2usize..30) {
        let mut wr = WilliamsR::new(period);
        for bar in &bars {
            let v = wr.update(bar)[0];
            prop_assert!(in_range(v, -100.0, 0.0), "percR {v}");
        }
    }
}

// ── 2. OBV step ──────────────────────────────────────────────────────

proptest! {
    #[test]
    fn obv_moves_by_volume_or_not_at_all(bars in arb_bars(80)) {
        let mut obv = OnBalanceVolume::new();
        let mut prev = obv.update(&bars[0])[0];
        prop_assert_eq!(prev, 0.0);
        for w in bars.windows(2) {
            let v = obv.update(&w[1])[0];
            let expected = if w[1].close > w[0].close {
                prev + w[1].volume
            } else if w[1].close < w[0].close {
                prev - w[1].volume
            } else {
                prev
            };
            prop_assert_eq!(v, expected);
            prev = v;
        }
    }
}

// ── 3. Supertrend ratchet ────────────────────────────────────────────

proptest! {
    #[test]
    fn supertrend_never_falls_during_uptrend(
        bars in arb_bars(150),
        period in 2usize..15,
        multiplier in 1.0..4.0_f64,
    ) {
        let mut st = Supertrend::new(period, multiplier);
        let mut prev: Option<(f64, bool)> = None;
        for bar in &bars {
            let v = st.update(bar)[0];
            let up = st.is_uptrend();
            if let Some((pv, pup)) = prev {
                if !v.is_nan() && !pv.is_nan() && pup && up {
                    prop_assert!(v >= pv, "ratchet loosened: {pv} -> {v}");
                }
                if !v.is_nan() && !pv.is_nan() && !pup && !up {
                    prop_assert!(v <= pv, "ratchet loosened: {pv} -> {v}");
                }
            }
            prev = Some((v, up));
        }
    }
}

// ── 4. Grid size ─────────────────────────────────────────────────────

proptest! {
    #[test]
    fn grid_size_is_product_of_candidates(counts in prop::collection::vec(0usize..4, 0..4)) {
        let mut grid = ParamGrid::new();
        for (i, &n) in counts.iter().enumerate() {
            let values = (0..n).map(|v| ParamValue::Int(v as i64 + 1)).collect();
            grid.insert(format!("p{i}"), values);
        }
        let expected: usize = counts.iter().product();
        let combos: Vec<_> = grid.combinations().collect();
        prop_assert_eq!(combos.len(), expected);
        prop_assert_eq!(grid.size(), expected);
        for (i, a) in combos.iter().enumerate() {
            for b in &combos[i + 1..] {
                prop_assert_ne!(a, b);
            }
        }
    }
}

// ── 5. Simulator bookkeeping ─────────────────────────────────────────

/// Buys when flat and sells when long on alternating bars, ignoring fills.
struct Flipper {
    bar: usize,
}

impl SimStrategy for Flipper {
    fn next(&mut self, _bar: &Bar, position: PositionView) -> Option<OrderSide> {
        self.bar += 1;
        if self.bar % 2 == 0 {
            return None;
        }
        Some(if position.is_flat() {
            OrderSide::Buy
        } else {
            OrderSide::Sell
        })
    }

    fn notify_order(&mut self, _order: &Order) {}
}

proptest! {
    #[test]
    fn simulator_counts_are_consistent(bars in arb_bars(100), stake in 1.0..50.0_f64) {
        let config = SimulationConfig { stake, ..SimulationConfig::default() };
        let report = run_simulation(&bars, &mut Flipper { bar: 0 }, &config).unwrap();
        let t = report.trades;
        prop_assert_eq!(t.won + t.lost, t.closed);
        prop_assert_eq!(t.open + t.closed, t.total);
        prop_assert!(t.open <= 1);
        prop_assert!((0.0..=100.0).contains(&report.max_drawdown_pct));
        prop_assert!((report.pnl - (report.final_value - config.initial_cash)).abs() < 1e-9);
        prop_assert_eq!(report.bars, bars.len());
    }
}
