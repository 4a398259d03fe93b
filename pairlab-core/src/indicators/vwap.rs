//! Volume-Weighted Average Price with a daily reset.
//!
//! Running sums of typical price × volume and of volume restart whenever a bar
//! falls on a different calendar date than the bar before it. With zero
//! accumulated volume the output falls back to the bar close.

use chrono::NaiveDate;

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Vwap {
    session: Option<NaiveDate>,
    price_volume: f64,
    volume: f64,
    out: [f64; 1],
}

impl Vwap {
    pub fn new() -> Self {
        Self {
            session: None,
            price_volume: 0.0,
            volume: 0.0,
            out: [f64::NAN],
        }
    }
}

impl Default for Vwap {
    fn default() -> Self {
        Self::new()
    }
}

impl Indicator for Vwap {
    fn name(&self) -> &str {
        "vwap"
    }

    fn lines(&self) -> &'static [&'static str] {
        &["vwap"]
    }

    fn lookback(&self) -> usize {
        0
    }

    fn update(&mut self, bar: &Bar) -> &[f64] {
        let date = bar.date();
        if self.session != Some(date) {
            self.session = Some(date);
            self.price_volume = 0.0;
            self.volume = 0.0;
        }
        self.price_volume += bar.typical_price() * bar.volume;
        self.volume += bar.volume;
        self.out[0] = if self.volume > 0.0 {
            self.price_volume / self.volume
        } else {
            bar.close
        };
        &self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, primary_series, DEFAULT_EPSILON};
    use chrono::NaiveDateTime;

    fn bar(ts: &str, price: f64, volume: f64) -> Bar {
        Bar {
            timestamp: NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M").unwrap(),
            open: price,
            high: price,
            low: price,
            close: price,
            volume,
        }
    }

    #[test]
    fn vwap_weights_by_volume_within_a_day() {
        let bars = vec![
            bar("2024-03-01 09:30", 10.0, 100.0),
            bar("2024-03-01 10:30", 20.0, 300.0),
        ];
        let result = primary_series(&mut Vwap::new(), &bars);
        assert_approx(result[0], 10.0, DEFAULT_EPSILON);
        assert_approx(result[1], (1000.0 + 6000.0) / 400.0, DEFAULT_EPSILON);
    }

    #[test]
    fn vwap_resets_on_new_date() {
        let bars = vec![
            bar("2024-03-01 09:30", 10.0, 100.0),
            bar("2024-03-01 15:30", 20.0, 100.0),
            bar("2024-03-04 09:30", 40.0, 50.0),
        ];
        let result = primary_series(&mut Vwap::new(), &bars);
        assert_approx(result[1], 15.0, DEFAULT_EPSILON);
        // First bar of the new day uses only its own typical price.
        assert_approx(result[2], 40.0, DEFAULT_EPSILON);
    }

    #[test]
    fn vwap_zero_volume_falls_back_to_close() {
        let bars = vec![bar("2024-03-01 09:30", 12.5, 0.0)];
        let result = primary_series(&mut Vwap::new(), &bars);
        assert_eq!(result[0], 12.5);
    }
}
