//! Per-indicator signal classification.

use crate::domain::{Bar, Signal};
use crate::indicators::Indicator;

/// How one indicator's line values turn into a [`Signal`].
///
/// Line references are indices into the indicator's `lines()`, resolved once
/// when the strategy is built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SignalRule {
    /// Oscillator: value below `buy_below` buys, above `sell_above` sells.
    OscillatorThreshold {
        line: usize,
        buy_below: f64,
        sell_above: f64,
    },
    /// Fast line above slow line buys, below sells.
    DualLineCross { fast: usize, slow: usize },
    /// Close above the band buys, below sells.
    PriceVsBand { line: usize },
    /// Close vs the primary line.
    PriceVsLine,
}

impl SignalRule {
    /// Classify one bar. NaN operands and exact ties are Neutral.
    pub fn classify(&self, close: f64, values: &[f64]) -> Signal {
        match *self {
            SignalRule::OscillatorThreshold {
                line,
                buy_below,
                sell_above,
            } => {
                let v = line_value(values, line);
                if v < buy_below {
                    Signal::Buy
                } else if v > sell_above {
                    Signal::Sell
                } else {
                    Signal::Neutral
                }
            }
            SignalRule::DualLineCross { fast, slow } => {
                compare(line_value(values, fast), line_value(values, slow))
            }
            SignalRule::PriceVsBand { line } => compare(close, line_value(values, line)),
            SignalRule::PriceVsLine => compare(close, line_value(values, 0)),
        }
    }
}

fn line_value(values: &[f64], idx: usize) -> f64 {
    values.get(idx).copied().unwrap_or(f64::NAN)
}

/// `a > b` → Buy, `a < b` → Sell; NaN compares false both ways.
fn compare(a: f64, b: f64) -> Signal {
    if a > b {
        Signal::Buy
    } else if a < b {
        Signal::Sell
    } else {
        Signal::Neutral
    }
}

/// One indicator instance paired with the rule that reads it.
#[derive(Debug)]
pub struct SignalLeg {
    indicator: Box<dyn Indicator>,
    rule: SignalRule,
    last: Signal,
}

impl SignalLeg {
    pub fn new(indicator: Box<dyn Indicator>, rule: SignalRule) -> Self {
        Self {
            indicator,
            rule,
            last: Signal::Neutral,
        }
    }

    /// Advance the indicator by one bar and classify the result.
    pub fn update(&mut self, bar: &Bar) -> Signal {
        let values = self.indicator.update(bar);
        self.last = self.rule.classify(bar.close, values);
        self.last
    }

    pub fn last(&self) -> Signal {
        self.last
    }

    pub fn rule(&self) -> SignalRule {
        self.rule
    }

    pub fn indicator(&self) -> &dyn Indicator {
        self.indicator.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSI_RULE: SignalRule = SignalRule::OscillatorThreshold {
        line: 0,
        buy_below: 30.0,
        sell_above: 70.0,
    };

    #[test]
    fn oscillator_threshold_bands() {
        assert_eq!(RSI_RULE.classify(100.0, &[25.0]), Signal::Buy);
        assert_eq!(RSI_RULE.classify(100.0, &[75.0]), Signal::Sell);
        assert_eq!(RSI_RULE.classify(100.0, &[50.0]), Signal::Neutral);
        // Boundaries are exclusive.
        assert_eq!(RSI_RULE.classify(100.0, &[30.0]), Signal::Neutral);
        assert_eq!(RSI_RULE.classify(100.0, &[70.0]), Signal::Neutral);
    }

    #[test]
    fn negative_thresholds_for_williams_r() {
        let rule = SignalRule::OscillatorThreshold {
            line: 0,
            buy_below: -80.0,
            sell_above: -20.0,
        };
        assert_eq!(rule.classify(0.0, &[-90.0]), Signal::Buy);
        assert_eq!(rule.classify(0.0, &[-10.0]), Signal::Sell);
        assert_eq!(rule.classify(0.0, &[-50.0]), Signal::Neutral);
    }

    #[test]
    fn dual_line_cross() {
        let rule = SignalRule::DualLineCross { fast: 0, slow: 1 };
        assert_eq!(rule.classify(0.0, &[1.5, 1.0, 0.5]), Signal::Buy);
        assert_eq!(rule.classify(0.0, &[0.5, 1.0, -0.5]), Signal::Sell);
        assert_eq!(rule.classify(0.0, &[1.0, 1.0, 0.0]), Signal::Neutral);
    }

    #[test]
    fn price_vs_band_and_line() {
        let band = SignalRule::PriceVsBand { line: 0 };
        assert_eq!(band.classify(105.0, &[100.0]), Signal::Buy);
        assert_eq!(band.classify(95.0, &[100.0]), Signal::Sell);
        assert_eq!(band.classify(100.0, &[100.0]), Signal::Neutral);
        assert_eq!(SignalRule::PriceVsLine.classify(101.0, &[100.0, 200.0]), Signal::Buy);
    }

    #[test]
    fn nan_is_neutral_for_every_rule() {
        let rules = [
            RSI_RULE,
            SignalRule::DualLineCross { fast: 0, slow: 1 },
            SignalRule::PriceVsBand { line: 0 },
            SignalRule::PriceVsLine,
        ];
        for rule in rules {
            assert_eq!(rule.classify(100.0, &[f64::NAN, f64::NAN]), Signal::Neutral);
        }
    }
}
