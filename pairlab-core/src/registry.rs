//! Indicator registry: maps indicator names to constructors and signal rules.
//!
//! The registry is assembled once (`IndicatorRegistry::standard()`) and passed
//! by reference. Building an indicator validates the supplied `ParameterSet`
//! against the declared parameters, fills in defaults for anything omitted and
//! resolves the signal rule's line names against the built instance.

use crate::domain::{ParamValue, ParameterSet};
use crate::indicators::{
    Adx, Atr, BollingerBands, Cci, Ema, FibonacciPivotPoint, Ichimoku, Indicator, Macd,
    OnBalanceVolume, PivotPoint, Rsi, Stochastic, Supertrend, Vwap, WilliamsR,
};
use crate::strategy::{SignalLeg, SignalRule};

// ─── Error type ──────────────────────────────────────────────────────

/// Errors that can occur while building an indicator for a task.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FactoryError {
    #[error("Unknown indicator: {0}")]
    UnknownIndicator(String),
    #[error("Unknown parameter '{param}' for indicator {indicator}")]
    UnknownParameter { indicator: String, param: String },
    #[error("Invalid value {value} for {indicator}.{param}: {reason}")]
    InvalidParameter {
        indicator: String,
        param: String,
        value: String,
        reason: &'static str,
    },
    #[error("Indicator {indicator} has no line named '{line}'")]
    UnknownLine { indicator: String, line: String },
}

// ─── Declarations ────────────────────────────────────────────────────

/// Largest bar count accepted for `Period` and `Offset` parameters.
///
/// Rolling windows allocate their full capacity up front.
pub const MAX_LOOKBACK: i64 = 100_000;

/// Accepted value domain for a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Integer bar count in `1..=MAX_LOOKBACK`.
    Period,
    /// Integer bar count in `0..=MAX_LOOKBACK`.
    Offset,
    /// Finite number > 0.
    Positive,
}

#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub default: ParamValue,
}

const fn period(name: &'static str, default: i64) -> ParamSpec {
    ParamSpec {
        name,
        kind: ParamKind::Period,
        default: ParamValue::Int(default),
    }
}

const fn positive(name: &'static str, default: f64) -> ParamSpec {
    ParamSpec {
        name,
        kind: ParamKind::Positive,
        default: ParamValue::Float(default),
    }
}

/// Signal rule with line names, resolved per built instance.
#[derive(Debug, Clone, Copy)]
pub enum RuleTemplate {
    Threshold {
        line: &'static str,
        buy_below: f64,
        sell_above: f64,
    },
    Cross {
        fast: &'static str,
        slow: &'static str,
    },
    Band {
        line: &'static str,
    },
    Line,
}

impl RuleTemplate {
    pub fn resolve(&self, indicator: &dyn Indicator) -> Result<SignalRule, FactoryError> {
        let find = |line: &str| {
            indicator
                .lines()
                .iter()
                .position(|l| *l == line)
                .ok_or_else(|| FactoryError::UnknownLine {
                    indicator: indicator.name().to_string(),
                    line: line.to_string(),
                })
        };
        Ok(match *self {
            RuleTemplate::Threshold {
                line,
                buy_below,
                sell_above,
            } => SignalRule::OscillatorThreshold {
                line: find(line)?,
                buy_below,
                sell_above,
            },
            RuleTemplate::Cross { fast, slow } => SignalRule::DualLineCross {
                fast: find(fast)?,
                slow: find(slow)?,
            },
            RuleTemplate::Band { line } => SignalRule::PriceVsBand { line: find(line)? },
            RuleTemplate::Line => SignalRule::PriceVsLine,
        })
    }
}

/// Validated parameter values handed to a constructor.
#[derive(Debug, Clone)]
pub struct ResolvedParams {
    values: Vec<(&'static str, ParamValue)>,
}

impl ResolvedParams {
    fn value(&self, name: &str) -> ParamValue {
        self.values
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| *v)
            .unwrap_or(ParamValue::Int(0))
    }

    pub fn usize(&self, name: &str) -> usize {
        self.value(name).as_int().map(|v| v.max(0) as usize).unwrap_or(0)
    }

    pub fn f64(&self, name: &str) -> f64 {
        self.value(name).as_f64()
    }
}

type BuildFn = fn(&ResolvedParams) -> Box<dyn Indicator>;

/// Everything the registry knows about one indicator.
#[derive(Debug, Clone, Copy)]
pub struct IndicatorSpec {
    pub name: &'static str,
    pub params: &'static [ParamSpec],
    pub rule: RuleTemplate,
    build: BuildFn,
}

impl IndicatorSpec {
    /// Validate `params` and fill defaults.
    pub fn resolve_params(&self, params: &ParameterSet) -> Result<ResolvedParams, FactoryError> {
        for (name, _) in params.iter() {
            if !self.params.iter().any(|p| p.name == name) {
                return Err(FactoryError::UnknownParameter {
                    indicator: self.name.to_string(),
                    param: name.to_string(),
                });
            }
        }
        let mut values = Vec::with_capacity(self.params.len());
        for spec in self.params {
            let value = params.get(spec.name).unwrap_or(spec.default);
            self.check(spec, value)?;
            values.push((spec.name, value));
        }
        Ok(ResolvedParams { values })
    }

    fn check(&self, spec: &ParamSpec, value: ParamValue) -> Result<(), FactoryError> {
        let reason = match (spec.kind, value) {
            (ParamKind::Period | ParamKind::Offset, ParamValue::Int(v)) if v > MAX_LOOKBACK => {
                Some("exceeds the maximum lookback of 100000 bars")
            }
            (ParamKind::Period, ParamValue::Int(v)) if v >= 1 => None,
            (ParamKind::Period, ParamValue::Int(_)) => Some("must be >= 1"),
            (ParamKind::Offset, ParamValue::Int(v)) if v >= 0 => None,
            (ParamKind::Offset, ParamValue::Int(_)) => Some("must be >= 0"),
            (ParamKind::Period | ParamKind::Offset, ParamValue::Float(_)) => {
                Some("must be an integer")
            }
            (ParamKind::Positive, v) if v.as_f64().is_finite() && v.as_f64() > 0.0 => None,
            (ParamKind::Positive, _) => Some("must be a finite number > 0"),
        };
        match reason {
            None => Ok(()),
            Some(reason) => Err(FactoryError::InvalidParameter {
                indicator: self.name.to_string(),
                param: spec.name.to_string(),
                value: value.to_string(),
                reason,
            }),
        }
    }

    /// Parameter set holding every default, in declaration order.
    pub fn defaults(&self) -> ParameterSet {
        ParameterSet::from_pairs(self.params.iter().map(|p| (p.name, p.default)))
    }
}

// ─── Registry ────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct IndicatorRegistry {
    specs: Vec<IndicatorSpec>,
}

impl IndicatorRegistry {
    /// The fifteen built-in indicators.
    pub fn standard() -> Self {
        Self {
            specs: STANDARD.to_vec(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&IndicatorSpec> {
        self.specs.iter().find(|s| s.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.specs.iter().map(|s| s.name)
    }

    /// Construct a fresh indicator instance.
    pub fn build(
        &self,
        name: &str,
        params: &ParameterSet,
    ) -> Result<Box<dyn Indicator>, FactoryError> {
        let spec = self
            .get(name)
            .ok_or_else(|| FactoryError::UnknownIndicator(name.to_string()))?;
        let resolved = spec.resolve_params(params)?;
        Ok((spec.build)(&resolved))
    }

    /// Construct an indicator together with its resolved signal rule.
    pub fn build_leg(&self, name: &str, params: &ParameterSet) -> Result<SignalLeg, FactoryError> {
        let spec = self
            .get(name)
            .ok_or_else(|| FactoryError::UnknownIndicator(name.to_string()))?;
        let indicator = (spec.build)(&spec.resolve_params(params)?);
        let rule = spec.rule.resolve(indicator.as_ref())?;
        Ok(SignalLeg::new(indicator, rule))
    }
}

impl Default for IndicatorRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

const STANDARD: [IndicatorSpec; 15] = [
    IndicatorSpec {
        name: "EMA",
        params: &[period("period", 30)],
        rule: RuleTemplate::Line,
        build: |p| Box::new(Ema::new(p.usize("period"))),
    },
    IndicatorSpec {
        name: "MACD",
        params: &[
            period("period_me1", 12),
            period("period_me2", 26),
            period("period_signal", 9),
        ],
        rule: RuleTemplate::Cross {
            fast: "macd",
            slow: "signal",
        },
        build: |p| {
            Box::new(Macd::new(
                p.usize("period_me1"),
                p.usize("period_me2"),
                p.usize("period_signal"),
            ))
        },
    },
    IndicatorSpec {
        name: "ADX",
        params: &[period("period", 14)],
        rule: RuleTemplate::Line,
        build: |p| Box::new(Adx::new(p.usize("period"))),
    },
    IndicatorSpec {
        name: "Supertrend",
        params: &[period("period", 7), positive("multiplier", 3.0)],
        rule: RuleTemplate::Band { line: "supertrend" },
        build: |p| Box::new(Supertrend::new(p.usize("period"), p.f64("multiplier"))),
    },
    IndicatorSpec {
        name: "RSI",
        params: &[period("period", 14)],
        rule: RuleTemplate::Threshold {
            line: "rsi",
            buy_below: 30.0,
            sell_above: 70.0,
        },
        build: |p| Box::new(Rsi::new(p.usize("period"))),
    },
    IndicatorSpec {
        name: "Stochastic",
        params: &[
            period("period", 14),
            period("period_dfast", 3),
            period("period_dslow", 3),
        ],
        rule: RuleTemplate::Threshold {
            line: "percK",
            buy_below: 20.0,
            sell_above: 80.0,
        },
        build: |p| {
            Box::new(Stochastic::new(
                p.usize("period"),
                p.usize("period_dfast"),
                p.usize("period_dslow"),
            ))
        },
    },
    IndicatorSpec {
        name: "CCI",
        params: &[period("period", 20), positive("factor", 0.015)],
        rule: RuleTemplate::Threshold {
            line: "cci",
            buy_below: -100.0,
            sell_above: 100.0,
        },
        build: |p| Box::new(Cci::new(p.usize("period"), p.f64("factor"))),
    },
    IndicatorSpec {
        name: "WilliamsR",
        params: &[period("period", 14)],
        rule: RuleTemplate::Threshold {
            line: "percR",
            buy_below: -80.0,
            sell_above: -20.0,
        },
        build: |p| Box::new(WilliamsR::new(p.usize("period"))),
    },
    IndicatorSpec {
        name: "BollingerBands",
        params: &[period("period", 20), positive("devfactor", 2.0)],
        rule: RuleTemplate::Line,
        build: |p| Box::new(BollingerBands::new(p.usize("period"), p.f64("devfactor"))),
    },
    IndicatorSpec {
        name: "ATR",
        params: &[period("period", 14)],
        rule: RuleTemplate::Line,
        build: |p| Box::new(Atr::new(p.usize("period"))),
    },
    IndicatorSpec {
        name: "OnBalanceVolume",
        params: &[],
        rule: RuleTemplate::Line,
        build: |_| Box::new(OnBalanceVolume::new()),
    },
    IndicatorSpec {
        name: "VWAP",
        params: &[],
        rule: RuleTemplate::Band { line: "vwap" },
        build: |_| Box::new(Vwap::new()),
    },
    IndicatorSpec {
        name: "Ichimoku",
        params: &[
            period("tenkan", 9),
            period("kijun", 26),
            period("senkou", 52),
            ParamSpec {
                name: "senkou_lead",
                kind: ParamKind::Offset,
                default: ParamValue::Int(26),
            },
        ],
        rule: RuleTemplate::Line,
        build: |p| {
            Box::new(Ichimoku::new(
                p.usize("tenkan"),
                p.usize("kijun"),
                p.usize("senkou"),
                p.usize("senkou_lead"),
            ))
        },
    },
    IndicatorSpec {
        name: "FibonacciPivotPoint",
        params: &[
            positive("level1", 0.382),
            positive("level2", 0.618),
            positive("level3", 1.0),
        ],
        rule: RuleTemplate::Line,
        build: |p| {
            Box::new(FibonacciPivotPoint::new(
                p.f64("level1"),
                p.f64("level2"),
                p.f64("level3"),
            ))
        },
    },
    IndicatorSpec {
        name: "PivotPoint",
        params: &[],
        rule: RuleTemplate::Line,
        build: |_| Box::new(PivotPoint::new()),
    },
];
