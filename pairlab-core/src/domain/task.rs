//! Task: one independent (instrument, indicator pair, parameter pair) backtest.

use std::fmt;

use serde::Serialize;

use super::params::ParameterSet;

/// Immutable unit of work. Tasks share nothing mutable with each other.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    pub instrument: String,
    pub indicator_a: String,
    pub indicator_b: String,
    pub params_a: ParameterSet,
    pub params_b: ParameterSet,
}

impl Task {
    pub fn new(
        instrument: impl Into<String>,
        indicator_a: impl Into<String>,
        indicator_b: impl Into<String>,
        params_a: ParameterSet,
        params_b: ParameterSet,
    ) -> Self {
        Self {
            instrument: instrument.into(),
            indicator_a: indicator_a.into(),
            indicator_b: indicator_b.into(),
            params_a,
            params_b,
        }
    }

    /// `report_{A}_{paramsA}_{B}_{paramsB}`, unique per task within an instrument.
    pub fn report_stem(&self) -> String {
        format!(
            "report_{}_{}_{}_{}",
            self.indicator_a,
            self.params_a.slug(),
            self.indicator_b,
            self.params_b.slug()
        )
    }

    /// Canonical text form, stable across runs.
    pub fn canonical(&self) -> String {
        format!(
            "{}|{}|{}|{}|{}",
            self.instrument, self.indicator_a, self.params_a, self.indicator_b, self.params_b
        )
    }

    /// BLAKE3 hex digest of the canonical form.
    pub fn fingerprint(&self) -> String {
        blake3::hash(self.canonical().as_bytes()).to_hex().to_string()
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}/{}",
            self.instrument, self.indicator_a, self.indicator_b
        )
    }
}
