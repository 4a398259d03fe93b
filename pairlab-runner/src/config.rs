//! Sweep configuration, loaded from TOML.
//!
//! ```toml
//! indicators = ["EMA", "RSI", "VWAP"]
//!
//! [paths]
//! raw = "data/raw"
//! processed = "data/processed"
//! reports = "reports"
//!
//! [broker]
//! initial_cash = 100000.0
//! commission = 0.002
//! stake = 1.0
//!
//! [scheduler]
//! workers = 4
//! task_timeout_secs = 60
//!
//! [grid.EMA]
//! period = [20, 50, 200]
//! ```
//!
//! Every section is optional. A `[grid]` table, when present, replaces the
//! reference grid as a whole; indicators it leaves out run with their defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use pairlab_core::domain::ParamValue;
use pairlab_core::engine::{SimulationConfig, SimulationError};
use pairlab_core::grid::{GridConfig, ParamGrid};
use pairlab_core::registry::IndicatorRegistry;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid broker settings: {0}")]
    Broker(#[from] SimulationError),

    #[error("invalid scheduler settings: {0}")]
    Scheduler(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    pub raw: PathBuf,
    pub processed: PathBuf,
    pub reports: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            raw: PathBuf::from("data/raw"),
            processed: PathBuf::from("data/processed"),
            reports: PathBuf::from("reports"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BrokerConfig {
    pub initial_cash: f64,
    /// Fraction of traded value charged per fill.
    pub commission: f64,
    /// Units bought per entry order.
    pub stake: f64,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        let sim = SimulationConfig::default();
        Self {
            initial_cash: sim.initial_cash,
            commission: sim.commission,
            stake: sim.stake,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchedulerConfig {
    /// Worker threads. `None` means available parallelism minus one.
    pub workers: Option<usize>,
    /// Per-task wall-clock budget, checked while the simulator walks bars.
    pub task_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SweepConfig {
    pub paths: PathsConfig,
    pub broker: BrokerConfig,
    pub scheduler: SchedulerConfig,
    /// Indicator names to pair, in pairing order. Repeats are kept.
    pub indicators: Vec<String>,
    pub grid: GridConfig,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            paths: PathsConfig::default(),
            broker: BrokerConfig::default(),
            scheduler: SchedulerConfig::default(),
            indicators: IndicatorRegistry::standard()
                .names()
                .map(str::to_string)
                .collect(),
            grid: default_grid(),
        }
    }
}

impl SweepConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` when given, otherwise the built-in reference configuration.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.simulation().validate()?;
        if self.scheduler.workers == Some(0) {
            return Err(ConfigError::Scheduler("workers must be >= 1".into()));
        }
        if self.scheduler.task_timeout_secs == Some(0) {
            return Err(ConfigError::Scheduler(
                "task_timeout_secs must be >= 1".into(),
            ));
        }
        Ok(())
    }

    /// Simulator settings for every task of the sweep.
    pub fn simulation(&self) -> SimulationConfig {
        SimulationConfig {
            initial_cash: self.broker.initial_cash,
            commission: self.broker.commission,
            stake: self.broker.stake,
            time_limit: self.scheduler.task_timeout_secs.map(Duration::from_secs),
        }
    }

    /// Configured names the registry does not know. Their tasks fail one by one
    /// at build time; callers may want to warn up front.
    pub fn unknown_indicators<'a>(&'a self, registry: &IndicatorRegistry) -> Vec<&'a str> {
        self.indicators
            .iter()
            .map(String::as_str)
            .filter(|name| !registry.contains(name))
            .collect()
    }
}

fn ints(values: &[i64]) -> Vec<ParamValue> {
    values.iter().map(|&v| ParamValue::Int(v)).collect()
}

fn floats(values: &[f64]) -> Vec<ParamValue> {
    values.iter().map(|&v| ParamValue::Float(v)).collect()
}

/// The reference parameter grid.
pub fn default_grid() -> GridConfig {
    GridConfig::new()
        .with("EMA", ParamGrid::new().with("period", ints(&[20, 50, 200])))
        .with(
            "MACD",
            ParamGrid::new()
                .with("period_me1", ints(&[12]))
                .with("period_me2", ints(&[26]))
                .with("period_signal", ints(&[9])),
        )
        .with("ADX", ParamGrid::new().with("period", ints(&[14, 20])))
        .with(
            "Supertrend",
            ParamGrid::new()
                .with("period", ints(&[7, 14]))
                .with("multiplier", floats(&[2.0, 3.0])),
        )
        .with("RSI", ParamGrid::new().with("period", ints(&[14, 21])))
        .with(
            "Stochastic",
            ParamGrid::new()
                .with("period", ints(&[14]))
                .with("period_dfast", ints(&[3]))
                .with("period_dslow", ints(&[3])),
        )
        .with("CCI", ParamGrid::new().with("period", ints(&[14, 20, 30])))
        .with("WilliamsR", ParamGrid::new().with("period", ints(&[14, 28])))
        .with(
            "BollingerBands",
            ParamGrid::new()
                .with("period", ints(&[20, 30]))
                .with("devfactor", floats(&[2.0, 2.5])),
        )
        .with("ATR", ParamGrid::new().with("period", ints(&[14, 20])))
        .with(
            "Ichimoku",
            ParamGrid::new()
                .with("tenkan", ints(&[9]))
                .with("kijun", ints(&[26]))
                .with("senkou", ints(&[52])),
        )
}
