//! Parameter grids: candidate values per indicator parameter and their
//! Cartesian product.
//!
//! The product order is deterministic: parameters are varied odometer-style,
//! the first declared parameter slowest and the last fastest, and each
//! parameter's values appear in the order they were listed.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

use crate::domain::{ParamValue, ParameterSet};

/// Candidate values for each parameter of one indicator, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamGrid {
    params: Vec<(String, Vec<ParamValue>)>,
}

impl ParamGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style append. A repeated name replaces the earlier values in place.
    pub fn with(mut self, name: impl Into<String>, values: Vec<ParamValue>) -> Self {
        self.insert(name, values);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, values: Vec<ParamValue>) {
        let name = name.into();
        match self.params.iter_mut().find(|(k, _)| *k == name) {
            Some(entry) => entry.1 = values,
            None => self.params.push((name, values)),
        }
    }

    pub fn params(&self) -> impl Iterator<Item = (&str, &[ParamValue])> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Number of combinations this grid yields.
    pub fn size(&self) -> usize {
        self.params.iter().map(|(_, v)| v.len()).product()
    }

    pub fn combinations(&self) -> Combinations<'_> {
        Combinations::new(&self.params)
    }
}

/// Grids keyed by indicator name, in configuration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridConfig {
    grids: Vec<(String, ParamGrid)>,
}

impl GridConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, indicator: impl Into<String>, grid: ParamGrid) -> Self {
        self.insert(indicator, grid);
        self
    }

    pub fn insert(&mut self, indicator: impl Into<String>, grid: ParamGrid) {
        let indicator = indicator.into();
        match self.grids.iter_mut().find(|(k, _)| *k == indicator) {
            Some(entry) => entry.1 = grid,
            None => self.grids.push((indicator, grid)),
        }
    }

    pub fn get(&self, indicator: &str) -> Option<&ParamGrid> {
        self.grids
            .iter()
            .find(|(k, _)| k == indicator)
            .map(|(_, g)| g)
    }

    pub fn indicators(&self) -> impl Iterator<Item = &str> {
        self.grids.iter().map(|(k, _)| k.as_str())
    }

    /// Every parameter combination for `indicator`.
    ///
    /// An indicator without a grid (or with an empty one) yields exactly one
    /// empty `ParameterSet`, meaning "all defaults".
    pub fn combinations(&self, indicator: &str) -> Combinations<'_> {
        match self.get(indicator) {
            Some(grid) => grid.combinations(),
            None => Combinations::new(&[]),
        }
    }

    /// Number of combinations `combinations(indicator)` yields.
    pub fn size(&self, indicator: &str) -> usize {
        self.get(indicator).map_or(1, ParamGrid::size)
    }
}

/// Lazy odometer over a grid's Cartesian product.
#[derive(Debug, Clone)]
pub struct Combinations<'a> {
    params: &'a [(String, Vec<ParamValue>)],
    cursor: Vec<usize>,
    done: bool,
}

impl<'a> Combinations<'a> {
    fn new(params: &'a [(String, Vec<ParamValue>)]) -> Self {
        Self {
            params,
            cursor: vec![0; params.len()],
            done: params.iter().any(|(_, v)| v.is_empty()),
        }
    }
}

impl Iterator for Combinations<'_> {
    type Item = ParameterSet;

    fn next(&mut self) -> Option<ParameterSet> {
        if self.done {
            return None;
        }
        let set = ParameterSet::from_pairs(
            self.params
                .iter()
                .zip(&self.cursor)
                .map(|((name, values), &i)| (name.as_str(), values[i])),
        );

        // Advance: last parameter fastest.
        self.done = true;
        for pos in (0..self.cursor.len()).rev() {
            self.cursor[pos] += 1;
            if self.cursor[pos] < self.params[pos].1.len() {
                self.done = false;
                break;
            }
            self.cursor[pos] = 0;
        }
        Some(set)
    }
}

// ─── Deserialization (keeps document order) ──────────────────────────

/// A grid entry may be a single value or a list of candidates.
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(ParamValue),
    Many(Vec<ParamValue>),
}

impl From<OneOrMany> for Vec<ParamValue> {
    fn from(v: OneOrMany) -> Self {
        match v {
            OneOrMany::One(x) => vec![x],
            OneOrMany::Many(xs) => xs,
        }
    }
}

impl<'de> Deserialize<'de> for ParamGrid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct GridVisitor;

        impl<'de> Visitor<'de> for GridVisitor {
            type Value = ParamGrid;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a table of parameter name to candidate values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<ParamGrid, A::Error> {
                let mut grid = ParamGrid::new();
                while let Some((name, values)) = map.next_entry::<String, OneOrMany>()? {
                    grid.insert(name, values.into());
                }
                Ok(grid)
            }
        }

        deserializer.deserialize_map(GridVisitor)
    }
}

impl<'de> Deserialize<'de> for GridConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ConfigVisitor;

        impl<'de> Visitor<'de> for ConfigVisitor {
            type Value = GridConfig;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a table of indicator name to parameter grid")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<GridConfig, A::Error> {
                let mut config = GridConfig::new();
                while let Some((name, grid)) = map.next_entry::<String, ParamGrid>()? {
                    config.insert(name, grid);
                }
                Ok(config)
            }
        }

        deserializer.deserialize_map(ConfigVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(vs: &[i64]) -> Vec<ParamValue> {
        vs.iter().map(|&v| ParamValue::Int(v)).collect()
    }

    #[test]
    fn single_parameter_in_listed_order() {
        let config = GridConfig::new().with("RSI", ParamGrid::new().with("period", ints(&[14, 21])));
        let sets: Vec<ParameterSet> = config.combinations("RSI").collect();
        assert_eq!(
            sets,
            vec![
                ParameterSet::from_pairs([("period", 14_i64)]),
                ParameterSet::from_pairs([("period", 21_i64)]),
            ]
        );
    }

    #[test]
    fn repeated_enumeration_is_identical() {
        let config = GridConfig::new().with(
            "Supertrend",
            ParamGrid::new()
                .with("period", ints(&[7, 14]))
                .with("multiplier", vec![ParamValue::Float(2.0), ParamValue::Float(3.0)]),
        );
        let first: Vec<_> = config.combinations("Supertrend").collect();
        let second: Vec<_> = config.combinations("Supertrend").collect();
        assert_eq!(first, second);
    }

    #[test]
    fn first_parameter_varies_slowest() {
        let grid = ParamGrid::new()
            .with("period", ints(&[7, 14]))
            .with("multiplier", vec![ParamValue::Float(2.0), ParamValue::Float(3.0)]);
        let slugs: Vec<String> = grid.combinations().map(|s| s.slug()).collect();
        assert_eq!(slugs, vec!["7_2.0", "7_3.0", "14_2.0", "14_3.0"]);
        assert_eq!(grid.size(), 4);
    }

    #[test]
    fn absent_grid_yields_one_empty_set() {
        let config = GridConfig::new();
        let sets: Vec<_> = config.combinations("VWAP").collect();
        assert_eq!(sets, vec![ParameterSet::new()]);
        assert_eq!(config.size("VWAP"), 1);
    }

    #[test]
    fn empty_grid_yields_one_empty_set() {
        let config = GridConfig::new().with("OnBalanceVolume", ParamGrid::new());
        assert_eq!(config.combinations("OnBalanceVolume").count(), 1);
    }

    #[test]
    fn empty_candidate_list_yields_nothing() {
        let grid = ParamGrid::new()
            .with("period", ints(&[14]))
            .with("factor", vec![]);
        assert_eq!(grid.combinations().count(), 0);
        assert_eq!(grid.size(), 0);
    }

    #[test]
    fn iterator_is_cloneable_mid_stream() {
        let grid = ParamGrid::new().with("period", ints(&[1, 2, 3]));
        let mut it = grid.combinations();
        it.next();
        let rest: Vec<_> = it.clone().collect();
        assert_eq!(rest.len(), 2);
        assert_eq!(it.count(), 2);
    }

    #[test]
    fn deserializes_preserving_document_order() {
        let json = r#"{
            "Supertrend": { "period": [7, 14], "multiplier": [2.0, 3.0] },
            "ADX": { "period": 14 }
        }"#;
        let config: GridConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.indicators().collect::<Vec<_>>(), vec!["Supertrend", "ADX"]);
        let names: Vec<&str> = config
            .get("Supertrend")
            .unwrap()
            .params()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(names, vec!["period", "multiplier"]);
        assert_eq!(config.size("ADX"), 1);
    }
}
