//! Parameter values and ordered parameter sets.

use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// A single configurable knob value.
///
/// Integers and floats are kept apart so `period = 14` and `multiplier = 2.0`
/// round-trip through TOML and render the same way in report filenames.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
}

impl ParamValue {
    pub fn as_f64(&self) -> f64 {
        match *self {
            ParamValue::Int(v) => v as f64,
            ParamValue::Float(v) => v,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match *self {
            ParamValue::Int(v) => Some(v),
            ParamValue::Float(_) => None,
        }
    }
}

impl fmt::Display for ParamValue {
    /// Integers print bare; integral floats keep one decimal (`2.0`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ParamValue::Int(v) => write!(f, "{v}"),
            ParamValue::Float(v) if v.is_finite() && v.fract() == 0.0 => write!(f, "{v:.1}"),
            ParamValue::Float(v) => write!(f, "{v}"),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

/// One concrete assignment of values to an indicator's parameters.
///
/// Insertion order is preserved: it is the order the grid declared the
/// parameters in, and it drives report filenames.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSet {
    entries: Vec<(String, ParamValue)>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ParamValue>,
    {
        let mut set = Self::new();
        for (k, v) in pairs {
            set.insert(k, v);
        }
        set
    }

    /// Insert or replace a value. Replacing keeps the original position.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<ParamValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Same names with numerically equal values, ignoring order and the
    /// Int/Float distinction (`14` matches `14.0`).
    pub fn same_values(&self, other: &ParameterSet) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(k, v)| other.get(k).is_some_and(|o| o.as_f64() == v.as_f64()))
    }

    /// Filename fragment: values joined by `_`, or `default` when empty.
    pub fn slug(&self) -> String {
        if self.entries.is_empty() {
            return "default".to_string();
        }
        self.entries
            .iter()
            .map(|(_, v)| v.to_string())
            .collect::<Vec<_>>()
            .join("_")
    }
}

impl fmt::Display for ParameterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.entries.is_empty() {
            return write!(f, "default");
        }
        for (i, (k, v)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{k}={v}")?;
        }
        Ok(())
    }
}

impl Serialize for ParameterSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_values_is_numeric_and_order_free() {
        let a = ParameterSet::from_pairs([
            ("period", ParamValue::Int(14)),
            ("devfactor", ParamValue::Float(2.0)),
        ]);
        let b = ParameterSet::from_pairs([
            ("devfactor", ParamValue::Int(2)),
            ("period", ParamValue::Float(14.0)),
        ]);
        assert!(a.same_values(&b));
        assert_ne!(a, b);

        let c = ParameterSet::from_pairs([("period", ParamValue::Int(14))]);
        assert!(!a.same_values(&c));
        assert!(!c.same_values(&a));
        let d = ParameterSet::from_pairs([("period", ParamValue::Float(14.5))]);
        assert!(!c.same_values(&d));
        assert!(ParameterSet::new().same_values(&ParameterSet::new()));
    }

    #[test]
    fn display_keeps_float_decimal() {
        assert_eq!(ParamValue::Int(14).to_string(), "14");
        assert_eq!(ParamValue::Float(2.0).to_string(), "2.0");
        assert_eq!(ParamValue::Float(2.5).to_string(), "2.5");
        assert_eq!(ParamValue::Float(0.382).to_string(), "0.382");
    }

    #[test]
    fn slug_joins_values_in_order() {
        let set = ParameterSet::from_pairs([
            ("period", ParamValue::Int(7)),
            ("multiplier", ParamValue::Float(3.0)),
        ]);
        assert_eq!(set.slug(), "7_3.0");
        assert_eq!(ParameterSet::new().slug(), "default");
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut set = ParameterSet::from_pairs([("a", 1_i64), ("b", 2_i64)]);
        set.insert("a", 5_i64);
        let names: Vec<&str> = set.names().collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(set.get("a"), Some(ParamValue::Int(5)));
    }

    #[test]
    fn equality_is_order_sensitive_on_values() {
        let a = ParameterSet::from_pairs([("period", 14_i64)]);
        let b = ParameterSet::from_pairs([("period", 14_i64)]);
        let c = ParameterSet::from_pairs([("period", 21_i64)]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn serializes_as_ordered_map() {
        let set = ParameterSet::from_pairs([
            ("period", ParamValue::Int(20)),
            ("devfactor", ParamValue::Float(2.5)),
        ]);
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"{"period":20,"devfactor":2.5}"#);
    }
}
