//! Hyperparameter sets: fixed presets and random draws from a search space
//!
//! A [`HyperParams`] is a flat, ordered mapping from parameter name to a scalar
//! [`ParamValue`]. It is built once per run and handed to the trainer, which
//! works on its own copy.

pub mod presets;
pub mod space;

pub use presets::{default_config, random_config, xgb_search_space};
pub use space::{Branch, Distribution, SearchSpace};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Sentinel value meaning "leave this parameter at the trainer's default"
pub const DEFAULT_SENTINEL: &str = "default";

/// A single hyperparameter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
    Str(String),
}

impl ParamValue {
    /// Numeric view of the value (strings are not numeric)
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Int(v) => Some(*v as f64),
            ParamValue::Float(v) => Some(*v),
            ParamValue::Str(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Whole-number floats become integers; everything else is unchanged
    pub fn coerce_integral(self) -> Self {
        match self {
            ParamValue::Float(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64 => {
                ParamValue::Int(v as i64)
            }
            other => other,
        }
    }

    pub fn is_default_sentinel(&self) -> bool {
        matches!(self, ParamValue::Str(s) if s == DEFAULT_SENTINEL)
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(v) => write!(f, "{}", v),
            ParamValue::Float(v) => write!(f, "{}", v),
            ParamValue::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Str(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Str(v)
    }
}

/// Flat mapping from parameter name to value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HyperParams(BTreeMap<String, ParamValue>);

impl HyperParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: &str, value: impl Into<ParamValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<ParamValue>) -> Option<ParamValue> {
        self.0.insert(name.to_string(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.0.get(name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<ParamValue> {
        self.0.remove(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Flatten into `(name, value)` pairs; pairs may later repeat a name
    /// (e.g. several `eval_metric` entries).
    pub fn into_pairs(self) -> Vec<(String, ParamValue)> {
        self.0.into_iter().collect()
    }

    /// Coerce whole-number floats to integers and drop `"default"` sentinels
    pub fn normalized(self) -> Self {
        Self(
            self.0
                .into_iter()
                .map(|(k, v)| (k, v.coerce_integral()))
                .filter(|(_, v)| !v.is_default_sentinel())
                .collect(),
        )
    }
}

impl FromIterator<(String, ParamValue)> for HyperParams {
    fn from_iter<I: IntoIterator<Item = (String, ParamValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for HyperParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (k, v)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match v {
                ParamValue::Str(s) => write!(f, "'{}': '{}'", k, s)?,
                other => write!(f, "'{}': {}", k, other)?,
            }
        }
        write!(f, "}}")
    }
}
