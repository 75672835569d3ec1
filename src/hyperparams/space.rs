//! Declarative hyperparameter search spaces
//!
//! A [`SearchSpace`] is a weighted choice between [`Branch`]es; each branch maps
//! parameter names to a [`Distribution`]. Sampling picks one branch, draws every
//! parameter in it independently, then normalizes the result (whole-number
//! floats become integers, `"default"` sentinels are dropped).

use super::{HyperParams, ParamValue};
use crate::error::{Result, SigboostError};
use rand::distributions::{Distribution as _, WeightedIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Prior over a single parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Distribution {
    /// Fixed value
    Const(ParamValue),
    /// Uniform real in `[low, high)`
    Uniform { low: f64, high: f64 },
    /// `round(U(low, high) / q) * q`
    QUniform { low: f64, high: f64, q: f64 },
    /// One of the listed values, equally likely
    Choice(Vec<ParamValue>),
}

impl Distribution {
    pub fn constant(value: impl Into<ParamValue>) -> Self {
        Distribution::Const(value.into())
    }

    pub fn uniform(low: f64, high: f64) -> Self {
        Distribution::Uniform { low, high }
    }

    pub fn quniform(low: f64, high: f64, q: f64) -> Self {
        Distribution::QUniform { low, high, q }
    }

    pub fn choice<V: Into<ParamValue>>(values: impl IntoIterator<Item = V>) -> Self {
        Distribution::Choice(values.into_iter().map(Into::into).collect())
    }

    fn validate(&self, name: &str) -> Result<()> {
        let invalid = |reason: &str| SigboostError::InvalidParameter {
            name: name.to_string(),
            value: format!("{:?}", self),
            reason: reason.to_string(),
        };
        match self {
            Distribution::Const(_) => Ok(()),
            Distribution::Uniform { low, high } => {
                if low.is_finite() && high.is_finite() && low < high {
                    Ok(())
                } else {
                    Err(invalid("uniform bounds must be finite with low < high"))
                }
            }
            Distribution::QUniform { low, high, q } => {
                if !(low.is_finite() && high.is_finite() && low < high) {
                    Err(invalid("quniform bounds must be finite with low < high"))
                } else if !(*q > 0.0) {
                    Err(invalid("quantization step must be positive"))
                } else {
                    Ok(())
                }
            }
            Distribution::Choice(values) => {
                if values.is_empty() {
                    Err(invalid("choice needs at least one option"))
                } else {
                    Ok(())
                }
            }
        }
    }

    /// Draw one value
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> ParamValue {
        match self {
            Distribution::Const(v) => v.clone(),
            Distribution::Uniform { low, high } => ParamValue::Float(rng.gen_range(*low..*high)),
            Distribution::QUniform { low, high, q } => {
                let raw = rng.gen_range(*low..*high);
                ParamValue::Float((raw / q).round() * q)
            }
            Distribution::Choice(values) => {
                let idx = rng.gen_range(0..values.len());
                values[idx].clone()
            }
        }
    }
}

/// One family of parameters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    params: BTreeMap<String, Distribution>,
}

impl Branch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, dist: Distribution) -> Self {
        self.params.insert(name.to_string(), dist);
        self
    }

    /// Copy of this branch overlaid with `other`; `other` wins on shared keys
    pub fn extended(&self, other: &Branch) -> Branch {
        let mut params = self.params.clone();
        params.extend(other.params.iter().map(|(k, v)| (k.clone(), v.clone())));
        Branch { params }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.params.keys().map(String::as_str)
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> HyperParams {
        self.params
            .iter()
            .map(|(name, dist)| (name.clone(), dist.sample(rng)))
            .collect()
    }
}

/// Weighted choice over branches
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchSpace {
    branches: Vec<(f64, Branch)>,
}

impl SearchSpace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a branch picked with probability proportional to `weight`
    pub fn branch(mut self, weight: f64, branch: Branch) -> Self {
        self.branches.push((weight, branch));
        self
    }

    pub fn branches(&self) -> impl Iterator<Item = &Branch> {
        self.branches.iter().map(|(_, b)| b)
    }

    /// Check that the space can be sampled
    pub fn validate(&self) -> Result<()> {
        if self.branches.is_empty() {
            return Err(SigboostError::ConfigError("search space has no branches".to_string()));
        }
        for (weight, branch) in &self.branches {
            if !(weight.is_finite() && *weight >= 0.0) {
                return Err(SigboostError::ConfigError(format!(
                    "branch weight must be finite and non-negative, got {}",
                    weight
                )));
            }
            for (name, dist) in &branch.params {
                dist.validate(name)?;
            }
        }
        Ok(())
    }

    /// Draw exactly one normalized parameter set
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<HyperParams> {
        self.validate()?;
        let weights = WeightedIndex::new(self.branches.iter().map(|(w, _)| *w))
            .map_err(|e| SigboostError::ConfigError(format!("invalid branch weights: {}", e)))?;
        let (_, branch) = &self.branches[weights.sample(rng)];
        Ok(branch.sample(rng).normalized())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    #[test]
    fn test_uniform_within_bounds() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(3);
        let d = Distribution::uniform(0.7, 1.0);
        for _ in 0..1000 {
            let v = d.sample(&mut rng).as_f64().unwrap();
            assert!((0.7..1.0).contains(&v));
        }
    }

    #[test]
    fn test_quniform_is_whole_after_normalizing() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(5);
        let space = SearchSpace::new().branch(1.0, Branch::new().with("max_depth", Distribution::quniform(3.0, 9.0, 1.0)));
        for _ in 0..200 {
            let hp = space.sample(&mut rng).unwrap();
            match hp.get("max_depth") {
                Some(ParamValue::Int(d)) => assert!((3..=9).contains(d)),
                other => panic!("expected integer depth, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_choice_covers_options() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(11);
        let d = Distribution::choice(["uniform", "weighted"]);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..100 {
            seen.insert(d.sample(&mut rng).to_string());
        }
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn test_zero_weight_branch_never_drawn() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);
        let space = SearchSpace::new()
            .branch(0.0, Branch::new().with("booster", Distribution::constant("dart")))
            .branch(1.0, Branch::new().with("booster", Distribution::constant("gbtree")));
        for _ in 0..50 {
            let hp = space.sample(&mut rng).unwrap();
            assert_eq!(hp.get("booster").and_then(ParamValue::as_str), Some("gbtree"));
        }
    }

    #[test]
    fn test_sentinel_dropped_from_sample() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);
        let space = SearchSpace::new().branch(
            1.0,
            Branch::new()
                .with("normalize_type", Distribution::constant("default"))
                .with("eta", Distribution::uniform(0.01, 0.1)),
        );
        let hp = space.sample(&mut rng).unwrap();
        assert!(!hp.contains_key("normalize_type"));
        assert!(hp.contains_key("eta"));
    }

    #[test]
    fn test_invalid_spaces() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);
        assert!(SearchSpace::new().sample(&mut rng).is_err());

        let bad = SearchSpace::new().branch(1.0, Branch::new().with("eta", Distribution::uniform(1.0, 0.5)));
        assert!(matches!(bad.sample(&mut rng), Err(SigboostError::InvalidParameter { .. })));

        let empty = SearchSpace::new().branch(1.0, Branch::new().with("st", Distribution::Choice(vec![])));
        assert!(empty.sample(&mut rng).is_err());
    }

    #[test]
    fn test_extended_overrides() {
        let base = Branch::new().with("booster", Distribution::constant("gbtree"));
        let ext = base.extended(&Branch::new().with("booster", Distribution::constant("dart")).with("rate_drop", Distribution::uniform(0.0, 0.3)));
        assert!(ext.contains("rate_drop"));
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);
        let hp = SearchSpace::new().branch(1.0, ext).sample(&mut rng).unwrap();
        assert_eq!(hp.get("booster").and_then(ParamValue::as_str), Some("dart"));
    }
}
