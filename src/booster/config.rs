//! Booster parameters parsed from a flat `(name, value)` list

use super::metrics::EvalMetric;
use crate::error::{Result, SigboostError};
use crate::hyperparams::{HyperParams, ParamValue};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// The only supported learning objective
pub const BINARY_LOGISTIC: &str = "binary:logistic";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoosterType {
    /// Plain additive trees
    GbTree,
    /// Trees with dropout between rounds
    Dart,
}

/// How dart picks trees to drop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SampleType {
    Uniform,
    /// Drop probability proportional to the tree weight
    Weighted,
}

/// How dart rescales dropped and new trees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NormalizeType {
    Tree,
    Forest,
}

/// Parsed booster configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoosterConfig {
    pub booster: BoosterType,
    pub eta: f64,
    pub gamma: f64,
    pub min_child_weight: f64,
    pub max_depth: usize,
    pub subsample: f64,
    pub colsample_bytree: f64,
    pub reg_lambda: f64,
    pub reg_alpha: f64,
    pub seed: u64,
    /// Initial prediction as a probability; `None` uses the training label mean
    pub base_score: Option<f64>,
    pub sample_type: SampleType,
    pub normalize_type: NormalizeType,
    pub rate_drop: f64,
    pub skip_drop: f64,
    pub one_drop: bool,
    pub eval_metrics: Vec<EvalMetric>,
}

impl Default for BoosterConfig {
    fn default() -> Self {
        Self {
            booster: BoosterType::GbTree,
            eta: 0.3,
            gamma: 0.0,
            min_child_weight: 1.0,
            max_depth: 6,
            subsample: 1.0,
            colsample_bytree: 1.0,
            reg_lambda: 1.0,
            reg_alpha: 0.0,
            seed: 0,
            base_score: None,
            sample_type: SampleType::Uniform,
            normalize_type: NormalizeType::Tree,
            rate_drop: 0.0,
            skip_drop: 0.0,
            one_drop: false,
            eval_metrics: Vec::new(),
        }
    }
}

fn invalid(name: &str, value: &ParamValue, reason: &str) -> SigboostError {
    SigboostError::InvalidParameter {
        name: name.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Numbers may arrive as ints, floats or numeric strings
fn number(name: &str, value: &ParamValue) -> Result<f64> {
    let v = match value {
        ParamValue::Str(s) => s.trim().parse::<f64>().ok(),
        other => other.as_f64(),
    };
    v.filter(|v| v.is_finite()).ok_or_else(|| invalid(name, value, "expected a finite number"))
}

fn in_range(name: &str, value: &ParamValue, low: f64, high: f64, low_inclusive: bool) -> Result<f64> {
    let v = number(name, value)?;
    let above = if low_inclusive { v >= low } else { v > low };
    if above && v <= high {
        Ok(v)
    } else {
        let open = if low_inclusive { "[" } else { "(" };
        Err(invalid(name, value, &format!("must be in {}{}, {}]", open, low, high)))
    }
}

fn non_negative(name: &str, value: &ParamValue) -> Result<f64> {
    in_range(name, value, 0.0, f64::MAX, true)
}

fn whole(name: &str, value: &ParamValue) -> Result<u64> {
    let v = number(name, value)?;
    if v < 0.0 || v.fract() != 0.0 {
        return Err(invalid(name, value, "must be a non-negative integer"));
    }
    Ok(v as u64)
}

fn text<'a>(name: &str, value: &'a ParamValue) -> Result<&'a str> {
    value.as_str().ok_or_else(|| invalid(name, value, "expected a string"))
}

impl BoosterConfig {
    /// Parse from a parameter set
    pub fn from_params(params: &HyperParams) -> Result<Self> {
        let pairs: Vec<(String, ParamValue)> = params.clone().into_pairs();
        Self::from_pairs(&pairs)
    }

    /// Parse from `(name, value)` pairs. Later pairs override earlier ones,
    /// except `eval_metric`, which accumulates.
    pub fn from_pairs(pairs: &[(String, ParamValue)]) -> Result<Self> {
        let mut config = Self::default();

        for (name, value) in pairs {
            match name.as_str() {
                "booster" => {
                    config.booster = match text(name, value)? {
                        "gbtree" => BoosterType::GbTree,
                        "dart" => BoosterType::Dart,
                        _ => return Err(invalid(name, value, "expected 'gbtree' or 'dart'")),
                    }
                }
                "eta" | "learning_rate" => config.eta = non_negative(name, value)?,
                "gamma" | "min_split_loss" => config.gamma = non_negative(name, value)?,
                "min_child_weight" => config.min_child_weight = non_negative(name, value)?,
                "max_depth" => {
                    let depth = whole(name, value)?;
                    if depth == 0 {
                        return Err(invalid(name, value, "must be at least 1"));
                    }
                    config.max_depth = depth as usize;
                }
                "subsample" => config.subsample = in_range(name, value, 0.0, 1.0, false)?,
                "colsample_bytree" => config.colsample_bytree = in_range(name, value, 0.0, 1.0, false)?,
                "lambda" | "reg_lambda" => config.reg_lambda = non_negative(name, value)?,
                "alpha" | "reg_alpha" => config.reg_alpha = non_negative(name, value)?,
                "seed" | "random_state" => config.seed = whole(name, value)?,
                "base_score" => config.base_score = Some(in_range(name, value, 0.0, 1.0, false)?),
                "objective" => {
                    if text(name, value)? != BINARY_LOGISTIC {
                        return Err(invalid(name, value, "only 'binary:logistic' is supported"));
                    }
                }
                "sample_type" => {
                    config.sample_type = match text(name, value)? {
                        "uniform" => SampleType::Uniform,
                        "weighted" => SampleType::Weighted,
                        _ => return Err(invalid(name, value, "expected 'uniform' or 'weighted'")),
                    }
                }
                "normalize_type" => {
                    config.normalize_type = match text(name, value)? {
                        "tree" => NormalizeType::Tree,
                        "forest" => NormalizeType::Forest,
                        _ => return Err(invalid(name, value, "expected 'tree' or 'forest'")),
                    }
                }
                "rate_drop" => config.rate_drop = in_range(name, value, 0.0, 1.0, true)?,
                "skip_drop" => config.skip_drop = in_range(name, value, 0.0, 1.0, true)?,
                "one_drop" => config.one_drop = whole(name, value)? != 0,
                "eval_metric" => {
                    let metric = EvalMetric::parse(text(name, value)?)
                        .ok_or_else(|| invalid(name, value, "unknown evaluation metric"))?;
                    if !config.eval_metrics.contains(&metric) {
                        config.eval_metrics.push(metric);
                    }
                }
                // Accepted for compatibility, no effect on training
                "silent" | "verbosity" | "nthread" | "n_jobs" => {
                    debug!(param = %name, value = %value, "ignoring parameter");
                }
                _ => warn!(param = %name, value = %value, "unknown booster parameter ignored"),
            }
        }

        Ok(config)
    }

    pub fn is_dart(&self) -> bool {
        self.booster == BoosterType::Dart
    }

    /// Metrics reported each round; log loss when none was requested
    pub fn metrics(&self) -> Vec<EvalMetric> {
        if self.eval_metrics.is_empty() {
            vec![EvalMetric::LogLoss]
        } else {
            self.eval_metrics.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hyperparams::default_config;

    fn pairs(items: &[(&str, ParamValue)]) -> Vec<(String, ParamValue)> {
        items.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn test_preset_parses() {
        let config = BoosterConfig::from_params(&default_config(true)).unwrap();
        assert_eq!(config.booster, BoosterType::GbTree);
        assert_eq!(config.max_depth, 8);
        assert!((config.gamma - 2.5).abs() < 1e-12);
        assert!((config.subsample - 0.75).abs() < 1e-12);
        assert!((config.min_child_weight - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_eval_metrics_accumulate_in_order() {
        let config = BoosterConfig::from_pairs(&pairs(&[
            ("eval_metric", "error@0.5".into()),
            ("eval_metric", "auc".into()),
        ]))
        .unwrap();
        assert_eq!(config.eval_metrics, vec![EvalMetric::Error(0.5), EvalMetric::Auc]);
        assert_eq!(BoosterConfig::default().metrics(), vec![EvalMetric::LogLoss]);
    }

    #[test]
    fn test_dart_parameters() {
        let config = BoosterConfig::from_pairs(&pairs(&[
            ("booster", "dart".into()),
            ("sample_type", "weighted".into()),
            ("normalize_type", "forest".into()),
            ("rate_drop", 0.1.into()),
            ("skip_drop", 0.2.into()),
        ]))
        .unwrap();
        assert!(config.is_dart());
        assert_eq!(config.sample_type, SampleType::Weighted);
        assert_eq!(config.normalize_type, NormalizeType::Forest);
    }

    #[test]
    fn test_invalid_values_rejected() {
        for bad in [
            pairs(&[("objective", "reg:squarederror".into())]),
            pairs(&[("subsample", 0.0.into())]),
            pairs(&[("max_depth", 0i64.into())]),
            pairs(&[("max_depth", 2.5.into())]),
            pairs(&[("eta", (-0.1).into())]),
            pairs(&[("rate_drop", 1.5.into())]),
            pairs(&[("booster", "gblinear".into())]),
            pairs(&[("eval_metric", "rmse".into())]),
        ] {
            assert!(
                matches!(BoosterConfig::from_pairs(&bad), Err(SigboostError::InvalidParameter { .. })),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_numeric_strings_and_unknown_keys() {
        let config = BoosterConfig::from_pairs(&pairs(&[
            ("eta", "0.05".into()),
            ("tree_method", "exact".into()),
        ]))
        .unwrap();
        assert!((config.eta - 0.05).abs() < 1e-12);
    }
}
