//! Evaluation metrics on predicted probabilities

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Metric reported on each watched set after every round
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EvalMetric {
    /// Fraction misclassified when predicting positive above the threshold
    Error(f64),
    /// Area under the ROC curve
    Auc,
    /// Negative log likelihood
    LogLoss,
}

impl EvalMetric {
    /// Parse `error`, `error@<t>`, `auc` or `logloss`
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "auc" => Some(EvalMetric::Auc),
            "logloss" => Some(EvalMetric::LogLoss),
            "error" => Some(EvalMetric::Error(0.5)),
            other => {
                let t: f64 = other.strip_prefix("error@")?.parse().ok()?;
                (t.is_finite()).then_some(EvalMetric::Error(t))
            }
        }
    }

    pub fn higher_is_better(&self) -> bool {
        matches!(self, EvalMetric::Auc)
    }

    /// Evaluate on probabilities `probs` against 0/1 `labels`
    pub fn evaluate(&self, probs: &Array1<f64>, labels: &Array1<f64>) -> f64 {
        match self {
            EvalMetric::Error(t) => classification_error(probs, labels, *t),
            EvalMetric::Auc => auc(probs, labels),
            EvalMetric::LogLoss => log_loss(probs, labels),
        }
    }
}

impl fmt::Display for EvalMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalMetric::Error(t) => write!(f, "error@{}", t),
            EvalMetric::Auc => write!(f, "auc"),
            EvalMetric::LogLoss => write!(f, "logloss"),
        }
    }
}

pub fn classification_error(probs: &Array1<f64>, labels: &Array1<f64>, threshold: f64) -> f64 {
    if probs.is_empty() {
        return 0.0;
    }
    let wrong = probs
        .iter()
        .zip(labels.iter())
        .filter(|(&p, &y)| (p > threshold) != (y > 0.5))
        .count();
    wrong as f64 / probs.len() as f64
}

/// Rank-based AUC with averaged ranks for tied scores. Returns 0.5 when only
/// one class is present.
pub fn auc(probs: &Array1<f64>, labels: &Array1<f64>) -> f64 {
    let n = probs.len();
    let n_pos = labels.iter().filter(|&&y| y > 0.5).count();
    let n_neg = n - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return 0.5;
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| probs[a].total_cmp(&probs[b]));

    let mut rank_sum_pos = 0.0;
    let mut i = 0;
    while i < n {
        let mut j = i + 1;
        while j < n && probs[order[j]] == probs[order[i]] {
            j += 1;
        }
        // 1-based ranks i+1..=j share their average
        let avg_rank = (i + 1 + j) as f64 / 2.0;
        let pos_in_group = order[i..j].iter().filter(|&&k| labels[k] > 0.5).count();
        rank_sum_pos += avg_rank * pos_in_group as f64;
        i = j;
    }

    let (p, q) = (n_pos as f64, n_neg as f64);
    (rank_sum_pos - p * (p + 1.0) / 2.0) / (p * q)
}

pub fn log_loss(probs: &Array1<f64>, labels: &Array1<f64>) -> f64 {
    if probs.is_empty() {
        return 0.0;
    }
    const EPS: f64 = 1e-16;
    let total: f64 = probs
        .iter()
        .zip(labels.iter())
        .map(|(&p, &y)| {
            let p = p.clamp(EPS, 1.0 - EPS);
            -(y * p.ln() + (1.0 - y) * (1.0 - p).ln())
        })
        .sum();
    total / probs.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_parse_names() {
        assert_eq!(EvalMetric::parse("error@0.5"), Some(EvalMetric::Error(0.5)));
        assert_eq!(EvalMetric::parse("error"), Some(EvalMetric::Error(0.5)));
        assert_eq!(EvalMetric::parse("auc"), Some(EvalMetric::Auc));
        assert_eq!(EvalMetric::parse("error@x"), None);
        assert_eq!(EvalMetric::parse("rmse"), None);
        assert_eq!(EvalMetric::Error(0.5).to_string(), "error@0.5");
    }

    #[test]
    fn test_error_at_threshold() {
        let p = array![0.9, 0.6, 0.4, 0.5];
        let y = array![1.0, 0.0, 0.0, 1.0];
        // 0.6 -> positive (wrong), 0.5 is not above 0.5 -> negative (wrong)
        assert!((classification_error(&p, &y, 0.5) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_auc_perfect_and_inverted() {
        let y = array![0.0, 0.0, 1.0, 1.0];
        assert!((auc(&array![0.1, 0.2, 0.8, 0.9], &y) - 1.0).abs() < 1e-12);
        assert!(auc(&array![0.9, 0.8, 0.2, 0.1], &y).abs() < 1e-12);
    }

    #[test]
    fn test_auc_ties_and_single_class() {
        let y = array![0.0, 1.0, 0.0, 1.0];
        assert!((auc(&array![0.5, 0.5, 0.5, 0.5], &y) - 0.5).abs() < 1e-12);
        assert_eq!(auc(&array![0.2, 0.9], &array![1.0, 1.0]), 0.5);
    }

    #[test]
    fn test_auc_partial() {
        let y = array![0.0, 1.0, 0.0, 1.0];
        let p = array![0.1, 0.4, 0.5, 0.8];
        assert!((auc(&p, &y) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_logloss() {
        let y = array![1.0, 0.0];
        let p = array![0.5, 0.5];
        assert!((log_loss(&p, &y) - std::f64::consts::LN_2).abs() < 1e-12);
    }
}
