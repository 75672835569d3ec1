//! ROC curve, trapezoidal AUC and thresholded accuracy

use crate::error::{Result, SigboostError};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Points of a receiver operating characteristic curve.
///
/// Thresholds are the distinct scores in decreasing order, preceded by
/// `+inf` for the `(0, 0)` corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RocCurve {
    pub fpr: Vec<f64>,
    pub tpr: Vec<f64>,
    pub thresholds: Vec<f64>,
}

impl RocCurve {
    pub fn len(&self) -> usize {
        self.fpr.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fpr.is_empty()
    }
}

/// Compute the ROC curve of `scores` against 0/1 labels.
///
/// With a single class present the rate of the missing class is NaN at
/// every point, and so is the area under the curve.
pub fn roc_curve(y_true: &Array1<f64>, scores: &Array1<f64>) -> Result<RocCurve> {
    if y_true.len() != scores.len() {
        return Err(SigboostError::ShapeError {
            expected: format!("{} scores", y_true.len()),
            actual: format!("{} scores", scores.len()),
        });
    }
    if scores.iter().any(|s| s.is_nan()) {
        return Err(SigboostError::DataError("scores contain NaN".to_string()));
    }

    let n_pos = y_true.iter().filter(|&&y| y > 0.5).count();
    let n_neg = y_true.len() - n_pos;
    if n_pos == 0 {
        warn!("No positive samples in y_true, true positive rate is undefined");
    }
    if n_neg == 0 {
        warn!("No negative samples in y_true, false positive rate is undefined");
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    let mut counts = vec![(0usize, 0usize)];
    let mut thresholds = vec![f64::INFINITY];
    let (mut tp, mut fp) = (0usize, 0usize);

    for (pos, &i) in order.iter().enumerate() {
        if y_true[i] > 0.5 {
            tp += 1;
        } else {
            fp += 1;
        }
        // Emit a point at the last occurrence of each distinct score
        let boundary = order.get(pos + 1).map_or(true, |&next| scores[next] != scores[i]);
        if boundary {
            counts.push((fp, tp));
            thresholds.push(scores[i]);
        }
    }

    // 0 / 0 yields NaN for an absent class
    let fpr = counts.iter().map(|&(fp, _)| fp as f64 / n_neg as f64).collect();
    let tpr = counts.iter().map(|&(_, tp)| tp as f64 / n_pos as f64).collect();

    Ok(RocCurve { fpr, tpr, thresholds })
}

/// Area under a curve by the trapezoidal rule
pub fn auc(x: &[f64], y: &[f64]) -> f64 {
    x.windows(2)
        .zip(y.windows(2))
        .map(|(xs, ys)| (xs[1] - xs[0]) * (ys[0] + ys[1]) / 2.0)
        .sum()
}

/// Fraction of rows where `p > threshold` agrees with the label
pub fn accuracy_at(y_true: &Array1<f64>, probs: &Array1<f64>, threshold: f64) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let correct = y_true
        .iter()
        .zip(probs.iter())
        .filter(|(&y, &p)| (p > threshold) == (y > 0.5))
        .count();
    correct as f64 / y_true.len() as f64
}
