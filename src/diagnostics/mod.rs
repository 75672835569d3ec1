//! Post-training diagnostics on the held-out set
//!
//! Reports test accuracy at a 0.5 cut, draws the ROC curve and the top-20
//! feature importances, and dumps the raw test predictions.

pub mod plots;
pub mod roc;

pub use plots::{plot_importances, plot_roc, top_importances};
pub use roc::{accuracy_at, auc, roc_curve, RocCurve};

use crate::booster::Booster;
use crate::data::LoadedData;
use crate::error::Result;
use crate::hyperparams::HyperParams;
use crate::layout::{ensure_parent, ArtifactLayout};
use ndarray::Array1;
use std::path::PathBuf;
use tracing::{info, warn};

/// Number of features shown in the importance chart
pub const TOP_FEATURES: usize = 20;

/// Outcome of a diagnostics run
#[derive(Debug, Clone)]
pub struct DiagnosticsReport {
    pub accuracy: f64,
    pub roc_auc: f64,
    pub predictions: Array1<f64>,
    pub roc_plot: PathBuf,
    pub importance_plot: PathBuf,
    pub predictions_file: PathBuf,
}

/// Subtitle of the ROC chart
pub fn roc_meta(channel: &str, mode: &str, hp: &HyperParams) -> String {
    let show = |key: &str| hp.get(key).map(ToString::to_string).unwrap_or_else(|| "None".to_string());
    format!("xgb: {} - {} | eta: {}, depth: {}", channel, mode, show("eta"), show("max_depth"))
}

/// Evaluate `bst` on the test matrix and write the diagnostic artifacts
pub fn run_diagnostics(
    data: &LoadedData,
    bst: &Booster,
    hp: &HyperParams,
    layout: &ArtifactLayout,
    channel: &str,
    mode: &str,
) -> Result<DiagnosticsReport> {
    let predictions = bst.predict(&data.test)?;
    let y_true = &data.y_test;

    let accuracy = accuracy_at(y_true, &predictions, 0.5);
    info!("Test accuracy: {}", accuracy);

    let curve = roc_curve(y_true, &predictions)?;
    let roc_auc = auc(&curve.fpr, &curve.tpr);
    if roc_auc.is_nan() {
        warn!("ROC AUC is undefined on a single-class test set");
    }
    let roc_plot = layout.roc_plot_path(channel, mode);
    plot_roc(&curve, roc_auc, &roc_meta(channel, mode, hp), &roc_plot)?;

    let importance_plot = layout.importance_plot_path(channel, mode);
    plot_importances(&bst.get_fscore(), TOP_FEATURES, &importance_plot)?;
    info!("Diagnostic graphs saved to {}", importance_plot.parent().unwrap_or(layout.root()).display());

    let predictions_file = layout.predictions_path(channel, mode);
    ensure_parent(&predictions_file)?;
    ndarray_npy::write_npy(&predictions_file, &predictions)?;

    Ok(DiagnosticsReport { accuracy, roc_auc, predictions, roc_plot, importance_plot, predictions_file })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roc_meta() {
        let hp = HyperParams::new().with("eta", 0.1).with("max_depth", 8i64);
        assert_eq!(roc_meta("b2dk", "cont", &hp), "xgb: b2dk - cont | eta: 0.1, depth: 8");
        assert_eq!(roc_meta("b2dk", "cont", &HyperParams::new()), "xgb: b2dk - cont | eta: None, depth: None");
    }
}
