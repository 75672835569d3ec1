//! Filesystem layout for run artifacts.
//!
//! Every artifact path is a fixed convention keyed by `channel` and `mode`,
//! rooted at a base directory (the working directory for the CLI):
//!
//! ```text
//! dmatrices/<channel>/dTrain<mode><channel>.buffer
//! dmatrices/<channel>/dTest<mode><channel>.buffer
//! test/<channel>/dTest<mode><channel>.parquet
//! test/<channel>/yPred_<mode>_<channel>.npy
//! models/<channel>/<mode><rounds>.model
//! models/<channel>/<mode><timestamp>.json
//! graphs/<channel><mode>ROC.svg
//! graphs/<channel><mode>xgb_importances.svg
//! ```

use crate::error::Result;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct ArtifactLayout {
    root: PathBuf,
}

impl ArtifactLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Layout rooted at the process working directory
    pub fn current_dir() -> Self {
        Self::new(".")
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn train_matrix_path(&self, mode: &str, channel: &str) -> PathBuf {
        self.root
            .join("dmatrices")
            .join(channel)
            .join(format!("dTrain{}{}.buffer", mode, channel))
    }

    pub fn test_matrix_path(&self, mode: &str, channel: &str) -> PathBuf {
        self.root
            .join("dmatrices")
            .join(channel)
            .join(format!("dTest{}{}.buffer", mode, channel))
    }

    pub fn test_table_path(&self, mode: &str, channel: &str) -> PathBuf {
        self.root
            .join("test")
            .join(channel)
            .join(format!("dTest{}{}.parquet", mode, channel))
    }

    pub fn model_path(&self, channel: &str, mode: &str, rounds: usize) -> PathBuf {
        self.root
            .join("models")
            .join(channel)
            .join(format!("{}{}.model", mode, rounds))
    }

    pub fn results_path(&self, channel: &str, mode: &str, timestamp: &str) -> PathBuf {
        self.root
            .join("models")
            .join(channel)
            .join(format!("{}{}.json", mode, timestamp))
    }

    pub fn roc_plot_path(&self, channel: &str, mode: &str) -> PathBuf {
        self.root.join("graphs").join(format!("{}{}ROC.svg", channel, mode))
    }

    pub fn importance_plot_path(&self, channel: &str, mode: &str) -> PathBuf {
        self.root
            .join("graphs")
            .join(format!("{}{}xgb_importances.svg", channel, mode))
    }

    pub fn predictions_path(&self, channel: &str, mode: &str) -> PathBuf {
        self.root
            .join("test")
            .join(channel)
            .join(format!("yPred_{}_{}.npy", mode, channel))
    }
}

/// Create the parent directory of `path` if it is missing
pub fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}
