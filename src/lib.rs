//! sigboost - gradient boosted trees for signal/background discrimination
//!
//! A batch pipeline that trains one binary classifier per `(channel, mode)`:
//!
//! - [`data`] - table loading, deterministic train/test split, matrix caching
//! - [`hyperparams`] - fixed presets and random draws from a search space
//! - [`booster`] - the boosted-tree engine (gbtree and dart, early stopping)
//! - [`training`] - training a configuration and persisting its results
//! - [`diagnostics`] - test accuracy, ROC curve, importance chart, predictions
//! - [`pipeline`] - the above, end to end
//! - [`cli`] - command-line interface
//!
//! # Example
//!
//! ```no_run
//! use sigboost::prelude::*;
//! use std::path::Path;
//!
//! let layout = ArtifactLayout::new("runs");
//! let config = PipelineConfig::new().with_num_boost_rounds(128).with_diagnostics(true);
//! let outcome = run_pipeline(Path::new("signal_vs_qcd.parquet"), "b2dk", "qcd", &config, &layout)?;
//! println!("best eval-auc {}", outcome.record.auc);
//! # Ok::<(), sigboost::error::SigboostError>(())
//! ```

pub mod error;

pub mod config;
pub mod layout;

pub mod data;
pub mod hyperparams;
pub mod booster;
pub mod training;
pub mod diagnostics;
pub mod pipeline;

pub mod cli;

pub use error::{Result, SigboostError};

/// Commonly used types
pub mod prelude {
    pub use crate::booster::{Booster, BoosterConfig, TrainOptions};
    pub use crate::config::PipelineConfig;
    pub use crate::data::{load_cached, load_data, DataLoader, FeatureMatrix, LoadedData};
    pub use crate::diagnostics::{run_diagnostics, DiagnosticsReport};
    pub use crate::error::{Result, SigboostError};
    pub use crate::hyperparams::{default_config, random_config, HyperParams, ParamValue};
    pub use crate::layout::ArtifactLayout;
    pub use crate::pipeline::{run_pipeline, PipelineOutcome};
    pub use crate::training::{EvalRecord, Trainer};
}
