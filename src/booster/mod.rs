//! Gradient boosted trees for binary classification
//!
//! A logistic-loss tree booster with exact greedy split search, optional
//! dropout (DART), per-round evaluation of watched sets and early stopping.

pub mod callback;
pub mod config;
pub mod dart;
pub mod metrics;
pub mod model;
pub mod train;
pub mod tree;

pub use callback::EarlyStopping;
pub use config::{BoosterConfig, BoosterType, NormalizeType, SampleType, BINARY_LOGISTIC};
pub use metrics::EvalMetric;
pub use model::{Booster, ATTR_BEST_ITERATION, ATTR_BEST_MSG, ATTR_BEST_SCORE};
pub use train::{format_metric, train, TrainOptions};
pub use tree::{RegTree, TreeNode};
