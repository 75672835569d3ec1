//! Model training for a fixed hyperparameter configuration
//!
//! The [`Trainer`] monitors both the training and the held-out set each
//! round, stops once the held-out AUC stagnates, then persists the model and
//! a small evaluation record.

pub mod trainer;

pub use trainer::{EvalRecord, Trainer, RESULTS_TIMESTAMP_FORMAT, ROUNDS_PER_ITERATION};
