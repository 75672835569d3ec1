//! Training of one hyperparameter configuration with early stopping

use crate::booster::{self, Booster, TrainOptions, ATTR_BEST_MSG, ATTR_BEST_SCORE};
use crate::config::{EARLY_STOPPING_ROUNDS, VERBOSE_EVAL};
use crate::data::LoadedData;
use crate::error::{Result, SigboostError};
use crate::hyperparams::{HyperParams, ParamValue};
use crate::layout::{ensure_parent, ArtifactLayout};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info};

/// Boosting rounds granted per unit of resource in [`Trainer::run_hyp_config`]
pub const ROUNDS_PER_ITERATION: usize = 64;

/// Timestamp format used in result file names
pub const RESULTS_TIMESTAMP_FORMAT: &str = "%b_%d_%H:%M";

/// Summary of the best round of a training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalRecord {
    /// Best monitored score (eval-auc)
    pub auc: f64,
    /// Eval-set error field of the best round's log line, e.g. `eval-error@0.5:0.0123`
    #[serde(rename = "error@0.5")]
    pub error: String,
    pub best_iteration: usize,
}

impl EvalRecord {
    /// Build from the attributes early stopping leaves on the booster
    pub fn from_booster(bst: &Booster) -> Result<Self> {
        let missing = |key: &str| SigboostError::TrainingError(format!("booster has no '{}' attribute", key));

        let auc = bst.best_score().ok_or_else(|| missing(ATTR_BEST_SCORE))?;
        let best_iteration = bst.best_iteration().ok_or_else(|| missing("best_iteration"))?;
        let msg = bst.best_msg().ok_or_else(|| missing(ATTR_BEST_MSG))?;

        let fields: Vec<&str> = msg.split('\t').collect();
        if fields.len() < 2 {
            return Err(SigboostError::TrainingError(format!(
                "unexpected evaluation line '{}'",
                msg
            )));
        }
        let error = fields[fields.len() - 2].to_string();

        Ok(Self { auc, error, best_iteration })
    }
}

/// Trains configurations for one `(channel, mode)` and writes their artifacts
#[derive(Debug, Clone)]
pub struct Trainer {
    layout: ArtifactLayout,
    channel: String,
    mode: String,
    early_stopping_rounds: usize,
    verbose_eval: usize,
}

impl Trainer {
    pub fn new(layout: ArtifactLayout, channel: &str, mode: &str) -> Self {
        Self {
            layout,
            channel: channel.to_string(),
            mode: mode.to_string(),
            early_stopping_rounds: EARLY_STOPPING_ROUNDS,
            verbose_eval: VERBOSE_EVAL,
        }
    }

    pub fn with_early_stopping_rounds(mut self, rounds: usize) -> Self {
        self.early_stopping_rounds = rounds;
        self
    }

    pub fn with_verbose_eval(mut self, period: usize) -> Self {
        self.verbose_eval = period;
        self
    }

    pub fn layout(&self) -> &ArtifactLayout {
        &self.layout
    }

    /// Train `hyp_params` for up to `num_boost_rounds`, monitoring the train
    /// and test sets, and save the model. The caller's parameters are left
    /// untouched.
    pub fn train_hyp_config(
        &self,
        data: &LoadedData,
        hyp_params: &HyperParams,
        num_boost_rounds: usize,
    ) -> Result<(Booster, EvalRecord)> {
        let mut params = hyp_params.clone();
        params.insert("eval_metric", "error@0.5");
        let mut pairs = params.into_pairs();
        pairs.push(("eval_metric".to_string(), ParamValue::from("auc")));

        let evals = [(&data.train, "train"), (&data.test, "eval")];
        let options = TrainOptions {
            num_boost_round: num_boost_rounds,
            early_stopping_rounds: Some(self.early_stopping_rounds),
            verbose_eval: self.verbose_eval,
        };

        info!("Starting model training");
        let start = Instant::now();
        let bst = booster::train(&pairs, &data.train, &evals, &options)?;
        info!("Training ended. Elapsed time: ({:.3} s).", start.elapsed().as_secs_f64());
        for (key, value) in bst.attributes() {
            info!(attribute = %key, value = %value.replace('\t', " "), "booster attribute");
        }

        let record = EvalRecord::from_booster(&bst)?;

        let model_path = self.layout.model_path(&self.channel, &self.mode, num_boost_rounds);
        bst.save_model(&model_path)?;
        debug!(path = %model_path.display(), "model written");

        Ok((bst, record))
    }

    /// Train with a resource allocation: `round(n_iterations * rounds_per_iteration)`
    /// boosting rounds
    pub fn run_hyp_config(
        &self,
        data: &LoadedData,
        hyp_params: &HyperParams,
        n_iterations: f64,
        rounds_per_iteration: usize,
    ) -> Result<(Booster, EvalRecord)> {
        let rounds = n_iterations * rounds_per_iteration as f64;
        if !rounds.is_finite() || rounds < 0.0 {
            return Err(SigboostError::InvalidParameter {
                name: "n_iterations".to_string(),
                value: n_iterations.to_string(),
                reason: "must be a finite non-negative resource".to_string(),
            });
        }
        let num_boost_rounds = rounds.round() as usize;
        info!("Boosting iterations: {}", num_boost_rounds);
        info!("{}", hyp_params);

        self.train_hyp_config(data, hyp_params, num_boost_rounds)
    }

    /// Write the record as JSON under a timestamped name
    pub fn save_results(&self, record: &EvalRecord) -> Result<PathBuf> {
        let timestamp = chrono::Local::now().format(RESULTS_TIMESTAMP_FORMAT).to_string();
        let output = self.layout.results_path(&self.channel, &self.mode, &timestamp);
        ensure_parent(&output)?;
        let writer = BufWriter::new(File::create(&output)?);
        serde_json::to_writer(writer, record)?;
        info!("Boosting complete. Model saved to {}", output.display());
        Ok(output)
    }
}
