//! Boosting loop with per-round evaluation and early stopping

use super::callback::EarlyStopping;
use super::config::BoosterConfig;
use super::dart;
use super::metrics::EvalMetric;
use super::model::{sigmoid, Booster, ATTR_BEST_ITERATION, ATTR_BEST_MSG, ATTR_BEST_SCORE};
use super::tree::RegTree;
use crate::data::FeatureMatrix;
use crate::error::{Result, SigboostError};
use crate::hyperparams::ParamValue;
use ndarray::Array1;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use tracing::{debug, info};

/// Loop controls independent of the booster parameters
#[derive(Debug, Clone, PartialEq)]
pub struct TrainOptions {
    pub num_boost_round: usize,
    /// Stop when the last metric on the last eval set has not improved for
    /// this many rounds
    pub early_stopping_rounds: Option<usize>,
    /// Log the evaluation line every this many rounds; 0 disables
    pub verbose_eval: usize,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self { num_boost_round: 10, early_stopping_rounds: None, verbose_eval: 0 }
    }
}

/// Minimum hessian, keeps pure nodes from dividing by zero
const MIN_HESS: f64 = 1e-16;

/// Per-set margins kept up to date as trees are added
struct Watch<'a> {
    name: &'a str,
    data: &'a FeatureMatrix,
    margin: Array1<f64>,
}

/// Format a metric value with up to six decimals, trailing zeros removed
pub fn format_metric(value: f64) -> String {
    let s = format!("{:.6}", value);
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    }
}

fn check_labels(data: &FeatureMatrix, name: &str) -> Result<()> {
    if let Some(bad) = data.labels().iter().find(|&&y| !(0.0..=1.0).contains(&y)) {
        return Err(SigboostError::DataError(format!(
            "labels of '{}' must lie in [0, 1], found {}",
            name, bad
        )));
    }
    Ok(())
}

fn base_margin(config: &BoosterConfig, dtrain: &FeatureMatrix) -> f64 {
    let p = config
        .base_score
        .unwrap_or_else(|| dtrain.labels().mean().unwrap_or(0.5))
        .clamp(1e-6, 1.0 - 1e-6);
    (p / (1.0 - p)).ln()
}

/// Sample a fraction of `0..n` without replacement, sorted
fn subsample(rng: &mut Xoshiro256PlusPlus, n: usize, ratio: f64) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..n).collect();
    if ratio >= 1.0 {
        return indices;
    }
    let k = ((n as f64 * ratio).round() as usize).clamp(1, n);
    indices.shuffle(rng);
    indices.truncate(k);
    indices.sort_unstable();
    indices
}

/// Train a booster on `dtrain`, reporting metrics on each `(matrix, name)`
/// in `evals` after every round.
///
/// With early stopping the monitored value is the last metric on the last
/// eval set. The best round is stored in the `best_iteration`,
/// `best_score` and `best_msg` attributes; every trained tree is kept.
pub fn train(
    params: &[(String, ParamValue)],
    dtrain: &FeatureMatrix,
    evals: &[(&FeatureMatrix, &str)],
    options: &TrainOptions,
) -> Result<Booster> {
    let config = BoosterConfig::from_pairs(params)?;

    if dtrain.n_rows() == 0 {
        return Err(SigboostError::TrainingError("training matrix has no rows".to_string()));
    }
    check_labels(dtrain, "train")?;
    for (data, name) in evals {
        if data.feature_names() != dtrain.feature_names() {
            return Err(SigboostError::ShapeError {
                expected: format!("features {:?}", dtrain.feature_names()),
                actual: format!("features {:?} in '{}'", data.feature_names(), name),
            });
        }
        check_labels(data, name)?;
    }

    let metrics: Vec<EvalMetric> = config.metrics();
    let mut early_stopping = match options.early_stopping_rounds {
        Some(rounds) => {
            let (_, last_name) = evals.last().ok_or_else(|| {
                SigboostError::TrainingError("early stopping needs at least one evaluation set".to_string())
            })?;
            let monitored = metrics[metrics.len() - 1];
            info!(
                "Will train until {}-{} hasn't improved in {} rounds.",
                last_name, monitored, rounds
            );
            Some(EarlyStopping::new(rounds, monitored.higher_is_better()))
        }
        None => None,
    };

    let base = base_margin(&config, dtrain);
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(config.seed);
    let mut booster = Booster::new(config.clone(), dtrain.feature_names().to_vec(), base);

    let x = dtrain.features();
    let y = dtrain.labels();
    let mut train_margin = Array1::from_elem(dtrain.n_rows(), base);
    let mut watches: Vec<Watch> = evals
        .iter()
        .map(|&(data, name)| Watch { name, data, margin: Array1::from_elem(data.n_rows(), base) })
        .collect();

    debug!(booster = ?config.booster, eta = config.eta, max_depth = config.max_depth, "starting boosting");

    for round in 0..options.num_boost_round {
        let drops = if config.is_dart() {
            dart::select_drops(&mut rng, booster.tree_weights(), &config)
        } else {
            Vec::new()
        };

        // Contribution of the dropped trees, removed while fitting this round
        let dropped_train = (!drops.is_empty()).then(|| booster.sum_trees(x, &drops));
        let fit_margin = match &dropped_train {
            Some(d) => &train_margin - d,
            None => train_margin.clone(),
        };

        let probs = fit_margin.mapv(sigmoid);
        let grad = &probs - y;
        let hess = probs.mapv(|p| (p * (1.0 - p)).max(MIN_HESS));

        let rows = subsample(&mut rng, dtrain.n_rows(), config.subsample);
        let features = subsample(&mut rng, dtrain.n_features(), config.colsample_bytree);
        let tree = RegTree::grow(x, &grad, &hess, &rows, &features, &config);

        let scaling = if config.is_dart() {
            dart::normalize(booster.tree_weights_mut(), &drops, config.eta, config.normalize_type)
        } else {
            dart::DropScaling { dropped_factor: 1.0, new_weight: 1.0 }
        };

        // All rows are updated, including those left out by subsampling
        train_margin = train_margin + tree.predict(x) * scaling.new_weight;
        if let Some(d) = dropped_train {
            train_margin = train_margin + d * (scaling.dropped_factor - 1.0);
        }
        for watch in &mut watches {
            let fx = watch.data.features();
            if !drops.is_empty() {
                // Dropped weights are already rescaled, so recover the old sum
                let rescaled = booster.sum_trees(fx, &drops);
                let delta = rescaled * (1.0 - 1.0 / scaling.dropped_factor);
                watch.margin = &watch.margin + &delta;
            }
            watch.margin = &watch.margin + &(tree.predict(fx) * scaling.new_weight);
        }
        booster.push_tree(tree, scaling.new_weight);

        let mut msg = format!("[{}]", round);
        let mut last_value = f64::NAN;
        for watch in &watches {
            let probs = watch.margin.mapv(sigmoid);
            for metric in &metrics {
                last_value = metric.evaluate(&probs, watch.data.labels());
                msg.push_str(&format!("\t{}-{}:{}", watch.name, metric, format_metric(last_value)));
            }
        }

        let is_last = round + 1 == options.num_boost_round;
        if options.verbose_eval > 0 && !watches.is_empty() && (round % options.verbose_eval == 0 || is_last) {
            info!("{}", msg);
        }

        if let Some(es) = early_stopping.as_mut() {
            let stop = es.should_stop(last_value);
            if es.improved() {
                booster.set_attr(ATTR_BEST_ITERATION, round.to_string());
                booster.set_attr(ATTR_BEST_SCORE, last_value.to_string());
                booster.set_attr(ATTR_BEST_MSG, msg.clone());
            }
            if stop {
                info!("Stopping. Best iteration:\n{}", booster.best_msg().unwrap_or_default());
                break;
            }
        }
    }

    Ok(booster)
}
