//! Trained ensemble: trees, their weights and training attributes

use super::config::BoosterConfig;
use super::tree::RegTree;
use crate::data::FeatureMatrix;
use crate::error::{Result, SigboostError};
use crate::layout::ensure_parent;
use ndarray::{Array1, Array2};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

pub const ATTR_BEST_ITERATION: &str = "best_iteration";
pub const ATTR_BEST_SCORE: &str = "best_score";
pub const ATTR_BEST_MSG: &str = "best_msg";

pub(crate) fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Gradient boosted tree ensemble for binary classification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booster {
    config: BoosterConfig,
    feature_names: Vec<String>,
    base_margin: f64,
    trees: Vec<RegTree>,
    tree_weights: Vec<f64>,
    attributes: BTreeMap<String, String>,
}

impl Booster {
    pub fn new(config: BoosterConfig, feature_names: Vec<String>, base_margin: f64) -> Self {
        Self {
            config,
            feature_names,
            base_margin,
            trees: Vec::new(),
            tree_weights: Vec::new(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn config(&self) -> &BoosterConfig {
        &self.config
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn base_margin(&self) -> f64 {
        self.base_margin
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn trees(&self) -> &[RegTree] {
        &self.trees
    }

    pub fn tree_weights(&self) -> &[f64] {
        &self.tree_weights
    }

    pub(crate) fn tree_weights_mut(&mut self) -> &mut [f64] {
        &mut self.tree_weights
    }

    pub(crate) fn push_tree(&mut self, tree: RegTree, weight: f64) {
        self.trees.push(tree);
        self.tree_weights.push(weight);
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn set_attr(&mut self, key: &str, value: impl Into<String>) {
        self.attributes.insert(key.to_string(), value.into());
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    /// Round with the best monitored metric, if early stopping ran
    pub fn best_iteration(&self) -> Option<usize> {
        self.attr(ATTR_BEST_ITERATION).and_then(|s| s.parse().ok())
    }

    pub fn best_score(&self) -> Option<f64> {
        self.attr(ATTR_BEST_SCORE).and_then(|s| s.parse().ok())
    }

    /// Evaluation line of the best round
    pub fn best_msg(&self) -> Option<&str> {
        self.attr(ATTR_BEST_MSG)
    }

    fn check_features(&self, data: &FeatureMatrix) -> Result<()> {
        if data.feature_names() != self.feature_names.as_slice() {
            return Err(SigboostError::ShapeError {
                expected: format!("features {:?}", self.feature_names),
                actual: format!("features {:?}", data.feature_names()),
            });
        }
        Ok(())
    }

    /// Weighted sum of the selected trees for every row
    pub(crate) fn sum_trees(&self, x: &Array2<f64>, indices: &[usize]) -> Array1<f64> {
        let values: Vec<f64> = (0..x.nrows())
            .into_par_iter()
            .map(|i| {
                let row = x.row(i);
                indices
                    .iter()
                    .map(|&t| self.tree_weights[t] * self.trees[t].predict_row(&row))
                    .sum()
            })
            .collect();
        Array1::from_vec(values)
    }

    /// Raw log-odds scores using every tree
    pub fn predict_margin(&self, data: &FeatureMatrix) -> Result<Array1<f64>> {
        self.check_features(data)?;
        let all: Vec<usize> = (0..self.trees.len()).collect();
        Ok(self.sum_trees(data.features(), &all) + self.base_margin)
    }

    /// Positive-class probabilities using every tree
    pub fn predict(&self, data: &FeatureMatrix) -> Result<Array1<f64>> {
        Ok(self.predict_margin(data)?.mapv(sigmoid))
    }

    /// Number of splits per feature name; unused features are absent
    pub fn get_fscore(&self) -> BTreeMap<String, usize> {
        let mut counts = vec![0usize; self.feature_names.len()];
        for tree in &self.trees {
            tree.count_splits(&mut counts);
        }
        self.feature_names
            .iter()
            .zip(counts)
            .filter(|(_, c)| *c > 0)
            .map(|(name, c)| (name.clone(), c))
            .collect()
    }

    /// Write the model as JSON
    pub fn save_model(&self, path: &Path) -> Result<()> {
        ensure_parent(path)?;
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(writer, self)?;
        tracing::debug!(path = %path.display(), trees = self.num_trees(), "saved model");
        Ok(())
    }

    pub fn load_model(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .map_err(|e| SigboostError::DataError(format!("{}: {}", path.display(), e)))?;
        let booster: Self = serde_json::from_reader(BufReader::new(file))?;
        if booster.trees.len() != booster.tree_weights.len() {
            return Err(SigboostError::SerializationError(format!(
                "model has {} trees but {} weights",
                booster.trees.len(),
                booster.tree_weights.len()
            )));
        }
        Ok(booster)
    }
}
