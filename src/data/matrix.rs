//! Training matrix: features, labels and feature names in one cacheable unit

use crate::error::{Result, SigboostError};
use crate::layout::ensure_parent;
use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Dense feature matrix with attached labels and feature names.
///
/// Missing values are stored as `NaN` and routed by each split's default
/// direction during training and prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureMatrix {
    features: Array2<f64>,
    labels: Array1<f64>,
    feature_names: Vec<String>,
}

impl FeatureMatrix {
    /// Build a matrix, checking that rows, labels and names line up
    pub fn new(features: Array2<f64>, labels: Array1<f64>, feature_names: Vec<String>) -> Result<Self> {
        if features.nrows() != labels.len() {
            return Err(SigboostError::ShapeError {
                expected: format!("{} labels", features.nrows()),
                actual: format!("{} labels", labels.len()),
            });
        }
        if features.ncols() != feature_names.len() {
            return Err(SigboostError::ShapeError {
                expected: format!("{} feature names", features.ncols()),
                actual: format!("{} feature names", feature_names.len()),
            });
        }
        // Row access below assumes standard (C) layout
        let features = if features.is_standard_layout() {
            features
        } else {
            features.as_standard_layout().to_owned()
        };
        Ok(Self { features, labels, feature_names })
    }

    pub fn n_rows(&self) -> usize {
        self.features.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    pub fn features(&self) -> &Array2<f64> {
        &self.features
    }

    pub fn labels(&self) -> &Array1<f64> {
        &self.labels
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Single row as a view
    pub fn row(&self, i: usize) -> ArrayView1<'_, f64> {
        self.features.row(i)
    }

    /// Write the matrix to a binary cache file
    pub fn save_binary(&self, path: &Path) -> Result<()> {
        ensure_parent(path)?;
        let writer = BufWriter::new(File::create(path)?);
        bincode::serialize_into(writer, self)?;
        tracing::debug!(path = %path.display(), rows = self.n_rows(), "saved binary matrix");
        Ok(())
    }

    /// Read a matrix previously written by [`FeatureMatrix::save_binary`]
    pub fn load_binary(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .map_err(|e| SigboostError::DataError(format!("{}: {}", path.display(), e)))?;
        let matrix: Self = bincode::deserialize_from(BufReader::new(file))?;
        // Re-validate: the cache may come from an older run
        Self::new(matrix.features, matrix.labels, matrix.feature_names)
    }
}
