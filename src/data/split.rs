//! Deterministic train/test splitting

use crate::error::{Result, SigboostError};
use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Row indices of a single train/test partition
#[derive(Debug, Clone, PartialEq)]
pub struct SplitIndices {
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
}

/// Shuffle `0..n_samples` with a seeded generator and hold out
/// `ceil(test_size * n_samples)` rows for testing.
pub fn train_test_split(n_samples: usize, test_size: f64, seed: u64) -> Result<SplitIndices> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(SigboostError::InvalidParameter {
            name: "test_size".to_string(),
            value: test_size.to_string(),
            reason: "must lie strictly between 0 and 1".to_string(),
        });
    }

    let n_test = (test_size * n_samples as f64).ceil() as usize;
    let n_train = n_samples.saturating_sub(n_test);
    if n_test == 0 || n_train == 0 {
        return Err(SigboostError::DataError(format!(
            "cannot split {} rows with test_size {}: one side would be empty",
            n_samples, test_size
        )));
    }

    let mut indices: Vec<usize> = (0..n_samples).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let test_indices = indices[..n_test].to_vec();
    let train_indices = indices[n_test..].to_vec();

    Ok(SplitIndices { train_indices, test_indices })
}

/// Gather the given rows of a feature/label pair
pub fn take_rows(x: &Array2<f64>, y: &Array1<f64>, indices: &[usize]) -> (Array2<f64>, Array1<f64>) {
    (x.select(Axis(0), indices), y.select(Axis(0), indices))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_split_is_deterministic() {
        let a = train_test_split(1000, 0.05, 24601).unwrap();
        let b = train_test_split(1000, 0.05, 24601).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_split_sizes_round_test_up() {
        let s = train_test_split(101, 0.05, 24601).unwrap();
        assert_eq!(s.test_indices.len(), 6);
        assert_eq!(s.train_indices.len(), 95);
    }

    #[test]
    fn test_split_is_disjoint_and_covering() {
        let s = train_test_split(500, 0.2, 1).unwrap();
        let train: HashSet<_> = s.train_indices.iter().copied().collect();
        let test: HashSet<_> = s.test_indices.iter().copied().collect();
        assert!(train.is_disjoint(&test));
        assert_eq!(train.len() + test.len(), 500);
        assert!((0..500).all(|i| train.contains(&i) || test.contains(&i)));
    }

    #[test]
    fn test_different_seed_changes_split() {
        let a = train_test_split(1000, 0.05, 24601).unwrap();
        let b = train_test_split(1000, 0.05, 24602).unwrap();
        assert_ne!(a.test_indices, b.test_indices);
    }

    #[test]
    fn test_invalid_fraction() {
        assert!(train_test_split(100, 0.0, 1).is_err());
        assert!(train_test_split(100, 1.0, 1).is_err());
        assert!(train_test_split(1, 0.5, 1).is_err());
    }

    #[test]
    fn test_take_rows() {
        let x = ndarray::array![[1.0, 10.0], [2.0, 20.0], [3.0, 30.0]];
        let y = ndarray::array![0.0, 1.0, 0.0];
        let (xs, ys) = take_rows(&x, &y, &[2, 0]);
        assert_eq!(xs, ndarray::array![[3.0, 30.0], [1.0, 10.0]]);
        assert_eq!(ys, ndarray::array![0.0, 0.0]);
    }
}
