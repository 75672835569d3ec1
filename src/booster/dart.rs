//! Dropout for boosted trees (DART)
//!
//! Each round a random subset of existing trees is left out while the new tree
//! is fit. Afterwards the dropped trees and the new tree are rescaled so the
//! ensemble does not overshoot.

use super::config::{BoosterConfig, NormalizeType, SampleType};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

/// Scaling applied after a round: dropped trees are multiplied by
/// `dropped_factor`, the new tree gets weight `new_weight`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropScaling {
    pub dropped_factor: f64,
    pub new_weight: f64,
}

/// Pick tree indices to drop this round
pub fn select_drops<R: Rng + ?Sized>(rng: &mut R, weights: &[f64], config: &BoosterConfig) -> Vec<usize> {
    let n = weights.len();
    if n == 0 || rng.gen::<f64>() < config.skip_drop {
        return Vec::new();
    }

    let total: f64 = weights.iter().sum();
    let weighted = config.sample_type == SampleType::Weighted && total > 0.0;

    let mut drops: Vec<usize> = if weighted {
        let scale = config.rate_drop * n as f64 / total;
        (0..n).filter(|&i| rng.gen::<f64>() < scale * weights[i]).collect()
    } else {
        (0..n).filter(|_| rng.gen::<f64>() < config.rate_drop).collect()
    };

    if config.one_drop && drops.is_empty() {
        let pick = if weighted {
            WeightedIndex::new(weights).ok().map(|dist| dist.sample(rng))
        } else {
            None
        };
        drops.push(pick.unwrap_or_else(|| rng.gen_range(0..n)));
    }

    drops
}

/// Rescale dropped tree weights in place and return the applied scaling
pub fn normalize(weights: &mut [f64], drops: &[usize], eta: f64, normalize_type: NormalizeType) -> DropScaling {
    if drops.is_empty() {
        return DropScaling { dropped_factor: 1.0, new_weight: 1.0 };
    }
    let k = drops.len() as f64;
    let scaling = match normalize_type {
        NormalizeType::Tree => DropScaling { dropped_factor: k / (k + eta), new_weight: 1.0 / (k + eta) },
        NormalizeType::Forest => {
            let factor = 1.0 / (1.0 + eta);
            DropScaling { dropped_factor: factor, new_weight: factor }
        }
    };
    for &i in drops {
        weights[i] *= scaling.dropped_factor;
    }
    scaling
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn dart(rate_drop: f64, skip_drop: f64) -> BoosterConfig {
        BoosterConfig { rate_drop, skip_drop, ..Default::default() }
    }

    #[test]
    fn test_no_trees_no_drops() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);
        assert!(select_drops(&mut rng, &[], &dart(1.0, 0.0)).is_empty());
    }

    #[test]
    fn test_rate_drop_one_drops_all() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);
        assert_eq!(select_drops(&mut rng, &[1.0; 5], &dart(1.0, 0.0)), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_skip_drop_one_never_drops() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);
        for _ in 0..20 {
            assert!(select_drops(&mut rng, &[1.0; 5], &dart(1.0, 1.0)).is_empty());
        }
    }

    #[test]
    fn test_one_drop_forces_a_drop() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);
        let config = BoosterConfig { one_drop: true, sample_type: SampleType::Weighted, ..dart(0.0, 0.0) };
        let drops = select_drops(&mut rng, &[0.0, 2.0, 0.0], &config);
        assert_eq!(drops, vec![1]);
    }

    #[test]
    fn test_tree_normalization() {
        let mut w = vec![1.0, 1.0, 1.0];
        let s = normalize(&mut w, &[0, 2], 0.5, NormalizeType::Tree);
        assert!((s.dropped_factor - 2.0 / 2.5).abs() < 1e-12);
        assert!((s.new_weight - 1.0 / 2.5).abs() < 1e-12);
        assert_eq!(w[1], 1.0);
        assert!((w[0] - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_forest_normalization_and_no_drop() {
        let mut w = vec![1.0, 1.0];
        let s = normalize(&mut w, &[1], 0.25, NormalizeType::Forest);
        assert!((s.new_weight - 0.8).abs() < 1e-12);
        assert!((w[1] - 0.8).abs() < 1e-12);

        let s = normalize(&mut w, &[], 0.25, NormalizeType::Forest);
        assert_eq!(s, DropScaling { dropped_factor: 1.0, new_weight: 1.0 });
    }
}
