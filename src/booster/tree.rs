//! Regression tree grown on second-order gradient statistics
//!
//! - Regularized leaf weights: w* = -T(G, alpha) / (H + lambda)
//! - Split gain: T(GL)²/(HL+λ) + T(GR)²/(HR+λ) - T(G)²/(H+λ), kept when > gamma
//! - Minimum child weight constraint on hessian sums
//! - Missing values (NaN) follow a learned default direction

use super::config::BoosterConfig;
use ndarray::{Array1, Array2, ArrayView1};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Smallest loss reduction treated as a real improvement
const RT_EPS: f64 = 1e-6;

/// A single node in the tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeNode {
    Leaf { weight: f64 },
    Split {
        feature: usize,
        threshold: f64,
        /// Direction taken by missing values
        default_left: bool,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl TreeNode {
    fn predict(&self, sample: &ArrayView1<f64>) -> f64 {
        match self {
            TreeNode::Leaf { weight } => *weight,
            TreeNode::Split { feature, threshold, default_left, left, right } => {
                let v = sample[*feature];
                let go_left = if v.is_nan() { *default_left } else { v <= *threshold };
                if go_left {
                    left.predict(sample)
                } else {
                    right.predict(sample)
                }
            }
        }
    }

    fn count_splits(&self, counts: &mut [usize]) {
        if let TreeNode::Split { feature, left, right, .. } = self {
            if *feature < counts.len() {
                counts[*feature] += 1;
            }
            left.count_splits(counts);
            right.count_splits(counts);
        }
    }

    fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 0,
            TreeNode::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

/// One boosted tree; leaf weights already include the learning rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegTree {
    root: TreeNode,
}

impl RegTree {
    pub fn from_root(root: TreeNode) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &TreeNode {
        &self.root
    }

    /// Leaf value for one row
    pub fn predict_row(&self, row: &ArrayView1<f64>) -> f64 {
        self.root.predict(row)
    }

    /// Leaf values for every row of `x`
    pub fn predict(&self, x: &Array2<f64>) -> Array1<f64> {
        let values: Vec<f64> = (0..x.nrows())
            .into_par_iter()
            .map(|i| self.root.predict(&x.row(i)))
            .collect();
        Array1::from_vec(values)
    }

    /// Add this tree's split counts per feature index
    pub fn count_splits(&self, counts: &mut [usize]) {
        self.root.count_splits(counts);
    }

    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    /// Grow a tree on the given rows and candidate features
    pub fn grow(
        x: &Array2<f64>,
        grad: &Array1<f64>,
        hess: &Array1<f64>,
        rows: &[usize],
        features: &[usize],
        config: &BoosterConfig,
    ) -> Self {
        Self { root: build_node(x, grad, hess, rows, features, 0, config) }
    }
}

/// Best split found for one feature
#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    default_left: bool,
    gain: f64,
}

fn build_node(
    x: &Array2<f64>,
    grad: &Array1<f64>,
    hess: &Array1<f64>,
    rows: &[usize],
    features: &[usize],
    depth: usize,
    config: &BoosterConfig,
) -> TreeNode {
    let g_sum: f64 = rows.iter().map(|&i| grad[i]).sum();
    let h_sum: f64 = rows.iter().map(|&i| hess[i]).sum();
    let leaf = TreeNode::Leaf {
        weight: config.eta * leaf_weight(g_sum, h_sum, config.reg_lambda, config.reg_alpha),
    };

    if depth >= config.max_depth || rows.len() < 2 || h_sum < config.min_child_weight {
        return leaf;
    }

    // Evaluate every feature in parallel, then reduce in feature order so
    // ties resolve the same way on every run
    let candidates: Vec<SplitCandidate> = features
        .par_iter()
        .filter_map(|&f| best_split_for_feature(x, grad, hess, rows, f, g_sum, h_sum, config))
        .collect();
    let best = candidates.into_iter().fold(None::<SplitCandidate>, |best, c| match best {
        Some(b) if b.gain >= c.gain => Some(b),
        _ => Some(c),
    });

    let Some(split) = best else {
        return leaf;
    };
    if split.gain <= RT_EPS || split.gain <= config.gamma {
        return leaf;
    }

    let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows.iter().partition(|&&i| {
        let v = x[[i, split.feature]];
        if v.is_nan() {
            split.default_left
        } else {
            v <= split.threshold
        }
    });
    if left_rows.is_empty() || right_rows.is_empty() {
        return leaf;
    }

    let left = build_node(x, grad, hess, &left_rows, features, depth + 1, config);
    let right = build_node(x, grad, hess, &right_rows, features, depth + 1, config);

    TreeNode::Split {
        feature: split.feature,
        threshold: split.threshold,
        default_left: split.default_left,
        left: Box::new(left),
        right: Box::new(right),
    }
}

/// L1 soft threshold on the gradient sum
fn threshold_l1(g: f64, alpha: f64) -> f64 {
    if g > alpha {
        g - alpha
    } else if g < -alpha {
        g + alpha
    } else {
        0.0
    }
}

/// Optimal leaf weight with L1 (alpha) and L2 (lambda) regularization
pub(crate) fn leaf_weight(g_sum: f64, h_sum: f64, lambda: f64, alpha: f64) -> f64 {
    let denom = h_sum + lambda;
    if denom <= 0.0 {
        return 0.0;
    }
    -threshold_l1(g_sum, alpha) / denom
}

fn node_gain(g: f64, h: f64, lambda: f64, alpha: f64) -> f64 {
    let denom = h + lambda;
    if denom <= 0.0 {
        return 0.0;
    }
    let t = threshold_l1(g, alpha);
    t * t / denom
}

/// Exact greedy scan over one feature. Missing rows are tried on both sides.
#[allow(clippy::too_many_arguments)]
fn best_split_for_feature(
    x: &Array2<f64>,
    grad: &Array1<f64>,
    hess: &Array1<f64>,
    rows: &[usize],
    feature: usize,
    g_total: f64,
    h_total: f64,
    config: &BoosterConfig,
) -> Option<SplitCandidate> {
    let mut present: Vec<(f64, usize)> = rows
        .iter()
        .filter_map(|&i| {
            let v = x[[i, feature]];
            (!v.is_nan()).then_some((v, i))
        })
        .collect();
    if present.is_empty() {
        return None;
    }
    present.sort_by(|a, b| a.0.total_cmp(&b.0));

    let g_present: f64 = present.iter().map(|&(_, i)| grad[i]).sum();
    let h_present: f64 = present.iter().map(|&(_, i)| hess[i]).sum();
    let g_missing = g_total - g_present;
    let h_missing = h_total - h_present;
    let has_missing = present.len() < rows.len();

    let (lambda, alpha, mcw) = (config.reg_lambda, config.reg_alpha, config.min_child_weight);
    let parent_gain = node_gain(g_total, h_total, lambda, alpha);

    let mut best: Option<SplitCandidate> = None;
    let mut consider = |g_left: f64, h_left: f64, threshold: f64, default_left: bool| {
        let g_right = g_total - g_left;
        let h_right = h_total - h_left;
        if h_left < mcw || h_right < mcw {
            return;
        }
        let gain = node_gain(g_left, h_left, lambda, alpha) + node_gain(g_right, h_right, lambda, alpha)
            - parent_gain;
        if best.map_or(true, |b| gain > b.gain) {
            best = Some(SplitCandidate { feature, threshold, default_left, gain });
        }
    };

    let mut g_left = 0.0;
    let mut h_left = 0.0;
    for pos in 0..present.len() {
        let (value, idx) = present[pos];
        g_left += grad[idx];
        h_left += hess[idx];

        match present.get(pos + 1) {
            // Only split between distinct values
            Some(&(next, _)) if next > value => {
                let threshold = value + (next - value) / 2.0;
                consider(g_left, h_left, threshold, false);
                if has_missing {
                    consider(g_left + g_missing, h_left + h_missing, threshold, true);
                }
            }
            Some(_) => {}
            // All present values left, missing rows right
            None if has_missing => consider(g_left, h_left, value, false),
            None => {}
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn config(max_depth: usize) -> BoosterConfig {
        BoosterConfig { eta: 1.0, max_depth, min_child_weight: 0.0, reg_lambda: 0.0, ..Default::default() }
    }

    #[test]
    fn test_leaf_weight_regularization() {
        assert!((leaf_weight(-4.0, 1.0, 1.0, 0.0) - 2.0).abs() < 1e-12);
        assert_eq!(leaf_weight(0.5, 1.0, 1.0, 1.0), 0.0);
        assert!((leaf_weight(-3.0, 1.0, 0.0, 1.0) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_single_split_separates_gradients() {
        let x = array![[1.0], [2.0], [3.0], [4.0]];
        let grad = array![-1.0, -1.0, 1.0, 1.0];
        let hess = array![1.0, 1.0, 1.0, 1.0];
        let tree = RegTree::grow(&x, &grad, &hess, &[0, 1, 2, 3], &[0], &config(1));

        match tree.root() {
            TreeNode::Split { feature, threshold, .. } => {
                assert_eq!(*feature, 0);
                assert!((threshold - 2.5).abs() < 1e-12);
            }
            other => panic!("expected split, got {:?}", other),
        }
        let pred = tree.predict(&x);
        assert!((pred[0] - 1.0).abs() < 1e-12);
        assert!((pred[3] + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_max_depth_respected() {
        let x = Array2::from_shape_fn((64, 2), |(i, j)| (i * (j + 1)) as f64);
        let grad = Array1::from_shape_fn(64, |i| if i % 3 == 0 { 1.0 } else { -1.0 });
        let hess = Array1::from_elem(64, 1.0);
        let rows: Vec<usize> = (0..64).collect();
        let tree = RegTree::grow(&x, &grad, &hess, &rows, &[0, 1], &config(3));
        assert!(tree.depth() <= 3);
    }

    #[test]
    fn test_gamma_prunes_weak_split() {
        let x = array![[1.0], [2.0], [3.0], [4.0]];
        let grad = array![-0.1, -0.1, 0.1, 0.1];
        let hess = array![1.0, 1.0, 1.0, 1.0];
        let cfg = BoosterConfig { gamma: 10.0, ..config(4) };
        let tree = RegTree::grow(&x, &grad, &hess, &[0, 1, 2, 3], &[0], &cfg);
        assert!(matches!(tree.root(), TreeNode::Leaf { .. }));
    }

    #[test]
    fn test_missing_values_follow_default_direction() {
        let x = array![[1.0], [2.0], [f64::NAN], [f64::NAN], [3.0], [4.0]];
        let grad = array![-1.0, -1.0, -1.0, -1.0, 1.0, 1.0];
        let hess = Array1::from_elem(6, 1.0);
        let tree = RegTree::grow(&x, &grad, &hess, &[0, 1, 2, 3, 4, 5], &[0], &config(1));

        match tree.root() {
            TreeNode::Split { default_left, .. } => assert!(*default_left),
            other => panic!("expected split, got {:?}", other),
        }
        let pred = tree.predict(&x);
        assert_eq!(pred[2], pred[0]);
        assert!(pred[2] > 0.0);
    }

    #[test]
    fn test_count_splits() {
        let x = array![[1.0, 0.0], [2.0, 0.0], [3.0, 1.0], [4.0, 1.0]];
        let grad = array![-1.0, -1.0, 1.0, 1.0];
        let hess = Array1::from_elem(4, 1.0);
        let tree = RegTree::grow(&x, &grad, &hess, &[0, 1, 2, 3], &[1], &config(2));
        let mut counts = vec![0; 2];
        tree.count_splits(&mut counts);
        assert_eq!(counts, vec![0, 1]);
    }
}
