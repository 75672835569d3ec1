//! Pipeline configuration

use serde::{Deserialize, Serialize};

/// Seed used for the train/test split
pub const SPLIT_SEED: u64 = 24601;

/// Fraction of rows held out for testing
pub const DEFAULT_TEST_SIZE: f64 = 0.05;

/// Boosting rounds when none are requested
pub const DEFAULT_NUM_BOOST_ROUNDS: usize = 512;

/// Validation rounds without improvement before training stops
pub const EARLY_STOPPING_ROUNDS: usize = 256;

/// Log evaluation results every this many rounds
pub const VERBOSE_EVAL: usize = 25;

/// Configuration for one training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Held-out test fraction
    pub test_size: f64,

    /// Number of boosting rounds
    pub num_boost_rounds: usize,

    /// Number of stagnant validation rounds before stopping
    pub early_stopping_rounds: usize,

    /// Evaluation logging period (0 = silent)
    pub verbose_eval: usize,

    /// Sample hyperparameters instead of using a preset
    pub random_hp: bool,

    /// Seed for hyperparameter sampling (None = entropy)
    pub hp_seed: Option<u64>,

    /// Use the deep-tree preset
    pub deep_trees: bool,

    /// Emit diagnostic plots and prediction dump
    pub diagnostics: bool,

    /// Reuse cached binary matrices instead of reading the table
    pub from_cache: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            test_size: DEFAULT_TEST_SIZE,
            num_boost_rounds: DEFAULT_NUM_BOOST_ROUNDS,
            early_stopping_rounds: EARLY_STOPPING_ROUNDS,
            verbose_eval: VERBOSE_EVAL,
            random_hp: false,
            hp_seed: None,
            deep_trees: false,
            diagnostics: false,
            from_cache: false,
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of boosting rounds
    pub fn with_num_boost_rounds(mut self, rounds: usize) -> Self {
        self.num_boost_rounds = rounds;
        self
    }

    /// Set the held-out test fraction
    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.test_size = test_size;
        self
    }

    /// Sample random hyperparameters, optionally seeded
    pub fn with_random_hp(mut self, seed: Option<u64>) -> Self {
        self.random_hp = true;
        self.hp_seed = seed;
        self
    }

    pub fn with_deep_trees(mut self, deep: bool) -> Self {
        self.deep_trees = deep;
        self
    }

    pub fn with_diagnostics(mut self, enabled: bool) -> Self {
        self.diagnostics = enabled;
        self
    }

    pub fn with_from_cache(mut self, enabled: bool) -> Self {
        self.from_cache = enabled;
        self
    }

    pub fn with_early_stopping_rounds(mut self, rounds: usize) -> Self {
        self.early_stopping_rounds = rounds;
        self
    }

    pub fn with_verbose_eval(mut self, period: usize) -> Self {
        self.verbose_eval = period;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(SPLIT_SEED, 24601);
        assert_eq!(config.num_boost_rounds, 512);
        assert_eq!(config.early_stopping_rounds, 256);
        assert_eq!(config.verbose_eval, 25);
        assert!((config.test_size - 0.05).abs() < 1e-12);
        assert!(!config.random_hp);
    }

    #[test]
    fn test_builder() {
        let config = PipelineConfig::new()
            .with_num_boost_rounds(10)
            .with_random_hp(Some(7))
            .with_diagnostics(true);

        assert_eq!(config.num_boost_rounds, 10);
        assert!(config.random_hp);
        assert_eq!(config.hp_seed, Some(7));
        assert!(config.diagnostics);
    }
}
