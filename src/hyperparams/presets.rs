//! Fixed hyperparameter presets and the random search space

use super::space::{Branch, Distribution, SearchSpace};
use super::HyperParams;
use crate::error::Result;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use tracing::info;

/// Keys present in every sampled configuration
pub const COMMON_KEYS: [&str; 9] = [
    "booster",
    "eta",
    "gamma",
    "min_child_weight",
    "max_depth",
    "subsample",
    "colsample_bytree",
    "objective",
    "silent",
];

/// Keys present only when the dropout (dart) family is drawn
pub const DART_KEYS: [&str; 4] = ["sample_type", "normalize_type", "rate_drop", "skip_drop"];

/// Preset parameters: `deep` selects depth-8 trees with stronger split
/// regularization, otherwise depth-6 trees.
pub fn default_config(deep: bool) -> HyperParams {
    if deep {
        info!("using deep hp config");
        HyperParams::new()
            .with("eta", 0.1)
            .with("seed", 0i64)
            .with("subsample", 0.75)
            .with("colsample_bytree", 0.85)
            .with("gamma", 2.5)
            .with("objective", "binary:logistic")
            .with("max_depth", 8i64)
            .with("min_child_weight", 0.4)
            .with("silent", 1i64)
    } else {
        HyperParams::new()
            .with("eta", 0.1)
            .with("seed", 0i64)
            .with("subsample", 0.8)
            .with("colsample_bytree", 0.9)
            .with("gamma", 1.6)
            .with("objective", "binary:logistic")
            .with("max_depth", 6i64)
            .with("min_child_weight", 1i64)
            .with("silent", 1i64)
    }
}

/// Two equally likely families: plain tree boosting, and the same space
/// extended with dropout (dart) parameters.
pub fn xgb_search_space() -> SearchSpace {
    let gbtree = Branch::new()
        .with("booster", Distribution::constant("gbtree"))
        .with("eta", Distribution::uniform(0.01, 0.17))
        .with("gamma", Distribution::uniform(0.05, 2.5))
        .with("min_child_weight", Distribution::uniform(0.0, 2.0))
        .with("max_depth", Distribution::quniform(3.0, 9.0, 1.0))
        .with("subsample", Distribution::uniform(0.7, 1.0))
        .with("colsample_bytree", Distribution::uniform(0.7, 1.0))
        .with("objective", Distribution::constant("binary:logistic"))
        .with("silent", Distribution::constant(1i64));

    let dart = Branch::new()
        .with("booster", Distribution::constant("dart"))
        .with("sample_type", Distribution::choice(["uniform", "weighted"]))
        .with("normalize_type", Distribution::choice(["tree", "forest"]))
        .with("rate_drop", Distribution::uniform(0.0, 0.3))
        .with("skip_drop", Distribution::uniform(0.0, 0.25));

    let gbtree_dart = gbtree.extended(&dart);

    SearchSpace::new().branch(1.0, gbtree).branch(1.0, gbtree_dart)
}

/// One draw from [`xgb_search_space`]; `seed = None` seeds from entropy
pub fn random_config(seed: Option<u64>) -> Result<HyperParams> {
    let mut rng = match seed {
        Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
        None => Xoshiro256PlusPlus::from_entropy(),
    };
    let params = xgb_search_space().sample(&mut rng)?;
    info!(params = %params, "using random hp config");
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hyperparams::ParamValue;

    #[test]
    fn test_default_config_is_stable() {
        assert_eq!(default_config(false), default_config(false));
        assert_eq!(default_config(true), default_config(true));
        assert_ne!(default_config(true), default_config(false));
    }

    #[test]
    fn test_default_depths() {
        assert_eq!(default_config(true).get("max_depth"), Some(&ParamValue::Int(8)));
        assert_eq!(default_config(false).get("max_depth"), Some(&ParamValue::Int(6)));
        assert_eq!(default_config(false).get("min_child_weight"), Some(&ParamValue::Int(1)));
    }

    #[test]
    fn test_random_config_keys() {
        let mut saw_dart = false;
        let mut saw_gbtree = false;
        for seed in 0..64 {
            let hp = random_config(Some(seed)).unwrap();
            for key in COMMON_KEYS {
                assert!(hp.contains_key(key), "missing {} for seed {}", key, seed);
            }
            let is_dart = hp.get("booster").and_then(ParamValue::as_str) == Some("dart");
            for key in DART_KEYS {
                assert_eq!(hp.contains_key(key), is_dart, "key {} for seed {}", key, seed);
            }
            saw_dart |= is_dart;
            saw_gbtree |= !is_dart;
        }
        assert!(saw_dart && saw_gbtree);
    }

    #[test]
    fn test_random_config_seeded_is_reproducible() {
        assert_eq!(random_config(Some(42)).unwrap(), random_config(Some(42)).unwrap());
    }

    #[test]
    fn test_random_config_types() {
        for seed in 0..32 {
            let hp = random_config(Some(seed)).unwrap();
            assert!(matches!(hp.get("max_depth"), Some(ParamValue::Int(_))));
            assert!(matches!(hp.get("silent"), Some(ParamValue::Int(1))));
            for (_, v) in hp.iter() {
                assert!(!v.is_default_sentinel());
                if let ParamValue::Float(f) = v {
                    assert!(f.fract() != 0.0);
                }
            }
        }
    }
}
