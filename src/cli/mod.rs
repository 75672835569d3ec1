//! Command-line interface for the training pipeline

use clap::Parser;
use colored::*;
use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Instant;

use crate::config::{PipelineConfig, DEFAULT_NUM_BOOST_ROUNDS, DEFAULT_TEST_SIZE};
use crate::layout::ArtifactLayout;
use crate::pipeline::run_pipeline;

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn step_run(msg: &str) {
    println!("  {} {}...", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("  {} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

fn kv(key: &str, val: &str) {
    println!("  {:<16} {}", muted(key), val.white());
}

// ─── Arguments ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "sigboost")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Train a boosted-tree signal/background classifier")]
#[command(long_about = None)]
pub struct Cli {
    /// Path to training dataset (CSV or Parquet, last column `labels`)
    pub data_file: PathBuf,

    /// Decay channel
    pub channel: String,

    /// Background type
    pub mode: String,

    /// Number of boosting rounds
    #[arg(
        short = 'n',
        long = "num_boost_rounds",
        default_value_t = DEFAULT_NUM_BOOST_ROUNDS,
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub num_boost_rounds: usize,

    /// Use random hyperparameters
    #[arg(short = 'r', long = "randomhp")]
    pub randomhp: bool,

    /// Deeper tree config
    #[arg(long = "deeptrees")]
    pub deeptrees: bool,

    /// Save diagnostics to file
    #[arg(long = "diagnostics")]
    pub diagnostics: bool,

    /// Seed for random hyperparameter sampling
    #[arg(long)]
    pub seed: Option<u64>,

    /// Held-out test fraction
    #[arg(long = "test-size", default_value_t = DEFAULT_TEST_SIZE)]
    pub test_size: f64,

    /// Reuse the cached binary matrices instead of reading the table
    #[arg(long = "from-cache")]
    pub from_cache: bool,
}

impl Cli {
    /// Parse process arguments, accepting the single-dash long forms
    pub fn parse_normalized() -> Self {
        Self::parse_from(normalize_args(std::env::args_os()))
    }

    pub fn to_config(&self) -> PipelineConfig {
        let mut config = PipelineConfig::new()
            .with_num_boost_rounds(self.num_boost_rounds)
            .with_test_size(self.test_size)
            .with_deep_trees(self.deeptrees)
            .with_diagnostics(self.diagnostics)
            .with_from_cache(self.from_cache);
        if self.randomhp {
            config = config.with_random_hp(self.seed);
        }
        config
    }
}

/// Rewrite `-deep` and `-diag` to `--deeptrees` and `--diagnostics`
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    args.into_iter()
        .map(Into::into)
        .map(|arg| match arg.to_str() {
            Some("-deep") => OsString::from("--deeptrees"),
            Some("-diag") => OsString::from("--diagnostics"),
            _ => arg,
        })
        .collect()
}

// ─── Command ───────────────────────────────────────────────────────────────────

/// Run the whole pipeline from the working directory
pub fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = cli.to_config();
    let layout = ArtifactLayout::current_dir();

    section("Train");
    kv("Data", &cli.data_file.display().to_string());
    kv("Channel", &cli.channel);
    kv("Mode", &cli.mode);
    kv("Rounds", &config.num_boost_rounds.to_string());
    let hp_source = match (config.random_hp, config.deep_trees) {
        (true, _) => "random",
        (false, true) => "default (deep)",
        (false, false) => "default",
    };
    kv("Hyperparams", hp_source);
    println!();

    step_run("Boosting");
    let start = Instant::now();
    let outcome = run_pipeline(&cli.data_file, &cli.channel, &cli.mode, &config, &layout)?;
    step_done(&format!(
        "{} trees on {} rows in {:.1}s",
        outcome.booster.num_trees(),
        outcome.train_rows,
        start.elapsed().as_secs_f64()
    ));

    println!();
    kv("Params", &outcome.hyper_params.to_string());
    kv("Best round", &outcome.record.best_iteration.to_string());
    kv("Eval AUC", &format!("{:.4}", outcome.record.auc));
    kv("Error", &outcome.record.error);
    kv("Results", &outcome.results_path.display().to_string());

    if let Some(report) = &outcome.diagnostics {
        println!();
        kv("Test accuracy", &format!("{:.4}", report.accuracy));
        kv("ROC AUC", &format!("{:.4}", report.roc_auc));
        kv("ROC plot", &report.roc_plot.display().to_string());
        kv("Importances", &report.importance_plot.display().to_string());
        kv("Predictions", &report.predictions_file.display().to_string());
    }
    println!();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(normalize_args(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_positional_and_defaults() {
        let cli = parse(&["sigboost", "data.csv", "b2dk", "cont"]);
        assert_eq!(cli.data_file, PathBuf::from("data.csv"));
        assert_eq!(cli.channel, "b2dk");
        assert_eq!(cli.mode, "cont");
        assert_eq!(cli.num_boost_rounds, 512);
        assert!(!cli.randomhp && !cli.deeptrees && !cli.diagnostics);
        assert!((cli.test_size - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_legacy_single_dash_flags() {
        let cli = parse(&["sigboost", "d.parquet", "ch", "md", "-deep", "-diag", "-n", "100", "-r"]);
        assert!(cli.deeptrees);
        assert!(cli.diagnostics);
        assert!(cli.randomhp);
        assert_eq!(cli.num_boost_rounds, 100);
    }

    #[test]
    fn test_long_flags_and_config() {
        let cli = parse(&[
            "sigboost", "d.csv", "ch", "md", "--num_boost_rounds", "64", "--randomhp", "--seed", "9",
            "--from-cache", "--test-size", "0.2",
        ]);
        let config = cli.to_config();
        assert_eq!(config.num_boost_rounds, 64);
        assert!(config.random_hp);
        assert_eq!(config.hp_seed, Some(9));
        assert!(config.from_cache);
        assert!((config.test_size - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_missing_positional_fails() {
        assert!(Cli::try_parse_from(["sigboost", "d.csv", "ch"]).is_err());
    }

    #[test]
    fn test_zero_rounds_rejected() {
        assert!(Cli::try_parse_from(["sigboost", "d.csv", "ch", "md", "-n", "0"]).is_err());
        let cli = Cli::try_parse_from(["sigboost", "d.csv", "ch", "md", "-n", "1"]).unwrap();
        assert_eq!(cli.num_boost_rounds, 1);
    }
}
