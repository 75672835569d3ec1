//! End-to-end run: load, pick hyperparameters, train, diagnose

use crate::booster::Booster;
use crate::config::PipelineConfig;
use crate::data::{load_cached, load_data, LoadedData};
use crate::diagnostics::{run_diagnostics, DiagnosticsReport};
use crate::error::Result;
use crate::hyperparams::{default_config, random_config, HyperParams};
use crate::layout::ArtifactLayout;
use crate::training::{EvalRecord, Trainer};
use std::path::{Path, PathBuf};
use tracing::info;

/// Everything a run produced
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub hyper_params: HyperParams,
    pub booster: Booster,
    pub record: EvalRecord,
    pub results_path: PathBuf,
    pub diagnostics: Option<DiagnosticsReport>,
    pub train_rows: usize,
    pub test_rows: usize,
}

/// Preset or randomly drawn hyperparameters, as configured
pub fn select_hyper_params(config: &PipelineConfig) -> Result<HyperParams> {
    if config.random_hp {
        info!("Using random hp config");
        random_config(config.hp_seed)
    } else {
        info!("Using default hp config");
        Ok(default_config(config.deep_trees))
    }
}

/// Read (or reload) the train/test matrices for `(channel, mode)`
pub fn load_inputs(
    data_file: &Path,
    channel: &str,
    mode: &str,
    config: &PipelineConfig,
    layout: &ArtifactLayout,
) -> Result<LoadedData> {
    if config.from_cache {
        info!(channel, mode, "reusing cached matrices");
        load_cached(mode, channel, layout)
    } else {
        info!("Loading dataset from: {} with test size {}", data_file.display(), config.test_size);
        load_data(data_file, mode, channel, layout, config.test_size)
    }
}

pub fn run_pipeline(
    data_file: &Path,
    channel: &str,
    mode: &str,
    config: &PipelineConfig,
    layout: &ArtifactLayout,
) -> Result<PipelineOutcome> {
    let data = load_inputs(data_file, channel, mode, config, layout)?;
    let hyper_params = select_hyper_params(config)?;

    info!("Boosting for {} iterations", config.num_boost_rounds);
    let trainer = Trainer::new(layout.clone(), channel, mode)
        .with_early_stopping_rounds(config.early_stopping_rounds)
        .with_verbose_eval(config.verbose_eval);
    let (booster, record) = trainer.train_hyp_config(&data, &hyper_params, config.num_boost_rounds)?;
    let results_path = trainer.save_results(&record)?;

    let diagnostics = if config.diagnostics {
        Some(run_diagnostics(&data, &booster, &hyper_params, layout, channel, mode)?)
    } else {
        None
    };

    Ok(PipelineOutcome {
        hyper_params,
        booster,
        record,
        results_path,
        diagnostics,
        train_rows: data.train.n_rows(),
        test_rows: data.test.n_rows(),
    })
}
