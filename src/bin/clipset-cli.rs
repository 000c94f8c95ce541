use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use clipset::config::RunConfig;
use clipset::dataset;
use clipset::logging;
use clipset::merge::merge;
use clipset::records::write_backup;
use clipset::runner::Pipeline;
use clipset::whisper_api::{WhisperApiClient, WhisperApiConfig};

fn main() -> Result<()> {
    logging::init();
    let params = Params::parse();

    // Fatal startup precondition: no credential, no run.
    let api_key = std::env::var("OPENAI_API_KEY")
        .context("OPENAI_API_KEY must be set in the environment")?;

    let mut config = RunConfig::load(&params.config_path)?;
    if let Some(dataset_path) = params.dataset {
        config.output.dataset = dataset_path;
    }
    if let Some(backup_path) = params.backup {
        config.output.backup = backup_path;
    }
    if let Some(clips_dir) = params.clips_dir {
        config.clips.dir = Some(clips_dir);
    }
    if params.no_clips {
        config.clips.dir = None;
    }

    let mut api = WhisperApiConfig::new(api_key);
    api.model = config.transcription.model.clone();
    api.language = config.transcription.language.clone();
    api.prompt = config.transcription.prompt.clone();
    let client = WhisperApiClient::new(api)?;

    let mut pipeline = Pipeline::new(&client)
        .with_silence_policy(config.segmentation.policy())
        .with_clip_policy(config.clips.policy());
    if let Some(dir) = &config.clips.dir {
        pipeline = pipeline.with_clips_dir(dir);
    }

    let results = pipeline.run(&config.sources)?;

    write_backup(&config.output.backup, &results)?;
    tracing::info!(
        backup = %config.output.backup.display(),
        sources = results.len(),
        "wrote transcript backup"
    );

    let existing = dataset::load(&config.output.dataset)?;
    let merged = merge(existing, &results);
    dataset::save(&config.output.dataset, &merged)?;
    tracing::info!(
        dataset = %config.output.dataset.display(),
        entries = merged.len(),
        "dataset updated"
    );

    Ok(())
}

#[derive(Parser, Debug)]
#[command(name = "clipset")]
#[command(about = "Builds labeled clip + transcript study sets from long recordings")]
struct Params {
    /// Run configuration (sources, segmentation, output paths).
    #[arg(short = 'c', long = "config", default_value = "clipset.toml")]
    pub config_path: PathBuf,

    /// Override the dataset file from the config.
    #[arg(long = "dataset")]
    pub dataset: Option<PathBuf>,

    /// Override the transcript backup file from the config.
    #[arg(long = "backup")]
    pub backup: Option<PathBuf>,

    /// Override the clip output directory from the config.
    #[arg(long = "clips-dir")]
    pub clips_dir: Option<PathBuf>,

    /// Skip writing clip files even if the config enables them.
    #[arg(long = "no-clips", default_value_t = false)]
    pub no_clips: bool,
}
