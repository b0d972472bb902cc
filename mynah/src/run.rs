//! Run subcommand - evaluate a model over a dataset split.

use crate::config::{ModelArgs, ModelConfig, session_builder};
use color_eyre::Section;
use eyre::{Context, Result, ensure};
use mynah_asr::tdt::TdtRecognizer;
use mynah_eval::cache::{AudioCache, CachedSample, sort_by_duration_desc};
use mynah_eval::dataset::SplitManifest;
use mynah_eval::manifest::{ResultRecord, write_manifest};
use mynah_eval::metrics::{round2, rtfx, wer};
use mynah_eval::textnorm::normalize;
use std::path::PathBuf;
use std::time::Instant;

/// CLI arguments for evaluation.
#[derive(clap::Args, Debug)]
pub struct Args {
    #[command(flatten)]
    pub model: ModelArgs,

    /// Dataset root directory
    #[arg(long, default_value = "datasets")]
    pub dataset_path: PathBuf,

    /// Dataset name (subdirectory of the dataset root)
    #[arg(long)]
    pub dataset: String,

    /// Dataset split to evaluate
    #[arg(long, default_value = "test")]
    pub split: String,

    /// Samples per inference batch
    #[arg(long, default_value_t = 32)]
    pub batch_size: usize,

    /// Evaluate only the first N samples
    #[arg(long)]
    pub max_eval_samples: Option<usize>,

    /// Directory for materialized audio
    #[arg(long, default_value = "audio_cache")]
    pub cache_dir: PathBuf,

    /// Directory for results manifests
    #[arg(long, default_value = "results")]
    pub results_dir: PathBuf,
}

/// Resolved configuration for evaluation.
#[derive(Debug)]
pub struct Config {
    pub model: ModelConfig,
    pub dataset_path: PathBuf,
    pub dataset: String,
    pub split: String,
    pub batch_size: usize,
    pub max_eval_samples: Option<usize>,
    pub cache_dir: PathBuf,
    pub results_dir: PathBuf,
}

impl TryFrom<Args> for Config {
    type Error = eyre::Error;

    fn try_from(args: Args) -> Result<Self> {
        Ok(Self {
            model: args.model.try_into()?,
            dataset_path: args.dataset_path,
            dataset: args.dataset,
            split: args.split,
            batch_size: args.batch_size,
            max_eval_samples: args.max_eval_samples,
            cache_dir: args.cache_dir,
            results_dir: args.results_dir,
        })
    }
}

pub fn execute(config: Config) -> Result<()> {
    let mut split = SplitManifest::load(&config.dataset_path, &config.dataset, &config.split)
        .wrap_err("failed to load dataset split")
        .with_suggestion(|| {
            format!(
                "expected manifest at {:?}",
                config
                    .dataset_path
                    .join(&config.dataset)
                    .join(format!("{}.jsonl", config.split))
            )
        })?;

    if let Some(n) = config.max_eval_samples.filter(|&n| n > 0) {
        tracing::info!(n, "subsampling dataset to first samples");
        split.truncate(n);
    }

    ensure!(!split.is_empty(), "dataset split has no samples to evaluate");

    let mut cached = materialize_split(&config, &split)?;
    sort_by_duration_desc(&mut cached);

    let s = Instant::now();

    let builder = session_builder()?;
    let mut recognizer = TdtRecognizer::from_repo(&config.model.repo, builder)
        .wrap_err_with(|| format!("failed to load model: {}", config.model.model_id))?;

    tracing::info!(duration = %format_secs(s.elapsed().as_secs_f64()), "model loaded");

    let paths: Vec<PathBuf> = cached.iter().map(|c| c.path.clone()).collect();

    let s = Instant::now();

    let hypotheses = recognizer
        .transcribe_batch(&paths, config.batch_size)
        .wrap_err("transcription failed")?;

    let wall_secs = s.elapsed().as_secs_f64();
    tracing::info!(duration = %format_secs(wall_secs), "inference completed");

    let references: Vec<String> = cached.iter().map(|c| normalize(&c.text)).collect();
    let predictions: Vec<String> = hypotheses.iter().map(|h| normalize(h)).collect();

    let records: Vec<ResultRecord> = cached
        .iter()
        .zip(references.iter().zip(&predictions))
        .map(|(sample, (text, pred_text))| ResultRecord {
            audio_filepath: sample.path.clone(),
            duration: sample.duration_secs,
            text: text.clone(),
            pred_text: pred_text.clone(),
        })
        .collect();

    let manifest_path = write_manifest(
        &config.results_dir,
        &config.model.model_id,
        &config.dataset,
        &config.split,
        &records,
    )?;

    println!("Results saved at path: {}", manifest_path.display());

    let total_audio_secs: f64 = cached.iter().map(|c| c.duration_secs).sum();
    let wer_pct = round2(100.0 * wer(&references, &predictions)?);
    let rtfx_value = round2(rtfx(total_audio_secs, wall_secs)?);

    println!("RTFX: {rtfx_value}");
    println!("WER: {wer_pct} %");

    Ok(())
}

/// Materialize every sample of the split into the audio cache.
fn materialize_split(config: &Config, split: &SplitManifest) -> Result<Vec<CachedSample>> {
    let cache = AudioCache::new(&config.cache_dir, &config.dataset)?;

    let mut cached = Vec::with_capacity(split.len());

    for sample in split.samples() {
        let item = cache
            .materialize(sample)
            .wrap_err_with(|| format!("failed to materialize sample: {}", sample.id))?;
        cached.push(item);
    }

    let total_audio_secs: f64 = cached.iter().map(|c| c.duration_secs).sum();
    tracing::info!(
        count = cached.len(),
        total_audio_secs = format!("{total_audio_secs:.1}"),
        dir = %cache.dir().display(),
        "samples materialized"
    );

    Ok(cached)
}

/// Format seconds as a string with two decimal places.
fn format_secs(secs: f64) -> String {
    format!("{secs:.2}s")
}
