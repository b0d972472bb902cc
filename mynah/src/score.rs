//! Score subcommand - recompute WER from a saved results manifest.

use eyre::{Context, Result, ensure};
use mynah_eval::manifest::read_manifest;
use mynah_eval::metrics::{round2, wer};
use mynah_eval::textnorm::normalize;
use std::path::PathBuf;

/// CLI arguments for manifest re-scoring.
#[derive(clap::Args, Debug)]
pub struct Args {
    /// Path to a results manifest produced by `mynah run`
    pub manifest: PathBuf,
}

/// Resolved configuration for re-scoring.
#[derive(Debug)]
pub struct Config {
    pub manifest: PathBuf,
}

impl TryFrom<Args> for Config {
    type Error = eyre::Error;

    fn try_from(args: Args) -> Result<Self> {
        Ok(Self {
            manifest: args.manifest,
        })
    }
}

pub fn execute(config: Config) -> Result<()> {
    let records = read_manifest(&config.manifest)
        .wrap_err_with(|| format!("failed to read manifest: {}", config.manifest.display()))?;

    ensure!(!records.is_empty(), "manifest has no records to score");

    // Normalization is idempotent, so re-normalizing stored text is a no-op
    // for manifests written by `mynah run` and a safety net for hand-edited
    // ones.
    let references: Vec<String> = records.iter().map(|r| normalize(&r.text)).collect();
    let predictions: Vec<String> = records.iter().map(|r| normalize(&r.pred_text)).collect();

    let total_audio_secs: f64 = records.iter().map(|r| r.duration).sum();
    let wer_pct = round2(100.0 * wer(&references, &predictions)?);

    println!("Samples: {}", records.len());
    println!("Audio duration: {total_audio_secs:.1}s");
    println!("WER: {wer_pct} %");

    Ok(())
}
