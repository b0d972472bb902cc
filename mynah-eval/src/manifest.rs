//! Results manifest: one JSON line per evaluated sample.

use crate::error::{DatasetError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// One scored sample in a results manifest.
///
/// `text` and `pred_text` are stored in normalized form, so a manifest can
/// be re-scored without access to the normalizer that produced it.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ResultRecord {
    pub audio_filepath: PathBuf,
    pub duration: f64,
    pub text: String,
    pub pred_text: String,
}

/// Write a results manifest, returning its absolute path.
///
/// File name is `MODEL_<model>_DATASET_<dataset>_<split>.jsonl` with
/// path-hostile characters in the model id sanitized.
pub fn write_manifest(
    results_dir: impl AsRef<Path>,
    model_id: &str,
    dataset: &str,
    split: &str,
    records: &[ResultRecord],
) -> Result<PathBuf> {
    let dir = results_dir.as_ref();
    fs::create_dir_all(dir).map_err(|source| DatasetError::Write {
        path: dir.to_path_buf(),
        source,
    })?;

    let file_name = format!(
        "MODEL_{}_DATASET_{}_{}.jsonl",
        sanitize(model_id),
        sanitize(dataset),
        sanitize(split),
    );
    let path = dir.join(file_name);

    let mut content = String::new();
    for record in records {
        let line = serde_json::to_string(record)
            .map_err(|source| DatasetError::Serialize { source })?;
        content.push_str(&line);
        content.push('\n');
    }

    fs::write(&path, content).map_err(|source| DatasetError::Write {
        path: path.clone(),
        source,
    })?;

    tracing::info!(path = %path.display(), records = records.len(), "wrote results manifest");

    let path = path.canonicalize().map_err(|source| DatasetError::Write {
        path: path.clone(),
        source,
    })?;

    Ok(path)
}

/// Read a results manifest back for re-scoring.
pub fn read_manifest(path: impl AsRef<Path>) -> Result<Vec<ResultRecord>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| DatasetError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let mut records = Vec::new();
    for (i, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(line).map_err(|source| DatasetError::MalformedLine {
            path: path.to_path_buf(),
            line: i + 1,
            source,
        })?;
        records.push(record);
    }

    Ok(records)
}

/// Replace characters unsafe in file names.
fn sanitize(part: &str) -> String {
    part.chars()
        .map(|c| if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' { c } else { '-' })
        .collect()
}
