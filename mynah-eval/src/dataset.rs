//! Labeled dataset splits stored as NeMo-style JSON-lines manifests.
//!
//! A split lives at `<root>/<dataset>/<split>.jsonl` with one record per
//! utterance: `{"audio_filepath": "...", "text": "...", "id": "..."}`.
//! `id` is optional and defaults to the audio file stem.

use crate::error::{DatasetError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// One labeled utterance from a split manifest.
#[derive(Clone, Debug, Deserialize)]
pub struct Sample {
    /// Stable per-utterance identifier, used to name cached audio
    #[serde(default)]
    pub id: String,
    /// Source audio path; relative paths resolve against the dataset root
    pub audio_filepath: PathBuf,
    /// Reference transcript
    pub text: String,
}

/// A loaded dataset split.
#[derive(Debug)]
pub struct SplitManifest {
    pub dataset: String,
    pub split: String,
    samples: Vec<Sample>,
}

impl SplitManifest {
    /// Load `<root>/<dataset>/<split>.jsonl`.
    ///
    /// Malformed lines and duplicate sample ids are hard errors naming the
    /// offending line numbers. Ids name cached audio files, so a duplicate
    /// would silently serve one sample's audio for another.
    pub fn load(root: impl AsRef<Path>, dataset: &str, split: &str) -> Result<Self> {
        let dataset_dir = root.as_ref().join(dataset);
        let path = dataset_dir.join(format!("{split}.jsonl"));

        let content = fs::read_to_string(&path).map_err(|source| DatasetError::Read {
            path: path.clone(),
            source,
        })?;

        let mut samples = Vec::new();
        let mut seen_ids: HashMap<String, usize> = HashMap::new();

        for (i, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }

            let mut sample: Sample =
                serde_json::from_str(line).map_err(|source| DatasetError::MalformedLine {
                    path: path.clone(),
                    line: i + 1,
                    source,
                })?;

            if sample.audio_filepath.is_relative() {
                sample.audio_filepath = dataset_dir.join(&sample.audio_filepath);
            }

            if sample.id.is_empty() {
                sample.id = sample
                    .audio_filepath
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| format!("sample_{i}"));
            }

            if let Some(&first) = seen_ids.get(&sample.id) {
                return Err(DatasetError::DuplicateId {
                    path,
                    id: sample.id,
                    first,
                    second: i + 1,
                }
                .into());
            }
            seen_ids.insert(sample.id.clone(), i + 1);

            samples.push(sample);
        }

        tracing::info!(
            dataset,
            split,
            count = samples.len(),
            "loaded split manifest"
        );

        Ok(Self {
            dataset: dataset.to_string(),
            split: split.to_string(),
            samples,
        })
    }

    /// All samples in manifest order.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Keep only the first `n` samples.
    pub fn truncate(&mut self, n: usize) {
        self.samples.truncate(n);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_split(dir: &Path, dataset: &str, split: &str, lines: &str) -> PathBuf {
        let dataset_dir = dir.join(dataset);
        fs::create_dir_all(&dataset_dir).unwrap();
        let path = dataset_dir.join(format!("{split}.jsonl"));
        fs::write(&path, lines).unwrap();
        path
    }

    #[test]
    fn loads_samples_in_order() {
        let root = std::env::temp_dir().join("mynah_dataset_order");
        fs::remove_dir_all(&root).ok();
        write_split(
            &root,
            "librispeech",
            "test",
            concat!(
                r#"{"id": "a", "audio_filepath": "a.wav", "text": "hello"}"#,
                "\n",
                r#"{"id": "b", "audio_filepath": "b.wav", "text": "world"}"#,
                "\n",
            ),
        );

        let manifest = SplitManifest::load(&root, "librispeech", "test").unwrap();

        assert_eq!(manifest.len(), 2);
        assert_eq!(manifest.samples()[0].id, "a");
        assert_eq!(manifest.samples()[1].text, "world");

        fs::remove_dir_all(root).ok();
    }

    #[test]
    fn resolves_relative_audio_paths() {
        let root = std::env::temp_dir().join("mynah_dataset_relpath");
        fs::remove_dir_all(&root).ok();
        write_split(
            &root,
            "voxpopuli",
            "test",
            r#"{"audio_filepath": "clips/x.wav", "text": "t"}"#,
        );

        let manifest = SplitManifest::load(&root, "voxpopuli", "test").unwrap();

        assert_eq!(
            manifest.samples()[0].audio_filepath,
            root.join("voxpopuli/clips/x.wav")
        );

        fs::remove_dir_all(root).ok();
    }

    #[test]
    fn missing_id_defaults_to_file_stem() {
        let root = std::env::temp_dir().join("mynah_dataset_id");
        fs::remove_dir_all(&root).ok();
        write_split(
            &root,
            "ami",
            "test",
            r#"{"audio_filepath": "clips/utt42.wav", "text": "t"}"#,
        );

        let manifest = SplitManifest::load(&root, "ami", "test").unwrap();

        assert_eq!(manifest.samples()[0].id, "utt42");

        fs::remove_dir_all(root).ok();
    }

    #[test]
    fn malformed_line_names_line_number() {
        let root = std::env::temp_dir().join("mynah_dataset_malformed");
        fs::remove_dir_all(&root).ok();
        write_split(
            &root,
            "earnings22",
            "test",
            concat!(
                r#"{"audio_filepath": "a.wav", "text": "fine"}"#,
                "\n",
                "{not json}\n",
            ),
        );

        let err = SplitManifest::load(&root, "earnings22", "test").unwrap_err();

        assert!(err.to_string().contains("line 2"));

        fs::remove_dir_all(root).ok();
    }

    #[test]
    fn rejects_colliding_default_ids() {
        let root = std::env::temp_dir().join("mynah_dataset_dup_stem");
        fs::remove_dir_all(&root).ok();
        // Distinct files, same stem: both would cache to utt.wav
        write_split(
            &root,
            "ami",
            "test",
            concat!(
                r#"{"audio_filepath": "c1/utt.wav", "text": "first"}"#,
                "\n",
                r#"{"audio_filepath": "c2/utt.wav", "text": "second"}"#,
                "\n",
            ),
        );

        let err = SplitManifest::load(&root, "ami", "test").unwrap_err();

        let message = err.to_string();
        assert!(message.contains("duplicate sample id"), "got: {message}");
        assert!(message.contains("utt"), "got: {message}");
        assert!(message.contains("lines 1 and 2"), "got: {message}");

        fs::remove_dir_all(root).ok();
    }

    #[test]
    fn rejects_duplicate_explicit_ids() {
        let root = std::env::temp_dir().join("mynah_dataset_dup_id");
        fs::remove_dir_all(&root).ok();
        write_split(
            &root,
            "ami",
            "test",
            concat!(
                r#"{"id": "utt1", "audio_filepath": "a.wav", "text": "a"}"#,
                "\n",
                r#"{"id": "utt1", "audio_filepath": "b.wav", "text": "b"}"#,
                "\n",
            ),
        );

        assert!(SplitManifest::load(&root, "ami", "test").is_err());

        fs::remove_dir_all(root).ok();
    }

    #[test]
    fn truncate_limits_sample_count() {
        let root = std::env::temp_dir().join("mynah_dataset_truncate");
        fs::remove_dir_all(&root).ok();
        write_split(
            &root,
            "gigaspeech",
            "test",
            concat!(
                r#"{"audio_filepath": "a.wav", "text": "1"}"#,
                "\n",
                r#"{"audio_filepath": "b.wav", "text": "2"}"#,
                "\n",
                r#"{"audio_filepath": "c.wav", "text": "3"}"#,
                "\n",
            ),
        );

        let mut manifest = SplitManifest::load(&root, "gigaspeech", "test").unwrap();
        manifest.truncate(2);

        assert_eq!(manifest.len(), 2);
        assert_eq!(manifest.samples()[1].text, "2");

        fs::remove_dir_all(root).ok();
    }

    #[test]
    fn skips_blank_lines() {
        let root = std::env::temp_dir().join("mynah_dataset_blank");
        fs::remove_dir_all(&root).ok();
        write_split(
            &root,
            "spgispeech",
            "test",
            concat!(
                r#"{"audio_filepath": "a.wav", "text": "1"}"#,
                "\n\n",
                r#"{"audio_filepath": "b.wav", "text": "2"}"#,
                "\n",
            ),
        );

        let manifest = SplitManifest::load(&root, "spgispeech", "test").unwrap();

        assert_eq!(manifest.len(), 2);

        fs::remove_dir_all(root).ok();
    }
}
