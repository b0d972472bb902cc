//! Integration tests for the mynah CLI.

use clap::Parser;
use mynah::cli::{Cli, run};
use std::fs;
use std::path::PathBuf;

const MODEL_ID: &str = "istupakov/parakeet-tdt-0.6b-v2-onnx";

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(name);
    fs::remove_dir_all(&dir).ok();
    fs::create_dir_all(&dir).expect("failed to create temp dir");
    dir
}

#[test]
fn score_recomputes_wer_from_manifest() {
    let dir = temp_dir("mynah-score-test");
    let manifest = dir.join("MODEL_m_DATASET_d_test.jsonl");

    fs::write(
        &manifest,
        concat!(
            r#"{"audio_filepath": "/cache/a.wav", "duration": 2.0, "text": "the cat sat", "pred_text": "the bat sat"}"#,
            "\n",
            r#"{"audio_filepath": "/cache/b.wav", "duration": 1.0, "text": "on the mat", "pred_text": "on the mat"}"#,
            "\n",
        ),
    )
    .unwrap();

    let cli = Cli::parse_from(["mynah", "score", manifest.to_str().unwrap()]);

    run(cli).expect("scoring an existing manifest should succeed");

    fs::remove_dir_all(dir).ok();
}

#[test]
fn score_rejects_empty_manifest() {
    let dir = temp_dir("mynah-score-empty-test");
    let manifest = dir.join("empty.jsonl");
    fs::write(&manifest, "").unwrap();

    let cli = Cli::parse_from(["mynah", "score", manifest.to_str().unwrap()]);

    assert!(run(cli).is_err());

    fs::remove_dir_all(dir).ok();
}

#[test]
fn run_fails_cleanly_on_missing_dataset() {
    let dir = temp_dir("mynah-run-missing-test");

    let cli = Cli::parse_from([
        "mynah",
        "run",
        "--model-id",
        "unused",
        "--model-source",
        "path",
        "--dataset-path",
        dir.to_str().unwrap(),
        "--dataset",
        "nope",
    ]);

    assert!(run(cli).is_err());

    fs::remove_dir_all(dir).ok();
}

#[test]
#[ignore = "network I/O and model download required"]
fn run_evaluates_small_split() {
    let dir = temp_dir("mynah-run-test");

    // One-second silent test clip plus its manifest
    let dataset_dir = dir.join("datasets/smoke");
    fs::create_dir_all(&dataset_dir).unwrap();

    let wav_path = dataset_dir.join("utt1.wav");
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 16000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&wav_path, spec).unwrap();
    for _ in 0..16000 {
        writer.write_sample(0i16).unwrap();
    }
    writer.finalize().unwrap();

    fs::write(
        dataset_dir.join("test.jsonl"),
        r#"{"audio_filepath": "utt1.wav", "text": "silence"}"#,
    )
    .unwrap();

    let cli = Cli::parse_from([
        "mynah",
        "run",
        "--model-id",
        MODEL_ID,
        "--dataset-path",
        dir.join("datasets").to_str().unwrap(),
        "--dataset",
        "smoke",
        "--batch-size",
        "1",
        "--cache-dir",
        dir.join("audio_cache").to_str().unwrap(),
        "--results-dir",
        dir.join("results").to_str().unwrap(),
    ]);

    run(cli).expect("evaluation run should succeed");

    let results: Vec<_> = fs::read_dir(dir.join("results"))
        .unwrap()
        .collect::<std::io::Result<_>>()
        .unwrap();
    assert_eq!(results.len(), 1, "expected exactly one results manifest");

    fs::remove_dir_all(dir).ok();
}
