//! mynah-eval: dataset plumbing and scoring for ASR benchmarks.
//!
//! Covers everything around the model: reading labeled split manifests,
//! materializing audio into a local cache, normalizing transcript text,
//! computing WER and RTFX, and persisting a results manifest.

pub mod cache;
pub mod dataset;
pub mod error;
pub mod manifest;
pub mod metrics;
pub mod textnorm;
