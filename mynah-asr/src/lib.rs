//! mynah-asr: Parakeet TDT inference for batch evaluation.
//!
//! Wraps NVIDIA Parakeet TDT (Token-and-Duration Transducer) ONNX exports
//! behind a small API geared towards offline benchmarking: load a model from
//! a local directory or the Hugging Face Hub, then transcribe a list of WAV
//! files in padded batches.
//!
//! # Quick Start
//!
//! ```ignore
//! use mynah_asr::repo::ModelRepo;
//! use mynah_asr::tdt::TdtRecognizer;
//! use ort::session::Session;
//!
//! let repo = ModelRepo::Path("models/parakeet-tdt".into());
//! let mut recognizer = TdtRecognizer::from_repo(&repo, Session::builder()?)?;
//!
//! let texts = recognizer.transcribe_batch(&paths, 32)?;
//! ```

pub mod audio;
pub mod error;
pub mod features;
pub mod repo;
pub mod tdt;
