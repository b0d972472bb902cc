//! Error types for mynah-eval organized by evaluation stage.

use std::path::PathBuf;
use thiserror::Error;

/// Evaluation error variants organized by stage.
#[derive(Debug, Error)]
pub enum Error {
    /// Dataset loading stage error
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    /// Audio cache stage error
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// Metric computation error
    #[error(transparent)]
    Metric(#[from] MetricError),
}

/// Split and results manifest errors.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// Manifest file could not be read
    #[error("failed to read manifest {path:?}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A manifest line is not valid JSON
    #[error("malformed manifest line {line} in {path:?}")]
    MalformedLine {
        path: PathBuf,
        line: usize,
        source: serde_json::Error,
    },

    /// Two samples resolve to the same id, which would collide in the
    /// audio cache
    #[error("duplicate sample id {id:?} in {path:?} (lines {first} and {second})")]
    DuplicateId {
        path: PathBuf,
        id: String,
        first: usize,
        second: usize,
    },

    /// Manifest file could not be written
    #[error("failed to write manifest {path:?}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A result record could not be serialized
    #[error("failed to serialize manifest record")]
    Serialize { source: serde_json::Error },
}

/// Audio materialization errors.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Sample rate validation failed
    #[error("invalid sample rate for {id}: expected {expected}Hz, got {got}Hz")]
    InvalidSampleRate { id: String, expected: u32, got: u32 },

    /// Channel count validation failed
    #[error("invalid channel count for {id}: expected mono or stereo, got {got} channels")]
    InvalidChannels { id: String, got: u16 },

    /// Audio contains no samples
    #[error("sample {0} has no audio")]
    Empty(String),

    /// IO error during materialization
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// WAV file format error
    #[error(transparent)]
    Hound(#[from] hound::Error),
}

/// Metric computation errors.
#[derive(Debug, Error)]
pub enum MetricError {
    /// Reference/hypothesis list lengths differ
    #[error("reference and hypothesis counts differ: {references} vs {hypotheses}")]
    LengthMismatch {
        references: usize,
        hypotheses: usize,
    },

    /// Reference corpus contains no words
    #[error("reference corpus is empty, WER is undefined")]
    EmptyCorpus,

    /// Transcription wall time was not positive
    #[error("wall time must be positive to compute RTFX, got {0}s")]
    NonPositiveWallTime(f64),
}

/// Result type alias for mynah-eval operations.
pub type Result<T> = std::result::Result<T, Error>;

// Nested From implementations for automatic error conversion chains

// hound::Error → CacheError → Error
impl From<hound::Error> for Error {
    fn from(e: hound::Error) -> Self {
        Error::Cache(CacheError::Hound(e))
    }
}

// std::io::Error → CacheError → Error
impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Cache(CacheError::Io(e))
    }
}
