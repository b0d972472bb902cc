//! WAV loading and validation.

use crate::error::{AudioError, Result};
use hound::{SampleFormat, WavReader, WavSpec};
use std::path::Path;

/// Sample rate expected by Parakeet models (16kHz)
pub const SAMPLE_RATE: u32 = 16000;

/// Load audio from a WAV file.
///
/// Returns audio samples and WAV specification. Integer samples are scaled
/// to the `[-1.0, 1.0]` float range.
pub fn load_audio<P: AsRef<Path>>(path: P) -> Result<(Vec<f32>, WavSpec)> {
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader.samples::<f32>().collect::<hound::Result<_>>()?,
        SampleFormat::Int => reader
            .samples::<i16>()
            .map(|s| s.map(|s| s as f32 / i16::MAX as f32))
            .collect::<hound::Result<_>>()?,
    };

    Ok((samples, spec))
}

/// Load audio from a WAV file as mono f32 samples at 16kHz.
///
/// Validates sample rate is 16kHz and converts stereo to mono if needed.
///
/// # Errors
///
/// Returns error if:
/// - File cannot be read
/// - Sample rate is not 16kHz
/// - Channel count is invalid (0 or > 2)
pub fn read_audio_mono(path: impl AsRef<Path>) -> Result<Vec<f32>> {
    let (mut audio, spec) = load_audio(&path)?;

    if spec.sample_rate != SAMPLE_RATE {
        return Err(AudioError::InvalidSampleRate {
            expected: SAMPLE_RATE,
            got: spec.sample_rate,
        }
        .into());
    }

    if spec.channels == 0 || spec.channels > 2 {
        return Err(AudioError::InvalidChannels(spec.channels).into());
    }

    if spec.channels == 2 {
        audio = audio
            .chunks(2)
            .map(|chunk| chunk.iter().sum::<f32>() / 2.0)
            .collect();
    }

    if audio.is_empty() {
        return Err(AudioError::Empty(path.as_ref().display().to_string()).into());
    }

    Ok(audio)
}
