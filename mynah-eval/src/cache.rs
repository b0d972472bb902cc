//! Audio cache: materialize dataset samples as canonical local WAV files.
//!
//! Source audio is decoded, downmixed to mono, and written as 16kHz 16-bit
//! PCM into `<cache_root>/<dataset>/<id>.wav`. Files already present in the
//! cache are reused without rewriting.

use crate::dataset::Sample;
use crate::error::{CacheError, Result};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::fs;
use std::path::{Path, PathBuf};

/// Sample rate every cached file is stored at (16kHz)
pub const SAMPLE_RATE: u32 = 16000;

/// Per-dataset audio cache directory.
#[derive(Debug)]
pub struct AudioCache {
    dir: PathBuf,
}

/// A sample materialized to a local file, with its measured duration.
#[derive(Clone, Debug)]
pub struct CachedSample {
    pub id: String,
    pub path: PathBuf,
    pub duration_secs: f64,
    pub text: String,
}

impl AudioCache {
    /// Open (creating if needed) the cache directory for a dataset.
    pub fn new(cache_root: impl AsRef<Path>, dataset: &str) -> Result<Self> {
        let dir = cache_root.as_ref().join(dataset);
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Materialize one sample into the cache.
    ///
    /// If `<id>.wav` already exists it is trusted and only its duration is
    /// measured; otherwise the source audio is decoded, validated, and
    /// written in canonical form.
    pub fn materialize(&self, sample: &Sample) -> Result<CachedSample> {
        let path = self.dir.join(format!("{}.wav", sample.id));

        let duration_secs = if path.exists() {
            cached_duration(&path)?
        } else {
            let audio = decode_mono(&sample.audio_filepath, &sample.id)?;
            write_pcm16(&path, &audio)?;
            audio.len() as f64 / SAMPLE_RATE as f64
        };

        Ok(CachedSample {
            id: sample.id.clone(),
            path,
            duration_secs,
            text: sample.text.clone(),
        })
    }
}

/// Sort materialized samples by descending duration.
///
/// Longest utterances first keeps batch members of similar length, which
/// minimizes padding waste in the batched encoder. Stable: ties keep
/// manifest order.
pub fn sort_by_duration_desc(samples: &mut [CachedSample]) {
    samples.sort_by(|a, b| {
        b.duration_secs
            .partial_cmp(&a.duration_secs)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Measure the duration of an already-cached file.
fn cached_duration(path: &Path) -> Result<f64> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();
    Ok(reader.duration() as f64 / spec.sample_rate as f64)
}

/// Decode source audio to mono f32 at 16kHz.
fn decode_mono(path: &Path, id: &str) -> Result<Vec<f32>> {
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();

    if spec.sample_rate != SAMPLE_RATE {
        return Err(CacheError::InvalidSampleRate {
            id: id.to_string(),
            expected: SAMPLE_RATE,
            got: spec.sample_rate,
        }
        .into());
    }

    if spec.channels == 0 || spec.channels > 2 {
        return Err(CacheError::InvalidChannels {
            id: id.to_string(),
            got: spec.channels,
        }
        .into());
    }

    let mut audio: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader.samples::<f32>().collect::<hound::Result<_>>()?,
        SampleFormat::Int => reader
            .samples::<i16>()
            .map(|s| s.map(|s| s as f32 / i16::MAX as f32))
            .collect::<hound::Result<_>>()?,
    };

    if spec.channels == 2 {
        audio = audio
            .chunks(2)
            .map(|chunk| chunk.iter().sum::<f32>() / 2.0)
            .collect();
    }

    if audio.is_empty() {
        return Err(CacheError::Empty(id.to_string()).into());
    }

    Ok(audio)
}

/// Write mono f32 samples as canonical 16kHz 16-bit PCM.
fn write_pcm16(path: &Path, audio: &[f32]) -> Result<()> {
    let spec = WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec)?;
    for &sample in audio {
        writer.write_sample((sample * i16::MAX as f32) as i16)?;
    }
    writer.finalize()?;

    Ok(())
}
