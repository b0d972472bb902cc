//! Mel-spectrogram feature extraction for Parakeet models.

use ndarray::Array2;
use std::f32::consts::PI;

/// Mel-spectrogram configuration.
///
/// Converts raw 16kHz mono audio into the log-mel features the Parakeet
/// encoder consumes.
#[derive(Clone, Debug)]
pub struct MelConfig {
    pub n_mels: usize,
    pub hop_length: usize,
    pub n_fft: usize,
    pub preemphasis: f32,
    pub sample_rate: usize,
    pub win_length: usize,
}

impl MelConfig {
    /// Parakeet TDT mel extractor (128 mel features).
    pub const PARAKEET: Self = Self {
        n_mels: 128,
        hop_length: 160,
        n_fft: 512,
        preemphasis: 0.97,
        sample_rate: 16000,
        win_length: 400,
    };

    /// Extract mel-spectrogram features from audio samples.
    ///
    /// # Arguments
    ///
    /// * `audio` - 16kHz mono audio samples
    ///
    /// # Returns
    ///
    /// 2D array of log-mel features, shape `(time_steps, n_mels)`
    pub fn apply(&self, audio: &[f32]) -> Array2<f32> {
        mel_spectrogram(audio, self)
    }
}

/// Apply preemphasis filter: `y[i] = x[i] - coef * x[i-1]`
fn apply_preemphasis(audio: &[f32], coef: f32) -> Vec<f32> {
    let Some(&first) = audio.first() else {
        return Vec::new();
    };

    let mut result = Vec::with_capacity(audio.len());
    result.push(first);

    for i in 1..audio.len() {
        result.push(audio[i] - coef * audio[i - 1]);
    }

    result
}

/// Create Hann window for STFT.
fn hann_window(window_length: usize) -> Vec<f32> {
    (0..window_length)
        .map(|i| 0.5 - 0.5 * ((2.0 * PI * i as f32) / (window_length as f32 - 1.0)).cos())
        .collect()
}

/// Compute STFT power spectrogram with RustFFT.
fn stft(audio: &[f32], n_fft: usize, hop_length: usize, win_length: usize) -> Array2<f32> {
    use rustfft::{FftPlanner, num_complex::Complex};

    let window = hann_window(win_length);
    let num_frames = (audio.len().saturating_sub(win_length)) / hop_length + 1;
    let freq_bins = n_fft / 2 + 1;
    let mut spectrogram = Array2::<f32>::zeros((freq_bins, num_frames));

    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(n_fft);

    for frame_idx in 0..num_frames {
        let start = frame_idx * hop_length;

        let mut frame: Vec<Complex<f32>> = vec![Complex::new(0.0, 0.0); n_fft];
        for i in 0..win_length.min(audio.len() - start) {
            frame[i] = Complex::new(audio[start + i] * window[i], 0.0);
        }

        fft.process(&mut frame);

        for k in 0..freq_bins {
            let magnitude = frame[k].norm();
            spectrogram[[k, frame_idx]] = magnitude * magnitude;
        }
    }

    spectrogram
}

/// Convert frequency in Hz to mel scale.
fn hz_to_mel(freq: f32) -> f32 {
    2595.0 * (1.0 + freq / 700.0).log10()
}

/// Convert mel scale to frequency in Hz.
fn mel_to_hz(mel: f32) -> f32 {
    700.0 * (10.0_f32.powf(mel / 2595.0) - 1.0)
}

/// Create triangular mel filterbank.
fn create_mel_filterbank(n_fft: usize, n_mels: usize, sample_rate: usize) -> Array2<f32> {
    let freq_bins = n_fft / 2 + 1;
    let mut filterbank = Array2::<f32>::zeros((n_mels, freq_bins));

    let min_mel = hz_to_mel(0.0);
    let max_mel = hz_to_mel(sample_rate as f32 / 2.0);

    let mel_points: Vec<f32> = (0..=n_mels + 1)
        .map(|i| mel_to_hz(min_mel + (max_mel - min_mel) * i as f32 / (n_mels + 1) as f32))
        .collect();

    let freq_bin_width = sample_rate as f32 / n_fft as f32;

    for mel_idx in 0..n_mels {
        let left = mel_points[mel_idx];
        let center = mel_points[mel_idx + 1];
        let right = mel_points[mel_idx + 2];

        for freq_idx in 0..freq_bins {
            let freq = freq_idx as f32 * freq_bin_width;

            if freq >= left && freq <= center {
                filterbank[[mel_idx, freq_idx]] = (freq - left) / (center - left);
            } else if freq > center && freq <= right {
                filterbank[[mel_idx, freq_idx]] = (right - freq) / (right - center);
            }
        }
    }

    filterbank
}

/// Full preprocessing pipeline: preemphasis, STFT, mel filterbank, log
/// compression, per-feature mean-variance normalization.
fn mel_spectrogram(audio: &[f32], config: &MelConfig) -> Array2<f32> {
    let audio = apply_preemphasis(audio, config.preemphasis);

    let spectrogram = stft(&audio, config.n_fft, config.hop_length, config.win_length);

    let mel_filterbank = create_mel_filterbank(config.n_fft, config.n_mels, config.sample_rate);
    let mel_spectrogram = mel_filterbank.dot(&spectrogram);
    let mel_spectrogram = mel_spectrogram.mapv(|x| (x.max(1e-10)).ln());

    let mut mel_spectrogram = mel_spectrogram.t().to_owned();

    // Normalize each feature dimension to mean=0, std=1
    let num_frames = mel_spectrogram.shape()[0];
    let num_features = mel_spectrogram.shape()[1];

    for feat_idx in 0..num_features {
        let mut column = mel_spectrogram.column_mut(feat_idx);
        let mean: f32 = column.iter().sum::<f32>() / num_frames as f32;
        let variance: f32 =
            column.iter().map(|&x| (x - mean).powi(2)).sum::<f32>() / num_frames as f32;
        let std = variance.sqrt().max(1e-10);

        for val in column.iter_mut() {
            *val = (*val - mean) / std;
        }
    }

    mel_spectrogram
}
