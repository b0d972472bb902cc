//! Parakeet TDT (Token-and-Duration Transducer) recognizer.
//!
//! The encoder runs over padded feature batches; the decoder-joint is then
//! driven per utterance with greedy label-looping, using each utterance's
//! true encoded length so padding frames are never decoded.

use crate::audio::read_audio_mono;
use crate::error::{ModelError, Result};
use crate::features::MelConfig;
use crate::repo::ModelRepo;
use eyre::{Result as EyreResult, WrapErr, eyre};
use ndarray::ArrayView3;
use ndarray::prelude::*;
use ndarray_stats::QuantileExt;
use ort::session::Session;
use ort::session::builder::SessionBuilder;
use ort::{inputs, value::Tensor, value::Value};
use std::path::PathBuf;

/// Parakeet TDT model for batched transcription.
///
/// The decoder predicts both tokens and their durations, skipping multiple
/// encoder frames per emission.
pub struct TdtRecognizer {
    mel: MelConfig,
    encoder: Session,
    decoder_joint: Session,
    tokenizer: tokenizers::Tokenizer,
    durations: Vec<usize>,
}

impl TdtRecognizer {
    /// Load a TDT recognizer from a model repository.
    ///
    /// Resolves encoder and decoder-joint ONNX exports (with fallback file
    /// names used by different conversions) plus the tokenizer.
    pub fn from_repo(repo: &ModelRepo, session_builder: SessionBuilder) -> EyreResult<Self> {
        let encoder_path = repo.resolve_any(&[
            "encoder-model.onnx",
            "encoder.onnx",
            "encoder-model.int8.onnx",
        ])?;

        // External weights file, present only for large exports.
        let _ = repo.resolve("encoder-model.onnx.data");

        let decoder_path = repo.resolve_any(&[
            "decoder_joint-model.onnx",
            "decoder_joint.onnx",
            "decoder_joint-model.int8.onnx",
        ])?;

        let tokenizer_path = repo.resolve("tokenizer.json")?;

        let encoder = session_builder
            .clone()
            .commit_from_file(&encoder_path)
            .wrap_err("failed to load encoder session")?;

        let decoder_joint = session_builder
            .commit_from_file(&decoder_path)
            .wrap_err("failed to load decoder session")?;

        let tokenizer = tokenizers::Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| eyre!(e))
            .wrap_err(format!("failed to load tokenizer from {tokenizer_path:?}"))?;

        Ok(Self {
            mel: MelConfig::PARAKEET,
            encoder,
            decoder_joint,
            tokenizer,
            durations: vec![0, 1, 2, 3, 4],
        })
    }

    /// Vocabulary size including added tokens; blank id equals this value.
    pub fn vocab_size(&self) -> usize {
        self.tokenizer.get_vocab_size(true)
    }

    /// Transcribe WAV files in padded batches, preserving input order.
    pub fn transcribe_batch(&mut self, paths: &[PathBuf], batch_size: usize) -> Result<Vec<String>> {
        let batch_size = batch_size.max(1);
        let mut texts = Vec::with_capacity(paths.len());

        for (i, batch) in paths.chunks(batch_size).enumerate() {
            let mut features = Vec::with_capacity(batch.len());
            for path in batch {
                let audio = read_audio_mono(path)?;
                features.push(self.mel.apply(&audio));
            }

            tracing::debug!(batch = i + 1, size = batch.len(), "transcribing batch");

            let (encoder_outputs, encoded_lengths) = self.encode_batch(&features)?;

            for (b, &encoded_length) in encoded_lengths.iter().enumerate() {
                let item = encoder_outputs.slice(s![b..b + 1, .., ..]);
                let token_ids = self.greedy_decode(item, encoded_length)?;
                texts.push(self.decode_tokens(&token_ids)?);
            }
        }

        Ok(texts)
    }

    /// Transcribe a single 16kHz mono sample buffer.
    pub fn transcribe(&mut self, audio: &[f32]) -> Result<String> {
        let features = self.mel.apply(audio);
        let (encoder_outputs, encoded_lengths) =
            self.encode_batch(std::slice::from_ref(&features))?;

        let item = encoder_outputs.slice(s![0..1, .., ..]);
        let token_ids = self.greedy_decode(item, encoded_lengths[0])?;
        self.decode_tokens(&token_ids)
    }

    /// Run the encoder over a padded feature batch.
    ///
    /// Returns encoder outputs of shape `(batch, features, frames)` and the
    /// valid encoded length per batch item.
    fn encode_batch(&mut self, features: &[Array2<f32>]) -> Result<(Array3<f32>, Vec<usize>)> {
        let (padded, lengths) = pad_features(features);

        let audio_signal = Value::from_array(padded)?;
        let audio_length = Value::from_array(lengths)?;

        let input_value = inputs!(
            "audio_signal" => audio_signal,
            "length" => audio_length,
        );

        let mut outputs = self.encoder.run(input_value)?;

        let encoder_outputs =
            outputs
                .remove("outputs")
                .ok_or_else(|| ModelError::MissingOutput {
                    name: "outputs".to_string(),
                })?;

        let encoded_lengths =
            outputs
                .remove("encoded_lengths")
                .ok_or_else(|| ModelError::MissingOutput {
                    name: "encoded_lengths".to_string(),
                })?;

        let encoder_outputs = encoder_outputs
            .try_extract_array::<f32>()?
            .to_owned()
            .into_dimensionality::<Ix3>()?;

        let encoded_lengths = encoded_lengths
            .try_extract_array::<i64>()?
            .to_owned()
            .into_dimensionality::<Ix1>()?;

        let encoded_lengths = encoded_lengths.iter().map(|&l| l as usize).collect();

        Ok((encoder_outputs, encoded_lengths))
    }

    /// Greedy TDT decode of one batch item's encoder output.
    fn greedy_decode(
        &mut self,
        encoder_output: ArrayView3<f32>,
        encoded_length: usize,
    ) -> Result<Vec<usize>> {
        let blank_id = self.vocab_size();
        let max_symbols_per_step = 10;

        if encoded_length == 0 {
            return Ok(Vec::new());
        }

        let state_h = Array3::<f32>::zeros((2, 1, 640));
        let state_c = Array3::<f32>::zeros((2, 1, 640));

        let mut states_1 = Tensor::from_array(state_h)?.into_dyn();
        let mut states_2 = Tensor::from_array(state_c)?.into_dyn();

        let mut tokens = Vec::new();
        let mut frame_index = 0;

        let target = Array2::from_elem((1, 1), blank_id as i32);
        let mut target = Tensor::from_array(target)?;

        let target_length = Array1::from_elem((1,), 1);
        let target_length = Tensor::from_array(target_length)?;

        while frame_index < encoded_length - 1 {
            let frame = encoder_output
                .slice_axis(Axis(2), (frame_index..frame_index + 1).into())
                .to_owned();
            let frame = Tensor::from_array(frame)?;

            // Label looping: emit multiple tokens per frame if decoder keeps predicting non-blank
            'inner: {
                for _ in 0..max_symbols_per_step {
                    let mut outputs = self.decoder_joint.run(inputs!(
                        "encoder_outputs" => &frame,
                        "targets" => &target,
                        "target_length" => &target_length,
                        "input_states_1" => &states_1,
                        "input_states_2" => &states_2
                    ))?;

                    let logits_view: ArrayViewD<f32> = outputs["outputs"].try_extract_array()?;

                    let logits_flat = logits_view.flatten();

                    // Decoder outputs: [vocab_0..vocab_n, blank, duration_0..duration_4]
                    let text_logits = logits_flat.slice_axis(Axis(0), (0..blank_id + 1).into());
                    let token_id = text_logits.argmax()?;

                    let duration_logits = logits_flat.slice_axis(Axis(0), (blank_id + 1..).into());
                    let duration_idx = duration_logits.argmax()?;

                    let skip = self.durations.get(duration_idx).copied().ok_or_else(|| {
                        ModelError::DurationIndexOutOfBounds {
                            index: duration_idx,
                            max: self.durations.len() - 1,
                        }
                    })?;

                    if token_id != blank_id {
                        // Update LSTM states for next token prediction
                        states_1 = outputs.remove("output_states_1").ok_or_else(|| {
                            ModelError::MissingOutput {
                                name: "output_states_1".to_string(),
                            }
                        })?;
                        states_2 = outputs.remove("output_states_2").ok_or_else(|| {
                            ModelError::MissingOutput {
                                name: "output_states_2".to_string(),
                            }
                        })?;

                        tokens.push(token_id);

                        target[[0, 0]] = token_id as i32;
                    }

                    tracing::trace!(frame_index, skip);

                    frame_index = encoded_length.min(frame_index + skip);

                    // Duration > 0: advance to next frame
                    if skip != 0 {
                        break 'inner;
                    }
                }

                // Max symbols reached without duration prediction: force frame advance
                frame_index += 1;
            }
        }

        Ok(tokens)
    }

    /// Convert token ids to text (SentencePiece word-boundary markers become spaces).
    fn decode_tokens(&self, token_ids: &[usize]) -> Result<String> {
        let mut text = String::new();

        for &id in token_ids {
            let piece = self
                .tokenizer
                .id_to_token(id as u32)
                .ok_or(ModelError::InvalidTokenId(id))?;
            text.push_str(&piece);
        }

        Ok(text.replace('▁', " ").trim().to_string())
    }
}

/// Pad feature matrices to the longest utterance in the batch.
///
/// Input matrices are `(frames, n_mels)`; the output is `(batch, n_mels,
/// max_frames)` as the encoder expects, plus per-item frame counts.
fn pad_features(features: &[Array2<f32>]) -> (Array3<f32>, Array1<i64>) {
    let n_mels = features.first().map_or(0, |f| f.shape()[1]);
    let max_frames = features.iter().map(|f| f.shape()[0]).max().unwrap_or(0);

    let mut padded = Array3::<f32>::zeros((features.len(), n_mels, max_frames));
    let mut lengths = Array1::<i64>::zeros(features.len());

    for (i, feat) in features.iter().enumerate() {
        let frames = feat.shape()[0];
        padded.slice_mut(s![i, .., ..frames]).assign(&feat.t());
        lengths[i] = frames as i64;
    }

    (padded, lengths)
}
