//! Embedding -> LSTM -> Dense -> softmax, evaluated with candle on the CPU.
//!
//! Weights are read from a safetensors file using PyTorch-style names:
//!
//! | tensor              | shape                      |
//! |---------------------|----------------------------|
//! | `embedding.weight`  | `[vocab_size, embedding]`  |
//! | `lstm.weight_ih_l0` | `[4 * units, embedding]`   |
//! | `lstm.weight_hh_l0` | `[4 * units, units]`       |
//! | `lstm.bias_ih_l0`   | `[4 * units]`              |
//! | `lstm.bias_hh_l0`   | `[4 * units]` (optional)   |
//! | `dense.weight`      | `[num_classes, units]`     |
//! | `dense.bias`        | `[num_classes]`            |
//!
//! Gates are stacked in i, f, g, o order, which is also the Keras kernel
//! layout once transposed. Keras exports a single LSTM bias, so
//! `lstm.bias_hh_l0` may be omitted.

use super::EmotionModel;
use crate::pipeline::PaddedSequence;
use crate::{Error, Result};
use candle_core::{DType, Device, Module, Tensor};
use candle_nn::{Embedding, Init, LSTM, LSTMConfig, Linear, RNN, VarBuilder};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelArchitecture {
    pub vocab_size: usize,
    pub embedding_dim: usize,
    pub lstm_units: usize,
    pub num_classes: usize,
    pub sequence_length: usize,
}

#[derive(Debug)]
pub struct LstmClassifier {
    embedding: Embedding,
    lstm: LSTM,
    dense: Linear,
    architecture: ModelArchitecture,
    device: Device,
}

impl LstmClassifier {
    /// Load weights from a safetensors file.
    pub fn load(path: impl AsRef<Path>, architecture: ModelArchitecture) -> Result<Self> {
        let path = path.as_ref();
        let device = Device::Cpu;
        let data = std::fs::read(path).map_err(|e| {
            Error::artifact(format!("failed to read model weights {}: {e}", path.display()))
        })?;
        let vb = VarBuilder::from_buffered_safetensors(data, DType::F32, &device)?;
        Self::from_var_builder(vb, architecture, device)
    }

    pub fn from_var_builder(
        vb: VarBuilder,
        architecture: ModelArchitecture,
        device: Device,
    ) -> Result<Self> {
        let ModelArchitecture {
            vocab_size,
            embedding_dim,
            lstm_units,
            num_classes,
            sequence_length,
        } = architecture;

        if sequence_length == 0 || lstm_units == 0 || embedding_dim == 0 {
            return Err(Error::artifact(format!(
                "model architecture has a zero dimension: {architecture:?}"
            )));
        }

        let embedding = candle_nn::embedding(vocab_size, embedding_dim, vb.pp("embedding"))
            .map_err(|e| Error::artifact(format!("embedding layer: {e}")))?;

        let lstm_vb = vb.pp("lstm");
        let config = LSTMConfig {
            b_hh_init: lstm_vb
                .contains_tensor("bias_hh_l0")
                .then_some(Init::Const(0.0)),
            ..LSTMConfig::default()
        };
        let lstm = candle_nn::lstm(embedding_dim, lstm_units, config, lstm_vb)
            .map_err(|e| Error::artifact(format!("lstm layer: {e}")))?;

        let dense = candle_nn::linear(lstm_units, num_classes, vb.pp("dense"))
            .map_err(|e| Error::artifact(format!("dense layer: {e}")))?;

        debug!(
            vocab_size,
            embedding_dim, lstm_units, num_classes, sequence_length, "LSTM classifier built"
        );

        Ok(Self {
            embedding,
            lstm,
            dense,
            architecture,
            device,
        })
    }

    pub fn architecture(&self) -> ModelArchitecture {
        self.architecture
    }

    fn forward(&self, ids: &[u32]) -> Result<Vec<f32>> {
        let input = Tensor::new(ids, &self.device)?.unsqueeze(0)?;
        let embedded = self.embedding.forward(&input)?;

        let states = self.lstm.seq(&embedded)?;
        let last = states
            .last()
            .ok_or_else(|| Error::internal("LSTM produced no states"))?;

        let logits = self.dense.forward(last.h())?;
        let probs = candle_nn::ops::softmax_last_dim(&logits)?;
        Ok(probs.squeeze(0)?.to_vec1::<f32>()?)
    }
}

impl EmotionModel for LstmClassifier {
    fn predict(&self, input: &PaddedSequence) -> Result<Vec<f32>> {
        if input.len() != self.architecture.sequence_length {
            return Err(Error::internal(format!(
                "input length {} does not match model sequence length {}",
                input.len(),
                self.architecture.sequence_length
            )));
        }
        if let Some(&id) = input
            .as_slice()
            .iter()
            .find(|&&id| id as usize >= self.architecture.vocab_size)
        {
            return Err(Error::internal(format!(
                "token index {id} is outside the embedding table ({})",
                self.architecture.vocab_size
            )));
        }

        self.forward(input.as_slice())
    }

    fn sequence_length(&self) -> usize {
        self.architecture.sequence_length
    }

    fn num_classes(&self) -> usize {
        self.architecture.num_classes
    }
}
