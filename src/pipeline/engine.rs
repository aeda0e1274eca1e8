use super::types::{PaddedSequence, PredictionVector};
use crate::model::EmotionModel;
use crate::{Error, Result};
use std::sync::Arc;

/// Read-only wrapper around a loaded model that checks its output shape.
#[derive(Clone)]
pub struct InferenceEngine {
    model: Arc<dyn EmotionModel>,
}

impl InferenceEngine {
    pub fn new(model: Arc<dyn EmotionModel>) -> Self {
        Self { model }
    }

    pub fn infer(&self, padded: &PaddedSequence) -> Result<PredictionVector> {
        let probs = self.model.predict(padded)?;

        if probs.len() != self.model.num_classes() {
            return Err(Error::internal(format!(
                "model returned {} scores for {} classes",
                probs.len(),
                self.model.num_classes()
            )));
        }
        if let Some(bad) = probs.iter().find(|p| !p.is_finite() || **p < 0.0) {
            return Err(Error::internal(format!(
                "model returned an invalid probability: {bad}"
            )));
        }

        Ok(PredictionVector(probs))
    }

    pub fn sequence_length(&self) -> usize {
        self.model.sequence_length()
    }

    pub fn num_classes(&self) -> usize {
        self.model.num_classes()
    }
}

impl std::fmt::Debug for InferenceEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceEngine")
            .field("sequence_length", &self.model.sequence_length())
            .field("num_classes", &self.model.num_classes())
            .finish()
    }
}
