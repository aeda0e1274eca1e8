//! Text-to-prediction pipeline: preprocess, infer, shape.
//!
//! An [`EmotionPipeline`] is built once at startup from the loaded artifacts
//! and shared read-only across requests.

mod engine;
mod labels;
mod preprocess;
mod shape;
mod types;
mod vocabulary;

pub use engine::InferenceEngine;
pub use labels::LabelSet;
pub use preprocess::{InputPolicy, Preprocessor, pad_sequence};
pub use shape::shape;
pub use types::*;
pub use vocabulary::{DEFAULT_FILTERS, DEFAULT_SPLIT, Vocabulary};

use crate::model::EmotionModel;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug)]
pub struct EmotionPipeline {
    policy: InputPolicy,
    state: PipelineState,
}

#[derive(Debug)]
enum PipelineState {
    Ready(Box<ReadyPipeline>),
    Unavailable { reason: String },
}

#[derive(Debug)]
struct ReadyPipeline {
    preprocessor: Preprocessor,
    engine: InferenceEngine,
    labels: LabelSet,
    version: Option<String>,
    loaded_at: DateTime<Utc>,
}

/// Snapshot of what the pipeline is serving, for health reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineStatus {
    pub model_loaded: bool,
    pub model_version: Option<String>,
    pub labels: Vec<String>,
    pub loaded_at: Option<DateTime<Utc>>,
}

impl EmotionPipeline {
    /// Assemble a ready pipeline, checking that the three artifacts agree.
    pub fn new(
        preprocessor: Preprocessor,
        model: Arc<dyn EmotionModel>,
        labels: LabelSet,
        version: Option<String>,
    ) -> Result<Self> {
        if model.sequence_length() != preprocessor.sequence_length() {
            return Err(Error::config(format!(
                "preprocessor emits sequences of length {} but the model expects {}",
                preprocessor.sequence_length(),
                model.sequence_length()
            )));
        }
        if model.num_classes() != labels.len() {
            return Err(Error::config(format!(
                "model has {} outputs but the label set has {} classes",
                model.num_classes(),
                labels.len()
            )));
        }

        Ok(Self {
            policy: preprocessor.policy(),
            state: PipelineState::Ready(Box::new(ReadyPipeline {
                preprocessor,
                engine: InferenceEngine::new(model),
                labels,
                version,
                loaded_at: Utc::now(),
            })),
        })
    }

    /// A pipeline whose artifacts failed to load. Input is still validated,
    /// then every prediction fails with `ModelUnavailable`.
    pub fn unavailable(policy: InputPolicy, reason: impl Into<String>) -> Self {
        Self {
            policy,
            state: PipelineState::Unavailable {
                reason: reason.into(),
            },
        }
    }

    /// Run one text through the full pipeline.
    pub fn predict(&self, text: &str) -> Result<EmotionPrediction> {
        let ready = match &self.state {
            PipelineState::Ready(ready) => ready,
            PipelineState::Unavailable { reason } => {
                self.policy.validate(text)?;
                return Err(Error::model_unavailable(reason.clone()));
            }
        };

        let padded = ready.preprocessor.preprocess(text)?;
        debug!(
            tokens = padded.token_count(),
            sequence_length = padded.len(),
            "Preprocessed input"
        );

        let predictions = ready.engine.infer(&padded)?;
        shape(text, &predictions, &ready.labels)
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state, PipelineState::Ready(_))
    }

    pub fn status(&self) -> PipelineStatus {
        match &self.state {
            PipelineState::Ready(ready) => PipelineStatus {
                model_loaded: true,
                model_version: ready.version.clone(),
                labels: ready.labels.to_vec(),
                loaded_at: Some(ready.loaded_at),
            },
            PipelineState::Unavailable { .. } => PipelineStatus {
                model_loaded: false,
                model_version: None,
                labels: Vec::new(),
                loaded_at: None,
            },
        }
    }

    /// Why the artifacts failed to load. Kept out of any response body.
    pub fn unavailable_reason(&self) -> Option<&str> {
        match &self.state {
            PipelineState::Ready(_) => None,
            PipelineState::Unavailable { reason } => Some(reason),
        }
    }
}
