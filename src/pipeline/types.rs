use serde::{Deserialize, Serialize};

/// Which end of a sequence padding or truncation applies to.
///
/// Names follow the `pad_sequences` convention: `Pre` is the left edge,
/// `Post` the right. Truncating `Pre` therefore keeps the *last* tokens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    #[default]
    Pre,
    Post,
}

/// Token indices padded or truncated to the model's fixed input length.
///
/// Only [`pad_sequence`](super::pad_sequence) builds these, so the length
/// always equals the `sequence_length` it was given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaddedSequence {
    ids: Vec<u32>,
}

impl PaddedSequence {
    pub(crate) fn from_padded(ids: Vec<u32>) -> Self {
        Self { ids }
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Number of non-padding positions.
    pub fn token_count(&self) -> usize {
        self.ids.iter().filter(|&&id| id != 0).count()
    }
}

/// One probability per label, in label-set order.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionVector(pub Vec<f32>);

impl PredictionVector {
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Index of the highest probability. Ties resolve to the lowest index.
    pub fn argmax(&self) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for (idx, &p) in self.0.iter().enumerate() {
            match best {
                Some((_, best_p)) if p <= best_p => {}
                _ => best = Some((idx, p)),
            }
        }
        best.map(|(idx, _)| idx)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionScore {
    pub emotion: String,
    /// Percentage in `[0, 100]`.
    pub probability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionPrediction {
    pub input_text: String,
    pub predicted_emotion: String,
    /// Percentage rounded to two decimals.
    pub confidence: f64,
    /// Every label, highest probability first.
    pub all_emotions: Vec<EmotionScore>,
}
