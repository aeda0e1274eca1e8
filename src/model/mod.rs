mod lstm;

pub use lstm::{LstmClassifier, ModelArchitecture};

use crate::Result;
use crate::pipeline::PaddedSequence;

/// A frozen classifier: one padded index sequence in, one probability per class out.
///
/// Implementations must be pure. Calling `predict` twice with the same input
/// yields the same output and never mutates weights.
#[cfg_attr(test, mockall::automock)]
pub trait EmotionModel: Send + Sync {
    fn predict(&self, input: &PaddedSequence) -> Result<Vec<f32>>;

    /// Input length the model was trained with.
    fn sequence_length(&self) -> usize;

    fn num_classes(&self) -> usize;
}
