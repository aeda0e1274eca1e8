use emotion_service::{Error, Result, model::EmotionModel, pipeline::PaddedSequence};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Returns the same distribution for every input.
#[derive(Debug)]
pub struct FixedModel {
    pub scores: Vec<f32>,
    pub sequence_length: usize,
    pub calls: Arc<AtomicUsize>,
}

impl FixedModel {
    pub fn new(scores: Vec<f32>, sequence_length: usize) -> Self {
        Self {
            scores,
            sequence_length,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl EmotionModel for FixedModel {
    fn predict(&self, _input: &PaddedSequence) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.scores.clone())
    }

    fn sequence_length(&self) -> usize {
        self.sequence_length
    }

    fn num_classes(&self) -> usize {
        self.scores.len()
    }
}

/// Spreads probability mass by position-weighted token ids, so any change in
/// the padded sequence changes the output.
#[derive(Debug)]
pub struct PositionalModel {
    pub num_classes: usize,
    pub sequence_length: usize,
}

impl EmotionModel for PositionalModel {
    fn predict(&self, input: &PaddedSequence) -> Result<Vec<f32>> {
        let mut logits = vec![0.0_f32; self.num_classes];
        for (pos, &id) in input.as_slice().iter().enumerate() {
            let class = (id as usize + pos) % self.num_classes;
            logits[class] += (id as f32).sqrt() * 0.01;
        }
        let max = logits.iter().copied().fold(f32::MIN, f32::max);
        let exps: Vec<f32> = logits.iter().map(|l| (l - max).exp()).collect();
        let total: f32 = exps.iter().sum();
        Ok(exps.into_iter().map(|e| e / total).collect())
    }

    fn sequence_length(&self) -> usize {
        self.sequence_length
    }

    fn num_classes(&self) -> usize {
        self.num_classes
    }
}

/// Fails every forward pass.
#[derive(Debug)]
pub struct FailingModel {
    pub num_classes: usize,
    pub sequence_length: usize,
}

impl EmotionModel for FailingModel {
    fn predict(&self, _input: &PaddedSequence) -> Result<Vec<f32>> {
        Err(Error::internal(
            "matmul shape mismatch: lhs [1, 128], rhs [64, 6]",
        ))
    }

    fn sequence_length(&self) -> usize {
        self.sequence_length
    }

    fn num_classes(&self) -> usize {
        self.num_classes
    }
}
