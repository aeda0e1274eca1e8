use super::types::{PaddedSequence, Side};
use super::vocabulary::Vocabulary;
use crate::{Error, Result};
use tracing::debug;

/// Caller-input checks that run before any artifact is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputPolicy {
    pub max_words: Option<usize>,
}

impl InputPolicy {
    pub fn new(max_words: Option<usize>) -> Self {
        Self { max_words }
    }

    pub fn validate(&self, text: &str) -> Result<()> {
        if text.trim().is_empty() {
            return Err(Error::invalid_input("Empty text provided"));
        }

        if let Some(limit) = self.max_words {
            let words = text.split_whitespace().count();
            if words > limit {
                return Err(Error::InputTooLong { words, limit });
            }
        }

        Ok(())
    }
}

/// Fit `tokens` to exactly `length` positions, padding with zeros.
///
/// `truncating` picks which end is dropped when there are too many tokens;
/// `padding` picks which end receives zeros when there are too few.
pub fn pad_sequence(tokens: &[u32], length: usize, padding: Side, truncating: Side) -> PaddedSequence {
    let kept = if tokens.len() > length {
        match truncating {
            Side::Pre => &tokens[tokens.len() - length..],
            Side::Post => &tokens[..length],
        }
    } else {
        tokens
    };

    let fill = length - kept.len();
    let mut ids = Vec::with_capacity(length);
    match padding {
        Side::Pre => {
            ids.extend(std::iter::repeat_n(0, fill));
            ids.extend_from_slice(kept);
        }
        Side::Post => {
            ids.extend_from_slice(kept);
            ids.extend(std::iter::repeat_n(0, fill));
        }
    }

    PaddedSequence::from_padded(ids)
}

/// Turns raw text into the fixed-length index sequence the model expects.
#[derive(Debug, Clone)]
pub struct Preprocessor {
    vocabulary: Vocabulary,
    policy: InputPolicy,
    sequence_length: usize,
    padding: Side,
    truncating: Side,
}

impl Preprocessor {
    pub fn new(
        vocabulary: Vocabulary,
        policy: InputPolicy,
        sequence_length: usize,
        padding: Side,
        truncating: Side,
    ) -> Self {
        Self {
            vocabulary,
            policy,
            sequence_length,
            padding,
            truncating,
        }
    }

    pub fn preprocess(&self, text: &str) -> Result<PaddedSequence> {
        self.policy.validate(text)?;

        let tokens = self.vocabulary.text_to_sequence(text);
        if tokens.is_empty() {
            debug!("No known tokens in input; model will see an all-padding sequence");
        }

        Ok(pad_sequence(
            &tokens,
            self.sequence_length,
            self.padding,
            self.truncating,
        ))
    }

    pub fn sequence_length(&self) -> usize {
        self.sequence_length
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn policy(&self) -> InputPolicy {
        self.policy
    }
}
