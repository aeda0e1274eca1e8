//! Word-level tokenizer compatible with the Keras `Tokenizer` used at training time.
//!
//! The tokenization rule is part of the model contract: the word index was
//! built with exactly this rule, and any drift (different punctuation set,
//! case folding, split character) silently maps words to the wrong indices.

use crate::{Error, Result};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Keras' default `filters`: punctuation plus tab and newline.
pub const DEFAULT_FILTERS: &str = "!\"#$%&()*+,-./:;<=>?@[\\]^_`{|}~\t\n";

pub const DEFAULT_SPLIT: &str = " ";

/// Immutable token-to-index mapping plus the rule used to produce tokens.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    word_index: HashMap<String, u32>,
    num_words: Option<usize>,
    oov_index: Option<u32>,
    filters: HashSet<char>,
    lower: bool,
    split: String,
}

#[derive(Debug, Deserialize)]
struct KerasTokenizerDocument {
    #[serde(default)]
    class_name: Option<String>,
    config: KerasTokenizerConfig,
}

#[derive(Debug, Deserialize)]
struct KerasTokenizerConfig {
    #[serde(default)]
    num_words: Option<usize>,
    #[serde(default = "default_filters")]
    filters: String,
    #[serde(default = "default_lower")]
    lower: bool,
    #[serde(default = "default_split")]
    split: String,
    #[serde(default)]
    char_level: bool,
    #[serde(default)]
    oov_token: Option<String>,
    word_index: WordIndexField,
}

/// Keras writes `word_index` as a JSON document embedded in a string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WordIndexField {
    Encoded(String),
    Inline(HashMap<String, u32>),
}

fn default_filters() -> String {
    DEFAULT_FILTERS.to_string()
}

fn default_lower() -> bool {
    true
}

fn default_split() -> String {
    DEFAULT_SPLIT.to_string()
}

impl Vocabulary {
    /// Build a vocabulary with the default Keras tokenization rule.
    pub fn new(word_index: HashMap<String, u32>) -> Result<Self> {
        Self::build(
            word_index,
            None,
            None,
            DEFAULT_FILTERS,
            true,
            DEFAULT_SPLIT.to_string(),
        )
    }

    /// Only indices below `num_words` are emitted, as with Keras' `num_words`.
    pub fn with_num_words(mut self, num_words: usize) -> Self {
        // Keras treats `num_words=0` the same as no limit.
        self.num_words = (num_words > 0).then_some(num_words);
        self
    }

    /// Parse the output of Keras `Tokenizer.to_json()`.
    pub fn from_keras_json(json: &str) -> Result<Self> {
        let document: KerasTokenizerDocument = serde_json::from_str(json)?;

        if let Some(class_name) = &document.class_name {
            if class_name != "Tokenizer" {
                return Err(Error::artifact(format!(
                    "tokenizer class '{class_name}' is not supported"
                )));
            }
        }

        let config = document.config;
        if config.char_level {
            return Err(Error::artifact("char-level tokenizers are not supported"));
        }

        let word_index = match config.word_index {
            WordIndexField::Encoded(encoded) => serde_json::from_str(&encoded)?,
            WordIndexField::Inline(map) => map,
        };

        Self::build(
            word_index,
            config.num_words.filter(|&n| n > 0),
            config.oov_token,
            &config.filters,
            config.lower,
            config.split,
        )
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            Error::artifact(format!("failed to read tokenizer {}: {e}", path.display()))
        })?;
        Self::from_keras_json(&json)
    }

    fn build(
        word_index: HashMap<String, u32>,
        num_words: Option<usize>,
        oov_token: Option<String>,
        filters: &str,
        lower: bool,
        split: String,
    ) -> Result<Self> {
        if split.is_empty() {
            return Err(Error::artifact("tokenizer split string must not be empty"));
        }
        if word_index.is_empty() {
            return Err(Error::artifact("tokenizer word index is empty"));
        }
        if let Some((word, _)) = word_index.iter().find(|(_, idx)| **idx == 0) {
            return Err(Error::artifact(format!(
                "word '{word}' uses index 0, which is reserved for padding"
            )));
        }

        let oov_index = match oov_token {
            Some(token) => Some(*word_index.get(&token).ok_or_else(|| {
                Error::artifact(format!("OOV token '{token}' is missing from the word index"))
            })?),
            None => None,
        };

        Ok(Self {
            word_index,
            num_words,
            oov_index,
            filters: filters.chars().collect(),
            lower,
            split,
        })
    }

    /// Split text into words using the training-time rule.
    pub fn words(&self, text: &str) -> Vec<String> {
        let text = if self.lower {
            text.to_lowercase()
        } else {
            text.to_string()
        };

        let mut normalized = String::with_capacity(text.len());
        for c in text.chars() {
            if self.filters.contains(&c) {
                normalized.push_str(&self.split);
            } else {
                normalized.push(c);
            }
        }

        normalized
            .split(self.split.as_str())
            .filter(|w| !w.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Tokenize and map words to indices. Unknown words are dropped, or
    /// replaced by the OOV index when the tokenizer defines one.
    pub fn text_to_sequence(&self, text: &str) -> Vec<u32> {
        self.words(text)
            .iter()
            .filter_map(|word| self.lookup(word))
            .collect()
    }

    fn lookup(&self, word: &str) -> Option<u32> {
        match self.word_index.get(word) {
            Some(&idx) if self.in_range(idx) => Some(idx),
            _ => self.oov_index,
        }
    }

    fn in_range(&self, idx: u32) -> bool {
        self.num_words.is_none_or(|n| (idx as usize) < n)
    }

    /// Largest index `text_to_sequence` can ever produce.
    pub fn max_emitted_index(&self) -> u32 {
        let max_word = self
            .word_index
            .values()
            .copied()
            .filter(|&idx| self.in_range(idx))
            .max()
            .unwrap_or(0);
        max_word.max(self.oov_index.unwrap_or(0))
    }

    pub fn len(&self) -> usize {
        self.word_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.word_index.is_empty()
    }

    pub fn num_words(&self) -> Option<usize> {
        self.num_words
    }
}
