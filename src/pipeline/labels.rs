use crate::{Error, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

/// Ordered emotion names; position `i` names model output `i`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSet {
    labels: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LabelDocument {
    List(Vec<String>),
    Classes { classes: Vec<String> },
}

impl LabelSet {
    pub fn new(labels: Vec<String>) -> Result<Self> {
        if labels.len() < 2 {
            return Err(Error::artifact(format!(
                "label set needs at least 2 classes, found {}",
                labels.len()
            )));
        }

        let mut seen = HashSet::new();
        for label in &labels {
            if label.trim().is_empty() {
                return Err(Error::artifact("label set contains an empty class name"));
            }
            if !seen.insert(label.as_str()) {
                return Err(Error::artifact(format!(
                    "label set contains duplicate class '{label}'"
                )));
            }
        }

        Ok(Self { labels })
    }

    /// Accepts either a bare JSON array or `{"classes": [...]}`.
    pub fn from_json(json: &str) -> Result<Self> {
        let labels = match serde_json::from_str::<LabelDocument>(json)? {
            LabelDocument::List(labels) => labels,
            LabelDocument::Classes { classes } => classes,
        };
        Self::new(labels)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            Error::artifact(format!("failed to read labels {}: {e}", path.display()))
        })?;
        Self::from_json(&json)
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.labels.clone()
    }
}
