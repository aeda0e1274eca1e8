use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Ties the model, tokenizer and label set into one versioned bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub version: String,
    pub sequence_length: usize,
    pub model: ModelArtifact,
    pub tokenizer: ArtifactFile,
    pub labels: ArtifactFile,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactFile {
    /// Relative paths resolve against the manifest's directory.
    pub path: PathBuf,
    /// Expected SHA-256 as hex. Skipped when absent.
    #[serde(default)]
    pub sha256: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    #[serde(flatten)]
    pub file: ArtifactFile,
    pub vocab_size: usize,
    pub embedding_dim: usize,
    pub lstm_units: usize,
}
