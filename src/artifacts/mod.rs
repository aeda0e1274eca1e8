//! Loading and cross-checking of the versioned artifact bundle.

mod checksum;
mod types;

pub use checksum::{compute_sha256, normalise_hex, verify};
pub use types::*;

use crate::config::ModelConfig;
use crate::model::{LstmClassifier, ModelArchitecture};
use crate::pipeline::{EmotionPipeline, InputPolicy, LabelSet, Preprocessor, Vocabulary};
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

impl Manifest {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            Error::artifact(format!("failed to read manifest {}: {e}", path.display()))
        })?;
        let manifest: Manifest = serde_json::from_str(&json)?;

        if manifest.version.trim().is_empty() {
            return Err(Error::artifact("manifest version must not be empty"));
        }
        if manifest.sequence_length == 0 {
            return Err(Error::artifact("manifest sequence_length must be at least 1"));
        }

        Ok(manifest)
    }
}

/// Resolve `file` against `base` and check its digest when one is recorded.
fn resolve(base: &Path, file: &ArtifactFile) -> Result<PathBuf> {
    let path = if file.path.is_absolute() {
        file.path.clone()
    } else {
        base.join(&file.path)
    };

    if !path.is_file() {
        return Err(Error::artifact(format!(
            "artifact not found: {}",
            path.display()
        )));
    }
    if let Some(expected) = &file.sha256 {
        verify(&path, expected)?;
    }

    Ok(path)
}

/// Load every artifact named by the manifest and assemble a ready pipeline.
pub fn load_pipeline(config: &ModelConfig) -> Result<EmotionPipeline> {
    let manifest_path = config.manifest_path();
    let manifest = Manifest::from_path(&manifest_path)?;

    if let Some(expected) = &config.expected_version {
        if &manifest.version != expected {
            return Err(Error::config(format!(
                "artifact version '{}' does not match expected version '{}'",
                manifest.version, expected
            )));
        }
    }

    let base = manifest_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    let vocabulary = Vocabulary::from_path(resolve(&base, &manifest.tokenizer)?)?;
    let labels = LabelSet::from_path(resolve(&base, &manifest.labels)?)?;

    let max_index = vocabulary.max_emitted_index() as usize;
    if max_index >= manifest.model.vocab_size {
        return Err(Error::config(format!(
            "tokenizer can emit index {max_index} but the embedding only has {} rows",
            manifest.model.vocab_size
        )));
    }

    let architecture = ModelArchitecture {
        vocab_size: manifest.model.vocab_size,
        embedding_dim: manifest.model.embedding_dim,
        lstm_units: manifest.model.lstm_units,
        num_classes: labels.len(),
        sequence_length: manifest.sequence_length,
    };
    let model = LstmClassifier::load(resolve(&base, &manifest.model.file)?, architecture)?;

    let preprocessor = Preprocessor::new(
        vocabulary,
        InputPolicy::new(config.max_words),
        manifest.sequence_length,
        config.padding,
        config.truncating,
    );

    let pipeline = EmotionPipeline::new(
        preprocessor,
        Arc::new(model),
        labels,
        Some(manifest.version.clone()),
    )?;

    info!(
        version = %manifest.version,
        sequence_length = manifest.sequence_length,
        "Model artifacts loaded"
    );

    Ok(pipeline)
}

/// Like [`load_pipeline`], but a load failure yields a pipeline that answers
/// `ModelUnavailable` unless `require_loaded` is set.
pub fn load_or_unavailable(config: &ModelConfig) -> Result<EmotionPipeline> {
    match load_pipeline(config) {
        Ok(pipeline) => Ok(pipeline),
        Err(e) if !config.require_loaded => {
            warn!("Error loading model: {}", e);
            Ok(EmotionPipeline::unavailable(
                InputPolicy::new(config.max_words),
                e.to_string(),
            ))
        }
        Err(e) => Err(e),
    }
}
