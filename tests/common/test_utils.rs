use candle_core::{Device, Tensor};
use emotion_service::{
    artifacts::compute_sha256,
    config::{Config, CorsConfig, LogsConfig, ModelConfig, ServerConfig},
    pipeline::{DEFAULT_FILTERS, Side},
};
use serde_json::json;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tempfile::TempDir;

pub const LABELS: [&str; 6] = ["anger", "fear", "joy", "love", "sadness", "surprise"];

pub const SEQUENCE_LENGTH: usize = 100;
pub const VOCAB_SIZE: usize = 400;
pub const EMBEDDING_DIM: usize = 8;
pub const LSTM_UNITS: usize = 6;
pub const ARTIFACT_VERSION: &str = "2024-06-01";

const NAMED_WORDS: [&str; 10] = [
    "i", "am", "so", "happy", "today", "sad", "angry", "scared", "love", "wow",
];

/// Words `w1..=w300` follow the named words in the index.
pub fn word_index() -> BTreeMap<String, u32> {
    let mut index = BTreeMap::new();
    for (i, word) in NAMED_WORDS.iter().enumerate() {
        index.insert(word.to_string(), i as u32 + 1);
    }
    let offset = NAMED_WORDS.len() as u32;
    for i in 1..=300 {
        index.insert(format!("w{i}"), offset + i);
    }
    index
}

/// Space-separated `w{start}..=w{end}`.
pub fn numbered_text(start: u32, end: u32) -> String {
    (start..=end)
        .map(|i| format!("w{i}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Deterministic weights that vary per element.
fn ramp(shape: &[usize], scale: f32, phase: f32) -> Tensor {
    let n: usize = shape.iter().product();
    let values: Vec<f32> = (0..n)
        .map(|i| ((i as f32 * 0.37 + phase).sin()) * scale)
        .collect();
    Tensor::from_vec(values, shape, &Device::Cpu).unwrap()
}

pub fn model_tensors(vocab_size: usize, num_classes: usize) -> HashMap<String, Tensor> {
    let u = LSTM_UNITS;
    HashMap::from([
        (
            "embedding.weight".to_string(),
            ramp(&[vocab_size, EMBEDDING_DIM], 0.8, 0.0),
        ),
        (
            "lstm.weight_ih_l0".to_string(),
            ramp(&[4 * u, EMBEDDING_DIM], 0.4, 1.0),
        ),
        (
            "lstm.weight_hh_l0".to_string(),
            ramp(&[4 * u, u], 0.3, 2.0),
        ),
        ("lstm.bias_ih_l0".to_string(), ramp(&[4 * u], 0.1, 3.0)),
        (
            "dense.weight".to_string(),
            ramp(&[num_classes, u], 1.5, 4.0),
        ),
        ("dense.bias".to_string(), ramp(&[num_classes], 0.2, 5.0)),
    ])
}

pub fn tokenizer_json(num_words: Option<usize>) -> String {
    let word_index = serde_json::to_string(&word_index()).unwrap();
    json!({
        "class_name": "Tokenizer",
        "config": {
            "num_words": num_words,
            "filters": DEFAULT_FILTERS,
            "lower": true,
            "split": " ",
            "char_level": false,
            "oov_token": null,
            "document_count": 1000,
            "word_index": word_index,
        }
    })
    .to_string()
}

pub struct ArtifactOptions {
    pub version: String,
    pub with_checksums: bool,
    pub num_words: Option<usize>,
    /// Embedding rows, written both to the manifest and to the weights.
    pub manifest_vocab_size: usize,
}

impl Default for ArtifactOptions {
    fn default() -> Self {
        Self {
            version: ARTIFACT_VERSION.to_string(),
            with_checksums: true,
            num_words: None,
            manifest_vocab_size: VOCAB_SIZE,
        }
    }
}

/// Write a complete artifact bundle (manifest, tokenizer, labels, weights) into `dir`.
pub fn write_artifacts(dir: &Path, options: &ArtifactOptions) {
    let model_path = dir.join("emotion_model.safetensors");
    candle_core::safetensors::save(
        &model_tensors(options.manifest_vocab_size, LABELS.len()),
        &model_path,
    )
    .unwrap();

    let tokenizer_path = dir.join("tokenizer.json");
    std::fs::write(&tokenizer_path, tokenizer_json(options.num_words)).unwrap();

    let labels_path = dir.join("labels.json");
    std::fs::write(&labels_path, json!({ "classes": LABELS }).to_string()).unwrap();

    let digest = |path: &Path| {
        options
            .with_checksums
            .then(|| compute_sha256(path).unwrap())
    };

    let manifest = json!({
        "version": options.version,
        "sequence_length": SEQUENCE_LENGTH,
        "model": {
            "path": "emotion_model.safetensors",
            "sha256": digest(&model_path),
            "vocab_size": options.manifest_vocab_size,
            "embedding_dim": EMBEDDING_DIM,
            "lstm_units": LSTM_UNITS,
        },
        "tokenizer": { "path": "tokenizer.json", "sha256": digest(&tokenizer_path) },
        "labels": { "path": "labels.json", "sha256": digest(&labels_path) },
    });
    std::fs::write(
        dir.join("manifest.json"),
        serde_json::to_string_pretty(&manifest).unwrap(),
    )
    .unwrap();
}

/// A temp directory holding a default artifact bundle.
pub fn create_artifacts_dir() -> TempDir {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    write_artifacts(dir.path(), &ArtifactOptions::default());
    dir
}

pub fn create_model_config(artifacts_dir: &Path) -> ModelConfig {
    ModelConfig {
        artifacts_dir: artifacts_dir.to_path_buf(),
        manifest: "manifest.json".to_string(),
        max_words: Some(500),
        padding: Side::Pre,
        truncating: Side::Pre,
        expected_version: None,
        require_loaded: false,
    }
}

/// Create a test configuration with sensible defaults
pub fn create_test_config(artifacts_dir: &Path) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 5000,
            logs: LogsConfig {
                level: "debug".to_string(),
            },
            cors: CorsConfig::default(),
        },
        model: create_model_config(artifacts_dir),
    }
}

/// Sample configuration YAML for testing
pub const SAMPLE_CONFIG_YAML: &str = r#"
server:
  host: "127.0.0.1"
  port: 8080
  logs:
    level: "debug"
  cors:
    allowed_origins:
      - "https://emotion-analyzer-frontend.onrender.com"
      - "http://localhost:3000"
    allow_credentials: true

model:
  artifacts_dir: "/srv/emotion/models"
  manifest: "bundle.json"
  max_words: 250
  padding: post
  truncating: post
  expected_version: "2024-06-01"
  require_loaded: true
"#;

/// Invalid configuration YAML for testing error cases
pub const INVALID_CONFIG_YAML: &str = r#"
server:
  port: "not-a-number"

model:
  truncating: "middle"
"#;
