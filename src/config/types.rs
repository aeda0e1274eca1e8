use crate::pipeline::Side;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub model: ModelConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub logs: LogsConfig,
    #[serde(default)]
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
    #[serde(default = "default_allow_credentials")]
    pub allow_credentials: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_artifacts_dir")]
    pub artifacts_dir: PathBuf,
    #[serde(default = "default_manifest")]
    pub manifest: String,
    /// Word-count ceiling for incoming text. `None` disables the check.
    #[serde(default = "default_max_words")]
    pub max_words: Option<usize>,
    #[serde(default)]
    pub padding: Side,
    #[serde(default)]
    pub truncating: Side,
    /// Pin the artifact bundle to a specific manifest version.
    #[serde(default)]
    pub expected_version: Option<String>,
    /// Abort startup instead of serving 503s when artifacts fail to load.
    #[serde(default)]
    pub require_loaded: bool,
}

impl ModelConfig {
    pub fn manifest_path(&self) -> PathBuf {
        self.artifacts_dir.join(&self.manifest)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            logs: LogsConfig::default(),
            cors: CorsConfig::default(),
        }
    }
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_allowed_origins(),
            allow_credentials: default_allow_credentials(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            artifacts_dir: default_artifacts_dir(),
            manifest: default_manifest(),
            max_words: default_max_words(),
            padding: Side::default(),
            truncating: Side::default(),
            expected_version: None,
            require_loaded: false,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_allowed_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://localhost:3001".to_string(),
    ]
}

fn default_allow_credentials() -> bool {
    true
}

fn default_artifacts_dir() -> PathBuf {
    PathBuf::from("models")
}

fn default_manifest() -> String {
    "manifest.json".to_string()
}

fn default_max_words() -> Option<usize> {
    Some(500)
}
