mod types;

pub use types::*;

use crate::{Error, Result};
use axum::http::HeaderValue;
use std::env;
use std::path::Path;
use tracing::debug;

pub async fn load() -> Result<Config> {
    let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string());
    let mut config = load_from_path(&config_path).await?;
    apply_env_overrides(&mut config, |key| env::var(key).ok())?;
    validate(&config)?;
    Ok(config)
}

pub async fn load_from_path(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    debug!("Loading configuration from: {}", path.display());

    let config_str = tokio::fs::read_to_string(path).await?;
    parse(&config_str)
}

pub fn parse(config_str: &str) -> Result<Config> {
    // An empty document deserializes to unit, not to an empty mapping.
    if config_str.trim().is_empty() {
        return Ok(Config::default());
    }
    let config: Config = serde_yaml::from_str(config_str)?;
    Ok(config)
}

/// Apply `PORT` and `MODEL_DIR` overrides using `lookup` to read variables.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(port) = lookup("PORT") {
        config.server.port = port
            .trim()
            .parse()
            .map_err(|_| Error::config(format!("PORT is not a valid port number: '{port}'")))?;
        debug!("PORT override: {}", config.server.port);
    }

    if let Some(dir) = lookup("MODEL_DIR") {
        debug!("MODEL_DIR override: {}", dir);
        config.model.artifacts_dir = dir.into();
    }

    Ok(())
}

pub fn validate(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        return Err(Error::config("server.port must be non-zero"));
    }

    if config.model.max_words == Some(0) {
        return Err(Error::config(
            "model.max_words must be at least 1 (use null to disable the limit)",
        ));
    }

    if config.model.manifest.trim().is_empty() {
        return Err(Error::config("model.manifest must not be empty"));
    }

    for origin in &config.server.cors.allowed_origins {
        if origin != "*" && HeaderValue::from_str(origin).is_err() {
            return Err(Error::config(format!(
                "server.cors.allowed_origins contains an invalid origin: '{origin}'"
            )));
        }
    }

    Ok(())
}
