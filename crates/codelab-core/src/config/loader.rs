//! Configuration loader for YAML files and environment resolution

use std::env;
use std::path::Path;
use tokio::fs;

use crate::config::types::*;
use crate::errors::CodeLabError;

pub const API_KEY_ENV: &str = "JUDGE0_API_KEY";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a YAML file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<CodeLabConfig, CodeLabError> {
        let path = path.as_ref();

        let content = fs::read_to_string(path).await.map_err(|e| {
            CodeLabError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::from_str(&content)
    }

    /// Load from a file when it exists, otherwise use the defaults
    pub async fn from_file_or_default<P: AsRef<Path>>(path: P) -> Result<CodeLabConfig, CodeLabError> {
        let path = path.as_ref();
        if fs::metadata(path).await.is_ok() {
            log::info!("Loading configuration from {}", path.display());
            Self::from_file(path).await
        } else {
            log::debug!("No config file at {}, using defaults", path.display());
            let mut config = CodeLabConfig::default();
            Self::resolve_environment(&mut config);
            config.validate()?;
            Ok(config)
        }
    }

    /// Load configuration from a YAML string
    pub fn from_str(content: &str) -> Result<CodeLabConfig, CodeLabError> {
        let mut config: CodeLabConfig = if content.trim().is_empty() {
            CodeLabConfig::default()
        } else {
            serde_yaml::from_str(content)?
        };

        Self::resolve_environment(&mut config);
        config.validate()?;

        Ok(config)
    }

    /// Resolve the primary endpoint's API key from the environment.
    ///
    /// The variable named by `api_key_env` wins, then an `api_key` written in
    /// the file, then [`API_KEY_ENV`]. Without any of these the endpoint falls
    /// back to its configured header or the demo key.
    fn resolve_environment(config: &mut CodeLabConfig) {
        let primary = &mut config.execution.primary;

        if let Some(env_var) = &primary.api_key_env {
            match env::var(env_var) {
                Ok(api_key) => primary.api_key = Some(api_key),
                Err(_) => log::debug!("{} is not set", env_var),
            }
        }

        if primary.api_key.is_none() {
            if let Ok(api_key) = env::var(API_KEY_ENV) {
                primary.api_key = Some(api_key);
            }
        }
    }
}
