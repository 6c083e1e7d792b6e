//! Configuration type definitions
//!
//! Every section is optional in YAML; a missing file or an empty document
//! yields the public execution service defaults the editor ships with.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::dispatcher::PollPolicy;
use crate::endpoint::EndpointDescriptor;
use crate::errors::CodeLabError;
use crate::language::{Language, LanguageOverride, LanguageTable};
use crate::packaging::DEFAULT_PROJECT_NAME;

pub const API_KEY_HEADER: &str = "X-RapidAPI-Key";
pub const DEFAULT_API_KEY: &str = "demo";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CodeLabConfig {
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub execution: ExecutionConfig,
    #[serde(default)]
    pub languages: BTreeMap<Language, LanguageOverride>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default = "default_project_name")]
    pub name: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: default_project_name(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    #[serde(default)]
    pub primary: PrimaryEndpointConfig,
    #[serde(default = "default_alternates")]
    pub alternates: Vec<String>,
    #[serde(default)]
    pub poll: PollConfig,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            primary: PrimaryEndpointConfig::default(),
            alternates: default_alternates(),
            poll: PollConfig::default(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrimaryEndpointConfig {
    #[serde(default = "default_primary_url")]
    pub url: String,
    #[serde(default = "default_primary_headers")]
    pub headers: BTreeMap<String, String>,
    /// Environment variable holding the API key
    #[serde(default)]
    pub api_key_env: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for PrimaryEndpointConfig {
    fn default() -> Self {
        Self {
            url: default_primary_url(),
            headers: default_primary_headers(),
            api_key_env: None,
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            interval_ms: default_interval_ms(),
        }
    }
}

fn default_project_name() -> String {
    DEFAULT_PROJECT_NAME.to_string()
}

fn default_primary_url() -> String {
    "https://judge0-ce.p.rapidapi.com".to_string()
}

fn default_primary_headers() -> BTreeMap<String, String> {
    let mut headers = BTreeMap::new();
    headers.insert("X-RapidAPI-Host".to_string(), "judge0-ce.p.rapidapi.com".to_string());
    headers
}

fn default_alternates() -> Vec<String> {
    vec![
        "https://api.judge0.com".to_string(),
        "https://judge0-extra-ce.p.rapidapi.com".to_string(),
    ]
}

fn default_max_attempts() -> u32 {
    10
}

fn default_interval_ms() -> u64 {
    1000
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl CodeLabConfig {
    pub fn validate(&self) -> Result<(), CodeLabError> {
        if self.project.name.trim().is_empty() {
            return Err(CodeLabError::Config("Project name cannot be empty".to_string()));
        }

        validate_url("execution.primary.url", &self.execution.primary.url)?;
        for (index, url) in self.execution.alternates.iter().enumerate() {
            validate_url(&format!("execution.alternates[{}]", index), url)?;
        }

        if self.execution.poll.max_attempts == 0 {
            return Err(CodeLabError::Config(
                "execution.poll.max_attempts must be greater than 0".to_string(),
            ));
        }

        if self.execution.request_timeout_secs == 0 {
            return Err(CodeLabError::Config(
                "execution.request_timeout_secs must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Primary endpoint first, then alternates in declaration order.
    pub fn endpoints(&self) -> Vec<EndpointDescriptor> {
        let primary = &self.execution.primary;
        let mut auth = primary.headers.clone();
        match &primary.api_key {
            Some(key) => {
                auth.insert(API_KEY_HEADER.to_string(), key.clone());
            }
            None => {
                auth.entry(API_KEY_HEADER.to_string())
                    .or_insert_with(|| DEFAULT_API_KEY.to_string());
            }
        }

        let mut endpoints = vec![EndpointDescriptor::primary(primary.url.clone(), auth)];
        endpoints.extend(
            self.execution
                .alternates
                .iter()
                .map(|url| EndpointDescriptor::alternate(url.clone())),
        );
        endpoints
    }

    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            max_attempts: self.execution.poll.max_attempts,
            interval: Duration::from_millis(self.execution.poll.interval_ms),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.execution.request_timeout_secs)
    }

    pub fn language_table(&self) -> LanguageTable {
        LanguageTable::with_overrides(&self.languages)
    }
}

fn validate_url(field: &str, url: &str) -> Result<(), CodeLabError> {
    if url.trim().is_empty() {
        return Err(CodeLabError::Config(format!("{} cannot be empty", field)));
    }
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(CodeLabError::Config(format!(
            "{} must be an http(s) URL, got '{}'",
            field, url
        )));
    }
    Ok(())
}
