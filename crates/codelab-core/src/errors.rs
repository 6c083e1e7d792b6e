//! Error types for the editor back end
//!
//! Failures are grouped by where they originate: talking to an execution
//! endpoint, decoding what it sent back, evaluating a script locally, loading
//! configuration, or writing a project bundle. The dispatcher and the local
//! script runner never let these escape; they fold them into report lines.
//! Everything else in the crate returns them normally.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CodeLabError {
    #[error("{message}")]
    Transport { endpoint: String, message: String },
    #[error("HTTP {status}")]
    HttpStatus { endpoint: String, status: u16 },
    #[error("Malformed response: {0}")]
    Decode(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),
    #[error("{0}")]
    Script(String),
    #[error("Packaging failed: {0}")]
    Packaging(String),
    #[error("I/O error: {0}")]
    Io(String),
}

impl CodeLabError {
    pub fn transport(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        CodeLabError::Transport {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for CodeLabError {
    fn from(err: std::io::Error) -> Self {
        CodeLabError::Io(err.to_string())
    }
}

impl From<zip::result::ZipError> for CodeLabError {
    fn from(err: zip::result::ZipError) -> Self {
        CodeLabError::Packaging(err.to_string())
    }
}

impl From<serde_yaml::Error> for CodeLabError {
    fn from(err: serde_yaml::Error) -> Self {
        CodeLabError::Config(format!("Failed to parse YAML config: {}", err))
    }
}
