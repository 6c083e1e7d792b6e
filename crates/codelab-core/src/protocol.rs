//! Wire format of the remote execution service and result decoding
//!
//! All payload strings travel base64-encoded. Encoding happens when a
//! [`SubmissionBody`] is built and decoding when a [`SubmissionResponse`] is
//! turned into an [`ExecutionResult`]; nothing past this module sees base64.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::errors::CodeLabError;

/// Status id the service uses for a successful run.
pub const STATUS_ACCEPTED: u32 = 3;
/// Highest status id that still means "not finished yet".
pub const STATUS_LAST_PENDING: u32 = 2;

/// One run request, built once per run and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionRequest {
    pub language: crate::language::Language,
    pub language_id: u32,
    pub source_text: String,
    pub stdin: String,
}

impl ExecutionRequest {
    pub fn new(
        language: crate::language::Language,
        language_id: u32,
        source_text: impl Into<String>,
    ) -> Self {
        Self {
            language,
            language_id,
            source_text: source_text.into(),
            stdin: String::new(),
        }
    }

    pub fn to_submission_body(&self) -> SubmissionBody {
        SubmissionBody {
            language_id: self.language_id,
            source_code: STANDARD.encode(self.source_text.as_bytes()),
            stdin: STANDARD.encode(self.stdin.as_bytes()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionBody {
    pub language_id: u32,
    pub source_code: String,
    pub stdin: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WireStatus {
    pub id: u32,
    #[serde(default)]
    pub description: Option<String>,
}

/// Body returned by both the submit and the poll calls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmissionResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<WireStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compile_output: Option<String>,
}

impl SubmissionResponse {
    /// Pending-submission token, ignoring empty strings.
    pub fn pending_token(&self) -> Option<&str> {
        self.token.as_deref().filter(|t| !t.is_empty())
    }

    pub fn is_pending(&self) -> bool {
        self.status
            .as_ref()
            .map(|s| !ExecutionStatus::from_id(s.id).is_terminal())
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStatus {
    Queued,
    Running,
    Completed,
    Failed(u32),
}

impl ExecutionStatus {
    pub fn from_id(id: u32) -> Self {
        match id {
            0 | 1 => ExecutionStatus::Queued,
            STATUS_LAST_PENDING => ExecutionStatus::Running,
            STATUS_ACCEPTED => ExecutionStatus::Completed,
            other => ExecutionStatus::Failed(other),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ExecutionStatus::Completed | ExecutionStatus::Failed(_))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionStatus::Completed)
    }
}

/// Decoded result of one submission.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionResult {
    pub status: ExecutionStatus,
    pub description: String,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
    pub compile_output: Option<String>,
}

impl ExecutionResult {
    /// Decode a terminal response. A response with no status at all is
    /// treated as a failed run with an unknown description.
    pub fn from_response(response: &SubmissionResponse) -> Result<Self, CodeLabError> {
        let (status, description) = match &response.status {
            Some(wire) => (
                ExecutionStatus::from_id(wire.id),
                wire.description.clone().unwrap_or_else(|| "Unknown".to_string()),
            ),
            None => (ExecutionStatus::Failed(0), "Unknown".to_string()),
        };

        Ok(Self {
            status,
            description,
            stdout: decode_field("stdout", response.stdout.as_deref())?,
            stderr: decode_field("stderr", response.stderr.as_deref())?,
            compile_output: decode_field("compile_output", response.compile_output.as_deref())?,
        })
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Report text: a status line followed by any non-empty sections.
    pub fn render(&self) -> Vec<String> {
        let icon = if self.is_success() { "✅" } else { "❌" };
        let mut lines = vec![format!("{} Execution {}:", icon, self.description)];
        for (heading, body) in [
            ("Output:", &self.stdout),
            ("Errors:", &self.stderr),
            ("Compilation:", &self.compile_output),
        ] {
            if let Some(text) = body {
                lines.push(heading.to_string());
                lines.push(text.clone());
            }
        }
        lines
    }
}

/// Decode one optional base64 field. Empty input yields `None`.
/// The service wraps long base64 output across lines, so whitespace is
/// stripped before decoding.
pub fn decode_field(name: &str, raw: Option<&str>) -> Result<Option<String>, CodeLabError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Ok(None);
    }
    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| CodeLabError::Decode(format!("field '{}' is not valid base64: {}", name, e)))?;
    let text = String::from_utf8_lossy(&bytes).into_owned();
    if text.is_empty() {
        Ok(None)
    } else {
        Ok(Some(text))
    }
}

pub fn encode_text(text: &str) -> String {
    STANDARD.encode(text.as_bytes())
}
