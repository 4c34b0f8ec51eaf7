//! Error types for the triangle test engine.
//!
//! Errors carry:
//! - Stable error codes for machine parsing
//! - Category classification for grouping
//! - Recoverability hints and suggested actions for callers
//! - Remediation text for humans
//!
//! Only one condition is fatal to report building (`EmptyInput`); sample-size
//! irregularities travel as warnings on the verdict instead.
//!
//! # Agent-Facing Output
//!
//! ```json
//! {
//!   "code": 20,
//!   "category": "input",
//!   "message": "no response records for session s-42",
//!   "recoverable": true,
//!   "suggested_action": "refetch",
//!   "context": { "session_id": "s-42" }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Result type alias for triangle test operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Protocol configuration errors.
    Config,
    /// Response record input errors.
    Input,
    /// File I/O and serialization errors.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Input => write!(f, "input"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// What a caller should do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestedAction {
    /// Fetch the records again or pick another session.
    Refetch,
    /// Fix the offending record upstream.
    FixInput,
    /// Validate the configuration file.
    RunCheck,
    /// Reset configuration to defaults.
    ResetConfig,
    /// Retry the operation.
    Retry,
    /// Manual intervention required.
    ManualIntervention,
}

impl std::fmt::Display for SuggestedAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SuggestedAction::Refetch => write!(f, "refetch"),
            SuggestedAction::FixInput => write!(f, "fix_input"),
            SuggestedAction::RunCheck => write!(f, "run_check"),
            SuggestedAction::ResetConfig => write!(f, "reset_config"),
            SuggestedAction::Retry => write!(f, "retry"),
            SuggestedAction::ManualIntervention => write!(f, "manual_intervention"),
        }
    }
}

/// Unified error type.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid protocol configuration: {0}")]
    InvalidConfig(String),

    // Input errors (20-29)
    #[error("no response records for session {session}")]
    EmptyInput { session: String },

    #[error("invalid response record: {0}")]
    InvalidRecord(String),

    #[error("unknown group label '{0}'")]
    UnknownGroup(String),

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Stable error code, grouped by category:
    /// - 10-19: Configuration errors
    /// - 20-29: Input errors
    /// - 60-69: I/O errors
    pub fn code(&self) -> u32 {
        match self {
            Error::Config(_) => 10,
            Error::InvalidConfig(_) => 11,
            Error::EmptyInput { .. } => 20,
            Error::InvalidRecord(_) => 21,
            Error::UnknownGroup(_) => 22,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Config(_) | Error::InvalidConfig(_) => ErrorCategory::Config,
            Error::EmptyInput { .. } | Error::InvalidRecord(_) | Error::UnknownGroup(_) => {
                ErrorCategory::Input
            }
            Error::Io(_) | Error::Json(_) => ErrorCategory::Io,
        }
    }

    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::Config(_) | Error::InvalidConfig(_) => true,
            Error::EmptyInput { .. } => true,
            Error::InvalidRecord(_) | Error::UnknownGroup(_) => false,
            Error::Io(_) => true,
            Error::Json(_) => false,
        }
    }

    pub fn suggested_action(&self) -> SuggestedAction {
        match self {
            Error::Config(_) => SuggestedAction::RunCheck,
            Error::InvalidConfig(_) => SuggestedAction::ResetConfig,
            Error::EmptyInput { .. } => SuggestedAction::Refetch,
            Error::InvalidRecord(_) | Error::UnknownGroup(_) => SuggestedAction::FixInput,
            Error::Io(_) => SuggestedAction::Retry,
            Error::Json(_) => SuggestedAction::ManualIntervention,
        }
    }

    /// Human-readable remediation hint.
    pub fn remediation(&self) -> &'static str {
        match self {
            Error::Config(_) => "Run 'tt-core config validate' to check the protocol file.",
            Error::InvalidConfig(_) => {
                "Fix the reported field in protocol.json, or delete the file to use defaults."
            }
            Error::EmptyInput { .. } => {
                "Re-fetch the session's responses, or select a session that has submissions."
            }
            Error::InvalidRecord(_) => {
                "Check the exported record fields (session_id, group, answers, submitted_at)."
            }
            Error::UnknownGroup(_) => "Group labels must be one of A1, A2, A3, B1, B2, B3.",
            Error::Io(_) => "Check the file path and permissions, then retry.",
            Error::Json(_) => "The input is not valid JSON. Re-export it from the host platform.",
        }
    }

    /// Short headline for human-readable output.
    pub fn headline(&self) -> &'static str {
        match self {
            Error::Config(_) => "Configuration Error",
            Error::InvalidConfig(_) => "Invalid Protocol Configuration",
            Error::EmptyInput { .. } => "No Responses",
            Error::InvalidRecord(_) => "Invalid Response Record",
            Error::UnknownGroup(_) => "Unknown Group Label",
            Error::Io(_) => "I/O Error",
            Error::Json(_) => "JSON Parse Error",
        }
    }

    /// Three-line human rendering: headline, reason, fix.
    pub fn to_human(&self) -> String {
        format!(
            "✗ {}\n  Reason: {}\n  Fix: {}",
            self.headline(),
            self,
            self.remediation()
        )
    }
}

/// Structured error response for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    pub code: u32,
    pub category: ErrorCategory,
    pub message: String,
    pub recoverable: bool,
    pub suggested_action: SuggestedAction,
    /// Additional structured context (e.g. session id).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub context: BTreeMap<String, serde_json::Value>,
}

impl From<&Error> for StructuredError {
    fn from(err: &Error) -> Self {
        let mut context = BTreeMap::new();
        match err {
            Error::EmptyInput { session } => {
                context.insert("session_id".to_string(), serde_json::json!(session));
            }
            Error::UnknownGroup(label) => {
                context.insert("group".to_string(), serde_json::json!(label));
            }
            _ => {}
        }

        StructuredError {
            code: err.code(),
            category: err.category(),
            message: err.to_string(),
            recoverable: err.is_recoverable(),
            suggested_action: err.suggested_action(),
            context,
        }
    }
}

impl StructuredError {
    pub fn with_context(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.context.insert(key.into(), v);
        }
        self
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":{},"error":"serialization_failed"}}"#, self.code)
        })
    }
}
