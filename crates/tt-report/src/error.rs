//! Error types for report building.

use thiserror::Error;

/// Result type for report operations.
pub type Result<T> = std::result::Result<T, ReportError>;

/// Errors that can occur while building or rendering a report.
///
/// Sample-size irregularities are not errors; they travel as
/// [`crate::VerdictWarning`]s on a successful verdict.
#[derive(Error, Debug)]
pub enum ReportError {
    /// No response records were supplied.
    #[error("no response records to report on")]
    EmptyInput,

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl ReportError {
    /// Convert into the workspace error, naming the session the report was for.
    pub fn into_common(self, session: &str) -> tt_common::Error {
        match self {
            ReportError::EmptyInput => tt_common::Error::EmptyInput {
                session: session.to_string(),
            },
            ReportError::JsonError(e) => tt_common::Error::Json(e),
        }
    }
}
