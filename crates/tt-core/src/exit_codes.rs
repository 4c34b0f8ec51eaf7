//! Exit codes for the tt-core CLI.
//!
//! Exit code ranges:
//! - 0-1: Report outcomes (parse the verdict from the code, not the output)
//! - 10-19: User/input errors (recoverable by user action)
//! - 20-29: Environment failures (I/O)

use tt_common::{Error, ErrorCategory};

/// Exit codes for tt-core operations.
///
/// These codes are a stable contract for automation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Command succeeded; for `verdict`, the report passed
    Clean = 0,

    /// Report produced but did not pass
    ReportFailed = 1,

    /// Invalid arguments or malformed input
    ArgsError = 10,

    /// Protocol configuration missing or invalid
    ConfigError = 11,

    /// No response records for the selected session
    EmptyInput = 15,

    /// I/O error
    IoError = 21,
}

impl ExitCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn is_success(self) -> bool {
        self == ExitCode::Clean
    }

    /// Codes 0-1 are outcomes, not errors.
    pub fn is_operational(self) -> bool {
        (self as i32) < 10
    }

    pub fn is_user_error(self) -> bool {
        (10..20).contains(&(self as i32))
    }

    pub fn is_environment_error(self) -> bool {
        (self as i32) >= 20
    }

    /// Stable name for JSON output.
    pub fn code_name(&self) -> &'static str {
        match self {
            ExitCode::Clean => "OK",
            ExitCode::ReportFailed => "OK_REPORT_FAILED",
            ExitCode::ArgsError => "ERR_ARGS",
            ExitCode::ConfigError => "ERR_CONFIG",
            ExitCode::EmptyInput => "ERR_EMPTY_INPUT",
            ExitCode::IoError => "ERR_IO",
        }
    }

    /// Outcome code for a built verdict.
    pub fn for_verdict(pass: bool) -> Self {
        if pass {
            ExitCode::Clean
        } else {
            ExitCode::ReportFailed
        }
    }
}

impl From<&Error> for ExitCode {
    fn from(err: &Error) -> Self {
        match err {
            Error::EmptyInput { .. } => ExitCode::EmptyInput,
            Error::Json(_) | Error::InvalidRecord(_) | Error::UnknownGroup(_) => {
                ExitCode::ArgsError
            }
            _ => match err.category() {
                ErrorCategory::Config => ExitCode::ConfigError,
                ErrorCategory::Io => ExitCode::IoError,
                ErrorCategory::Input => ExitCode::ArgsError,
            },
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code_name(), self.as_i32())
    }
}
