//! Triangle test common types, IDs, and errors.
//!
//! This crate provides foundational types shared across the workspace:
//! - Group labels and classified response records
//! - Test session identity
//! - Unified error type with stable codes
//! - Output formats
//! - Protocol configuration loading and validation

pub mod config;
pub mod error;
pub mod id;
pub mod output;
pub mod record;

pub use config::{ConfigPaths, ConfigResolver, ConfigSnapshot, ProtocolConfig};
pub use error::{Error, ErrorCategory, Result, StructuredError, SuggestedAction};
pub use id::{RecordId, TestSessionId};
pub use output::OutputFormat;
pub use record::{GroupLabel, Product, ResponseRecord, Triad};

/// Schema version stamped into serialized verdicts and configs.
pub const SCHEMA_VERSION: &str = "1.0.0";
