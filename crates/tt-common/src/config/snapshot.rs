//! Configuration snapshots for audit.
//!
//! Captures the active protocol's source, file hash, schema version and an
//! effective-value hash so a rendered verdict can be traced back to the
//! configuration that produced it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::resolve::compute_sha256;
use super::{ConfigSource, ProtocolConfig};
use crate::error::{Error, Result};

/// Snapshot of the active configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    pub snapshot_at: DateTime<Utc>,
    /// Hash of the effective (parsed, defaulted) protocol
    pub effective_hash: String,
    pub source: SourceInfo,
    pub schema_version: String,
    /// Resolved test-type name
    pub test_type: String,
}

/// Source information for a config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceInfo {
    /// Path to the file (None if defaults)
    pub path: Option<String>,
    /// SHA-256 of the raw file content (None if defaults)
    pub hash: Option<String>,
    /// How the config was resolved
    pub resolution: String,
}

impl ConfigSnapshot {
    pub fn new(protocol: &ProtocolConfig, source: ConfigSource) -> Result<Self> {
        let effective = serde_json::to_string(protocol)
            .map_err(|e| Error::Config(format!("failed to serialize protocol: {}", e)))?;

        Ok(ConfigSnapshot {
            snapshot_at: Utc::now(),
            effective_hash: compute_sha256(&effective),
            source: SourceInfo {
                path: source.path,
                hash: source.hash,
                resolution: source.resolution.to_string(),
            },
            schema_version: protocol.schema_version.clone(),
            test_type: protocol.resolved_test_type().name().to_string(),
        })
    }

    pub fn from_defaults() -> Result<Self> {
        ConfigSnapshot::new(&ProtocolConfig::default(), ConfigSource::defaults())
    }

    pub fn is_default(&self) -> bool {
        self.source.resolution == "default"
    }
}
