//! Protocol configuration loading and validation.
//!
//! This module provides:
//! - The typed `protocol.json` structure
//! - Deterministic config resolution (CLI > env > XDG > defaults)
//! - Config snapshots for audit trails

pub mod protocol;
pub mod resolve;
pub mod snapshot;

pub use protocol::{ProtocolConfig, ReportOptions, SheetOptions};
pub use resolve::{ConfigPaths, ConfigResolver, CONFIG_ENV};
pub use snapshot::{ConfigSnapshot, SourceInfo};

/// Where a loaded config file came from.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    /// Path to the config file, or None if using defaults
    pub path: Option<String>,
    /// SHA-256 hash of file contents, or None if defaults
    pub hash: Option<String>,
    /// How this source was resolved
    pub resolution: ConfigResolution,
}

impl ConfigSource {
    pub fn defaults() -> Self {
        ConfigSource {
            path: None,
            hash: None,
            resolution: ConfigResolution::Default,
        }
    }
}

/// How a config file was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigResolution {
    /// From explicit CLI flag
    CliFlag,
    /// From environment variable
    EnvVar,
    /// From XDG config directory
    XdgConfig,
    /// Using built-in defaults
    Default,
}

impl std::fmt::Display for ConfigResolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigResolution::CliFlag => write!(f, "cli"),
            ConfigResolution::EnvVar => write!(f, "env"),
            ConfigResolution::XdgConfig => write!(f, "xdg"),
            ConfigResolution::Default => write!(f, "default"),
        }
    }
}
