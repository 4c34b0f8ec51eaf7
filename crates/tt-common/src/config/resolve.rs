//! Configuration resolution.
//!
//! Resolution order for `protocol.json`:
//! 1. Explicit CLI flag (`--config`)
//! 2. `TRIANGLE_TEST_CONFIG` environment variable
//! 3. `$XDG_CONFIG_HOME/triangle_test/protocol.json`
//! 4. `~/.config/triangle_test/protocol.json` (platform config dir)
//! 5. Built-in defaults
//!
//! Steps 3 and 4 only apply when the file exists.

use std::env;
use std::fs;
use std::path::PathBuf;

use sha2::{Digest, Sha256};

use super::{ConfigResolution, ConfigSource, ProtocolConfig};
use crate::error::{Error, Result};

pub const CONFIG_ENV: &str = "TRIANGLE_TEST_CONFIG";
pub const CONFIG_DIR_NAME: &str = "triangle_test";
pub const PROTOCOL_FILE_NAME: &str = "protocol.json";

/// Configuration file paths supplied on the command line.
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    /// Directory searched for `protocol.json`
    pub config_dir: Option<PathBuf>,
    /// Explicit path to the protocol file
    pub protocol_path: Option<PathBuf>,
}

/// Configuration resolver with deterministic resolution order.
#[derive(Debug)]
pub struct ConfigResolver {
    cli_paths: ConfigPaths,
}

impl ConfigResolver {
    pub fn new(paths: ConfigPaths) -> Self {
        ConfigResolver { cli_paths: paths }
    }

    /// Create a resolver with no CLI overrides.
    pub fn with_defaults() -> Self {
        ConfigResolver {
            cli_paths: ConfigPaths::default(),
        }
    }

    /// Resolve the directory searched for `protocol.json`.
    pub fn resolve_config_dir(&self) -> Option<PathBuf> {
        if let Some(ref dir) = self.cli_paths.config_dir {
            return Some(dir.clone());
        }

        if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
            if !xdg.is_empty() {
                return Some(PathBuf::from(xdg).join(CONFIG_DIR_NAME));
            }
        }

        dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME))
    }

    /// Resolve the protocol file path.
    pub fn resolve_protocol_path(&self) -> (Option<PathBuf>, ConfigResolution) {
        if let Some(ref path) = self.cli_paths.protocol_path {
            return (Some(path.clone()), ConfigResolution::CliFlag);
        }

        if let Ok(path) = env::var(CONFIG_ENV) {
            if !path.trim().is_empty() {
                return (Some(PathBuf::from(path)), ConfigResolution::EnvVar);
            }
        }

        if let Some(config_dir) = self.resolve_config_dir() {
            let path = config_dir.join(PROTOCOL_FILE_NAME);
            if path.exists() {
                return (Some(path), ConfigResolution::XdgConfig);
            }
        }

        (None, ConfigResolution::Default)
    }

    /// Load the protocol from the resolved path or defaults.
    pub fn load_protocol(&self) -> Result<(ProtocolConfig, ConfigSource)> {
        let (path, resolution) = self.resolve_protocol_path();

        let Some(p) = path else {
            return Ok((ProtocolConfig::default(), ConfigSource::defaults()));
        };

        let content = fs::read_to_string(&p).map_err(|e| {
            Error::Config(format!("failed to read protocol from {}: {}", p.display(), e))
        })?;
        let hash = compute_sha256(&content);

        let protocol: ProtocolConfig = serde_json::from_str(&content).map_err(|e| {
            Error::InvalidConfig(format!("failed to parse {}: {}", p.display(), e))
        })?;
        protocol.validate()?;

        Ok((
            protocol,
            ConfigSource {
                path: Some(p.to_string_lossy().to_string()),
                hash: Some(hash),
                resolution,
            },
        ))
    }
}

/// SHA-256 of a string, hex encoded.
pub(crate) fn compute_sha256(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn sha256_is_hex_encoded() {
        let hash = compute_sha256("protocol");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(hash, compute_sha256("protocol"));
    }

    #[test]
    fn cli_path_wins() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(br#"{"test_type": "similarity test", "group_size": 7}"#)
            .unwrap();

        let resolver = ConfigResolver::new(ConfigPaths {
            config_dir: None,
            protocol_path: Some(tmp.path().to_path_buf()),
        });
        let (protocol, source) = resolver.load_protocol().unwrap();
        assert_eq!(source.resolution, ConfigResolution::CliFlag);
        assert!(source.hash.is_some());
        assert_eq!(protocol.group_size, 7);
        assert_eq!(protocol.resolved_test_type(), tt_math::TestType::Similarity);
    }

    #[test]
    fn config_dir_file_is_picked_up_when_present() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(PROTOCOL_FILE_NAME), r#"{"group_size": 9}"#).unwrap();

        let resolver = ConfigResolver::new(ConfigPaths {
            config_dir: Some(dir.path().to_path_buf()),
            protocol_path: None,
        });
        let (path, resolution) = resolver.resolve_protocol_path();
        // The env var outranks the directory; only assert when it is unset.
        if env::var(CONFIG_ENV).is_err() {
            assert_eq!(resolution, ConfigResolution::XdgConfig);
            assert_eq!(path.unwrap(), dir.path().join(PROTOCOL_FILE_NAME));
            let (protocol, _) = resolver.load_protocol().unwrap();
            assert_eq!(protocol.group_size, 9);
        }
    }

    #[test]
    fn empty_config_dir_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = ConfigResolver::new(ConfigPaths {
            config_dir: Some(dir.path().to_path_buf()),
            protocol_path: None,
        });
        if env::var(CONFIG_ENV).is_err() {
            let (protocol, source) = resolver.load_protocol().unwrap();
            assert_eq!(source.resolution, ConfigResolution::Default);
            assert!(source.path.is_none());
            assert_eq!(protocol, ProtocolConfig::default());
        }
    }

    #[test]
    fn unparsable_file_is_invalid_config() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"{ not json").unwrap();
        let resolver = ConfigResolver::new(ConfigPaths {
            config_dir: None,
            protocol_path: Some(tmp.path().to_path_buf()),
        });
        let err = resolver.load_protocol().unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn missing_cli_file_is_config_error() {
        let resolver = ConfigResolver::new(ConfigPaths {
            config_dir: None,
            protocol_path: Some(PathBuf::from("/nonexistent/triangle/protocol.json")),
        });
        assert!(matches!(
            resolver.load_protocol().unwrap_err(),
            Error::Config(_)
        ));
    }
}
