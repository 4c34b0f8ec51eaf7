//! Test session and record identity types.
//!
//! Session ids arrive from the host platform as opaque strings. Sessions
//! planned locally get a generated id of the form `tt-YYYYMMDD-HHMMSS-xxxx`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one test batch; records are partitioned by it before aggregation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TestSessionId(pub String);

impl TestSessionId {
    /// Generate a new session id.
    pub fn generate() -> Self {
        let now = chrono::Utc::now();
        TestSessionId(format!(
            "tt-{}-{}-{}",
            now.format("%Y%m%d"),
            now.format("%H%M%S"),
            generate_base32_suffix()
        ))
    }

    /// Accept an externally supplied id.
    ///
    /// Surrounding whitespace is trimmed; blank ids are rejected.
    pub fn parse(s: &str) -> Option<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(TestSessionId(trimmed.to_string()))
    }

    /// Whether this id has the locally generated `tt-` shape.
    pub fn is_generated(&self) -> bool {
        let s = self.0.as_str();
        let bytes = s.as_bytes();
        if bytes.len() != 23 || !s.starts_with("tt-") {
            return false;
        }
        if bytes[11] != b'-' || bytes[18] != b'-' {
            return false;
        }
        s[3..11].chars().all(|c| c.is_ascii_digit())
            && s[12..18].chars().all(|c| c.is_ascii_digit())
            && s[19..].chars().all(|c| matches!(c, 'a'..='z' | '2'..='7'))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TestSessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TestSessionId {
    fn from(s: &str) -> Self {
        TestSessionId(s.to_string())
    }
}

impl From<String> for TestSessionId {
    fn from(s: String) -> Self {
        TestSessionId(s)
    }
}

/// Identifier of a raw response row in the host platform.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl RecordId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        RecordId(s.to_string())
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        RecordId(s)
    }
}

fn generate_base32_suffix() -> String {
    let uuid = uuid::Uuid::new_v4();
    let bytes = uuid.as_bytes();
    let value =
        (((bytes[0] as u32) << 16) | ((bytes[1] as u32) << 8) | bytes[2] as u32) & 0x000F_FFFF;
    let alphabet = b"abcdefghijklmnopqrstuvwxyz234567";
    [15_u32, 10, 5, 0]
        .iter()
        .map(|shift| alphabet[((value >> shift) & 0x1F) as usize] as char)
        .collect()
}
