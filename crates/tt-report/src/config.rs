//! Report configuration types.

use serde::{Deserialize, Serialize};
use tt_common::ProtocolConfig;

/// Report section visibility configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSections {
    /// Verdict summary.
    #[serde(default = "default_true")]
    pub summary: bool,
    /// Warnings list.
    #[serde(default = "default_true")]
    pub warnings: bool,
    /// Rule description.
    #[serde(default = "default_true")]
    pub rule: bool,
    /// Per-group breakdown table.
    #[serde(default = "default_true")]
    pub groups: bool,
    /// Correct responses list.
    #[serde(default = "default_true")]
    pub correct_responses: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ReportSections {
    fn default() -> Self {
        Self {
            summary: true,
            warnings: true,
            rule: true,
            groups: true,
            correct_responses: true,
        }
    }
}

/// Complete report configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Schema version.
    #[serde(default = "default_schema_version")]
    pub schema_version: String,
    /// Custom report title.
    pub title: Option<String>,
    /// Section visibility.
    #[serde(default)]
    pub sections: ReportSections,
}

fn default_schema_version() -> String {
    tt_common::SCHEMA_VERSION.to_string()
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            title: None,
            sections: ReportSections::default(),
        }
    }
}

impl ReportConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive report settings from the protocol's `report` options.
    pub fn from_protocol(protocol: &ProtocolConfig) -> Self {
        Self {
            schema_version: default_schema_version(),
            title: protocol.report.title.clone(),
            sections: ReportSections {
                groups: protocol.report.include_groups,
                correct_responses: protocol.report.include_correct_responses,
                ..ReportSections::default()
            },
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_groups(mut self, enabled: bool) -> Self {
        self.sections.groups = enabled;
        self
    }

    pub fn with_correct_responses(mut self, enabled: bool) -> Self {
        self.sections.correct_responses = enabled;
        self
    }

    /// Load configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
