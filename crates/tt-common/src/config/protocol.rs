//! The `protocol.json` structure.
//!
//! Describes how a session is run and reported: which statistical regime
//! applies, how many respondents each group is meant to have, and what the
//! rendered report includes.

use serde::{Deserialize, Serialize};
use tt_math::TestType;

use crate::error::{Error, Result};

/// Protocol configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolConfig {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,
    /// Test-type selector; unknown names fall back to the difference test.
    #[serde(default = "default_test_type")]
    pub test_type: String,
    /// Declared respondents per group; 0 or negative means unset.
    #[serde(default)]
    pub group_size: i64,
    #[serde(default)]
    pub report: ReportOptions,
    #[serde(default)]
    pub sheet: SheetOptions,
}

/// What the rendered report includes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportOptions {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default = "default_true")]
    pub include_groups: bool,
    #[serde(default = "default_true")]
    pub include_correct_responses: bool,
}

/// Test-sheet planning options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetOptions {
    /// Digits per blinding code.
    #[serde(default = "default_code_digits")]
    pub code_digits: u32,
}

fn default_schema_version() -> String {
    crate::SCHEMA_VERSION.to_string()
}

fn default_test_type() -> String {
    TestType::default().name().to_string()
}

fn default_true() -> bool {
    true
}

fn default_code_digits() -> u32 {
    3
}

impl Default for ReportOptions {
    fn default() -> Self {
        ReportOptions {
            title: None,
            include_groups: true,
            include_correct_responses: true,
        }
    }
}

impl Default for SheetOptions {
    fn default() -> Self {
        SheetOptions {
            code_digits: default_code_digits(),
        }
    }
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        ProtocolConfig {
            schema_version: default_schema_version(),
            test_type: default_test_type(),
            group_size: 0,
            report: ReportOptions::default(),
            sheet: SheetOptions::default(),
        }
    }
}

impl ProtocolConfig {
    /// Resolved statistical regime.
    pub fn resolved_test_type(&self) -> TestType {
        TestType::from_selector(&self.test_type)
    }

    /// Whether `test_type` names a regime exactly (otherwise the default applies).
    pub fn test_type_is_canonical(&self) -> bool {
        TestType::is_canonical(&self.test_type)
    }

    /// Semantic validation.
    pub fn validate(&self) -> Result<()> {
        let major = self.schema_version.split('.').next().unwrap_or_default();
        if major != "1" {
            return Err(Error::InvalidConfig(format!(
                "unsupported schema_version '{}' (expected 1.x)",
                self.schema_version
            )));
        }
        if !(2..=6).contains(&self.sheet.code_digits) {
            return Err(Error::InvalidConfig(format!(
                "sheet.code_digits must be between 2 and 6, got {}",
                self.sheet.code_digits
            )));
        }
        if let Some(title) = &self.report.title {
            if title.trim().is_empty() {
                return Err(Error::InvalidConfig(
                    "report.title must not be blank when set".to_string(),
                ));
            }
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
