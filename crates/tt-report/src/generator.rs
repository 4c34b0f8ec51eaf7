//! Report generator implementation.

use crate::config::ReportConfig;
use crate::error::Result;
use crate::markdown::MarkdownRenderer;
use crate::verdict::{build_verdict, ReportVerdict};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use tt_common::ResponseRecord;
use tt_math::TestType;

/// Complete report data structure.
///
/// Wraps the deterministic verdict with generation metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportData {
    pub schema_version: String,
    /// Custom report title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub generated_at: DateTime<Utc>,
    pub generator_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub verdict: ReportVerdict,
}

impl ReportData {
    /// Get the report title.
    pub fn title(&self) -> String {
        self.title
            .clone()
            .or_else(|| {
                self.session_id
                    .as_ref()
                    .map(|s| format!("Triangle Test {}", s))
            })
            .unwrap_or_else(|| "Triangle Test Report".to_string())
    }

    /// Re-title from another configuration.
    pub fn with_config(mut self, config: &ReportConfig) -> Self {
        self.title = config.title.clone();
        self
    }
}

/// Report generator.
pub struct ReportGenerator {
    config: ReportConfig,
}

impl ReportGenerator {
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }

    /// Create a generator with default configuration.
    pub fn default_config() -> Self {
        Self::new(ReportConfig::default())
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Build the verdict and wrap it for rendering.
    pub fn generate(
        &self,
        records: &[ResponseRecord],
        test_type: TestType,
        user_group_size: i64,
        session_id: Option<&str>,
    ) -> Result<ReportData> {
        debug!(
            records = records.len(),
            test_type = %test_type,
            user_group_size,
            "Generating report"
        );

        let verdict = build_verdict(records, test_type, user_group_size)?;

        Ok(ReportData {
            schema_version: self.config.schema_version.clone(),
            title: self.config.title.clone(),
            generated_at: Utc::now(),
            generator_version: env!("CARGO_PKG_VERSION").to_string(),
            session_id: session_id.map(str::to_string),
            verdict,
        })
    }

    /// Render report data as Markdown.
    pub fn render_markdown(&self, data: &ReportData) -> String {
        let output = MarkdownRenderer::new(self.config.clone()).render(data);
        info!(bytes = output.len(), title = %data.title(), "Report rendered");
        output
    }

    /// Render report data as pretty JSON.
    pub fn render_json(&self, data: &ReportData) -> Result<String> {
        Ok(serde_json::to_string_pretty(data)?)
    }
}
