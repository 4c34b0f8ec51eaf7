//! Markdown rendering of a report.
//!
//! Produces a single document with `## ` section headers so the output reads
//! well in a terminal and pastes cleanly into trackers and wikis.

use crate::config::ReportConfig;
use crate::generator::ReportData;
use crate::verdict::ReportVerdict;

/// Renders [`ReportData`] as Markdown.
pub struct MarkdownRenderer {
    config: ReportConfig,
}

impl MarkdownRenderer {
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn render(&self, data: &ReportData) -> String {
        let verdict = &data.verdict;
        let sections = &self.config.sections;
        let mut md = String::with_capacity(4096);

        md.push_str(&format!("# {}\n\n", data.title()));

        if sections.summary {
            render_summary(&mut md, data);
        }
        if sections.warnings && !verdict.warnings.is_empty() {
            md.push_str("## Warnings\n\n");
            for warning in &verdict.warnings {
                md.push_str(&format!("- {}\n", warning.message()));
            }
            md.push('\n');
        }
        if sections.rule {
            md.push_str("## Rule\n\n");
            md.push_str(&verdict.rule_description);
            md.push_str("\n\n");
        }
        if sections.groups {
            render_groups(&mut md, verdict);
        }
        if sections.correct_responses {
            render_correct_responses(&mut md, verdict);
        }

        md.push_str(&format!(
            "---\n_Generated {} by tt-report {}_\n",
            data.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            data.generator_version
        ));
        md
    }
}

fn render_summary(md: &mut String, data: &ReportData) {
    let verdict = &data.verdict;
    md.push_str("## Summary\n\n");
    if let Some(session) = &data.session_id {
        md.push_str(&format!("- **Session**: {}\n", session));
    }
    let status = if verdict.pass { "✓ PASS" } else { "✗ FAIL" };
    md.push_str(&format!("- **Result**: {}\n", status));
    md.push_str(&format!("- **Test type**: {}\n", verdict.test_type));
    md.push_str(&format!(
        "- **Correct answers**: {} of {} (threshold {})\n",
        verdict.observed_correct, verdict.observed_total, verdict.threshold
    ));
    md.push_str(&format!(
        "- **Expected responses**: {} ({} per group)\n",
        verdict.expected_total, verdict.effective_group_size
    ));
    md.push_str(&format!(
        "- **Significant**: {}\n\n",
        if verdict.significant { "yes" } else { "no" }
    ));
}

fn render_groups(md: &mut String, verdict: &ReportVerdict) {
    md.push_str("## Groups\n\n");
    md.push_str("| Group | Responses | Correct | Answers |\n");
    md.push_str("|-------|-----------|---------|---------|\n");
    for group in &verdict.groups {
        let answers = if group.histogram.is_empty() {
            "-".to_string()
        } else {
            group
                .histogram
                .iter()
                .map(|c| format!("{} ×{}", escape_cell(&c.answer), c.count))
                .collect::<Vec<_>>()
                .join(", ")
        };
        md.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            group.group, group.total, group.correct, answers
        ));
    }
    md.push('\n');
}

fn render_correct_responses(md: &mut String, verdict: &ReportVerdict) {
    md.push_str("## Correct Responses\n\n");
    if verdict.correct_responses.is_empty() {
        md.push_str("No respondent identified the odd sample.\n\n");
        return;
    }
    md.push_str("| Submitter | Feedback |\n");
    md.push_str("|-----------|----------|\n");
    for hit in &verdict.correct_responses {
        md.push_str(&format!(
            "| {} | {} |\n",
            hit.submitter.as_deref().map(escape_cell).unwrap_or_else(|| "-".into()),
            hit.feedback.as_deref().map(escape_cell).unwrap_or_else(|| "-".into()),
        ));
    }
    md.push('\n');
}

/// Keep free text from breaking the table layout.
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\r', '\n'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::ReportGenerator;
    use chrono::{TimeZone, Utc};
    use tt_common::{GroupLabel, ResponseRecord};
    use tt_math::TestType;

    fn data(total: usize, correct: usize) -> ReportData {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let records: Vec<ResponseRecord> = (0..total)
            .map(|i| {
                let answer = if i < correct { "417" } else { "233" };
                let group = GroupLabel::ALL[i % 6];
                ResponseRecord::new(format!("r{i}"), "s1", group, answer, "417", at)
                    .with_submitter(format!("panelist {i}"))
                    .with_feedback("a | b\nc")
            })
            .collect();
        ReportGenerator::default_config()
            .generate(&records, TestType::Difference, 0, Some("s1"))
            .unwrap()
    }

    #[test]
    fn renders_all_sections_by_default() {
        let md = MarkdownRenderer::new(ReportConfig::default()).render(&data(36, 5));
        assert!(md.starts_with("# Triangle Test s1\n"));
        assert!(md.contains("- **Result**: ✓ PASS"));
        assert!(md.contains("## Rule\n\nDifference test"));
        assert!(md.contains("| A1 | 6 |"));
        assert!(md.contains("## Correct Responses"));
        assert!(!md.contains("## Warnings"));
    }

    #[test]
    fn warnings_section_lists_shortage() {
        let md = MarkdownRenderer::new(ReportConfig::default()).render(&data(30, 0));
        assert!(md.contains("## Warnings\n\n- Only 30 of 36"));
        assert!(md.contains("✗ FAIL"));
        assert!(md.contains("No respondent identified the odd sample."));
    }

    #[test]
    fn disabled_sections_are_omitted() {
        let config = ReportConfig::new()
            .with_title("Lager trial")
            .with_groups(false)
            .with_correct_responses(false);
        let md = MarkdownRenderer::new(config.clone()).render(&data(36, 5).with_config(&config));
        assert!(md.starts_with("# Lager trial\n"));
        assert!(!md.contains("## Groups"));
        assert!(!md.contains("## Correct Responses"));
    }

    #[test]
    fn free_text_is_escaped_in_tables() {
        let md = MarkdownRenderer::new(ReportConfig::default()).render(&data(36, 1));
        assert!(md.contains("| panelist 0 | a \\| b c |"));
    }
}
