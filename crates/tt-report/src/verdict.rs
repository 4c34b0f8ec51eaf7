//! Verdict assembly.
//!
//! A report passes only when the sample is complete and the observed
//! correct count stays below the significance threshold of the active test
//! type. Shortage, mismatch and table clamping are carried as warnings; the
//! only fatal condition is an empty record set.
//!
//! The verdict is a pure function of its inputs. It carries no timestamps and
//! nothing derived from hash-map iteration, so identical inputs serialize to
//! identical bytes.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use tt_common::{GroupLabel, RecordId, ResponseRecord};
use tt_math::{threshold_for_test_type, TestType, TestTypeRule, GROUP_COUNT};

use crate::aggregate::{aggregate, GroupStats};
use crate::error::{ReportError, Result};

/// Non-fatal irregularity attached to a verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VerdictWarning {
    /// Fewer responses than the protocol expects; the report cannot pass.
    InsufficientSample { observed: i64, expected: i64 },
    /// More responses than expected. Informational.
    CountMismatch { observed: i64, expected: i64 },
    /// Sample size fell outside the table domain and was clipped.
    SampleSizeClamped {
        requested: i64,
        clamped: i64,
        min: i64,
        max: i64,
    },
}

impl VerdictWarning {
    pub fn message(&self) -> String {
        match self {
            VerdictWarning::InsufficientSample { observed, expected } => format!(
                "Only {} of {} expected responses were collected ({} missing); the report cannot pass until the sample is complete.",
                observed,
                expected,
                expected - observed
            ),
            VerdictWarning::CountMismatch { observed, expected } => format!(
                "{} responses were collected but {} were expected; the larger count was used for the threshold.",
                observed, expected
            ),
            VerdictWarning::SampleSizeClamped {
                requested,
                clamped,
                min,
                max,
            } => format!(
                "Sample size {} is outside the published table range {}-{}; the threshold for {} was used.",
                requested, min, max, clamped
            ),
        }
    }
}

/// A correctly answered record, for the "correct responses" listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectResponse {
    pub record_id: RecordId,
    pub answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

impl From<&ResponseRecord> for CorrectResponse {
    fn from(record: &ResponseRecord) -> Self {
        CorrectResponse {
            record_id: record.record_id.clone(),
            answer: record.submitted_answer.clone(),
            submitter: record.submitter.clone(),
            feedback: record.feedback.clone(),
        }
    }
}

/// Outcome of one report build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportVerdict {
    pub test_type: TestType,
    pub pass: bool,
    pub significant: bool,
    pub observed_correct: i64,
    pub observed_total: i64,
    /// Table threshold at `threshold_base`.
    pub threshold: i64,
    /// Sample size used for the table lookup, after clamping.
    pub threshold_base: i64,
    /// Exact binomial threshold at `threshold_base` under the rule's alpha
    /// and guess probability. Reference only.
    pub exact_threshold: i64,
    pub expected_total: i64,
    pub effective_group_size: i64,
    pub count_shortage: bool,
    pub count_mismatch: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count_shortage_warning: Option<String>,
    #[serde(default)]
    pub warnings: Vec<VerdictWarning>,
    pub rule_description: String,
    pub groups: Vec<GroupStats>,
    pub correct_responses: Vec<CorrectResponse>,
}

impl ReportVerdict {
    pub fn group(&self, label: GroupLabel) -> Option<&GroupStats> {
        self.groups.iter().find(|g| g.group == label)
    }

    /// Whether the threshold lookup was clipped to the table domain.
    pub fn was_clamped(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w, VerdictWarning::SampleSizeClamped { .. }))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Declared per-group size, raised to the rule's minimum when smaller.
pub fn effective_group_size(user_group_size: i64, rule: &TestTypeRule) -> i64 {
    user_group_size.max(rule.min_group_size)
}

/// Responses expected across all six groups.
pub fn compute_expected_total(effective_group_size: i64) -> i64 {
    effective_group_size.max(0).saturating_mul(GROUP_COUNT)
}

/// Build the verdict for one session's records.
///
/// `user_group_size` of zero or below means "unset".
pub fn build_verdict(
    records: &[ResponseRecord],
    test_type: TestType,
    user_group_size: i64,
) -> Result<ReportVerdict> {
    if records.is_empty() {
        return Err(ReportError::EmptyInput);
    }

    let rule = test_type.rule();
    let table = test_type.table();

    let observed_total = records.len() as i64;
    let observed_correct = records.iter().filter(|r| r.is_correct()).count() as i64;

    let group_size = effective_group_size(user_group_size, rule);
    let expected_total = compute_expected_total(group_size);
    let count_shortage = observed_total < expected_total;
    let count_mismatch = !count_shortage && observed_total != expected_total;

    let requested = expected_total.max(observed_total);
    let threshold_base = table.clamp(requested);
    let threshold = threshold_for_test_type(test_type, threshold_base);
    let exact_threshold = rule.exact_threshold(threshold_base);

    // Fewer responses than the threshold cannot be significant.
    let significant = observed_total >= threshold && observed_correct >= threshold;
    let pass = !count_shortage && !significant;

    let mut warnings = Vec::new();
    if count_shortage {
        warnings.push(VerdictWarning::InsufficientSample {
            observed: observed_total,
            expected: expected_total,
        });
    }
    if count_mismatch {
        warnings.push(VerdictWarning::CountMismatch {
            observed: observed_total,
            expected: expected_total,
        });
    }
    if table.is_out_of_domain(requested) {
        warn!(
            requested,
            clamped = threshold_base,
            test_type = %test_type,
            "Sample size outside table domain"
        );
        warnings.push(VerdictWarning::SampleSizeClamped {
            requested,
            clamped: threshold_base,
            min: table.min_sample_size,
            max: table.max_sample_size,
        });
    }

    let count_shortage_warning = warnings.iter().find_map(|w| match w {
        VerdictWarning::InsufficientSample { .. } => Some(w.message()),
        _ => None,
    });
    if let Some(message) = &count_shortage_warning {
        warn!(observed_total, expected_total, "{}", message);
    }

    let correct_responses = records
        .iter()
        .filter(|r| r.is_correct())
        .map(CorrectResponse::from)
        .collect();

    let mut verdict = ReportVerdict {
        test_type,
        pass,
        significant,
        observed_correct,
        observed_total,
        threshold,
        threshold_base,
        exact_threshold,
        expected_total,
        effective_group_size: group_size,
        count_shortage,
        count_mismatch,
        count_shortage_warning,
        warnings,
        rule_description: String::new(),
        groups: aggregate(records),
        correct_responses,
    };
    verdict.rule_description = describe_rule(&verdict, rule, requested);

    info!(
        test_type = %test_type,
        pass,
        significant,
        observed_correct,
        observed_total,
        threshold,
        "Verdict built"
    );

    Ok(verdict)
}

fn describe_rule(verdict: &ReportVerdict, rule: &TestTypeRule, requested: i64) -> String {
    let mut text = format!(
        "{} (alpha {:.2}, guess probability {:.3}): ",
        capitalize(verdict.test_type.name()),
        rule.alpha,
        rule.guess_probability,
    );
    match verdict.effective_group_size.checked_mul(GROUP_COUNT) {
        Some(expected) => text.push_str(&format!(
            "{} groups x {} respondents = {} expected responses, {} observed.",
            GROUP_COUNT,
            verdict.effective_group_size,
            expected,
            verdict.observed_total,
        )),
        None => text.push_str(&format!(
            "{} groups of {} respondents each, expected responses capped at {}, {} observed.",
            GROUP_COUNT,
            verdict.effective_group_size,
            verdict.expected_total,
            verdict.observed_total,
        )),
    }

    if requested != verdict.threshold_base {
        text.push_str(&format!(
            " Sample size {} is outside the published table and was clamped to {}.",
            requested, verdict.threshold_base
        ));
    }

    text.push_str(&format!(
        " Significance threshold for n={}: {} correct from the published table \
         (exact binomial at alpha {:.2}: {}).",
        verdict.threshold_base, verdict.threshold, rule.alpha, verdict.exact_threshold
    ));

    if verdict.observed_total < verdict.threshold {
        text.push_str(&format!(
            " Only {} responses were observed, fewer than the threshold, so the result is treated as not significant.",
            verdict.observed_total
        ));
    } else if verdict.significant {
        text.push_str(&format!(
            " Observed {} correct, which reaches the threshold: the products were distinguished.",
            verdict.observed_correct
        ));
    } else {
        text.push_str(&format!(
            " Observed {} correct, below the threshold: no detectable difference.",
            verdict.observed_correct
        ));
    }

    if verdict.count_shortage {
        text.push_str(" The sample is incomplete.");
    }

    text.push_str(if verdict.pass {
        " Result: PASS."
    } else {
        " Result: FAIL."
    });
    text
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    /// `total` records spread round-robin over the six groups; the first
    /// `correct` of them answer correctly.
    fn session(total: usize, correct: usize) -> Vec<ResponseRecord> {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        (0..total)
            .map(|i| {
                let answer = if i < correct { "417" } else { "233" };
                ResponseRecord::new(
                    format!("r{:03}", i),
                    "s1",
                    GroupLabel::ALL[i % 6],
                    answer,
                    "417",
                    at,
                )
            })
            .collect()
    }

    #[test]
    fn effective_group_size_only_raises() {
        let diff = TestType::Difference.rule();
        assert_eq!(effective_group_size(0, diff), 6);
        assert_eq!(effective_group_size(-3, diff), 6);
        assert_eq!(effective_group_size(4, diff), 6);
        assert_eq!(effective_group_size(9, diff), 9);
        assert_eq!(effective_group_size(0, TestType::Similarity.rule()), 7);
    }

    #[test]
    fn expected_total_is_six_groups() {
        assert_eq!(compute_expected_total(6), 36);
        assert_eq!(compute_expected_total(7), 42);
        assert_eq!(compute_expected_total(0), 0);
        assert_eq!(compute_expected_total(-5), 0);
        assert_eq!(compute_expected_total(i64::MAX), i64::MAX);
    }

    #[test]
    fn full_sample_at_threshold_is_significant_and_fails() {
        let verdict = build_verdict(&session(36, 18), TestType::Difference, 0).unwrap();
        assert_eq!(verdict.expected_total, 36);
        assert!(!verdict.count_shortage);
        assert!(!verdict.count_mismatch);
        assert_eq!(verdict.threshold_base, 36);
        assert_eq!(verdict.threshold, 18);
        assert_eq!(verdict.observed_correct, 18);
        assert!(verdict.significant);
        assert!(!verdict.pass);
        assert!(verdict.warnings.is_empty());
        assert_eq!(verdict.correct_responses.len(), 18);
    }

    #[test]
    fn full_sample_below_threshold_passes() {
        let verdict = build_verdict(&session(36, 17), TestType::Difference, 0).unwrap();
        assert!(!verdict.significant);
        assert!(verdict.pass);
        assert!(verdict.rule_description.ends_with("Result: PASS."));
    }

    #[test]
    fn short_sample_fails_regardless_of_correctness() {
        let verdict = build_verdict(&session(30, 0), TestType::Difference, 0).unwrap();
        assert!(verdict.count_shortage);
        assert!(!verdict.significant);
        assert!(!verdict.pass);
        let message = verdict.count_shortage_warning.as_deref().unwrap();
        assert!(message.contains("Only 30 of 36"));
        assert_eq!(
            verdict.warnings,
            vec![VerdictWarning::InsufficientSample {
                observed: 30,
                expected: 36
            }]
        );
    }

    #[test]
    fn empty_input_is_an_error() {
        let err = build_verdict(&[], TestType::Difference, 0).unwrap_err();
        assert!(matches!(err, ReportError::EmptyInput));
    }

    #[test]
    fn surplus_sample_is_a_mismatch_and_raises_the_base() {
        let verdict = build_verdict(&session(40, 18), TestType::Difference, 0).unwrap();
        assert!(!verdict.count_shortage);
        assert!(verdict.count_mismatch);
        assert_eq!(verdict.threshold_base, 40);
        assert_eq!(verdict.threshold, 19);
        assert!(verdict.pass);
        assert!(matches!(
            verdict.warnings[0],
            VerdictWarning::CountMismatch {
                observed: 40,
                expected: 36
            }
        ));
    }

    #[test]
    fn declared_group_size_above_table_is_clamped() {
        let verdict = build_verdict(&session(80, 10), TestType::Difference, 0).unwrap();
        assert_eq!(verdict.threshold_base, 72);
        assert_eq!(verdict.threshold, 32);
        assert!(verdict.was_clamped());
        assert!(verdict.rule_description.contains("clamped to 72"));
    }

    #[test]
    fn similarity_uses_its_own_rule_and_table() {
        let verdict = build_verdict(&session(42, 17), TestType::Similarity, 0).unwrap();
        assert_eq!(verdict.effective_group_size, 7);
        assert_eq!(verdict.expected_total, 42);
        assert_eq!(verdict.threshold, 17);
        assert!(verdict.significant);
        assert!(!verdict.pass);
        assert!(verdict.rule_description.starts_with("Similarity test (alpha 0.05"));
    }

    #[test]
    fn rule_description_is_reproducible() {
        let records = session(36, 12);
        let a = build_verdict(&records, TestType::Difference, 6).unwrap();
        let b = build_verdict(&records, TestType::Difference, 6).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_json().unwrap(), b.to_json().unwrap());
        assert_eq!(
            a.rule_description,
            "Difference test (alpha 0.10, guess probability 0.333): 6 groups x 6 respondents = 36 expected responses, 36 observed. \
Significance threshold for n=36: 18 correct from the published table \
(exact binomial at alpha 0.10: 17). \
Observed 12 correct, below the threshold: no detectable difference. Result: PASS."
        );
    }

    #[test]
    fn huge_group_size_does_not_claim_overflowed_product() {
        let verdict = build_verdict(&session(42, 0), TestType::Similarity, i64::MAX).unwrap();
        assert_eq!(verdict.expected_total, i64::MAX);
        assert!(verdict.count_shortage);
        assert!(!verdict
            .rule_description
            .contains(&format!("= {} expected", i64::MAX)));
        assert!(verdict
            .rule_description
            .contains(&format!("expected responses capped at {}", i64::MAX)));
    }

    #[test]
    fn exact_reference_is_labelled_with_its_alpha() {
        let verdict = build_verdict(&session(36, 0), TestType::Difference, 0).unwrap();
        assert_eq!(verdict.threshold, 18);
        assert_eq!(verdict.exact_threshold, 17);
        assert!(verdict
            .rule_description
            .contains("18 correct from the published table (exact binomial at alpha 0.10: 17)"));
    }

    #[test]
    fn correct_responses_keep_submitter_and_feedback() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let records = vec![
            ResponseRecord::new("r1", "s1", GroupLabel::A1, "417", "417", at)
                .with_submitter("panelist 4")
                .with_feedback("slightly sweeter"),
            ResponseRecord::new("r2", "s1", GroupLabel::A2, "233", "417", at),
        ];
        let verdict = build_verdict(&records, TestType::Difference, 0).unwrap();
        assert_eq!(verdict.correct_responses.len(), 1);
        let hit = &verdict.correct_responses[0];
        assert_eq!(hit.record_id.as_str(), "r1");
        assert_eq!(hit.submitter.as_deref(), Some("panelist 4"));
        assert_eq!(hit.feedback.as_deref(), Some("slightly sweeter"));
    }
}
