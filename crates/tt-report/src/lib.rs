//! Report builder for triangle test sessions.
//!
//! Turns a session's classified response records into a pass/fail verdict:
//! per-group aggregation, expected-versus-observed sample accounting, the
//! significance threshold for the active test type, and a reproducible rule
//! description for audit.
//!
//! # Sections
//!
//! - Summary: verdict, observed and expected counts, threshold
//! - Warnings: sample shortage, count mismatch, table clamping
//! - Rule: the natural-language rule description
//! - Groups: per-group totals, correct counts and answer histograms
//! - Correct responses: who answered correctly, with their feedback
//!
//! # Example
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use tt_common::{GroupLabel, ResponseRecord};
//! use tt_math::TestType;
//! use tt_report::build_verdict;
//!
//! let at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
//! let records: Vec<ResponseRecord> = (0..36)
//!     .map(|i| {
//!         let group = GroupLabel::ALL[i % 6];
//!         let answer = if i < 10 { "417" } else { "233" };
//!         ResponseRecord::new(format!("r{i}"), "s1", group, answer, "417", at)
//!     })
//!     .collect();
//!
//! let verdict = build_verdict(&records, TestType::Difference, 0).unwrap();
//! assert_eq!(verdict.threshold, 18);
//! assert!(verdict.pass);
//! ```

pub mod aggregate;
pub mod config;
pub mod error;
pub mod generator;
pub mod markdown;
pub mod verdict;

pub use aggregate::{aggregate, AnswerCount, GroupStats};
pub use config::{ReportConfig, ReportSections};
pub use error::{ReportError, Result};
pub use generator::{ReportData, ReportGenerator};
pub use markdown::MarkdownRenderer;
pub use verdict::{
    build_verdict, compute_expected_total, effective_group_size, CorrectResponse, ReportVerdict,
    VerdictWarning,
};
