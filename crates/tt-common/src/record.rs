//! Group labels and classified response records.
//!
//! A session runs six replicate serving arrangements. The three "A" groups
//! serve product A twice and product B once; the three "B" groups the reverse.
//! Within a triad the position of the odd sample rotates, so every group label
//! fixes one serving order:
//!
//! | Group | Order | Odd position |
//! |-------|-------|--------------|
//! | A1    | AAB   | 3            |
//! | A2    | ABA   | 2            |
//! | A3    | BAA   | 1            |
//! | B1    | ABB   | 1            |
//! | B2    | BAB   | 2            |
//! | B3    | BBA   | 3            |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::id::{RecordId, TestSessionId};

/// One of the two products under comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Product {
    A,
    B,
}

impl Product {
    pub fn other(self) -> Self {
        match self {
            Product::A => Product::B,
            Product::B => Product::A,
        }
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Product::A => f.write_str("A"),
            Product::B => f.write_str("B"),
        }
    }
}

/// The two disjoint triads of group labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Triad {
    A,
    B,
}

/// Fixed six-way group partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GroupLabel {
    A1,
    A2,
    A3,
    B1,
    B2,
    B3,
}

impl GroupLabel {
    /// All labels in report order.
    pub const ALL: [GroupLabel; 6] = [
        GroupLabel::A1,
        GroupLabel::A2,
        GroupLabel::A3,
        GroupLabel::B1,
        GroupLabel::B2,
        GroupLabel::B3,
    ];

    /// Position in [`GroupLabel::ALL`].
    pub fn index(self) -> usize {
        match self {
            GroupLabel::A1 => 0,
            GroupLabel::A2 => 1,
            GroupLabel::A3 => 2,
            GroupLabel::B1 => 3,
            GroupLabel::B2 => 4,
            GroupLabel::B3 => 5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GroupLabel::A1 => "A1",
            GroupLabel::A2 => "A2",
            GroupLabel::A3 => "A3",
            GroupLabel::B1 => "B1",
            GroupLabel::B2 => "B2",
            GroupLabel::B3 => "B3",
        }
    }

    pub fn triad(self) -> Triad {
        match self {
            GroupLabel::A1 | GroupLabel::A2 | GroupLabel::A3 => Triad::A,
            GroupLabel::B1 | GroupLabel::B2 | GroupLabel::B3 => Triad::B,
        }
    }

    /// Zero-based position of the odd sample in the serving order.
    pub fn odd_position(self) -> usize {
        match self {
            GroupLabel::A3 | GroupLabel::B1 => 0,
            GroupLabel::A2 | GroupLabel::B2 => 1,
            GroupLabel::A1 | GroupLabel::B3 => 2,
        }
    }

    /// Serving order of the three samples.
    pub fn serving_order(self) -> [Product; 3] {
        let doubled = match self.triad() {
            Triad::A => Product::A,
            Triad::B => Product::B,
        };
        let mut order = [doubled; 3];
        order[self.odd_position()] = doubled.other();
        order
    }
}

impl fmt::Display for GroupLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroupLabel {
    type Err = Error;

    /// Labels are matched after trimming, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase();
        GroupLabel::ALL
            .into_iter()
            .find(|label| label.as_str() == normalized)
            .ok_or_else(|| Error::UnknownGroup(s.to_string()))
    }
}

/// One respondent's answer for one group within one test session.
///
/// Immutable once constructed. Answers are normalized strings; correctness is
/// an exact comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub record_id: RecordId,
    pub session_id: TestSessionId,
    pub group: GroupLabel,
    pub submitted_answer: String,
    pub correct_answer: String,
    pub submitted_at: DateTime<Utc>,
    /// Who submitted, as recorded by the host platform.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitter: Option<String>,
    /// Free-text feedback attached to the response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

impl ResponseRecord {
    pub fn new(
        record_id: impl Into<RecordId>,
        session_id: impl Into<TestSessionId>,
        group: GroupLabel,
        submitted_answer: impl Into<String>,
        correct_answer: impl Into<String>,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        ResponseRecord {
            record_id: record_id.into(),
            session_id: session_id.into(),
            group,
            submitted_answer: submitted_answer.into(),
            correct_answer: correct_answer.into(),
            submitted_at,
            submitter: None,
            feedback: None,
        }
    }

    pub fn with_submitter(mut self, submitter: impl Into<String>) -> Self {
        self.submitter = Some(submitter.into());
        self
    }

    pub fn with_feedback(mut self, feedback: impl Into<String>) -> Self {
        self.feedback = Some(feedback.into());
        self
    }

    pub fn is_correct(&self) -> bool {
        self.submitted_answer == self.correct_answer
    }
}
