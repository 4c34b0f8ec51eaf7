//! Per-group aggregation of response records.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;
use tt_common::{GroupLabel, ResponseRecord};

/// How many respondents picked one answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerCount {
    pub answer: String,
    pub count: usize,
}

/// Totals for one group label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupStats {
    pub group: GroupLabel,
    pub total: usize,
    pub correct: usize,
    /// Answer frequencies, most frequent first; ties keep first-seen order.
    pub histogram: Vec<AnswerCount>,
}

impl GroupStats {
    fn empty(group: GroupLabel) -> Self {
        GroupStats {
            group,
            total: 0,
            correct: 0,
            histogram: Vec::new(),
        }
    }

    /// Share of correct answers, or None for an empty group.
    pub fn correct_ratio(&self) -> Option<f64> {
        if self.total == 0 {
            None
        } else {
            Some(self.correct as f64 / self.total as f64)
        }
    }
}

/// Partition records into the six groups, in label order.
///
/// Every label is present in the output, empty groups included.
pub fn aggregate(records: &[ResponseRecord]) -> Vec<GroupStats> {
    let mut stats: Vec<GroupStats> = GroupLabel::ALL
        .iter()
        .map(|&g| GroupStats::empty(g))
        .collect();
    let mut positions: Vec<HashMap<&str, usize>> = vec![HashMap::new(); GroupLabel::ALL.len()];

    for record in records {
        let idx = record.group.index();
        let group = &mut stats[idx];
        group.total += 1;
        if record.is_correct() {
            group.correct += 1;
        }

        let answer = record.submitted_answer.as_str();
        match positions[idx].get(answer) {
            Some(&pos) => group.histogram[pos].count += 1,
            None => {
                positions[idx].insert(answer, group.histogram.len());
                group.histogram.push(AnswerCount {
                    answer: answer.to_string(),
                    count: 1,
                });
            }
        }
    }

    // Stable sort keeps first-seen order among equal counts.
    for group in &mut stats {
        group.histogram.sort_by(|a, b| b.count.cmp(&a.count));
    }

    debug!(
        records = records.len(),
        groups_with_data = stats.iter().filter(|g| g.total > 0).count(),
        "Aggregated responses by group"
    );

    stats
}
