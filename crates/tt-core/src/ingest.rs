//! Record ingest.
//!
//! Turns an exported JSON array of raw response rows into the normalized
//! records of a single session: strings trimmed, group labels parsed,
//! one session selected, an optional time cutoff applied, duplicates
//! collapsed to their latest submission, and the result ordered by
//! submission time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};
use tt_common::{Error, GroupLabel, ResponseRecord, Result, TestSessionId};

/// A response row as exported by the host platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub record_id: String,
    pub session_id: String,
    pub group: String,
    pub submitted_answer: String,
    pub correct_answer: String,
    pub submitted_at: DateTime<Utc>,
    #[serde(default)]
    pub submitter: Option<String>,
    #[serde(default)]
    pub feedback: Option<String>,
}

/// Selection applied during ingest.
#[derive(Debug, Clone, Default)]
pub struct IngestOptions {
    /// Session to keep; the most recently active session when unset.
    pub session: Option<TestSessionId>,
    /// Drop records submitted before this instant.
    pub since: Option<DateTime<Utc>>,
}

/// Records of the selected session plus ingest accounting.
#[derive(Debug, Clone, Serialize)]
pub struct IngestOutcome {
    pub session_id: TestSessionId,
    pub records: Vec<ResponseRecord>,
    /// Distinct sessions present in the input.
    pub sessions_seen: usize,
    pub skipped_unknown_group: usize,
    pub filtered_by_time: usize,
    pub duplicates_dropped: usize,
}

/// Parse an exported JSON array.
pub fn parse_records(json: &str) -> Result<Vec<RawRecord>> {
    Ok(serde_json::from_str(json)?)
}

fn trimmed_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl RawRecord {
    /// Normalize into a classified record.
    ///
    /// Blank identifiers are an [`Error::InvalidRecord`]; an unrecognized group
    /// label is an [`Error::UnknownGroup`].
    pub fn normalize(self) -> Result<ResponseRecord> {
        let record_id = self.record_id.trim();
        if record_id.is_empty() {
            return Err(Error::InvalidRecord("record_id is blank".to_string()));
        }
        let session_id = TestSessionId::parse(&self.session_id).ok_or_else(|| {
            Error::InvalidRecord(format!("record {} has a blank session_id", record_id))
        })?;
        let group: GroupLabel = self.group.parse()?;

        let mut record = ResponseRecord::new(
            record_id,
            session_id,
            group,
            self.submitted_answer.trim(),
            self.correct_answer.trim(),
            self.submitted_at,
        );
        record.submitter = trimmed_optional(self.submitter);
        record.feedback = trimmed_optional(self.feedback);
        Ok(record)
    }
}

/// Normalize raw rows and reduce them to one session.
pub fn ingest(raw: Vec<RawRecord>, options: &IngestOptions) -> Result<IngestOutcome> {
    let total = raw.len();
    let mut skipped_unknown_group = 0;
    let mut by_session: BTreeMap<TestSessionId, Vec<ResponseRecord>> = BTreeMap::new();

    for row in raw {
        match row.normalize() {
            Ok(record) => by_session
                .entry(record.session_id.clone())
                .or_default()
                .push(record),
            Err(Error::UnknownGroup(label)) => {
                warn!(group = %label, "Skipping record with unknown group label");
                skipped_unknown_group += 1;
            }
            Err(e) => return Err(e),
        }
    }

    let sessions_seen = by_session.len();
    let session_id = match &options.session {
        Some(id) => id.clone(),
        None => most_recent_session(&by_session).ok_or_else(|| Error::EmptyInput {
            session: "(any)".to_string(),
        })?,
    };
    let selected = by_session.remove(&session_id).unwrap_or_default();

    let before_filter = selected.len();
    let in_window: Vec<ResponseRecord> = match options.since {
        Some(cutoff) => selected
            .into_iter()
            .filter(|r| r.submitted_at >= cutoff)
            .collect(),
        None => selected,
    };
    let filtered_by_time = before_filter - in_window.len();

    let before_dedupe = in_window.len();
    let mut records = dedupe_latest(in_window);
    let duplicates_dropped = before_dedupe - records.len();

    records.sort_by(|a, b| {
        a.submitted_at
            .cmp(&b.submitted_at)
            .then_with(|| a.record_id.cmp(&b.record_id))
    });

    debug!(
        total,
        sessions_seen,
        skipped_unknown_group,
        filtered_by_time,
        duplicates_dropped,
        "Ingest accounting"
    );
    info!(session = %session_id, records = records.len(), "Selected session");

    Ok(IngestOutcome {
        session_id,
        records,
        sessions_seen,
        skipped_unknown_group,
        filtered_by_time,
        duplicates_dropped,
    })
}

/// Session with the latest submission; ties go to the greatest id.
fn most_recent_session(
    by_session: &BTreeMap<TestSessionId, Vec<ResponseRecord>>,
) -> Option<TestSessionId> {
    by_session
        .iter()
        .filter_map(|(id, records)| {
            records
                .iter()
                .map(|r| r.submitted_at)
                .max()
                .map(|latest| (latest, id))
        })
        .max()
        .map(|(_, id)| id.clone())
}

/// Keep one record per id: the latest submission, later input winning ties.
fn dedupe_latest(records: Vec<ResponseRecord>) -> Vec<ResponseRecord> {
    let mut latest: BTreeMap<tt_common::RecordId, ResponseRecord> = BTreeMap::new();
    for record in records {
        match latest.entry(record.record_id.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(record);
            }
            Entry::Occupied(mut slot) => {
                if record.submitted_at >= slot.get().submitted_at {
                    slot.insert(record);
                }
            }
        }
    }
    latest.into_values().collect()
}
