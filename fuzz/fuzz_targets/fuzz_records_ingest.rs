//! Fuzz target for exported record ingest.
//!
//! Parses arbitrary bytes as a records export, runs ingest, and builds a
//! verdict from whatever survives. Nothing along the way may panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use tt_core::ingest::{ingest, parse_records, IngestOptions};
use tt_math::TestType;

fuzz_target!(|data: &str| {
    let Ok(raw) = parse_records(data) else {
        return;
    };
    let Ok(outcome) = ingest(raw, &IngestOptions::default()) else {
        return;
    };
    for test_type in [TestType::Difference, TestType::Similarity] {
        if let Ok(verdict) = tt_report::build_verdict(&outcome.records, test_type, 0) {
            assert_eq!(verdict.pass, !verdict.count_shortage && !verdict.significant);
            assert_eq!(verdict.observed_total as usize, outcome.records.len());
        }
    }
});
