//! Fuzz target for protocol.json parsing.
//!
//! Tests that protocol configuration parsing and validation handle
//! arbitrary input without panicking.

#![no_main]

use libfuzzer_sys::fuzz_target;
use tt_common::ProtocolConfig;

fuzz_target!(|data: &[u8]| {
    if let Ok(config) = serde_json::from_slice::<ProtocolConfig>(data) {
        let _ = config.validate();
        let _ = config.resolved_test_type();
    }
});
