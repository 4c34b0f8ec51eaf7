//! Triangle Test Core Library
//!
//! This library provides the application layer around the verdict engine:
//! - Exit codes for CLI operations
//! - Structured logging setup
//! - Record ingest (session selection, time filter, dedupe)
//! - Randomized test-sheet planning
//!
//! The binary entry point is in `main.rs`.

pub mod exit_codes;
pub mod ingest;
pub mod logging;
pub mod sheet;
