//! Triangle test significance math.
//!
//! Pure numeric layer: log-space primitives, the binomial tail model of a
//! guessing panel, and the published sample-size tables for the two test types.

pub mod math;

pub use math::binomial::{
    binomial_point_probability, binomial_tail_probability, clamp_sample_size,
    significance_threshold,
};
pub use math::stable::*;
pub use math::tables::{
    threshold_for_test_type, SampleSizeTable, TableKind, DIFFERENCE_TABLE, SIMILARITY_TABLE,
};
pub use math::test_type::{TestType, TestTypeRule, GROUP_COUNT};
