//! Fuzz target for the significance calculator.
//!
//! Arbitrary sample sizes, counts and probabilities must yield sentinel
//! values rather than panics, and table thresholds must stay in range.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use tt_math::{
    binomial_tail_probability, clamp_sample_size, significance_threshold,
    threshold_for_test_type, TestType,
};

#[derive(Debug, Arbitrary)]
struct Input {
    n: i16,
    k: i16,
    alpha: f64,
    p: f64,
    similarity: bool,
    sample_size: i64,
}

fuzz_target!(|input: Input| {
    let n = i64::from(input.n);
    let k = i64::from(input.k);

    let tail = binomial_tail_probability(n, k, input.p);
    if input.p.is_finite() && (0.0..=1.0).contains(&input.p) && n >= 0 {
        assert!(tail.is_nan() || (-1e-9..=1.0 + 1e-9).contains(&tail));
    }

    let threshold = significance_threshold(n, input.alpha, input.p);
    if n <= 0 {
        assert_eq!(threshold, 0);
    } else {
        assert!((0..=n + 1).contains(&threshold));
    }

    let test_type = if input.similarity {
        TestType::Similarity
    } else {
        TestType::Difference
    };
    let table = test_type.table();
    let clamped = clamp_sample_size(
        input.sample_size,
        table.min_sample_size,
        table.max_sample_size,
    );
    assert!((table.min_sample_size..=table.max_sample_size).contains(&clamped));
    let t = threshold_for_test_type(test_type, input.sample_size);
    assert!(t >= table.threshold(table.min_sample_size));
    assert!(t <= table.threshold(table.max_sample_size));
});
