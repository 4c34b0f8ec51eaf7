//! Test-type rules.
//!
//! A triangle test is run either to show that two products differ (difference
//! test) or that they are interchangeable (similarity test). Each regime fixes
//! its own significance level, guess probability, minimum group size and
//! sample-size table.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::binomial::significance_threshold;
use super::tables::{SampleSizeTable, DIFFERENCE_TABLE, SIMILARITY_TABLE};

/// Number of replicate serving arrangements per session (three "A", three "B").
pub const GROUP_COUNT: i64 = 6;

/// Statistical regime selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestType {
    /// "similarity test": products are shown to be interchangeable.
    Similarity,
    /// "difference test": products are shown to be distinguishable.
    #[default]
    Difference,
}

impl TestType {
    pub const SIMILARITY_NAME: &'static str = "similarity test";
    pub const DIFFERENCE_NAME: &'static str = "difference test";

    /// Resolve a selector string.
    ///
    /// Matching is exact and case-sensitive against the canonical names;
    /// anything else resolves to the default (difference test).
    pub fn from_selector(selector: &str) -> Self {
        match selector {
            Self::SIMILARITY_NAME => TestType::Similarity,
            Self::DIFFERENCE_NAME => TestType::Difference,
            _ => TestType::default(),
        }
    }

    /// Whether `selector` names a test type exactly.
    pub fn is_canonical(selector: &str) -> bool {
        selector == Self::SIMILARITY_NAME || selector == Self::DIFFERENCE_NAME
    }

    /// Canonical selector name.
    pub fn name(&self) -> &'static str {
        match self {
            TestType::Similarity => Self::SIMILARITY_NAME,
            TestType::Difference => Self::DIFFERENCE_NAME,
        }
    }

    pub fn rule(&self) -> &'static TestTypeRule {
        match self {
            TestType::Similarity => &SIMILARITY_RULE,
            TestType::Difference => &DIFFERENCE_RULE,
        }
    }

    pub fn table(&self) -> &'static SampleSizeTable {
        match self {
            TestType::Similarity => &SIMILARITY_TABLE,
            TestType::Difference => &DIFFERENCE_TABLE,
        }
    }
}

impl fmt::Display for TestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parameters of one statistical regime.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TestTypeRule {
    pub test_type: TestType,
    /// Respondents per group the standard assumes.
    pub min_group_size: i64,
    /// Significance level.
    pub alpha: f64,
    /// Chance of a correct answer under pure guessing.
    pub guess_probability: f64,
}

pub static SIMILARITY_RULE: TestTypeRule = TestTypeRule {
    test_type: TestType::Similarity,
    min_group_size: 7,
    alpha: 0.05,
    guess_probability: 0.2,
};

pub static DIFFERENCE_RULE: TestTypeRule = TestTypeRule {
    test_type: TestType::Difference,
    min_group_size: 6,
    alpha: 0.10,
    guess_probability: 1.0 / 3.0,
};

impl TestTypeRule {
    /// Rule for a selector string, falling back to the default rule.
    pub fn from_selector(selector: &str) -> &'static TestTypeRule {
        TestType::from_selector(selector).rule()
    }

    /// Total sample size the standard assumes at the minimum group size.
    pub fn min_total(&self) -> i64 {
        self.min_group_size * GROUP_COUNT
    }

    /// Exact binomial threshold for `n` trials under this rule's
    /// `alpha` and guess probability.
    pub fn exact_threshold(&self, n: i64) -> i64 {
        significance_threshold(n, self.alpha, self.guess_probability)
    }
}
