//! Published triangle-test sample-size tables.
//!
//! Each table maps a total sample size (respondents across all six groups) to
//! a correct-answer count. The difference table lists the minimum count that
//! declares a detectable difference; the similarity table lists the maximum
//! count still consistent with "no detectable difference". Both are turned
//! into one semantics by [`SampleSizeTable::threshold`]: reaching the
//! threshold signals statistical significance.
//!
//! Sizes outside a table's domain are clamped to the nearest boundary row.

use super::binomial::clamp_sample_size;
use super::test_type::TestType;

/// What a table's values mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    /// Minimum correct count that is significant.
    MinCorrectForSignificance,
    /// Maximum correct count that is not significant.
    MaxCorrectWithoutSignificance,
}

/// Ordered `(total_sample_size, value)` lookup over a bounded domain.
#[derive(Debug, Clone, Copy)]
pub struct SampleSizeTable {
    pub test_type: TestType,
    pub kind: TableKind,
    pub min_sample_size: i64,
    pub max_sample_size: i64,
    /// Value used at or below the domain minimum.
    pub base_value: i64,
    pub rows: &'static [(i64, i64)],
}

impl SampleSizeTable {
    /// Clip a sample size into this table's domain.
    pub fn clamp(&self, sample_size: i64) -> i64 {
        clamp_sample_size(sample_size, self.min_sample_size, self.max_sample_size)
    }

    /// Whether `sample_size` lies outside the tabulated domain.
    pub fn is_out_of_domain(&self, sample_size: i64) -> bool {
        sample_size < self.min_sample_size || sample_size > self.max_sample_size
    }

    /// Tabulated value for an exact sample size.
    pub fn value_at(&self, sample_size: i64) -> Option<i64> {
        self.rows
            .binary_search_by_key(&sample_size, |&(size, _)| size)
            .ok()
            .map(|idx| self.rows[idx].1)
    }

    /// Value tabulated at the top of the domain.
    pub fn max_domain_value(&self) -> i64 {
        self.value_at(self.max_sample_size)
            .or_else(|| self.rows.last().map(|&(_, value)| value))
            .unwrap_or(self.base_value)
    }

    /// Raw table value after clamping, before threshold conversion.
    ///
    /// A clamped size with no row of its own falls back to the top-of-domain
    /// value rather than interpolating.
    pub fn lookup(&self, sample_size: i64) -> i64 {
        let clamped = self.clamp(sample_size);
        if clamped <= self.min_sample_size {
            return self.base_value;
        }
        self.value_at(clamped)
            .unwrap_or_else(|| self.max_domain_value())
    }

    /// Correct-answer count at which the result becomes significant.
    pub fn threshold(&self, sample_size: i64) -> i64 {
        let value = self.lookup(sample_size);
        match self.kind {
            TableKind::MinCorrectForSignificance => value,
            TableKind::MaxCorrectWithoutSignificance => value + 1,
        }
    }
}

/// Significance threshold for a test type at a total sample size.
pub fn threshold_for_test_type(test_type: TestType, sample_size: i64) -> i64 {
    test_type.table().threshold(sample_size)
}

static DIFFERENCE_ROWS: [(i64, i64); 37] = [
    (36, 18),
    (37, 18),
    (38, 19),
    (39, 19),
    (40, 19),
    (41, 20),
    (42, 20),
    (43, 20),
    (44, 21),
    (45, 21),
    (46, 22),
    (47, 22),
    (48, 22),
    (49, 23),
    (50, 23),
    (51, 24),
    (52, 24),
    (53, 24),
    (54, 25),
    (55, 25),
    (56, 26),
    (57, 26),
    (58, 26),
    (59, 27),
    (60, 27),
    (61, 27),
    (62, 28),
    (63, 28),
    (64, 29),
    (65, 29),
    (66, 29),
    (67, 30),
    (68, 30),
    (69, 31),
    (70, 31),
    (71, 31),
    (72, 32),
];

static SIMILARITY_ROWS: [(i64, i64); 43] = [
    (42, 16),
    (43, 17),
    (44, 17),
    (45, 17),
    (46, 18),
    (47, 18),
    (48, 20),
    (49, 20),
    (50, 20),
    (51, 20),
    (52, 21),
    (53, 21),
    (54, 22),
    (55, 22),
    (56, 23),
    (57, 23),
    (58, 24),
    (59, 24),
    (60, 25),
    (61, 25),
    (62, 26),
    (63, 26),
    (64, 27),
    (65, 27),
    (66, 28),
    (67, 28),
    (68, 28),
    (69, 29),
    (70, 29),
    (71, 30),
    (72, 30),
    (73, 31),
    (74, 31),
    (75, 32),
    (76, 32),
    (77, 33),
    (78, 33),
    (79, 34),
    (80, 34),
    (81, 35),
    (82, 35),
    (83, 36),
    (84, 36),
];

/// Difference test: minimum correct answers for a detectable difference.
pub static DIFFERENCE_TABLE: SampleSizeTable = SampleSizeTable {
    test_type: TestType::Difference,
    kind: TableKind::MinCorrectForSignificance,
    min_sample_size: 36,
    max_sample_size: 72,
    base_value: 18,
    rows: &DIFFERENCE_ROWS,
};

/// Similarity test: maximum correct answers with no detectable difference.
pub static SIMILARITY_TABLE: SampleSizeTable = SampleSizeTable {
    test_type: TestType::Similarity,
    kind: TableKind::MaxCorrectWithoutSignificance,
    min_sample_size: 42,
    max_sample_size: 84,
    base_value: 16,
    rows: &SIMILARITY_ROWS,
};
