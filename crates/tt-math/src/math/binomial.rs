//! Binomial model of a guessing panel.
//!
//! Under the null hypothesis every respondent guesses, so the number of
//! correct answers out of `n` is `Binomial(n, p)` where `p` is the chance of
//! picking the odd sample by luck. The significance threshold is the smallest
//! correct count whose upper tail probability is at or below `alpha`.
//!
//! Counts are signed so that degenerate input (negative `k`, `n <= 0`) maps to
//! well-defined sentinels instead of panics.

use super::stable::{log_add_exp, log_binomial};

/// Probability of exactly `k` correct answers out of `n` trials.
///
/// `C(n,k) * p^k * (1-p)^(n-k)`, computed in log space so `n` in the hundreds
/// stays finite.
///
/// Edge cases:
/// - `k < 0` or `k > n` returns 0
/// - `p <= 0` returns 1 iff `k == 0`
/// - `p >= 1` returns 1 iff `k == n`
/// - NaN `p` propagates
pub fn binomial_point_probability(n: i64, k: i64, p: f64) -> f64 {
    if p.is_nan() {
        return f64::NAN;
    }
    if k < 0 || k > n {
        return 0.0;
    }
    if p <= 0.0 {
        return if k == 0 { 1.0 } else { 0.0 };
    }
    if p >= 1.0 {
        return if k == n { 1.0 } else { 0.0 };
    }
    log_point_probability(n as u64, k as u64, p).exp()
}

/// Probability of at least `k` correct answers out of `n` trials.
///
/// `k <= 0` covers the whole support and returns 1; `k > n` returns 0.
pub fn binomial_tail_probability(n: i64, k: i64, p: f64) -> f64 {
    if p.is_nan() {
        return f64::NAN;
    }
    if n < 0 || k > n {
        return 0.0;
    }
    if k <= 0 {
        return 1.0;
    }
    if p <= 0.0 || p >= 1.0 {
        return (k..=n).map(|i| binomial_point_probability(n, i, p)).sum();
    }
    let log_tail = (k..=n)
        .map(|i| log_point_probability(n as u64, i as u64, p))
        .fold(f64::NEG_INFINITY, log_add_exp);
    log_tail.exp().min(1.0)
}

/// Smallest `k` such that `P(X >= k) <= alpha` for `X ~ Binomial(n, p)`.
///
/// Returns `n + 1` when not even a unanimous panel would be significant, and
/// 0 for `n <= 0`.
///
/// The tail is accumulated downward from `k = n`, which keeps the scan linear
/// in `n` and stops as soon as the tail mass exceeds `alpha`.
pub fn significance_threshold(n: i64, alpha: f64, p: f64) -> i64 {
    if n <= 0 {
        return 0;
    }
    if alpha.is_nan() || alpha < 0.0 || p.is_nan() {
        return n + 1;
    }
    if p <= 0.0 || p >= 1.0 {
        return (0..=n)
            .find(|&k| binomial_tail_probability(n, k, p) <= alpha)
            .unwrap_or(n + 1);
    }

    let log_alpha = alpha.ln();
    let mut log_tail = f64::NEG_INFINITY;
    let mut threshold = n + 1;
    for k in (0..=n).rev() {
        log_tail = log_add_exp(log_tail, log_point_probability(n as u64, k as u64, p));
        if log_tail > log_alpha {
            break;
        }
        threshold = k;
    }
    threshold
}

/// Clip `n` into `[min_n, max_n]`.
///
/// Unlike `Ord::clamp` this never panics; an inverted range resolves to
/// `min_n`.
pub fn clamp_sample_size(n: i64, min_n: i64, max_n: i64) -> i64 {
    if n <= min_n {
        min_n
    } else if n >= max_n {
        max_n
    } else {
        n
    }
}

fn log_point_probability(n: u64, k: u64, p: f64) -> f64 {
    log_binomial(n, k) + k as f64 * p.ln() + (n - k) as f64 * (-p).ln_1p()
}
