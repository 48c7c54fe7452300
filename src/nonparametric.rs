//! Distribution-free two-sample tests.
//!
//! - [`ks_two_sample`]: Kolmogorov–Smirnov test on empirical CDFs.
//! - [`wilcoxon_rank_sum`]: rank sum of the first sample with a
//!   tie-corrected normal approximation.
//! - [`PermutationTest`]: difference of means against a shuffled null.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use tracing::debug;

use crate::distributions::Kolmogorov;
use crate::error::{Result, StatsError};
use crate::quantile::numeric_sort;
use crate::random;
use crate::special;
use crate::stats;

fn require_non_empty(operation: &'static str, data: &[f64]) -> Result<()> {
    crate::error::require_len(operation, data, 1)
}

// ============================================================================
// Kolmogorov–Smirnov
// ============================================================================

/// Result of the two-sample Kolmogorov–Smirnov test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KsResult {
    /// Largest absolute gap between the two empirical CDFs.
    pub d: f64,
    /// `d · √(nm / (n + m))`.
    pub statistic: f64,
    /// `P(K ≥ statistic)` under the asymptotic Kolmogorov distribution.
    pub p_value: f64,
}

/// Two-sample Kolmogorov–Smirnov test, H₀: both samples share one
/// continuous distribution.
///
/// # Algorithm
/// Both samples are sorted; each empirical CDF is evaluated at every
/// pooled point by binary search, and the largest absolute difference is
/// scaled by the effective sample size `√(nm / (n + m))`.
///
/// # Errors
/// [`StatsError::InsufficientData`] if either sample is empty.
///
/// # Examples
/// ```
/// use u_statcore::nonparametric::ks_two_sample;
/// let r = ks_two_sample(&[1.0, 2.0, 3.0, 4.0, 5.0], &[6.0, 7.0, 8.0, 9.0, 10.0]).unwrap();
/// assert_eq!(r.d, 1.0);
/// assert!(r.p_value < 0.05);
/// ```
pub fn ks_two_sample(x: &[f64], y: &[f64]) -> Result<KsResult> {
    require_non_empty("Kolmogorov-Smirnov test", x)?;
    require_non_empty("Kolmogorov-Smirnov test", y)?;
    let xs = numeric_sort(x);
    let ys = numeric_sort(y);
    let (n, m) = (xs.len() as f64, ys.len() as f64);

    let ecdf = |sorted: &[f64], v: f64| sorted.partition_point(|&s| s <= v) as f64;
    let d = xs
        .iter()
        .chain(&ys)
        .map(|&v| (ecdf(&xs, v) / n - ecdf(&ys, v) / m).abs())
        .fold(0.0_f64, f64::max);

    let statistic = d * (n * m / (n + m)).sqrt();
    Ok(KsResult {
        d,
        statistic,
        p_value: Kolmogorov.sf(statistic),
    })
}

// ============================================================================
// Wilcoxon rank sum
// ============================================================================

/// Result of the Wilcoxon rank-sum test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankSumResult {
    /// Sum of the pooled, tie-averaged, 1-based ranks of the first sample.
    pub rank_sum: f64,
    /// Expected rank sum under H₀, `n₁(N + 1)/2`.
    pub expected: f64,
    /// Normal-approximation z score (no continuity correction).
    pub z: f64,
    /// Two-tailed p-value of `z`.
    pub p_value: f64,
}

/// Wilcoxon rank-sum (Mann–Whitney) test.
///
/// # Algorithm
/// 1. Pool both samples and rank them, giving tied values the mean of the
///    ranks they span.
/// 2. `W` = sum of the ranks belonging to `x`.
/// 3. `z = (W − n₁(N+1)/2) / σ` with the tie-corrected variance
///    `σ² = n₁n₂/12 · ((N + 1) − Σ(t³ − t) / (N(N − 1)))`.
///
/// When every pooled value is tied, `σ = 0` and `z`, `p_value` are NaN.
///
/// # Errors
/// [`StatsError::InsufficientData`] if either sample is empty.
///
/// # Examples
/// ```
/// use u_statcore::nonparametric::wilcoxon_rank_sum;
/// let r = wilcoxon_rank_sum(&[1.0, 2.0, 2.0, 3.0], &[2.0, 3.0, 4.0]).unwrap();
/// assert_eq!(r.rank_sum, 12.5);
/// ```
pub fn wilcoxon_rank_sum(x: &[f64], y: &[f64]) -> Result<RankSumResult> {
    require_non_empty("Wilcoxon rank-sum test", x)?;
    require_non_empty("Wilcoxon rank-sum test", y)?;
    let pooled: Vec<f64> = x.iter().chain(y).copied().collect();
    let ranks = stats::ranks(&pooled);
    let rank_sum = stats::sum(&ranks[..x.len()]);

    let (n1, n2) = (x.len() as f64, y.len() as f64);
    let total = n1 + n2;
    let expected = n1 * (total + 1.0) / 2.0;

    let sorted = numeric_sort(&pooled);
    let mut tie_term = 0.0;
    for run in sorted.chunk_by(|a, b| a == b) {
        let t = run.len() as f64;
        tie_term += t * t * t - t;
    }
    let correction = if total > 1.0 {
        tie_term / (total * (total - 1.0))
    } else {
        0.0
    };
    let sigma = (n1 * n2 / 12.0 * ((total + 1.0) - correction)).sqrt();
    let z = (rank_sum - expected) / sigma;
    let p_value = special::erfc(z.abs() / std::f64::consts::SQRT_2).clamp(0.0, 1.0);

    Ok(RankSumResult {
        rank_sum,
        expected,
        z,
        p_value,
    })
}

// ============================================================================
// Permutation test
// ============================================================================

/// Direction of the alternative hypothesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alternative {
    /// `mean(x) ≠ mean(y)`
    #[default]
    TwoSided,
    /// `mean(x) > mean(y)`
    Greater,
    /// `mean(x) < mean(y)`
    Less,
}

impl FromStr for Alternative {
    type Err = StatsError;

    /// Accepts `"two-sided"` (or `"two_side"`), `"greater"` and `"less"`.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "two-sided" | "two_side" => Ok(Self::TwoSided),
            "greater" => Ok(Self::Greater),
            "less" => Ok(Self::Less),
            other => Err(StatsError::UnknownAlternative(other.to_string())),
        }
    }
}

impl fmt::Display for Alternative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::TwoSided => "two-sided",
            Self::Greater => "greater",
            Self::Less => "less",
        })
    }
}

impl Alternative {
    /// Whether a permuted statistic is at least as extreme as `observed`.
    fn is_extreme(self, permuted: f64, observed: f64) -> bool {
        match self {
            Self::TwoSided => permuted.abs() >= observed.abs(),
            Self::Greater => permuted >= observed,
            Self::Less => permuted <= observed,
        }
    }
}

/// Configuration of a two-sample permutation test on the difference of
/// means.
///
/// # Examples
/// ```
/// use u_statcore::nonparametric::{Alternative, PermutationTest};
/// use u_statcore::random::create_rng;
///
/// let test = PermutationTest::default()
///     .with_iterations(2_000)
///     .with_alternative(Alternative::Greater);
/// let mut rng = create_rng(42);
/// let r = test
///     .run_with_rng(&[10.0, 11.0, 12.0, 13.0], &[1.0, 2.0, 3.0, 4.0], &mut rng)
///     .unwrap();
/// assert!(r.p_value < 0.1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermutationTest {
    /// Number of shuffles forming the null distribution.
    pub iterations: usize,
    pub alternative: Alternative,
}

impl Default for PermutationTest {
    fn default() -> Self {
        Self {
            iterations: 10_000,
            alternative: Alternative::TwoSided,
        }
    }
}

/// Outcome of a [`PermutationTest`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PermutationResult {
    /// `mean(x) − mean(y)` on the unshuffled samples.
    pub observed: f64,
    /// Fraction of permuted statistics at least as extreme as `observed`.
    pub p_value: f64,
    pub iterations: usize,
}

impl PermutationTest {
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_alternative(mut self, alternative: Alternative) -> Self {
        self.alternative = alternative;
        self
    }

    /// Runs the test with the thread-local generator.
    pub fn run(&self, x: &[f64], y: &[f64]) -> Result<PermutationResult> {
        self.run_with_rng(x, y, &mut rand::rng())
    }

    /// Runs the test drawing shuffles from `rng`.
    ///
    /// # Algorithm
    /// Each iteration shuffles the pooled data, splits it at `⌊N/2⌋` and
    /// records the difference of the two halves' means.
    ///
    /// # Errors
    /// - [`StatsError::InsufficientData`] if either sample is empty.
    /// - [`StatsError::InvalidCount`] if `iterations == 0`.
    pub fn run_with_rng<R: Rng + ?Sized>(
        &self,
        x: &[f64],
        y: &[f64],
        rng: &mut R,
    ) -> Result<PermutationResult> {
        require_non_empty("permutation test", x)?;
        require_non_empty("permutation test", y)?;
        if self.iterations == 0 {
            return Err(StatsError::InvalidCount {
                name: "iterations",
                value: 0,
            });
        }

        let observed = stats::mean(x)? - stats::mean(y)?;
        let mut pooled: Vec<f64> = x.iter().chain(y).copied().collect();
        let midpoint = pooled.len() / 2;

        let mut extreme = 0_usize;
        for _ in 0..self.iterations {
            random::shuffle(&mut pooled, rng);
            let (left, right) = pooled.split_at(midpoint);
            let permuted = stats::mean(left)? - stats::mean(right)?;
            if self.alternative.is_extreme(permuted, observed) {
                extreme += 1;
            }
        }

        let p_value = extreme as f64 / self.iterations as f64;
        debug!(
            observed,
            p_value,
            iterations = self.iterations,
            alternative = %self.alternative,
            "permutation test finished"
        );
        Ok(PermutationResult {
            observed,
            p_value,
            iterations: self.iterations,
        })
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn rank_sums_partition_total(
            x in proptest::collection::vec(-50.0_f64..50.0, 1..25),
            y in proptest::collection::vec(-50.0_f64..50.0, 1..25),
        ) {
            let n = (x.len() + y.len()) as f64;
            let a = wilcoxon_rank_sum(&x, &y).unwrap().rank_sum;
            let b = wilcoxon_rank_sum(&y, &x).unwrap().rank_sum;
            prop_assert!((a + b - n * (n + 1.0) / 2.0).abs() < 1e-9);
        }

        #[test]
        fn ks_statistic_bounds(
            x in proptest::collection::vec(-50.0_f64..50.0, 1..25),
            y in proptest::collection::vec(-50.0_f64..50.0, 1..25),
        ) {
            let r = ks_two_sample(&x, &y).unwrap();
            prop_assert!((0.0..=1.0).contains(&r.d));
            prop_assert!((0.0..=1.0).contains(&r.p_value));
        }
    }
}
