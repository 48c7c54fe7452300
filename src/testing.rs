//! Parametric hypothesis tests, confidence intervals and power analysis.
//!
//! Every procedure returns its own result record; all of them carry the
//! test statistic and, where defined, a two-tailed p-value in `[0, 1]`.
//! Zero-variance samples are not rejected: the statistic becomes `±∞` or
//! `NaN` and the p-value follows (`0` or `NaN`).
//!
//! # Examples
//!
//! ```
//! use u_statcore::testing::one_sample_t_test;
//!
//! let data = [5.1, 4.9, 5.2, 5.0, 4.8, 5.3, 5.1, 4.9];
//! let result = one_sample_t_test(&data, 5.0).unwrap();
//! assert!(result.p_value > 0.05);
//! ```

use std::collections::HashMap;
use std::hash::Hash;

use crate::distributions::{ContinuousDistribution, FisherF, StudentsT};
use crate::error::{require_len, require_same_len, Result, StatsError};
use crate::special;
use crate::stats;

// ============================================================================
// Factor
// ============================================================================

/// Categorical grouping of a sample.
///
/// Levels are numbered in first-seen order, so `codes[i]` is the group of
/// observation `i` and lies in `[0, levels().len())`.
///
/// # Examples
/// ```
/// use u_statcore::testing::Factor;
/// let f = Factor::from_labels(&["b", "a", "b", "c"]);
/// assert_eq!(f.levels(), &["b", "a", "c"]);
/// assert_eq!(f.codes(), &[0, 1, 0, 2]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Factor<L> {
    levels: Vec<L>,
    codes: Vec<usize>,
}

impl<L: Eq + Hash + Clone> Factor<L> {
    /// Builds a factor from one label per observation.
    pub fn from_labels(labels: &[L]) -> Self {
        let mut index: HashMap<L, usize> = HashMap::new();
        let mut levels = Vec::new();
        let codes = labels
            .iter()
            .map(|label| {
                *index.entry(label.clone()).or_insert_with(|| {
                    levels.push(label.clone());
                    levels.len() - 1
                })
            })
            .collect();
        Self { levels, codes }
    }
}

impl<L> Factor<L> {
    /// Distinct labels in first-seen order.
    pub fn levels(&self) -> &[L] {
        &self.levels
    }

    /// Group index of each observation.
    pub fn codes(&self) -> &[usize] {
        &self.codes
    }

    pub fn group_count(&self) -> usize {
        self.levels.len()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Splits `data` into one vector per level, preserving order.
    ///
    /// # Errors
    /// [`StatsError::LengthMismatch`] if `data` and the factor differ in length.
    pub fn split(&self, data: &[f64]) -> Result<Vec<Vec<f64>>> {
        require_same_len(&self.codes, data)?;
        let mut groups = vec![Vec::new(); self.levels.len()];
        for (&code, &value) in self.codes.iter().zip(data) {
            groups[code].push(value);
        }
        Ok(groups)
    }
}

// ============================================================================
// t-tests
// ============================================================================

/// Result of a Student's t test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TTestResult {
    /// The t statistic.
    pub statistic: f64,
    /// Standard error of the estimated mean (or difference of means).
    pub standard_error: f64,
    /// Degrees of freedom (fractional for Welch).
    pub degrees_of_freedom: f64,
    /// Two-tailed p-value.
    pub p_value: f64,
}

fn t_result(statistic: f64, standard_error: f64, degrees_of_freedom: f64) -> Result<TTestResult> {
    let p_value = StudentsT::new(degrees_of_freedom)?.two_tailed_p(statistic);
    Ok(TTestResult {
        statistic,
        standard_error,
        degrees_of_freedom,
        p_value,
    })
}

/// One-sample t test of H₀: μ = `mu0`.
///
/// # Algorithm
/// t = (x̄ − μ₀) / (s / √n), df = n − 1.
///
/// # Errors
/// [`StatsError::InsufficientData`] for fewer than 2 observations.
pub fn one_sample_t_test(data: &[f64], mu0: f64) -> Result<TTestResult> {
    require_len("one-sample t test", data, 2)?;
    let n = data.len() as f64;
    let mean = stats::mean(data)?;
    let sd = stats::sample_standard_deviation(data)?;
    let standard_error = sd / n.sqrt();
    t_result((mean - mu0) / standard_error, standard_error, n - 1.0)
}

/// Two-sample t test with pooled variance, H₀: μₓ − μᵧ = `difference`.
///
/// # Algorithm
/// s²ₚ = ((n−1)s²ₓ + (m−1)s²ᵧ) / (n + m − 2),
/// t = (x̄ − ȳ − δ) / √(s²ₚ (1/n + 1/m)), df = n + m − 2.
///
/// # Errors
/// [`StatsError::InsufficientData`] if either sample has fewer than 2
/// observations.
///
/// # Examples
/// ```
/// use u_statcore::testing::two_sample_t_test;
/// let r = two_sample_t_test(&[1.0, 2.0, 3.0, 4.0], &[3.0, 4.0, 5.0, 6.0], 0.0).unwrap();
/// assert!((r.statistic + 2.19089023).abs() < 1e-6);
/// assert_eq!(r.degrees_of_freedom, 6.0);
/// ```
pub fn two_sample_t_test(x: &[f64], y: &[f64], difference: f64) -> Result<TTestResult> {
    require_len("two-sample t test", x, 2)?;
    require_len("two-sample t test", y, 2)?;
    let (n, m) = (x.len() as f64, y.len() as f64);
    let pooled = ((n - 1.0) * stats::sample_variance(x)? + (m - 1.0) * stats::sample_variance(y)?)
        / (n + m - 2.0);
    let standard_error = (pooled * (1.0 / n + 1.0 / m)).sqrt();
    let statistic = (stats::mean(x)? - stats::mean(y)? - difference) / standard_error;
    t_result(statistic, standard_error, n + m - 2.0)
}

/// Welch's unequal-variance t test, H₀: μₓ = μᵧ.
///
/// Degrees of freedom follow the Welch–Satterthwaite approximation. When
/// both samples are constant that ratio is 0/0, and `n + m − 2` is used
/// instead; the statistic is then `±∞` (p = 0) or `NaN` for equal means.
///
/// Reference: Welch (1947), "The generalization of Student's problem when
/// several different population variances are involved", *Biometrika* 34.
///
/// # Errors
/// [`StatsError::InsufficientData`] if either sample has fewer than 2
/// observations.
pub fn welch_t_test(x: &[f64], y: &[f64]) -> Result<TTestResult> {
    require_len("Welch t test", x, 2)?;
    require_len("Welch t test", y, 2)?;
    let (n, m) = (x.len() as f64, y.len() as f64);
    let vx = stats::sample_variance(x)? / n;
    let vy = stats::sample_variance(y)? / m;
    let standard_error = (vx + vy).sqrt();
    let statistic = (stats::mean(x)? - stats::mean(y)?) / standard_error;
    let df = if vx + vy == 0.0 {
        n + m - 2.0
    } else {
        (vx + vy).powi(2) / (vx * vx / (n - 1.0) + vy * vy / (m - 1.0))
    };
    t_result(statistic, standard_error, df)
}

/// Paired t test on the differences `xᵢ − yᵢ`, H₀: mean difference = 0.
///
/// # Errors
/// - [`StatsError::LengthMismatch`] if the samples differ in length.
/// - [`StatsError::InsufficientData`] for fewer than 2 pairs.
pub fn paired_t_test(x: &[f64], y: &[f64]) -> Result<TTestResult> {
    require_same_len(x, y)?;
    let differences: Vec<f64> = x.iter().zip(y).map(|(a, b)| a - b).collect();
    one_sample_t_test(&differences, 0.0)
}

// ============================================================================
// ANOVA
// ============================================================================

/// Result of a one-way analysis of variance.
#[derive(Debug, Clone, PartialEq)]
pub struct AnovaResult {
    pub ss_between: f64,
    pub ss_within: f64,
    pub df_between: usize,
    pub df_within: usize,
    pub ms_between: f64,
    pub ms_within: f64,
    pub f_statistic: f64,
    /// Upper-tail probability of `f_statistic` under F(df_between, df_within).
    pub p_value: f64,
    /// Mean of each group, in factor level order.
    pub group_means: Vec<f64>,
    pub grand_mean: f64,
}

/// One-way ANOVA of `data` grouped by `factor`, H₀: all group means equal.
///
/// # Algorithm
/// F = (SS_between / (k − 1)) / (SS_within / (N − k)).
///
/// # Errors
/// - [`StatsError::LengthMismatch`] if `factor` and `data` differ in length.
/// - [`StatsError::InsufficientData`] with fewer than 2 groups, or when
///   there are no within-group degrees of freedom (N ≤ k).
///
/// # Examples
/// ```
/// use u_statcore::testing::{one_way_anova, Factor};
/// let data = [5.0, 6.0, 7.0, 8.0, 9.0, 8.5, 4.0, 3.0, 3.5];
/// let groups = Factor::from_labels(&["a", "a", "a", "b", "b", "b", "c", "c", "c"]);
/// let r = one_way_anova(&groups, &data).unwrap();
/// assert_eq!((r.df_between, r.df_within), (2, 6));
/// assert!(r.p_value < 0.01);
/// ```
pub fn one_way_anova<L>(factor: &Factor<L>, data: &[f64]) -> Result<AnovaResult> {
    let groups = factor.split(data)?;
    let k = groups.len();
    if k < 2 {
        return Err(StatsError::InsufficientData {
            operation: "one-way ANOVA (groups)",
            required: 2,
            actual: k,
        });
    }
    let total = data.len();
    if total <= k {
        return Err(StatsError::InsufficientData {
            operation: "one-way ANOVA",
            required: k + 1,
            actual: total,
        });
    }

    let grand_mean = stats::mean(data)?;
    let group_means = groups
        .iter()
        .map(|g| stats::mean(g))
        .collect::<Result<Vec<f64>>>()?;

    let ss_between = stats::sum(
        &groups
            .iter()
            .zip(&group_means)
            .map(|(g, &gm)| g.len() as f64 * (gm - grand_mean).powi(2))
            .collect::<Vec<f64>>(),
    );
    let ss_within = stats::sum(
        &groups
            .iter()
            .zip(&group_means)
            .flat_map(|(g, &gm)| g.iter().map(move |&v| (v - gm).powi(2)))
            .collect::<Vec<f64>>(),
    );

    let df_between = k - 1;
    let df_within = total - k;
    let ms_between = ss_between / df_between as f64;
    let ms_within = ss_within / df_within as f64;
    let f_statistic = ms_between / ms_within;
    let p_value = FisherF::new(df_between as f64, df_within as f64)?.sf(f_statistic);

    Ok(AnovaResult {
        ss_between,
        ss_within,
        df_between,
        df_within,
        ms_between,
        ms_within,
        f_statistic,
        p_value,
        group_means,
        grand_mean,
    })
}

// ============================================================================
// Correlation significance
// ============================================================================

/// Pearson correlation with its significance test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrelationTest {
    /// Sample correlation coefficient.
    pub r: f64,
    /// t = r √(n − 2) / √(1 − r²).
    pub statistic: f64,
    pub degrees_of_freedom: f64,
    /// Two-tailed p-value.
    pub p_value: f64,
}

/// Tests H₀: ρ = 0 for paired samples.
///
/// # Errors
/// - [`StatsError::LengthMismatch`] if the samples differ in length.
/// - [`StatsError::InsufficientData`] for fewer than 3 pairs.
pub fn correlation_test(x: &[f64], y: &[f64]) -> Result<CorrelationTest> {
    require_same_len(x, y)?;
    require_len("correlation test", x, 3)?;
    let r = stats::sample_correlation(x, y)?;
    let df = (x.len() - 2) as f64;
    let statistic = r * df.sqrt() / (1.0 - r * r).sqrt();
    let p_value = StudentsT::new(df)?.two_tailed_p(statistic);
    Ok(CorrelationTest {
        r,
        statistic,
        degrees_of_freedom: df,
        p_value,
    })
}

// ============================================================================
// Confidence intervals, sample size, power
// ============================================================================

/// Two-sided confidence interval `estimate ± margin`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceInterval {
    pub estimate: f64,
    pub lower: f64,
    pub upper: f64,
    pub margin: f64,
}

impl ConfidenceInterval {
    fn around(estimate: f64, margin: f64) -> Self {
        Self {
            estimate,
            lower: estimate - margin,
            upper: estimate + margin,
            margin,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }
}

fn check_level(name: &str, level: f64) -> Result<()> {
    if !(level > 0.0 && level < 1.0) {
        return Err(StatsError::InvalidParameter(format!(
            "{name} must lie strictly between 0 and 1, got {level}"
        )));
    }
    Ok(())
}

fn check_positive(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(StatsError::InvalidParameter(format!(
            "{name} must be finite and > 0, got {value}"
        )));
    }
    Ok(())
}

/// Two-sided critical value z_{1−α/2} for a confidence level `1 − α`.
fn z_critical(confidence: f64) -> f64 {
    special::inverse_normal_cdf((1.0 + confidence) / 2.0)
}

/// t-based confidence interval for the mean (σ unknown).
///
/// # Algorithm
/// x̄ ± t_{(1+c)/2, n−1} · s / √n
///
/// # Errors
/// - [`StatsError::InsufficientData`] for fewer than 2 observations.
/// - [`StatsError::InvalidParameter`] unless `0 < confidence < 1`.
///
/// # Examples
/// ```
/// use u_statcore::testing::t_interval;
/// let ci = t_interval(&[10.0, 12.0, 14.0, 16.0, 18.0], 0.95).unwrap();
/// assert!((ci.margin - 3.92644).abs() < 1e-4);
/// assert!(ci.contains(14.0));
/// ```
pub fn t_interval(data: &[f64], confidence: f64) -> Result<ConfidenceInterval> {
    require_len("t interval", data, 2)?;
    check_level("confidence", confidence)?;
    let n = data.len() as f64;
    let critical = StudentsT::new(n - 1.0)?.quantile((1.0 + confidence) / 2.0)?;
    let standard_error = stats::sample_standard_deviation(data)? / n.sqrt();
    Ok(ConfidenceInterval::around(
        stats::mean(data)?,
        critical * standard_error,
    ))
}

/// z-based confidence interval for the mean with known σ.
///
/// # Errors
/// - [`StatsError::InsufficientData`] for an empty sample.
/// - [`StatsError::InvalidParameter`] for `sigma ≤ 0` or a confidence
///   level outside `(0, 1)`.
pub fn z_interval(data: &[f64], sigma: f64, confidence: f64) -> Result<ConfidenceInterval> {
    require_len("z interval", data, 1)?;
    check_positive("sigma", sigma)?;
    check_level("confidence", confidence)?;
    let margin = z_critical(confidence) * sigma / (data.len() as f64).sqrt();
    Ok(ConfidenceInterval::around(stats::mean(data)?, margin))
}

/// Smallest `n` whose z-interval half-width does not exceed `margin`.
///
/// n = ⌈(z_{(1+c)/2} σ / E)²⌉
///
/// # Examples
/// ```
/// use u_statcore::testing::sample_size_for_margin;
/// assert_eq!(sample_size_for_margin(15.0, 5.0, 0.95).unwrap(), 35);
/// ```
pub fn sample_size_for_margin(sigma: f64, margin: f64, confidence: f64) -> Result<usize> {
    check_positive("sigma", sigma)?;
    check_positive("margin", margin)?;
    check_level("confidence", confidence)?;
    let n = (z_critical(confidence) * sigma / margin).powi(2).ceil();
    Ok(n as usize)
}

/// Power of the two-sided one-sample z test to detect a mean shift of
/// `effect` with `n` observations.
///
/// # Algorithm
/// With δ = |effect| √n / σ and z = z_{1−α/2}:
/// power = Φ(δ − z) + Φ(−δ − z).
///
/// # Errors
/// [`StatsError::InvalidCount`] for `n == 0`; [`StatsError::InvalidParameter`]
/// for `sigma ≤ 0` or `significance ∉ (0, 1)`.
pub fn z_test_power(effect: f64, sigma: f64, n: usize, significance: f64) -> Result<f64> {
    if n == 0 {
        return Err(StatsError::InvalidCount {
            name: "sample size",
            value: 0,
        });
    }
    check_positive("sigma", sigma)?;
    check_level("significance", significance)?;
    let shift = effect.abs() * (n as f64).sqrt() / sigma;
    let z = z_critical(1.0 - significance);
    Ok(special::standard_normal_cdf(shift - z) + special::standard_normal_cdf(-shift - z))
}

/// Smallest `n` giving the two-sided z test at least `power` against a
/// mean shift of `effect`.
///
/// n = ⌈((z_{1−α/2} + z_{power}) σ / effect)²⌉
///
/// # Examples
/// ```
/// use u_statcore::testing::sample_size_for_power;
/// assert_eq!(sample_size_for_power(0.5, 1.0, 0.05, 0.8).unwrap(), 32);
/// ```
pub fn sample_size_for_power(effect: f64, sigma: f64, significance: f64, power: f64) -> Result<usize> {
    if effect == 0.0 || !effect.is_finite() {
        return Err(StatsError::InvalidParameter(format!(
            "effect must be finite and non-zero, got {effect}"
        )));
    }
    check_positive("sigma", sigma)?;
    check_level("significance", significance)?;
    check_level("power", power)?;
    let z_alpha = z_critical(1.0 - significance);
    let z_power = special::inverse_normal_cdf(power);
    let n = ((z_alpha + z_power) * sigma / effect).powi(2).ceil();
    Ok(n as usize)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn t_test_p_value_in_unit_interval(
            data in proptest::collection::vec(-100.0_f64..100.0, 2..40),
            mu0 in -100.0_f64..100.0,
        ) {
            let r = one_sample_t_test(&data, mu0).unwrap();
            if !r.p_value.is_nan() {
                prop_assert!((0.0..=1.0).contains(&r.p_value));
            }
        }

        #[test]
        fn two_sample_p_values_in_unit_interval(
            x in proptest::collection::vec(-100.0_f64..100.0, 2..40),
            y in proptest::collection::vec(-100.0_f64..100.0, 2..40),
        ) {
            for r in [two_sample_t_test(&x, &y, 0.0).unwrap(), welch_t_test(&x, &y).unwrap()] {
                if !r.p_value.is_nan() {
                    prop_assert!(0.0 <= r.p_value && r.p_value <= 1.0, "p = {}", r.p_value);
                }
            }
        }

        #[test]
        fn two_sample_p_value_falls_as_statistic_grows(
            x in proptest::collection::vec(-100.0_f64..100.0, 2..30),
            y in proptest::collection::vec(-100.0_f64..100.0, 2..30),
            a in 0.0_f64..8.0,
            b in 0.0_f64..8.0,
        ) {
            let base = two_sample_t_test(&x, &y, 0.0).unwrap();
            prop_assume!(base.standard_error > 1e-3);
            let observed = stats::mean(&x).unwrap() - stats::mean(&y).unwrap();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            // shifting the hypothesized difference moves t to roughly lo and hi
            let at = |t: f64| {
                two_sample_t_test(&x, &y, observed - t * base.standard_error).unwrap()
            };
            let (near, far) = (at(lo), at(hi));
            prop_assert!(far.statistic.abs() >= near.statistic.abs() - 1e-9);
            prop_assert!(far.p_value <= near.p_value + 1e-9);
        }

        #[test]
        fn p_value_decreases_with_statistic(df in 1.0_f64..50.0, a in 0.0_f64..10.0, b in 0.0_f64..10.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let t = StudentsT::new(df).unwrap();
            prop_assert!(t.two_tailed_p(hi) <= t.two_tailed_p(lo) + 1e-12);
        }

        #[test]
        fn interval_contains_estimate(
            data in proptest::collection::vec(-100.0_f64..100.0, 2..30),
            confidence in 0.5_f64..0.99,
        ) {
            let ci = t_interval(&data, confidence).unwrap();
            prop_assert!(ci.lower <= ci.estimate && ci.estimate <= ci.upper);
        }
    }
}
