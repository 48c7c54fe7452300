//! Descriptive statistics with numerical stability guarantees.
//!
//! Every statistic checks its minimum sample size before computing and
//! reports a shortfall as [`StatsError::InsufficientData`]. Values that are
//! numerically undefined rather than invalid (a NaN element, a zero
//! variance in a ratio) propagate as `f64::NAN`.
//!
//! # Algorithms
//!
//! - **Sum / Mean**: Neumaier compensated summation for O(ε) error
//!   independent of n.
//! - **Variance / moments**: two-pass, mean first, then central moments.
//! - **Rank statistics**: ranks are 1-based and tied values share the mean
//!   of the ranks they span.

use std::collections::HashMap;

use crate::error::{require_len, require_same_len, Result, StatsError};
use crate::quantile;

// ============================================================================
// Compensated summation
// ============================================================================

/// Neumaier compensated summation for O(ε) error independent of `n`.
///
/// This is an improved variant of Kahan summation that also handles the
/// case where the addend is larger in magnitude than the running sum.
///
/// # Algorithm
/// Maintains a running compensation variable `c`. At each step, the
/// branch ensures the smaller operand's low-order bits are captured.
///
/// Reference: Neumaier (1974), "Rundungsfehleranalyse einiger Verfahren
/// zur Summation endlicher Summen", *Zeitschrift für Angewandte
/// Mathematik und Mechanik* 54(1), pp. 39–51.
///
/// # Complexity
/// Time: O(n), Space: O(1)
///
/// # Returns
/// - `0.0` for an empty slice.
/// - `NaN` if any element is NaN.
///
/// # Examples
/// ```
/// use u_statcore::stats::sum;
/// assert_eq!(sum(&[1e16, 1.0, -1e16]), 1.0);
/// assert_eq!(sum(&[]), 0.0);
/// assert!(sum(&[1.0, f64::NAN]).is_nan());
/// ```
pub fn sum(data: &[f64]) -> f64 {
    let mut sum = 0.0_f64;
    let mut c = 0.0_f64;
    for &x in data {
        let t = sum + x;
        if sum.abs() >= x.abs() {
            c += (sum - t) + x;
        } else {
            c += (x - t) + sum;
        }
        sum = t;
    }
    // an infinite addend turns the compensation into NaN
    if c.is_finite() {
        sum + c
    } else {
        sum
    }
}

/// Plain left-to-right summation, without error compensation.
pub fn sum_simple(data: &[f64]) -> f64 {
    data.iter().sum()
}

/// Product of all elements; `1.0` for an empty slice.
pub fn product(data: &[f64]) -> f64 {
    data.iter().product()
}

// ============================================================================
// Central tendency
// ============================================================================

/// Arithmetic mean using compensated summation.
///
/// # Errors
/// - [`StatsError::InsufficientData`] if `data` is empty.
///
/// A NaN element yields `Ok(NaN)`.
///
/// # Examples
/// ```
/// use u_statcore::stats::mean;
/// assert_eq!(mean(&[0.0, 10.0]).unwrap(), 5.0);
/// assert!(mean(&[]).is_err());
/// ```
pub fn mean(data: &[f64]) -> Result<f64> {
    require_len("mean", data, 1)?;
    Ok(sum(data) / data.len() as f64)
}

/// Arithmetic mean with plain summation.
pub fn mean_simple(data: &[f64]) -> Result<f64> {
    require_len("mean", data, 1)?;
    Ok(sum_simple(data) / data.len() as f64)
}

/// Updates a running mean of `n` values with one more value.
///
/// # Examples
/// ```
/// use u_statcore::stats::add_to_mean;
/// assert_eq!(add_to_mean(14.0, 5, 53.0), 20.5);
/// ```
pub fn add_to_mean(mean: f64, n: usize, new_value: f64) -> f64 {
    mean + (new_value - mean) / (n as f64 + 1.0)
}

/// Mean of two groups combined, from each group's mean and size.
pub fn combine_means(mean1: f64, n1: usize, mean2: f64, n2: usize) -> f64 {
    (mean1 * n1 as f64 + mean2 * n2 as f64) / (n1 + n2) as f64
}

/// Population variance of two groups combined, from each group's
/// population variance, mean and size.
pub fn combine_variances(
    variance1: f64,
    mean1: f64,
    n1: usize,
    variance2: f64,
    mean2: f64,
    n2: usize,
) -> f64 {
    let combined = combine_means(mean1, n1, mean2, n2);
    let (n1, n2) = (n1 as f64, n2 as f64);
    (n1 * (variance1 + (mean1 - combined).powi(2)) + n2 * (variance2 + (mean2 - combined).powi(2)))
        / (n1 + n2)
}

/// Geometric mean `(Π xᵢ)^(1/n)`, computed in log space.
///
/// # Errors
/// - [`StatsError::InsufficientData`] if `data` is empty.
/// - [`StatsError::OutOfDomain`] if any value is not strictly positive.
///
/// # Examples
/// ```
/// use u_statcore::stats::geometric_mean;
/// assert!((geometric_mean(&[2.0, 8.0]).unwrap() - 4.0).abs() < 1e-12);
/// assert!(geometric_mean(&[1.0, -1.0]).is_err());
/// ```
pub fn geometric_mean(data: &[f64]) -> Result<f64> {
    require_len("geometric mean", data, 1)?;
    if let Some(&bad) = data.iter().find(|&&x| x <= 0.0) {
        return Err(StatsError::OutOfDomain(format!(
            "geometric mean requires positive values, got {bad}"
        )));
    }
    log_average(data)
}

/// Harmonic mean `n / Σ(1/xᵢ)`.
///
/// # Errors
/// - [`StatsError::InsufficientData`] if `data` is empty.
/// - [`StatsError::OutOfDomain`] if any value is not strictly positive.
pub fn harmonic_mean(data: &[f64]) -> Result<f64> {
    require_len("harmonic mean", data, 1)?;
    if let Some(&bad) = data.iter().find(|&&x| x <= 0.0) {
        return Err(StatsError::OutOfDomain(format!(
            "harmonic mean requires positive values, got {bad}"
        )));
    }
    let reciprocals: Vec<f64> = data.iter().map(|&x| 1.0 / x).collect();
    Ok(data.len() as f64 / sum(&reciprocals))
}

/// `exp(mean(ln xᵢ))` without a domain check; non-positive values give NaN.
pub fn log_average(data: &[f64]) -> Result<f64> {
    require_len("log average", data, 1)?;
    let logs: Vec<f64> = data.iter().map(|&x| x.ln()).collect();
    Ok((sum(&logs) / data.len() as f64).exp())
}

/// Root mean square `√(Σxᵢ² / n)`.
pub fn root_mean_square(data: &[f64]) -> Result<f64> {
    require_len("root mean square", data, 1)?;
    let squares: Vec<f64> = data.iter().map(|&x| x * x).collect();
    Ok((sum(&squares) / data.len() as f64).sqrt())
}

/// Mode of unsorted data. See [`mode_sorted`] for the tie rule.
pub fn mode(data: &[f64]) -> Result<f64> {
    require_len("mode", data, 1)?;
    mode_sorted(&quantile::numeric_sort(data))
}

/// Most frequent value of **sorted** data.
///
/// When several values share the highest count, the one that appears last
/// in sorted order wins.
///
/// # Examples
/// ```
/// use u_statcore::stats::mode_sorted;
/// assert_eq!(mode_sorted(&[1.0, 1.0, 2.0, 2.0, 3.0]).unwrap(), 2.0);
/// ```
pub fn mode_sorted(sorted: &[f64]) -> Result<f64> {
    require_len("mode", sorted, 1)?;
    let mut best = sorted[0];
    let mut best_count = 0;
    let mut current = sorted[0];
    let mut run = 0;
    for &x in sorted {
        if x == current {
            run += 1;
        } else {
            if run >= best_count {
                best = current;
                best_count = run;
            }
            current = x;
            run = 1;
        }
    }
    if run >= best_count {
        best = current;
    }
    Ok(best)
}

/// Hash-based mode of unsorted data in O(n).
///
/// Ties go to the value seen first in input order. `0.0` and `-0.0`
/// count as one value.
pub fn mode_fast(data: &[f64]) -> Result<f64> {
    require_len("mode", data, 1)?;
    let key = |x: f64| if x == 0.0 { 0.0_f64.to_bits() } else { x.to_bits() };
    let mut counts: HashMap<u64, usize> = HashMap::new();
    let mut first_seen: Vec<f64> = Vec::new();
    for &x in data {
        let count = counts.entry(key(x)).or_insert(0);
        if *count == 0 {
            first_seen.push(x);
        }
        *count += 1;
    }
    let mut best = first_seen[0];
    let mut best_count = 0;
    for &x in &first_seen {
        let count = counts[&key(x)];
        if count > best_count {
            best = x;
            best_count = count;
        }
    }
    Ok(best)
}

// ============================================================================
// Dispersion
// ============================================================================

/// Σ(xᵢ − x̄)ⁿ, the building block of the central moments.
pub fn sum_nth_power_deviations(data: &[f64], n: i32) -> Result<f64> {
    let m = mean(data)?;
    let deviations: Vec<f64> = data.iter().map(|&x| (x - m).powi(n)).collect();
    Ok(sum(&deviations))
}

/// Population variance (denominator `n`).
///
/// # Errors
/// - [`StatsError::InsufficientData`] if `data` is empty.
///
/// # Examples
/// ```
/// use u_statcore::stats::variance;
/// let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
/// assert!((variance(&v).unwrap() - 4.0).abs() < 1e-12);
/// ```
pub fn variance(data: &[f64]) -> Result<f64> {
    require_len("variance", data, 1)?;
    Ok(sum_nth_power_deviations(data, 2)? / data.len() as f64)
}

/// Sample variance with Bessel's correction (denominator `n − 1`).
///
/// # Errors
/// - [`StatsError::InsufficientData`] if `data.len() < 2`.
///
/// # Examples
/// ```
/// use u_statcore::stats::sample_variance;
/// let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
/// assert!((sample_variance(&v).unwrap() - 4.571428571428571).abs() < 1e-10);
/// ```
pub fn sample_variance(data: &[f64]) -> Result<f64> {
    require_len("sample variance", data, 2)?;
    Ok(sum_nth_power_deviations(data, 2)? / (data.len() - 1) as f64)
}

/// Population standard deviation.
pub fn standard_deviation(data: &[f64]) -> Result<f64> {
    variance(data).map(f64::sqrt)
}

/// Sample standard deviation, `√sample_variance`.
pub fn sample_standard_deviation(data: &[f64]) -> Result<f64> {
    sample_variance(data).map(f64::sqrt)
}

/// Sample standard deviation divided by the mean.
pub fn coefficient_of_variation(data: &[f64]) -> Result<f64> {
    Ok(sample_standard_deviation(data)? / mean(data)?)
}

/// Median of the absolute deviations from the median.
///
/// # Examples
/// ```
/// use u_statcore::stats::median_absolute_deviation;
/// let x = [1.0, 1.0, 2.0, 2.0, 4.0, 6.0, 9.0];
/// assert_eq!(median_absolute_deviation(&x).unwrap(), 1.0);
/// ```
pub fn median_absolute_deviation(data: &[f64]) -> Result<f64> {
    require_len("median absolute deviation", data, 1)?;
    let center = quantile::median(data)?;
    let deviations: Vec<f64> = data.iter().map(|&x| (x - center).abs()).collect();
    quantile::median(&deviations)
}

/// Difference between the 0.75- and 0.25-quantiles.
pub fn interquartile_range(data: &[f64]) -> Result<f64> {
    require_len("interquartile range", data, 1)?;
    let q = quantile::quantiles(data, &[0.75, 0.25])?;
    Ok(q[0] - q[1])
}

/// Standard score `(x − mean) / sd`.
pub fn z_score(x: f64, mean: f64, standard_deviation: f64) -> f64 {
    (x - mean) / standard_deviation
}

// ============================================================================
// Extremes
// ============================================================================

/// Smallest value.
///
/// # Examples
/// ```
/// use u_statcore::stats::min;
/// assert_eq!(min(&[3.0, 1.0, 4.0, 1.0, 5.0]).unwrap(), 1.0);
/// ```
pub fn min(data: &[f64]) -> Result<f64> {
    require_len("min", data, 1)?;
    Ok(data[1..]
        .iter()
        .fold(data[0], |acc, &x| if x < acc { x } else { acc }))
}

/// Largest value.
pub fn max(data: &[f64]) -> Result<f64> {
    require_len("max", data, 1)?;
    Ok(data[1..]
        .iter()
        .fold(data[0], |acc, &x| if x > acc { x } else { acc }))
}

/// `(min, max)` in a single pass.
pub fn extent(data: &[f64]) -> Result<(f64, f64)> {
    require_len("extent", data, 1)?;
    Ok(data[1..].iter().fold((data[0], data[0]), |(lo, hi), &x| {
        (if x < lo { x } else { lo }, if x > hi { x } else { hi })
    }))
}

/// First element of sorted data.
pub fn min_sorted(sorted: &[f64]) -> Result<f64> {
    require_len("min", sorted, 1)?;
    Ok(sorted[0])
}

/// Last element of sorted data.
pub fn max_sorted(sorted: &[f64]) -> Result<f64> {
    require_len("max", sorted, 1)?;
    Ok(sorted[sorted.len() - 1])
}

// ============================================================================
// Shape
// ============================================================================

/// Computes Fisher's adjusted sample skewness (G₁) with bias correction.
///
/// # Formula
/// ```text
/// G₁ = [√(n(n−1)) / (n−2)] × (m₃ / m₂^{3/2})
/// ```
/// where `m₂`, `m₃` are the biased second and third central moments.
///
/// This matches Excel `SKEW()` and `scipy.stats.skew(bias=False)`.
///
/// Reference: Joanes & Gill (1998), "Comparing measures of sample skewness
/// and kurtosis", *The Statistician* 47(1), pp. 183–189.
///
/// # Errors
/// - [`StatsError::InsufficientData`] if `data.len() < 3`.
///
/// Constant data has no defined skewness and yields `Ok(NaN)`.
///
/// # Examples
/// ```
/// use u_statcore::stats::sample_skewness;
/// assert!(sample_skewness(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap().abs() < 1e-14);
/// assert!(sample_skewness(&[1.0, 2.0, 3.0, 4.0, 50.0]).unwrap() > 0.0);
/// ```
pub fn sample_skewness(data: &[f64]) -> Result<f64> {
    require_len("sample skewness", data, 3)?;
    let nf = data.len() as f64;
    let m = sum(data) / nf;
    let mut sum2 = 0.0;
    let mut sum3 = 0.0;
    for &x in data {
        let d = x - m;
        let d2 = d * d;
        sum2 += d2;
        sum3 += d2 * d;
    }
    let m2 = sum2 / nf;
    let m3 = sum3 / nf;
    let g1 = m3 / m2.powf(1.5);
    let correction = (nf * (nf - 1.0)).sqrt() / (nf - 2.0);
    Ok(correction * g1)
}

/// Computes Fisher's excess kurtosis (G₂) with bias correction.
///
/// # Formula
/// ```text
/// G₂ = [n(n+1) / ((n−1)(n−2)(n−3))] × Σ[(xᵢ−x̄)/s]⁴ − [3(n−1)² / ((n−2)(n−3))]
/// ```
/// where `s` is the sample standard deviation (n−1 denominator).
///
/// This matches Excel `KURT()`. Returns **0** for a normal distribution,
/// positive for heavy tails, negative for light tails.
///
/// # Errors
/// - [`StatsError::InsufficientData`] if `data.len() < 4`.
///
/// # Examples
/// ```
/// use u_statcore::stats::sample_kurtosis;
/// let data = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
/// assert!(sample_kurtosis(&data).unwrap() < 0.0); // platykurtic
/// ```
pub fn sample_kurtosis(data: &[f64]) -> Result<f64> {
    require_len("sample kurtosis", data, 4)?;
    let nf = data.len() as f64;
    let m = sum(data) / nf;
    let mut sum2 = 0.0;
    let mut sum4 = 0.0;
    for &x in data {
        let d = x - m;
        let d2 = d * d;
        sum2 += d2;
        sum4 += d2 * d2;
    }
    let s2 = sum2 / (nf - 1.0);
    let sum_z4 = sum4 / (s2 * s2);
    let a = nf * (nf + 1.0) / ((nf - 1.0) * (nf - 2.0) * (nf - 3.0));
    let b = 3.0 * (nf - 1.0) * (nf - 1.0) / ((nf - 2.0) * (nf - 3.0));
    Ok(a * sum_z4 - b)
}

// ============================================================================
// Association
// ============================================================================

/// Computes the sample covariance between two datasets.
///
/// # Formula
/// ```text
/// Cov(X, Y) = Σ(xᵢ − x̄)(yᵢ − ȳ) / (n − 1)
/// ```
///
/// # Errors
/// - [`StatsError::LengthMismatch`] if the lengths differ.
/// - [`StatsError::InsufficientData`] if `n < 2`.
///
/// # Examples
/// ```
/// use u_statcore::stats::sample_covariance;
/// let x = [1.0, 2.0, 3.0, 4.0, 5.0];
/// let y = [2.0, 4.0, 6.0, 8.0, 10.0];
/// assert!((sample_covariance(&x, &y).unwrap() - 5.0).abs() < 1e-14);
/// ```
pub fn sample_covariance(x: &[f64], y: &[f64]) -> Result<f64> {
    require_same_len(x, y)?;
    require_len("sample covariance", x, 2)?;
    let nf = x.len() as f64;
    let mean_x = sum(x) / nf;
    let mean_y = sum(y) / nf;
    let products: Vec<f64> = x
        .iter()
        .zip(y)
        .map(|(&a, &b)| (a - mean_x) * (b - mean_y))
        .collect();
    Ok(sum(&products) / (nf - 1.0))
}

/// Pearson product-moment correlation coefficient.
///
/// `NaN` when either sample is constant.
pub fn sample_correlation(x: &[f64], y: &[f64]) -> Result<f64> {
    let cov = sample_covariance(x, y)?;
    Ok(cov / (sample_standard_deviation(x)? * sample_standard_deviation(y)?))
}

/// 1-based ranks of `data` in input order; ties share their mean rank.
///
/// # Examples
/// ```
/// use u_statcore::stats::ranks;
/// assert_eq!(ranks(&[10.0, 30.0, 20.0, 20.0]), vec![1.0, 4.0, 2.5, 2.5]);
/// ```
pub fn ranks(data: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..data.len()).collect();
    order.sort_by(|&a, &b| data[a].total_cmp(&data[b]));
    let mut result = vec![0.0; data.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && data[order[end]] == data[order[start]] {
            end += 1;
        }
        // positions start..end hold 1-based ranks start+1..=end
        let shared = (start + 1 + end) as f64 / 2.0;
        for &i in &order[start..end] {
            result[i] = shared;
        }
        start = end;
    }
    result
}

/// Spearman rank correlation: Pearson correlation of the tie-averaged ranks.
pub fn sample_rank_correlation(x: &[f64], y: &[f64]) -> Result<f64> {
    require_same_len(x, y)?;
    require_len("sample rank correlation", x, 2)?;
    sample_correlation(&ranks(x), &ranks(y))
}

// ============================================================================
// Sorted-data helpers
// ============================================================================

/// Number of distinct values in sorted data.
pub fn unique_count_sorted(sorted: &[f64]) -> usize {
    if sorted.is_empty() {
        return 0;
    }
    1 + sorted.windows(2).filter(|w| w[0] != w[1]).count()
}

/// Splits `data` into consecutive chunks of `size`; the last may be shorter.
///
/// # Errors
/// - [`StatsError::InvalidCount`] if `size == 0`.
///
/// # Examples
/// ```
/// use u_statcore::stats::chunk;
/// let parts = chunk(&[1, 2, 3, 4, 5], 2).unwrap();
/// assert_eq!(parts, vec![vec![1, 2], vec![3, 4], vec![5]]);
/// ```
pub fn chunk<T: Clone>(data: &[T], size: usize) -> Result<Vec<Vec<T>>> {
    if size == 0 {
        return Err(StatsError::InvalidCount {
            name: "chunk size",
            value: size,
        });
    }
    Ok(data.chunks(size).map(<[T]>::to_vec).collect())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // --- sum ---

    #[test]
    fn test_sum_basic() {
        assert!((sum(&[1.0, 2.0, 3.0]) - 6.0).abs() < 1e-15);
        assert_eq!(sum(&[]), 0.0);
    }

    #[test]
    fn test_sum_precision() {
        // Sum of 1e16 + 1.0 + (-1e16) with naive sum loses the 1.0
        let v = [1e16, 1.0, -1e16];
        assert_eq!(sum(&v), 1.0);
        assert_eq!(sum_simple(&v), 0.0);
    }

    #[test]
    fn test_sum_non_finite() {
        assert!(sum(&[1.0, f64::NAN, 3.0]).is_nan());
        assert_eq!(sum(&[1.0, f64::INFINITY]), f64::INFINITY);
    }

    #[test]
    fn test_product() {
        assert_eq!(product(&[1.0, 2.0, 3.0, 4.0]), 24.0);
        assert_eq!(product(&[]), 1.0);
    }

    // --- mean ---

    #[test]
    fn test_mean_basic() {
        assert_eq!(mean(&[0.0, 10.0]).unwrap(), 5.0);
        assert_eq!(mean(&[42.0]).unwrap(), 42.0);
        assert_eq!(mean_simple(&[1.0, 2.0, 3.0]).unwrap(), 2.0);
    }

    #[test]
    fn test_mean_empty() {
        assert_eq!(
            mean(&[]),
            Err(StatsError::InsufficientData {
                operation: "mean",
                required: 1,
                actual: 0
            })
        );
    }

    #[test]
    fn test_mean_nan_propagates() {
        assert!(mean(&[1.0, f64::NAN, 3.0]).unwrap().is_nan());
    }

    #[test]
    fn test_running_means() {
        let m = add_to_mean(mean(&[1.0, 2.0, 3.0]).unwrap(), 3, 6.0);
        assert_eq!(m, 3.0);
        assert_eq!(combine_means(2.0, 3, 4.5, 2), 3.0);
    }

    #[test]
    fn test_combine_variances_matches_pooled() {
        let a = [1.0, 2.0, 3.0];
        let b = [4.0, 5.0];
        let combined = combine_variances(
            variance(&a).unwrap(),
            mean(&a).unwrap(),
            a.len(),
            variance(&b).unwrap(),
            mean(&b).unwrap(),
            b.len(),
        );
        assert!((combined - 2.0).abs() < 1e-12, "got {combined}");
    }

    #[test]
    fn test_geometric_and_harmonic() {
        assert!((geometric_mean(&[4.0, 1.0, 1.0 / 32.0]).unwrap() - 0.5).abs() < 1e-12);
        assert!((harmonic_mean(&[1.0, 2.0, 4.0]).unwrap() - 12.0 / 7.0).abs() < 1e-12);
        assert!(matches!(
            harmonic_mean(&[1.0, 0.0]),
            Err(StatsError::OutOfDomain(_))
        ));
        assert!(log_average(&[-1.0, 2.0]).unwrap().is_nan());
    }

    #[test]
    fn test_root_mean_square() {
        assert_eq!(root_mean_square(&[-1.0, 1.0, -1.0, 1.0]).unwrap(), 1.0);
    }

    // --- mode ---

    #[test]
    fn test_mode_tie_last_in_sorted_order() {
        assert_eq!(mode(&[2.0, 1.0, 2.0, 1.0]).unwrap(), 2.0);
        assert_eq!(mode(&[3.0, 1.0, 3.0, 2.0]).unwrap(), 3.0);
        assert_eq!(mode(&[5.0]).unwrap(), 5.0);
    }

    #[test]
    fn test_mode_fast_first_seen() {
        assert_eq!(mode_fast(&[2.0, 2.0, 1.0, 1.0]).unwrap(), 2.0);
        assert_eq!(mode_fast(&[1.0, 3.0, 3.0, 0.0, -0.0]).unwrap(), 3.0);
        assert!(mode_fast(&[]).is_err());
    }

    // --- variance ---

    #[test]
    fn test_variance_basic() {
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((sample_variance(&v).unwrap() - 4.571428571428571).abs() < 1e-10);
        assert!((variance(&v).unwrap() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_variance_constant() {
        let v = [5.0; 100];
        assert!(variance(&v).unwrap().abs() < 1e-15);
    }

    #[test]
    fn test_variance_size_errors() {
        assert!(variance(&[]).is_err());
        assert_eq!(variance(&[3.0]).unwrap(), 0.0);
        assert!(matches!(
            sample_variance(&[1.0]),
            Err(StatsError::InsufficientData { required: 2, .. })
        ));
    }

    #[test]
    fn test_standard_deviation() {
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((standard_deviation(&v).unwrap() - 2.0).abs() < 1e-12);
        let expected = 4.571428571428571_f64.sqrt();
        assert!((sample_standard_deviation(&v).unwrap() - expected).abs() < 1e-10);
    }

    #[test]
    fn test_variance_large_offset() {
        // Naive E[X²] − E[X]² would cancel catastrophically here
        let data: Vec<f64> = (1..=5).map(|i| 1e9 + i as f64).collect();
        let var = sample_variance(&data).unwrap();
        assert!((var - 2.5).abs() < 1e-5, "got {var}");
    }

    #[test]
    fn test_coefficient_of_variation() {
        let cv = coefficient_of_variation(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        let expected = (5.0_f64 / 3.0).sqrt() / 2.5;
        assert!((cv - expected).abs() < 1e-12);
    }

    #[test]
    fn test_mad_and_iqr() {
        let x = [1.0, 1.0, 2.0, 2.0, 4.0, 6.0, 9.0];
        assert_eq!(median_absolute_deviation(&x).unwrap(), 1.0);
        let y = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        assert_eq!(interquartile_range(&y).unwrap(), 4.0);
    }

    #[test]
    fn test_z_score() {
        assert_eq!(z_score(78.0, 80.0, 5.0), -0.4);
    }

    // --- extremes ---

    #[test]
    fn test_min_max_extent() {
        let v = [3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0];
        assert_eq!(min(&v).unwrap(), 1.0);
        assert_eq!(max(&v).unwrap(), 9.0);
        assert_eq!(extent(&v).unwrap(), (1.0, 9.0));
        assert_eq!(min_sorted(&[1.0, 2.0]).unwrap(), 1.0);
        assert_eq!(max_sorted(&[1.0, 2.0]).unwrap(), 2.0);
    }

    #[test]
    fn test_min_max_empty() {
        assert!(min(&[]).is_err());
        assert!(max(&[]).is_err());
        assert!(extent(&[]).is_err());
    }

    // --- skewness ---

    #[test]
    fn test_skewness_known_value() {
        // Data: [1, 2, 3, 4, 8]
        //   n=5, mean=3.6, m2 = 5.84, m3 = 12.672
        //   g1 = 12.672 / 5.84^1.5 ≈ 0.8982, correction = √20/3 → G1 ≈ 1.3388
        let s = sample_skewness(&[1.0, 2.0, 3.0, 4.0, 8.0]).unwrap();
        assert!((s - 1.339).abs() < 0.01, "expected skewness ≈ 1.34, got {s}");
    }

    #[test]
    fn test_skewness_sign() {
        assert!(sample_skewness(&[-50.0, 1.0, 2.0, 3.0, 4.0]).unwrap() < 0.0);
        assert!(sample_skewness(&[1.0, 2.0, 3.0, 4.0, 50.0]).unwrap() > 0.0);
    }

    #[test]
    fn test_skewness_edge_cases() {
        assert!(matches!(
            sample_skewness(&[1.0, 2.0]),
            Err(StatsError::InsufficientData { required: 3, .. })
        ));
        assert!(sample_skewness(&[5.0, 5.0, 5.0]).unwrap().is_nan());
    }

    // --- kurtosis ---

    #[test]
    fn test_kurtosis_heavy_tails() {
        let data = [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 100.0];
        assert!(sample_kurtosis(&data).unwrap() > 0.0);
    }

    #[test]
    fn test_kurtosis_known_value() {
        // G2 of [1..=10]: a = 110/504, Σz⁴ = 1208.625/(55/6)², b = 243/56
        let data: Vec<f64> = (1..=10).map(f64::from).collect();
        let k = sample_kurtosis(&data).unwrap();
        assert!((k - (-1.2)).abs() < 1e-10, "got {k}");
    }

    #[test]
    fn test_kurtosis_edge_cases() {
        assert!(matches!(
            sample_kurtosis(&[1.0, 2.0, 3.0]),
            Err(StatsError::InsufficientData { required: 4, .. })
        ));
    }

    // --- association ---

    #[test]
    fn test_covariance_perfect_negative() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [10.0, 8.0, 6.0, 4.0, 2.0];
        assert!((sample_covariance(&x, &y).unwrap() + 5.0).abs() < 1e-14);
    }

    #[test]
    fn test_covariance_errors() {
        assert_eq!(
            sample_covariance(&[1.0, 2.0], &[1.0]),
            Err(StatsError::LengthMismatch { left: 2, right: 1 })
        );
        assert!(sample_covariance(&[1.0], &[2.0]).is_err());
    }

    #[test]
    fn test_correlation() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [2.0, 4.0, 6.0, 8.0];
        assert!((sample_correlation(&x, &y).unwrap() - 1.0).abs() < 1e-12);
        let z = [8.0, 6.0, 4.0, 2.0];
        assert!((sample_correlation(&x, &z).unwrap() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_ranks_with_ties() {
        assert_eq!(ranks(&[10.0, 20.0, 20.0, 30.0]), vec![1.0, 2.5, 2.5, 4.0]);
        assert_eq!(ranks(&[3.0, 3.0, 3.0]), vec![2.0, 2.0, 2.0]);
        assert!(ranks(&[]).is_empty());
    }

    #[test]
    fn test_rank_correlation_monotone() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [1.0, 8.0, 27.0, 64.0, 125.0];
        assert!((sample_rank_correlation(&x, &y).unwrap() - 1.0).abs() < 1e-12);
    }

    // --- helpers ---

    #[test]
    fn test_unique_count_sorted() {
        assert_eq!(unique_count_sorted(&[1.0, 2.0, 2.0, 3.0, 3.0, 3.0]), 3);
        assert_eq!(unique_count_sorted(&[]), 0);
    }

    #[test]
    fn test_chunk() {
        assert_eq!(
            chunk(&[1.0, 2.0, 3.0], 3).unwrap(),
            vec![vec![1.0, 2.0, 3.0]]
        );
        assert_eq!(
            chunk(&[1, 2], 0),
            Err(StatsError::InvalidCount {
                name: "chunk size",
                value: 0
            })
        );
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Strategy for generating finite f64 vectors of reasonable size.
    fn finite_vec(min_len: usize, max_len: usize) -> impl Strategy<Value = Vec<f64>> {
        proptest::collection::vec(
            prop::num::f64::NORMAL.prop_filter("finite", |x| x.is_finite() && x.abs() < 1e12),
            min_len..=max_len,
        )
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        #[test]
        fn variance_non_negative(data in finite_vec(1, 100)) {
            let var = variance(&data).unwrap();
            prop_assert!(var >= 0.0, "variance must be >= 0, got {}", var);
        }

        #[test]
        fn variance_of_constant_is_zero(
            value in -1e6_f64..1e6,
            n in 2_usize..50,
        ) {
            let data = vec![value; n];
            let var = sample_variance(&data).unwrap();
            prop_assert!(var.abs() < 1e-10, "variance of constant should be ~0, got {}", var);
        }

        #[test]
        fn sd_is_sqrt_of_sample_variance(data in finite_vec(2, 100)) {
            let var = sample_variance(&data).unwrap();
            let sd = sample_standard_deviation(&data).unwrap();
            prop_assert_eq!(sd, var.sqrt());
        }

        #[test]
        fn mean_linearity(
            data in finite_vec(1, 100),
            a in -100.0_f64..100.0,
            b in -100.0_f64..100.0,
        ) {
            let m = mean(&data).unwrap();
            let transformed: Vec<f64> = data.iter().map(|&x| a * x + b).collect();
            let mt = mean(&transformed).unwrap();
            let expected = a * m + b;
            let scale = data.iter().fold(0.0_f64, |acc, x| acc.max(x.abs())) * a.abs() + b.abs();
            let tol = 1e-12 * scale.max(1.0);
            prop_assert!((mt - expected).abs() < tol, "mean(a*x+b)={} != {}", mt, expected);
        }

        #[test]
        fn mean_is_idempotent(data in finite_vec(1, 100)) {
            prop_assert_eq!(mean(&data).unwrap().to_bits(), mean(&data).unwrap().to_bits());
        }

        #[test]
        fn combine_variances_matches_concatenation(
            a in proptest::collection::vec(-1e3_f64..1e3, 1..30),
            b in proptest::collection::vec(-1e3_f64..1e3, 1..30),
        ) {
            let combined = combine_variances(
                variance(&a).unwrap(), mean(&a).unwrap(), a.len(),
                variance(&b).unwrap(), mean(&b).unwrap(), b.len(),
            );
            let all: Vec<f64> = a.iter().chain(&b).copied().collect();
            let direct = variance(&all).unwrap();
            prop_assert!((combined - direct).abs() < 1e-8 * direct.max(1.0));
        }

        #[test]
        fn skewness_of_symmetric_is_zero(
            half in proptest::collection::vec(-1e6_f64..1e6, 2..=50),
        ) {
            let mut data: Vec<f64> = half.clone();
            data.extend(half.iter().map(|x| -x));
            let s = sample_skewness(&data).unwrap();
            if s.is_finite() {
                prop_assert!(s.abs() < 1e-8, "symmetric data should have ~0 skewness, got {}", s);
            }
        }

        #[test]
        fn covariance_self_is_variance(data in finite_vec(2, 100)) {
            let cov = sample_covariance(&data, &data).unwrap();
            let var = sample_variance(&data).unwrap();
            prop_assert!((cov - var).abs() < 1e-10 * var.max(1.0), "Cov(x,x)={} != Var(x)={}", cov, var);
        }

        #[test]
        fn rank_mass_is_triangular(data in proptest::collection::vec(-5i32..5, 1..60)) {
            let values: Vec<f64> = data.iter().map(|&v| f64::from(v)).collect();
            let n = values.len() as f64;
            let total: f64 = ranks(&values).iter().sum();
            prop_assert!((total - n * (n + 1.0) / 2.0).abs() < 1e-9);
        }

        #[test]
        fn extent_matches_min_max(data in finite_vec(1, 100)) {
            let (lo, hi) = extent(&data).unwrap();
            prop_assert_eq!(lo, min(&data).unwrap());
            prop_assert_eq!(hi, max(&data).unwrap());
        }
    }
}
