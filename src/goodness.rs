//! Goodness-of-fit tests.
//!
//! - [`chi_squared_goodness_of_fit`]: observed counts of a discrete sample
//!   against a distribution fitted at the sample mean, decided against the
//!   tabulated critical values.
//! - [`shapiro_wilk_test`]: Royston's approximation to the Shapiro–Wilk W
//!   test of normality.

use tracing::debug;

use crate::error::{require_len, Result, StatsError};
use crate::quantile::numeric_sort;
use crate::special;
use crate::stats;
use crate::tables;

// ============================================================================
// Chi-squared goodness of fit
// ============================================================================

/// Smallest expected class count kept as its own class.
pub const MIN_EXPECTED_COUNT: f64 = 3.0;

/// Outcome of a chi-squared goodness-of-fit test.
#[derive(Debug, Clone, PartialEq)]
pub struct GoodnessOfFit {
    /// Σ (O − E)² / E over the collapsed classes.
    pub statistic: f64,
    /// Classes after collapsing, minus one, minus the fitted parameter.
    pub degrees_of_freedom: usize,
    /// Tabulated critical value at the requested significance.
    pub critical_value: f64,
    /// `true` when the statistic exceeds the critical value.
    pub reject: bool,
    /// Observed count per class after collapsing.
    pub observed: Vec<f64>,
    /// Expected count per class after collapsing.
    pub expected: Vec<f64>,
}

/// Chi-squared goodness-of-fit test of a sample of non-negative integer
/// outcomes against a one-parameter discrete distribution.
///
/// `distribution` receives the sample mean and returns the probability
/// cells of the hypothesized distribution (for example
/// `|mean| Ok(Poisson::new(mean)?.cells())`).
///
/// # Algorithm
/// 1. Histogram the sample by integer value.
/// 2. Expected count of class `k` is `cells[k] · n` (zero past the end of
///    the cells).
/// 3. Walking down from the highest class, any class whose expected count
///    is below 3 is merged into its predecessor.
/// 4. χ² = Σ (O − E)² / E with `classes − 2` degrees of freedom, compared
///    to the critical-value table.
///
/// # Errors
/// - [`StatsError::InsufficientData`] for an empty sample.
/// - [`StatsError::OutOfDomain`] if a value is not a non-negative integer.
/// - [`StatsError::DegreesOfFreedomOutOfTable`] when the collapsed classes
///   leave a degrees-of-freedom count the table does not list (including
///   zero).
/// - [`StatsError::SignificanceNotTabulated`] for an untabulated level.
/// - Any error returned by `distribution`.
///
/// # Examples
/// ```
/// use u_statcore::distributions::Poisson;
/// use u_statcore::goodness::chi_squared_goodness_of_fit;
///
/// let mut data = vec![0.0; 32];
/// data.extend([1.0; 15]);
/// data.extend([2.0; 9]);
/// data.extend([3.0; 4]);
/// let fit = chi_squared_goodness_of_fit(&data, |m| Ok(Poisson::new(m)?.cells()), 0.05).unwrap();
/// assert_eq!(fit.degrees_of_freedom, 1);
/// assert!(!fit.reject);
/// ```
pub fn chi_squared_goodness_of_fit<F>(
    data: &[f64],
    distribution: F,
    significance: f64,
) -> Result<GoodnessOfFit>
where
    F: Fn(f64) -> Result<Vec<f64>>,
{
    require_len("chi-squared goodness of fit", data, 1)?;
    let mut observed: Vec<f64> = Vec::new();
    for &value in data {
        if !(value >= 0.0 && value.fract() == 0.0 && value.is_finite()) {
            return Err(StatsError::OutOfDomain(format!(
                "goodness of fit needs non-negative integer outcomes, got {value}"
            )));
        }
        let class = value as usize;
        if class >= observed.len() {
            observed.resize(class + 1, 0.0);
        }
        observed[class] += 1.0;
    }

    let cells = distribution(stats::mean(data)?)?;
    let n = data.len() as f64;
    let mut expected: Vec<f64> = (0..observed.len())
        .map(|k| cells.get(k).copied().unwrap_or(0.0) * n)
        .collect();

    let classes_before = expected.len();
    for k in (1..expected.len()).rev() {
        if expected[k] < MIN_EXPECTED_COUNT {
            expected[k - 1] += expected.remove(k);
            observed[k - 1] += observed.remove(k);
        }
    }
    if expected.len() != classes_before {
        debug!(
            from = classes_before,
            to = expected.len(),
            "collapsed sparse chi-squared classes"
        );
    }

    let statistic = stats::sum(
        &observed
            .iter()
            .zip(&expected)
            .map(|(o, e)| (o - e).powi(2) / e)
            .collect::<Vec<f64>>(),
    );
    // one degree lost to the total, one to the mean fitted from the data
    let degrees_of_freedom = match expected.len().checked_sub(2) {
        Some(df) if df > 0 => df,
        _ => return Err(StatsError::DegreesOfFreedomOutOfTable(0)),
    };
    let critical_value = tables::chi_squared_critical_value(degrees_of_freedom, significance)?;

    Ok(GoodnessOfFit {
        statistic,
        degrees_of_freedom,
        critical_value,
        reject: critical_value < statistic,
        observed,
        expected,
    })
}

// ============================================================================
// Shapiro–Wilk
// ============================================================================

/// Largest sample the Royston approximation is calibrated for.
pub const SHAPIRO_WILK_MAX_N: usize = 5000;

/// Result of the Shapiro–Wilk normality test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapiroWilkResult {
    /// The W statistic, in `(0, 1]`; values near 1 suggest normality.
    pub w: f64,
    /// Normal-approximated z score of W (NaN for n = 3, where the p-value
    /// is exact).
    pub z: f64,
    /// Small values reject the null hypothesis of normality.
    pub p_value: f64,
}

// Royston polynomial coefficients (AS R94)
const SW_C1: [f64; 6] = [0.0, 0.221157, -0.147981, -2.07119, 4.434685, -2.706056];
const SW_C2: [f64; 6] = [0.0, 0.042981, -0.293762, -1.752461, 5.682633, -3.582633];
const SW_C3: [f64; 4] = [0.544, -0.39978, 0.025054, -6.714e-4];
const SW_C4: [f64; 4] = [1.3822, -0.77857, 0.062767, -0.0020322];
const SW_C5: [f64; 4] = [-1.5861, -0.31082, -0.083751, 0.0038915];
const SW_C6: [f64; 3] = [-0.4803, -0.082676, 0.0030302];
const SW_G: [f64; 2] = [-2.273, 0.459];

/// c[0] + c[1]·x + c[2]·x² + … by Horner's rule.
fn poly(c: &[f64], x: f64) -> f64 {
    c.iter().rev().fold(0.0, |acc, &ci| acc * x + ci)
}

/// Shapiro–Wilk test, H₀: the sample comes from a normal distribution.
///
/// # Algorithm
/// Royston (1992, 1995), AS R94:
/// 1. Expected normal order statistics `mᵢ = Φ⁻¹((i − 0.375)/(n + 0.25))`.
/// 2. Weights `aᵢ` from `m` with polynomial corrections to the outermost
///    one (n ≤ 5) or two (n > 5) coefficients.
/// 3. `W = (Σ aᵢ (x₍ₙ₊₁₋ᵢ₎ − x₍ᵢ₎))² / Σ (xᵢ − x̄)²`.
/// 4. `ln(1 − W)` is normalized with separate fits for n ≤ 11 and
///    n ≥ 12; the p-value is the upper normal tail. For n = 3 the exact
///    distribution `p = 1 − (6/π) acos(√W)` is used.
///
/// References:
/// - Shapiro & Wilk (1965), "An analysis of variance test for normality",
///   *Biometrika* 52(3–4).
/// - Royston (1995), "Remark AS R94", *Applied Statistics* 44(4).
///
/// # Errors
/// - [`StatsError::InsufficientData`] for fewer than 3 observations.
/// - [`StatsError::InvalidParameter`] above 5000 observations or when every
///   value is identical.
/// - [`StatsError::OutOfDomain`] for non-finite values.
///
/// # Examples
/// ```
/// use u_statcore::goodness::shapiro_wilk_test;
/// let r = shapiro_wilk_test(&[-1.5, -1.0, -0.5, 0.0, 0.5, 1.0, 1.5]).unwrap();
/// assert!(r.w > 0.9);
/// assert!(r.p_value > 0.05);
/// ```
pub fn shapiro_wilk_test(data: &[f64]) -> Result<ShapiroWilkResult> {
    require_len("Shapiro-Wilk test", data, 3)?;
    let n = data.len();
    if n > SHAPIRO_WILK_MAX_N {
        return Err(StatsError::InvalidParameter(format!(
            "Shapiro-Wilk supports at most {SHAPIRO_WILK_MAX_N} observations, got {n}"
        )));
    }
    if data.iter().any(|v| !v.is_finite()) {
        return Err(StatsError::OutOfDomain(
            "Shapiro-Wilk needs finite observations".to_string(),
        ));
    }
    let x = numeric_sort(data);
    if x[n - 1] - x[0] <= 0.0 {
        return Err(StatsError::InvalidParameter(
            "Shapiro-Wilk is undefined for a constant sample".to_string(),
        ));
    }

    let half = n / 2;
    let a = if n == 3 {
        vec![std::f64::consts::FRAC_1_SQRT_2]
    } else {
        sw_coefficients(n, half)?
    };

    let numerator: f64 = (0..half).map(|i| a[i] * (x[n - 1 - i] - x[i])).sum();
    let ss = stats::sum_nth_power_deviations(&x, 2)?;
    let w = (numerator * numerator / ss).min(1.0);

    if n == 3 {
        let w = w.max(0.75);
        let p = 1.0 - (6.0 / std::f64::consts::PI) * w.sqrt().acos();
        return Ok(ShapiroWilkResult {
            w,
            z: f64::NAN,
            p_value: p.clamp(0.0, 1.0),
        });
    }

    let (z, p_value) = sw_p_value(w, n);
    Ok(ShapiroWilkResult {
        w,
        z,
        p_value: p_value.clamp(0.0, 1.0),
    })
}

/// Royston's half-vector of W coefficients for n ≥ 4.
fn sw_coefficients(n: usize, half: usize) -> Result<Vec<f64>> {
    let nf = n as f64;
    let m: Vec<f64> = (0..half)
        .map(|i| special::inverse_normal_cdf((i as f64 + 1.0 - 0.375) / (nf + 0.25)))
        .collect();
    let summ2 = 2.0 * m.iter().map(|v| v * v).sum::<f64>();
    let ssumm2 = summ2.sqrt();
    let rsn = 1.0 / nf.sqrt();

    let a1 = poly(&SW_C1, rsn) - m[0] / ssumm2;
    let corrected = if n <= 5 { 1 } else { 2 };
    let mut a = vec![0.0; half];
    a[0] = a1;
    let (fac_sq, one_minus) = if corrected == 1 {
        (summ2 - 2.0 * m[0] * m[0], 1.0 - 2.0 * a1 * a1)
    } else {
        let a2 = -m[1] / ssumm2 + poly(&SW_C2, rsn);
        a[1] = a2;
        (
            summ2 - 2.0 * m[0] * m[0] - 2.0 * m[1] * m[1],
            1.0 - 2.0 * a1 * a1 - 2.0 * a2 * a2,
        )
    };
    if fac_sq <= 0.0 || one_minus <= 0.0 {
        return Err(StatsError::InvalidParameter(format!(
            "Shapiro-Wilk coefficients are degenerate for n = {n}"
        )));
    }
    let fac = (fac_sq / one_minus).sqrt();
    for i in corrected..half {
        a[i] = -m[i] / fac;
    }
    Ok(a)
}

/// z score and upper-tail p-value of W for n ≥ 4.
fn sw_p_value(w: f64, n: usize) -> (f64, f64) {
    let nf = n as f64;
    let w1 = 1.0 - w;
    if w1 <= 0.0 {
        return (f64::NEG_INFINITY, 1.0);
    }
    let y = w1.ln();

    let z = if n <= 11 {
        let gamma = poly(&SW_G, nf);
        if y >= gamma {
            return (f64::INFINITY, 0.0);
        }
        let y2 = -(gamma - y).ln();
        let m = poly(&SW_C3, nf);
        let s = poly(&SW_C4, nf).exp();
        (y2 - m) / s
    } else {
        let ln_n = nf.ln();
        let m = poly(&SW_C5, ln_n);
        let s = poly(&SW_C6, ln_n).exp();
        (y - m) / s
    };
    (z, 1.0 - special::standard_normal_cdf(z))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distributions::{Binomial, Poisson};

    fn textbook_counts() -> Vec<f64> {
        let mut data = vec![0.0; 32];
        data.extend([1.0; 15]);
        data.extend([2.0; 9]);
        data.extend([3.0; 4]);
        data
    }

    #[test]
    fn test_poisson_textbook_not_rejected() {
        let fit = chi_squared_goodness_of_fit(
            &textbook_counts(),
            |m| Ok(Poisson::new(m)?.cells()),
            0.05,
        )
        .unwrap();
        assert!((fit.statistic - 3.2386).abs() < 1e-3, "chi2 = {}", fit.statistic);
        assert_eq!(fit.degrees_of_freedom, 1);
        assert_eq!(fit.critical_value, 3.84);
        assert!(!fit.reject);
        assert_eq!(fit.observed, vec![32.0, 15.0, 13.0]);
        assert_eq!(fit.expected.len(), 3);
    }

    #[test]
    fn test_poisson_textbook_rejected_at_loose_level() {
        // 3.24 lies between the 0.1 (2.71) and 0.05 (3.84) critical values
        let fit = chi_squared_goodness_of_fit(
            &textbook_counts(),
            |m| Ok(Poisson::new(m)?.cells()),
            0.1,
        )
        .unwrap();
        assert!(fit.reject);
    }

    #[test]
    fn test_expected_totals_preserved_by_collapsing() {
        let data = textbook_counts();
        let fit =
            chi_squared_goodness_of_fit(&data, |m| Ok(Poisson::new(m)?.cells()), 0.05).unwrap();
        let observed: f64 = fit.observed.iter().sum();
        assert_eq!(observed, data.len() as f64);
        assert!(fit.expected.iter().all(|&e| e >= MIN_EXPECTED_COUNT));
    }

    #[test]
    fn test_too_few_classes_fails() {
        let data = [0.0, 0.0, 0.0, 1.0];
        let err = chi_squared_goodness_of_fit(&data, |m| Ok(Poisson::new(m)?.cells()), 0.05)
            .unwrap_err();
        assert_eq!(err, StatsError::DegreesOfFreedomOutOfTable(0));
    }

    #[test]
    fn test_non_integer_outcomes_rejected() {
        let err = chi_squared_goodness_of_fit(&[0.5, 1.0], |m| Ok(Poisson::new(m)?.cells()), 0.05)
            .unwrap_err();
        assert!(matches!(err, StatsError::OutOfDomain(_)));
        assert!(chi_squared_goodness_of_fit(&[-1.0], |_| Ok(vec![1.0]), 0.05).is_err());
    }

    #[test]
    fn test_distribution_errors_propagate() {
        // mean 0 is not a valid Poisson rate
        let err = chi_squared_goodness_of_fit(&[0.0, 0.0], |m| Ok(Poisson::new(m)?.cells()), 0.05)
            .unwrap_err();
        assert!(matches!(err, StatsError::InvalidParameter(_)));
    }

    #[test]
    fn test_untabulated_significance() {
        let err = chi_squared_goodness_of_fit(
            &textbook_counts(),
            |m| Ok(Poisson::new(m)?.cells()),
            0.07,
        )
        .unwrap_err();
        assert_eq!(err, StatsError::SignificanceNotTabulated(0.07));
    }

    #[test]
    fn test_binomial_hypothesis() {
        // successes out of 4 trials; the fitted p is mean / 4
        let mut data = vec![0.0; 10];
        data.extend([1.0; 30]);
        data.extend([2.0; 35]);
        data.extend([3.0; 20]);
        data.extend([4.0; 5]);
        let fit = chi_squared_goodness_of_fit(
            &data,
            |m| Ok(Binomial::new(4, m / 4.0)?.cells()),
            0.05,
        )
        .unwrap();
        assert!(fit.statistic.is_finite());
        assert!(fit.degrees_of_freedom >= 1);
    }

    #[test]
    fn test_sw_three_points_exact() {
        let r = shapiro_wilk_test(&[1.0, 2.0, 4.0]).unwrap();
        assert!((r.w - 27.0 / 28.0).abs() < 1e-12);
        let expected = 1.0 - 6.0 / std::f64::consts::PI * (27.0_f64 / 28.0).sqrt().acos();
        assert!((r.p_value - expected).abs() < 1e-12);
        let r = shapiro_wilk_test(&[1.0, 2.0, 3.0]).unwrap();
        assert!((r.w - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_sw_symmetric_data_accepted() {
        let data = [-2.0, -1.5, -1.0, -0.5, 0.0, 0.0, 0.5, 1.0, 1.5, 2.0];
        let r = shapiro_wilk_test(&data).unwrap();
        assert!(r.w > 0.9, "W = {}", r.w);
        assert!(r.p_value > 0.05, "p = {}", r.p_value);
    }

    #[test]
    fn test_sw_small_samples() {
        for data in [vec![1.0, 2.0, 3.0, 4.0], vec![-1.0, -0.5, 0.0, 0.5, 1.0]] {
            let r = shapiro_wilk_test(&data).unwrap();
            assert!(r.w > 0.0 && r.w <= 1.0, "W = {}", r.w);
            assert!((0.0..=1.0).contains(&r.p_value), "p = {}", r.p_value);
        }
    }

    #[test]
    fn test_sw_bimodal_rejected() {
        let mut data = vec![0.0, 0.1, 0.2, 0.3, 0.4, 0.5];
        data.extend_from_slice(&[9.5, 9.6, 9.7, 9.8, 9.9, 10.0]);
        let r = shapiro_wilk_test(&data).unwrap();
        assert!(r.p_value < 0.01, "p = {}", r.p_value);
    }

    #[test]
    fn test_sw_skewed_rejected() {
        let data = [0.1, 0.2, 0.3, 0.5, 0.8, 1.3, 2.1, 3.4, 5.5, 8.9, 14.4, 23.3];
        let r = shapiro_wilk_test(&data).unwrap();
        assert!(r.p_value < 0.05, "p = {}", r.p_value);
    }

    #[test]
    fn test_sw_normal_quantiles_accepted() {
        let n = 100;
        let data: Vec<f64> = (1..=n)
            .map(|i| special::inverse_normal_cdf((i as f64 - 0.5) / n as f64))
            .collect();
        let r = shapiro_wilk_test(&data).unwrap();
        assert!(r.w > 0.99, "W = {}", r.w);
        assert!(r.p_value > 0.05, "p = {}", r.p_value);
    }

    #[test]
    fn test_sw_invalid_inputs() {
        assert!(matches!(
            shapiro_wilk_test(&[1.0, 2.0]),
            Err(StatsError::InsufficientData { .. })
        ));
        assert!(shapiro_wilk_test(&[5.0, 5.0, 5.0]).is_err());
        assert!(matches!(
            shapiro_wilk_test(&[1.0, f64::NAN, 3.0]),
            Err(StatsError::OutOfDomain(_))
        ));
        let big: Vec<f64> = (0..5001).map(|i| i as f64).collect();
        assert!(shapiro_wilk_test(&big).is_err());
    }
}
