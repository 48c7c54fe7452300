//! Special mathematical functions.
//!
//! Numerical approximations of the gamma, beta, and error functions used
//! by the distributions and hypothesis tests in this crate.
//!
//! Undefined points do not raise errors: Γ at zero or a negative integer is
//! `NaN`, `inverse_erf(±1)` is `±∞`, and NaN inputs propagate.

use crate::integrate;

/// 1/√(2π) ≈ 0.3989422804014327
const FRAC_1_SQRT_2PI: f64 = 0.3989422804014326779399460599343818684758586311649;

/// Largest `n` for which `n!` is finite in `f64`.
const MAX_FACTORIAL: u32 = 170;

/// Factorial `n! = 1 · 2 · … · n`, with `0! = 1`.
///
/// Returns `f64::INFINITY` once `n!` exceeds `f64::MAX` (n > 170).
///
/// # Examples
/// ```
/// use u_statcore::special::factorial;
/// assert_eq!(factorial(0), 1.0);
/// assert_eq!(factorial(5), 120.0);
/// ```
pub fn factorial(n: u32) -> f64 {
    if n > MAX_FACTORIAL {
        return f64::INFINITY;
    }
    (2..=n).fold(1.0, |acc, k| acc * k as f64)
}

/// Gamma function Γ(x).
///
/// # Algorithm
/// - Positive integers: exact, Γ(n) = (n−1)!.
/// - Zero and negative integers: `NaN` (poles).
/// - Negative non-integers: reflection Γ(x) = π / (sin(πx) · Γ(1−x)).
/// - Otherwise: `exp(ln_gamma(x))`.
///
/// # Examples
/// ```
/// use u_statcore::special::gamma;
/// assert_eq!(gamma(5.0), 24.0);
/// assert!((gamma(0.5) - std::f64::consts::PI.sqrt()).abs() < 1e-10);
/// assert!(gamma(0.0).is_nan());
/// ```
pub fn gamma(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    if x.fract() == 0.0 {
        if x <= 0.0 {
            return f64::NAN;
        }
        if x > (MAX_FACTORIAL + 1) as f64 {
            return f64::INFINITY;
        }
        return factorial(x as u32 - 1);
    }
    if x < 0.0 {
        let pi = std::f64::consts::PI;
        return pi / ((pi * x).sin() * gamma(1.0 - x));
    }
    ln_gamma(x).exp()
}

/// Lanczos approximation of ln |Γ(x)|.
///
/// Valid for arguments far beyond the range where Γ itself overflows,
/// which is what the beta function and the t/F densities rely on.
///
/// Reference: Lanczos (1964), "A Precision Approximation of the Gamma
/// Function", *SIAM Journal on Numerical Analysis* 1(1).
///
/// # Accuracy
/// Relative error < 2 × 10⁻¹⁰ for x > 0.
///
/// # Examples
/// ```
/// use u_statcore::special::ln_gamma;
/// assert!((ln_gamma(5.0) - 24.0_f64.ln()).abs() < 1e-10);
/// assert!(ln_gamma(500.0).is_finite());
/// ```
pub fn ln_gamma(x: f64) -> f64 {
    #[allow(clippy::excessive_precision)]
    const COEFFICIENTS: [f64; 9] = [
        0.99999999999980993,
        676.5203681218851,
        -1259.1392167224028,
        771.32342877765313,
        -176.61502916214059,
        12.507343278686905,
        -0.13857109526572012,
        9.9843695780195716e-6,
        1.5056327351493116e-7,
    ];
    const G: f64 = 7.0;

    if x.is_nan() {
        return f64::NAN;
    }
    if x < 0.5 {
        let pi = std::f64::consts::PI;
        return (pi / (pi * x).sin()).abs().ln() - ln_gamma(1.0 - x);
    }

    let x = x - 1.0;
    let mut sum = COEFFICIENTS[0];
    for (i, &c) in COEFFICIENTS[1..].iter().enumerate() {
        sum += c / (x + i as f64 + 1.0);
    }

    let t = x + G + 0.5;
    0.5 * (2.0 * std::f64::consts::PI).ln() + (x + 0.5) * t.ln() - t + sum.ln()
}

// ============================================================================
// Beta Functions
// ============================================================================

/// Log of the Beta function: `ln B(a, b) = ln Γ(a) + ln Γ(b) − ln Γ(a+b)`.
pub fn ln_beta(a: f64, b: f64) -> f64 {
    ln_gamma(a) + ln_gamma(b) - ln_gamma(a + b)
}

/// Complete Beta function B(a, b) = Γ(a)Γ(b)/Γ(a+b).
///
/// # Examples
/// ```
/// use u_statcore::special::beta;
/// assert!((beta(2.0, 3.0) - 1.0 / 12.0).abs() < 1e-12);
/// ```
pub fn beta(a: f64, b: f64) -> f64 {
    ln_beta(a, b).exp()
}

/// Incomplete Beta function B(x; a, b) = ∫₀ˣ t^(a−1) (1−t)^(b−1) dt.
///
/// # Algorithm
/// Adaptive Simpson quadrature after the substitution `u = tᵃ`, which
/// turns the integrand into `(1 − u^(1/a))^(b−1) / a` on `[0, xᵃ]` and
/// removes the endpoint singularity at 0 when `a < 1`. The tolerance is
/// relative to a coarse first estimate so tiny tail masses keep their
/// significant digits.
///
/// # Returns
/// - `0.0` for `x ≤ 0`, `B(a, b)` for `x ≥ 1`.
/// - `NaN` if `a ≤ 0`, `b ≤ 0`, or any input is NaN.
pub fn incomplete_beta(x: f64, a: f64, b: f64) -> f64 {
    if x.is_nan() || a.is_nan() || b.is_nan() || a <= 0.0 || b <= 0.0 {
        return f64::NAN;
    }
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return beta(a, b);
    }
    let upper = x.powf(a);
    let inv_a = 1.0 / a;
    let integrand = |u: f64| (1.0 - u.powf(inv_a)).powf(b - 1.0);
    let coarse = upper / 6.0 * (integrand(0.0) + 4.0 * integrand(0.5 * upper) + integrand(upper));
    let tolerance = 1e-12 * coarse.abs().max(f64::MIN_POSITIVE);
    integrate::adaptive_simpson(integrand, 0.0, upper, tolerance, integrate::DEFAULT_MAX_DEPTH)
        * inv_a
}

/// Regularized incomplete beta function I_x(a, b) = B(x; a, b) / B(a, b).
///
/// # Algorithm
/// [`incomplete_beta`] divided by the complete Beta function, evaluated in
/// log space. The symmetry `I_x(a, b) = 1 − I_{1−x}(b, a)` keeps the
/// integration range on the side of the mode that converges fastest.
///
/// # Examples
/// ```
/// use u_statcore::special::regularized_incomplete_beta;
/// assert_eq!(regularized_incomplete_beta(0.0, 2.0, 3.0), 0.0);
/// assert_eq!(regularized_incomplete_beta(1.0, 2.0, 3.0), 1.0);
/// assert!((regularized_incomplete_beta(0.5, 1.0, 1.0) - 0.5).abs() < 1e-10);
/// ```
pub fn regularized_incomplete_beta(x: f64, a: f64, b: f64) -> f64 {
    if x.is_nan() || a.is_nan() || b.is_nan() || a <= 0.0 || b <= 0.0 {
        return f64::NAN;
    }
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }
    if x > (a + 1.0) / (a + b + 2.0) {
        return 1.0 - regularized_incomplete_beta(1.0 - x, b, a);
    }
    let partial = incomplete_beta(x, a, b);
    if partial <= 0.0 {
        return 0.0;
    }
    (partial.ln() - ln_beta(a, b)).exp().min(1.0)
}

// ============================================================================
// Regularized Lower Incomplete Gamma Function
// ============================================================================

/// Regularized lower incomplete gamma function P(a, x) = γ(a, x) / Γ(a).
///
/// # Algorithm
/// Series expansion for `x < a + 1`, continued fraction otherwise.
///
/// Reference: Press et al. (2007), *Numerical Recipes*, 3rd ed., §6.2.
///
/// # Examples
/// ```
/// use u_statcore::special::regularized_lower_gamma;
/// let p = regularized_lower_gamma(1.0, 2.0);
/// assert!((p - (1.0 - (-2.0_f64).exp())).abs() < 1e-10);
/// ```
pub fn regularized_lower_gamma(a: f64, x: f64) -> f64 {
    if x.is_nan() || a.is_nan() || a <= 0.0 {
        return f64::NAN;
    }
    if x <= 0.0 {
        return 0.0;
    }
    if x < a + 1.0 {
        gamma_series(a, x)
    } else {
        1.0 - gamma_cf(a, x)
    }
}

fn gamma_series(a: f64, x: f64) -> f64 {
    let mut term = 1.0 / a;
    let mut sum = term;
    let mut ap = a;
    for _ in 0..500 {
        ap += 1.0;
        term *= x / ap;
        sum += term;
        if term.abs() < sum.abs() * 1e-15 {
            break;
        }
    }
    sum * (-x + a * x.ln() - ln_gamma(a)).exp()
}

/// Continued fraction for the upper tail Q(a, x) = 1 − P(a, x) (modified Lentz).
fn gamma_cf(a: f64, x: f64) -> f64 {
    const TINY: f64 = 1e-300;
    let mut b = x + 1.0 - a;
    let mut c = 1.0 / TINY;
    let mut d = 1.0 / b;
    let mut h = d;
    for i in 1..=500 {
        let an = -(i as f64) * (i as f64 - a);
        b += 2.0;
        d = an * d + b;
        if d.abs() < TINY {
            d = TINY;
        }
        c = b + an / c;
        if c.abs() < TINY {
            c = TINY;
        }
        d = 1.0 / d;
        let delta = d * c;
        h *= delta;
        if (delta - 1.0).abs() < 1e-15 {
            break;
        }
    }
    h * (-x + a * x.ln() - ln_gamma(a)).exp()
}

// ============================================================================
// Error Function
// ============================================================================

/// Error function erf(x) = (2/√π) ∫₀ˣ exp(−t²) dt.
///
/// # Algorithm
/// Chebyshev fit to the complementary error function.
///
/// Reference: Press et al. (1992), *Numerical Recipes in C*, 2nd ed.,
/// §6.2, `erfcc`.
///
/// # Accuracy
/// Fractional error < 1.2 × 10⁻⁷ everywhere.
///
/// # Examples
/// ```
/// use u_statcore::special::erf;
/// assert!(erf(0.0).abs() < 1e-7);
/// assert!((erf(1.0) - 0.8427007929).abs() < 1e-6);
/// ```
pub fn erf(x: f64) -> f64 {
    1.0 - erfc(x)
}

/// Complementary error function erfc(x) = 1 − erf(x).
///
/// Evaluated directly, so the upper tail keeps relative accuracy instead of
/// cancelling to zero.
pub fn erfc(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    let z = x.abs();
    let t = 1.0 / (1.0 + 0.5 * z);
    let poly = -z * z - 1.26551223
        + t * (1.00002368
            + t * (0.37409196
                + t * (0.09678418
                    + t * (-0.18628806
                        + t * (0.27886807
                            + t * (-1.13520398
                                + t * (1.48851587 + t * (-0.82215223 + t * 0.17087277))))))));
    let tail = t * poly.exp();
    if x >= 0.0 {
        tail
    } else {
        2.0 - tail
    }
}

/// Inverse error function: returns `y` such that `erf(y) = x`.
///
/// # Algorithm
/// Closed-form approximation with `a = 8(π − 3) / (3π(4 − π))`; no
/// iteration.
///
/// Reference: Winitzki (2008), "A handy approximation for the error
/// function and its inverse".
///
/// # Accuracy
/// Relative error about 2 × 10⁻³.
///
/// # Returns
/// - `±∞` at `x = ±1`, `NaN` for `|x| > 1` or NaN.
///
/// # Examples
/// ```
/// use u_statcore::special::{erf, inverse_erf};
/// let y = inverse_erf(0.5);
/// assert!((erf(y) - 0.5).abs() < 2e-3);
/// ```
pub fn inverse_erf(x: f64) -> f64 {
    if x.is_nan() || x.abs() > 1.0 {
        return f64::NAN;
    }
    if x == 1.0 {
        return f64::INFINITY;
    }
    if x == -1.0 {
        return f64::NEG_INFINITY;
    }
    let pi = std::f64::consts::PI;
    let a = 8.0 * (pi - 3.0) / (3.0 * pi * (4.0 - pi));
    let ln_term = (1.0 - x * x).ln();
    let half = 2.0 / (pi * a) + ln_term / 2.0;
    let magnitude = ((half * half - ln_term / a).sqrt() - half).sqrt();
    if x >= 0.0 {
        magnitude
    } else {
        -magnitude
    }
}

// ============================================================================
// Standard Normal
// ============================================================================

/// Standard normal PDF φ(x) = (1/√(2π)) exp(−x²/2).
///
/// # Examples
/// ```
/// use u_statcore::special::standard_normal_pdf;
/// assert!((standard_normal_pdf(0.0) - 0.3989422804014327).abs() < 1e-15);
/// ```
pub fn standard_normal_pdf(x: f64) -> f64 {
    FRAC_1_SQRT_2PI * (-0.5 * x * x).exp()
}

/// Standard normal CDF Φ(x) = ½ · erfc(−x/√2).
///
/// # Examples
/// ```
/// use u_statcore::special::standard_normal_cdf;
/// assert!((standard_normal_cdf(0.0) - 0.5).abs() < 1e-7);
/// assert!((standard_normal_cdf(1.96) - 0.975).abs() < 1e-3);
/// ```
pub fn standard_normal_cdf(x: f64) -> f64 {
    if x == f64::INFINITY {
        return 1.0;
    }
    if x == f64::NEG_INFINITY {
        return 0.0;
    }
    0.5 * erfc(-x / std::f64::consts::SQRT_2)
}

/// Inverse standard normal CDF (probit): returns `z` with Φ(z) = p.
///
/// # Algorithm
/// Rational approximation in three regimes: a central region
/// `0.02425 ≤ p ≤ 0.97575` and two tail regions using `√(−2 ln q)`.
///
/// Reference: Acklam (2003), "An algorithm for computing the inverse
/// normal cumulative distribution function".
///
/// # Accuracy
/// Relative error < 1.15 × 10⁻⁹ over the full open interval.
///
/// # Returns
/// - `NaN` if `p` is outside `[0, 1]` or NaN.
/// - `−∞` at `p = 0`, `+∞` at `p = 1`.
///
/// # Examples
/// ```
/// use u_statcore::special::inverse_normal_cdf;
/// assert!(inverse_normal_cdf(0.5).abs() < 1e-9);
/// assert!((inverse_normal_cdf(0.975) - 1.959963984540054).abs() < 1e-8);
/// ```
pub fn inverse_normal_cdf(p: f64) -> f64 {
    const A: [f64; 6] = [
        -3.969683028665376e+01,
        2.209460984245205e+02,
        -2.759285104469687e+02,
        1.383577518672690e+02,
        -3.066479806614716e+01,
        2.506628277459239e+00,
    ];
    const B: [f64; 5] = [
        -5.447609879822406e+01,
        1.615858368580409e+02,
        -1.556989798598866e+02,
        6.680131188771972e+01,
        -1.328068155288572e+01,
    ];
    const C: [f64; 6] = [
        -7.784894002430293e-03,
        -3.223964580411365e-01,
        -2.400758277161838e+00,
        -2.549732539343734e+00,
        4.374664141464968e+00,
        2.938163982698783e+00,
    ];
    const D: [f64; 4] = [
        7.784695709041462e-03,
        3.224671290700398e-01,
        2.445134137142996e+00,
        3.754408661907416e+00,
    ];
    const P_LOW: f64 = 0.02425;
    const P_HIGH: f64 = 1.0 - P_LOW;

    if p.is_nan() || !(0.0..=1.0).contains(&p) {
        return f64::NAN;
    }
    if p == 0.0 {
        return f64::NEG_INFINITY;
    }
    if p == 1.0 {
        return f64::INFINITY;
    }

    let tail = |q: f64| {
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    };

    if p < P_LOW {
        tail((-2.0 * p.ln()).sqrt())
    } else if p <= P_HIGH {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        -tail((-2.0 * (1.0 - p).ln()).sqrt())
    }
}

/// Probit: the quantile function of the standard normal, `Φ⁻¹(p)`.
///
/// Alias of [`inverse_normal_cdf`].
pub fn probit(p: f64) -> f64 {
    inverse_normal_cdf(p)
}

/// Logit: `ln(p / (1 − p))`. `NaN` outside `[0, 1]`, `±∞` at the bounds.
///
/// # Examples
/// ```
/// use u_statcore::special::logit;
/// assert_eq!(logit(0.5), 0.0);
/// ```
pub fn logit(p: f64) -> f64 {
    if p.is_nan() || !(0.0..=1.0).contains(&p) {
        return f64::NAN;
    }
    (p / (1.0 - p)).ln()
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(300))]

        #[test]
        fn normal_cdf_in_zero_one(x in -10.0_f64..10.0) {
            let c = standard_normal_cdf(x);
            prop_assert!((0.0..=1.0).contains(&c), "Φ({x}) = {c}");
        }

        #[test]
        fn inverse_normal_roundtrip(p in 0.0001_f64..0.9999) {
            let z = inverse_normal_cdf(p);
            let back = standard_normal_cdf(z);
            prop_assert!((back - p).abs() < 1e-6, "Φ(Φ⁻¹({p})) = {back}");
        }

        #[test]
        fn inc_beta_complementary(x in 0.01_f64..0.99, a in 0.5_f64..10.0, b in 0.5_f64..10.0) {
            let ix = regularized_incomplete_beta(x, a, b);
            let i1x = regularized_incomplete_beta(1.0 - x, b, a);
            prop_assert!((ix + i1x - 1.0).abs() < 1e-8, "{ix} + {i1x} != 1");
        }

        #[test]
        fn inc_beta_in_01(x in 0.0_f64..=1.0, a in 0.2_f64..20.0, b in 0.2_f64..20.0) {
            let r = regularized_incomplete_beta(x, a, b);
            prop_assert!((0.0..=1.0).contains(&r), "I_{x}({a},{b}) = {r}");
        }

        #[test]
        fn gamma_recurrence(x in 0.1_f64..20.0) {
            prop_assume!(x.fract() != 0.0);
            // Γ(x + 1) = x Γ(x)
            let lhs = gamma(x + 1.0);
            let rhs = x * gamma(x);
            prop_assert!(((lhs - rhs) / rhs).abs() < 1e-9, "Γ({x}+1) = {lhs}, xΓ(x) = {rhs}");
        }

        #[test]
        fn erf_odd_symmetry(x in 0.0_f64..5.0) {
            prop_assert!((erf(x) + erf(-x)).abs() < 1e-7);
        }
    }
}
