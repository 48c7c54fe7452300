//! Scalar root finding.
//!
//! Both solvers stop as soon as the function evaluates to exactly zero or
//! the bracket/step shrinks below `tolerance`, and report
//! [`StatsError::NoConvergence`] when the iteration budget runs out.

use crate::error::{Result, StatsError};

/// Finds a root of `f` in `[lo, hi]` by interval bisection.
///
/// The caller is responsible for supplying a bracketing interval
/// (`f(lo)` and `f(hi)` of opposite sign); without one the method still
/// terminates but converges to an endpoint.
///
/// # Errors
/// - [`StatsError::InvalidCount`] if `max_iterations == 0`.
/// - [`StatsError::NoConvergence`] if the half-width never drops below
///   `tolerance` within `max_iterations` steps.
///
/// # Examples
/// ```
/// use u_statcore::roots::bisect;
/// let root = bisect(|x| x * x - 2.0, 0.0, 2.0, 100, 1e-12).unwrap();
/// assert!((root - 2.0_f64.sqrt()).abs() < 1e-10);
/// ```
pub fn bisect<F: Fn(f64) -> f64>(
    f: F,
    lo: f64,
    hi: f64,
    max_iterations: usize,
    tolerance: f64,
) -> Result<f64> {
    if max_iterations == 0 {
        return Err(StatsError::InvalidCount {
            name: "max_iterations",
            value: 0,
        });
    }
    let (mut lo, mut hi) = (lo, hi);
    let mut f_lo = f(lo);
    if f_lo == 0.0 {
        return Ok(lo);
    }
    for i in 0..max_iterations {
        let mid = 0.5 * (lo + hi);
        let f_mid = f(mid);
        tracing::trace!(iteration = i, lo, hi, f_mid, "bisect step");
        if f_mid == 0.0 || ((hi - lo) / 2.0).abs() < tolerance {
            return Ok(mid);
        }
        if f_mid.signum() == f_lo.signum() {
            lo = mid;
            f_lo = f_mid;
        } else {
            hi = mid;
        }
    }
    Err(StatsError::NoConvergence {
        method: "bisection",
        iterations: max_iterations,
    })
}

/// Finds a root of `f` with the secant method starting from `x0`, `x1`.
///
/// Converges superlinearly near simple roots but, unlike [`bisect`], is
/// not guaranteed to stay inside any interval.
///
/// # Errors
/// - [`StatsError::InvalidCount`] if `max_iterations == 0`.
/// - [`StatsError::NoConvergence`] when the budget runs out or the secant
///   becomes horizontal (`f(x0) == f(x1)` away from a root).
///
/// # Examples
/// ```
/// use u_statcore::roots::secant;
/// let root = secant(|x| x.cos() - x, 0.0, 1.0, 50, 1e-12).unwrap();
/// assert!((root - 0.7390851332151607).abs() < 1e-9);
/// ```
pub fn secant<F: Fn(f64) -> f64>(
    f: F,
    x0: f64,
    x1: f64,
    max_iterations: usize,
    tolerance: f64,
) -> Result<f64> {
    if max_iterations == 0 {
        return Err(StatsError::InvalidCount {
            name: "max_iterations",
            value: 0,
        });
    }
    let (mut x0, mut x1) = (x0, x1);
    let mut f0 = f(x0);
    for i in 0..max_iterations {
        let f1 = f(x1);
        tracing::trace!(iteration = i, x1, f1, "secant step");
        if f1 == 0.0 || (x1 - x0).abs() < tolerance {
            return Ok(x1);
        }
        let slope = f1 - f0;
        if slope == 0.0 || !slope.is_finite() {
            break;
        }
        let x2 = x1 - f1 * (x1 - x0) / slope;
        x0 = x1;
        f0 = f1;
        x1 = x2;
    }
    Err(StatsError::NoConvergence {
        method: "secant",
        iterations: max_iterations,
    })
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn bisect_finds_linear_root(root in -50.0_f64..50.0, slope in 0.1_f64..10.0) {
            let found = bisect(|x| slope * (x - root), -100.0, 100.0, 200, 1e-10).unwrap();
            prop_assert!((found - root).abs() < 1e-8, "found {found}, expected {root}");
        }
    }
}
