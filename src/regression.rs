//! Simple (one-predictor) least-squares regression.
//!
//! # Examples
//!
//! ```
//! use u_statcore::regression::{linear_regression, r_squared};
//!
//! let points = [(1.0, 3.0), (2.0, 5.0), (3.0, 7.0)];
//! let line = linear_regression(&points).unwrap();
//! assert!((line.slope - 2.0).abs() < 1e-12);
//! assert!((line.predict(4.0) - 9.0).abs() < 1e-12);
//! assert!((r_squared(&points, &line).unwrap() - 1.0).abs() < 1e-12);
//! ```

use crate::distributions::StudentsT;
use crate::error::{Result, StatsError};
use crate::stats;

/// A fitted line `y = slope · x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub slope: f64,
    pub intercept: f64,
}

impl Line {
    /// Value of the line at `x`.
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    pub fn predict_all(&self, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| self.predict(x)).collect()
    }
}

fn require_points(operation: &'static str, points: &[(f64, f64)], required: usize) -> Result<()> {
    if points.len() < required {
        return Err(StatsError::InsufficientData {
            operation,
            required,
            actual: points.len(),
        });
    }
    Ok(())
}

/// Centered sums (x̄, ȳ, Sxx, Sxy).
fn moments(points: &[(f64, f64)]) -> Result<(f64, f64, f64, f64)> {
    let xs: Vec<f64> = points.iter().map(|p| p.0).collect();
    let ys: Vec<f64> = points.iter().map(|p| p.1).collect();
    let x_bar = stats::mean(&xs)?;
    let y_bar = stats::mean(&ys)?;
    let sxx = stats::sum(&xs.iter().map(|x| (x - x_bar).powi(2)).collect::<Vec<_>>());
    let sxy = stats::sum(
        &points
            .iter()
            .map(|(x, y)| (x - x_bar) * (y - y_bar))
            .collect::<Vec<_>>(),
    );
    Ok((x_bar, y_bar, sxx, sxy))
}

/// Least-squares line through `points`.
///
/// A single point yields the horizontal line through it. Points sharing
/// one x value leave the slope undefined (`NaN`).
///
/// # Errors
/// [`StatsError::InsufficientData`] for an empty input.
pub fn linear_regression(points: &[(f64, f64)]) -> Result<Line> {
    require_points("linear regression", points, 1)?;
    if points.len() == 1 {
        return Ok(Line {
            slope: 0.0,
            intercept: points[0].1,
        });
    }
    let (x_bar, y_bar, sxx, sxy) = moments(points)?;
    let slope = sxy / sxx;
    Ok(Line {
        slope,
        intercept: y_bar - slope * x_bar,
    })
}

/// Coefficient of determination of `line` over `points`.
///
/// Fewer than two points fit any line perfectly and give `1.0`, as do
/// points with no spread in y lying exactly on the line.
///
/// # Errors
/// [`StatsError::InsufficientData`] for an empty input.
pub fn r_squared(points: &[(f64, f64)], line: &Line) -> Result<f64> {
    require_points("r squared", points, 1)?;
    if points.len() < 2 {
        return Ok(1.0);
    }
    let ys: Vec<f64> = points.iter().map(|p| p.1).collect();
    let y_bar = stats::mean(&ys)?;
    let total = stats::sum(&ys.iter().map(|y| (y - y_bar).powi(2)).collect::<Vec<_>>());
    let residual = stats::sum(
        &points
            .iter()
            .map(|&(x, y)| (y - line.predict(x)).powi(2))
            .collect::<Vec<_>>(),
    );
    if total == 0.0 && residual == 0.0 {
        // horizontal data on a horizontal line
        return Ok(1.0);
    }
    Ok(1.0 - residual / total)
}

/// Coefficient estimates with their sampling uncertainty.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coefficient {
    pub estimate: f64,
    pub standard_error: f64,
    /// `estimate / standard_error`.
    pub t_statistic: f64,
    /// Two-tailed p-value of H₀: coefficient = 0.
    pub p_value: f64,
}

/// Inference summary of a simple linear regression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegressionSummary {
    pub line: Line,
    pub slope: Coefficient,
    pub intercept: Coefficient,
    /// √(SSE / (n − 2)).
    pub residual_standard_error: f64,
    pub degrees_of_freedom: f64,
    pub r_squared: f64,
}

/// Fits a line and derives standard errors, t statistics and p-values for
/// both coefficients.
///
/// # Algorithm
/// With s = √(SSE / (n − 2)):
/// - SE(slope) = s / √Sxx
/// - SE(intercept) = s · √(1/n + x̄² / Sxx)
///
/// # Errors
/// [`StatsError::InsufficientData`] for fewer than 3 points.
///
/// # Examples
/// ```
/// use u_statcore::regression::regression_summary;
/// let points = [(1.0, 2.0), (2.0, 4.0), (3.0, 5.0), (4.0, 4.0), (5.0, 5.0)];
/// let s = regression_summary(&points).unwrap();
/// assert!((s.line.slope - 0.6).abs() < 1e-12);
/// assert!((s.r_squared - 0.6).abs() < 1e-12);
/// ```
pub fn regression_summary(points: &[(f64, f64)]) -> Result<RegressionSummary> {
    require_points("regression summary", points, 3)?;
    let line = linear_regression(points)?;
    let (x_bar, _, sxx, _) = moments(points)?;
    let n = points.len() as f64;
    let df = n - 2.0;

    let sse = stats::sum(
        &points
            .iter()
            .map(|&(x, y)| (y - line.predict(x)).powi(2))
            .collect::<Vec<_>>(),
    );
    let s = (sse / df).sqrt();
    let t_dist = StudentsT::new(df)?;
    let coefficient = |estimate: f64, standard_error: f64| {
        let t_statistic = estimate / standard_error;
        Coefficient {
            estimate,
            standard_error,
            t_statistic,
            p_value: t_dist.two_tailed_p(t_statistic),
        }
    };

    Ok(RegressionSummary {
        line,
        slope: coefficient(line.slope, s / sxx.sqrt()),
        intercept: coefficient(line.intercept, s * (1.0 / n + x_bar * x_bar / sxx).sqrt()),
        residual_standard_error: s,
        degrees_of_freedom: df,
        r_squared: r_squared(points, &line)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collinear_round_trip() {
        let points = [(-2.0, -3.0), (0.0, 1.0), (1.5, 4.0), (4.0, 9.0)];
        let line = linear_regression(&points).unwrap();
        for &(x, y) in &points {
            assert!((line.predict(x) - y).abs() < 1e-12);
        }
        assert!((r_squared(&points, &line).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_horizontal_line_fits_perfectly() {
        let points = [(1.0, 5.0), (2.0, 5.0), (3.0, 5.0)];
        let line = linear_regression(&points).unwrap();
        assert_eq!(line.slope, 0.0);
        assert_eq!(line.intercept, 5.0);
        assert_eq!(r_squared(&points, &line).unwrap(), 1.0);
    }

    #[test]
    fn test_single_point() {
        let line = linear_regression(&[(3.0, 7.0)]).unwrap();
        assert_eq!(line, Line { slope: 0.0, intercept: 7.0 });
        assert_eq!(r_squared(&[(3.0, 7.0)], &line).unwrap(), 1.0);
    }

    #[test]
    fn test_empty() {
        assert!(matches!(
            linear_regression(&[]),
            Err(StatsError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_vertical_points_give_nan_slope() {
        let line = linear_regression(&[(1.0, 2.0), (1.0, 3.0)]).unwrap();
        assert!(line.slope.is_nan());
    }

    #[test]
    fn test_summary_known_values() {
        let points = [(1.0, 2.0), (2.0, 4.0), (3.0, 5.0), (4.0, 4.0), (5.0, 5.0)];
        let s = regression_summary(&points).unwrap();
        assert!((s.line.intercept - 2.2).abs() < 1e-12);
        assert!((s.residual_standard_error - 0.8_f64.sqrt()).abs() < 1e-12);
        assert!((s.slope.standard_error - 0.28284271247461906).abs() < 1e-12);
        assert!((s.slope.t_statistic - 2.1213203435596424).abs() < 1e-10);
        assert!((s.slope.p_value - 0.124027062657555).abs() < 1e-8);
        assert!((s.intercept.standard_error - 0.938083151964686).abs() < 1e-12);
        assert!((s.intercept.p_value - 0.10074345608542).abs() < 1e-8);
        assert_eq!(s.degrees_of_freedom, 3.0);
    }

    #[test]
    fn test_summary_needs_three_points() {
        assert!(regression_summary(&[(0.0, 0.0), (1.0, 1.0)]).is_err());
    }

    #[test]
    fn test_predict_all() {
        let line = Line { slope: 2.0, intercept: -1.0 };
        assert_eq!(line.predict_all(&[0.0, 1.0, 2.5]), vec![-1.0, 1.0, 4.0]);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn exact_lines_recovered(
            slope in -10.0_f64..10.0,
            intercept in -10.0_f64..10.0,
            xs in proptest::collection::btree_set(-100_i32..100, 2..20),
        ) {
            let points: Vec<(f64, f64)> = xs
                .iter()
                .map(|&x| (x as f64, slope * x as f64 + intercept))
                .collect();
            let line = linear_regression(&points).unwrap();
            prop_assert!((line.slope - slope).abs() < 1e-8);
            prop_assert!((line.intercept - intercept).abs() < 1e-6);
        }

        #[test]
        fn r_squared_at_most_one(
            points in proptest::collection::vec((-50.0_f64..50.0, -50.0_f64..50.0), 3..30),
        ) {
            let line = linear_regression(&points).unwrap();
            let r2 = r_squared(&points, &line).unwrap();
            if r2.is_finite() {
                prop_assert!(r2 <= 1.0 + 1e-12);
            }
        }
    }
}
