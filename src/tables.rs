//! Chi-squared critical values.
//!
//! Upper-tail critical values `c` with `P(X > c) = α` for the chi-squared
//! distribution, rounded to two decimals. Rows cover 1–30 degrees of
//! freedom and then every ten up to 100; columns are the significance
//! levels in [`SIGNIFICANCE_LEVELS`].
//!
//! The table is a read-only constant consumed by the goodness-of-fit test
//! and [`ChiSquared::critical_value`](crate::distributions::ChiSquared::critical_value).
//! Lookups outside the tabulated grid fail instead of interpolating.

use crate::error::{Result, StatsError};

/// Tabulated significance levels (upper-tail probabilities), by column.
pub const SIGNIFICANCE_LEVELS: [f64; 11] = [
    0.995, 0.99, 0.975, 0.95, 0.9, 0.5, 0.1, 0.05, 0.025, 0.01, 0.005,
];

/// `(degrees of freedom, critical values by column)`.
#[rustfmt::skip]
pub const CHI_SQUARED_CRITICAL_VALUES: [(usize, [f64; 11]); 37] = [
    (1, [0.00, 0.00, 0.00, 0.00, 0.02, 0.45, 2.71, 3.84, 5.02, 6.63, 7.88]),
    (2, [0.01, 0.02, 0.05, 0.10, 0.21, 1.39, 4.61, 5.99, 7.38, 9.21, 10.60]),
    (3, [0.07, 0.11, 0.22, 0.35, 0.58, 2.37, 6.25, 7.81, 9.35, 11.34, 12.84]),
    (4, [0.21, 0.30, 0.48, 0.71, 1.06, 3.36, 7.78, 9.49, 11.14, 13.28, 14.86]),
    (5, [0.41, 0.55, 0.83, 1.15, 1.61, 4.35, 9.24, 11.07, 12.83, 15.09, 16.75]),
    (6, [0.68, 0.87, 1.24, 1.64, 2.20, 5.35, 10.64, 12.59, 14.45, 16.81, 18.55]),
    (7, [0.99, 1.24, 1.69, 2.17, 2.83, 6.35, 12.02, 14.07, 16.01, 18.48, 20.28]),
    (8, [1.34, 1.65, 2.18, 2.73, 3.49, 7.34, 13.36, 15.51, 17.53, 20.09, 21.95]),
    (9, [1.73, 2.09, 2.70, 3.33, 4.17, 8.34, 14.68, 16.92, 19.02, 21.67, 23.59]),
    (10, [2.16, 2.56, 3.25, 3.94, 4.87, 9.34, 15.99, 18.31, 20.48, 23.21, 25.19]),
    (11, [2.60, 3.05, 3.82, 4.57, 5.58, 10.34, 17.28, 19.68, 21.92, 24.72, 26.76]),
    (12, [3.07, 3.57, 4.40, 5.23, 6.30, 11.34, 18.55, 21.03, 23.34, 26.22, 28.30]),
    (13, [3.57, 4.11, 5.01, 5.89, 7.04, 12.34, 19.81, 22.36, 24.74, 27.69, 29.82]),
    (14, [4.07, 4.66, 5.63, 6.57, 7.79, 13.34, 21.06, 23.68, 26.12, 29.14, 31.32]),
    (15, [4.60, 5.23, 6.26, 7.26, 8.55, 14.34, 22.31, 25.00, 27.49, 30.58, 32.80]),
    (16, [5.14, 5.81, 6.91, 7.96, 9.31, 15.34, 23.54, 26.30, 28.85, 32.00, 34.27]),
    (17, [5.70, 6.41, 7.56, 8.67, 10.09, 16.34, 24.77, 27.59, 30.19, 33.41, 35.72]),
    (18, [6.26, 7.01, 8.23, 9.39, 10.86, 17.34, 25.99, 28.87, 31.53, 34.81, 37.16]),
    (19, [6.84, 7.63, 8.91, 10.12, 11.65, 18.34, 27.20, 30.14, 32.85, 36.19, 38.58]),
    (20, [7.43, 8.26, 9.59, 10.85, 12.44, 19.34, 28.41, 31.41, 34.17, 37.57, 40.00]),
    (21, [8.03, 8.90, 10.28, 11.59, 13.24, 20.34, 29.62, 32.67, 35.48, 38.93, 41.40]),
    (22, [8.64, 9.54, 10.98, 12.34, 14.04, 21.34, 30.81, 33.92, 36.78, 40.29, 42.80]),
    (23, [9.26, 10.20, 11.69, 13.09, 14.85, 22.34, 32.01, 35.17, 38.08, 41.64, 44.18]),
    (24, [9.89, 10.86, 12.40, 13.85, 15.66, 23.34, 33.20, 36.42, 39.36, 42.98, 45.56]),
    (25, [10.52, 11.52, 13.12, 14.61, 16.47, 24.34, 34.38, 37.65, 40.65, 44.31, 46.93]),
    (26, [11.16, 12.20, 13.84, 15.38, 17.29, 25.34, 35.56, 38.89, 41.92, 45.64, 48.29]),
    (27, [11.81, 12.88, 14.57, 16.15, 18.11, 26.34, 36.74, 40.11, 43.19, 46.96, 49.64]),
    (28, [12.46, 13.56, 15.31, 16.93, 18.94, 27.34, 37.92, 41.34, 44.46, 48.28, 50.99]),
    (29, [13.12, 14.26, 16.05, 17.71, 19.77, 28.34, 39.09, 42.56, 45.72, 49.59, 52.34]),
    (30, [13.79, 14.95, 16.79, 18.49, 20.60, 29.34, 40.26, 43.77, 46.98, 50.89, 53.67]),
    (40, [20.71, 22.16, 24.43, 26.51, 29.05, 39.34, 51.81, 55.76, 59.34, 63.69, 66.77]),
    (50, [27.99, 29.71, 32.36, 34.76, 37.69, 49.33, 63.17, 67.50, 71.42, 76.15, 79.49]),
    (60, [35.53, 37.48, 40.48, 43.19, 46.46, 59.33, 74.40, 79.08, 83.30, 88.38, 91.95]),
    (70, [43.28, 45.44, 48.76, 51.74, 55.33, 69.33, 85.53, 90.53, 95.02, 100.43, 104.21]),
    (80, [51.17, 53.54, 57.15, 60.39, 64.28, 79.33, 96.58, 101.88, 106.63, 112.33, 116.32]),
    (90, [59.20, 61.75, 65.65, 69.13, 73.29, 89.33, 107.57, 113.15, 118.14, 124.12, 128.30]),
    (100, [67.33, 70.06, 74.22, 77.93, 82.36, 99.33, 118.50, 124.34, 129.56, 135.81, 140.17]),
];

/// Looks up the critical value for `degrees_of_freedom` at `significance`.
///
/// # Errors
/// - [`StatsError::DegreesOfFreedomOutOfTable`] if the row is not tabulated.
/// - [`StatsError::SignificanceNotTabulated`] if the column is not tabulated.
///
/// # Examples
/// ```
/// use u_statcore::tables::chi_squared_critical_value;
/// assert_eq!(chi_squared_critical_value(1, 0.05).unwrap(), 3.84);
/// assert!(chi_squared_critical_value(31, 0.05).is_err());
/// ```
pub fn chi_squared_critical_value(degrees_of_freedom: usize, significance: f64) -> Result<f64> {
    let column = SIGNIFICANCE_LEVELS
        .iter()
        .position(|&level| level == significance)
        .ok_or(StatsError::SignificanceNotTabulated(significance))?;
    let (_, row) = CHI_SQUARED_CRITICAL_VALUES
        .iter()
        .find(|(df, _)| *df == degrees_of_freedom)
        .ok_or(StatsError::DegreesOfFreedomOutOfTable(degrees_of_freedom))?;
    Ok(row[column])
}
