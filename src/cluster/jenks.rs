//! Class breaks for choropleth-style binning.
//!
//! - [`jenks`]: Jenks natural breaks, minimizing within-class variance.
//! - [`equal_interval_breaks`]: evenly spaced breaks over the data range.

use crate::error::Result;
use crate::quantile::numeric_sort;
use crate::stats;

/// Jenks natural breaks into `classes` classes.
///
/// Returns `classes + 1` break values: the minimum, the lower limit of
/// each class after the first, and the maximum.
///
/// # Algorithm
/// Fisher–Jenks dynamic program over an `(n + 1) × (classes + 1)` pair of
/// matrices: `variance[l][j]` is the smallest total within-class variance
/// of the first `l` sorted values split into `j` classes, and
/// `lower[l][j]` the 1-based start of the last class in that split.
/// Breaks are recovered by walking `lower` back from `(n, classes)`.
///
/// Reference: Jenks (1977), "Optimal data classification for choropleth
/// maps", University of Kansas Occasional Paper 2.
///
/// # Errors
/// - [`StatsError::InvalidCount`](crate::StatsError::InvalidCount) for
///   zero classes.
/// - [`StatsError::TooManyClusters`](crate::StatsError::TooManyClusters)
///   when `classes > data.len()`.
///
/// # Examples
/// ```
/// use u_statcore::cluster::jenks;
/// let breaks = jenks(&[1.0, 2.0, 4.0, 5.0, 7.0, 9.0, 10.0, 20.0], 3).unwrap();
/// assert_eq!(breaks, vec![1.0, 7.0, 20.0, 20.0]);
/// ```
pub fn jenks(data: &[f64], classes: usize) -> Result<Vec<f64>> {
    super::check_cluster_count(classes, data.len())?;
    let sorted = numeric_sort(data);
    let lower = lower_class_limits(&sorted, classes);

    let n = sorted.len();
    let mut breaks = vec![0.0; classes + 1];
    breaks[classes] = sorted[n - 1];
    let mut k = n;
    for class in (1..=classes).rev() {
        let limit = lower[k][class];
        breaks[class - 1] = sorted[limit - 1];
        k = limit - 1;
    }
    Ok(breaks)
}

/// Fills the lower-class-limit matrix of the Jenks program.
///
/// A single value cannot be split into two or more classes, so those
/// cells start at infinite variance; every backtracking step then lands on
/// a limit of at least 1.
fn lower_class_limits(sorted: &[f64], classes: usize) -> Vec<Vec<usize>> {
    let n = sorted.len();
    let mut lower = vec![vec![0_usize; classes + 1]; n + 1];
    let mut variance = vec![vec![0.0_f64; classes + 1]; n + 1];

    for j in 1..=classes {
        lower[1][j] = 1;
        variance[1][j] = if j == 1 { 0.0 } else { f64::INFINITY };
        for row in variance.iter_mut().skip(2) {
            row[j] = f64::INFINITY;
        }
    }

    for l in 2..=n {
        let (mut sum, mut sum_sq, mut w) = (0.0, 0.0, 0.0);
        let mut class_variance = 0.0;
        for m in 1..=l {
            let limit = l - m + 1;
            let value = sorted[limit - 1];
            w += 1.0;
            sum += value;
            sum_sq += value * value;
            class_variance = sum_sq - sum * sum / w;
            let before = limit - 1;
            if before != 0 {
                for j in 2..=classes {
                    let candidate = class_variance + variance[before][j - 1];
                    if variance[l][j] >= candidate {
                        lower[l][j] = limit;
                        variance[l][j] = candidate;
                    }
                }
            }
        }
        lower[l][1] = 1;
        variance[l][1] = class_variance;
    }
    lower
}

/// `classes + 1` evenly spaced breaks from the minimum to the maximum.
///
/// Inputs with fewer than two values are returned unchanged.
///
/// # Errors
/// [`StatsError::InvalidCount`](crate::StatsError::InvalidCount) for zero
/// classes.
///
/// # Examples
/// ```
/// use u_statcore::cluster::equal_interval_breaks;
/// assert_eq!(
///     equal_interval_breaks(&[1.0, 9.0, 5.0], 4).unwrap(),
///     vec![1.0, 3.0, 5.0, 7.0, 9.0]
/// );
/// ```
pub fn equal_interval_breaks(data: &[f64], classes: usize) -> Result<Vec<f64>> {
    if classes == 0 {
        return Err(crate::StatsError::InvalidCount {
            name: "classes",
            value: 0,
        });
    }
    if data.len() < 2 {
        return Ok(data.to_vec());
    }
    let (lo, hi) = stats::extent(data)?;
    let step = (hi - lo) / classes as f64;
    let mut breaks: Vec<f64> = (0..classes).map(|i| lo + step * i as f64).collect();
    breaks.push(hi);
    Ok(breaks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StatsError;

    #[test]
    fn test_reference_breaks() {
        let breaks = jenks(&[1.0, 2.0, 4.0, 5.0, 7.0, 9.0, 10.0, 20.0], 3).unwrap();
        assert_eq!(breaks, vec![1.0, 7.0, 20.0, 20.0]);
    }

    #[test]
    fn test_two_obvious_groups() {
        let breaks = jenks(&[10.0, 1.0, 11.0, 2.0, 12.0, 3.0], 2).unwrap();
        assert_eq!(breaks, vec![1.0, 10.0, 12.0]);
    }

    #[test]
    fn test_one_class_per_value_with_duplicates() {
        let breaks = jenks(&[0.0, 0.0, -8.0, 1.0], 4).unwrap();
        assert_eq!(breaks.len(), 5);
        assert_eq!(breaks[0], -8.0);
        assert_eq!(breaks[4], 1.0);
        assert!(breaks.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            jenks(&[1.0, 2.0], 3),
            Err(StatsError::TooManyClusters { clusters: 3, points: 2 })
        );
        assert!(matches!(jenks(&[1.0], 0), Err(StatsError::InvalidCount { .. })));
    }

    #[test]
    fn test_equal_interval() {
        assert_eq!(equal_interval_breaks(&[4.0], 3).unwrap(), vec![4.0]);
        assert_eq!(equal_interval_breaks(&[0.0, 10.0], 2).unwrap(), vec![0.0, 5.0, 10.0]);
        assert!(equal_interval_breaks(&[0.0, 10.0], 0).is_err());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn breaks_span_data_in_order(
            data in proptest::collection::vec(-100.0_f64..100.0, 1..30),
            classes in 1_usize..10,
        ) {
            prop_assume!(classes <= data.len());
            let breaks = jenks(&data, classes).unwrap();
            let sorted = numeric_sort(&data);
            prop_assert_eq!(breaks.len(), classes + 1);
            prop_assert_eq!(breaks[0], sorted[0]);
            prop_assert_eq!(breaks[classes], sorted[sorted.len() - 1]);
            prop_assert!(breaks.windows(2).all(|w| w[0] <= w[1]));
        }
    }
}
