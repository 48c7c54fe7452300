//! Silhouette scores of a cluster labelling.

use super::{common_dimension, euclidean_distance};
use crate::error::{require_same_len, Result};

/// Silhouette score of every point under `labels`.
///
/// For point `i` in cluster `C`:
/// - `a` is the mean distance to the other members of `C`,
/// - `b` is the smallest mean distance to the members of any other
///   non-empty cluster,
/// - the score is `(b − a) / max(a, b)`.
///
/// Points in singleton clusters score 0, as do points when every label is
/// the same cluster or when `a` and `b` are both 0.
///
/// # Errors
/// - [`StatsError::InsufficientData`](crate::StatsError::InsufficientData)
///   for no points.
/// - [`StatsError::LengthMismatch`](crate::StatsError::LengthMismatch) when
///   `labels` and `points` differ in length or the points differ in
///   dimension.
///
/// # Examples
/// ```
/// use u_statcore::cluster::silhouette;
/// let points = [[1.0], [2.0], [4.0], [5.0]];
/// let scores = silhouette(&points, &[0, 0, 1, 1]).unwrap();
/// assert!((scores[1] - 0.6).abs() < 1e-12);
/// ```
pub fn silhouette<P: AsRef<[f64]>>(points: &[P], labels: &[usize]) -> Result<Vec<f64>> {
    common_dimension("silhouette", points)?;
    require_same_len(points, labels)?;

    let clusters = labels.iter().max().map_or(0, |&m| m + 1);
    let mut sizes = vec![0_usize; clusters];
    for &label in labels {
        sizes[label] += 1;
    }

    let scores = points
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let own = labels[i];
            if sizes[own] <= 1 {
                return 0.0;
            }
            let mut totals = vec![0.0; clusters];
            for (j, other) in points.iter().enumerate() {
                if i != j {
                    totals[labels[j]] += euclidean_distance(point.as_ref(), other.as_ref());
                }
            }
            let a = totals[own] / (sizes[own] - 1) as f64;
            let b = (0..clusters)
                .filter(|&c| c != own && sizes[c] > 0)
                .map(|c| totals[c] / sizes[c] as f64)
                .fold(f64::INFINITY, f64::min);
            if b.is_infinite() {
                return 0.0;
            }
            let scale = a.max(b);
            if scale == 0.0 {
                0.0
            } else {
                (b - a) / scale
            }
        })
        .collect();
    Ok(scores)
}

/// Largest silhouette score of the labelling.
///
/// # Errors
/// As [`silhouette`].
pub fn silhouette_metric<P: AsRef<[f64]>>(points: &[P], labels: &[usize]) -> Result<f64> {
    Ok(silhouette(points, labels)?
        .into_iter()
        .fold(f64::NEG_INFINITY, f64::max))
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn scores_within_unit_interval(
            labelled in proptest::collection::vec(((-20.0_f64..20.0, -20.0_f64..20.0), 0_usize..4), 1..25),
        ) {
            let points: Vec<[f64; 2]> = labelled.iter().map(|((x, y), _)| [*x, *y]).collect();
            let labels: Vec<usize> = labelled.iter().map(|(_, l)| *l).collect();
            for s in silhouette(&points, &labels).unwrap() {
                prop_assert!((-1.0 - 1e-12..=1.0 + 1e-12).contains(&s));
            }
        }
    }
}
