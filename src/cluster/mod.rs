//! Clustering and classification of numeric data.
//!
//! # Submodules
//!
//! - [`ckmeans`]: Optimal univariate k-means by dynamic programming
//! - [`jenks`]: Jenks natural breaks and equal-interval breaks
//! - [`kmeans`]: Lloyd's algorithm for N-dimensional points
//! - [`silhouette`]: Per-point silhouette scores of a labelling

pub mod ckmeans;
pub mod jenks;
pub mod kmeans;
pub mod silhouette;

pub use ckmeans::ckmeans;
pub use jenks::{equal_interval_breaks, jenks};
pub use kmeans::{k_means_cluster, Clustering, KMeansConfig};
pub use silhouette::{silhouette, silhouette_metric};

use crate::error::{Result, StatsError};

/// Euclidean distance between two points of equal dimension.
///
/// # Examples
/// ```
/// use u_statcore::cluster::euclidean_distance;
/// assert_eq!(euclidean_distance(&[0.0, 0.0], &[3.0, 4.0]), 5.0);
/// ```
pub fn euclidean_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

/// Checks that `points` is non-empty and every point shares the first
/// point's dimension; returns that dimension.
pub(crate) fn common_dimension<P: AsRef<[f64]>>(operation: &'static str, points: &[P]) -> Result<usize> {
    let first = points.first().ok_or(StatsError::InsufficientData {
        operation,
        required: 1,
        actual: 0,
    })?;
    let dimension = first.as_ref().len();
    for point in points {
        if point.as_ref().len() != dimension {
            return Err(StatsError::LengthMismatch {
                left: dimension,
                right: point.as_ref().len(),
            });
        }
    }
    Ok(dimension)
}

/// Rejects a zero cluster count and more clusters than points.
pub(crate) fn check_cluster_count(clusters: usize, points: usize) -> Result<()> {
    if clusters == 0 {
        return Err(StatsError::InvalidCount {
            name: "clusters",
            value: 0,
        });
    }
    if clusters > points {
        return Err(StatsError::TooManyClusters { clusters, points });
    }
    Ok(())
}
