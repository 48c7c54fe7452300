//! Lloyd's algorithm for k-means clustering of N-dimensional points.

use rand::Rng;
use tracing::{debug, trace};

use super::{check_cluster_count, common_dimension, euclidean_distance};
use crate::error::{Result, StatsError};
use crate::random;

/// Labels and centroids produced by a k-means run.
#[derive(Debug, Clone, PartialEq)]
pub struct Clustering {
    /// Cluster index in `[0, k)` for each input point, in input order.
    pub labels: Vec<usize>,
    /// Mean of the points assigned to each cluster.
    pub centroids: Vec<Vec<f64>>,
    /// Assignment passes performed before the centroids stopped moving.
    pub iterations: usize,
}

/// Parameters of a k-means run.
///
/// # Examples
/// ```
/// use u_statcore::cluster::KMeansConfig;
/// use u_statcore::random::create_rng;
///
/// let points = [[0.0, 0.0], [0.0, 1.0], [10.0, 10.0], [10.0, 11.0]];
/// let result = KMeansConfig::new(2).run_with_rng(&points, &mut create_rng(3)).unwrap();
/// assert_eq!(result.labels[0], result.labels[1]);
/// assert_ne!(result.labels[0], result.labels[2]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KMeansConfig {
    pub clusters: usize,
    /// Upper bound on assignment passes.
    pub max_iterations: usize,
}

impl KMeansConfig {
    pub fn new(clusters: usize) -> Self {
        Self {
            clusters,
            max_iterations: 10_000,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Clusters `points` with initial centroids drawn from the thread-local generator.
    pub fn run<P: AsRef<[f64]>>(&self, points: &[P]) -> Result<Clustering> {
        self.run_with_rng(points, &mut rand::rng())
    }

    /// Clusters `points`, drawing initial centroids from `rng`.
    ///
    /// # Algorithm
    /// 1. Pick `clusters` distinct input points as starting centroids.
    /// 2. Assign every point to its nearest centroid (ties go to the lower
    ///    index).
    /// 3. Move each centroid to the mean of its points.
    /// 4. Repeat from 2 until the summed centroid movement is exactly zero.
    ///
    /// # Errors
    /// - [`StatsError::InsufficientData`] for no points, and
    ///   [`StatsError::LengthMismatch`] for points of differing dimension.
    /// - [`StatsError::InvalidCount`] / [`StatsError::TooManyClusters`] for a
    ///   cluster count of zero or above the number of points.
    /// - [`StatsError::EmptyCluster`] when a centroid attracts no points.
    /// - [`StatsError::NoConvergence`] after `max_iterations` passes.
    pub fn run_with_rng<P, R>(&self, points: &[P], rng: &mut R) -> Result<Clustering>
    where
        P: AsRef<[f64]>,
        R: Rng + ?Sized,
    {
        let dimension = common_dimension("k-means clustering", points)?;
        check_cluster_count(self.clusters, points.len())?;
        if self.max_iterations == 0 {
            return Err(StatsError::InvalidCount {
                name: "max_iterations",
                value: 0,
            });
        }

        let indices: Vec<usize> = (0..points.len()).collect();
        let mut centroids: Vec<Vec<f64>> = random::sample(&indices, self.clusters, rng)?
            .into_iter()
            .map(|i| points[i].as_ref().to_vec())
            .collect();

        for iteration in 1..=self.max_iterations {
            let labels = assign(points, &centroids);
            let updated = centroids_of(points, &labels, self.clusters, dimension)?;
            let movement: f64 = centroids
                .iter()
                .zip(&updated)
                .map(|(old, new)| euclidean_distance(old, new))
                .sum();
            trace!(iteration, movement, "k-means pass");
            centroids = updated;

            if movement == 0.0 {
                debug!(
                    iterations = iteration,
                    clusters = self.clusters,
                    points = points.len(),
                    "k-means converged"
                );
                return Ok(Clustering {
                    labels,
                    centroids,
                    iterations: iteration,
                });
            }
        }

        Err(StatsError::NoConvergence {
            method: "k-means",
            iterations: self.max_iterations,
        })
    }
}

/// Runs k-means with the default iteration bound.
///
/// See [`KMeansConfig::run_with_rng`].
pub fn k_means_cluster<P, R>(points: &[P], clusters: usize, rng: &mut R) -> Result<Clustering>
where
    P: AsRef<[f64]>,
    R: Rng + ?Sized,
{
    KMeansConfig::new(clusters).run_with_rng(points, rng)
}

fn assign<P: AsRef<[f64]>>(points: &[P], centroids: &[Vec<f64>]) -> Vec<usize> {
    points
        .iter()
        .map(|point| {
            let point = point.as_ref();
            let mut best = 0;
            let mut best_distance = f64::INFINITY;
            for (c, centroid) in centroids.iter().enumerate() {
                let d = euclidean_distance(point, centroid);
                if d < best_distance {
                    best = c;
                    best_distance = d;
                }
            }
            best
        })
        .collect()
}

fn centroids_of<P: AsRef<[f64]>>(
    points: &[P],
    labels: &[usize],
    clusters: usize,
    dimension: usize,
) -> Result<Vec<Vec<f64>>> {
    let mut sums = vec![vec![0.0; dimension]; clusters];
    let mut counts = vec![0_usize; clusters];
    for (point, &label) in points.iter().zip(labels) {
        counts[label] += 1;
        for (s, v) in sums[label].iter_mut().zip(point.as_ref()) {
            *s += v;
        }
    }
    if let Some(cluster) = counts.iter().position(|&c| c == 0) {
        return Err(StatsError::EmptyCluster { cluster });
    }
    for (sum, &count) in sums.iter_mut().zip(&counts) {
        for s in sum.iter_mut() {
            *s /= count as f64;
        }
    }
    Ok(sums)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;

    fn two_blobs() -> Vec<[f64; 2]> {
        vec![[0.0, 0.0], [0.0, 1.0], [10.0, 10.0], [10.0, 11.0]]
    }

    #[test]
    fn test_separates_blobs_for_any_seed() {
        for seed in 0..20 {
            let result = k_means_cluster(&two_blobs(), 2, &mut create_rng(seed)).unwrap();
            assert_eq!(result.labels[0], result.labels[1]);
            assert_eq!(result.labels[2], result.labels[3]);
            assert_ne!(result.labels[0], result.labels[2]);

            let low = &result.centroids[result.labels[0]];
            let high = &result.centroids[result.labels[2]];
            assert_eq!(low, &vec![0.0, 0.5]);
            assert_eq!(high, &vec![10.0, 10.5]);
        }
    }

    #[test]
    fn test_duplicate_locations_starve_a_centroid() {
        let points = vec![vec![1.0, 1.0]; 3];
        let err = k_means_cluster(&points, 2, &mut create_rng(0)).unwrap_err();
        assert_eq!(err, StatsError::EmptyCluster { cluster: 1 });
    }

    #[test]
    fn test_single_cluster_is_the_mean() {
        let points = [[1.0], [2.0], [6.0]];
        let result = k_means_cluster(&points, 1, &mut create_rng(9)).unwrap();
        assert_eq!(result.labels, vec![0, 0, 0]);
        assert_eq!(result.centroids, vec![vec![3.0]]);
    }

    #[test]
    fn test_input_errors() {
        let mut rng = create_rng(1);
        assert_eq!(
            k_means_cluster(&two_blobs(), 5, &mut rng).unwrap_err(),
            StatsError::TooManyClusters { clusters: 5, points: 4 }
        );
        assert!(k_means_cluster(&two_blobs(), 0, &mut rng).is_err());
        let ragged = vec![vec![1.0, 2.0], vec![3.0]];
        assert!(matches!(
            k_means_cluster(&ragged, 1, &mut rng),
            Err(StatsError::LengthMismatch { .. })
        ));
        let zero_budget = KMeansConfig::new(1).with_max_iterations(0);
        assert!(zero_budget.run_with_rng(&two_blobs(), &mut rng).is_err());
    }

    #[test]
    fn test_iteration_budget() {
        // No 2-partition of these points has every mean on a data point,
        // so the first pass always moves a centroid.
        let config = KMeansConfig::new(2).with_max_iterations(1);
        let points = [[0.0], [1.0], [10.0], [12.0]];
        for seed in 0..10 {
            assert_eq!(
                config.run_with_rng(&points, &mut create_rng(seed)).unwrap_err(),
                StatsError::NoConvergence {
                    method: "k-means",
                    iterations: 1
                }
            );
        }
    }
}
