//! Ckmeans: optimal univariate k-means clustering.
//!
//! Minimizes the total within-cluster sum of squared deviations over all
//! partitions of the sorted data into contiguous groups.
//!
//! # Algorithm
//! A `k × n` cost matrix and its backtrack matrix are filled column by
//! column. Each column is solved by divide and conquer: the middle row is
//! computed first, and the split points found there bound the search range
//! of the rows on either side, giving O(k·n·log n) time. Prefix sums are
//! shifted by the median so the sums of squares stay well conditioned.
//!
//! Reference: Wang & Song (2011), "Ckmeans.1d.dp: Optimal k-means
//! Clustering in One Dimension by Dynamic Programming", *The R Journal*
//! 3(2).

use tracing::debug;

use crate::error::Result;
use crate::quantile::numeric_sort;
use crate::stats::unique_count_sorted;

/// Partitions `data` into `clusters` groups of sorted values.
///
/// When every value is identical a single group holding all of them is
/// returned regardless of `clusters`.
///
/// # Errors
/// - [`StatsError::InvalidCount`](crate::StatsError::InvalidCount) for
///   zero clusters.
/// - [`StatsError::TooManyClusters`](crate::StatsError::TooManyClusters)
///   when `clusters > data.len()`.
///
/// # Examples
/// ```
/// use u_statcore::cluster::ckmeans;
/// let groups = ckmeans(&[-1.0, 2.0, -1.0, 2.0, 4.0, 5.0, 6.0, -1.0, 2.0, -1.0], 3).unwrap();
/// assert_eq!(
///     groups,
///     vec![vec![-1.0, -1.0, -1.0, -1.0], vec![2.0, 2.0, 2.0], vec![4.0, 5.0, 6.0]]
/// );
/// ```
pub fn ckmeans(data: &[f64], clusters: usize) -> Result<Vec<Vec<f64>>> {
    super::check_cluster_count(clusters, data.len())?;
    let sorted = numeric_sort(data);
    if unique_count_sorted(&sorted) == 1 {
        debug!(n = sorted.len(), "ckmeans on constant data, single cluster");
        return Ok(vec![sorted]);
    }

    let n = sorted.len();
    let mut table = Table::new(&sorted, clusters);
    for cluster in 1..clusters {
        let i_min = if cluster < clusters - 1 { cluster } else { n - 1 };
        table.fill_column(i_min, n - 1, cluster);
    }

    let mut groups = vec![Vec::new(); clusters];
    let mut right = n - 1;
    for cluster in (0..clusters).rev() {
        let left = table.backtrack[cluster][right];
        groups[cluster] = sorted[left..=right].to_vec();
        if cluster > 0 {
            right = left - 1;
        }
    }
    Ok(groups)
}

/// Cost and backtrack matrices with the shifted prefix sums they draw on.
struct Table {
    cost: Vec<Vec<f64>>,
    backtrack: Vec<Vec<usize>>,
    sum_x: Vec<f64>,
    sum_x_sq: Vec<f64>,
}

impl Table {
    fn new(sorted: &[f64], clusters: usize) -> Self {
        let n = sorted.len();
        let shift = sorted[n / 2];
        let mut sum_x = Vec::with_capacity(n);
        let mut sum_x_sq = Vec::with_capacity(n);
        let (mut acc, mut acc_sq) = (0.0, 0.0);
        for &value in sorted {
            let shifted = value - shift;
            acc += shifted;
            acc_sq += shifted * shifted;
            sum_x.push(acc);
            sum_x_sq.push(acc_sq);
        }
        let mut table = Self {
            cost: vec![vec![0.0; n]; clusters],
            backtrack: vec![vec![0; n]; clusters],
            sum_x,
            sum_x_sq,
        };
        for i in 0..n {
            table.cost[0][i] = table.ssq(0, i);
        }
        table
    }

    /// Sum of squared deviations of `sorted[j..=i]` from its mean.
    fn ssq(&self, j: usize, i: usize) -> f64 {
        let s = if j > 0 {
            let width = (i - j + 1) as f64;
            let mu = (self.sum_x[i] - self.sum_x[j - 1]) / width;
            self.sum_x_sq[i] - self.sum_x_sq[j - 1] - width * mu * mu
        } else {
            self.sum_x_sq[i] - self.sum_x[i] * self.sum_x[i] / (i + 1) as f64
        };
        s.max(0.0)
    }

    fn fill_column(&mut self, i_min: usize, i_max: usize, cluster: usize) {
        if i_min > i_max {
            return;
        }
        let i = (i_min + i_max) / 2;
        self.cost[cluster][i] = self.cost[cluster - 1][i - 1];
        self.backtrack[cluster][i] = i;

        let mut j_low = cluster;
        if i_min > cluster {
            j_low = j_low.max(self.backtrack[cluster][i_min - 1]);
        }
        j_low = j_low.max(self.backtrack[cluster - 1][i]);

        let mut j_high = i - 1;
        if i_max < self.cost[0].len() - 1 {
            j_high = j_high.min(self.backtrack[cluster][i_max + 1]);
        }

        // j_low ≥ cluster ≥ 1, so j - 1 and j_low - 1 stay in bounds
        let mut j = j_high;
        while j >= j_low {
            let s_ji = self.ssq(j, i);
            if s_ji + self.cost[cluster - 1][j_low - 1] >= self.cost[cluster][i] {
                break;
            }

            let s_low = self.ssq(j_low, i) + self.cost[cluster - 1][j_low - 1];
            if s_low < self.cost[cluster][i] {
                self.cost[cluster][i] = s_low;
                self.backtrack[cluster][i] = j_low;
            }
            j_low += 1;

            let s_j = s_ji + self.cost[cluster - 1][j - 1];
            if s_j < self.cost[cluster][i] {
                self.cost[cluster][i] = s_j;
                self.backtrack[cluster][i] = j;
            }
            j -= 1;
        }

        self.fill_column(i_min, i - 1, cluster);
        self.fill_column(i + 1, i_max, cluster);
    }
}
