//! Order statistics: selection, quantiles and quantile ranks.
//!
//! # Quantile rule
//! For a sample of length `n` and fraction `p`:
//! - `p = 0` → smallest value, `p = 1` → largest value;
//! - `n·p` fractional → the value at rank `⌈n·p⌉` (1-based);
//! - `n·p` integral and `n` even → mean of ranks `n·p` and `n·p + 1`;
//! - `n·p` integral and `n` odd → the value at rank `n·p + 1`.
//!
//! # Selection
//! Unsorted input is never fully sorted. A single quantile is a
//! Floyd–Rivest selection; several quantiles share one divide-and-conquer
//! pass that selects the middle target and recurses into the two halves,
//! so `q` quantiles cost O(n log q) instead of O(q·n).
//!
//! Values are ordered with [`f64::total_cmp`], so NaN sorts last instead of
//! poisoning comparisons.
//!
//! Reference: Floyd & Rivest (1975), "Algorithm 489: The algorithm
//! SELECT—for finding the ith smallest of n elements", *CACM* 18(3).

use std::cmp::Ordering;

use crate::error::{require_len, Result, StatsError};

/// Partitions larger than this are narrowed by sampling before pivoting.
const SAMPLING_CUTOFF: isize = 600;

// ============================================================================
// Selection
// ============================================================================

/// Rearranges `arr[left..=right]` so that `arr[k]` holds the value it would
/// have if that range were sorted, with smaller-or-equal values before it
/// and greater-or-equal values after it.
///
/// # Algorithm
/// Floyd–Rivest: ranges longer than 600 elements first recurse on a
/// sampled sub-range expected to contain the k-th element, so the pivot
/// lands close to `k` and each partition pass discards most of the range.
///
/// # Complexity
/// Expected O(n) comparisons, O(log n) stack.
///
/// # Panics
/// Panics if `right >= arr.len()` or `k` lies outside `[left, right]`.
///
/// # Examples
/// ```
/// use u_statcore::quantile::quickselect;
/// let mut v = [65.0, 28.0, 59.0, 33.0, 21.0, 56.0, 22.0, 95.0, 50.0, 12.0];
/// quickselect(&mut v, 8, 0, 9);
/// assert_eq!(v[8], 65.0);
/// assert!(v[..8].iter().all(|&x| x <= 65.0));
/// ```
pub fn quickselect(arr: &mut [f64], k: usize, left: usize, right: usize) {
    assert!(right < arr.len(), "selection range exceeds slice length");
    assert!(left <= k && k <= right, "k must lie within [left, right]");
    floyd_rivest(arr, k as isize, left as isize, right as isize);
}

fn floyd_rivest(arr: &mut [f64], k: isize, mut left: isize, mut right: isize) {
    while right > left {
        if right - left > SAMPLING_CUTOFF {
            let n = (right - left + 1) as f64;
            let m = (k - left + 1) as f64;
            let z = n.ln();
            let s = 0.5 * (2.0 * z / 3.0).exp();
            let mut sd = 0.5 * (z * s * (n - s) / n).sqrt();
            if m - n / 2.0 < 0.0 {
                sd = -sd;
            }
            let new_left = left.max((k as f64 - m * s / n + sd).floor() as isize);
            let new_right = right.min((k as f64 + (n - m) * s / n + sd).floor() as isize);
            floyd_rivest(arr, k, new_left, new_right);
        }

        let t = arr[k as usize];
        let mut i = left;
        let mut j = right;

        arr.swap(left as usize, k as usize);
        if arr[right as usize].total_cmp(&t) == Ordering::Greater {
            arr.swap(left as usize, right as usize);
        }

        while i < j {
            arr.swap(i as usize, j as usize);
            i += 1;
            j -= 1;
            while arr[i as usize].total_cmp(&t) == Ordering::Less {
                i += 1;
            }
            while arr[j as usize].total_cmp(&t) == Ordering::Greater {
                j -= 1;
            }
        }

        if arr[left as usize].total_cmp(&t) == Ordering::Equal {
            arr.swap(left as usize, j as usize);
        } else {
            j += 1;
            arr.swap(j as usize, right as usize);
        }

        if j <= k {
            left = j + 1;
        }
        if k <= j {
            right = j - 1;
        }
    }
}

/// Positions that must hold their sorted values for `index` to be read.
///
/// A fractional index `i + 0.5` needs both neighbours `i` and `i + 1`.
fn selection_positions(index: f64) -> [Option<usize>; 2] {
    let lower = index.floor() as usize;
    if index.fract() == 0.0 {
        [Some(lower), None]
    } else {
        [Some(lower), Some(lower + 1)]
    }
}

/// Selects every position in `positions` (sorted, distinct, all inside
/// `[lo, hi]`) with one shared recursive pass.
fn select_many(arr: &mut [f64], positions: &[usize], lo: usize, hi: usize) {
    if positions.is_empty() || lo >= hi {
        return;
    }
    let mid = positions.len() / 2;
    let k = positions[mid];
    quickselect(arr, k, lo, hi);
    if mid > 0 {
        select_many(arr, &positions[..mid], lo, k - 1);
    }
    select_many(arr, &positions[mid + 1..], k + 1, hi);
}

// ============================================================================
// Quantile Rule
// ============================================================================

fn check_probability(p: f64) -> Result<()> {
    if p.is_nan() || !(0.0..=1.0).contains(&p) {
        return Err(StatsError::InvalidProbability(p));
    }
    Ok(())
}

/// Zero-based position of the `p`-quantile in a sorted sample of length `len`.
///
/// A result ending in `.5` means the quantile is the mean of the two
/// neighbouring positions.
///
/// # Examples
/// ```
/// use u_statcore::quantile::quantile_index;
/// assert_eq!(quantile_index(6, 0.5), 2.5);
/// assert_eq!(quantile_index(11, 0.5), 5.0);
/// assert_eq!(quantile_index(4, 1.0), 3.0);
/// ```
pub fn quantile_index(len: usize, p: f64) -> f64 {
    let idx = len as f64 * p;
    if p == 1.0 {
        len as f64 - 1.0
    } else if p == 0.0 {
        0.0
    } else if idx.fract() != 0.0 {
        idx.ceil() - 1.0
    } else if len % 2 == 0 {
        idx - 0.5
    } else {
        idx
    }
}

/// Reads the `p`-quantile from **sorted** data.
///
/// Also correct on data that is only partitioned around the positions
/// named by [`quantile_index`], which is how [`quantile`] uses it.
///
/// # Errors
/// - [`StatsError::InsufficientData`] if `sorted` is empty.
/// - [`StatsError::InvalidProbability`] if `p` is outside `[0, 1]`.
///
/// # Examples
/// ```
/// use u_statcore::quantile::quantile_sorted;
/// let x = [1.0, 2.0, 2.0, 5.0, 10.0, 100.0];
/// assert_eq!(quantile_sorted(&x, 0.5).unwrap(), 3.5);
/// assert_eq!(quantile_sorted(&x, 0.25).unwrap(), 2.0);
/// ```
pub fn quantile_sorted(sorted: &[f64], p: f64) -> Result<f64> {
    require_len("quantile", sorted, 1)?;
    check_probability(p)?;
    let n = sorted.len();
    let idx = n as f64 * p;
    let value = if p == 1.0 {
        sorted[n - 1]
    } else if p == 0.0 {
        sorted[0]
    } else if idx.fract() != 0.0 {
        sorted[idx.ceil() as usize - 1]
    } else if n % 2 == 0 {
        let i = idx as usize;
        (sorted[i - 1] + sorted[i]) / 2.0
    } else {
        sorted[idx as usize]
    };
    Ok(value)
}

/// Computes the `p`-quantile of `data` in the caller's buffer.
///
/// `data` is partially reordered; only the selected positions end up in
/// their sorted place.
///
/// # Complexity
/// Expected O(n) time, no copy of `data`.
pub fn quantile_in_place(data: &mut [f64], p: f64) -> Result<f64> {
    require_len("quantile", data, 1)?;
    check_probability(p)?;
    let right = data.len() - 1;
    let positions: Vec<usize> = selection_positions(quantile_index(data.len(), p))
        .into_iter()
        .flatten()
        .collect();
    select_many(data, &positions, 0, right);
    quantile_sorted(data, p)
}

/// Computes the `p`-quantile of `data` without mutating it.
///
/// # Complexity
/// Expected O(n) time, O(n) space for the working copy.
///
/// # Errors
/// - [`StatsError::InsufficientData`] if `data` is empty.
/// - [`StatsError::InvalidProbability`] if `p` is outside `[0, 1]`.
///
/// # Examples
/// ```
/// use u_statcore::quantile::quantile;
/// let x = [3.0, 6.0, 7.0, 8.0, 8.0, 9.0, 10.0, 13.0, 15.0, 16.0, 20.0];
/// assert_eq!(quantile(&x, 0.5).unwrap(), 9.0);
/// assert_eq!(quantile(&x, 0.25).unwrap(), 7.0);
/// ```
pub fn quantile(data: &[f64], p: f64) -> Result<f64> {
    let mut copy = data.to_vec();
    quantile_in_place(&mut copy, p)
}

/// Computes several quantiles of `data` with one batched selection pass.
///
/// Results are returned in the order of `ps`, which need not be sorted.
///
/// # Errors
/// Same as [`quantile`]; the first invalid fraction is reported.
///
/// # Examples
/// ```
/// use u_statcore::quantile::quantiles;
/// let x = [3.0, 6.0, 7.0, 8.0, 8.0, 9.0, 10.0, 13.0, 15.0, 16.0, 20.0];
/// assert_eq!(quantiles(&x, &[0.75, 0.25, 0.5]).unwrap(), vec![15.0, 7.0, 9.0]);
/// ```
pub fn quantiles(data: &[f64], ps: &[f64]) -> Result<Vec<f64>> {
    require_len("quantile", data, 1)?;
    for &p in ps {
        check_probability(p)?;
    }
    let mut copy = data.to_vec();
    let mut positions: Vec<usize> = ps
        .iter()
        .flat_map(|&p| selection_positions(quantile_index(copy.len(), p)))
        .flatten()
        .collect();
    positions.sort_unstable();
    positions.dedup();
    let right = copy.len() - 1;
    select_many(&mut copy, &positions, 0, right);
    ps.iter().map(|&p| quantile_sorted(&copy, p)).collect()
}

// ============================================================================
// Median
// ============================================================================

/// Median of `data`: the 0.5-quantile.
///
/// # Examples
/// ```
/// use u_statcore::quantile::median;
/// assert_eq!(median(&[10.0, 2.0, 5.0, 100.0, 2.0, 1.0]).unwrap(), 3.5);
/// ```
pub fn median(data: &[f64]) -> Result<f64> {
    quantile(data, 0.5)
}

/// Median of already-sorted data.
pub fn median_sorted(sorted: &[f64]) -> Result<f64> {
    quantile_sorted(sorted, 0.5)
}

/// Returns an ascending copy of `data` (NaN last).
pub fn numeric_sort(data: &[f64]) -> Vec<f64> {
    let mut sorted = data.to_vec();
    sorted.sort_unstable_by(f64::total_cmp);
    sorted
}

// ============================================================================
// Quantile Rank
// ============================================================================

/// Fraction of `sorted` lying at or below `value`.
///
/// Values tied with `value` contribute the mean of the ranks they occupy,
/// so a value present in the sample gets its mid-rank.
///
/// # Errors
/// - [`StatsError::InsufficientData`] if `sorted` is empty.
///
/// # Examples
/// ```
/// use u_statcore::quantile::quantile_rank_sorted;
/// let x = [1.0, 2.0, 3.0, 4.0];
/// assert_eq!(quantile_rank_sorted(&x, 0.0).unwrap(), 0.0);
/// assert_eq!(quantile_rank_sorted(&x, 2.5).unwrap(), 0.5);
/// assert_eq!(quantile_rank_sorted(&x, 4.0).unwrap(), 1.0);
/// ```
pub fn quantile_rank_sorted(sorted: &[f64], value: f64) -> Result<f64> {
    require_len("quantile rank", sorted, 1)?;
    let n = sorted.len() as f64;
    if value < sorted[0] {
        return Ok(0.0);
    }
    if value > sorted[sorted.len() - 1] {
        return Ok(1.0);
    }
    let lower = sorted.partition_point(|&x| x < value);
    if sorted[lower] != value {
        return Ok(lower as f64 / n);
    }
    let first = lower + 1;
    let upper = sorted.partition_point(|&x| x <= value);
    if upper == first {
        return Ok(first as f64 / n);
    }
    let mean_rank = (upper + first) as f64 / 2.0;
    Ok(mean_rank / n)
}

/// Quantile rank of `value` within unsorted `data`.
pub fn quantile_rank(data: &[f64], value: f64) -> Result<f64> {
    quantile_rank_sorted(&numeric_sort(data), value)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn sample(min_len: usize, max_len: usize) -> impl Strategy<Value = Vec<f64>> {
        proptest::collection::vec(-1e6_f64..1e6, min_len..=max_len)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(300))]

        #[test]
        fn quickselect_places_order_statistic(data in sample(1, 1500), frac in 0.0_f64..1.0) {
            let k = ((data.len() - 1) as f64 * frac) as usize;
            let mut sorted = data.clone();
            sorted.sort_unstable_by(f64::total_cmp);
            let mut work = data.clone();
            let right = work.len() - 1;
            quickselect(&mut work, k, 0, right);
            prop_assert_eq!(work[k], sorted[k]);
            prop_assert!(work[..k].iter().all(|&x| x <= work[k]));
            prop_assert!(work[k + 1..].iter().all(|&x| x >= work[k]));
        }

        #[test]
        fn quantile_matches_sorted_rule(data in sample(1, 200), p in 0.0_f64..=1.0) {
            let expected = quantile_sorted(&numeric_sort(&data), p).unwrap();
            prop_assert_eq!(quantile(&data, p).unwrap(), expected);
        }

        #[test]
        fn batched_equals_single(
            data in sample(1, 1000),
            ps in proptest::collection::vec(0.0_f64..=1.0, 1..8),
        ) {
            let batched = quantiles(&data, &ps).unwrap();
            for (&p, &q) in ps.iter().zip(&batched) {
                prop_assert_eq!(q, quantile(&data, p).unwrap(), "p = {}", p);
            }
        }

        #[test]
        fn quantile_within_extent(data in sample(1, 100), p in 0.0_f64..=1.0) {
            let q = quantile(&data, p).unwrap();
            let lo = data.iter().copied().fold(f64::INFINITY, f64::min);
            let hi = data.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            prop_assert!(lo <= q && q <= hi);
        }

        #[test]
        fn quantile_rank_in_unit_interval(data in sample(1, 100), value in -2e6_f64..2e6) {
            let r = quantile_rank(&data, value).unwrap();
            prop_assert!((0.0..=1.0).contains(&r));
        }
    }
}
