//! Seeded generators, shuffling, and sampling.
//!
//! Randomized procedures in this crate (permutation tests, k-means
//! initialization) take the generator as `&mut R` so callers can inject a
//! seeded source. Convenience wrappers elsewhere fall back to
//! [`rand::rng()`], the thread-local generator.
//!
//! Two runs fed generators from [`create_rng`] with the same seed draw the
//! same permutations and samples.

use rand::Rng;

use crate::error::{Result, StatsError};

/// Seeded `SmallRng` for reproducible permutation tests and clusterings.
///
/// # Examples
/// ```
/// use u_statcore::random::create_rng;
/// use rand::Rng;
/// let a: u32 = create_rng(7).random();
/// let b: u32 = create_rng(7).random();
/// assert_eq!(a, b);
/// ```
pub fn create_rng(seed: u64) -> rand::rngs::SmallRng {
    use rand::SeedableRng;
    rand::rngs::SmallRng::seed_from_u64(seed)
}

/// Shuffles `slice` in place into a uniformly random order.
///
/// # Algorithm
/// Durstenfeld's Fisher-Yates: walking from the back, position `i` swaps
/// with a uniform pick from `0..=i`. O(n) time, no allocation.
///
/// Reference: Knuth, *TAOCP* Vol. 2, §3.4.2, Algorithm P.
///
/// # Examples
/// ```
/// use u_statcore::random::{create_rng, shuffle};
/// let mut pooled = [1.0, 2.0, 3.0, 10.0, 11.0];
/// shuffle(&mut pooled, &mut create_rng(3));
/// pooled.sort_by(f64::total_cmp);
/// assert_eq!(pooled, [1.0, 2.0, 3.0, 10.0, 11.0]);
/// ```
pub fn shuffle<T, R: Rng + ?Sized>(slice: &mut [T], rng: &mut R) {
    for i in (1..slice.len()).rev() {
        let j = rng.random_range(0..=i);
        slice.swap(i, j);
    }
}

/// Random ordering of the indices `0..n`.
///
/// # Examples
/// ```
/// use u_statcore::random::{create_rng, shuffled_indices};
/// let mut indices = shuffled_indices(5, &mut create_rng(1));
/// indices.sort();
/// assert_eq!(indices, vec![0, 1, 2, 3, 4]);
/// ```
pub fn shuffled_indices<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<usize> {
    let mut order: Vec<usize> = (0..n).collect();
    shuffle(&mut order, rng);
    order
}

/// Draws `k` elements of `population` without replacement.
///
/// # Algorithm
/// Partial Fisher-Yates over an index permutation: only the first `k`
/// positions are drawn, so the cost is O(n) for the index vector plus
/// O(k) swaps.
///
/// # Errors
/// [`StatsError::InsufficientData`] if `k` exceeds the population size.
///
/// # Examples
/// ```
/// use u_statcore::random::{create_rng, sample};
/// let mut rng = create_rng(7);
/// let picked = sample(&[10, 20, 30, 40], 2, &mut rng).unwrap();
/// assert_eq!(picked.len(), 2);
/// assert_ne!(picked[0], picked[1]);
/// ```
pub fn sample<T: Clone, R: Rng + ?Sized>(population: &[T], k: usize, rng: &mut R) -> Result<Vec<T>> {
    let n = population.len();
    if k > n {
        return Err(StatsError::InsufficientData {
            operation: "sampling without replacement",
            required: k,
            actual: n,
        });
    }
    let mut picks: Vec<usize> = (0..n).collect();
    for i in 0..k {
        let j = rng.random_range(i..n);
        picks.swap(i, j);
    }
    Ok(picks[..k].iter().map(|&i| population[i].clone()).collect())
}

/// Draws `k` elements of `population` independently, with replacement.
///
/// # Errors
/// [`StatsError::InsufficientData`] if `population` is empty and `k > 0`.
pub fn sample_with_replacement<T: Clone, R: Rng + ?Sized>(
    population: &[T],
    k: usize,
    rng: &mut R,
) -> Result<Vec<T>> {
    if population.is_empty() && k > 0 {
        return Err(StatsError::InsufficientData {
            operation: "sampling with replacement",
            required: 1,
            actual: 0,
        });
    }
    Ok((0..k)
        .map(|_| population[rng.random_range(0..population.len())].clone())
        .collect())
}
