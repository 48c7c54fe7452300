//! Incrementally trained classifiers.
//!
//! - [`NaiveBayes`]: frequency-count classifier over categorical features.
//! - [`Perceptron`]: single-layer binary linear classifier.
//!
//! Both own their accumulated state and train through `&mut self`; scoring
//! borrows immutably.

use std::collections::BTreeMap;

use crate::error::{require_same_len, Result, StatsError};

// ============================================================================
// Naive Bayes
// ============================================================================

/// Frequency-count classifier over categorical features.
///
/// Training records, per category, how often each feature took each value.
/// Scoring an item gives every category the *sum* over the item's features
/// of `count(category, feature, value) / examples`. This is an additive
/// heuristic, not a product of per-feature likelihoods.
///
/// # Examples
/// ```
/// use u_statcore::classify::NaiveBayes;
///
/// let mut model = NaiveBayes::new();
/// model.train(&[("species", "cat")], "animal");
/// model.train(&[("species", "dog")], "animal");
/// model.train(&[("species", "cat")], "chair");
///
/// let scores = model.score(&[("species", "dog")]);
/// assert!((scores["animal"] - 1.0 / 3.0).abs() < 1e-12);
/// assert_eq!(scores["chair"], 0.0);
/// assert_eq!(model.predict(&[("species", "dog")]), Some("animal"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NaiveBayes<C, K, V> {
    counts: BTreeMap<C, BTreeMap<K, BTreeMap<V, u64>>>,
    examples: u64,
}

impl<C, K, V> Default for NaiveBayes<C, K, V> {
    fn default() -> Self {
        Self {
            counts: BTreeMap::new(),
            examples: 0,
        }
    }
}

impl<C, K, V> NaiveBayes<C, K, V>
where
    C: Ord + Clone,
    K: Ord + Clone,
    V: Ord + Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of training examples seen.
    pub fn examples(&self) -> u64 {
        self.examples
    }

    /// Records one example: each `(feature, value)` pair of `item` under `category`.
    pub fn train(&mut self, item: &[(K, V)], category: C) {
        let features = self.counts.entry(category).or_default();
        for (feature, value) in item {
            *features
                .entry(feature.clone())
                .or_default()
                .entry(value.clone())
                .or_insert(0) += 1;
        }
        self.examples += 1;
    }

    /// Additive score of `item` for every category seen in training.
    ///
    /// Returns an empty map before any training.
    pub fn score(&self, item: &[(K, V)]) -> BTreeMap<C, f64> {
        let total = self.examples as f64;
        self.counts
            .iter()
            .map(|(category, features)| {
                let score: f64 = item
                    .iter()
                    .map(|(feature, value)| {
                        let count = features
                            .get(feature)
                            .and_then(|values| values.get(value))
                            .copied()
                            .unwrap_or(0);
                        count as f64 / total
                    })
                    .sum();
                (category.clone(), score)
            })
            .collect()
    }

    /// Highest-scoring category; ties go to the smallest category.
    pub fn predict(&self, item: &[(K, V)]) -> Option<C> {
        let mut best: Option<(C, f64)> = None;
        for (category, score) in self.score(item) {
            match &best {
                Some((_, top)) if *top >= score => {}
                _ => best = Some((category, score)),
            }
        }
        best.map(|(category, _)| category)
    }
}

// ============================================================================
// Perceptron
// ============================================================================

/// Single-layer perceptron with labels 0 and 1.
///
/// # Examples
/// ```
/// use u_statcore::classify::Perceptron;
///
/// let mut p = Perceptron::new();
/// let and = [([1.0, 1.0], 1), ([0.0, 1.0], 0), ([1.0, 0.0], 0), ([0.0, 0.0], 0)];
/// for _ in 0..5 {
///     for (features, label) in &and {
///         p.train(features, *label).unwrap();
///     }
/// }
/// for (features, label) in &and {
///     assert_eq!(p.predict(features).unwrap(), *label);
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Perceptron {
    weights: Vec<f64>,
    bias: f64,
}

impl Perceptron {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    /// `1` if `w · features + bias > 0`, else `0`.
    ///
    /// # Errors
    /// [`StatsError::LengthMismatch`] if `features` does not match the
    /// trained weight vector.
    pub fn predict(&self, features: &[f64]) -> Result<u8> {
        require_same_len(&self.weights, features)?;
        let score: f64 = self
            .weights
            .iter()
            .zip(features)
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.bias;
        Ok(u8::from(score > 0.0))
    }

    /// One online update toward `label`.
    ///
    /// A feature vector of a new length restarts the model with
    /// `weights = features` and `bias = 1`. On a misclassification every
    /// weight moves by `(label − prediction) · feature` and the bias by
    /// `label − prediction`.
    ///
    /// # Errors
    /// [`StatsError::OutOfDomain`] if `label` is neither 0 nor 1.
    pub fn train(&mut self, features: &[f64], label: u8) -> Result<()> {
        if label > 1 {
            return Err(StatsError::OutOfDomain(format!(
                "perceptron labels must be 0 or 1, got {label}"
            )));
        }
        if features.len() != self.weights.len() {
            self.weights = features.to_vec();
            self.bias = 1.0;
        }
        let prediction = self.predict(features)?;
        if prediction != label {
            let error = f64::from(label) - f64::from(prediction);
            for (w, x) in self.weights.iter_mut().zip(features) {
                *w += error * x;
            }
            self.bias += error;
        }
        Ok(())
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn bayes_scores_every_trained_category(
            examples in proptest::collection::vec(
                (proptest::collection::vec((0_u8..3, 0_u8..3), 1..4), 0_u8..3),
                1..30,
            ),
            item in proptest::collection::vec((0_u8..3, 0_u8..3), 1..4),
        ) {
            let mut model = NaiveBayes::new();
            for (features, category) in &examples {
                model.train(features, *category);
            }
            let scores = model.score(&item);
            let mut trained: Vec<u8> = examples.iter().map(|(_, c)| *c).collect();
            trained.sort_unstable();
            trained.dedup();
            prop_assert_eq!(scores.keys().copied().collect::<Vec<_>>(), trained);
            prop_assert!(scores.values().all(|s| s.is_finite() && *s >= 0.0));
        }
    }
}
