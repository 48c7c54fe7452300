//! # u-statcore
//!
//! Statistical primitives for report and analysis pipelines.
//!
//! This crate provides descriptive statistics, probability distributions,
//! hypothesis tests, and small clustering/regression/classification
//! routines over plain `f64` samples. It performs no I/O and knows nothing
//! about where the data came from or how results are presented.
//!
//! ## Modules
//!
//! - [`stats`] — Descriptive statistics with compensated summation
//! - [`quantile`] — Selection-based quantiles, single and batched
//! - [`special`] — Gamma, beta, error functions and the normal inverse
//! - [`distributions`] — Normal, t, F, χ², Kolmogorov, binomial, Poisson, Bernoulli
//! - [`tables`] — Tabulated χ² critical values
//! - [`testing`] — t-tests, ANOVA, correlation test, intervals, power
//! - [`nonparametric`] — Kolmogorov–Smirnov, Wilcoxon rank-sum, permutation test
//! - [`goodness`] — χ² goodness of fit, Shapiro–Wilk
//! - [`regression`] — Simple linear regression with coefficient inference
//! - [`cluster`] — Ckmeans, k-means, Jenks breaks, silhouette
//! - [`kde`] — Kernel density estimation
//! - [`classify`] — Naive Bayes and perceptron
//! - [`roots`] — Bisection and secant root finding
//! - [`integrate`] — Adaptive Simpson quadrature
//! - [`random`] — Seeded generators, shuffling, sampling
//!
//! ## Design Philosophy
//!
//! - **Numerical stability first**: Neumaier summation for accumulation,
//!   median-shifted prefix sums in Ckmeans
//! - **Errors versus NaN**: input-contract violations return
//!   [`StatsError`]; numerically undefined results are `NaN`
//! - **Injectable randomness**: every randomized routine takes `&mut R: Rng`
//! - **Property-based testing**: Mathematical invariants verified via proptest

pub mod classify;
pub mod cluster;
pub mod distributions;
pub mod error;
pub mod goodness;
pub mod integrate;
pub mod kde;
pub mod nonparametric;
pub mod quantile;
pub mod random;
pub mod regression;
pub mod roots;
pub mod special;
pub mod stats;
pub mod tables;
pub mod testing;

pub use error::{Result, StatsError};
