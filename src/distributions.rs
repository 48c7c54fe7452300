//! Probability distributions.
//!
//! Parameterized value types with density, cumulative probability and
//! quantile evaluation. Continuous distributions share the
//! [`ContinuousDistribution`] trait, which also provides vectorized
//! evaluation over a whole sample.
//!
//! # Supported Distributions
//!
//! | Distribution | Parameters | CDF | Quantile |
//! |---|---|---|---|
//! | [`Normal`] | μ, σ | erfc | Acklam rational approximation |
//! | [`StudentsT`] | ν | regularized incomplete beta | bisection |
//! | [`FisherF`] | d₁, d₂ | regularized incomplete beta | bisection |
//! | [`ChiSquared`] | k | regularized lower gamma | bisection, or table |
//! | [`Kolmogorov`] | — | theta / alternating series | bisection |
//! | [`Binomial`] | n, p | truncated cells | — |
//! | [`Poisson`] | λ | truncated cells | — |
//! | [`Bernoulli`] | p | `[1 − p, p]` | — |
//!
//! Discrete distributions expose their probability mass as a cell array
//! generated until the cumulative mass reaches `1 − 1e-4`; the remaining
//! tail is dropped.

use crate::error::{Result, StatsError};
use crate::roots;
use crate::special;
use crate::tables;

/// Cumulative mass at which discrete cell generation stops short of 1.
pub const CELL_EPSILON: f64 = 1e-4;

/// Stopping tolerance of the Kolmogorov series.
const KOLMOGOROV_TOLERANCE: f64 = 1e-12;

const QUANTILE_MAX_ITERATIONS: usize = 400;
const BRACKET_MAX_DOUBLINGS: usize = 1100;

/// Shared interface of the continuous distributions.
pub trait ContinuousDistribution {
    /// Probability density at `x`.
    fn pdf(&self, x: f64) -> f64;

    /// Cumulative probability `P(X ≤ x)`.
    fn cdf(&self, x: f64) -> f64;

    /// Inverse CDF: the `x` with `P(X ≤ x) = p`.
    ///
    /// # Errors
    /// [`StatsError::InvalidProbability`] if `p` is outside `[0, 1]`.
    fn quantile(&self, p: f64) -> Result<f64>;

    /// Density at every point of `xs`, in order.
    fn pdf_all(&self, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| self.pdf(x)).collect()
    }

    /// Cumulative probability at every point of `xs`, in order.
    fn cdf_all(&self, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| self.cdf(x)).collect()
    }
}

fn check_probability(p: f64) -> Result<()> {
    if p.is_nan() || !(0.0..=1.0).contains(&p) {
        return Err(StatsError::InvalidProbability(p));
    }
    Ok(())
}

fn positive_finite(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(StatsError::InvalidParameter(format!(
            "{name} must be finite and > 0, got {value}"
        )));
    }
    Ok(())
}

/// Inverts a monotone CDF by bisection.
///
/// Starts from `[lo, hi]` and doubles the upper bound (and, when
/// `lo < 0`, the lower bound) until the interval brackets `p`.
fn invert_cdf<F: Fn(f64) -> f64>(cdf: F, p: f64, mut lo: f64, mut hi: f64) -> Result<f64> {
    for _ in 0..BRACKET_MAX_DOUBLINGS {
        if cdf(hi) >= p {
            break;
        }
        hi *= 2.0;
    }
    if lo < 0.0 {
        for _ in 0..BRACKET_MAX_DOUBLINGS {
            if cdf(lo) <= p {
                break;
            }
            lo *= 2.0;
        }
    }
    let tolerance = 1e-12 * lo.abs().max(hi.abs()).max(1.0);
    roots::bisect(|x| cdf(x) - p, lo, hi, QUANTILE_MAX_ITERATIONS, tolerance)
}

// ============================================================================
// Normal Distribution
// ============================================================================

/// Normal (Gaussian) distribution N(μ, σ²).
///
/// # Mathematical Definition
/// - PDF: φ(x) = (1/(σ√(2π))) exp(−(x−μ)²/(2σ²))
/// - CDF: Φ((x−μ)/σ) (via the complementary error function)
/// - Mean: μ
/// - Variance: σ²
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normal {
    mu: f64,
    sigma: f64,
}

impl Normal {
    /// Creates a new normal distribution N(μ, σ).
    ///
    /// # Errors
    /// Returns `Err` if `sigma ≤ 0` or parameters are not finite.
    pub fn new(mu: f64, sigma: f64) -> Result<Self> {
        if !mu.is_finite() || !sigma.is_finite() || sigma <= 0.0 {
            return Err(StatsError::InvalidParameter(format!(
                "Normal requires finite μ and σ > 0, got μ={mu}, σ={sigma}"
            )));
        }
        Ok(Self { mu, sigma })
    }

    /// Creates N(μ, σ²) from a mean and a variance.
    pub fn from_variance(mu: f64, variance: f64) -> Result<Self> {
        Self::new(mu, variance.sqrt())
    }

    /// The standard normal N(0, 1).
    pub fn standard() -> Self {
        Self {
            mu: 0.0,
            sigma: 1.0,
        }
    }

    pub fn mean(&self) -> f64 {
        self.mu
    }

    pub fn variance(&self) -> f64 {
        self.sigma * self.sigma
    }

    pub fn std_dev(&self) -> f64 {
        self.sigma
    }
}

impl ContinuousDistribution for Normal {
    fn pdf(&self, x: f64) -> f64 {
        let z = (x - self.mu) / self.sigma;
        special::standard_normal_pdf(z) / self.sigma
    }

    fn cdf(&self, x: f64) -> f64 {
        special::standard_normal_cdf((x - self.mu) / self.sigma)
    }

    /// μ + σ·Φ⁻¹(p); `±∞` at `p = 0` and `p = 1`.
    fn quantile(&self, p: f64) -> Result<f64> {
        check_probability(p)?;
        Ok(self.mu + self.sigma * special::inverse_normal_cdf(p))
    }
}

// ============================================================================
// Student's t Distribution
// ============================================================================

/// Student's t distribution with `ν` degrees of freedom.
///
/// # Mathematical Definition
/// - PDF: Γ((ν+1)/2) / (√(νπ) Γ(ν/2)) · (1 + x²/ν)^(−(ν+1)/2)
/// - CDF: for x ≥ 0, 1 − ½ I_{ν/(ν+x²)}(ν/2, ½); symmetric for x < 0
///
/// Reference: Abramowitz & Stegun (1964), *Handbook of Mathematical
/// Functions*, §26.7.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StudentsT {
    df: f64,
}

impl StudentsT {
    /// # Errors
    /// Returns `Err` unless `df` is finite and positive.
    pub fn new(df: f64) -> Result<Self> {
        positive_finite("Student's t degrees of freedom", df)?;
        Ok(Self { df })
    }

    pub fn degrees_of_freedom(&self) -> f64 {
        self.df
    }

    /// Two-tailed p-value `P(|T| ≥ |t|)`.
    ///
    /// # Examples
    /// ```
    /// use u_statcore::distributions::StudentsT;
    /// let t = StudentsT::new(10.0).unwrap();
    /// assert!((t.two_tailed_p(2.228138851986) - 0.05).abs() < 1e-6);
    /// ```
    pub fn two_tailed_p(&self, t: f64) -> f64 {
        if t.is_nan() {
            return f64::NAN;
        }
        let v = self.df;
        special::regularized_incomplete_beta(v / (v + t * t), v / 2.0, 0.5)
    }
}

impl ContinuousDistribution for StudentsT {
    fn pdf(&self, x: f64) -> f64 {
        let v = self.df;
        let ln_norm =
            special::ln_gamma((v + 1.0) / 2.0) - special::ln_gamma(v / 2.0) - 0.5 * (v * std::f64::consts::PI).ln();
        (ln_norm - (v + 1.0) / 2.0 * (x * x / v).ln_1p()).exp()
    }

    fn cdf(&self, x: f64) -> f64 {
        if x.is_nan() {
            return f64::NAN;
        }
        let tail = 0.5 * self.two_tailed_p(x);
        if x >= 0.0 {
            1.0 - tail
        } else {
            tail
        }
    }

    /// Bisection on a bracket that starts at `[−10, 10]` and widens until
    /// it contains the quantile.
    ///
    /// # Examples
    /// ```
    /// use u_statcore::distributions::{ContinuousDistribution, StudentsT};
    /// let t = StudentsT::new(10.0).unwrap();
    /// assert!((t.quantile(0.975).unwrap() - 2.228138851986).abs() < 1e-8);
    /// ```
    fn quantile(&self, p: f64) -> Result<f64> {
        check_probability(p)?;
        if p == 0.0 {
            return Ok(f64::NEG_INFINITY);
        }
        if p == 1.0 {
            return Ok(f64::INFINITY);
        }
        if p == 0.5 {
            return Ok(0.0);
        }
        invert_cdf(|x| self.cdf(x), p, -10.0, 10.0)
    }
}

// ============================================================================
// F Distribution
// ============================================================================

/// Fisher–Snedecor F distribution with `(d₁, d₂)` degrees of freedom.
///
/// # Mathematical Definition
/// - CDF: I_{d₁x/(d₁x+d₂)}(d₁/2, d₂/2) for x > 0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FisherF {
    d1: f64,
    d2: f64,
}

impl FisherF {
    /// # Errors
    /// Returns `Err` unless both degrees of freedom are finite and positive.
    pub fn new(d1: f64, d2: f64) -> Result<Self> {
        positive_finite("F numerator degrees of freedom", d1)?;
        positive_finite("F denominator degrees of freedom", d2)?;
        Ok(Self { d1, d2 })
    }

    pub fn degrees_of_freedom(&self) -> (f64, f64) {
        (self.d1, self.d2)
    }

    /// Upper-tail probability `P(F ≥ x)`.
    pub fn sf(&self, x: f64) -> f64 {
        if x.is_nan() {
            return f64::NAN;
        }
        if x <= 0.0 {
            return 1.0;
        }
        let (d1, d2) = (self.d1, self.d2);
        special::regularized_incomplete_beta(d2 / (d2 + d1 * x), d2 / 2.0, d1 / 2.0)
    }
}

impl ContinuousDistribution for FisherF {
    fn pdf(&self, x: f64) -> f64 {
        let (d1, d2) = (self.d1, self.d2);
        if x < 0.0 {
            return 0.0;
        }
        if x == 0.0 {
            return match d1.partial_cmp(&2.0) {
                Some(std::cmp::Ordering::Less) => f64::INFINITY,
                Some(std::cmp::Ordering::Equal) => 1.0,
                _ => 0.0,
            };
        }
        let ln_density = 0.5 * (d1 * (d1 * x).ln() + d2 * d2.ln() - (d1 + d2) * (d1 * x + d2).ln())
            - x.ln()
            - special::ln_beta(d1 / 2.0, d2 / 2.0);
        ln_density.exp()
    }

    fn cdf(&self, x: f64) -> f64 {
        if x.is_nan() {
            return f64::NAN;
        }
        if x <= 0.0 {
            return 0.0;
        }
        let (d1, d2) = (self.d1, self.d2);
        special::regularized_incomplete_beta(d1 * x / (d1 * x + d2), d1 / 2.0, d2 / 2.0)
    }

    fn quantile(&self, p: f64) -> Result<f64> {
        check_probability(p)?;
        if p == 0.0 {
            return Ok(0.0);
        }
        if p == 1.0 {
            return Ok(f64::INFINITY);
        }
        invert_cdf(|x| self.cdf(x), p, 0.0, 10.0)
    }
}

// ============================================================================
// Chi-squared Distribution
// ============================================================================

/// Chi-squared distribution with `k` degrees of freedom.
///
/// # Mathematical Definition
/// - PDF: x^(k/2−1) e^(−x/2) / (2^(k/2) Γ(k/2)) for x ≥ 0
/// - CDF: P(k/2, x/2), the regularized lower incomplete gamma function
///
/// [`ChiSquared::critical_value`] reads the tabulated critical values used
/// by the goodness-of-fit test instead of inverting the CDF.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChiSquared {
    k: f64,
}

impl ChiSquared {
    /// # Errors
    /// Returns `Err` unless `k` is finite and positive.
    pub fn new(k: f64) -> Result<Self> {
        positive_finite("chi-squared degrees of freedom", k)?;
        Ok(Self { k })
    }

    pub fn degrees_of_freedom(&self) -> f64 {
        self.k
    }

    /// Tabulated upper-tail critical value at `significance`.
    ///
    /// # Errors
    /// - [`StatsError::DegreesOfFreedomOutOfTable`] if `k` is not an integer
    ///   row of the table.
    /// - [`StatsError::SignificanceNotTabulated`] for an untabulated level.
    ///
    /// # Examples
    /// ```
    /// use u_statcore::distributions::ChiSquared;
    /// assert_eq!(ChiSquared::new(2.0).unwrap().critical_value(0.05).unwrap(), 5.99);
    /// ```
    pub fn critical_value(&self, significance: f64) -> Result<f64> {
        if self.k.fract() != 0.0 {
            return Err(StatsError::InvalidParameter(format!(
                "tabulated critical values need integer degrees of freedom, got {}",
                self.k
            )));
        }
        tables::chi_squared_critical_value(self.k as usize, significance)
    }
}

impl ContinuousDistribution for ChiSquared {
    fn pdf(&self, x: f64) -> f64 {
        let half_k = self.k / 2.0;
        if x < 0.0 {
            return 0.0;
        }
        if x == 0.0 {
            return match half_k.partial_cmp(&1.0) {
                Some(std::cmp::Ordering::Less) => f64::INFINITY,
                Some(std::cmp::Ordering::Equal) => 0.5,
                _ => 0.0,
            };
        }
        ((half_k - 1.0) * x.ln() - x / 2.0 - half_k * 2.0_f64.ln() - special::ln_gamma(half_k)).exp()
    }

    fn cdf(&self, x: f64) -> f64 {
        if x.is_nan() {
            return f64::NAN;
        }
        if x <= 0.0 {
            return 0.0;
        }
        special::regularized_lower_gamma(self.k / 2.0, x / 2.0)
    }

    fn quantile(&self, p: f64) -> Result<f64> {
        check_probability(p)?;
        if p == 0.0 {
            return Ok(0.0);
        }
        if p == 1.0 {
            return Ok(f64::INFINITY);
        }
        invert_cdf(|x| self.cdf(x), p, 0.0, self.k.max(1.0))
    }
}

// ============================================================================
// Kolmogorov Distribution
// ============================================================================

/// Limiting distribution of `√n · Dₙ` for the Kolmogorov–Smirnov statistic.
///
/// # Algorithm
/// For `x ≥ 1` the alternating series
/// `K(x) = 1 − 2 Σ (−1)^(k−1) e^(−2k²x²)` is summed until a term drops
/// below 1e-12. Below 1 that series cancels catastrophically, so the
/// equivalent theta-function form
/// `K(x) = (√(2π)/x) Σ e^(−(2k−1)²π²/(8x²))` is used instead.
///
/// Reference: Marsaglia, Tsang & Wang (2003), "Evaluating Kolmogorov's
/// Distribution", *Journal of Statistical Software* 8(18).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Kolmogorov;

impl Kolmogorov {
    /// Upper-tail probability `1 − K(x)`.
    pub fn sf(&self, x: f64) -> f64 {
        if x.is_nan() {
            return f64::NAN;
        }
        if x >= 1.0 {
            2.0 * alternating_terms(x).0
        } else {
            1.0 - self.cdf(x)
        }
    }
}

/// Σ (−1)^(k−1) e^(−2k²x²) and Σ (−1)^(k−1) k² e^(−2k²x²).
fn alternating_terms(x: f64) -> (f64, f64) {
    let mut sum = 0.0;
    let mut weighted = 0.0;
    let mut sign = 1.0;
    for k in 1..=1000_u32 {
        let kf = f64::from(k);
        let term = (-2.0 * kf * kf * x * x).exp();
        sum += sign * term;
        weighted += sign * kf * kf * term;
        if term < KOLMOGOROV_TOLERANCE {
            break;
        }
        sign = -sign;
    }
    (sum, weighted)
}

/// Σ e^(−(2k−1)²π²/(8x²)) and Σ (2k−1)² e^(…), the small-x theta form.
fn theta_terms(x: f64) -> (f64, f64) {
    let pi2 = std::f64::consts::PI * std::f64::consts::PI;
    let mut sum = 0.0;
    let mut weighted = 0.0;
    for k in 1..=1000_u32 {
        let odd = f64::from(2 * k - 1);
        let term = (-odd * odd * pi2 / (8.0 * x * x)).exp();
        sum += term;
        weighted += odd * odd * term;
        if term < KOLMOGOROV_TOLERANCE * sum.max(f64::MIN_POSITIVE) {
            break;
        }
    }
    (sum, weighted)
}

impl ContinuousDistribution for Kolmogorov {
    fn pdf(&self, x: f64) -> f64 {
        if x.is_nan() {
            return f64::NAN;
        }
        if x <= 0.0 {
            return 0.0;
        }
        if x >= 1.0 {
            8.0 * x * alternating_terms(x).1
        } else {
            let sqrt_2pi = (2.0 * std::f64::consts::PI).sqrt();
            let pi2 = std::f64::consts::PI * std::f64::consts::PI;
            let (sum, weighted) = theta_terms(x);
            sqrt_2pi / (x * x) * (pi2 / (4.0 * x * x) * weighted - sum)
        }
    }

    /// # Examples
    /// ```
    /// use u_statcore::distributions::{ContinuousDistribution, Kolmogorov};
    /// assert!((Kolmogorov.cdf(1.3580986393225505) - 0.95).abs() < 1e-9);
    /// ```
    fn cdf(&self, x: f64) -> f64 {
        if x.is_nan() {
            return f64::NAN;
        }
        if x <= 0.0 {
            return 0.0;
        }
        let value = if x >= 1.0 {
            1.0 - 2.0 * alternating_terms(x).0
        } else {
            let sqrt_2pi = (2.0 * std::f64::consts::PI).sqrt();
            sqrt_2pi / x * theta_terms(x).0
        };
        value.clamp(0.0, 1.0)
    }

    /// Bisection starting on `[0, 1]`, doubling the upper bound as needed.
    fn quantile(&self, p: f64) -> Result<f64> {
        check_probability(p)?;
        if p == 0.0 {
            return Ok(0.0);
        }
        if p == 1.0 {
            return Ok(f64::INFINITY);
        }
        invert_cdf(|x| self.cdf(x), p, 0.0, 1.0)
    }
}

// ============================================================================
// Discrete Distributions
// ============================================================================

/// Binomial distribution: successes in `n` independent trials.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Binomial {
    trials: u64,
    probability: f64,
}

impl Binomial {
    /// # Errors
    /// - [`StatsError::InvalidCount`] if `trials == 0`.
    /// - [`StatsError::InvalidProbability`] if `probability ∉ [0, 1]`.
    pub fn new(trials: u64, probability: f64) -> Result<Self> {
        if trials == 0 {
            return Err(StatsError::InvalidCount {
                name: "trials",
                value: 0,
            });
        }
        check_probability(probability)?;
        Ok(Self {
            trials,
            probability,
        })
    }

    pub fn mean(&self) -> f64 {
        self.trials as f64 * self.probability
    }

    pub fn variance(&self) -> f64 {
        self.trials as f64 * self.probability * (1.0 - self.probability)
    }

    /// `P(X = k)`.
    pub fn pmf(&self, k: u64) -> f64 {
        let (n, p) = (self.trials, self.probability);
        if k > n {
            return 0.0;
        }
        if p == 0.0 {
            return if k == 0 { 1.0 } else { 0.0 };
        }
        if p == 1.0 {
            return if k == n { 1.0 } else { 0.0 };
        }
        let (nf, kf) = (n as f64, k as f64);
        let ln_choose =
            special::ln_gamma(nf + 1.0) - special::ln_gamma(kf + 1.0) - special::ln_gamma(nf - kf + 1.0);
        (ln_choose + kf * p.ln() + (nf - kf) * (1.0 - p).ln()).exp()
    }

    /// Probability mass of `0, 1, 2, …` until the cumulative mass reaches
    /// `1 − 1e-4` (or every outcome up to `n` is listed).
    ///
    /// # Algorithm
    /// Each cell is [`Binomial::pmf`], evaluated through `ln Γ` so that
    /// `C(n, x)` and `pˣ(1 − p)ⁿ⁻ˣ` never leave floating-point range on
    /// their own.
    ///
    /// # Examples
    /// ```
    /// use u_statcore::distributions::Binomial;
    /// let cells = Binomial::new(6, 0.3).unwrap().cells();
    /// assert_eq!(cells.len(), 7);
    /// assert!((cells[2] - 0.324135).abs() < 1e-9);
    /// ```
    pub fn cells(&self) -> Vec<f64> {
        let mut cells = Vec::new();
        let mut cumulative = 0.0;
        for x in 0..=self.trials {
            let cell = self.pmf(x);
            cells.push(cell);
            cumulative += cell;
            if cumulative >= 1.0 - CELL_EPSILON {
                break;
            }
        }
        cells
    }
}

/// Poisson distribution with rate `λ`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Poisson {
    lambda: f64,
}

impl Poisson {
    /// # Errors
    /// Returns `Err` unless `lambda` is finite and positive.
    pub fn new(lambda: f64) -> Result<Self> {
        positive_finite("Poisson rate", lambda)?;
        Ok(Self { lambda })
    }

    pub fn mean(&self) -> f64 {
        self.lambda
    }

    pub fn variance(&self) -> f64 {
        self.lambda
    }

    /// `P(X = k) = λᵏ e^(−λ) / k!`.
    pub fn pmf(&self, k: u64) -> f64 {
        let kf = k as f64;
        (kf * self.lambda.ln() - self.lambda - special::ln_gamma(kf + 1.0)).exp()
    }

    /// Probability mass of `0, 1, 2, …` until the cumulative mass reaches
    /// `1 − 1e-4`.
    ///
    /// The factorial is carried from cell to cell in log space, so large
    /// rates do not underflow `e^(−λ)` to zero.
    pub fn cells(&self) -> Vec<f64> {
        let ln_lambda = self.lambda.ln();
        let mut ln_cell = -self.lambda;
        let mut cells = Vec::new();
        let mut cumulative = 0.0;
        let mut x = 0.0_f64;
        loop {
            let cell = ln_cell.exp();
            cells.push(cell);
            cumulative += cell;
            if cumulative >= 1.0 - CELL_EPSILON {
                break;
            }
            x += 1.0;
            ln_cell += ln_lambda - x.ln();
        }
        cells
    }
}

/// Bernoulli distribution: a single trial succeeding with probability `p`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bernoulli {
    probability: f64,
}

impl Bernoulli {
    /// # Errors
    /// [`StatsError::InvalidProbability`] if `p ∉ [0, 1]`.
    pub fn new(probability: f64) -> Result<Self> {
        check_probability(probability)?;
        Ok(Self { probability })
    }

    pub fn mean(&self) -> f64 {
        self.probability
    }

    pub fn variance(&self) -> f64 {
        self.probability * (1.0 - self.probability)
    }

    pub fn pmf(&self, k: u64) -> f64 {
        match k {
            0 => 1.0 - self.probability,
            1 => self.probability,
            _ => 0.0,
        }
    }

    /// `[1 − p, p]`.
    pub fn cells(&self) -> Vec<f64> {
        vec![1.0 - self.probability, self.probability]
    }
}

// ============================================================================
// Tests
// ============================================================================
