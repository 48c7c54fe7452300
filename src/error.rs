//! Error type shared by every module in the crate.
//!
//! Hard input-contract violations are reported through [`StatsError`].
//! Numerically undefined results (a NaN in the input to a sum, Γ at a
//! non-positive integer) are *not* errors: they surface as `f64::NAN` and
//! propagate through further arithmetic.

/// Errors raised by statistical operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StatsError {
    /// The sample is smaller than the operation's minimum size.
    #[error("{operation} requires at least {required} data point(s), got {actual}")]
    InsufficientData {
        operation: &'static str,
        required: usize,
        actual: usize,
    },

    /// Paired inputs have different lengths.
    #[error("paired inputs must have equal length, got {left} and {right}")]
    LengthMismatch { left: usize, right: usize },

    /// A probability or quantile fraction lies outside its valid range.
    #[error("probability must lie within [0, 1], got {0}")]
    InvalidProbability(f64),

    /// Parameters violate a distribution or procedure constraint.
    #[error("invalid parameters: {0}")]
    InvalidParameter(String),

    /// A count argument (chunk size, trials, iterations, clusters) is not positive.
    #[error("{name} must be a positive integer, got {value}")]
    InvalidCount { name: &'static str, value: usize },

    /// More clusters were requested than there are data points.
    #[error("cannot generate {clusters} clusters from {points} data point(s)")]
    TooManyClusters { clusters: usize, points: usize },

    /// A kernel name did not match any known kernel.
    #[error("unknown kernel \"{0}\"")]
    UnknownKernel(String),

    /// A bandwidth-method name did not match any known method.
    #[error("unknown bandwidth method \"{0}\"")]
    UnknownBandwidth(String),

    /// An alternative-hypothesis name did not match any known alternative.
    #[error("unknown alternative hypothesis \"{0}\"")]
    UnknownAlternative(String),

    /// A k-means centroid finished an assignment pass with no points.
    #[error("centroid {cluster} has no points")]
    EmptyCluster { cluster: usize },

    /// Chi-squared critical values are not tabulated for these degrees of freedom.
    #[error("no chi-squared critical values tabulated for {0} degrees of freedom")]
    DegreesOfFreedomOutOfTable(usize),

    /// Chi-squared critical values are not tabulated for this significance level.
    #[error("no chi-squared critical values tabulated for significance {0}")]
    SignificanceNotTabulated(f64),

    /// An iterative method exhausted its iteration budget.
    #[error("{method} did not converge within {iterations} iterations")]
    NoConvergence {
        method: &'static str,
        iterations: usize,
    },

    /// A value lies outside the domain an operation accepts.
    #[error("{0}")]
    OutOfDomain(String),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, StatsError>;

/// Fails with [`StatsError::InsufficientData`] when `data` is shorter than `required`.
pub(crate) fn require_len(operation: &'static str, data: &[f64], required: usize) -> Result<()> {
    if data.len() < required {
        return Err(StatsError::InsufficientData {
            operation,
            required,
            actual: data.len(),
        });
    }
    Ok(())
}

/// Fails with [`StatsError::LengthMismatch`] when the two slices differ in length.
pub(crate) fn require_same_len<A, B>(x: &[A], y: &[B]) -> Result<()> {
    if x.len() != y.len() {
        return Err(StatsError::LengthMismatch {
            left: x.len(),
            right: y.len(),
        });
    }
    Ok(())
}
