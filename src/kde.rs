//! Kernel density estimation.
//!
//! A [`KernelDensity`] owns a sorted copy of the sample and evaluates
//! `f̂(x) = (1 / nh) · Σ K((x − xᵢ) / h)` in O(n) per point.
//!
//! # Examples
//!
//! ```
//! use u_statcore::kde::{Bandwidth, Kernel, KernelDensity};
//!
//! let kde = KernelDensity::new(&[0.0], Kernel::Gaussian, Bandwidth::Fixed(1.0)).unwrap();
//! assert!((kde.density(0.0) - 0.3989422804014327).abs() < 1e-15);
//!
//! let kernel: Kernel = "gaussian".parse().unwrap();
//! let bandwidth: Bandwidth = "nrd".parse().unwrap();
//! let kde = KernelDensity::new(&[1.0, 2.0, 2.5, 4.0, 7.0], kernel, bandwidth).unwrap();
//! assert!(kde.density(2.5) > kde.density(7.0));
//! ```

use std::str::FromStr;

use crate::error::{require_len, Result, StatsError};
use crate::quantile::numeric_sort;
use crate::special::standard_normal_pdf;
use crate::stats;

/// Gaussian terms beyond this many bandwidths underflow to exactly zero.
const GAUSSIAN_CUTOFF: f64 = 40.0;

/// Smoothing kernel `K(u)`.
#[derive(Debug, Clone, Copy, Default)]
pub enum Kernel {
    /// Standard normal density.
    #[default]
    Gaussian,
    /// Caller-supplied kernel, expected to integrate to 1.
    Custom(fn(f64) -> f64),
}

impl Kernel {
    pub fn evaluate(&self, u: f64) -> f64 {
        match self {
            Kernel::Gaussian => standard_normal_pdf(u),
            Kernel::Custom(k) => k(u),
        }
    }
}

impl FromStr for Kernel {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "gaussian" => Ok(Kernel::Gaussian),
            other => Err(StatsError::UnknownKernel(other.to_string())),
        }
    }
}

/// How the bandwidth `h` is chosen.
#[derive(Debug, Clone, Copy, Default)]
pub enum Bandwidth {
    /// Normal-reference rule of thumb:
    /// `h = 1.06 · min(s, IQR / 1.34) · n^(−1/5)`, using `s` alone when
    /// the IQR is zero.
    #[default]
    Nrd,
    Fixed(f64),
    /// Caller-supplied selector applied to the sample.
    Custom(fn(&[f64]) -> f64),
}

impl Bandwidth {
    /// Bandwidth this rule assigns to `data`.
    ///
    /// # Errors
    /// - [`StatsError::InsufficientData`] when [`Bandwidth::Nrd`] is given
    ///   fewer than two values.
    /// - [`StatsError::InvalidParameter`] when the result is not positive
    ///   and finite (e.g. a constant sample under the rule of thumb).
    pub fn select(&self, data: &[f64]) -> Result<f64> {
        let h = match self {
            Bandwidth::Nrd => nrd(data)?,
            Bandwidth::Fixed(h) => *h,
            Bandwidth::Custom(select) => select(data),
        };
        if !(h.is_finite() && h > 0.0) {
            return Err(StatsError::InvalidParameter(format!(
                "bandwidth must be positive and finite, got {h}"
            )));
        }
        Ok(h)
    }
}

impl FromStr for Bandwidth {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "nrd" => Ok(Bandwidth::Nrd),
            other => Err(StatsError::UnknownBandwidth(other.to_string())),
        }
    }
}

fn nrd(data: &[f64]) -> Result<f64> {
    let sd = stats::sample_standard_deviation(data)?;
    let iqr = stats::interquartile_range(data)?;
    // a tied middle half says nothing about spread
    let spread = if iqr == 0.0 { sd } else { sd.min(iqr / 1.34) };
    Ok(1.06 * spread * (data.len() as f64).powf(-0.2))
}

/// Density estimator fitted to one sample.
#[derive(Debug, Clone)]
pub struct KernelDensity {
    data: Vec<f64>,
    kernel: Kernel,
    bandwidth: f64,
}

impl KernelDensity {
    /// Fits an estimator to `data`.
    ///
    /// # Errors
    /// - [`StatsError::InsufficientData`] for an empty sample.
    /// - Any error from [`Bandwidth::select`].
    pub fn new(data: &[f64], kernel: Kernel, bandwidth: Bandwidth) -> Result<Self> {
        require_len("kernel density estimation", data, 1)?;
        let bandwidth = bandwidth.select(data)?;
        Ok(Self {
            data: numeric_sort(data),
            kernel,
            bandwidth,
        })
    }

    /// Gaussian kernel with the rule-of-thumb bandwidth.
    pub fn gaussian(data: &[f64]) -> Result<Self> {
        Self::new(data, Kernel::Gaussian, Bandwidth::Nrd)
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    pub fn kernel(&self) -> Kernel {
        self.kernel
    }

    /// Estimated density at `x`.
    pub fn density(&self, x: f64) -> f64 {
        let h = self.bandwidth;
        let window = match self.kernel {
            // sorted data: skip points whose contribution is exactly zero
            Kernel::Gaussian => {
                let start = self.data.partition_point(|&xi| xi < x - GAUSSIAN_CUTOFF * h);
                let end = self.data.partition_point(|&xi| xi <= x + GAUSSIAN_CUTOFF * h);
                &self.data[start..end]
            }
            Kernel::Custom(_) => &self.data[..],
        };
        let total: f64 = window
            .iter()
            .map(|&xi| self.kernel.evaluate((x - xi) / h))
            .sum();
        total / (self.data.len() as f64 * h)
    }

    pub fn density_all(&self, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| self.density(x)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrate::integrate;

    fn box_kernel(u: f64) -> f64 {
        if u.abs() <= 1.0 {
            0.5
        } else {
            0.0
        }
    }

    #[test]
    fn test_parse_names() {
        assert!(matches!("gaussian".parse::<Kernel>(), Ok(Kernel::Gaussian)));
        assert!(matches!("nrd".parse::<Bandwidth>(), Ok(Bandwidth::Nrd)));
        assert_eq!(
            "epanechnikov".parse::<Kernel>().unwrap_err(),
            StatsError::UnknownKernel("epanechnikov".into())
        );
        assert_eq!(
            "silverman".parse::<Bandwidth>().unwrap_err(),
            StatsError::UnknownBandwidth("silverman".into())
        );
    }

    #[test]
    fn test_nrd_rule() {
        let data = [2.0, 3.5, 1.0, 8.0, 4.0, 4.5, 6.0];
        let sd = stats::sample_standard_deviation(&data).unwrap();
        let iqr = stats::interquartile_range(&data).unwrap();
        let expected = 1.06 * sd.min(iqr / 1.34) * 7.0_f64.powf(-0.2);
        let kde = KernelDensity::gaussian(&data).unwrap();
        assert!((kde.bandwidth() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_nrd_with_tied_middle_half() {
        let mut data = vec![2.0; 9];
        data.push(9.0);
        assert_eq!(stats::interquartile_range(&data).unwrap(), 0.0);
        let sd = stats::sample_standard_deviation(&data).unwrap();
        let kde = KernelDensity::gaussian(&data).unwrap();
        assert!((kde.bandwidth() - 1.06 * sd * 10.0_f64.powf(-0.2)).abs() < 1e-12);
        assert!(kde.density(2.0) > kde.density(9.0));
    }

    #[test]
    fn test_density_integrates_to_one() {
        let kde = KernelDensity::gaussian(&[1.0, 2.0, 2.5, 4.0, 7.0]).unwrap();
        let area = integrate(|x| kde.density(x), -15.0, 25.0);
        assert!((area - 1.0).abs() < 1e-6, "area = {area}");
    }

    #[test]
    fn test_custom_kernel_and_fixed_bandwidth() {
        let kde = KernelDensity::new(&[0.0], Kernel::Custom(box_kernel), Bandwidth::Fixed(2.0)).unwrap();
        assert_eq!(kde.density(1.0), 0.25);
        assert_eq!(kde.density(3.0), 0.0);
        assert_eq!(kde.density_all(&[-1.0, 5.0]), vec![0.25, 0.0]);
    }

    #[test]
    fn test_custom_bandwidth() {
        fn range(data: &[f64]) -> f64 {
            data.iter().cloned().fold(f64::NEG_INFINITY, f64::max)
                - data.iter().cloned().fold(f64::INFINITY, f64::min)
        }
        let kde = KernelDensity::new(&[1.0, 4.0], Kernel::Gaussian, Bandwidth::Custom(range)).unwrap();
        assert_eq!(kde.bandwidth(), 3.0);
    }

    #[test]
    fn test_degenerate_bandwidths() {
        assert!(matches!(
            KernelDensity::gaussian(&[3.0, 3.0, 3.0]),
            Err(StatsError::InvalidParameter(_))
        ));
        assert!(matches!(
            KernelDensity::gaussian(&[3.0]),
            Err(StatsError::InsufficientData { .. })
        ));
        assert!(KernelDensity::new(&[1.0], Kernel::Gaussian, Bandwidth::Fixed(0.0)).is_err());
        assert!(KernelDensity::new(&[], Kernel::Gaussian, Bandwidth::Fixed(1.0)).is_err());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn single_point_density_peaks_at_the_point(
            center in -100.0_f64..100.0,
            h in 0.01_f64..10.0,
            offset in 0.0_f64..50.0,
        ) {
            let kde = KernelDensity::new(&[center], Kernel::Gaussian, Bandwidth::Fixed(h)).unwrap();
            let peak = kde.density(center);
            let away = kde.density(center + offset);
            prop_assert!(away >= 0.0);
            prop_assert!(away <= peak);
        }
    }
}
