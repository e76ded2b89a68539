//! Distance summaries from the per-pixel ansatz distance posterior.
//!
//! Each pixel of a 3D localization carries `(mu, sigma, norm)` describing
//! `p(r) ∝ r² · norm · N(r; mu, sigma)`. The estimator samples that density
//! on a uniform grid over `[rmin, rmax]`, renormalizes it with the
//! trapezoidal rule and reports its mean and standard deviation.

use crate::lookup::round_to;
use crate::skymap::{AnsatzParams, SkyMap};
use crate::{Error, Result};
use rayon::prelude::*;
use serde::Serialize;
use skytag_core::constants::TWOPI;

/// Default number of grid points.
pub const DEFAULT_STEPS: usize = 10_000;

/// Decimal places kept in reported distances.
const DISTANCE_DECIMALS: i32 = 2;

/// Mean and standard deviation in Mpc; both `None` when the map has no
/// distance information or the pixel's posterior cannot be integrated.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct DistanceEstimate {
    pub mean: Option<f64>,
    pub std: Option<f64>,
}

impl DistanceEstimate {
    pub const UNKNOWN: Self = Self {
        mean: None,
        std: None,
    };

    pub fn is_known(&self) -> bool {
        self.mean.is_some() && self.std.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceEstimator {
    rmin: f64,
    rmax: f64,
    steps: usize,
}

impl DistanceEstimator {
    pub fn new(rmin: f64, rmax: f64, steps: usize) -> Result<Self> {
        if steps < 2 {
            return Err(Error::InvalidConfiguration(format!(
                "distance integration needs at least 2 grid points, got {}",
                steps
            )));
        }
        if !(rmin.is_finite() && rmax.is_finite()) || rmax <= rmin {
            return Err(Error::InvalidConfiguration(format!(
                "distance integration range [{}, {}] is empty",
                rmin, rmax
            )));
        }
        Ok(Self { rmin, rmax, steps })
    }

    /// An estimator integrating up to the map's [`SkyMap::rmax`].
    pub fn for_map(map: &SkyMap, rmin: f64, steps: usize) -> Result<Self> {
        Self::new(rmin, map.rmax(), steps)
    }

    pub fn rmin(&self) -> f64 {
        self.rmin
    }

    pub fn rmax(&self) -> f64 {
        self.rmax
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Estimates for many pixels, in input order.
    pub fn estimate(&self, params: &[AnsatzParams]) -> Vec<DistanceEstimate> {
        params.par_iter().map(|p| self.estimate_one(p)).collect()
    }

    pub fn estimate_one(&self, params: &AnsatzParams) -> DistanceEstimate {
        let AnsatzParams { mu, sigma, norm } = *params;
        if !(mu.is_finite() && sigma.is_finite() && norm.is_finite()) || sigma <= 0.0 {
            log::warn!(
                "Undefined distance posterior (mu={}, sigma={}, norm={}); no estimate",
                mu,
                sigma,
                norm
            );
            return DistanceEstimate::UNKNOWN;
        }

        let h = (self.rmax - self.rmin) / (self.steps - 1) as f64;
        let radii: Vec<f64> = (0..self.steps).map(|i| self.rmin + i as f64 * h).collect();
        let pdf: Vec<f64> = radii
            .iter()
            .map(|&r| r * r * norm * normal_pdf(r, mu, sigma))
            .collect();

        let mass = trapezoid(h, pdf.iter().copied());
        if !(mass.is_finite() && mass > 0.0) {
            log::warn!(
                "Distance posterior (mu={}, sigma={}) has no mass on [{}, {}]; no estimate",
                mu,
                sigma,
                self.rmin,
                self.rmax
            );
            return DistanceEstimate::UNKNOWN;
        }

        let mean = trapezoid(h, radii.iter().zip(&pdf).map(|(r, p)| r * p / mass));
        let variance = trapezoid(
            h,
            radii
                .iter()
                .zip(&pdf)
                .map(|(r, p)| (r - mean) * (r - mean) * p / mass),
        );
        let std = variance.max(0.0).sqrt();

        if !(mean.is_finite() && std.is_finite()) {
            return DistanceEstimate::UNKNOWN;
        }

        DistanceEstimate {
            mean: Some(round_to(mean, DISTANCE_DECIMALS)),
            std: Some(round_to(std, DISTANCE_DECIMALS)),
        }
    }
}

fn normal_pdf(x: f64, mu: f64, sigma: f64) -> f64 {
    let z = (x - mu) / sigma;
    (-0.5 * z * z).exp() / (sigma * TWOPI.sqrt())
}

/// Trapezoidal integral of equally spaced samples.
fn trapezoid(h: f64, samples: impl ExactSizeIterator<Item = f64>) -> f64 {
    let last = samples.len().saturating_sub(1);
    let sum: f64 = samples
        .enumerate()
        .map(|(i, y)| if i == 0 || i == last { 0.5 * y } else { y })
        .sum();
    sum * h
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn params(mu: f64, sigma: f64, norm: f64) -> AnsatzParams {
        AnsatzParams { mu, sigma, norm }
    }

    #[test]
    fn test_reference_posterior() {
        let estimator = DistanceEstimator::new(0.0, 500.0, DEFAULT_STEPS).unwrap();
        let estimate = estimator.estimate_one(&params(100.0, 10.0, 1e-4));

        assert_eq!(estimate.mean, Some(101.98));
        assert_eq!(estimate.std, Some(9.9));
    }

    #[test]
    fn test_norm_does_not_matter() {
        let estimator = DistanceEstimator::new(0.0, 500.0, DEFAULT_STEPS).unwrap();
        assert_eq!(
            estimator.estimate_one(&params(250.0, 80.0, 1e-6)),
            estimator.estimate_one(&params(250.0, 80.0, 3.5))
        );
    }

    #[test]
    fn test_wide_posterior_is_pulled_outward() {
        let estimator = DistanceEstimator::new(0.0, 500.0, DEFAULT_STEPS).unwrap();
        let estimate = estimator.estimate_one(&params(250.0, 80.0, 1.0));
        assert_relative_eq!(estimate.mean.unwrap(), 295.65, epsilon = 1e-9);
        assert_relative_eq!(estimate.std.unwrap(), 72.56, epsilon = 1e-9);
    }

    #[test]
    fn test_batch_keeps_order() {
        let estimator = DistanceEstimator::new(0.0, 500.0, 2000).unwrap();
        let batch = [params(100.0, 10.0, 1.0), params(400.0, 100.0, 1.0), params(100.0, 10.0, 1.0)];
        let estimates = estimator.estimate(&batch);

        assert_eq!(estimates.len(), 3);
        assert_eq!(estimates[0], estimates[2]);
        assert!(estimates[1].mean.unwrap() > estimates[0].mean.unwrap());
        for (estimate, p) in estimates.iter().zip(&batch) {
            assert_eq!(*estimate, estimator.estimate_one(p));
        }
    }

    #[test]
    fn test_undefined_posteriors_have_no_estimate() {
        let estimator = DistanceEstimator::new(0.0, 500.0, 1000).unwrap();
        for p in [
            params(f64::INFINITY, 1.0, 0.0),
            params(f64::NAN, 10.0, 1.0),
            params(100.0, 0.0, 1.0),
            params(100.0, -5.0, 1.0),
            params(100.0, 10.0, 0.0),
            // All mass far beyond rmax underflows to zero.
            params(1e6, 1.0, 1.0),
        ] {
            let estimate = estimator.estimate_one(&p);
            assert_eq!(estimate, DistanceEstimate::UNKNOWN, "{:?}", p);
            assert!(!estimate.is_known());
        }
    }

    #[test]
    fn test_invalid_grid() {
        assert!(matches!(
            DistanceEstimator::new(0.0, 500.0, 1),
            Err(Error::InvalidConfiguration(_))
        ));
        assert!(matches!(
            DistanceEstimator::new(100.0, 100.0, 100),
            Err(Error::InvalidConfiguration(_))
        ));
        assert!(DistanceEstimator::new(0.0, f64::INFINITY, 100).is_err());
    }

    #[test]
    fn test_trapezoid_exact_for_linear() {
        // ∫₀¹ x dx on 11 points
        let h = 0.1;
        let samples: Vec<f64> = (0..11).map(|i| i as f64 * h).collect();
        assert_relative_eq!(trapezoid(h, samples.into_iter()), 0.5, epsilon = 1e-12);
    }
}
