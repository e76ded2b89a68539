//! Credibility lookups for batches of sky positions.

use crate::distance::{DistanceEstimate, DistanceEstimator, DEFAULT_STEPS};
use crate::matcher::match_coordinates;
use crate::skymap::{AnsatzParams, SkyMap};
use crate::{Error, Result};
use serde::Serialize;
use std::path::Path;

const CREDIBILITY_DECIMALS: i32 = 2;
const TIME_DELTA_DECIMALS: i32 = 5;
const DENSITY_DECIMALS: i32 = 5;

/// Which optional outputs a lookup fills in, and the distance grid to use.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LookupOptions {
    pub distance: bool,
    pub probability_density: bool,
    pub distance_steps: usize,
    pub distance_rmin: f64,
}

impl Default for LookupOptions {
    fn default() -> Self {
        Self {
            distance: false,
            probability_density: false,
            distance_steps: DEFAULT_STEPS,
            distance_rmin: 0.0,
        }
    }
}

impl LookupOptions {
    pub fn with_distance(mut self, distance: bool) -> Self {
        self.distance = distance;
        self
    }

    pub fn with_probability_density(mut self, probability_density: bool) -> Self {
        self.probability_density = probability_density;
        self
    }

    pub fn with_distance_grid(mut self, rmin: f64, steps: usize) -> Self {
        self.distance_rmin = rmin;
        self.distance_steps = steps;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LookupResult {
    /// Percent of the map's probability in pixels at least as dense as this one.
    pub credibility: f64,
    /// Days from the map's `MJD-OBS` to the query MJD; negative is before.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_delta: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<DistanceEstimate>,
    /// Per steradian.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probability_density: Option<f64>,
}

/// Rounds half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Looks up each `(ra[i], dec[i])` position (degrees) in the map at
/// `map_path`, with `mjd[i]` giving the event time when supplied.
///
/// Input lengths are checked before the map is read.
pub fn lookup<P: AsRef<Path>>(
    ra: &[f64],
    dec: &[f64],
    map_path: P,
    mjd: Option<&[f64]>,
    options: &LookupOptions,
) -> Result<Vec<LookupResult>> {
    check_lengths(ra, dec, mjd)?;
    if options.distance && options.distance_steps < 2 {
        return Err(Error::InvalidConfiguration(format!(
            "distance integration needs at least 2 grid points, got {}",
            options.distance_steps
        )));
    }

    let map = SkyMap::load(map_path)?;
    lookup_in_map(&map, ra, dec, mjd, options)
}

/// [`lookup`] for a single position.
pub fn lookup_one<P: AsRef<Path>>(
    ra: f64,
    dec: f64,
    map_path: P,
    mjd: Option<f64>,
    options: &LookupOptions,
) -> Result<LookupResult> {
    let mjd = mjd.map(|m| [m]);
    let mut results = lookup(&[ra], &[dec], map_path, mjd.as_ref().map(|m| &m[..]), options)?;
    results
        .pop()
        .ok_or_else(|| Error::DimensionMismatch("no result for a single query".to_string()))
}

/// [`lookup`] against a map that is already loaded.
pub fn lookup_in_map(
    map: &SkyMap,
    ra: &[f64],
    dec: &[f64],
    mjd: Option<&[f64]>,
    options: &LookupOptions,
) -> Result<Vec<LookupResult>> {
    check_lengths(ra, dec, mjd)?;
    log::debug!(
        "Looking up {} position(s) in {}",
        ra.len(),
        map.path().display()
    );

    let matched = match_coordinates(map, ra, dec)?;

    let distances = if options.distance {
        let estimator =
            DistanceEstimator::for_map(map, options.distance_rmin, options.distance_steps)?;
        let params: Option<Vec<AnsatzParams>> = matched.iter().map(|p| p.ansatz).collect();
        Some(match params {
            Some(params) => estimator.estimate(&params),
            None => vec![DistanceEstimate::UNKNOWN; matched.len()],
        })
    } else {
        None
    };

    let results: Vec<LookupResult> = matched
        .iter()
        .enumerate()
        .map(|(i, pixel)| LookupResult {
            credibility: round_to(pixel.cumprob * 100.0, CREDIBILITY_DECIMALS),
            time_delta: mjd.map(|m| round_to(m[i] - map.mjd_obs(), TIME_DELTA_DECIMALS)),
            distance: distances.as_ref().map(|d| d[i]),
            probability_density: options
                .probability_density
                .then(|| round_to(pixel.probdensity, DENSITY_DECIMALS)),
        })
        .collect();

    log::debug!("Lookup finished: {} result(s)", results.len());
    Ok(results)
}

fn check_lengths(ra: &[f64], dec: &[f64], mjd: Option<&[f64]>) -> Result<()> {
    if ra.len() != dec.len() {
        return Err(Error::DimensionMismatch(format!(
            "{} right ascensions but {} declinations",
            ra.len(),
            dec.len()
        )));
    }
    if let Some(mjd) = mjd {
        if mjd.len() != ra.len() {
            return Err(Error::DimensionMismatch(format!(
                "{} positions but {} MJDs",
                ra.len(),
                mjd.len()
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(49.999999, 2), 50.0);
        assert_eq!(round_to(-28.742619, 5), -28.74262);
        assert_eq!(round_to(0.125, 2), 0.13);
        assert_eq!(round_to(-0.125, 2), -0.13);
    }

    #[test]
    fn test_credibility_and_time_delta() {
        let file = fixtures::uniform_map();
        let results = lookup(
            &[90.0, 45.0],
            &[0.0, 60.0],
            file.path(),
            Some(&[60034.257381, 60070.5]),
            &LookupOptions::default(),
        )
        .unwrap();

        assert_eq!(results[0].credibility, 50.0);
        assert_eq!(results[0].time_delta, Some(-28.74262));
        assert_eq!(results[1].credibility, 8.33);
        assert_eq!(results[1].time_delta, Some(7.5));
        assert!(results.iter().all(|r| r.distance.is_none() && r.probability_density.is_none()));
    }

    #[test]
    fn test_optional_outputs() {
        let file = fixtures::uniform_map();
        let options = LookupOptions::default()
            .with_distance(true)
            .with_probability_density(true);
        let result = lookup_one(90.0, 0.0, file.path(), None, &options).unwrap();

        assert_eq!(result.time_delta, None);
        assert_eq!(result.distance, Some(DistanceEstimate::UNKNOWN));
        assert_eq!(result.probability_density, Some(0.07958));
    }

    #[test]
    fn test_distance_from_ansatz() {
        let file = fixtures::distance_map(100.0, 10.0, 1e-4);
        let options = LookupOptions::default().with_distance(true);
        let result = lookup_one(10.343234, 14.345532, file.path(), None, &options).unwrap();

        let distance = result.distance.unwrap();
        assert_eq!(distance.mean, Some(101.98));
        assert_eq!(distance.std, Some(9.9));
    }

    #[test]
    fn test_lengths_checked_before_loading() {
        let options = LookupOptions::default();
        let missing = "/nonexistent/skymap.fits";

        assert!(matches!(
            lookup(&[1.0, 2.0], &[1.0], missing, None, &options),
            Err(Error::DimensionMismatch(_))
        ));
        assert!(matches!(
            lookup(&[1.0], &[1.0], missing, Some(&[1.0, 2.0]), &options),
            Err(Error::DimensionMismatch(_))
        ));
        assert!(matches!(
            lookup(&[1.0], &[1.0], missing, None, &options),
            Err(Error::MapRead { .. })
        ));
    }

    #[test]
    fn test_bad_distance_grid() {
        let file = fixtures::distance_map(100.0, 10.0, 1.0);
        let options = LookupOptions::default()
            .with_distance(true)
            .with_distance_grid(0.0, 1);
        assert!(matches!(
            lookup_one(10.0, 10.0, file.path(), None, &options),
            Err(Error::InvalidConfiguration(_))
        ));

        let options = LookupOptions::default()
            .with_distance(true)
            .with_distance_grid(600.0, 100);
        assert!(matches!(
            lookup_one(10.0, 10.0, file.path(), None, &options),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_json_shape() {
        let result = LookupResult {
            credibility: 50.0,
            time_delta: None,
            distance: Some(DistanceEstimate::UNKNOWN),
            probability_density: None,
        };
        assert_eq!(
            serde_json::to_string(&result).unwrap(),
            r#"{"credibility":50.0,"distance":{"mean":null,"std":null}}"#
        );
    }
}
