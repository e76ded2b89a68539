//! Small multi-order maps written to temp files for unit tests.

use skytag_core::constants::FOUR_PI_SR;
use skytag_fits::test_utils::{MockColumn, MockFitsBuilder};
use tempfile::NamedTempFile;

pub const MJD_OBS: f64 = 60063.0;

/// Area of a level-0 and a level-1 pixel.
pub const AREA_L0: f64 = FOUR_PI_SR / 12.0;
pub const AREA_L1: f64 = FOUR_PI_SR / 48.0;

pub fn map_file(uniq: Vec<i64>, density: Vec<f64>) -> NamedTempFile {
    MockFitsBuilder::new()
        .simple_primary()
        .binary_table(&[
            ("UNIQ", MockColumn::Long(uniq)),
            ("PROBDENSITY", MockColumn::Double(density)),
        ])
        .real("MJD-OBS", MJD_OBS)
        .build_temp_file()
}

/// Twelve level-0 pixels of equal density: each holds 1/12 of the sky.
pub fn uniform_map() -> NamedTempFile {
    map_file((4..16).collect(), vec![1.0 / FOUR_PI_SR; 12])
}

/// Face 0 split into four level-1 pixels with probabilities 0.05, 0.07,
/// 0.08, 0.10 (UNIQ 16..=19); faces 1..=11 at level 0 share 0.7 equally.
pub fn mixed_map() -> NamedTempFile {
    let mut uniq: Vec<i64> = (16..20).collect();
    let mut density: Vec<f64> = [0.05, 0.07, 0.08, 0.10]
        .iter()
        .map(|p| p / AREA_L1)
        .collect();
    uniq.extend(5..16);
    density.extend(std::iter::repeat_n(0.7 / 11.0 / AREA_L0, 11));
    map_file(uniq, density)
}

/// Every pixel carries the same ansatz distance parameters.
pub fn distance_map(mu: f64, sigma: f64, norm: f64) -> NamedTempFile {
    MockFitsBuilder::new()
        .simple_primary()
        .binary_table(&[
            ("UNIQ", MockColumn::Long((4..16).collect())),
            ("PROBDENSITY", MockColumn::Double(vec![1.0 / FOUR_PI_SR; 12])),
            ("DISTMU", MockColumn::Double(vec![mu; 12])),
            ("DISTSIGMA", MockColumn::Double(vec![sigma; 12])),
            ("DISTNORM", MockColumn::Double(vec![norm; 12])),
        ])
        .real("MJD-OBS", MJD_OBS)
        .build_temp_file()
}
