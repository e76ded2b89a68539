//! Loading and indexing multi-order HEALPix probability maps.
//!
//! A map file holds one row per pixel: a NUNIQ code and a probability
//! density, optionally with per-pixel ansatz distance parameters. Loading
//! ranks the pixels by density and attaches to each the derived quantities
//! the lookups need:
//!
//! | Field | Meaning |
//! |-------|---------|
//! | `level`, `ipix` | decoded from `UNIQ` |
//! | `nside`, `area` | `2^level`, `4π / (12 nside²)` sr |
//! | `prob` | `area * probdensity` |
//! | `cumprob` | running sum of `prob` in rank order |
//! | `index29` | first level-29 nested index covered by the pixel |
//!
//! The credibility of a position is the `cumprob` of the pixel containing it.

use crate::{Error, Result};
use skytag_core::healpix::{
    ipix_to_max_level, level_to_nside, max_level_span, nside_to_pixel_area, uniq_to_level_ipix,
};
use skytag_fits::{BinaryTableHdu, FitsFile, TableData};
use std::cmp::Ordering;
use std::path::{Path, PathBuf};

/// Upper integration bound when the map carries no distance summary.
pub const DEFAULT_RMAX: f64 = 500.0;

/// `rmax = DISTMEAN + RMAX_SIGMAS * DISTSTD`.
pub const RMAX_SIGMAS: f64 = 7.0;

const DISTANCE_COLUMNS: [&str; 3] = ["DISTMU", "DISTSIGMA", "DISTNORM"];

/// Per-pixel ansatz distance posterior: `r² · norm · N(r; mu, sigma)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnsatzParams {
    pub mu: f64,
    pub sigma: f64,
    pub norm: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PixelRecord {
    pub uniq: u64,
    pub level: u8,
    pub ipix: u64,
    pub nside: u64,
    pub area: f64,
    pub probdensity: f64,
    pub prob: f64,
    pub cumprob: f64,
    pub index29: u64,
    pub ansatz: Option<AnsatzParams>,
}

impl PixelRecord {
    /// One past the last level-29 index covered by this pixel.
    pub fn index29_end(&self) -> u64 {
        self.index29 + max_level_span(self.level)
    }

    pub fn contains(&self, index29: u64) -> bool {
        (self.index29..self.index29_end()).contains(&index29)
    }
}

/// A loaded map, ranked by descending probability density.
#[derive(Debug, Clone)]
pub struct SkyMap {
    path: PathBuf,
    pixels: Vec<PixelRecord>,
    mjd_obs: f64,
    dist_mean: Option<f64>,
    dist_std: Option<f64>,
    has_distance: bool,
}

impl SkyMap {
    /// Reads the first binary table of a plain or gzipped FITS map.
    ///
    /// `MJD-OBS`, `DISTMEAN` and `DISTSTD` are taken from the table header
    /// when present there, otherwise from the primary header.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("Loading sky map {}", path.display());

        let mut fits = FitsFile::open(path).map_err(|e| Error::map_read(path, e))?;
        let table = fits
            .first_binary_table()
            .map_err(|e| Error::map_read(path, e))?;
        let data = fits
            .read_table_data(&table)
            .map_err(|e| Error::map_read(path, e))?;
        let primary = fits
            .primary_header()
            .map_err(|e| Error::map_read(path, e))?;

        let metadata = |keyword: &str| {
            table
                .header()
                .get_real(keyword)
                .or_else(|| primary.get_real(keyword))
        };
        let mjd_obs = metadata("MJD-OBS")
            .ok_or_else(|| Error::map_read(path, "missing MJD-OBS header keyword"))?;
        let dist_mean = metadata("DISTMEAN");
        let dist_std = metadata("DISTSTD");

        let uniq = table
            .column_i64(&data, "UNIQ")
            .map_err(|e| Error::map_read(path, e))?;
        let probdensity = table
            .column_f64(&data, "PROBDENSITY")
            .map_err(|e| Error::map_read(path, e))?;
        let ansatz = read_ansatz(path, &table, &data)?;

        let map = Self::from_columns(path, &uniq, &probdensity, ansatz, mjd_obs)?;
        let map = Self {
            dist_mean,
            dist_std,
            ..map
        };

        log::debug!(
            "Indexed {} pixels from {} (MJD-OBS {}, distance {})",
            map.len(),
            path.display(),
            map.mjd_obs,
            if map.has_distance { "yes" } else { "no" }
        );
        Ok(map)
    }

    fn from_columns(
        path: &Path,
        uniq: &[i64],
        probdensity: &[f64],
        ansatz: Option<Vec<AnsatzParams>>,
        mjd_obs: f64,
    ) -> Result<Self> {
        let has_distance = ansatz.is_some();

        let mut pixels = uniq
            .iter()
            .zip(probdensity)
            .enumerate()
            .map(|(row, (&uniq, &probdensity))| {
                let uniq = u64::try_from(uniq)
                    .map_err(|_| Error::map_read(path, format!("negative UNIQ {} in row {}", uniq, row)))?;
                let (level, ipix) = uniq_to_level_ipix(uniq)
                    .map_err(|e| Error::map_read(path, format!("row {}: {}", row, e)))?;
                let nside = level_to_nside(level);
                let area = nside_to_pixel_area(nside);

                Ok(PixelRecord {
                    uniq,
                    level,
                    ipix,
                    nside,
                    area,
                    probdensity,
                    prob: area * probdensity,
                    cumprob: 0.0,
                    index29: ipix_to_max_level(level, ipix),
                    ansatz: ansatz.as_ref().map(|a| a[row]),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        pixels.sort_by(|a, b| descending_nan_last(a.probdensity, b.probdensity));

        let mut cumulative = 0.0;
        for pixel in &mut pixels {
            if !pixel.prob.is_nan() {
                cumulative += pixel.prob;
            }
            pixel.cumprob = cumulative;
        }

        check_disjoint(path, &pixels)?;

        Ok(Self {
            path: path.to_path_buf(),
            pixels,
            mjd_obs,
            dist_mean: None,
            dist_std: None,
            has_distance,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Pixels in rank order: descending density, file order among ties.
    pub fn pixels(&self) -> &[PixelRecord] {
        &self.pixels
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn mjd_obs(&self) -> f64 {
        self.mjd_obs
    }

    pub fn dist_mean(&self) -> Option<f64> {
        self.dist_mean
    }

    pub fn dist_std(&self) -> Option<f64> {
        self.dist_std
    }

    pub fn has_distance(&self) -> bool {
        self.has_distance
    }

    /// Upper bound for distance integration.
    pub fn rmax(&self) -> f64 {
        match (self.dist_mean, self.dist_std) {
            (Some(mean), Some(std)) => mean + RMAX_SIGMAS * std,
            _ => DEFAULT_RMAX,
        }
    }

    /// Final cumulative probability; about 1 for a full-sky map.
    pub fn total_probability(&self) -> f64 {
        self.pixels.last().map_or(0.0, |p| p.cumprob)
    }
}

fn read_ansatz(
    path: &Path,
    table: &BinaryTableHdu,
    data: &TableData,
) -> Result<Option<Vec<AnsatzParams>>> {
    let present: Vec<&str> = DISTANCE_COLUMNS
        .iter()
        .copied()
        .filter(|c| table.has_column(c))
        .collect();

    match present.len() {
        0 => return Ok(None),
        n if n < DISTANCE_COLUMNS.len() => {
            let missing: Vec<&str> = DISTANCE_COLUMNS
                .iter()
                .copied()
                .filter(|c| !present.contains(c))
                .collect();
            return Err(Error::map_read(
                path,
                format!(
                    "distance columns incomplete: has {} but not {}",
                    present.join(", "),
                    missing.join(", ")
                ),
            ));
        }
        _ => {}
    }

    let column = |name: &str| {
        table
            .column_f64(data, name)
            .map_err(|e| Error::map_read(path, e))
    };
    let mu = column("DISTMU")?;
    let sigma = column("DISTSIGMA")?;
    let norm = column("DISTNORM")?;

    Ok(Some(
        mu.into_iter()
            .zip(sigma)
            .zip(norm)
            .map(|((mu, sigma), norm)| AnsatzParams { mu, sigma, norm })
            .collect(),
    ))
}

fn descending_nan_last(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

/// Level-29 ranges of distinct pixels must not overlap.
fn check_disjoint(path: &Path, pixels: &[PixelRecord]) -> Result<()> {
    let mut ranges: Vec<(u64, u64, u64)> = pixels
        .iter()
        .map(|p| (p.index29, p.index29_end(), p.uniq))
        .collect();
    ranges.sort_unstable();

    for pair in ranges.windows(2) {
        let (_, end, uniq) = pair[0];
        let (start, _, next_uniq) = pair[1];
        if start < end {
            return Err(Error::map_read(
                path,
                format!("pixels UNIQ {} and UNIQ {} overlap", uniq, next_uniq),
            ));
        }
    }
    Ok(())
}
