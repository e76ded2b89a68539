//! Placing sky positions on a loaded map.
//!
//! Every pixel covers a contiguous range of level-29 nested indices, so the
//! pixel enclosing a position is the one with the greatest range start not
//! above the position's own level-29 index, provided that range reaches it.

use crate::skymap::{PixelRecord, SkyMap};
use crate::{Error, Result};
use skytag_core::healpix::{ang2pix_nest, MAX_LEVEL};

/// Map pixels ordered by the start of their level-29 range.
#[derive(Debug)]
pub struct SortedIndex<'a> {
    pixels: &'a [PixelRecord],
    order: Vec<usize>,
    starts: Vec<u64>,
}

impl<'a> SortedIndex<'a> {
    pub fn new(pixels: &'a [PixelRecord]) -> Self {
        let mut order: Vec<usize> = (0..pixels.len()).collect();
        order.sort_unstable_by_key(|&i| pixels[i].index29);
        let starts = order.iter().map(|&i| pixels[i].index29).collect();

        Self {
            pixels,
            order,
            starts,
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// The pixel whose range holds `index29`.
    ///
    /// `None` when the index precedes the first range or falls in a gap
    /// between ranges of a partial-sky map.
    pub fn containing(&self, index29: u64) -> Option<&'a PixelRecord> {
        let upper = self.starts.partition_point(|&start| start <= index29);
        let candidate = upper.checked_sub(1)?;
        let pixel = &self.pixels[self.order[candidate]];
        pixel.contains(index29).then_some(pixel)
    }
}

/// The enclosing pixel for each `(ra[i], dec[i])` in degrees, in query order.
pub fn match_coordinates<'a>(
    map: &'a SkyMap,
    ra: &[f64],
    dec: &[f64],
) -> Result<Vec<&'a PixelRecord>> {
    if ra.len() != dec.len() {
        return Err(Error::DimensionMismatch(format!(
            "{} right ascensions but {} declinations",
            ra.len(),
            dec.len()
        )));
    }

    let index = SortedIndex::new(map.pixels());
    ra.iter()
        .zip(dec)
        .map(|(&ra, &dec)| {
            let index29 = ang2pix_nest(MAX_LEVEL, ra, dec)
                .map_err(|e| Error::InvalidCoordinate(format!("ra={}, dec={}: {}", ra, dec, e)))?;
            index
                .containing(index29)
                .ok_or(Error::OutOfMap { ra, dec })
        })
        .collect()
}
