//! HEALPix arithmetic for multi-order sky maps.
//!
//! Multi-order maps identify each pixel by a NUNIQ value that packs the
//! resolution level and the nested pixel index into one integer:
//! `UNIQ = 4 * 4^level + ipix`. Flattening a map onto a common index space
//! means re-expressing every pixel at the finest level this module supports
//! ([`MAX_LEVEL`] = 29, nside = 2^29), where a level-`l` pixel covers the
//! contiguous range `[ipix * 4^(29-l), (ipix + 1) * 4^(29-l))`.
//!
//! Sky positions are placed with [`ang2pix_nest`], which implements the
//! Gorski et al. (2005) nested scheme.

use crate::angle::{validate_declination, validate_right_ascension, Angle};
use crate::constants::{FOUR_PI_SR, PI};
use crate::{SkyError, SkyResult};

/// Finest HEALPix level representable with 64-bit nested indices.
pub const MAX_LEVEL: u8 = 29;

/// Number of HEALPix base pixels (faces).
pub const BASE_PIXELS: u64 = 12;

#[inline]
pub fn level_to_nside(level: u8) -> u64 {
    1u64 << level
}

/// Total pixel count at a level: `12 * nside^2`.
#[inline]
pub fn level_to_npix(level: u8) -> u64 {
    BASE_PIXELS << (2 * level as u64)
}

/// Solid angle of one pixel in steradians: `4π / (12 * nside^2)`.
#[inline]
pub fn nside_to_pixel_area(nside: u64) -> f64 {
    let nside = nside as f64;
    FOUR_PI_SR / (12.0 * nside * nside)
}

/// Decode a NUNIQ value into `(level, ipix)`.
///
/// `level = floor(log4(uniq / 4))`, `ipix = uniq - 4 * 4^level`.
pub fn uniq_to_level_ipix(uniq: u64) -> SkyResult<(u8, u64)> {
    if uniq < 4 {
        return Err(SkyError::healpix(
            "uniq_to_level_ipix",
            &format!("UNIQ {} is below the smallest valid value 4", uniq),
        ));
    }

    let level = (63 - (uniq >> 2).leading_zeros()) / 2;
    if level > MAX_LEVEL as u32 {
        return Err(SkyError::healpix(
            "uniq_to_level_ipix",
            &format!("UNIQ {} decodes to level {} (max {})", uniq, level, MAX_LEVEL),
        ));
    }

    let ipix = uniq - (4u64 << (2 * level));
    Ok((level as u8, ipix))
}

/// Pack `(level, ipix)` into a NUNIQ value.
pub fn level_ipix_to_uniq(level: u8, ipix: u64) -> SkyResult<u64> {
    check_level("level_ipix_to_uniq", level)?;
    if ipix >= level_to_npix(level) {
        return Err(SkyError::healpix(
            "level_ipix_to_uniq",
            &format!("ipix {} outside level {}", ipix, level),
        ));
    }
    Ok((4u64 << (2 * level as u64)) + ipix)
}

/// Number of level-29 pixels covered by one pixel at `level`.
#[inline]
pub fn max_level_span(level: u8) -> u64 {
    1u64 << (2 * (MAX_LEVEL - level) as u64)
}

/// Re-express a pixel index at [`MAX_LEVEL`]: `ipix * (2^(29 - level))^2`.
///
/// The result is the first level-29 index of the pixel's range.
#[inline]
pub fn ipix_to_max_level(level: u8, ipix: u64) -> u64 {
    ipix << (2 * (MAX_LEVEL - level) as u64)
}

/// Convert (RA, Dec) in degrees to a HEALPix nested pixel index.
///
/// RA is wrapped into [0°, 360°); declination must lie within ±90°.
///
/// # Arguments
/// * `order` - HEALPix level (nside = 2^order), at most [`MAX_LEVEL`]
/// * `ra_deg` - Right ascension in degrees
/// * `dec_deg` - Declination in degrees
///
/// # Returns
/// Nested pixel index in range [0, 12*nside^2)
pub fn ang2pix_nest(order: u8, ra_deg: f64, dec_deg: f64) -> SkyResult<u64> {
    check_level("ang2pix_nest", order)?;
    let ra = validate_right_ascension(Angle::from_degrees(ra_deg))?;
    let dec = validate_declination(Angle::from_degrees(dec_deg))?;

    let nside = level_to_nside(order);
    let (sin_dec, cos_dec) = dec.sin_cos();
    let (face, ix, iy) = compute_face_and_position(ra.radians(), sin_dec, cos_dec, nside);
    let ipix_in_face = xy2pix_nest(ix, iy, order);
    Ok(face as u64 * nside * nside + ipix_in_face)
}

fn check_level(context: &str, level: u8) -> SkyResult<()> {
    if level > MAX_LEVEL {
        return Err(SkyError::healpix(
            context,
            &format!("level {} exceeds maximum {}", level, MAX_LEVEL),
        ));
    }
    Ok(())
}

/// Determine which of the 12 base faces contains the point,
/// and compute the (ix, iy) position within that face.
fn compute_face_and_position(phi: f64, z: f64, cos_dec: f64, nside: u64) -> (u32, u64, u64) {
    let z_abs = libm::fabs(z);
    let tt = phi_to_tt(phi);
    if z_abs <= 2.0 / 3.0 {
        compute_equatorial_face(tt, z, nside)
    } else {
        compute_polar_face(tt, z, z_abs, cos_dec, nside)
    }
}

/// Convert phi in [0, 2π) to tt in [0, 4).
fn phi_to_tt(phi: f64) -> f64 {
    let tt = phi * 2.0 / PI;
    if tt >= 4.0 {
        tt - 4.0
    } else {
        tt
    }
}

/// Equatorial belt (-2/3 <= z <= 2/3).
fn compute_equatorial_face(tt: f64, z: f64, nside: u64) -> (u32, u64, u64) {
    let temp1 = nside as f64 * (0.5 + tt);
    let temp2 = nside as f64 * z * 0.75;
    // Both are non-negative: temp1 >= nside/2 >= |temp2|
    let jp = (temp1 - temp2) as u64;
    let jm = (temp1 + temp2) as u64;
    let order = nside.trailing_zeros();
    let ifp = jp >> order;
    let ifm = jm >> order;
    let face = compute_equatorial_face_number(ifp, ifm);
    let ix = jm & (nside - 1);
    let iy = nside - (jp & (nside - 1)) - 1;
    (face, ix, iy)
}

fn compute_equatorial_face_number(ifp: u64, ifm: u64) -> u32 {
    if ifp == ifm {
        // ifp == 4 wraps around to face 4
        (ifp | 4) as u32
    } else if ifp < ifm {
        ifp as u32
    } else {
        (ifm + 8) as u32
    }
}

/// Polar caps (|z| > 2/3).
fn compute_polar_face(tt: f64, z: f64, z_abs: f64, cos_dec: f64, nside: u64) -> (u32, u64, u64) {
    let ntt = (libm::floor(tt) as u32).min(3);
    let tp = tt - ntt as f64;
    // sqrt(3 * (1 - |z|)) rewritten with cos(dec) to keep precision near the poles
    let tmp = nside as f64 * cos_dec * libm::sqrt(3.0 / (1.0 + z_abs));
    let jp = ((tp * tmp) as u64).min(nside - 1);
    let jm = (((1.0 - tp) * tmp) as u64).min(nside - 1);
    if z > 0.0 {
        (ntt, nside - jm - 1, nside - jp - 1)
    } else {
        (ntt + 8, jp, jm)
    }
}

/// Interleave (ix, iy) into a nested index within a base face (Z-order curve).
fn xy2pix_nest(ix: u64, iy: u64, order: u8) -> u64 {
    let mut result: u64 = 0;
    for i in 0..order as u64 {
        let bit_x = (ix >> i) & 1;
        let bit_y = (iy >> i) & 1;
        result |= (bit_x << (2 * i)) | (bit_y << (2 * i + 1));
    }
    result
}
