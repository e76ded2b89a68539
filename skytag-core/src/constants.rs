#[allow(clippy::excessive_precision)]
#[allow(clippy::approx_constant)]
pub const PI: f64 = 3.141592653589793238462643;

#[allow(clippy::excessive_precision)]
#[allow(clippy::approx_constant)]
pub const HALF_PI: f64 = 1.5707963267948966192313216;

#[allow(clippy::excessive_precision)]
#[allow(clippy::approx_constant)]
pub const TWOPI: f64 = 6.283185307179586476925287;

/// Solid angle of the full sphere in steradians.
#[allow(clippy::excessive_precision)]
pub const FOUR_PI_SR: f64 = 12.56637061435917295385057;

pub const DEGREES_PER_HOUR: f64 = 15.0;
