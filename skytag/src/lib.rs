//! Locate sky positions inside the credibility regions of multi-order
//! HEALPix probability maps, such as gravitational-wave localizations.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`skymap`] | Load a map and derive per-pixel probability, cumulative probability and level-29 ranges |
//! | [`matcher`] | Find the map pixel enclosing each sky position |
//! | [`distance`] | Mean and spread of the per-pixel ansatz distance distribution |
//! | [`lookup`] | One-call entry points tying the above together |
//! | [`report`] | Human-readable sentences for results |
//! | [`settings`] | YAML settings file |
//!
//! ```no_run
//! use skytag::{lookup_one, LookupOptions};
//!
//! let options = LookupOptions::default().with_distance(true);
//! let result = lookup_one(10.343234, 14.345532, "bayestar.multiorder.fits", Some(60034.257381), &options)?;
//! println!("{}", skytag::report::sentence(&result));
//! # Ok::<(), skytag::Error>(())
//! ```

pub mod distance;
pub mod error;
pub mod lookup;
pub mod matcher;
pub mod report;
pub mod settings;
pub mod skymap;

#[cfg(test)]
pub(crate) mod fixtures;

pub use distance::{DistanceEstimate, DistanceEstimator};
pub use error::{Error, Result};
pub use lookup::{lookup, lookup_in_map, lookup_one, LookupOptions, LookupResult};
pub use matcher::{match_coordinates, SortedIndex};
pub use settings::{OutputFormat, Settings};
pub use skymap::{AnsatzParams, PixelRecord, SkyMap};
