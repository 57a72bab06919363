//! Target-size search.
//!
//! - [`search_quality`]: binary search for the highest quality that fits.
//! - [`reduce_until_fits`]: the resolution ladder, used when no quality fits
//!   at the current size.
//!
//! Both are pure functions of `(codec, buffer, budget)` and perform no I/O.

mod ladder;
mod quality;

pub use ladder::{at_floor, reduce_until_fits, scaled_dimensions, try_scale, Rung};
pub use quality::{encode_unit, search_quality, EncodedUnit};
