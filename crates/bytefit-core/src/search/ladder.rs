//! Resolution ladder: shrink the raster until the quality search succeeds.
//!
//! Every rung resamples the *original* buffer, never the previous rung, so
//! resampling error does not accumulate. Scale decays geometrically, which
//! guarantees the floor is reached within a small number of rungs.

use crate::codec::{CodecError, PixelBuffer, RasterCodec};
use crate::settings::QualityRange;

use super::quality::{encode_unit, search_quality, EncodedUnit};

/// Dimensions of `width` x `height` scaled by `scale`, floored at `floor`.
///
/// No floor is applied when the scaled size equals the original. The floor
/// on each axis is capped at the original dimension so that small inputs are
/// never upscaled.
pub fn scaled_dimensions(width: u32, height: u32, scale: f64, floor: u32) -> (u32, u32) {
    let w = (f64::from(width) * scale).round() as u32;
    let h = (f64::from(height) * scale).round() as u32;
    if (w, h) == (width, height) {
        return (width, height);
    }
    (w.max(floor.min(width)), h.max(floor.min(height)))
}

/// Whether `dims` has reached the floor on either axis.
pub fn at_floor(original: (u32, u32), dims: (u32, u32), floor: u32) -> bool {
    dims.0 <= floor.min(original.0) || dims.1 <= floor.min(original.1)
}

/// Outcome of one rung of the ladder.
#[derive(Debug)]
pub struct Rung {
    pub scale: f64,
    pub width: u32,
    pub height: u32,
    /// The best fitting encode at this size, if any quality fit.
    pub fitted: Option<EncodedUnit>,
    pub at_floor: bool,
    resampled: Option<PixelBuffer>,
}

impl Rung {
    /// The fitted unit, or a forced encode at the minimum quality.
    pub fn into_unit_or_min<C: RasterCodec + ?Sized>(
        self,
        codec: &C,
        original: &PixelBuffer,
        range: QualityRange,
    ) -> Result<EncodedUnit, CodecError> {
        match self.fitted {
            Some(unit) => Ok(unit),
            None => encode_unit(codec, self.resampled.as_ref().unwrap_or(original), range.min()),
        }
    }
}

/// Resample `original` to `scale` and run the quality search against `budget`.
///
/// This is the step shared by the single-image ladder and the document
/// rounds, where the scale is owned by the caller.
pub fn try_scale<C: RasterCodec + ?Sized>(
    codec: &C,
    original: &PixelBuffer,
    scale: f64,
    budget: usize,
    floor: u32,
    range: QualityRange,
) -> Result<Rung, CodecError> {
    let (width, height) = scaled_dimensions(original.width, original.height, scale, floor);
    let resampled = if (width, height) == original.dimensions() {
        None
    } else {
        Some(codec.resample(original, width, height)?)
    };
    let work = resampled.as_ref().unwrap_or(original);

    let fitted = search_quality(codec, work, budget, range)?;
    Ok(Rung {
        scale,
        width,
        height,
        fitted,
        at_floor: at_floor(original.dimensions(), (width, height), floor),
        resampled,
    })
}

/// Shrink until the quality search fits `budget`, starting at full size.
///
/// Scale starts at 1.0 and is multiplied by `shrink` after every rung that
/// finds no fitting quality.
///
/// # Arguments
///
/// * `codec` - Encoder and resampler
/// * `original` - Source buffer; every rung resamples from it
/// * `budget` - Maximum encoded size in bytes
/// * `floor` - Minimum side length, capped at the original dimension
/// * `shrink` - Per-rung scale factor, clamped to `0.01..=0.99`
/// * `range` - Quality bounds for the search at each rung
///
/// # Returns
///
/// Always a unit. When the floor is hit without a fit, the floor-sized
/// buffer is encoded at the minimum quality regardless of the budget.
///
/// # Errors
///
/// Propagates the first [`CodecError`] from encoding or resampling.
pub fn reduce_until_fits<C: RasterCodec + ?Sized>(
    codec: &C,
    original: &PixelBuffer,
    budget: usize,
    floor: u32,
    shrink: f64,
    range: QualityRange,
) -> Result<EncodedUnit, CodecError> {
    // A factor of 1 or more would never reach the floor
    let shrink = shrink.clamp(0.01, 0.99);
    let mut scale = 1.0;
    loop {
        let rung = try_scale(codec, original, scale, budget, floor, range)?;
        log::debug!(
            "ladder scale {:.3}: {}x{} fits={} floor={}",
            rung.scale,
            rung.width,
            rung.height,
            rung.fitted.is_some(),
            rung.at_floor
        );

        if rung.fitted.is_some() || rung.at_floor {
            if rung.fitted.is_none() {
                log::warn!(
                    "no quality fits {} bytes at the {}x{} floor; using q={}",
                    budget,
                    rung.width,
                    rung.height,
                    range.min()
                );
            }
            return rung.into_unit_or_min(codec, original, range);
        }
        scale *= shrink;
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Scaled sizes stay at or above the (capped) floor and never grow.
        #[test]
        fn prop_scaled_dimensions_bounded(
            width in 1u32..5000,
            height in 1u32..5000,
            scale in 0.0f64..=1.0,
            floor in 1u32..128,
        ) {
            let (w, h) = scaled_dimensions(width, height, scale, floor);
            prop_assert!(w <= width && h <= height);
            prop_assert!(w >= floor.min(width));
            prop_assert!(h >= floor.min(height));
        }

        /// Shrinking the scale never grows the result.
        #[test]
        fn prop_smaller_scale_never_larger(
            width in 1u32..5000,
            height in 1u32..5000,
            scale in 0.01f64..=1.0,
            shrink in 0.5f64..0.99,
        ) {
            let a = scaled_dimensions(width, height, scale, 64);
            let b = scaled_dimensions(width, height, scale * shrink, 64);
            prop_assert!(b.0 <= a.0 && b.1 <= a.1);
        }
    }
}
