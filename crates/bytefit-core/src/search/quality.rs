//! Binary search over encoder quality.

use crate::codec::{CodecError, PixelBuffer, RasterCodec};
use crate::settings::QualityRange;

/// Bytes produced by encoding one buffer at one quality level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedUnit {
    pub data: Vec<u8>,
    pub quality: u8,
    pub width: u32,
    pub height: u32,
}

impl EncodedUnit {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn fits(&self, budget: usize) -> bool {
        self.data.len() <= budget
    }
}

/// Encode `image` at exactly `quality`.
pub fn encode_unit<C: RasterCodec + ?Sized>(
    codec: &C,
    image: &PixelBuffer,
    quality: u8,
) -> Result<EncodedUnit, CodecError> {
    Ok(EncodedUnit {
        data: codec.encode(image, quality)?,
        quality,
        width: image.width,
        height: image.height,
    })
}

/// Find the highest quality in `range` whose encoding fits in `budget` bytes.
///
/// Each probe that fits becomes the current best and the search moves to
/// the upper half.
///
/// # Arguments
///
/// * `codec` - Encoder used for every probe
/// * `image` - Buffer to encode; never resampled here
/// * `budget` - Maximum encoded size in bytes
/// * `range` - Inclusive quality bounds, normally 5..=95
///
/// # Returns
///
/// The best fitting [`EncodedUnit`], or `None` when even `range.min()`
/// produces more than `budget` bytes.
///
/// # Errors
///
/// Propagates the first [`CodecError`] from the codec.
pub fn search_quality<C: RasterCodec + ?Sized>(
    codec: &C,
    image: &PixelBuffer,
    budget: usize,
    range: QualityRange,
) -> Result<Option<EncodedUnit>, CodecError> {
    let (mut low, mut high) = (i16::from(range.min()), i16::from(range.max()));
    let mut best = None;

    while low <= high {
        let mid = (low + high) / 2;
        let unit = encode_unit(codec, image, mid as u8)?;
        log::debug!(
            "{}x{} q={} -> {} bytes (budget {})",
            image.width,
            image.height,
            mid,
            unit.len(),
            budget
        );

        if unit.fits(budget) {
            best = Some(unit);
            low = mid + 1;
        } else {
            high = mid - 1;
        }
    }

    Ok(best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::testing::{flat, gradient, SizeModelCodec};
    use crate::codec::JpegCodec;

    #[test]
    fn test_finds_highest_fitting_quality() {
        // 100x100 at divisor 1000 -> 10 bytes per quality step, plus 100 header
        let codec = SizeModelCodec::new(100, 1000);
        let unit = search_quality(&codec, &flat(100, 100), 600, QualityRange::default())
            .unwrap()
            .unwrap();

        assert_eq!(unit.quality, 50);
        assert_eq!(unit.len(), 600);
    }

    #[test]
    fn test_budget_above_max_quality_returns_max() {
        let codec = SizeModelCodec::new(0, 1000);
        let unit = search_quality(&codec, &flat(100, 100), usize::MAX, QualityRange::default())
            .unwrap()
            .unwrap();
        assert_eq!(unit.quality, 95);
    }

    #[test]
    fn test_nothing_fits_returns_none() {
        let codec = SizeModelCodec::new(10_000, 1000);
        let result = search_quality(&codec, &flat(100, 100), 500, QualityRange::default()).unwrap();
        assert!(result.is_none());

        // The minimum was probed before giving up
        assert!(codec.encodes.borrow().iter().any(|&(_, _, q)| q == 5));
    }

    #[test]
    fn test_probes_stay_inside_range() {
        let codec = SizeModelCodec::new(0, 100);
        let range = QualityRange::new(20, 40);
        search_quality(&codec, &flat(50, 50), 700, range).unwrap();

        let encodes = codec.encodes.borrow();
        assert!(!encodes.is_empty());
        assert!(encodes.iter().all(|&(_, _, q)| range.contains(q)));
    }

    #[test]
    fn test_probe_count_is_logarithmic() {
        let codec = SizeModelCodec::new(0, 1000);
        search_quality(&codec, &flat(100, 100), 420, QualityRange::default()).unwrap();
        assert!(codec.encodes.borrow().len() <= 7);
    }

    #[test]
    fn test_real_jpeg_respects_budget() {
        let codec = JpegCodec::default();
        let img = gradient(160, 120);
        let budget = codec.encode(&img, 60).unwrap().len();

        let unit = search_quality(&codec, &img, budget, QualityRange::default())
            .unwrap()
            .unwrap();
        assert!(unit.len() <= budget);
        assert!(unit.quality >= 50);
        assert_eq!((unit.width, unit.height), (160, 120));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::codec::testing::{flat, SizeModelCodec};
    use proptest::prelude::*;

    proptest! {
        /// A returned unit never exceeds the budget; `None` means nothing fits.
        #[test]
        fn prop_result_fits_or_nothing_does(
            header in 0usize..2_000,
            budget in 0usize..20_000,
            side in 8u32..=120,
        ) {
            let codec = SizeModelCodec::new(header, 100);
            let img = flat(side, side);
            let range = QualityRange::default();

            match search_quality(&codec, &img, budget, range).unwrap() {
                Some(unit) => {
                    prop_assert!(unit.len() <= budget);
                    prop_assert!(range.contains(unit.quality));
                    // Next quality up would not fit
                    if unit.quality < range.max() {
                        prop_assert!(codec.size_for(side, side, unit.quality + 1) > budget);
                    }
                }
                None => {
                    for q in range.min()..=range.max() {
                        prop_assert!(codec.size_for(side, side, q) > budget);
                    }
                }
            }
        }
    }
}
