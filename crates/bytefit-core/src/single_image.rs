//! Single-image pipeline.

use serde::Serialize;

use crate::codec::{CodecError, PixelBuffer, RasterCodec};
use crate::search::{encode_unit, reduce_until_fits, search_quality, EncodedUnit};
use crate::settings::CompressionSettings;

/// Which branch produced the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageStrategy {
    /// Target was at least the source file size; re-encoded at top quality.
    MaxQuality,
    /// Quality search and, when needed, the resolution ladder.
    Reduced,
}

#[derive(Debug)]
pub struct ImageCompression {
    pub unit: EncodedUnit,
    pub strategy: ImageStrategy,
    pub original_dimensions: (u32, u32),
}

impl ImageCompression {
    pub fn downscaled(&self) -> bool {
        (self.unit.width, self.unit.height) != self.original_dimensions
    }
}

/// Compress one decoded image towards `target` bytes.
///
/// `original_len` is the size of the source file. When the target is at
/// least that large the ladder is skipped and the image is re-encoded at the
/// top of the quality range, falling back to the search only if that
/// encoding is itself over target.
pub fn compress_image<C: RasterCodec + ?Sized>(
    codec: &C,
    pixels: &PixelBuffer,
    original_len: usize,
    target: usize,
    settings: &CompressionSettings,
) -> Result<ImageCompression, CodecError> {
    let range = settings.quality;

    let (unit, strategy) = if target >= original_len {
        log::info!(
            "target {} >= source {} bytes; re-encoding at q={}",
            target,
            original_len,
            range.max()
        );
        let top = encode_unit(codec, pixels, range.max())?;
        let unit = if top.fits(target) {
            top
        } else {
            match search_quality(codec, pixels, target, range)? {
                Some(unit) => unit,
                None => encode_unit(codec, pixels, range.min())?,
            }
        };
        (unit, ImageStrategy::MaxQuality)
    } else {
        let unit = reduce_until_fits(
            codec,
            pixels,
            target,
            settings.floor_side,
            settings.image_shrink,
            range,
        )?;
        (unit, ImageStrategy::Reduced)
    };

    log::info!(
        "encoded {}x{} at q={}: {} bytes",
        unit.width,
        unit.height,
        unit.quality,
        unit.len()
    );
    Ok(ImageCompression {
        unit,
        strategy,
        original_dimensions: pixels.dimensions(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::testing::{flat, gradient, SizeModelCodec};
    use crate::codec::JpegCodec;
    use crate::finalize::pad_to_exact;

    #[test]
    fn test_generous_target_uses_max_quality() {
        let codec = JpegCodec::default();
        let img = gradient(64, 48);
        let expected = codec.encode(&img, 95).unwrap();

        let result =
            compress_image(&codec, &img, 5 * 1024, 10 * 1024, &CompressionSettings::default())
                .unwrap();

        assert_eq!(result.strategy, ImageStrategy::MaxQuality);
        assert_eq!(result.unit.quality, 95);
        assert_eq!(result.unit.data, expected);
        assert!(!result.downscaled());

        let padded = pad_to_exact(result.unit.data.clone(), 10 * 1024);
        assert_eq!(padded.len(), 10 * 1024);
        assert_eq!(&padded[..expected.len()], &expected[..]);
    }

    #[test]
    fn test_generous_target_falls_back_to_search() {
        // Source file is small but max quality re-encode is not
        let codec = SizeModelCodec::new(0, 100);
        let img = flat(100, 100);

        let result =
            compress_image(&codec, &img, 1000, 5000, &CompressionSettings::default()).unwrap();

        assert_eq!(result.strategy, ImageStrategy::MaxQuality);
        assert_eq!(result.unit.quality, 50);
        assert!(result.unit.fits(5000));
    }

    #[test]
    fn test_tight_target_reduces_resolution() {
        let codec = SizeModelCodec::new(200, 1000);
        let img = flat(2000, 1500);

        let result =
            compress_image(&codec, &img, 500 * 1024, 1024, &CompressionSettings::default())
                .unwrap();

        assert_eq!(result.strategy, ImageStrategy::Reduced);
        assert!(result.downscaled());
        assert!(result.unit.fits(1024));
        assert!(result.unit.width < 2000 && result.unit.height < 1500);
    }

    #[test]
    fn test_impossible_target_degrades_to_floor() {
        let codec = SizeModelCodec::new(5000, 1000);
        let img = flat(640, 480);

        let result =
            compress_image(&codec, &img, 100_000, 1024, &CompressionSettings::default()).unwrap();

        assert_eq!(result.unit.quality, 5);
        assert!(!result.unit.fits(1024));
        assert!(result.unit.width >= 64 && result.unit.height >= 64);
    }
}
