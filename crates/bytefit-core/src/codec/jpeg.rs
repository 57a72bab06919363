//! JPEG re-encoding and resampling backed by the `image` crate.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder};

use super::{CodecError, FilterType, PixelBuffer, RasterCodec};

/// The default codec: baseline JPEG output, high-quality resampling.
#[derive(Debug, Clone, Copy, Default)]
pub struct JpegCodec {
    /// Interpolation used when the ladder shrinks a buffer.
    pub filter: FilterType,
}

impl JpegCodec {
    pub fn new(filter: FilterType) -> Self {
        Self { filter }
    }
}

impl RasterCodec for JpegCodec {
    /// Encode at `quality` (clamped to 1-100).
    fn encode(&self, image: &PixelBuffer, quality: u8) -> Result<Vec<u8>, CodecError> {
        validate(image)?;

        let mut buffer = Cursor::new(Vec::new());
        JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100))
            .write_image(
                &image.pixels,
                image.width,
                image.height,
                ExtendedColorType::Rgb8,
            )
            .map_err(|e| CodecError::EncodingFailed(e.to_string()))?;

        Ok(buffer.into_inner())
    }

    fn resample(
        &self,
        image: &PixelBuffer,
        width: u32,
        height: u32,
    ) -> Result<PixelBuffer, CodecError> {
        if width == 0 || height == 0 {
            return Err(CodecError::InvalidDimensions { width, height });
        }
        if image.dimensions() == (width, height) {
            return Ok(image.clone());
        }

        let view = image.view().ok_or(CodecError::InvalidPixelData {
            expected: (image.width as usize) * (image.height as usize) * 3,
            actual: image.pixels.len(),
        })?;
        let resized = image::imageops::resize(&view, width, height, self.filter.to_image_filter());
        Ok(PixelBuffer::from_rgb_image(resized))
    }
}

fn validate(image: &PixelBuffer) -> Result<(), CodecError> {
    if image.width == 0 || image.height == 0 {
        return Err(CodecError::InvalidDimensions {
            width: image.width,
            height: image.height,
        });
    }
    let expected = (image.width as usize) * (image.height as usize) * 3;
    if image.pixels.len() != expected {
        return Err(CodecError::InvalidPixelData {
            expected,
            actual: image.pixels.len(),
        });
    }
    Ok(())
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::codec::testing::gradient;
    use proptest::prelude::*;

    proptest! {
        /// Valid input always yields a complete JPEG stream.
        #[test]
        fn prop_valid_input_produces_valid_jpeg(
            width in 1u32..=48,
            height in 1u32..=48,
            quality in 1u8..=100,
        ) {
            let jpeg = JpegCodec::default().encode(&gradient(width, height), quality).unwrap();
            prop_assert_eq!(&jpeg[0..2], &[0xFF, 0xD8]);
            prop_assert_eq!(&jpeg[jpeg.len() - 2..], &[0xFF, 0xD9]);
        }

        /// Same input, same bytes.
        #[test]
        fn prop_encoding_is_deterministic(
            width in 1u32..=24,
            height in 1u32..=24,
            quality in 1u8..=100,
        ) {
            let codec = JpegCodec::default();
            let img = gradient(width, height);
            prop_assert_eq!(codec.encode(&img, quality).unwrap(), codec.encode(&img, quality).unwrap());
        }
    }
}
