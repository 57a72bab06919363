//! Raster codec seam.
//!
//! The search never looks inside encoded bytes; it only needs a codec that can
//! re-encode a buffer at a quality level and resample it to new dimensions.
//! [`JpegCodec`] is the production implementation. Tests substitute a
//! deterministic size model so search behavior can be checked without real
//! encodes.
//!
//! # Examples
//!
//! ```ignore
//! use bytefit_core::codec::{decode_image, JpegCodec, RasterCodec};
//!
//! let bytes = std::fs::read("photo.jpg").unwrap();
//! let pixels = decode_image(&bytes).unwrap();
//! let jpeg = JpegCodec::default().encode(&pixels, 80).unwrap();
//! println!("Encoded {} bytes", jpeg.len());
//! ```

mod decode;
mod jpeg;
mod types;

pub use decode::decode_image;
pub use jpeg::JpegCodec;
pub use types::{CodecError, FilterType, Orientation, PixelBuffer};

/// Encoder and resampler used by the target-size search.
///
/// Encoded size is assumed to be non-decreasing in quality. This holds for
/// standard lossy encoders and is not verified.
pub trait RasterCodec {
    /// Encode `image` as a lossy byte stream at `quality`.
    fn encode(&self, image: &PixelBuffer, quality: u8) -> Result<Vec<u8>, CodecError>;

    /// Produce a new buffer of exactly `width` x `height`.
    fn resample(
        &self,
        image: &PixelBuffer,
        width: u32,
        height: u32,
    ) -> Result<PixelBuffer, CodecError>;
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;

    use super::*;

    /// Gradient test image.
    pub fn gradient(width: u32, height: u32) -> PixelBuffer {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(((x * 255) / width.max(1)) as u8);
                pixels.push(((y * 255) / height.max(1)) as u8);
                pixels.push(((x + y) * 127 / (width + height).max(1)) as u8);
            }
        }
        PixelBuffer::new(width, height, pixels).unwrap()
    }

    /// Flat gray buffer; cheap to build at large sizes.
    pub fn flat(width: u32, height: u32) -> PixelBuffer {
        PixelBuffer::new(width, height, vec![128u8; (width * height * 3) as usize]).unwrap()
    }

    /// Codec whose output size is `header + area * quality / divisor`.
    ///
    /// Records every encode and resample so tests can inspect the search path.
    pub struct SizeModelCodec {
        pub header: usize,
        pub divisor: usize,
        pub encodes: RefCell<Vec<(u32, u32, u8)>>,
        pub resamples: RefCell<Vec<(u32, u32)>>,
    }

    impl SizeModelCodec {
        pub fn new(header: usize, divisor: usize) -> Self {
            Self {
                header,
                divisor,
                encodes: RefCell::new(Vec::new()),
                resamples: RefCell::new(Vec::new()),
            }
        }

        pub fn size_for(&self, width: u32, height: u32, quality: u8) -> usize {
            self.header + (width as usize * height as usize * quality as usize) / self.divisor
        }
    }

    impl RasterCodec for SizeModelCodec {
        fn encode(&self, image: &PixelBuffer, quality: u8) -> Result<Vec<u8>, CodecError> {
            self.encodes
                .borrow_mut()
                .push((image.width, image.height, quality));
            Ok(vec![quality; self.size_for(image.width, image.height, quality)])
        }

        fn resample(
            &self,
            _image: &PixelBuffer,
            width: u32,
            height: u32,
        ) -> Result<PixelBuffer, CodecError> {
            self.resamples.borrow_mut().push((width, height));
            Ok(flat(width, height))
        }
    }
}
