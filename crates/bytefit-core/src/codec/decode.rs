//! Source image decoding with EXIF orientation handling.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::{DynamicImage, ImageReader};

use super::{CodecError, Orientation, PixelBuffer};

/// Decode a JPEG or PNG file into an RGB buffer.
///
/// Alpha and palette images are flattened to RGB. The EXIF orientation tag
/// is applied so that re-encoded output, which carries no EXIF block, is
/// still displayed upright.
pub fn decode_image(bytes: &[u8]) -> Result<PixelBuffer, CodecError> {
    let orientation = read_orientation(bytes);

    let img = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| CodecError::InvalidFormat(e.to_string()))?
        .decode()
        .map_err(|e| CodecError::InvalidFormat(e.to_string()))?;

    if orientation != Orientation::Normal {
        log::debug!("applying EXIF orientation {:?}", orientation);
    }

    let rgb = apply_orientation(img, orientation).into_rgb8();
    if rgb.width() == 0 || rgb.height() == 0 {
        return Err(CodecError::InvalidDimensions {
            width: rgb.width(),
            height: rgb.height(),
        });
    }
    Ok(PixelBuffer::from_rgb_image(rgb))
}

/// Returns `Orientation::Normal` when there is no EXIF block or no tag.
fn read_orientation(bytes: &[u8]) -> Orientation {
    let mut cursor = Cursor::new(bytes);
    Reader::new()
        .read_from_container(&mut cursor)
        .ok()
        .and_then(|exif| {
            exif.get_field(Tag::Orientation, In::PRIMARY)
                .and_then(|field| field.value.get_uint(0))
        })
        .map(Orientation::from)
        .unwrap_or_default()
}

fn apply_orientation(img: DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Normal => img,
        Orientation::FlipHorizontal => img.fliph(),
        Orientation::Rotate180 => img.rotate180(),
        Orientation::FlipVertical => img.flipv(),
        Orientation::Transpose => img.rotate90().fliph(),
        Orientation::Rotate90CW => img.rotate90(),
        Orientation::Transverse => img.rotate270().fliph(),
        Orientation::Rotate270CW => img.rotate270(),
    }
}
