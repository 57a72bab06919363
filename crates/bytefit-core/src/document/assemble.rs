//! PDF assembly with lopdf.
//!
//! Each page becomes a media box of the original point size with a single
//! DCTDecode image XObject stretched over it.

use std::io::Write;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use super::{CompressedPage, DocumentAssembler, DocumentError};

/// Writes one JPEG per page into a fresh PDF.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfAssembler;

impl PdfAssembler {
    /// Build the document and serialize it into `out`.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Assemble`] when a content stream cannot be
    /// encoded and [`DocumentError::Io`] when `out` rejects a write.
    pub fn write_to<W: Write>(
        &self,
        pages: &[CompressedPage],
        out: &mut W,
    ) -> Result<(), DocumentError> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let mut kids = Vec::with_capacity(pages.len());

        for page in pages {
            let image = Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => i64::from(page.unit.width),
                    "Height" => i64::from(page.unit.height),
                    "ColorSpace" => "DeviceRGB",
                    "BitsPerComponent" => 8,
                    "Filter" => "DCTDecode",
                },
                page.unit.data.clone(),
            )
            .with_compression(false);
            let image_id = doc.add_object(image);

            let content = Content {
                operations: vec![
                    Operation::new("q", vec![]),
                    Operation::new(
                        "cm",
                        vec![
                            Object::Real(page.width_pt),
                            Object::Integer(0),
                            Object::Integer(0),
                            Object::Real(page.height_pt),
                            Object::Integer(0),
                            Object::Integer(0),
                        ],
                    ),
                    Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
                    Operation::new("Q", vec![]),
                ],
            };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(page.width_pt),
                    Object::Real(page.height_pt),
                ],
                "Resources" => dictionary! {
                    "XObject" => dictionary! { "Im0" => image_id },
                },
                "Contents" => content_id,
            });
            kids.push(Object::Reference(page_id));
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.compress();

        doc.save_to(out)?;
        Ok(())
    }
}

impl DocumentAssembler for PdfAssembler {
    fn assemble(&self, pages: &[CompressedPage]) -> Result<Vec<u8>, DocumentError> {
        let mut output = Vec::new();
        self.write_to(pages, &mut output)?;
        Ok(output)
    }
}
