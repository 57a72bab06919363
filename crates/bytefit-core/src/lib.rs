//! Bytefit Core - target-size compression
//!
//! Compresses a single image or a multi-page document to a caller-specified
//! byte budget by adjusting lossy encoder quality and raster resolution, then
//! optionally pads the result to the exact requested length.
//!
//! Control flow, leaves first:
//!
//! 1. [`budget`] splits a document's budget across pages (documents only)
//! 2. [`search::reduce_until_fits`] shrinks resolution when no quality fits
//! 3. [`search::search_quality`] finds the highest quality under budget
//! 4. [`finalize::write_exact`] pads the output to the exact size
//!
//! Decoding, rasterizing and PDF assembly sit behind the traits in [`codec`]
//! and [`document`].

pub mod budget;
pub mod codec;
pub mod document;
pub mod finalize;
pub mod search;
pub mod settings;
pub mod single_image;

pub use budget::{allocate, feasible_image_budget, image_budget, BudgetError, PageDescriptor};
pub use codec::{decode_image, CodecError, JpegCodec, PixelBuffer, RasterCodec};
pub use document::{
    compress_document, compress_pages, DocumentAssembler, DocumentError, PageRasterizer,
    PdfAssembler,
};
#[cfg(feature = "pdfium")]
pub use document::PdfiumRasterizer;
pub use finalize::{write_exact, FinalizeReport, SizeOutcome};
pub use search::{reduce_until_fits, search_quality, EncodedUnit};
pub use settings::{kb_to_bytes, CompressionSettings, QualityRange};
pub use single_image::{compress_image, ImageCompression, ImageStrategy};
