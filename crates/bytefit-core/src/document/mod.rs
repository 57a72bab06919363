//! Multi-page document pipeline.
//!
//! ```text
//! rasterize ──▶ allocate ──▶ round(scale) ──▶ fits? ──▶ assemble
//!                               ▲               │ no
//!                               └── scale *= k ─┘
//! ```
//!
//! Every page is rendered once. Each round re-encodes all pages from their
//! rendered buffers at one shared scale, which is threaded through the loop
//! explicitly; pages therefore shrink together and stay visually consistent.

mod assemble;
#[cfg(feature = "pdfium")]
mod pdfium;

use std::path::Path;

use thiserror::Error;

use crate::budget::{plan_page_budgets, BudgetError, PageDescriptor};
use crate::codec::{CodecError, PixelBuffer, RasterCodec};
use crate::search::{try_scale, EncodedUnit};
use crate::settings::CompressionSettings;

pub use assemble::PdfAssembler;
#[cfg(feature = "pdfium")]
pub use pdfium::PdfiumRasterizer;

/// Document pipeline failures.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Budget(#[from] BudgetError),

    #[error("Failed to rasterize document: {0}")]
    Rasterize(String),

    #[error("Failed to assemble PDF: {0}")]
    Assemble(#[from] lopdf::Error),

    #[error("Failed to write PDF: {0}")]
    Io(#[from] std::io::Error),
}

/// One page rendered to pixels, with its size in PDF points.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub index: usize,
    pub pixels: PixelBuffer,
    pub width_pt: f32,
    pub height_pt: f32,
}

impl RenderedPage {
    pub fn descriptor(&self) -> PageDescriptor {
        PageDescriptor {
            index: self.index,
            width: self.pixels.width,
            height: self.pixels.height,
        }
    }
}

/// A page's final JPEG plus the geometry the assembler places it in.
#[derive(Debug, Clone)]
pub struct CompressedPage {
    pub index: usize,
    pub width_pt: f32,
    pub height_pt: f32,
    pub unit: EncodedUnit,
}

/// Renders every page of a document.
pub trait PageRasterizer {
    fn rasterize(&self, path: &Path, scale: f32) -> Result<Vec<RenderedPage>, DocumentError>;
}

/// Builds a document from compressed page images.
pub trait DocumentAssembler {
    fn assemble(&self, pages: &[CompressedPage]) -> Result<Vec<u8>, DocumentError>;
}

/// Number of pages, read from the document structure without rendering.
pub fn page_count(bytes: &[u8]) -> Result<usize, DocumentError> {
    let doc = lopdf::Document::load_mem(bytes)
        .map_err(|e| DocumentError::Rasterize(format!("not a readable PDF: {e}")))?;
    Ok(doc.get_pages().len())
}

/// The accepted round of the page loop.
#[derive(Debug)]
pub struct PagePass {
    pub pages: Vec<CompressedPage>,
    pub budgets: Vec<usize>,
    pub scale: f64,
    pub rounds: usize,
}

impl PagePass {
    /// Sum of encoded page sizes.
    pub fn image_bytes(&self) -> usize {
        self.pages.iter().map(|p| p.unit.len()).sum()
    }
}

/// Encode every page at `scale` against its own budget.
///
/// A page that no quality fits is encoded at the minimum quality for this
/// scale. Returns the pages and whether all of them sit at the floor.
fn run_round<C: RasterCodec + ?Sized>(
    codec: &C,
    pages: &[RenderedPage],
    budgets: &[usize],
    scale: f64,
    settings: &CompressionSettings,
) -> Result<(Vec<CompressedPage>, bool), DocumentError> {
    let mut compressed = Vec::with_capacity(pages.len());
    let mut all_at_floor = true;

    for (page, &budget) in pages.iter().zip(budgets) {
        let rung = try_scale(
            codec,
            &page.pixels,
            scale,
            budget,
            settings.floor_side,
            settings.quality,
        )?;
        all_at_floor &= rung.at_floor;
        let unit = rung.into_unit_or_min(codec, &page.pixels, settings.quality)?;

        log::debug!(
            "page {} at scale {:.3}: {}x{} q={} {} / {} bytes",
            page.index + 1,
            scale,
            unit.width,
            unit.height,
            unit.quality,
            unit.len(),
            budget
        );
        compressed.push(CompressedPage {
            index: page.index,
            width_pt: page.width_pt,
            height_pt: page.height_pt,
            unit,
        });
    }

    Ok((compressed, all_at_floor))
}

/// Compress rendered pages so images plus overhead fit in `target` bytes.
///
/// Fails before any encoding when the target cannot cover the per-page
/// overhead. Otherwise rounds repeat at a shrinking shared scale until the
/// estimate fits or every page has reached the resolution floor.
pub fn compress_pages<C: RasterCodec + ?Sized>(
    codec: &C,
    pages: &[RenderedPage],
    target: usize,
    settings: &CompressionSettings,
) -> Result<PagePass, DocumentError> {
    let descriptors: Vec<PageDescriptor> = pages.iter().map(RenderedPage::descriptor).collect();
    let budgets = plan_page_budgets(
        &descriptors,
        target,
        settings.page_overhead,
        settings.min_page_budget,
    )?;
    let overhead = settings.page_overhead * pages.len();
    let shrink = settings.page_shrink.clamp(0.01, 0.99);

    let mut scale = 1.0;
    let mut rounds = 0;
    loop {
        rounds += 1;
        let (compressed, all_at_floor) = run_round(codec, pages, &budgets, scale, settings)?;
        let estimate = compressed.iter().map(|p| p.unit.len()).sum::<usize>() + overhead;
        log::info!(
            "round {} at scale {:.3}: estimated {} / {} bytes",
            rounds,
            scale,
            estimate,
            target
        );

        if estimate <= target || all_at_floor {
            if estimate > target {
                log::warn!("all pages at the resolution floor; estimate {} bytes", estimate);
            }
            return Ok(PagePass {
                pages: compressed,
                budgets,
                scale,
                rounds,
            });
        }
        scale *= shrink;
    }
}

/// The assembled document and the pass that produced it.
#[derive(Debug)]
pub struct DocumentCompression {
    pub bytes: Vec<u8>,
    pub pass: PagePass,
}

/// Rasterize `path`, compress its pages towards `target` and rebuild it.
pub fn compress_document<R, A, C>(
    rasterizer: &R,
    assembler: &A,
    codec: &C,
    path: &Path,
    target: usize,
    settings: &CompressionSettings,
) -> Result<DocumentCompression, DocumentError>
where
    R: PageRasterizer + ?Sized,
    A: DocumentAssembler + ?Sized,
    C: RasterCodec + ?Sized,
{
    let pages = rasterizer.rasterize(path, settings.render_scale)?;
    log::info!("rendered {} pages from {}", pages.len(), path.display());

    let pass = compress_pages(codec, &pages, target, settings)?;
    drop(pages);

    let bytes = assembler.assemble(&pass.pages)?;
    Ok(DocumentCompression { bytes, pass })
}
