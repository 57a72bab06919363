//! Page rasterization through pdfium.
//!
//! pdfium is loaded at runtime: first from the directory given at
//! construction (if any), then from the system library search path.

use std::path::{Path, PathBuf};

use pdfium_render::prelude::*;

use super::{DocumentError, PageRasterizer, RenderedPage};
use crate::codec::PixelBuffer;

#[derive(Debug, Clone, Default)]
pub struct PdfiumRasterizer {
    library_dir: Option<PathBuf>,
}

impl PdfiumRasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look for the pdfium shared library in `dir` before the system path.
    pub fn with_library_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            library_dir: Some(dir.into()),
        }
    }

    fn bind(&self) -> Result<Pdfium, DocumentError> {
        let bindings = match &self.library_dir {
            Some(dir) => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir))
                .or_else(|_| Pdfium::bind_to_system_library()),
            None => Pdfium::bind_to_system_library(),
        }
        .map_err(|e| DocumentError::Rasterize(format!("pdfium library not available: {e}")))?;
        Ok(Pdfium::new(bindings))
    }
}

impl PageRasterizer for PdfiumRasterizer {
    fn rasterize(&self, path: &Path, scale: f32) -> Result<Vec<RenderedPage>, DocumentError> {
        let pdfium = self.bind()?;
        let document = pdfium
            .load_pdf_from_file(path, None)
            .map_err(|e| DocumentError::Rasterize(format!("{}: {e}", path.display())))?;

        let config = PdfRenderConfig::new().scale_page_by_factor(scale);
        let mut rendered = Vec::new();

        for (index, page) in document.pages().iter().enumerate() {
            let bitmap = page
                .render_with_config(&config)
                .map_err(|e| DocumentError::Rasterize(format!("page {}: {e}", index + 1)))?;
            let width = bitmap.width().max(0) as u32;
            let height = bitmap.height().max(0) as u32;
            let pixels = PixelBuffer::from_rgba(width, height, &bitmap.as_rgba_bytes())?;

            log::debug!("rendered page {} at {}x{}", index + 1, width, height);
            rendered.push(RenderedPage {
                index,
                pixels,
                width_pt: page.width().value,
                height_pt: page.height().value,
            });
        }

        if rendered.is_empty() {
            return Err(DocumentError::Rasterize(format!(
                "{} has no pages",
                path.display()
            )));
        }
        Ok(rendered)
    }
}
