//! PDF processing: text-layer extraction and page images for the optical
//! fallback.

mod extractor;

pub use extractor::PdfExtractor;

use crate::error::PdfError;
use image::DynamicImage;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Trait for PDF processing implementations.
pub trait PdfSource {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Number of pages in the loaded document.
    fn page_count(&self) -> u32;

    /// Extract the embedded text layer of the entire document.
    fn extract_text(&self) -> Result<String>;

    /// Page rasters for recognition at the requested resolution. Scanned
    /// documents carry their raster as embedded page images, which are
    /// returned at their native resolution.
    fn page_images(&self, page: u32, dpi: u32) -> Result<Vec<DynamicImage>>;
}

/// Whether an extracted text layer is usable on its own.
///
/// Counts non-whitespace characters; scanned documents typically yield
/// nothing or a few stray glyphs.
pub fn is_sufficient(text: &str, min_chars: usize) -> bool {
    text.chars().filter(|c| !c.is_whitespace()).count() >= min_chars
}
