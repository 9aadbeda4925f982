//! Optical fallback: page rasters run through a recognition engine.

#[cfg(feature = "ocr")]
mod pure_engine;

#[cfg(feature = "ocr")]
pub use pure_engine::PureOcrEngine;

use image::DynamicImage;
use tracing::{debug, warn};

use crate::error::OcrError;
use crate::models::config::PdfConfig;
use crate::pdf::PdfSource;

/// A text recognition engine applied to one page raster at a time.
///
/// Injectable so the pipeline can run without model files in tests and so
/// alternative engines can be swapped in.
pub trait TextRecognizer: Send + Sync {
    /// Recognize text in a page image.
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError>;
}

/// Run the recognition engine over every page of a loaded document.
///
/// Tolerates partial failure: a page without a usable raster, or one the
/// engine rejects, is skipped and accumulation continues from the rest.
/// Returns the concatenated text, which may be empty.
pub fn recognize_pages(
    pdf: &dyn PdfSource,
    engine: &dyn TextRecognizer,
    config: &PdfConfig,
) -> String {
    let page_count = pdf.page_count();
    let limit = if config.max_pages == 0 {
        page_count
    } else {
        page_count.min(config.max_pages as u32)
    };

    let mut text = String::new();

    for page in 1..=limit {
        let images = match pdf.page_images(page, config.render_dpi) {
            Ok(images) if !images.is_empty() => images,
            Ok(_) => {
                warn!(page, "no raster found on page, skipping");
                continue;
            }
            Err(e) => {
                warn!(page, error = %e, "failed to rasterize page, skipping");
                continue;
            }
        };

        for image in &images {
            match engine.recognize(image) {
                Ok(page_text) => {
                    debug!(page, chars = page_text.len(), "recognized page text");
                    if !page_text.trim().is_empty() {
                        if !text.is_empty() {
                            text.push('\n');
                        }
                        text.push_str(&page_text);
                    }
                }
                Err(e) => {
                    warn!(page, error = %e, "recognition failed on page, skipping");
                }
            }
        }
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PdfError;

    /// A fake document with one raster per page.
    struct FakePdf {
        pages: u32,
        broken_pages: Vec<u32>,
    }

    impl PdfSource for FakePdf {
        fn load(&mut self, _data: &[u8]) -> crate::pdf::Result<()> {
            Ok(())
        }

        fn page_count(&self) -> u32 {
            self.pages
        }

        fn extract_text(&self) -> crate::pdf::Result<String> {
            Ok(String::new())
        }

        fn page_images(&self, page: u32, _dpi: u32) -> crate::pdf::Result<Vec<DynamicImage>> {
            if self.broken_pages.contains(&page) {
                return Err(PdfError::ImageExtraction(format!("page {} unreadable", page)));
            }
            Ok(vec![DynamicImage::new_rgba8(8, 8)])
        }
    }

    /// Engine that echoes the page it was called for.
    struct CountingEngine {
        fail_on: Vec<usize>,
        calls: std::sync::atomic::AtomicUsize,
    }

    impl TextRecognizer for CountingEngine {
        fn recognize(&self, _image: &DynamicImage) -> Result<String, OcrError> {
            let call = self
                .calls
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            if self.fail_on.contains(&call) {
                Err(OcrError::Recognition("blurry".to_string()))
            } else {
                Ok(format!("page text {}", call))
            }
        }
    }

    #[test]
    fn test_skips_broken_pages_and_continues() {
        let pdf = FakePdf {
            pages: 3,
            broken_pages: vec![2],
        };
        let engine = CountingEngine {
            fail_on: vec![],
            calls: std::sync::atomic::AtomicUsize::new(0),
        };

        let text = recognize_pages(&pdf, &engine, &PdfConfig::default());
        // Pages 1 and 3 recognized; page 2 skipped.
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn test_recognition_errors_do_not_abort() {
        let pdf = FakePdf {
            pages: 3,
            broken_pages: vec![],
        };
        let engine = CountingEngine {
            fail_on: vec![0],
            calls: std::sync::atomic::AtomicUsize::new(0),
        };

        let text = recognize_pages(&pdf, &engine, &PdfConfig::default());
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn test_respects_page_cap() {
        let pdf = FakePdf {
            pages: 30,
            broken_pages: vec![],
        };
        let engine = CountingEngine {
            fail_on: vec![],
            calls: std::sync::atomic::AtomicUsize::new(0),
        };

        let config = PdfConfig {
            max_pages: 5,
            ..PdfConfig::default()
        };
        let text = recognize_pages(&pdf, &engine, &config);
        assert_eq!(text.lines().count(), 5);
    }
}
