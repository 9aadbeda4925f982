//! Per-document pipeline: extraction, field parsing, categorization.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::categorize::{Categorizer, Classifier};
use crate::error::ExtractError;
use crate::extract::{ExtractedFields, FieldParser};
use crate::models::category::CategorySet;
use crate::models::config::{PdfConfig, PipelineConfig};
use crate::models::document::{Document, DocumentStatus, ExtractionMethod, FailureStage};
use crate::ocr::{recognize_pages, TextRecognizer};
use crate::pdf::{is_sufficient, PdfExtractor, PdfSource};

/// Processes one claimed document to a terminal state.
///
/// The orchestrator's seam: the production implementation is
/// [`InvoicePipeline`]; tests substitute a stub.
pub trait DocumentProcessor: Send + Sync {
    fn process<'a>(
        &'a self,
        document: Document,
        data: Vec<u8>,
    ) -> Pin<Box<dyn Future<Output = Document> + Send + 'a>>;
}

/// Pull usable text out of raw PDF bytes.
///
/// The text layer is tried first; when it is absent or too thin the optical
/// fallback runs over the page rasters. Only a hard failure (unreadable
/// file) or a fully empty result is an error.
pub fn extract_document_text(
    data: &[u8],
    config: &PdfConfig,
    recognizer: Option<&dyn TextRecognizer>,
) -> Result<(String, ExtractionMethod), ExtractError> {
    let mut pdf = PdfExtractor::new();
    pdf.load(data).map_err(|e| ExtractError::Corrupt(e.to_string()))?;
    extract_text_from_source(&pdf, config, recognizer)
}

/// Text extraction over an already-loaded PDF source.
pub fn extract_text_from_source(
    pdf: &dyn PdfSource,
    config: &PdfConfig,
    recognizer: Option<&dyn TextRecognizer>,
) -> Result<(String, ExtractionMethod), ExtractError> {
    let text = match pdf.extract_text() {
        Ok(text) => text,
        Err(e) => {
            // A structural load succeeded, so a text-layer failure is just
            // a missing layer; the optical path gets its chance.
            warn!(error = %e, "text layer extraction failed, treating as insufficient");
            String::new()
        }
    };

    if is_sufficient(&text, config.min_text_chars) {
        debug!(chars = text.len(), "text layer sufficient");
        return Ok((text, ExtractionMethod::TextLayer));
    }

    debug!("text layer insufficient, engaging optical fallback");
    let Some(engine) = recognizer else {
        warn!("no recognition engine configured, cannot run optical fallback");
        return Err(ExtractError::Empty);
    };

    let ocr_text = recognize_pages(pdf, engine, config);
    if ocr_text.trim().is_empty() {
        return Err(ExtractError::Empty);
    }

    Ok((ocr_text, ExtractionMethod::OpticalFallback))
}

/// The production document pipeline.
pub struct InvoicePipeline {
    config: PipelineConfig,
    parser: Arc<FieldParser>,
    recognizer: Option<Arc<dyn TextRecognizer>>,
    categorizer: Categorizer,
}

impl InvoicePipeline {
    pub fn new(
        config: PipelineConfig,
        categories: Arc<CategorySet>,
        classifier: Option<Arc<dyn Classifier>>,
        recognizer: Option<Arc<dyn TextRecognizer>>,
    ) -> Self {
        let parser = Arc::new(FieldParser::new(config.extraction.clone()));
        let categorizer = Categorizer::new(categories, classifier, config.categorize.clone());
        Self {
            config,
            parser,
            recognizer,
            categorizer,
        }
    }

    /// Drive one document through extraction and categorization.
    ///
    /// Always returns the document in a terminal state; extraction failures
    /// are recorded on the document, categorization cannot fail.
    pub async fn process_document(&self, mut document: Document, data: Vec<u8>) -> Document {
        document.transition(DocumentStatus::Extracting);

        let extracted = self.run_extraction(data).await;

        let (fields, raw_text, method) = match extracted {
            Ok(ok) => ok,
            Err(e) => {
                info!(filename = %document.filename, error = %e, "document extraction failed");
                document.fail(FailureStage::Extraction, e.kind(), e.to_string());
                return document;
            }
        };

        document.vendor_name = fields.vendor_name.clone();
        document.invoice_number = fields.invoice_number.clone();
        document.invoice_date = fields.invoice_date;
        document.due_date = fields.due_date;
        document.total_amount = fields.total_amount;
        document.currency = fields.currency.clone();
        document.raw_text = raw_text;
        document.extraction_method = Some(method);
        document.transition(DocumentStatus::Extracted);

        document.transition(DocumentStatus::Categorizing);
        let assignment = self
            .categorizer
            .categorize(&fields, &document.raw_text)
            .await;
        document.category = Some(assignment.category().to_string());
        document.category_confidence = assignment.confidence();
        document.category_source = Some(assignment.source());
        document.transition(DocumentStatus::Categorized);

        debug!(
            filename = %document.filename,
            category = document.category.as_deref().unwrap_or("-"),
            confidence = document.category_confidence,
            "document categorized"
        );

        document
    }

    /// Extraction and field parsing are CPU-bound; keep them off the async
    /// runtime's I/O threads.
    async fn run_extraction(
        &self,
        data: Vec<u8>,
    ) -> Result<(ExtractedFields, String, ExtractionMethod), ExtractError> {
        let pdf_config = self.config.pdf.clone();
        let recognizer = self.recognizer.clone();
        let parser = Arc::clone(&self.parser);

        let joined = tokio::task::spawn_blocking(move || {
            let (text, method) =
                extract_document_text(&data, &pdf_config, recognizer.as_deref())?;
            let fields = parser.parse(&text);
            Ok((fields, text, method))
        })
        .await;

        match joined {
            Ok(result) => result,
            Err(e) => Err(ExtractError::Corrupt(format!("extraction task failed: {}", e))),
        }
    }
}

impl DocumentProcessor for InvoicePipeline {
    fn process<'a>(
        &'a self,
        document: Document,
        data: Vec<u8>,
    ) -> Pin<Box<dyn Future<Output = Document> + Send + 'a>> {
        Box::pin(self.process_document(document, data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{OcrError, PdfError};
    use image::DynamicImage;
    use lopdf::dictionary;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Recognizer stub answering a fixed string and counting calls.
    struct FixedRecognizer {
        answer: &'static str,
        calls: AtomicUsize,
    }

    impl FixedRecognizer {
        fn new(answer: &'static str) -> Self {
            Self {
                answer,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl TextRecognizer for FixedRecognizer {
        fn recognize(&self, _image: &DynamicImage) -> Result<String, OcrError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.answer.is_empty() {
                Err(OcrError::Recognition("nothing legible".to_string()))
            } else {
                Ok(self.answer.to_string())
            }
        }
    }

    /// PDF stub with a fixed text layer and one raster per page.
    struct FakePdf {
        text_layer: &'static str,
    }

    impl PdfSource for FakePdf {
        fn load(&mut self, _data: &[u8]) -> crate::pdf::Result<()> {
            Ok(())
        }

        fn page_count(&self) -> u32 {
            1
        }

        fn extract_text(&self) -> crate::pdf::Result<String> {
            if self.text_layer == "<error>" {
                Err(PdfError::TextExtraction("no text layer".to_string()))
            } else {
                Ok(self.text_layer.to_string())
            }
        }

        fn page_images(&self, _page: u32, _dpi: u32) -> crate::pdf::Result<Vec<DynamicImage>> {
            Ok(vec![DynamicImage::new_rgba8(4, 4)])
        }
    }

    const SUFFICIENT: &str =
        "ACME Corporation\nInvoice #100\nTotal: $250.00\nThank you for your business with us";

    #[test]
    fn test_sufficient_text_layer_never_invokes_ocr() {
        let pdf = FakePdf {
            text_layer: SUFFICIENT,
        };
        let engine = FixedRecognizer::new("should never be used");

        let (text, method) =
            extract_text_from_source(&pdf, &PdfConfig::default(), Some(&engine)).unwrap();
        assert_eq!(method, ExtractionMethod::TextLayer);
        assert_eq!(text, SUFFICIENT);
        assert_eq!(engine.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_whitespace_text_layer_engages_fallback() {
        let pdf = FakePdf {
            text_layer: "   \n\t \n ",
        };
        let engine = FixedRecognizer::new("ACME scanned text");

        let (text, method) =
            extract_text_from_source(&pdf, &PdfConfig::default(), Some(&engine)).unwrap();
        assert_eq!(method, ExtractionMethod::OpticalFallback);
        assert_eq!(text, "ACME scanned text");
        assert_eq!(engine.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_text_layer_error_is_soft() {
        let pdf = FakePdf {
            text_layer: "<error>",
        };
        let engine = FixedRecognizer::new("recovered optically");

        let (_, method) =
            extract_text_from_source(&pdf, &PdfConfig::default(), Some(&engine)).unwrap();
        assert_eq!(method, ExtractionMethod::OpticalFallback);
    }

    #[test]
    fn test_empty_after_both_paths_is_extraction_empty() {
        let pdf = FakePdf { text_layer: "" };
        let engine = FixedRecognizer::new("");

        let result = extract_text_from_source(&pdf, &PdfConfig::default(), Some(&engine));
        assert!(matches!(result, Err(ExtractError::Empty)));
    }

    #[test]
    fn test_corrupt_bytes_fail_extraction() {
        let result = extract_document_text(b"not a pdf", &PdfConfig::default(), None);
        assert!(matches!(result, Err(ExtractError::Corrupt(_))));
    }

    #[tokio::test]
    async fn test_corrupt_document_reaches_failed_state() {
        let pipeline = InvoicePipeline::new(
            PipelineConfig::default(),
            Arc::new(CategorySet::default()),
            None,
            None,
        );

        let document = Document::new("src-1", "broken.pdf");
        let done = pipeline
            .process_document(document, b"garbage bytes".to_vec())
            .await;

        assert_eq!(done.status, DocumentStatus::Failed);
        let error = done.error.unwrap();
        assert_eq!(error.stage, FailureStage::Extraction);
        assert_eq!(
            error.kind,
            crate::models::document::ErrorKind::ExtractionCorrupt
        );
    }

    #[test]
    fn test_no_engine_means_empty_not_panic() {
        // A structurally valid PDF with no text layer and no recognizer:
        // the document is empty, not corrupt. Assembled from the smallest
        // object set lopdf will load.
        let pdf = minimal_pdf_without_text();
        let result = extract_document_text(&pdf, &PdfConfig::default(), None);
        assert!(matches!(result, Err(ExtractError::Empty) | Err(ExtractError::Corrupt(_))));
    }

    /// A tiny one-page PDF with an empty content stream.
    fn minimal_pdf_without_text() -> Vec<u8> {
        let mut doc = lopdf::Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let content_id = doc.add_object(lopdf::Object::Stream(lopdf::Stream::new(
            lopdf::dictionary! {},
            Vec::new(),
        )));
        let page_id = doc.add_object(lopdf::dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        doc.objects.insert(
            pages_id,
            lopdf::Object::Dictionary(lopdf::dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(lopdf::dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }
}
