//! Core library for bulk invoice capture.
//!
//! This crate provides:
//! - PDF processing (text layer and page-image extraction)
//! - An optical fallback over a pluggable recognition engine
//! - Pattern-rule field extraction (vendor, number, dates, amount, currency)
//! - Categorization with a model-backed primary path and keyword fallback
//! - An async batch orchestrator with per-document failure isolation

pub mod batch;
pub mod categorize;
pub mod error;
pub mod extract;
pub mod models;
pub mod ocr;
pub mod pdf;
pub mod pipeline;

pub use batch::{BatchProcessor, DocumentRef, DocumentSource, ProgressCallback, ProgressEvent};
pub use categorize::{Assignment, Categorizer, Classifier, HttpClassifier};
pub use error::{InvexError, Result};
pub use extract::{ExtractedFields, FieldParser};
pub use models::{Batch, BatchStatus, Category, CategorySet, Document, DocumentStatus, PipelineConfig};
pub use ocr::TextRecognizer;
#[cfg(feature = "ocr")]
pub use ocr::PureOcrEngine;
pub use pdf::{PdfExtractor, PdfSource};
pub use pipeline::{DocumentProcessor, InvoicePipeline};
