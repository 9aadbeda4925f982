//! Document (invoice) data model and its lifecycle state machine.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How the raw text of a document was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractionMethod {
    /// Embedded, machine-readable text in the PDF page stream.
    TextLayer,
    /// Recognition over rasterized page images.
    OpticalFallback,
}

/// Lifecycle state of a document inside a batch.
///
/// `Categorized` and `Failed` are terminal; the only mutation path is
/// [`Document::transition`], which rejects any regression from a terminal
/// state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentStatus {
    Pending,
    Extracting,
    Extracted,
    Categorizing,
    Categorized,
    Failed,
}

impl DocumentStatus {
    /// Whether no further pipeline stage will mutate the document.
    pub fn is_terminal(&self) -> bool {
        matches!(self, DocumentStatus::Categorized | DocumentStatus::Failed)
    }

    /// Whether extraction has succeeded for this document.
    pub fn is_extracted(&self) -> bool {
        matches!(
            self,
            DocumentStatus::Extracted | DocumentStatus::Categorizing | DocumentStatus::Categorized
        )
    }
}

/// Which pipeline stage produced a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureStage {
    Extraction,
    Categorization,
}

/// Serialized failure kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    /// The file could not be read at all.
    ExtractionCorrupt,
    /// No usable text from either extractor.
    ExtractionEmpty,
}

/// Failure record attached to a `failed` document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentError {
    pub kind: ErrorKind,
    pub stage: FailureStage,
    pub message: String,
}

/// Where a category assignment came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CategorySource {
    /// The classification model answered.
    Model,
    /// The deterministic keyword matcher answered.
    KeywordFallback,
    /// Nothing matched; the default category was assigned at confidence 0.
    Default,
}

/// A single invoice document moving through the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Opaque reference into the document source.
    pub source_id: String,

    /// Original file name, for display and diagnostics.
    pub filename: String,

    /// Vendor name; empty when the heuristic found nothing.
    #[serde(default)]
    pub vendor_name: String,

    /// Invoice number, when a labeled token was found.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_number: Option<String>,

    /// Issue date, normalized from whichever input format matched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_date: Option<NaiveDate>,

    /// Payment due date, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,

    /// Total amount; non-negative when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<Decimal>,

    /// ISO-4217-like currency code; defaulted when undetectable.
    pub currency: String,

    /// Full extracted text, kept for diagnostics and keyword matching.
    #[serde(default)]
    pub raw_text: String,

    /// How the text was obtained; set once extraction succeeds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extraction_method: Option<ExtractionMethod>,

    /// Assigned spend category.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Confidence of the category assignment (0.0 - 1.0).
    #[serde(default)]
    pub category_confidence: f64,

    /// Provenance of the category assignment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_source: Option<CategorySource>,

    /// Lifecycle state.
    pub status: DocumentStatus,

    /// Failure record when status is `failed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<DocumentError>,
}

impl Document {
    /// Create a pending document claimed from a source.
    pub fn new(source_id: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            filename: filename.into(),
            vendor_name: String::new(),
            invoice_number: None,
            invoice_date: None,
            due_date: None,
            total_amount: None,
            currency: String::new(),
            raw_text: String::new(),
            extraction_method: None,
            category: None,
            category_confidence: 0.0,
            category_source: None,
            status: DocumentStatus::Pending,
            error: None,
        }
    }

    /// Move the document to a new lifecycle state.
    ///
    /// Returns `false` (and leaves the document untouched) if the current
    /// state is terminal. This is the only place status is written.
    pub fn transition(&mut self, next: DocumentStatus) -> bool {
        if self.status.is_terminal() {
            tracing::warn!(
                filename = %self.filename,
                from = ?self.status,
                to = ?next,
                "ignoring status transition out of a terminal state"
            );
            return false;
        }
        self.status = next;
        true
    }

    /// Mark the document failed with the given stage, kind and message.
    pub fn fail(&mut self, stage: FailureStage, kind: ErrorKind, message: impl Into<String>) -> bool {
        if !self.transition(DocumentStatus::Failed) {
            return false;
        }
        self.error = Some(DocumentError {
            kind,
            stage,
            message: message.into(),
        });
        true
    }
}
