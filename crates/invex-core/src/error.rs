//! Error types for the invex-core library.

use thiserror::Error;

/// Main error type for the invex library.
#[derive(Error, Debug)]
pub enum InvexError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Document text extraction error.
    #[error("extraction error: {0}")]
    Extract(#[from] ExtractError),

    /// Batch-level error.
    #[error("batch error: {0}")]
    Batch(#[from] BatchError),

    /// Image processing error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from the PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// Failed to extract page images from the PDF.
    #[error("failed to extract images: {0}")]
    ImageExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Errors related to OCR processing.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Text recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// Invalid image format or dimensions.
    #[error("invalid image: {0}")]
    InvalidImage(String),
}

/// Errors that terminally fail a document's extraction stage.
///
/// These are the only errors that move a document to the `failed` status;
/// everything downstream of extraction is absorbed by fallbacks.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The file could not be read as a PDF at all.
    #[error("unreadable document: {0}")]
    Corrupt(String),

    /// Neither the text layer nor the optical fallback produced usable text.
    #[error("no usable text in document")]
    Empty,
}

impl ExtractError {
    /// The serialized error kind for this failure.
    pub fn kind(&self) -> crate::models::document::ErrorKind {
        match self {
            ExtractError::Corrupt(_) => crate::models::document::ErrorKind::ExtractionCorrupt,
            ExtractError::Empty => crate::models::document::ErrorKind::ExtractionEmpty,
        }
    }
}

/// Errors from the categorization primary path.
///
/// Never propagated out of the categorizer; they select the fallback path.
#[derive(Error, Debug)]
pub enum CategorizeError {
    /// Transport-level failure (connect, timeout, TLS).
    #[error("classification request failed: {0}")]
    Transport(String),

    /// The service answered but the response could not be parsed.
    #[error("malformed classification response: {0}")]
    Malformed(String),

    /// No classifier is configured.
    #[error("no classifier configured")]
    Unconfigured,
}

/// Errors related to batch orchestration.
#[derive(Error, Debug)]
pub enum BatchError {
    /// The document source could not be listed at all.
    #[error("document source unreachable: {0}")]
    SourceUnreachable(String),
}

/// Result type for the invex library.
pub type Result<T> = std::result::Result<T, InvexError>;
