//! Data models: documents, batches, categories, configuration.

pub mod batch;
pub mod category;
pub mod config;
pub mod document;

pub use batch::{Batch, BatchStatus, BatchSummary};
pub use category::{Category, CategorySet};
pub use config::PipelineConfig;
pub use document::{
    CategorySource, Document, DocumentError, DocumentStatus, ErrorKind, ExtractionMethod,
    FailureStage,
};
