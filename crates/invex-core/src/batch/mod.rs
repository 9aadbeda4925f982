//! Batch orchestration: document sources, worker pool, progress events.

mod orchestrator;
mod source;

pub use orchestrator::{no_progress, BatchProcessor, ProgressCallback, ProgressEvent};
pub use source::{DocumentRef, DocumentSource, StaticSource};
