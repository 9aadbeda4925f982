//! Batch orchestrator: a bounded worker pool drives documents through the
//! pipeline with isolated per-document failure handling and live progress.

use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::source::{DocumentRef, DocumentSource};
use crate::models::batch::{Batch, BatchStatus};
use crate::models::document::{
    Document, DocumentStatus, ErrorKind, FailureStage,
};
use crate::pipeline::DocumentProcessor;

/// Progress events emitted while a batch runs.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    BatchStarted {
        batch_id: String,
        total: usize,
    },
    DocumentStarted {
        index: usize,
        filename: String,
    },
    DocumentFinished {
        index: usize,
        filename: String,
        status: DocumentStatus,
        processed: usize,
        failed: usize,
        total: usize,
    },
    BatchCompleted {
        batch_id: String,
        processed: usize,
        failed: usize,
        total: usize,
    },
}

/// Progress callback shared across workers.
pub type ProgressCallback = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

/// A no-op progress callback.
pub fn no_progress() -> ProgressCallback {
    Arc::new(|_| {})
}

/// Orchestrates one batch at a time over a shared document processor.
///
/// Multiple processors may run concurrently over different batches; they
/// share no per-document state.
pub struct BatchProcessor {
    processor: Arc<dyn DocumentProcessor>,
    workers: usize,
}

/// A claimed document travelling through the worker pool.
struct Job {
    index: usize,
    doc_ref: DocumentRef,
}

impl BatchProcessor {
    pub fn new(processor: Arc<dyn DocumentProcessor>, workers: usize) -> Self {
        Self {
            processor,
            workers: workers.max(1),
        }
    }

    /// Run a batch over every document the source lists.
    ///
    /// The returned batch is terminal: `completed` when every document
    /// reached a terminal state (regardless of per-document failures),
    /// `failed` only when the source could not be listed at all.
    /// Cancellation stops claiming new documents; in-flight documents
    /// finish.
    pub async fn run(
        &self,
        batch_id: impl Into<String>,
        source: Arc<dyn DocumentSource>,
        progress: ProgressCallback,
        cancel: CancellationToken,
    ) -> Batch {
        let batch_id = batch_id.into();

        let refs = match source.list().await {
            Ok(refs) => refs,
            Err(e) => {
                warn!(batch_id = %batch_id, error = %e, "batch source unreachable");
                return Batch::failed(batch_id, e.to_string());
            }
        };

        let documents: Vec<Document> = refs
            .iter()
            .map(|r| Document::new(r.id.clone(), r.filename.clone()))
            .collect();
        let total = documents.len();

        let mut batch = Batch::new(batch_id.clone(), documents);
        batch.status = BatchStatus::Processing;
        progress(ProgressEvent::BatchStarted {
            batch_id: batch_id.clone(),
            total,
        });

        if total == 0 {
            batch.status = BatchStatus::Completed;
            progress(ProgressEvent::BatchCompleted {
                batch_id,
                processed: 0,
                failed: 0,
                total: 0,
            });
            return batch;
        }

        let shared = Arc::new(Mutex::new(batch));
        let (job_tx, job_rx) = async_channel::unbounded::<Job>();

        for (index, doc_ref) in refs.into_iter().enumerate() {
            // Unbounded channel: sending never blocks.
            let _ = job_tx.try_send(Job { index, doc_ref });
        }
        job_tx.close();

        let mut handles: Vec<JoinHandle<()>> = Vec::with_capacity(self.workers);
        for _ in 0..self.workers {
            handles.push(tokio::spawn(worker_loop(
                job_rx.clone(),
                Arc::clone(&self.processor),
                Arc::clone(&source),
                Arc::clone(&shared),
                progress.clone(),
                cancel.clone(),
            )));
        }

        for handle in handles {
            let _ = handle.await;
        }

        let mut batch = match Arc::try_unwrap(shared) {
            Ok(mutex) => mutex.into_inner().unwrap_or_else(|e| e.into_inner()),
            Err(arc) => arc.lock().unwrap_or_else(|e| e.into_inner()).clone(),
        };

        // A worker that died mid-document (panic, abort) leaves its document
        // non-terminal; sweep those so the counters still add up.
        for index in 0..batch.documents.len() {
            if !batch.documents[index].status.is_terminal() {
                let mut document = batch.documents[index].clone();
                document.transition(DocumentStatus::Extracting);
                document.fail(
                    FailureStage::Extraction,
                    ErrorKind::ExtractionCorrupt,
                    "worker aborted before the document finished",
                );
                batch.record_terminal(index, document);
            }
        }

        batch.status = BatchStatus::Completed;
        info!(
            batch_id = %batch.id,
            processed = batch.processed,
            failed = batch.failed,
            total = batch.total,
            "batch completed"
        );
        progress(ProgressEvent::BatchCompleted {
            batch_id: batch.id.clone(),
            processed: batch.processed,
            failed: batch.failed,
            total: batch.total,
        });

        batch
    }
}

/// One worker: claim jobs until the queue closes.
async fn worker_loop(
    job_rx: async_channel::Receiver<Job>,
    processor: Arc<dyn DocumentProcessor>,
    source: Arc<dyn DocumentSource>,
    shared: Arc<Mutex<Batch>>,
    progress: ProgressCallback,
    cancel: CancellationToken,
) {
    while let Ok(job) = job_rx.recv().await {
        let Job { index, doc_ref } = job;

        // Claim the pending document out of the arena.
        let mut document = {
            let batch = shared.lock().unwrap_or_else(|e| e.into_inner());
            batch.documents[index].clone()
        };

        // Cancellation stops scheduling; the unclaimed documents are still
        // driven to a terminal state so the batch counters stay consistent.
        if cancel.is_cancelled() {
            document.transition(DocumentStatus::Extracting);
            document.fail(
                FailureStage::Extraction,
                ErrorKind::ExtractionCorrupt,
                "cancelled before processing",
            );
            record_terminal(&shared, &progress, index, document);
            continue;
        }

        progress(ProgressEvent::DocumentStarted {
            index,
            filename: doc_ref.filename.clone(),
        });

        let document = match source.fetch(&doc_ref).await {
            Ok(data) => processor.process(document, data).await,
            Err(msg) => {
                warn!(filename = %doc_ref.filename, error = %msg, "document fetch failed");
                document.transition(DocumentStatus::Extracting);
                document.fail(
                    FailureStage::Extraction,
                    ErrorKind::ExtractionCorrupt,
                    format!("fetch failed: {}", msg),
                );
                document
            }
        };

        record_terminal(&shared, &progress, index, document);
    }
}

/// Record a terminal document through the single serialized update path.
///
/// The progress event is emitted while the batch lock is held, so observers
/// see the running counters in nondecreasing order even when workers finish
/// simultaneously.
fn record_terminal(
    shared: &Arc<Mutex<Batch>>,
    progress: &ProgressCallback,
    index: usize,
    document: Document,
) {
    let filename = document.filename.clone();
    let status = document.status;

    let mut batch = shared.lock().unwrap_or_else(|e| e.into_inner());
    batch.record_terminal(index, document);

    progress(ProgressEvent::DocumentFinished {
        index,
        filename,
        status,
        processed: batch.processed,
        failed: batch.failed,
        total: batch.total,
    });
}
