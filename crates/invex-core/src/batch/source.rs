//! Document source boundary: listing and fetching document bytes.

use std::future::Future;
use std::pin::Pin;

use crate::error::BatchError;

/// A claimable document in a source.
#[derive(Debug, Clone)]
pub struct DocumentRef {
    /// Opaque identifier inside the source.
    pub id: String,
    /// Display file name.
    pub filename: String,
}

/// Where a batch's documents come from.
///
/// Implementations live at the application boundary (a local folder, a
/// cloud drive); the orchestrator only sees this trait. A failed `list` is
/// the one thing that fails a whole batch; a failed `fetch` fails only that
/// document.
pub trait DocumentSource: Send + Sync {
    /// Human-readable description for logs and batch identity.
    fn describe(&self) -> String;

    /// Enumerate the documents of this source.
    fn list<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<DocumentRef>, BatchError>> + Send + 'a>>;

    /// Fetch one document's bytes.
    fn fetch<'a>(
        &'a self,
        doc: &'a DocumentRef,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<u8>, String>> + Send + 'a>>;
}

/// An in-memory source over already-resolved byte buffers.
///
/// Useful for tests and for callers that did their own I/O.
pub struct StaticSource {
    name: String,
    documents: Vec<(DocumentRef, Vec<u8>)>,
}

impl StaticSource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            documents: Vec::new(),
        }
    }

    pub fn push(mut self, filename: impl Into<String>, data: Vec<u8>) -> Self {
        let filename = filename.into();
        let id = format!("static-{}", self.documents.len());
        self.documents.push((
            DocumentRef {
                id,
                filename,
            },
            data,
        ));
        self
    }
}

impl DocumentSource for StaticSource {
    fn describe(&self) -> String {
        self.name.clone()
    }

    fn list<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<DocumentRef>, BatchError>> + Send + 'a>> {
        Box::pin(async move { Ok(self.documents.iter().map(|(r, _)| r.clone()).collect()) })
    }

    fn fetch<'a>(
        &'a self,
        doc: &'a DocumentRef,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<u8>, String>> + Send + 'a>> {
        Box::pin(async move {
            self.documents
                .iter()
                .find(|(r, _)| r.id == doc.id)
                .map(|(_, data)| data.clone())
                .ok_or_else(|| format!("unknown document: {}", doc.id))
        })
    }
}
