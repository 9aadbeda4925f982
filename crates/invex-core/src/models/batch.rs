//! Batch data model: counters, aggregate summary, lifecycle.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::document::{Document, DocumentStatus};

/// Lifecycle state of a batch job.
///
/// `Completed` means every document reached a terminal state, however many
/// individually failed. `Failed` is reserved for job-level problems (the
/// source could not be listed at all).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BatchStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl BatchStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, BatchStatus::Completed | BatchStatus::Failed)
    }
}

/// Aggregate statistics over the successfully extracted documents of a batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Sum of `total_amount` over documents sharing the dominant currency.
    pub total_amount: Decimal,

    /// Dominant currency: the code shared by the largest subset of
    /// successfully extracted documents. Empty until one exists.
    #[serde(default)]
    pub currency: String,

    /// Earliest invoice date among extracted documents.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_range_start: Option<NaiveDate>,

    /// Latest invoice date among extracted documents.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_range_end: Option<NaiveDate>,
}

/// A batch of documents being driven through the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Batch {
    /// Opaque batch identifier, supplied by the caller.
    pub id: String,

    /// Documents in submission order (display only; processing order is
    /// unspecified).
    pub documents: Vec<Document>,

    /// Number of documents claimed for this batch.
    pub total: usize,

    /// Documents that reached `categorized`.
    pub processed: usize,

    /// Documents that reached `failed`.
    pub failed: usize,

    /// Aggregate statistics, recomputed after each terminal document.
    pub summary: BatchSummary,

    /// Lifecycle state.
    pub status: BatchStatus,

    /// Job-level error message when status is `failed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Batch {
    /// Create a pending batch over the given documents.
    pub fn new(id: impl Into<String>, documents: Vec<Document>) -> Self {
        let total = documents.len();
        Self {
            id: id.into(),
            documents,
            total,
            processed: 0,
            failed: 0,
            summary: BatchSummary::default(),
            status: BatchStatus::Pending,
            error: None,
        }
    }

    /// Create a batch that failed before any document was claimed.
    pub fn failed(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            documents: Vec::new(),
            total: 0,
            processed: 0,
            failed: 0,
            summary: BatchSummary::default(),
            status: BatchStatus::Failed,
            error: Some(message.into()),
        }
    }

    /// Record a document that reached a terminal state.
    ///
    /// This is the single serialized update path for counters and the
    /// aggregate summary; callers hold the batch lock while invoking it.
    /// Returns `true` once every document is terminal.
    pub fn record_terminal(&mut self, index: usize, document: Document) -> bool {
        debug_assert!(document.status.is_terminal());

        self.documents[index] = document;
        self.recompute();
        self.processed + self.failed == self.total
    }

    /// Recompute counters and summary from the document arena.
    fn recompute(&mut self) {
        self.processed = self
            .documents
            .iter()
            .filter(|d| d.status == DocumentStatus::Categorized)
            .count();
        self.failed = self
            .documents
            .iter()
            .filter(|d| d.status == DocumentStatus::Failed)
            .count();
        self.summary = summarize(&self.documents);
    }
}

/// Build the aggregate summary over successfully extracted documents.
///
/// Only documents whose extraction succeeded participate; the total is
/// restricted to the dominant currency so mixed-currency batches never sum
/// incomparable amounts.
pub fn summarize(documents: &[Document]) -> BatchSummary {
    let extracted: Vec<&Document> = documents
        .iter()
        .filter(|d| d.status.is_extracted())
        .collect();

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for doc in &extracted {
        if !doc.currency.is_empty() {
            *counts.entry(doc.currency.as_str()).or_insert(0) += 1;
        }
    }

    // Most frequent currency; ties broken by code order for determinism.
    let currency = counts
        .iter()
        .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
        .map(|(code, _)| code.to_string())
        .unwrap_or_default();

    let total_amount = extracted
        .iter()
        .filter(|d| d.currency == currency)
        .filter_map(|d| d.total_amount)
        .sum();

    let mut dates: Vec<NaiveDate> = extracted.iter().filter_map(|d| d.invoice_date).collect();
    dates.sort();

    BatchSummary {
        total_amount,
        currency,
        date_range_start: dates.first().copied(),
        date_range_end: dates.last().copied(),
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::models::document::{ErrorKind, FailureStage};

    fn doc(filename: &str) -> Document {
        Document::new(filename, filename)
    }

    fn categorized(filename: &str, amount: &str, currency: &str, date: Option<&str>) -> Document {
        let mut d = doc(filename);
        d.transition(DocumentStatus::Extracting);
        d.transition(DocumentStatus::Extracted);
        d.transition(DocumentStatus::Categorizing);
        d.transition(DocumentStatus::Categorized);
        d.total_amount = Some(Decimal::from_str(amount).unwrap());
        d.currency = currency.to_string();
        d.invoice_date = date.map(|s| NaiveDate::from_str(s).unwrap());
        d
    }

    #[test]
    fn test_counters_and_completion() {
        let mut batch = Batch::new("b-1", vec![doc("a.pdf"), doc("b.pdf"), doc("c.pdf")]);
        batch.status = BatchStatus::Processing;

        let done = batch.record_terminal(0, categorized("a.pdf", "100.00", "USD", None));
        assert!(!done);
        assert_eq!(batch.processed, 1);
        assert_eq!(batch.failed, 0);

        let mut failed = doc("b.pdf");
        failed.transition(DocumentStatus::Extracting);
        failed.fail(
            FailureStage::Extraction,
            ErrorKind::ExtractionCorrupt,
            "unreadable",
        );
        let done = batch.record_terminal(1, failed);
        assert!(!done);
        assert_eq!(batch.failed, 1);
        assert!(batch.processed + batch.failed <= batch.total);

        let done = batch.record_terminal(2, categorized("c.pdf", "50.00", "USD", None));
        assert!(done);
        assert_eq!(batch.processed + batch.failed, batch.total);
    }

    #[test]
    fn test_summary_uses_dominant_currency() {
        let docs = vec![
            categorized("a.pdf", "100.00", "USD", Some("2024-01-05")),
            categorized("b.pdf", "200.00", "USD", Some("2024-03-01")),
            categorized("c.pdf", "999.00", "EUR", Some("2024-02-10")),
        ];

        let summary = summarize(&docs);
        assert_eq!(summary.currency, "USD");
        assert_eq!(summary.total_amount, Decimal::from_str("300.00").unwrap());
        assert_eq!(
            summary.date_range_start,
            Some(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap())
        );
        assert_eq!(
            summary.date_range_end,
            Some(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
        );
    }

    #[test]
    fn test_summary_excludes_failed_documents() {
        let mut failed = doc("c.pdf");
        failed.transition(DocumentStatus::Extracting);
        failed.total_amount = Some(Decimal::from_str("500.00").unwrap());
        failed.currency = "USD".to_string();
        failed.fail(
            FailureStage::Extraction,
            ErrorKind::ExtractionEmpty,
            "no usable text",
        );

        let docs = vec![categorized("a.pdf", "100.00", "USD", None), failed];
        let summary = summarize(&docs);
        assert_eq!(summary.total_amount, Decimal::from_str("100.00").unwrap());
    }
}
