//! Mock classification backend for testing.

use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::client::{Classifier, ClassifyRequest, ClassifyResponse};
use crate::error::CategorizeError;

/// A configurable mock response for [`MockClassifier`].
#[derive(Clone, Debug)]
pub enum MockResponse {
    /// Simulate a successful classification.
    Answer { category: String, confidence: f64 },
    /// Simulate a transport failure or timeout.
    Error(String),
    /// Simulate a malformed payload.
    Malformed,
}

/// A hand-rolled mock implementing [`Classifier`] for tests.
///
/// Supports a fixed response or a sequence (repeating the last when
/// exhausted), optional latency, and call counting.
pub struct MockClassifier {
    /// If non-empty, each call pops the next response.
    responses: Mutex<Vec<MockResponse>>,
    /// Fallback when the sequence is empty (or single-response mode).
    fallback: MockResponse,
    delay: Option<Duration>,
    call_count: AtomicUsize,
}

impl MockClassifier {
    /// Create a mock that always returns `response`.
    pub fn new(response: MockResponse) -> Self {
        Self {
            responses: Mutex::new(Vec::new()),
            fallback: response,
            delay: None,
            call_count: AtomicUsize::new(0),
        }
    }

    /// Create a mock that always answers with the given category.
    pub fn answering(category: &str, confidence: f64) -> Self {
        Self::new(MockResponse::Answer {
            category: category.to_string(),
            confidence,
        })
    }

    /// Create a mock whose every call fails.
    pub fn failing(message: &str) -> Self {
        Self::new(MockResponse::Error(message.to_string()))
    }

    /// Create a mock that returns responses in order, repeating the last one.
    pub fn with_sequence(mut responses: Vec<MockResponse>) -> Self {
        assert!(
            !responses.is_empty(),
            "sequence must have at least one response"
        );
        // Reverse so we can pop() from the front cheaply.
        responses.reverse();
        let fallback = responses.first().cloned().unwrap();
        Self {
            responses: Mutex::new(responses),
            fallback,
            delay: None,
            call_count: AtomicUsize::new(0),
        }
    }

    /// Set simulated latency per call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// How many times `classify()` has been called.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    fn next_response(&self) -> MockResponse {
        let mut seq = self.responses.lock().unwrap_or_else(|e| e.into_inner());
        seq.pop().unwrap_or_else(|| self.fallback.clone())
    }
}

impl Classifier for MockClassifier {
    fn name(&self) -> &str {
        "mock"
    }

    fn classify<'a>(
        &'a self,
        _request: &'a ClassifyRequest,
        _client: &'a reqwest::Client,
        _timeout: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<ClassifyResponse, CategorizeError>> + Send + 'a>> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        let response = self.next_response();
        let delay = self.delay;

        Box::pin(async move {
            if let Some(d) = delay {
                tokio::time::sleep(d).await;
            }

            match response {
                MockResponse::Answer {
                    category,
                    confidence,
                } => Ok(ClassifyResponse {
                    category,
                    confidence,
                }),
                MockResponse::Error(msg) => Err(CategorizeError::Transport(msg)),
                MockResponse::Malformed => Err(CategorizeError::Malformed(
                    "unparseable payload".to_string(),
                )),
            }
        })
    }
}
