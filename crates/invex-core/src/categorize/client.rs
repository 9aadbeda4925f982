//! Classification-service client: trait and HTTP implementation.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::CategorizeError;

/// Request sent to the classification service.
#[derive(Debug, Clone, Serialize)]
pub struct ClassifyRequest {
    /// Vendor name; may be empty.
    pub vendor: String,

    /// Truncated raw text of the document.
    pub text_excerpt: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,

    pub currency: String,

    /// The allowed category names; the service must answer within this set.
    pub categories: Vec<String>,
}

/// Response from the classification service.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifyResponse {
    pub category: String,

    /// Raw confidence as returned; clamped to [0, 1] by the categorizer.
    #[serde(default)]
    pub confidence: f64,
}

/// A classification backend.
///
/// Implementations must be cheap to call concurrently; the per-request
/// timeout is enforced by the implementation, and is what keeps the
/// fallback path live when the service hangs.
pub trait Classifier: Send + Sync {
    /// Human-readable backend name for logs.
    fn name(&self) -> &str;

    fn classify<'a>(
        &'a self,
        request: &'a ClassifyRequest,
        client: &'a reqwest::Client,
        timeout: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<ClassifyResponse, CategorizeError>> + Send + 'a>>;
}

/// HTTP classification backend: JSON POST to a configured endpoint.
pub struct HttpClassifier {
    endpoint: String,
    api_key: Option<String>,
}

impl HttpClassifier {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key,
        }
    }
}

impl Classifier for HttpClassifier {
    fn name(&self) -> &str {
        "http"
    }

    fn classify<'a>(
        &'a self,
        request: &'a ClassifyRequest,
        client: &'a reqwest::Client,
        timeout: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<ClassifyResponse, CategorizeError>> + Send + 'a>> {
        Box::pin(async move {
            let mut builder = client
                .post(&self.endpoint)
                .timeout(timeout)
                .json(request);

            if let Some(ref key) = self.api_key {
                builder = builder.bearer_auth(key);
            }

            let resp = builder
                .send()
                .await
                .map_err(|e| CategorizeError::Transport(e.to_string()))?;

            let status = resp.status();
            if !status.is_success() {
                return Err(CategorizeError::Transport(format!("HTTP {}", status)));
            }

            let parsed: ClassifyResponse = resp
                .json()
                .await
                .map_err(|e| CategorizeError::Malformed(e.to_string()))?;

            if parsed.category.trim().is_empty() {
                return Err(CategorizeError::Malformed(
                    "empty category in response".to_string(),
                ));
            }

            Ok(parsed)
        })
    }
}
