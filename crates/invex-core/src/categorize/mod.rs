//! Invoice categorization: model-backed primary path with a deterministic
//! keyword fallback.

pub mod client;
pub mod keywords;
pub mod mock;

pub use client::{Classifier, ClassifyRequest, ClassifyResponse, HttpClassifier};
pub use keywords::{match_keywords, KeywordMatch};
pub use mock::{MockClassifier, MockResponse};

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::extract::ExtractedFields;
use crate::models::category::CategorySet;
use crate::models::config::CategorizeConfig;
use crate::models::document::CategorySource;

/// A category assignment with its provenance kept visible, so downstream
/// consumers can flag low-trust assignments for review.
#[derive(Debug, Clone, PartialEq)]
pub enum Assignment {
    /// The classification model answered.
    Model { category: String, confidence: f64 },
    /// The deterministic keyword matcher answered.
    Fallback { category: String, confidence: f64 },
    /// Nothing matched; the default category at confidence 0 makes the
    /// failure mode observable.
    Default { category: String },
}

impl Assignment {
    pub fn category(&self) -> &str {
        match self {
            Assignment::Model { category, .. } => category,
            Assignment::Fallback { category, .. } => category,
            Assignment::Default { category } => category,
        }
    }

    pub fn confidence(&self) -> f64 {
        match self {
            Assignment::Model { confidence, .. } => *confidence,
            Assignment::Fallback { confidence, .. } => *confidence,
            Assignment::Default { .. } => 0.0,
        }
    }

    pub fn source(&self) -> CategorySource {
        match self {
            Assignment::Model { .. } => CategorySource::Model,
            Assignment::Fallback { .. } => CategorySource::KeywordFallback,
            Assignment::Default { .. } => CategorySource::Default,
        }
    }
}

/// Categorizer driving the primary/fallback split.
///
/// This stage never fails a document: every path lands on a well-formed
/// assignment with confidence in [0, 1].
pub struct Categorizer {
    categories: Arc<CategorySet>,
    classifier: Option<Arc<dyn Classifier>>,
    client: reqwest::Client,
    config: CategorizeConfig,
}

impl Categorizer {
    pub fn new(
        categories: Arc<CategorySet>,
        classifier: Option<Arc<dyn Classifier>>,
        config: CategorizeConfig,
    ) -> Self {
        let client = reqwest::Client::builder()
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            categories,
            classifier,
            client,
            config,
        }
    }

    /// Categorize one document from its extracted fields and raw text.
    pub async fn categorize(&self, fields: &ExtractedFields, raw_text: &str) -> Assignment {
        if let Some(ref classifier) = self.classifier {
            let request = self.build_request(fields, raw_text);
            let timeout = Duration::from_secs(self.config.request_timeout_secs);

            match classifier.classify(&request, &self.client, timeout).await {
                Ok(response) => {
                    // Snap off-list answers to a known category before use.
                    let category = self.categories.resolve(&response.category);
                    let confidence = response.confidence.clamp(0.0, 1.0);
                    debug!(
                        backend = classifier.name(),
                        category = %category.name,
                        confidence,
                        "model categorization"
                    );
                    return Assignment::Model {
                        category: category.name.clone(),
                        confidence,
                    };
                }
                Err(e) => {
                    // Absorbed: the keyword fallback below keeps the document
                    // moving to a terminal status.
                    warn!(
                        backend = classifier.name(),
                        error = %e,
                        "categorization unavailable, engaging keyword fallback"
                    );
                }
            }
        }

        match match_keywords(&self.categories, &fields.vendor_name, raw_text) {
            Some(found) => {
                debug!(
                    category = %found.category,
                    score = found.score,
                    "keyword fallback categorization"
                );
                Assignment::Fallback {
                    category: found.category,
                    confidence: found.confidence,
                }
            }
            None => {
                debug!("categorization exhausted, assigning default category");
                Assignment::Default {
                    category: self.categories.default_category().name.clone(),
                }
            }
        }
    }

    fn build_request(&self, fields: &ExtractedFields, raw_text: &str) -> ClassifyRequest {
        let mut text_excerpt = raw_text.to_string();
        if text_excerpt.len() > self.config.text_excerpt_chars {
            let mut cut = self.config.text_excerpt_chars;
            while !text_excerpt.is_char_boundary(cut) {
                cut -= 1;
            }
            text_excerpt.truncate(cut);
        }

        ClassifyRequest {
            vendor: fields.vendor_name.clone(),
            text_excerpt,
            amount: fields.total_amount,
            currency: fields.currency.clone(),
            categories: self.categories.names(),
        }
    }
}
