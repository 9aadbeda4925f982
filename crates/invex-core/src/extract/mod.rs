//! Structured field extraction from a raw invoice text blob.

pub mod rules;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::config::ExtractionConfig;
use rules::amounts::{detect_currency, TotalSelector};
use rules::dates::extract_dates;
use rules::patterns::{INVOICE_NO_BILL, INVOICE_NO_LABELED, INVOICE_NO_SHORT};
use rules::vendor::extract_vendor;

/// The structured field set recovered from one document.
///
/// Missing fields stay empty; the extractor never guesses and never fails
/// over a missing field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedFields {
    /// Vendor name; empty on a miss.
    #[serde(default)]
    pub vendor_name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_number: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_date: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<Decimal>,

    /// 3-letter currency code; the configured default when undetectable.
    pub currency: String,
}

/// Pattern-rule field parser.
///
/// Rule tables are compiled once; parsing is pure over the input text, so
/// re-running on the same blob yields identical fields.
pub struct FieldParser {
    config: ExtractionConfig,
    total_selector: TotalSelector,
}

impl FieldParser {
    pub fn new(config: ExtractionConfig) -> Self {
        let total_selector = TotalSelector::new(&config.total_keywords);
        Self {
            config,
            total_selector,
        }
    }

    /// Extract all fields from a text blob.
    pub fn parse(&self, text: &str) -> ExtractedFields {
        let vendor_name = extract_vendor(text, self.config.vendor_scan_lines);
        let invoice_number = self.extract_invoice_number(text);
        let dates = extract_dates(text);
        let total = self.total_selector.select(text);

        // Currency: the total's adjacent signal first, then any signal in
        // the document, then the configured default.
        let currency = total
            .as_ref()
            .and_then(|t| t.currency.clone())
            .or_else(|| detect_currency(text))
            .unwrap_or_else(|| self.config.default_currency.clone());

        let fields = ExtractedFields {
            vendor_name,
            invoice_number,
            invoice_date: dates.issue_date.map(|m| m.value),
            due_date: dates.due_date.map(|m| m.value),
            total_amount: total.map(|t| t.value),
            currency,
        };

        debug!(
            vendor = %fields.vendor_name,
            invoice_number = fields.invoice_number.as_deref().unwrap_or("-"),
            amount = ?fields.total_amount,
            currency = %fields.currency,
            "extracted fields"
        );

        fields
    }

    fn extract_invoice_number(&self, text: &str) -> Option<String> {
        for pattern in [&*INVOICE_NO_LABELED, &*INVOICE_NO_SHORT, &*INVOICE_NO_BILL] {
            if let Some(caps) = pattern.captures(text) {
                return Some(caps[1].trim().to_string());
            }
        }
        None
    }
}

impl Default for FieldParser {
    fn default() -> Self {
        Self::new(ExtractionConfig::default())
    }
}
