//! Rule-based field extractors for invoice text.
//!
//! Each field is recovered by an ordered cascade of independent rules; new
//! formats are added by appending a rule, not by touching existing ones.

pub mod amounts;
pub mod dates;
pub mod patterns;
pub mod vendor;

pub use amounts::{extract_total, parse_amount, AmountExtractor, NumberLocale};
pub use dates::{extract_dates, DateExtractor, InvoiceDates};
pub use vendor::extract_vendor;

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// An extracted value with the rule that produced it and its source text.
#[derive(Debug, Clone)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Name of the rule that matched.
    pub rule: &'static str,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, rule: &'static str, source: impl Into<String>) -> Self {
        Self {
            value,
            rule,
            source: source.into(),
        }
    }
}
