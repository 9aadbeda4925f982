//! Amount and currency extraction with locale-aware number parsing.

use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

use super::patterns::{
    BARE_AMOUNT, CODE_AFTER_AMOUNT, CODE_BEFORE_AMOUNT, CURRENCY_SIGNAL, SYMBOL_AMOUNT,
};
use super::{ExtractionMatch, FieldExtractor};

/// Decimal-separator convention implied by a currency signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberLocale {
    /// Comma groups thousands, dot is the decimal separator (1,234.56).
    Us,
    /// Dot groups thousands, comma is the decimal separator (1.234,56).
    Eu,
    /// No signal; the separator shape decides.
    Unknown,
}

/// Map a currency code to its separator convention.
pub fn locale_for(currency: &str) -> NumberLocale {
    match currency {
        "EUR" | "PLN" => NumberLocale::Eu,
        "USD" | "GBP" | "CHF" => NumberLocale::Us,
        _ => NumberLocale::Unknown,
    }
}

/// Map a currency symbol to its ISO code.
pub fn symbol_to_code(symbol: &str) -> Option<&'static str> {
    match symbol {
        "$" => Some("USD"),
        "€" => Some("EUR"),
        "£" => Some("GBP"),
        _ => None,
    }
}

/// An amount detected in text, with its currency when one was adjacent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Amount {
    pub value: Decimal,
    pub currency: Option<String>,
}

/// Amount field extractor: currency-adjacent rules first, bare numbers last.
pub struct AmountExtractor;

impl AmountExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AmountExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for AmountExtractor {
    type Output = ExtractionMatch<Amount>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results: Vec<Self::Output> = Vec::new();
        // A line-level currency hint disambiguates bare numbers.
        let line_hint = detect_currency(text);

        for caps in SYMBOL_AMOUNT.captures_iter(text) {
            let currency = symbol_to_code(&caps[1]).map(|c| c.to_string());
            let locale = currency.as_deref().map(locale_for).unwrap_or(NumberLocale::Unknown);
            if let Some(value) = parse_amount(&caps[2], locale) {
                results.push(ExtractionMatch::new(
                    Amount { value, currency },
                    "symbol",
                    &caps[0],
                ));
            }
        }

        for caps in CODE_BEFORE_AMOUNT.captures_iter(text) {
            let currency = caps[1].to_string();
            if let Some(value) = parse_amount(&caps[2], locale_for(&currency)) {
                if results.iter().any(|r| overlaps(&r.source, &caps[0])) {
                    continue;
                }
                results.push(ExtractionMatch::new(
                    Amount {
                        value,
                        currency: Some(currency),
                    },
                    "code-before",
                    &caps[0],
                ));
            }
        }

        for caps in CODE_AFTER_AMOUNT.captures_iter(text) {
            let currency = caps[2].to_string();
            if let Some(value) = parse_amount(&caps[1], locale_for(&currency)) {
                if results.iter().any(|r| overlaps(&r.source, &caps[0])) {
                    continue;
                }
                results.push(ExtractionMatch::new(
                    Amount {
                        value,
                        currency: Some(currency),
                    },
                    "code-after",
                    &caps[0],
                ));
            }
        }

        for caps in BARE_AMOUNT.captures_iter(text) {
            let raw = &caps[1];
            // Skip numbers already claimed by a currency-adjacent rule.
            if results.iter().any(|r| r.source.contains(raw)) {
                continue;
            }
            let locale = line_hint
                .as_deref()
                .map(locale_for)
                .unwrap_or(NumberLocale::Unknown);
            if let Some(value) = parse_amount(raw, locale) {
                results.push(ExtractionMatch::new(
                    Amount {
                        value,
                        currency: None,
                    },
                    "bare",
                    raw,
                ));
            }
        }

        results
    }
}

fn overlaps(existing_source: &str, candidate: &str) -> bool {
    existing_source.contains(candidate) || candidate.contains(existing_source)
}

/// First currency signal (symbol or code) in the text, as an ISO code.
pub fn detect_currency(text: &str) -> Option<String> {
    CURRENCY_SIGNAL.captures(text).and_then(|caps| {
        if let Some(symbol) = caps.get(1) {
            symbol_to_code(symbol.as_str()).map(|c| c.to_string())
        } else {
            caps.get(2).map(|code| code.as_str().to_string())
        }
    })
}

/// Parse a numeric token into a decimal, using the locale implied by the
/// currency signal to disambiguate thousands vs. decimal separators.
///
/// `"$1,234.56"` and `"€1.234,56"` both come out as `1234.56`.
pub fn parse_amount(raw: &str, locale: NumberLocale) -> Option<Decimal> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let last_dot = cleaned.rfind('.');
    let last_comma = cleaned.rfind(',');

    let decimal_sep = match (last_dot, last_comma) {
        (Some(_), Some(_)) => match locale {
            NumberLocale::Us => Some('.'),
            NumberLocale::Eu => Some(','),
            // No signal: the later separator is the decimal one.
            NumberLocale::Unknown => {
                if last_dot > last_comma {
                    Some('.')
                } else {
                    Some(',')
                }
            }
        },
        (Some(d), None) => {
            let frac = cleaned.len() - d - 1;
            match locale {
                // "1.234" under a comma-decimal locale is grouping.
                NumberLocale::Eu => (frac != 3).then_some('.'),
                _ => (frac <= 2).then_some('.'),
            }
        }
        (None, Some(c)) => {
            let frac = cleaned.len() - c - 1;
            match locale {
                // "1,234" under a dot-decimal locale is grouping.
                NumberLocale::Us => (frac != 3).then_some(','),
                _ => (frac <= 2).then_some(','),
            }
        }
        (None, None) => None,
    };

    let normalized = match decimal_sep {
        Some(sep) => {
            let split = cleaned.rfind(sep).unwrap_or(cleaned.len());
            let integer: String = cleaned[..split]
                .chars()
                .filter(|c| c.is_ascii_digit())
                .collect();
            let fraction: String = cleaned[split + sep.len_utf8()..]
                .chars()
                .filter(|c| c.is_ascii_digit())
                .collect();
            format!("{}.{}", if integer.is_empty() { "0" } else { &integer }, fraction)
        }
        None => cleaned.chars().filter(|c| c.is_ascii_digit()).collect(),
    };

    Decimal::from_str(&normalized).ok()
}

/// Total-line selector: an ordered keyword priority list, compiled once.
///
/// Keywords match at word boundaries so "subtotal" never satisfies a
/// "total" keyword.
pub struct TotalSelector {
    keywords: Vec<Regex>,
}

impl TotalSelector {
    pub fn new(total_keywords: &[String]) -> Self {
        let keywords = total_keywords
            .iter()
            .filter_map(|kw| Regex::new(&format!(r"(?i)\b{}\b", regex::escape(kw))).ok())
            .collect();
        Self { keywords }
    }

    /// Pick the invoice total from the text.
    ///
    /// Keyword-labeled lines beat bare numeric matches: the keywords are
    /// scanned in priority order, and the first keyword with an
    /// amount-bearing line wins (first such line in text order). Only when
    /// no keyword line exists anywhere does the largest detected amount
    /// stand in for the total.
    pub fn select(&self, text: &str) -> Option<Amount> {
        let extractor = AmountExtractor::new();

        for keyword_re in &self.keywords {
            for line in text.lines() {
                if !keyword_re.is_match(line) {
                    continue;
                }
                if let Some(found) = extractor.extract(line) {
                    return Some(found.value);
                }
            }
        }

        // No keyword hit: fall back to the largest amount in the document.
        extractor
            .extract_all(text)
            .into_iter()
            .max_by(|a, b| a.value.value.cmp(&b.value.value))
            .map(|m| m.value)
    }
}

/// Convenience wrapper around [`TotalSelector`] for one-off extraction.
pub fn extract_total(text: &str, total_keywords: &[String]) -> Option<Amount> {
    TotalSelector::new(total_keywords).select(text)
}
