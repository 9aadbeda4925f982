//! Common regex patterns for invoice field extraction.

use lazy_static::lazy_static;
use regex::Regex;

/// Numeric token with optional thousands grouping and decimals, covering
/// both `1,234.56` and `1.234,56` conventions (and space grouping).
pub const NUM: &str = r"(?:\d{1,3}(?:[.,\u{00a0} ]\d{3})+|\d+)(?:[.,]\d{1,2})?";

lazy_static! {
    // Date patterns
    pub static ref DATE_ISO: Regex = Regex::new(
        r"\b(\d{4})[-/](\d{1,2})[-/](\d{1,2})\b"
    ).unwrap();

    pub static ref DATE_NUMERIC: Regex = Regex::new(
        r"\b(\d{1,2})[/\-.](\d{1,2})[/\-.](\d{4}|\d{2})\b"
    ).unwrap();

    pub static ref DATE_MONTH_FIRST: Regex = Regex::new(
        r"(?i)\b(january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sept?|oct|nov|dec)\.?\s+(\d{1,2})(?:st|nd|rd|th)?\s*,?\s+(\d{4})\b"
    ).unwrap();

    pub static ref DATE_DAY_FIRST: Regex = Regex::new(
        r"(?i)\b(\d{1,2})(?:st|nd|rd|th)?\s+(january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sept?|oct|nov|dec)\.?,?\s+(\d{4})\b"
    ).unwrap();

    // Labeled dates
    pub static ref ISSUE_DATE_LABEL: Regex = Regex::new(
        r"(?i)(?:invoice\s+date|date\s+of\s+issue|issue\s+date|issued(?:\s+on)?|\bdate\b)\s*:?\s*(.+)"
    ).unwrap();

    pub static ref DUE_DATE_LABEL: Regex = Regex::new(
        r"(?i)(?:due\s+date|payment\s+due|due\s+by|date\s+due|payable\s+by)\s*:?\s*(.+)"
    ).unwrap();

    // Amount patterns: currency signal adjacent to a numeric token
    pub static ref SYMBOL_AMOUNT: Regex = Regex::new(
        &format!(r"([$€£])\s*({})", NUM)
    ).unwrap();

    pub static ref CODE_BEFORE_AMOUNT: Regex = Regex::new(
        &format!(r"\b(USD|EUR|GBP|PLN|CHF)\b\s*:?\s*({})", NUM)
    ).unwrap();

    pub static ref CODE_AFTER_AMOUNT: Regex = Regex::new(
        &format!(r"({})\s*\b(USD|EUR|GBP|PLN|CHF)\b", NUM)
    ).unwrap();

    /// Bare amount: decimals required so years and quantities don't match.
    pub static ref BARE_AMOUNT: Regex = Regex::new(
        r"((?:\d{1,3}(?:[.,\u{00a0} ]\d{3})+|\d+)[.,]\d{2})\b"
    ).unwrap();

    /// Any currency signal on a line (used as a locale hint for bare amounts).
    pub static ref CURRENCY_SIGNAL: Regex = Regex::new(
        r"([$€£])|\b(USD|EUR|GBP|PLN|CHF)\b"
    ).unwrap();

    // Invoice number patterns (ordered; first capture wins)
    pub static ref INVOICE_NO_LABELED: Regex = Regex::new(
        r"(?i)invoice\s*(?:number|no\.?|#)\s*:?\s*([A-Z0-9][A-Z0-9/\-_]*)"
    ).unwrap();

    pub static ref INVOICE_NO_SHORT: Regex = Regex::new(
        r"(?i)\binv\.?\s*(?:no\.?|#)\s*:?\s*([A-Z0-9][A-Z0-9/\-_]*)"
    ).unwrap();

    pub static ref INVOICE_NO_BILL: Regex = Regex::new(
        r"(?i)\bbill\s*#\s*:?\s*([A-Z0-9][A-Z0-9/\-_]*)"
    ).unwrap();

    // Vendor patterns
    pub static ref VENDOR_LABEL: Regex = Regex::new(
        r"(?i)\b(?:from|vendor|billed\s+by|seller|sold\s+by)\s*:\s*(.+)"
    ).unwrap();

    /// Header boilerplate that never names the vendor.
    pub static ref VENDOR_BOILERPLATE: Regex = Regex::new(
        r"(?i)^\s*(?:tax\s+invoice|invoice|bill(?:ing)?|receipt|statement|estimate|quote|purchase\s+order)\b"
    ).unwrap();

    /// Address/contact lines skipped by the vendor heuristic.
    pub static ref ADDRESS_LINE: Regex = Regex::new(
        r"(?i)\b(?:street|avenue|ave|suite|ste|p\.?o\.?\s*box|road|blvd|floor|phone|tel|fax|email)\b|www\.|https?://|@"
    ).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_num_token_shapes() {
        let re = Regex::new(&format!(r"^({})$", NUM)).unwrap();
        for s in ["1,234.56", "1.234,56", "100.00", "1234.56", "12 345 678,90", "100", "7"] {
            assert!(re.is_match(s), "should match: {}", s);
        }
    }

    #[test]
    fn test_symbol_amount_captures() {
        let caps = SYMBOL_AMOUNT.captures("Total: $1,234.56").unwrap();
        assert_eq!(&caps[1], "$");
        assert_eq!(&caps[2], "1,234.56");

        let caps = SYMBOL_AMOUNT.captures("€1.234,56").unwrap();
        assert_eq!(&caps[1], "€");
        assert_eq!(&caps[2], "1.234,56");
    }

    #[test]
    fn test_bare_amount_requires_decimals() {
        assert!(BARE_AMOUNT.is_match("123.45"));
        assert!(!BARE_AMOUNT.is_match("in the year 2024 we"));
    }

    #[test]
    fn test_invoice_number_labels() {
        let caps = INVOICE_NO_LABELED.captures("Invoice #: INV-2024-001").unwrap();
        assert_eq!(&caps[1], "INV-2024-001");

        let caps = INVOICE_NO_LABELED.captures("Invoice Number A-17/2024").unwrap();
        assert_eq!(&caps[1], "A-17/2024");

        let caps = INVOICE_NO_SHORT.captures("Inv No. 4471").unwrap();
        assert_eq!(&caps[1], "4471");
    }
}
