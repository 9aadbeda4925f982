//! Date extraction: ordered format cascade with labeled-date preference.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::{Captures, Regex};

use super::patterns::{
    DATE_DAY_FIRST, DATE_ISO, DATE_MONTH_FIRST, DATE_NUMERIC, DUE_DATE_LABEL, ISSUE_DATE_LABEL,
};
use super::{ExtractionMatch, FieldExtractor};

/// One entry of the date cascade: a pattern plus its interpretation.
///
/// Rules are tried in declaration order; the first calendar-valid hit wins,
/// regardless of where later-rule matches sit in the text.
pub struct DateRule {
    pub name: &'static str,
    pub pattern: &'static Regex,
    pub parse: fn(&Captures) -> Option<NaiveDate>,
}

lazy_static! {
    /// The cascade, in priority order: unambiguous formats before ambiguous
    /// ones, month-first (US) numeric before day-first (EU).
    pub static ref DATE_RULES: Vec<DateRule> = vec![
        DateRule {
            name: "iso",
            pattern: &*DATE_ISO,
            parse: |caps| {
                let year: i32 = caps[1].parse().ok()?;
                let month: u32 = caps[2].parse().ok()?;
                let day: u32 = caps[3].parse().ok()?;
                NaiveDate::from_ymd_opt(year, month, day)
            },
        },
        DateRule {
            name: "month-name-first",
            pattern: &*DATE_MONTH_FIRST,
            parse: |caps| {
                let month = month_to_number(&caps[1])?;
                let day: u32 = caps[2].parse().ok()?;
                let year: i32 = caps[3].parse().ok()?;
                NaiveDate::from_ymd_opt(year, month, day)
            },
        },
        DateRule {
            name: "day-month-name",
            pattern: &*DATE_DAY_FIRST,
            parse: |caps| {
                let day: u32 = caps[1].parse().ok()?;
                let month = month_to_number(&caps[2])?;
                let year: i32 = caps[3].parse().ok()?;
                NaiveDate::from_ymd_opt(year, month, day)
            },
        },
        DateRule {
            name: "numeric-us",
            pattern: &*DATE_NUMERIC,
            parse: |caps| {
                let month: u32 = caps[1].parse().ok()?;
                let day: u32 = caps[2].parse().ok()?;
                let year = parse_year(&caps[3]);
                NaiveDate::from_ymd_opt(year, month, day)
            },
        },
        DateRule {
            name: "numeric-eu",
            pattern: &*DATE_NUMERIC,
            parse: |caps| {
                let day: u32 = caps[1].parse().ok()?;
                let month: u32 = caps[2].parse().ok()?;
                let year = parse_year(&caps[3]);
                NaiveDate::from_ymd_opt(year, month, day)
            },
        },
    ];
}

/// Date field extractor applying the cascade to arbitrary text.
pub struct DateExtractor;

impl DateExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DateExtractor {
    type Output = ExtractionMatch<NaiveDate>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        for rule in DATE_RULES.iter() {
            for caps in rule.pattern.captures_iter(text) {
                if let Some(date) = (rule.parse)(&caps) {
                    let source = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
                    return Some(ExtractionMatch::new(date, rule.name, source));
                }
            }
        }
        None
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results = Vec::new();
        for rule in DATE_RULES.iter() {
            for caps in rule.pattern.captures_iter(text) {
                if let Some(date) = (rule.parse)(&caps) {
                    if results.iter().any(|r: &Self::Output| r.value == date) {
                        continue;
                    }
                    let source = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
                    results.push(ExtractionMatch::new(date, rule.name, source));
                }
            }
        }
        results
    }
}

/// Labeled dates recovered from an invoice.
#[derive(Debug, Clone, Default)]
pub struct InvoiceDates {
    /// Issue date ("Invoice Date", "Date of Issue", bare "Date").
    pub issue_date: Option<ExtractionMatch<NaiveDate>>,
    /// Payment due date ("Due Date", "Payment Due").
    pub due_date: Option<ExtractionMatch<NaiveDate>>,
}

/// Extract issue and due dates from invoice text.
///
/// Labeled lines win: a line carrying a due label is never considered for
/// the issue date, and the unlabeled cascade also skips due-labeled lines,
/// so a well-formed due date cannot shadow the issue date, whatever their
/// order in the text.
pub fn extract_dates(text: &str) -> InvoiceDates {
    let mut result = InvoiceDates::default();
    let extractor = DateExtractor::new();

    for line in text.lines() {
        if let Some(caps) = DUE_DATE_LABEL.captures(line) {
            if result.due_date.is_none() {
                result.due_date = extractor.extract(&caps[1]);
            }
            continue;
        }
        if result.issue_date.is_none() {
            if let Some(caps) = ISSUE_DATE_LABEL.captures(line) {
                result.issue_date = extractor.extract(&caps[1]);
            }
        }
    }

    // No labeled issue date: run the cascade over the text minus due-labeled
    // lines.
    if result.issue_date.is_none() {
        let unlabeled: String = text
            .lines()
            .filter(|line| !DUE_DATE_LABEL.is_match(line))
            .collect::<Vec<_>>()
            .join("\n");
        result.issue_date = extractor.extract(&unlabeled);
    }

    result
}

fn parse_year(s: &str) -> i32 {
    let year: i32 = s.parse().unwrap_or(0);
    if year < 100 {
        // Two-digit year: assume 2000s for 00-50, 1900s for 51-99
        if year <= 50 { 2000 + year } else { 1900 + year }
    } else {
        year
    }
}

fn month_to_number(month: &str) -> Option<u32> {
    let month = month.to_lowercase();
    let number = match month.trim_end_matches('.') {
        "january" | "jan" => 1,
        "february" | "feb" => 2,
        "march" | "mar" => 3,
        "april" | "apr" => 4,
        "may" => 5,
        "june" | "jun" => 6,
        "july" | "jul" => 7,
        "august" | "aug" => 8,
        "september" | "sep" | "sept" => 9,
        "october" | "oct" => 10,
        "november" | "nov" => 11,
        "december" | "dec" => 12,
        _ => return None,
    };
    Some(number)
}
