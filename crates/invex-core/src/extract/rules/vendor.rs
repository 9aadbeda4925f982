//! Vendor name heuristic: label rules first, then the first non-trivial
//! line near the top of the document.

use super::patterns::{ADDRESS_LINE, DUE_DATE_LABEL, ISSUE_DATE_LABEL, VENDOR_BOILERPLATE, VENDOR_LABEL};

/// Extract the vendor name from invoice text.
///
/// A miss is acceptable and yields an empty string, never an error.
pub fn extract_vendor(text: &str, scan_lines: usize) -> String {
    let lines = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .take(scan_lines);

    for line in lines {
        // Explicit labels win wherever they sit in the scanned window.
        if let Some(caps) = VENDOR_LABEL.captures(line) {
            let name = caps[1].trim();
            if !name.is_empty() {
                return name.to_string();
            }
        }

        if is_boilerplate(line) {
            continue;
        }

        // First substantial line is usually the letterhead.
        if line.len() > 3 && !line.starts_with(|c: char| c.is_ascii_digit()) {
            return line.to_string();
        }
    }

    String::new()
}

fn is_boilerplate(line: &str) -> bool {
    VENDOR_BOILERPLATE.is_match(line)
        || ADDRESS_LINE.is_match(line)
        || ISSUE_DATE_LABEL.is_match(line)
        || DUE_DATE_LABEL.is_match(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letterhead_first_line() {
        let text = "ACME Corporation\n123 Main Street\nInvoice #100\n";
        assert_eq!(extract_vendor(text, 10), "ACME Corporation");
    }

    #[test]
    fn test_header_boilerplate_skipped() {
        let text = "INVOICE\nTax Invoice #2231\nGlobex Industries\n42 Elm Road\n";
        assert_eq!(extract_vendor(text, 10), "Globex Industries");
    }

    #[test]
    fn test_label_wins_over_letterhead() {
        let text = "INVOICE\nBilled by: Initech LLC\nSomething else\n";
        assert_eq!(extract_vendor(text, 10), "Initech LLC");
    }

    #[test]
    fn test_miss_is_empty_not_error() {
        let text = "INVOICE\n123456\n";
        assert_eq!(extract_vendor(text, 10), "");
    }

    #[test]
    fn test_contact_lines_skipped() {
        let text = "Phone: 555-0100\nsales@acme.example\nACME Ltd\n";
        assert_eq!(extract_vendor(text, 10), "ACME Ltd");
    }
}
