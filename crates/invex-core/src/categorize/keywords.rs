//! Deterministic keyword fallback for categorization.

use crate::models::category::CategorySet;

/// A keyword-scored category hit.
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordMatch {
    pub category: String,
    pub score: usize,
    pub confidence: f64,
}

/// Score every category by keyword occurrences in vendor name + raw text and
/// return the best hit, or `None` when nothing matched at all.
///
/// Confidence grows with the hit count but is capped well below the model
/// path, so keyword assignments always read as lower-trust downstream.
pub fn match_keywords(
    categories: &CategorySet,
    vendor: &str,
    raw_text: &str,
) -> Option<KeywordMatch> {
    let haystack = format!("{} {}", vendor, raw_text).to_lowercase();

    let mut best: Option<(usize, &str)> = None;
    for category in categories.categories() {
        let score = category
            .keywords
            .iter()
            .filter(|keyword| haystack.contains(&keyword.to_lowercase()))
            .count();
        if score > 0 && best.map(|(s, _)| score > s).unwrap_or(true) {
            best = Some((score, &category.name));
        }
    }

    best.map(|(score, name)| KeywordMatch {
        category: name.to_string(),
        score,
        confidence: keyword_confidence(score),
    })
}

/// Confidence curve for keyword matches: 0.5 for a single hit, capped at 0.7.
fn keyword_confidence(score: usize) -> f64 {
    (0.4 + score as f64 * 0.1).min(0.7)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_keyword_hit() {
        let categories = CategorySet::default();
        let found = match_keywords(&categories, "", "Thank you for buying paper from us").unwrap();
        assert_eq!(found.category, "Office Supplies");
        assert_eq!(found.score, 1);
        assert!((found.confidence - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_vendor_name_participates() {
        let categories = CategorySet::default();
        let found = match_keywords(&categories, "Uber Technologies", "trip receipt").unwrap();
        assert_eq!(found.category, "Travel");
    }

    #[test]
    fn test_highest_score_wins() {
        let categories = CategorySet::default();
        let text = "cloud hosting for your domain, software subscription, plus one paper ream";
        let found = match_keywords(&categories, "", text).unwrap();
        assert_eq!(found.category, "Software & Technology");
        assert!(found.score >= 3);
    }

    #[test]
    fn test_confidence_is_capped() {
        let categories = CategorySet::default();
        let text = "software saas cloud hosting domain aws azure github adobe";
        let found = match_keywords(&categories, "", text).unwrap();
        assert!((found.confidence - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_no_match_is_none() {
        let categories = CategorySet::default();
        assert!(match_keywords(&categories, "", "zzz qqq xxx").is_none());
    }
}
