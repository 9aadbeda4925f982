//! Spend categories and the validated category set.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{InvexError, Result};

/// A single spend category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    /// Unique category name.
    pub name: String,

    /// Optional human-readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Keywords used by the deterministic fallback matcher.
    #[serde(default)]
    pub keywords: Vec<String>,

    /// Whether this is the default category assigned when nothing matches.
    #[serde(default)]
    pub default: bool,
}

impl Category {
    pub fn new(name: impl Into<String>, keywords: &[&str]) -> Self {
        Self {
            name: name.into(),
            description: None,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            default: false,
        }
    }
}

/// The active category set for a run.
///
/// Validated on construction: names are unique and exactly one category is
/// flagged as the default. Treated as read-only by the pipeline (shared as
/// `Arc<CategorySet>`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "Vec<Category>", into = "Vec<Category>")]
pub struct CategorySet {
    categories: Vec<Category>,
    default_index: usize,
}

impl CategorySet {
    /// Build a validated set from a list of categories.
    pub fn new(categories: Vec<Category>) -> Result<Self> {
        if categories.is_empty() {
            return Err(InvexError::Config("category set is empty".to_string()));
        }

        let mut seen = HashSet::new();
        for category in &categories {
            if !seen.insert(category.name.to_lowercase()) {
                return Err(InvexError::Config(format!(
                    "duplicate category name: {}",
                    category.name
                )));
            }
        }

        let defaults: Vec<usize> = categories
            .iter()
            .enumerate()
            .filter(|(_, c)| c.default)
            .map(|(i, _)| i)
            .collect();

        let default_index = match defaults.as_slice() {
            [index] => *index,
            [] => {
                return Err(InvexError::Config(
                    "category set has no default category".to_string(),
                ));
            }
            _ => {
                return Err(InvexError::Config(
                    "category set has more than one default category".to_string(),
                ));
            }
        };

        Ok(Self {
            categories,
            default_index,
        })
    }

    /// Load a category set from a JSON file (an array of categories).
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let categories: Vec<Category> = serde_json::from_str(&content)
            .map_err(|e| InvexError::Config(format!("invalid category file: {}", e)))?;
        Self::new(categories)
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// The category assigned when nothing matches.
    pub fn default_category(&self) -> &Category {
        &self.categories[self.default_index]
    }

    /// All category names, in declaration order.
    pub fn names(&self) -> Vec<String> {
        self.categories.iter().map(|c| c.name.clone()).collect()
    }

    /// Look up a category by name, case-insensitively.
    pub fn get(&self, name: &str) -> Option<&Category> {
        self.categories
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Resolve a possibly off-list name to a known category.
    ///
    /// Exact (case-insensitive) match first, then containment either way,
    /// then the default category.
    pub fn resolve(&self, name: &str) -> &Category {
        if let Some(category) = self.get(name) {
            return category;
        }

        let lower = name.to_lowercase();
        self.categories
            .iter()
            .find(|c| {
                let cl = c.name.to_lowercase();
                cl.contains(&lower) || lower.contains(&cl)
            })
            .unwrap_or_else(|| self.default_category())
    }
}

impl TryFrom<Vec<Category>> for CategorySet {
    type Error = String;

    fn try_from(categories: Vec<Category>) -> std::result::Result<Self, String> {
        CategorySet::new(categories).map_err(|e| e.to_string())
    }
}

impl From<CategorySet> for Vec<Category> {
    fn from(set: CategorySet) -> Self {
        set.categories
    }
}

impl Default for CategorySet {
    /// The built-in seed set: sixteen spend categories with the keyword
    /// lists used by the deterministic fallback matcher.
    fn default() -> Self {
        let mut categories = vec![
            Category::new(
                "Office Supplies",
                &["staples", "office depot", "paper", "pens", "supplies", "stationery"],
            ),
            Category::new(
                "Travel",
                &["airline", "hotel", "uber", "lyft", "rental car", "airbnb", "expedia", "booking"],
            ),
            Category::new(
                "Software & Technology",
                &["software", "saas", "cloud", "hosting", "domain", "aws", "azure", "github", "adobe"],
            ),
            Category::new(
                "Professional Services",
                &["consulting", "legal", "accounting", "audit", "advisory"],
            ),
            Category::new(
                "Utilities",
                &["electric", "water", "gas", "utility", "power", "energy"],
            ),
            Category::new(
                "Marketing & Advertising",
                &["google ads", "facebook ads", "marketing", "advertising", "promotion"],
            ),
            Category::new(
                "Equipment & Hardware",
                &["computer", "laptop", "monitor", "printer", "equipment", "hardware"],
            ),
            Category::new("Rent & Facilities", &["rent", "lease", "facilities"]),
            Category::new("Insurance", &["insurance", "premium", "coverage"]),
            Category::new("Legal & Compliance", &["compliance", "attorney", "law firm"]),
            Category::new("Training & Education", &["training", "course", "workshop", "tuition"]),
            Category::new(
                "Meals & Entertainment",
                &["restaurant", "catering", "food", "meal", "dining"],
            ),
            Category::new(
                "Telecommunications",
                &["phone", "internet", "telecom", "verizon", "at&t", "comcast"],
            ),
            Category::new(
                "Shipping & Delivery",
                &["fedex", "ups", "usps", "dhl", "shipping", "freight"],
            ),
            Category::new(
                "Maintenance & Repairs",
                &["maintenance", "repair", "cleaning", "janitorial"],
            ),
        ];

        let mut other = Category::new("Other", &[]);
        other.default = true;
        categories.push(other);

        // The built-in set is known-valid.
        Self::new(categories).expect("built-in category set is valid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_set_is_valid() {
        let set = CategorySet::default();
        assert_eq!(set.categories().len(), 16);
        assert_eq!(set.default_category().name, "Other");
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut a = Category::new("Travel", &[]);
        a.default = true;
        let b = Category::new("travel", &[]);
        assert!(CategorySet::new(vec![a, b]).is_err());
    }

    #[test]
    fn test_exactly_one_default_required() {
        let a = Category::new("Travel", &[]);
        let b = Category::new("Other", &[]);
        assert!(CategorySet::new(vec![a.clone(), b.clone()]).is_err());

        let mut a2 = a.clone();
        a2.default = true;
        let mut b2 = b.clone();
        b2.default = true;
        assert!(CategorySet::new(vec![a2, b2]).is_err());
    }

    #[test]
    fn test_resolve_snaps_to_closest_name() {
        let set = CategorySet::default();
        assert_eq!(set.resolve("Software & Technology").name, "Software & Technology");
        assert_eq!(set.resolve("software").name, "Software & Technology");
        assert_eq!(set.resolve("completely unknown").name, "Other");
    }

    #[test]
    fn test_roundtrip_through_json() {
        let set = CategorySet::default();
        let json = serde_json::to_string(&set).unwrap();
        let back: CategorySet = serde_json::from_str(&json).unwrap();
        assert_eq!(back.names(), set.names());
        assert_eq!(back.default_category().name, "Other");
    }
}
