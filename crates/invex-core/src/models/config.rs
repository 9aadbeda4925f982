//! Configuration structures for the invoice pipeline.

use serde::{Deserialize, Serialize};

/// Main configuration for the invex pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// PDF processing configuration.
    pub pdf: PdfConfig,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Categorization configuration.
    pub categorize: CategorizeConfig,

    /// Batch orchestration configuration.
    pub batch: BatchConfig,
}

/// PDF processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// DPI used when rasterizing pages for the optical fallback.
    pub render_dpi: u32,

    /// Maximum pages to run through the optical fallback (0 = unlimited).
    pub max_pages: usize,

    /// Minimum trimmed character count for a text layer to be sufficient.
    pub min_text_chars: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            render_dpi: 300,
            max_pages: 10,
            min_text_chars: 50,
        }
    }
}

/// Field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Currency code assigned when no signal is detected.
    pub default_currency: String,

    /// Ordered keyword priority for picking the total amount line.
    /// Earlier entries win over later ones when several lines qualify.
    pub total_keywords: Vec<String>,

    /// How many leading lines the vendor heuristic scans.
    pub vendor_scan_lines: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            default_currency: "USD".to_string(),
            total_keywords: vec![
                "amount due".to_string(),
                "total due".to_string(),
                "grand total".to_string(),
                "balance due".to_string(),
                "total".to_string(),
            ],
            vendor_scan_lines: 10,
        }
    }
}

/// Categorization configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CategorizeConfig {
    /// Classification service endpoint. `None` disables the primary path
    /// and every document goes straight to the keyword fallback.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Bearer token for the classification service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Request timeout in seconds. The timeout is what guarantees the
    /// fallback path is always reached.
    pub request_timeout_secs: u64,

    /// How much raw text is sent to the classification service.
    pub text_excerpt_chars: usize,
}

impl Default for CategorizeConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            request_timeout_secs: 20,
            text_excerpt_chars: 2000,
        }
    }
}

/// Batch orchestration configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Number of concurrent pipeline workers.
    pub workers: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { workers: 4 }
    }
}

impl PipelineConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.pdf.min_text_chars, 50);
        assert_eq!(config.extraction.default_currency, "USD");
        assert_eq!(config.extraction.total_keywords[0], "amount due");
        assert_eq!(config.batch.workers, 4);
        assert!(config.categorize.endpoint.is_none());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"batch": {"workers": 8}}"#).unwrap();
        assert_eq!(config.batch.workers, 8);
        assert_eq!(config.pdf.render_dpi, 300);
    }
}
