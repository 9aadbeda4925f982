//! CLI command implementations.

pub mod batch;
pub mod config;
pub mod process;

use std::path::Path;
use std::sync::Arc;

use invex_core::categorize::HttpClassifier;
use invex_core::models::category::CategorySet;
use invex_core::models::config::PipelineConfig;
use invex_core::pipeline::InvoicePipeline;

/// Load the pipeline config from an explicit path or defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<PipelineConfig> {
    match config_path {
        Some(path) => Ok(PipelineConfig::from_file(Path::new(path))?),
        None => Ok(PipelineConfig::default()),
    }
}

/// Load the category set from a file or fall back to the built-in seed set.
pub fn load_categories(categories_path: Option<&Path>) -> anyhow::Result<Arc<CategorySet>> {
    let categories = match categories_path {
        Some(path) => CategorySet::from_file(path)?,
        None => CategorySet::default(),
    };
    Ok(Arc::new(categories))
}

/// Assemble the document pipeline from config, categories and model dir.
pub fn build_pipeline(
    config: PipelineConfig,
    categories: Arc<CategorySet>,
    model_dir: Option<&Path>,
) -> anyhow::Result<InvoicePipeline> {
    let classifier = config.categorize.endpoint.as_ref().map(|endpoint| {
        Arc::new(HttpClassifier::new(
            endpoint.clone(),
            config.categorize.api_key.clone(),
        )) as Arc<dyn invex_core::categorize::Classifier>
    });

    let recognizer = match model_dir {
        Some(dir) => Some(Arc::new(invex_core::ocr::PureOcrEngine::from_dir(dir)?)
            as Arc<dyn invex_core::ocr::TextRecognizer>),
        None => None,
    };

    Ok(InvoicePipeline::new(config, categories, classifier, recognizer))
}
