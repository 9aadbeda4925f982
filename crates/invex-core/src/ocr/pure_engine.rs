//! Recognition engine wrapper using `pure-onnx-ocr`.

use std::path::Path;
use std::sync::Mutex;

use image::DynamicImage;
use tracing::{debug, info};

use crate::error::OcrError;

use super::TextRecognizer;

/// OCR engine backed by `pure-onnx-ocr` (pure Rust, no external ONNX Runtime).
pub struct PureOcrEngine {
    engine: Mutex<pure_onnx_ocr::engine::OcrEngine>,
}

// `pure_onnx_ocr::engine::OcrEngine` holds `Arc<_>`s over `RefCell`-backed
// inference sessions, so it is neither `Send` nor `Sync` on its own. The engine
// is stored behind a `Mutex` and the handle never escapes `recognize`, so all
// access is serialized to a single thread at a time. That makes sharing this
// wrapper across threads sound, which the `TextRecognizer: Send + Sync` bound
// requires.
unsafe impl Send for PureOcrEngine {}
unsafe impl Sync for PureOcrEngine {}

impl PureOcrEngine {
    /// Create an engine from model files in a directory.
    ///
    /// Expects `det.onnx`, `latin_rec.onnx` and `latin_dict.txt` in the
    /// directory.
    pub fn from_dir(model_dir: &Path) -> Result<Self, OcrError> {
        let det_path = model_dir.join("det.onnx");
        let rec_path = model_dir.join("latin_rec.onnx");
        let dict_path = model_dir.join("latin_dict.txt");

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&det_path)
            .rec_model_path(&rec_path)
            .dictionary_path(&dict_path)
            .build()
            .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;

        info!("Loaded pure-onnx-ocr engine from {}", model_dir.display());

        Ok(Self {
            engine: Mutex::new(engine),
        })
    }
}

impl TextRecognizer for PureOcrEngine {
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError> {
        let results = self
            .engine
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .run_from_image(image)
            .map_err(|e| OcrError::Recognition(format!("pure-onnx-ocr: {}", e)))?;

        debug!("pure-onnx-ocr returned {} text regions", results.len());

        // Sort regions into reading order (top-to-bottom, left-to-right)
        // before joining, so downstream line-based rules see coherent lines.
        let mut regions: Vec<(f64, f64, String)> = results
            .iter()
            .map(|r| {
                let (x, y) = region_origin(&r.bounding_box);
                (y, x, r.text.replace("[UNK]", " "))
            })
            .collect();

        regions.sort_by(|a, b| {
            let row_a = (a.0 / 20.0) as i64;
            let row_b = (b.0 / 20.0) as i64;
            row_a
                .cmp(&row_b)
                .then_with(|| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        });

        Ok(regions
            .iter()
            .map(|(_, _, text)| text.as_str())
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

/// Top-left corner of a region polygon.
fn region_origin(polygon: &pure_onnx_ocr::Polygon<f64>) -> (f64, f64) {
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    for coord in polygon.exterior().coords() {
        min_x = min_x.min(coord.x);
        min_y = min_y.min(coord.y);
    }
    (min_x, min_y)
}
