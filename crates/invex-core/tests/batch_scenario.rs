//! End-to-end batch scenario: a clean text-layer invoice, a scanned invoice
//! that needs the optical fallback, and a corrupt file, driven through the
//! real pipeline with the classification service stubbed to fail.

use std::sync::Arc;

use image::DynamicImage;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Object, Stream};
use rust_decimal::Decimal;
use std::str::FromStr;
use tokio_util::sync::CancellationToken;

use invex_core::batch::{no_progress, BatchProcessor, StaticSource};
use invex_core::categorize::MockClassifier;
use invex_core::error::OcrError;
use invex_core::models::batch::BatchStatus;
use invex_core::models::category::CategorySet;
use invex_core::models::config::PipelineConfig;
use invex_core::models::document::{
    CategorySource, DocumentStatus, ErrorKind, ExtractionMethod,
};
use invex_core::ocr::TextRecognizer;
use invex_core::pipeline::InvoicePipeline;

/// Build a one-page PDF with a real text layer.
fn text_pdf(lines: &[&str]) -> Vec<u8> {
    let mut doc = lopdf::Document::with_version("1.5");

    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), 12.into()]),
        Operation::new("Td", vec![50.into(), 750.into()]),
    ];
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            operations.push(Operation::new("Td", vec![0.into(), (-16).into()]));
        }
        operations.push(Operation::new(
            "Tj",
            vec![Object::string_literal(*line)],
        ));
    }
    operations.push(Operation::new("ET", vec![]));

    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(
        dictionary! {},
        content.encode().unwrap(),
    ));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// Build a one-page PDF whose only content is an embedded raster image,
/// the shape of a scanned invoice.
fn scanned_pdf() -> Vec<u8> {
    let mut doc = lopdf::Document::with_version("1.5");

    let pages_id = doc.new_object_id();

    // 2x2 DeviceRGB raster
    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => 2,
            "Height" => 2,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
        },
        vec![255u8; 12],
    ));
    let resources_id = doc.add_object(dictionary! {
        "XObject" => dictionary! { "Im0" => image_id },
    });

    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new("Do", vec!["Im0".into()]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(
        dictionary! {},
        content.encode().unwrap(),
    ));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// Recognition stub standing in for the OCR engine on the scanned invoice.
struct ScannerStub;

impl TextRecognizer for ScannerStub {
    fn recognize(&self, _image: &DynamicImage) -> Result<String, OcrError> {
        Ok("ACME\nRechnung 2024/9\nGesamt: €1.234,56".to_string())
    }
}

#[tokio::test]
async fn test_three_document_scenario() {
    let clean_invoice = text_pdf(&[
        "Paper Supply Co",
        "Invoice #: A-100",
        "Invoice Date: 2024-01-05",
        "paper restock order",
        "Total: $100.00",
        "Please remit payment within 30 days of the invoice date above.",
    ]);
    let scanned_invoice = scanned_pdf();
    let corrupt = b"not a pdf at all".to_vec();

    let source = Arc::new(
        StaticSource::new("scenario")
            .push("clean.pdf", clean_invoice)
            .push("scanned.pdf", scanned_invoice)
            .push("corrupt.pdf", corrupt),
    );

    // Model path stubbed to fail: every document must fall back.
    let classifier = Arc::new(MockClassifier::failing("service down"));
    let pipeline = InvoicePipeline::new(
        PipelineConfig::default(),
        Arc::new(CategorySet::default()),
        Some(classifier.clone()),
        Some(Arc::new(ScannerStub)),
    );

    let processor = BatchProcessor::new(Arc::new(pipeline), 3);
    let batch = processor
        .run(
            "scenario-batch",
            source,
            no_progress(),
            CancellationToken::new(),
        )
        .await;

    assert_eq!(batch.status, BatchStatus::Completed);
    assert_eq!(batch.total, 3);
    assert_eq!(batch.processed, 2);
    assert_eq!(batch.failed, 1);

    let clean = batch
        .documents
        .iter()
        .find(|d| d.filename == "clean.pdf")
        .unwrap();
    assert_eq!(clean.status, DocumentStatus::Categorized);
    assert_eq!(clean.extraction_method, Some(ExtractionMethod::TextLayer));
    assert_eq!(clean.total_amount, Some(Decimal::from_str("100.00").unwrap()));
    assert_eq!(clean.currency, "USD");
    // Keyword fallback on "paper": categorized despite the dead model path.
    assert_eq!(clean.category.as_deref(), Some("Office Supplies"));
    assert_eq!(clean.category_source, Some(CategorySource::KeywordFallback));

    let scanned = batch
        .documents
        .iter()
        .find(|d| d.filename == "scanned.pdf")
        .unwrap();
    assert_eq!(scanned.status, DocumentStatus::Categorized);
    assert_eq!(
        scanned.extraction_method,
        Some(ExtractionMethod::OpticalFallback)
    );
    assert_eq!(scanned.vendor_name, "ACME");
    assert_eq!(
        scanned.total_amount,
        Some(Decimal::from_str("1234.56").unwrap())
    );
    assert_eq!(scanned.currency, "EUR");
    // No keyword matches either: observable default at zero confidence.
    assert_eq!(scanned.category.as_deref(), Some("Other"));
    assert_eq!(scanned.category_confidence, 0.0);

    let corrupt = batch
        .documents
        .iter()
        .find(|d| d.filename == "corrupt.pdf")
        .unwrap();
    assert_eq!(corrupt.status, DocumentStatus::Failed);
    assert_eq!(
        corrupt.error.as_ref().unwrap().kind,
        ErrorKind::ExtractionCorrupt
    );

    // The aggregate excludes the corrupt document. USD and EUR tie at one
    // document each; the tie resolves to the lexicographically first code.
    assert_eq!(batch.summary.currency, "EUR");
    assert_eq!(
        batch.summary.total_amount,
        Decimal::from_str("1234.56").unwrap()
    );
    assert_eq!(
        batch.summary.date_range_start,
        chrono::NaiveDate::from_ymd_opt(2024, 1, 5)
    );

    // The dead classifier was actually consulted for both extracted docs.
    assert_eq!(classifier.call_count(), 2);
}
