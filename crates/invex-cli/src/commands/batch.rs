//! Batch command - drive a folder of invoices through the pipeline.

use std::fs;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use invex_core::batch::{BatchProcessor, DocumentRef, DocumentSource, ProgressEvent};
use invex_core::error::BatchError;
use invex_core::models::batch::Batch;
use invex_core::models::document::DocumentStatus;

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory for per-document JSON
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of parallel workers (overrides config)
    #[arg(short = 'j', long)]
    jobs: Option<usize>,

    /// Category configuration file (JSON array of categories)
    #[arg(long)]
    categories: Option<PathBuf>,

    /// OCR model directory (enables the optical fallback)
    #[arg(short, long)]
    model_dir: Option<PathBuf>,
}

/// Document source over a glob of local PDF files.
struct FileSource {
    pattern: String,
    files: Vec<PathBuf>,
}

impl FileSource {
    fn from_glob(pattern: &str) -> anyhow::Result<Self> {
        let files: Vec<PathBuf> = glob(pattern)?
            .filter_map(|r| r.ok())
            .filter(|p| {
                let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
                ext.eq_ignore_ascii_case("pdf")
            })
            .collect();

        Ok(Self {
            pattern: pattern.to_string(),
            files,
        })
    }
}

impl DocumentSource for FileSource {
    fn describe(&self) -> String {
        self.pattern.clone()
    }

    fn list<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<DocumentRef>, BatchError>> + Send + 'a>> {
        Box::pin(async move {
            Ok(self
                .files
                .iter()
                .map(|path| DocumentRef {
                    id: path.display().to_string(),
                    filename: path
                        .file_name()
                        .and_then(|s| s.to_str())
                        .unwrap_or("invoice.pdf")
                        .to_string(),
                })
                .collect())
        })
    }

    fn fetch<'a>(
        &'a self,
        doc: &'a DocumentRef,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<u8>, String>> + Send + 'a>> {
        Box::pin(async move { tokio::fs::read(&doc.id).await.map_err(|e| e.to_string()) })
    }
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = super::load_config(config_path)?;
    if let Some(jobs) = args.jobs {
        config.batch.workers = jobs;
    }
    let workers = config.batch.workers;

    let categories = super::load_categories(args.categories.as_deref())?;
    let pipeline = super::build_pipeline(config, categories, args.model_dir.as_deref())?;

    let source = Arc::new(FileSource::from_glob(&args.input)?);
    if source.files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        source.files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    // Progress bar driven by orchestrator events
    let bar = ProgressBar::new(source.files.len() as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
            .unwrap()
            .progress_chars("=>-"),
    );
    let bar_cb = bar.clone();
    let progress: invex_core::batch::ProgressCallback = Arc::new(move |event| {
        if let ProgressEvent::DocumentFinished { .. } = event {
            bar_cb.inc(1);
        }
    });

    // Ctrl-C stops scheduling new documents; in-flight ones finish.
    let cancel = CancellationToken::new();
    let cancel_on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel_on_signal.cancel();
        }
    });

    let processor = BatchProcessor::new(Arc::new(pipeline), workers);
    let batch = processor
        .run(source.describe(), source.clone(), progress, cancel)
        .await;

    bar.finish_with_message("Complete");

    if let Some(error) = &batch.error {
        anyhow::bail!("batch failed: {}", error);
    }

    // Write per-document outputs
    if let Some(ref output_dir) = args.output_dir {
        for document in &batch.documents {
            let stem = PathBuf::from(&document.filename)
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("invoice")
                .to_string();
            let output_path = output_dir.join(format!("{}.json", stem));
            fs::write(&output_path, serde_json::to_string_pretty(document)?)?;
            debug!("Wrote output to {}", output_path.display());
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &batch)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    // Print batch totals
    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        batch.total,
        start.elapsed()
    );
    println!(
        "   {} categorized, {} failed",
        style(batch.processed).green(),
        style(batch.failed).red()
    );
    if !batch.summary.currency.is_empty() {
        println!(
            "   Batch total: {} {}",
            batch.summary.total_amount, batch.summary.currency
        );
    }
    if let (Some(from), Some(to)) = (batch.summary.date_range_start, batch.summary.date_range_end) {
        println!("   Invoice dates: {} to {}", from, to);
    }

    let failed: Vec<_> = batch
        .documents
        .iter()
        .filter(|d| d.status == DocumentStatus::Failed)
        .collect();
    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for document in failed {
            println!(
                "  - {}: {}",
                document.filename,
                document
                    .error
                    .as_ref()
                    .map(|e| e.message.as_str())
                    .unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn write_summary(path: &PathBuf, batch: &Batch) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "vendor",
        "invoice_number",
        "invoice_date",
        "total_amount",
        "currency",
        "category",
        "confidence",
        "extraction_method",
        "error",
    ])?;

    for document in &batch.documents {
        let status = serde_json::to_value(document.status)?
            .as_str()
            .unwrap_or("unknown")
            .to_string();
        let method = document
            .extraction_method
            .map(|m| {
                serde_json::to_value(m)
                    .ok()
                    .and_then(|v| v.as_str().map(str::to_string))
                    .unwrap_or_default()
            })
            .unwrap_or_default();

        wtr.write_record([
            document.filename.as_str(),
            status.as_str(),
            document.vendor_name.as_str(),
            document.invoice_number.as_deref().unwrap_or(""),
            &document
                .invoice_date
                .map(|d| d.to_string())
                .unwrap_or_default(),
            &document
                .total_amount
                .map(|a| a.to_string())
                .unwrap_or_default(),
            document.currency.as_str(),
            document.category.as_deref().unwrap_or(""),
            &format!("{:.2}", document.category_confidence),
            method.as_str(),
            document
                .error
                .as_ref()
                .map(|e| e.message.as_str())
                .unwrap_or(""),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
