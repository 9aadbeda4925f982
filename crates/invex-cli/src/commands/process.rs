//! Process command - run a single invoice through the pipeline.

use std::fs;
use std::path::PathBuf;

use clap::{Args, ValueEnum};
use console::style;

use invex_core::models::document::{Document, DocumentStatus};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input PDF file
    input: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Write output to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Category configuration file (JSON array of categories)
    #[arg(long)]
    categories: Option<PathBuf>,

    /// OCR model directory (enables the optical fallback)
    #[arg(short, long)]
    model_dir: Option<PathBuf>,
}

/// Output format for processed invoices.
#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;
    let categories = super::load_categories(args.categories.as_deref())?;
    let pipeline = super::build_pipeline(config, categories, args.model_dir.as_deref())?;

    let data = fs::read(&args.input)?;
    let filename = args
        .input
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("invoice.pdf")
        .to_string();

    let document = Document::new(args.input.display().to_string(), filename);
    let document = pipeline.process_document(document, data).await;

    let content = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&document)?,
        OutputFormat::Text => format_document_text(&document),
    };

    match args.output {
        Some(path) => {
            fs::write(&path, content)?;
            println!("{} Wrote output to {}", style("✓").green(), path.display());
        }
        None => println!("{}", content),
    }

    if document.status == DocumentStatus::Failed {
        let message = document
            .error
            .as_ref()
            .map(|e| e.message.clone())
            .unwrap_or_default();
        anyhow::bail!("processing failed: {}", message);
    }

    Ok(())
}

fn format_document_text(document: &Document) -> String {
    let mut output = String::new();

    output.push_str(&format!("File: {}\n", document.filename));
    output.push_str(&format!("Status: {:?}\n", document.status));

    if let Some(error) = &document.error {
        output.push_str(&format!("Error: {}\n", error.message));
        return output;
    }

    output.push('\n');
    output.push_str(&format!("Vendor: {}\n", document.vendor_name));
    if let Some(number) = &document.invoice_number {
        output.push_str(&format!("Invoice number: {}\n", number));
    }
    if let Some(date) = document.invoice_date {
        output.push_str(&format!("Invoice date: {}\n", date));
    }
    if let Some(due) = document.due_date {
        output.push_str(&format!("Due date: {}\n", due));
    }
    if let Some(amount) = document.total_amount {
        output.push_str(&format!("Total: {} {}\n", amount, document.currency));
    }

    if let Some(category) = &document.category {
        output.push_str(&format!(
            "\nCategory: {} ({:.0}% confidence)\n",
            category,
            document.category_confidence * 100.0
        ));
    }

    output
}
