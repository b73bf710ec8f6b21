//! Extract command - text and fields from a single document.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use docfield_core::{Document, DocumentProcessor};

use super::{format_output, load_config, ExtractionOutput, OutputFormat};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input document (DOCX, XLSX, PDF, text, ...)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Declared content type, used when the extension is not recognized
    #[arg(long)]
    content_type: Option<String>,

    /// Include the full extracted text in the output
    #[arg(long)]
    include_text: bool,
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;
    let processor = DocumentProcessor::from_config(&config)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let file_name = args
        .input
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!("Extracting {}...", file_name));

    let data = fs::read(&args.input)?;
    let mut document = Document::new(data, file_name.as_str());
    if let Some(content_type) = &args.content_type {
        document = document.content_type(content_type.as_str());
    }

    let processed = processor.process(&document);
    pb.finish_and_clear();
    let processed = processed?;

    let output = ExtractionOutput::new(&file_name, &processed, args.include_text);
    let rendered = format_output(&output, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &rendered)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", rendered.trim_end());
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}
