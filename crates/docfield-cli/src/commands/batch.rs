//! Batch processing command for multiple documents.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

use docfield_core::pipeline::ProcessedDocument;
use docfield_core::{Document, DocumentProcessor, MemoryStore, RecordStore};

use super::{format_output, load_config, ExtractionOutput, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of parallel workers
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,

    /// List processed documents whose party name contains this text
    #[arg(long)]
    search: Option<String>,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    file_name: String,
    processed: Option<ProcessedDocument>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;
    let processor = Arc::new(DocumentProcessor::from_config(&config)?);

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file())
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let semaphore = Arc::new(Semaphore::new(args.jobs.max(1)));
    let mut tasks = JoinSet::new();

    for (index, path) in files.into_iter().enumerate() {
        let permit = Arc::clone(&semaphore).acquire_owned().await?;
        let processor = Arc::clone(&processor);

        tasks.spawn_blocking(move || {
            let _permit = permit;
            let file_start = Instant::now();
            let outcome = process_single_file(&path, &processor);
            let processing_time_ms = file_start.elapsed().as_millis() as u64;
            (index, path, outcome, processing_time_ms)
        });
    }

    let mut indexed = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        let (index, path, outcome, processing_time_ms) = joined?;
        overall_pb.inc(1);

        let file_name = display_file_name(&path);
        let result = match outcome {
            Ok(processed) => ProcessResult {
                path,
                file_name,
                processed: Some(processed),
                error: None,
                processing_time_ms,
            },
            Err(e) => {
                let error_msg = e.to_string();
                if !args.continue_on_error {
                    error!("Failed to process {}: {}", path.display(), error_msg);
                    tasks.abort_all();
                    overall_pb.abandon();
                    anyhow::bail!("Processing failed for {}: {}", path.display(), error_msg);
                }
                warn!("Failed to process {}: {}", path.display(), error_msg);
                ProcessResult {
                    path,
                    file_name,
                    processed: None,
                    error: Some(error_msg),
                    processing_time_ms,
                }
            }
        };
        indexed.push((index, result));
    }

    overall_pb.finish_and_clear();

    indexed.sort_by_key(|(index, _)| *index);
    let mut results: Vec<ProcessResult> = indexed.into_iter().map(|(_, r)| r).collect();

    // Collect records; a duplicate file name counts as a failure of the later file
    let store = MemoryStore::new();
    for result in results.iter_mut() {
        let Some(processed) = &result.processed else {
            continue;
        };

        let mut record = processed.clone().into_record(result.file_name.as_str());
        if let Some(ext) = result.path.extension().and_then(|e| e.to_str()) {
            record = record.with_file_type(ext.to_lowercase());
        }
        record = record.with_storage_location(result.path.display().to_string());

        if let Err(e) = store.save(record) {
            if !args.continue_on_error {
                anyhow::bail!("Failed to store {}: {}", result.path.display(), e);
            }
            warn!("Failed to store {}: {}", result.path.display(), e);
            result.processed = None;
            result.error = Some(e.to_string());
        }
    }

    let successful: Vec<_> = results.iter().filter(|r| r.processed.is_some()).collect();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    if let Some(output_dir) = &args.output_dir {
        for result in &successful {
            let Some(processed) = &result.processed else {
                continue;
            };

            let output_name = result
                .path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("document");
            let output_path = output_dir.join(format!("{}.{}", output_name, args.format.extension()));

            let output = ExtractionOutput::new(&result.file_name, processed, false);
            fs::write(&output_path, format_output(&output, args.format)?)?;
            debug!("Wrote output to {}", output_path.display());
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(successful.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    if let Some(query) = &args.search {
        let matches = store.search_by_person_name(query)?;
        println!();
        println!(
            "{} {} documents match '{}'",
            style("ℹ").blue(),
            matches.len(),
            query
        );
        for record in &matches {
            println!(
                "  [{}] {}: {}",
                record.id,
                record.file_name,
                record.person_name.as_deref().unwrap_or("")
            );
        }
    }

    Ok(())
}

fn display_file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string()
}

fn process_single_file(path: &Path, processor: &DocumentProcessor) -> anyhow::Result<ProcessedDocument> {
    let data = fs::read(path)?;
    let document = Document::new(data, display_file_name(path));
    Ok(processor.process(&document)?)
}

fn write_summary(path: &Path, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "strategy",
        "tax_id",
        "party_name",
        "address",
        "credit_risk",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let time = result.processing_time_ms.to_string();

        if let Some(processed) = &result.processed {
            let fields = &processed.fields;
            wtr.write_record([
                result.file_name.as_str(),
                "success",
                processed.strategy(),
                fields.tax_id.as_deref().unwrap_or(""),
                fields.party_name.as_deref().unwrap_or(""),
                fields.address.as_deref().unwrap_or(""),
                fields.credit_risk.as_deref().unwrap_or(""),
                time.as_str(),
                "",
            ])?;
        } else {
            wtr.write_record([
                result.file_name.as_str(),
                "error",
                "",
                "",
                "",
                "",
                "",
                time.as_str(),
                result.error.as_deref().unwrap_or(""),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}
