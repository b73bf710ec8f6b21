//! Subcommands and the output formatting they share.

pub mod batch;
pub mod config;
pub mod extract;

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use docfield_core::models::config::DocfieldConfig;
use docfield_core::pipeline::ProcessedDocument;
use docfield_core::ExtractedFields;

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("docfield")
        .join("config.json")
}

/// Configuration file to use: the explicit path, or the default location.
pub fn config_path(explicit: Option<&str>) -> PathBuf {
    explicit.map(PathBuf::from).unwrap_or_else(default_config_path)
}

/// Load the configuration, falling back to defaults when no file exists.
///
/// An explicitly given path must exist.
pub fn load_config(explicit: Option<&str>) -> anyhow::Result<DocfieldConfig> {
    if let Some(path) = explicit {
        return DocfieldConfig::from_file(Path::new(path))
            .map_err(|e| anyhow::anyhow!("Failed to load config {}: {}", path, e));
    }

    let path = default_config_path();
    if path.exists() {
        debug!("Loading config from {}", path.display());
        Ok(DocfieldConfig::from_file(&path)?)
    } else {
        Ok(DocfieldConfig::default())
    }
}

/// What the CLI reports for one processed document.
#[derive(Debug, Serialize)]
pub struct ExtractionOutput {
    pub file_name: String,
    pub strategy: String,
    #[serde(flatten)]
    pub fields: ExtractedFields,
    pub processing_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl ExtractionOutput {
    pub fn new(file_name: &str, processed: &ProcessedDocument, include_text: bool) -> Self {
        Self {
            file_name: file_name.to_string(),
            strategy: processed.strategy().to_string(),
            fields: processed.fields.clone(),
            processing_time_ms: processed.processing_time_ms,
            text: include_text.then(|| processed.text.as_str().to_string()),
        }
    }
}

pub fn format_output(output: &ExtractionOutput, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(output)?),
        OutputFormat::Csv => format_csv(output),
        OutputFormat::Text => Ok(format_text(output)),
    }
}

fn format_csv(output: &ExtractionOutput) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header = vec![
        "file_name",
        "strategy",
        "tax_id",
        "party_name",
        "address",
        "credit_risk",
        "processing_time_ms",
    ];
    if output.text.is_some() {
        header.push("text");
    }
    wtr.write_record(&header)?;

    let fields = &output.fields;
    let mut row = vec![
        output.file_name.clone(),
        output.strategy.clone(),
        fields.tax_id.clone().unwrap_or_default(),
        fields.party_name.clone().unwrap_or_default(),
        fields.address.clone().unwrap_or_default(),
        fields.credit_risk.clone().unwrap_or_default(),
        output.processing_time_ms.to_string(),
    ];
    if let Some(text) = &output.text {
        row.push(text.clone());
    }
    wtr.write_record(&row)?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(output: &ExtractionOutput) -> String {
    let fields = &output.fields;
    let or_dash = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());

    let mut text = String::new();
    text.push_str(&format!("File: {}\n", output.file_name));
    text.push_str(&format!("Strategy: {}\n", output.strategy));
    text.push('\n');

    text.push_str(&format!("Tax ID:      {}\n", or_dash(&fields.tax_id)));
    text.push_str(&format!("Party name:  {}", or_dash(&fields.party_name)));
    if fields.party_name_source == Some(docfield_core::Provenance::Fallback) {
        text.push_str(" (guessed)");
    }
    text.push('\n');
    text.push_str(&format!("Address:     {}\n", or_dash(&fields.address)));
    text.push_str(&format!("Credit risk: {}\n", or_dash(&fields.credit_risk)));

    if let Some(body) = &output.text {
        text.push_str("\n--- text ---\n");
        text.push_str(body);
        if !body.ends_with('\n') {
            text.push('\n');
        }
    }

    text
}
