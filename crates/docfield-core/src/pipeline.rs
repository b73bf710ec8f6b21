//! Text extraction followed by field extraction.

use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::Result;
use crate::fields::FieldExtractor;
use crate::models::config::DocfieldConfig;
use crate::models::document::{Document, ExtractedFields, ExtractedText};
use crate::models::record::DocumentRecord;
use crate::text::TextExtractor;

/// Output of one document run through the pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedDocument {
    pub text: ExtractedText,
    pub fields: ExtractedFields,
    pub processing_time_ms: u64,
}

impl ProcessedDocument {
    pub fn strategy(&self) -> &str {
        self.text.strategy()
    }

    /// Assemble an unsaved record for `file_name`.
    pub fn into_record(self, file_name: impl Into<String>) -> DocumentRecord {
        DocumentRecord::new(file_name, self.text.into_string(), self.fields)
    }
}

/// Runs text extraction and then every field rule table over the result.
///
/// Holds no per-document state, so one processor can be shared across threads.
pub struct DocumentProcessor {
    text: TextExtractor,
    fields: FieldExtractor,
}

impl DocumentProcessor {
    pub fn new(text: TextExtractor, fields: FieldExtractor) -> Self {
        Self { text, fields }
    }

    /// Build a processor from configuration.
    ///
    /// Fails when a field pattern does not compile.
    pub fn from_config(config: &DocfieldConfig) -> Result<Self> {
        Ok(Self {
            text: TextExtractor::new(&config.text),
            fields: FieldExtractor::from_config(&config.fields)?,
        })
    }

    pub fn text_extractor(&self) -> &TextExtractor {
        &self.text
    }

    pub fn field_extractor(&self) -> &FieldExtractor {
        &self.fields
    }

    pub fn process(&self, document: &Document) -> Result<ProcessedDocument> {
        let start = Instant::now();

        let text = self.text.extract_text(document)?;
        let fields = self.fields.extract_all(text.as_str());

        let processing_time_ms = start.elapsed().as_millis() as u64;
        info!(
            "Processed '{}': {} of 4 fields found in {}ms",
            document.display_name(),
            fields.found_count(),
            processing_time_ms
        );
        debug!("Fields: {:?}", fields);

        Ok(ProcessedDocument {
            text,
            fields,
            processing_time_ms,
        })
    }
}

impl Default for DocumentProcessor {
    fn default() -> Self {
        Self {
            text: TextExtractor::default(),
            fields: crate::fields::patterns::DEFAULT_EXTRACTOR.clone(),
        }
    }
}
