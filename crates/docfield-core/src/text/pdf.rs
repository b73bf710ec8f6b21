//! PDF text extraction using lopdf and pdf-extract.

use std::borrow::Cow;
use std::panic::{self, AssertUnwindSafe};

use lopdf::Document as PdfDocument;
use tracing::{debug, warn};

use super::{Result, TextStrategy};
use crate::error::ExtractionError;
use crate::models::config::PdfConfig;

const FORMAT: &str = "pdf";

/// Text layer extraction for PDF documents.
///
/// Image-only pages produce no text; no OCR is attempted.
#[derive(Debug, Clone, Default)]
pub struct PdfStrategy {
    config: PdfConfig,
}

impl PdfStrategy {
    pub fn new(config: PdfConfig) -> Self {
        Self { config }
    }

    /// Parse the document and return bytes pdf-extract can read.
    ///
    /// Encrypted documents are decrypted with the empty password when allowed.
    fn prepare<'a>(&self, data: &'a [u8]) -> Result<Cow<'a, [u8]>> {
        let mut doc = PdfDocument::load_mem(data)
            .map_err(|e| ExtractionError::corrupt(FORMAT, format!("failed to parse: {}", e)))?;

        let raw = if doc.is_encrypted() {
            if !self.config.try_empty_password || doc.decrypt("").is_err() {
                return Err(ExtractionError::corrupt(FORMAT, "document is encrypted"));
            }
            debug!("Decrypted PDF with empty password");

            let mut decrypted = Vec::new();
            doc.save_to(&mut decrypted).map_err(|e| {
                ExtractionError::corrupt(FORMAT, format!("failed to save decrypted PDF: {}", e))
            })?;
            Cow::Owned(decrypted)
        } else {
            Cow::Borrowed(data)
        };

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(ExtractionError::corrupt(FORMAT, "document has no pages"));
        }

        debug!("Loaded PDF with {} pages", page_count);
        Ok(raw)
    }
}

impl TextStrategy for PdfStrategy {
    fn name(&self) -> &'static str {
        "pdf"
    }

    fn extract(&self, data: &[u8]) -> Result<String> {
        let raw = self.prepare(data)?;

        // pdf-extract panics on some malformed content streams
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(&raw)));

        match outcome {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => Err(ExtractionError::corrupt(
                FORMAT,
                format!("text extraction failed: {}", e),
            )),
            Err(_) => {
                warn!("PDF text extraction panicked");
                Err(ExtractionError::corrupt(FORMAT, "text extraction aborted"))
            }
        }
    }
}
