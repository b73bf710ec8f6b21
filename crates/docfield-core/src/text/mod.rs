//! Document text extraction.
//!
//! A [`TextExtractor`] resolves a [`TextStrategy`] for each document through a
//! [`StrategyRegistry`] (by extension, then by declared content type) and falls
//! back to content sniffing for everything else.

mod docx;
mod html;
mod odt;
mod pdf;
mod plain;
mod pptx;
mod registry;
mod sniff;
mod xlsx;

pub use docx::WordProcessingStrategy;
pub use html::HtmlStrategy;
pub use odt::OpenDocumentTextStrategy;
pub use pdf::PdfStrategy;
pub use plain::PlainTextStrategy;
pub use pptx::PresentationStrategy;
pub use registry::{StrategyRegistry, DOCX_MIME, XLSX_MIME};
pub use sniff::{sniff, ContentKind, GenericSniffStrategy};
pub use xlsx::SpreadsheetStrategy;

use tracing::{debug, error, info, trace};

use crate::error::ExtractionError;
use crate::models::config::TextConfig;
use crate::models::document::{Document, ExtractedText};

/// Result type for text extraction.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// A way of turning document bytes into text.
///
/// Implementations must not keep any handle on the input past the call.
pub trait TextStrategy: Send + Sync {
    /// Short name used in logs and in [`ExtractedText::strategy`].
    fn name(&self) -> &'static str;

    /// Extract text from non-empty document bytes.
    fn extract(&self, data: &[u8]) -> Result<String>;

    /// Extract text along with the name of the strategy that produced it.
    ///
    /// Strategies that hand the bytes on to another strategy report the one
    /// that ran.
    fn extract_named(&self, data: &[u8]) -> Result<(String, &'static str)> {
        Ok((self.extract(data)?, self.name()))
    }
}

/// Text extractor dispatching to registered strategies.
pub struct TextExtractor {
    registry: StrategyRegistry,
}

impl TextExtractor {
    /// Create an extractor with the default strategies.
    pub fn new(config: &TextConfig) -> Self {
        Self {
            registry: StrategyRegistry::with_defaults(config),
        }
    }

    /// Create an extractor over a custom registry.
    pub fn with_registry(registry: StrategyRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    /// Extract the text of a document.
    ///
    /// A zero-byte document yields empty text whatever its format.
    pub fn extract_text(&self, document: &Document) -> Result<ExtractedText> {
        let strategy = self.registry.resolve(document);

        info!(
            "Extracting text from '{}' ({} bytes)",
            document.display_name(),
            document.len()
        );
        debug!("Using {} strategy", strategy.name());

        if document.is_empty() {
            debug!("Document is empty, returning empty text");
            return Ok(ExtractedText::new(String::new(), strategy.name()));
        }

        match strategy.extract_named(document.data()) {
            Ok((text, produced_by)) => {
                if produced_by != strategy.name() {
                    debug!("{} strategy delegated to {}", strategy.name(), produced_by);
                }
                info!(
                    "Text successfully extracted from '{}' ({} chars)",
                    document.display_name(),
                    text.chars().count()
                );
                trace!(
                    "Extracted content (first 100 chars): {}",
                    text.chars().take(100).collect::<String>()
                );
                Ok(ExtractedText::new(text, produced_by))
            }
            Err(e) => {
                error!("Error extracting text from '{}': {}", document.display_name(), e);
                Err(e)
            }
        }
    }
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self::new(&TextConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{docx_bytes, xlsx_bytes};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_docx_paragraphs_joined_by_newline() {
        let data = docx_bytes(&["First", "", "Third"]);
        let text = TextExtractor::default()
            .extract_text(&Document::new(data, "contract.DOCX"))
            .unwrap();

        assert_eq!(text.as_str(), "First\n\nThird");
        assert_eq!(text.strategy(), "word-processing");
    }

    #[test]
    fn test_xlsx_rows_flattened_across_sheets() {
        let data = xlsx_bytes(&[
            ("Clients", vec![vec!["Name", "Acme"], vec!["Score", "750"]]),
            ("Notes", vec![vec!["Risk: low"]]),
        ]);
        let text = TextExtractor::default()
            .extract_text(&Document::new(data, "book.xlsx"))
            .unwrap();

        assert_eq!(text.as_str(), "Name | Acme | \nScore | 750 | \nRisk: low | \n");
        assert_eq!(text.strategy(), "spreadsheet");
    }

    #[test]
    fn test_content_type_dispatch() {
        let data = docx_bytes(&["Declared by MIME"]);
        let doc = Document::with_content_type(data, format!("{}; charset=binary", DOCX_MIME));
        let text = TextExtractor::default().extract_text(&doc).unwrap();

        assert_eq!(text.as_str(), "Declared by MIME");
    }

    #[test]
    fn test_empty_document_is_empty_text() {
        let extractor = TextExtractor::default();
        for name in ["empty.docx", "empty.xlsx", "empty.pdf", "empty.bin"] {
            let text = extractor.extract_text(&Document::new(Vec::new(), name)).unwrap();
            assert!(text.is_empty(), "{} should give empty text", name);
        }
    }

    #[test]
    fn test_unknown_binary_is_unsupported() {
        let data: Vec<u8> = (0u8..=255).cycle().take(2048).collect();
        let err = TextExtractor::default()
            .extract_text(&Document::new(data, "blob.dat"))
            .unwrap_err();

        assert!(err.is_unsupported());
    }

    #[test]
    fn test_broken_docx_is_corrupt() {
        let err = TextExtractor::default()
            .extract_text(&Document::new(b"PK\x03\x04 definitely not a zip".to_vec(), "x.docx"))
            .unwrap_err();

        assert!(matches!(err, ExtractionError::CorruptDocument { .. }));
    }

    #[test]
    fn test_misnamed_docx_is_sniffed() {
        let data = docx_bytes(&["Name: Sniffed Ltd"]);
        let text = TextExtractor::default()
            .extract_text(&Document::new(data, "upload.bin"))
            .unwrap();

        assert_eq!(text.as_str(), "Name: Sniffed Ltd");
        assert_eq!(text.strategy(), "word-processing");
    }

    #[test]
    fn test_plain_text_fallback() {
        let doc = Document::new(b"Name: Acme\r\nScore: 700\r\n".to_vec(), "notes.txt");
        let text = TextExtractor::default().extract_text(&doc).unwrap();

        assert_eq!(text.as_str(), "Name: Acme\nScore: 700\n");
        assert_eq!(text.strategy(), "plain-text");
    }

    #[test]
    fn test_sniffed_html_reports_html_strategy() {
        let doc = Document::new(b"<html><body><p>Name: Web Co</p></body></html>".to_vec(), "page");
        let text = TextExtractor::default().extract_text(&doc).unwrap();

        assert_eq!(text.as_str(), "Name: Web Co");
        assert_eq!(text.strategy(), "html");
    }

    #[test]
    fn test_empty_document_keeps_resolved_strategy_name() {
        let text = TextExtractor::default()
            .extract_text(&Document::new(Vec::new(), "empty.bin"))
            .unwrap();

        assert_eq!(text.strategy(), "generic");
    }
}
