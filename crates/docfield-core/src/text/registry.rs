//! Strategy lookup by file extension and content type.

use std::collections::HashMap;
use std::sync::Arc;

use super::{GenericSniffStrategy, SpreadsheetStrategy, TextStrategy, WordProcessingStrategy};
use crate::models::config::TextConfig;
use crate::models::document::Document;

pub const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Maps extensions and MIME types to strategies.
///
/// Lookup order is extension, then declared content type, then the fallback.
pub struct StrategyRegistry {
    by_extension: HashMap<String, Arc<dyn TextStrategy>>,
    by_mime: HashMap<String, Arc<dyn TextStrategy>>,
    fallback: Arc<dyn TextStrategy>,
}

impl StrategyRegistry {
    /// Empty registry sending everything to `fallback`.
    pub fn new(fallback: Arc<dyn TextStrategy>) -> Self {
        Self {
            by_extension: HashMap::new(),
            by_mime: HashMap::new(),
            fallback,
        }
    }

    /// Registry with the word-processing and spreadsheet strategies and a
    /// sniffing fallback.
    pub fn with_defaults(config: &TextConfig) -> Self {
        let mut registry = Self::new(Arc::new(GenericSniffStrategy::new(config)));

        registry.register(&["docx", DOCX_MIME], Arc::new(WordProcessingStrategy::new()));
        registry.register(
            &["xlsx", "xlsm", XLSX_MIME],
            Arc::new(SpreadsheetStrategy::new(config.spreadsheet.clone())),
        );

        registry
    }

    /// Register a strategy under extensions (`"docx"`) and MIME types
    /// (anything containing `/`). Later registrations replace earlier ones.
    pub fn register(&mut self, identifiers: &[&str], strategy: Arc<dyn TextStrategy>) {
        for id in identifiers {
            let key = id.trim().trim_start_matches('.').to_ascii_lowercase();
            if key.contains('/') {
                self.by_mime.insert(key, Arc::clone(&strategy));
            } else {
                self.by_extension.insert(key, Arc::clone(&strategy));
            }
        }
    }

    /// Replace the fallback strategy.
    pub fn set_fallback(&mut self, strategy: Arc<dyn TextStrategy>) {
        self.fallback = strategy;
    }

    pub fn resolve(&self, document: &Document) -> &dyn TextStrategy {
        let strategy = document
            .extension()
            .and_then(|ext| self.by_extension.get(&ext))
            .or_else(|| document.mime_type().and_then(|mime| self.by_mime.get(&mime)))
            .unwrap_or(&self.fallback);
        &**strategy
    }

    pub fn extensions(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.by_extension.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::with_defaults(&TextConfig::default())
    }
}
