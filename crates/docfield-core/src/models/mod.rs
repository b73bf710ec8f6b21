//! Data models.

pub mod config;
pub mod document;
pub mod record;

pub use config::DocfieldConfig;
pub use document::{Document, ExtractedFields, ExtractedText, Provenance};
pub use record::{sanitize_file_name, DocumentRecord};
