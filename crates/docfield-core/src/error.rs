//! Error types for the docfield-core library.

use thiserror::Error;

/// Main error type for the docfield library.
#[derive(Error, Debug)]
pub enum DocfieldError {
    /// Text extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Record store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Why a document could not be turned into text.
///
/// Both kinds are terminal for a single extraction call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// No parser could handle the content or extension.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A parser recognized the format but the container is unreadable.
    #[error("corrupt {format} document: {reason}")]
    CorruptDocument { format: String, reason: String },
}

impl ExtractionError {
    pub(crate) fn corrupt(format: &str, reason: impl std::fmt::Display) -> Self {
        Self::CorruptDocument {
            format: format.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Check if this is an unsupported-format error.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::UnsupportedFormat(_))
    }
}

/// Errors raised by record stores.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A record with the same file name already exists.
    #[error("duplicate file name: {0}")]
    DuplicateFileName(String),

    /// The store lock was poisoned by a panicking writer.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for the docfield library.
pub type Result<T> = std::result::Result<T, DocfieldError>;
