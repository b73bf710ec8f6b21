//! Document input and extraction output types.

use serde::{Deserialize, Serialize};

/// An uploaded document: raw bytes plus whatever the uploader told us about it.
///
/// Either hint may be absent. Extraction only reads the bytes.
#[derive(Debug, Clone, Default)]
pub struct Document {
    data: Vec<u8>,
    file_name: Option<String>,
    content_type: Option<String>,
}

impl Document {
    /// Create a document from bytes and its original file name.
    pub fn new(data: impl Into<Vec<u8>>, file_name: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            file_name: Some(file_name.into()),
            content_type: None,
        }
    }

    /// Create a document known only by its declared content type.
    pub fn with_content_type(data: impl Into<Vec<u8>>, content_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            file_name: None,
            content_type: Some(content_type.into()),
        }
    }

    /// Attach a declared content type.
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn declared_content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Lowercased extension of the file name, without the dot.
    pub fn extension(&self) -> Option<String> {
        let name = self.file_name.as_deref()?;
        let (stem, ext) = name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }

    /// Lowercased MIME type with parameters (`; charset=...`) stripped.
    pub fn mime_type(&self) -> Option<String> {
        let raw = self.content_type.as_deref()?;
        let essence = raw.split(';').next().unwrap_or("").trim();
        if essence.is_empty() {
            None
        } else {
            Some(essence.to_ascii_lowercase())
        }
    }

    /// Size of the document in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Name used in logs: the file name, the content type, or a placeholder.
    pub fn display_name(&self) -> &str {
        self.file_name
            .as_deref()
            .or(self.content_type.as_deref())
            .unwrap_or("<unnamed>")
    }
}

/// Text produced by a single extraction call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedText {
    text: String,
    /// Name of the strategy that produced the text.
    strategy: String,
}

impl ExtractedText {
    pub(crate) fn new(text: String, strategy: &str) -> Self {
        Self {
            text,
            strategy: strategy.to_string(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn strategy(&self) -> &str {
        &self.strategy
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

impl AsRef<str> for ExtractedText {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

impl std::fmt::Display for ExtractedText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

/// How a field value was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// A configured pattern matched.
    Pattern,
    /// No pattern matched; the value is a last-resort guess.
    Fallback,
}

/// Structured fields derived from document text.
///
/// Every field is independent; any subset may be present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedFields {
    /// Business tax identifier (CNPJ-style).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,

    /// Party (person or company) name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub party_name: Option<String>,

    /// Where `party_name` came from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub party_name_source: Option<Provenance>,

    /// Postal address line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// Credit risk label or score.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_risk: Option<String>,
}

impl ExtractedFields {
    /// Number of fields that were found.
    pub fn found_count(&self) -> usize {
        [
            self.tax_id.is_some(),
            self.party_name.is_some(),
            self.address.is_some(),
            self.credit_risk.is_some(),
        ]
        .iter()
        .filter(|found| **found)
        .count()
    }

    pub fn is_empty(&self) -> bool {
        self.found_count() == 0
    }
}
