//! Persisted record of a processed document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::document::ExtractedFields;

/// File name used when the uploader did not provide one.
pub const UNNAMED_FILE: &str = "unnamed-file";

/// Everything the persistence layer keeps about an uploaded document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Store-assigned identifier (0 until saved).
    pub id: u64,

    /// Original file name. Unique within a store.
    pub file_name: String,

    /// Extension or content type the document was declared with.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,

    /// Where the original bytes were uploaded, if anywhere.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_location: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub person_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_risk: Option<String>,

    /// Full extracted text.
    pub extracted_text: String,

    pub upload_date: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_date: Option<DateTime<Utc>>,
}

impl DocumentRecord {
    /// Build an unsaved record from extraction output.
    pub fn new(file_name: impl Into<String>, text: impl Into<String>, fields: ExtractedFields) -> Self {
        let file_name = file_name.into();
        let file_name = if file_name.trim().is_empty() {
            UNNAMED_FILE.to_string()
        } else {
            file_name
        };

        Self {
            id: 0,
            file_name,
            file_type: None,
            storage_location: None,
            person_name: fields.party_name,
            tax_id: fields.tax_id,
            address: fields.address,
            credit_risk: fields.credit_risk,
            extracted_text: text.into(),
            upload_date: Utc::now(),
            updated_date: None,
        }
    }

    pub fn with_file_type(mut self, file_type: impl Into<String>) -> Self {
        self.file_type = Some(file_type.into());
        self
    }

    pub fn with_storage_location(mut self, location: impl Into<String>) -> Self {
        self.storage_location = Some(location.into());
        self
    }
}

/// Make a file name safe for on-disk staging.
///
/// Every character outside `[A-Za-z0-9.-]` becomes `_`.
pub fn sanitize_file_name(name: &str) -> String {
    if name.is_empty() {
        return UNNAMED_FILE.to_string();
    }
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
