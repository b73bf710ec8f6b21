//! Core library for business document processing.
//!
//! This crate provides:
//! - Text extraction from DOCX, spreadsheets, PDFs and plain text, with
//!   content sniffing for unknown uploads
//! - Business field extraction (tax id, party name, address, credit risk)
//!   driven by configurable pattern tables
//! - Record assembly and a storage seam for processed documents

pub mod error;
pub mod fields;
pub mod models;
pub mod pipeline;
pub mod store;
pub mod text;

#[cfg(test)]
mod fixtures;

pub use error::{DocfieldError, ExtractionError, Result, StoreError};
pub use fields::{
    extract_address, extract_credit_risk, extract_fields, extract_name, extract_tax_id, Field,
    FieldExtractor,
};
pub use models::{sanitize_file_name, DocfieldConfig, Document, DocumentRecord, ExtractedFields, ExtractedText, Provenance};
pub use pipeline::{DocumentProcessor, ProcessedDocument};
pub use store::{MemoryStore, RecordStore};
pub use text::{TextExtractor, TextStrategy};
