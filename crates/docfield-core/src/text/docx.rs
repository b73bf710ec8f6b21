//! Word-processing (DOCX) text extraction.
//!
//! DOCX files are ZIP archives; the body lives in `word/document.xml`. Only
//! body-level paragraphs are read: tables, text boxes and drawings are skipped,
//! and headers/footers live in other parts that are never opened.

use std::io::{Cursor, Read, Seek};

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::debug;
use zip::ZipArchive;

use super::{Result, TextStrategy};
use crate::error::ExtractionError;

const FORMAT: &str = "docx";
const DOCUMENT_PART: &str = "word/document.xml";

/// Paragraph walk over a DOCX container.
#[derive(Debug, Clone, Default)]
pub struct WordProcessingStrategy;

impl WordProcessingStrategy {
    pub fn new() -> Self {
        Self
    }

    /// Paragraph texts in document order.
    pub fn paragraphs(&self, data: &[u8]) -> Result<Vec<String>> {
        let mut archive = ZipArchive::new(Cursor::new(data))
            .map_err(|e| ExtractionError::corrupt(FORMAT, format!("failed to open archive: {}", e)))?;

        let xml = read_part(&mut archive, FORMAT, DOCUMENT_PART)?;
        let paragraphs = parse_paragraphs(&xml)?;

        debug!("Read {} paragraphs from {}", paragraphs.len(), DOCUMENT_PART);
        Ok(paragraphs)
    }
}

impl TextStrategy for WordProcessingStrategy {
    fn name(&self) -> &'static str {
        "word-processing"
    }

    fn extract(&self, data: &[u8]) -> Result<String> {
        Ok(self.paragraphs(data)?.join("\n"))
    }
}

/// Read one XML part of an office container.
pub(super) fn read_part<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    format: &str,
    name: &str,
) -> Result<String> {
    let mut file = archive
        .by_name(name)
        .map_err(|e| ExtractionError::corrupt(format, format!("missing {}: {}", name, e)))?;

    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(|e| ExtractionError::corrupt(format, format!("failed to read {}: {}", name, e)))?;
    Ok(content)
}

/// Element whose descendants are not body paragraphs.
fn is_skipped_container(local_name: &[u8]) -> bool {
    matches!(
        local_name,
        b"tbl" | b"txbxContent" | b"drawing" | b"pict" | b"object" | b"AlternateContent"
    )
}

fn parse_paragraphs(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();

    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut skip_depth = 0usize;
    let mut in_paragraph = false;
    let mut in_run = false;
    let mut in_text = false;

    loop {
        let event = reader.read_event_into(&mut buf).map_err(|e| {
            ExtractionError::corrupt(
                FORMAT,
                format!("XML error at position {}: {}", reader.error_position(), e),
            )
        })?;

        match event {
            Event::Start(ref e) => {
                let name = e.local_name();
                let name = name.as_ref();
                if is_skipped_container(name) {
                    skip_depth += 1;
                } else if skip_depth == 0 {
                    match name {
                        b"p" => {
                            in_paragraph = true;
                            current.clear();
                        }
                        b"r" => in_run = true,
                        b"t" => in_text = true,
                        _ => {}
                    }
                }
            }
            Event::End(ref e) => {
                let name = e.local_name();
                let name = name.as_ref();
                if is_skipped_container(name) {
                    skip_depth = skip_depth.saturating_sub(1);
                } else if skip_depth == 0 {
                    match name {
                        b"p" if in_paragraph => {
                            paragraphs.push(std::mem::take(&mut current));
                            in_paragraph = false;
                        }
                        b"r" => in_run = false,
                        b"t" => in_text = false,
                        _ => {}
                    }
                }
            }
            Event::Empty(ref e) if skip_depth == 0 => match e.local_name().as_ref() {
                b"p" => paragraphs.push(String::new()),
                b"tab" if in_run => current.push('\t'),
                b"br" | b"cr" if in_run => current.push('\n'),
                _ => {}
            },
            Event::Text(ref e) if skip_depth == 0 && in_paragraph && in_text => {
                let text = e.unescape().map_err(|e| {
                    ExtractionError::corrupt(FORMAT, format!("bad text content: {}", e))
                })?;
                current.push_str(&text);
            }
            Event::CData(ref e) if skip_depth == 0 && in_paragraph && in_text => {
                current.push_str(&String::from_utf8_lossy(e));
            }
            Event::Eof => break,
            _ => {}
        }

        buf.clear();
    }

    Ok(paragraphs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{docx_bytes, docx_from_body, zip_bytes};
    use pretty_assertions::assert_eq;

    fn extract(data: &[u8]) -> Result<String> {
        WordProcessingStrategy::new().extract(data)
    }

    #[test]
    fn test_paragraph_order() {
        let data = docx_bytes(&["Corporate Name: Acme Corp", "CNPJ 12.345.678/0001-90", "Street 1"]);
        assert_eq!(
            extract(&data).unwrap(),
            "Corporate Name: Acme Corp\nCNPJ 12.345.678/0001-90\nStreet 1"
        );
    }

    #[test]
    fn test_empty_paragraph_is_empty_line() {
        let data = docx_bytes(&["a", "", "b"]);
        assert_eq!(extract(&data).unwrap(), "a\n\nb");

        let body = "<w:p><w:r><w:t>a</w:t></w:r></w:p><w:p></w:p><w:p><w:r><w:t>b</w:t></w:r></w:p>";
        assert_eq!(extract(&docx_from_body(body)).unwrap(), "a\n\nb");
    }

    #[test]
    fn test_runs_tabs_and_breaks() {
        let body = concat!(
            "<w:p><w:pPr><w:tabs><w:tab w:val=\"left\" w:pos=\"720\"/></w:tabs></w:pPr>",
            "<w:r><w:t>Name:</w:t></w:r><w:r><w:tab/><w:t xml:space=\"preserve\">Acme </w:t></w:r>",
            "<w:r><w:t>Corp</w:t><w:br/><w:t>Line two</w:t></w:r></w:p>"
        );
        assert_eq!(extract(&docx_from_body(body)).unwrap(), "Name:\tAcme Corp\nLine two");
    }

    #[test]
    fn test_entities_are_unescaped() {
        let data = docx_bytes(&["AT&T <Holdings>"]);
        assert_eq!(extract(&data).unwrap(), "AT&T <Holdings>");
    }

    #[test]
    fn test_tables_are_skipped() {
        let body = concat!(
            "<w:p><w:r><w:t>before</w:t></w:r></w:p>",
            "<w:tbl><w:tr><w:tc><w:p><w:r><w:t>cell</w:t></w:r></w:p></w:tc></w:tr></w:tbl>",
            "<w:p><w:r><w:t>after</w:t></w:r></w:p>"
        );
        assert_eq!(extract(&docx_from_body(body)).unwrap(), "before\nafter");
    }

    #[test]
    fn test_text_boxes_are_skipped() {
        let body = concat!(
            "<w:p><w:r><w:t>visible</w:t></w:r><w:r><w:drawing><wp:inline>",
            "<a:p><a:r><a:t>shape</a:t></a:r></a:p></wp:inline></w:drawing></w:r></w:p>"
        );
        assert_eq!(extract(&docx_from_body(body)).unwrap(), "visible");
    }

    #[test]
    fn test_no_paragraphs_is_empty() {
        assert_eq!(extract(&docx_bytes(&[])).unwrap(), "");
    }

    #[test]
    fn test_missing_document_part_is_corrupt() {
        let data = zip_bytes(&[("word/styles.xml", "<w:styles/>".to_string())]);
        let err = extract(&data).unwrap_err();
        assert!(matches!(err, ExtractionError::CorruptDocument { ref format, .. } if format == "docx"));
    }

    #[test]
    fn test_not_a_zip_is_corrupt() {
        let err = extract(b"plain words, not a container").unwrap_err();
        assert!(matches!(err, ExtractionError::CorruptDocument { .. }));
    }
}
