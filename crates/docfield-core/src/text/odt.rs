//! OpenDocument text (ODT) extraction.
//!
//! The body lives in `content.xml`. Every `text:p` and `text:h` becomes one
//! line, including those inside tables and lists. A paragraph nested in
//! another (frames, text boxes) is folded into its parent.

use std::io::Cursor;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;
use zip::ZipArchive;

use super::docx::read_part;
use super::{Result, TextStrategy};
use crate::error::ExtractionError;

const FORMAT: &str = "odt";
const CONTENT_PART: &str = "content.xml";

pub(crate) const ODT_MIMETYPE: &str = "application/vnd.oasis.opendocument.text";

/// Paragraph walk over an ODT container.
#[derive(Debug, Clone, Default)]
pub struct OpenDocumentTextStrategy;

impl OpenDocumentTextStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl TextStrategy for OpenDocumentTextStrategy {
    fn name(&self) -> &'static str {
        "open-document-text"
    }

    fn extract(&self, data: &[u8]) -> Result<String> {
        let mut archive = ZipArchive::new(Cursor::new(data))
            .map_err(|e| ExtractionError::corrupt(FORMAT, format!("failed to open archive: {}", e)))?;

        let xml = read_part(&mut archive, FORMAT, CONTENT_PART)?;
        let paragraphs = parse_paragraphs(&xml)?;

        debug!("Read {} paragraphs from {}", paragraphs.len(), CONTENT_PART);
        Ok(paragraphs.join("\n"))
    }
}

/// Elements whose text is not part of the document body.
fn is_skipped_container(local_name: &[u8]) -> bool {
    matches!(local_name, b"tracked-changes" | b"annotation" | b"note-citation")
}

/// Number of spaces a `text:s` element stands for.
fn space_count(element: &BytesStart<'_>) -> usize {
    element
        .attributes()
        .flatten()
        .find(|attr| attr.key.local_name().as_ref() == b"c")
        .and_then(|attr| String::from_utf8_lossy(&attr.value).trim().parse().ok())
        .unwrap_or(1)
}

fn push_inline(current: &mut String, element: &BytesStart<'_>) {
    match element.local_name().as_ref() {
        b"s" => current.extend(std::iter::repeat(' ').take(space_count(element))),
        b"tab" => current.push('\t'),
        b"line-break" => current.push('\n'),
        _ => {}
    }
}

fn parse_paragraphs(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();

    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut skip_depth = 0usize;

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
                if is_skipped_container(name.as_ref()) {
                    skip_depth += 1;
                } else if skip_depth == 0 {
                    match name.as_ref() {
                        b"p" | b"h" => {
                            if depth == 0 {
                                current.clear();
                            }
                            depth += 1;
                        }
                        _ if depth > 0 => push_inline(&mut current, e),
                        _ => {}
                    }
                }
            }
            Event::End(ref e) => {
                let name = e.local_name();
                if is_skipped_container(name.as_ref()) {
                    skip_depth = skip_depth.saturating_sub(1);
                } else if skip_depth == 0 && matches!(name.as_ref(), b"p" | b"h") && depth > 0 {
                    depth -= 1;
                    if depth == 0 {
                        paragraphs.push(std::mem::take(&mut current));
                    }
                }
            }
            Event::Empty(ref e) if skip_depth == 0 => match e.local_name().as_ref() {
                b"p" | b"h" if depth == 0 => paragraphs.push(String::new()),
                _ if depth > 0 => push_inline(&mut current, e),
                _ => {}
            },
            Event::Text(ref e) if skip_depth == 0 && depth > 0 => {
                let text = e.unescape().map_err(|e| {
                    ExtractionError::corrupt(FORMAT, format!("bad text content: {}", e))
                })?;
                current.push_str(&text);
            }
            Event::Eof => break,
            _ => {}
        }

        buf.clear();
    }

    Ok(paragraphs)
}
