//! Presentation (PPTX) text extraction.
//!
//! Slides live in `ppt/slides/slideN.xml` and are read in slide-number order.
//! Each non-empty DrawingML paragraph (`a:p`) becomes one line.

use std::io::Cursor;

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::debug;
use zip::ZipArchive;

use super::docx::read_part;
use super::{Result, TextStrategy};
use crate::error::ExtractionError;

const FORMAT: &str = "pptx";
const SLIDE_PREFIX: &str = "ppt/slides/slide";

/// Slide-by-slide paragraph walk over a PPTX container.
#[derive(Debug, Clone, Default)]
pub struct PresentationStrategy;

impl PresentationStrategy {
    pub fn new() -> Self {
        Self
    }

    /// Whether a ZIP entry name is a slide part.
    pub(crate) fn is_slide_part(name: &str) -> bool {
        slide_number(name).is_some()
    }
}

impl TextStrategy for PresentationStrategy {
    fn name(&self) -> &'static str {
        "presentation"
    }

    fn extract(&self, data: &[u8]) -> Result<String> {
        let mut archive = ZipArchive::new(Cursor::new(data))
            .map_err(|e| ExtractionError::corrupt(FORMAT, format!("failed to open archive: {}", e)))?;

        let mut slides: Vec<(u32, String)> = archive
            .file_names()
            .filter_map(|name| slide_number(name).map(|n| (n, name.to_string())))
            .collect();
        slides.sort_unstable_by_key(|(n, _)| *n);

        let mut lines = Vec::new();
        for (_, part) in &slides {
            let xml = read_part(&mut archive, FORMAT, part)?;
            lines.extend(slide_paragraphs(&xml)?);
        }

        debug!("Read {} slides ({} paragraphs)", slides.len(), lines.len());
        Ok(lines.join("\n"))
    }
}

/// `ppt/slides/slide12.xml` is slide 12; layouts, masters and rels are not slides.
fn slide_number(name: &str) -> Option<u32> {
    name.strip_prefix(SLIDE_PREFIX)?
        .strip_suffix(".xml")?
        .parse()
        .ok()
}

fn slide_paragraphs(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();

    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_paragraph = false;
    let mut in_text = false;

    loop {
        let event = reader.read_event_into(&mut buf).map_err(|e| {
            ExtractionError::corrupt(
                FORMAT,
                format!("XML error at position {}: {}", reader.error_position(), e),
            )
        })?;

        match event {
            Event::Start(ref e) => match e.local_name().as_ref() {
                b"p" => {
                    in_paragraph = true;
                    current.clear();
                }
                b"t" => in_text = true,
                b"br" if in_paragraph => current.push('\n'),
                _ => {}
            },
            Event::End(ref e) => match e.local_name().as_ref() {
                b"p" if in_paragraph => {
                    let line = current.trim();
                    if !line.is_empty() {
                        paragraphs.push(line.to_string());
                    }
                    in_paragraph = false;
                }
                b"t" => in_text = false,
                _ => {}
            },
            Event::Empty(ref e) if in_paragraph && e.local_name().as_ref() == b"br" => {
                current.push('\n');
            }
            Event::Text(ref e) if in_paragraph && in_text => {
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
