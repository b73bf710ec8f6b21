//! Content sniffing for documents no registered strategy claims.

use std::io::Cursor;

use tracing::debug;
use zip::ZipArchive;

use super::odt::ODT_MIMETYPE;
use super::{
    HtmlStrategy, OpenDocumentTextStrategy, PdfStrategy, PlainTextStrategy, PresentationStrategy,
    Result, SpreadsheetStrategy, TextStrategy, WordProcessingStrategy,
};
use crate::error::ExtractionError;
use crate::models::config::TextConfig;

const PDF_MAGIC: &[u8] = b"%PDF-";
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE2_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

const IMAGE_MAGICS: &[(&[u8], &str)] = &[
    (b"\x89PNG\r\n\x1a\n", "PNG"),
    (&[0xFF, 0xD8, 0xFF], "JPEG"),
    (b"GIF87a", "GIF"),
    (b"GIF89a", "GIF"),
    (b"II*\x00", "TIFF"),
    (b"MM\x00*", "TIFF"),
];

const ODS_MIMETYPE: &str = "application/vnd.oasis.opendocument.spreadsheet";

/// What the leading bytes of a document say it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Pdf,
    /// ZIP container; the entries decide the actual format.
    Zip,
    /// OLE2 compound file (legacy XLS/DOC).
    Ole2,
    Image(&'static str),
    /// Anything else, possibly text.
    Unknown,
}

/// Classify `data` by magic bytes.
pub fn sniff(data: &[u8]) -> ContentKind {
    if data.starts_with(PDF_MAGIC) {
        return ContentKind::Pdf;
    }
    if data.starts_with(ZIP_MAGIC) {
        return ContentKind::Zip;
    }
    if data.starts_with(OLE2_MAGIC) {
        return ContentKind::Ole2;
    }
    IMAGE_MAGICS
        .iter()
        .find(|(magic, _)| data.starts_with(magic))
        .map(|(_, name)| ContentKind::Image(*name))
        .unwrap_or(ContentKind::Unknown)
}

/// Fallback strategy that inspects the content itself.
///
/// Extracted text is attributed to the strategy it was routed to, never to
/// `generic`.
pub struct GenericSniffStrategy {
    docx: WordProcessingStrategy,
    spreadsheet: SpreadsheetStrategy,
    presentation: PresentationStrategy,
    odt: OpenDocumentTextStrategy,
    pdf: PdfStrategy,
    html: HtmlStrategy,
    plain: PlainTextStrategy,
}

impl GenericSniffStrategy {
    pub fn new(config: &TextConfig) -> Self {
        Self {
            docx: WordProcessingStrategy::new(),
            spreadsheet: SpreadsheetStrategy::new(config.spreadsheet.clone()),
            presentation: PresentationStrategy::new(),
            odt: OpenDocumentTextStrategy::new(),
            pdf: PdfStrategy::new(config.pdf.clone()),
            html: HtmlStrategy::new(config.plain.clone()),
            plain: PlainTextStrategy::new(config.plain.clone()),
        }
    }

    /// The strategy that handles content of the given kind.
    fn route(&self, kind: ContentKind, data: &[u8]) -> Result<&dyn TextStrategy> {
        match kind {
            ContentKind::Pdf => Ok(&self.pdf),
            ContentKind::Zip => self.zip_strategy(data),
            ContentKind::Ole2 => Ok(&self.spreadsheet),
            ContentKind::Image(name) => Err(ExtractionError::UnsupportedFormat(format!(
                "{} image (OCR is not supported)",
                name
            ))),
            ContentKind::Unknown if HtmlStrategy::looks_like_html(data) => Ok(&self.html),
            ContentKind::Unknown => Ok(&self.plain),
        }
    }

    /// Pick the strategy for a ZIP container from its entries.
    fn zip_strategy(&self, data: &[u8]) -> Result<&dyn TextStrategy> {
        let mut archive = ZipArchive::new(Cursor::new(data))
            .map_err(|e| ExtractionError::corrupt("zip", format!("failed to open archive: {}", e)))?;

        let mut has_docx_body = false;
        let mut has_workbook = false;
        let mut has_slides = false;
        for name in archive.file_names() {
            match name {
                "word/document.xml" => has_docx_body = true,
                "xl/workbook.xml" | "xl/workbook.bin" => has_workbook = true,
                _ if PresentationStrategy::is_slide_part(name) => has_slides = true,
                _ => {}
            }
        }

        if has_docx_body {
            return Ok(&self.docx);
        }
        if has_workbook {
            return Ok(&self.spreadsheet);
        }
        if has_slides {
            return Ok(&self.presentation);
        }
        match read_mimetype(&mut archive).as_deref() {
            Some(ODS_MIMETYPE) => return Ok(&self.spreadsheet),
            Some(ODT_MIMETYPE) => return Ok(&self.odt),
            _ => {}
        }

        Err(ExtractionError::UnsupportedFormat(
            "ZIP archive without a recognized document part".to_string(),
        ))
    }
}

impl Default for GenericSniffStrategy {
    fn default() -> Self {
        Self::new(&TextConfig::default())
    }
}

/// The OpenDocument `mimetype` entry, if the archive has a readable one.
fn read_mimetype(archive: &mut ZipArchive<Cursor<&[u8]>>) -> Option<String> {
    use std::io::Read;

    let mut entry = archive.by_name("mimetype").ok()?;
    let mut mimetype = String::new();
    entry.read_to_string(&mut mimetype).ok()?;
    Some(mimetype.trim().to_string())
}

impl TextStrategy for GenericSniffStrategy {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn extract(&self, data: &[u8]) -> Result<String> {
        self.extract_named(data).map(|(text, _)| text)
    }

    fn extract_named(&self, data: &[u8]) -> Result<(String, &'static str)> {
        let kind = sniff(data);
        let delegate = self.route(kind, data)?;
        debug!("Sniffed content as {:?}, using {} strategy", kind, delegate.name());

        match delegate.extract(data) {
            Ok(text) => Ok((text, delegate.name())),
            Err(e) if kind == ContentKind::Ole2 => {
                debug!("OLE2 content is not a readable workbook: {}", e);
                Err(ExtractionError::UnsupportedFormat("legacy OLE2 document".to_string()))
            }
            Err(e) => Err(e),
        }
    }
}
