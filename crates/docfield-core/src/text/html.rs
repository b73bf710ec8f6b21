//! HTML text extraction.
//!
//! Markup is removed with a handful of regexes rather than a full parser:
//! script, style and head content is dropped, block-level tags become line
//! breaks and character references are decoded.

use lazy_static::lazy_static;
use quick_xml::escape::{resolve_xml_entity, unescape_with};
use regex::Regex;

use super::{PlainTextStrategy, Result, TextStrategy};
use crate::models::config::PlainTextConfig;

const HTML_PREFIXES: &[&str] = &["<!doctype html", "<html", "<head", "<body"];
const SNIFF_WINDOW: usize = 1024;

lazy_static! {
    static ref COMMENT: Regex = Regex::new(r"(?s)<!--.*?-->").unwrap();
    static ref HIDDEN: Vec<Regex> = ["script", "style", "head", "noscript", "template"]
        .iter()
        .map(|tag| Regex::new(&format!(r"(?is)<{0}\b[^>]*>.*?</{0}\s*>", tag)).unwrap())
        .collect();
    static ref BLOCK: Regex = Regex::new(
        r"(?i)</?(?:p|div|br|hr|li|ul|ol|dl|dt|dd|tr|table|h[1-6]|section|article|header|footer|blockquote|pre|address)\b[^>]*>"
    )
    .unwrap();
    static ref TAG: Regex = Regex::new(r"(?s)<[^>]*>").unwrap();
}

/// Tag stripping over decoded text.
#[derive(Debug, Clone, Default)]
pub struct HtmlStrategy {
    plain: PlainTextStrategy,
}

impl HtmlStrategy {
    pub fn new(config: PlainTextConfig) -> Self {
        Self {
            plain: PlainTextStrategy::new(config),
        }
    }

    /// Whether the leading bytes open an HTML document.
    pub fn looks_like_html(data: &[u8]) -> bool {
        let head = String::from_utf8_lossy(&data[..data.len().min(SNIFF_WINDOW)]);
        let head = head.trim_start_matches('\u{feff}').trim_start().to_ascii_lowercase();
        HTML_PREFIXES.iter().any(|prefix| head.starts_with(prefix))
    }
}

impl TextStrategy for HtmlStrategy {
    fn name(&self) -> &'static str {
        "html"
    }

    fn extract(&self, data: &[u8]) -> Result<String> {
        let markup = self.plain.extract(data)?;
        Ok(html_to_text(&markup))
    }
}

fn html_to_text(markup: &str) -> String {
    let mut text = COMMENT.replace_all(markup, "").into_owned();
    for hidden in HIDDEN.iter() {
        text = hidden.replace_all(&text, "").into_owned();
    }
    let text = BLOCK.replace_all(&text, "\n");
    let text = TAG.replace_all(&text, "");

    text.lines()
        .map(|line| decode_entities(line.trim()))
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Decode character references, leaving the line as is when a stray `&`
/// makes it unparsable.
fn decode_entities(line: &str) -> String {
    unescape_with(line, |entity| {
        resolve_xml_entity(entity).or(match entity {
            "nbsp" => Some(" "),
            "copy" => Some("©"),
            "reg" => Some("®"),
            "ordm" => Some("º"),
            "ordf" => Some("ª"),
            _ => None,
        })
    })
    .map(|decoded| decoded.into_owned())
    .unwrap_or_else(|_| line.to_string())
}
