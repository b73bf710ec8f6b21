//! Plain text decoding.

use super::{Result, TextStrategy};
use crate::error::ExtractionError;
use crate::models::config::PlainTextConfig;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const UTF16_LE_BOM: &[u8] = &[0xFF, 0xFE];
const UTF16_BE_BOM: &[u8] = &[0xFE, 0xFF];

/// Decodes bytes that look like text.
///
/// Accepts UTF-8 (with or without BOM), UTF-16 with a BOM and, as a last
/// resort, Latin-1 when the content has few control characters.
#[derive(Debug, Clone, Default)]
pub struct PlainTextStrategy {
    config: PlainTextConfig,
}

impl PlainTextStrategy {
    pub fn new(config: PlainTextConfig) -> Self {
        Self { config }
    }

    /// Decode `data`, or `None` when it does not look like text.
    pub fn decode(&self, data: &[u8]) -> Option<String> {
        if let Some(rest) = data.strip_prefix(UTF8_BOM) {
            return Some(String::from_utf8_lossy(rest).into_owned());
        }
        if let Some(rest) = data.strip_prefix(UTF16_LE_BOM) {
            return Some(decode_utf16(rest, u16::from_le_bytes));
        }
        if let Some(rest) = data.strip_prefix(UTF16_BE_BOM) {
            return Some(decode_utf16(rest, u16::from_be_bytes));
        }

        if data.contains(&0) {
            return None;
        }

        if let Ok(text) = std::str::from_utf8(data) {
            if control_ratio(text.chars()) <= self.config.max_control_ratio {
                return Some(text.to_string());
            }
            return None;
        }

        // Latin-1 maps every byte to the code point of the same value
        let latin1 = data.iter().map(|&b| b as char);
        if control_ratio(latin1.clone()) <= self.config.max_control_ratio {
            return Some(latin1.collect());
        }

        None
    }

    fn finish(&self, text: String) -> String {
        if self.config.normalize_line_endings && text.contains('\r') {
            text.replace("\r\n", "\n").replace('\r', "\n")
        } else {
            text
        }
    }
}

impl TextStrategy for PlainTextStrategy {
    fn name(&self) -> &'static str {
        "plain-text"
    }

    fn extract(&self, data: &[u8]) -> Result<String> {
        self.decode(data)
            .map(|text| self.finish(text))
            .ok_or_else(|| ExtractionError::UnsupportedFormat("binary content".to_string()))
    }
}

fn decode_utf16(data: &[u8], from_bytes: fn([u8; 2]) -> u16) -> String {
    let units = data.chunks_exact(2).map(|pair| from_bytes([pair[0], pair[1]]));
    char::decode_utf16(units)
        .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

fn is_control(c: char) -> bool {
    match c {
        '\t' | '\n' | '\r' | '\x0C' => false,
        c => c.is_control(),
    }
}

/// Share of control characters, excluding common whitespace.
fn control_ratio(chars: impl Iterator<Item = char>) -> f32 {
    let (total, control) = chars.fold((0usize, 0usize), |(total, control), c| {
        (total + 1, control + is_control(c) as usize)
    });

    if total == 0 {
        0.0
    } else {
        control as f32 / total as f32
    }
}
