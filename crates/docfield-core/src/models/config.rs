//! Configuration structures for text and field extraction.

use serde::{Deserialize, Serialize};

use crate::error::{DocfieldError, Result};
use crate::fields::patterns;

/// Main configuration for the docfield pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DocfieldConfig {
    /// Text extraction configuration.
    pub text: TextConfig,

    /// Field pattern tables.
    pub fields: FieldPatternConfig,
}

/// Text extraction configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    /// Spreadsheet flattening.
    pub spreadsheet: SpreadsheetConfig,

    /// PDF handling.
    pub pdf: PdfConfig,

    /// Plain text decoding.
    pub plain: PlainTextConfig,
}

/// Spreadsheet flattening configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpreadsheetConfig {
    /// Token appended after every rendered cell.
    pub cell_separator: String,

    /// Skip cells that hold no value, as well as rows made only of such cells.
    pub skip_empty_cells: bool,
}

impl Default for SpreadsheetConfig {
    fn default() -> Self {
        Self {
            cell_separator: " | ".to_string(),
            skip_empty_cells: true,
        }
    }
}

/// PDF handling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Try to open encrypted PDFs with the empty user password.
    pub try_empty_password: bool,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            try_empty_password: true,
        }
    }
}

/// Plain text decoding configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlainTextConfig {
    /// Convert `\r\n` and lone `\r` to `\n`.
    pub normalize_line_endings: bool,

    /// Share of control characters (0.0 - 1.0) above which content is binary.
    pub max_control_ratio: f32,
}

impl Default for PlainTextConfig {
    fn default() -> Self {
        Self {
            normalize_line_endings: true,
            max_control_ratio: 0.1,
        }
    }
}

/// Ordered pattern tables, one per field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldPatternConfig {
    pub tax_id: FieldRules,
    pub name: FieldRules,
    pub address: FieldRules,
    pub credit_risk: FieldRules,
}

impl Default for FieldPatternConfig {
    fn default() -> Self {
        Self {
            tax_id: FieldRules::leftmost(&[
                ("formatted", patterns::TAX_ID_FORMATTED, 0),
                ("bare", patterns::TAX_ID_BARE, 0),
            ]),
            name: FieldRules::rule_order(&[
                ("name", patterns::NAME_LABEL, 1),
                ("corporate_name", patterns::CORPORATE_NAME_LABEL, 1),
                ("company_name", patterns::COMPANY_NAME_LABEL, 1),
            ])
            .with_fallback(Fallback::FirstNonBlankLine),
            address: FieldRules::leftmost(&[
                ("address", patterns::ADDRESS_LABEL, 0),
                ("street", patterns::STREET_LINE, 0),
                ("av", patterns::AV_LINE, 0),
                ("avenue", patterns::AVENUE_LINE, 0),
            ]),
            credit_risk: FieldRules::leftmost(&[
                ("risk", patterns::RISK_LABEL, 0),
                ("score", patterns::SCORE_LABEL, 1),
            ]),
        }
    }
}

/// Pattern table for a single field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldRules {
    /// How to choose between matches of different rules.
    #[serde(default)]
    pub policy: MatchPolicy,

    /// What to return when no rule matches.
    #[serde(default)]
    pub fallback: Fallback,

    /// Rules in priority order.
    pub rules: Vec<PatternRule>,
}

impl FieldRules {
    fn from_table(policy: MatchPolicy, table: &[(&str, &str, usize)]) -> Self {
        Self {
            policy,
            fallback: Fallback::Absent,
            rules: table
                .iter()
                .map(|(label, pattern, group)| PatternRule::new(*label, *pattern, *group))
                .collect(),
        }
    }

    /// Rules where the earliest match in the text wins.
    pub fn leftmost(table: &[(&str, &str, usize)]) -> Self {
        Self::from_table(MatchPolicy::Leftmost, table)
    }

    /// Rules tried one after another; the first rule with any match wins.
    pub fn rule_order(table: &[(&str, &str, usize)]) -> Self {
        Self::from_table(MatchPolicy::RuleOrder, table)
    }

    pub fn with_fallback(mut self, fallback: Fallback) -> Self {
        self.fallback = fallback;
        self
    }
}

/// A labeled regex and the capture group holding the value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternRule {
    pub label: String,
    pub pattern: String,
    /// Capture group index; 0 is the whole match.
    #[serde(default)]
    pub group: usize,
}

impl PatternRule {
    pub fn new(label: impl Into<String>, pattern: impl Into<String>, group: usize) -> Self {
        Self {
            label: label.into(),
            pattern: pattern.into(),
            group,
        }
    }
}

/// Tie-break between rules of one field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// Earliest match position across all rules; ties go to the earlier rule.
    #[default]
    Leftmost,
    /// First rule (in table order) that matches anywhere.
    RuleOrder,
}

/// Behavior when no rule matches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fallback {
    /// Report the field as absent.
    #[default]
    Absent,
    /// Use the first non-blank line of the text.
    FirstNonBlankLine,
}

impl DocfieldConfig {
    /// Load configuration from a JSON file.
    ///
    /// A file that cannot be read is [`DocfieldError::Io`]; malformed JSON is
    /// [`DocfieldError::Config`].
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| DocfieldError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| DocfieldError::Config(format!("failed to serialize configuration: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
