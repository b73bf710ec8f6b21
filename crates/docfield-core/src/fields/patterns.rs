//! Default regex patterns for business field extraction.

use lazy_static::lazy_static;

use super::FieldExtractor;
use crate::models::config::FieldPatternConfig;

// Tax ID (CNPJ-style): 12.345.678/0001-90 or 14 bare digits
pub const TAX_ID_FORMATTED: &str = r"\b[0-9]{2}\.[0-9]{3}\.[0-9]{3}/[0-9]{4}-[0-9]{2}\b";
pub const TAX_ID_BARE: &str = r"\b[0-9]{14}\b";

// Party name labels, most generic first
pub const NAME_LABEL: &str = r"(?i)Name:\s*(.+)";
pub const CORPORATE_NAME_LABEL: &str = r"(?i)Corporate Name:\s*(.+)";
pub const COMPANY_NAME_LABEL: &str = r"(?i)Company Name:\s*(.+)";

// Address: labeled anywhere (value may sit on the next line), street forms
// only at line start
pub const ADDRESS_LABEL: &str = r"(?i)Address:\s*.+";
pub const STREET_LINE: &str = r"(?im)^[ \t]*Street[ \t]+.+";
pub const AV_LINE: &str = r"(?im)^[ \t]*Av\.[ \t]+.+";
pub const AVENUE_LINE: &str = r"(?im)^[ \t]*Avenue[ \t]+.+";

// Credit risk: "Risk: high" or "Score - 750". A score is 2 to 4 digits not
// followed by another digit; the value is capture group 1.
pub const RISK_LABEL: &str = r"(?i)Risk\s*[:\-]\s*\w+";
pub const SCORE_LABEL: &str = r"(?i)(Score\s*[:\-]\s*[0-9]{2,4})(?:[^0-9]|$)";

lazy_static! {
    /// Extractor compiled from the default pattern tables.
    pub static ref DEFAULT_EXTRACTOR: FieldExtractor =
        FieldExtractor::from_config(&FieldPatternConfig::default()).unwrap();
}
