//! Pattern-based business field extraction.
//!
//! Every operation is a pure function of the text: no state is shared
//! between calls, so the four fields can be extracted in any order or in
//! parallel. A miss is reported as `None`, never as an error.

pub mod patterns;

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::error::{DocfieldError, Result};
use crate::models::config::{Fallback, FieldPatternConfig, FieldRules, MatchPolicy};
use crate::models::document::{ExtractedFields, Provenance};

use patterns::DEFAULT_EXTRACTOR;

/// Fields the extractor knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    TaxId,
    Name,
    Address,
    CreditRisk,
}

impl Field {
    pub const ALL: [Field; 4] = [Field::TaxId, Field::Name, Field::Address, Field::CreditRisk];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::TaxId => "tax_id",
            Field::Name => "name",
            Field::Address => "address",
            Field::CreditRisk => "credit_risk",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A field value with the rule that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionMatch {
    /// Trimmed value.
    pub value: String,
    /// Label of the matching rule, or `first_non_blank_line` for the fallback.
    pub label: String,
    pub provenance: Provenance,
    /// Byte span of the whole match in the source text.
    pub position: Option<(usize, usize)>,
}

#[derive(Debug, Clone)]
struct CompiledRule {
    label: String,
    regex: Regex,
    group: usize,
}

/// A field's pattern table, compiled.
#[derive(Debug, Clone)]
pub struct CompiledRules {
    field: Field,
    policy: MatchPolicy,
    fallback: Fallback,
    rules: Vec<CompiledRule>,
}

impl CompiledRules {
    /// Compile a pattern table. Fails on an invalid regex or capture group.
    pub fn compile(field: Field, table: &FieldRules) -> Result<Self> {
        let mut rules = Vec::with_capacity(table.rules.len());

        for rule in &table.rules {
            let regex = Regex::new(&rule.pattern).map_err(|e| {
                DocfieldError::Config(format!("{} rule '{}': {}", field, rule.label, e))
            })?;

            if rule.group >= regex.captures_len() {
                return Err(DocfieldError::Config(format!(
                    "{} rule '{}': capture group {} does not exist",
                    field, rule.label, rule.group
                )));
            }

            rules.push(CompiledRule {
                label: rule.label.clone(),
                regex,
                group: rule.group,
            });
        }

        Ok(Self {
            field,
            policy: table.policy,
            fallback: table.fallback,
            rules,
        })
    }

    pub fn field(&self) -> Field {
        self.field
    }

    /// Number of pattern rules, not counting the fallback.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Find the field's value in `text`.
    pub fn find(&self, text: &str) -> Option<ExtractionMatch> {
        let found = match self.policy {
            MatchPolicy::RuleOrder => self.rules.iter().find_map(|rule| first_match(rule, text)),
            MatchPolicy::Leftmost => self
                .rules
                .iter()
                .filter_map(|rule| first_match(rule, text))
                // min_by_key keeps the first of equal keys, so ties go to the earlier rule
                .min_by_key(|m| m.position.map(|(start, _)| start)),
        };

        if let Some(m) = &found {
            debug!("{} matched rule '{}'", self.field, m.label);
            return found;
        }

        match self.fallback {
            Fallback::Absent => None,
            Fallback::FirstNonBlankLine => {
                let line = text.lines().map(str::trim).find(|l| !l.is_empty())?;
                debug!("{} fell back to first non-blank line", self.field);
                Some(ExtractionMatch {
                    value: line.to_string(),
                    label: "first_non_blank_line".to_string(),
                    provenance: Provenance::Fallback,
                    position: None,
                })
            }
        }
    }

    /// Every rule match in the text, ordered by position. Ignores the fallback.
    pub fn find_all(&self, text: &str) -> Vec<ExtractionMatch> {
        let mut results: Vec<ExtractionMatch> = self
            .rules
            .iter()
            .flat_map(|rule| {
                rule.regex
                    .captures_iter(text)
                    .filter_map(move |caps| to_match(rule, &caps))
            })
            .collect();

        results.sort_by_key(|m| m.position.map(|(start, _)| start));
        results
    }
}

fn first_match(rule: &CompiledRule, text: &str) -> Option<ExtractionMatch> {
    rule.regex
        .captures_iter(text)
        .find_map(|caps| to_match(rule, &caps))
}

fn to_match(rule: &CompiledRule, caps: &regex::Captures<'_>) -> Option<ExtractionMatch> {
    let whole = caps.get(0)?;
    let captured = caps.get(rule.group)?;

    // A label whose value sits on the next line reads as one line
    let value = captured
        .as_str()
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if value.is_empty() {
        return None;
    }

    Some(ExtractionMatch {
        value,
        label: rule.label.clone(),
        provenance: Provenance::Pattern,
        position: Some((whole.start(), whole.end())),
    })
}

/// Extractor for all four business fields.
#[derive(Debug, Clone)]
pub struct FieldExtractor {
    tax_id: CompiledRules,
    name: CompiledRules,
    address: CompiledRules,
    credit_risk: CompiledRules,
}

impl FieldExtractor {
    /// Build an extractor from pattern tables.
    pub fn from_config(config: &FieldPatternConfig) -> Result<Self> {
        Ok(Self {
            tax_id: CompiledRules::compile(Field::TaxId, &config.tax_id)?,
            name: CompiledRules::compile(Field::Name, &config.name)?,
            address: CompiledRules::compile(Field::Address, &config.address)?,
            credit_risk: CompiledRules::compile(Field::CreditRisk, &config.credit_risk)?,
        })
    }

    /// Compiled rules for one field.
    pub fn rules(&self, field: Field) -> &CompiledRules {
        match field {
            Field::TaxId => &self.tax_id,
            Field::Name => &self.name,
            Field::Address => &self.address,
            Field::CreditRisk => &self.credit_risk,
        }
    }

    /// Find one field with its provenance.
    pub fn find(&self, field: Field, text: &str) -> Option<ExtractionMatch> {
        self.rules(field).find(text)
    }

    pub fn tax_id(&self, text: &str) -> Option<String> {
        self.find(Field::TaxId, text).map(|m| m.value)
    }

    pub fn name(&self, text: &str) -> Option<String> {
        self.find(Field::Name, text).map(|m| m.value)
    }

    pub fn address(&self, text: &str) -> Option<String> {
        self.find(Field::Address, text).map(|m| m.value)
    }

    pub fn credit_risk(&self, text: &str) -> Option<String> {
        self.find(Field::CreditRisk, text).map(|m| m.value)
    }

    /// Extract every field from the same text.
    pub fn extract_all(&self, text: &str) -> ExtractedFields {
        let name = self.find(Field::Name, text);

        ExtractedFields {
            tax_id: self.tax_id(text),
            party_name_source: name.as_ref().map(|m| m.provenance),
            party_name: name.map(|m| m.value),
            address: self.address(text),
            credit_risk: self.credit_risk(text),
        }
    }
}

/// Extract a tax identifier using the default patterns.
pub fn extract_tax_id(text: &str) -> Option<String> {
    DEFAULT_EXTRACTOR.tax_id(text)
}

/// Extract a party name using the default patterns.
///
/// Falls back to the first non-blank line, so this is `None` only for blank text.
pub fn extract_name(text: &str) -> Option<String> {
    DEFAULT_EXTRACTOR.name(text)
}

/// Extract an address line using the default patterns.
pub fn extract_address(text: &str) -> Option<String> {
    DEFAULT_EXTRACTOR.address(text)
}

/// Extract a credit risk label or score using the default patterns.
pub fn extract_credit_risk(text: &str) -> Option<String> {
    DEFAULT_EXTRACTOR.credit_risk(text)
}

/// Extract all fields using the default patterns.
pub fn extract_fields(text: &str) -> ExtractedFields {
    DEFAULT_EXTRACTOR.extract_all(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::PatternRule;
    use pretty_assertions::assert_eq;

    fn some(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    #[test]
    fn test_tax_id_formatted() {
        assert_eq!(extract_tax_id("CNPJ: 12.345.678/0001-90"), some("12.345.678/0001-90"));
    }

    #[test]
    fn test_tax_id_bare() {
        assert_eq!(extract_tax_id("12345678000190"), some("12345678000190"));
    }

    #[test]
    fn test_tax_id_rejects_wrong_length() {
        assert_eq!(extract_tax_id("ID 123456"), None);
        assert_eq!(extract_tax_id("123456780001901"), None);
        assert_eq!(extract_tax_id("112.345.678/0001-90"), None);
    }

    #[test]
    fn test_tax_id_leftmost_wins() {
        let text = "old 11111111111111\nnew 22.222.222/0001-22";
        assert_eq!(extract_tax_id(text), some("11111111111111"));

        let text = "new 22.222.222/0001-22\nold 11111111111111";
        assert_eq!(extract_tax_id(text), some("22.222.222/0001-22"));
    }

    #[test]
    fn test_name_corporate_label() {
        assert_eq!(extract_name("Corporate Name: Acme Corp\nOther line"), some("Acme Corp"));
    }

    #[test]
    fn test_name_label_case_insensitive() {
        assert_eq!(extract_name("header\ncompany name:   Foo Ltda  \n"), some("Foo Ltda"));
    }

    #[test]
    fn test_name_capture_truncated_at_newline() {
        assert_eq!(extract_name("Name:\n\nAcme\nSecond"), some("Acme"));
    }

    #[test]
    fn test_name_fallback_first_non_blank_line() {
        assert_eq!(extract_name("just some text\nand more"), some("just some text"));
        assert_eq!(extract_name("\n   \n  Letterhead Inc  \nbody"), some("Letterhead Inc"));
    }

    #[test]
    fn test_name_absent_only_for_blank_text() {
        assert_eq!(extract_name(""), None);
        assert_eq!(extract_name("  \n\t\n"), None);
    }

    #[test]
    fn test_name_provenance() {
        let labeled = DEFAULT_EXTRACTOR.find(Field::Name, "Name: Acme").unwrap();
        assert_eq!(labeled.provenance, Provenance::Pattern);
        assert_eq!(labeled.label, "name");

        let guessed = DEFAULT_EXTRACTOR.find(Field::Name, "ACME LETTERHEAD").unwrap();
        assert_eq!(guessed.provenance, Provenance::Fallback);
        assert_eq!(guessed.position, None);
    }

    #[test]
    fn test_address_street_line() {
        assert_eq!(extract_address("Street 123 Main\nfoo"), some("Street 123 Main"));
    }

    #[test]
    fn test_address_alternatives() {
        assert_eq!(extract_address("x\nAddress: Rua A, 10\n"), some("Address: Rua A, 10"));
        assert_eq!(extract_address("x\n  av. Paulista 1000\n"), some("av. Paulista 1000"));
        assert_eq!(extract_address("AVENUE of the Americas 5"), some("AVENUE of the Americas 5"));
    }

    #[test]
    fn test_address_leftmost_wins() {
        let text = "Avenue Brasil 1\nAddress: Rua B 2";
        assert_eq!(extract_address(text), some("Avenue Brasil 1"));
    }

    #[test]
    fn test_address_absent() {
        assert_eq!(extract_address("nothing here\nat all"), None);
        assert_eq!(extract_address("Main Street"), None);
    }

    #[test]
    fn test_credit_risk_score() {
        assert_eq!(extract_credit_risk("Score: 750"), some("Score: 750"));
        assert_eq!(extract_credit_risk("score - 88 points"), some("score - 88"));
    }

    #[test]
    fn test_credit_risk_score_too_long() {
        assert_eq!(extract_credit_risk("Score: 12345"), None);
        assert_eq!(extract_credit_risk("Score: 7"), None);
    }

    #[test]
    fn test_credit_risk_label() {
        assert_eq!(extract_credit_risk("Credit Risk: HIGH\n"), some("Risk: HIGH"));
        assert_eq!(extract_credit_risk("risk-low"), some("risk-low"));
    }

    #[test]
    fn test_credit_risk_first_match() {
        assert_eq!(extract_credit_risk("Score: 640\nRisk: medium"), some("Score: 640"));
    }

    #[test]
    fn test_value_on_line_after_label() {
        assert_eq!(extract_credit_risk("Score:\n750"), some("Score: 750"));
        assert_eq!(extract_credit_risk("Risk -\nHigh"), some("Risk - High"));
        assert_eq!(extract_address("Address:\nRua A, 10"), some("Address: Rua A, 10"));
        assert_eq!(extract_address("Address:\r\n\r\n  Rua A, 10\r\n"), some("Address: Rua A, 10"));
        assert_eq!(extract_name("Name:\nAcme"), some("Acme"));
    }

    #[test]
    fn test_credit_risk_score_followed_by_letters() {
        assert_eq!(extract_credit_risk("Score: 750pts"), some("Score: 750"));
        assert_eq!(extract_credit_risk("Score:640/1000"), some("Score:640"));
        assert_eq!(extract_credit_risk("Score - 99."), some("Score - 99"));
    }

    #[test]
    fn test_binary_text_is_absent_not_error() {
        let text = "\u{0}\u{1}\u{fffd}\u{fffd}PK\u{3}\u{4}";
        assert_eq!(extract_tax_id(text), None);
        assert_eq!(extract_address(text), None);
        assert_eq!(extract_credit_risk(text), None);
    }

    #[test]
    fn test_extract_all_is_idempotent() {
        let text = "ACME HOLDINGS\nCNPJ 12.345.678/0001-90\nStreet 9 Elm\nRisk: low";
        let first = extract_fields(text);
        let second = extract_fields(text);

        assert_eq!(first, second);
        assert_eq!(first.tax_id, some("12.345.678/0001-90"));
        assert_eq!(first.party_name, some("ACME HOLDINGS"));
        assert_eq!(first.party_name_source, Some(Provenance::Fallback));
        assert_eq!(first.address, some("Street 9 Elm"));
        assert_eq!(first.credit_risk, some("Risk: low"));
    }

    #[test]
    fn test_fields_in_parallel() {
        let text = "Company Name: Beta SA\nScore: 512\nAv. Central 4";
        let handles: Vec<_> = Field::ALL
            .iter()
            .map(|&field| {
                let text = text.to_string();
                std::thread::spawn(move || (field, DEFAULT_EXTRACTOR.find(field, &text)))
            })
            .collect();

        for handle in handles {
            let (field, found) = handle.join().unwrap();
            assert_eq!(found, DEFAULT_EXTRACTOR.find(field, text));
        }
    }

    #[test]
    fn test_find_all_orders_by_position() {
        let text = "Score: 10 then Risk: low then Score: 99";
        let all = DEFAULT_EXTRACTOR.rules(Field::CreditRisk).find_all(text);
        let values: Vec<&str> = all.iter().map(|m| m.value.as_str()).collect();
        assert_eq!(values, vec!["Score: 10", "Risk: low", "Score: 99"]);
    }

    #[test]
    fn test_custom_rule_order_table() {
        let mut config = FieldPatternConfig::default();
        config.name = FieldRules::rule_order(&[
            ("razao_social", r"(?i)Raz[aã]o Social:\s*(.+)", 1),
            ("name", r"(?i)Name:\s*(.+)", 1),
        ]);
        let extractor = FieldExtractor::from_config(&config).unwrap();

        let text = "Name: Fantasy\nRazão Social: Beta Comercio Ltda";
        assert_eq!(extractor.name(text), some("Beta Comercio Ltda"));
        assert_eq!(extractor.name("no labels"), None);
    }

    #[test]
    fn test_invalid_pattern_is_config_error() {
        let mut config = FieldPatternConfig::default();
        config.address.rules.push(PatternRule::new("broken", "(unclosed", 0));

        let err = FieldExtractor::from_config(&config).err().unwrap();
        assert!(matches!(err, DocfieldError::Config(msg) if msg.contains("broken")));
    }

    #[test]
    fn test_missing_group_is_config_error() {
        let mut config = FieldPatternConfig::default();
        config.tax_id.rules = vec![PatternRule::new("no_group", r"[0-9]{14}", 2)];

        assert!(FieldExtractor::from_config(&config).is_err());
    }
}
