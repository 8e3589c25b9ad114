//! Text normalization for duplicate comparison

use lazy_static::lazy_static;
use regex::{NoExpand, Regex};
use serde::Serialize;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use bizdir_domain::Record;

use crate::config::{AbbreviationRule, NormalizerConfig, DEFAULT_ABBREVIATIONS};
use crate::error::ConfigError;

lazy_static! {
    static ref DEFAULT_RULES: Vec<CompiledRule> = DEFAULT_ABBREVIATIONS
        .iter()
        .map(|(token, expansion)| {
            CompiledRule::compile(&AbbreviationRule::new(*token, *expansion)).unwrap()
        })
        .collect();
}

/// Comparison-ready form of a record's address and phone
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedView {
    /// Lowercased address with abbreviations expanded
    pub normalized_address: String,
    /// Phone digits only
    pub normalized_phone: String,
    /// Leading digit run of the raw address, empty if none
    pub street_number: String,
}

#[derive(Debug, Clone)]
struct CompiledRule {
    pattern: Regex,
    expansion: String,
}

impl CompiledRule {
    fn compile(rule: &AbbreviationRule) -> Result<Self, ConfigError> {
        let token = rule.token.trim().to_lowercase();
        if token.is_empty() {
            return Err(ConfigError::InvalidRule {
                token: rule.token.clone(),
                message: "token must not be empty".to_string(),
            });
        }

        // Word-bounded token with an optional trailing period
        let pattern = Regex::new(&format!(r"\b{}\.?\b", regex::escape(&token))).map_err(|e| {
            ConfigError::InvalidRule {
                token: rule.token.clone(),
                message: e.to_string(),
            }
        })?;

        Ok(Self {
            pattern,
            expansion: rule.expansion.clone(),
        })
    }
}

/// Address and phone normalizer
///
/// Owns its abbreviation rules; the rules are applied in table order.
#[derive(Debug, Clone)]
pub struct Normalizer {
    rules: Vec<CompiledRule>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self {
            rules: DEFAULT_RULES.clone(),
        }
    }
}

impl Normalizer {
    /// Build a normalizer from an ordered rule table
    pub fn new(rules: &[AbbreviationRule]) -> Result<Self, ConfigError> {
        let rules = rules
            .iter()
            .map(CompiledRule::compile)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    pub fn from_config(config: &NormalizerConfig) -> Result<Self, ConfigError> {
        Self::new(&config.abbreviations)
    }

    /// Normalize an address for comparison
    ///
    /// - Trims and lowercases
    /// - Expands street and direction abbreviations
    /// - Replaces `#` with "suite "
    /// - Collapses whitespace
    pub fn normalize_address(&self, address: &str) -> String {
        let mut result = address.trim().to_lowercase();

        for rule in &self.rules {
            result = rule
                .pattern
                .replace_all(&result, NoExpand(&rule.expansion))
                .into_owned();
        }

        result = result.replace('#', "suite ");

        collapse_whitespace(&result).trim().to_string()
    }

    /// Build the normalized view of a record
    pub fn view(&self, record: &Record) -> NormalizedView {
        let address = record.address_text();
        NormalizedView {
            normalized_address: self.normalize_address(address),
            normalized_phone: normalize_phone(record.phone_text()),
            street_number: street_number(address),
        }
    }
}

/// Keep only the digits of a phone number
pub fn normalize_phone(phone: &str) -> String {
    phone.chars().filter(char::is_ascii_digit).collect()
}

/// Leading run of digits at the very start of a raw address
pub fn street_number(address: &str) -> String {
    address.chars().take_while(char::is_ascii_digit).collect()
}

/// Strip diacritics from a name
///
/// Decomposes to NFD and drops combining marks. `đ`/`Đ` have no
/// decomposition and are mapped to `d`/`D` explicitly.
pub fn fold_diacritics(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| match c {
            'đ' => 'd',
            'Đ' => 'D',
            other => other,
        })
        .collect()
}

/// Collapse multiple whitespace characters into a single space
fn collapse_whitespace(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut prev_was_space = false;

    for c in s.chars() {
        if c.is_whitespace() {
            if !prev_was_space {
                result.push(' ');
                prev_was_space = true;
            }
        } else {
            result.push(c);
            prev_was_space = false;
        }
    }

    result
}
