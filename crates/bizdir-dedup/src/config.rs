//! Configuration for duplicate detection
//!
//! Similarity thresholds, grouping key parameters, resolution options and the
//! address abbreviation table. A config is read-only once a resolver has been
//! built from it.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default street and direction abbreviations as (token, expansion) pairs.
///
/// Each token matches as a whole word, optionally followed by a period, and
/// the rules are applied in this order.
pub const DEFAULT_ABBREVIATIONS: &[(&str, &str)] = &[
    ("st", "street"),
    ("ave", "avenue"),
    ("dr", "drive"),
    ("ln", "lane"),
    ("blvd", "boulevard"),
    ("rd", "road"),
    ("n", "north"),
    ("s", "south"),
    ("e", "east"),
    ("w", "west"),
    ("ste", "suite"),
];

/// One address abbreviation rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbbreviationRule {
    /// Lowercase token to match at word boundaries
    pub token: String,
    /// Replacement text
    pub expansion: String,
}

impl AbbreviationRule {
    pub fn new(token: impl Into<String>, expansion: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            expansion: expansion.into(),
        }
    }
}

/// The built-in abbreviation table as owned rules
pub fn default_abbreviation_rules() -> Vec<AbbreviationRule> {
    DEFAULT_ABBREVIATIONS
        .iter()
        .map(|(token, expansion)| AbbreviationRule::new(*token, *expansion))
        .collect()
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    /// Name similarity thresholds
    pub thresholds: ThresholdConfig,
    /// Candidate grouping keys
    pub grouping: GroupingConfig,
    /// Survivor selection options
    pub resolution: ResolutionConfig,
    /// Address normalization rules
    pub normalizer: NormalizerConfig,
}

/// Name similarity thresholds (exclusive lower bounds)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Pairs sharing an address key match when name similarity exceeds this
    pub address_name_similarity: f64,
    /// Pairs found only by the name scan match when similarity exceeds this
    pub name_only_similarity: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            address_name_similarity: 0.5,
            name_only_similarity: 0.85,
        }
    }
}

/// Candidate grouping parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupingConfig {
    /// Minimum digits for a phone number to form a group
    pub min_phone_digits: usize,
    /// Characters of the normalized address used in the address key
    pub address_key_chars: usize,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            min_phone_digits: 10,
            address_key_chars: 50,
        }
    }
}

/// Survivor selection options
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolutionConfig {
    /// Union pairwise findings into clusters and keep one record per cluster
    pub cluster_findings: bool,
    /// Strip diacritics from names before scoring similarity
    pub fold_name_diacritics: bool,
}

/// Address normalization rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    pub abbreviations: Vec<AbbreviationRule>,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            abbreviations: default_abbreviation_rules(),
        }
    }
}

impl DedupConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a JSON string
    pub fn from_json(json_str: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json_str)?)
    }

    /// Serialize configuration to JSON
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize configuration to TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let thresholds = [
            (
                "address_name_similarity",
                self.thresholds.address_name_similarity,
            ),
            ("name_only_similarity", self.thresholds.name_only_similarity),
        ];
        for (name, value) in thresholds {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::OutOfRange(format!(
                    "{name} must be between 0.0 and 1.0"
                )));
            }
        }

        if self.grouping.min_phone_digits == 0 {
            return Err(ConfigError::OutOfRange(
                "min_phone_digits must be positive".to_string(),
            ));
        }

        if self.grouping.address_key_chars == 0 {
            return Err(ConfigError::OutOfRange(
                "address_key_chars must be positive".to_string(),
            ));
        }

        for rule in &self.normalizer.abbreviations {
            if rule.token.is_empty() || rule.token.chars().any(char::is_whitespace) {
                return Err(ConfigError::InvalidRule {
                    token: rule.token.clone(),
                    message: "token must be a single non-empty word".to_string(),
                });
            }
            if rule.expansion.trim().is_empty() {
                return Err(ConfigError::InvalidRule {
                    token: rule.token.clone(),
                    message: "expansion must not be empty".to_string(),
                });
            }
        }

        Ok(())
    }
}
