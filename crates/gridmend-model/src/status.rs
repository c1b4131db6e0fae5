//! Type-safe cell annotation statuses and correction suggestions.
//!
//! Producers report statuses as free-form string codes; `ValidationStatus`
//! is the closed enum those codes parse into.

use serde::{Deserialize, Serialize};

/// Validation status of a single cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    /// Untouched / no opinion recorded.
    #[default]
    Normal,
    /// Explicitly checked and found valid.
    Valid,
    /// Failed validation.
    Invalid,
    /// Failed validation, but a correction suggestion exists.
    Correctable,
    /// Suspicious but not blocking.
    Warning,
    /// The whole containing row failed validation.
    InvalidRow,
}

impl ValidationStatus {
    /// Parse a producer status code (case-insensitive, surrounding
    /// whitespace ignored). An empty code counts as `Normal`.
    pub fn parse_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "" | "normal" | "ok" => Some(Self::Normal),
            "valid" | "passed" => Some(Self::Valid),
            "invalid" | "error" => Some(Self::Invalid),
            "correctable" => Some(Self::Correctable),
            "warning" | "warn" => Some(Self::Warning),
            "invalid_row" | "invalid-row" => Some(Self::InvalidRow),
            _ => None,
        }
    }

    /// Whether this status may carry `error_details`.
    pub fn carries_error(self) -> bool {
        matches!(self, Self::Invalid | Self::InvalidRow | Self::Warning)
    }

    /// Whether this status means "nothing wrong with the cell".
    pub fn is_fine(self) -> bool {
        matches!(self, Self::Normal | Self::Valid)
    }
}

/// A single candidate correction for a cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    /// The value the corrector proposes to write into the cell.
    pub corrected_value: String,
    /// Corrector confidence in `[0, 1]`, when reported.
    pub confidence: Option<f64>,
    /// Identifier of the correction rule that produced this suggestion.
    pub rule_id: Option<String>,
}

impl Suggestion {
    pub fn new(corrected_value: impl Into<String>) -> Self {
        Self {
            corrected_value: corrected_value.into(),
            confidence: None,
            rule_id: None,
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn with_rule_id(mut self, rule_id: impl Into<String>) -> Self {
        self.rule_id = Some(rule_id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_code_case_insensitive() {
        assert_eq!(
            ValidationStatus::parse_code("INVALID"),
            Some(ValidationStatus::Invalid)
        );
        assert_eq!(
            ValidationStatus::parse_code("  warn "),
            Some(ValidationStatus::Warning)
        );
        assert_eq!(
            ValidationStatus::parse_code("invalid-row"),
            Some(ValidationStatus::InvalidRow)
        );
    }

    #[test]
    fn test_parse_code_empty_is_normal() {
        assert_eq!(
            ValidationStatus::parse_code(""),
            Some(ValidationStatus::Normal)
        );
        assert_eq!(
            ValidationStatus::parse_code("   "),
            Some(ValidationStatus::Normal)
        );
    }

    #[test]
    fn test_parse_code_unknown() {
        assert_eq!(ValidationStatus::parse_code("banana"), None);
    }

    #[test]
    fn test_carries_error() {
        assert!(ValidationStatus::Invalid.carries_error());
        assert!(ValidationStatus::InvalidRow.carries_error());
        assert!(ValidationStatus::Warning.carries_error());
        assert!(!ValidationStatus::Valid.carries_error());
        assert!(!ValidationStatus::Correctable.carries_error());
    }

    #[test]
    fn test_is_fine() {
        assert!(ValidationStatus::Normal.is_fine());
        assert!(ValidationStatus::Valid.is_fine());
        assert!(!ValidationStatus::Correctable.is_fine());
        assert!(!ValidationStatus::Invalid.is_fine());
    }

    #[test]
    fn test_suggestion_builder() {
        let suggestion = Suggestion::new("John Smith")
            .with_confidence(0.9)
            .with_rule_id("name-lookup");
        assert_eq!(suggestion.corrected_value, "John Smith");
        assert_eq!(suggestion.confidence, Some(0.9));
        assert_eq!(suggestion.rule_id.as_deref(), Some("name-lookup"));
    }
}
