//! Validation for business records

use serde::{Deserialize, Serialize};

use super::{is_blank, Record};

/// Severity of a validation error
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationSeverity {
    Error,
    Warning,
    Info,
}

/// A validation error or warning
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub severity: ValidationSeverity,
}

/// Validate a record and return errors/warnings
pub fn validate_record(record: &Record) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    // Required fields
    if record.name.trim().is_empty() {
        errors.push(ValidationError {
            field: "name".to_string(),
            message: "Name is required".to_string(),
            severity: ValidationSeverity::Error,
        });
    }

    // Matching inputs: without these a record can only be caught by name
    if is_blank(&record.address) {
        errors.push(ValidationError {
            field: "address".to_string(),
            message: "Address is recommended".to_string(),
            severity: ValidationSeverity::Warning,
        });
    } else if !record
        .address_text()
        .starts_with(|c: char| c.is_ascii_digit())
    {
        errors.push(ValidationError {
            field: "address".to_string(),
            message: "Address has no leading street number".to_string(),
            severity: ValidationSeverity::Info,
        });
    }

    if is_blank(&record.phone) {
        errors.push(ValidationError {
            field: "phone".to_string(),
            message: "Phone is recommended".to_string(),
            severity: ValidationSeverity::Warning,
        });
    }

    if let Some(rating) = record.rating {
        if !(0.0..=5.0).contains(&rating) {
            errors.push(ValidationError {
                field: "rating".to_string(),
                message: "Rating should be between 0 and 5".to_string(),
                severity: ValidationSeverity::Warning,
            });
        }
    }

    errors
}

/// Check if a record is valid (no errors)
pub fn is_valid(record: &Record) -> bool {
    validate_record(record)
        .iter()
        .all(|e| !matches!(e.severity, ValidationSeverity::Error))
}
