//! Validation error shared by the checkout components

use thiserror::Error;

/// A locally detected input problem. Validation errors never leave the
/// process; they block progression until the staff fixes the input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    /// Which input is wrong (stable key, used by the UI to highlight a field)
    pub field: String,
    /// Human-readable explanation
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Collapse a `validator` report to the first field error.
///
/// The wizard highlights one field at a time, so the first violation
/// is all the UI can show anyway.
pub fn first_violation(errors: &validator::ValidationErrors) -> ValidationError {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    for (field, violations) in fields {
        if let Some(violation) = violations.first() {
            let reason = violation
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("invalid {field}"));
            return ValidationError::new(field.to_string(), reason);
        }
    }
    ValidationError::new("form", "invalid input")
}
