// Error types for the store

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = StoreError> = std::result::Result<T, E>;

/// Everything that can go wrong inside a store operation
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to create store directory {path:?}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read store file {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Store file {path:?} is not a valid JSON array of records")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write store file {path:?}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Import payload is not a valid JSON array of records")]
    Parse(#[source] serde_json::Error),

    #[error("Failed to serialize records")]
    Serialize(#[source] serde_json::Error),

    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("Store lock poisoned by a panicking thread")]
    Poisoned,
}

impl StoreError {
    /// True when the error was raised before anything was mutated or written
    pub fn is_rejected_input(&self) -> bool {
        matches!(self, StoreError::Parse(_) | StoreError::Validation(_))
    }

    /// Fields named by a validation failure (empty for every other error)
    pub fn invalid_fields(&self) -> Vec<&'static str> {
        match self {
            StoreError::Validation(errors) => errors.fields(),
            _ => Vec::new(),
        }
    }
}

impl From<ValidationErrors> for StoreError {
    fn from(errors: ValidationErrors) -> Self {
        StoreError::Validation(errors)
    }
}

/// A constraint a field value broke
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    Required,
    MaxLength(usize),
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::Required => write!(f, "is required"),
            Constraint::MaxLength(max) => write!(f, "cannot be longer than {} characters", max),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: &'static str,
    pub constraint: Constraint,
}

/// All field violations found on one record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    violations: Vec<FieldViolation>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &'static str, constraint: Constraint) {
        self.violations.push(FieldViolation { field, constraint });
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }

    pub fn fields(&self) -> Vec<&'static str> {
        self.violations.iter().map(|v| v.field).collect()
    }

    /// Ok when nothing was collected, otherwise self as the error
    pub fn into_result(self) -> std::result::Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, violation) in self.violations.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{} {}", violation.field, violation.constraint)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_display() {
        let mut errors = ValidationErrors::new();
        errors.push("title", Constraint::Required);
        errors.push("details", Constraint::MaxLength(500));

        assert_eq!(
            errors.to_string(),
            "title is required; details cannot be longer than 500 characters"
        );
        assert_eq!(errors.fields(), vec!["title", "details"]);
    }

    #[test]
    fn test_empty_validation_errors_is_ok() {
        assert!(ValidationErrors::new().into_result().is_ok());
    }

    #[test]
    fn test_store_error_classification() {
        let mut errors = ValidationErrors::new();
        errors.push("title", Constraint::MaxLength(100));
        let err = StoreError::from(errors);

        assert!(err.is_rejected_input());
        assert_eq!(err.invalid_fields(), vec!["title"]);
        assert!(err.to_string().contains("title cannot be longer than 100 characters"));

        assert!(!StoreError::Poisoned.is_rejected_input());
        assert!(StoreError::Poisoned.invalid_fields().is_empty());
    }
}
