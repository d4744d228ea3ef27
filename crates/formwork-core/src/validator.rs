#![forbid(unsafe_code)]

//! Validation capability consumed by [`EditableProperty`].
//!
//! A validator is a predicate over a candidate value. It may hold shared
//! state (for example a live option list) but must evaluate against that
//! state as it is at validation time.
//!
//! Any `Fn(&T) -> ValidationResult` closure is a validator.
//!
//! [`EditableProperty`]: crate::property::EditableProperty

use crate::error::ValidationError;

/// Outcome of a single validation.
pub type ValidationResult = Result<(), ValidationError>;

/// Validates candidate values of type `T`.
pub trait Validator<T> {
    /// Check `value`, returning the failure message on rejection.
    fn validate(&self, value: &T) -> ValidationResult;
}

impl<T, F> Validator<T> for F
where
    F: Fn(&T) -> ValidationResult,
{
    fn validate(&self, value: &T) -> ValidationResult {
        self(value)
    }
}

/// Latest validation outcome recorded by an editable property.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationState {
    error: Option<ValidationError>,
}

impl ValidationState {
    /// State after a passing validation.
    #[must_use]
    pub fn valid() -> Self {
        Self::default()
    }

    /// State after a failing validation.
    #[must_use]
    pub fn invalid(error: ValidationError) -> Self {
        Self { error: Some(error) }
    }

    /// Whether the last validation failed.
    #[must_use]
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// Message of the failing validator, if any.
    #[must_use]
    pub fn failure_message(&self) -> Option<&str> {
        self.error.as_ref().map(ValidationError::message)
    }
}

impl From<ValidationResult> for ValidationState {
    fn from(result: ValidationResult) -> Self {
        match result {
            Ok(()) => Self::valid(),
            Err(error) => Self::invalid(error),
        }
    }
}
