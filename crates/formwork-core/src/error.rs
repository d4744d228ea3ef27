#![forbid(unsafe_code)]

//! Error taxonomy shared by every Formwork crate.
//!
//! Construction-time misuse and registry misuse surface as [`FormworkError`]
//! values returned from the offending call. Validation failures are *not*
//! errors in this sense: validators produce a [`ValidationError`] which is
//! stored as observable field state (`has_error` / `failure_message`) so that
//! views can render it.
//!
//! # Failure Modes
//!
//! | Variant | Raised by | Caller action |
//! |---------|-----------|---------------|
//! | `InvalidParameters` | node constructors | fix the argument shape |
//! | `InvalidControlModel` | `ControlAdaptor::set_presentation_node` | bind the right node type |
//! | `DuplicateService` | `ServiceRegistry::register_service` | deregister first |
//! | `UndefinedInstance` | `ServiceRegistry::register_service` | pass an instance |
//! | `NotRegistered` | `ServiceRegistry::get_service` | register or alias the name |
//! | `ServiceTypeMismatch` | `ServiceRegistry::get_service_as` | request the registered type |

use thiserror::Error;

/// Result alias used across Formwork.
pub type Result<T, E = FormworkError> = std::result::Result<T, E>;

/// Errors raised synchronously by Formwork operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormworkError {
    /// A constructor or method received an argument of the wrong shape.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// A control adaptor was bound to a presentation node it cannot drive.
    #[error("{control} can only be bound to a {expected}")]
    InvalidControlModel {
        control: &'static str,
        expected: &'static str,
    },

    /// A service name was registered twice.
    #[error("Service: {0} has already been registered.")]
    DuplicateService(String),

    /// A registration was attempted without an instance.
    #[error("The service instance is undefined.")]
    UndefinedInstance,

    /// No service (and no alias factory) exists for the name.
    #[error("Service: {0} has not been registered and no alias could be resolved.")]
    NotRegistered(String),

    /// The service exists but is not of the requested concrete type.
    #[error("Service: {name} is not a {expected}.")]
    ServiceTypeMismatch { name: String, expected: &'static str },
}

/// A failed validation, carried as field state rather than returned as an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    /// Create a validation failure with a user-facing message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The user-facing failure message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}
