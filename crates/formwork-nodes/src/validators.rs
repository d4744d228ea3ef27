#![forbid(unsafe_code)]

//! Validators that check selections against a live option list.
//!
//! Both validators hold a shared handle to the field's [`OptionsNodeList`]
//! and consult its contents at validation time, so they stay correct as the
//! options change. Each carries an "allow invalid selections" switch which
//! turns the check off without removing the validator from the chain.

use std::cell::Cell;

use formwork_core::error::ValidationError;
use formwork_core::validator::{ValidationResult, Validator};

use crate::options::OptionsNodeList;

/// Failure message for a single selection outside the options.
pub const INVALID_SELECTION_MESSAGE: &str = "The selected value is not one of the available options.";

/// Failure message for a multi-selection with entries outside the options.
pub const INVALID_MULTI_SELECTION_MESSAGE: &str =
    "One or more selected values are not among the available options.";

/// Rejects a selection that is not the value of some option.
#[derive(Debug)]
pub struct ValidSelectionValidator {
    options: OptionsNodeList,
    allow_invalid: Cell<bool>,
}

impl ValidSelectionValidator {
    /// Validate against `options`.
    #[must_use]
    pub fn new(options: OptionsNodeList) -> Self {
        Self {
            options,
            allow_invalid: Cell::new(false),
        }
    }

    /// Disable (`true`) or re-enable (`false`) the check.
    pub fn allow_invalid_selections(&self, allow: bool) {
        self.allow_invalid.set(allow);
    }

    /// Whether the check is currently disabled.
    #[must_use]
    pub fn allows_invalid_selections(&self) -> bool {
        self.allow_invalid.get()
    }
}

impl Validator<Option<String>> for ValidSelectionValidator {
    fn validate(&self, value: &Option<String>) -> ValidationResult {
        if self.allow_invalid.get() {
            return Ok(());
        }
        match value {
            Some(v) if self.options.contains_value(v) => Ok(()),
            _ => Err(ValidationError::new(INVALID_SELECTION_MESSAGE)),
        }
    }
}

/// Rejects a multi-selection containing any value not offered as an option.
#[derive(Debug)]
pub struct ValidMultiSelectionValidator {
    options: OptionsNodeList,
    allow_invalid: Cell<bool>,
}

impl ValidMultiSelectionValidator {
    /// Validate against `options`.
    #[must_use]
    pub fn new(options: OptionsNodeList) -> Self {
        Self {
            options,
            allow_invalid: Cell::new(false),
        }
    }

    /// Disable (`true`) or re-enable (`false`) the check.
    pub fn allow_invalid_selections(&self, allow: bool) {
        self.allow_invalid.set(allow);
    }

    /// Whether the check is currently disabled.
    #[must_use]
    pub fn allows_invalid_selections(&self) -> bool {
        self.allow_invalid.get()
    }
}

impl Validator<Vec<String>> for ValidMultiSelectionValidator {
    fn validate(&self, values: &Vec<String>) -> ValidationResult {
        if self.allow_invalid.get() {
            return Ok(());
        }
        let available = self.options.option_values();
        if values.iter().all(|v| available.contains(v)) {
            Ok(())
        } else {
            Err(ValidationError::new(INVALID_MULTI_SELECTION_MESSAGE))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_selection_must_be_an_option() {
        let options = OptionsNodeList::new(["a", "b"]);
        let v = ValidSelectionValidator::new(options);
        assert!(v.validate(&Some("a".into())).is_ok());
        let err = v.validate(&Some("z".into())).unwrap_err();
        assert_eq!(err.message(), INVALID_SELECTION_MESSAGE);
        assert!(v.validate(&None).is_err());
    }

    #[test]
    fn single_selection_sees_option_changes() {
        let options = OptionsNodeList::new(["a"]);
        let v = ValidSelectionValidator::new(options.clone());
        assert!(v.validate(&Some("b".into())).is_err());
        options.set_options(["a", "b"]);
        assert!(v.validate(&Some("b".into())).is_ok());
    }

    #[test]
    fn allow_invalid_disables_check() {
        let v = ValidSelectionValidator::new(OptionsNodeList::empty());
        v.allow_invalid_selections(true);
        assert!(v.allows_invalid_selections());
        assert!(v.validate(&Some("anything".into())).is_ok());
        v.allow_invalid_selections(false);
        assert!(v.validate(&Some("anything".into())).is_err());
    }

    #[test]
    fn multi_selection_requires_every_entry() {
        let v = ValidMultiSelectionValidator::new(OptionsNodeList::new(["a", "b", "c"]));
        assert!(v.validate(&vec![]).is_ok());
        assert!(v.validate(&vec!["a".into(), "c".into()]).is_ok());
        let err = v.validate(&vec!["a".into(), "x".into()]).unwrap_err();
        assert_eq!(err.message(), INVALID_MULTI_SELECTION_MESSAGE);

        v.allow_invalid_selections(true);
        assert!(v.validate(&vec!["x".into()]).is_ok());
    }
}
