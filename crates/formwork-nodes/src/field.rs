#![forbid(unsafe_code)]

//! State shared by the selection field types.

use formwork_core::error::{FormworkError, Result};
use formwork_core::property::{EditableProperty, PropertyMember, WritableProperty};

/// Mirror every validation pass of `value` into the field's error properties.
pub(crate) fn track_validation<T: Clone + PartialEq + 'static>(
    value: &EditableProperty<T>,
    has_error: &WritableProperty<bool>,
    failure_message: &WritableProperty<Option<String>>,
) {
    let has_error = has_error.clone();
    let failure_message = failure_message.clone();
    value.add_validation_listener(move |state| {
        has_error.set_value(state.has_error());
        failure_message.set_value(state.failure_message().map(str::to_owned));
    });
}

/// Unwrap an editable member or reject the argument on behalf of `node`.
pub(crate) fn require_editable<T>(
    node: &'static str,
    member: PropertyMember<T>,
) -> Result<EditableProperty<T>> {
    match member {
        PropertyMember::Editable(property) => Ok(property),
        _ => Err(FormworkError::InvalidParameters(format!(
            "{node} constructor: can't pass non-editable property as parameter"
        ))),
    }
}

/// Display and enablement state common to every field.
#[derive(Clone, Debug)]
pub(crate) struct FieldChrome {
    pub(crate) label: WritableProperty<String>,
    pub(crate) has_error: WritableProperty<bool>,
    pub(crate) failure_message: WritableProperty<Option<String>>,
    pub(crate) enabled: WritableProperty<bool>,
    pub(crate) visible: WritableProperty<bool>,
    pub(crate) control_name: WritableProperty<String>,
}

impl FieldChrome {
    pub(crate) fn new() -> Self {
        Self {
            label: WritableProperty::new(String::new()),
            has_error: WritableProperty::new(false),
            failure_message: WritableProperty::new(None),
            enabled: WritableProperty::new(true),
            visible: WritableProperty::new(true),
            control_name: WritableProperty::new(String::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formwork_core::error::ValidationError;
    use formwork_core::property::Property;
    use std::rc::Rc;

    #[test]
    fn validation_mirrors_into_field_properties() {
        let value = EditableProperty::new(0);
        value.add_validator(Rc::new(|v: &i32| {
            if *v >= 0 {
                Ok(())
            } else {
                Err(ValidationError::new("negative"))
            }
        }));
        let chrome = FieldChrome::new();
        track_validation(&value, &chrome.has_error, &chrome.failure_message);

        value.set_user_entered_value(-1);
        assert!(chrome.has_error.value());
        assert_eq!(chrome.failure_message.value().as_deref(), Some("negative"));

        value.set_user_entered_value(1);
        assert!(!chrome.has_error.value());
        assert_eq!(chrome.failure_message.value(), None);
    }

    #[test]
    fn only_editable_members_are_accepted() {
        let editable = require_editable("Field", EditableProperty::new(1).into());
        assert!(editable.is_ok());

        let err = require_editable("Field", Property::new(1).into()).unwrap_err();
        assert!(matches!(err, FormworkError::InvalidParameters(_)));
        let err = require_editable("Field", WritableProperty::new(1).into()).unwrap_err();
        assert!(err.to_string().contains("non-editable"));
    }
}
