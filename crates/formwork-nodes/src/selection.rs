#![forbid(unsafe_code)]

//! Single-choice field bound to an option list.
//!
//! # Invariants
//!
//! 1. `selected_option_label` is the label of the option whose value equals
//!    `value`, or the empty string when no option matches.
//! 2. `has_error` / `failure_message` mirror the last validation of `value`.
//! 3. With auto-update off, an options change only re-validates; the value
//!    is never rewritten behind the user's back.
//! 4. With auto-update on, a value that drops out of the options is replaced
//!    by the default value if it is still offered, else by the first option.
//!    An empty option list replaces nothing.
//!
//! # Ownership
//!
//! Listeners registered on `options` hold the value and the options weakly,
//! so a field never keeps itself alive through its own option list.

use std::any::Any;
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use formwork_core::error::Result;
use formwork_core::property::{
    EditableProperty, InternalSetter, Property, PropertyMember, WritableProperty,
};
use formwork_core::validator::Validator;

use crate::field::{FieldChrome, require_editable, track_validation};
use crate::node::PresentationNode;
use crate::options::{OptionNode, OptionsNodeList};
use crate::validators::ValidSelectionValidator;

/// A field whose value is one of the values in `options`.
#[derive(Clone)]
pub struct SelectionField {
    /// Caption shown next to the control.
    pub label: WritableProperty<String>,
    /// The selected option value; `None` when nothing is selected.
    pub value: EditableProperty<Option<String>>,
    /// Whether the last validation of `value` failed.
    pub has_error: WritableProperty<bool>,
    /// Message of the last failed validation.
    pub failure_message: WritableProperty<Option<String>>,
    pub enabled: WritableProperty<bool>,
    pub visible: WritableProperty<bool>,
    pub control_name: WritableProperty<String>,
    /// The options on offer. May be shared with other fields.
    pub options: OptionsNodeList,
    /// Label of the selected option, derived from `value`.
    pub selected_option_label: Property<String>,
    validator: Rc<ValidSelectionValidator>,
    auto_update: Rc<Cell<bool>>,
    default_value: Option<String>,
}

impl SelectionField {
    /// Field defaulting to the first option, or to no selection when
    /// `options` is empty.
    #[must_use]
    pub fn new(options: OptionsNodeList) -> Self {
        let default_value = options.first_option().map(|o| o.value.value());
        let value = EditableProperty::new(default_value.clone());
        Self::build(options, value, default_value, false)
    }

    /// Field with an explicit initial (and default) value.
    #[must_use]
    pub fn with_value(options: OptionsNodeList, value: impl Into<String>) -> Self {
        let default_value = Some(value.into());
        let value = EditableProperty::new(default_value.clone());
        Self::build(options, value, default_value, false)
    }

    /// Field bound to an existing property, whose current value becomes the
    /// default.
    ///
    /// # Errors
    ///
    /// [`FormworkError::InvalidParameters`](formwork_core::FormworkError::InvalidParameters)
    /// unless `value` is an [`EditableProperty`].
    pub fn with_property(
        options: OptionsNodeList,
        value: impl Into<PropertyMember<Option<String>>>,
    ) -> Result<Self> {
        let value = require_editable("SelectionField", value.into())?;
        let default_value = value.value();
        Ok(Self::build(options, value, default_value, false))
    }

    pub(crate) fn build(
        options: OptionsNodeList,
        value: EditableProperty<Option<String>>,
        default_value: Option<String>,
        allow_invalid: bool,
    ) -> Self {
        let chrome = FieldChrome::new();

        let validator = Rc::new(ValidSelectionValidator::new(options.clone()));
        validator.allow_invalid_selections(allow_invalid);
        let chained: Rc<dyn Validator<Option<String>>> = validator.clone();
        value.add_validator(chained);
        track_validation(&value, &chrome.has_error, &chrome.failure_message);
        value.force_validation();

        let (selected_option_label, label_setter) = Property::with_setter(String::new());
        let label_setter = Rc::new(label_setter);
        {
            let options = options.clone();
            let weak_value = value.downgrade();
            let setter = Rc::clone(&label_setter);
            value.add_change_listener(
                move || {
                    if let Some(value) = weak_value.upgrade() {
                        refresh_label(&options, &value.value(), &setter);
                    }
                },
                true,
            );
        }

        let auto_update = Rc::new(Cell::new(false));
        {
            let weak_value = value.downgrade();
            let weak_options = options.downgrade();
            let auto_update = Rc::clone(&auto_update);
            let default_value = default_value.clone();
            let setter = Rc::clone(&label_setter);
            options.add_change_listener(
                move || {
                    let (Some(value), Some(options)) = (weak_value.upgrade(), weak_options.upgrade())
                    else {
                        return;
                    };
                    update_on_options_change(
                        &value,
                        &options,
                        auto_update.get(),
                        default_value.as_deref(),
                    );
                    refresh_label(&options, &value.value(), &setter);
                },
                false,
            );
        }

        Self {
            label: chrome.label,
            value,
            has_error: chrome.has_error,
            failure_message: chrome.failure_message,
            enabled: chrome.enabled,
            visible: chrome.visible,
            control_name: chrome.control_name,
            options,
            selected_option_label,
            validator,
            auto_update,
            default_value,
        }
    }

    /// Accept (`true`) or reject (`false`) values that are not options, then
    /// re-validate the current value.
    pub fn allow_invalid_selections(&self, allow: bool) {
        self.validator.allow_invalid_selections(allow);
        self.value.force_validation();
    }

    /// Whether an options change may rewrite the value. Off by default.
    pub fn automatically_update_value_when_options_change(&self, enabled: bool) {
        self.auto_update.set(enabled);
    }

    #[must_use]
    pub fn updates_value_when_options_change(&self) -> bool {
        self.auto_update.get()
    }

    /// The value remembered at construction, preferred when options change.
    #[must_use]
    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    /// The option matching the current value.
    #[must_use]
    pub fn selected_option(&self) -> Option<OptionNode> {
        self.value
            .with(|value| value.as_deref().and_then(|v| self.options.option_by_value(v)))
    }
}

impl PresentationNode for SelectionField {
    fn node_type(&self) -> &'static str {
        "SelectionField"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl fmt::Debug for SelectionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionField")
            .field("value", &self.value.value())
            .field("options", &self.options.option_values())
            .field("has_error", &self.has_error.value())
            .field("auto_update", &self.auto_update.get())
            .field("default_value", &self.default_value)
            .finish_non_exhaustive()
    }
}

fn refresh_label(options: &OptionsNodeList, value: &Option<String>, setter: &InternalSetter<String>) {
    let label = value
        .as_deref()
        .and_then(|v| options.option_by_value(v))
        .map(|option| option.label.value())
        .unwrap_or_default();
    setter.set(label);
}

fn update_on_options_change(
    value: &EditableProperty<Option<String>>,
    options: &OptionsNodeList,
    auto_update: bool,
    default_value: Option<&str>,
) {
    if !auto_update {
        value.force_validation();
        return;
    }
    let values = options.option_values();
    let Some(first) = values.first() else {
        return;
    };
    let still_offered = value.with(|current| current.as_ref().is_some_and(|c| values.contains(c)));
    if still_offered {
        value.force_validation();
        return;
    }
    let replacement = match default_value {
        Some(default) if values.iter().any(|v| v == default) => default.to_owned(),
        _ => first.clone(),
    };
    tracing::trace!(replacement = %replacement, "selection replaced after options change");
    value.set_user_entered_value(Some(replacement));
}
