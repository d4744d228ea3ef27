#![forbid(unsafe_code)]

//! Multi-choice field bound to an option list.
//!
//! Unlike [`SelectionField`](crate::SelectionField) there is no default value
//! to fall back on: when options change with auto-update on (the default),
//! the selection shrinks to the entries that are still offered, in their
//! original order.

use std::any::Any;
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use formwork_core::error::Result;
use formwork_core::property::{EditableProperty, PropertyMember, WritableProperty};
use formwork_core::validator::Validator;

use crate::field::{FieldChrome, require_editable, track_validation};
use crate::node::PresentationNode;
use crate::options::OptionsNodeList;
use crate::validators::ValidMultiSelectionValidator;

/// A field whose value is a subset of the values in `options`.
#[derive(Clone)]
pub struct MultiSelectionField {
    pub label: WritableProperty<String>,
    /// Selected option values.
    pub value: EditableProperty<Vec<String>>,
    pub has_error: WritableProperty<bool>,
    pub failure_message: WritableProperty<Option<String>>,
    pub enabled: WritableProperty<bool>,
    pub visible: WritableProperty<bool>,
    pub control_name: WritableProperty<String>,
    pub options: OptionsNodeList,
    validator: Rc<ValidMultiSelectionValidator>,
    auto_update: Rc<Cell<bool>>,
}

impl MultiSelectionField {
    /// Field with nothing selected.
    #[must_use]
    pub fn new(options: OptionsNodeList) -> Self {
        Self::build(options, EditableProperty::new(Vec::new()))
    }

    /// Field with an initial selection.
    pub fn with_values<S: Into<String>>(
        options: OptionsNodeList,
        values: impl IntoIterator<Item = S>,
    ) -> Self {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        Self::build(options, EditableProperty::new(values))
    }

    /// Field bound to an existing property.
    ///
    /// # Errors
    ///
    /// [`FormworkError::InvalidParameters`](formwork_core::FormworkError::InvalidParameters)
    /// unless `value` is an [`EditableProperty`].
    pub fn with_property(
        options: OptionsNodeList,
        value: impl Into<PropertyMember<Vec<String>>>,
    ) -> Result<Self> {
        let value = require_editable("MultiSelectionField", value.into())?;
        Ok(Self::build(options, value))
    }

    fn build(options: OptionsNodeList, value: EditableProperty<Vec<String>>) -> Self {
        let chrome = FieldChrome::new();
        let auto_update = Rc::new(Cell::new(true));
        {
            let weak_value = value.downgrade();
            let weak_options = options.downgrade();
            let auto_update = Rc::clone(&auto_update);
            options.add_change_listener(
                move || {
                    if let (Some(value), Some(options)) = (weak_value.upgrade(), weak_options.upgrade())
                    {
                        update_on_options_change(&value, &options, auto_update.get());
                    }
                },
                false,
            );
        }

        let validator = Rc::new(ValidMultiSelectionValidator::new(options.clone()));
        let chained: Rc<dyn Validator<Vec<String>>> = validator.clone();
        value.add_validator(chained);
        track_validation(&value, &chrome.has_error, &chrome.failure_message);
        value.force_validation();

        Self {
            label: chrome.label,
            value,
            has_error: chrome.has_error,
            failure_message: chrome.failure_message,
            enabled: chrome.enabled,
            visible: chrome.visible,
            control_name: chrome.control_name,
            options,
            validator,
            auto_update,
        }
    }

    /// Accept (`true`) or reject (`false`) entries that are not options, then
    /// re-validate the current selection.
    pub fn allow_invalid_selections(&self, allow: bool) {
        self.validator.allow_invalid_selections(allow);
        self.value.force_validation();
    }

    /// Whether an options change may shrink the selection. On by default.
    pub fn automatically_update_value_when_options_change(&self, enabled: bool) {
        self.auto_update.set(enabled);
    }

    #[must_use]
    pub fn updates_value_when_options_change(&self) -> bool {
        self.auto_update.get()
    }
}

impl PresentationNode for MultiSelectionField {
    fn node_type(&self) -> &'static str {
        "MultiSelectionField"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl fmt::Debug for MultiSelectionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiSelectionField")
            .field("value", &self.value.value())
            .field("options", &self.options.option_values())
            .field("has_error", &self.has_error.value())
            .field("auto_update", &self.auto_update.get())
            .finish_non_exhaustive()
    }
}

/// Keep only the selected entries that `available` still offers.
pub(crate) fn intersect_selection(selected: &[String], available: &[String]) -> Vec<String> {
    selected
        .iter()
        .filter(|value| available.contains(value))
        .cloned()
        .collect()
}

fn update_on_options_change(
    value: &EditableProperty<Vec<String>>,
    options: &OptionsNodeList,
    auto_update: bool,
) {
    if !auto_update {
        value.force_validation();
        return;
    }
    let kept = value.with(|selected| intersect_selection(selected, &options.option_values()));
    tracing::trace!(kept = kept.len(), "selection filtered after options change");
    value.set_user_entered_value(kept);
}
