#![forbid(unsafe_code)]

//! Property with a validator chain and user-input semantics.
//!
//! # Invariants
//!
//! 1. Validators run in registration order; the first failure wins and its
//!    message becomes the failure message.
//! 2. `has_error` / `failure_message` reflect only the most recent
//!    validation pass.
//! 3. Rejected user input never reaches the stored value, but update
//!    listeners still hear about it.
//! 4. Validation never returns an error to the caller; the outcome is state.

use std::cell::RefCell;
use std::fmt;
use std::ops::Deref;
use std::rc::{Rc, Weak};

use super::writable::{WeakWritableProperty, WritableProperty};
use crate::validator::{ValidationResult, ValidationState, Validator};

type ValidationCallback = Rc<dyn Fn(&ValidationState)>;

struct Editor<T> {
    validators: RefCell<Vec<Rc<dyn Validator<T>>>>,
    state: RefCell<ValidationState>,
    on_validated: RefCell<Vec<ValidationCallback>>,
}

/// A [`WritableProperty`] whose user-entered values pass through validators.
///
/// Dereferences to [`WritableProperty`], and from there to
/// [`Property`](super::Property).
pub struct EditableProperty<T> {
    writable: WritableProperty<T>,
    editor: Rc<Editor<T>>,
}

impl<T> Clone for EditableProperty<T> {
    fn clone(&self) -> Self {
        Self {
            writable: self.writable.clone(),
            editor: Rc::clone(&self.editor),
        }
    }
}

impl<T: Clone + PartialEq + 'static> EditableProperty<T> {
    /// Create an editable property with no validators.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            writable: WritableProperty::new(value),
            editor: Rc::new(Editor {
                validators: RefCell::new(Vec::new()),
                state: RefCell::new(ValidationState::valid()),
                on_validated: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Append a validator to the chain.
    pub fn add_validator(&self, validator: Rc<dyn Validator<T>>) {
        self.editor.validators.borrow_mut().push(validator);
    }

    /// Number of validators in the chain.
    #[must_use]
    pub fn validator_count(&self) -> usize {
        self.editor.validators.borrow().len()
    }

    /// Apply a value as if the user had typed it.
    ///
    /// The value is stored only if every validator accepts it. Either way
    /// the validation state is updated and validation listeners are told.
    /// A rejected value still produces an update notification (no change
    /// notification) so views can resync their raw text.
    pub fn set_user_entered_value(&self, value: T) {
        let result = self.run_validators(&value);
        let accepted = result.is_ok();
        self.record(result);
        if accepted {
            self.writable.set_value(value);
        } else {
            tracing::trace!(
                failure = self.editor.state.borrow().failure_message().unwrap_or_default(),
                "user-entered value rejected"
            );
            self.writable.as_property().notify_updated();
        }
    }

    /// Set the value programmatically, then re-validate it.
    ///
    /// Unlike [`set_user_entered_value`](Self::set_user_entered_value) the
    /// value is stored even when validation fails.
    pub fn set_value(&self, value: T) -> bool {
        let result = self.run_validators(&value);
        self.record(result);
        self.writable.set_value(value)
    }

    /// Re-run validators against the current value without changing it.
    pub fn force_validation(&self) {
        let current = self.writable.value();
        let result = self.run_validators(&current);
        self.record(result);
    }

    /// Whether the last validation failed.
    #[must_use]
    pub fn has_error(&self) -> bool {
        self.editor.state.borrow().has_error()
    }

    /// Failure message from the last validation, if it failed.
    #[must_use]
    pub fn failure_message(&self) -> Option<String> {
        self.editor
            .state
            .borrow()
            .failure_message()
            .map(str::to_owned)
    }

    /// Snapshot of the last validation outcome.
    #[must_use]
    pub fn validation_state(&self) -> ValidationState {
        self.editor.state.borrow().clone()
    }

    /// Invoke `callback` after every validation pass.
    pub fn add_validation_listener(&self, callback: impl Fn(&ValidationState) + 'static) {
        self.editor
            .on_validated
            .borrow_mut()
            .push(Rc::new(callback));
    }

    /// The writable view of this property.
    #[must_use]
    pub fn as_writable(&self) -> &WritableProperty<T> {
        &self.writable
    }

    /// Weak handle that does not keep the property alive.
    #[must_use]
    pub fn downgrade(&self) -> WeakEditableProperty<T> {
        WeakEditableProperty {
            writable: self.writable.downgrade(),
            editor: Rc::downgrade(&self.editor),
        }
    }

    fn run_validators(&self, value: &T) -> ValidationResult {
        let validators: Vec<Rc<dyn Validator<T>>> = self.editor.validators.borrow().clone();
        validators
            .iter()
            .try_for_each(|validator| validator.validate(value))
    }

    fn record(&self, result: ValidationResult) {
        let state = ValidationState::from(result);
        *self.editor.state.borrow_mut() = state.clone();
        let callbacks: Vec<ValidationCallback> = self.editor.on_validated.borrow().clone();
        for callback in &callbacks {
            callback(&state);
        }
    }
}

impl<T> Deref for EditableProperty<T> {
    type Target = WritableProperty<T>;

    fn deref(&self) -> &WritableProperty<T> {
        &self.writable
    }
}

impl<T: fmt::Debug> fmt::Debug for EditableProperty<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditableProperty")
            .field("value", &self.writable)
            .field("validators", &self.editor.validators.borrow().len())
            .field("state", &*self.editor.state.borrow())
            .finish()
    }
}

/// Non-owning handle to an [`EditableProperty`].
pub struct WeakEditableProperty<T> {
    writable: WeakWritableProperty<T>,
    editor: Weak<Editor<T>>,
}

impl<T> Clone for WeakEditableProperty<T> {
    fn clone(&self) -> Self {
        Self {
            writable: self.writable.clone(),
            editor: Weak::clone(&self.editor),
        }
    }
}

impl<T> WeakEditableProperty<T> {
    /// Recover a strong handle if the property is still alive.
    #[must_use]
    pub fn upgrade(&self) -> Option<EditableProperty<T>> {
        Some(EditableProperty {
            writable: self.writable.upgrade()?,
            editor: self.editor.upgrade()?,
        })
    }
}

impl<T> fmt::Debug for WeakEditableProperty<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakEditableProperty")
            .field("alive", &(self.editor.strong_count() > 0))
            .finish()
    }
}
