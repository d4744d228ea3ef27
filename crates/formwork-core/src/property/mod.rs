#![forbid(unsafe_code)]

//! Observable properties for presentation models.
//!
//! This module provides the reactive cells a presentation model is built
//! from, layered by capability:
//!
//! - [`Property`]: read-only from the outside; its creator may keep an
//!   [`InternalSetter`] for derived values.
//! - [`WritableProperty`]: adds a public `set_value`.
//! - [`EditableProperty`]: adds a validator chain, user-entered values and
//!   forced re-validation.
//! - [`Properties`]: an ordered composite that proxies bulk operations and
//!   takes snapshots.
//! - [`PropertyGroup`]: the same over members of different value types, so
//!   one snapshot covers a whole form.
//! - [`ConditionalChangeListener`]: a listener gated on a condition property.
//!
//! # Architecture
//!
//! Every property is an `Rc` handle to a single-threaded cell holding the
//! value, a version counter and a [`ListenerSet`]. Each layer wraps the one
//! below it and dereferences to it, so an `EditableProperty<T>` can be used
//! anywhere a `&Property<T>` is expected.
//!
//! # Invariants
//!
//! 1. Listeners are notified synchronously, in registration order, inside
//!    the call that changed the value.
//! 2. Setting a value equal to the current value is not a change: no version
//!    bump and no change notification. Update listeners still fire.
//! 3. Re-entrant sets from inside a listener are allowed; mutual updates
//!    settle through rule 2.
//! 4. Validation outcomes are state (`has_error`, `failure_message`), never
//!    errors returned to the caller.

mod base;
mod conditional;
mod editable;
mod group;
mod listener;
mod properties;
mod writable;

pub use base::{InternalSetter, Property, WeakProperty};
pub use conditional::ConditionalChangeListener;
pub use editable::{EditableProperty, WeakEditableProperty};
pub use group::{GroupMember, GroupSnapshot, PropertyGroup};
pub use listener::{ChangeListener, ListenerRef, ListenerSet, PropertyListener, UpdateListener};
pub use properties::{Properties, PropertiesSnapshot, PropertyMember};
pub use writable::{WeakWritableProperty, WritableProperty};
