#![forbid(unsafe_code)]

//! Core reactive primitives for Formwork presentation models.

pub mod error;
pub mod property;
pub mod validator;

pub use error::{FormworkError, Result, ValidationError};
pub use property::{
    ChangeListener, ConditionalChangeListener, EditableProperty, GroupMember, GroupSnapshot,
    InternalSetter, ListenerRef, ListenerSet, Properties, PropertiesSnapshot, Property,
    PropertyGroup, PropertyListener, PropertyMember, UpdateListener, WritableProperty,
};
pub use validator::{ValidationResult, ValidationState, Validator};
