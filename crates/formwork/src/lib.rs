#![forbid(unsafe_code)]

//! Formwork: presentation models with observable, validated properties.
//!
//! This crate re-exports the layered Formwork crates:
//!
//! - [`properties`]: properties, listeners, validators and errors.
//! - [`nodes`]: option lists, selection fields and control adaptors.
//! - [`services`]: the named service registry (feature `services`, on by
//!   default).
//!
//! Most applications only need the [`prelude`].
//!
//! ```
//! use formwork::prelude::*;
//!
//! let field = SelectionField::new(OptionsNodeList::new(["gb", "fr"]));
//! field.automatically_update_value_when_options_change(true);
//! field.options.set_options(["fr", "de"]);
//! assert_eq!(field.value.value().as_deref(), Some("fr"));
//! ```

pub use formwork_core as properties;
pub use formwork_nodes as nodes;
#[cfg(feature = "services")]
pub use formwork_services as services;

pub use formwork_core::{FormworkError, Result};

/// The types most presentation models are written against.
pub mod prelude {
    pub use formwork_core::{
        ChangeListener, ConditionalChangeListener, EditableProperty, FormworkError, GroupSnapshot,
        ListenerRef, Properties, PropertiesSnapshot, Property, PropertyGroup, PropertyListener,
        PropertyMember, UpdateListener, ValidationError, ValidationResult, ValidationState,
        Validator, WritableProperty,
    };
    pub use formwork_nodes::{
        AutoCompleteControl, AutoCompleteOptions, AutoCompleteSelectionField, ControlAdaptor,
        MultiSelectionField, NodeList, OptionNode, OptionsNodeList, PresentationNode, SelectionField,
        TextElement,
    };
    #[cfg(feature = "services")]
    pub use formwork_services::{Service, ServiceHandle, ServiceRegistry, Teardown};
}
