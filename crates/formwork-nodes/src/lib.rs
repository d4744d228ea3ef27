#![forbid(unsafe_code)]

//! Presentation nodes for Formwork.
//!
//! Nodes are the composite models a view binds to. Each exposes its state as
//! public [`formwork_core::property`] handles so controls can listen to and
//! write individual pieces.
//!
//! - [`NodeList`] / [`OptionsNodeList`]: observable node collections.
//! - [`SelectionField`] / [`MultiSelectionField`]: fields whose values are
//!   validated against a live option list.
//! - [`AutoCompleteSelectionField`]: a free-text selection with suggestions.
//! - [`ControlAdaptor`]: the contract between a node and a view widget, with
//!   the headless [`AutoCompleteControl`].

pub mod autocomplete;
pub mod control;
mod field;
pub mod multi_selection;
pub mod node;
pub mod options;
pub mod selection;
pub mod validators;

pub use autocomplete::{AutoCompleteSelectionField, SuggestionProvider};
pub use control::{AutoCompleteControl, AutoCompleteOptions, ControlAdaptor, TextElement};
pub use multi_selection::MultiSelectionField;
pub use node::{NodeList, PresentationNode, WeakNodeList};
pub use options::{OptionNode, OptionsNodeList, WeakOptionsNodeList};
pub use selection::SelectionField;
pub use validators::{ValidMultiSelectionValidator, ValidSelectionValidator};
