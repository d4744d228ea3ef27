#![forbid(unsafe_code)]

//! Selection field whose options are suggestions fetched on demand.

use std::any::Any;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

use formwork_core::property::EditableProperty;

use crate::node::PresentationNode;
use crate::options::OptionsNodeList;
use crate::selection::SelectionField;

/// Computes suggestions for a search term.
pub type SuggestionProvider = Rc<dyn Fn(&str) -> Vec<String>>;

/// A [`SelectionField`] that accepts free text and offers suggestions.
///
/// Invalid selections are allowed from construction, so typed text that
/// matches no suggestion is stored without raising an error.
#[derive(Clone)]
pub struct AutoCompleteSelectionField {
    field: SelectionField,
    provider: SuggestionProvider,
}

impl AutoCompleteSelectionField {
    /// Field with no initial value.
    pub fn new(provider: impl Fn(&str) -> Vec<String> + 'static) -> Self {
        Self::build(None, Rc::new(provider))
    }

    /// Field with an initial value.
    pub fn with_value(
        value: impl Into<String>,
        provider: impl Fn(&str) -> Vec<String> + 'static,
    ) -> Self {
        Self::build(Some(value.into()), Rc::new(provider))
    }

    fn build(value: Option<String>, provider: SuggestionProvider) -> Self {
        let field = SelectionField::build(
            OptionsNodeList::empty(),
            EditableProperty::new(value.clone()),
            value,
            true,
        );
        Self { field, provider }
    }

    /// Ask the provider for suggestions matching `term`, publish them as the
    /// field's options and return them.
    pub fn auto_complete_list(&self, term: &str) -> Vec<String> {
        let suggestions = (self.provider)(term);
        tracing::trace!(term, count = suggestions.len(), "suggestions fetched");
        self.field.options.set_options(suggestions.clone());
        suggestions
    }

    /// Whether `text` is one of the current suggestions.
    #[must_use]
    pub fn is_valid_option(&self, text: &str) -> bool {
        self.field.options.contains_value(text)
    }

    /// The wrapped selection field.
    #[must_use]
    pub fn as_selection_field(&self) -> &SelectionField {
        &self.field
    }
}

impl Deref for AutoCompleteSelectionField {
    type Target = SelectionField;

    fn deref(&self) -> &SelectionField {
        &self.field
    }
}

impl PresentationNode for AutoCompleteSelectionField {
    fn node_type(&self) -> &'static str {
        "AutoCompleteSelectionField"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl fmt::Debug for AutoCompleteSelectionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutoCompleteSelectionField")
            .field("field", &self.field)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cities() -> AutoCompleteSelectionField {
        AutoCompleteSelectionField::new(|term| {
            ["London", "Lisbon", "Madrid", "Milan"]
                .iter()
                .filter(|city| city.to_lowercase().starts_with(&term.to_lowercase()))
                .map(|city| (*city).to_owned())
                .collect()
        })
    }

    #[test]
    fn free_text_is_not_an_error() {
        let field = cities();
        assert!(!field.has_error.value());
        field.value.set_user_entered_value(Some("Atlantis".into()));
        assert_eq!(field.value.value().as_deref(), Some("Atlantis"));
        assert!(!field.has_error.value());
    }

    #[test]
    fn suggestions_become_options() {
        let field = cities();
        let found = field.auto_complete_list("l");
        assert_eq!(found, vec!["London", "Lisbon"]);
        assert_eq!(field.options.option_values(), found);
        assert!(field.is_valid_option("Lisbon"));
        assert!(!field.is_valid_option("Madrid"));

        field.auto_complete_list("m");
        assert!(field.is_valid_option("Madrid"));
        assert!(!field.is_valid_option("London"));
    }

    #[test]
    fn picking_a_suggestion_updates_label() {
        let field = cities();
        field.auto_complete_list("mi");
        field.value.set_user_entered_value(Some("Milan".into()));
        assert_eq!(field.selected_option_label.value(), "Milan");
    }

    #[test]
    fn initial_value_is_kept() {
        let field = AutoCompleteSelectionField::with_value("Paris", |_| Vec::new());
        assert_eq!(field.value.value().as_deref(), Some("Paris"));
        assert_eq!(field.default_value(), Some("Paris"));
        assert!(!field.has_error.value());
        assert_eq!(field.node_type(), "AutoCompleteSelectionField");
        assert_eq!(field.as_selection_field().node_type(), "SelectionField");
    }
}
