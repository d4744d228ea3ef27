#![forbid(unsafe_code)]

//! Selectable options and the observable list that holds them.

use std::any::Any;
use std::fmt;
use std::ops::Deref;

use formwork_core::property::WritableProperty;

use crate::node::{NodeList, PresentationNode, WeakNodeList};

/// One selectable option: a value and the label shown for it.
#[derive(Clone)]
pub struct OptionNode {
    /// Value stored in a field when this option is selected.
    pub value: WritableProperty<String>,
    /// Text displayed for the option.
    pub label: WritableProperty<String>,
}

impl OptionNode {
    /// Option with distinct value and label.
    #[must_use]
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: WritableProperty::new(value.into()),
            label: WritableProperty::new(label.into()),
        }
    }

    /// Option whose label is its value.
    #[must_use]
    pub fn from_value(value: impl Into<String>) -> Self {
        let value = value.into();
        Self::new(value.clone(), value)
    }
}

impl PresentationNode for OptionNode {
    fn node_type(&self) -> &'static str {
        "Option"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl From<&str> for OptionNode {
    fn from(value: &str) -> Self {
        Self::from_value(value)
    }
}

impl From<String> for OptionNode {
    fn from(value: String) -> Self {
        Self::from_value(value)
    }
}

impl From<(&str, &str)> for OptionNode {
    fn from((value, label): (&str, &str)) -> Self {
        Self::new(value, label)
    }
}

impl From<(String, String)> for OptionNode {
    fn from((value, label): (String, String)) -> Self {
        Self::new(value, label)
    }
}

impl fmt::Debug for OptionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionNode")
            .field("value", &self.value.value())
            .field("label", &self.label.value())
            .finish()
    }
}

/// Observable list of [`OptionNode`]s with lookup by value.
///
/// Dereferences to [`NodeList<OptionNode>`] for listener registration and
/// raw node access. Clones share the list.
#[derive(Clone, Debug)]
pub struct OptionsNodeList {
    list: NodeList<OptionNode>,
}

impl OptionsNodeList {
    /// Build from values (label = value) or `(value, label)` pairs.
    pub fn new<O: Into<OptionNode>>(options: impl IntoIterator<Item = O>) -> Self {
        Self {
            list: NodeList::new(options.into_iter().map(Into::into)),
        }
    }

    /// List with no options.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(Vec::<OptionNode>::new())
    }

    /// Replace every option and notify listeners.
    pub fn set_options<O: Into<OptionNode>>(&self, options: impl IntoIterator<Item = O>) {
        let nodes: Vec<OptionNode> = options.into_iter().map(Into::into).collect();
        tracing::trace!(count = nodes.len(), "options replaced");
        self.list.update_list(nodes);
    }

    /// Clone of the current options.
    #[must_use]
    pub fn options(&self) -> Vec<OptionNode> {
        self.list.nodes()
    }

    /// Current option values, in order.
    #[must_use]
    pub fn option_values(&self) -> Vec<String> {
        self.list
            .with_nodes(|nodes| nodes.iter().map(|o| o.value.value()).collect())
    }

    /// The first option whose value equals `value`.
    #[must_use]
    pub fn option_by_value(&self, value: &str) -> Option<OptionNode> {
        self.list.with_nodes(|nodes| {
            nodes
                .iter()
                .find(|o| o.value.with(|v| v == value))
                .cloned()
        })
    }

    /// Whether some option carries `value`.
    #[must_use]
    pub fn contains_value(&self, value: &str) -> bool {
        self.list
            .with_nodes(|nodes| nodes.iter().any(|o| o.value.with(|v| v == value)))
    }

    /// The first option, if any.
    #[must_use]
    pub fn first_option(&self) -> Option<OptionNode> {
        self.list.with_nodes(|nodes| nodes.first().cloned())
    }

    /// The underlying node list.
    #[must_use]
    pub fn as_node_list(&self) -> &NodeList<OptionNode> {
        &self.list
    }

    /// Non-owning handle.
    #[must_use]
    pub fn downgrade(&self) -> WeakOptionsNodeList {
        WeakOptionsNodeList {
            list: self.list.downgrade(),
        }
    }
}

impl Default for OptionsNodeList {
    fn default() -> Self {
        Self::empty()
    }
}

impl Deref for OptionsNodeList {
    type Target = NodeList<OptionNode>;

    fn deref(&self) -> &NodeList<OptionNode> {
        &self.list
    }
}

/// Non-owning handle to an [`OptionsNodeList`].
#[derive(Clone, Debug)]
pub struct WeakOptionsNodeList {
    list: WeakNodeList<OptionNode>,
}

impl WeakOptionsNodeList {
    /// Recover a strong handle if the list is still alive.
    #[must_use]
    pub fn upgrade(&self) -> Option<OptionsNodeList> {
        self.list.upgrade().map(|list| OptionsNodeList { list })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn values_double_as_labels() {
        let options = OptionsNodeList::new(["a", "b"]);
        assert_eq!(options.option_values(), vec!["a", "b"]);
        let first = options.first_option().expect("first");
        assert_eq!(first.label.value(), "a");
    }

    #[test]
    fn pairs_carry_labels() {
        let options = OptionsNodeList::new([("gb", "United Kingdom"), ("fr", "France")]);
        let fr = options.option_by_value("fr").expect("fr");
        assert_eq!(fr.label.value(), "France");
        assert!(options.option_by_value("de").is_none());
        assert!(options.contains_value("gb"));
        assert!(!options.contains_value("United Kingdom"));
    }

    #[test]
    fn empty_list_has_no_first_option() {
        let options = OptionsNodeList::empty();
        assert!(options.first_option().is_none());
        assert!(options.is_empty());
    }

    #[test]
    fn set_options_notifies() {
        let options = OptionsNodeList::new(["a"]);
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        options.add_change_listener(move || c.set(c.get() + 1), false);

        options.set_options(["x", "y", "z"]);
        assert_eq!(count.get(), 1);
        assert_eq!(options.len(), 3);
    }

    #[test]
    fn lookups_see_renamed_option_values() {
        let options = OptionsNodeList::new(["a"]);
        let a = options.first_option().expect("first");
        a.value.set_value("renamed".into());
        assert!(options.contains_value("renamed"));
        assert!(!options.contains_value("a"));
    }

    #[test]
    fn weak_handle_expires() {
        let options = OptionsNodeList::new(["a"]);
        let weak = options.downgrade();
        assert!(weak.upgrade().is_some_and(|o| o.ptr_eq(&options)));
        drop(options);
        assert!(weak.upgrade().is_none());
    }
}
