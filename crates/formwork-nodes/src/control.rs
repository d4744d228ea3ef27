#![forbid(unsafe_code)]

//! Bridging presentation nodes to view widgets.
//!
//! A [`ControlAdaptor`] is bound to a view element and a presentation node,
//! keeps the element in step with the node and turns user input back into
//! node updates. Rendering is left to the host; [`AutoCompleteControl`] is a
//! headless adaptor that drives any [`TextElement`].
//!
//! # Failure Modes
//!
//! | Call | Error | Cause |
//! |------|-------|-------|
//! | `set_presentation_node` | `InvalidControlModel` | node of the wrong type |
//! | `set_options` / `AutoCompleteOptions::from_map` | `InvalidParameters` | unparsable number |
//! | `AutoCompleteOptions::from_json` | `InvalidParameters` | malformed JSON options |

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde::Deserialize;

use formwork_core::error::{FormworkError, Result};
use formwork_core::property::{ListenerRef, UpdateListener};

use crate::autocomplete::AutoCompleteSelectionField;
use crate::node::PresentationNode;

// ---------------------------------------------------------------------------
// Contract
// ---------------------------------------------------------------------------

/// A text-bearing view element.
pub trait TextElement {
    /// Current text.
    fn text(&self) -> String;

    /// Replace the text.
    fn set_text(&self, text: &str);
}

impl TextElement for RefCell<String> {
    fn text(&self) -> String {
        self.borrow().clone()
    }

    fn set_text(&self, text: &str) {
        let mut current = self.borrow_mut();
        current.clear();
        current.push_str(text);
    }
}

/// Binds a presentation node to a view element.
pub trait ControlAdaptor {
    /// The view element this control drives.
    type Element;

    /// Attach the view element.
    fn set_element(&mut self, element: Self::Element);

    /// Bind the node this control presents.
    ///
    /// # Errors
    ///
    /// `InvalidControlModel` if the control cannot present `node`.
    fn set_presentation_node(&mut self, node: &dyn PresentationNode) -> Result<()>;

    /// Called once the surrounding view has been attached.
    fn on_view_ready(&mut self) {}

    /// Apply control options supplied by a template binding.
    ///
    /// # Errors
    ///
    /// `InvalidParameters` if an option value cannot be parsed.
    fn set_options(&mut self, _options: &BTreeMap<String, String>) -> Result<()> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Behaviour switches for [`AutoCompleteControl`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AutoCompleteOptions {
    /// Offer suggestions as soon as the element gains focus.
    pub open_on_focus: bool,
    /// Where the host should attach the suggestion menu.
    pub append_to: String,
    /// Minimum term length before suggestions are fetched.
    pub min_char_amount: usize,
    /// Drop focus after a suggestion is picked with the mouse.
    pub blur_after_click: bool,
}

impl Default for AutoCompleteOptions {
    fn default() -> Self {
        Self {
            open_on_focus: false,
            append_to: "body".to_owned(),
            min_char_amount: 0,
            blur_after_click: false,
        }
    }
}

impl AutoCompleteOptions {
    /// Parse options from a JSON object; missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// `InvalidParameters` if the value is not a matching object.
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value)
            .map_err(|err| FormworkError::InvalidParameters(format!("autocomplete options: {err}")))
    }

    /// Parse options from the string map a template binding supplies.
    ///
    /// # Errors
    ///
    /// `InvalidParameters` if `minCharAmount` is not a number.
    pub fn from_map(options: &BTreeMap<String, String>) -> Result<Self> {
        let mut parsed = Self::default();
        parsed.apply_map(options)?;
        Ok(parsed)
    }

    /// Overwrite the options present in `options`, leaving the rest alone.
    ///
    /// Any `openOnFocus` other than `"false"` enables it; `blurAfterClick`
    /// is enabled only by `"true"`. Unknown keys are ignored.
    ///
    /// # Errors
    ///
    /// `InvalidParameters` if `minCharAmount` is not a number.
    pub fn apply_map(&mut self, options: &BTreeMap<String, String>) -> Result<()> {
        if let Some(open) = options.get("openOnFocus") {
            self.open_on_focus = open != "false";
        }
        if let Some(append_to) = options.get("appendTo") {
            self.append_to.clone_from(append_to);
        }
        if let Some(amount) = options.get("minCharAmount") {
            self.min_char_amount = amount.trim().parse().map_err(|_| {
                FormworkError::InvalidParameters(format!("minCharAmount is not a number: {amount}"))
            })?;
        }
        if let Some(blur) = options.get("blurAfterClick") {
            self.blur_after_click = blur == "true";
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// AutoCompleteControl
// ---------------------------------------------------------------------------

type ElementSlot<E> = Rc<RefCell<Option<Rc<E>>>>;

/// Headless autocomplete control for an [`AutoCompleteSelectionField`].
///
/// The element text follows every update of the node's value. Suggestions
/// are fetched through [`search`](Self::search) and typed or picked text is
/// written back through [`commit_input`](Self::commit_input).
pub struct AutoCompleteControl<E> {
    element: ElementSlot<E>,
    node: Option<AutoCompleteSelectionField>,
    sync: Option<ListenerRef>,
    options: AutoCompleteOptions,
    view_ready: bool,
}

impl<E: TextElement + 'static> AutoCompleteControl<E> {
    /// Unbound control with default options.
    #[must_use]
    pub fn new() -> Self {
        Self {
            element: Rc::new(RefCell::new(None)),
            node: None,
            sync: None,
            options: AutoCompleteOptions::default(),
            view_ready: false,
        }
    }

    /// Replace the options wholesale.
    pub fn configure(&mut self, options: AutoCompleteOptions) {
        self.options = options;
    }

    #[must_use]
    pub fn options(&self) -> &AutoCompleteOptions {
        &self.options
    }

    /// The bound node, if any.
    #[must_use]
    pub fn node(&self) -> Option<&AutoCompleteSelectionField> {
        self.node.as_ref()
    }

    #[must_use]
    pub fn is_view_ready(&self) -> bool {
        self.view_ready
    }

    /// Suggestions for `term`; empty while unbound or while `term` is
    /// shorter than `min_char_amount`.
    pub fn search(&self, term: &str) -> Vec<String> {
        let Some(node) = &self.node else {
            return Vec::new();
        };
        if term.chars().count() < self.options.min_char_amount {
            return Vec::new();
        }
        node.auto_complete_list(term)
    }

    /// Suggestions to show when the element gains focus, if `open_on_focus`
    /// is set.
    pub fn on_focus(&self) -> Option<Vec<String>> {
        if !self.options.open_on_focus {
            return None;
        }
        let term = self.element_text().unwrap_or_default();
        Some(self.search(&term))
    }

    /// Commit user input: `text` if it is a current suggestion, otherwise the
    /// `picked` suggestion if there is one.
    ///
    /// Returns whether the node's value was written.
    pub fn commit_input(&self, text: &str, picked: Option<&str>) -> bool {
        let Some(node) = &self.node else {
            return false;
        };
        let committed = if node.is_valid_option(text) {
            text
        } else if let Some(picked) = picked {
            picked
        } else {
            return false;
        };
        node.value.set_value(Some(committed.to_owned()));
        if let Some(element) = self.element() {
            element.set_text(committed);
        }
        true
    }

    /// Whether a mouse pick should remove focus from the element.
    #[must_use]
    pub fn should_blur_after_click(&self) -> bool {
        self.options.blur_after_click
    }

    fn element(&self) -> Option<Rc<E>> {
        self.element.borrow().clone()
    }

    fn element_text(&self) -> Option<String> {
        self.element().map(|element| element.text())
    }

    fn sync_element(&self) {
        if let (Some(node), Some(element)) = (&self.node, self.element()) {
            element.set_text(&node.value.value().unwrap_or_default());
        }
    }

    fn detach(&mut self) {
        if let (Some(node), Some(sync)) = (self.node.take(), self.sync.take()) {
            node.value.remove_listener(&sync);
        }
    }
}

impl<E: TextElement + 'static> ControlAdaptor for AutoCompleteControl<E> {
    type Element = Rc<E>;

    fn set_element(&mut self, element: Rc<E>) {
        *self.element.borrow_mut() = Some(element);
        self.sync_element();
    }

    fn set_presentation_node(&mut self, node: &dyn PresentationNode) -> Result<()> {
        let Some(field) = node.as_any().downcast_ref::<AutoCompleteSelectionField>() else {
            return Err(FormworkError::InvalidControlModel {
                control: "AutoCompleteControl",
                expected: "AutoCompleteSelectionField",
            });
        };
        self.detach();

        let slot = Rc::clone(&self.element);
        let weak_value = field.value.downgrade();
        let sync: ListenerRef = Rc::new(UpdateListener::new(move || {
            let element = slot.borrow().clone();
            if let (Some(element), Some(value)) = (element, weak_value.upgrade()) {
                element.set_text(&value.value().unwrap_or_default());
            }
        }));
        field.value.add_listener(Rc::clone(&sync), false);

        self.node = Some(field.clone());
        self.sync = Some(sync);
        self.sync_element();
        Ok(())
    }

    fn on_view_ready(&mut self) {
        self.view_ready = true;
        self.sync_element();
        tracing::trace!(
            min_char_amount = self.options.min_char_amount,
            open_on_focus = self.options.open_on_focus,
            "autocomplete control ready"
        );
    }

    fn set_options(&mut self, options: &BTreeMap<String, String>) -> Result<()> {
        self.options.apply_map(options)
    }
}

impl<E: TextElement + 'static> Default for AutoCompleteControl<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Drop for AutoCompleteControl<E> {
    fn drop(&mut self) {
        if let (Some(node), Some(sync)) = (&self.node, &self.sync) {
            node.value.remove_listener(sync);
        }
    }
}

impl<E> fmt::Debug for AutoCompleteControl<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutoCompleteControl")
            .field("bound", &self.node.is_some())
            .field("options", &self.options)
            .field("view_ready", &self.view_ready)
            .finish_non_exhaustive()
    }
}
