#![forbid(unsafe_code)]

//! Composite over properties of different value types.
//!
//! A [`PropertyGroup`] is the whole-form counterpart of
//! [`Properties`](super::Properties): it can hold an `Option<String>`
//! selection next to `String` text fields and a `bool` flag, proxy listener
//! registration to all of them, and capture one [`GroupSnapshot`] that
//! restores every writable member.
//!
//! Members are erased behind [`GroupMember`], which is implemented for every
//! [`PropertyMember<T>`]. Bulk `set_value` needs a single value type and so
//! stays on `Properties<T>`.
//!
//! # Invariants
//!
//! 1. Members keep insertion order; adding a `Properties<T>` or another
//!    group flattens it.
//! 2. Snapshot `apply` never touches read-only members.
//! 3. An immediate listener notification is delivered once for the whole
//!    group, through the last member.

use std::fmt;
use std::rc::Rc;

use super::base::Property;
use super::editable::EditableProperty;
use super::listener::{ChangeListener, ListenerRef, UpdateListener};
use super::properties::{Properties, PropertyMember};
use super::writable::WritableProperty;

/// Type-erased view of one group member.
pub trait GroupMember {
    /// Capture the current value. Returns `None` for read-only members,
    /// which a snapshot leaves alone.
    fn capture(&self) -> Option<Box<dyn Fn()>>;

    /// Whether the member exposes a public setter.
    fn is_writable(&self) -> bool;

    /// Register `listener` on the member's property.
    fn add_listener(&self, listener: ListenerRef, notify_immediately: bool);

    /// Remove `listener` from the member's property.
    fn remove_listener(&self, listener: &ListenerRef);

    /// Remove every listener from the member's property.
    fn remove_all_listeners(&self);
}

impl<T: Clone + PartialEq + 'static> GroupMember for PropertyMember<T> {
    fn capture(&self) -> Option<Box<dyn Fn()>> {
        if !PropertyMember::is_writable(self) {
            return None;
        }
        let member = self.clone();
        let value = self.value();
        Some(Box::new(move || {
            member.set_value(value.clone());
        }))
    }

    fn is_writable(&self) -> bool {
        PropertyMember::is_writable(self)
    }

    fn add_listener(&self, listener: ListenerRef, notify_immediately: bool) {
        self.property().add_listener(listener, notify_immediately);
    }

    fn remove_listener(&self, listener: &ListenerRef) {
        self.property().remove_listener(listener);
    }

    fn remove_all_listeners(&self) {
        self.property().remove_all_listeners();
    }
}

// ---------------------------------------------------------------------------
// PropertyGroup
// ---------------------------------------------------------------------------

/// Ordered, mixed-type collection of properties treated as one form.
#[derive(Clone, Default)]
pub struct PropertyGroup {
    members: Vec<Rc<dyn GroupMember>>,
}

impl PropertyGroup {
    /// Empty group.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a property, a `Properties<T>` composite or another group.
    pub fn add(&mut self, item: impl Into<PropertyGroup>) {
        self.members.extend(item.into().members);
    }

    /// Builder form of [`add`](Self::add).
    #[must_use]
    pub fn with(mut self, item: impl Into<PropertyGroup>) -> Self {
        self.add(item);
        self
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Number of members a snapshot would restore.
    #[must_use]
    pub fn writable_count(&self) -> usize {
        self.members.iter().filter(|m| m.is_writable()).count()
    }

    /// Capture every writable member's current value.
    #[must_use]
    pub fn snapshot(&self) -> GroupSnapshot {
        GroupSnapshot {
            restores: self.members.iter().filter_map(|m| m.capture()).collect(),
        }
    }

    /// Register `listener` on every member.
    pub fn add_listener(&self, listener: ListenerRef, notify_immediately: bool) {
        let last = self.members.len().saturating_sub(1);
        for (index, member) in self.members.iter().enumerate() {
            member.add_listener(Rc::clone(&listener), notify_immediately && index == last);
        }
    }

    /// Register one change callback shared by every member.
    pub fn add_change_listener(
        &self,
        callback: impl Fn() + 'static,
        notify_immediately: bool,
    ) -> ListenerRef {
        let listener: ListenerRef = Rc::new(ChangeListener::new(callback));
        self.add_listener(Rc::clone(&listener), notify_immediately);
        listener
    }

    /// Register one update callback shared by every member.
    pub fn add_update_listener(
        &self,
        callback: impl Fn() + 'static,
        notify_immediately: bool,
    ) -> ListenerRef {
        let listener: ListenerRef = Rc::new(UpdateListener::new(callback));
        self.add_listener(Rc::clone(&listener), notify_immediately);
        listener
    }

    /// Remove `listener` from every member.
    pub fn remove_listener(&self, listener: &ListenerRef) {
        for member in &self.members {
            member.remove_listener(listener);
        }
    }

    /// Remove all listeners from every member.
    pub fn remove_all_listeners(&self) {
        for member in &self.members {
            member.remove_all_listeners();
        }
    }
}

impl fmt::Debug for PropertyGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyGroup")
            .field("len", &self.members.len())
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> From<PropertyMember<T>> for PropertyGroup {
    fn from(member: PropertyMember<T>) -> Self {
        Self {
            members: vec![Rc::new(member) as Rc<dyn GroupMember>],
        }
    }
}

impl<T: Clone + PartialEq + 'static> From<Property<T>> for PropertyGroup {
    fn from(p: Property<T>) -> Self {
        PropertyMember::from(p).into()
    }
}

impl<T: Clone + PartialEq + 'static> From<WritableProperty<T>> for PropertyGroup {
    fn from(p: WritableProperty<T>) -> Self {
        PropertyMember::from(p).into()
    }
}

impl<T: Clone + PartialEq + 'static> From<EditableProperty<T>> for PropertyGroup {
    fn from(p: EditableProperty<T>) -> Self {
        PropertyMember::from(p).into()
    }
}

impl<T: Clone + PartialEq + 'static> From<Properties<T>> for PropertyGroup {
    fn from(properties: Properties<T>) -> Self {
        Self {
            members: properties
                .iter()
                .map(|member| Rc::new(member.clone()) as Rc<dyn GroupMember>)
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// GroupSnapshot
// ---------------------------------------------------------------------------

/// Captured values of a [`PropertyGroup`].
pub struct GroupSnapshot {
    restores: Vec<Box<dyn Fn()>>,
}

impl GroupSnapshot {
    /// Restore every captured member. May be applied more than once.
    pub fn apply(&self) {
        for restore in &self.restores {
            restore();
        }
    }

    /// Number of members this snapshot restores.
    #[must_use]
    pub fn len(&self) -> usize {
        self.restores.len()
    }

    /// Whether nothing was captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.restores.is_empty()
    }
}

impl fmt::Debug for GroupSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupSnapshot")
            .field("len", &self.restores.len())
            .finish()
    }
}
