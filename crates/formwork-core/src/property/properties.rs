#![forbid(unsafe_code)]

//! Ordered composite of properties with bulk operations and snapshots.
//!
//! [`Properties`] proxies listener registration and `set_value` to every
//! constituent, and can capture a [`PropertiesSnapshot`] that later restores
//! every *writable* constituent to its captured value.
//!
//! # Invariants
//!
//! 1. Constituents keep insertion order; adding another `Properties`
//!    flattens its members in order.
//! 2. `set_value` and snapshot `apply` never touch read-only members.
//! 3. A snapshot owns clones of the values, so later mutation of the live
//!    properties does not alter it.
//! 4. An immediate listener notification is delivered once for the whole
//!    composite (through the last constituent), not once per constituent.

use std::fmt;
use std::rc::Rc;

use super::base::Property;
use super::editable::EditableProperty;
use super::listener::{ChangeListener, ListenerRef, UpdateListener};
use super::writable::WritableProperty;

// ---------------------------------------------------------------------------
// PropertyMember
// ---------------------------------------------------------------------------

/// One constituent of a [`Properties`] composite, tagged with its capability.
pub enum PropertyMember<T> {
    /// No public setter.
    ReadOnly(Property<T>),
    /// Settable.
    Writable(WritableProperty<T>),
    /// Settable and validated.
    Editable(EditableProperty<T>),
}

impl<T> Clone for PropertyMember<T> {
    fn clone(&self) -> Self {
        match self {
            Self::ReadOnly(p) => Self::ReadOnly(p.clone()),
            Self::Writable(p) => Self::Writable(p.clone()),
            Self::Editable(p) => Self::Editable(p.clone()),
        }
    }
}

impl<T: Clone + PartialEq + 'static> PropertyMember<T> {
    /// The read view shared by every variant.
    #[must_use]
    pub fn property(&self) -> &Property<T> {
        match self {
            Self::ReadOnly(p) => p,
            Self::Writable(p) => p.as_property(),
            Self::Editable(p) => p.as_writable().as_property(),
        }
    }

    /// Whether the member exposes a public setter.
    #[must_use]
    pub fn is_writable(&self) -> bool {
        !matches!(self, Self::ReadOnly(_))
    }

    /// Whether the member carries a validator chain.
    #[must_use]
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Editable(_))
    }

    /// Set the value on writable members. Read-only members are untouched
    /// and report `false`.
    pub fn set_value(&self, value: T) -> bool {
        match self {
            Self::ReadOnly(_) => false,
            Self::Writable(p) => p.set_value(value),
            Self::Editable(p) => p.set_value(value),
        }
    }

    /// Current value.
    #[must_use]
    pub fn value(&self) -> T {
        self.property().value()
    }
}

impl<T> From<Property<T>> for PropertyMember<T> {
    fn from(p: Property<T>) -> Self {
        Self::ReadOnly(p)
    }
}

impl<T> From<WritableProperty<T>> for PropertyMember<T> {
    fn from(p: WritableProperty<T>) -> Self {
        Self::Writable(p)
    }
}

impl<T> From<EditableProperty<T>> for PropertyMember<T> {
    fn from(p: EditableProperty<T>) -> Self {
        Self::Editable(p)
    }
}

impl<T: fmt::Debug> fmt::Debug for PropertyMember<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadOnly(p) => f.debug_tuple("ReadOnly").field(p).finish(),
            Self::Writable(p) => f.debug_tuple("Writable").field(p).finish(),
            Self::Editable(p) => f.debug_tuple("Editable").field(p).finish(),
        }
    }
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

/// Ordered collection of properties treated as one.
pub struct Properties<T> {
    members: Vec<PropertyMember<T>>,
}

impl<T> Clone for Properties<T> {
    fn clone(&self) -> Self {
        Self {
            members: self.members.clone(),
        }
    }
}

impl<T> Default for Properties<T> {
    fn default() -> Self {
        Self {
            members: Vec::new(),
        }
    }
}

impl<T: Clone + PartialEq + 'static> Properties<T> {
    /// Empty composite.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Composite over `members`, in order.
    pub fn from_members(members: impl IntoIterator<Item = PropertyMember<T>>) -> Self {
        Self {
            members: members.into_iter().collect(),
        }
    }

    /// Add a single property, or every member of another composite.
    pub fn add(&mut self, item: impl Into<Properties<T>>) {
        self.members.extend(item.into().members);
    }

    /// Builder form of [`add`](Self::add).
    #[must_use]
    pub fn with(mut self, item: impl Into<Properties<T>>) -> Self {
        self.add(item);
        self
    }

    /// Number of constituents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the composite is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Iterate constituents in order.
    pub fn iter(&self) -> impl Iterator<Item = &PropertyMember<T>> {
        self.members.iter()
    }

    /// Set `value` on every writable constituent.
    pub fn set_value(&self, value: T) {
        for member in &self.members {
            member.set_value(value.clone());
        }
    }

    /// Capture every constituent's current value.
    #[must_use]
    pub fn snapshot(&self) -> PropertiesSnapshot<T> {
        PropertiesSnapshot {
            entries: self
                .members
                .iter()
                .map(|member| (member.clone(), member.value()))
                .collect(),
        }
    }

    /// Register `listener` on every constituent.
    pub fn add_listener(&self, listener: ListenerRef, notify_immediately: bool) {
        let last = self.members.len().saturating_sub(1);
        for (index, member) in self.members.iter().enumerate() {
            member
                .property()
                .add_listener(Rc::clone(&listener), notify_immediately && index == last);
        }
    }

    /// Register one change callback shared by every constituent.
    pub fn add_change_listener(
        &self,
        callback: impl Fn() + 'static,
        notify_immediately: bool,
    ) -> ListenerRef {
        let listener: ListenerRef = Rc::new(ChangeListener::new(callback));
        self.add_listener(Rc::clone(&listener), notify_immediately);
        listener
    }

    /// Register one update callback shared by every constituent.
    pub fn add_update_listener(
        &self,
        callback: impl Fn() + 'static,
        notify_immediately: bool,
    ) -> ListenerRef {
        let listener: ListenerRef = Rc::new(UpdateListener::new(callback));
        self.add_listener(Rc::clone(&listener), notify_immediately);
        listener
    }

    /// Remove `listener` from every constituent.
    pub fn remove_listener(&self, listener: &ListenerRef) {
        for member in &self.members {
            member.property().remove_listener(listener);
        }
    }

    /// Remove all listeners from every constituent.
    pub fn remove_all_listeners(&self) {
        for member in &self.members {
            member.property().remove_all_listeners();
        }
    }
}

impl<T> From<PropertyMember<T>> for Properties<T> {
    fn from(member: PropertyMember<T>) -> Self {
        Self {
            members: vec![member],
        }
    }
}

impl<T> From<Property<T>> for Properties<T> {
    fn from(p: Property<T>) -> Self {
        PropertyMember::from(p).into()
    }
}

impl<T> From<WritableProperty<T>> for Properties<T> {
    fn from(p: WritableProperty<T>) -> Self {
        PropertyMember::from(p).into()
    }
}

impl<T> From<EditableProperty<T>> for Properties<T> {
    fn from(p: EditableProperty<T>) -> Self {
        PropertyMember::from(p).into()
    }
}

impl<T> FromIterator<PropertyMember<T>> for Properties<T> {
    fn from_iter<I: IntoIterator<Item = PropertyMember<T>>>(iter: I) -> Self {
        Self {
            members: iter.into_iter().collect(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Properties<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.members).finish()
    }
}

// ---------------------------------------------------------------------------
// PropertiesSnapshot
// ---------------------------------------------------------------------------

/// Captured values of a [`Properties`] composite.
pub struct PropertiesSnapshot<T> {
    entries: Vec<(PropertyMember<T>, T)>,
}

impl<T: Clone + PartialEq + 'static> PropertiesSnapshot<T> {
    /// Restore every writable constituent to its captured value.
    ///
    /// May be applied more than once.
    pub fn apply(&self) {
        for (member, value) in &self.entries {
            member.set_value(value.clone());
        }
    }

    /// Captured values, in constituent order.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|(_, value)| value)
    }

    /// Number of captured constituents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: fmt::Debug> fmt::Debug for PropertiesSnapshot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|(_, value)| value))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::PropertyListener;
    use std::cell::{Cell, RefCell};

    #[derive(Default)]
    struct Recorder {
        changes: Cell<u32>,
    }

    impl PropertyListener for Recorder {
        fn on_property_changed(&self) {
            self.changes.set(self.changes.get() + 1);
        }
    }

    #[test]
    fn construction_and_flattening() {
        let p1 = Property::new("p1");
        let p2 = Property::new("p2");
        let mut a = Properties::from_members([p1.into()]);
        let b = Properties::from(p2);
        a.add(b);
        assert_eq!(a.len(), 2);
        let values: Vec<_> = a.iter().map(PropertyMember::value).collect();
        assert_eq!(values, vec!["p1", "p2"]);
    }

    #[test]
    fn set_value_skips_read_only_members() {
        let read_only = Property::new(1);
        let writable = WritableProperty::new(1);
        let editable = EditableProperty::new(1);
        let props = Properties::new()
            .with(read_only.clone())
            .with(writable.clone())
            .with(editable.clone());

        props.set_value(2);
        assert_eq!(read_only.value(), 1);
        assert_eq!(writable.value(), 2);
        assert_eq!(editable.value(), 2);
    }

    #[test]
    fn snapshot_restores_writable_members_only() {
        let (read_only, setter) = Property::with_setter(1);
        let writable = WritableProperty::new(1);
        let editable = EditableProperty::new(1);
        let props = Properties::new()
            .with(read_only.clone())
            .with(writable.clone())
            .with(editable.clone());

        let snapshot = props.snapshot();
        assert_eq!(snapshot.len(), 3);

        setter.set(2);
        writable.set_value(2);
        editable.set_value(2);

        snapshot.apply();
        assert_eq!(read_only.value(), 2);
        assert_eq!(writable.value(), 1);
        assert_eq!(editable.value(), 1);
    }

    #[test]
    fn snapshot_is_independent_of_live_collections() {
        let list = WritableProperty::new(vec!["a".to_string()]);
        let props = Properties::from(list.clone());
        let snapshot = props.snapshot();

        list.set_value(vec!["b".to_string(), "c".to_string()]);
        let captured: Vec<_> = snapshot.values().cloned().collect();
        assert_eq!(captured, vec![vec!["a".to_string()]]);

        snapshot.apply();
        assert_eq!(list.value(), vec!["a".to_string()]);
    }

    #[test]
    fn add_listener_reaches_every_member() {
        let a = WritableProperty::new(0);
        let b = WritableProperty::new(0);
        let props = Properties::new().with(a.clone()).with(b.clone());
        let recorder = Rc::new(Recorder::default());

        props.add_listener(recorder.clone(), false);
        assert_eq!(a.listener_count(), 1);
        assert_eq!(b.listener_count(), 1);

        a.set_value(1);
        b.set_value(1);
        assert_eq!(recorder.changes.get(), 2);
    }

    #[test]
    fn immediate_notification_is_delivered_once() {
        let props = Properties::new()
            .with(WritableProperty::new(0))
            .with(WritableProperty::new(0))
            .with(WritableProperty::new(0));
        let recorder = Rc::new(Recorder::default());
        props.add_listener(recorder.clone(), true);
        assert_eq!(recorder.changes.get(), 1);
    }

    #[test]
    fn change_and_update_listeners_are_proxied() {
        let a = WritableProperty::new(0);
        let b = WritableProperty::new(0);
        let props = Properties::new().with(a.clone()).with(b.clone());
        let log = Rc::new(RefCell::new(Vec::new()));

        let l = Rc::clone(&log);
        props.add_change_listener(move || l.borrow_mut().push("change"), false);
        let l = Rc::clone(&log);
        props.add_update_listener(move || l.borrow_mut().push("update"), false);

        b.set_value(0);
        assert_eq!(*log.borrow(), vec!["update"]);
        b.set_value(4);
        assert_eq!(*log.borrow(), vec!["update", "change", "update"]);
    }

    #[test]
    fn remove_all_listeners_is_proxied() {
        let a = WritableProperty::new(0);
        let b = WritableProperty::new(0);
        let props = Properties::new().with(a.clone()).with(b.clone());
        let listener = props.add_change_listener(|| {}, false);
        props.add_change_listener(|| {}, false);
        assert_eq!(a.listener_count(), 2);

        props.remove_listener(&listener);
        assert_eq!(a.listener_count(), 1);
        assert_eq!(b.listener_count(), 1);

        props.remove_all_listeners();
        assert_eq!(a.listener_count(), 0);
        assert_eq!(b.listener_count(), 0);
    }

    #[test]
    fn member_capabilities() {
        let ro: PropertyMember<i32> = Property::new(0).into();
        let w: PropertyMember<i32> = WritableProperty::new(0).into();
        let e: PropertyMember<i32> = EditableProperty::new(0).into();
        assert!(!ro.is_writable());
        assert!(w.is_writable() && !w.is_editable());
        assert!(e.is_writable() && e.is_editable());
        assert!(!ro.set_value(3));
    }
}
