#![forbid(unsafe_code)]

//! The read-only observable cell every other property builds on.
//!
//! A [`Property<T>`] is a shared handle (`Rc`) around a value, a version
//! counter and an ordered [`ListenerSet`]. Cloning the handle shares the
//! cell. Outside code can only read it; the entity that created the cell
//! through [`Property::with_setter`] keeps the [`InternalSetter`] and is the
//! only party able to mutate it. That is how derived values such as a
//! selection field's `selected_option_label` are exposed.
//!
//! # Invariants
//!
//! 1. The version increments exactly once per stored change.
//! 2. Storing a value equal to the current one is not a change: no version
//!    bump and no change notification (update listeners still hear it).
//! 3. No `RefCell` borrow is held while listeners run, so listeners may read
//!    this property or set others re-entrantly.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use super::listener::{ChangeListener, ListenerRef, ListenerSet, UpdateListener};

pub(crate) struct PropertyCell<T> {
    value: RefCell<T>,
    version: Cell<u64>,
    listeners: ListenerSet,
}

/// Observable, externally read-only value.
pub struct Property<T> {
    cell: Rc<PropertyCell<T>>,
}

impl<T> Clone for Property<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Rc::clone(&self.cell),
        }
    }
}

impl<T: Clone + PartialEq + 'static> Property<T> {
    /// Create a property nobody can mutate after construction.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            cell: Rc::new(PropertyCell {
                value: RefCell::new(value),
                version: Cell::new(0),
                listeners: ListenerSet::new(),
            }),
        }
    }

    /// Create a property together with the setter its owner keeps private.
    #[must_use]
    pub fn with_setter(value: T) -> (Self, InternalSetter<T>) {
        let property = Self::new(value);
        let setter = InternalSetter {
            property: property.clone(),
        };
        (property, setter)
    }

    /// Current value (cloned).
    #[must_use]
    pub fn value(&self) -> T {
        self.cell.value.borrow().clone()
    }

    /// Borrow the current value for the duration of `f`.
    ///
    /// # Panics
    ///
    /// Panics if `f` stores into this same property (directly or through a
    /// listener it triggers), since the value stays borrowed while `f` runs.
    /// Use [`Property::value`] when the closure may write back.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.cell.value.borrow())
    }

    /// Store `value`, applying same-value suppression, then notify.
    ///
    /// Returns whether the value changed.
    pub(crate) fn store(&self, value: T) -> bool {
        let changed = {
            let mut current = self.cell.value.borrow_mut();
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        };
        if changed {
            self.cell.version.set(self.cell.version.get() + 1);
        }
        self.cell.listeners.notify(changed);
        changed
    }

    /// Deliver an update notification without storing anything.
    ///
    /// Used when user input is rejected: views still resynchronise their raw
    /// text even though the value is unchanged.
    pub(crate) fn notify_updated(&self) {
        self.cell.listeners.notify(false);
    }
}

impl<T> Property<T> {
    /// Number of stored changes since construction.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.cell.version.get()
    }

    /// Register a listener. With `notify_immediately` the listener is
    /// notified once, synchronously, before this returns.
    pub fn add_listener(&self, listener: ListenerRef, notify_immediately: bool) {
        self.cell.listeners.add(listener, notify_immediately);
    }

    /// Invoke `callback` whenever the value changes.
    ///
    /// Returns the registered listener so it can later be removed.
    pub fn add_change_listener(
        &self,
        callback: impl Fn() + 'static,
        notify_immediately: bool,
    ) -> ListenerRef {
        let listener: ListenerRef = Rc::new(ChangeListener::new(callback));
        self.add_listener(Rc::clone(&listener), notify_immediately);
        listener
    }

    /// Invoke `callback` whenever a value is set, changed or not.
    pub fn add_update_listener(
        &self,
        callback: impl Fn() + 'static,
        notify_immediately: bool,
    ) -> ListenerRef {
        let listener: ListenerRef = Rc::new(UpdateListener::new(callback));
        self.add_listener(Rc::clone(&listener), notify_immediately);
        listener
    }

    /// Remove a previously registered listener.
    pub fn remove_listener(&self, listener: &ListenerRef) -> bool {
        self.cell.listeners.remove(listener)
    }

    /// Remove every listener.
    pub fn remove_all_listeners(&self) {
        self.cell.listeners.clear();
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.cell.listeners.len()
    }

    /// Weak handle that does not keep the cell alive.
    #[must_use]
    pub fn downgrade(&self) -> WeakProperty<T> {
        WeakProperty {
            cell: Rc::downgrade(&self.cell),
        }
    }

    /// Whether both handles share one cell.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.cell, &other.cell)
    }
}

impl<T: fmt::Debug> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("value", &*self.cell.value.borrow())
            .field("version", &self.cell.version.get())
            .field("listeners", &self.cell.listeners.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// InternalSetter
// ---------------------------------------------------------------------------

/// Owner-only write access to a [`Property`].
///
/// Bypasses validation. Same-value suppression still applies to change
/// notifications.
pub struct InternalSetter<T> {
    property: Property<T>,
}

impl<T: Clone + PartialEq + 'static> InternalSetter<T> {
    /// Store a new value and notify listeners.
    pub fn set(&self, value: T) -> bool {
        self.property.store(value)
    }

    /// The property this setter writes to.
    #[must_use]
    pub fn property(&self) -> &Property<T> {
        &self.property
    }
}

impl<T: fmt::Debug> fmt::Debug for InternalSetter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("InternalSetter").field(&self.property).finish()
    }
}

// ---------------------------------------------------------------------------
// WeakProperty
// ---------------------------------------------------------------------------

/// Non-owning handle to a [`Property`] cell.
pub struct WeakProperty<T> {
    cell: Weak<PropertyCell<T>>,
}

impl<T> Clone for WeakProperty<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Weak::clone(&self.cell),
        }
    }
}

impl<T> WeakProperty<T> {
    /// Recover a strong handle if the cell is still alive.
    #[must_use]
    pub fn upgrade(&self) -> Option<Property<T>> {
        self.cell.upgrade().map(|cell| Property { cell })
    }
}

impl<T> fmt::Debug for WeakProperty<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakProperty")
            .field("alive", &(self.cell.strong_count() > 0))
            .finish()
    }
}
