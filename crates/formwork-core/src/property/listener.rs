#![forbid(unsafe_code)]

//! Listener capability and the ordered listener storage shared by properties
//! and node lists.
//!
//! # Invariants
//!
//! 1. Listeners are notified in registration order.
//! 2. Notification iterates over a snapshot of the listener list, so a
//!    listener may add or remove listeners (or set other properties) while
//!    being notified without invalidating the iteration.
//! 3. A "changed" notification always precedes the "updated" notification
//!    for the same listener.
//! 4. Listener identity is `Rc` allocation identity: removing a listener
//!    removes every registration of that allocation.
//! 5. Every registration is paired with exactly one
//!    [`PropertyListener::on_detached`] call: on removal, on `clear`, or when
//!    the set itself is dropped.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Receives notifications from an observable property or node list.
///
/// Both methods default to no-ops so implementors only override what they
/// care about.
pub trait PropertyListener {
    /// The observed value changed.
    fn on_property_changed(&self) {}

    /// A value was set, whether or not it differed from the previous one.
    fn on_property_updated(&self) {}

    /// This listener was registered on a property or node list.
    fn on_attached(&self) {}

    /// One registration of this listener ended.
    fn on_detached(&self) {}
}

/// Shared, type-erased listener handle.
pub type ListenerRef = Rc<dyn PropertyListener>;

// ---------------------------------------------------------------------------
// Closure adapters
// ---------------------------------------------------------------------------

/// Invokes a callback on every change notification.
pub struct ChangeListener {
    callback: Box<dyn Fn()>,
}

impl ChangeListener {
    /// Wrap `callback` as a change listener.
    pub fn new(callback: impl Fn() + 'static) -> Self {
        Self {
            callback: Box::new(callback),
        }
    }
}

impl PropertyListener for ChangeListener {
    fn on_property_changed(&self) {
        (self.callback)();
    }
}

impl fmt::Debug for ChangeListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeListener").finish_non_exhaustive()
    }
}

/// Invokes a callback on every update notification, including sets of an
/// unchanged value. Views use this to resynchronise raw text.
pub struct UpdateListener {
    callback: Box<dyn Fn()>,
}

impl UpdateListener {
    /// Wrap `callback` as an update listener.
    pub fn new(callback: impl Fn() + 'static) -> Self {
        Self {
            callback: Box::new(callback),
        }
    }
}

impl PropertyListener for UpdateListener {
    fn on_property_updated(&self) {
        (self.callback)();
    }
}

impl fmt::Debug for UpdateListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateListener").finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// ListenerSet
// ---------------------------------------------------------------------------

/// Ordered collection of listeners with snapshot notification.
#[derive(Default)]
pub struct ListenerSet {
    listeners: RefCell<Vec<ListenerRef>>,
}

impl ListenerSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener`. When `notify_immediately` is set the listener
    /// receives one synchronous notification before this call returns.
    pub fn add(&self, listener: ListenerRef, notify_immediately: bool) {
        self.listeners.borrow_mut().push(Rc::clone(&listener));
        listener.on_attached();
        if notify_immediately {
            listener.on_property_changed();
            listener.on_property_updated();
        }
    }

    /// Remove every registration of `listener`. Returns whether any was found.
    pub fn remove(&self, listener: &ListenerRef) -> bool {
        let removed: Vec<ListenerRef> = {
            let mut listeners = self.listeners.borrow_mut();
            let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut *listeners)
                .into_iter()
                .partition(|l| Rc::ptr_eq(l, listener));
            *listeners = kept;
            removed
        };
        for l in &removed {
            l.on_detached();
        }
        !removed.is_empty()
    }

    /// Drop all listeners.
    pub fn clear(&self) {
        let removed = std::mem::take(&mut *self.listeners.borrow_mut());
        for l in &removed {
            l.on_detached();
        }
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Whether no listener is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.borrow().is_empty()
    }

    /// Notify every listener. `changed` controls whether
    /// [`PropertyListener::on_property_changed`] is delivered; updates are
    /// always delivered.
    pub fn notify(&self, changed: bool) {
        let snapshot: Vec<ListenerRef> = self.listeners.borrow().clone();
        for listener in &snapshot {
            if changed {
                listener.on_property_changed();
            }
            listener.on_property_updated();
        }
    }
}

impl Drop for ListenerSet {
    fn drop(&mut self) {
        for l in self.listeners.get_mut().drain(..) {
            l.on_detached();
        }
    }
}

impl fmt::Debug for ListenerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerSet")
            .field("len", &self.len())
            .finish()
    }
}
