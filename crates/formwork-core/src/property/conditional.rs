#![forbid(unsafe_code)]

//! Change listener gated on a condition property.
//!
//! A [`ConditionalChangeListener`] forwards change notifications to its
//! callback only while `condition == required`. Notifications arriving while
//! the condition does not hold are dropped, never queued.
//!
//! The listener also watches the condition itself: when the condition
//! changes to the required value the callback fires once, so a consumer that
//! was muted (say, a hidden panel) refreshes when it becomes live again.
//! That single refresh is the only catch-up; individual missed changes are
//! not replayed.
//!
//! # Invariants
//!
//! 1. The catch-up only fires while the listener is registered on at least
//!    one source. A listener removed from every source stays silent.
//! 2. The condition holds exactly one watcher per live listener; dropping
//!    the listener unregisters it.

use std::cell::Cell;
use std::fmt;
use std::rc::{Rc, Weak};

use super::base::Property;
use super::listener::{ListenerRef, PropertyListener};

/// Listener that invokes its callback only while a condition holds.
pub struct ConditionalChangeListener<C> {
    callback: Box<dyn Fn()>,
    condition: Property<C>,
    required: C,
    watcher: ListenerRef,
    attachments: Cell<usize>,
}

impl<C: Clone + PartialEq + 'static> ConditionalChangeListener<C> {
    /// Bind `callback` to fire while `condition` equals `required`.
    ///
    /// The returned handle is ready to be registered on any property or
    /// node list via `add_listener`.
    pub fn new(callback: impl Fn() + 'static, condition: &Property<C>, required: C) -> Rc<Self> {
        let listener = Rc::new_cyclic(|weak: &Weak<Self>| Self {
            callback: Box::new(callback),
            condition: condition.clone(),
            required,
            watcher: Rc::new(ConditionWatcher {
                target: Weak::clone(weak),
            }),
            attachments: Cell::new(0),
        });
        condition.add_listener(Rc::clone(&listener.watcher), false);
        listener
    }

    /// Number of sources this listener is currently registered on.
    #[must_use]
    pub fn attachment_count(&self) -> usize {
        self.attachments.get()
    }

    fn on_condition_changed(&self) {
        if self.attachments.get() == 0 {
            return;
        }
        self.on_property_changed();
    }

    /// Whether the condition currently holds.
    #[must_use]
    pub fn is_condition_met(&self) -> bool {
        self.condition.with(|value| *value == self.required)
    }
}

impl<C: Clone + PartialEq + 'static> PropertyListener for ConditionalChangeListener<C> {
    fn on_property_changed(&self) {
        if self.is_condition_met() {
            (self.callback)();
        } else {
            tracing::trace!("change dropped: condition not met");
        }
    }

    fn on_attached(&self) {
        self.attachments.set(self.attachments.get() + 1);
    }

    fn on_detached(&self) {
        self.attachments.set(self.attachments.get().saturating_sub(1));
    }
}

impl<C> Drop for ConditionalChangeListener<C> {
    fn drop(&mut self) {
        self.condition.remove_listener(&self.watcher);
    }
}

impl<C: fmt::Debug> fmt::Debug for ConditionalChangeListener<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConditionalChangeListener")
            .field("condition", &self.condition)
            .field("required", &self.required)
            .field("attachments", &self.attachments.get())
            .finish_non_exhaustive()
    }
}

/// Registered on the condition property; holds the gated listener weakly so
/// the condition does not keep it alive.
struct ConditionWatcher<C> {
    target: Weak<ConditionalChangeListener<C>>,
}

impl<C: Clone + PartialEq + 'static> PropertyListener for ConditionWatcher<C> {
    fn on_property_changed(&self) {
        if let Some(target) = self.target.upgrade() {
            target.on_condition_changed();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::WritableProperty;
    use std::cell::Cell;

    struct Fixture {
        source: WritableProperty<Option<i32>>,
        condition: WritableProperty<bool>,
        count: Rc<Cell<u32>>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                source: WritableProperty::new(Some(99)),
                condition: WritableProperty::new(true),
                count: Rc::new(Cell::new(0)),
            }
        }

        fn listener(&self, required: bool) -> Rc<ConditionalChangeListener<bool>> {
            let count = Rc::clone(&self.count);
            ConditionalChangeListener::new(
                move || count.set(count.get() + 1),
                self.condition.as_property(),
                required,
            )
        }
    }

    #[test]
    fn count_starts_at_zero() {
        let fx = Fixture::new();
        assert_eq!(fx.count.get(), 0);
    }

    #[test]
    fn registering_does_not_invoke() {
        let fx = Fixture::new();
        fx.source.add_listener(fx.listener(true), false);
        assert_eq!(fx.count.get(), 0);
    }

    #[test]
    fn immediate_registration_invokes_when_condition_met() {
        let fx = Fixture::new();
        fx.source.add_listener(fx.listener(true), true);
        assert_eq!(fx.count.get(), 1);
    }

    #[test]
    fn immediate_registration_ignored_when_condition_unmet() {
        let fx = Fixture::new();
        fx.condition.set_value(false);
        fx.source.add_listener(fx.listener(true), true);
        assert_eq!(fx.count.get(), 0);
    }

    #[test]
    fn setting_same_value_has_no_effect() {
        let fx = Fixture::new();
        fx.source.add_listener(fx.listener(true), false);
        fx.source.set_value(Some(99));
        assert_eq!(fx.count.get(), 0);
    }

    #[test]
    fn changes_while_condition_met_are_delivered() {
        let fx = Fixture::new();
        fx.source.add_listener(fx.listener(true), false);
        fx.source.set_value(Some(100));
        assert_eq!(fx.count.get(), 1);
    }

    #[test]
    fn changes_while_condition_unmet_are_dropped() {
        let fx = Fixture::new();
        fx.source.add_listener(fx.listener(true), false);
        fx.condition.set_value(false);
        fx.source.set_value(Some(100));
        fx.source.set_value(Some(101));
        assert_eq!(fx.count.get(), 0);
    }

    #[test]
    fn condition_becoming_true_fires_once() {
        let fx = Fixture::new();
        fx.source.add_listener(fx.listener(true), false);
        fx.condition.set_value(false);
        fx.source.set_value(Some(100));
        fx.source.set_value(Some(101));
        fx.condition.set_value(true);
        assert_eq!(fx.count.get(), 1);
    }

    #[test]
    fn condition_reentry_fires_even_when_only_none_was_set() {
        let fx = Fixture::new();
        fx.source.set_value(None);
        fx.source.add_listener(fx.listener(true), false);
        fx.condition.set_value(false);
        fx.source.set_value(None);
        fx.condition.set_value(true);
        assert_eq!(fx.count.get(), 1);
    }

    #[test]
    fn required_false_inverts_gate() {
        let fx = Fixture::new();
        fx.source.add_listener(fx.listener(false), false);
        fx.source.set_value(Some(1));
        assert_eq!(fx.count.get(), 0);
        fx.condition.set_value(false);
        assert_eq!(fx.count.get(), 1);
        fx.source.set_value(Some(2));
        assert_eq!(fx.count.get(), 2);
    }

    #[test]
    fn dropped_listener_stops_watching_condition() {
        let fx = Fixture::new();
        let listener = fx.listener(true);
        fx.condition.set_value(false);
        drop(listener);
        fx.condition.set_value(true);
        assert_eq!(fx.count.get(), 0);
    }

    #[test]
    fn condition_keeps_no_watchers_for_dropped_listeners() {
        let fx = Fixture::new();
        for _ in 0..1000 {
            drop(fx.listener(true));
        }
        assert_eq!(fx.condition.listener_count(), 0);

        let attached = fx.listener(true);
        fx.source.add_listener(attached, false);
        assert_eq!(fx.condition.listener_count(), 1);
        fx.source.remove_all_listeners();
        assert_eq!(fx.condition.listener_count(), 0);
    }

    #[test]
    fn detached_listener_ignores_condition_reentry() {
        let fx = Fixture::new();
        let listener: ListenerRef = fx.listener(true);
        fx.source.add_listener(Rc::clone(&listener), false);
        assert!(fx.source.remove_listener(&listener));

        fx.condition.set_value(false);
        fx.condition.set_value(true);
        assert_eq!(fx.count.get(), 0);
    }

    #[test]
    fn attachment_count_follows_registrations() {
        let fx = Fixture::new();
        let other = WritableProperty::new(0);
        let listener = fx.listener(true);
        fx.source.add_listener(Rc::clone(&listener) as ListenerRef, false);
        other.add_listener(Rc::clone(&listener) as ListenerRef, false);
        assert_eq!(listener.attachment_count(), 2);

        other.remove_all_listeners();
        assert_eq!(listener.attachment_count(), 1);
        fx.condition.set_value(false);
        fx.condition.set_value(true);
        assert_eq!(fx.count.get(), 1);
    }
}
