#![forbid(unsafe_code)]

//! Presentation-node capability and the observable [`NodeList`].
//!
//! # Invariants
//!
//! 1. Node order is preserved exactly as given to `new` / `update_list`.
//! 2. Every `update_list` call notifies listeners with a change, even when
//!    the new list happens to equal the old one.
//! 3. No borrow of the node vector is held while listeners run.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use formwork_core::property::{ChangeListener, ListenerRef, ListenerSet};

/// A model object a control can be bound to.
pub trait PresentationNode: Any {
    /// Name of the concrete node type, used in diagnostics.
    fn node_type(&self) -> &'static str;

    /// Downcasting hook for control adaptors.
    fn as_any(&self) -> &dyn Any;
}

struct NodeListInner<N> {
    nodes: RefCell<Vec<N>>,
    listeners: ListenerSet,
}

/// Ordered, observable list of presentation nodes. Clones share the list.
pub struct NodeList<N> {
    inner: Rc<NodeListInner<N>>,
}

impl<N> Clone for NodeList<N> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<N: PresentationNode + Clone> NodeList<N> {
    /// Create a list holding `nodes` in order.
    pub fn new(nodes: impl IntoIterator<Item = N>) -> Self {
        Self {
            inner: Rc::new(NodeListInner {
                nodes: RefCell::new(nodes.into_iter().collect()),
                listeners: ListenerSet::new(),
            }),
        }
    }

    /// Replace the contents and notify listeners.
    pub fn update_list(&self, nodes: impl IntoIterator<Item = N>) {
        let nodes: Vec<N> = nodes.into_iter().collect();
        *self.inner.nodes.borrow_mut() = nodes;
        self.inner.listeners.notify(true);
    }

    /// Clone of the current nodes.
    #[must_use]
    pub fn nodes(&self) -> Vec<N> {
        self.inner.nodes.borrow().clone()
    }

    /// Borrow the current nodes for the duration of `f`.
    pub fn with_nodes<R>(&self, f: impl FnOnce(&[N]) -> R) -> R {
        f(&self.inner.nodes.borrow())
    }

    /// Node count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.nodes.borrow().len()
    }

    /// Whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.nodes.borrow().is_empty()
    }

    /// Register a listener for list changes.
    pub fn add_listener(&self, listener: ListenerRef, notify_immediately: bool) {
        self.inner.listeners.add(listener, notify_immediately);
    }

    /// Invoke `callback` whenever the list is updated.
    pub fn add_change_listener(
        &self,
        callback: impl Fn() + 'static,
        notify_immediately: bool,
    ) -> ListenerRef {
        let listener: ListenerRef = Rc::new(ChangeListener::new(callback));
        self.add_listener(Rc::clone(&listener), notify_immediately);
        listener
    }

    /// Remove a previously registered listener.
    pub fn remove_listener(&self, listener: &ListenerRef) -> bool {
        self.inner.listeners.remove(listener)
    }

    /// Remove every listener.
    pub fn remove_all_listeners(&self) {
        self.inner.listeners.clear();
    }

    /// Non-owning handle, for listeners the list itself holds.
    #[must_use]
    pub fn downgrade(&self) -> WeakNodeList<N> {
        WeakNodeList {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Whether both handles share one list.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<N: fmt::Debug> fmt::Debug for NodeList<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeList")
            .field("nodes", &*self.inner.nodes.borrow())
            .field("listeners", &self.inner.listeners.len())
            .finish()
    }
}

/// Non-owning handle to a [`NodeList`].
pub struct WeakNodeList<N> {
    inner: Weak<NodeListInner<N>>,
}

impl<N> Clone for WeakNodeList<N> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<N> WeakNodeList<N> {
    /// Recover a strong handle if the list is still alive.
    #[must_use]
    pub fn upgrade(&self) -> Option<NodeList<N>> {
        self.inner.upgrade().map(|inner| NodeList { inner })
    }
}

impl<N> fmt::Debug for WeakNodeList<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakNodeList")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formwork_core::property::{ConditionalChangeListener, WritableProperty};
    use std::cell::Cell;

    #[derive(Debug, Clone, PartialEq)]
    struct Row(u32);

    impl PresentationNode for Row {
        fn node_type(&self) -> &'static str {
            "Row"
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn preserves_order() {
        let list = NodeList::new([Row(3), Row(1), Row(2)]);
        assert_eq!(list.nodes(), vec![Row(3), Row(1), Row(2)]);
        assert_eq!(list.len(), 3);
        assert!(!list.is_empty());
    }

    #[test]
    fn update_list_always_notifies() {
        let list = NodeList::new([Row(1)]);
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        list.add_change_listener(move || c.set(c.get() + 1), false);

        list.update_list([Row(1)]);
        list.update_list(Vec::new());
        assert_eq!(count.get(), 2);
        assert!(list.is_empty());
    }

    #[test]
    fn listener_reads_new_contents() {
        let list = NodeList::new([Row(1)]);
        let seen = Rc::new(Cell::new(0));
        let s = Rc::clone(&seen);
        let weak = list.downgrade();
        list.add_change_listener(
            move || {
                if let Some(list) = weak.upgrade() {
                    s.set(list.with_nodes(|nodes| nodes.iter().map(|r| r.0).sum()));
                }
            },
            false,
        );
        list.update_list([Row(4), Row(5)]);
        assert_eq!(seen.get(), 9);
    }

    #[test]
    fn conditional_listener_on_node_list() {
        let list = NodeList::new([Row(1)]);
        let condition = WritableProperty::new(true);
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        let listener =
            ConditionalChangeListener::new(move || c.set(c.get() + 1), condition.as_property(), true);

        list.add_listener(listener, false);
        assert_eq!(count.get(), 0);

        list.update_list(Vec::new());
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn remove_listeners() {
        let list = NodeList::new([Row(1)]);
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        let l = list.add_change_listener(move || c.set(c.get() + 1), false);
        assert!(list.remove_listener(&l));
        list.add_change_listener(|| {}, false);
        list.remove_all_listeners();
        list.update_list([Row(2)]);
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn node_type_and_downcast() {
        let row = Row(7);
        let node: &dyn PresentationNode = &row;
        assert_eq!(node.node_type(), "Row");
        assert_eq!(node.as_any().downcast_ref::<Row>(), Some(&Row(7)));
    }
}
