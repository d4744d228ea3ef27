#![forbid(unsafe_code)]

//! Publicly settable property.

use std::fmt;
use std::ops::Deref;

use super::base::{Property, WeakProperty};

/// A [`Property`] anyone holding the handle may set.
///
/// Dereferences to [`Property`] for reading and listener registration.
pub struct WritableProperty<T> {
    property: Property<T>,
}

impl<T> Clone for WritableProperty<T> {
    fn clone(&self) -> Self {
        Self {
            property: self.property.clone(),
        }
    }
}

impl<T: Clone + PartialEq + 'static> WritableProperty<T> {
    /// Create a writable property holding `value`.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            property: Property::new(value),
        }
    }

    /// Set the value programmatically.
    ///
    /// Change listeners fire only when `value` differs from the current
    /// value; update listeners always fire. Returns whether it changed.
    pub fn set_value(&self, value: T) -> bool {
        self.property.store(value)
    }

    /// The read-only view of this property.
    #[must_use]
    pub fn as_property(&self) -> &Property<T> {
        &self.property
    }

    /// Weak handle to the underlying cell.
    #[must_use]
    pub fn downgrade(&self) -> WeakWritableProperty<T> {
        WeakWritableProperty {
            property: self.property.downgrade(),
        }
    }
}

impl<T> Deref for WritableProperty<T> {
    type Target = Property<T>;

    fn deref(&self) -> &Property<T> {
        &self.property
    }
}

impl<T: Default + Clone + PartialEq + 'static> Default for WritableProperty<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for WritableProperty<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("WritableProperty")
            .field(&self.property)
            .finish()
    }
}

/// Non-owning handle to a [`WritableProperty`].
pub struct WeakWritableProperty<T> {
    property: WeakProperty<T>,
}

impl<T> Clone for WeakWritableProperty<T> {
    fn clone(&self) -> Self {
        Self {
            property: self.property.clone(),
        }
    }
}

impl<T> WeakWritableProperty<T> {
    /// Recover a strong handle if the cell is still alive.
    #[must_use]
    pub fn upgrade(&self) -> Option<WritableProperty<T>> {
        self.property
            .upgrade()
            .map(|property| WritableProperty { property })
    }
}

impl<T> fmt::Debug for WeakWritableProperty<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("WeakWritableProperty")
            .field(&self.property)
            .finish()
    }
}
