#![forbid(unsafe_code)]

//! Property-based checks for change suppression and snapshot restore.
//!
//! # Invariants
//!
//! 1. **Suppression**: any sequence of sets produces exactly as many change
//!    notifications as there are adjacent distinct values.
//! 2. **Version**: the version equals the change-notification count.
//! 3. **Snapshot**: applying a snapshot restores every writable member no
//!    matter what was written in between, and leaves read-only members alone.
//!
//! Run: `cargo test -p formwork-core --test property_laws`

use std::cell::Cell;
use std::rc::Rc;

use formwork_core::{EditableProperty, Properties, Property, WritableProperty};
use proptest::prelude::*;

proptest! {
    #[test]
    fn change_count_matches_distinct_transitions(
        initial in proptest::option::of(0u8..4),
        writes in proptest::collection::vec(proptest::option::of(0u8..4), 0..40),
    ) {
        let property = WritableProperty::new(initial);
        let changes = Rc::new(Cell::new(0u64));
        let c = Rc::clone(&changes);
        property.add_change_listener(move || c.set(c.get() + 1), false);

        let mut expected = 0u64;
        let mut last = initial;
        for value in &writes {
            if *value != last {
                expected += 1;
                last = *value;
            }
            property.set_value(*value);
        }

        prop_assert_eq!(changes.get(), expected);
        prop_assert_eq!(property.version(), expected);
        prop_assert_eq!(property.value(), last);
    }

    #[test]
    fn snapshot_apply_restores_writable_members(
        start in any::<i16>(),
        writes in proptest::collection::vec(any::<i16>(), 1..10),
    ) {
        let (read_only, setter) = Property::with_setter(start);
        let writable = WritableProperty::new(start);
        let editable = EditableProperty::new(start);
        let props = Properties::new()
            .with(read_only.clone())
            .with(writable.clone())
            .with(editable.clone());

        let snapshot = props.snapshot();
        for value in &writes {
            setter.set(*value);
            props.set_value(*value);
        }
        snapshot.apply();

        prop_assert_eq!(read_only.value(), *writes.last().unwrap());
        prop_assert_eq!(writable.value(), start);
        prop_assert_eq!(editable.value(), start);
    }
}
