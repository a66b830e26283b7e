// Copyright 2025 the Handoff Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Read-only view of a store for consumers that are neither sources nor targets.

use alloc::rc::Rc;
use core::cell::Cell;

use crate::cell::Subscription;
use crate::store::{DragStore, Monitor};

/// Global drag status for one scope.
///
/// Adds no state of its own beyond what the subscriptions need to suppress
/// repeated booleans.
pub struct DragState<T> {
    store: Rc<DragStore<T>>,
}

impl<T> Clone for DragState<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<T: core::fmt::Debug> core::fmt::Debug for DragState<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DragState")
            .field("store", &self.store)
            .finish()
    }
}

impl<T: Clone> DragState<T> {
    /// View `store`.
    pub fn new(store: Rc<DragStore<T>>) -> Self {
        Self { store }
    }

    /// The current monitor snapshot.
    pub fn monitor(&self) -> Option<Monitor> {
        self.store.monitor()
    }

    /// Observe monitor changes.
    pub fn subscribe_monitor(&self, callback: impl Fn(&Option<Monitor>) + 'static) -> Subscription {
        self.store.subscribe_to_monitor(callback)
    }

    /// Whether anything is being dragged right now.
    pub fn is_dragging(&self) -> bool {
        self.store.is_dragging()
    }

    /// Observe the "anything dragging" flag.
    ///
    /// Called only when the flag flips, not on every dragging-id change.
    pub fn subscribe_dragging(&self, callback: impl Fn(bool) + 'static) -> Subscription {
        let last = Cell::new(self.store.is_dragging());
        self.store.subscribe_to_dragging_id(move |id| {
            let dragging = id.is_some();
            if last.replace(dragging) != dragging {
                callback(dragging);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoredData;
    use alloc::vec;
    use alloc::vec::Vec;
    use core::cell::RefCell;
    use kurbo::Point;

    #[test]
    fn dragging_flag_follows_store() {
        let store = Rc::new(DragStore::new());
        let state = DragState::new(store.clone());
        let log = Rc::new(RefCell::new(Vec::new()));
        let _sub = {
            let log = log.clone();
            state.subscribe_dragging(move |d| log.borrow_mut().push(d))
        };
        assert!(!state.is_dragging());
        store.set_data(StoredData::new(1_u8, "a"));
        assert!(state.is_dragging());
        // Switching sources directly is still "dragging".
        store.set_data(StoredData::new(2_u8, "b"));
        store.clear_data();
        assert_eq!(*log.borrow(), vec![true, false]);
    }

    #[test]
    fn monitor_passthrough() {
        let store: Rc<DragStore<u8>> = Rc::new(DragStore::new());
        let state = DragState::new(store.clone());
        let log = Rc::new(RefCell::new(Vec::new()));
        let _sub = {
            let log = log.clone();
            state.subscribe_monitor(move |m| log.borrow_mut().push(m.clone()))
        };
        let m = Monitor {
            position: Point::new(3.0, 4.0),
            dragging_id: None,
            droppable_id: None,
        };
        store.set_monitor(Some(m.clone()));
        assert_eq!(state.monitor(), Some(m.clone()));
        store.clear_data();
        assert_eq!(*log.borrow(), vec![Some(m), None]);
    }
}
