// Copyright 2025 the Handoff Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Observable cell: one value, a set of subscribers, and an equality gate.
//!
//! ## Semantics
//!
//! - [`Observable::set`] compares the new value with the current one using
//!   [`PartialEq`]. Equal writes are dropped and notify nobody.
//! - A changing write notifies every subscriber synchronously, in the order the
//!   subscriptions were made, before `set` returns.
//! - Subscribers may re-enter the cell from their callback (read, write,
//!   subscribe, or unsubscribe). The subscriber set is snapshotted before
//!   delivery, so a subscription added during delivery first hears the next
//!   change.
//!
//! ## Minimal example
//!
//! ```
//! use core::cell::Cell;
//! use std::rc::Rc;
//! use handoff_store::Observable;
//!
//! let cell = Observable::new(0_u32);
//! let seen = Rc::new(Cell::new(0));
//! let sub = cell.subscribe({
//!     let seen = seen.clone();
//!     move |v: &u32| seen.set(*v)
//! });
//!
//! assert!(cell.set(3));
//! assert!(!cell.set(3));
//! assert_eq!(seen.get(), 3);
//! sub.unsubscribe();
//! assert_eq!(cell.subscriber_count(), 0);
//! ```

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::RefCell;

type Listener<T> = Rc<dyn Fn(&T)>;

struct CellState<T> {
    value: T,
    next_key: u64,
    // Keys grow monotonically, so iteration order is subscription order.
    listeners: BTreeMap<u64, Listener<T>>,
}

/// A single observable value.
///
/// Cloning an `Observable` produces another handle to the same value and
/// subscriber set.
pub struct Observable<T> {
    state: Rc<RefCell<CellState<T>>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}

impl<T: core::fmt::Debug> core::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Observable")
            .field("value", &state.value)
            .field("subscribers", &state.listeners.len())
            .finish()
    }
}

impl<T: Default + PartialEq + Clone + 'static> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: PartialEq + Clone + 'static> Observable<T> {
    /// Create a cell holding `initial`, with no subscribers.
    pub fn new(initial: T) -> Self {
        Self {
            state: Rc::new(RefCell::new(CellState {
                value: initial,
                next_key: 0,
                listeners: BTreeMap::new(),
            })),
        }
    }

    /// Return a clone of the current value.
    pub fn get(&self) -> T {
        self.state.borrow().value.clone()
    }

    /// Run `f` against the current value without cloning it.
    ///
    /// `f` must not write to this cell.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.state.borrow().value)
    }

    /// Replace the value and notify subscribers.
    ///
    /// Returns `false`, without notifying anyone, when `value` equals the
    /// current value.
    pub fn set(&self, value: T) -> bool {
        {
            let mut state = self.state.borrow_mut();
            if state.value == value {
                return false;
            }
            state.value = value;
        }
        self.notify();
        true
    }

    /// Notify every subscriber with the current value, even if it did not change.
    pub fn notify(&self) {
        let (value, listeners) = {
            let state = self.state.borrow();
            let listeners: Vec<Listener<T>> = state.listeners.values().cloned().collect();
            (state.value.clone(), listeners)
        };
        for listener in listeners {
            listener(&value);
        }
    }

    /// Register `listener` to be called with the new value after each change.
    ///
    /// The returned [`Subscription`] removes the listener when dropped.
    pub fn subscribe(&self, listener: impl Fn(&T) + 'static) -> Subscription {
        let key = {
            let mut state = self.state.borrow_mut();
            let key = state.next_key;
            state.next_key += 1;
            state.listeners.insert(key, Rc::new(listener));
            key
        };
        let weak: Weak<RefCell<CellState<T>>> = Rc::downgrade(&self.state);
        Subscription::new(move || {
            if let Some(state) = weak.upgrade() {
                state.borrow_mut().listeners.remove(&key);
            }
        })
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.state.borrow().listeners.len()
    }
}

/// Handle returned by a subscribe call.
///
/// Dropping the handle (or calling [`Subscription::unsubscribe`]) removes the
/// listener. Use [`Subscription::detach`] to keep the listener for as long as
/// its source lives.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Build a subscription that runs `cancel` once when unsubscribed.
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Remove the listener now.
    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }

    /// Keep the listener registered and forget the handle.
    pub fn detach(mut self) {
        self.cancel = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl core::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}
