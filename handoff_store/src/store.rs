// Copyright 2025 the Handoff Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The shared drag-and-drop store.
//!
//! ## Overview
//!
//! A [`DragStore`] holds everything sources and targets need to agree on while a
//! drag is in flight:
//!
//! - the payload and the id of the dragged item ([`StoredData`]),
//! - an observable copy of that id, which is what sources compare against to
//!   derive "am I the one being dragged",
//! - an observable [`Monitor`] snapshot of the cursor and target.
//!
//! The payload itself is not observable. [`DragStore::update_data_only`] rewrites
//! it while a drag is active without touching the id, so live payloads (for
//! example a ticking counter) reach drop targets without re-signaling a drag
//! start to every subscriber.

use alloc::string::String;
use core::cell::RefCell;

use kurbo::Point;

use crate::cell::{Observable, Subscription};

/// Payload and origin of the active drag.
#[derive(Clone, Debug, PartialEq)]
pub struct StoredData<T> {
    /// Caller-defined payload.
    pub data: Option<T>,
    /// Id of the source that started the drag.
    pub dragging_id: Option<String>,
}

impl<T> StoredData<T> {
    /// A record for `data` dragged from the source `dragging_id`.
    pub fn new(data: T, dragging_id: impl Into<String>) -> Self {
        Self {
            data: Some(data),
            dragging_id: Some(dragging_id.into()),
        }
    }

    /// Whether both fields are absent.
    pub fn is_empty(&self) -> bool {
        self.data.is_none() && self.dragging_id.is_none()
    }
}

impl<T> Default for StoredData<T> {
    fn default() -> Self {
        Self {
            data: None,
            dragging_id: None,
        }
    }
}

/// Most recent spatial and target state of an in-progress drag.
///
/// `droppable_id` is `None` while the cursor is outside every drop target.
#[derive(Clone, Debug, PartialEq)]
pub struct Monitor {
    /// Cursor position in client coordinates.
    pub position: Point,
    /// Id of the dragged source, if a drag is active.
    pub dragging_id: Option<String>,
    /// Id tagged on the node directly under the cursor, if any.
    pub droppable_id: Option<String>,
}

impl Monitor {
    /// Horizontal cursor position.
    pub fn x(&self) -> f64 {
        self.position.x
    }

    /// Vertical cursor position.
    pub fn y(&self) -> f64 {
        self.position.y
    }
}

/// Shared state for one drag-and-drop scope.
pub struct DragStore<T> {
    record: RefCell<StoredData<T>>,
    dragging_id: Observable<Option<String>>,
    monitor: Observable<Option<Monitor>>,
}

impl<T: core::fmt::Debug> core::fmt::Debug for DragStore<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DragStore")
            .field("record", &self.record.borrow())
            .field("dragging_id", &self.dragging_id)
            .field("monitor", &self.monitor)
            .finish()
    }
}

impl<T: Clone> Default for DragStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> DragStore<T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            record: RefCell::new(StoredData::default()),
            dragging_id: Observable::new(None),
            monitor: Observable::new(None),
        }
    }

    /// Overwrite payload and dragging id.
    ///
    /// Dragging-id subscribers hear about it only if the id changed.
    pub fn set_data(&self, record: StoredData<T>) {
        let id = record.dragging_id.clone();
        *self.record.borrow_mut() = record;
        self.dragging_id.set(id);
    }

    /// Overwrite the payload and leave the dragging id alone.
    pub fn update_data_only(&self, data: T) {
        self.record.borrow_mut().data = Some(data);
    }

    /// The stored record, or `None` when nothing is stored.
    pub fn data(&self) -> Option<StoredData<T>> {
        let record = self.record.borrow();
        (!record.is_empty()).then(|| record.clone())
    }

    /// The stored payload, if any.
    pub fn payload(&self) -> Option<T> {
        self.record.borrow().data.clone()
    }

    /// Id of the source being dragged, if any.
    pub fn dragging_id(&self) -> Option<String> {
        self.dragging_id.get()
    }

    /// Whether any source is being dragged.
    pub fn is_dragging(&self) -> bool {
        self.dragging_id.with(Option::is_some)
    }

    /// Reset the record and the monitor.
    ///
    /// The monitor goes first and the dragging id last, so id subscribers see
    /// an already-empty store.
    pub fn clear_data(&self) {
        self.monitor.set(None);
        *self.record.borrow_mut() = StoredData::default();
        self.dragging_id.set(None);
    }

    /// Replace the monitor snapshot. Equal snapshots notify nobody.
    pub fn set_monitor(&self, monitor: Option<Monitor>) {
        self.monitor.set(monitor);
    }

    /// The current monitor snapshot.
    pub fn monitor(&self) -> Option<Monitor> {
        self.monitor.get()
    }

    /// Observe dragging-id changes.
    pub fn subscribe_to_dragging_id(
        &self,
        callback: impl Fn(&Option<String>) + 'static,
    ) -> Subscription {
        self.dragging_id.subscribe(callback)
    }

    /// Observe monitor changes.
    pub fn subscribe_to_monitor(
        &self,
        callback: impl Fn(&Option<Monitor>) + 'static,
    ) -> Subscription {
        self.monitor.subscribe(callback)
    }
}
