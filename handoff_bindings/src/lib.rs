// Copyright 2025 the Handoff Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Handoff Bindings: drag sources and drop targets over a shared store.
//!
//! ## Overview
//!
//! Sources and targets never hold references to each other. Each is built from
//! a [`Scope`] and talks only to that scope's [`DragStore`]:
//!
//! - [`Provider`] mounts a scope at a node. Nested providers share the nearest
//!   ancestor's store by default, so a drag can cross structural boundaries.
//! - [`DragSource`] makes an element draggable and publishes `{payload, id}`
//!   when a drag from it starts.
//! - [`DropTarget`] accepts drags over an element, tracks whether the cursor is
//!   over it, and reports hover, drop, and leave with the current payload.
//! - [`DragState`] exposes "is anything being dragged" and the cursor
//!   [`Monitor`] to everything else.
//!
//! ## Example
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! use handoff_bindings::{DragOptions, DropOptions, Provider};
//! use handoff_host::{Host, LocalNode};
//! use kurbo::Point;
//!
//! let host = Host::new();
//! let provider = Provider::<u32>::root(&host);
//! let card = host.insert(host.body(), LocalNode::default()).unwrap();
//! let zone = host.insert(host.body(), LocalNode::default()).unwrap();
//!
//! let source = provider.scope().drag_source(DragOptions::new("card", 42).element(card));
//! let dropped = Rc::new(Cell::new(None));
//! let _target = provider.scope().drop_target(DropOptions::new("zone").element(zone).on_drop({
//!     let dropped = dropped.clone();
//!     move |payload, _| dropped.set(payload.copied())
//! }));
//!
//! let mut session = host.start_drag(card, Point::ZERO).unwrap();
//! host.run_pending();
//! assert!(source.is_dragging());
//! session.move_over(zone, Point::new(5.0, 5.0));
//! session.release();
//! host.run_until_idle();
//! assert_eq!(dropped.get(), Some(42));
//! assert!(!source.is_dragging());
//! ```
//!
//! ## Turns
//!
//! Work that a browser would do after the current event (recording a drag
//! start, the `on_end` and `on_leave` callbacks, removing a drag layer) is
//! queued on the host. Call [`Host::run_pending`](handoff_host::Host::run_pending)
//! between events the way an event loop would.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod error;
mod provider;
mod source;
mod target;

pub use error::Error;
pub use provider::{Provider, ProviderOptions, Scope};
pub use source::{DRAGGABLE_ID, DragLayer, DragOptions, DragSource};
pub use target::{DROPPABLE_ID, DropOptions, DropTarget};

pub use handoff_store::{
    DragState, DragStore, Monitor, ScopePolicy, ScopeRole, StoredData, Subscription,
};
