// Copyright 2025 the Handoff Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Handoff Store: the shared state behind a drag-and-drop interaction.
//!
//! ## Overview
//!
//! Drag sources and drop targets never reference each other. They talk through
//! one [`DragStore`] per scope:
//!
//! - [`Observable`] is the primitive: one value, a subscriber set, and an
//!   equality gate that drops no-op writes.
//! - [`DragStore`] composes the payload record with two observables, the id of
//!   the dragged source and the [`Monitor`] snapshot.
//! - [`resolve`] decides, for a provider nested in another, whether to reuse the
//!   ancestor's store or allocate a new one (see [`ScopePolicy`]).
//! - [`DragState`] is a read-only view for consumers that only want to know
//!   whether something is being dragged and where.
//!
//! Everything here is single-threaded (`Rc`/`RefCell`) and synchronous.
//! Binding these primitives to element events lives in `handoff_bindings`.
//!
//! ## Example
//!
//! ```
//! use handoff_store::{DragStore, StoredData};
//!
//! let store = DragStore::new();
//! store.set_data(StoredData::new("payload", "card-1"));
//! assert_eq!(store.dragging_id().as_deref(), Some("card-1"));
//!
//! store.update_data_only("live payload");
//! assert_eq!(store.payload(), Some("live payload"));
//!
//! store.clear_data();
//! assert!(store.data().is_none());
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod cell;
pub mod scope;
pub mod state;
pub mod store;

pub use cell::{Observable, Subscription};
pub use scope::{Resolved, ScopePolicy, ScopeRole, resolve};
pub use state::DragState;
pub use store::{DragStore, Monitor, StoredData};
