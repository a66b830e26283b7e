// Copyright 2025 the Handoff Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Handoff Host: the document that drag-and-drop bindings attach to.
//!
//! ## Overview
//!
//! This crate stands in for the native pointer-drag input source and the UI
//! host around it. It knows nothing about payloads or drag stores; it only
//! moves events.
//!
//! - [`Tree`]: a document, its body, and nested elements with client-space
//!   bounds, flags, and string dataset attributes.
//! - [`Host`]: a shared handle owning the tree, a listener registry, a
//!   next-turn [`TaskQueue`], and a typed context registry.
//! - [`router`]: the target → bubble order an event travels in.
//! - [`DragSession`]: fires `dragstart`, `dragenter`, `dragover`, `dragleave`,
//!   `drop`, and `dragend` the way a browser would for one pointer gesture.
//!
//! ## Workflow
//!
//! 1) Build elements with [`Host::insert`].
//! 2) Attach listeners with [`Host::add_listener`]; keep the returned
//!    [`ListenerHandle`] alive for as long as the listener should run.
//! 3) Drive a gesture with [`Host::start_drag`], then
//!    [`DragSession::move_to`] and [`DragSession::release`].
//! 4) Run deferred work with [`Host::run_pending`] between steps.
//!
//! ```
//! use handoff_host::{EventKind, Host, LocalNode, NodeFlags};
//! use kurbo::{Point, Rect};
//!
//! let host = Host::new();
//! let card = host.insert(host.body(), LocalNode::element(Rect::new(0.0, 0.0, 50.0, 50.0))).unwrap();
//! host.toggle_flags(card, NodeFlags::DRAGGABLE, true);
//! let zone = host.insert(host.body(), LocalNode::element(Rect::new(100.0, 0.0, 200.0, 100.0))).unwrap();
//! let _accept = host.add_listener(zone, EventKind::DragOver, |e| e.prevent_default());
//!
//! let mut session = host.start_drag(card, Point::new(10.0, 10.0)).unwrap();
//! assert!(session.move_to(Point::new(150.0, 50.0)));
//! assert_eq!(session.release(), handoff_host::DragOutcome::Dropped(zone));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod error;
mod event;
mod host;
mod queue;
pub mod router;
mod session;
mod tree;
mod types;

pub use error::HostError;
pub use event::{DataTransfer, DragEvent, DragImage, EventKind};
pub use host::{Host, ListenerHandle, WeakHost};
pub use queue::TaskQueue;
pub use session::{DragOutcome, DragSession};
pub use tree::{Hit, Tree};
pub use types::{LocalNode, NodeFlags, NodeId, NodeKind};
