// Copyright 2025 the Handoff Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer-drag session: the native input source.
//!
//! A [`DragSession`] turns pointer gestures into the event sequence a browser
//! would fire:
//!
//! 1) [`Host::start_drag`] fires `dragstart` at the nearest draggable
//!    ancestor-or-self of the pressed node.
//! 2) [`DragSession::move_to`] / [`DragSession::move_over`] fire `dragenter` at
//!    the new immediate target and `dragleave` at the previous one when the
//!    target changes, then `dragover` at the current target.
//! 3) [`DragSession::release`] fires `drop` if the last `dragover` was
//!    accepted (some listener prevented its default) and `dragleave`
//!    otherwise, then `dragend` at the source. [`DragSession::cancel`] always
//!    takes the `dragleave` path.
//!
//! Deferred work queued by listeners is not run by the session; call
//! [`Host::run_pending`] or [`Host::run_until_idle`] between steps the way an
//! event loop would.

use kurbo::Point;

use crate::error::HostError;
use crate::event::{DragEvent, DragImage, EventKind};
use crate::host::Host;
use crate::types::{NodeFlags, NodeId};

/// How a session ended.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DragOutcome {
    /// `drop` fired at this node.
    Dropped(NodeId),
    /// No target accepted the drag.
    Canceled,
}

/// One in-flight pointer drag.
#[derive(Debug)]
pub struct DragSession {
    host: Host,
    source: NodeId,
    current: Option<NodeId>,
    position: Point,
    accepted: bool,
    drag_image: Option<DragImage>,
    finished: bool,
}

impl Host {
    /// Start dragging from `pressed` at `at`.
    ///
    /// Fails if `pressed` is stale, has no draggable ancestor-or-self, or a
    /// `dragstart` listener prevents the default action.
    pub fn start_drag(&self, pressed: NodeId, at: Point) -> Result<DragSession, HostError> {
        if !self.is_alive(pressed) {
            return Err(HostError::StaleNode(pressed));
        }
        let source = self
            .with_tree(|t| t.closest_with_flags(pressed, NodeFlags::DRAGGABLE))
            .ok_or(HostError::NotDraggable(pressed))?;
        let event = self.dispatch(DragEvent::new(EventKind::DragStart, source, at));
        if event.default_prevented() {
            tracing::debug!(?source, "dragstart canceled by listener");
            return Err(HostError::DragCanceled(source));
        }
        let drag_image = event.data_transfer.and_then(|dt| dt.drag_image());
        tracing::debug!(?source, ?drag_image, "drag started");
        Ok(DragSession {
            host: self.clone(),
            source,
            current: None,
            position: at,
            accepted: false,
            drag_image,
            finished: false,
        })
    }
}

impl DragSession {
    /// The node `dragstart` fired at.
    pub fn source(&self) -> NodeId {
        self.source
    }

    /// The current immediate target, if the cursor has moved yet.
    pub fn current_target(&self) -> Option<NodeId> {
        self.current
    }

    /// Last cursor position.
    pub fn position(&self) -> Point {
        self.position
    }

    /// The ghost image a `dragstart` listener registered, if any.
    pub fn drag_image(&self) -> Option<DragImage> {
        self.drag_image
    }

    /// Whether the last `dragover` was accepted by a listener.
    pub fn accepted(&self) -> bool {
        self.accepted
    }

    /// Move the cursor to `to`, targeting whatever is under it (the body when
    /// nothing is). Returns whether the `dragover` was accepted.
    pub fn move_to(&mut self, to: Point) -> bool {
        let target = self
            .host
            .with_tree(|t| t.hit_test_point(to).map(|hit| hit.node))
            .unwrap_or_else(|| self.host.body());
        self.move_over(target, to)
    }

    /// Move the cursor to `to` over `target` without hit testing.
    /// Returns whether the `dragover` was accepted.
    pub fn move_over(&mut self, target: NodeId, to: Point) -> bool {
        self.position = to;
        if self.current != Some(target) {
            let previous = self.current;
            self.host.dispatch(
                DragEvent::new(EventKind::DragEnter, target, to).with_related_target(previous),
            );
            if let Some(previous) = previous {
                self.fire(EventKind::DragLeave, previous, Some(target));
            }
            self.current = Some(target);
        }
        let event = self
            .host
            .dispatch(DragEvent::new(EventKind::DragOver, target, to));
        self.accepted = event.default_prevented();
        self.accepted
    }

    /// Release the pointer, dropping on the current target if it accepted.
    pub fn release(mut self) -> DragOutcome {
        self.finish(true)
    }

    /// Abort the drag.
    pub fn cancel(mut self) -> DragOutcome {
        self.finish(false)
    }

    fn fire(&self, kind: EventKind, target: NodeId, related: Option<NodeId>) {
        if self.host.is_alive(target) {
            self.host.dispatch(
                DragEvent::new(kind, target, self.position).with_related_target(related),
            );
        }
    }

    fn finish(&mut self, drop_allowed: bool) -> DragOutcome {
        self.finished = true;
        let outcome = match self.current.take() {
            Some(target) if drop_allowed && self.accepted => {
                self.fire(EventKind::Drop, target, None);
                DragOutcome::Dropped(target)
            }
            Some(target) => {
                self.fire(EventKind::DragLeave, target, None);
                DragOutcome::Canceled
            }
            None => DragOutcome::Canceled,
        };
        self.fire(EventKind::DragEnd, self.source, None);
        tracing::debug!(source = ?self.source, ?outcome, "drag finished");
        outcome
    }
}

impl Drop for DragSession {
    fn drop(&mut self) {
        if !self.finished {
            self.finish(false);
        }
    }
}
