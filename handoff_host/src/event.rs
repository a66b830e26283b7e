// Copyright 2025 the Handoff Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drag events and the drag-image negotiation channel.

use kurbo::{Point, Vec2};

use crate::router::Phase;
use crate::types::NodeId;

/// Kinds of native pointer-drag events.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum EventKind {
    /// A drag begins at a draggable node.
    DragStart,
    /// The cursor entered a new immediate target.
    DragEnter,
    /// The cursor is over a target. Fired repeatedly while moving.
    DragOver,
    /// The cursor left the previous immediate target.
    DragLeave,
    /// The drag was released over a target that accepted it.
    Drop,
    /// The drag finished, fired at the source.
    DragEnd,
}

/// Custom ghost image registered during `dragstart`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DragImage {
    /// Node rendered as the ghost image.
    pub node: NodeId,
    /// Cursor offset within the image.
    pub offset: Vec2,
}

/// Data carried alongside `dragstart`.
///
/// Only the drag image is modeled; payloads travel through the store instead.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DataTransfer {
    drag_image: Option<DragImage>,
}

impl DataTransfer {
    /// Use `node` as the ghost image, positioned by `offset`.
    pub fn set_drag_image(&mut self, node: NodeId, offset: Vec2) {
        self.drag_image = Some(DragImage { node, offset });
    }

    /// The registered drag image, if any.
    pub fn drag_image(&self) -> Option<DragImage> {
        self.drag_image
    }
}

/// An event travelling through the element tree.
#[derive(Clone, Debug)]
pub struct DragEvent {
    /// What happened.
    pub kind: EventKind,
    /// Node the event was fired at.
    pub target: NodeId,
    /// Node whose listeners are currently running.
    pub current_target: NodeId,
    /// Current propagation phase.
    pub phase: Phase,
    /// Cursor position in client coordinates.
    pub client: Point,
    /// Present on `dragstart` only.
    pub data_transfer: Option<DataTransfer>,
    /// On `dragenter`, the node being left; on `dragleave`, the node being
    /// entered. `None` when there is no such node.
    pub related_target: Option<NodeId>,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl DragEvent {
    /// A fresh, unhandled event fired at `target`.
    pub fn new(kind: EventKind, target: NodeId, client: Point) -> Self {
        Self {
            kind,
            target,
            current_target: target,
            phase: Phase::Target,
            client,
            data_transfer: (kind == EventKind::DragStart).then(DataTransfer::default),
            related_target: None,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    /// Set [`DragEvent::related_target`].
    pub fn with_related_target(mut self, related: Option<NodeId>) -> Self {
        self.related_target = related;
        self
    }

    /// Mark the default action as handled. On `dragover` this accepts the drop.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Whether any listener called [`DragEvent::prevent_default`].
    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    /// Keep the event from reaching further ancestors.
    ///
    /// Remaining listeners on the current node still run.
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    /// Whether any listener called [`DragEvent::stop_propagation`].
    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}
