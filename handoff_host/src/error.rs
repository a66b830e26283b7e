// Copyright 2025 the Handoff Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host error type.

use crate::types::NodeId;

/// Errors reported by the element tree and the drag session driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    /// The node was removed (or its slot reused) before this call.
    #[error("node {0:?} is not alive")]
    StaleNode(NodeId),
    /// A drag was started from a node with no draggable ancestor-or-self.
    #[error("node {0:?} is not inside a draggable node")]
    NotDraggable(NodeId),
    /// A `dragstart` listener prevented the default action.
    #[error("drag from {0:?} was canceled by a dragstart listener")]
    DragCanceled(NodeId),
    /// Inserting a second document root.
    #[error("a tree has exactly one document node")]
    DuplicateDocument,
}
