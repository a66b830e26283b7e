// Copyright 2025 the Handoff Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the element tree: node identifiers, kinds, flags, and geometry.

use kurbo::Rect;

/// Identifier for a node in the element tree.
///
/// A small, copyable handle made of a slot index and a generation counter.
///
/// ## Semantics
///
/// - On insert, a fresh slot is allocated with generation `1`.
/// - On remove, the slot is freed; any existing `NodeId` that pointed to that slot is now stale.
/// - On reuse of a freed slot, its generation is incremented, producing a new, distinct `NodeId`.
///
/// Use [`Tree::is_alive`](crate::Tree::is_alive) to check whether a `NodeId` still refers to a live node.
/// Stale `NodeId`s never alias a different live node because the generation must match.
///
/// The ordering is only meaningful as a map key.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

bitflags::bitflags! {
    /// Node flags controlling picking and dragging.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u8 {
        /// Node is visible (participates in hit testing).
        const VISIBLE   = 0b0000_0001;
        /// Node is pickable (can be the target of pointer events).
        const PICKABLE  = 0b0000_0010;
        /// Node is a native drag handle; a drag can start from it or its descendants.
        const DRAGGABLE = 0b0000_0100;
    }
}

impl Default for NodeFlags {
    fn default() -> Self {
        Self::VISIBLE | Self::PICKABLE
    }
}

/// What kind of node a [`NodeId`] refers to.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum NodeKind {
    /// The document root. Exactly one per tree; never hit-tested.
    Document,
    /// A regular element (the body is one).
    #[default]
    Element,
    /// An SVG node. Behaves like an element for dragging purposes.
    Svg,
}

/// Per-node data supplied on insert.
#[derive(Clone, Debug)]
pub struct LocalNode {
    /// Bounds in client coordinates. Children are not clipped to their parent.
    pub bounds: Rect,
    /// Stacking order among overlapping nodes. Higher is on top.
    pub z_index: i32,
    /// Picking and dragging flags.
    pub flags: NodeFlags,
    /// Node kind. Inserting a [`NodeKind::Document`] is rejected.
    pub kind: NodeKind,
}

impl Default for LocalNode {
    fn default() -> Self {
        Self {
            bounds: Rect::ZERO,
            z_index: 0,
            flags: NodeFlags::default(),
            kind: NodeKind::Element,
        }
    }
}

impl LocalNode {
    /// An element covering `bounds`.
    pub fn element(bounds: Rect) -> Self {
        Self {
            bounds,
            ..Default::default()
        }
    }
}
