// Copyright 2025 the Handoff Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Element tree: structure, dataset attributes, and hit testing.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use kurbo::{Point, Rect};

use crate::error::HostError;
use crate::router::ParentLookup;
use crate::types::{LocalNode, NodeFlags, NodeId, NodeKind};

/// Results of a hit test.
#[derive(Clone, Debug)]
pub struct Hit {
    /// The matched node.
    pub node: NodeId,
    /// Path from the document to node (inclusive).
    pub path: Vec<NodeId>,
}

#[derive(Clone, Debug)]
struct Node {
    generation: u32,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    local: LocalNode,
    dataset: BTreeMap<String, String>,
}

impl Node {
    fn new(generation: u32, local: LocalNode) -> Self {
        Self {
            generation,
            parent: None,
            children: Vec::new(),
            local,
            dataset: BTreeMap::new(),
        }
    }
}

/// A document with a body and any number of nested elements.
pub struct Tree {
    nodes: Vec<Option<Node>>, // slots
    generations: Vec<u32>,    // last generation per slot (persists across frees)
    free_list: Vec<usize>,
    document: NodeId,
    body: NodeId,
}

impl core::fmt::Debug for Tree {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.nodes.len();
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        f.debug_struct("Tree")
            .field("nodes_total", &total)
            .field("nodes_alive", &alive)
            .field("free_list", &self.free_list.len())
            .finish_non_exhaustive()
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// Create a tree holding a document and its body.
    pub fn new() -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            document: NodeId::new(0, 1),
            body: NodeId::new(1, 1),
        };
        tree.document = tree.alloc(LocalNode {
            kind: NodeKind::Document,
            flags: NodeFlags::VISIBLE,
            ..Default::default()
        });
        tree.body = tree.alloc(LocalNode::default());
        tree.link_parent(tree.body, tree.document);
        tree
    }

    /// The document root.
    pub fn document(&self) -> NodeId {
        self.document
    }

    /// The body element; the fallback target when the cursor is over nothing else.
    pub fn body(&self) -> NodeId {
        self.body
    }

    /// Insert a new node as the last child of `parent`.
    pub fn insert(&mut self, parent: NodeId, local: LocalNode) -> Result<NodeId, HostError> {
        if !self.is_alive(parent) {
            return Err(HostError::StaleNode(parent));
        }
        if local.kind == NodeKind::Document {
            return Err(HostError::DuplicateDocument);
        }
        let id = self.alloc(local);
        self.link_parent(id, parent);
        Ok(id)
    }

    /// Remove a node and its subtree, returning every removed id (subtree root first).
    ///
    /// The document and the body cannot be removed; removing them is a no-op.
    pub fn remove(&mut self, id: NodeId) -> Vec<NodeId> {
        let mut removed = Vec::new();
        if !self.is_alive(id) || id == self.document || id == self.body {
            return removed;
        }
        if let Some(parent) = self.node(id).and_then(|n| n.parent) {
            self.unlink_parent(id, parent);
        }
        self.remove_subtree(id, &mut removed);
        removed
    }

    fn remove_subtree(&mut self, id: NodeId, removed: &mut Vec<NodeId>) {
        let children = self.node(id).map(|n| n.children.clone()).unwrap_or_default();
        removed.push(id);
        self.nodes[id.idx()] = None;
        self.free_list.push(id.idx());
        for child in children {
            self.remove_subtree(child, removed);
        }
    }

    /// Returns true if `id` refers to a live node.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Parent of `id`, or `None` for the document and stale ids.
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.parent
    }

    /// Children of `id` in insertion order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Kind of a live node.
    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.node(id).map(|n| n.local.kind)
    }

    /// Flags of a live node.
    pub fn flags(&self, id: NodeId) -> Option<NodeFlags> {
        self.node(id).map(|n| n.local.flags)
    }

    /// Replace node flags.
    pub fn set_flags(&mut self, id: NodeId, flags: NodeFlags) {
        if let Some(n) = self.node_mut(id) {
            n.local.flags = flags;
        }
    }

    /// Set or clear individual flags, leaving the others untouched.
    pub fn toggle_flags(&mut self, id: NodeId, flags: NodeFlags, on: bool) {
        if let Some(n) = self.node_mut(id) {
            n.local.flags.set(flags, on);
        }
    }

    /// Bounds of a live node.
    pub fn bounds(&self, id: NodeId) -> Option<Rect> {
        self.node(id).map(|n| n.local.bounds)
    }

    /// Update bounds.
    pub fn set_bounds(&mut self, id: NodeId, bounds: Rect) {
        if let Some(n) = self.node_mut(id) {
            n.local.bounds = bounds;
        }
    }

    /// Update z index.
    pub fn set_z_index(&mut self, id: NodeId, z: i32) {
        if let Some(n) = self.node_mut(id) {
            n.local.z_index = z;
        }
    }

    /// Set a dataset attribute, returning the previous value.
    pub fn set_data_attr(
        &mut self,
        id: NodeId,
        key: &str,
        value: impl Into<String>,
    ) -> Option<String> {
        self.node_mut(id)?.dataset.insert(key.into(), value.into())
    }

    /// Read a dataset attribute.
    pub fn data_attr(&self, id: NodeId, key: &str) -> Option<&str> {
        self.node(id)?.dataset.get(key).map(String::as_str)
    }

    /// Remove a dataset attribute, returning its value.
    pub fn remove_data_attr(&mut self, id: NodeId, key: &str) -> Option<String> {
        self.node_mut(id)?.dataset.remove(key)
    }

    /// Map a handle to the node that receives events for it.
    ///
    /// The document resolves to its body. Stale ids resolve to `None`.
    pub fn resolve_target(&self, id: NodeId) -> Option<NodeId> {
        match self.kind(id)? {
            NodeKind::Document => Some(self.body),
            NodeKind::Element | NodeKind::Svg => Some(id),
        }
    }

    /// Nearest ancestor-or-self of `id` carrying all of `flags`.
    pub fn closest_with_flags(&self, id: NodeId, flags: NodeFlags) -> Option<NodeId> {
        let mut cur = Some(id);
        while let Some(n) = cur {
            let node = self.node(n)?;
            if node.local.flags.contains(flags) {
                return Some(n);
            }
            cur = node.parent;
        }
        None
    }

    /// Whether `node` is `ancestor` or one of its descendants.
    pub fn is_within(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut cur = Some(node);
        while let Some(n) = cur {
            if n == ancestor {
                return self.is_alive(n);
            }
            cur = self.parent_of(n);
        }
        false
    }

    /// Path from the document down to `id` (inclusive). Empty for stale ids.
    pub fn path_to_root(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cur = Some(id);
        while let Some(n) = cur {
            let Some(node) = self.node(n) else {
                break;
            };
            out.push(n);
            cur = node.parent;
        }
        out.reverse();
        out
    }

    /// Hit test a client-space point. Returns the topmost visible, pickable node.
    ///
    /// Higher `z_index` wins; among equal `z_index`, the node visited later in
    /// document order (children after parents, later siblings after earlier
    /// ones) wins. The document itself is never returned.
    pub fn hit_test_point(&self, pt: Point) -> Option<Hit> {
        let mut best: Option<(NodeId, i32)> = None;
        let mut stack = Vec::new();
        stack.push(self.body);
        while let Some(id) = stack.pop() {
            let Some(node) = self.node(id) else {
                continue;
            };
            let flags = node.local.flags;
            if flags.contains(NodeFlags::VISIBLE | NodeFlags::PICKABLE)
                && node.local.bounds.contains(pt)
            {
                let z = node.local.z_index;
                match best {
                    Some((_, z_best)) if z < z_best => {}
                    _ => best = Some((id, z)),
                }
            }
            // Reverse so the first child is visited first.
            stack.extend(node.children.iter().rev().copied());
        }
        best.map(|(node, _)| Hit {
            node,
            path: self.path_to_root(node),
        })
    }

    // --- internals ---

    fn alloc(&mut self, local: LocalNode) -> NodeId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(Node::new(generation, local));
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.nodes.push(Some(Node::new(generation, local)));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            ((self.nodes.len() - 1) as u32, generation)
        };
        NodeId::new(idx, generation)
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        let n = self.nodes.get(id.idx())?.as_ref()?;
        (n.generation == id.1).then_some(n)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let n = self.nodes.get_mut(id.idx())?.as_mut()?;
        if n.generation != id.1 {
            return None;
        }
        Some(n)
    }

    fn link_parent(&mut self, id: NodeId, parent: NodeId) {
        if let Some(p) = self.node_mut(parent) {
            p.children.push(id);
        }
        if let Some(n) = self.node_mut(id) {
            n.parent = Some(parent);
        }
    }

    fn unlink_parent(&mut self, id: NodeId, parent: NodeId) {
        if let Some(p) = self.node_mut(parent) {
            p.children.retain(|c| *c != id);
        }
        if let Some(n) = self.node_mut(id) {
            n.parent = None;
        }
    }
}

impl ParentLookup<NodeId> for Tree {
    fn parent_of(&self, node: &NodeId) -> Option<NodeId> {
        Self::parent_of(self, *node)
    }
}
