// Copyright 2025 the Handoff Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Event routing order.
//!
//! ## Overview
//!
//! Drag events are delivered to the node they target and then bubble to each
//! ancestor, innermost first. [`route`] computes that sequence from a target
//! and a [`ParentLookup`]; the [`Host`](crate::Host) walks it and runs
//! listeners, stopping early when a listener calls
//! [`DragEvent::stop_propagation`](crate::DragEvent::stop_propagation).
//!
//! ```
//! use handoff_host::router::{ParentLookup, Phase, route};
//!
//! struct Parents;
//! impl ParentLookup<u32> for Parents {
//!     fn parent_of(&self, node: &u32) -> Option<u32> {
//!         (*node > 1).then(|| node - 1)
//!     }
//! }
//!
//! let steps: Vec<(Phase, u32)> = route(3, &Parents).iter().map(|d| (d.phase, d.node)).collect();
//! assert_eq!(steps, vec![(Phase::Target, 3), (Phase::Bubble, 2), (Phase::Bubble, 1)]);
//! ```

use alloc::vec::Vec;

/// Phases of event propagation.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Phase {
    /// The node the event was fired at.
    Target,
    /// An ancestor of the target, visited innermost first.
    Bubble,
}

/// Look up the parent of a node to build the bubbling path.
pub trait ParentLookup<K> {
    /// Returns the parent of `node`, or `None` if `node` is a root.
    fn parent_of(&self, node: &K) -> Option<K>;
}

/// A single dispatch step.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Dispatch<K> {
    /// Propagation phase for this step.
    pub phase: Phase,
    /// Node whose listeners run in this step.
    pub node: K,
}

/// Produce the target → bubble sequence for `target`.
///
/// The caller ensures ancestry is acyclic.
pub fn route<K: Copy>(target: K, parents: &impl ParentLookup<K>) -> Vec<Dispatch<K>> {
    let mut out = Vec::new();
    out.push(Dispatch {
        phase: Phase::Target,
        node: target,
    });
    let mut cur = target;
    while let Some(parent) = parents.parent_of(&cur) {
        out.push(Dispatch {
            phase: Phase::Bubble,
            node: parent,
        });
        cur = parent;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
    struct Node(u32);

    struct Parents;
    impl ParentLookup<Node> for Parents {
        fn parent_of(&self, node: &Node) -> Option<Node> {
            match node.0 {
                3 => Some(Node(2)),
                2 => Some(Node(1)),
                _ => None,
            }
        }
    }

    #[test]
    fn parent_of_reconstructs_bubble_path() {
        let out = route(Node(3), &Parents);
        let phases: Vec<(Phase, u32)> = out.iter().map(|d| (d.phase, d.node.0)).collect();
        assert_eq!(
            phases,
            vec![(Phase::Target, 3), (Phase::Bubble, 2), (Phase::Bubble, 1)]
        );
    }

    #[test]
    fn root_target_is_a_singleton() {
        let out = route(Node(1), &Parents);
        assert_eq!(
            out,
            vec![Dispatch {
                phase: Phase::Target,
                node: Node(1)
            }]
        );
    }
}
