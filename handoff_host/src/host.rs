// Copyright 2025 the Handoff Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The host: element tree, listener registry, task queue, and context registry.
//!
//! ## Overview
//!
//! [`Host`] is a cheap-to-clone handle shared by everything bound to one
//! document. It owns:
//!
//! - the [`Tree`] of elements,
//! - the listener registry, keyed by node and [`EventKind`],
//! - the next-turn [`TaskQueue`],
//! - a context registry that lets a value provided at a node be found from any
//!   descendant, keyed by the value's type.
//!
//! ## Re-entrancy
//!
//! No internal borrow is held while listeners or tasks run, so listeners may
//! add or remove listeners, edit the tree, dispatch nested events, or queue
//! tasks. A listener removed during a dispatch is not called for the rest of
//! that dispatch.

use alloc::collections::BTreeMap;
use alloc::rc::{Rc, Weak};
use alloc::string::String;
use alloc::vec::Vec;
use core::any::{Any, TypeId};
use core::cell::RefCell;

use crate::error::HostError;
use crate::event::{DragEvent, EventKind};
use crate::queue::TaskQueue;
use crate::router::route;
use crate::tree::Tree;
use crate::types::{LocalNode, NodeFlags, NodeId};

type ListenerFn = Rc<dyn Fn(&mut DragEvent)>;

#[derive(Default)]
struct Registry {
    next_key: u64,
    entries: BTreeMap<(NodeId, EventKind), BTreeMap<u64, ListenerFn>>,
}

impl Registry {
    fn snapshot(&self, node: NodeId, kind: EventKind) -> Vec<(u64, ListenerFn)> {
        self.entries
            .get(&(node, kind))
            .map(|m| m.iter().map(|(k, f)| (*k, f.clone())).collect())
            .unwrap_or_default()
    }

    fn contains(&self, node: NodeId, kind: EventKind, key: u64) -> bool {
        self.entries
            .get(&(node, kind))
            .is_some_and(|m| m.contains_key(&key))
    }

    fn remove(&mut self, node: NodeId, kind: EventKind, key: u64) -> Option<ListenerFn> {
        let slot = self.entries.get_mut(&(node, kind))?;
        let removed = slot.remove(&key);
        if slot.is_empty() {
            self.entries.remove(&(node, kind));
        }
        removed
    }
}

struct HostInner {
    tree: RefCell<Tree>,
    listeners: RefCell<Registry>,
    contexts: RefCell<BTreeMap<(NodeId, TypeId), Rc<dyn Any>>>,
    queue: TaskQueue,
}

/// Shared handle to one document.
#[derive(Clone)]
pub struct Host {
    inner: Rc<HostInner>,
}

/// Non-owning handle to a [`Host`], for capture in listeners and tasks.
#[derive(Clone)]
pub struct WeakHost {
    inner: Weak<HostInner>,
}

impl WeakHost {
    /// The host, if it is still alive.
    pub fn upgrade(&self) -> Option<Host> {
        self.inner.upgrade().map(|inner| Host { inner })
    }
}

impl core::fmt::Debug for WeakHost {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WeakHost")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

impl core::fmt::Debug for Host {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let listeners: usize = self
            .inner
            .listeners
            .borrow()
            .entries
            .values()
            .map(BTreeMap::len)
            .sum();
        f.debug_struct("Host")
            .field("tree", &self.inner.tree.borrow())
            .field("listeners", &listeners)
            .field("contexts", &self.inner.contexts.borrow().len())
            .field("queue", &self.inner.queue)
            .finish()
    }
}

impl Default for Host {
    fn default() -> Self {
        Self::new()
    }
}

impl Host {
    /// A host holding an empty document.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(HostInner {
                tree: RefCell::new(Tree::new()),
                listeners: RefCell::new(Registry::default()),
                contexts: RefCell::new(BTreeMap::new()),
                queue: TaskQueue::new(),
            }),
        }
    }

    /// A non-owning handle.
    pub fn downgrade(&self) -> WeakHost {
        WeakHost {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Whether two handles refer to the same host.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    // --- tree ---

    /// Read the tree.
    ///
    /// `f` must not call back into this host's tree mutators.
    pub fn with_tree<R>(&self, f: impl FnOnce(&Tree) -> R) -> R {
        f(&self.inner.tree.borrow())
    }

    /// Edit the tree. Use [`Host::remove`] to remove nodes so their listeners go too.
    pub fn with_tree_mut<R>(&self, f: impl FnOnce(&mut Tree) -> R) -> R {
        f(&mut self.inner.tree.borrow_mut())
    }

    /// The document root.
    pub fn document(&self) -> NodeId {
        self.inner.tree.borrow().document()
    }

    /// The body element.
    pub fn body(&self) -> NodeId {
        self.inner.tree.borrow().body()
    }

    /// Insert a node under `parent`.
    pub fn insert(&self, parent: NodeId, local: LocalNode) -> Result<NodeId, HostError> {
        self.inner.tree.borrow_mut().insert(parent, local)
    }

    /// Remove a node and its subtree, along with their listeners and contexts.
    pub fn remove(&self, node: NodeId) {
        let removed = self.inner.tree.borrow_mut().remove(node);
        if removed.is_empty() {
            return;
        }
        // Drop the purged values after the borrows are released.
        let mut purged_listeners = Vec::new();
        {
            let mut registry = self.inner.listeners.borrow_mut();
            let keys: Vec<(NodeId, EventKind)> = registry
                .entries
                .keys()
                .filter(|(n, _)| removed.contains(n))
                .copied()
                .collect();
            for key in keys {
                purged_listeners.extend(registry.entries.remove(&key));
            }
        }
        let mut purged_contexts = Vec::new();
        {
            let mut contexts = self.inner.contexts.borrow_mut();
            let keys: Vec<(NodeId, TypeId)> = contexts
                .keys()
                .filter(|(n, _)| removed.contains(n))
                .copied()
                .collect();
            for key in keys {
                purged_contexts.extend(contexts.remove(&key));
            }
        }
        tracing::trace!(
            root = ?node,
            nodes = removed.len(),
            listeners = purged_listeners.len(),
            contexts = purged_contexts.len(),
            "removed subtree"
        );
    }

    /// Whether `node` is alive.
    pub fn is_alive(&self, node: NodeId) -> bool {
        self.inner.tree.borrow().is_alive(node)
    }

    /// Parent of `node`.
    pub fn parent_of(&self, node: NodeId) -> Option<NodeId> {
        self.inner.tree.borrow().parent_of(node)
    }

    /// Whether `node` is `ancestor` or one of its descendants.
    pub fn is_within(&self, node: NodeId, ancestor: NodeId) -> bool {
        self.inner.tree.borrow().is_within(node, ancestor)
    }

    /// The node that receives events for `node` (the document maps to the body).
    pub fn resolve_target(&self, node: NodeId) -> Option<NodeId> {
        self.inner.tree.borrow().resolve_target(node)
    }

    /// Read a dataset attribute.
    pub fn data_attr(&self, node: NodeId, key: &str) -> Option<String> {
        self.inner.tree.borrow().data_attr(node, key).map(String::from)
    }

    /// Set a dataset attribute, returning the previous value.
    pub fn set_data_attr(
        &self,
        node: NodeId,
        key: &str,
        value: impl Into<String>,
    ) -> Option<String> {
        self.inner.tree.borrow_mut().set_data_attr(node, key, value)
    }

    /// Remove a dataset attribute.
    pub fn remove_data_attr(&self, node: NodeId, key: &str) -> Option<String> {
        self.inner.tree.borrow_mut().remove_data_attr(node, key)
    }

    /// Set or clear individual flags on `node`.
    pub fn toggle_flags(&self, node: NodeId, flags: NodeFlags, on: bool) {
        self.inner.tree.borrow_mut().toggle_flags(node, flags, on);
    }

    // --- listeners ---

    /// Run `listener` whenever a `kind` event reaches `node`.
    ///
    /// The listener stays registered until the returned handle is dropped or
    /// `node` is removed.
    pub fn add_listener(
        &self,
        node: NodeId,
        kind: EventKind,
        listener: impl Fn(&mut DragEvent) + 'static,
    ) -> ListenerHandle {
        let key = {
            let mut registry = self.inner.listeners.borrow_mut();
            let key = registry.next_key;
            registry.next_key += 1;
            registry
                .entries
                .entry((node, kind))
                .or_default()
                .insert(key, Rc::new(listener));
            key
        };
        ListenerHandle {
            host: self.downgrade(),
            node,
            kind,
            key,
        }
    }

    /// Number of `kind` listeners on `node`.
    pub fn listener_count(&self, node: NodeId, kind: EventKind) -> usize {
        self.inner
            .listeners
            .borrow()
            .entries
            .get(&(node, kind))
            .map_or(0, BTreeMap::len)
    }

    /// Deliver `event` to its target, then bubble it to each ancestor.
    ///
    /// Returns the event as the last listener left it.
    pub fn dispatch(&self, mut event: DragEvent) -> DragEvent {
        let path = route(event.target, &*self.inner.tree.borrow());
        tracing::trace!(
            kind = ?event.kind,
            target = ?event.target,
            depth = path.len(),
            "dispatching drag event"
        );
        for step in path {
            event.phase = step.phase;
            event.current_target = step.node;
            let listeners = self.inner.listeners.borrow().snapshot(step.node, event.kind);
            for (key, listener) in listeners {
                if !self
                    .inner
                    .listeners
                    .borrow()
                    .contains(step.node, event.kind, key)
                {
                    continue;
                }
                listener(&mut event);
            }
            if event.propagation_stopped() {
                break;
            }
        }
        event
    }

    // --- tasks ---

    /// Run `task` on the next turn.
    pub fn defer(&self, task: impl FnOnce() + 'static) {
        self.inner.queue.push(task);
    }

    /// Number of tasks waiting for the next turn.
    pub fn pending_tasks(&self) -> usize {
        self.inner.queue.len()
    }

    /// Run one turn of deferred tasks. Returns how many ran.
    pub fn run_pending(&self) -> usize {
        self.inner.queue.run_turn()
    }

    /// Run turns until no task is pending. Returns how many ran.
    pub fn run_until_idle(&self) -> usize {
        self.inner.queue.run_until_idle()
    }

    // --- contexts ---

    /// Make `value` visible to `node` and its descendants, replacing any value
    /// of the same type at `node`.
    pub fn provide<C: Any>(&self, node: NodeId, value: Rc<C>) -> Option<Rc<C>> {
        let previous = self
            .inner
            .contexts
            .borrow_mut()
            .insert((node, TypeId::of::<C>()), value);
        previous.and_then(|p| p.downcast::<C>().ok())
    }

    /// Remove the `C` value provided at `node`.
    pub fn withdraw<C: Any>(&self, node: NodeId) -> Option<Rc<C>> {
        let removed = self
            .inner
            .contexts
            .borrow_mut()
            .remove(&(node, TypeId::of::<C>()));
        removed.and_then(|p| p.downcast::<C>().ok())
    }

    /// The `C` value provided at `node` or its nearest ancestor that has one.
    pub fn context<C: Any>(&self, node: NodeId) -> Option<Rc<C>> {
        let tree = self.inner.tree.borrow();
        let contexts = self.inner.contexts.borrow();
        let mut cur = Some(node);
        while let Some(n) = cur {
            if let Some(value) = contexts.get(&(n, TypeId::of::<C>())) {
                return value.clone().downcast::<C>().ok();
            }
            cur = tree.parent_of(n);
        }
        None
    }
}

/// Registration of one listener. Dropping it removes the listener.
#[must_use = "dropping a ListenerHandle removes the listener immediately"]
pub struct ListenerHandle {
    host: WeakHost,
    node: NodeId,
    kind: EventKind,
    key: u64,
}

impl ListenerHandle {
    /// Node the listener is attached to.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Event kind the listener handles.
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Remove the listener now.
    pub fn remove(self) {}
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        let Some(host) = self.host.upgrade() else {
            return;
        };
        let removed = host
            .inner
            .listeners
            .borrow_mut()
            .remove(self.node, self.kind, self.key);
        drop(removed);
    }
}

impl core::fmt::Debug for ListenerHandle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ListenerHandle")
            .field("node", &self.node)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}
