// Copyright 2025 the Handoff Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Providers and scopes.
//!
//! A [`Provider`] is mounted at a node and makes a [`DragStore`] visible to
//! that node's subtree through the host's context registry. Nested providers
//! resolve against the nearest ancestor store for the same payload type, so by
//! default every provider under a root shares the root's store.
//!
//! A [`Scope`] is what bindings are built from: the host plus the resolved
//! store. It is obtained from a mounted provider, or looked up from any node
//! with [`Scope::lookup`].

use alloc::rc::{Rc, Weak};
use core::cell::Cell;

use handoff_host::{EventKind, Host, HostError, ListenerHandle, NodeId};
use handoff_store::{DragState, DragStore, Monitor, Resolved, ScopePolicy, ScopeRole, resolve};

use crate::error::Error;
use crate::source::{DragOptions, DragSource};
use crate::target::{DropOptions, DropTarget};

/// Mount-time configuration for a [`Provider`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ProviderOptions {
    /// How to treat an ancestor provider's store.
    pub policy: ScopePolicy,
    /// Whether an owning provider records the cursor while it is outside every
    /// drop target.
    pub track_limbo: bool,
}

impl Default for ProviderOptions {
    fn default() -> Self {
        Self {
            policy: ScopePolicy::Delegate,
            track_limbo: true,
        }
    }
}

impl ProviderOptions {
    /// Set the scope policy.
    pub fn policy(mut self, policy: ScopePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Enable or disable limbo tracking.
    pub fn track_limbo(mut self, track: bool) -> Self {
        self.track_limbo = track;
        self
    }
}

/// A host paired with the store bindings in one subtree operate on.
pub struct Scope<T> {
    host: Host,
    store: Rc<DragStore<T>>,
}

impl<T> Clone for Scope<T> {
    fn clone(&self) -> Self {
        Self {
            host: self.host.clone(),
            store: self.store.clone(),
        }
    }
}

impl<T: core::fmt::Debug> core::fmt::Debug for Scope<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Scope")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl<T> Scope<T> {
    /// The host bindings attach to.
    pub fn host(&self) -> &Host {
        &self.host
    }

    /// The shared store.
    pub fn store(&self) -> &Rc<DragStore<T>> {
        &self.store
    }

    /// Whether both scopes operate on the same store.
    pub fn same_store(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.store, &other.store)
    }
}

impl<T: Clone + 'static> Scope<T> {
    /// Pair `host` with an existing store.
    pub fn new(host: &Host, store: Rc<DragStore<T>>) -> Self {
        Self {
            host: host.clone(),
            store,
        }
    }

    /// The scope of the nearest provider at or above `node`.
    pub fn lookup(host: &Host, node: NodeId) -> Result<Self, Error> {
        if !host.is_alive(node) {
            return Err(HostError::StaleNode(node).into());
        }
        let registration = host
            .context::<Registration<T>>(node)
            .ok_or(Error::MissingProvider { node })?;
        Ok(Self::new(host, registration.store.clone()))
    }

    /// A read-only view of the drag status.
    pub fn state(&self) -> DragState<T> {
        DragState::new(self.store.clone())
    }

    /// Bind a drag source in this scope.
    pub fn drag_source(&self, options: DragOptions<T>) -> DragSource<T> {
        DragSource::new(self, options)
    }

    /// Bind a drop target in this scope.
    pub fn drop_target(&self, options: DropOptions<T>) -> DropTarget<T> {
        DropTarget::new(self, options)
    }
}

/// What an owning provider registers at its node.
///
/// Mounting over an existing owner keeps the older registration in
/// `shadowed`; unmounting restores the nearest one that is still mounted.
struct Registration<T> {
    store: Rc<DragStore<T>>,
    mounted: Cell<bool>,
    shadowed: Option<Rc<Registration<T>>>,
}

impl<T> Registration<T> {
    fn nearest_mounted(mut next: Option<&Rc<Self>>) -> Option<Rc<Self>> {
        while let Some(registration) = next {
            if registration.mounted.get() {
                return Some(registration.clone());
            }
            next = registration.shadowed.as_ref();
        }
        None
    }
}

/// A mounted provider. Dropping it unmounts.
pub struct Provider<T: Clone + 'static> {
    scope: Scope<T>,
    node: NodeId,
    role: ScopeRole,
    registration: Option<Rc<Registration<T>>>,
    _limbo: Option<ListenerHandle>,
}

impl<T: Clone + core::fmt::Debug + 'static> core::fmt::Debug for Provider<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Provider")
            .field("node", &self.node)
            .field("role", &self.role)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

impl<T: Clone + 'static> Provider<T> {
    /// Mount a provider at `node`.
    ///
    /// With no provider above `node`, or with [`ScopePolicy::Isolate`], the new
    /// provider owns a fresh store and registers it at `node`. Otherwise it
    /// forwards to the ancestor's store and registers nothing.
    pub fn mount(host: &Host, node: NodeId, options: ProviderOptions) -> Result<Self, Error> {
        if !host.is_alive(node) {
            return Err(HostError::StaleNode(node).into());
        }
        Ok(Self::mount_at(host, node, options))
    }

    /// Mount a provider at the document with default options.
    pub fn root(host: &Host) -> Self {
        Self::mount_at(host, host.document(), ProviderOptions::default())
    }

    fn mount_at(host: &Host, node: NodeId, options: ProviderOptions) -> Self {
        let ancestor = host.context::<Registration<T>>(node);
        let Resolved { store, role } = resolve(ancestor.map(|a| a.store.clone()), options.policy);
        let mut registration = None;
        let mut limbo = None;
        if role == ScopeRole::Owner {
            let shadowed = host.withdraw::<Registration<T>>(node);
            let own = Rc::new(Registration {
                store: store.clone(),
                mounted: Cell::new(true),
                shadowed,
            });
            host.provide(node, own.clone());
            registration = Some(own);
            if options.track_limbo {
                limbo = Some(track_limbo(host, &store));
            }
        }
        tracing::debug!(?node, ?role, policy = ?options.policy, "provider mounted");
        Self {
            scope: Scope::new(host, store),
            node,
            role,
            registration,
            _limbo: limbo,
        }
    }

    /// The scope bindings under this provider use.
    pub fn scope(&self) -> &Scope<T> {
        &self.scope
    }

    /// The node the provider is mounted at.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Whether this provider owns its store.
    pub fn role(&self) -> ScopeRole {
        self.role
    }

    /// The store this provider resolved to.
    pub fn store(&self) -> &Rc<DragStore<T>> {
        self.scope.store()
    }

    /// A read-only view of the drag status.
    pub fn state(&self) -> DragState<T> {
        self.scope.state()
    }
}

impl<T: Clone + 'static> Drop for Provider<T> {
    fn drop(&mut self) {
        let Some(own) = self.registration.take() else {
            return;
        };
        own.mounted.set(false);
        let host = self.scope.host();
        match host.withdraw::<Registration<T>>(self.node) {
            Some(current) if !Rc::ptr_eq(&current, &own) => {
                // Someone else registered here after us; leave theirs in place.
                host.provide(self.node, current);
            }
            _ => {
                if let Some(previous) = Registration::nearest_mounted(own.shadowed.as_ref()) {
                    host.provide(self.node, previous);
                }
            }
        }
        tracing::debug!(node = ?self.node, "provider unmounted");
    }
}

/// Record the cursor while it is over no drop target.
///
/// Targets stop `dragover` from bubbling, so a `dragover` that reaches the
/// document was not handled by any of them.
fn track_limbo<T: Clone + 'static>(host: &Host, store: &Rc<DragStore<T>>) -> ListenerHandle {
    let store: Weak<DragStore<T>> = Rc::downgrade(store);
    host.add_listener(host.document(), EventKind::DragOver, move |event| {
        let Some(store) = store.upgrade() else {
            return;
        };
        if event.default_prevented() {
            return;
        }
        let Some(dragging_id) = store.dragging_id() else {
            return;
        };
        store.set_monitor(Some(Monitor {
            position: event.client,
            dragging_id: Some(dragging_id),
            droppable_id: None,
        }));
    })
}
