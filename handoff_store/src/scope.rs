// Copyright 2025 the Handoff Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scope resolution for nested providers.
//!
//! A provider created inside another provider either shares the ancestor's
//! store ([`ScopePolicy::Delegate`], the default) or allocates its own
//! ([`ScopePolicy::Isolate`]). Delegation is what lets a drag cross structural
//! grouping boundaries, such as two separately styled panels under one logical
//! drag context. Isolation hides the inner scope's drags from the outer one.
//!
//! ```
//! use std::rc::Rc;
//! use handoff_store::{DragStore, ScopePolicy, ScopeRole, resolve};
//!
//! let outer = resolve::<u32>(None, ScopePolicy::Delegate);
//! assert_eq!(outer.role, ScopeRole::Owner);
//!
//! let inner = resolve(Some(outer.store.clone()), ScopePolicy::Delegate);
//! assert_eq!(inner.role, ScopeRole::Delegate);
//! assert!(Rc::ptr_eq(&inner.store, &outer.store));
//! ```

use alloc::rc::Rc;

use crate::store::DragStore;

/// How a nested provider treats an ancestor's store.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum ScopePolicy {
    /// Reuse the nearest ancestor's store unchanged.
    #[default]
    Delegate,
    /// Always allocate an independent store.
    Isolate,
}

/// Whether a provider owns its store or forwards to an ancestor's.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ScopeRole {
    /// The provider allocated the store and is responsible for it.
    Owner,
    /// The provider forwards to an ancestor's store.
    Delegate,
}

/// Outcome of [`resolve`].
#[derive(Debug)]
pub struct Resolved<T> {
    /// The store the new scope operates on.
    pub store: Rc<DragStore<T>>,
    /// How the scope relates to that store.
    pub role: ScopeRole,
}

/// Pick the store for a provider given the nearest ancestor's store, if any.
pub fn resolve<T: Clone>(ancestor: Option<Rc<DragStore<T>>>, policy: ScopePolicy) -> Resolved<T> {
    let resolved = match (ancestor, policy) {
        (Some(store), ScopePolicy::Delegate) => Resolved {
            store,
            role: ScopeRole::Delegate,
        },
        (Some(_), ScopePolicy::Isolate) | (None, _) => Resolved {
            store: Rc::new(DragStore::new()),
            role: ScopeRole::Owner,
        },
    };
    tracing::debug!(?policy, role = ?resolved.role, "resolved drag scope");
    resolved
}
