// Copyright 2025 the Handoff Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use handoff_host::{HostError, NodeId};

/// Errors raised while mounting providers or resolving scopes.
#[derive(Copy, Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    /// No provider for this payload type exists at `node` or above it.
    #[error("no drag-and-drop provider above node {node:?}")]
    MissingProvider {
        /// Where the lookup started.
        node: NodeId,
    },
    /// The host rejected the operation.
    #[error(transparent)]
    Host(#[from] HostError),
}
