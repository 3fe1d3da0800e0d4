// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Structural errors.

use thiserror::Error;

use crate::NodeId;

/// A structural request the tree refused.
///
/// Stale handles on ordinary queries and setters are not errors; only requests
/// that cannot be honored at all are reported.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum TreeError {
    /// The requested parent has been cleaned up.
    #[error("parent {0:?} is not alive")]
    DeadParent(NodeId),
    /// Reparenting would make a node its own ancestor.
    #[error("cannot move {node:?} under its own descendant {parent:?}")]
    Cycle {
        /// The node being moved.
        node: NodeId,
        /// The requested new parent.
        parent: NodeId,
    },
    /// The node being moved has been cleaned up.
    #[error("node {0:?} is not alive")]
    DeadNode(NodeId),
}
