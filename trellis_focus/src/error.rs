// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use thiserror::Error;
use trellis_tree::NodeId;

/// A focus request that could not be honored.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum FocusError {
    /// The node does not carry the focusable capability.
    #[error("node {0:?} is not focusable")]
    NotFocusable(NodeId),
    /// The node has been cleaned up.
    #[error("node {0:?} is not alive")]
    DeadNode(NodeId),
}
