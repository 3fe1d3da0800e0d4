// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::string::String;

use thiserror::Error;
use trellis_tree::{NodeId, TreeError};

/// A drop that did not go through.
///
/// Visual drag state is unwound regardless; these only describe why nothing
/// was committed.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DropError {
    /// The target refused the dragged items.
    #[error("{0:?} does not accept the dragged items")]
    Rejected(NodeId),
    /// The target was cleaned up before the drop landed.
    #[error("drop target {0:?} is not alive")]
    DeadTarget(NodeId),
    /// The tree refused a structural change made by the drop.
    #[error(transparent)]
    Tree(#[from] TreeError),
    /// The transaction collaborator failed.
    #[error("transaction failed: {0}")]
    Transaction(String),
}
