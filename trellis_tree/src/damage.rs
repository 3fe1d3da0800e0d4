// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Damage summary types returned from commit.

use alloc::vec::Vec;
use kurbo::Rect;

use crate::NodeId;

/// A batched set of changes derived from [`crate::Tree::commit`].
#[derive(Clone, Debug, Default)]
pub struct Damage {
    /// Client-space rectangles that should be repainted.
    pub dirty_rects: Vec<Rect>,
    /// Nodes promoted from initialized to live by this commit.
    pub went_live: Vec<NodeId>,
}

impl Damage {
    /// Returns the union of all damage rects.
    pub fn union_rect(&self) -> Option<Rect> {
        let mut it = self.dirty_rects.iter().copied();
        let first = it.next()?;
        Some(it.fold(first, |acc, r| acc.union(r)))
    }

    /// `true` when nothing needs repainting and nothing went live.
    pub fn is_empty(&self) -> bool {
        self.dirty_rects.is_empty() && self.went_live.is_empty()
    }
}
