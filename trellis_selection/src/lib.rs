// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trellis Selection: grouping nodes for collective operations.
//!
//! Selection is separate from focus. Focus is the one node the user is
//! operating on; a selection is any group of nodes gathered by shift-arrow
//! ranges, toggling, or a lasso rectangle.
//!
//! - [`SelectionState`] holds the set. Selecting a node deselects its
//!   descendants, since a selected node already stands for its subtree.
//! - [`compute_selection`] turns "extend from here to there" into a span of
//!   siblings.
//! - [`lowest_common_sibling_ancestors`] lifts an arbitrary hit set to one
//!   tree level; the lasso helper [`SelectionState::select_in_rect`] uses it.
//!
//! ```rust
//! use kurbo::Rect;
//! use trellis_selection::{SelectionState, compute_selection};
//! use trellis_tree::{LocalNode, Tree};
//!
//! let item = || LocalNode::new("bullet", Rect::ZERO);
//! let mut tree = Tree::new();
//! let list = tree.spawn(None, item()).unwrap();
//! let a = tree.spawn(Some(list), item()).unwrap();
//! let b = tree.spawn(Some(list), item()).unwrap();
//! let c = tree.spawn(Some(list), item()).unwrap();
//!
//! let mut selection = SelectionState::new();
//! selection.set_select(&tree, &compute_selection(&tree, a, c));
//! assert_eq!(selection.selected(), vec![a, b, c]);
//!
//! selection.set_select(&tree, &[list]);
//! assert_eq!(selection.selected(), vec![list]);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod range;
mod state;

pub use range::{compute_selection, lowest_common_sibling_ancestors};
pub use state::SelectionState;
