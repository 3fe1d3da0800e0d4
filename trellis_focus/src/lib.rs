// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trellis Focus: single-path focus over a Trellis tree.
//!
//! This crate models focus as:
//! - A single **focus path** held by [`FocusState`]: one leaf node plus all of
//!   its ancestors as branches. Each node's [`FocusMark`] is a reactive value,
//!   so a node's focus and blur hooks are simply subscriptions to its mark.
//! - A **context payload** ([`FocusContext`]) handed to the newly focused node:
//!   caret offsets, the pointer position, the edge focus arrived through, and
//!   what triggered the change.
//! - **Pending focus** for nodes that do not exist yet: a matcher registered by
//!   [`FocusState::set_pending_focus`] is offered every newly materialized node
//!   and consumed by the first match.
//! - Pluggable **navigators** ([`Navigator`]) that elect the target of a
//!   directional move. Nodes can register their own; the fallback walks
//!   document order ([`TreeOrderNavigator`]). [`SpatialNavigator`] picks
//!   targets geometrically instead.
//!
//! ```rust
//! use kurbo::Rect;
//! use trellis_focus::{FocusContext, FocusMark, FocusState, Navigation};
//! use trellis_tree::{LocalNode, NodeFlags, Tree};
//!
//! let field = || LocalNode::new("field", Rect::ZERO).with_flags(NodeFlags::FOCUSABLE);
//! let mut tree = Tree::new();
//! let root = tree.spawn(None, LocalNode::default()).unwrap();
//! let first = tree.spawn(Some(root), field()).unwrap();
//! let second = tree.spawn(Some(root), field()).unwrap();
//!
//! let mut focus = FocusState::new(root);
//! focus.set_focus(&tree, first, FocusContext::default()).unwrap();
//! assert_eq!(focus.navigate(&tree, Navigation::Down), Some(second));
//! assert_eq!(focus.mark(first).get(), FocusMark::None);
//! assert!(focus.mark(second).get().is_leaf());
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod context;
mod error;
mod navigate;
mod state;

pub use context::{Edge, FocusContext, FocusTrigger, TextOffset};
pub use error::FocusError;
pub use navigate::{
    NavTarget, Navigation, Navigator, SpatialNavigator, TreeOrderNavigator, is_navigable,
};
pub use state::{FocusMark, FocusState};
