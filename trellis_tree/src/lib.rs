// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trellis Tree: the node arena behind an interactive canvas.
//!
//! Every interactive thing on a Trellis canvas is a node in a [`Tree`]: cards,
//! their fields, portals onto other canvases, handles and menus. The tree owns
//! identity and lifetime; other subsystems (focus, selection, dispatch, drag)
//! refer to nodes by [`NodeId`] and re-validate before use.
//!
//! - Parents own their children. [`Tree::cleanup`] releases a whole subtree,
//!   children first, running per-node cleanup hooks and dropping owned
//!   subscriptions. It is idempotent.
//! - Nodes walk [`Lifecycle`] `Constructed → Initialized → Live → CleaningUp → Dead`.
//! - Capabilities are a [`NodeFlags`] bitset resolved when the node is built.
//! - Bounds live in the logical plane of the nearest enclosing space. A node
//!   carrying a [`SpaceView`] opens a nested plane (a canvas, or a portal onto
//!   one) with its own pan and zoom; conversions walk the chain of spaces.
//!
//! ## API overview
//!
//! - [`Tree`]: container managing nodes, lifecycle, and the depth-ordering service.
//! - [`LocalNode`]: per-node data (bounds, kind, flags, z, hit shape, optional space).
//! - [`HitShape`]: rectangular by default; circles, radial slices, and custom predicates
//!   cover non-rectangular nodes.
//! - [`Indication`]: reactive visual hints (drag, navigate, can-drop).
//!
//! Key operations:
//! - [`Tree::insert`] / [`Tree::spawn`] → [`NodeId`]; [`Tree::init`]; [`Tree::commit`] → [`Damage`].
//! - [`Tree::cleanup`], [`Tree::on_cleanup`], [`Tree::own_subscription`].
//! - [`Tree::reparent`] refuses cycles with [`TreeError::Cycle`].
//! - Upward queries: [`Tree::closest`], [`Tree::find_closest`], [`Tree::closest_parent`],
//!   [`Tree::closest_of_kind`], [`Tree::contains`], [`Tree::lowest_common_ancestor`].
//! - Downward queries: [`Tree::find_child`], [`Tree::find_child_shallow`],
//!   [`Tree::find_children`], [`Tree::find_deepest_child`].
//! - Ordered traversal: [`Tree::find_succeeding_node`], [`Tree::find_preceding_node`],
//!   [`Tree::prev_sibling`], [`Tree::next_sibling`], [`Tree::siblings_between`].
//! - Hit testing: [`Tree::node_at_point`], [`Tree::nodes_at_rect`], [`Tree::intersects_point`].
//! - Spaces: [`Tree::client_to_space`], [`Tree::space_to_client`], [`Tree::plane_scale`],
//!   [`Tree::client_box`], [`Tree::enclosing_space`].
//! - Stacking: [`Tree::set_z_override`], [`Tree::effective_z`], [`Tree::z_enumerate`].
//!
//! ```rust
//! use kurbo::{Point, Rect};
//! use trellis_tree::{LocalNode, NodeFlags, SpaceView, Tree};
//!
//! let mut tree = Tree::new();
//! let canvas = tree
//!     .spawn(
//!         None,
//!         LocalNode::new("canvas", Rect::new(0.0, 0.0, 800.0, 600.0))
//!             .with_space(SpaceView::new(Point::ZERO, 2.0)),
//!     )
//!     .unwrap();
//! let card = tree
//!     .spawn(
//!         Some(canvas),
//!         LocalNode::new("card", Rect::new(100.0, 100.0, 200.0, 150.0))
//!             .with_flags(NodeFlags::DRAGGABLE),
//!     )
//!     .unwrap();
//! tree.commit();
//!
//! // The canvas is zoomed 2x, so the card covers client (200, 200)..(400, 300).
//! assert_eq!(tree.node_at_point(canvas, Point::new(300.0, 250.0), |_| true), Some(card));
//! assert_eq!(tree.client_to_space(canvas, Point::new(300.0, 250.0)), Point::new(150.0, 125.0));
//!
//! assert_eq!(tree.cleanup(canvas), vec![card, canvas]);
//! assert!(!tree.is_alive(card));
//! assert!(tree.cleanup(canvas).is_empty());
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod damage;
mod error;
mod hit;
mod query;
mod tree;
mod types;

pub use damage::Damage;
pub use error::TreeError;
pub use tree::Tree;
pub use types::{
    DragMode, HitPredicate, HitShape, Indication, Lifecycle, LocalNode, NodeFlags, NodeId,
    SpaceView,
};
