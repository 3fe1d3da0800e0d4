// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trellis Drag: drag and drop as a Trellis behavior.
//!
//! [`DragDrop`] is a [`Behavior`](trellis_nav::Behavior) that runs the whole
//! gesture:
//! - **Grab.** An unmodified primary press on a draggable node, or on a drag
//!   handle inside one, captures the drag set ([`eligible_items`]) and claims
//!   the pointer. Each [`DragItem`] remembers where it was grabbed, both in
//!   client coordinates and in its own logical plane.
//! - **Drag.** Past the threshold the items are lifted: elevated into the
//!   draggable z band and made transparent, or drawn as clones. The drop
//!   target under the pointer is tracked and marked.
//! - **Drop.** On release the target's [`DropTarget`] takes the items inside
//!   one [`Transactor`] transaction, and each item's [`DragSource`] is told
//!   it departed. If the transaction fails, items the target already moved
//!   are put back. Drag state is unwound whether or not anything was
//!   dropped, restoring each item's prior z-override and transparency.
//!
//! Targets and sources are registered per node in a [`DropRegistry`].
//! Droppable nodes without their own target use [`SpaceDropTarget`], which
//! reparents the items and places them where they were released.
//!
//! ```rust
//! use kurbo::{Point, Rect};
//! use trellis_drag::{ChangeLog, DragDrop};
//! use trellis_nav::{EventNav, PointerEvent, Scene};
//! use trellis_tree::{LocalNode, NodeFlags, SpaceView};
//!
//! let mut scene = Scene::with_root(LocalNode::new("canvas", Rect::new(0.0, 0.0, 800.0, 800.0))).unwrap();
//! let root = scene.root();
//! let card = LocalNode::new("card", Rect::new(0.0, 0.0, 100.0, 100.0)).with_flags(NodeFlags::DRAGGABLE);
//! let card = scene.spawn(root, card).unwrap();
//! let board = LocalNode::new("board", Rect::new(300.0, 300.0, 700.0, 700.0))
//!     .with_flags(NodeFlags::DROPPABLE)
//!     .with_space(SpaceView::default());
//! let board = scene.spawn(root, board).unwrap();
//!
//! let log = ChangeLog::new();
//! let mut nav = EventNav::new(scene);
//! let drag = nav.add_behavior(Box::new(DragDrop::new(log.clone())));
//! nav.attach_heritable(root, drag);
//!
//! nav.pointer_down(PointerEvent::at(Point::new(50.0, 50.0)));
//! nav.pointer_move(PointerEvent::at(Point::new(400.0, 400.0)));
//! nav.pointer_up(PointerEvent::at(Point::new(400.0, 400.0)));
//!
//! let tree = &nav.scene().tree;
//! assert_eq!(tree.parent_of(card), Some(board));
//! assert_eq!(tree.bounds(card).unwrap().origin(), Point::new(50.0, 50.0));
//! assert_eq!(log.transactions().len(), 1);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod drag;
mod error;
mod item;
mod target;
mod transaction;

pub use drag::{DragConfig, DragDrop, DragPhase, DragProxy};
pub use error::DropError;
pub use item::{DragInstance, DragItem, DragNodes, LiftedState, eligible_items};
pub use target::{
    DragSource, DropRegistry, DropRequest, DropTarget, RecordDeparture, SpaceDropTarget,
};
pub use transaction::{Change, ChangeLog, Transaction, Transactor};
