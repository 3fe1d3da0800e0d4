// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trellis Nav: input routing through behavior chains.
//!
//! [`EventNav`] owns a [`Scene`] (the tree plus its focus and selection state)
//! and turns raw pointer, key, and wheel input into calls on [`Behavior`]s:
//! - Pointer events go to the topmost live node under the pointer, keys go to
//!   the focused node (or the root).
//! - From there the event walks up to the root. Each node offers its *local*
//!   behaviors, then its *heritable* ones (attached to an ancestor and seen by
//!   every descendant). A behavior runs at most once per event.
//! - A behavior in the middle of a gesture can claim **global overrides** for
//!   some event kinds. The owner sees those events first, wherever the pointer
//!   is, until it releases them. Claims replace; they never stack.
//! - Each handler answers with a [`DispatchStatus`]; `Stop` ends the walk.
//!
//! Pointer presses are classified in one place ([`classify`]) so gestures
//! agree on which presses belong to whom. [`KeyFocus`] provides keyboard focus
//! movement.
//!
//! ```rust
//! use kurbo::{Point, Rect};
//! use trellis_nav::{Behavior, DispatchStatus, EventCx, EventNav, PointerEvent, Scene};
//! use trellis_tree::{LocalNode, NodeFlags, NodeId};
//!
//! struct SelectOnClick;
//!
//! impl Behavior for SelectOnClick {
//!     fn mouse_down(&mut self, cx: &mut EventCx<'_>, _: &PointerEvent, node: NodeId) -> DispatchStatus {
//!         let scene = &mut *cx.scene;
//!         match scene.tree.closest(node, |n| scene.tree.has_flags(n, NodeFlags::SELECTABLE)) {
//!             Some(item) => {
//!                 scene.selection.set_select(&scene.tree, &[item]);
//!                 DispatchStatus::Stop
//!             }
//!             None => DispatchStatus::Decline,
//!         }
//!     }
//! }
//!
//! let mut scene = Scene::with_root(LocalNode::new("canvas", Rect::new(0.0, 0.0, 100.0, 100.0))).unwrap();
//! let root = scene.root();
//! let card = LocalNode::new("card", Rect::new(10.0, 10.0, 40.0, 40.0)).with_flags(NodeFlags::SELECTABLE);
//! let card = scene.spawn(root, card).unwrap();
//!
//! let mut nav = EventNav::new(scene);
//! let select = nav.add_behavior(Box::new(SelectOnClick));
//! nav.attach_heritable(root, select);
//!
//! assert_eq!(nav.pointer_down(PointerEvent::at(Point::new(20.0, 20.0))), DispatchStatus::Stop);
//! assert_eq!(nav.scene().selection.selected(), [card]);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod behavior;
mod click;
mod event;
mod key_focus;
mod nav;
mod scene;

pub use behavior::{Behavior, BehaviorId, DispatchContext, DispatchStatus, EventCx};
pub use click::{ClickClass, ClickCounter, HeldKeys, NavConfig, classify, is_right_click};
pub use event::{
    EventKind, InputEvent, Key, KeyEvent, Modifiers, PointerButton, PointerEvent, WheelEvent,
};
pub use key_focus::KeyFocus;
pub use nav::EventNav;
pub use scene::Scene;
