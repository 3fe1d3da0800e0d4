// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! What a drag carries.

use kurbo::{Point, Rect, Vec2};
use smallvec::SmallVec;
use trellis_tree::{NodeFlags, NodeId, Tree};

/// Node ids of a drag set.
pub type DragNodes = SmallVec<[NodeId; 4]>;

/// One dragged node and where the pointer grabbed it.
///
/// Two offsets are kept because nodes are shown two ways while dragging: a
/// floating clone positioned in client coordinates, or the node itself,
/// placed in the logical plane of whatever it is dropped into.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DragItem {
    /// The dragged node.
    pub node: NodeId,
    /// From the pointer to the node's client top-left.
    pub screen_offset: Vec2,
    /// From the pointer to the node's origin, in the node's own plane.
    pub logical_offset: Vec2,
    /// The node's parent when grabbed.
    pub origin_parent: Option<NodeId>,
    /// The space the node lived in when grabbed.
    pub origin_space: Option<NodeId>,
}

impl DragItem {
    /// Capture `node` grabbed at the client point `pointer`.
    ///
    /// `None` if the node is not alive.
    pub fn capture(tree: &Tree, node: NodeId, pointer: Point) -> Option<Self> {
        let client = tree.client_box(node)?;
        let bounds = tree.bounds(node)?;
        let grabbed = tree.bounds_transform(node).client_to_space(pointer);
        Some(Self {
            node,
            screen_offset: client.origin() - pointer,
            logical_offset: bounds.origin() - grabbed,
            origin_parent: tree.parent_of(node),
            origin_space: tree.enclosing_space(node),
        })
    }

    /// Client top-left of the node's clone with the pointer at `pointer`.
    pub fn client_position(&self, pointer: Point) -> Point {
        pointer + self.screen_offset
    }

    /// Origin the node gets when dropped into `target` with the pointer at
    /// `pointer`, in `target`'s child plane.
    pub fn logical_position(&self, tree: &Tree, target: NodeId, pointer: Point) -> Point {
        tree.client_to_space(target, pointer) + self.logical_offset
    }
}

/// Drag-related node state from before an item was lifted.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LiftedState {
    /// The lifted node.
    pub node: NodeId,
    /// Its z-override before the drag.
    pub z_override: Option<i32>,
    /// Whether it was already transparent to hit testing.
    pub transparent: bool,
}

impl LiftedState {
    /// Snapshot `node` as it is now.
    pub fn capture(tree: &Tree, node: NodeId) -> Self {
        Self {
            node,
            z_override: tree.z_override(node),
            transparent: tree.has_flags(node, NodeFlags::TRANSPARENT),
        }
    }

    /// Put the snapshot back. Dead nodes are skipped.
    pub fn restore(&self, tree: &mut Tree) {
        tree.set_z_override(self.node, self.z_override);
        tree.set_transparent(self.node, self.transparent);
    }
}

/// The items of one drag gesture.
#[derive(Clone, Debug, PartialEq)]
pub struct DragInstance {
    /// Dragged items in selection order.
    pub items: SmallVec<[DragItem; 4]>,
    /// Alt was held at grab: drop references instead of moving.
    pub is_transclusion: bool,
    /// Client point of the grab.
    pub start: Point,
    /// State to restore when the drag ends; empty until the items are lifted.
    pub lifted: SmallVec<[LiftedState; 4]>,
}

impl DragInstance {
    /// A gesture over `items`, grabbed at `start`.
    pub fn new(items: SmallVec<[DragItem; 4]>, is_transclusion: bool, start: Point) -> Self {
        Self {
            items,
            is_transclusion,
            start,
            lifted: SmallVec::new(),
        }
    }

    /// Ids of the dragged nodes.
    pub fn nodes(&self) -> DragNodes {
        self.items.iter().map(|i| i.node).collect()
    }

    /// Drop items whose nodes have been cleaned up.
    pub fn retain_alive(&mut self, tree: &Tree) {
        self.items.retain(|i| tree.is_alive(i.node));
    }
}

/// Where a node sat in the tree.
///
/// Taken before a drop so that a drop which fails after its target already
/// moved nodes can put them back.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct Placement {
    node: NodeId,
    parent: Option<NodeId>,
    index: usize,
    bounds: Rect,
}

impl Placement {
    pub(crate) fn capture(tree: &Tree, node: NodeId) -> Option<Self> {
        let parent = tree.parent_of(node);
        let index = parent
            .and_then(|p| tree.children_of(p).iter().position(|c| *c == node))
            .unwrap_or(0);
        Some(Self {
            node,
            parent,
            index,
            bounds: tree.bounds(node)?,
        })
    }

    /// Put every node back where it was, lowest sibling index first so
    /// siblings regain their order.
    pub(crate) fn restore_all(tree: &mut Tree, placements: &mut [Self]) {
        placements.sort_unstable_by_key(|p| p.index);
        for p in placements.iter() {
            if !tree.is_alive(p.node) {
                continue;
            }
            match p.parent {
                Some(parent) => {
                    let current = tree.parent_of(p.node);
                    let at = current.and_then(|c| tree.children_of(c).iter().position(|n| *n == p.node));
                    if (current, at) != (Some(parent), Some(p.index))
                        && let Err(err) = tree.reparent(p.node, parent, Some(p.index))
                    {
                        log::warn!("could not restore {:?}: {err}", p.node);
                    }
                }
                None => tree.detach(p.node),
            }
            tree.set_bounds(p.node, p.bounds);
        }
    }
}

fn is_draggable(tree: &Tree, n: NodeId) -> bool {
    tree.has_flags(n, NodeFlags::DRAGGABLE)
}

/// Nodes a press on `node` would drag.
///
/// The press must land on a drag handle or a draggable node (or inside one).
/// If the draggable owning that handle is selected, the whole selection is
/// dragged; otherwise just the handle's own draggable. Each entry is resolved
/// to its nearest draggable ancestor-or-self, without duplicates.
pub fn eligible_items(tree: &Tree, selection: &[NodeId], node: NodeId) -> DragNodes {
    let Some(handle) = tree.closest(node, |n| {
        tree.flags(n)
            .is_some_and(|f| f.intersects(NodeFlags::DRAG_HANDLE | NodeFlags::DRAGGABLE))
    }) else {
        return DragNodes::new();
    };
    let owner = tree.closest(handle, |n| is_draggable(tree, n));
    let grabbed: &[NodeId] = match owner {
        Some(o) if selection.contains(&o) => selection,
        _ => core::slice::from_ref(&handle),
    };
    let mut out = DragNodes::new();
    for n in grabbed {
        if let Some(d) = tree.closest(*n, |c| is_draggable(tree, c))
            && !out.contains(&d)
        {
            out.push(d);
        }
    }
    out
}
