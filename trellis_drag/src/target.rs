// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drop targets, drag sources, and the registry resolving them per node.

use alloc::rc::Rc;
use core::cell::RefCell;
use core::fmt;

use hashbrown::HashMap;
use kurbo::Point;
use trellis_geometry::snap_point_to_grid;
use trellis_tree::{NodeFlags, NodeId, Tree};

use crate::{Change, DragItem, DragNodes, DropError, Transaction};

/// A drop about to be handled.
#[derive(Copy, Clone, Debug)]
pub struct DropRequest<'a> {
    /// Node receiving the items.
    pub target: NodeId,
    /// The dragged items.
    pub items: &'a [DragItem],
    /// Client point of the release.
    pub pointer: Point,
    /// Drop references instead of moving.
    pub is_transclusion: bool,
    /// Grid to snap positions to.
    pub grid: Option<f64>,
    /// How far a position may be pulled onto the grid.
    pub snap_tolerance: f64,
}

impl DropRequest<'_> {
    /// Where `item` lands in the target's child plane, snapped if a grid is set.
    pub fn position(&self, tree: &Tree, item: &DragItem) -> Point {
        let p = item.logical_position(tree, self.target, self.pointer);
        match self.grid {
            Some(grid) => snap_point_to_grid(grid, p, self.snap_tolerance),
            None => p,
        }
    }
}

/// A node that can receive dropped items.
///
/// Only nodes flagged [`NodeFlags::DROPPABLE`] are asked.
pub trait DropTarget {
    /// Whether `target` accepts `items` right now.
    fn droppable(&self, tree: &Tree, target: NodeId, items: &[NodeId]) -> bool;

    /// Take the items, recording data changes in `trx`.
    ///
    /// Returns the items actually dropped; those are told they departed.
    fn handle_drop(
        &self,
        tree: &mut Tree,
        drop: &DropRequest<'_>,
        trx: &mut dyn Transaction,
    ) -> Result<DragNodes, DropError>;
}

/// The origin side of a drop.
pub trait DragSource {
    /// `item` left `from` in a committed, non-transclusion drop.
    fn handle_depart(
        &self,
        tree: &Tree,
        item: NodeId,
        from: Option<NodeId>,
        trx: &mut dyn Transaction,
    ) -> Result<(), DropError>;
}

/// Moves dropped nodes into the target, keeping the grab offset.
///
/// Transclusions leave the tree alone and only record where a reference
/// should appear. Used for droppable nodes with no target of their own.
#[derive(Copy, Clone, Debug, Default)]
pub struct SpaceDropTarget;

impl DropTarget for SpaceDropTarget {
    fn droppable(&self, tree: &Tree, target: NodeId, items: &[NodeId]) -> bool {
        tree.is_alive(target) && items.iter().all(|i| !tree.contains(*i, target))
    }

    fn handle_drop(
        &self,
        tree: &mut Tree,
        drop: &DropRequest<'_>,
        trx: &mut dyn Transaction,
    ) -> Result<DragNodes, DropError> {
        let target = drop.target;
        if !tree.is_alive(target) {
            return Err(DropError::DeadTarget(target));
        }
        let mut dropped = DragNodes::new();
        for item in drop.items.iter() {
            if !tree.is_alive(item.node) {
                continue;
            }
            let position = drop.position(tree, item);
            if drop.is_transclusion {
                trx.record(Change::Transcluded {
                    node: item.node,
                    into: target,
                    position,
                });
            } else {
                let from = tree.parent_of(item.node);
                tree.reparent(item.node, target, None)?;
                tree.set_position(item.node, position);
                trx.record(Change::Moved {
                    node: item.node,
                    from,
                    to: target,
                    position,
                });
            }
            dropped.push(item.node);
        }
        Ok(dropped)
    }
}

/// Records a [`Change::Departed`] for every item leaving.
#[derive(Copy, Clone, Debug, Default)]
pub struct RecordDeparture;

impl DragSource for RecordDeparture {
    fn handle_depart(
        &self,
        _: &Tree,
        item: NodeId,
        from: Option<NodeId>,
        trx: &mut dyn Transaction,
    ) -> Result<(), DropError> {
        trx.record(Change::Departed { node: item, from });
        Ok(())
    }
}

struct Registry {
    targets: HashMap<NodeId, Rc<dyn DropTarget>>,
    sources: HashMap<NodeId, Rc<dyn DragSource>>,
    default_target: Rc<dyn DropTarget>,
    default_source: Option<Rc<dyn DragSource>>,
}

/// Drop targets and drag sources per node.
///
/// A shared handle: clones see the same registrations, so hosts can keep
/// registering nodes after the drag behavior has been handed to the
/// dispatcher.
#[derive(Clone)]
pub struct DropRegistry {
    inner: Rc<RefCell<Registry>>,
}

impl fmt::Debug for DropRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.inner.borrow();
        f.debug_struct("DropRegistry")
            .field("targets", &r.targets.len())
            .field("sources", &r.sources.len())
            .finish_non_exhaustive()
    }
}

impl Default for DropRegistry {
    fn default() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Registry {
                targets: HashMap::new(),
                sources: HashMap::new(),
                default_target: Rc::new(SpaceDropTarget),
                default_source: None,
            })),
        }
    }
}

impl DropRegistry {
    /// A registry falling back to [`SpaceDropTarget`] and no drag source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `target` for drops onto `node`.
    pub fn set_target(&self, node: NodeId, target: impl DropTarget + 'static) {
        self.inner.borrow_mut().targets.insert(node, Rc::new(target));
    }

    /// Use `source` when items leave `node` (or when `node` itself leaves).
    pub fn set_source(&self, node: NodeId, source: impl DragSource + 'static) {
        self.inner.borrow_mut().sources.insert(node, Rc::new(source));
    }

    /// Target for droppable nodes without one of their own.
    pub fn set_default_target(&self, target: impl DropTarget + 'static) {
        self.inner.borrow_mut().default_target = Rc::new(target);
    }

    /// Source for items with no source of their own or on their origin.
    pub fn set_default_source(&self, source: impl DragSource + 'static) {
        self.inner.borrow_mut().default_source = Some(Rc::new(source));
    }

    /// Forget registrations on `node`.
    pub fn remove(&self, node: NodeId) {
        let mut r = self.inner.borrow_mut();
        r.targets.remove(&node);
        r.sources.remove(&node);
    }

    /// Forget registrations on nodes that are no longer alive.
    pub fn prune(&self, tree: &Tree) {
        let mut r = self.inner.borrow_mut();
        r.targets.retain(|n, _| tree.is_alive(*n));
        r.sources.retain(|n, _| tree.is_alive(*n));
    }

    /// The target handling drops onto `node`.
    pub fn target_for(&self, node: NodeId) -> Rc<dyn DropTarget> {
        let r = self.inner.borrow();
        r.targets.get(&node).unwrap_or(&r.default_target).clone()
    }

    /// The source told when `item` leaves `origin`.
    ///
    /// The item's own source wins over its origin's.
    pub fn source_for(&self, item: NodeId, origin: Option<NodeId>) -> Option<Rc<dyn DragSource>> {
        let r = self.inner.borrow();
        r.sources
            .get(&item)
            .or_else(|| origin.and_then(|o| r.sources.get(&o)))
            .or(r.default_source.as_ref())
            .cloned()
    }

    /// Whether `node` would take `items`: it is droppable and its target
    /// agrees.
    pub fn accepts(&self, tree: &Tree, node: NodeId, items: &[NodeId]) -> bool {
        tree.has_flags(node, NodeFlags::DROPPABLE) && self.target_for(node).droppable(tree, node, items)
    }
}
