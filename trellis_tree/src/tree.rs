// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core node arena: insertion, lifecycle, mutation, nested spaces, and commit.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use kurbo::{Point, Rect};
use trellis_geometry::{BoundingBox, DepthIndex, DepthKey, SpaceTransform};
use trellis_reactive::{ReactiveValue, ReadOnly, Subscription};

use crate::damage::Damage;
use crate::error::TreeError;
use crate::types::{
    DragMode, HitShape, Indication, Lifecycle, LocalNode, NodeFlags, NodeId, SpaceView,
};

/// Hook run once when a node is cleaned up.
type CleanupHook = Box<dyn FnOnce(NodeId)>;

/// The node arena.
///
/// Nodes are addressed by generational [`NodeId`]s. Parents own their children:
/// [`Tree::cleanup`] releases a node together with its entire subtree. Every
/// other relationship (selection, focus, drag targets) holds plain ids and must
/// re-check [`Tree::is_alive`] before use.
pub struct Tree {
    pub(crate) nodes: Vec<Option<Node>>,
    generations: Vec<u32>,
    free_list: Vec<usize>,
    depth: DepthIndex<NodeId>,
}

impl fmt::Debug for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.nodes.len();
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        let free = self.free_list.len();
        f.debug_struct("Tree")
            .field("nodes_total", &total)
            .field("nodes_alive", &alive)
            .field("free_list", &free)
            .field("depth_entries", &self.depth.len())
            .finish_non_exhaustive()
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) struct Node {
    pub(crate) generation: u32,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) local: LocalNode,
    pub(crate) lifecycle: Lifecycle,
    pub(crate) z_override: Option<i32>,
    pub(crate) dragging: Option<DragMode>,
    indication: ReactiveValue<Indication>,
    hooks: Vec<CleanupHook>,
    subscriptions: Vec<Subscription>,
    depth_key: Option<DepthKey>,
    committed: Option<(Rect, i32)>,
}

impl Node {
    fn new(generation: u32, local: LocalNode) -> Self {
        Self {
            generation,
            parent: None,
            children: Vec::new(),
            local,
            lifecycle: Lifecycle::Constructed,
            z_override: None,
            dragging: None,
            indication: ReactiveValue::new(Indication::empty()),
            hooks: Vec::new(),
            subscriptions: Vec::new(),
            depth_key: None,
            committed: None,
        }
    }

    pub(crate) fn effective_z(&self) -> i32 {
        self.z_override.unwrap_or(self.local.z_index)
    }

    pub(crate) fn inner_scale(&self) -> f64 {
        self.local.space.map_or(1.0, |v| v.scale)
    }
}

impl Tree {
    /// Create a new empty tree.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            depth: DepthIndex::new(),
        }
    }

    /// Insert a new node as a child of `parent` (or as a root).
    ///
    /// The node starts [`Lifecycle::Constructed`]; call [`Tree::init`] and then
    /// [`Tree::commit`] before it takes part in hit testing.
    pub fn insert(&mut self, parent: Option<NodeId>, mut local: LocalNode) -> Result<NodeId, TreeError> {
        if let Some(p) = parent
            && !self.is_alive(p)
        {
            return Err(TreeError::DeadParent(p));
        }
        local.flags.set(NodeFlags::SPACE, local.space.is_some());
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            (idx, generation)
        } else {
            self.nodes.push(None);
            self.generations.push(1);
            (self.nodes.len() - 1, 1)
        };
        #[allow(
            clippy::cast_possible_truncation,
            reason = "NodeId uses 32-bit indices by design."
        )]
        let id = NodeId::new(idx as u32, generation);
        self.nodes[idx] = Some(Node::new(generation, local));
        if let Some(p) = parent {
            self.link_parent(id, p, None);
        }
        Ok(id)
    }

    /// Insert and initialize in one step.
    pub fn spawn(&mut self, parent: Option<NodeId>, local: LocalNode) -> Result<NodeId, TreeError> {
        let id = self.insert(parent, local)?;
        self.init(id);
        Ok(id)
    }

    /// Move a constructed node to [`Lifecycle::Initialized`].
    ///
    /// Returns `false` if the node is stale or was already initialized.
    pub fn init(&mut self, id: NodeId) -> bool {
        match self.node_opt_mut(id) {
            Some(n) if n.lifecycle == Lifecycle::Constructed => {
                n.lifecycle = Lifecycle::Initialized;
                true
            }
            _ => false,
        }
    }

    /// Current lifecycle state. Stale identifiers report [`Lifecycle::Dead`].
    pub fn lifecycle(&self, id: NodeId) -> Lifecycle {
        self.slot(id).map_or(Lifecycle::Dead, |n| n.lifecycle)
    }

    /// Returns true if `id` refers to a node that has not started cleaning up.
    ///
    /// A `NodeId` is considered live if its slot exists, its generation matches
    /// the current generation stored in that slot, and cleanup has not begun.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.slot(id)
            .is_some_and(|n| !matches!(n.lifecycle, Lifecycle::CleaningUp | Lifecycle::Dead))
    }

    /// Register a hook to run when `id` is cleaned up.
    ///
    /// Returns `false` (and drops the hook unrun) if the node is not alive.
    pub fn on_cleanup(&mut self, id: NodeId, hook: impl FnOnce(NodeId) + 'static) -> bool {
        let Some(n) = self.node_opt_mut(id) else {
            return false;
        };
        n.hooks.push(Box::new(hook));
        true
    }

    /// Tie a subscription's lifetime to `id`.
    ///
    /// If the node is not alive the subscription is released immediately.
    pub fn own_subscription(&mut self, id: NodeId, subscription: Subscription) -> bool {
        let Some(n) = self.node_opt_mut(id) else {
            return false;
        };
        n.subscriptions.push(subscription);
        true
    }

    /// Clean up `id` and its whole subtree.
    ///
    /// Children are released first. For each node the cleanup hooks run, owned
    /// subscriptions are dropped, the node leaves its parent and the depth index,
    /// and its slot is freed. Returns every released id, children before parents.
    /// Calling this again (or on any stale id) returns an empty list.
    pub fn cleanup(&mut self, id: NodeId) -> Vec<NodeId> {
        let mut removed = Vec::new();
        if !self.is_alive(id) {
            return removed;
        }
        if let Some(parent) = self.node(id).parent
            && self.slot(parent).is_some()
        {
            self.node_mut(parent).children.retain(|c| *c != id);
        }
        self.cleanup_recursive(id, &mut removed);
        removed
    }

    fn cleanup_recursive(&mut self, id: NodeId, removed: &mut Vec<NodeId>) {
        let node = self.node_mut(id);
        node.lifecycle = Lifecycle::CleaningUp;
        let children = core::mem::take(&mut node.children);
        for child in children {
            if self.is_alive(child) {
                self.cleanup_recursive(child, removed);
            }
        }

        let node = self.node_mut(id);
        let hooks = core::mem::take(&mut node.hooks);
        let subscriptions = core::mem::take(&mut node.subscriptions);
        let depth_key = node.depth_key.take();
        node.indication.dispose();
        for hook in hooks {
            hook(id);
        }
        drop(subscriptions);
        if let Some(key) = depth_key {
            self.depth.remove(key);
        }

        let idx = id.idx();
        self.nodes[idx] = None;
        self.free_list.push(idx);
        removed.push(id);
    }

    /// Move `id` under `new_parent`, at `index` among its children or last.
    pub fn reparent(
        &mut self,
        id: NodeId,
        new_parent: NodeId,
        index: Option<usize>,
    ) -> Result<(), TreeError> {
        if !self.is_alive(id) {
            return Err(TreeError::DeadNode(id));
        }
        if !self.is_alive(new_parent) {
            return Err(TreeError::DeadParent(new_parent));
        }
        if self.contains(id, new_parent) {
            return Err(TreeError::Cycle {
                node: id,
                parent: new_parent,
            });
        }
        if let Some(old) = self.node(id).parent {
            self.unlink_parent(id, old);
        }
        self.link_parent(id, new_parent, index);
        Ok(())
    }

    /// Detach `id` from its parent, making it a root.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(old) = self.parent_of(id) {
            self.unlink_parent(id, old);
        }
    }

    /// Returns the parent of a node if live, or `None` for roots or stale ids.
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.live(id).and_then(|n| n.parent)
    }

    /// Get the children of a node, or empty slice if node is stale.
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        self.live(id).map_or(&[], |n| &n.children)
    }

    /// The node's local state.
    pub fn local(&self, id: NodeId) -> Option<&LocalNode> {
        self.live(id).map(|n| &n.local)
    }

    /// Returns the flags of a node if the identifier is live.
    pub fn flags(&self, id: NodeId) -> Option<NodeFlags> {
        self.live(id).map(|n| n.local.flags)
    }

    /// `true` if the node is live and carries every flag in `flags`.
    pub fn has_flags(&self, id: NodeId, flags: NodeFlags) -> bool {
        self.flags(id).is_some_and(|f| f.contains(flags))
    }

    /// The node's kind tag.
    pub fn kind(&self, id: NodeId) -> Option<&'static str> {
        self.live(id).map(|n| n.local.kind)
    }

    /// Bounds in the logical coordinates of the enclosing space.
    pub fn bounds(&self, id: NodeId) -> Option<Rect> {
        self.live(id).map(|n| n.local.bounds)
    }

    /// Returns the z-index of a node if the identifier is live.
    pub fn z_index(&self, id: NodeId) -> Option<i32> {
        self.live(id).map(|n| n.local.z_index)
    }

    /// The temporary z-override, if one is set.
    pub fn z_override(&self, id: NodeId) -> Option<i32> {
        self.live(id).and_then(|n| n.z_override)
    }

    /// The z used for stacking: the override when set, otherwise the z-index.
    pub fn effective_z(&self, id: NodeId) -> Option<i32> {
        self.live(id).map(Node::effective_z)
    }

    /// Whether the node is currently being dragged, and how.
    pub fn dragging(&self, id: NodeId) -> Option<DragMode> {
        self.live(id).and_then(|n| n.dragging)
    }

    /// The nested-space view, for nodes that open a space.
    pub fn space_view(&self, id: NodeId) -> Option<SpaceView> {
        self.live(id).and_then(|n| n.local.space)
    }

    /// The reactive indication hints of a node.
    pub fn indication(&self, id: NodeId) -> Option<ReadOnly<Indication>> {
        self.live(id).map(|n| n.indication.read_only())
    }

    /// Turn indication hints on.
    pub fn indicate(&mut self, id: NodeId, hint: Indication) {
        if let Some(n) = self.live(id) {
            n.indication.update(|i| *i |= hint);
        }
    }

    /// Turn indication hints off.
    pub fn deindicate(&mut self, id: NodeId, hint: Indication) {
        if let Some(n) = self.live(id) {
            n.indication.update(|i| i.remove(hint));
        }
    }

    /// Update local bounds.
    pub fn set_bounds(&mut self, id: NodeId, bounds: Rect) {
        if let Some(n) = self.node_opt_mut(id)
            && n.local.bounds != bounds
        {
            n.local.bounds = bounds;
        }
    }

    /// Move a node within its space, keeping its size.
    pub fn set_position(&mut self, id: NodeId, origin: Point) {
        if let Some(b) = self.bounds(id) {
            self.set_bounds(id, b.with_origin(origin));
        }
    }

    /// Update node flags.
    ///
    /// [`NodeFlags::SPACE`] follows the node's space view and cannot be set here.
    pub fn set_flags(&mut self, id: NodeId, mut flags: NodeFlags) {
        if let Some(n) = self.node_opt_mut(id) {
            flags.set(NodeFlags::SPACE, n.local.space.is_some());
            n.local.flags = flags;
        }
    }

    /// Add or remove individual flags.
    pub fn toggle_flags(&mut self, id: NodeId, flags: NodeFlags, on: bool) {
        if let Some(current) = self.flags(id) {
            let mut next = current;
            next.set(flags, on);
            self.set_flags(id, next);
        }
    }

    /// Mark a node see-through for hit testing and navigation.
    pub fn set_transparent(&mut self, id: NodeId, transparent: bool) {
        self.toggle_flags(id, NodeFlags::TRANSPARENT, transparent);
    }

    /// Update z index.
    pub fn set_z_index(&mut self, id: NodeId, z: i32) {
        if let Some(n) = self.node_opt_mut(id)
            && n.local.z_index != z
        {
            n.local.z_index = z;
        }
    }

    /// Set or clear the temporary z-override.
    pub fn set_z_override(&mut self, id: NodeId, z: Option<i32>) {
        if let Some(n) = self.node_opt_mut(id) {
            n.z_override = z;
        }
    }

    /// Record that a node is being dragged, or clear it.
    pub fn set_dragging(&mut self, id: NodeId, mode: Option<DragMode>) {
        if let Some(n) = self.node_opt_mut(id) {
            n.dragging = mode;
        }
    }

    /// Replace the hit-test shape.
    pub fn set_hit_shape(&mut self, id: NodeId, shape: HitShape) {
        if let Some(n) = self.node_opt_mut(id) {
            n.local.hit_shape = shape;
        }
    }

    /// Open, update, or close the nested space on a node.
    pub fn set_space(&mut self, id: NodeId, view: Option<SpaceView>) {
        if let Some(n) = self.node_opt_mut(id) {
            n.local.space = view;
            n.local.flags.set(NodeFlags::SPACE, view.is_some());
        }
    }

    /// The nearest ancestor-or-self that opens a space.
    pub fn closest_space(&self, id: NodeId) -> Option<NodeId> {
        self.closest(id, |n| self.has_flags(n, NodeFlags::SPACE))
    }

    /// The nearest strict ancestor that opens a space: the space `id` lives in.
    pub fn enclosing_space(&self, id: NodeId) -> Option<NodeId> {
        self.parent_of(id).and_then(|p| self.closest_space(p))
    }

    /// Client mapping of the plane `id`'s bounds are expressed in.
    pub fn bounds_transform(&self, id: NodeId) -> SpaceTransform {
        self.parent_of(id)
            .map_or(SpaceTransform::IDENTITY, |p| self.space_transform(p))
    }

    /// Client mapping of the plane `id`'s children live in.
    ///
    /// For a node that opens a space this is the space's own plane; otherwise it
    /// is the plane of the node's bounds.
    pub fn space_transform(&self, id: NodeId) -> SpaceTransform {
        let mut frames = Vec::new();
        let mut cur = Some(id);
        while let Some(n) = cur.and_then(|c| self.live(c)) {
            if let Some(view) = n.local.space {
                frames.push(view.frame(n.local.bounds));
            }
            cur = n.parent;
        }
        SpaceTransform::from_frames(frames.into_iter().rev())
    }

    /// Convert a client point into the logical plane of `id`'s children.
    pub fn client_to_space(&self, id: NodeId, p: Point) -> Point {
        self.space_transform(id).client_to_space(p)
    }

    /// Convert a logical point in `id`'s child plane back to client coordinates.
    pub fn space_to_client(&self, id: NodeId, p: Point) -> Point {
        self.space_transform(id).space_to_client(p)
    }

    /// Composite zoom of the plane `id`'s children live in.
    pub fn plane_scale(&self, id: NodeId) -> f64 {
        self.space_transform(id).plane_scale()
    }

    /// The node's box in client coordinates, computed from the current tree.
    pub fn client_box(&self, id: NodeId) -> Option<BoundingBox> {
        let n = self.live(id)?;
        Some(
            self.bounds_transform(id)
                .box_to_client(n.local.bounds, n.inner_scale()),
        )
    }

    /// Run the batched update and return coarse damage.
    ///
    /// Promotes initialized nodes to [`Lifecycle::Live`], recomputes every
    /// visible node's client rectangle and effective z, and synchronizes them
    /// into the depth index. Invisible subtrees leave the index.
    pub fn commit(&mut self) -> Damage {
        let mut damage = Damage::default();
        let roots: Vec<NodeId> = self
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(i, n)| match n {
                Some(n) if n.parent.is_none() =>
                {
                    #[allow(
                        clippy::cast_possible_truncation,
                        reason = "NodeId uses 32-bit indices by design."
                    )]
                    Some(NodeId::new(i as u32, n.generation))
                }
                _ => None,
            })
            .collect();

        let mut stack: Vec<(NodeId, SpaceTransform, bool)> = roots
            .into_iter()
            .rev()
            .map(|r| (r, SpaceTransform::IDENTITY, true))
            .collect();
        while let Some((id, tf, visible_above)) = stack.pop() {
            let node = self.node_mut(id);
            if node.lifecycle == Lifecycle::Initialized {
                node.lifecycle = Lifecycle::Live;
                damage.went_live.push(id);
            }
            let shown = visible_above
                && node.lifecycle == Lifecycle::Live
                && node.local.flags.contains(NodeFlags::VISIBLE);
            let rect = tf.rect_to_client(node.local.bounds);
            let z = node.effective_z();
            let child_tf = match node.local.space {
                Some(view) => tf.nest(view.frame(node.local.bounds)),
                None => tf,
            };
            for &child in node.children.iter().rev() {
                stack.push((child, child_tf, shown));
            }

            let committed = node.committed;
            let key = node.depth_key;
            match (shown, key) {
                (true, Some(key)) => {
                    if committed != Some((rect, z)) {
                        self.depth.update(key, rect, z);
                    }
                }
                (true, None) => {
                    let key = self.depth.insert(rect, z, id);
                    self.node_mut(id).depth_key = Some(key);
                }
                (false, Some(key)) => {
                    self.depth.remove(key);
                    self.node_mut(id).depth_key = None;
                }
                (false, None) => {}
            }
            self.node_mut(id).committed = shown.then_some((rect, z));
        }

        let depth_damage = self.depth.commit();
        damage.dirty_rects.extend(depth_damage.added);
        damage.dirty_rects.extend(depth_damage.removed);
        damage.dirty_rects.extend(depth_damage.restacked);
        for (before, after) in depth_damage.moved {
            damage.dirty_rects.push(before);
            damage.dirty_rects.push(after);
        }
        if !damage.is_empty() {
            log::trace!(
                "commit: {} dirty rects, {} nodes went live",
                damage.dirty_rects.len(),
                damage.went_live.len()
            );
        }
        damage
    }

    /// Visible nodes whose last committed client rectangle contains `p`, top-most first.
    ///
    /// This reads the depth-ordering service and ignores hit shapes and flags
    /// other than visibility; use [`Tree::node_at_point`] for input routing.
    pub fn stack_at(&self, p: Point) -> Vec<NodeId> {
        self.depth
            .query_point(p)
            .into_iter()
            .map(|(_, id)| id)
            .filter(|id| self.is_alive(*id))
            .collect()
    }

    /// Assign sequential z-indices to `ZINDEXED` nodes under `root`, depth first.
    ///
    /// Ordering follows child order, so later siblings and descendants stack
    /// above earlier ones. A node carrying a z-override keeps its slot; the
    /// override still wins until cleared. Returns how many nodes changed.
    pub fn z_enumerate(&mut self, root: NodeId) -> usize {
        let mut changed = 0;
        let mut last = 0_i32;
        let mut stack = alloc::vec![root];
        while let Some(id) = stack.pop() {
            let Some(n) = self.node_opt_mut(id) else {
                continue;
            };
            if n.local.flags.contains(NodeFlags::ZINDEXED) {
                last = last.saturating_add(1);
                if n.local.z_index != last {
                    n.local.z_index = last;
                    changed += 1;
                }
            }
            stack.extend(n.children.iter().rev().copied());
        }
        changed
    }
}

impl Tree {
    // --- internals ---

    pub(crate) fn slot(&self, id: NodeId) -> Option<&Node> {
        self.nodes
            .get(id.idx())
            .and_then(|n| n.as_ref())
            .filter(|n| n.generation == id.1)
    }

    pub(crate) fn live(&self, id: NodeId) -> Option<&Node> {
        self.slot(id)
            .filter(|n| !matches!(n.lifecycle, Lifecycle::CleaningUp | Lifecycle::Dead))
    }

    fn node_opt_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let n = self.nodes.get_mut(id.idx())?.as_mut()?;
        if n.generation != id.1 || matches!(n.lifecycle, Lifecycle::CleaningUp | Lifecycle::Dead) {
            return None;
        }
        Some(n)
    }

    /// Access a node; panics if `id` is stale.
    pub(crate) fn node(&self, id: NodeId) -> &Node {
        self.nodes[id.idx()].as_ref().expect("dangling NodeId")
    }

    /// Access a node mutably; panics if `id` is stale.
    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.nodes[id.idx()].as_mut().expect("dangling NodeId")
    }

    fn link_parent(&mut self, id: NodeId, parent: NodeId, index: Option<usize>) {
        let children = &mut self.node_mut(parent).children;
        match index {
            Some(i) if i < children.len() => children.insert(i, id),
            _ => children.push(id),
        }
        self.node_mut(id).parent = Some(parent);
    }

    fn unlink_parent(&mut self, id: NodeId, parent: NodeId) {
        self.node_mut(parent).children.retain(|c| *c != id);
        self.node_mut(id).parent = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use alloc::vec;
    use core::cell::RefCell;
    use trellis_geometry::ZBand;

    fn rect_node(x: f64, y: f64, w: f64, h: f64) -> LocalNode {
        LocalNode::new("node", Rect::new(x, y, x + w, y + h))
    }

    #[test]
    fn insert_init_commit_walks_the_lifecycle() {
        let mut tree = Tree::new();
        let root = tree.insert(None, rect_node(0.0, 0.0, 100.0, 100.0)).unwrap();
        assert_eq!(tree.lifecycle(root), Lifecycle::Constructed, "fresh node");
        assert!(tree.init(root), "first init succeeds");
        assert!(!tree.init(root), "second init is refused");
        assert_eq!(tree.lifecycle(root), Lifecycle::Initialized, "after init");
        let damage = tree.commit();
        assert_eq!(damage.went_live, vec![root], "commit promotes the node");
        assert_eq!(tree.lifecycle(root), Lifecycle::Live, "after commit");
        tree.cleanup(root);
        assert_eq!(tree.lifecycle(root), Lifecycle::Dead, "after cleanup");
    }

    #[test]
    fn insert_under_dead_parent_fails() {
        let mut tree = Tree::new();
        let root = tree.spawn(None, LocalNode::default()).unwrap();
        tree.cleanup(root);
        assert_eq!(
            tree.insert(Some(root), LocalNode::default()),
            Err(TreeError::DeadParent(root)),
            "dead parents are rejected"
        );
    }

    #[test]
    fn cleanup_is_recursive_and_idempotent() {
        let mut tree = Tree::new();
        let root = tree.spawn(None, LocalNode::default()).unwrap();
        let a = tree.spawn(Some(root), LocalNode::default()).unwrap();
        let a1 = tree.spawn(Some(a), LocalNode::default()).unwrap();
        let b = tree.spawn(Some(root), LocalNode::default()).unwrap();

        let log = Rc::new(RefCell::new(Vec::new()));
        for id in [a, a1] {
            let log = log.clone();
            assert!(tree.on_cleanup(id, move |n| log.borrow_mut().push(n)), "hook registered");
        }

        let removed = tree.cleanup(a);
        assert_eq!(removed, vec![a1, a], "children are released before parents");
        assert_eq!(*log.borrow(), vec![a1, a], "hooks ran once each, child first");
        assert_eq!(tree.children_of(root), &[b], "parent forgets the child");
        assert!(!tree.is_alive(a1), "descendant is dead");

        assert!(tree.cleanup(a).is_empty(), "second cleanup does nothing");
        assert_eq!(log.borrow().len(), 2, "hooks are not re-run");
        assert!(!tree.on_cleanup(a, |_| {}), "hooks cannot be added to dead nodes");
    }

    #[test]
    fn stale_ids_do_not_alias_reused_slots() {
        let mut tree = Tree::new();
        let a = tree.spawn(None, LocalNode::default()).unwrap();
        tree.cleanup(a);
        let b = tree.spawn(None, LocalNode::default()).unwrap();
        assert_eq!(a.idx(), b.idx(), "slot is reused");
        assert!(!tree.is_alive(a), "old id stays dead");
        tree.set_z_index(a, 7);
        assert_eq!(tree.z_index(b), Some(0), "mutation through stale id is a no-op");
    }

    #[test]
    fn owned_subscriptions_end_with_the_node() {
        let mut tree = Tree::new();
        let n = tree.spawn(None, LocalNode::default()).unwrap();
        let source = ReactiveValue::new(0);
        let hits = Rc::new(RefCell::new(0));
        let h = hits.clone();
        let sub = source.subscribe(move |_| *h.borrow_mut() += 1);
        assert!(tree.own_subscription(n, sub), "subscription adopted");
        source.set(1);
        tree.cleanup(n);
        source.set(2);
        assert_eq!(*hits.borrow(), 1, "no notifications after cleanup");
        assert_eq!(source.subscriber_count(), 0, "subscriber removed");
    }

    #[test]
    fn reparent_rejects_cycles() {
        let mut tree = Tree::new();
        let a = tree.spawn(None, LocalNode::default()).unwrap();
        let b = tree.spawn(Some(a), LocalNode::default()).unwrap();
        let c = tree.spawn(Some(b), LocalNode::default()).unwrap();
        assert_eq!(
            tree.reparent(a, c, None),
            Err(TreeError::Cycle { node: a, parent: c }),
            "moving under a descendant is refused"
        );
        assert_eq!(tree.reparent(a, a, None), Err(TreeError::Cycle { node: a, parent: a }), "self-parenting is refused");
        let d = tree.spawn(None, LocalNode::default()).unwrap();
        tree.reparent(c, d, None).unwrap();
        assert_eq!(tree.parent_of(c), Some(d), "moved");
        assert!(tree.children_of(b).is_empty(), "old parent forgets the child");
    }

    #[test]
    fn reparent_at_index() {
        let mut tree = Tree::new();
        let p = tree.spawn(None, LocalNode::default()).unwrap();
        let a = tree.spawn(Some(p), LocalNode::default()).unwrap();
        let b = tree.spawn(Some(p), LocalNode::default()).unwrap();
        let c = tree.spawn(None, LocalNode::default()).unwrap();
        tree.reparent(c, p, Some(1)).unwrap();
        assert_eq!(tree.children_of(p), &[a, c, b], "inserted between");
    }

    #[test]
    fn nested_space_conversions_round_trip() {
        let mut tree = Tree::new();
        let root = tree
            .spawn(None, rect_node(0.0, 0.0, 800.0, 600.0).with_space(SpaceView::new(Point::ZERO, 1.0)))
            .unwrap();
        let portal = tree
            .spawn(
                Some(root),
                rect_node(500.0, 500.0, 1000.0, 1000.0).with_space(SpaceView::new(Point::ZERO, 2.0)),
            )
            .unwrap();
        let card = tree.spawn(Some(portal), rect_node(10.0, 10.0, 20.0, 20.0)).unwrap();

        assert!(tree.has_flags(portal, NodeFlags::SPACE), "space flag follows the view");
        assert_eq!(tree.enclosing_space(card), Some(portal), "card lives in the portal");
        assert_eq!(tree.closest_space(portal), Some(portal), "a space encloses itself");
        assert_eq!(tree.enclosing_space(portal), Some(root), "portal lives in the root space");
        assert_eq!(tree.plane_scale(portal), 2.0, "portal plane zoom");

        let p = Point::new(520.0, 540.0);
        let logical = tree.client_to_space(portal, p);
        assert_eq!(logical, Point::new(10.0, 20.0), "client to portal plane");
        assert_eq!(tree.space_to_client(portal, logical), p, "exact inverse");

        let cb = tree.client_box(card).unwrap();
        assert_eq!(cb.to_rect(), Rect::new(520.0, 520.0, 560.0, 560.0), "card box in client space");
        assert_eq!(cb.total_scale, 2.0, "card carries the portal zoom");
        let pb = tree.client_box(portal).unwrap();
        assert_eq!(pb.inner_scale, 2.0, "portal reports its own zoom");
        assert_eq!(pb.total_scale, 1.0, "portal sits in an unscaled plane");
    }

    #[test]
    fn commit_tracks_visibility_and_damage() {
        let mut tree = Tree::new();
        let root = tree.spawn(None, rect_node(0.0, 0.0, 100.0, 100.0)).unwrap();
        let a = tree.spawn(Some(root), rect_node(10.0, 10.0, 10.0, 10.0)).unwrap();
        let first = tree.commit();
        assert_eq!(first.dirty_rects.len(), 2, "both nodes appear");
        assert_eq!(tree.stack_at(Point::new(15.0, 15.0)), vec![a, root], "child first on ties");

        assert!(tree.commit().is_empty(), "idle commit has no damage");

        tree.set_position(a, Point::new(50.0, 50.0));
        let moved = tree.commit();
        assert_eq!(
            moved.union_rect(),
            Some(Rect::new(10.0, 10.0, 60.0, 60.0)),
            "old and new positions are dirty"
        );

        tree.toggle_flags(root, NodeFlags::VISIBLE, false);
        tree.commit();
        assert!(tree.stack_at(Point::new(55.0, 55.0)).is_empty(), "hidden subtree leaves the index");
    }

    #[test]
    fn z_override_supersedes_and_restores() {
        let mut tree = Tree::new();
        let root = tree.spawn(None, rect_node(0.0, 0.0, 100.0, 100.0)).unwrap();
        let a = tree.spawn(Some(root), rect_node(0.0, 0.0, 50.0, 50.0).with_z_index(3)).unwrap();
        tree.set_z_override(a, Some(ZBand::Draggable.min()));
        assert_eq!(tree.effective_z(a), Some(ZBand::Draggable.min()), "override wins");
        tree.set_z_override(a, None);
        assert_eq!(tree.effective_z(a), Some(3), "z-index is back");
    }

    #[test]
    fn z_enumerate_orders_depth_first() {
        let mut tree = Tree::new();
        let z = NodeFlags::ZINDEXED;
        let root = tree.spawn(None, LocalNode::default()).unwrap();
        let a = tree.spawn(Some(root), LocalNode::default().with_flags(z).with_z_index(40)).unwrap();
        let a1 = tree.spawn(Some(a), LocalNode::default().with_flags(z)).unwrap();
        let plain = tree.spawn(Some(root), LocalNode::default()).unwrap();
        let b = tree.spawn(Some(root), LocalNode::default().with_flags(z)).unwrap();
        let changed = tree.z_enumerate(root);
        assert_eq!(changed, 3, "all indexed nodes renumbered");
        assert_eq!(
            [a, a1, b].map(|n| tree.z_index(n)),
            [Some(1), Some(2), Some(3)],
            "depth-first order"
        );
        assert_eq!(tree.z_index(plain), Some(0), "unindexed node untouched");
        assert_eq!(tree.z_enumerate(root), 0, "stable on re-run");
    }

    #[test]
    fn indication_is_observable() {
        let mut tree = Tree::new();
        let n = tree.spawn(None, LocalNode::default()).unwrap();
        let hint = tree.indication(n).unwrap();
        tree.indicate(n, Indication::DRAG);
        assert_eq!(hint.get(), Indication::DRAG, "drag hint on");
        tree.deindicate(n, Indication::DRAG);
        assert!(hint.get().is_empty(), "drag hint off");
        tree.cleanup(n);
        assert!(!hint.is_alive(), "indication is disposed with the node");
    }
}
