// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Structural queries: ancestry, sibling spans, and ordered traversal.
//!
//! Every query takes plain [`NodeId`]s and treats stale ones as absent.

use alloc::vec::Vec;

use crate::{NodeId, Tree};

impl Tree {
    /// `true` if `node` is `ancestor` or lies somewhere beneath it.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.closest(node, |n| n == ancestor).is_some()
    }

    /// Ids from the root down to `id`, inclusive. Empty for stale ids.
    pub fn path(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = Vec::new();
        let mut cur = self.is_alive(id).then_some(id);
        while let Some(n) = cur {
            path.push(n);
            cur = self.parent_of(n);
        }
        path.reverse();
        path
    }

    /// Number of ancestors above `id` (roots are at depth 0).
    pub fn depth(&self, id: NodeId) -> Option<usize> {
        self.is_alive(id).then(|| self.path(id).len() - 1)
    }

    /// The root of the tree containing `id`.
    pub fn root_of(&self, id: NodeId) -> Option<NodeId> {
        self.path(id).first().copied()
    }

    /// The ancestor at `depth`, or `id` itself if it is already that shallow.
    pub fn ancestor_at_depth(&self, id: NodeId, depth: usize) -> Option<NodeId> {
        let path = self.path(id);
        path.get(depth).or(path.last()).copied()
    }

    /// Deepest node that is an ancestor-or-self of both `a` and `b`.
    pub fn lowest_common_ancestor(&self, a: NodeId, b: NodeId) -> Option<NodeId> {
        let pa = self.path(a);
        let pb = self.path(b);
        pa.iter()
            .zip(&pb)
            .take_while(|(x, y)| x == y)
            .last()
            .map(|(x, _)| *x)
    }

    /// Position of `id` among its parent's children.
    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent_of(id)?;
        self.children_of(parent).iter().position(|c| *c == id)
    }

    /// Siblings strictly between `a` and `b`, in child order.
    ///
    /// Empty when the two do not share a parent or are the same node.
    pub fn siblings_between(&self, a: NodeId, b: NodeId) -> Vec<NodeId> {
        if a == b {
            return Vec::new();
        }
        let (Some(pa), Some(pb)) = (self.parent_of(a), self.parent_of(b)) else {
            return Vec::new();
        };
        if pa != pb {
            return Vec::new();
        }
        let (Some(ia), Some(ib)) = (self.index_in_parent(a), self.index_in_parent(b)) else {
            return Vec::new();
        };
        let (lo, hi) = if ia < ib { (ia, ib) } else { (ib, ia) };
        self.children_of(pa)[lo + 1..hi].to_vec()
    }

    /// Nearest ancestor-or-self satisfying `pred`.
    pub fn closest(&self, id: NodeId, mut pred: impl FnMut(NodeId) -> bool) -> Option<NodeId> {
        self.find_closest(id, |n| pred(n).then_some(n))
    }

    /// Nearest strict ancestor satisfying `pred`.
    pub fn closest_parent(&self, id: NodeId, pred: impl FnMut(NodeId) -> bool) -> Option<NodeId> {
        self.closest(self.parent_of(id)?, pred)
    }

    /// Nearest ancestor-or-self of the given kind.
    pub fn closest_of_kind(&self, id: NodeId, kind: &str) -> Option<NodeId> {
        self.closest(id, |n| self.kind(n) == Some(kind))
    }

    /// Walk upward from `id` and return the first value `f` produces.
    pub fn find_closest<T>(&self, id: NodeId, mut f: impl FnMut(NodeId) -> Option<T>) -> Option<T> {
        let mut cur = self.is_alive(id).then_some(id);
        while let Some(n) = cur {
            if let Some(v) = f(n) {
                return Some(v);
            }
            cur = self.parent_of(n);
        }
        None
    }

    /// First descendant (depth first, pre-order, excluding `id`) satisfying `pred`.
    pub fn find_child(&self, id: NodeId, mut pred: impl FnMut(NodeId) -> bool) -> Option<NodeId> {
        self.find_child_dyn(id, &mut pred)
    }

    fn find_child_dyn(&self, id: NodeId, pred: &mut dyn FnMut(NodeId) -> bool) -> Option<NodeId> {
        for &child in self.children_of(id) {
            if pred(child) {
                return Some(child);
            }
            if let Some(found) = self.find_child_dyn(child, pred) {
                return Some(found);
            }
        }
        None
    }

    /// First direct child satisfying `pred`.
    pub fn find_child_shallow(
        &self,
        id: NodeId,
        mut pred: impl FnMut(NodeId) -> bool,
    ) -> Option<NodeId> {
        self.children_of(id).iter().copied().find(|c| pred(*c))
    }

    /// Every node in the subtree of `id` (including `id`) satisfying `pred`, pre-order.
    pub fn find_children(&self, id: NodeId, mut pred: impl FnMut(NodeId) -> bool) -> Vec<NodeId> {
        let mut out = Vec::new();
        if !self.is_alive(id) {
            return out;
        }
        let mut stack = alloc::vec![id];
        while let Some(n) = stack.pop() {
            if pred(n) {
                out.push(n);
            }
            stack.extend(self.children_of(n).iter().rev().copied());
        }
        out
    }

    /// Last descendant in document order satisfying `pred`, preferring depth.
    ///
    /// Children are scanned last to first; within each child its own deepest
    /// match wins over the child itself.
    pub fn find_deepest_child(
        &self,
        id: NodeId,
        mut pred: impl FnMut(NodeId) -> bool,
    ) -> Option<NodeId> {
        self.find_deepest_child_dyn(id, &mut pred)
    }

    fn find_deepest_child_dyn(
        &self,
        id: NodeId,
        pred: &mut dyn FnMut(NodeId) -> bool,
    ) -> Option<NodeId> {
        for &child in self.children_of(id).iter().rev() {
            if let Some(found) = self.find_deepest_child_dyn(child, pred) {
                return Some(found);
            }
            if pred(child) {
                return Some(child);
            }
        }
        None
    }

    /// The sibling right before `id`, if it has the same kind.
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.prev_sibling_any(id)
            .filter(|s| self.kind(*s) == self.kind(id))
    }

    /// The sibling right after `id`, if it has the same kind.
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.next_sibling_any(id)
            .filter(|s| self.kind(*s) == self.kind(id))
    }

    /// The sibling right before `id`, of any kind.
    pub fn prev_sibling_any(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent_of(id)?;
        let i = self.index_in_parent(id)?;
        i.checked_sub(1)
            .and_then(|p| self.children_of(parent).get(p).copied())
    }

    /// The sibling right after `id`, of any kind.
    pub fn next_sibling_any(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent_of(id)?;
        let i = self.index_in_parent(id)?;
        self.children_of(parent).get(i + 1).copied()
    }

    /// First node after `id` in document order satisfying `pred`.
    ///
    /// Searches `id`'s own descendants, then each later sibling and its
    /// subtree, then the later siblings of each ancestor. Ancestors themselves
    /// are never candidates.
    pub fn find_succeeding_node(
        &self,
        id: NodeId,
        mut pred: impl FnMut(NodeId) -> bool,
    ) -> Option<NodeId> {
        if let Some(found) = self.find_child_dyn(id, &mut pred) {
            return Some(found);
        }
        let mut cur = id;
        while let Some(parent) = self.parent_of(cur) {
            let start = self.index_in_parent(cur)? + 1;
            for &sibling in &self.children_of(parent)[start..] {
                if pred(sibling) {
                    return Some(sibling);
                }
                if let Some(found) = self.find_child_dyn(sibling, &mut pred) {
                    return Some(found);
                }
            }
            cur = parent;
        }
        None
    }

    /// First node before `id` in document order satisfying `pred`.
    ///
    /// Earlier siblings are searched nearest first, each preferring its
    /// deepest matching descendant; then the parent itself is a candidate and
    /// the walk continues from there.
    pub fn find_preceding_node(
        &self,
        id: NodeId,
        mut pred: impl FnMut(NodeId) -> bool,
    ) -> Option<NodeId> {
        let mut cur = self.is_alive(id).then_some(id);
        while let Some(node) = cur {
            if node != id && pred(node) {
                return Some(node);
            }
            if let (Some(parent), Some(i)) = (self.parent_of(node), self.index_in_parent(node)) {
                for &sibling in self.children_of(parent)[..i].iter().rev() {
                    if let Some(found) = self.find_deepest_child_dyn(sibling, &mut pred) {
                        return Some(found);
                    }
                    if pred(sibling) {
                        return Some(sibling);
                    }
                }
            }
            cur = self.parent_of(node);
        }
        None
    }
}
