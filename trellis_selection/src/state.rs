// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The selection set.

use alloc::vec::Vec;
use core::fmt;

use hashbrown::HashMap;
use kurbo::Rect;
use trellis_reactive::{ReactiveValue, ReadOnly};
use trellis_tree::{NodeFlags, NodeId, Tree};

use crate::lowest_common_sibling_ancestors;

/// The set of selected nodes.
///
/// Selecting a node deselects every node beneath it, since the node stands
/// for its whole subtree. Selecting something under an already selected node
/// is allowed.
///
/// The whole set is a reactive value (in selection order), and each node also
/// gets a reactive `bool` mark so it can restyle itself without scanning the
/// set. Ids are handles, not owners: removed nodes stay in the set until
/// [`SelectionState::on_removed`] or [`SelectionState::prune`] drops them.
pub struct SelectionState {
    selection: ReactiveValue<Vec<NodeId>>,
    marks: HashMap<NodeId, ReactiveValue<bool>>,
    implicit: HashMap<NodeId, Vec<NodeId>>,
}

impl fmt::Debug for SelectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionState")
            .field("selection", &self.selection.get())
            .field("implicit", &self.implicit.len())
            .finish_non_exhaustive()
    }
}

impl Default for SelectionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionState {
    /// An empty selection.
    pub fn new() -> Self {
        Self {
            selection: ReactiveValue::new(Vec::new()),
            marks: HashMap::new(),
            implicit: HashMap::new(),
        }
    }

    /// The selected nodes, in the order they were selected.
    pub fn selected(&self) -> Vec<NodeId> {
        self.selection.get()
    }

    /// The selection as a reactive value.
    pub fn selection(&self) -> ReadOnly<Vec<NodeId>> {
        self.selection.read_only()
    }

    /// Number of selected nodes.
    pub fn len(&self) -> usize {
        self.selection.with(Vec::len)
    }

    /// `true` when nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `id` itself is selected (not merely under a selected node).
    pub fn is_selected(&self, id: NodeId) -> bool {
        self.selection.with(|s| s.contains(&id))
    }

    /// The reactive selected-mark of `id`.
    pub fn mark(&mut self, id: NodeId) -> ReadOnly<bool> {
        self.mark_value(id).read_only()
    }

    /// Add `nodes` to the selection, deselecting everything beneath each.
    ///
    /// Stale ids are skipped.
    pub fn add_select(&mut self, tree: &Tree, nodes: &[NodeId]) {
        let mut next = self.selection.get();
        for &node in nodes {
            if !tree.is_alive(node) {
                continue;
            }
            if !next.contains(&node) {
                next.push(node);
            }
            self.mark_value(node).set(true);
            next.retain(|s| {
                let below = *s != node && tree.contains(node, *s);
                if below {
                    self.unmark(*s);
                }
                !below
            });
        }
        self.commit(next);
    }

    /// Remove `nodes`, and anything selected beneath them, from the selection.
    pub fn de_select(&mut self, tree: &Tree, nodes: &[NodeId]) {
        let mut next = self.selection.get();
        next.retain(|s| {
            let drop = nodes.iter().any(|n| *s == *n || tree.contains(*n, *s));
            if drop {
                self.unmark(*s);
            }
            !drop
        });
        for node in nodes {
            self.unmark(*node);
        }
        self.commit(next);
    }

    /// Replace the selection with `nodes`.
    pub fn set_select(&mut self, tree: &Tree, nodes: &[NodeId]) {
        self.clear();
        self.add_select(tree, nodes);
    }

    /// Flip each of `nodes` in or out of the selection.
    pub fn toggle_select(&mut self, tree: &Tree, nodes: &[NodeId]) {
        for &node in nodes {
            if self.is_selected(node) {
                self.de_select(tree, &[node]);
            } else {
                self.add_select(tree, &[node]);
            }
        }
        if self.is_empty() {
            self.implicit.clear();
        }
    }

    /// Deselect everything and forget implicit selections.
    pub fn clear(&mut self) {
        for id in self.selection.get() {
            self.unmark(id);
        }
        self.implicit.clear();
        self.commit(Vec::new());
    }

    /// Select the lasso hit set: every selectable node in `root`'s subtree
    /// touching the client rectangle `rect`, lifted to common sibling level.
    ///
    /// Returns the new selection.
    pub fn select_in_rect(&mut self, tree: &Tree, root: NodeId, rect: Rect) -> Vec<NodeId> {
        let hits = tree.nodes_at_rect(root, rect, |n| {
            n != root && tree.has_flags(n, NodeFlags::SELECTABLE)
        });
        let picked = lowest_common_sibling_ancestors(tree, &hits);
        self.set_select(tree, &picked);
        self.selected()
    }

    /// Record that selecting `owner` implicitly selects `members`.
    ///
    /// Composite nodes use this to remember which backing items a selection of
    /// theirs stands for. Cleared along with the selection.
    pub fn set_implicit(&mut self, owner: NodeId, members: Vec<NodeId>) {
        if members.is_empty() {
            self.implicit.remove(&owner);
        } else {
            self.implicit.insert(owner, members);
        }
    }

    /// Members implicitly selected through `owner`.
    pub fn implicit(&self, owner: NodeId) -> &[NodeId] {
        self.implicit.get(&owner).map_or(&[], Vec::as_slice)
    }

    /// Forget removed nodes.
    pub fn on_removed(&mut self, removed: &[NodeId]) {
        let mut next = self.selection.get();
        let before = next.len();
        next.retain(|s| !removed.contains(s));
        for id in removed {
            if let Some(mark) = self.marks.remove(id) {
                mark.set(false);
                mark.dispose();
            }
            self.implicit.remove(id);
        }
        for members in self.implicit.values_mut() {
            members.retain(|m| !removed.contains(m));
        }
        self.implicit.retain(|_, members| !members.is_empty());
        if next.len() != before {
            log::debug!("{} removed nodes dropped from selection", before - next.len());
            self.commit(next);
        }
    }

    /// Drop every id that no longer refers to a live node.
    pub fn prune(&mut self, tree: &Tree) {
        let mut dead: Vec<NodeId> = self
            .selection
            .get()
            .into_iter()
            .filter(|s| !tree.is_alive(*s))
            .collect();
        dead.extend(self.marks.keys().copied().filter(|m| !tree.is_alive(*m)));
        dead.extend(
            self.implicit
                .iter()
                .flat_map(|(owner, members)| core::iter::once(owner).chain(members))
                .copied()
                .filter(|m| !tree.is_alive(*m)),
        );
        if !dead.is_empty() {
            self.on_removed(&dead);
        }
    }

    fn commit(&self, next: Vec<NodeId>) {
        self.selection.set(next);
    }

    fn unmark(&self, id: NodeId) {
        if let Some(mark) = self.marks.get(&id) {
            mark.set(false);
        }
    }

    fn mark_value(&mut self, id: NodeId) -> ReactiveValue<bool> {
        self.marks
            .entry(id)
            .or_insert_with(|| ReactiveValue::new(false))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use alloc::vec;
    use core::cell::Cell;
    use trellis_tree::LocalNode;

    fn card(x: f64, y: f64) -> LocalNode {
        LocalNode::new("card", Rect::new(x, y, x + 40.0, y + 40.0)).with_flags(NodeFlags::SELECTABLE)
    }

    /// root ─ { a ─ { a1, a2 }, b }
    fn setup() -> (Tree, [NodeId; 5]) {
        let mut tree = Tree::new();
        let root = tree.spawn(None, LocalNode::new("space", Rect::new(0.0, 0.0, 500.0, 500.0))).unwrap();
        let a = tree.spawn(Some(root), card(0.0, 0.0)).unwrap();
        let a1 = tree.spawn(Some(a), card(0.0, 0.0)).unwrap();
        let a2 = tree.spawn(Some(a), card(0.0, 0.0)).unwrap();
        let b = tree.spawn(Some(root), card(100.0, 0.0)).unwrap();
        tree.commit();
        (tree, [root, a, a1, a2, b])
    }

    #[test]
    fn selecting_a_parent_drops_its_descendants() {
        let (tree, [_, a, a1, a2, b]) = setup();
        let mut sel = SelectionState::new();
        sel.add_select(&tree, &[a1, a2, b]);
        assert_eq!(sel.selected(), vec![a1, a2, b], "children selected");
        sel.add_select(&tree, &[a]);
        assert_eq!(sel.selected(), vec![b, a], "children replaced by parent");
        assert!(!sel.mark(a1).get(), "child mark cleared");
        assert!(sel.mark(a).get(), "parent marked");

        sel.add_select(&tree, &[a1]);
        assert!(sel.is_selected(a1), "a descendant may be added afterwards");
    }

    #[test]
    fn deselect_takes_the_subtree() {
        let (tree, [_, a, a1, _, b]) = setup();
        let mut sel = SelectionState::new();
        sel.add_select(&tree, &[a, b]);
        sel.add_select(&tree, &[a1]);
        sel.de_select(&tree, &[a]);
        assert_eq!(sel.selected(), vec![b], "a and a1 both gone");
    }

    #[test]
    fn toggle_and_clear() {
        let (tree, [_, a, _, _, b]) = setup();
        let mut sel = SelectionState::new();
        sel.toggle_select(&tree, &[a, b]);
        assert_eq!(sel.len(), 2, "both toggled on");
        sel.set_implicit(a, vec![b]);
        sel.toggle_select(&tree, &[a]);
        assert_eq!(sel.selected(), vec![b], "a toggled off");
        assert_eq!(sel.implicit(a), &[b], "implicit kept while something is selected");
        sel.toggle_select(&tree, &[b]);
        assert!(sel.is_empty(), "empty");
        assert!(sel.implicit(a).is_empty(), "implicit cleared with the selection");
    }

    #[test]
    fn set_select_notifies_once() {
        let (tree, [_, a, a1, a2, b]) = setup();
        let mut sel = SelectionState::new();
        sel.add_select(&tree, &[a1, a2]);
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        let _sub = sel.selection().subscribe(move |_| h.set(h.get() + 1));
        sel.add_select(&tree, &[a, b]);
        assert_eq!(hits.get(), 1, "one batch, one notification");
        sel.add_select(&tree, &[a]);
        assert_eq!(hits.get(), 1, "no change, no notification");
    }

    #[test]
    fn removed_nodes_leave_the_selection() {
        let (mut tree, [_, a, a1, _, b]) = setup();
        let mut sel = SelectionState::new();
        sel.add_select(&tree, &[a1, b]);
        sel.set_implicit(b, vec![a1]);
        let removed = tree.cleanup(a);
        sel.on_removed(&removed);
        assert_eq!(sel.selected(), vec![b], "a1 dropped");
        assert!(sel.implicit(b).is_empty(), "implicit member dropped");

        tree.cleanup(b);
        sel.prune(&tree);
        assert!(sel.is_empty(), "prune finds the dead id");
        sel.add_select(&tree, &[b]);
        assert!(sel.is_empty(), "stale ids are not selectable");
    }

    #[test]
    fn lasso_selects_sibling_level() {
        let (tree, [root, a, _, _, b]) = setup();
        let mut sel = SelectionState::new();
        let picked = sel.select_in_rect(&tree, root, Rect::new(10.0, 10.0, 20.0, 20.0));
        assert_eq!(picked, vec![a], "a and its children collapse to a");
        let picked = sel.select_in_rect(&tree, root, Rect::new(10.0, 10.0, 120.0, 20.0));
        assert_eq!(picked, vec![a, b], "both cards");
    }

    /// Every tree of up to five nodes, every selection sequence of two steps.
    #[test]
    fn no_descendant_of_a_fresh_selection_stays_selected() {
        let mut shapes: Vec<Vec<usize>> = vec![vec![]];
        for i in 1..5 {
            shapes = shapes
                .into_iter()
                .flat_map(|s| {
                    (0..i).map(move |p| {
                        let mut next = s.clone();
                        next.push(p);
                        next
                    })
                })
                .collect();
        }
        for shape in shapes {
            let mut tree = Tree::new();
            let mut ids = vec![tree.spawn(None, card(0.0, 0.0)).unwrap()];
            for p in &shape {
                ids.push(tree.spawn(Some(ids[*p]), card(0.0, 0.0)).unwrap());
            }
            for &first in &ids {
                for &second in &ids {
                    let mut sel = SelectionState::new();
                    sel.add_select(&tree, &[first]);
                    sel.set_select(&tree, &[second]);
                    sel.add_select(&tree, &[first]);
                    for s in sel.selected() {
                        assert!(
                            s == first || !tree.contains(first, s),
                            "descendant {s:?} of {first:?} still selected in {shape:?}"
                        );
                    }
                    assert_eq!(
                        ids.iter().filter(|n| sel.mark(**n).get()).count(),
                        sel.len(),
                        "marks agree with the set"
                    );
                }
            }
        }
    }
}
