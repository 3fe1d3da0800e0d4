// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Directional focus navigation.
//!
//! Focus state does not know the shape of the tree. It asks a [`Navigator`]
//! for the target of each move; each node may register its own navigator so
//! navigation rules stay local to the node type, and everything else uses the
//! document-order [`TreeOrderNavigator`].

use kurbo::Point;
use trellis_tree::{NodeFlags, NodeId, Tree};

use crate::{Edge, FocusContext, FocusTrigger, TextOffset};

/// A navigation intent.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Navigation {
    /// Move up (arrow up).
    Up,
    /// Move down (arrow down).
    Down,
    /// Move left (arrow left).
    Left,
    /// Move right (arrow right).
    Right,
    /// Leave to the nearest focusable ancestor (Escape).
    Parent,
    /// Enter the first focusable descendant (Enter).
    FirstChild,
}

impl Navigation {
    /// The context a node receives when focus arrives through this move.
    ///
    /// Vertical moves keep the caret column (`from_point.x`) and record the
    /// edge crossed; horizontal moves place the caret at the near end.
    pub fn arrival_context(self, from_point: Option<Point>) -> FocusContext {
        let base = FocusContext {
            trigger: FocusTrigger::Key,
            ..FocusContext::default()
        };
        let column = Point::new(from_point.map_or(0.0, |p| p.x), 0.0);
        match self {
            Self::Up => FocusContext {
                point: Some(column),
                edge: Some(Edge::Bottom),
                ..base
            },
            Self::Down => FocusContext {
                point: Some(column),
                edge: Some(Edge::Top),
                ..base
            },
            Self::Left => base.with_caret(TextOffset::End),
            Self::Right => base.with_caret(TextOffset::At(0)),
            Self::Parent | Self::FirstChild => base,
        }
    }
}

/// A navigation result: the node to focus, plus an optional context override.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct NavTarget {
    /// Node to focus.
    pub node: NodeId,
    /// Context supplied by the navigator, merged over the arrival context.
    pub context: Option<FocusContext>,
}

impl NavTarget {
    /// A target without a context override.
    pub fn node(node: NodeId) -> Self {
        Self {
            node,
            context: None,
        }
    }
}

/// Elects the node that receives focus when it leaves `from`.
pub trait Navigator {
    /// The target for `nav` starting at `from`, if any.
    fn target(&self, tree: &Tree, from: NodeId, nav: Navigation) -> Option<NavTarget>;
}

/// `true` for nodes keyboard navigation may land on.
pub fn is_navigable(tree: &Tree, id: NodeId) -> bool {
    tree.flags(id).is_some_and(|f| {
        f.contains(NodeFlags::VISIBLE | NodeFlags::FOCUSABLE) && !f.contains(NodeFlags::TRANSPARENT)
    })
}

/// Document-order navigation.
///
/// Up and left go to the preceding navigable node, down and right to the
/// succeeding one. Parent is the nearest navigable ancestor; first child is
/// the first navigable descendant.
#[derive(Copy, Clone, Debug, Default)]
pub struct TreeOrderNavigator;

impl Navigator for TreeOrderNavigator {
    fn target(&self, tree: &Tree, from: NodeId, nav: Navigation) -> Option<NavTarget> {
        let ok = |n| is_navigable(tree, n);
        let node = match nav {
            Navigation::Up | Navigation::Left => tree.find_preceding_node(from, ok),
            Navigation::Down | Navigation::Right => tree.find_succeeding_node(from, ok),
            Navigation::Parent => tree.closest_parent(from, ok),
            Navigation::FirstChild => tree.find_child(from, ok),
        };
        node.map(NavTarget::node)
    }
}

/// Geometric navigation among the navigable descendants of a scope node.
///
/// Arrow moves pick the candidate whose client-space center lies in the
/// direction of travel, scoring `|primary| + 4 * |secondary|` so closer and
/// better-aligned candidates win. Parent and first-child moves fall back to
/// document order.
#[derive(Copy, Clone, Debug)]
pub struct SpatialNavigator {
    /// Only descendants of this node are candidates.
    pub scope: NodeId,
}

impl Navigator for SpatialNavigator {
    fn target(&self, tree: &Tree, from: NodeId, nav: Navigation) -> Option<NavTarget> {
        let (horizontal, sign) = match nav {
            Navigation::Right => (true, 1.0),
            Navigation::Left => (true, -1.0),
            Navigation::Down => (false, 1.0),
            Navigation::Up => (false, -1.0),
            Navigation::Parent | Navigation::FirstChild => {
                return TreeOrderNavigator.target(tree, from, nav);
            }
        };
        let origin = tree.client_box(from)?.center();
        let mut best: Option<(f64, NodeId)> = None;
        for candidate in tree.find_children(self.scope, |n| n != from && is_navigable(tree, n)) {
            let Some(bx) = tree.client_box(candidate) else {
                continue;
            };
            let d = bx.center() - origin;
            let (primary, secondary) = if horizontal { (d.x, d.y) } else { (d.y, d.x) };
            if sign * primary <= 0.0 {
                continue;
            }
            let score = primary.abs() + 4.0 * secondary.abs();
            if score.is_finite() && best.is_none_or(|(s, _)| score < s) {
                best = Some((score, candidate));
            }
        }
        best.map(|(_, n)| NavTarget::node(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Rect;
    use trellis_tree::LocalNode;

    fn focusable(x: f64, y: f64) -> LocalNode {
        LocalNode::new("cell", Rect::new(x, y, x + 10.0, y + 10.0)).with_flags(NodeFlags::FOCUSABLE)
    }

    #[test]
    fn tree_order_moves() {
        let mut tree = Tree::new();
        let root = tree.spawn(None, LocalNode::default()).unwrap();
        let list = tree.spawn(Some(root), focusable(0.0, 0.0)).unwrap();
        let a = tree.spawn(Some(list), focusable(0.0, 0.0)).unwrap();
        let hidden = tree.spawn(Some(list), focusable(0.0, 20.0)).unwrap();
        let b = tree.spawn(Some(list), focusable(0.0, 40.0)).unwrap();
        tree.toggle_flags(hidden, NodeFlags::VISIBLE, false);

        let nav = TreeOrderNavigator;
        let go = |from, n| nav.target(&tree, from, n).map(|t| t.node);
        assert_eq!(go(a, Navigation::Down), Some(b), "hidden sibling is skipped");
        assert_eq!(go(b, Navigation::Up), Some(a), "back up");
        assert_eq!(go(a, Navigation::Up), Some(list), "up reaches the parent");
        assert_eq!(go(a, Navigation::Parent), Some(list), "escape to parent");
        assert_eq!(go(list, Navigation::FirstChild), Some(a), "enter first child");
        assert_eq!(go(b, Navigation::Right), None, "nothing after the last cell");
    }

    #[test]
    fn spatial_prefers_aligned_candidates() {
        let mut tree = Tree::new();
        let root = tree.spawn(None, LocalNode::new("grid", Rect::new(0.0, 0.0, 100.0, 100.0))).unwrap();
        let origin = tree.spawn(Some(root), focusable(0.0, 0.0)).unwrap();
        let right = tree.spawn(Some(root), focusable(40.0, 0.0)).unwrap();
        let _diagonal = tree.spawn(Some(root), focusable(20.0, 20.0)).unwrap();
        let below = tree.spawn(Some(root), focusable(0.0, 50.0)).unwrap();

        let nav = SpatialNavigator { scope: root };
        let go = |n| nav.target(&tree, origin, n).map(|t| t.node);
        assert_eq!(go(Navigation::Right), Some(right), "aligned beats closer diagonal");
        assert_eq!(go(Navigation::Down), Some(below), "straight down");
        assert_eq!(go(Navigation::Left), None, "nothing to the left");
    }

    #[test]
    fn arrival_contexts() {
        let up = Navigation::Up.arrival_context(Some(Point::new(42.0, 7.0)));
        assert_eq!(up.edge, Some(Edge::Bottom), "moving up enters through the bottom");
        assert_eq!(up.point, Some(Point::new(42.0, 0.0)), "caret column is kept");
        let left = Navigation::Left.arrival_context(None);
        assert_eq!(left.selection_start, Some(TextOffset::End), "caret at end");
        assert_eq!(left.trigger, FocusTrigger::Key, "keyboard trigger");
        let right = Navigation::Right.arrival_context(None);
        assert_eq!(right.selection_end, Some(TextOffset::At(0)), "caret at start");
    }
}
