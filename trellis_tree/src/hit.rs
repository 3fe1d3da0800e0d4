// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hit testing across nested spaces.
//!
//! Hit tests walk down from a root, carrying the client mapping of each plane
//! as they enter nested spaces, so results always reflect the current tree
//! even between commits.

use alloc::vec::Vec;

use kurbo::{Point, Rect};
use trellis_geometry::SpaceTransform;

use crate::tree::Node;
use crate::types::{Lifecycle, NodeFlags};
use crate::{NodeId, Tree};

impl Tree {
    /// `true` if the client point `p` lands on the node's hit shape.
    pub fn intersects_point(&self, id: NodeId, p: Point) -> bool {
        self.live(id)
            .is_some_and(|n| shape_hit(n, self.bounds_transform(id), p))
    }

    /// Children of `id` in hit-test order.
    ///
    /// Topmost first: higher effective z wins, and among equal z the later
    /// child wins. Nodes flagged [`NodeFlags::FORWARD_HIT_ORDER`] keep
    /// insertion order instead.
    pub fn hit_order(&self, id: NodeId) -> Vec<NodeId> {
        let Some(n) = self.live(id) else {
            return Vec::new();
        };
        let mut children: Vec<(usize, i32, NodeId)> = n
            .children
            .iter()
            .enumerate()
            .filter_map(|(i, c)| self.live(*c).map(|cn| (i, cn.effective_z(), *c)))
            .collect();
        if !n.local.flags.contains(NodeFlags::FORWARD_HIT_ORDER) {
            children.sort_by(|a, b| b.1.cmp(&a.1).then(b.0.cmp(&a.0)));
        }
        children.into_iter().map(|(_, _, c)| c).collect()
    }

    /// Topmost live node under the client point `p` within `root`'s subtree.
    ///
    /// Invisible nodes hide their whole subtree. Children are searched before
    /// their parent, and only within the parent's shape unless the parent is
    /// flagged [`NodeFlags::OVERFLOW`]. A node is returned only if it is
    /// pickable, not transparent, and `accept` agrees; otherwise the search
    /// continues with its siblings and ancestors.
    pub fn node_at_point(
        &self,
        root: NodeId,
        p: Point,
        mut accept: impl FnMut(NodeId) -> bool,
    ) -> Option<NodeId> {
        if !self.is_alive(root) {
            return None;
        }
        self.hit_recursive(root, self.bounds_transform(root), p, &mut accept)
    }

    fn hit_recursive(
        &self,
        id: NodeId,
        tf: SpaceTransform,
        p: Point,
        accept: &mut dyn FnMut(NodeId) -> bool,
    ) -> Option<NodeId> {
        let n = self.live(id)?;
        if n.lifecycle != Lifecycle::Live || !n.local.flags.contains(NodeFlags::VISIBLE) {
            return None;
        }
        let inside = shape_hit(n, tf, p);
        if !inside && !n.local.flags.contains(NodeFlags::OVERFLOW) {
            return None;
        }
        let child_tf = child_transform(n, tf);
        for child in self.hit_order(id) {
            if let Some(hit) = self.hit_recursive(child, child_tf, p, accept) {
                return Some(hit);
            }
        }
        (inside && is_pickable(n.local.flags) && accept(id)).then_some(id)
    }

    /// Every pickable node in `root`'s subtree whose client box touches `rect`.
    ///
    /// Results are in document order. Shared edges count as touching.
    pub fn nodes_at_rect(
        &self,
        root: NodeId,
        rect: Rect,
        mut accept: impl FnMut(NodeId) -> bool,
    ) -> Vec<NodeId> {
        let mut out = Vec::new();
        if self.is_alive(root) {
            self.rect_recursive(root, self.bounds_transform(root), rect, &mut accept, &mut out);
        }
        out
    }

    fn rect_recursive(
        &self,
        id: NodeId,
        tf: SpaceTransform,
        rect: Rect,
        accept: &mut dyn FnMut(NodeId) -> bool,
        out: &mut Vec<NodeId>,
    ) {
        let Some(n) = self.live(id) else {
            return;
        };
        if n.lifecycle != Lifecycle::Live || !n.local.flags.contains(NodeFlags::VISIBLE) {
            return;
        }
        let client = tf.rect_to_client(n.local.bounds);
        let touches = client.x0 <= rect.x1
            && rect.x0 <= client.x1
            && client.y0 <= rect.y1
            && rect.y0 <= client.y1;
        if !touches && !n.local.flags.contains(NodeFlags::OVERFLOW) {
            return;
        }
        if touches && is_pickable(n.local.flags) && accept(id) {
            out.push(id);
        }
        let child_tf = child_transform(n, tf);
        for &child in &n.children {
            self.rect_recursive(child, child_tf, rect, accept, out);
        }
    }
}

fn is_pickable(flags: NodeFlags) -> bool {
    flags.contains(NodeFlags::PICKABLE) && !flags.contains(NodeFlags::TRANSPARENT)
}

fn child_transform(n: &Node, tf: SpaceTransform) -> SpaceTransform {
    match n.local.space {
        Some(view) => tf.nest(view.frame(n.local.bounds)),
        None => tf,
    }
}

fn shape_hit(n: &Node, tf: SpaceTransform, p: Point) -> bool {
    let origin = tf.space_to_client(n.local.bounds.origin());
    let local = ((p - origin) / tf.plane_scale()).to_point();
    n.local.hit_shape.contains(local, n.local.bounds.size())
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use kurbo::{Point, Rect};

    use crate::{HitShape, LocalNode, NodeFlags, NodeId, SpaceView, Tree};

    fn boxed(x: f64, y: f64, w: f64, h: f64) -> LocalNode {
        LocalNode::new("node", Rect::new(x, y, x + w, y + h))
    }

    fn live(tree: &mut Tree, parent: Option<NodeId>, local: LocalNode) -> NodeId {
        let id = tree.spawn(parent, local).unwrap();
        tree.commit();
        id
    }

    #[test]
    fn later_siblings_win_ties_and_z_wins_overall() {
        let mut tree = Tree::new();
        let root = live(&mut tree, None, boxed(0.0, 0.0, 100.0, 100.0));
        let a = live(&mut tree, Some(root), boxed(0.0, 0.0, 50.0, 50.0));
        let b = live(&mut tree, Some(root), boxed(0.0, 0.0, 50.0, 50.0));
        let p = Point::new(10.0, 10.0);
        assert_eq!(tree.node_at_point(root, p, |_| true), Some(b), "later sibling on top");
        tree.set_z_index(a, 5);
        assert_eq!(tree.node_at_point(root, p, |_| true), Some(a), "higher z on top");
        tree.set_z_override(b, Some(10));
        assert_eq!(tree.node_at_point(root, p, |_| true), Some(b), "override counts");
        tree.toggle_flags(root, NodeFlags::FORWARD_HIT_ORDER, true);
        assert_eq!(tree.node_at_point(root, p, |_| true), Some(a), "forward order ignores z");
        assert_eq!(tree.node_at_point(root, Point::new(70.0, 70.0), |_| true), Some(root), "falls back to parent");
        assert_eq!(tree.node_at_point(root, Point::new(170.0, 70.0), |_| true), None, "outside everything");
    }

    #[test]
    fn flags_shape_the_search() {
        let mut tree = Tree::new();
        let root = live(&mut tree, None, boxed(0.0, 0.0, 100.0, 100.0));
        let small = live(&mut tree, Some(root), boxed(0.0, 0.0, 10.0, 10.0));
        let spill = live(&mut tree, Some(small), boxed(20.0, 20.0, 10.0, 10.0));
        let p = Point::new(25.0, 25.0);
        assert_eq!(tree.node_at_point(root, p, |_| true), Some(root), "child outside parent is clipped");
        tree.toggle_flags(small, NodeFlags::OVERFLOW, true);
        assert_eq!(tree.node_at_point(root, p, |_| true), Some(spill), "overflow reaches the child");

        tree.set_transparent(spill, true);
        assert_eq!(tree.node_at_point(root, p, |_| true), Some(root), "transparent nodes are skipped");
        tree.set_transparent(spill, false);
        assert_eq!(tree.node_at_point(root, p, |n| n != spill), Some(root), "accept filter applies");

        tree.toggle_flags(small, NodeFlags::VISIBLE, false);
        assert_eq!(tree.node_at_point(root, p, |_| true), Some(root), "hidden subtree is skipped");
    }

    #[test]
    fn uncommitted_nodes_are_not_hit() {
        let mut tree = Tree::new();
        let root = live(&mut tree, None, boxed(0.0, 0.0, 100.0, 100.0));
        let fresh = tree.spawn(Some(root), boxed(0.0, 0.0, 10.0, 10.0)).unwrap();
        let p = Point::new(5.0, 5.0);
        assert_eq!(tree.node_at_point(root, p, |_| true), Some(root), "not live yet");
        tree.commit();
        assert_eq!(tree.node_at_point(root, p, |_| true), Some(fresh), "live after commit");
    }

    #[test]
    fn hits_inside_scaled_portal() {
        let mut tree = Tree::new();
        let root = live(&mut tree, None, boxed(0.0, 0.0, 2000.0, 2000.0));
        let portal = live(
            &mut tree,
            Some(root),
            boxed(500.0, 500.0, 1000.0, 1000.0).with_space(SpaceView::new(Point::new(100.0, 100.0), 2.0)),
        );
        // Logical (110, 110)..(120, 120) inside the portal maps to client (520, 520)..(540, 540).
        let card = live(&mut tree, Some(portal), boxed(110.0, 110.0, 10.0, 10.0));
        assert_eq!(tree.node_at_point(root, Point::new(530.0, 530.0), |_| true), Some(card), "scaled hit");
        assert_eq!(tree.node_at_point(root, Point::new(545.0, 530.0), |_| true), Some(portal), "just outside");
        assert!(tree.intersects_point(card, Point::new(540.0, 540.0)), "edges are inclusive");
    }

    #[test]
    fn custom_shapes_use_local_coordinates() {
        let mut tree = Tree::new();
        let root = live(&mut tree, None, boxed(0.0, 0.0, 200.0, 200.0));
        let dial = live(
            &mut tree,
            Some(root),
            boxed(100.0, 100.0, 50.0, 50.0).with_hit_shape(HitShape::Circle),
        );
        assert_eq!(tree.node_at_point(root, Point::new(125.0, 125.0), |_| true), Some(dial), "center");
        assert_eq!(tree.node_at_point(root, Point::new(101.0, 101.0), |_| true), Some(root), "corner misses the circle");
    }

    #[test]
    fn rect_query_collects_touching_nodes() {
        let mut tree = Tree::new();
        let root = live(&mut tree, None, boxed(0.0, 0.0, 300.0, 300.0));
        let a = live(&mut tree, Some(root), boxed(0.0, 0.0, 50.0, 50.0));
        let b = live(&mut tree, Some(root), boxed(100.0, 0.0, 50.0, 50.0));
        let _c = live(&mut tree, Some(root), boxed(200.0, 200.0, 50.0, 50.0));
        let hits = tree.nodes_at_rect(root, Rect::new(40.0, 10.0, 100.0, 20.0), |n| n != root);
        assert_eq!(hits, vec![a, b], "shared edge with b counts");
    }
}
