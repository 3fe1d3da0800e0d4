// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The drag-and-drop behavior.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::fmt;

use kurbo::Point;
use smallvec::SmallVec;
use trellis_geometry::{DEFAULT_SNAP_TOLERANCE, ZBand};
use trellis_nav::{
    Behavior, ClickClass, DispatchStatus, EventCx, EventKind, Key, KeyEvent, Modifiers,
    PointerEvent,
};
use trellis_reactive::{ReactiveValue, ReadOnly};
use trellis_tree::{DragMode, Indication, NodeFlags, NodeId, Tree};

use crate::item::Placement;
use crate::{
    DragInstance, DragItem, DragNodes, DropError, DropRegistry, DropRequest, LiftedState,
    Transactor, eligible_items,
};

/// Drag tuning.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DragConfig {
    /// Distance the pointer must exceed on either axis before a press
    /// becomes a drag.
    pub threshold: f64,
    /// How far a drop position may be pulled onto the grid.
    pub snap_tolerance: f64,
    /// Grid to snap drop positions to, if any.
    pub grid: Option<f64>,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            threshold: 1.0,
            snap_tolerance: DEFAULT_SNAP_TOLERANCE,
            grid: None,
        }
    }
}

/// Where a drag gesture is.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum DragPhase {
    /// No gesture.
    #[default]
    Idle,
    /// Pressed on draggable items; the pointer has not passed the threshold.
    Grabbing,
    /// Items are following the pointer.
    Dragging,
    /// Released over a target; the drop transaction is running.
    Dropping,
}

/// Where a renderer should draw one dragged item.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DragProxy {
    /// The dragged node.
    pub node: NodeId,
    /// Whether the node or a clone of it follows the pointer.
    pub mode: DragMode,
    /// Client top-left.
    pub position: Point,
    /// Zoom of the plane the node was grabbed in, for sizing a clone.
    pub scale: f64,
}

/// Drags nodes around and drops them into other nodes.
///
/// Attach heritably to the root. A primary press on a draggable node (or a
/// drag handle) grabs it, or the whole selection if the grabbed node is
/// selected, and claims the pointer until release. Moving past
/// [`DragConfig::threshold`] starts the drag; releasing over an accepting
/// droppable node commits the drop in one transaction. Releasing without
/// having moved is a plain click and is passed on.
///
/// Items flagged [`NodeFlags::CLONE_ON_DRAG`], and every item when alt was
/// held at the grab (a transclusion), are drawn as clones. Other items move
/// in place: elevated to the draggable z band and made transparent to hit
/// testing. Either way all drag state is undone when the gesture ends, and
/// Escape aborts it.
pub struct DragDrop {
    config: DragConfig,
    registry: DropRegistry,
    transactor: Rc<dyn Transactor>,
    instance: Option<DragInstance>,
    active: Option<NodeId>,
    has_moved: bool,
    can_drop: Option<NodeId>,
    indicated: DragNodes,
    phase: ReactiveValue<DragPhase>,
    overlay: ReactiveValue<Vec<DragProxy>>,
}

impl fmt::Debug for DragDrop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DragDrop")
            .field("config", &self.config)
            .field("instance", &self.instance)
            .field("has_moved", &self.has_moved)
            .field("can_drop", &self.can_drop)
            .field("phase", &self.phase.get())
            .finish_non_exhaustive()
    }
}

impl DragDrop {
    /// A drag behavior committing drops through `transactor`.
    pub fn new(transactor: impl Transactor + 'static) -> Self {
        Self::with_config(DragConfig::default(), transactor)
    }

    /// A drag behavior with `config`.
    pub fn with_config(config: DragConfig, transactor: impl Transactor + 'static) -> Self {
        Self {
            config,
            registry: DropRegistry::new(),
            transactor: Rc::new(transactor),
            instance: None,
            active: None,
            has_moved: false,
            can_drop: None,
            indicated: DragNodes::new(),
            phase: ReactiveValue::new(DragPhase::Idle),
            overlay: ReactiveValue::new(Vec::new()),
        }
    }

    /// Drop targets and drag sources. Registrations made through the handle
    /// apply to this behavior.
    pub fn registry(&self) -> DropRegistry {
        self.registry.clone()
    }

    /// The gesture phase.
    pub fn phase(&self) -> ReadOnly<DragPhase> {
        self.phase.read_only()
    }

    /// Where each dragged item should be drawn; empty when not dragging.
    pub fn overlay(&self) -> ReadOnly<Vec<DragProxy>> {
        self.overlay.read_only()
    }

    /// The gesture in progress.
    pub fn instance(&self) -> Option<&DragInstance> {
        self.instance.as_ref()
    }

    fn past_threshold(&self, start: Point, p: Point) -> bool {
        let d = p - start;
        d.x.abs() > self.config.threshold || d.y.abs() > self.config.threshold
    }

    /// Topmost node under `p` the dragged `nodes` could be dropped on.
    ///
    /// The dragged nodes themselves count as targets so that releasing over
    /// one is a drop onto itself (which its target then refuses). Their
    /// descendants never count.
    fn drop_target(&self, tree: &Tree, root: NodeId, nodes: &[NodeId], p: Point) -> Option<NodeId> {
        tree.node_at_point(root, p, |n| {
            if nodes.contains(&n) {
                return true;
            }
            if nodes.iter().any(|d| tree.contains(*d, n)) {
                return false;
            }
            self.registry.accepts(tree, n, nodes)
        })
    }

    fn show_can_drop(&mut self, tree: &mut Tree, target: Option<NodeId>) {
        if self.can_drop == target {
            return;
        }
        if let Some(old) = self.can_drop.take() {
            tree.deindicate(old, Indication::CAN_DROP);
        }
        if let Some(new) = target {
            tree.indicate(new, Indication::CAN_DROP);
        }
        self.can_drop = target;
    }

    fn indicate_hover(&mut self, tree: &mut Tree, items: DragNodes) {
        for old in self.indicated.iter().filter(|n| !items.contains(n)) {
            tree.deindicate(*old, Indication::DRAG);
        }
        for new in items.iter().filter(|n| !self.indicated.contains(n)) {
            tree.indicate(*new, Indication::DRAG);
        }
        self.indicated = items;
    }

    /// One-time setup when the pointer first passes the threshold.
    fn lift(tree: &mut Tree, instance: &mut DragInstance) {
        instance.lifted = instance
            .items
            .iter()
            .map(|i| LiftedState::capture(tree, i.node))
            .collect();
        for item in &instance.items {
            let n = item.node;
            if instance.is_transclusion || tree.has_flags(n, NodeFlags::CLONE_ON_DRAG) {
                tree.set_dragging(n, Some(DragMode::Clone));
            } else {
                tree.set_z_override(n, Some(ZBand::Draggable.min()));
                tree.set_dragging(n, Some(DragMode::InPlace));
                tree.set_transparent(n, true);
            }
        }
    }

    /// Undo [`lift`](Self::lift), restoring what each item had before.
    /// Dead items are skipped.
    fn settle(tree: &mut Tree, instance: &DragInstance) {
        for item in &instance.items {
            tree.set_dragging(item.node, None);
        }
        for prior in &instance.lifted {
            prior.restore(tree);
        }
    }

    fn proxies(tree: &Tree, instance: &DragInstance, p: Point) -> Vec<DragProxy> {
        instance
            .items
            .iter()
            .filter_map(|item| {
                Some(DragProxy {
                    node: item.node,
                    mode: tree.dragging(item.node)?,
                    position: item.client_position(p),
                    scale: tree.bounds_transform(item.node).plane_scale(),
                })
            })
            .collect()
    }

    /// Hand the items to `target` in one transaction.
    ///
    /// If the transaction fails, items the target already moved are put back.
    fn drop_into(
        &self,
        tree: &mut Tree,
        instance: &DragInstance,
        target: NodeId,
        pointer: Point,
    ) -> Result<(), DropError> {
        if !tree.is_alive(target) {
            return Err(DropError::DeadTarget(target));
        }
        let nodes = instance.nodes();
        if !self.registry.accepts(tree, target, &nodes) {
            return Err(DropError::Rejected(target));
        }
        let handler = self.registry.target_for(target);
        let request = DropRequest {
            target,
            items: &instance.items,
            pointer,
            is_transclusion: instance.is_transclusion,
            grid: self.config.grid,
            snap_tolerance: self.config.snap_tolerance,
        };
        let mut before: SmallVec<[Placement; 4]> = instance
            .items
            .iter()
            .filter_map(|i| Placement::capture(tree, i.node))
            .collect();
        let result = self.transactor.run(&mut |trx| {
            let dropped = handler.handle_drop(tree, &request, trx)?;
            if instance.is_transclusion {
                return Ok(());
            }
            for node in dropped {
                let from = instance
                    .items
                    .iter()
                    .find(|i| i.node == node)
                    .and_then(|i| i.origin_parent);
                if let Some(source) = self.registry.source_for(node, from) {
                    source.handle_depart(tree, node, from, trx)?;
                }
            }
            Ok(())
        });
        if result.is_err() {
            log::debug!("drop onto {target:?} failed; restoring {} item(s)", before.len());
            Placement::restore_all(tree, &mut before);
        }
        result
    }

    /// End the gesture without dropping.
    fn abort(&mut self, cx: &mut EventCx<'_>) {
        cx.unset_global_overrides();
        self.active = None;
        let tree = &mut cx.scene.tree;
        self.show_can_drop(tree, None);
        if let Some(instance) = self.instance.take() {
            Self::settle(tree, &instance);
            log::debug!("drag of {} item(s) aborted", instance.items.len());
        }
        self.has_moved = false;
        self.overlay.set(Vec::new());
        self.phase.set(DragPhase::Idle);
    }
}

impl Behavior for DragDrop {
    fn active_node(&self) -> Option<NodeId> {
        self.active
    }

    fn mouse_down(&mut self, cx: &mut EventCx<'_>, e: &PointerEvent, node: NodeId) -> DispatchStatus {
        let class = cx.classify(e);
        if matches!(class, ClickClass::Pan | ClickClass::Context) {
            return DispatchStatus::Decline;
        }
        if self.instance.is_some() {
            // The previous release never arrived.
            self.abort(cx);
        }
        self.active = Some(node);
        if !class.is_drag_eligible() {
            return DispatchStatus::Decline;
        }
        let tree = &cx.scene.tree;
        if tree.has_flags(node, NodeFlags::TEXT_INPUT) {
            return DispatchStatus::Decline;
        }
        let selection = cx.scene.selection.selected();
        let items: SmallVec<[DragItem; 4]> = eligible_items(tree, &selection, node)
            .into_iter()
            .filter_map(|n| DragItem::capture(tree, n, e.position))
            .collect();
        if items.is_empty() {
            log::trace!("nothing to drag under {node:?}");
            return DispatchStatus::Decline;
        }
        self.has_moved = false;
        cx.set_global_overrides(&[EventKind::MouseUp, EventKind::MouseMove, EventKind::MouseEnter]);
        self.instance = Some(DragInstance::new(
            items,
            e.modifiers.contains(Modifiers::ALT),
            e.position,
        ));
        self.phase.set(DragPhase::Grabbing);
        DispatchStatus::Stop
    }

    fn mouse_enter(&mut self, _: &mut EventCx<'_>, _: &PointerEvent, _: NodeId) -> DispatchStatus {
        if self.instance.is_some() {
            DispatchStatus::Stop
        } else {
            DispatchStatus::Decline
        }
    }

    fn mouse_move(&mut self, cx: &mut EventCx<'_>, e: &PointerEvent, node: NodeId) -> DispatchStatus {
        let Some(mut instance) = self.instance.take() else {
            let items = eligible_items(&cx.scene.tree, &cx.scene.selection.selected(), node);
            self.indicate_hover(&mut cx.scene.tree, items);
            return DispatchStatus::Decline;
        };
        if !self.has_moved && !self.past_threshold(instance.start, e.position) {
            self.instance = Some(instance);
            return DispatchStatus::Stop;
        }
        let root = cx.scene.root();
        let tree = &mut cx.scene.tree;
        if !self.has_moved {
            Self::lift(tree, &mut instance);
            self.has_moved = true;
            self.phase.set(DragPhase::Dragging);
        }
        self.overlay.set(Self::proxies(tree, &instance, e.position));
        let nodes = instance.nodes();
        let target = self
            .drop_target(tree, root, &nodes, e.position)
            .filter(|t| !nodes.contains(t));
        self.show_can_drop(tree, target);
        self.instance = Some(instance);
        DispatchStatus::Stop
    }

    fn mouse_up(&mut self, cx: &mut EventCx<'_>, e: &PointerEvent, _: NodeId) -> DispatchStatus {
        self.active = None;
        let Some(mut instance) = self.instance.take() else {
            return DispatchStatus::Decline;
        };
        cx.unset_global_overrides();
        let root = cx.scene.root();
        let tree = &mut cx.scene.tree;
        self.show_can_drop(tree, None);
        if !self.has_moved {
            self.phase.set(DragPhase::Idle);
            return DispatchStatus::Continue;
        }
        self.has_moved = false;

        instance.retain_alive(tree);
        let nodes = instance.nodes();
        let mut landed = None;
        if let Some(target) = self.drop_target(tree, root, &nodes, e.position) {
            self.phase.set(DragPhase::Dropping);
            match self.drop_into(tree, &instance, target, e.position) {
                Ok(()) => landed = Some(target),
                Err(err) => log::warn!("drop onto {target:?} not committed: {err}"),
            }
        }
        Self::settle(tree, &instance);
        self.overlay.set(Vec::new());

        if let Some(target) = landed {
            let space = tree.closest_space(target);
            let left: DragNodes = instance
                .items
                .iter()
                .filter(|i| i.origin_space != space)
                .map(|i| i.node)
                .collect();
            if !left.is_empty() {
                cx.scene.selection.de_select(&cx.scene.tree, &left);
            }
        }
        cx.scene.tree.z_enumerate(root);
        self.phase.set(DragPhase::Idle);
        DispatchStatus::Stop
    }

    fn key_down(&mut self, cx: &mut EventCx<'_>, e: &KeyEvent, _: NodeId) -> DispatchStatus {
        if e.key == Key::Escape && self.instance.is_some() {
            self.abort(cx);
            return DispatchStatus::Stop;
        }
        DispatchStatus::Decline
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::boxed::Box;
    use alloc::string::ToString;
    use kurbo::Rect;
    use trellis_nav::{EventNav, Scene};
    use trellis_tree::{LocalNode, SpaceView};

    use crate::{Change, ChangeLog, DragSource, DropTarget, RecordDeparture, Transaction};

    struct World {
        nav: EventNav,
        root: NodeId,
        a: NodeId,
        a2: NodeId,
        portal: NodeId,
        log: ChangeLog,
        registry: DropRegistry,
        phase: ReadOnly<DragPhase>,
    }

    fn card(x: f64, y: f64) -> LocalNode {
        LocalNode::new("card", Rect::new(x, y, x + 100.0, y + 100.0)).with_flags(NodeFlags::DRAGGABLE)
    }

    /// A canvas holding cards `a` at (0, 0) and `a2` at (200, 0), and a
    /// droppable portal at (500, 500) sized 1000 x 1000.
    fn world() -> World {
        let mut scene = Scene::with_root(LocalNode::new("canvas", Rect::new(0.0, 0.0, 2000.0, 2000.0))).unwrap();
        let root = scene.root();
        let a = scene.spawn(root, card(0.0, 0.0)).unwrap();
        let a2 = scene.spawn(root, card(200.0, 0.0)).unwrap();
        let portal = LocalNode::new("portal", Rect::new(500.0, 500.0, 1500.0, 1500.0))
            .with_flags(NodeFlags::DROPPABLE)
            .with_space(SpaceView::default());
        let portal = scene.spawn(root, portal).unwrap();
        scene.commit();

        let log = ChangeLog::new();
        let drag = DragDrop::new(log.clone());
        let registry = drag.registry();
        let phase = drag.phase();
        let mut nav = EventNav::new(scene);
        let id = nav.add_behavior(Box::new(drag));
        nav.attach_heritable(root, id);
        World { nav, root, a, a2, portal, log, registry, phase }
    }

    fn at(x: f64, y: f64) -> PointerEvent {
        PointerEvent::at(Point::new(x, y))
    }

    fn tree(w: &World) -> &Tree {
        &w.nav.scene().tree
    }

    fn indicated(w: &World, id: NodeId, hint: Indication) -> bool {
        tree(w).indication(id).is_some_and(|i| i.get().contains(hint))
    }

    fn assert_settled(w: &World, id: NodeId) {
        assert_eq!(tree(w).z_override(id), None, "z override cleared");
        assert_eq!(tree(w).dragging(id), None, "not dragging");
        assert!(!tree(w).has_flags(id, NodeFlags::TRANSPARENT), "hit-testable again");
        assert_eq!(w.phase.get(), DragPhase::Idle, "idle");
    }

    #[test]
    fn dropping_into_a_portal_reparents_and_keeps_the_grab_offset() {
        let mut w = world();
        let (a, portal) = (w.a, w.portal);
        let scene = w.nav.scene_mut();
        scene.selection.set_select(&scene.tree, &[a]);

        assert_eq!(w.nav.pointer_down(at(10.0, 10.0)), DispatchStatus::Stop, "grabbed");
        assert_eq!(w.phase.get(), DragPhase::Grabbing, "grabbing");
        assert_eq!(w.nav.pointer_move(at(530.0, 530.0)), DispatchStatus::Stop, "dragging");
        assert_eq!(w.phase.get(), DragPhase::Dragging, "past the threshold");
        assert_eq!(tree(&w).dragging(a), Some(DragMode::InPlace), "moves in place");
        assert_eq!(tree(&w).z_override(a), Some(ZBand::Draggable.min()), "elevated");
        assert!(indicated(&w, portal, Indication::CAN_DROP), "portal marked");

        assert_eq!(w.nav.pointer_up(at(530.0, 530.0)), DispatchStatus::Stop, "dropped");
        assert_eq!(tree(&w).parent_of(a), Some(portal), "now inside the portal");
        assert_eq!(tree(&w).bounds(a).map(|b| b.origin()), Some(Point::new(20.0, 20.0)), "logical position");
        assert_eq!(
            w.log.transactions(),
            [[Change::Moved { node: a, from: Some(w.root), to: portal, position: Point::new(20.0, 20.0) }]],
            "one transaction"
        );
        assert!(!indicated(&w, portal, Indication::CAN_DROP), "marker removed");
        assert!(!w.nav.scene().selection.is_selected(a), "left its space: deselected");
        assert_settled(&w, a);
        assert_eq!(w.nav.routing().override_owner(EventKind::MouseMove), None, "pointer released");
    }

    #[test]
    fn a_selected_card_drags_the_whole_selection() {
        let mut w = world();
        let (a, a2, portal) = (w.a, w.a2, w.portal);
        w.registry.set_default_source(RecordDeparture);
        let scene = w.nav.scene_mut();
        scene.selection.set_select(&scene.tree, &[a, a2]);

        w.nav.pointer_down(at(10.0, 10.0));
        w.nav.pointer_move(at(530.0, 530.0));
        w.nav.pointer_up(at(530.0, 530.0));

        assert_eq!(tree(&w).bounds(a2).map(|b| b.origin()), Some(Point::new(220.0, 20.0)), "relative layout kept");
        assert_eq!(tree(&w).children_of(portal), [a, a2], "both moved");
        let departed: Vec<_> = w
            .log
            .changes()
            .into_iter()
            .filter(|c| matches!(c, Change::Departed { .. }))
            .collect();
        assert_eq!(
            departed,
            [Change::Departed { node: a, from: Some(w.root) }, Change::Departed { node: a2, from: Some(w.root) }],
            "each origin told"
        );
        assert_eq!(w.log.transactions().len(), 1, "one transaction for the gesture");
    }

    #[test]
    fn the_threshold_is_strict() {
        let mut w = world();
        let a = w.a;
        w.nav.pointer_down(at(10.0, 10.0));
        w.nav.pointer_move(at(11.0, 11.0));
        assert_eq!(w.phase.get(), DragPhase::Grabbing, "1px is not a drag");
        assert_eq!(tree(&w).z_override(a), None, "no z churn");

        assert_eq!(w.nav.pointer_up(at(11.0, 11.0)), DispatchStatus::Continue, "a plain click");
        assert!(w.log.changes().is_empty(), "nothing dropped");
        assert_settled(&w, a);

        w.nav.pointer_down(at(10.0, 10.0).with_time(5_000));
        w.nav.pointer_move(at(12.0, 10.0));
        assert_eq!(w.phase.get(), DragPhase::Dragging, "2px is");
        assert_eq!(w.nav.pointer_up(at(12.0, 10.0)), DispatchStatus::Stop, "drag ends");
        assert_eq!(tree(&w).parent_of(a), Some(w.root), "no target: nothing moved");
        assert_settled(&w, a);
    }

    #[test]
    fn never_drops_into_its_own_descendants() {
        let mut w = world();
        let a = w.a;
        let inner = LocalNode::new("inner", Rect::new(10.0, 10.0, 90.0, 90.0)).with_flags(NodeFlags::DROPPABLE);
        let inner = w.nav.scene_mut().spawn(a, inner).unwrap();

        w.nav.pointer_down(at(5.0, 5.0));
        w.nav.pointer_move(at(50.0, 50.0));
        assert!(!indicated(&w, inner, Indication::CAN_DROP), "own child is not a target");
        w.nav.pointer_up(at(50.0, 50.0));
        assert_eq!(tree(&w).parent_of(a), Some(w.root), "stayed put");
        assert!(w.log.changes().is_empty(), "nothing dropped");
        assert_settled(&w, a);
    }

    struct Refusing;

    impl DropTarget for Refusing {
        fn droppable(&self, _: &Tree, _: NodeId, _: &[NodeId]) -> bool {
            true
        }
        fn handle_drop(
            &self,
            _: &mut Tree,
            _: &DropRequest<'_>,
            _: &mut dyn Transaction,
        ) -> Result<DragNodes, DropError> {
            Err(DropError::Transaction("offline".to_string()))
        }
    }

    #[test]
    fn failed_drops_still_unwind() {
        let mut w = world();
        let (a, portal) = (w.a, w.portal);
        w.registry.set_target(portal, Refusing);

        w.nav.pointer_down(at(10.0, 10.0));
        w.nav.pointer_move(at(530.0, 530.0));
        assert!(indicated(&w, portal, Indication::CAN_DROP), "target accepts while hovering");
        assert_eq!(w.nav.pointer_up(at(530.0, 530.0)), DispatchStatus::Stop, "gesture over");
        assert!(w.log.transactions().is_empty(), "nothing committed");
        assert_settled(&w, a);
    }

    struct FailDepart;

    impl DragSource for FailDepart {
        fn handle_depart(
            &self,
            _: &Tree,
            _: NodeId,
            _: Option<NodeId>,
            _: &mut dyn Transaction,
        ) -> Result<(), DropError> {
            Err(DropError::Transaction("origin is read-only".to_string()))
        }
    }

    #[test]
    fn a_drop_failing_after_the_move_puts_items_back() {
        let mut w = world();
        let (root, a, a2, portal) = (w.root, w.a, w.a2, w.portal);
        w.registry.set_source(root, FailDepart);
        let scene = w.nav.scene_mut();
        scene.selection.set_select(&scene.tree, &[a, a2]);

        w.nav.pointer_down(at(10.0, 10.0));
        w.nav.pointer_move(at(530.0, 530.0));
        assert_eq!(w.nav.pointer_up(at(530.0, 530.0)), DispatchStatus::Stop, "gesture over");

        assert!(w.log.transactions().is_empty(), "nothing committed");
        assert!(tree(&w).children_of(portal).is_empty(), "the portal gave the items back");
        assert_eq!(tree(&w).children_of(root), [a, a2, portal], "original parent and order");
        assert_eq!(tree(&w).bounds(a), Some(Rect::new(0.0, 0.0, 100.0, 100.0)), "a where it was");
        assert_eq!(tree(&w).bounds(a2), Some(Rect::new(200.0, 0.0, 300.0, 100.0)), "a2 where it was");
        assert!(w.nav.scene().selection.is_selected(a), "still selected");
        assert_settled(&w, a);
        assert_settled(&w, a2);
    }

    #[test]
    fn settling_restores_prior_item_state() {
        let mut w = world();
        let (a, a2) = (w.a, w.a2);
        let scene = w.nav.scene_mut();
        scene.tree.set_transparent(a2, true);
        scene.tree.set_z_override(a2, Some(7));
        scene.selection.set_select(&scene.tree, &[a, a2]);

        // Clone mode never touches transparency or z.
        w.nav.pointer_down(at(10.0, 10.0).with_modifiers(Modifiers::ALT));
        w.nav.pointer_move(at(700.0, 100.0).with_modifiers(Modifiers::ALT));
        assert_eq!(tree(&w).dragging(a2), Some(DragMode::Clone), "clone mode");
        w.nav.pointer_up(at(700.0, 100.0));
        assert!(tree(&w).has_flags(a2, NodeFlags::TRANSPARENT), "still see-through after a clone drag");
        assert_eq!(tree(&w).z_override(a2), Some(7), "override kept after a clone drag");
        assert_eq!(tree(&w).dragging(a2), None, "not dragging");

        // In place, the lift is undone back to the prior values.
        w.nav.pointer_down(at(10.0, 10.0).with_time(5_000));
        w.nav.pointer_move(at(700.0, 100.0));
        assert_eq!(tree(&w).z_override(a2), Some(ZBand::Draggable.min()), "elevated while dragging");
        w.nav.key_down(KeyEvent::new(Key::Escape));
        assert!(tree(&w).has_flags(a2, NodeFlags::TRANSPARENT), "still see-through after abort");
        assert_eq!(tree(&w).z_override(a2), Some(7), "prior override back");
        assert_settled(&w, a);
    }

    #[test]
    fn alt_drags_clones_and_transcludes() {
        let mut w = world();
        let (a, portal) = (w.a, w.portal);
        w.registry.set_default_source(RecordDeparture);

        w.nav.pointer_down(at(10.0, 10.0).with_modifiers(Modifiers::ALT));
        w.nav.pointer_move(at(530.0, 530.0).with_modifiers(Modifiers::ALT));
        assert_eq!(tree(&w).dragging(a), Some(DragMode::Clone), "a clone follows the pointer");
        assert_eq!(tree(&w).z_override(a), None, "the original stays in its layer");
        w.nav.pointer_up(at(530.0, 530.0));

        assert_eq!(tree(&w).parent_of(a), Some(w.root), "original untouched");
        assert_eq!(
            w.log.changes(),
            [Change::Transcluded { node: a, into: portal, position: Point::new(20.0, 20.0) }],
            "reference recorded, no departure"
        );
        assert_settled(&w, a);
    }

    #[test]
    fn ineligible_presses_decline() {
        let mut w = world();
        let a = w.a;
        let field = LocalNode::new("field", Rect::new(0.0, 0.0, 50.0, 20.0)).with_flags(NodeFlags::TEXT_INPUT);
        w.nav.scene_mut().spawn(a, field).unwrap();

        assert_eq!(w.nav.pointer_down(at(10.0, 10.0)), DispatchStatus::Decline, "text input");
        assert_eq!(
            w.nav.pointer_down(at(60.0, 60.0).with_modifiers(Modifiers::SHIFT).with_time(5_000)),
            DispatchStatus::Decline,
            "shift-click"
        );
        assert_eq!(w.nav.pointer_down(at(700.0, 100.0).with_time(10_000)), DispatchStatus::Decline, "empty canvas");
        assert_eq!(w.phase.get(), DragPhase::Idle, "nothing grabbed");
    }

    #[test]
    fn hovering_indicates_and_escape_aborts() {
        let mut w = world();
        let a = w.a;
        w.nav.pointer_move(at(50.0, 50.0));
        assert!(indicated(&w, a, Indication::DRAG), "draggable under the pointer");
        w.nav.pointer_move(at(700.0, 100.0));
        assert!(!indicated(&w, a, Indication::DRAG), "pointer left");

        w.nav.pointer_down(at(50.0, 50.0));
        w.nav.pointer_move(at(530.0, 530.0));
        assert_eq!(w.nav.key_down(KeyEvent::new(Key::Escape)), DispatchStatus::Stop, "aborted");
        assert_settled(&w, a);
        assert_eq!(w.nav.routing().override_owner(EventKind::MouseUp), None, "pointer released");
        assert_eq!(w.nav.pointer_up(at(530.0, 530.0)), DispatchStatus::Decline, "release after abort");
        assert_eq!(tree(&w).parent_of(a), Some(w.root), "not dropped");
    }
}
