// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The event dispatcher.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use hashbrown::HashMap;
use smallvec::SmallVec;
use trellis_tree::NodeId;

use crate::behavior::{BehaviorList, invoke};
use crate::{
    Behavior, BehaviorId, ClickCounter, DispatchContext, DispatchStatus, EventCx, EventKind,
    HeldKeys, InputEvent, KeyEvent, Modifiers, NavConfig, PointerButton, PointerEvent, Scene,
    WheelEvent, is_right_click,
};

/// Routes raw input through the behaviors attached to a [`Scene`].
///
/// Pointer events are hit-tested against the live tree; key events go to the
/// focused node (or the root). Either way the event is then offered, in
/// order, to:
///
/// 1. the behavior holding the global override for the event kind, if any;
/// 2. for the target node and then each ancestor up to the root, that node's
///    local behaviors followed by its heritable ones.
///
/// Each behavior runs at most once per event, and the first
/// [`DispatchStatus::Stop`] ends the walk.
pub struct EventNav {
    scene: Scene,
    routing: DispatchContext,
    behaviors: Vec<Option<Box<dyn Behavior>>>,
    local: HashMap<NodeId, BehaviorList>,
    heritable: HashMap<NodeId, BehaviorList>,
    hover: Option<NodeId>,
    clicks: ClickCounter<NodeId>,
}

impl fmt::Debug for EventNav {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventNav")
            .field("scene", &self.scene)
            .field("routing", &self.routing)
            .field("behaviors", &self.behaviors.iter().flatten().count())
            .field("hover", &self.hover)
            .finish_non_exhaustive()
    }
}

impl EventNav {
    /// A dispatcher over `scene` with the default configuration.
    pub fn new(scene: Scene) -> Self {
        Self::with_config(scene, NavConfig::default())
    }

    /// A dispatcher over `scene` with `config`.
    pub fn with_config(scene: Scene, config: NavConfig) -> Self {
        Self {
            scene,
            routing: DispatchContext::new(config),
            behaviors: Vec::new(),
            local: HashMap::new(),
            heritable: HashMap::new(),
            hover: None,
            clicks: ClickCounter::new(&config),
        }
    }

    /// The scene.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The scene, mutably.
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// Routing state: overrides, held keys, configuration.
    pub fn routing(&self) -> &DispatchContext {
        &self.routing
    }

    /// Keys held as of the last event.
    pub fn held(&self) -> &HeldKeys {
        self.routing.held()
    }

    /// The node currently hovered.
    pub fn hovered(&self) -> Option<NodeId> {
        self.hover
    }

    /// Register a behavior. It runs only once attached to a node.
    pub fn add_behavior(&mut self, behavior: Box<dyn Behavior>) -> BehaviorId {
        let id = BehaviorId(u32::try_from(self.behaviors.len()).unwrap_or(u32::MAX));
        self.behaviors.push(Some(behavior));
        id
    }

    /// Drop a behavior: detach it everywhere and release its overrides.
    pub fn remove_behavior(&mut self, id: BehaviorId) -> Option<Box<dyn Behavior>> {
        for list in self.local.values_mut().chain(self.heritable.values_mut()) {
            list.retain(|b| *b != id);
        }
        self.routing.forget_behavior(id);
        self.behaviors.get_mut(id.0 as usize).and_then(Option::take)
    }

    /// Attach `id` to `node` only.
    pub fn attach_local(&mut self, node: NodeId, id: BehaviorId) {
        push_unique(self.local.entry(node).or_default(), id);
    }

    /// Attach `id` to `node` and every descendant.
    pub fn attach_heritable(&mut self, node: NodeId, id: BehaviorId) {
        push_unique(self.heritable.entry(node).or_default(), id);
    }

    /// Behaviors that `node` sees, in the order they are offered events,
    /// ignoring any override.
    pub fn behaviors_for(&self, node: NodeId) -> Vec<BehaviorId> {
        let mut out: Vec<BehaviorId> = Vec::new();
        for n in self.scene.tree.path(node).into_iter().rev() {
            let lists = [self.local.get(&n), self.heritable.get(&n)];
            for id in lists.into_iter().flatten().flatten() {
                if !out.contains(id) {
                    out.push(*id);
                }
            }
        }
        out
    }

    /// Clean up `id`'s subtree in the scene and detach its behaviors.
    pub fn cleanup(&mut self, id: NodeId) -> Vec<NodeId> {
        let removed = self.scene.cleanup(id);
        for n in &removed {
            self.local.remove(n);
            self.heritable.remove(n);
            if self.hover == Some(*n) {
                self.hover = None;
            }
        }
        removed
    }

    /// Offer `event` as `kind` to the behaviors routed for `node`.
    pub fn dispatch(&mut self, kind: EventKind, node: NodeId, event: &InputEvent) -> DispatchStatus {
        let mut ran: SmallVec<[BehaviorId; 8]> = SmallVec::new();
        let mut overall = DispatchStatus::Decline;
        if let Some(owner) = self.routing.override_owner(kind) {
            ran.push(owner);
            let status = self.run(owner, kind, event, node);
            overall = overall.combine(status);
        }
        if overall != DispatchStatus::Stop && self.scene.tree.is_alive(node) {
            'walk: for id in self.behaviors_for(node) {
                if ran.contains(&id) {
                    continue;
                }
                ran.push(id);
                let status = self.run(id, kind, event, node);
                overall = overall.combine(status);
                if status == DispatchStatus::Stop {
                    break 'walk;
                }
            }
        }
        let stopped_key_down = kind == EventKind::KeyDown && overall == DispatchStatus::Stop;
        self.routing.held_mut().after_dispatch(stopped_key_down);
        overall
    }

    fn run(&mut self, id: BehaviorId, kind: EventKind, event: &InputEvent, node: NodeId) -> DispatchStatus {
        let Some(mut behavior) = self.behaviors.get_mut(id.0 as usize).and_then(Option::take) else {
            return DispatchStatus::Decline;
        };
        let status = {
            let mut cx = EventCx::new(&mut self.scene, &mut self.routing, id);
            invoke(behavior.as_mut(), &mut cx, kind, event, node)
        };
        log::trace!("{kind:?} on {node:?}: {} -> {status:?}", behavior.name());
        self.behaviors[id.0 as usize] = Some(behavior);
        status
    }

    fn hit(&mut self, e: &PointerEvent) -> Option<NodeId> {
        self.scene.commit();
        let root = self.scene.root();
        self.scene.tree.node_at_point(root, e.position, |_| true)
    }

    /// Deliver `kind` to the override owner's active node, if there is one.
    fn to_active_node(&mut self, kind: EventKind, event: &InputEvent) -> DispatchStatus {
        let Some(owner) = self.routing.override_owner(kind) else {
            return DispatchStatus::Decline;
        };
        let Some(active) = self
            .behaviors
            .get(owner.0 as usize)
            .and_then(Option::as_ref)
            .and_then(|b| b.active_node())
        else {
            return DispatchStatus::Decline;
        };
        let status = self.run(owner, kind, event, active);
        self.routing.held_mut().after_dispatch(false);
        status
    }

    /// A pointer press.
    ///
    /// Second and third presses go to the double- and triple-click handlers
    /// (unless they are right clicks). Shift-right-click is left to the host.
    pub fn pointer_down(&mut self, mut e: PointerEvent) -> DispatchStatus {
        self.routing.held_mut().refresh(e.modifiers);
        let right = is_right_click(&e, self.routing.config());
        let Some(node) = self.hit(&e) else {
            self.clicks.reset();
            return DispatchStatus::Decline;
        };
        if e.detail == 0 {
            e.detail = self.clicks.on_down(node, e.position, e.time, e.button);
        }
        let kind = match (right, e.detail) {
            (false, 2) if self.routing.config().multi_click => EventKind::DoubleClick,
            (false, 3) if self.routing.config().multi_click => EventKind::TripleClick,
            (true, _) if e.modifiers.contains(Modifiers::SHIFT) => {
                return DispatchStatus::Decline;
            }
            (true, _) => EventKind::RightMouseDown,
            (false, _) => EventKind::MouseDown,
        };
        self.dispatch(kind, node, &InputEvent::Pointer(e))
    }

    /// A pointer release.
    ///
    /// Releases ending a multi-click are not dispatched. A release over
    /// nothing goes to the override owner's active node.
    pub fn pointer_up(&mut self, e: PointerEvent) -> DispatchStatus {
        self.routing.held_mut().refresh(e.modifiers);
        if self.routing.config().multi_click && e.detail > 1 {
            return DispatchStatus::Decline;
        }
        let right = is_right_click(&e, self.routing.config());
        let event = InputEvent::Pointer(e);
        match self.hit(&e) {
            Some(node) => {
                let kind = if right { EventKind::RightMouseUp } else { EventKind::MouseUp };
                self.dispatch(kind, node, &event)
            }
            None => self.to_active_node(EventKind::MouseUp, &event),
        }
    }

    /// A pointer move. Updates hover first, dispatching leave, enter, and over.
    pub fn pointer_move(&mut self, e: PointerEvent) -> DispatchStatus {
        self.routing.held_mut().refresh(e.modifiers);
        self.clicks.on_move(e.position);
        let event = InputEvent::Pointer(e);
        let hit = self.hit(&e);
        if hit != self.hover {
            if let Some(old) = self.hover.take()
                && self.scene.tree.is_alive(old)
            {
                self.dispatch(EventKind::MouseLeave, old, &event);
            }
            self.hover = hit;
            if let Some(new) = hit {
                self.dispatch(EventKind::MouseEnter, new, &event);
                self.dispatch(EventKind::MouseOver, new, &event);
            }
        }
        match hit {
            Some(node) => {
                let kind = if e.button == PointerButton::Secondary {
                    EventKind::RightMouseMove
                } else {
                    EventKind::MouseMove
                };
                self.dispatch(kind, node, &event)
            }
            None => self.to_active_node(EventKind::MouseMove, &event),
        }
    }

    /// A context-menu request at the pointer.
    pub fn context_menu(&mut self, e: PointerEvent) -> DispatchStatus {
        self.routing.held_mut().refresh(e.modifiers);
        match self.hit(&e) {
            Some(node) => self.dispatch(EventKind::ContextMenu, node, &InputEvent::Pointer(e)),
            None => DispatchStatus::Decline,
        }
    }

    /// A scroll at the pointer.
    pub fn wheel(&mut self, e: WheelEvent) -> DispatchStatus {
        self.routing.held_mut().refresh(e.modifiers);
        self.scene.commit();
        let root = self.scene.root();
        match self.scene.tree.node_at_point(root, e.position, |_| true) {
            Some(node) => self.dispatch(EventKind::Wheel, node, &InputEvent::Wheel(e)),
            None => DispatchStatus::Decline,
        }
    }

    /// A key press, routed to the focused node or the root.
    pub fn key_down(&mut self, e: KeyEvent) -> DispatchStatus {
        let held = self.routing.held_mut();
        held.refresh(e.modifiers);
        held.key_down(e.key);
        let target = self.scene.focus.current_or_root(&self.scene.tree);
        self.dispatch(EventKind::KeyDown, target, &InputEvent::Key(e))
    }

    /// A key release, routed to the focused node or the root.
    pub fn key_up(&mut self, e: KeyEvent) -> DispatchStatus {
        let held = self.routing.held_mut();
        held.refresh(e.modifiers);
        held.key_up(e.key);
        let target = self.scene.focus.current_or_root(&self.scene.tree);
        self.dispatch(EventKind::KeyUp, target, &InputEvent::Key(e))
    }
}

fn push_unique(list: &mut BehaviorList, id: BehaviorId) {
    if !list.contains(&id) {
        list.push(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use alloc::string::String;
    use alloc::vec;
    use core::cell::RefCell;
    use kurbo::{Point, Rect};
    use trellis_tree::{LocalNode, NodeFlags};

    use crate::{Key, Modifiers};

    type Log = Rc<RefCell<Vec<String>>>;

    /// Records every event it sees and answers with a fixed status.
    struct Recorder {
        tag: &'static str,
        answer: DispatchStatus,
        log: Log,
        claim: bool,
        active: Option<NodeId>,
    }

    impl Recorder {
        fn boxed(tag: &'static str, answer: DispatchStatus, log: &Log) -> Box<Self> {
            Box::new(Self {
                tag,
                answer,
                log: log.clone(),
                claim: false,
                active: None,
            })
        }

        fn note(&self, what: &str) -> DispatchStatus {
            self.log.borrow_mut().push(alloc::format!("{}:{what}", self.tag));
            self.answer
        }
    }

    impl Behavior for Recorder {
        fn active_node(&self) -> Option<NodeId> {
            self.active
        }
        fn mouse_down(&mut self, cx: &mut EventCx<'_>, _: &PointerEvent, node: NodeId) -> DispatchStatus {
            if self.claim {
                self.active = Some(node);
                cx.set_global_overrides(&[EventKind::MouseMove, EventKind::MouseUp]);
            }
            self.note("down")
        }
        fn mouse_up(&mut self, cx: &mut EventCx<'_>, _: &PointerEvent, _: NodeId) -> DispatchStatus {
            cx.unset_global_overrides();
            self.note("up")
        }
        fn mouse_move(&mut self, _: &mut EventCx<'_>, _: &PointerEvent, _: NodeId) -> DispatchStatus {
            self.note("move")
        }
        fn mouse_enter(&mut self, _: &mut EventCx<'_>, _: &PointerEvent, _: NodeId) -> DispatchStatus {
            self.note("enter")
        }
        fn mouse_leave(&mut self, _: &mut EventCx<'_>, _: &PointerEvent, _: NodeId) -> DispatchStatus {
            self.note("leave")
        }
        fn double_click(&mut self, _: &mut EventCx<'_>, _: &PointerEvent, _: NodeId) -> DispatchStatus {
            self.note("double")
        }
        fn right_mouse_down(&mut self, _: &mut EventCx<'_>, _: &PointerEvent, _: NodeId) -> DispatchStatus {
            self.note("right")
        }
        fn key_down(&mut self, cx: &mut EventCx<'_>, e: &KeyEvent, _: NodeId) -> DispatchStatus {
            let held = cx.held().is_down(e.key);
            self.note(if held { "key(held)" } else { "key" })
        }
    }

    fn boxed(x: f64, y: f64, w: f64, h: f64) -> LocalNode {
        LocalNode::new("node", Rect::new(x, y, x + w, y + h))
    }

    /// root (0..200) ─ card (0..100) ─ handle (0..20)
    fn setup() -> (EventNav, [NodeId; 3], Log) {
        let mut scene = Scene::with_root(boxed(0.0, 0.0, 200.0, 200.0)).unwrap();
        let root = scene.root();
        let card = scene.spawn(root, boxed(0.0, 0.0, 100.0, 100.0).with_flags(NodeFlags::FOCUSABLE)).unwrap();
        let handle = scene.spawn(card, boxed(0.0, 0.0, 20.0, 20.0)).unwrap();
        scene.commit();
        (EventNav::new(scene), [root, card, handle], Rc::new(RefCell::new(Vec::new())))
    }

    fn taken(log: &Log) -> Vec<String> {
        core::mem::take(&mut *log.borrow_mut())
    }

    #[test]
    fn walks_local_then_heritable_up_to_the_root() {
        let (mut nav, [root, card, handle], log) = setup();
        let inherited = nav.add_behavior(Recorder::boxed("inherited", DispatchStatus::Continue, &log));
        let card_local = nav.add_behavior(Recorder::boxed("card", DispatchStatus::Continue, &log));
        let handle_local = nav.add_behavior(Recorder::boxed("handle", DispatchStatus::Decline, &log));
        nav.attach_heritable(root, inherited);
        nav.attach_local(card, card_local);
        nav.attach_local(handle, handle_local);
        nav.attach_heritable(card, inherited);

        assert_eq!(nav.behaviors_for(handle), vec![handle_local, card_local, inherited], "each behavior once");
        let status = nav.pointer_down(PointerEvent::at(Point::new(5.0, 5.0)));
        assert_eq!(status, DispatchStatus::Continue, "handled without stopping");
        assert_eq!(taken(&log), ["handle:down", "card:down", "inherited:down"], "walk order");

        let status = nav.pointer_down(PointerEvent::at(Point::new(150.0, 150.0)).with_time(10_000));
        assert_eq!(status, DispatchStatus::Continue, "root hit");
        assert_eq!(taken(&log), ["inherited:down"], "card's local behavior is not inherited");
    }

    #[test]
    fn stop_ends_the_walk() {
        let (mut nav, [root, _, handle], log) = setup();
        let first = nav.add_behavior(Recorder::boxed("first", DispatchStatus::Stop, &log));
        let second = nav.add_behavior(Recorder::boxed("second", DispatchStatus::Continue, &log));
        nav.attach_local(handle, first);
        nav.attach_heritable(root, second);
        assert_eq!(nav.pointer_down(PointerEvent::at(Point::new(5.0, 5.0))), DispatchStatus::Stop, "stopped");
        assert_eq!(taken(&log), ["first:down"], "second never ran");
    }

    #[test]
    fn overrides_route_outside_the_hit_node() {
        let (mut nav, [root, _, handle], log) = setup();
        let mut gesture = Recorder::boxed("gesture", DispatchStatus::Stop, &log);
        gesture.claim = true;
        let gesture = nav.add_behavior(gesture);
        let bystander = nav.add_behavior(Recorder::boxed("bystander", DispatchStatus::Continue, &log));
        nav.attach_local(handle, gesture);
        nav.attach_heritable(root, bystander);

        nav.pointer_down(PointerEvent::at(Point::new(5.0, 5.0)));
        assert_eq!(nav.routing().override_owner(EventKind::MouseMove), Some(gesture), "claimed");
        taken(&log);

        nav.pointer_move(PointerEvent::at(Point::new(150.0, 150.0)));
        assert_eq!(
            taken(&log),
            ["bystander:enter", "gesture:move"],
            "override sees the move over the root and stops it"
        );

        nav.pointer_move(PointerEvent::at(Point::new(500.0, 500.0)));
        assert_eq!(
            taken(&log),
            ["bystander:leave", "gesture:move"],
            "outside every node: delivered to the active node"
        );
        assert_eq!(nav.hovered(), None, "nothing hovered");

        nav.pointer_up(PointerEvent::at(Point::new(500.0, 500.0)));
        assert_eq!(taken(&log), ["gesture:up"], "release outside");
        assert_eq!(nav.routing().override_owner(EventKind::MouseUp), None, "released");
    }

    #[test]
    fn multi_clicks_and_right_clicks() {
        let (mut nav, [root, ..], log) = setup();
        let recorder = nav.add_behavior(Recorder::boxed("p", DispatchStatus::Continue, &log));
        nav.attach_heritable(root, recorder);
        let at = Point::new(5.0, 5.0);
        nav.pointer_down(PointerEvent::at(at).with_time(0));
        nav.pointer_down(PointerEvent::at(at).with_time(100));
        nav.pointer_down(PointerEvent::at(at).with_button(PointerButton::Secondary).with_time(5_000));
        nav.pointer_down(
            PointerEvent::at(at)
                .with_button(PointerButton::Secondary)
                .with_modifiers(Modifiers::SHIFT)
                .with_time(10_000),
        );
        assert_eq!(taken(&log), ["p:down", "p:double", "p:right"], "shift-right-click is left to the host");
    }

    #[test]
    fn keys_go_to_focus_or_root() {
        let (mut nav, [root, card, _], log) = setup();
        let at_root = nav.add_behavior(Recorder::boxed("root", DispatchStatus::Continue, &log));
        let at_card = nav.add_behavior(Recorder::boxed("card", DispatchStatus::Stop, &log));
        nav.attach_local(root, at_root);
        nav.attach_local(card, at_card);

        nav.key_down(KeyEvent::new(Key::Character('a')));
        assert_eq!(taken(&log), ["root:key(held)"], "nothing focused: root");
        assert!(!nav.held().is_down(Key::Character('a')), "transient key dropped after dispatch");

        let scene = nav.scene_mut();
        scene.focus.set_focus(&scene.tree, card, Default::default()).unwrap();
        nav.key_down(KeyEvent::new(Key::Character('b')));
        assert_eq!(taken(&log), ["card:key(held)"], "focused card stops the walk");
    }

    #[test]
    fn removing_nodes_and_behaviors() {
        let (mut nav, [root, card, handle], log) = setup();
        let recorder = nav.add_behavior(Recorder::boxed("p", DispatchStatus::Continue, &log));
        nav.attach_local(handle, recorder);
        nav.attach_heritable(root, recorder);
        assert_eq!(nav.cleanup(card), [handle, card], "subtree removed");
        assert_eq!(nav.behaviors_for(root), [recorder], "heritable attachment survives");
        assert!(nav.remove_behavior(recorder).is_some(), "removed");
        assert!(nav.behaviors_for(root).is_empty(), "detached everywhere");
        assert_eq!(
            nav.dispatch(EventKind::MouseDown, root, &InputEvent::Pointer(PointerEvent::at(Point::ZERO))),
            DispatchStatus::Decline,
            "nothing left to run"
        );
    }
}
