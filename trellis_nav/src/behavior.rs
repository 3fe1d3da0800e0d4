// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Behaviors and the state threaded through each dispatch.

use core::fmt;

use hashbrown::HashMap;
use smallvec::SmallVec;
use trellis_tree::NodeId;

use crate::{
    ClickClass, EventKind, HeldKeys, InputEvent, KeyEvent, NavConfig, PointerEvent, Scene,
    WheelEvent, classify,
};

/// A behavior's answer to an event.
///
/// Variants are ordered by strength; a dispatch reports the strongest answer
/// any behavior gave.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DispatchStatus {
    /// Not handled; try the next behavior.
    #[default]
    Decline,
    /// Handled; later behaviors still see the event.
    Continue,
    /// Handled; nothing else sees the event.
    Stop,
}

impl DispatchStatus {
    /// Fold a behavior's answer into the overall result of a dispatch.
    pub fn combine(self, other: Self) -> Self {
        Ord::max(self, other)
    }
}

/// Handle of a behavior registered with an [`EventNav`](crate::EventNav).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BehaviorId(pub(crate) u32);

/// A pluggable event handler.
///
/// Every handler defaults to [`DispatchStatus::Decline`]; implement only the
/// ones the behavior cares about. `node` is always the node the event was
/// routed to (the hit node, or the focused node for keys), even when the
/// behavior is attached to one of its ancestors.
#[allow(unused_variables, reason = "default handlers ignore their arguments")]
pub trait Behavior {
    /// Name used in dispatch traces.
    fn name(&self) -> &'static str {
        core::any::type_name::<Self>()
    }

    /// Node an overriding behavior is working on, if any.
    ///
    /// Pointer moves and releases that hit nothing are delivered to the
    /// override owner with this node.
    fn active_node(&self) -> Option<NodeId> {
        None
    }

    /// Key pressed.
    fn key_down(&mut self, cx: &mut EventCx<'_>, e: &KeyEvent, node: NodeId) -> DispatchStatus {
        DispatchStatus::Decline
    }
    /// Key released.
    fn key_up(&mut self, cx: &mut EventCx<'_>, e: &KeyEvent, node: NodeId) -> DispatchStatus {
        DispatchStatus::Decline
    }
    /// Primary press.
    fn mouse_down(&mut self, cx: &mut EventCx<'_>, e: &PointerEvent, node: NodeId) -> DispatchStatus {
        DispatchStatus::Decline
    }
    /// Primary release.
    fn mouse_up(&mut self, cx: &mut EventCx<'_>, e: &PointerEvent, node: NodeId) -> DispatchStatus {
        DispatchStatus::Decline
    }
    /// Pointer moved.
    fn mouse_move(&mut self, cx: &mut EventCx<'_>, e: &PointerEvent, node: NodeId) -> DispatchStatus {
        DispatchStatus::Decline
    }
    /// Hover began.
    fn mouse_enter(&mut self, cx: &mut EventCx<'_>, e: &PointerEvent, node: NodeId) -> DispatchStatus {
        DispatchStatus::Decline
    }
    /// Hover ended.
    fn mouse_leave(&mut self, cx: &mut EventCx<'_>, e: &PointerEvent, node: NodeId) -> DispatchStatus {
        DispatchStatus::Decline
    }
    /// Pointer arrived over a node.
    fn mouse_over(&mut self, cx: &mut EventCx<'_>, e: &PointerEvent, node: NodeId) -> DispatchStatus {
        DispatchStatus::Decline
    }
    /// Second press of a multi-click.
    fn double_click(&mut self, cx: &mut EventCx<'_>, e: &PointerEvent, node: NodeId) -> DispatchStatus {
        DispatchStatus::Decline
    }
    /// Third press of a multi-click.
    fn triple_click(&mut self, cx: &mut EventCx<'_>, e: &PointerEvent, node: NodeId) -> DispatchStatus {
        DispatchStatus::Decline
    }
    /// Secondary press.
    fn right_mouse_down(&mut self, cx: &mut EventCx<'_>, e: &PointerEvent, node: NodeId) -> DispatchStatus {
        DispatchStatus::Decline
    }
    /// Secondary release.
    fn right_mouse_up(&mut self, cx: &mut EventCx<'_>, e: &PointerEvent, node: NodeId) -> DispatchStatus {
        DispatchStatus::Decline
    }
    /// Pointer moved with the secondary button.
    fn right_mouse_move(&mut self, cx: &mut EventCx<'_>, e: &PointerEvent, node: NodeId) -> DispatchStatus {
        DispatchStatus::Decline
    }
    /// Context menu requested.
    fn context_menu(&mut self, cx: &mut EventCx<'_>, e: &PointerEvent, node: NodeId) -> DispatchStatus {
        DispatchStatus::Decline
    }
    /// Scroll.
    fn wheel(&mut self, cx: &mut EventCx<'_>, e: &WheelEvent, node: NodeId) -> DispatchStatus {
        DispatchStatus::Decline
    }
}

/// Call the handler of `behavior` matching `kind`.
///
/// A payload that does not fit the kind is declined.
pub(crate) fn invoke(
    behavior: &mut dyn Behavior,
    cx: &mut EventCx<'_>,
    kind: EventKind,
    event: &InputEvent,
    node: NodeId,
) -> DispatchStatus {
    match (kind, event) {
        (EventKind::KeyDown, InputEvent::Key(e)) => behavior.key_down(cx, e, node),
        (EventKind::KeyUp, InputEvent::Key(e)) => behavior.key_up(cx, e, node),
        (EventKind::Wheel, InputEvent::Wheel(e)) => behavior.wheel(cx, e, node),
        (kind, InputEvent::Pointer(e)) => match kind {
            EventKind::MouseDown => behavior.mouse_down(cx, e, node),
            EventKind::MouseUp => behavior.mouse_up(cx, e, node),
            EventKind::MouseMove => behavior.mouse_move(cx, e, node),
            EventKind::MouseEnter => behavior.mouse_enter(cx, e, node),
            EventKind::MouseLeave => behavior.mouse_leave(cx, e, node),
            EventKind::MouseOver => behavior.mouse_over(cx, e, node),
            EventKind::DoubleClick => behavior.double_click(cx, e, node),
            EventKind::TripleClick => behavior.triple_click(cx, e, node),
            EventKind::RightMouseDown => behavior.right_mouse_down(cx, e, node),
            EventKind::RightMouseUp => behavior.right_mouse_up(cx, e, node),
            EventKind::RightMouseMove => behavior.right_mouse_move(cx, e, node),
            EventKind::ContextMenu => behavior.context_menu(cx, e, node),
            EventKind::KeyDown | EventKind::KeyUp | EventKind::Wheel => DispatchStatus::Decline,
        },
        _ => DispatchStatus::Decline,
    }
}

/// Routing state shared by every dispatch: per-kind override owners, held
/// keys, and configuration.
///
/// Each event kind has at most one override owner. A new claim replaces the
/// previous owner rather than stacking on it.
#[derive(Clone, Debug, Default)]
pub struct DispatchContext {
    overrides: HashMap<EventKind, BehaviorId>,
    held: HeldKeys,
    config: NavConfig,
}

impl DispatchContext {
    /// A context with `config` and no overrides.
    pub fn new(config: NavConfig) -> Self {
        Self {
            overrides: HashMap::new(),
            held: HeldKeys::default(),
            config,
        }
    }

    /// The behavior currently claiming `kind`.
    pub fn override_owner(&self, kind: EventKind) -> Option<BehaviorId> {
        self.overrides.get(&kind).copied()
    }

    /// Claim `kinds` for `owner`, replacing any previous owners.
    pub fn set_overrides(&mut self, owner: BehaviorId, kinds: &[EventKind]) {
        for kind in kinds {
            if let Some(prev) = self.overrides.insert(*kind, owner)
                && prev != owner
            {
                log::debug!("override {kind:?}: {prev:?} replaced by {owner:?}");
            }
        }
        log::debug!("override claimed by {owner:?}: {kinds:?}");
    }

    /// Release every kind claimed by `owner`.
    pub fn unset_overrides(&mut self, owner: BehaviorId) {
        let before = self.overrides.len();
        self.overrides.retain(|_, o| *o != owner);
        if self.overrides.len() != before {
            log::debug!("overrides released by {owner:?}");
        }
    }

    /// Release `kind` if `owner` holds it.
    pub fn unset_override(&mut self, owner: BehaviorId, kind: EventKind) {
        if self.overrides.get(&kind) == Some(&owner) {
            self.overrides.remove(&kind);
        }
    }

    /// Keys held as of the last event.
    pub fn held(&self) -> &HeldKeys {
        &self.held
    }

    pub(crate) fn held_mut(&mut self) -> &mut HeldKeys {
        &mut self.held
    }

    /// Dispatcher configuration.
    pub fn config(&self) -> &NavConfig {
        &self.config
    }

    pub(crate) fn forget_behavior(&mut self, id: BehaviorId) {
        self.overrides.retain(|_, o| *o != id);
    }
}

/// What a behavior sees while handling an event.
pub struct EventCx<'a> {
    /// The scene: tree, focus, and selection.
    pub scene: &'a mut Scene,
    routing: &'a mut DispatchContext,
    behavior: BehaviorId,
}

impl fmt::Debug for EventCx<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventCx")
            .field("behavior", &self.behavior)
            .finish_non_exhaustive()
    }
}

impl<'a> EventCx<'a> {
    pub(crate) fn new(
        scene: &'a mut Scene,
        routing: &'a mut DispatchContext,
        behavior: BehaviorId,
    ) -> Self {
        Self {
            scene,
            routing,
            behavior,
        }
    }

    /// Id of the behavior being invoked.
    pub fn behavior_id(&self) -> BehaviorId {
        self.behavior
    }

    /// Route `kinds` to this behavior first, whatever is hit, until released.
    pub fn set_global_overrides(&mut self, kinds: &[EventKind]) {
        self.routing.set_overrides(self.behavior, kinds);
    }

    /// Release every override this behavior holds.
    pub fn unset_global_overrides(&mut self) {
        self.routing.unset_overrides(self.behavior);
    }

    /// Release one override this behavior holds.
    pub fn unset_global_override(&mut self, kind: EventKind) {
        self.routing.unset_override(self.behavior, kind);
    }

    /// Whether this behavior holds the override for `kind`.
    pub fn holds_override(&self, kind: EventKind) -> bool {
        self.routing.override_owner(kind) == Some(self.behavior)
    }

    /// Keys held as of this event.
    pub fn held(&self) -> &HeldKeys {
        self.routing.held()
    }

    /// Dispatcher configuration.
    pub fn config(&self) -> &NavConfig {
        self.routing.config()
    }

    /// Classify a pointer press the same way every behavior does.
    pub fn classify(&self, e: &PointerEvent) -> ClickClass {
        classify(e, self.routing.held(), self.routing.config())
    }
}

/// Behavior ids attached to one node.
pub(crate) type BehaviorList = SmallVec<[BehaviorId; 4]>;
