// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The focus state machine.

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::fmt;

use hashbrown::HashMap;
use trellis_reactive::{ReactiveValue, ReadOnly};
use trellis_tree::{NodeFlags, NodeId, Tree};

use crate::{FocusContext, FocusError, NavTarget, Navigation, Navigator, TreeOrderNavigator};

/// A node's place on the focus path.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum FocusMark {
    /// Not on the focus path.
    #[default]
    None,
    /// An ancestor of the focused node.
    Branch,
    /// The focused node, with the context it was focused with.
    Leaf(FocusContext),
}

impl FocusMark {
    /// `true` for [`FocusMark::Leaf`].
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf(_))
    }

    /// `true` for anything on the focus path.
    pub fn is_focused(&self) -> bool {
        !matches!(self, Self::None)
    }
}

type PendingMatcher = Box<dyn Fn(&Tree, NodeId) -> Option<NodeId>>;

struct PendingFocus {
    matcher: PendingMatcher,
    context: FocusContext,
}

/// Single-path focus over a [`Tree`].
///
/// At most one node is focused (the *leaf*); every ancestor of it is marked as
/// a *branch*. Each node's mark is a reactive value: subscribing to it is how a
/// node runs its own focus and blur hooks. When nothing else is focused, focus
/// rests on the root without marking it.
pub struct FocusState {
    root: NodeId,
    current: Option<NodeId>,
    pending: Option<PendingFocus>,
    marks: HashMap<NodeId, ReactiveValue<FocusMark>>,
    navigators: HashMap<NodeId, Rc<dyn Navigator>>,
    fallback_navigator: Rc<dyn Navigator>,
}

impl fmt::Debug for FocusState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FocusState")
            .field("root", &self.root)
            .field("current", &self.current)
            .field("pending", &self.pending.is_some())
            .field("marks", &self.marks.len())
            .field("navigators", &self.navigators.len())
            .finish_non_exhaustive()
    }
}

impl FocusState {
    /// Focus state for the tree rooted at `root`, with nothing focused.
    pub fn new(root: NodeId) -> Self {
        Self {
            root,
            current: None,
            pending: None,
            marks: HashMap::new(),
            navigators: HashMap::new(),
            fallback_navigator: Rc::new(TreeOrderNavigator),
        }
    }

    /// The root focus falls back to.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The currently focused node, or the root after a blur.
    pub fn current(&self) -> Option<NodeId> {
        self.current
    }

    /// The focused node if it is still alive, else the root.
    pub fn current_or_root(&self, tree: &Tree) -> NodeId {
        self.current
            .filter(|c| tree.is_alive(*c))
            .unwrap_or(self.root)
    }

    /// The reactive focus mark of `id`.
    ///
    /// Subscribe to it to react to focus (`Leaf`), branch focus (`Branch`), and
    /// blur (`None`).
    pub fn mark(&mut self, id: NodeId) -> ReadOnly<FocusMark> {
        self.mark_value(id).read_only()
    }

    /// The context the current leaf was focused with.
    pub fn leaf_context(&self) -> Option<FocusContext> {
        let current = self.current?;
        match self.marks.get(&current)?.get() {
            FocusMark::Leaf(ctx) => Some(ctx),
            _ => None,
        }
    }

    /// Focus `target` with `context`.
    ///
    /// The previous focus is blurred first, but only up to the lowest common
    /// ancestor with `target`: nodes that stay on the path keep their branch
    /// mark without re-notifying. Then `target` becomes the leaf and every
    /// ancestor a branch.
    pub fn set_focus(
        &mut self,
        tree: &Tree,
        target: NodeId,
        context: FocusContext,
    ) -> Result<(), FocusError> {
        if !tree.is_alive(target) {
            return Err(FocusError::DeadNode(target));
        }
        if !tree.has_flags(target, NodeFlags::FOCUSABLE) {
            return Err(FocusError::NotFocusable(target));
        }
        self.focus_unchecked(tree, target, context);
        Ok(())
    }

    fn focus_unchecked(&mut self, tree: &Tree, target: NodeId, context: FocusContext) {
        let previous = self.current.replace(target);
        if let Some(prev) = previous
            && tree.is_alive(prev)
            && !tree.contains(prev, target)
        {
            let stop = tree.lowest_common_ancestor(prev, target);
            self.blur_path(tree, prev, stop);
        }
        log::debug!("focus {previous:?} -> {target:?} ({:?})", context.trigger);
        self.mark_value(target).set_forced(FocusMark::Leaf(context));
        let mut ancestor = tree.parent_of(target);
        while let Some(a) = ancestor {
            let mark = self.mark_value(a);
            if mark.get() != FocusMark::Branch {
                mark.set(FocusMark::Branch);
            }
            ancestor = tree.parent_of(a);
        }
    }

    /// Clear focus entirely; focus rests on the root afterwards.
    ///
    /// Resting focus leaves the root unmarked. Only an explicit
    /// [`FocusState::set_focus`] on the root makes it the leaf.
    pub fn blur(&mut self, tree: &Tree) {
        let Some(current) = self.current else {
            return;
        };
        if tree.is_alive(current) {
            self.blur_path(tree, current, None);
        }
        log::debug!("blur {current:?}");
        self.current = tree.is_alive(self.root).then_some(self.root);
    }

    fn blur_path(&mut self, tree: &Tree, from: NodeId, stop_at: Option<NodeId>) {
        let mut node = Some(from);
        while let Some(n) = node {
            if Some(n) == stop_at {
                return;
            }
            if let Some(mark) = self.marks.get(&n) {
                mark.set(FocusMark::None);
            }
            node = tree.parent_of(n);
        }
    }

    /// Focus the first node that will satisfy `matcher`.
    ///
    /// Each candidate passed to [`FocusState::check_pending`] is offered to the
    /// matcher, which names the node to focus (usually the candidate itself).
    /// The first match consumes the pending focus. A new call replaces any
    /// earlier pending focus.
    pub fn set_pending_focus(
        &mut self,
        matcher: impl Fn(&Tree, NodeId) -> Option<NodeId> + 'static,
        context: FocusContext,
    ) {
        log::debug!("pending focus registered");
        self.pending = Some(PendingFocus {
            matcher: Box::new(matcher),
            context,
        });
    }

    /// Whether a pending focus is waiting for its node.
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drop any pending focus.
    pub fn clear_pending(&mut self) {
        self.pending = None;
    }

    /// Offer a newly materialized node to the pending focus.
    ///
    /// Returns `true` if the pending focus matched and was consumed.
    pub fn check_pending(&mut self, tree: &Tree, candidate: NodeId) -> bool {
        let Some(pending) = &self.pending else {
            return false;
        };
        let Some(target) = (pending.matcher)(tree, candidate) else {
            return false;
        };
        let Some(pending) = self.pending.take() else {
            return false;
        };
        if let Err(err) = self.set_focus(tree, target, pending.context) {
            log::warn!("pending focus matched but could not focus: {err}");
        }
        true
    }

    /// Use `navigator` for moves starting at `id`.
    pub fn set_navigator(&mut self, id: NodeId, navigator: Rc<dyn Navigator>) {
        self.navigators.insert(id, navigator);
    }

    /// Revert `id` to the fallback navigator.
    pub fn clear_navigator(&mut self, id: NodeId) {
        self.navigators.remove(&id);
    }

    /// Replace the navigator used by nodes without their own.
    pub fn set_fallback_navigator(&mut self, navigator: Rc<dyn Navigator>) {
        self.fallback_navigator = navigator;
    }

    /// Elect the target of `nav` from `from`, without moving focus.
    pub fn navigate_from(&self, tree: &Tree, from: NodeId, nav: Navigation) -> Option<NavTarget> {
        if !tree.is_alive(from) {
            return None;
        }
        let navigator = self
            .navigators
            .get(&from)
            .unwrap_or(&self.fallback_navigator);
        navigator.target(tree, from, nav)
    }

    /// Move focus from the current node according to `nav`.
    ///
    /// Returns the newly focused node, or `None` when there is nowhere to go.
    pub fn navigate(&mut self, tree: &Tree, nav: Navigation) -> Option<NodeId> {
        let from = self.current_or_root(tree);
        let target = self.navigate_from(tree, from, nav)?;
        let from_point = self.leaf_context().and_then(|c| c.point);
        let context = nav.arrival_context(from_point).merged_with(target.context);
        match self.set_focus(tree, target.node, context) {
            Ok(()) => Some(target.node),
            Err(err) => {
                log::warn!("navigation target refused focus: {err}");
                None
            }
        }
    }

    /// Forget removed nodes.
    ///
    /// If the focused node was among them, every remaining mark is cleared
    /// and focus rests on the root, unmarked, as after [`FocusState::blur`].
    pub fn on_removed(&mut self, tree: &Tree, removed: &[NodeId]) {
        for id in removed {
            if let Some(mark) = self.marks.remove(id) {
                mark.set(FocusMark::None);
                mark.dispose();
            }
            self.navigators.remove(id);
        }
        let Some(current) = self.current else {
            return;
        };
        if tree.is_alive(current) {
            return;
        }
        for mark in self.marks.values() {
            mark.set(FocusMark::None);
        }
        log::debug!("focused {current:?} removed");
        self.current = tree.is_alive(self.root).then_some(self.root);
    }

    fn mark_value(&mut self, id: NodeId) -> ReactiveValue<FocusMark> {
        self.marks
            .entry(id)
            .or_insert_with(|| ReactiveValue::new(FocusMark::None))
            .clone()
    }
}
