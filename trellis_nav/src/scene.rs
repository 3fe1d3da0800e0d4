// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The scene: a tree plus the focus and selection state living on it.

use alloc::vec::Vec;

use trellis_focus::FocusState;
use trellis_selection::SelectionState;
use trellis_tree::{Damage, LocalNode, NodeId, Tree, TreeError};

/// A tree together with its focus and selection state.
///
/// Structural changes that other state depends on go through the scene, so
/// focus and selection never hold on to removed nodes and pending focus sees
/// every node as it goes live.
#[derive(Debug)]
pub struct Scene {
    /// The node tree.
    pub tree: Tree,
    /// Focus over the tree.
    pub focus: FocusState,
    /// Selection over the tree.
    pub selection: SelectionState,
    root: NodeId,
}

impl Scene {
    /// A scene over `tree`, rooted at `root`.
    pub fn new(tree: Tree, root: NodeId) -> Self {
        Self {
            tree,
            focus: FocusState::new(root),
            selection: SelectionState::new(),
            root,
        }
    }

    /// A scene over a fresh tree holding only a live root built from `local`.
    pub fn with_root(local: LocalNode) -> Result<Self, TreeError> {
        let mut tree = Tree::new();
        let root = tree.spawn(None, local)?;
        tree.commit();
        Ok(Self::new(tree, root))
    }

    /// The root node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Create and initialize a node under `parent`.
    pub fn spawn(&mut self, parent: NodeId, local: LocalNode) -> Result<NodeId, TreeError> {
        self.tree.spawn(Some(parent), local)
    }

    /// Commit the tree and offer each newly live node to the pending focus.
    pub fn commit(&mut self) -> Damage {
        let damage = self.tree.commit();
        for id in &damage.went_live {
            if !self.focus.has_pending() {
                break;
            }
            self.focus.check_pending(&self.tree, *id);
        }
        damage
    }

    /// Clean up `id`'s subtree and forget it in focus and selection.
    pub fn cleanup(&mut self, id: NodeId) -> Vec<NodeId> {
        let removed = self.tree.cleanup(id);
        if !removed.is_empty() {
            self.focus.on_removed(&self.tree, &removed);
            self.selection.on_removed(&removed);
        }
        removed
    }
}
