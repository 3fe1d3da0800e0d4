// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sibling-span range selection.
//!
//! A range selection never mixes depths: every node it returns shares one
//! parent, and selecting a node implies its whole subtree. Extending a
//! selection from an origin to a destination therefore has to climb to the
//! level where both ends become siblings.

use alloc::vec;
use alloc::vec::Vec;

use hashbrown::HashSet;
use trellis_tree::{NodeId, Tree};

/// Nodes to select when a range is extended from `origin` to `dest`.
///
/// Cases, first match wins:
/// 1. `origin == dest`: just `dest`.
/// 2. Siblings: `origin`, everything between, then `dest`.
/// 3. `dest` lies under `origin`'s previous sibling: `origin` and that sibling.
/// 4. `dest` lies under `origin`'s next sibling: `origin` and that sibling.
/// 5. One contains the other: the container alone.
/// 6. Both ends, lifted to the shallower depth, are siblings: that span.
///
/// Anything else (ends lifted to equal depth that are still cousins, or stale
/// ids) yields an empty result and a warning.
pub fn compute_selection(tree: &Tree, origin: NodeId, dest: NodeId) -> Vec<NodeId> {
    if !tree.is_alive(origin) || !tree.is_alive(dest) {
        log::warn!("range selection between stale nodes {origin:?} and {dest:?}");
        return Vec::new();
    }
    if origin == dest {
        return vec![dest];
    }
    if tree.parent_of(origin) == tree.parent_of(dest) {
        return span(tree, origin, dest);
    }
    if let Some(prev) = tree.prev_sibling(origin)
        && tree.contains(prev, dest)
    {
        return vec![origin, prev];
    }
    if let Some(next) = tree.next_sibling(origin)
        && tree.contains(next, dest)
    {
        return vec![origin, next];
    }
    if tree.contains(dest, origin) {
        return vec![dest];
    }
    if tree.contains(origin, dest) {
        return vec![origin];
    }
    if let [a, b] = lowest_common_sibling_ancestors(tree, &[origin, dest])[..]
        && tree.parent_of(a).is_some()
        && tree.parent_of(a) == tree.parent_of(b)
    {
        return span(tree, a, b);
    }
    log::warn!("unhandled range selection from {origin:?} to {dest:?}");
    Vec::new()
}

fn span(tree: &Tree, from: NodeId, to: NodeId) -> Vec<NodeId> {
    let mut out = vec![from];
    out.extend(tree.siblings_between(from, to));
    out.push(to);
    out
}

/// Lift every node to the shallowest depth present among `nodes`, then
/// deduplicate, keeping first-seen order.
///
/// Stale ids are dropped.
pub fn lowest_common_sibling_ancestors(tree: &Tree, nodes: &[NodeId]) -> Vec<NodeId> {
    let Some(depth) = nodes.iter().filter_map(|n| tree.depth(*n)).min() else {
        return Vec::new();
    };
    let mut seen = HashSet::new();
    nodes
        .iter()
        .filter_map(|n| tree.ancestor_at_depth(*n, depth))
        .filter(|n| seen.insert(*n))
        .collect()
}
