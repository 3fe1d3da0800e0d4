// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Depth-ordering service.
//!
//! Each entry is a client-space rectangle plus a z-index. Mutations are staged
//! and applied by [`DepthIndex::commit`], which reports what moved so a renderer
//! can repaint only the affected area. Queries return matches top-most first:
//! higher z wins, then the most recently inserted entry.

use alloc::vec::Vec;
use core::fmt::Debug;

use kurbo::{Point, Rect};

/// Generational handle for an entry in a [`DepthIndex`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct DepthKey(u32, u32);

impl DepthKey {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Depth keys are 32-bit; indices beyond u32::MAX are not supported."
    )]
    const fn new(idx: usize, generation: u32) -> Self {
        Self(idx as u32, generation)
    }

    const fn idx(self) -> usize {
        self.0 as usize
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Mark {
    Added,
    Updated,
    Removed,
}

#[derive(Clone, Debug)]
struct Entry<P> {
    generation: u32,
    rect: Rect,
    z: i32,
    seq: u64,
    payload: P,
    mark: Option<Mark>,
    prev_rect: Option<Rect>,
}

/// Changes applied by one [`DepthIndex::commit`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DepthDamage {
    /// Rectangles of newly visible entries.
    pub added: Vec<Rect>,
    /// Rectangles of removed entries.
    pub removed: Vec<Rect>,
    /// `(before, after)` for entries whose rectangle changed.
    pub moved: Vec<(Rect, Rect)>,
    /// Rectangles of entries whose z-index changed in place.
    pub restacked: Vec<Rect>,
}

impl DepthDamage {
    /// `true` when nothing changed.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
            && self.removed.is_empty()
            && self.moved.is_empty()
            && self.restacked.is_empty()
    }

    /// Union of every affected rectangle.
    pub fn union_rect(&self) -> Option<Rect> {
        let mut it = self
            .added
            .iter()
            .chain(&self.removed)
            .chain(&self.restacked)
            .copied()
            .chain(self.moved.iter().flat_map(|(a, b)| [*a, *b]));
        let first = it.next()?;
        Some(it.fold(first, |acc, r| acc.union(r)))
    }
}

/// Rectangle + z registry answering top-most-first spatial queries.
#[derive(Debug)]
pub struct DepthIndex<P: Copy + Debug> {
    entries: Vec<Option<Entry<P>>>,
    // Outlives the entry so a reused slot never repeats a generation.
    generations: Vec<u32>,
    free_list: Vec<usize>,
    next_seq: u64,
}

impl<P: Copy + Debug> Default for DepthIndex<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Copy + Debug> DepthIndex<P> {
    /// An empty index.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            next_seq: 0,
        }
    }

    /// Stage a new entry.
    pub fn insert(&mut self, rect: Rect, z: i32, payload: P) -> DepthKey {
        let seq = self.next_seq;
        self.next_seq += 1;
        let make = |generation| Entry {
            generation,
            rect,
            z,
            seq,
            payload,
            mark: Some(Mark::Added),
            prev_rect: None,
        };
        if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].wrapping_add(1);
            self.generations[idx] = generation;
            self.entries[idx] = Some(make(generation));
            DepthKey::new(idx, generation)
        } else {
            self.entries.push(Some(make(1)));
            self.generations.push(1);
            DepthKey::new(self.entries.len() - 1, 1)
        }
    }

    /// Stage a new rectangle and z-index for an existing entry.
    pub fn update(&mut self, key: DepthKey, rect: Rect, z: i32) {
        if let Some(e) = self.entry_mut(key) {
            if e.mark.is_none() {
                e.prev_rect = Some(e.rect);
            }
            e.rect = rect;
            e.z = z;
            e.mark = Some(match e.mark {
                Some(Mark::Added) => Mark::Added,
                _ => Mark::Updated,
            });
        }
    }

    /// Stage removal of an entry. Stale keys are ignored.
    pub fn remove(&mut self, key: DepthKey) {
        let idx = key.idx();
        if let Some(e) = self.entry_mut(key) {
            if matches!(e.mark, Some(Mark::Added)) {
                // Never committed: drop without damage.
                self.entries[idx] = None;
                self.free_list.push(idx);
            } else {
                e.mark = Some(Mark::Removed);
            }
        }
    }

    /// Whether `key` refers to a live entry.
    pub fn contains(&self, key: DepthKey) -> bool {
        self.entry(key)
            .is_some_and(|e| !matches!(e.mark, Some(Mark::Removed)))
    }

    /// Committed-or-staged z-index of an entry.
    pub fn z(&self, key: DepthKey) -> Option<i32> {
        self.entry(key).map(|e| e.z)
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .flatten()
            .filter(|e| !matches!(e.mark, Some(Mark::Removed)))
            .count()
    }

    /// `true` when there are no live entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop everything without reporting damage.
    ///
    /// Slots are kept, so keys issued before the clear stay stale.
    pub fn clear(&mut self) {
        self.free_list.clear();
        for (idx, slot) in self.entries.iter_mut().enumerate().rev() {
            *slot = None;
            self.free_list.push(idx);
        }
    }

    /// Apply staged changes and report damage.
    pub fn commit(&mut self) -> DepthDamage {
        let mut dmg = DepthDamage::default();
        for i in 0..self.entries.len() {
            let Some(entry) = self.entries[i].as_mut() else {
                continue;
            };
            match entry.mark.take() {
                Some(Mark::Added) => dmg.added.push(entry.rect),
                Some(Mark::Removed) => {
                    dmg.removed.push(entry.rect);
                    self.entries[i] = None;
                    self.free_list.push(i);
                }
                Some(Mark::Updated) => match entry.prev_rect.take() {
                    Some(prev) if prev != entry.rect => dmg.moved.push((prev, entry.rect)),
                    _ => dmg.restacked.push(entry.rect),
                },
                None => {}
            }
        }
        dmg
    }

    /// Entries whose rectangle contains `p` (edges inclusive), top-most first.
    pub fn query_point(&self, p: Point) -> Vec<(DepthKey, P)> {
        self.query_by(|r| r.x0 <= p.x && p.x <= r.x1 && r.y0 <= p.y && p.y <= r.y1)
    }

    /// Entries whose rectangle overlaps `rect` (shared edges count), top-most first.
    pub fn query_rect(&self, rect: Rect) -> Vec<(DepthKey, P)> {
        self.query_by(|r| {
            r.x0 <= rect.x1 && r.x1 >= rect.x0 && r.y0 <= rect.y1 && r.y1 >= rect.y0
        })
    }

    /// The single top-most entry containing `p`.
    pub fn top_at(&self, p: Point) -> Option<(DepthKey, P)> {
        self.query_point(p).into_iter().next()
    }

    fn query_by(&self, mut hit: impl FnMut(&Rect) -> bool) -> Vec<(DepthKey, P)> {
        let mut out: Vec<(i32, u64, DepthKey, P)> = self
            .entries
            .iter()
            .enumerate()
            .filter_map(|(i, e)| {
                let e = e.as_ref()?;
                if matches!(e.mark, Some(Mark::Removed)) || !hit(&e.rect) {
                    return None;
                }
                Some((e.z, e.seq, DepthKey::new(i, e.generation), e.payload))
            })
            .collect();
        out.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.cmp(&a.1)));
        out.into_iter().map(|(_, _, k, p)| (k, p)).collect()
    }

    fn entry(&self, key: DepthKey) -> Option<&Entry<P>> {
        let e = self.entries.get(key.idx())?.as_ref()?;
        (e.generation == key.1).then_some(e)
    }

    fn entry_mut(&mut self, key: DepthKey) -> Option<&mut Entry<P>> {
        let e = self.entries.get_mut(key.idx())?.as_mut()?;
        (e.generation == key.1).then_some(e)
    }
}
