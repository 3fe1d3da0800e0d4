// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The payload handed to a node when it receives focus.

use kurbo::Point;

/// A caret position inside a focused text node.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TextOffset {
    /// A character offset.
    At(usize),
    /// The end of the text, whatever its length.
    End,
}

/// Which edge of the newly focused node focus arrived through.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Edge {
    /// Arrived from above (moving down).
    Top,
    /// Arrived from below (moving up).
    Bottom,
}

/// What caused a focus change.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum FocusTrigger {
    /// Keyboard navigation.
    Key,
    /// A pointer press.
    Pointer,
    /// Anything else: code, pending focus, fallback after removal.
    #[default]
    Other,
}

/// Context consumed by the node that becomes focused.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct FocusContext {
    /// Start of the caret selection to restore.
    pub selection_start: Option<TextOffset>,
    /// End of the caret selection to restore.
    pub selection_end: Option<TextOffset>,
    /// Client point the focus is associated with (the click, or the caret column to keep).
    pub point: Option<Point>,
    /// Edge focus arrived through, for vertical keyboard moves.
    pub edge: Option<Edge>,
    /// Cause of the focus change.
    pub trigger: FocusTrigger,
    /// Whether a selection gesture (shift-navigation) is in progress.
    pub selecting: bool,
}

impl FocusContext {
    /// Context for a pointer press at `point`.
    pub fn pointer(point: Point) -> Self {
        Self {
            point: Some(point),
            trigger: FocusTrigger::Pointer,
            ..Self::default()
        }
    }

    /// Place the caret at `offset`, collapsed.
    pub fn with_caret(mut self, offset: TextOffset) -> Self {
        self.selection_start = Some(offset);
        self.selection_end = Some(offset);
        self
    }

    /// Keep navigation-owned fields from `self`, and take the rest from a
    /// navigator-supplied context when there is one.
    ///
    /// `trigger`, `edge`, and `selecting` always describe the navigation that
    /// is happening, so a navigator cannot override them.
    pub fn merged_with(self, supplied: Option<Self>) -> Self {
        match supplied {
            Some(s) => Self {
                trigger: self.trigger,
                edge: self.edge,
                selecting: self.selecting,
                ..s
            },
            None => self,
        }
    }
}
