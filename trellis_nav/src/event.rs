// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Input event payloads and the event kinds behaviors respond to.

use kurbo::{Point, Vec2};

bitflags::bitflags! {
    /// Modifier keys held while an event was produced.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// Shift.
        const SHIFT = 1 << 0;
        /// Control.
        const CONTROL = 1 << 1;
        /// Alt / Option.
        const ALT = 1 << 2;
        /// Meta / Command / Windows.
        const META = 1 << 3;
    }
}

/// Pointer button that changed state.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum PointerButton {
    /// Left button (index 0).
    #[default]
    Primary,
    /// Middle button (index 1).
    Auxiliary,
    /// Right button (index 2).
    Secondary,
    /// Any other button index.
    Other(u8),
}

impl PointerButton {
    /// Map a platform button index (`0` left, `1` middle, `2` right).
    pub fn from_index(index: u8) -> Self {
        match index {
            0 => Self::Primary,
            1 => Self::Auxiliary,
            2 => Self::Secondary,
            n => Self::Other(n),
        }
    }
}

/// A logical key.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// A printable character, lowercased by the host.
    Character(char),
    /// Space bar.
    Space,
    /// Enter / Return.
    Enter,
    /// Escape.
    Escape,
    /// Tab.
    Tab,
    /// Backspace.
    Backspace,
    /// Delete.
    Delete,
    /// Arrow up.
    ArrowUp,
    /// Arrow down.
    ArrowDown,
    /// Arrow left.
    ArrowLeft,
    /// Arrow right.
    ArrowRight,
    /// Home.
    Home,
    /// End.
    End,
    /// Shift pressed on its own.
    Shift,
    /// Control pressed on its own.
    Control,
    /// Alt pressed on its own.
    Alt,
    /// Meta pressed on its own.
    Meta,
    /// A key with no dedicated variant.
    Unidentified,
}

impl Key {
    /// `true` for the modifier keys themselves.
    pub fn is_modifier(self) -> bool {
        matches!(self, Self::Shift | Self::Control | Self::Alt | Self::Meta)
    }
}

/// A pointer press, release, or move in client coordinates.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PointerEvent {
    /// Pointer position in client coordinates.
    pub position: Point,
    /// Button that changed state (for moves: the primary held button).
    pub button: PointerButton,
    /// Modifiers held.
    pub modifiers: Modifiers,
    /// Consecutive click count, or `0` to let the dispatcher count.
    pub detail: u8,
    /// Host timestamp in milliseconds.
    pub time: u64,
}

impl PointerEvent {
    /// A primary-button event at `position` with nothing else set.
    pub fn at(position: Point) -> Self {
        Self {
            position,
            button: PointerButton::Primary,
            modifiers: Modifiers::empty(),
            detail: 0,
            time: 0,
        }
    }

    /// Replace the button.
    pub fn with_button(mut self, button: PointerButton) -> Self {
        self.button = button;
        self
    }

    /// Replace the modifiers.
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Replace the click count.
    pub fn with_detail(mut self, detail: u8) -> Self {
        self.detail = detail;
        self
    }

    /// Replace the timestamp.
    pub fn with_time(mut self, time: u64) -> Self {
        self.time = time;
        self
    }
}

/// A key press or release.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key.
    pub key: Key,
    /// Modifiers held.
    pub modifiers: Modifiers,
    /// Auto-repeat.
    pub repeat: bool,
}

impl KeyEvent {
    /// An unmodified, non-repeating press of `key`.
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::empty(),
            repeat: false,
        }
    }

    /// Replace the modifiers.
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// A scroll wheel or trackpad scroll.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WheelEvent {
    /// Pointer position in client coordinates.
    pub position: Point,
    /// Scroll delta in pixels.
    pub delta: Vec2,
    /// Modifiers held.
    pub modifiers: Modifiers,
}

/// Any routed input event.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum InputEvent {
    /// Pointer event.
    Pointer(PointerEvent),
    /// Keyboard event.
    Key(KeyEvent),
    /// Wheel event.
    Wheel(WheelEvent),
}

impl InputEvent {
    /// Modifiers carried by the event.
    pub fn modifiers(&self) -> Modifiers {
        match self {
            Self::Pointer(e) => e.modifiers,
            Self::Key(e) => e.modifiers,
            Self::Wheel(e) => e.modifiers,
        }
    }
}

/// The handler an event is routed to.
///
/// Global overrides are claimed per kind.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Key pressed.
    KeyDown,
    /// Key released.
    KeyUp,
    /// Primary pointer pressed.
    MouseDown,
    /// Primary pointer released.
    MouseUp,
    /// Pointer moved.
    MouseMove,
    /// Pointer started hovering a node.
    MouseEnter,
    /// Pointer stopped hovering a node.
    MouseLeave,
    /// Pointer moved onto a node (fires after enter).
    MouseOver,
    /// Second press of a multi-click.
    DoubleClick,
    /// Third press of a multi-click.
    TripleClick,
    /// Secondary pointer pressed.
    RightMouseDown,
    /// Secondary pointer released.
    RightMouseUp,
    /// Pointer moved with the secondary button.
    RightMouseMove,
    /// Context menu requested.
    ContextMenu,
    /// Scroll.
    Wheel,
}
