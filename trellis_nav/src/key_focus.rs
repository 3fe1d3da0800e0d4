// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Keyboard focus navigation.

use trellis_focus::Navigation;
use trellis_tree::NodeId;

use crate::{Behavior, DispatchStatus, EventCx, Key, KeyEvent, Modifiers};

/// Moves focus with the keyboard.
///
/// - Escape leaves to the nearest focusable ancestor, or blurs when there is
///   none.
/// - Enter enters the first focusable descendant.
/// - Arrows move through the focused node's navigator, carrying the caret
///   column and the edge crossed.
///
/// Chords with control, alt, or meta are left alone. Attach it heritably to
/// the root; node-local behaviors such as text editors see keys first.
#[derive(Copy, Clone, Debug, Default)]
pub struct KeyFocus;

impl KeyFocus {
    fn navigation(key: Key) -> Option<Navigation> {
        Some(match key {
            Key::ArrowUp => Navigation::Up,
            Key::ArrowDown => Navigation::Down,
            Key::ArrowLeft => Navigation::Left,
            Key::ArrowRight => Navigation::Right,
            Key::Escape => Navigation::Parent,
            Key::Enter => Navigation::FirstChild,
            _ => return None,
        })
    }
}

impl Behavior for KeyFocus {
    fn key_down(&mut self, cx: &mut EventCx<'_>, e: &KeyEvent, _: NodeId) -> DispatchStatus {
        if e.modifiers.intersects(Modifiers::CONTROL | Modifiers::ALT | Modifiers::META) {
            return DispatchStatus::Decline;
        }
        let Some(nav) = Self::navigation(e.key) else {
            return DispatchStatus::Decline;
        };
        let scene = &mut *cx.scene;
        let focused = scene.focus.current().filter(|n| *n != scene.root());
        if focused.is_none() && nav != Navigation::FirstChild {
            return DispatchStatus::Decline;
        }
        match scene.focus.navigate(&scene.tree, nav) {
            Some(_) => DispatchStatus::Stop,
            None if nav == Navigation::Parent => {
                scene.focus.blur(&scene.tree);
                DispatchStatus::Stop
            }
            None => DispatchStatus::Decline,
        }
    }
}
