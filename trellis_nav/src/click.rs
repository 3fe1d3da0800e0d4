// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Click classification, held-key tracking, and multi-click counting.
//!
//! Every gesture-initiating behavior asks [`classify`] what a press means, so
//! drag, lasso, pan, and context menus always agree on which presses are
//! theirs.

use kurbo::Point;
use smallvec::SmallVec;

use crate::{Key, Modifiers, PointerButton, PointerEvent};

/// Dispatcher configuration.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct NavConfig {
    /// Treat control-click as a right click (the macOS convention).
    pub ctrl_click_is_right_click: bool,
    /// Route second and third presses to the double- and triple-click handlers.
    pub multi_click: bool,
    /// Longest gap between presses of one multi-click, in milliseconds.
    pub multi_click_interval: u64,
    /// Farthest the pointer may drift between presses of one multi-click.
    pub multi_click_slop: f64,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            ctrl_click_is_right_click: false,
            multi_click: true,
            multi_click_interval: 500,
            multi_click_slop: 4.0,
        }
    }
}

/// What a pointer press means.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ClickClass {
    /// Unmodified primary press. The only class that may start a drag.
    Primary,
    /// Primary press with shift or control held.
    Modified,
    /// Secondary press, or control-click where configured.
    Context,
    /// Any press while space is held.
    Pan,
    /// Middle or other buttons.
    Other,
}

impl ClickClass {
    /// Whether a press of this class may start a drag.
    pub fn is_drag_eligible(self) -> bool {
        self == Self::Primary
    }

    /// Whether the press is routed to the right-button handlers.
    pub fn is_right(self) -> bool {
        self == Self::Context
    }
}

/// `true` if `e` counts as a right click under `config`.
pub fn is_right_click(e: &PointerEvent, config: &NavConfig) -> bool {
    e.button == PointerButton::Secondary
        || (config.ctrl_click_is_right_click && e.modifiers.contains(Modifiers::CONTROL))
}

/// Classify a pointer press.
pub fn classify(e: &PointerEvent, held: &HeldKeys, config: &NavConfig) -> ClickClass {
    if is_right_click(e, config) {
        ClickClass::Context
    } else if held.space() {
        ClickClass::Pan
    } else if e.button != PointerButton::Primary {
        ClickClass::Other
    } else if e.modifiers.intersects(Modifiers::SHIFT | Modifiers::CONTROL) {
        ClickClass::Modified
    } else {
        ClickClass::Primary
    }
}

/// Keys currently held down.
///
/// Modifiers are refreshed from every event. Other keys are only reliable
/// while the event that pressed them is being dispatched: they are dropped
/// afterwards so a held modifier can be reused with a different key.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HeldKeys {
    modifiers: Modifiers,
    space: bool,
    keys: SmallVec<[Key; 4]>,
}

impl HeldKeys {
    /// Modifiers held as of the last event.
    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// Whether space is held.
    pub fn space(&self) -> bool {
        self.space
    }

    /// Whether the non-modifier `key` is held.
    pub fn is_down(&self, key: Key) -> bool {
        self.keys.contains(&key)
    }

    /// Whether `key` is the only key held, modifiers included.
    pub fn only(&self, key: Key) -> bool {
        self.modifiers.is_empty() && !self.space && self.keys.as_slice() == [key]
    }

    pub(crate) fn refresh(&mut self, modifiers: Modifiers) {
        self.modifiers = modifiers;
    }

    pub(crate) fn key_down(&mut self, key: Key) {
        self.space = key == Key::Space;
        if key != Key::Space && !key.is_modifier() && !self.keys.contains(&key) {
            self.keys.push(key);
        }
    }

    pub(crate) fn key_up(&mut self, key: Key) {
        self.space = false;
        self.keys.retain(|k| *k != key);
    }

    /// Forget transient keys once an event has been dispatched.
    ///
    /// A key-down that was stopped also drops alt and space unless shift,
    /// control, or meta is still held, since the matching key-up may never
    /// arrive if focus moved away.
    pub(crate) fn after_dispatch(&mut self, stopped_key_down: bool) {
        self.keys.clear();
        if stopped_key_down
            && !self
                .modifiers
                .intersects(Modifiers::SHIFT | Modifiers::CONTROL | Modifiers::META)
        {
            self.modifiers.remove(Modifiers::ALT);
            self.space = false;
        }
    }
}

#[derive(Copy, Clone, Debug)]
struct Press<K> {
    target: K,
    position: Point,
    time: u64,
    button: PointerButton,
    count: u8,
}

/// Counts consecutive presses for hosts that do not report a click count.
///
/// A press continues the previous multi-click when it hits the same target
/// with the same button, soon enough, and close enough. Moving past the slop
/// between presses starts over.
#[derive(Clone, Debug)]
pub struct ClickCounter<K> {
    last: Option<Press<K>>,
    interval: u64,
    slop: f64,
}

impl<K: Copy + PartialEq> ClickCounter<K> {
    /// A counter using the multi-click limits in `config`.
    pub fn new(config: &NavConfig) -> Self {
        Self {
            last: None,
            interval: config.multi_click_interval,
            slop: config.multi_click_slop,
        }
    }

    /// Record a press and return its click count (starting at 1).
    pub fn on_down(&mut self, target: K, position: Point, time: u64, button: PointerButton) -> u8 {
        let count = match self.last {
            Some(p)
                if p.target == target
                    && p.button == button
                    && time.saturating_sub(p.time) <= self.interval
                    && p.position.distance(position) <= self.slop =>
            {
                p.count.saturating_add(1)
            }
            _ => 1,
        };
        self.last = Some(Press {
            target,
            position,
            time,
            button,
            count,
        });
        count
    }

    /// Track movement; leaving the slop radius ends the multi-click.
    pub fn on_move(&mut self, position: Point) {
        if self
            .last
            .is_some_and(|p| p.position.distance(position) > self.slop)
        {
            self.last = None;
        }
    }

    /// Forget the previous press.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(button: PointerButton, modifiers: Modifiers) -> PointerEvent {
        PointerEvent::at(Point::ZERO)
            .with_button(button)
            .with_modifiers(modifiers)
    }

    #[test]
    fn classification_is_centralized() {
        let held = HeldKeys::default();
        let config = NavConfig::default();
        let class = |e: PointerEvent| classify(&e, &held, &config);
        assert_eq!(class(press(PointerButton::Primary, Modifiers::empty())), ClickClass::Primary, "plain");
        assert_eq!(class(press(PointerButton::Primary, Modifiers::SHIFT)), ClickClass::Modified, "shift");
        assert_eq!(class(press(PointerButton::Primary, Modifiers::META)), ClickClass::Primary, "meta may drag");
        assert_eq!(class(press(PointerButton::Secondary, Modifiers::empty())), ClickClass::Context, "right");
        assert_eq!(class(press(PointerButton::Auxiliary, Modifiers::empty())), ClickClass::Other, "middle");
        assert_eq!(
            class(press(PointerButton::Primary, Modifiers::CONTROL)),
            ClickClass::Modified,
            "control is a modifier by default"
        );

        let mac = NavConfig {
            ctrl_click_is_right_click: true,
            ..NavConfig::default()
        };
        assert_eq!(
            classify(&press(PointerButton::Primary, Modifiers::CONTROL), &held, &mac),
            ClickClass::Context,
            "control-click is a right click when configured"
        );

        let mut panning = HeldKeys::default();
        panning.key_down(Key::Space);
        let e = press(PointerButton::Primary, Modifiers::empty());
        assert_eq!(classify(&e, &panning, &config), ClickClass::Pan, "space pans");
        assert!(!classify(&e, &panning, &config).is_drag_eligible(), "never drags");
    }

    #[test]
    fn held_keys_drop_transients_after_dispatch() {
        let mut held = HeldKeys::default();
        held.refresh(Modifiers::META);
        held.key_down(Key::Character('c'));
        assert!(held.is_down(Key::Character('c')), "c held during dispatch");
        assert!(!held.only(Key::Character('c')), "meta is also held");
        held.after_dispatch(true);
        assert!(!held.is_down(Key::Character('c')), "c dropped");
        assert_eq!(held.modifiers(), Modifiers::META, "meta survives for the next chord");

        held.refresh(Modifiers::ALT);
        held.key_down(Key::Space);
        held.after_dispatch(true);
        assert!(!held.space(), "stopped key-down clears space without a manipulator");
        assert!(held.modifiers().is_empty(), "and alt");

        held.key_down(Key::Character('x'));
        assert!(held.only(Key::Character('x')), "single key");
        held.key_up(Key::Character('x'));
        assert!(!held.is_down(Key::Character('x')), "released");
    }

    #[test]
    fn multi_click_counting() {
        let mut clicks = ClickCounter::new(&NavConfig::default());
        let p = Point::new(10.0, 10.0);
        assert_eq!(clicks.on_down(7_u32, p, 0, PointerButton::Primary), 1, "first");
        assert_eq!(clicks.on_down(7, p, 200, PointerButton::Primary), 2, "double");
        assert_eq!(clicks.on_down(7, Point::new(12.0, 10.0), 400, PointerButton::Primary), 3, "triple");
        assert_eq!(clicks.on_down(7, p, 1200, PointerButton::Primary), 1, "too slow");
        assert_eq!(clicks.on_down(8, p, 1300, PointerButton::Primary), 1, "other target");
        clicks.on_move(Point::new(40.0, 10.0));
        assert_eq!(clicks.on_down(8, p, 1400, PointerButton::Primary), 1, "moved away in between");
        assert_eq!(clicks.on_down(8, p, 1500, PointerButton::Secondary), 1, "other button");
    }
}
