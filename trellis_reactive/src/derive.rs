// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Derived values.

use alloc::boxed::Box;
use alloc::rc::Rc;

use crate::subscription::Subscription;
use crate::value::{ReactiveValue, ReadOnly};

/// Anything that can report "I changed" without exposing its value type.
///
/// This is the object-safe seam used by [`calculated`] to depend on sources of
/// different types.
pub trait Observe {
    /// Run `f` after every change of `self`.
    fn observe(&self, f: Box<dyn Fn()>) -> Subscription;
}

impl<T: Clone + 'static> Observe for ReactiveValue<T> {
    fn observe(&self, f: Box<dyn Fn()>) -> Subscription {
        self.subscribe(move |_| f())
    }
}

impl<T: Clone + 'static> Observe for ReadOnly<T> {
    fn observe(&self, f: Box<dyn Fn()>) -> Subscription {
        self.0.subscribe(move |_| f())
    }
}

/// Derive a value from any number of sources.
///
/// `f` runs once up front and again each time one of `sources` notifies. The
/// derived value only notifies its own subscribers when the result changes.
pub fn calculated<U, F>(sources: &[&dyn Observe], f: F) -> ReadOnly<U>
where
    U: Clone + PartialEq + 'static,
    F: Fn() -> U + 'static,
{
    let f = Rc::new(f);
    let derived = ReactiveValue::new(f());
    for source in sources {
        let weak = derived.downgrade();
        let f = Rc::clone(&f);
        derived.hold(source.observe(Box::new(move || {
            if let Some(derived) = weak.upgrade() {
                derived.set(f());
            }
        })));
    }
    derived.read_only()
}

impl<T: Clone + 'static> ReactiveValue<T> {
    /// Derive a value by applying `f` to this one.
    pub fn map<U, F>(&self, f: F) -> ReadOnly<U>
    where
        U: Clone + PartialEq + 'static,
        F: Fn(&T) -> U + 'static,
    {
        let derived = ReactiveValue::new(self.with(&f));
        let weak = derived.downgrade();
        derived.hold(self.subscribe(move |value| {
            if let Some(derived) = weak.upgrade() {
                derived.set(f(value));
            }
        }));
        derived.read_only()
    }
}

impl<T: Clone + 'static> ReadOnly<T> {
    /// See [`ReactiveValue::map`].
    pub fn map<U, F>(&self, f: F) -> ReadOnly<U>
    where
        U: Clone + PartialEq + 'static,
        F: Fn(&T) -> U + 'static,
    {
        self.0.map(f)
    }
}
