// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;

use smallvec::SmallVec;

use crate::subscription::{SubscriberSet, Subscription};

type Callback<T> = Rc<dyn Fn(&T)>;

pub(crate) struct Inner<T> {
    value: RefCell<T>,
    previous: RefCell<Option<T>>,
    subscribers: RefCell<Vec<(u64, Callback<T>)>>,
    next_id: Cell<u64>,
    alive: Cell<bool>,
    /// Subscriptions this value holds on its sources, if it is derived.
    upstream: RefCell<Vec<Subscription>>,
}

impl<T> SubscriberSet for Inner<T> {
    fn remove_subscriber(&self, id: u64) {
        self.subscribers.borrow_mut().retain(|(sid, _)| *sid != id);
    }

    fn has_subscriber(&self, id: u64) -> bool {
        self.subscribers.borrow().iter().any(|(sid, _)| *sid == id)
    }
}

/// A shared, observable, mutable cell.
///
/// Cloning a `ReactiveValue` clones the handle, not the value: all clones see the
/// same state and the same subscribers.
pub struct ReactiveValue<T> {
    inner: Rc<Inner<T>>,
}

impl<T> Clone for ReactiveValue<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ReactiveValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactiveValue")
            .field("value", &*self.inner.value.borrow())
            .field("alive", &self.inner.alive.get())
            .field("subscribers", &self.inner.subscribers.borrow().len())
            .finish_non_exhaustive()
    }
}

impl<T: Default + Clone + 'static> Default for ReactiveValue<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + 'static> ReactiveValue<T> {
    /// Create a live value.
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(Inner {
                value: RefCell::new(value),
                previous: RefCell::new(None),
                subscribers: RefCell::new(Vec::new()),
                next_id: Cell::new(1),
                alive: Cell::new(true),
                upstream: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Clone out the current value.
    pub fn get(&self) -> T {
        self.inner.value.borrow().clone()
    }

    /// Borrow the current value for the duration of `f`.
    ///
    /// `f` must not write to this same value.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    /// The value replaced by the most recent store, if any.
    pub fn previous(&self) -> Option<T> {
        self.inner.previous.borrow().clone()
    }

    /// `false` once [`dispose`](Self::dispose) has run.
    pub fn is_alive(&self) -> bool {
        self.inner.alive.get()
    }

    /// Number of registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.borrow().len()
    }

    /// Store `value` and notify subscribers even if it is equal to the old value.
    pub fn set_forced(&self, value: T) {
        if !self.is_alive() {
            return;
        }
        self.store(value);
        self.notify();
    }

    /// Store `value` without notifying anyone.
    pub fn set_quiet(&self, value: T) {
        if !self.is_alive() {
            return;
        }
        *self.inner.value.borrow_mut() = value;
    }

    /// Call every subscriber with the current value, in subscription order.
    ///
    /// A subscriber removed by an earlier subscriber during the same pass is skipped.
    pub fn notify(&self) {
        if !self.is_alive() {
            return;
        }
        let snapshot: SmallVec<[(u64, Callback<T>); 4]> = self
            .inner
            .subscribers
            .borrow()
            .iter()
            .map(|(id, cb)| (*id, Rc::clone(cb)))
            .collect();
        if snapshot.is_empty() {
            return;
        }
        let value = self.get();
        for (id, cb) in snapshot {
            if self.inner.has_subscriber(id) {
                cb(&value);
            }
        }
    }

    /// Register `f` to run after every change.
    pub fn subscribe(&self, f: impl Fn(&T) + 'static) -> Subscription {
        if !self.is_alive() {
            return Subscription::inert();
        }
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner.subscribers.borrow_mut().push((id, Rc::new(f)));
        let source: Weak<dyn SubscriberSet> = Rc::downgrade(&self.inner) as Weak<Inner<T>>;
        Subscription::new(source, id)
    }

    /// Like [`subscribe`](Self::subscribe), but also calls `f` once with the current value.
    pub fn subscribe_immediate(&self, f: impl Fn(&T) + 'static) -> Subscription {
        if !self.is_alive() {
            return Subscription::inert();
        }
        let value = self.get();
        f(&value);
        self.subscribe(f)
    }

    /// Release all subscribers and upstream subscriptions and mark the value dead.
    ///
    /// Idempotent.
    pub fn dispose(&self) {
        if !self.inner.alive.replace(false) {
            return;
        }
        let subscribers = core::mem::take(&mut *self.inner.subscribers.borrow_mut());
        let upstream = core::mem::take(&mut *self.inner.upstream.borrow_mut());
        drop(subscribers);
        drop(upstream);
    }

    /// The read-only half of this value.
    pub fn read_only(&self) -> ReadOnly<T> {
        ReadOnly(self.clone())
    }

    /// A non-owning handle that must be upgraded before use.
    pub fn downgrade(&self) -> WeakValue<T> {
        WeakValue(Rc::downgrade(&self.inner))
    }

    /// Keep `subscription` alive for as long as this value lives.
    pub(crate) fn hold(&self, subscription: Subscription) {
        if self.is_alive() {
            self.inner.upstream.borrow_mut().push(subscription);
        }
    }

    fn store(&self, value: T) {
        let old = core::mem::replace(&mut *self.inner.value.borrow_mut(), value);
        *self.inner.previous.borrow_mut() = Some(old);
    }
}

impl<T: Clone + PartialEq + 'static> ReactiveValue<T> {
    /// Store `value`; notify subscribers only if it differs from the current value.
    ///
    /// Returns whether a change was observed. A no-op returning `false` on a
    /// disposed value.
    pub fn set(&self, value: T) -> bool {
        if !self.is_alive() {
            return false;
        }
        let changed = *self.inner.value.borrow() != value;
        self.store(value);
        if changed {
            self.notify();
        }
        changed
    }

    /// Modify the value in place, notifying if the result differs.
    pub fn update(&self, f: impl FnOnce(&mut T)) -> bool {
        let mut next = self.get();
        f(&mut next);
        self.set(next)
    }
}

/// Non-owning handle to a [`ReactiveValue`].
pub struct WeakValue<T>(Weak<Inner<T>>);

impl<T> Clone for WeakValue<T> {
    fn clone(&self) -> Self {
        Self(Weak::clone(&self.0))
    }
}

impl<T> fmt::Debug for WeakValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("WeakValue")
            .field(&(self.0.strong_count() > 0))
            .finish()
    }
}

impl<T> WeakValue<T> {
    /// Upgrade to a strong handle if the value still exists and is alive.
    pub fn upgrade(&self) -> Option<ReactiveValue<T>> {
        let inner = self.0.upgrade()?;
        inner.alive.get().then_some(ReactiveValue { inner })
    }
}

/// Read-only handle to a [`ReactiveValue`], typically a derived one.
pub struct ReadOnly<T>(pub(crate) ReactiveValue<T>);

impl<T> Clone for ReadOnly<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: fmt::Debug> fmt::Debug for ReadOnly<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ReadOnly").field(&self.0).finish()
    }
}

impl<T: Clone + 'static> ReadOnly<T> {
    /// Clone out the current value.
    pub fn get(&self) -> T {
        self.0.get()
    }

    /// Borrow the current value for the duration of `f`.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.0.with(f)
    }

    /// The value replaced by the most recent store, if any.
    pub fn previous(&self) -> Option<T> {
        self.0.previous()
    }

    /// `false` once disposed.
    pub fn is_alive(&self) -> bool {
        self.0.is_alive()
    }

    /// See [`ReactiveValue::subscribe`].
    pub fn subscribe(&self, f: impl Fn(&T) + 'static) -> Subscription {
        self.0.subscribe(f)
    }

    /// See [`ReactiveValue::subscribe_immediate`].
    pub fn subscribe_immediate(&self, f: impl Fn(&T) + 'static) -> Subscription {
        self.0.subscribe_immediate(f)
    }

    /// Release this value and its upstream subscriptions.
    pub fn dispose(&self) {
        self.0.dispose();
    }

    /// Number of registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.0.subscriber_count()
    }
}
