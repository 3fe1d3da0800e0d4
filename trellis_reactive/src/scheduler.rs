// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cooperative timers and idle-point work queue.
//!
//! Time is injected by the host in milliseconds through [`Scheduler::advance_to`];
//! nothing here reads a clock. Idle work queued with [`Scheduler::defer`] is
//! coalesced per [`TaskKey`] and runs on the next [`Scheduler::run_idle`].

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;

use crate::value::{ReactiveValue, ReadOnly};

type Task = Box<dyn FnOnce()>;

/// Coalescing key for timers and idle tasks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskKey(u64);

struct Timer {
    key: TaskKey,
    due: u64,
    seq: u64,
    task: Task,
}

#[derive(Default)]
struct SchedulerInner {
    now: Cell<u64>,
    next_seq: Cell<u64>,
    next_key: Cell<u64>,
    timers: RefCell<Vec<Timer>>,
    idle: RefCell<Vec<(TaskKey, Task)>>,
}

/// Shared handle to a single-threaded scheduler.
#[derive(Clone, Default)]
pub struct Scheduler {
    inner: Rc<SchedulerInner>,
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("now", &self.inner.now.get())
            .field("timers", &self.inner.timers.borrow().len())
            .field("idle", &self.inner.idle.borrow().len())
            .finish_non_exhaustive()
    }
}

impl Scheduler {
    /// Create a scheduler at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current time in milliseconds, as last set by [`advance_to`](Self::advance_to).
    pub fn now(&self) -> u64 {
        self.inner.now.get()
    }

    /// Allocate a fresh coalescing key.
    pub fn key(&self) -> TaskKey {
        let k = self.inner.next_key.get();
        self.inner.next_key.set(k + 1);
        TaskKey(k)
    }

    /// Run `task` once `delay` milliseconds have elapsed.
    ///
    /// A pending timer with the same key is cancelled first, which is what gives
    /// debouncing its trailing-edge behavior.
    pub fn schedule(&self, key: TaskKey, delay: u64, task: impl FnOnce() + 'static) {
        self.cancel(key);
        let seq = self.inner.next_seq.get();
        self.inner.next_seq.set(seq + 1);
        self.inner.timers.borrow_mut().push(Timer {
            key,
            due: self.now().saturating_add(delay),
            seq,
            task: Box::new(task),
        });
    }

    /// Cancel the pending timer for `key`. Returns whether one existed.
    pub fn cancel(&self, key: TaskKey) -> bool {
        let mut timers = self.inner.timers.borrow_mut();
        let before = timers.len();
        timers.retain(|t| t.key != key);
        timers.len() != before
    }

    /// Number of timers not yet fired.
    pub fn pending_timers(&self) -> usize {
        self.inner.timers.borrow().len()
    }

    /// Move the clock forward and fire every timer due at or before `now`.
    ///
    /// Timers fire in due order, ties broken by scheduling order. While a timer
    /// runs, [`now`](Self::now) reports its due time, so timers scheduled from
    /// inside a callback are relative to that instant. The clock never moves
    /// backwards. Returns the number of timers fired.
    pub fn advance_to(&self, now: u64) -> usize {
        let target = now.max(self.now());
        let mut fired = 0;
        loop {
            let next = {
                let mut timers = self.inner.timers.borrow_mut();
                let idx = timers
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.due <= target)
                    .min_by_key(|(_, t)| (t.due, t.seq))
                    .map(|(i, _)| i);
                idx.map(|i| timers.swap_remove(i))
            };
            let Some(timer) = next else { break };
            self.inner.now.set(timer.due.max(self.now()));
            log::trace!("timer {:?} fired at {}", timer.key, timer.due);
            (timer.task)();
            fired += 1;
        }
        self.inner.now.set(target);
        fired
    }

    /// Queue `task` for the next idle point.
    ///
    /// If a task with the same key is already queued, it is replaced in place so
    /// that a burst of requests within one tick runs exactly once.
    pub fn defer(&self, key: TaskKey, task: impl FnOnce() + 'static) {
        let mut idle = self.inner.idle.borrow_mut();
        if let Some(slot) = idle.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = Box::new(task);
        } else {
            idle.push((key, Box::new(task)));
        }
    }

    /// Number of idle tasks waiting for [`run_idle`](Self::run_idle).
    pub fn pending_idle(&self) -> usize {
        self.inner.idle.borrow().len()
    }

    /// Run every queued idle task. Tasks queued while running wait for the next call.
    pub fn run_idle(&self) -> usize {
        let tasks = core::mem::take(&mut *self.inner.idle.borrow_mut());
        let count = tasks.len();
        for (_, task) in tasks {
            task();
        }
        count
    }
}

impl<T: Clone + PartialEq + 'static> ReactiveValue<T> {
    /// A view of this value that only updates `delay` ms after the last change
    /// in a burst.
    pub fn debounced(&self, scheduler: &Scheduler, delay: u64) -> ReadOnly<T> {
        let derived = Self::new(self.get());
        let key = scheduler.key();
        let weak = derived.downgrade();
        let scheduler = scheduler.clone();
        derived.hold(self.subscribe(move |value| {
            let weak = weak.clone();
            let value = value.clone();
            scheduler.schedule(key, delay, move || {
                if let Some(derived) = weak.upgrade() {
                    derived.set(value);
                }
            });
        }));
        derived.read_only()
    }

    /// A view of this value that updates at most once per idle point.
    pub fn deferred(&self, scheduler: &Scheduler) -> ReadOnly<T> {
        let derived = Self::new(self.get());
        let key = scheduler.key();
        let weak = derived.downgrade();
        let scheduler = scheduler.clone();
        derived.hold(self.subscribe(move |value| {
            let weak = weak.clone();
            let value = value.clone();
            scheduler.defer(key, move || {
                if let Some(derived) = weak.upgrade() {
                    derived.set(value);
                }
            });
        }));
        derived.read_only()
    }
}

impl<T: Clone + PartialEq + 'static> ReadOnly<T> {
    /// See [`ReactiveValue::debounced`].
    pub fn debounced(&self, scheduler: &Scheduler, delay: u64) -> Self {
        self.0.debounced(scheduler, delay)
    }

    /// See [`ReactiveValue::deferred`].
    pub fn deferred(&self, scheduler: &Scheduler) -> Self {
        self.0.deferred(scheduler)
    }
}
