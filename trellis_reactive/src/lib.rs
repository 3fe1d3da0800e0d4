// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trellis Reactive: observable cells for a single-threaded UI core.
//!
//! This crate provides the change-notification layer the rest of Trellis is
//! built on:
//! - [`ReactiveValue`] is a shared, mutable cell. [`ReactiveValue::set`] stores a
//!   new value and, only if it differs from the current one, synchronously calls
//!   every subscriber in subscription order.
//! - [`ReadOnly`] is the read half handed out for derived values. [`ReactiveValue::map`]
//!   and [`calculated`] build one from one or more sources and recompute only when
//!   a source notifies.
//! - [`Subscription`] is returned by every `subscribe` call and unsubscribes on drop.
//! - [`Scheduler`] is a cooperative, injected-clock timer and idle queue. It backs
//!   [`ReactiveValue::debounced`] (trailing-edge coalescing) and
//!   [`ReactiveValue::deferred`] (at most one notification per idle point).
//!
//! ## Minimal example
//!
//! ```rust
//! use trellis_reactive::{ReactiveValue, calculated};
//!
//! let width = ReactiveValue::new(10.0_f64);
//! let height = ReactiveValue::new(4.0_f64);
//! let area = calculated(&[&width, &height], {
//!     let (width, height) = (width.clone(), height.clone());
//!     move || width.get() * height.get()
//! });
//! assert_eq!(area.get(), 40.0);
//!
//! width.set(5.0);
//! assert_eq!(area.get(), 20.0);
//! ```
//!
//! ## Liveness
//!
//! Values are owned by whichever node or subsystem created them. Calling
//! [`ReactiveValue::dispose`] releases every subscriber and marks the value dead;
//! afterwards `set`, `notify`, and `subscribe` are silent no-ops while reads keep
//! returning the last stored value. Derived values hold their upstream
//! subscriptions and release them when dropped or disposed.
//!
//! ## Threading
//!
//! Everything here is `!Send`: the Trellis core is single-threaded and cooperative.
//! Subscribers may read or write other reactive values, but a subscriber must not
//! synchronously re-enter an event dispatch.
//!
//! This crate is `no_std` and uses `alloc`.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod derive;
mod scheduler;
mod subscription;
mod value;

pub use derive::{Observe, calculated};
pub use scheduler::{Scheduler, TaskKey};
pub use subscription::Subscription;
pub use value::{ReactiveValue, ReadOnly, WeakValue};
