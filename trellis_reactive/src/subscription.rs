// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::rc::Weak;
use core::fmt;

/// Type-erased view of a value's subscriber list.
pub(crate) trait SubscriberSet {
    fn remove_subscriber(&self, id: u64);
    fn has_subscriber(&self, id: u64) -> bool;
}

/// Handle for one registered subscriber.
///
/// Dropping the handle unsubscribes. Use [`Subscription::detach`] to keep the
/// subscriber registered for the remaining lifetime of the source.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    source: Option<Weak<dyn SubscriberSet>>,
    id: u64,
}

impl Subscription {
    pub(crate) fn new(source: Weak<dyn SubscriberSet>, id: u64) -> Self {
        Self {
            source: Some(source),
            id,
        }
    }

    /// A subscription that is not attached to anything.
    ///
    /// Returned when subscribing to a disposed value.
    pub fn inert() -> Self {
        Self {
            source: None,
            id: 0,
        }
    }

    /// Returns `true` while the subscriber is still registered with a live source.
    pub fn is_active(&self) -> bool {
        self.source
            .as_ref()
            .and_then(Weak::upgrade)
            .is_some_and(|source| source.has_subscriber(self.id))
    }

    /// Unsubscribe now. Equivalent to dropping the handle.
    pub fn unsubscribe(self) {}

    /// Give up the handle without unsubscribing.
    pub fn detach(mut self) {
        self.source = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(source) = self.source.take().as_ref().and_then(Weak::upgrade) {
            source.remove_subscriber(self.id);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish_non_exhaustive()
    }
}
