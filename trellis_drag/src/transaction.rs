// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The persistence boundary.
//!
//! Every committed drop runs inside exactly one transaction. The host plugs in
//! its persistence layer as a [`Transactor`]; [`ChangeLog`] is an in-memory one.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;

use kurbo::Point;
use trellis_tree::NodeId;

use crate::DropError;

/// A data change produced by a drop.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Change {
    /// `node` moved from `from` into `to`, at `position` in `to`'s plane.
    Moved {
        /// The moved node.
        node: NodeId,
        /// Its previous parent.
        from: Option<NodeId>,
        /// Its new parent.
        to: NodeId,
        /// Its new origin.
        position: Point,
    },
    /// A reference to `node` should appear in `into` at `position`.
    Transcluded {
        /// The referenced node.
        node: NodeId,
        /// The container receiving the reference.
        into: NodeId,
        /// The reference's origin.
        position: Point,
    },
    /// `node` left `from`; its origin may release whatever it held for it.
    Departed {
        /// The node that left.
        node: NodeId,
        /// The container it left.
        from: Option<NodeId>,
    },
}

/// An open transaction.
pub trait Transaction {
    /// Record `change` as part of this transaction.
    fn record(&mut self, change: Change);
}

/// Runs work atomically.
///
/// `run` opens a transaction, hands it to `work`, and commits only if `work`
/// succeeds. A failure is returned as-is.
pub trait Transactor {
    /// Run `work` in one transaction.
    fn run(
        &self,
        work: &mut dyn FnMut(&mut dyn Transaction) -> Result<(), DropError>,
    ) -> Result<(), DropError>;
}

/// An in-memory [`Transactor`] that keeps every committed change.
///
/// Clones share the same log.
#[derive(Clone, Debug, Default)]
pub struct ChangeLog {
    committed: Rc<RefCell<Vec<Vec<Change>>>>,
}

impl ChangeLog {
    /// An empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Committed transactions, oldest first.
    pub fn transactions(&self) -> Vec<Vec<Change>> {
        self.committed.borrow().clone()
    }

    /// Every committed change, flattened.
    pub fn changes(&self) -> Vec<Change> {
        self.committed.borrow().iter().flatten().copied().collect()
    }
}

#[derive(Debug, Default)]
struct Pending(Vec<Change>);

impl Transaction for Pending {
    fn record(&mut self, change: Change) {
        self.0.push(change);
    }
}

impl Transactor for ChangeLog {
    fn run(
        &self,
        work: &mut dyn FnMut(&mut dyn Transaction) -> Result<(), DropError>,
    ) -> Result<(), DropError> {
        let mut pending = Pending::default();
        work(&mut pending)?;
        self.committed.borrow_mut().push(pending.0);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use alloc::vec;
    use trellis_tree::{LocalNode, Tree};

    #[test]
    fn failed_work_commits_nothing() {
        let log = ChangeLog::new();
        let node = Tree::new().spawn(None, LocalNode::default()).unwrap();
        let departed = Change::Departed { node, from: None };

        let result = log.run(&mut |trx| {
            trx.record(departed);
            Err(DropError::Transaction("disk full".to_string()))
        });
        assert!(result.is_err(), "error passed through");
        assert!(log.transactions().is_empty(), "rolled back");

        log.clone().run(&mut |trx| {
            trx.record(departed);
            Ok(())
        })
        .unwrap();
        assert_eq!(log.transactions(), vec![vec![departed]], "clones share the log");
    }
}
