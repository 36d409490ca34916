//! Pending operations and the votes collected for each of them.
//!
//! Fingerprints are kept in the order their first vote arrived. Removal shifts
//! later entries down rather than swapping with the last one, so the earliest
//! surviving operation always stays at position 0.

use quorum_types::{OperationFingerprint, Principal};
use std::collections::HashMap;

use crate::QuorumError;

/// An operation with at least one vote that has not reached its quorum yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingOperation {
    fingerprint: OperationFingerprint,
    /// Voters in the order they voted.
    voters: Vec<Principal>,
}

impl PendingOperation {
    fn new(fingerprint: OperationFingerprint) -> Self {
        Self {
            fingerprint,
            voters: Vec::new(),
        }
    }

    pub fn fingerprint(&self) -> &OperationFingerprint {
        &self.fingerprint
    }

    pub fn voters(&self) -> &[Principal] {
        &self.voters
    }

    pub fn votes(&self) -> usize {
        self.voters.len()
    }

    pub fn has_voted(&self, principal: &Principal) -> bool {
        self.voters.contains(principal)
    }
}

/// Result of withdrawing one vote.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Withdrawal {
    /// The operation is still pending with this many votes.
    Downgraded { remaining: usize },
    /// The last vote was withdrawn and the operation was dropped.
    Dropped,
}

/// Maps fingerprints to their vote sets and keeps the pending list ordered.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OperationRegistry {
    operations: HashMap<OperationFingerprint, PendingOperation>,
    order: Vec<OperationFingerprint>,
}

impl OperationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, fingerprint: &OperationFingerprint) -> Option<&PendingOperation> {
        self.operations.get(fingerprint)
    }

    pub fn contains(&self, fingerprint: &OperationFingerprint) -> bool {
        self.operations.contains_key(fingerprint)
    }

    /// Votes recorded on `fingerprint`, zero when it is not pending.
    pub fn votes(&self, fingerprint: &OperationFingerprint) -> usize {
        self.operations.get(fingerprint).map_or(0, PendingOperation::votes)
    }

    pub fn has_voted(&self, fingerprint: &OperationFingerprint, principal: &Principal) -> bool {
        self.operations
            .get(fingerprint)
            .is_some_and(|op| op.has_voted(principal))
    }

    /// Pending fingerprints in order of first vote.
    pub fn fingerprints(&self) -> &[OperationFingerprint] {
        &self.order
    }

    pub fn at(&self, index: usize) -> Result<OperationFingerprint, QuorumError> {
        self.order
            .get(index)
            .copied()
            .ok_or(QuorumError::PendingNotFound {
                index,
                count: self.order.len(),
            })
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Record `voter` on `fingerprint`, opening the operation if needed.
    ///
    /// Returns the vote count after recording. A repeated vote is rejected
    /// without touching the registry.
    pub(crate) fn record_vote(
        &mut self,
        fingerprint: OperationFingerprint,
        voter: Principal,
    ) -> Result<usize, QuorumError> {
        if self.has_voted(&fingerprint, &voter) {
            return Err(QuorumError::DuplicateVote { voter, fingerprint });
        }
        if !self.operations.contains_key(&fingerprint) {
            self.order.push(fingerprint);
        }
        let op = self
            .operations
            .entry(fingerprint)
            .or_insert_with(|| PendingOperation::new(fingerprint));
        op.voters.push(voter);
        Ok(op.votes())
    }

    /// Remove `fingerprint` from the registry, returning its final state.
    pub(crate) fn resolve(&mut self, fingerprint: &OperationFingerprint) -> Option<PendingOperation> {
        let op = self.operations.remove(fingerprint)?;
        self.unlink(fingerprint);
        Some(op)
    }

    /// Withdraw `voter`'s own vote from `fingerprint`.
    pub(crate) fn withdraw(
        &mut self,
        fingerprint: &OperationFingerprint,
        voter: &Principal,
    ) -> Result<Withdrawal, QuorumError> {
        let not_found = || QuorumError::VoteNotFound {
            voter: *voter,
            fingerprint: *fingerprint,
        };
        let op = self.operations.get_mut(fingerprint).ok_or_else(not_found)?;
        let position = op
            .voters
            .iter()
            .position(|v| v == voter)
            .ok_or_else(not_found)?;
        op.voters.remove(position);
        let remaining = op.voters.len();

        if remaining == 0 {
            self.operations.remove(fingerprint);
            self.unlink(fingerprint);
            Ok(Withdrawal::Dropped)
        } else {
            Ok(Withdrawal::Downgraded { remaining })
        }
    }

    /// Discard every pending operation, returning how many were dropped.
    pub(crate) fn clear(&mut self) -> usize {
        let dropped = self.order.len();
        self.operations.clear();
        self.order.clear();
        dropped
    }

    fn unlink(&mut self, fingerprint: &OperationFingerprint) {
        if let Some(index) = self.order.iter().position(|f| f == fingerprint) {
            self.order.remove(index);
        }
    }
}
