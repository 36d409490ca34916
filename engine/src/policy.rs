//! Quorum policies: how many distinct beneficiary votes an operation needs.

use serde::{Deserialize, Serialize};

use crate::QuorumError;

/// The quorum a guarded operation is declared with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuorumKind {
    /// A single beneficiary suffices.
    Any,
    /// A strict majority: `n / 2 + 1`.
    Many,
    /// Every beneficiary.
    All,
    /// Exactly `k` votes, valid only for `1 <= k <= n`.
    SomeK(usize),
}

impl QuorumKind {
    /// Number of distinct votes required with `beneficiaries` current members.
    pub fn required(self, beneficiaries: usize) -> Result<usize, QuorumError> {
        required(self, beneficiaries)
    }
}

/// Number of distinct votes `kind` requires when the set has `beneficiaries` members.
///
/// Always evaluated against the current member count, never one captured when
/// an operation was first proposed.
pub fn required(kind: QuorumKind, beneficiaries: usize) -> Result<usize, QuorumError> {
    match kind {
        QuorumKind::Any => Ok(1),
        QuorumKind::Many => Ok(beneficiaries / 2 + 1),
        QuorumKind::All => Ok(beneficiaries),
        QuorumKind::SomeK(k) if k >= 1 && k <= beneficiaries => Ok(k),
        QuorumKind::SomeK(k) => Err(QuorumError::QuorumConfig {
            required: k,
            beneficiaries,
        }),
    }
}
