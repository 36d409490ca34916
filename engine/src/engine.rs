//! The quorum engine: one beneficiary set plus the registry of pending operations.

use quorum_crypto::operation_fingerprint;
use quorum_types::{OperationFingerprint, Principal};
use tracing::{debug, info};

use crate::beneficiaries::{self, BeneficiarySet};
use crate::config::EngineConfig;
use crate::context::CallContext;
use crate::events::{EventBus, QuorumEvent};
use crate::guard::{GuardOutcome, GuardedCall};
use crate::policy::QuorumKind;
use crate::registry::OperationRegistry;
use crate::QuorumError;

/// Fingerprint name of the majority-approved beneficiary transfer.
pub const TRANSFER_BENEFICIARIES: &str = "transfer_beneficiaries";
/// Fingerprint name of the beneficiary transfer with an explicit quorum.
pub const TRANSFER_BENEFICIARIES_WITH_QUORUM: &str = "transfer_beneficiaries_with_quorum";

/// Owns the beneficiary set and every pending operation.
///
/// All mutation goes through `&mut self`; wrap the engine in a single lock
/// (see [`crate::QuorumService`]) to share it between threads.
#[derive(Debug)]
pub struct QuorumEngine {
    pub(crate) beneficiaries: BeneficiarySet,
    pub(crate) registry: OperationRegistry,
    /// Events produced by the call in flight, published when it completes.
    journal: Vec<QuorumEvent>,
    /// Number of approved actions currently running.
    depth: usize,
    events: EventBus,
}

/// Engine state captured before a vote so a failed action can be undone.
pub(crate) struct Checkpoint {
    beneficiaries: BeneficiarySet,
    registry: OperationRegistry,
    journal_len: usize,
}

impl QuorumEngine {
    /// An engine whose only beneficiary is the instantiating principal.
    pub fn new(instantiator: Principal) -> Result<Self, QuorumError> {
        Ok(Self::from_set(BeneficiarySet::new(instantiator)?))
    }

    /// An engine seeded with a validated genesis list.
    pub fn with_beneficiaries(list: Vec<Principal>) -> Result<Self, QuorumError> {
        Ok(Self::from_set(BeneficiarySet::from_list(list)?))
    }

    pub fn from_config(config: &EngineConfig) -> Result<Self, QuorumError> {
        Self::with_beneficiaries(config.beneficiaries.clone())
    }

    fn from_set(beneficiaries: BeneficiarySet) -> Self {
        Self {
            beneficiaries,
            registry: OperationRegistry::new(),
            journal: Vec::new(),
            depth: 0,
            events: EventBus::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&QuorumEvent) + Send + Sync>) {
        self.events.subscribe(listener);
    }

    // ── Beneficiary queries ────────────────────────────────────────────

    pub fn is_beneficiary(&self, principal: &Principal) -> bool {
        self.beneficiaries.is_beneficiary(principal)
    }

    pub fn beneficiaries_count(&self) -> usize {
        self.beneficiaries.count()
    }

    pub fn beneficiary_at(&self, index: usize) -> Result<Principal, QuorumError> {
        self.beneficiaries.at(index)
    }

    pub fn beneficiaries(&self) -> &[Principal] {
        self.beneficiaries.as_slice()
    }

    /// How many times the beneficiary set has been replaced.
    pub fn generation(&self) -> u64 {
        self.beneficiaries.generation()
    }

    // ── Pending operation queries ──────────────────────────────────────

    pub fn pending_operations(&self) -> &[OperationFingerprint] {
        self.registry.fingerprints()
    }

    pub fn pending_operations_count(&self) -> usize {
        self.registry.len()
    }

    pub fn pending_at(&self, index: usize) -> Result<OperationFingerprint, QuorumError> {
        self.registry.at(index)
    }

    pub fn votes_count(&self, fingerprint: &OperationFingerprint) -> usize {
        self.registry.votes(fingerprint)
    }

    pub fn voters(&self, fingerprint: &OperationFingerprint) -> Option<&[Principal]> {
        self.registry.get(fingerprint).map(|op| op.voters())
    }

    pub fn has_voted(&self, fingerprint: &OperationFingerprint, principal: &Principal) -> bool {
        self.registry.has_voted(fingerprint, principal)
    }

    pub fn registry(&self) -> &OperationRegistry {
        &self.registry
    }

    // ── Beneficiary transfer ───────────────────────────────────────────

    /// Vote to replace the beneficiary set with `new_list` under majority quorum.
    ///
    /// The list is validated before any vote is recorded. When the quorum is
    /// reached the set is replaced atomically and every pending operation is
    /// discarded.
    pub fn transfer_beneficiaries(
        &mut self,
        ctx: &CallContext,
        new_list: Vec<Principal>,
    ) -> Result<GuardOutcome<()>, QuorumError> {
        beneficiaries::validate(&new_list)?;
        let call = GuardedCall::new(TRANSFER_BENEFICIARIES, &new_list, QuorumKind::Many)?;
        self.guard(ctx, &call, move |engine, _| {
            engine.replace_beneficiaries(new_list);
            Ok(())
        })
    }

    /// Vote to replace the beneficiary set, requiring `how_many` votes from the
    /// current set for this transfer instead of a majority.
    pub fn transfer_beneficiaries_with_quorum(
        &mut self,
        ctx: &CallContext,
        new_list: Vec<Principal>,
        how_many: usize,
    ) -> Result<GuardOutcome<()>, QuorumError> {
        beneficiaries::validate(&new_list)?;
        let quorum = QuorumKind::SomeK(how_many);
        quorum.required(self.beneficiaries.count())?;
        let call = GuardedCall::new(
            TRANSFER_BENEFICIARIES_WITH_QUORUM,
            &(&new_list, how_many as u64),
            quorum,
        )?;
        self.guard(ctx, &call, move |engine, _| {
            engine.replace_beneficiaries(new_list);
            Ok(())
        })
    }

    /// Fingerprint a majority transfer to `new_list` would vote on.
    pub fn transfer_fingerprint(new_list: &[Principal]) -> Result<OperationFingerprint, QuorumError> {
        Ok(operation_fingerprint(TRANSFER_BENEFICIARIES, new_list)?)
    }

    fn replace_beneficiaries(&mut self, new_list: Vec<Principal>) {
        let current = new_list.clone();
        let previous = self.beneficiaries.replace(new_list);
        let dropped = self.registry.clear();
        let generation = self.beneficiaries.generation();
        info!(
            previous = previous.len(),
            current = current.len(),
            generation,
            dropped,
            "beneficiaries transferred"
        );
        self.record(QuorumEvent::BeneficiariesTransferred {
            previous,
            current,
            generation,
        });
        if dropped > 0 {
            debug!(dropped, "pending operations invalidated by membership change");
            self.record(QuorumEvent::PendingInvalidated { dropped });
        }
    }

    // ── Journal and rollback ───────────────────────────────────────────

    pub(crate) fn record(&mut self, event: QuorumEvent) {
        self.journal.push(event);
    }

    /// Hand journaled events to subscribers once no approved action is running.
    pub(crate) fn publish(&mut self) {
        if self.depth > 0 {
            return;
        }
        for event in std::mem::take(&mut self.journal) {
            self.events.emit(&event);
        }
    }

    pub(crate) fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            beneficiaries: self.beneficiaries.clone(),
            registry: self.registry.clone(),
            journal_len: self.journal.len(),
        }
    }

    fn restore(&mut self, checkpoint: Checkpoint) {
        self.beneficiaries = checkpoint.beneficiaries;
        self.registry = checkpoint.registry;
        self.journal.truncate(checkpoint.journal_len);
    }
}

/// An approved action in progress.
///
/// Holds the engine for the action's duration with the nesting depth raised.
/// Unless [`ApprovedScope::commit`] is called, dropping the scope restores the
/// checkpoint, so both a failed and a panicking action leave no trace.
pub(crate) struct ApprovedScope<'a> {
    engine: &'a mut QuorumEngine,
    checkpoint: Option<Checkpoint>,
}

impl<'a> ApprovedScope<'a> {
    pub(crate) fn enter(engine: &'a mut QuorumEngine, checkpoint: Checkpoint) -> Self {
        engine.depth += 1;
        Self {
            engine,
            checkpoint: Some(checkpoint),
        }
    }

    pub(crate) fn engine(&mut self) -> &mut QuorumEngine {
        self.engine
    }

    /// Keep the action's changes.
    pub(crate) fn commit(mut self) {
        self.checkpoint = None;
    }
}

impl Drop for ApprovedScope<'_> {
    fn drop(&mut self) {
        self.engine.depth -= 1;
        if let Some(checkpoint) = self.checkpoint.take() {
            self.engine.restore(checkpoint);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;

    fn wallet(n: u8) -> Principal {
        Principal::new([n; 20])
    }

    fn ctx(n: u8) -> CallContext {
        CallContext::new(wallet(n))
    }

    #[test]
    fn new_engine_has_instantiator() {
        let engine = QuorumEngine::new(wallet(1)).unwrap();
        assert_eq!(engine.beneficiaries(), &[wallet(1)]);
        assert_eq!(engine.pending_operations_count(), 0);
        assert_eq!(engine.generation(), 0);
    }

    #[test]
    fn single_beneficiary_transfers_alone() {
        let mut engine = QuorumEngine::new(wallet(1)).unwrap();
        let outcome = engine
            .transfer_beneficiaries(&ctx(1), vec![wallet(2), wallet(3)])
            .unwrap();
        assert_eq!(outcome, GuardOutcome::Executed(()));
        assert_eq!(engine.beneficiaries(), &[wallet(2), wallet(3)]);
        assert_eq!(engine.generation(), 1);
    }

    #[test]
    fn invalid_list_records_no_vote() {
        let mut engine = QuorumEngine::with_beneficiaries(vec![wallet(1), wallet(2)]).unwrap();
        let err = engine
            .transfer_beneficiaries(&ctx(1), vec![wallet(3), wallet(3)])
            .unwrap_err();
        assert_eq!(
            err,
            QuorumError::Validation(ValidationError::Duplicate {
                principal: wallet(3)
            })
        );
        assert_eq!(engine.pending_operations_count(), 0);
    }

    #[test]
    fn validation_precedes_authorization() {
        let mut engine = QuorumEngine::new(wallet(1)).unwrap();
        assert!(matches!(
            engine.transfer_beneficiaries(&ctx(9), vec![]),
            Err(QuorumError::Validation(ValidationError::Empty))
        ));
    }

    #[test]
    fn with_quorum_validates_against_current_count() {
        let mut engine = QuorumEngine::new(wallet(1)).unwrap();
        assert!(matches!(
            engine.transfer_beneficiaries_with_quorum(&ctx(1), vec![wallet(2)], 0),
            Err(QuorumError::QuorumConfig { .. })
        ));
        assert!(matches!(
            engine.transfer_beneficiaries_with_quorum(&ctx(1), vec![wallet(2), wallet(3)], 2),
            Err(QuorumError::QuorumConfig {
                required: 2,
                beneficiaries: 1
            })
        ));
        assert_eq!(engine.beneficiaries(), &[wallet(1)]);
    }

    #[test]
    fn transfer_fingerprint_matches_pending_entry() {
        let mut engine = QuorumEngine::with_beneficiaries(vec![wallet(1), wallet(2)]).unwrap();
        engine
            .transfer_beneficiaries(&ctx(1), vec![wallet(3)])
            .unwrap();
        let fp = QuorumEngine::transfer_fingerprint(&[wallet(3)]).unwrap();
        assert_eq!(engine.pending_at(0).unwrap(), fp);
        assert_eq!(engine.voters(&fp).unwrap(), &[wallet(1)]);
    }

    #[test]
    fn from_config_uses_genesis_list() {
        let config = EngineConfig {
            beneficiaries: vec![wallet(4), wallet(5)],
            ..EngineConfig::default()
        };
        let engine = QuorumEngine::from_config(&config).unwrap();
        assert_eq!(engine.beneficiaries(), &[wallet(4), wallet(5)]);
    }
}
