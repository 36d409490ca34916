//! Withdrawing one's own vote from a pending operation.

use quorum_types::{OperationFingerprint, Principal};
use tracing::debug;

use crate::engine::QuorumEngine;
use crate::events::QuorumEvent;
use crate::registry::Withdrawal;
use crate::QuorumError;

/// Capability to cancel a vote, kept apart from vote casting so hosts can
/// wrap it (rate limiting, auditing) without touching the guard.
pub trait CancellationHandler {
    /// Withdraw `caller`'s vote on `fingerprint`.
    ///
    /// Fails with [`QuorumError::VoteNotFound`] unless `caller` has a recorded
    /// vote there. Withdrawing the last vote removes the operation entirely.
    fn cancel_pending(
        &mut self,
        caller: &Principal,
        fingerprint: &OperationFingerprint,
    ) -> Result<Withdrawal, QuorumError>;
}

impl CancellationHandler for QuorumEngine {
    fn cancel_pending(
        &mut self,
        caller: &Principal,
        fingerprint: &OperationFingerprint,
    ) -> Result<Withdrawal, QuorumError> {
        let withdrawal = self.registry.withdraw(fingerprint, caller).inspect_err(|_| {
            debug!(voter = %caller, %fingerprint, "cancel rejected: no vote to withdraw");
        })?;
        match withdrawal {
            Withdrawal::Downgraded { remaining } => {
                debug!(voter = %caller, %fingerprint, remaining, "vote withdrawn");
                self.record(QuorumEvent::OperationDowngraded {
                    fingerprint: *fingerprint,
                    voter: *caller,
                    votes: remaining,
                });
            }
            Withdrawal::Dropped => {
                debug!(voter = %caller, %fingerprint, "last vote withdrawn, operation dropped");
                self.record(QuorumEvent::OperationCancelled {
                    fingerprint: *fingerprint,
                    voter: *caller,
                });
            }
        }
        self.publish();
        Ok(withdrawal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CallContext;
    use crate::guard::{GuardOutcome, GuardedCall};
    use crate::policy::QuorumKind;

    fn wallet(n: u8) -> Principal {
        Principal::new([n; 20])
    }

    fn vote(engine: &mut QuorumEngine, voter: u8, call: &GuardedCall) -> GuardOutcome<()> {
        engine
            .guard(&CallContext::new(wallet(voter)), call, |_, _| {
                Ok::<_, QuorumError>(())
            })
            .unwrap()
    }

    fn setup() -> (QuorumEngine, GuardedCall) {
        let engine =
            QuorumEngine::with_beneficiaries(vec![wallet(1), wallet(2), wallet(3)]).unwrap();
        let call = GuardedCall::new("set_value", &(1u64,), QuorumKind::All).unwrap();
        (engine, call)
    }

    #[test]
    fn cancel_only_vote_removes_operation() {
        let (mut engine, call) = setup();
        vote(&mut engine, 1, &call);
        let fp = engine.pending_at(0).unwrap();
        assert_eq!(
            engine.cancel_pending(&wallet(1), &fp).unwrap(),
            Withdrawal::Dropped
        );
        assert_eq!(engine.pending_operations_count(), 0);
    }

    #[test]
    fn cancel_one_of_two_keeps_operation() {
        let (mut engine, call) = setup();
        vote(&mut engine, 1, &call);
        vote(&mut engine, 2, &call);
        assert_eq!(
            engine.cancel_pending(&wallet(2), call.fingerprint()).unwrap(),
            Withdrawal::Downgraded { remaining: 1 }
        );
        assert_eq!(engine.voters(call.fingerprint()).unwrap(), &[wallet(1)]);
    }

    #[test]
    fn cannot_cancel_someone_elses_vote() {
        let (mut engine, call) = setup();
        vote(&mut engine, 1, &call);
        assert!(matches!(
            engine.cancel_pending(&wallet(2), call.fingerprint()),
            Err(QuorumError::VoteNotFound { .. })
        ));
        assert_eq!(engine.votes_count(call.fingerprint()), 1);
    }

    #[test]
    fn cannot_cancel_unknown_operation() {
        let (mut engine, _) = setup();
        let missing = OperationFingerprint::new([0xEE; 32]);
        assert!(engine.cancel_pending(&wallet(1), &missing).is_err());
    }

    #[test]
    fn cancel_then_revote() {
        let (mut engine, call) = setup();
        vote(&mut engine, 1, &call);
        engine.cancel_pending(&wallet(1), call.fingerprint()).unwrap();
        assert_eq!(
            vote(&mut engine, 1, &call),
            GuardOutcome::Pending {
                votes: 1,
                required: 3
            }
        );
    }
}
