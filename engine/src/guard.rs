//! The consensus guard: gate an action behind a quorum of beneficiary votes.

use quorum_crypto::operation_fingerprint;
use quorum_types::OperationFingerprint;
use serde::Serialize;
use tracing::{debug, info};

use crate::context::CallContext;
use crate::engine::{ApprovedScope, Checkpoint, QuorumEngine};
use crate::events::QuorumEvent;
use crate::policy::QuorumKind;
use crate::QuorumError;

/// A guarded function invocation: which operation, and what quorum it needs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GuardedCall {
    fingerprint: OperationFingerprint,
    quorum: QuorumKind,
}

impl GuardedCall {
    /// Fingerprint `function` with its full argument tuple.
    pub fn new<A: Serialize + ?Sized>(
        function: &str,
        args: &A,
        quorum: QuorumKind,
    ) -> Result<Self, QuorumError> {
        Ok(Self {
            fingerprint: operation_fingerprint(function, args)?,
            quorum,
        })
    }

    pub fn from_fingerprint(fingerprint: OperationFingerprint, quorum: QuorumKind) -> Self {
        Self {
            fingerprint,
            quorum,
        }
    }

    pub fn fingerprint(&self) -> &OperationFingerprint {
        &self.fingerprint
    }

    pub fn quorum(&self) -> QuorumKind {
        self.quorum
    }
}

/// What a vote on a guarded call led to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardOutcome<T> {
    /// The quorum was reached and the action ran once, producing `T`.
    Executed(T),
    /// The vote was recorded; the operation still needs more votes.
    Pending { votes: usize, required: usize },
}

impl<T> GuardOutcome<T> {
    pub fn is_executed(&self) -> bool {
        matches!(self, Self::Executed(_))
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }

    /// The action's result, if it ran.
    pub fn executed(self) -> Option<T> {
        match self {
            Self::Executed(value) => Some(value),
            Self::Pending { .. } => None,
        }
    }
}

impl QuorumEngine {
    /// Cast the caller's vote on `call` and run `action` once the quorum is met.
    ///
    /// The required vote count is computed from the current beneficiary count
    /// on every vote. When the quorum is reached the operation leaves the
    /// registry before `action` runs, and `action` receives an authorized
    /// context: guarded calls made with it execute without a vote round of
    /// their own, provided their quorum needs no more votes than the
    /// enclosing operation collected. If `action` fails or panics, the vote,
    /// the registry and any nested changes are rolled back.
    pub fn guard<T, E, F>(
        &mut self,
        ctx: &CallContext,
        call: &GuardedCall,
        action: F,
    ) -> Result<GuardOutcome<T>, E>
    where
        E: From<QuorumError>,
        F: FnOnce(&mut QuorumEngine, &CallContext) -> Result<T, E>,
    {
        let voter = *ctx.caller();
        let fingerprint = *call.fingerprint();

        if !self.is_beneficiary(&voter) {
            debug!(%voter, %fingerprint, "vote rejected: not a beneficiary");
            return Err(QuorumError::Unauthorized(voter).into());
        }
        let required = call.quorum().required(self.beneficiaries_count())?;

        if let Some(approval) = ctx.approval() {
            if required > approval.votes {
                debug!(
                    %voter,
                    %fingerprint,
                    required,
                    approved = approval.votes,
                    "nested call rejected: enclosing approval has too few votes"
                );
                return Err(QuorumError::InsufficientApproval {
                    required,
                    approved: approval.votes,
                }
                .into());
            }
            debug!(
                %voter,
                %fingerprint,
                outer = %approval.fingerprint,
                "nested call inside approved operation, vote skipped"
            );
            let checkpoint = self.checkpoint();
            return self
                .run_approved(ctx, checkpoint, action)
                .map(GuardOutcome::Executed);
        }

        if self.registry.has_voted(&fingerprint, &voter) {
            debug!(%voter, %fingerprint, "vote rejected: already voted");
            return Err(QuorumError::DuplicateVote { voter, fingerprint }.into());
        }
        // Only the deciding vote runs an action that may have to be undone.
        let checkpoint =
            (self.registry.votes(&fingerprint) + 1 >= required).then(|| self.checkpoint());

        let votes = self.registry.record_vote(fingerprint, voter)?;
        if votes == 1 {
            self.record(QuorumEvent::OperationCreated {
                fingerprint,
                proposer: voter,
            });
        }
        self.record(QuorumEvent::OperationUpvoted {
            fingerprint,
            voter,
            votes,
            required,
        });

        let Some(checkpoint) = checkpoint else {
            debug!(%voter, %fingerprint, votes, required, "operation pending");
            self.publish();
            return Ok(GuardOutcome::Pending { votes, required });
        };

        self.registry.resolve(&fingerprint);
        info!(%fingerprint, performer = %voter, votes, required, "operation performed");
        self.record(QuorumEvent::OperationPerformed {
            fingerprint,
            performer: voter,
            votes,
        });
        let approved = ctx.authorize(fingerprint, votes);
        self.run_approved(&approved, checkpoint, action)
            .map(GuardOutcome::Executed)
    }

    fn run_approved<T, E, F>(
        &mut self,
        ctx: &CallContext,
        checkpoint: Checkpoint,
        action: F,
    ) -> Result<T, E>
    where
        F: FnOnce(&mut QuorumEngine, &CallContext) -> Result<T, E>,
    {
        let mut scope = ApprovedScope::enter(self, checkpoint);
        let result = action(scope.engine(), ctx);
        match result {
            Ok(value) => {
                scope.commit();
                self.publish();
                Ok(value)
            }
            Err(e) => {
                drop(scope);
                debug!(caller = %ctx.caller(), "action failed, changes rolled back");
                Err(e)
            }
        }
    }
}
