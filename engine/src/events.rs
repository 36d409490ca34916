//! Events emitted by the engine for subscribers.

use quorum_types::{OperationFingerprint, Principal};

/// Engine events, published once the outermost call that produced them succeeds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QuorumEvent {
    /// First vote on an operation.
    OperationCreated {
        fingerprint: OperationFingerprint,
        proposer: Principal,
    },
    /// A vote was added to an operation.
    OperationUpvoted {
        fingerprint: OperationFingerprint,
        voter: Principal,
        votes: usize,
        required: usize,
    },
    /// An operation reached its quorum and its action ran.
    OperationPerformed {
        fingerprint: OperationFingerprint,
        performer: Principal,
        votes: usize,
    },
    /// A vote was withdrawn and the operation is still pending.
    OperationDowngraded {
        fingerprint: OperationFingerprint,
        voter: Principal,
        votes: usize,
    },
    /// The last vote was withdrawn and the operation was dropped.
    OperationCancelled {
        fingerprint: OperationFingerprint,
        voter: Principal,
    },
    /// The beneficiary set was replaced.
    BeneficiariesTransferred {
        previous: Vec<Principal>,
        current: Vec<Principal>,
        generation: u64,
    },
    /// Pending operations discarded because the beneficiary set changed.
    PendingInvalidated { dropped: usize },
}

/// Synchronous fan-out event bus.
///
/// Listeners run inline while the engine is held; keep handlers fast and
/// never call back into the engine from one.
pub struct EventBus {
    listeners: Vec<Box<dyn Fn(&QuorumEvent) + Send + Sync>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&QuorumEvent) + Send + Sync>) {
        self.listeners.push(listener);
    }

    pub fn emit(&self, event: &QuorumEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
