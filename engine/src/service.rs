//! Thread-safe host surface: the engine and the host state it guards, behind one lock.

use quorum_types::{OperationFingerprint, Principal};
use std::sync::{Mutex, MutexGuard};

use crate::cancel::CancellationHandler;
use crate::context::CallContext;
use crate::engine::QuorumEngine;
use crate::events::QuorumEvent;
use crate::guard::{GuardOutcome, GuardedCall};
use crate::registry::Withdrawal;
use crate::QuorumError;

struct Inner<S> {
    engine: QuorumEngine,
    state: S,
}

/// Serialises every call against one engine and the host state `S`.
///
/// Each method holds the lock for its whole duration, so vote casting, quorum
/// evaluation and the guarded action form one indivisible step. Actions run
/// inside the critical section and must not block. When a guarded action
/// fails, `S` is restored from a clone taken before the call, together with
/// the engine's own rollback.
pub struct QuorumService<S> {
    inner: Mutex<Inner<S>>,
}

impl<S: Clone> QuorumService<S> {
    pub fn new(engine: QuorumEngine, state: S) -> Self {
        Self {
            inner: Mutex::new(Inner { engine, state }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<S>> {
        // A panic inside an action may leave the host state half-written.
        self.inner.lock().expect("quorum service lock poisoned")
    }

    pub fn subscribe(&self, listener: Box<dyn Fn(&QuorumEvent) + Send + Sync>) {
        self.lock().engine.subscribe(listener);
    }

    /// Vote with `caller` on `call`, running `action` against the host state
    /// once the quorum is met.
    pub fn execute<T, E, F>(
        &self,
        caller: &Principal,
        call: &GuardedCall,
        action: F,
    ) -> Result<GuardOutcome<T>, E>
    where
        E: From<QuorumError>,
        F: FnOnce(&mut QuorumEngine, &CallContext, &mut S) -> Result<T, E>,
    {
        let mut inner = self.lock();
        let Inner { engine, state } = &mut *inner;
        let snapshot = state.clone();
        let result = engine.guard(&CallContext::new(*caller), call, |engine, ctx| {
            action(engine, ctx, state)
        });
        if result.is_err() {
            *state = snapshot;
        }
        result
    }

    /// Read the engine and host state under the lock.
    pub fn read<R>(&self, f: impl FnOnce(&QuorumEngine, &S) -> R) -> R {
        let inner = self.lock();
        f(&inner.engine, &inner.state)
    }

    pub fn transfer_beneficiaries(
        &self,
        caller: &Principal,
        new_list: Vec<Principal>,
    ) -> Result<GuardOutcome<()>, QuorumError> {
        self.lock()
            .engine
            .transfer_beneficiaries(&CallContext::new(*caller), new_list)
    }

    pub fn transfer_beneficiaries_with_quorum(
        &self,
        caller: &Principal,
        new_list: Vec<Principal>,
        how_many: usize,
    ) -> Result<GuardOutcome<()>, QuorumError> {
        self.lock().engine.transfer_beneficiaries_with_quorum(
            &CallContext::new(*caller),
            new_list,
            how_many,
        )
    }

    pub fn cancel_pending(
        &self,
        caller: &Principal,
        fingerprint: &OperationFingerprint,
    ) -> Result<Withdrawal, QuorumError> {
        self.lock().engine.cancel_pending(caller, fingerprint)
    }

    pub fn is_beneficiary(&self, principal: &Principal) -> bool {
        self.lock().engine.is_beneficiary(principal)
    }

    pub fn beneficiaries_count(&self) -> usize {
        self.lock().engine.beneficiaries_count()
    }

    pub fn beneficiary_at(&self, index: usize) -> Result<Principal, QuorumError> {
        self.lock().engine.beneficiary_at(index)
    }

    pub fn beneficiaries(&self) -> Vec<Principal> {
        self.lock().engine.beneficiaries().to_vec()
    }

    pub fn generation(&self) -> u64 {
        self.lock().engine.generation()
    }

    pub fn pending_operations(&self) -> Vec<OperationFingerprint> {
        self.lock().engine.pending_operations().to_vec()
    }

    pub fn pending_operations_count(&self) -> usize {
        self.lock().engine.pending_operations_count()
    }

    pub fn pending_at(&self, index: usize) -> Result<OperationFingerprint, QuorumError> {
        self.lock().engine.pending_at(index)
    }

    /// A copy of the host state.
    pub fn state(&self) -> S {
        self.lock().state.clone()
    }
}
