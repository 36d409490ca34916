//! Call context: who is calling, and whether the call runs inside an approved action.

use quorum_types::{OperationFingerprint, Principal};

/// The approval an enclosing guarded call obtained before running its action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Approval {
    /// Fingerprint of the operation that reached its quorum.
    pub fingerprint: OperationFingerprint,
    /// Distinct votes it collected.
    pub votes: usize,
}

/// Identity of the caller plus the authorization state of the current call chain.
///
/// Hosts create a fresh context per external invocation with
/// [`CallContext::new`]. The engine hands an authorized copy to the action of
/// an operation that reached its quorum; guarded calls made with that copy
/// skip voting. The authorized form cannot be built outside this crate and
/// lives only as long as the action runs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallContext {
    caller: Principal,
    approval: Option<Approval>,
}

impl CallContext {
    pub fn new(caller: Principal) -> Self {
        Self {
            caller,
            approval: None,
        }
    }

    pub fn caller(&self) -> &Principal {
        &self.caller
    }

    /// The enclosing approval, if this call runs inside an authorized action.
    pub fn approval(&self) -> Option<&Approval> {
        self.approval.as_ref()
    }

    pub fn is_authorized(&self) -> bool {
        self.approval.is_some()
    }

    /// The context passed to the action of an operation that just reached quorum.
    ///
    /// A nested context keeps the outermost approval.
    pub(crate) fn authorize(&self, fingerprint: OperationFingerprint, votes: usize) -> Self {
        Self {
            caller: self.caller,
            approval: Some(self.approval.unwrap_or(Approval { fingerprint, votes })),
        }
    }
}
