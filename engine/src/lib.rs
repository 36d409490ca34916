//! Multi-party approval engine.
//!
//! State-changing operations are gated behind votes from a dynamic set of
//! beneficiaries. Each guarded call is fingerprinted by function and
//! arguments; votes accumulate per fingerprint until the call's quorum is met,
//! at which point its action runs exactly once.
//!
//! ## Module overview
//!
//! - [`policy`]: Quorum kinds (any / many / all / some-k) and required vote counts.
//! - [`beneficiaries`]: The ordered, duplicate-free beneficiary set and list validation.
//! - [`registry`]: Pending operations with insertion-ordered fingerprints.
//! - [`context`]: Caller identity and nested-authorization state.
//! - [`guard`]: Vote casting, quorum evaluation and action execution.
//! - [`cancel`]: Withdrawing one's own vote.
//! - [`engine`]: The owning state object, beneficiary transfer and rollback.
//! - [`service`]: Mutex-protected host surface.
//! - [`events`]: Engine events and the synchronous event bus.
//! - [`config`]: TOML configuration.
//! - [`error`]: Error types.

pub mod beneficiaries;
pub mod cancel;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod events;
pub mod guard;
pub mod policy;
pub mod registry;
pub mod service;

pub use beneficiaries::{BeneficiarySet, MAX_BENEFICIARIES};
pub use cancel::CancellationHandler;
pub use config::EngineConfig;
pub use context::{Approval, CallContext};
pub use engine::{QuorumEngine, TRANSFER_BENEFICIARIES, TRANSFER_BENEFICIARIES_WITH_QUORUM};
pub use error::{QuorumError, ValidationError};
pub use events::{EventBus, QuorumEvent};
pub use guard::{GuardOutcome, GuardedCall};
pub use policy::QuorumKind;
pub use registry::{OperationRegistry, PendingOperation, Withdrawal};
pub use service::QuorumService;

pub use quorum_types::{OperationFingerprint, Principal};
