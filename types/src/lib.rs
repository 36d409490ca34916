//! Fundamental types for the quorum engine.
//!
//! This crate defines the identities shared by every other crate in the workspace:
//! the [`Principal`] that casts votes and the [`OperationFingerprint`] that names
//! one guarded call.

pub mod error;
pub mod fingerprint;
pub mod principal;

pub use error::TypesError;
pub use fingerprint::OperationFingerprint;
pub use principal::Principal;
