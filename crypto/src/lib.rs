//! Cryptographic primitives for the quorum engine.
//!
//! - **Blake2b-256** for hashing
//! - Deterministic operation fingerprints: one digest per (function, argument tuple)

pub mod error;
pub mod fingerprint;
pub mod hash;

pub use error::CryptoError;
pub use fingerprint::{operation_fingerprint, FINGERPRINT_DOMAIN};
pub use hash::{blake2b_256, blake2b_256_multi};
