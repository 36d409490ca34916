//! Error type for parsing and constructing fundamental types.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypesError {
    #[error("invalid principal: {0}")]
    InvalidPrincipal(String),

    #[error("invalid fingerprint: {0}")]
    InvalidFingerprint(String),
}
