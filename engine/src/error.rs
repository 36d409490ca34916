use quorum_types::{OperationFingerprint, Principal};
use thiserror::Error;

/// Why a proposed beneficiary list was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("beneficiary list is empty")]
    Empty,

    #[error("beneficiary list has {count} entries, at most {max} allowed")]
    TooMany { count: usize, max: usize },

    #[error("zero principal at position {index}")]
    ZeroPrincipal { index: usize },

    #[error("principal {principal} appears more than once")]
    Duplicate { principal: Principal },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuorumError {
    #[error("invalid beneficiary list: {0}")]
    Validation(#[from] ValidationError),

    #[error("{0} is not a beneficiary")]
    Unauthorized(Principal),

    #[error("{voter} has already voted on operation {fingerprint}")]
    DuplicateVote {
        voter: Principal,
        fingerprint: OperationFingerprint,
    },

    #[error("quorum of {required} is invalid for {beneficiaries} beneficiaries")]
    QuorumConfig { required: usize, beneficiaries: usize },

    #[error("nested call needs {required} votes, enclosing approval collected {approved}")]
    InsufficientApproval { required: usize, approved: usize },

    #[error("beneficiary index {index} out of range ({count} beneficiaries)")]
    BeneficiaryNotFound { index: usize, count: usize },

    #[error("pending operation index {index} out of range ({count} pending)")]
    PendingNotFound { index: usize, count: usize },

    #[error("{voter} has no vote on operation {fingerprint}")]
    VoteNotFound {
        voter: Principal,
        fingerprint: OperationFingerprint,
    },

    #[error("failed to encode operation arguments: {0}")]
    Encoding(String),

    #[error("config error: {0}")]
    Config(String),
}

impl From<quorum_crypto::CryptoError> for QuorumError {
    fn from(e: quorum_crypto::CryptoError) -> Self {
        match e {
            quorum_crypto::CryptoError::Encoding(msg) => Self::Encoding(msg),
        }
    }
}
