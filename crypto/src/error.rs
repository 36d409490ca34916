use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("failed to encode operation arguments: {0}")]
    Encoding(String),
}

impl From<bincode::Error> for CryptoError {
    fn from(e: bincode::Error) -> Self {
        Self::Encoding(e.to_string())
    }
}
