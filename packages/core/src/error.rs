use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("Failed to generate keys: {0}")]
    KeyGenerationError(String),
    #[error("Signing failed: {0}")]
    SigningError(String),
    #[error("Signature verification failed: {0}")]
    SignatureVerificationError(String),
    #[error("Public-key encryption failed: {0}")]
    SealError(String),
    #[error("Public-key decryption failed: {0}")]
    OpenError(String),
    #[error("Block cipher encryption failed: {0}")]
    CipherEncryptionError(String),
    #[error("Block cipher decryption failed: {0}")]
    CipherDecryptionError(String),
    #[error("MAC computation failed: {0}")]
    MacError(String),
    #[error("MAC verification failed")]
    MacMismatch,
    #[error("Key derivation failed: {0}")]
    KeyDerivationError(String),
    #[error("Invalid input: {0}")]
    InvalidInputError(String),
}

impl From<chacha20poly1305::Error> for CryptoError {
    fn from(err: chacha20poly1305::Error) -> Self {
        CryptoError::OpenError(err.to_string())
    }
}

impl From<rand::Error> for CryptoError {
    fn from(err: rand::Error) -> Self {
        CryptoError::KeyGenerationError(err.to_string()) // General RNG error
    }
}
