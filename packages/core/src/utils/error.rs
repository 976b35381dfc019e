// Типы ошибок канала

use crate::crypto::keys::KeyStoreError;
use crate::error::CryptoError;
use crate::protocol::key_transport::TrustFailure;
use thiserror::Error;

/// Ошибки, которые прерывают роль целиком.
///
/// Предупреждения по отдельным сообщениям (`TamperingSuspected`,
/// `OrderingAnomaly`) сюда не попадают: они не останавливают цикл приёма.
#[derive(Error, Debug)]
pub enum ChannelError {
    #[error("Handshake rejected: {0}")]
    Trust(#[from] TrustFailure),

    #[error("Cryptography error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Key material unavailable: {0}")]
    KeyStore(#[from] KeyStoreError),

    #[error("Transport error: {0}")]
    Transport(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Record of {0} bytes exceeds the framing limit")]
    RecordTooLarge(usize),

    #[error("Record is not valid UTF-8")]
    InvalidRecordEncoding,

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ChannelError {
    /// Ошибка доверия к handshake (подпись, получатель, отправитель, свежесть).
    pub fn is_trust_failure(&self) -> bool {
        matches!(self, ChannelError::Trust(_))
    }

    /// Соединение потеряно или сломано.
    pub fn is_transport_failure(&self) -> bool {
        matches!(
            self,
            ChannelError::Transport(_) | ChannelError::InvalidRecordEncoding
        )
    }
}

pub type Result<T> = std::result::Result<T, ChannelError>;
