// Сессионный ключевой материал
// Создаётся отправителем на каждое соединение и передаётся получателю через key transport

use crate::crypto::CryptoProvider;
use crate::error::CryptoError;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Симметричный материал одного соединения.
///
/// Никогда не переиспользуется между соединениями; обнуляется при drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Session {
    session_key: Vec<u8>,
    iv: Vec<u8>,
    mac_key: Vec<u8>,
    /// Номер последнего отправленного сообщения
    sequence: i64,
    /// Идентификатор только для корреляции логов
    #[zeroize(skip)]
    id: String,
}

impl Session {
    /// Сгенерировать свежую сессию (сторона отправителя)
    pub fn generate<P: CryptoProvider>() -> Result<Self, CryptoError> {
        Ok(Self::from_parts(
            P::generate_secret(P::SESSION_KEY_LEN)?,
            P::generate_secret(P::IV_LEN)?,
            P::generate_secret(P::MAC_KEY_LEN)?,
        ))
    }

    /// Собрать сессию из материала, полученного через key transport
    pub fn from_parts(session_key: Vec<u8>, iv: Vec<u8>, mac_key: Vec<u8>) -> Self {
        Self {
            session_key,
            iv,
            mac_key,
            sequence: 0,
            id: uuid::Uuid::new_v4().to_string(),
        }
    }

    pub fn session_key(&self) -> &[u8] {
        &self.session_key
    }

    pub fn iv(&self) -> &[u8] {
        &self.iv
    }

    pub fn mac_key(&self) -> &[u8] {
        &self.mac_key
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Выдать следующий номер сообщения: 1, 2, 3, ...
    pub fn next_sequence(&mut self) -> i64 {
        self.sequence += 1;
        self.sequence
    }

    pub fn last_sequence(&self) -> i64 {
        self.sequence
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("sequence", &self.sequence)
            .finish_non_exhaustive()
    }
}
