// Управление долгосрочными ключами
// Загрузка ключевого материала участников из каталога ключей

use crate::crypto::CryptoProvider;
use crate::utils::b64;
use crate::utils::logging::fingerprint;
use std::fmt;
use std::marker::PhantomData;
use std::path::PathBuf;
use thiserror::Error;
use zeroize::Zeroizing;

/// Вид ключа в хранилище
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyKind {
    SignPublic,
    SignPrivate,
    EncryptPublic,
    EncryptPrivate,
}

impl KeyKind {
    /// Суффикс имени файла: `<name>.<suffix>.key`
    pub fn file_suffix(self) -> &'static str {
        match self {
            KeyKind::SignPublic => "sign-public",
            KeyKind::SignPrivate => "sign-private",
            KeyKind::EncryptPublic => "encrypt-public",
            KeyKind::EncryptPrivate => "encrypt-private",
        }
    }

    fn expected_len<P: CryptoProvider>(self) -> usize {
        match self {
            KeyKind::SignPublic => P::SIGNATURE_PUBLIC_KEY_LEN,
            KeyKind::SignPrivate => P::SIGNATURE_PRIVATE_KEY_LEN,
            KeyKind::EncryptPublic => P::ENCRYPTION_PUBLIC_KEY_LEN,
            KeyKind::EncryptPrivate => P::ENCRYPTION_PRIVATE_KEY_LEN,
        }
    }
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_suffix())
    }
}

#[derive(Error, Debug)]
pub enum KeyStoreError {
    #[error("Key file {path} is missing")]
    FileMissing { path: PathBuf },

    #[error("Key file {path} is malformed: {reason}")]
    FormatInvalid { path: PathBuf, reason: String },

    #[error("Failed to read key file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Хранилище ключей: один base64-файл на ключ.
///
/// Только чтение — генерация и запись файлов делаются внешними инструментами.
pub struct KeyStore<P: CryptoProvider> {
    dir: PathBuf,
    _phantom: PhantomData<P>,
}

impl<P: CryptoProvider> KeyStore<P> {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            _phantom: PhantomData,
        }
    }

    /// Путь к файлу ключа участника `name`
    pub fn path_for(&self, name: &str, kind: KeyKind) -> PathBuf {
        self.dir
            .join(format!("{}.{}.key", name.to_lowercase(), kind.file_suffix()))
    }

    /// Загрузить ключ. Проверяет base64 и длину для текущего suite.
    pub fn load(&self, name: &str, kind: KeyKind) -> Result<Vec<u8>, KeyStoreError> {
        let path = self.path_for(name, kind);
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(KeyStoreError::FileMissing { path });
            }
            Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                return Err(KeyStoreError::FormatInvalid {
                    path,
                    reason: "not UTF-8 text".to_string(),
                });
            }
            Err(source) => return Err(KeyStoreError::Io { path, source }),
        };

        let bytes = b64::decode(text.trim()).map_err(|e| KeyStoreError::FormatInvalid {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        let expected = kind.expected_len::<P>();
        if bytes.len() != expected {
            return Err(KeyStoreError::FormatInvalid {
                path,
                reason: format!("expected {} bytes, found {}", expected, bytes.len()),
            });
        }

        tracing::debug!(
            target: "crypto::keys",
            name = %name,
            kind = %kind,
            "Loaded key material"
        );
        Ok(bytes)
    }
}

/// Публичные ключи другого участника
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerIdentity {
    pub name: String,
    pub public_sign: Vec<u8>,
    pub public_encrypt: Vec<u8>,
}

impl PeerIdentity {
    pub fn load<P: CryptoProvider>(store: &KeyStore<P>, name: &str) -> Result<Self, KeyStoreError> {
        Ok(Self {
            name: name.to_string(),
            public_sign: store.load(name, KeyKind::SignPublic)?,
            public_encrypt: store.load(name, KeyKind::EncryptPublic)?,
        })
    }
}

/// Долгосрочная идентичность участника, включая приватные ключи.
///
/// Создаётся один раз при старте роли и дальше не меняется.
/// Приватные ключи обнуляются при drop.
#[derive(Clone)]
pub struct LongTermIdentity {
    pub name: String,
    pub public_sign: Vec<u8>,
    pub public_encrypt: Vec<u8>,
    private_sign: Zeroizing<Vec<u8>>,
    private_encrypt: Zeroizing<Vec<u8>>,
}

impl LongTermIdentity {
    pub fn from_parts(
        name: impl Into<String>,
        public_sign: Vec<u8>,
        private_sign: Vec<u8>,
        public_encrypt: Vec<u8>,
        private_encrypt: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            public_sign,
            public_encrypt,
            private_sign: Zeroizing::new(private_sign),
            private_encrypt: Zeroizing::new(private_encrypt),
        }
    }

    /// Загрузить все четыре ключа участника из хранилища
    pub fn load<P: CryptoProvider>(store: &KeyStore<P>, name: &str) -> Result<Self, KeyStoreError> {
        let identity = Self::from_parts(
            name,
            store.load(name, KeyKind::SignPublic)?,
            store.load(name, KeyKind::SignPrivate)?,
            store.load(name, KeyKind::EncryptPublic)?,
            store.load(name, KeyKind::EncryptPrivate)?,
        );

        tracing::info!(
            target: "crypto::keys",
            name = %identity.name,
            sign_fp = %fingerprint(&identity.public_sign),
            encrypt_fp = %fingerprint(&identity.public_encrypt),
            "Long-term identity loaded"
        );
        Ok(identity)
    }

    /// Сгенерировать новую идентичность в памяти (без записи на диск)
    pub fn generate<P: CryptoProvider>(name: impl Into<String>) -> Result<Self, crate::error::CryptoError> {
        let (private_sign, public_sign) = P::generate_signature_keys()?;
        let (private_encrypt, public_encrypt) = P::generate_encryption_keys()?;
        Ok(Self::from_parts(
            name,
            public_sign,
            private_sign,
            public_encrypt,
            private_encrypt,
        ))
    }

    pub fn private_sign(&self) -> &[u8] {
        &self.private_sign
    }

    pub fn private_encrypt(&self) -> &[u8] {
        &self.private_encrypt
    }

    /// Публичная часть для передачи другим участникам
    pub fn peer_view(&self) -> PeerIdentity {
        PeerIdentity {
            name: self.name.clone(),
            public_sign: self.public_sign.clone(),
            public_encrypt: self.public_encrypt.clone(),
        }
    }
}

impl fmt::Debug for LongTermIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LongTermIdentity")
            .field("name", &self.name)
            .field("public_sign", &fingerprint(&self.public_sign))
            .field("public_encrypt", &fingerprint(&self.public_encrypt))
            .finish_non_exhaustive()
    }
}
