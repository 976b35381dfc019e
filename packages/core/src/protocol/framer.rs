// Упаковка прикладных сообщений по режиму защиты
//
// Plaintext:        {"Message Number", "Message"}
// Encrypt:          base64(E(plaintext JSON))
// Auth:             {"Numbered Message": <plaintext JSON>, "MAC": base64}
// EncryptThenAuth:  {"Encrypted Message": base64, "MAC": base64(MAC(base64 ct))}

use crate::crypto::session::Session;
use crate::crypto::CryptoProvider;
use crate::protocol::messages::{AuthEnvelope, EncryptThenAuthEnvelope, NumberedMessage};
use crate::protocol::mode::Mode;
use crate::utils::b64;
use crate::utils::error::Result;
use thiserror::Error;

/// Признаки вмешательства в сообщение. Не фатальны: цикл приёма продолжается.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TamperingSuspected {
    #[error("MAC does not match, the message may have been modified")]
    MacMismatch,

    #[error("{0} is not valid Base64")]
    InvalidBase64(&'static str),

    #[error("decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("record does not match the expected message format: {0}")]
    MalformedEnvelope(String),

    #[error("decrypted message is not valid UTF-8")]
    InvalidPlaintext,
}

impl TamperingSuspected {
    /// Сообщение с таким признаком не доставляется
    pub fn drops_message(&self) -> bool {
        !matches!(self, TamperingSuspected::MacMismatch)
    }
}

/// Результат разбора записи
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Decoded {
    /// `None`, если сообщение пришлось отбросить
    pub message: Option<NumberedMessage>,
    pub warnings: Vec<TamperingSuspected>,
}

impl Decoded {
    fn dropped(warning: TamperingSuspected) -> Self {
        Self {
            message: None,
            warnings: vec![warning],
        }
    }
}

/// Упаковать сообщение `seq` в запись для режима `mode`
pub fn encode<P: CryptoProvider>(mode: Mode, seq: i64, text: &str, session: &Session) -> Result<String> {
    let numbered = NumberedMessage {
        sequence: seq,
        text: text.to_string(),
    };
    let plaintext = serde_json::to_string(&numbered)?;

    let record = match mode {
        Mode::Plaintext => plaintext,
        Mode::Encrypt => encrypt_b64::<P>(plaintext.as_bytes(), session)?,
        Mode::Auth => {
            let tag = P::mac(session.mac_key(), plaintext.as_bytes())?;
            serde_json::to_string(&AuthEnvelope {
                numbered,
                tag: b64::encode(&tag),
            })?
        }
        Mode::EncryptThenAuth => {
            let ciphertext = encrypt_b64::<P>(plaintext.as_bytes(), session)?;
            let tag = P::mac(session.mac_key(), ciphertext.as_bytes())?;
            serde_json::to_string(&EncryptThenAuthEnvelope {
                ciphertext,
                tag: b64::encode(&tag),
            })?
        }
    };

    tracing::trace!(
        target: "protocol::framer",
        session_id = %session.id(),
        seq = seq,
        record_len = record.len(),
        "Message encoded"
    );
    Ok(record)
}

/// Разобрать запись. Никогда не паникует и не возвращает ошибку:
/// все проблемы выражаются через [`TamperingSuspected`].
pub fn decode<P: CryptoProvider>(mode: Mode, record: &str, session: &Session) -> Decoded {
    match mode {
        Mode::Plaintext => parse_numbered(record.as_bytes()),
        Mode::Encrypt => decrypt_numbered::<P>(record, session),
        Mode::Auth => {
            let envelope: AuthEnvelope = match serde_json::from_str(record) {
                Ok(envelope) => envelope,
                Err(e) => return Decoded::dropped(TamperingSuspected::MalformedEnvelope(e.to_string())),
            };
            let mut warnings = Vec::new();
            // Тег считается над повторной сериализацией вложенного сообщения
            match serde_json::to_vec(&envelope.numbered) {
                Ok(tagged) if tag_matches::<P>(session, &tagged, &envelope.tag) => {}
                _ => warnings.push(TamperingSuspected::MacMismatch),
            }
            Decoded {
                message: Some(envelope.numbered),
                warnings,
            }
        }
        Mode::EncryptThenAuth => {
            let envelope: EncryptThenAuthEnvelope = match serde_json::from_str(record) {
                Ok(envelope) => envelope,
                Err(e) => return Decoded::dropped(TamperingSuspected::MalformedEnvelope(e.to_string())),
            };
            let mac_ok = tag_matches::<P>(session, envelope.ciphertext.as_bytes(), &envelope.tag);
            let mut decoded = decrypt_numbered::<P>(&envelope.ciphertext, session);
            if !mac_ok {
                decoded.warnings.insert(0, TamperingSuspected::MacMismatch);
            }
            decoded
        }
    }
}

fn encrypt_b64<P: CryptoProvider>(plaintext: &[u8], session: &Session) -> Result<String> {
    let ciphertext = P::sym_encrypt(session.session_key(), session.iv(), plaintext)?;
    Ok(b64::encode(&ciphertext))
}

fn decrypt_numbered<P: CryptoProvider>(ciphertext_b64: &str, session: &Session) -> Decoded {
    let ciphertext = match b64::decode(ciphertext_b64.trim()) {
        Ok(bytes) => bytes,
        Err(_) => return Decoded::dropped(TamperingSuspected::InvalidBase64("ciphertext")),
    };
    let plaintext = match P::sym_decrypt(session.session_key(), session.iv(), &ciphertext) {
        Ok(bytes) => bytes,
        Err(e) => return Decoded::dropped(TamperingSuspected::DecryptionFailed(e.to_string())),
    };
    if std::str::from_utf8(&plaintext).is_err() {
        return Decoded::dropped(TamperingSuspected::InvalidPlaintext);
    }
    parse_numbered(&plaintext)
}

fn parse_numbered(bytes: &[u8]) -> Decoded {
    match serde_json::from_slice::<NumberedMessage>(bytes) {
        Ok(message) => Decoded {
            message: Some(message),
            warnings: Vec::new(),
        },
        Err(e) => Decoded::dropped(TamperingSuspected::MalformedEnvelope(e.to_string())),
    }
}

/// Нераскодируемый тег не может совпасть, это тоже MacMismatch
fn tag_matches<P: CryptoProvider>(session: &Session, message: &[u8], tag_b64: &str) -> bool {
    match b64::decode(tag_b64) {
        Ok(tag) => P::verify_mac(session.mac_key(), message, &tag).is_ok(),
        Err(_) => false,
    }
}
