// Key transport: передача симметричного ключа под подписью отправителя
//
// Сообщение = подписанное тело {Recipient, Timestamp, Encrypted Key}, где
// Encrypted Key — асимметрично зашифрованный {Sender, Session Key, IV?}.

use crate::crypto::CryptoProvider;
use crate::protocol::messages::{KeyPayload, KeyTransportBody, KeyTransportMessage};
use crate::protocol::validation::decode_base64_field;
use crate::utils::b64;
use crate::utils::error::Result;
use crate::utils::time::{age_ms, now_ms};
use thiserror::Error;

/// Причина отказа в доверии handshake-записи. Всегда фатальна для сессии.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrustFailure {
    #[error("signature does not verify under the sender's signing key")]
    SignatureInvalid,

    #[error("key is addressed to {found:?}, expected {expected:?}")]
    RecipientMismatch { expected: String, found: String },

    #[error("timestamp is {age_ms} ms old, freshness window is {window_ms} ms")]
    StaleTimestamp { age_ms: i64, window_ms: i64 },

    #[error("key payload names sender {found:?}, expected {expected:?}")]
    SenderMismatch { expected: String, found: String },

    #[error("key payload is malformed: {0}")]
    MalformedPayload(String),
}

/// Ключ, извлечённый из проверенного сообщения
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportedKey {
    pub key: Vec<u8>,
    pub iv: Option<Vec<u8>>,
}

/// Упаковать ключ для `recipient_name` с текущей меткой времени
pub fn transport_key<P: CryptoProvider>(
    key: &[u8],
    recipient_name: &str,
    recipient_public_encrypt: &[u8],
    own_private_sign: &[u8],
    own_name: &str,
    iv: Option<&[u8]>,
) -> Result<KeyTransportMessage> {
    transport_key_at::<P>(
        key,
        recipient_name,
        recipient_public_encrypt,
        own_private_sign,
        own_name,
        iv,
        now_ms(),
    )
}

/// То же, что [`transport_key`], но с явной меткой времени
pub fn transport_key_at<P: CryptoProvider>(
    key: &[u8],
    recipient_name: &str,
    recipient_public_encrypt: &[u8],
    own_private_sign: &[u8],
    own_name: &str,
    iv: Option<&[u8]>,
    timestamp_ms: i64,
) -> Result<KeyTransportMessage> {
    let payload = KeyPayload {
        sender: own_name.to_string(),
        key: b64::encode(key),
        iv: iv.map(b64::encode),
    };
    let encrypted = P::asym_encrypt(recipient_public_encrypt, &serde_json::to_vec(&payload)?)?;

    let body = KeyTransportBody {
        recipient: recipient_name.to_string(),
        timestamp: timestamp_ms,
        encrypted_key: b64::encode(&encrypted),
    };
    let signature = P::sign(own_private_sign, &serde_json::to_vec(&body)?)?;

    tracing::debug!(
        target: "protocol::key_transport",
        recipient = %recipient_name,
        timestamp = timestamp_ms,
        with_iv = iv.is_some(),
        encryption = P::ENCRYPTION_ALGORITHM,
        signature = P::SIGNATURE_ALGORITHM,
        "Key transport message built"
    );

    Ok(KeyTransportMessage {
        message: body,
        signature: b64::encode(&signature),
    })
}

/// Разобрать handshake-запись с провода
pub fn parse_key_transport(record: &str) -> std::result::Result<KeyTransportMessage, TrustFailure> {
    serde_json::from_str(record)
        .map_err(|e| TrustFailure::MalformedPayload(format!("not a key transport message: {}", e)))
}

/// Проверить key transport сообщение и извлечь ключ.
///
/// Порядок проверок: подпись, получатель, свежесть, расшифровка, отправитель.
/// Метка из будущего не отклоняется.
pub fn verify_key_transport<P: CryptoProvider>(
    msg: &KeyTransportMessage,
    expected_recipient: &str,
    expected_sender: &str,
    sender_public_sign: &[u8],
    own_private_decrypt: &[u8],
    freshness_window_ms: i64,
    now_ms: i64,
) -> std::result::Result<TransportedKey, TrustFailure> {
    let signature = b64::decode(&msg.signature).map_err(|_| TrustFailure::SignatureInvalid)?;
    let signed = serde_json::to_vec(&msg.message)
        .map_err(|e| TrustFailure::MalformedPayload(e.to_string()))?;
    P::verify(sender_public_sign, &signed, &signature).map_err(|_| TrustFailure::SignatureInvalid)?;

    if msg.message.recipient != expected_recipient {
        return Err(TrustFailure::RecipientMismatch {
            expected: expected_recipient.to_string(),
            found: msg.message.recipient.clone(),
        });
    }

    let age = age_ms(msg.message.timestamp, now_ms);
    if age > freshness_window_ms {
        return Err(TrustFailure::StaleTimestamp {
            age_ms: age,
            window_ms: freshness_window_ms,
        });
    }

    let encrypted = decode_base64_field("Encrypted Key", &msg.message.encrypted_key)
        .map_err(TrustFailure::MalformedPayload)?;
    let decrypted = P::asym_decrypt(own_private_decrypt, &encrypted)
        .map_err(|e| TrustFailure::MalformedPayload(e.to_string()))?;
    let payload: KeyPayload = serde_json::from_slice(&decrypted)
        .map_err(|e| TrustFailure::MalformedPayload(e.to_string()))?;

    if payload.sender != expected_sender {
        return Err(TrustFailure::SenderMismatch {
            expected: expected_sender.to_string(),
            found: payload.sender,
        });
    }

    let key = decode_base64_field("Session Key", &payload.key).map_err(TrustFailure::MalformedPayload)?;
    let iv = payload
        .iv
        .as_deref()
        .map(|iv| decode_base64_field("IV", iv))
        .transpose()
        .map_err(TrustFailure::MalformedPayload)?;

    tracing::debug!(
        target: "protocol::key_transport",
        sender = %expected_sender,
        age_ms = age,
        key_len = key.len(),
        with_iv = iv.is_some(),
        "Key transport message verified"
    );

    Ok(TransportedKey { key, iv })
}
