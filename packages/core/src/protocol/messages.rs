// Типы сообщений протокола
// Имена полей JSON фиксированы: их видит и редактирует атакующий

use serde::{Deserialize, Serialize};

// ============================================================================
// Key transport
// ============================================================================

/// Подписываемая часть key transport сообщения
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyTransportBody {
    /// Имя получателя, для которого предназначен ключ
    #[serde(rename = "Recipient")]
    pub recipient: String,
    /// Unix timestamp в миллисекундах
    #[serde(rename = "Timestamp")]
    pub timestamp: i64,
    /// Base64 зашифрованного [`KeyPayload`]
    #[serde(rename = "Encrypted Key")]
    pub encrypted_key: String,
}

/// Handshake-запись: тело плюс подпись над его сериализацией
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyTransportMessage {
    #[serde(rename = "Message")]
    pub message: KeyTransportBody,
    /// Base64 подписи над `serialize(message)`
    #[serde(rename = "Signature")]
    pub signature: String,
}

/// Содержимое поля "Encrypted Key" после расшифровки
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPayload {
    #[serde(rename = "Sender")]
    pub sender: String,
    /// Base64 транспортируемого ключа
    #[serde(rename = "Session Key")]
    pub key: String,
    /// Base64 IV; отсутствует у MAC-ключа
    #[serde(rename = "IV", default, skip_serializing_if = "Option::is_none")]
    pub iv: Option<String>,
}

// ============================================================================
// Прикладные сообщения
// ============================================================================

/// Нумерованное сообщение (plaintext-форма в любом режиме)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberedMessage {
    #[serde(rename = "Message Number")]
    pub sequence: i64,
    #[serde(rename = "Message")]
    pub text: String,
}

/// Конверт режима MAC
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthEnvelope {
    #[serde(rename = "Numbered Message")]
    pub numbered: NumberedMessage,
    /// Base64 MAC над `serialize(numbered)`
    #[serde(rename = "MAC")]
    pub tag: String,
}

/// Конверт режима encrypt-then-MAC
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptThenAuthEnvelope {
    /// Base64 шифртекста
    #[serde(rename = "Encrypted Message")]
    pub ciphertext: String,
    /// Base64 MAC над base64-строкой шифртекста
    #[serde(rename = "MAC")]
    pub tag: String,
}
