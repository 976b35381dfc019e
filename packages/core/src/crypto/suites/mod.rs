//! Криптографические наборы (Crypto Suites)
//!
//! Этот модуль содержит реализации CryptoProvider trait.
//!
//! ## Доступные наборы
//!
//! ### Classic Suite (текущий)
//! - **Public-key encryption**: X25519 sealed box (HKDF-SHA256 + ChaCha20-Poly1305)
//! - **Signatures**: Ed25519
//! - **Block cipher**: AES-128-CBC / PKCS#7
//! - **MAC**: HMAC-SHA256
//!
//! ## Выбор suite
//!
//! ```rust
//! use secure_channel_core::crypto::suites::classic::ClassicSuiteProvider;
//! use secure_channel_core::crypto::provider::CryptoProvider;
//!
//! // Classic suite для текущего использования
//! type MySuite = ClassicSuiteProvider;
//!
//! // Генерация ключей
//! let (private_key, public_key) = MySuite::generate_encryption_keys().unwrap();
//! assert_eq!(public_key.len(), MySuite::ENCRYPTION_PUBLIC_KEY_LEN);
//! # let _ = private_key;
//! ```

pub mod classic;
