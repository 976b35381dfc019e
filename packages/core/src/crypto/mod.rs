//! Криптографический модуль
//!
//! # Архитектура
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │              Roles (sender / receiver / adversary)          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                ┌─────────────┴─────────────┐
//!                ▼                           ▼
//! ┌───────────────────────────┐  ┌──────────────────────────┐
//! │  LongTermIdentity         │  │  Session                 │
//! │  - ключи подписи          │  │  - session key + IV      │
//! │  - ключи шифрования       │  │  - MAC key               │
//! │  - KeyStore (только load) │  │  - счётчик сообщений     │
//! └───────────────────────────┘  └──────────────────────────┘
//!                │                           │
//!                └─────────────┬─────────────┘
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │              CryptoProvider (Crypto-Agility)                │
//! │  - Public-key encryption (X25519 sealed box)                │
//! │  - Signatures (Ed25519)                                     │
//! │  - Block cipher (AES-128-CBC)                               │
//! │  - MAC (HMAC-SHA256)                                        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Модули
//!
//! - [`provider`]: CryptoProvider trait для crypto-agility
//! - [`suites`]: Реализации CryptoProvider
//! - [`keys`]: KeyStore и долгосрочные идентичности
//! - [`session`]: Сессионный ключевой материал

// ============================================================================
// Core Traits
// ============================================================================

/// CryptoProvider trait для crypto-agility
pub mod provider;

// ============================================================================
// Implementations
// ============================================================================

/// Crypto suites (Classic)
pub mod suites;

// ============================================================================
// Key material
// ============================================================================

/// Долгосрочные ключи участников
pub mod keys;

/// Ключи одного соединения
pub mod session;

pub use keys::{KeyKind, KeyStore, KeyStoreError, LongTermIdentity, PeerIdentity};
pub use provider::CryptoProvider;
pub use session::Session;
