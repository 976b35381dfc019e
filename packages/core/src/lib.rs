// Secure Channel Core
// Signed key transport, four message-protection modes and an on-path relay

#![warn(clippy::all)]
#![allow(clippy::too_many_arguments)]

// Модули
pub mod adversary;
pub mod cli;
pub mod config;
pub mod crypto;
pub mod error;
pub mod protocol;
pub mod roles;
pub mod utils;

// Re-exports для удобства
pub use config::Config;
pub use crypto::suites::classic::ClassicSuiteProvider;
pub use protocol::Mode;
pub use utils::error::{ChannelError, Result};
