//! Централизованная конфигурация канала
//!
//! Все константы и настройки ролей определены здесь, чтобы избежать хардкода
//! по всему проекту. Конфигурация — обычное значение: создаётся один раз при
//! старте и передаётся в каждую роль явно.

use crate::protocol::validation::validate_party_name;
use std::path::PathBuf;

/// Основная структура конфигурации
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    // ============================================
    // УЧАСТНИКИ
    // ============================================

    /// Имя отправителя (проверяется в поле "Sender" key transport)
    pub sender_name: String,

    /// Имя получателя (проверяется в поле "Recipient" key transport)
    pub receiver_name: String,

    // ============================================
    // KEY TRANSPORT
    // ============================================

    /// Максимальный возраст подписанной метки времени (в миллисекундах)
    /// По умолчанию: 1 минута
    pub freshness_window_ms: i64,

    /// Количество handshake-записей в начале соединения
    /// (session key + MAC key), которые атакующий пропускает без консоли
    pub handshake_records: usize,

    // ============================================
    // СЕТЕВЫЕ ПАРАМЕТРЫ
    // ============================================

    /// Хост по умолчанию для исходящих соединений
    pub default_host: String,

    /// Порт, на который по умолчанию подключается отправитель
    pub sender_port: u16,

    /// Порт, который по умолчанию слушает получатель
    pub receiver_port: u16,

    /// Порт, который по умолчанию слушает атакующий (ждёт отправителя)
    pub relay_listen_port: u16,

    /// Порт получателя, к которому по умолчанию подключается атакующий
    pub relay_target_port: u16,

    // ============================================
    // ПРОЧЕЕ
    // ============================================

    /// Команда завершения, вводимая в stdin любой роли
    pub quit_token: String,

    /// Каталог с файлами долгосрочных ключей
    pub keys_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sender_name: "Alice".to_string(),
            receiver_name: "Bob".to_string(),

            freshness_window_ms: 60_000, // 1 minute
            handshake_records: 2,

            default_host: "127.0.0.1".to_string(),
            sender_port: 4000,
            receiver_port: 4001,
            relay_listen_port: 4000,
            relay_target_port: 4001,

            quit_token: "quit".to_string(),
            keys_dir: PathBuf::from("."),
        }
    }
}

impl Config {
    /// Создать конфигурацию из переменных окружения
    ///
    /// Нераспознанные значения игнорируются, остаются значения по умолчанию.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// То же, что [`Config::from_env`], но с произвольным источником значений.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(val) = lookup("CHANNEL_SENDER_NAME") {
            if validate_party_name(val.trim()).is_ok() {
                config.sender_name = val.trim().to_string();
            }
        }

        if let Some(val) = lookup("CHANNEL_RECEIVER_NAME") {
            if validate_party_name(val.trim()).is_ok() {
                config.receiver_name = val.trim().to_string();
            }
        }

        if let Some(val) = lookup("CHANNEL_FRESHNESS_WINDOW_MS") {
            if let Ok(parsed) = val.trim().parse::<i64>() {
                if parsed >= 0 {
                    config.freshness_window_ms = parsed;
                }
            }
        }

        if let Some(val) = lookup("CHANNEL_KEYS_DIR") {
            if !val.trim().is_empty() {
                config.keys_dir = PathBuf::from(val.trim());
            }
        }

        if let Some(val) = lookup("CHANNEL_QUIT_TOKEN") {
            if !val.trim().is_empty() {
                config.quit_token = val.trim().to_string();
            }
        }

        config
    }
}
