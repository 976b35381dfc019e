// Логирование

use tracing_subscriber::EnvFilter;

/// Устанавливает глобальный subscriber для исполняемых файлов.
///
/// Диагностика идёт в stderr, чтобы не смешиваться с выводом сообщений и
/// консолью атакующего в stdout. `RUST_LOG` имеет приоритет над `default_filter`.
pub fn init(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    // Повторная инициализация (например, в тестах) просто игнорируется
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}

/// Короткий отпечаток ключа для логов (первые 8 байт SHA-256 в hex).
pub fn fingerprint(key: &[u8]) -> String {
    use sha2::{Digest, Sha256};

    let digest = Sha256::digest(key);
    hex::encode(&digest[..8])
}
