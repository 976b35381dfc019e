// Время

/// Текущее время в миллисекундах Unix epoch.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Возраст метки времени относительно `now_ms`.
///
/// Отрицательное значение означает метку из будущего.
pub fn age_ms(timestamp_ms: i64, now_ms: i64) -> i64 {
    now_ms.saturating_sub(timestamp_ms)
}
