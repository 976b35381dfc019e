// Валидация входящих данных

use crate::utils::b64;

/// Декодировать Base64 поле; `field` попадает в текст ошибки
pub fn decode_base64_field(field: &str, encoded: &str) -> Result<Vec<u8>, String> {
    b64::decode(encoded).map_err(|e| format!("{} is not valid Base64: {}", field, e))
}

/// Валидация имени участника
///
/// Имя используется в имени файла ключа, поэтому разделители путей запрещены.
pub fn validate_party_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("Party name must not be empty".to_string());
    }

    if !name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
    {
        return Err(
            "Party name can only contain alphanumeric characters, underscores, and hyphens"
                .to_string(),
        );
    }

    Ok(())
}

/// Проверка длины ключевого материала
pub fn validate_key_len(field: &str, bytes: &[u8], expected: usize) -> Result<(), String> {
    if bytes.len() != expected {
        return Err(format!(
            "{} must be {} bytes, found {}",
            field,
            expected,
            bytes.len()
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_base64_field() {
        assert_eq!(decode_base64_field("IV", "SGVsbG8=").unwrap(), b"Hello");
        let err = decode_base64_field("IV", "not base64!").unwrap_err();
        assert!(err.starts_with("IV "));
    }

    #[test]
    fn test_validate_party_name() {
        assert!(validate_party_name("Alice").is_ok());
        assert!(validate_party_name("bob_2").is_ok());
        assert!(validate_party_name("").is_err());
        assert!(validate_party_name("../etc").is_err());
    }

    #[test]
    fn test_validate_key_len() {
        assert!(validate_key_len("IV", &[0u8; 16], 16).is_ok());
        let err = validate_key_len("IV", &[0u8; 8], 16).unwrap_err();
        assert!(err.contains("IV"));
    }
}
