// Режимы защиты сообщений
// Разбор и отображение вынесены в свободные функции, сам enum — только данные

/// Режим защиты прикладных сообщений
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    /// Без защиты
    #[default]
    Plaintext,
    /// Только конфиденциальность
    Encrypt,
    /// Только целостность, текст остаётся видимым
    Auth,
    /// Encrypt-then-MAC: MAC над шифртекстом
    EncryptThenAuth,
}

impl Mode {
    pub const ALL: [Mode; 4] = [
        Mode::Plaintext,
        Mode::Encrypt,
        Mode::Auth,
        Mode::EncryptThenAuth,
    ];
}

/// Разобрать режим из аргумента командной строки.
///
/// Регистр не важен; всё нераспознанное означает plaintext.
pub fn mode_from_string(s: &str) -> Mode {
    match s.trim().to_uppercase().as_str() {
        "ENCRYPTION" | "ENC" => Mode::Encrypt,
        "MAC" => Mode::Auth,
        "MACENCRYPTION" | "MACENC" | "MAC_ENCRYPTION" | "MAC_ENC" | "ENCRYPTION THEN MAC" => {
            Mode::EncryptThenAuth
        }
        _ => Mode::Plaintext,
    }
}

/// Человекочитаемое имя режима
pub fn mode_display(mode: Mode) -> &'static str {
    match mode {
        Mode::Plaintext => "plaintext",
        Mode::Encrypt => "encryption",
        Mode::Auth => "MAC",
        Mode::EncryptThenAuth => "encryption then MAC",
    }
}
