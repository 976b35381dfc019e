// Отображение и пересборка перехваченных записей по режиму
// Атакующий не знает ключей: видит только то, что лежит на проводе

use crate::protocol::messages::{AuthEnvelope, EncryptThenAuthEnvelope, NumberedMessage};
use crate::protocol::mode::Mode;

/// Редактируемые поля записи
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fields {
    Plaintext {
        number: i64,
        text: String,
    },
    /// Режим Encrypt: запись целиком — base64 шифртекста
    Encrypted {
        ciphertext: String,
    },
    Auth {
        number: i64,
        text: String,
        tag: String,
    },
    EncryptThenAuth {
        ciphertext: String,
        tag: String,
    },
    /// Запись не соответствует форме режима
    Raw(String),
}

/// Один шаг редактирования
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    Number(i64),
    Message(String),
    Tag(String),
    Record(String),
}

impl Prompt {
    pub fn text(&self) -> String {
        match self {
            Prompt::Number(old) => format!(
                "\nEnter a new message number. The old message number is: {}",
                old
            ),
            Prompt::Message(old) => format!("\nEnter a new message. The old message is: {}", old),
            Prompt::Tag(old) => format!("\nEnter a new tag. The old tag is: {}", old),
            Prompt::Record(old) => format!("\nEnter a replacement record. The old record is: {}", old),
        }
    }

    pub fn wants_number(&self) -> bool {
        matches!(self, Prompt::Number(_))
    }
}

/// Ответ на [`Prompt`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Number(i64),
    Text(String),
}

/// Разобрать запись согласно режиму
pub fn parse_fields(mode: Mode, raw: &str) -> Fields {
    let parsed = match mode {
        Mode::Plaintext => serde_json::from_str::<NumberedMessage>(raw)
            .ok()
            .map(|m| Fields::Plaintext {
                number: m.sequence,
                text: m.text,
            }),
        Mode::Encrypt => Some(Fields::Encrypted {
            ciphertext: raw.to_string(),
        }),
        Mode::Auth => serde_json::from_str::<AuthEnvelope>(raw)
            .ok()
            .map(|e| Fields::Auth {
                number: e.numbered.sequence,
                text: e.numbered.text,
                tag: e.tag,
            }),
        Mode::EncryptThenAuth => serde_json::from_str::<EncryptThenAuthEnvelope>(raw)
            .ok()
            .map(|e| Fields::EncryptThenAuth {
                ciphertext: e.ciphertext,
                tag: e.tag,
            }),
    };
    parsed.unwrap_or_else(|| Fields::Raw(raw.to_string()))
}

/// Текст для консоли
pub fn render(fields: &Fields) -> String {
    match fields {
        Fields::Plaintext { number, text } => {
            format!("Message Number: {}\n\nMessage: {}\n", number, text)
        }
        Fields::Encrypted { ciphertext } => format!("Encrypted Message: {}\n", ciphertext),
        Fields::Auth { number, text, tag } => format!(
            "Message Number: {}\n\nMessage: {}\n\nTag: {}\n",
            number, text, tag
        ),
        Fields::EncryptThenAuth { ciphertext, tag } => {
            format!("Encrypted Message: {}\n\nTag: {}\n", ciphertext, tag)
        }
        Fields::Raw(raw) => format!("Unrecognized record: {}\n", raw),
    }
}

/// Вопросы для команды modify, по порядку
pub fn prompts(fields: &Fields) -> Vec<Prompt> {
    match fields {
        Fields::Plaintext { number, text } => {
            vec![Prompt::Number(*number), Prompt::Message(text.clone())]
        }
        Fields::Encrypted { ciphertext } => vec![Prompt::Message(ciphertext.clone())],
        Fields::Auth { number, text, tag } => vec![
            Prompt::Number(*number),
            Prompt::Message(text.clone()),
            Prompt::Tag(tag.clone()),
        ],
        Fields::EncryptThenAuth { ciphertext, tag } => {
            vec![Prompt::Message(ciphertext.clone()), Prompt::Tag(tag.clone())]
        }
        Fields::Raw(raw) => vec![Prompt::Record(raw.clone())],
    }
}

/// Собрать новую запись из ответов на [`prompts`].
///
/// `None`, если ответы не подходят к форме записи.
pub fn rebuild(fields: &Fields, answers: &[Answer]) -> Option<String> {
    match (fields, answers) {
        (Fields::Plaintext { .. }, [Answer::Number(number), Answer::Text(text)]) => {
            serde_json::to_string(&NumberedMessage {
                sequence: *number,
                text: text.clone(),
            })
            .ok()
        }
        (Fields::Encrypted { .. }, [Answer::Text(ciphertext)]) => Some(ciphertext.clone()),
        (Fields::Auth { .. }, [Answer::Number(number), Answer::Text(text), Answer::Text(tag)]) => {
            serde_json::to_string(&AuthEnvelope {
                numbered: NumberedMessage {
                    sequence: *number,
                    text: text.clone(),
                },
                tag: tag.clone(),
            })
            .ok()
        }
        (Fields::EncryptThenAuth { .. }, [Answer::Text(ciphertext), Answer::Text(tag)]) => {
            serde_json::to_string(&EncryptThenAuthEnvelope {
                ciphertext: ciphertext.clone(),
                tag: tag.clone(),
            })
            .ok()
        }
        (Fields::Raw(_), [Answer::Text(raw)]) => Some(raw.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_record_renders_tag() {
        let raw = r#"{"Numbered Message":{"Message Number":2,"Message":"hi"},"MAC":"dGFn"}"#;
        let fields = parse_fields(Mode::Auth, raw);
        assert_eq!(
            render(&fields),
            "Message Number: 2\n\nMessage: hi\n\nTag: dGFn\n"
        );
    }

    #[test]
    fn test_wrong_shape_falls_back_to_raw() {
        let fields = parse_fields(Mode::EncryptThenAuth, r#"{"Message Number":1,"Message":"x"}"#);
        assert!(matches!(fields, Fields::Raw(_)));
        assert_eq!(prompts(&fields).len(), 1);
    }

    #[test]
    fn test_rebuild_plaintext() {
        let fields = parse_fields(Mode::Plaintext, r#"{"Message Number":1,"Message":"x"}"#);
        let prompts = prompts(&fields);
        assert!(prompts[0].wants_number());

        let rebuilt = rebuild(
            &fields,
            &[Answer::Number(-5), Answer::Text("evil".to_string())],
        )
        .unwrap();
        assert_eq!(rebuilt, r#"{"Message Number":-5,"Message":"evil"}"#);
    }

    #[test]
    fn test_rebuild_rejects_mismatched_answers() {
        let fields = Fields::Encrypted {
            ciphertext: "AAAA".to_string(),
        };
        assert_eq!(rebuild(&fields, &[Answer::Number(1)]), None);
    }
}
