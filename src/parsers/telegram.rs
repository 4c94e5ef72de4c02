//! Telegram API message parser.

use serde_json::Value;
use tracing::{debug, warn};

use crate::config::TelegramConfig;
use crate::error::{ChatstatError, RecordError};
use crate::parser::{ParseOutcome, Parser, Platform};
use crate::parsing::telegram::{ApiMessage, FORMAT, convert_message};

/// Parser for Telegram API message objects.
///
/// Accepts either already-deserialized [`ApiMessage`]s
/// ([`parse_records`](Self::parse_records)) or their JSON form:
/// ```json
/// [
///   {
///     "id": 12345,
///     "date": 1705314600,
///     "from_id": 99990,
///     "sender_name": "Kate",
///     "message": "Hello",
///     "media": {"type": "document", "mime_type": "audio/ogg", "voice": true},
///     "forwarded": false
///   }
/// ]
/// ```
/// An object with a `messages` array is accepted as well. Output keeps the
/// source order (the API returns newest first).
pub struct TelegramParser {
    config: TelegramConfig,
}

impl TelegramParser {
    /// Creates a new parser with default configuration.
    pub fn new() -> Self {
        Self {
            config: TelegramConfig::default(),
        }
    }

    /// Creates a parser with custom configuration.
    pub fn with_config(config: TelegramConfig) -> Self {
        Self { config }
    }

    /// Returns the current configuration.
    pub fn config(&self) -> &TelegramConfig {
        &self.config
    }

    /// Converts in-memory API objects.
    ///
    /// Records without a usable date or author are skipped and reported;
    /// service records are dropped silently.
    pub fn parse_records(&self, records: &[ApiMessage]) -> ParseOutcome {
        let mut outcome = ParseOutcome::default();
        for (i, record) in records.iter().enumerate() {
            match convert_message(record, &self.config, i + 1) {
                Ok(Some(msg)) => outcome.messages.push(msg),
                Ok(None) => {}
                Err(err) => outcome.skipped.push(err),
            }
        }
        self.report(&outcome);
        outcome
    }

    fn report(&self, outcome: &ParseOutcome) {
        if !outcome.skipped.is_empty() {
            warn!(
                format = FORMAT,
                skipped = outcome.skipped.len(),
                "skipped invalid records"
            );
        }
        debug!(format = FORMAT, messages = outcome.messages.len(), "parsed batch");
    }
}

impl Default for TelegramParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for TelegramParser {
    fn name(&self) -> &'static str {
        "Telegram"
    }

    fn platform(&self) -> Platform {
        Platform::Telegram
    }

    fn parse_str(&self, content: &str) -> Result<ParseOutcome, ChatstatError> {
        let root: Value =
            serde_json::from_str(content).map_err(|e| ChatstatError::telegram_parse(e, None))?;
        let records = match root {
            Value::Array(items) => items,
            Value::Object(mut obj) => match obj.remove("messages") {
                Some(Value::Array(items)) => items,
                _ => {
                    return Err(ChatstatError::invalid_format(
                        FORMAT,
                        "expected an array of messages or an object with a 'messages' array",
                    ));
                }
            },
            _ => {
                return Err(ChatstatError::invalid_format(
                    FORMAT,
                    "expected an array of messages",
                ));
            }
        };

        // each record on its own, so one odd object cannot sink the batch
        let mut outcome = ParseOutcome::default();
        for (i, value) in records.into_iter().enumerate() {
            let record = match serde_json::from_value::<ApiMessage>(value) {
                Ok(record) => record,
                Err(e) if self.config.skip_invalid => {
                    outcome
                        .skipped
                        .push(RecordError::parse(FORMAT, i + 1, e.to_string()));
                    continue;
                }
                Err(e) => return Err(ChatstatError::telegram_parse(e, None)),
            };
            match convert_message(&record, &self.config, i + 1) {
                Ok(Some(msg)) => outcome.messages.push(msg),
                Ok(None) => {}
                Err(err) => outcome.skipped.push(err),
            }
        }
        self.report(&outcome);
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MessageKind;
    use serde_json::json;

    fn batch() -> String {
        json!([
            {"id": 3, "date": 1705314900, "from_id": 99990, "message": "newest"},
            {"id": 2, "date": 1705314800, "from_id": 1, "media": {"type": "sticker", "alt": "😀"}},
            {"id": 1, "date": 1705314700, "from_id": 99990, "message": ["see ", {"type": "url", "text": "https://t.me"}]}
        ])
        .to_string()
    }

    #[test]
    fn test_parser_name() {
        let parser = TelegramParser::new();
        assert_eq!(parser.name(), "Telegram");
        assert_eq!(parser.platform(), Platform::Telegram);
    }

    #[test]
    fn test_parse_array_keeps_source_order() {
        let parser = TelegramParser::with_config(TelegramConfig::new("Me", "Kate").with_target_id(99990));
        let outcome = parser.parse_str(&batch()).unwrap();
        assert!(outcome.is_clean());
        let texts: Vec<_> = outcome.messages.iter().map(|m| m.text()).collect();
        assert_eq!(texts, vec!["newest", "", "see https://t.me"]);
        assert_eq!(outcome.messages[0].author(), "Kate");
        assert_eq!(outcome.messages[1].author(), "Me");
        assert_eq!(outcome.messages[1].kind(), MessageKind::Sticker);
    }

    #[test]
    fn test_parse_object_with_messages() {
        let content = json!({"name": "Kate", "messages": [{"date": 0, "sender_name": "Kate", "message": "hi"}]});
        let outcome = TelegramParser::new().parse_str(&content.to_string()).unwrap();
        assert_eq!(outcome.messages.len(), 1);
    }

    #[test]
    fn test_bad_record_skipped() {
        let content = json!([
            {"date": 0, "sender_name": "A", "message": "ok"},
            {"sender_name": "B"},
            {"date": 1, "message": "no author"},
            {"date": 2, "sender_name": "C", "message": "after"}
        ]);
        let outcome = TelegramParser::new().parse_str(&content.to_string()).unwrap();
        assert_eq!(outcome.messages.len(), 2);
        assert_eq!(outcome.skipped.len(), 2);
        assert!(matches!(outcome.skipped[0], RecordError::Parse { location: 2, .. }));
        assert!(matches!(outcome.skipped[1], RecordError::Parse { location: 3, .. }));
    }

    #[test]
    fn test_strict_mode_fails_on_bad_record() {
        let parser = TelegramParser::with_config(TelegramConfig::default().with_skip_invalid(false));
        let err = parser.parse_str(r#"[{"sender_name": "B"}]"#).unwrap_err();
        assert!(err.is_parse());
    }

    #[test]
    fn test_not_json_is_parse_error() {
        let err = TelegramParser::new().parse_str("not json").unwrap_err();
        assert!(err.is_parse());
        let err = TelegramParser::new().parse_str("42").unwrap_err();
        assert!(err.is_invalid_format());
    }

    #[test]
    fn test_parse_records_in_memory() {
        let records: Vec<ApiMessage> = serde_json::from_str(&batch()).unwrap();
        let outcome = TelegramParser::new().parse_records(&records);
        assert_eq!(outcome.messages.len(), 3);
        // no target id: fall back to the numeric sender id
        assert_eq!(outcome.messages[0].author(), "id99990");
    }
}
