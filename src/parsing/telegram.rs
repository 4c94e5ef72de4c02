//! Telegram API message objects.
//!
//! The retrieval collaborator pages through a dialogue and hands over one
//! object per message, newest first. Only the fields below are read; anything
//! else in the object is ignored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::TelegramConfig;
use crate::error::RecordError;
use crate::{Message, MessageKind};

/// Format name used in record-level reports.
pub const FORMAT: &str = "Telegram API";

/// Message date: unix seconds (number or digit string) or RFC 3339.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApiDate {
    /// Seconds since the Unix epoch
    Unix(i64),
    /// Digit string or RFC 3339 timestamp
    Text(String),
}

impl ApiDate {
    /// Resolves the date to an instant.
    pub fn resolve(&self) -> Option<DateTime<Utc>> {
        match self {
            ApiDate::Unix(secs) => DateTime::from_timestamp(*secs, 0),
            ApiDate::Text(s) => match s.trim().parse::<i64>() {
                Ok(secs) => DateTime::from_timestamp(secs, 0),
                Err(_) => DateTime::parse_from_rfc3339(s.trim())
                    .ok()
                    .map(|dt| dt.with_timezone(&Utc)),
            },
        }
    }
}

/// Attached media of an API message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ApiMedia {
    /// A photo
    Photo,
    /// A sticker
    Sticker,
    /// A plain video
    Video,
    /// A document, which covers voice notes, round videos and audio files
    Document {
        /// MIME type reported by the server
        #[serde(default)]
        mime_type: Option<String>,
        /// Voice-note attribute
        #[serde(default)]
        voice: bool,
        /// Round video message attribute
        #[serde(default)]
        round: bool,
        /// Video attribute
        #[serde(default)]
        video: bool,
    },
    /// Anything else (web page previews, polls, locations...)
    #[serde(other)]
    Other,
}

impl ApiMedia {
    /// Maps the media to a message kind.
    pub fn kind(&self) -> MessageKind {
        match self {
            ApiMedia::Photo => MessageKind::Photo,
            ApiMedia::Sticker => MessageKind::Sticker,
            ApiMedia::Video => MessageKind::Video,
            ApiMedia::Document {
                mime_type,
                voice,
                round,
                video,
            } => {
                let mime = mime_type.as_deref().unwrap_or_default();
                if *voice && mime == "audio/ogg" {
                    MessageKind::Voice
                } else if *round || *video {
                    MessageKind::Video
                } else if mime.starts_with("audio/") {
                    MessageKind::Audio
                } else {
                    MessageKind::Other
                }
            }
            ApiMedia::Other => MessageKind::Other,
        }
    }
}

/// One message object as supplied by the retrieval collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiMessage {
    /// Server-side message id
    #[serde(default)]
    pub id: Option<i64>,
    /// Record type; anything other than `"message"` (service records) is ignored
    #[serde(default, rename = "type")]
    pub record_type: Option<String>,
    /// Send date
    pub date: ApiDate,
    /// Sender id
    #[serde(default)]
    pub from_id: Option<i64>,
    /// Sender display name
    #[serde(default)]
    pub sender_name: Option<String>,
    /// Message text: a string or an array of strings and entity objects
    #[serde(default)]
    pub message: Option<Value>,
    /// Attached media
    #[serde(default)]
    pub media: Option<ApiMedia>,
    /// Forwarded from someone else
    #[serde(default)]
    pub forwarded: bool,
}

impl ApiMessage {
    /// Returns `true` for service records (joins, calls, pins...).
    pub fn is_service(&self) -> bool {
        self.record_type.as_deref().is_some_and(|t| t != "message")
    }
}

/// Extracts text content from a message's `message` field.
///
/// The field can be:
/// - A simple string: `"Hello"`
/// - An array with strings and objects: `["Text", {"type": "link", "text": "url"}]`
pub fn extract_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(arr) => arr
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Object(obj) => obj
                    .get("text")
                    .and_then(|v| v.as_str())
                    .map(ToString::to_string),
                _ => None,
            })
            .collect::<String>(),
        _ => String::new(),
    }
}

/// Resolves the display name of a message's author.
///
/// With a configured `target_id`, the partner's messages get `target_name`
/// and everything else `your_name`. Without one, the sender name is used,
/// then `id<from_id>`.
pub fn resolve_author(msg: &ApiMessage, config: &TelegramConfig) -> Option<String> {
    if let Some(target) = config.target_id {
        return Some(if msg.from_id == Some(target) {
            config.target_name.clone()
        } else {
            config.your_name.clone()
        });
    }
    msg.sender_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(ToString::to_string)
        .or_else(|| msg.from_id.map(|id| format!("id{id}")))
}

/// Converts one API object.
///
/// Returns `Ok(None)` for service records. `index` is the 1-based position
/// used in error reports.
pub fn convert_message(
    msg: &ApiMessage,
    config: &TelegramConfig,
    index: usize,
) -> Result<Option<Message>, RecordError> {
    if msg.is_service() {
        return Ok(None);
    }
    let timestamp = msg
        .date
        .resolve()
        .ok_or_else(|| RecordError::parse(FORMAT, index, "unreadable date"))?;
    let author = resolve_author(msg, config)
        .ok_or_else(|| RecordError::parse(FORMAT, index, "message has no author"))?;
    let kind = msg.media.as_ref().map_or(MessageKind::Text, ApiMedia::kind);
    let text = msg.message.as_ref().map(extract_text).unwrap_or_default();

    Ok(Some(
        Message::new(author, timestamp, kind, text).with_forwarded(msg.forwarded),
    ))
}
