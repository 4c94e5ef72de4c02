//! Canonical message type for all sources.
//!
//! Every parser converts its native records into [`Message`], so the
//! normalizer and the aggregation engine never see platform specifics.
//!
//! # Examples
//!
//! ```
//! use chatstat::{Message, MessageKind};
//! use chrono::{TimeZone, Utc};
//!
//! let ts = Utc.with_ymd_and_hms(2020, 1, 1, 10, 0, 0).unwrap();
//! let msg = Message::new_text("Alice", ts, "hello");
//! assert_eq!(msg.kind(), MessageKind::Text);
//! assert_eq!(msg.length(), 5);
//!
//! let photo = Message::non_text("Bob", ts, MessageKind::Photo);
//! assert!(photo.text().is_empty());
//! ```

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// What a message carries.
///
/// Each aggregation site matches on this exhaustively, so adding a variant
/// forces every statistic to decide how to count it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// Plain text message
    Text,
    /// Photo or image
    Photo,
    /// Voice note
    Voice,
    /// Video message
    Video,
    /// Sticker
    Sticker,
    /// Audio file (music), not a voice note
    Audio,
    /// Any other attachment without text
    Other,
}

impl MessageKind {
    /// Every kind, in display order.
    pub const ALL: [MessageKind; 7] = [
        MessageKind::Text,
        MessageKind::Photo,
        MessageKind::Voice,
        MessageKind::Video,
        MessageKind::Sticker,
        MessageKind::Audio,
        MessageKind::Other,
    ];

    /// Every non-text kind, in display order.
    pub const NON_TEXT: [MessageKind; 6] = [
        MessageKind::Photo,
        MessageKind::Voice,
        MessageKind::Video,
        MessageKind::Sticker,
        MessageKind::Audio,
        MessageKind::Other,
    ];

    /// Returns `true` for [`MessageKind::Text`].
    pub fn is_text(self) -> bool {
        matches!(self, MessageKind::Text)
    }

    /// Stable lowercase identifier used as an aggregate key.
    pub fn as_str(self) -> &'static str {
        match self {
            MessageKind::Text => "text",
            MessageKind::Photo => "photo",
            MessageKind::Voice => "voice",
            MessageKind::Video => "video",
            MessageKind::Sticker => "sticker",
            MessageKind::Audio => "audio",
            MessageKind::Other => "other",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized chat message.
///
/// `length` is the number of Unicode scalar values in `text`. It is computed
/// on construction and recomputed on deserialization, so a stored value can
/// never disagree with the text.
///
/// Fields are read through accessors; the only way to build a message is
/// through [`Message::new_text`], [`Message::non_text`] or [`Message::new`], which
/// keep the "non-text kinds have empty text" invariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredMessage")]
pub struct Message {
    author: String,
    timestamp: DateTime<Utc>,
    kind: MessageKind,
    text: String,
    length: usize,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    forwarded: bool,
}

/// Serialized shape of a message. `length` is accepted but ignored.
#[derive(Deserialize)]
struct StoredMessage {
    author: String,
    timestamp: DateTime<Utc>,
    kind: MessageKind,
    #[serde(default)]
    text: String,
    #[serde(default, rename = "length")]
    _length: Option<usize>,
    #[serde(default)]
    forwarded: bool,
}

impl From<StoredMessage> for Message {
    fn from(stored: StoredMessage) -> Self {
        Message::new(stored.author, stored.timestamp, stored.kind, stored.text)
            .with_forwarded(stored.forwarded)
    }
}

impl Message {
    /// Creates a message of any kind.
    ///
    /// Text supplied for a non-text kind is discarded.
    pub fn new(
        author: impl Into<String>,
        timestamp: DateTime<Utc>,
        kind: MessageKind,
        text: impl Into<String>,
    ) -> Self {
        let text = if kind.is_text() {
            text.into()
        } else {
            String::new()
        };
        let length = text.chars().count();
        Self {
            author: author.into(),
            timestamp,
            kind,
            text,
            length,
            forwarded: false,
        }
    }

    /// Creates a text message.
    pub fn new_text(author: impl Into<String>, timestamp: DateTime<Utc>, text: impl Into<String>) -> Self {
        Self::new(author, timestamp, MessageKind::Text, text)
    }

    /// Creates a message without text (photo, sticker, voice note...).
    pub fn non_text(author: impl Into<String>, timestamp: DateTime<Utc>, kind: MessageKind) -> Self {
        Self::new(author, timestamp, kind, String::new())
    }

    /// Builder method to mark the message as forwarded.
    #[must_use]
    pub fn with_forwarded(mut self, forwarded: bool) -> Self {
        self.forwarded = forwarded;
        self
    }

    /// Returns the author display name.
    pub fn author(&self) -> &str {
        &self.author
    }

    /// Returns the UTC timestamp.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Returns the message kind.
    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    /// Returns the message text (empty for non-text kinds).
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the cached character count of the text.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Returns `true` if the message was forwarded from someone else.
    pub fn is_forwarded(&self) -> bool {
        self.forwarded
    }

    /// Returns `true` if the text is empty or whitespace-only.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Returns `true` if the whole text is a single URL.
    pub fn is_link(&self) -> bool {
        is_link(&self.text)
    }

    /// Key used for duplicate detection: same author, same instant, same text.
    pub(crate) fn dedup_key(&self) -> (&str, DateTime<Utc>, &str) {
        (&self.author, self.timestamp, &self.text)
    }
}

fn link_regex() -> &'static Regex {
    static LINK: OnceLock<Regex> = OnceLock::new();
    LINK.get_or_init(|| {
        Regex::new(
            r"(?i)^(?:http|ftp)s?://(?:(?:[A-Z0-9](?:[A-Z0-9-]{0,61}[A-Z0-9])?\.)+(?:[A-Z]{2,6}\.?|[A-Z0-9-]{2,}\.?)|localhost|\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3})(?::\d+)?(?:/?|[/?]\S+)$",
        )
        .expect("link pattern is valid")
    })
}

/// Returns `true` if `text` consists of exactly one http(s)/ftp(s) URL.
pub fn is_link(text: &str) -> bool {
    !text.is_empty() && link_regex().is_match(text)
}
