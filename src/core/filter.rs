//! Filter messages by date range, author and content.
//!
//! This module provides [`FilterConfig`] for defining filter criteria and
//! [`apply_filters`] for filtering message collections.
//!
//! # Filter Types
//!
//! | Filter | Method | Description |
//! |--------|--------|-------------|
//! | Date from | [`with_date_from`](FilterConfig::with_date_from) | Messages on or after date |
//! | Date to | [`with_date_to`](FilterConfig::with_date_to) | Messages on or before date |
//! | Author | [`with_author`](FilterConfig::with_author) | Messages from one participant |
//! | Empty | [`with_remove_empty`](FilterConfig::with_remove_empty) | Drop whitespace-only texts |
//! | Links | [`with_remove_links`](FilterConfig::with_remove_links) | Drop texts that are a single URL |
//! | Forwards | [`with_remove_forwards`](FilterConfig::with_remove_forwards) | Drop forwarded messages |
//! | Length | [`with_length`](FilterConfig::with_length) | Keep texts within a character range |
//!
//! # Examples
//!
//! ```
//! use chatstat::core::filter::{FilterConfig, apply_filters};
//! use chatstat::Message;
//! use chrono::{TimeZone, Utc};
//!
//! # fn main() -> chatstat::Result<()> {
//! let ts = |d| Utc.with_ymd_and_hms(2024, 6, d, 12, 0, 0).unwrap();
//! let messages = vec![
//!     Message::new_text("Alice", ts(1), "Old"),
//!     Message::new_text("Alice", ts(15), "New"),
//!     Message::new_text("Bob", ts(15), "https://example.com"),
//! ];
//!
//! let config = FilterConfig::new()
//!     .with_date_from("2024-06-10")?
//!     .with_remove_links(true);
//!
//! let filtered = apply_filters(&messages, &config);
//! assert_eq!(filtered.len(), 1);
//! assert_eq!(filtered[0].text(), "New");
//! # Ok(())
//! # }
//! ```
//!
//! # Behavior Notes
//!
//! - Author matching is case-insensitive for ASCII characters
//! - Length bounds apply to text messages only; other kinds pass
//! - Multiple filters are combined with AND logic

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::Message;
use crate::error::ChatstatError;

/// Longest text kept by [`FilterConfig::content_defaults`].
///
/// Longer messages are almost always pasted documents and skew every
/// length and word statistic.
pub const CONTENT_MAX_LEN: usize = 4095;

/// Configuration for filtering messages.
///
/// Filters are combined with AND logic: a message must match all active
/// filters to be included in the result.
///
/// # Examples
///
/// ```
/// use chatstat::core::filter::FilterConfig;
///
/// # fn main() -> chatstat::Result<()> {
/// let by_author = FilterConfig::new().with_author("Alice");
///
/// let by_date = FilterConfig::new()
///     .with_date_from("2024-01-01")?
///     .with_date_to("2024-12-31")?;
///
/// let content = FilterConfig::content_defaults();
/// assert!(content.remove_links);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Include only messages on or after this timestamp.
    pub after: Option<DateTime<Utc>>,

    /// Include only messages on or before this timestamp.
    pub before: Option<DateTime<Utc>>,

    /// Include only messages from this author (case-insensitive).
    pub from: Option<String>,

    /// Drop text messages whose text is empty or whitespace-only.
    pub remove_empty: bool,

    /// Drop messages whose whole text is a URL.
    pub remove_links: bool,

    /// Drop forwarded messages.
    pub remove_forwards: bool,

    /// Minimum text length in characters (text messages only).
    pub min_len: Option<usize>,

    /// Maximum text length in characters (text messages only).
    pub max_len: Option<usize>,
}

impl FilterConfig {
    /// Creates a new empty filter configuration.
    ///
    /// No filters are active by default; all messages pass through.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter used before content statistics (lengths, words, emoji).
    ///
    /// Drops forwards, bare links, empty texts and texts longer than
    /// [`CONTENT_MAX_LEN`] characters.
    pub fn content_defaults() -> Self {
        Self {
            remove_empty: true,
            remove_links: true,
            remove_forwards: true,
            max_len: Some(CONTENT_MAX_LEN),
            ..Self::default()
        }
    }

    /// Sets the start date filter (inclusive).
    ///
    /// Date format: `YYYY-MM-DD`.
    ///
    /// # Errors
    ///
    /// Returns [`ChatstatError::InvalidDate`] if the format is invalid.
    pub fn with_date_from(mut self, date_str: &str) -> Result<Self, ChatstatError> {
        let date = parse_date(date_str)?;
        self.after = Some(date.and_time(chrono::NaiveTime::MIN).and_utc());
        Ok(self)
    }

    /// Sets the end date filter (inclusive).
    ///
    /// Date format: `YYYY-MM-DD`. The whole day is included.
    ///
    /// # Errors
    ///
    /// Returns [`ChatstatError::InvalidDate`] if the format is invalid.
    pub fn with_date_to(mut self, date_str: &str) -> Result<Self, ChatstatError> {
        let date = parse_date(date_str)?;
        // last instant of the day
        let end = date
            .succ_opt()
            .map(|next| next.and_time(chrono::NaiveTime::MIN).and_utc() - chrono::Duration::nanoseconds(1))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.before = Some(end);
        Ok(self)
    }

    /// Sets the author filter.
    ///
    /// Only messages from this author will be included.
    #[must_use]
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.from = Some(author.into());
        self
    }

    /// Drops empty or whitespace-only texts.
    #[must_use]
    pub fn with_remove_empty(mut self, remove: bool) -> Self {
        self.remove_empty = remove;
        self
    }

    /// Drops messages consisting of a single URL.
    #[must_use]
    pub fn with_remove_links(mut self, remove: bool) -> Self {
        self.remove_links = remove;
        self
    }

    /// Drops forwarded messages.
    #[must_use]
    pub fn with_remove_forwards(mut self, remove: bool) -> Self {
        self.remove_forwards = remove;
        self
    }

    /// Keeps text messages whose length lies in `min..=max` characters.
    #[must_use]
    pub fn with_length(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        self.min_len = min;
        self.max_len = max;
        self
    }

    /// Returns `true` if any filter is active.
    pub fn is_active(&self) -> bool {
        self.has_date_filter()
            || self.has_author_filter()
            || self.remove_empty
            || self.remove_links
            || self.remove_forwards
            || self.min_len.is_some()
            || self.max_len.is_some()
    }

    /// Returns `true` if date filters are active.
    pub fn has_date_filter(&self) -> bool {
        self.after.is_some() || self.before.is_some()
    }

    /// Returns `true` if the author filter is active.
    pub fn has_author_filter(&self) -> bool {
        self.from.is_some()
    }

    /// Returns `true` if `msg` passes every active filter.
    pub fn matches(&self, msg: &Message) -> bool {
        if let Some(ref from) = self.from {
            if !msg.author().eq_ignore_ascii_case(from) {
                return false;
            }
        }

        let ts = msg.timestamp();
        if self.after.is_some_and(|after| ts < after) {
            return false;
        }
        if self.before.is_some_and(|before| ts > before) {
            return false;
        }

        if self.remove_forwards && msg.is_forwarded() {
            return false;
        }
        if self.remove_links && msg.is_link() {
            return false;
        }

        if msg.kind().is_text() {
            if self.remove_empty && msg.is_empty() {
                return false;
            }
            if self.min_len.is_some_and(|min| msg.length() < min) {
                return false;
            }
            if self.max_len.is_some_and(|max| msg.length() > max) {
                return false;
            }
        }

        true
    }
}

fn parse_date(date_str: &str) -> Result<NaiveDate, ChatstatError> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|_| ChatstatError::invalid_date(date_str))
}

/// Filters a slice of messages based on the provided configuration.
///
/// Returns references to the messages that match all active filters, in
/// input order.
pub fn apply_filters<'a>(messages: &'a [Message], config: &FilterConfig) -> Vec<&'a Message> {
    if !config.is_active() {
        return messages.iter().collect();
    }
    messages.iter().filter(|msg| config.matches(msg)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MessageKind;
    use chrono::TimeZone;

    fn at(day: &str) -> DateTime<Utc> {
        NaiveDate::parse_from_str(day, "%Y-%m-%d")
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
            .and_utc()
    }

    #[test]
    fn test_filter_by_author() {
        let messages = vec![
            Message::new_text("Alice", at("2024-01-01"), "Hello"),
            Message::new_text("Bob", at("2024-01-01"), "Hi"),
            Message::new_text("alice", at("2024-01-01"), "Bye"),
        ];

        let config = FilterConfig::new().with_author("Alice");
        let filtered = apply_filters(&messages, &config);

        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|m| m.author().eq_ignore_ascii_case("Alice")));
    }

    #[test]
    fn test_filter_by_date_range() {
        let messages = vec![
            Message::new_text("Alice", at("2024-01-01"), "Old"),
            Message::new_text("Alice", at("2024-06-15"), "New"),
            Message::new_text("Alice", at("2025-01-01"), "Future"),
        ];

        let config = FilterConfig::new()
            .with_date_from("2024-06-01")
            .unwrap()
            .with_date_to("2024-12-31")
            .unwrap();
        let filtered = apply_filters(&messages, &config);

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].text(), "New");
    }

    #[test]
    fn test_date_to_includes_whole_day() {
        let late = Utc.with_ymd_and_hms(2024, 3, 1, 23, 59, 59).unwrap();
        let messages = vec![Message::new_text("Alice", late, "late")];
        let config = FilterConfig::new().with_date_to("2024-03-01").unwrap();
        assert_eq!(apply_filters(&messages, &config).len(), 1);
    }

    #[test]
    fn test_invalid_date_format() {
        let result = FilterConfig::new().with_date_from("01-01-2024");
        assert!(matches!(result, Err(ChatstatError::InvalidDate { .. })));
    }

    #[test]
    fn test_content_defaults() {
        let ts = at("2024-01-01");
        let messages = vec![
            Message::new_text("Alice", ts, "kept"),
            Message::new_text("Alice", ts, "   "),
            Message::new_text("Alice", ts, "https://vk.com/wall1"),
            Message::new_text("Alice", ts, "fwd").with_forwarded(true),
            Message::new_text("Alice", ts, "x".repeat(CONTENT_MAX_LEN + 1)),
            Message::non_text("Bob", ts, MessageKind::Photo),
        ];

        let filtered = apply_filters(&messages, &FilterConfig::content_defaults());
        let texts: Vec<_> = filtered.iter().map(|m| (m.kind(), m.text())).collect();
        assert_eq!(
            texts,
            vec![(MessageKind::Text, "kept"), (MessageKind::Photo, "")]
        );
    }

    #[test]
    fn test_length_bounds() {
        let ts = at("2024-01-01");
        let messages = vec![
            Message::new_text("A", ts, "a"),
            Message::new_text("A", ts, "abc"),
            Message::new_text("A", ts, "abcdef"),
        ];
        let config = FilterConfig::new().with_length(Some(2), Some(5));
        let filtered = apply_filters(&messages, &config);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].text(), "abc");
    }

    #[test]
    fn test_is_active() {
        assert!(!FilterConfig::new().is_active());
        assert!(FilterConfig::new().with_author("Alice").is_active());
        assert!(FilterConfig::content_defaults().is_active());
        assert!(
            FilterConfig::new()
                .with_date_from("2024-01-01")
                .unwrap()
                .is_active()
        );
    }

    #[test]
    fn test_serde_defaults() {
        let config: FilterConfig = serde_json::from_str(r#"{"remove_links": true}"#).unwrap();
        assert!(config.remove_links);
        assert!(!config.remove_empty);
        assert_eq!(config.max_len, None);
    }
}
