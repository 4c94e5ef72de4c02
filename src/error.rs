//! Unified error types for chatstat.
//!
//! Errors come in two tiers:
//!
//! - [`ChatstatError`] is a **source-level** failure: a whole file or response
//!   could not be read, decoded or understood. It is surfaced to the caller as
//!   one summarized failure and nothing from that source is applied.
//! - [`RecordError`] is a **record-level** problem: one malformed block or one
//!   out-of-range message. Records are skipped locally and collected so the
//!   caller can report them; they never abort a run.

use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// A specialized [`Result`] type for chatstat operations.
///
/// # Example
///
/// ```rust
/// use chatstat::error::Result;
/// use chatstat::Message;
///
/// fn my_function() -> Result<Vec<Message>> {
///     Ok(vec![])
/// }
/// ```
pub type Result<T> = std::result::Result<T, ChatstatError>;

/// The error type for all fallible chatstat operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChatstatError {
    /// An I/O error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A source could not be parsed at all.
    #[error("Failed to parse {format} export{}: {source}", path.as_ref().map(|p| format!(" (file: {})", p.display())).unwrap_or_default())]
    Parse {
        /// The format being parsed (e.g., "Telegram API", "vkOpt TXT")
        format: &'static str,
        /// What made the source unreadable
        #[source]
        source: ParseErrorKind,
        /// The source file, when the input came from disk
        path: Option<PathBuf>,
    },

    /// A byte sequence could not be decoded with the declared or detected encoding.
    ///
    /// Fatal for the source it came from, never for the whole run.
    #[error("Encoding error in {context}: {message}")]
    Encoding {
        /// Which source was being decoded
        context: String,
        /// What went wrong
        message: String,
    },

    /// The input does not have the expected overall structure.
    #[error("Invalid {format} format: {message}")]
    InvalidFormat {
        /// The format the input claimed to be
        format: &'static str,
        /// Which part of the structure is missing or wrong
        message: String,
    },

    /// Invalid date in a filter or range configuration.
    #[error("Invalid date '{input}'. Expected format: {expected}")]
    InvalidDate {
        /// The rejected input
        input: String,
        /// The accepted layout
        expected: &'static str,
    },

    /// A configuration value is missing or out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Every source of an ingest run failed; nothing was left to normalize.
    #[error("All {count} sources failed; first failure: {first}")]
    NoUsableSource {
        /// Number of failed sources
        count: usize,
        /// Rendered message of the first failure
        first: String,
    },

    /// A CSV result file could not be written.
    #[cfg(feature = "csv-output")]
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON could not be read or written.
    #[cfg(any(feature = "telegram", feature = "json-output"))]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Session configuration file could not be parsed.
    #[cfg(feature = "cli")]
    #[error("Config file error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Kinds of whole-source parse errors.
#[derive(Debug, Error)]
pub enum ParseErrorKind {
    /// Malformed JSON
    #[cfg(any(feature = "telegram", feature = "json-output"))]
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    /// Layout/pattern error
    #[error("{0}")]
    Pattern(String),
}

/// A single skipped record.
///
/// Parsers and the normalizer return these alongside their successful output
/// so nothing is dropped without a trace.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RecordError {
    /// A malformed record in a source file or response.
    #[error("{source_name} record at {location}: {reason}")]
    Parse {
        /// Parser that rejected the record
        source_name: &'static str,
        /// Line number (text exports) or record index (API batches), 1-based
        location: usize,
        /// Why the record was rejected
        reason: String,
    },

    /// A record that violates a sequence-level invariant.
    #[error("message from '{author}' at {timestamp} rejected: {reason}")]
    Validation {
        /// Author of the excluded message
        author: String,
        /// Offending timestamp
        timestamp: DateTime<Utc>,
        /// Why the message was excluded
        reason: String,
    },
}

impl RecordError {
    /// Creates a record-level parse error.
    pub fn parse(source_name: &'static str, location: usize, reason: impl Into<String>) -> Self {
        RecordError::Parse {
            source_name,
            location,
            reason: reason.into(),
        }
    }

    /// Creates a record-level validation error.
    pub fn validation(
        author: impl Into<String>,
        timestamp: DateTime<Utc>,
        reason: impl Into<String>,
    ) -> Self {
        RecordError::Validation {
            author: author.into(),
            timestamp,
            reason: reason.into(),
        }
    }

    /// Returns `true` for parse-stage records.
    pub fn is_parse(&self) -> bool {
        matches!(self, RecordError::Parse { .. })
    }

    /// Returns `true` for validation-stage records.
    pub fn is_validation(&self) -> bool {
        matches!(self, RecordError::Validation { .. })
    }
}

// ============================================================================
// Convenience constructors
// ============================================================================

impl ChatstatError {
    /// Creates a parse error for the Telegram API format.
    #[cfg(feature = "telegram")]
    pub fn telegram_parse(source: serde_json::Error, path: Option<PathBuf>) -> Self {
        ChatstatError::Parse {
            format: "Telegram API",
            source: ParseErrorKind::Json(source),
            path,
        }
    }

    /// Creates a parse error for the vkOpt text format.
    pub fn vkopt_parse(message: impl Into<String>, path: Option<PathBuf>) -> Self {
        ChatstatError::Parse {
            format: "vkOpt TXT",
            source: ParseErrorKind::Pattern(message.into()),
            path,
        }
    }

    /// Creates an encoding error.
    pub fn encoding(context: impl Into<String>, message: impl Into<String>) -> Self {
        ChatstatError::Encoding {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid format error.
    pub fn invalid_format(format: &'static str, message: impl Into<String>) -> Self {
        ChatstatError::InvalidFormat {
            format,
            message: message.into(),
        }
    }

    /// Creates an invalid date error.
    pub fn invalid_date(input: impl Into<String>) -> Self {
        ChatstatError::InvalidDate {
            input: input.into(),
            expected: "YYYY-MM-DD",
        }
    }

    /// Creates an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        ChatstatError::InvalidConfig(message.into())
    }

    /// Attaches a file path to a whole-source parse error that has none.
    ///
    /// Other variants are returned unchanged.
    #[must_use]
    pub fn with_path(self, file: &Path) -> Self {
        match self {
            ChatstatError::Parse {
                format,
                source,
                path: None,
            } => ChatstatError::Parse {
                format,
                source,
                path: Some(file.to_path_buf()),
            },
            other => other,
        }
    }

    /// Returns `true` if this is an IO error.
    pub fn is_io(&self) -> bool {
        matches!(self, ChatstatError::Io(_))
    }

    /// Returns `true` if this is a parse error.
    pub fn is_parse(&self) -> bool {
        matches!(self, ChatstatError::Parse { .. })
    }

    /// Returns `true` if this is an encoding error.
    pub fn is_encoding(&self) -> bool {
        matches!(self, ChatstatError::Encoding { .. })
    }

    /// Returns `true` if this is an invalid format error.
    pub fn is_invalid_format(&self) -> bool {
        matches!(self, ChatstatError::InvalidFormat { .. })
    }

    /// Returns `true` if this is a date-related error.
    pub fn is_invalid_date(&self) -> bool {
        matches!(self, ChatstatError::InvalidDate { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_io_error_display() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err = ChatstatError::from(io_err);
        let display = err.to_string();
        assert!(display.contains("IO error"));
        assert!(display.contains("file not found"));
        assert!(err.is_io());
    }

    #[test]
    fn test_parse_error_with_path() {
        let err = ChatstatError::vkopt_parse("no message header", Some(PathBuf::from("/tmp/vk.txt")));
        let display = err.to_string();
        assert!(display.contains("vkOpt TXT"));
        assert!(display.contains("/tmp/vk.txt"));
        assert!(err.is_parse());
    }

    #[test]
    fn test_parse_error_without_path() {
        let err = ChatstatError::vkopt_parse("no message header", None);
        assert!(!err.to_string().contains("file:"));
    }

    #[test]
    fn test_with_path_only_fills_missing_path() {
        let err = ChatstatError::vkopt_parse("bad", None).with_path(Path::new("a.txt"));
        assert!(err.to_string().contains("a.txt"));

        let err = ChatstatError::vkopt_parse("bad", Some(PathBuf::from("first.txt")))
            .with_path(Path::new("second.txt"));
        assert!(err.to_string().contains("first.txt"));

        let err = ChatstatError::invalid_config("x").with_path(Path::new("a.txt"));
        assert!(!err.to_string().contains("a.txt"));
    }

    #[test]
    fn test_encoding_error() {
        let err = ChatstatError::encoding("vkOpt TXT", "invalid UTF-8 at byte 3");
        assert!(err.is_encoding());
        assert!(!err.is_parse());
        assert!(err.to_string().contains("byte 3"));
    }

    #[test]
    fn test_invalid_date_display() {
        let err = ChatstatError::invalid_date("not-a-date");
        let display = err.to_string();
        assert!(display.contains("not-a-date"));
        assert!(display.contains("YYYY-MM-DD"));
        assert!(err.is_invalid_date());
    }

    #[test]
    fn test_no_usable_source_display() {
        let err = ChatstatError::NoUsableSource {
            count: 2,
            first: "IO error: gone".into(),
        };
        assert!(err.to_string().contains("All 2 sources failed"));
    }

    #[cfg(feature = "telegram")]
    #[test]
    fn test_telegram_parse_constructor() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
        let err = ChatstatError::telegram_parse(json_err, None);
        assert!(err.is_parse());
        assert!(err.to_string().contains("Telegram API"));
    }

    #[test]
    fn test_record_error_display() {
        let err = RecordError::parse("vkOpt TXT", 12, "missing timestamp line");
        assert!(err.is_parse());
        assert_eq!(
            err.to_string(),
            "vkOpt TXT record at 12: missing timestamp line"
        );

        let ts = Utc.with_ymd_and_hms(1999, 1, 1, 0, 0, 0).unwrap();
        let err = RecordError::validation("Alice", ts, "before earliest allowed date");
        assert!(err.is_validation());
        assert!(err.to_string().contains("Alice"));
    }

    #[test]
    fn test_error_source_chain() {
        use std::error::Error;
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err = ChatstatError::from(io_err);
        assert!(err.source().is_some());
    }
}
