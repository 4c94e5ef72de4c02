//! Unified parser trait for message sources.
//!
//! Every source format is read through [`Parser`], which turns raw input into
//! canonical [`Message`]s plus a list of skipped records. Parsers never
//! reorder or deduplicate; that is the [normalizer](crate::normalize)'s job.
//!
//! # Example
//!
//! ```rust
//! # #[cfg(feature = "vkopt")]
//! # fn main() -> chatstat::Result<()> {
//! use chatstat::parser::{Parser, Platform, create_parser};
//!
//! let parser = create_parser(Platform::VkOpt)?;
//! let outcome = parser.parse_str("Alice (Jan 1, 2020):\nhello\n\n10:00:00 01/01/2020\n")?;
//! assert_eq!(outcome.messages.len(), 1);
//! assert!(outcome.skipped.is_empty());
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "vkopt"))]
//! # fn main() {}
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::Message;
use crate::error::{ChatstatError, RecordError};

/// Supported message sources.
///
/// # Example
///
/// ```rust
/// use chatstat::parser::Platform;
/// use std::str::FromStr;
///
/// assert_eq!(Platform::from_str("tg").unwrap(), Platform::Telegram);
/// assert_eq!(Platform::from_str("vk").unwrap(), Platform::VkOpt);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum Platform {
    /// Telegram API message objects
    #[serde(alias = "tg")]
    Telegram,

    /// vkOpt text export of a VK dialogue
    #[serde(alias = "vk")]
    VkOpt,
}

impl Platform {
    /// Returns the default file extension for this source.
    pub fn default_extension(&self) -> &'static str {
        match self {
            Platform::Telegram => "json",
            Platform::VkOpt => "txt",
        }
    }

    /// Returns all platform names including aliases.
    pub fn all_names() -> &'static [&'static str] {
        &["telegram", "tg", "vkopt", "vk"]
    }

    /// Returns all available platforms.
    pub fn all() -> &'static [Platform] {
        &[Platform::Telegram, Platform::VkOpt]
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::Telegram => write!(f, "Telegram"),
            Platform::VkOpt => write!(f, "vkOpt"),
        }
    }
}

impl std::str::FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "telegram" | "tg" => Ok(Platform::Telegram),
            "vkopt" | "vk" => Ok(Platform::VkOpt),
            _ => Err(format!(
                "Unknown platform: '{}'. Expected one of: {}",
                s,
                Platform::all_names().join(", ")
            )),
        }
    }
}

/// Result of parsing one source.
///
/// A source that could be read at all always yields an outcome; malformed
/// records end up in `skipped` instead of failing the whole source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseOutcome {
    /// Well-formed messages, in source order
    pub messages: Vec<Message>,
    /// Records that were skipped, in source order
    pub skipped: Vec<RecordError>,
}

impl ParseOutcome {
    /// Returns `true` if no record was skipped.
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Unified trait for message sources.
///
/// Implementors provide [`parse_str`](Parser::parse_str); byte decoding and
/// file reading have default implementations that text formats may refine.
///
/// # Example Implementation
///
/// ```rust,ignore
/// impl Parser for MyParser {
///     fn name(&self) -> &'static str { "Mine" }
///     fn platform(&self) -> Platform { Platform::VkOpt }
///
///     fn parse_str(&self, content: &str) -> Result<ParseOutcome, ChatstatError> {
///         Ok(ParseOutcome::default())
///     }
/// }
/// ```
pub trait Parser: Send + Sync {
    /// Returns the human-readable name of this parser.
    fn name(&self) -> &'static str;

    /// Returns the platform this parser handles.
    fn platform(&self) -> Platform;

    /// Parses already-decoded source content.
    ///
    /// # Errors
    ///
    /// Returns [`ChatstatError`] only when the content as a whole cannot be
    /// understood. Individual bad records are reported in
    /// [`ParseOutcome::skipped`].
    fn parse_str(&self, content: &str) -> Result<ParseOutcome, ChatstatError>;

    /// Decodes raw bytes and parses them.
    ///
    /// The default implementation requires UTF-8 and strips a leading BOM.
    fn parse_bytes(&self, bytes: &[u8]) -> Result<ParseOutcome, ChatstatError> {
        let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
        let content = std::str::from_utf8(bytes).map_err(|e| {
            ChatstatError::encoding(self.name(), format!("invalid UTF-8: {e}"))
        })?;
        self.parse_str(content)
    }

    /// Reads and parses a file.
    ///
    /// # Errors
    ///
    /// - [`ChatstatError::Io`] if the file cannot be read
    /// - [`ChatstatError::Encoding`] if it cannot be decoded
    /// - [`ChatstatError::Parse`] if its structure is unusable
    fn parse(&self, path: &Path) -> Result<ParseOutcome, ChatstatError> {
        let bytes = fs::read(path)?;
        self.parse_bytes(&bytes).map_err(|err| match err {
            ChatstatError::Encoding { message, .. } => {
                ChatstatError::encoding(path.display().to_string(), message)
            }
            other => other.with_path(path),
        })
    }

    /// Reads and parses a file (convenience method accepting `&str` path).
    fn parse_file(&self, path: &str) -> Result<ParseOutcome, ChatstatError> {
        self.parse(Path::new(path))
    }
}

/// Creates a parser with default configuration for the specified platform.
///
/// # Errors
///
/// Returns [`ChatstatError::InvalidConfig`] if the parser's feature is not
/// enabled in this build.
///
/// # Example
///
/// ```rust
/// # #[cfg(feature = "telegram")]
/// # fn main() {
/// use chatstat::parser::{Platform, create_parser};
///
/// let parser = create_parser(Platform::Telegram).unwrap();
/// assert_eq!(parser.name(), "Telegram");
/// # }
/// # #[cfg(not(feature = "telegram"))]
/// # fn main() {}
/// ```
pub fn create_parser(platform: Platform) -> Result<Box<dyn Parser>, ChatstatError> {
    match platform {
        #[cfg(feature = "telegram")]
        Platform::Telegram => Ok(Box::new(crate::parsers::TelegramParser::new())),
        #[cfg(feature = "vkopt")]
        Platform::VkOpt => Ok(Box::new(crate::parsers::VkOptParser::new())),
        #[allow(unreachable_patterns)]
        _ => Err(ChatstatError::invalid_config(format!(
            "parser for {platform} is not enabled in this build"
        ))),
    }
}
