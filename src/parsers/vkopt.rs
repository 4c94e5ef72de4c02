//! vkOpt text export parser.

use tracing::{debug, warn};

use crate::config::VkOptConfig;
use crate::error::ChatstatError;
use crate::parser::{ParseOutcome, Parser, Platform};
use crate::parsing::encoding::decode;
use crate::parsing::vkopt::{FORMAT, parse_export};

/// Parser for vkOpt TXT exports.
///
/// Block timestamps are local wall-clock times; they are converted to UTC
/// with [`VkOptConfig::utc_offset_minutes`].
///
/// # Example
///
/// ```rust
/// use chatstat::parsers::VkOptParser;
/// use chatstat::parser::Parser;
/// use chatstat::config::VkOptConfig;
///
/// let parser = VkOptParser::with_config(VkOptConfig::new().with_utc_offset_minutes(180));
/// let outcome = parser.parse_str("Alice (Jan 1, 2020):\nhello\n\n13:00:00 01/01/2020\n")?;
/// assert_eq!(outcome.messages[0].timestamp().to_rfc3339(), "2020-01-01T10:00:00+00:00");
/// # Ok::<(), chatstat::ChatstatError>(())
/// ```
pub struct VkOptParser {
    config: VkOptConfig,
}

impl VkOptParser {
    /// Creates a new parser with default configuration.
    pub fn new() -> Self {
        Self {
            config: VkOptConfig::default(),
        }
    }

    /// Creates a parser with custom configuration.
    pub fn with_config(config: VkOptConfig) -> Self {
        Self { config }
    }

    /// Returns the current configuration.
    pub fn config(&self) -> &VkOptConfig {
        &self.config
    }
}

impl Default for VkOptParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for VkOptParser {
    fn name(&self) -> &'static str {
        "vkOpt"
    }

    fn platform(&self) -> Platform {
        Platform::VkOpt
    }

    fn parse_str(&self, content: &str) -> Result<ParseOutcome, ChatstatError> {
        self.config.validate()?;
        let outcome = parse_export(content, self.config.utc_offset());

        if outcome.messages.is_empty() && !outcome.skipped.is_empty() {
            return Err(ChatstatError::vkopt_parse(
                format!(
                    "no message block could be read ({} malformed)",
                    outcome.skipped.len()
                ),
                None,
            ));
        }
        if !outcome.skipped.is_empty() {
            warn!(
                format = FORMAT,
                skipped = outcome.skipped.len(),
                "skipped malformed blocks"
            );
        }
        debug!(format = FORMAT, messages = outcome.messages.len(), "parsed export");
        Ok(outcome)
    }

    fn parse_bytes(&self, bytes: &[u8]) -> Result<ParseOutcome, ChatstatError> {
        let content = decode(bytes, self.config.encoding, FORMAT)?;
        self.parse_str(&content)
    }
}
