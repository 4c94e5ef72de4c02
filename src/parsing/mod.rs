//! Shared parsing utilities.
//!
//! Format details live here so the [`parsers`](crate::parsers) stay thin
//! adapters around the [`Parser`](crate::parser::Parser) trait.

pub mod encoding;

#[cfg(feature = "telegram")]
pub mod telegram;

#[cfg(feature = "vkopt")]
pub mod vkopt;

// Re-export commonly used items
pub use encoding::decode;

#[cfg(feature = "telegram")]
pub use telegram::{ApiDate, ApiMedia, ApiMessage, convert_message, extract_text};

#[cfg(feature = "vkopt")]
pub use vkopt::{is_timestamp_line, parse_export as parse_vkopt_export, parse_header};
