//! Message source parsers.
//!
//! Each parser implements the [`Parser`](crate::parser::Parser) trait.
//!
//! # Available Parsers
//!
//! - [`TelegramParser`] - Telegram API message objects (JSON)
//! - [`VkOptParser`] - vkOpt TXT exports of VK dialogues
//!
//! # Example
//!
//! ```rust
//! # #[cfg(feature = "vkopt")]
//! # fn main() {
//! use chatstat::parser::Parser;
//! use chatstat::parsers::VkOptParser;
//!
//! let parser = VkOptParser::new();
//! assert_eq!(parser.name(), "vkOpt");
//! // let outcome = parser.parse("dialog.txt".as_ref())?;
//! # }
//! # #[cfg(not(feature = "vkopt"))]
//! # fn main() {}
//! ```

#[cfg(feature = "telegram")]
mod telegram;
#[cfg(feature = "vkopt")]
mod vkopt;

#[cfg(feature = "telegram")]
pub use telegram::TelegramParser;
#[cfg(feature = "vkopt")]
pub use vkopt::VkOptParser;
