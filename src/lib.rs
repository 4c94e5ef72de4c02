//! # Chatstat
//!
//! A Rust library for turning a two-person dialogue, exported from Telegram
//! and VK, into one clean timeline and a catalog of chart-ready statistics.
//!
//! ## Overview
//!
//! Chatstat reads messages from:
//! - **Telegram**: message objects returned by the Telegram API, saved as JSON
//! - **vkOpt**: the plain-text dialogue export of the vkOpt browser extension
//!
//! Every source is normalized into one [`Conversation`]: a single
//! chronologically ordered sequence with duplicates removed and implausible
//! timestamps excluded. The [`stats`] engine then computes the aggregates
//! (activity over time, content, message kinds, per-author breakdowns and
//! summary facts) and the [`core::output`] writers store them for rendering.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! # #[cfg(all(feature = "vkopt", feature = "json-output"))]
//! # fn main() -> chatstat::Result<()> {
//! use chatstat::prelude::*;
//!
//! let ingested = Ingestor::new()
//!     .with_vkopt(VkOptConfig::new().with_utc_offset_minutes(180))
//!     .ingest(vec![Source::VkOptFile("vk_dialog.txt".into())])?;
//!
//! let result = Analyzer::new(AnalysisConfig::default()).analyze(&ingested.conversation);
//! write_aggregates_json(&result, "aggregates.json")?;
//! # Ok(())
//! # }
//! # #[cfg(not(all(feature = "vkopt", feature = "json-output")))]
//! # fn main() {}
//! ```
//!
//! ## Module Structure
//!
//! - [`parser`]: the [`Parser`](parser::Parser) trait, [`Platform`](parser::Platform) and [`create_parser`](parser::create_parser)
//! - [`parsers`]: [`TelegramParser`](parsers::TelegramParser), [`VkOptParser`](parsers::VkOptParser)
//! - [`parsing`]: format internals shared by the parsers (text decoding, record layouts)
//! - [`normalize`]: merging batches into a [`Conversation`]
//! - [`ingest`]: parse several sources and normalize them in one step
//! - [`stats`]: the aggregation engine
//! - [`core`]: message filters and result writers
//! - [`cache`]: storing and reloading normalized messages
//! - [`config`]: parser, normalizer and analysis configuration
//! - [`error`]: [`ChatstatError`] and record-level [`RecordError`](error::RecordError)
//! - [`prelude`]: convenient re-exports
//!
//! ## Feature Flags
//!
//! | Feature | Description | Dependencies |
//! |---------|-------------|--------------|
//! | `telegram` | Telegram API parser | `serde_json` |
//! | `vkopt` | vkOpt TXT parser | - |
//! | `csv-output` | CSV tables | `csv` |
//! | `json-output` | JSON aggregates and message cache | `serde_json` |
//! | `cli` | `chatstat` binary | `clap`, `toml`, `tracing-subscriber` |
//! | `full` | Everything above (default) | all |

#[cfg(feature = "json-output")]
pub mod cache;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod conversation;
pub mod core;
pub mod error;
pub mod ingest;
pub mod message;
pub mod normalize;
pub mod parser;
pub mod parsers;
pub mod parsing;
pub mod stats;
pub mod words;

// Re-export the main types at the crate root for convenience
pub use conversation::Conversation;
pub use error::{ChatstatError, Result};
pub use message::{Message, MessageKind};

/// Convenient re-exports for common usage.
///
/// ```rust
/// use chatstat::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{Conversation, Message, MessageKind};

    pub use crate::error::{ChatstatError, RecordError, Result};

    pub use crate::parser::{ParseOutcome, Parser, Platform, create_parser};

    pub use crate::config::{
        AnalysisConfig, NormalizeConfig, TelegramConfig, TextEncoding, TimelineGranularity,
        VkOptConfig,
    };

    pub use crate::core::filter::{FilterConfig, apply_filters};

    pub use crate::ingest::{Ingested, Ingestor, Source};
    pub use crate::normalize::{Normalized, normalize};

    pub use crate::stats::{AggregateResult, AggregateValue, Analyzer, metric};

    pub use crate::words::{WordSet, load_words};

    #[cfg(feature = "json-output")]
    pub use crate::cache::{read_cache, write_cache};
    #[cfg(feature = "json-output")]
    pub use crate::core::output::write_aggregates_json;
    #[cfg(feature = "csv-output")]
    pub use crate::core::output::{write_scalar_info_csv, write_top_words_csv};

    #[cfg(feature = "telegram")]
    pub use crate::parsers::TelegramParser;
    #[cfg(feature = "vkopt")]
    pub use crate::parsers::VkOptParser;
}
