//! Output format writers.
//!
//! This module provides the files handed to the rendering collaborator:
//! - [`write_aggregates_json`] / [`to_aggregates_json`] - the whole aggregate catalog - requires `json-output` feature
//! - [`write_scalar_info_csv`] / [`to_scalar_info_csv`] - summary facts and the per-author content table - requires `csv-output` feature
//! - [`write_top_words_csv`] / [`to_top_words_csv`] - most frequent words with per-participant counts - requires `csv-output` feature
//!
//! The normalized messages themselves are written by the [cache](crate::cache).
//!
//! # Example
//!
//! ```rust,no_run
//! # #[cfg(all(feature = "csv-output", feature = "json-output"))]
//! # fn main() -> chatstat::Result<()> {
//! use chatstat::conversation::Conversation;
//! use chatstat::core::output::{write_aggregates_json, write_top_words_csv};
//! use chatstat::stats::Analyzer;
//!
//! let conversation = Conversation::empty();
//! let result = Analyzer::default().analyze(&conversation);
//!
//! write_aggregates_json(&result, "aggregates.json")?;
//! write_top_words_csv(&conversation, "Me", "Kate", 1000, "words.csv")?;
//! # Ok(())
//! # }
//! # #[cfg(not(all(feature = "csv-output", feature = "json-output")))]
//! # fn main() {}
//! ```

#[cfg(feature = "csv-output")]
mod csv_writer;
#[cfg(feature = "json-output")]
mod json_writer;

#[cfg(feature = "csv-output")]
pub use csv_writer::{
    to_scalar_info_csv, to_top_words_csv, write_scalar_info_csv, write_top_words_csv,
};
#[cfg(feature = "json-output")]
pub use json_writer::{to_aggregates_json, write_aggregates_json};
