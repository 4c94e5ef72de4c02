//! Message selection and result writers.
//!
//! This module contains:
//! - [`filter`] - Message selection by date, author and content
//! - [`output`] - Format writers (JSON aggregates, CSV tables)
//!
//! # Quick Start
//!
//! ```rust
//! # #[cfg(all(feature = "csv-output", feature = "json-output"))]
//! # fn example() {
//! use chatstat::core::{
//!     FilterConfig, apply_filters,
//!     write_aggregates_json, write_scalar_info_csv, write_top_words_csv,
//! };
//! # }
//! ```

pub mod filter;
pub mod output;

// Re-export main types for convenience
pub use filter::{FilterConfig, apply_filters};

// Conditionally re-export output writers
#[cfg(feature = "csv-output")]
pub use output::{to_scalar_info_csv, to_top_words_csv, write_scalar_info_csv, write_top_words_csv};
#[cfg(feature = "json-output")]
pub use output::{to_aggregates_json, write_aggregates_json};
