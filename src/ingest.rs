//! Combining several sources into one conversation.
//!
//! A dialogue often comes from more than one place: an old vkOpt export plus
//! the live Telegram history, or a cache plus fresh API pages. [`Ingestor`]
//! parses each source on its own, isolates source-level failures, collects
//! record-level reports and hands every successful batch to the
//! [normalizer](crate::normalize).
//!
//! # Example
//!
//! ```rust,no_run
//! use chatstat::ingest::{Ingestor, Source};
//!
//! let ingested = Ingestor::new().ingest(vec![
//!     Source::VkOptFile("vk_dialog.txt".into()),
//!     Source::TelegramFile("telegram.json".into()),
//! ])?;
//! for failure in &ingested.failures {
//!     eprintln!("{failure}");
//! }
//! println!("{} messages", ingested.conversation.len());
//! # Ok::<(), chatstat::ChatstatError>(())
//! ```

use std::fmt;
use std::path::PathBuf;

use tracing::{info, instrument, warn};

use crate::Message;
use crate::config::{NormalizeConfig, TelegramConfig, VkOptConfig};
use crate::conversation::Conversation;
use crate::error::{ChatstatError, RecordError};
use crate::normalize::normalize;
use crate::parser::{ParseOutcome, Parser};

#[cfg(feature = "telegram")]
use crate::parsing::telegram::ApiMessage;

/// One input of an ingest run.
#[derive(Debug, Clone)]
pub enum Source {
    /// A vkOpt TXT export on disk
    #[cfg(feature = "vkopt")]
    VkOptFile(PathBuf),
    /// Telegram API objects saved as JSON
    #[cfg(feature = "telegram")]
    TelegramFile(PathBuf),
    /// Telegram API objects handed over by the retrieval collaborator
    #[cfg(feature = "telegram")]
    TelegramRecords {
        /// Name used in reports
        label: String,
        /// Raw API objects, in any order
        records: Vec<ApiMessage>,
    },
    /// A message cache written by [`write_cache`](crate::cache::write_cache)
    #[cfg(feature = "json-output")]
    CacheFile(PathBuf),
    /// Messages that are already canonical, e.g. loaded from a cache
    Messages {
        /// Name used in reports
        label: String,
        /// The messages
        messages: Vec<Message>,
    },
}

impl Source {
    /// Name of the source for reports.
    pub fn label(&self) -> String {
        match self {
            #[cfg(feature = "vkopt")]
            Source::VkOptFile(path) => path.display().to_string(),
            #[cfg(feature = "telegram")]
            Source::TelegramFile(path) => path.display().to_string(),
            #[cfg(feature = "telegram")]
            Source::TelegramRecords { label, .. } => label.clone(),
            #[cfg(feature = "json-output")]
            Source::CacheFile(path) => path.display().to_string(),
            Source::Messages { label, .. } => label.clone(),
        }
    }
}

/// A source that could not be used at all.
#[derive(Debug)]
pub struct SourceFailure {
    /// [`Source::label`] of the failed source
    pub source: String,
    /// Why it failed
    pub error: ChatstatError,
}

impl fmt::Display for SourceFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.source, self.error)
    }
}

/// Result of an ingest run.
#[derive(Debug, Default)]
pub struct Ingested {
    /// The normalized conversation
    pub conversation: Conversation,
    /// Malformed records skipped by the parsers
    pub skipped: Vec<RecordError>,
    /// Messages excluded by the normalizer
    pub rejected: Vec<RecordError>,
    /// Duplicates dropped while merging
    pub duplicates: usize,
    /// Sources that failed as a whole; nothing from them was applied
    pub failures: Vec<SourceFailure>,
}

/// Parses and normalizes a set of sources.
#[derive(Debug, Clone, Default)]
pub struct Ingestor {
    telegram: TelegramConfig,
    vkopt: VkOptConfig,
    normalize: NormalizeConfig,
}

impl Ingestor {
    /// Creates an ingestor with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the Telegram configuration.
    #[must_use]
    pub fn with_telegram(mut self, config: TelegramConfig) -> Self {
        self.telegram = config;
        self
    }

    /// Sets the vkOpt configuration.
    #[must_use]
    pub fn with_vkopt(mut self, config: VkOptConfig) -> Self {
        self.vkopt = config;
        self
    }

    /// Sets the normalizer configuration.
    #[must_use]
    pub fn with_normalize(mut self, config: NormalizeConfig) -> Self {
        self.normalize = config;
        self
    }

    fn parse_source(&self, source: Source) -> Result<ParseOutcome, ChatstatError> {
        match source {
            #[cfg(feature = "vkopt")]
            Source::VkOptFile(path) => {
                crate::parsers::VkOptParser::with_config(self.vkopt.clone()).parse(&path)
            }
            #[cfg(feature = "telegram")]
            Source::TelegramFile(path) => {
                crate::parsers::TelegramParser::with_config(self.telegram.clone()).parse(&path)
            }
            #[cfg(feature = "telegram")]
            Source::TelegramRecords { records, .. } => Ok(
                crate::parsers::TelegramParser::with_config(self.telegram.clone())
                    .parse_records(&records),
            ),
            #[cfg(feature = "json-output")]
            Source::CacheFile(path) => Ok(ParseOutcome {
                messages: crate::cache::read_cache(&path)?.into_messages(),
                skipped: Vec::new(),
            }),
            Source::Messages { messages, .. } => Ok(ParseOutcome {
                messages,
                skipped: Vec::new(),
            }),
        }
    }

    /// Parses every source and normalizes the successful ones together.
    ///
    /// # Errors
    ///
    /// Returns [`ChatstatError::NoUsableSource`] when at least one source
    /// was given and every one of them failed. Partial failures are listed
    /// in [`Ingested::failures`] instead.
    #[instrument(skip_all, fields(sources = sources.len()))]
    pub fn ingest(&self, sources: Vec<Source>) -> Result<Ingested, ChatstatError> {
        let mut batches = Vec::with_capacity(sources.len());
        let mut skipped = Vec::new();
        let mut failures = Vec::new();

        for source in sources {
            let label = source.label();
            match self.parse_source(source) {
                Ok(outcome) => {
                    info!(source = %label, messages = outcome.messages.len(), "source parsed");
                    skipped.extend(outcome.skipped);
                    batches.push(outcome.messages);
                }
                Err(error) => {
                    warn!(source = %label, %error, "source failed");
                    failures.push(SourceFailure {
                        source: label,
                        error,
                    });
                }
            }
        }

        if batches.is_empty() {
            if let Some(first) = failures.first() {
                return Err(ChatstatError::NoUsableSource {
                    count: failures.len(),
                    first: first.to_string(),
                });
            }
        }

        let normalized = normalize(batches, &self.normalize);
        Ok(Ingested {
            conversation: normalized.conversation,
            skipped,
            rejected: normalized.rejected,
            duplicates: normalized.duplicates,
            failures,
        })
    }
}
