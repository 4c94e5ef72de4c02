//! Configuration types for parsers, normalization and analysis.
//!
//! Every stage receives its configuration explicitly; nothing is read from
//! process-wide state.
//!
//! - [`TelegramConfig`] - author resolution for Telegram API objects
//! - [`VkOptConfig`] - encoding and local time zone of vkOpt text exports
//! - [`NormalizeConfig`] - sane timestamp bounds for the normalizer
//! - [`AnalysisConfig`] - bucketing time zone and aggregate options
//!
//! # Example
//!
//! ```rust
//! use chatstat::config::{TelegramConfig, VkOptConfig, TextEncoding};
//!
//! let tg = TelegramConfig::new("Me", "Kate").with_target_id(99990);
//! let vk = VkOptConfig::new()
//!     .with_encoding(TextEncoding::Utf8)
//!     .with_utc_offset_minutes(180);
//! assert_eq!(vk.utc_offset().local_minus_utc(), 180 * 60);
//! ```

use chrono::{DateTime, FixedOffset, Offset, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::core::filter::FilterConfig;
use crate::error::ChatstatError;
use crate::stats::temporal::DayRange;

/// Converts a UTC offset in minutes to a [`FixedOffset`].
///
/// Out-of-range values (beyond ±24h) fall back to UTC.
pub fn fixed_offset(minutes: i32) -> FixedOffset {
    FixedOffset::east_opt(minutes.saturating_mul(60))
        .unwrap_or_else(|| Utc.fix())
}

fn check_offset(minutes: i32) -> Result<(), ChatstatError> {
    if FixedOffset::east_opt(minutes.saturating_mul(60)).is_none() {
        return Err(ChatstatError::invalid_config(format!(
            "UTC offset of {minutes} minutes is out of range"
        )));
    }
    Ok(())
}

/// Configuration for Telegram API objects.
///
/// The retrieval collaborator hands over raw API messages; only the numeric
/// sender id is reliable there, so authors are resolved against the dialogue
/// partner's id: messages from `target_id` belong to `target_name`, all
/// others to `your_name`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Display name for messages sent by the account owner
    pub your_name: String,

    /// Display name for messages sent by the dialogue partner
    pub target_name: String,

    /// Sender id of the dialogue partner (default: none, use sender names)
    pub target_id: Option<i64>,

    /// Skip invalid records instead of failing the source (default: true)
    pub skip_invalid: bool,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self::new("", "")
    }
}

impl TelegramConfig {
    /// Creates a configuration with the two participant names.
    pub fn new(your_name: impl Into<String>, target_name: impl Into<String>) -> Self {
        Self {
            your_name: your_name.into(),
            target_name: target_name.into(),
            target_id: None,
            skip_invalid: true,
        }
    }

    /// Sets the dialogue partner's sender id.
    #[must_use]
    pub fn with_target_id(mut self, id: i64) -> Self {
        self.target_id = Some(id);
        self
    }

    /// Sets whether to skip invalid records.
    #[must_use]
    pub fn with_skip_invalid(mut self, skip: bool) -> Self {
        self.skip_invalid = skip;
        self
    }
}

/// Text encoding of a file-based source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextEncoding {
    /// Honour a byte-order mark, otherwise require UTF-8
    #[default]
    Auto,
    /// UTF-8, with or without BOM
    #[serde(rename = "utf-8", alias = "utf8")]
    Utf8,
    /// UTF-16 little endian
    #[serde(rename = "utf-16-le", alias = "utf16-le")]
    Utf16Le,
    /// UTF-16 big endian
    #[serde(rename = "utf-16-be", alias = "utf16-be")]
    Utf16Be,
}

/// Configuration for vkOpt text exports.
///
/// # Example
///
/// ```rust
/// use chatstat::config::VkOptConfig;
///
/// let config = VkOptConfig::new().with_utc_offset_minutes(120);
/// assert_eq!(config.utc_offset_minutes, 120);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VkOptConfig {
    /// Encoding of the export file (default: auto-detect)
    pub encoding: TextEncoding,

    /// Offset of the export's wall-clock times from UTC, in minutes (default: 0)
    pub utc_offset_minutes: i32,
}

impl Default for VkOptConfig {
    fn default() -> Self {
        Self {
            encoding: TextEncoding::Auto,
            utc_offset_minutes: 0,
        }
    }
}

impl VkOptConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the file encoding.
    #[must_use]
    pub fn with_encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Sets the UTC offset of the export's timestamps.
    #[must_use]
    pub fn with_utc_offset_minutes(mut self, minutes: i32) -> Self {
        self.utc_offset_minutes = minutes;
        self
    }

    /// Returns the offset as a chrono time zone.
    pub fn utc_offset(&self) -> FixedOffset {
        fixed_offset(self.utc_offset_minutes)
    }

    /// Checks that every value is in range.
    pub fn validate(&self) -> Result<(), ChatstatError> {
        check_offset(self.utc_offset_minutes)
    }
}

/// Configuration for the message normalizer.
///
/// Messages outside `[earliest, now + clock_skew]` are excluded and reported.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeConfig {
    /// Earliest plausible timestamp (default: 2006-10-10, VK's launch)
    pub earliest: DateTime<Utc>,

    /// Tolerated clock skew into the future, in seconds (default: one day)
    pub clock_skew_secs: i64,

    /// Reference "now" (default: none, use the system clock)
    pub now: Option<DateTime<Utc>>,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            earliest: Utc
                .with_ymd_and_hms(2006, 10, 10, 0, 0, 0)
                .single()
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
            clock_skew_secs: 24 * 60 * 60,
            now: None,
        }
    }
}

impl NormalizeConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the earliest plausible timestamp.
    #[must_use]
    pub fn with_earliest(mut self, earliest: DateTime<Utc>) -> Self {
        self.earliest = earliest;
        self
    }

    /// Sets the tolerated clock skew.
    #[must_use]
    pub fn with_clock_skew_secs(mut self, secs: i64) -> Self {
        self.clock_skew_secs = secs;
        self
    }

    /// Pins the reference time, mostly for tests.
    #[must_use]
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    /// Latest accepted timestamp.
    pub fn latest(&self) -> DateTime<Utc> {
        let now = self.now.unwrap_or_else(Utc::now);
        // capped at ten years so the addition cannot overflow
        now + chrono::Duration::seconds(self.clock_skew_secs.clamp(0, 10 * 365 * 86_400))
    }
}

/// Granularity of the timeline used by trend aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimelineGranularity {
    /// Months when the conversation spans more than two calendar months, weeks otherwise
    #[default]
    Auto,
    /// Calendar days
    Day,
    /// Monday-aligned weeks
    Week,
    /// Calendar months
    Month,
}

/// Configuration for the aggregation engine.
///
/// # Example
///
/// ```rust
/// use chatstat::config::{AnalysisConfig, TimelineGranularity};
///
/// let config = AnalysisConfig::new()
///     .with_utc_offset_minutes(180)
///     .with_top_n(20)
///     .with_timeline(TimelineGranularity::Week);
/// assert_eq!(config.top_n, 20);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Local time zone used for bucketing, minutes east of UTC (default: 0)
    pub utc_offset_minutes: i32,

    /// Width of minute-of-day bins (default: 2)
    pub minute_bin: u32,

    /// Length of ranked emoji/word tables (default: 10)
    pub top_n: usize,

    /// Timeline granularity for trend aggregates (default: auto)
    pub timeline: TimelineGranularity,

    /// Explicit day range for the per-day timeline (default: first..last message)
    pub day_range: Option<DayRange>,

    /// Filter applied before content-based aggregates
    pub content_filter: FilterConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 0,
            minute_bin: 2,
            top_n: 10,
            timeline: TimelineGranularity::Auto,
            day_range: None,
            content_filter: FilterConfig::content_defaults(),
        }
    }
}

impl AnalysisConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the local time zone for bucketing.
    #[must_use]
    pub fn with_utc_offset_minutes(mut self, minutes: i32) -> Self {
        self.utc_offset_minutes = minutes;
        self
    }

    /// Sets the minute-of-day bin width.
    #[must_use]
    pub fn with_minute_bin(mut self, minutes: u32) -> Self {
        self.minute_bin = minutes;
        self
    }

    /// Sets the length of ranked tables.
    #[must_use]
    pub fn with_top_n(mut self, n: usize) -> Self {
        self.top_n = n;
        self
    }

    /// Sets the timeline granularity.
    #[must_use]
    pub fn with_timeline(mut self, timeline: TimelineGranularity) -> Self {
        self.timeline = timeline;
        self
    }

    /// Requests an explicit day range for the per-day timeline.
    #[must_use]
    pub fn with_day_range(mut self, range: DayRange) -> Self {
        self.day_range = Some(range);
        self
    }

    /// Replaces the content filter.
    #[must_use]
    pub fn with_content_filter(mut self, filter: FilterConfig) -> Self {
        self.content_filter = filter;
        self
    }

    /// Returns the bucketing time zone.
    pub fn utc_offset(&self) -> FixedOffset {
        fixed_offset(self.utc_offset_minutes)
    }

    /// Checks that every value is in range.
    pub fn validate(&self) -> Result<(), ChatstatError> {
        check_offset(self.utc_offset_minutes)?;
        if self.minute_bin == 0 || self.minute_bin > 24 * 60 {
            return Err(ChatstatError::invalid_config(format!(
                "minute bin must be within 1..=1440, got {}",
                self.minute_bin
            )));
        }
        Ok(())
    }
}
