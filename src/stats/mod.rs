//! Aggregation engine.
//!
//! Each submodule holds pure functions over messages:
//!
//! - [`temporal`] - counts per day, week, month, weekday, hour, minute bin
//! - [`content`] - lengths, words, emoji
//! - [`kinds`] - message kind ratios per timeline bucket
//! - [`authors`] - per-author counts, timelines and content totals
//! - [`summary`] - scalar facts (duration, most active day, longest pause)
//!
//! [`Analyzer`] runs the whole catalog over a [`Conversation`] and collects
//! the results under the identifiers of [`metric`] into an
//! [`AggregateResult`], the value handed to the rendering side.
//!
//! # Example
//!
//! ```
//! use chatstat::config::{AnalysisConfig, NormalizeConfig};
//! use chatstat::normalize::normalize;
//! use chatstat::stats::{Analyzer, metric};
//! use chatstat::Message;
//! use chrono::{TimeZone, Utc};
//!
//! let ts = Utc.with_ymd_and_hms(2020, 1, 1, 10, 0, 0).unwrap();
//! let batch = vec![Message::new_text("Alice", ts, "hello 😀")];
//! let conversation = normalize(vec![batch], &NormalizeConfig::default()).conversation;
//!
//! let result = Analyzer::new(AnalysisConfig::default()).analyze(&conversation);
//! assert_eq!(result.count(metric::TOTAL_MESSAGES), Some(1));
//! assert_eq!(result.counts(metric::MESSAGES_PER_DAY).unwrap()["2020-01-01"], 1);
//! ```

pub mod authors;
pub mod content;
pub mod kinds;
pub mod summary;
pub mod temporal;

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::Message;
use crate::config::AnalysisConfig;
use crate::conversation::Conversation;
use crate::core::filter::apply_filters;
use crate::words::WordSet;

use self::temporal::Period;

/// Identifiers of every aggregate computed by [`Analyzer`].
pub mod metric {
    /// Number of messages ([`Count`](super::AggregateValue::Count))
    pub const TOTAL_MESSAGES: &str = "total_messages";
    /// Messages per calendar day, zero-filled, keyed `YYYY-MM-DD`
    pub const MESSAGES_PER_DAY: &str = "messages_per_day";
    /// Messages per Monday-aligned week, keyed by the Monday
    pub const MESSAGES_PER_WEEK: &str = "messages_per_week";
    /// Messages per calendar month, keyed `YYYY-MM`
    pub const MESSAGES_PER_MONTH: &str = "messages_per_month";
    /// Messages per weekday, Monday first ([`Series`](super::AggregateValue::Series))
    pub const MESSAGES_PER_WEEKDAY: &str = "messages_per_weekday";
    /// Messages per hour of day, keyed `HH:00`
    pub const MESSAGES_PER_HOUR: &str = "messages_per_hour";
    /// Messages per minute-of-day bin, keyed `HH:MM`
    pub const MESSAGES_PER_MINUTES: &str = "messages_per_minutes";
    /// Resolved trend granularity, `week` or `month` (or `day`)
    pub const TIMELINE_PERIOD: &str = "timeline_period";
    /// Messages per day of month, one row per month
    pub const HEAT_CALENDAR: &str = "heat_calendar";

    /// Text length to message count, ordered by length
    pub const LENGTH_DISTRIBUTION: &str = "length_distribution";
    /// Mean text length
    pub const AVERAGE_LENGTH: &str = "average_length";

    /// Messages per kind
    pub const KIND_COUNTS: &str = "kind_counts";
    /// Fraction of messages per kind
    pub const KIND_SHARES: &str = "kind_shares";
    /// Messages per kind for every timeline bucket
    pub const KIND_COUNTS_PER_PERIOD: &str = "kind_counts_per_period";
    /// Fraction of messages per kind for every timeline bucket
    pub const KIND_SHARES_PER_PERIOD: &str = "kind_shares_per_period";
    /// Non-text kinds and links normalized among themselves, per bucket
    pub const NON_TEXT_SHARES_PER_PERIOD: &str = "non_text_shares_per_period";

    /// Messages per author
    pub const MESSAGES_PER_AUTHOR: &str = "messages_per_author";
    /// Fraction of messages per author
    pub const AUTHOR_SHARES: &str = "author_shares";
    /// Messages per author for every timeline bucket
    pub const MESSAGES_PER_AUTHOR_PER_PERIOD: &str = "messages_per_author_per_period";
    /// Mean text length per author for every timeline bucket
    pub const AVERAGE_LENGTH_PER_AUTHOR_PER_PERIOD: &str = "average_length_per_author_per_period";
    /// Messages per author and weekday
    pub const MESSAGES_PER_AUTHOR_PER_WEEKDAY: &str = "messages_per_author_per_weekday";
    /// Messages, characters and media per author
    pub const AUTHOR_CONTENT: &str = "author_content";

    /// Most frequent words
    pub const WORD_FREQUENCY: &str = "word_frequency";
    /// Most frequent words with per-author counts
    pub const WORD_FREQUENCY_PER_AUTHOR: &str = "word_frequency_per_author";
    /// Most frequent emoji
    pub const EMOJI_FREQUENCY: &str = "emoji_frequency";
    /// Most frequent emoji with per-author counts
    pub const EMOJI_FREQUENCY_PER_AUTHOR: &str = "emoji_frequency_per_author";

    /// RFC 3339 timestamp of the first message
    pub const FIRST_MESSAGE: &str = "first_message";
    /// RFC 3339 timestamp of the last message
    pub const LAST_MESSAGE: &str = "last_message";
    /// Seconds from the first to the last message
    pub const DURATION_SECS: &str = "duration_secs";
    /// Days without any message
    pub const DAYS_WITHOUT_MESSAGES: &str = "days_without_messages";
    /// Busiest day, `YYYY-MM-DD`
    pub const MOST_ACTIVE_DAY: &str = "most_active_day";
    /// Messages on the busiest day
    pub const MOST_ACTIVE_DAY_COUNT: &str = "most_active_day_count";
    /// Messages per calendar day of the conversation's span
    pub const AVERAGE_PER_DAY: &str = "average_per_day";
    /// Longest gap between consecutive messages, in seconds
    pub const LONGEST_PAUSE_SECS: &str = "longest_pause_secs";
    /// Start of the longest gap
    pub const LONGEST_PAUSE_START: &str = "longest_pause_start";
    /// End of the longest gap
    pub const LONGEST_PAUSE_END: &str = "longest_pause_end";
}

/// One row of an [`AggregateValue::Table`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    /// Row label (bucket key, author, metric name)
    pub key: String,
    /// One value per column
    pub values: Vec<f64>,
}

/// The value of one aggregate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum AggregateValue {
    /// Bucket key to count; keys sort in chart order
    Counts(BTreeMap<String, u64>),
    /// Ordered buckets whose keys do not sort naturally
    Series(Vec<(String, u64)>),
    /// Top entries, by count descending then key ascending
    Ranked(Vec<(String, u64)>),
    /// Ordered fractions
    Shares(Vec<(String, f64)>),
    /// Rows of values per column
    Table {
        /// Column labels
        columns: Vec<String>,
        /// Rows, each with one value per column
        rows: Vec<TableRow>,
    },
    /// A real number
    Scalar(f64),
    /// A non-negative integer
    Count(u64),
    /// A label or timestamp
    Text(String),
}

impl AggregateValue {
    /// Returns `true` if the value is empty or zero.
    pub fn is_identity(&self) -> bool {
        match self {
            AggregateValue::Counts(m) => m.is_empty(),
            AggregateValue::Series(v) | AggregateValue::Ranked(v) => v.is_empty(),
            AggregateValue::Shares(v) => v.is_empty(),
            AggregateValue::Table { rows, .. } => rows.is_empty(),
            AggregateValue::Scalar(x) => x.abs() < f64::EPSILON,
            AggregateValue::Count(n) => *n == 0,
            AggregateValue::Text(s) => s.is_empty(),
        }
    }
}

/// Named aggregates of one analysis run.
///
/// Created fresh by [`Analyzer::analyze`]; it holds no reference to the
/// conversation it was computed from.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AggregateResult {
    values: BTreeMap<String, AggregateValue>,
}

impl AggregateResult {
    pub(crate) fn insert(&mut self, id: &str, value: AggregateValue) {
        self.values.insert(id.to_string(), value);
    }

    /// Returns the aggregate stored under `id`.
    pub fn get(&self, id: &str) -> Option<&AggregateValue> {
        self.values.get(id)
    }

    /// Returns a [`AggregateValue::Counts`] map.
    pub fn counts(&self, id: &str) -> Option<&BTreeMap<String, u64>> {
        match self.get(id)? {
            AggregateValue::Counts(m) => Some(m),
            _ => None,
        }
    }

    /// Returns the pairs of a [`AggregateValue::Series`] or [`AggregateValue::Ranked`].
    pub fn pairs(&self, id: &str) -> Option<&[(String, u64)]> {
        match self.get(id)? {
            AggregateValue::Series(v) | AggregateValue::Ranked(v) => Some(v),
            _ => None,
        }
    }

    /// Returns a [`AggregateValue::Shares`] list.
    pub fn shares(&self, id: &str) -> Option<&[(String, f64)]> {
        match self.get(id)? {
            AggregateValue::Shares(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the columns and rows of a [`AggregateValue::Table`].
    pub fn table(&self, id: &str) -> Option<(&[String], &[TableRow])> {
        match self.get(id)? {
            AggregateValue::Table { columns, rows } => Some((columns, rows)),
            _ => None,
        }
    }

    /// Returns a [`AggregateValue::Scalar`].
    pub fn scalar(&self, id: &str) -> Option<f64> {
        match self.get(id)? {
            AggregateValue::Scalar(x) => Some(*x),
            _ => None,
        }
    }

    /// Returns a [`AggregateValue::Count`].
    pub fn count(&self, id: &str) -> Option<u64> {
        match self.get(id)? {
            AggregateValue::Count(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns a [`AggregateValue::Text`].
    pub fn text(&self, id: &str) -> Option<&str> {
        match self.get(id)? {
            AggregateValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Iterates over `(id, value)` in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AggregateValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of aggregates.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if nothing was computed.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// ============================================================================
// Key formatting
// ============================================================================

fn day_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

fn period_key(date: NaiveDate, period: Period) -> String {
    match period {
        Period::Day | Period::Week => day_key(date),
        Period::Month => month_key(date),
    }
}

fn minute_key(minute: u32) -> String {
    format!("{:02}:{:02}", minute / 60, minute % 60)
}

fn keyed<K>(counts: BTreeMap<K, u64>, key: impl Fn(K) -> String) -> AggregateValue {
    AggregateValue::Counts(counts.into_iter().map(|(k, v)| (key(k), v)).collect())
}

// ============================================================================
// Analyzer
// ============================================================================

/// Computes the fixed catalog of aggregates over a conversation.
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    config: AnalysisConfig,
    words: Option<WordSet>,
}

impl Analyzer {
    /// Creates an analyzer with the given configuration.
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config, words: None }
    }

    /// Restricts word statistics to a set of words of interest.
    #[must_use]
    pub fn with_words(mut self, words: WordSet) -> Self {
        self.words = Some(words);
        self
    }

    /// Returns the analysis configuration.
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Runs every aggregate. Never fails; an empty conversation yields
    /// identity values throughout.
    #[instrument(skip_all, fields(messages = conversation.len()))]
    pub fn analyze(&self, conversation: &Conversation) -> AggregateResult {
        let mut result = AggregateResult::default();
        let offset = self.config.utc_offset();
        let messages = conversation.messages();
        let content = apply_filters(messages, &self.config.content_filter);
        let period = temporal::timeline_period(messages, offset, self.config.timeline);
        debug!(
            content_messages = content.len(),
            period = period.as_str(),
            "prepared analysis"
        );

        self.temporal(&mut result, messages, period);
        self.kinds(&mut result, messages, period);
        self.authors(&mut result, conversation, period);
        self.content(&mut result, &content);
        self.summary(&mut result, messages);

        info!(aggregates = result.len(), "analysis complete");
        result
    }

    fn temporal(&self, result: &mut AggregateResult, messages: &[Message], period: Period) {
        let offset = self.config.utc_offset();
        result.insert(metric::TOTAL_MESSAGES, AggregateValue::Count(messages.len() as u64));
        result.insert(
            metric::MESSAGES_PER_DAY,
            keyed(
                temporal::messages_per_day(messages, offset, self.config.day_range.as_ref()),
                day_key,
            ),
        );
        result.insert(
            metric::MESSAGES_PER_WEEK,
            keyed(temporal::messages_per_week(messages, offset), day_key),
        );
        result.insert(
            metric::MESSAGES_PER_MONTH,
            keyed(temporal::messages_per_month(messages, offset), month_key),
        );
        result.insert(
            metric::MESSAGES_PER_WEEKDAY,
            AggregateValue::Series(
                temporal::messages_per_weekday(messages, offset)
                    .into_iter()
                    .map(|(day, count)| (day.to_string(), count))
                    .collect(),
            ),
        );
        result.insert(
            metric::MESSAGES_PER_HOUR,
            keyed(temporal::messages_per_hour(messages, offset), |h| {
                format!("{h:02}:00")
            }),
        );
        result.insert(
            metric::MESSAGES_PER_MINUTES,
            keyed(
                temporal::messages_per_minutes(messages, offset, self.config.minute_bin),
                minute_key,
            ),
        );
        result.insert(
            metric::TIMELINE_PERIOD,
            AggregateValue::Text(if messages.is_empty() {
                String::new()
            } else {
                period.as_str().to_string()
            }),
        );

        let calendar = temporal::heat_calendar(messages, offset);
        result.insert(
            metric::HEAT_CALENDAR,
            AggregateValue::Table {
                columns: (1..=31).map(|d: u32| d.to_string()).collect(),
                rows: calendar
                    .into_iter()
                    .map(|(month, days)| TableRow {
                        key: month_key(month),
                        values: days.iter().map(|&c| c as f64).collect(),
                    })
                    .collect(),
            },
        );
    }

    fn kinds(&self, result: &mut AggregateResult, messages: &[Message], period: Period) {
        let offset = self.config.utc_offset();
        let buckets = kinds::kind_breakdown(messages, offset, period);

        let mut totals: BTreeMap<String, u64> = BTreeMap::new();
        for bucket in &buckets {
            for (kind, count) in &bucket.kinds {
                *totals.entry(kind.as_str().to_string()).or_insert(0) += count;
            }
        }
        result.insert(metric::KIND_COUNTS, AggregateValue::Counts(totals));
        result.insert(
            metric::KIND_SHARES,
            AggregateValue::Shares(
                kinds::kind_shares(messages)
                    .into_iter()
                    .map(|(k, share)| (k.as_str().to_string(), share))
                    .collect(),
            ),
        );

        let kind_columns: Vec<String> = crate::MessageKind::ALL
            .iter()
            .map(|k| k.as_str().to_string())
            .chain(std::iter::once(kinds::LINK.to_string()))
            .collect();
        result.insert(
            metric::KIND_COUNTS_PER_PERIOD,
            AggregateValue::Table {
                columns: kind_columns,
                rows: buckets
                    .iter()
                    .map(|b| TableRow {
                        key: period_key(b.start, period),
                        values: b
                            .kinds
                            .values()
                            .map(|&c| c as f64)
                            .chain(std::iter::once(b.links as f64))
                            .collect(),
                    })
                    .collect(),
            },
        );
        result.insert(
            metric::KIND_SHARES_PER_PERIOD,
            AggregateValue::Table {
                columns: crate::MessageKind::ALL
                    .iter()
                    .map(|k| k.as_str().to_string())
                    .collect(),
                rows: buckets
                    .iter()
                    .map(|b| TableRow {
                        key: period_key(b.start, period),
                        values: b.shares().into_iter().map(|(_, s)| s).collect(),
                    })
                    .collect(),
            },
        );

        let mut non_text_columns = Vec::new();
        let mut non_text_rows = Vec::new();
        for bucket in &buckets {
            let shares = bucket.non_text_shares();
            if non_text_columns.is_empty() {
                non_text_columns = shares.iter().map(|(label, _)| label.clone()).collect();
            }
            non_text_rows.push(TableRow {
                key: period_key(bucket.start, period),
                values: shares.into_iter().map(|(_, s)| s).collect(),
            });
        }
        result.insert(
            metric::NON_TEXT_SHARES_PER_PERIOD,
            AggregateValue::Table {
                columns: non_text_columns,
                rows: non_text_rows,
            },
        );
    }

    fn authors(&self, result: &mut AggregateResult, conversation: &Conversation, period: Period) {
        let offset = self.config.utc_offset();
        let messages = conversation.messages();

        let shares = authors::author_breakdown(messages);
        result.insert(
            metric::MESSAGES_PER_AUTHOR,
            AggregateValue::Counts(shares.iter().map(|s| (s.author.clone(), s.count)).collect()),
        );
        result.insert(
            metric::AUTHOR_SHARES,
            AggregateValue::Shares(shares.into_iter().map(|s| (s.author, s.share)).collect()),
        );

        let author_columns: Vec<String> = conversation.authors().iter().cloned().collect();

        let timeline = authors::author_timeline(messages, offset, period);
        let per_period = |series: &BTreeMap<String, Vec<f64>>| {
            timeline
                .periods
                .iter()
                .enumerate()
                .map(|(i, &start)| TableRow {
                    key: period_key(start, period),
                    values: author_columns
                        .iter()
                        .map(|a| series.get(a).map_or(0.0, |row| row[i]))
                        .collect(),
                })
                .collect::<Vec<_>>()
        };
        let counts_as_f64: BTreeMap<String, Vec<f64>> = timeline
            .counts
            .iter()
            .map(|(a, row)| (a.clone(), row.iter().map(|&c| c as f64).collect()))
            .collect();
        result.insert(
            metric::MESSAGES_PER_AUTHOR_PER_PERIOD,
            AggregateValue::Table {
                columns: author_columns.clone(),
                rows: per_period(&counts_as_f64),
            },
        );
        result.insert(
            metric::AVERAGE_LENGTH_PER_AUTHOR_PER_PERIOD,
            AggregateValue::Table {
                columns: author_columns.clone(),
                rows: per_period(&timeline.average_length),
            },
        );

        let weekdays = authors::author_weekday(messages, offset);
        let weekday_rows = if messages.is_empty() {
            Vec::new()
        } else {
            temporal::WEEKDAYS
                .iter()
                .enumerate()
                .map(|(i, day)| TableRow {
                    key: day.to_string(),
                    values: author_columns
                        .iter()
                        .map(|a| weekdays.get(a).map_or(0.0, |row| row[i] as f64))
                        .collect(),
                })
                .collect()
        };
        result.insert(
            metric::MESSAGES_PER_AUTHOR_PER_WEEKDAY,
            AggregateValue::Table {
                columns: author_columns.clone(),
                rows: weekday_rows,
            },
        );

        let content = authors::author_content(messages, &self.config.content_filter);
        let totals = authors::content_totals(&content);
        let content_rows = if messages.is_empty() {
            Vec::new()
        } else {
            totals
                .values()
                .iter()
                .enumerate()
                .map(|(i, (label, total))| TableRow {
                    key: (*label).to_string(),
                    values: std::iter::once(*total as f64)
                        .chain(content.iter().map(|row| row.values()[i].1 as f64))
                        .collect(),
                })
                .collect()
        };
        result.insert(
            metric::AUTHOR_CONTENT,
            AggregateValue::Table {
                columns: std::iter::once(totals.author.clone())
                    .chain(content.iter().map(|row| row.author.clone()))
                    .collect(),
                rows: content_rows,
            },
        );
    }

    fn content(&self, result: &mut AggregateResult, messages: &[&Message]) {
        let top_n = self.config.top_n;
        let lengths = content::length_distribution(messages.iter().copied());
        result.insert(
            metric::LENGTH_DISTRIBUTION,
            AggregateValue::Series(
                lengths
                    .into_iter()
                    .map(|(len, count)| (len.to_string(), count))
                    .collect(),
            ),
        );
        result.insert(
            metric::AVERAGE_LENGTH,
            AggregateValue::Scalar(content::average_length(messages.iter().copied())),
        );

        let by_author = authors::group_by_author(messages.iter().copied());

        let words = content::word_frequency(messages.iter().copied(), self.words.as_ref());
        let top_words = content::top_n(&words, top_n);
        let author_words: BTreeMap<&str, BTreeMap<String, u64>> = by_author
            .iter()
            .map(|(a, msgs)| {
                (*a, content::word_frequency(msgs.iter().copied(), self.words.as_ref()))
            })
            .collect();
        result.insert(
            metric::WORD_FREQUENCY_PER_AUTHOR,
            per_author_table(&top_words, &author_words),
        );
        result.insert(metric::WORD_FREQUENCY, AggregateValue::Ranked(top_words));

        let emoji: BTreeMap<String, u64> = content::emoji_frequency(messages.iter().copied())
            .into_iter()
            .map(|(c, n)| (c.to_string(), n))
            .collect();
        let top_emoji = content::top_n(&emoji, top_n);
        let author_emoji: BTreeMap<&str, BTreeMap<String, u64>> = by_author
            .iter()
            .map(|(a, msgs)| {
                let counts = content::emoji_frequency(msgs.iter().copied())
                    .into_iter()
                    .map(|(c, n)| (c.to_string(), n))
                    .collect();
                (*a, counts)
            })
            .collect();
        result.insert(
            metric::EMOJI_FREQUENCY_PER_AUTHOR,
            per_author_table(&top_emoji, &author_emoji),
        );
        result.insert(metric::EMOJI_FREQUENCY, AggregateValue::Ranked(top_emoji));
    }

    fn summary(&self, result: &mut AggregateResult, messages: &[Message]) {
        let summary = summary::summarize(messages, self.config.utc_offset());
        let rfc = |ts: Option<chrono::DateTime<chrono::Utc>>| {
            AggregateValue::Text(ts.map(|t| t.to_rfc3339()).unwrap_or_default())
        };

        result.insert(metric::FIRST_MESSAGE, rfc(summary.first_message));
        result.insert(metric::LAST_MESSAGE, rfc(summary.last_message));
        result.insert(
            metric::DURATION_SECS,
            AggregateValue::Count(summary.duration_secs.max(0) as u64),
        );
        result.insert(
            metric::DAYS_WITHOUT_MESSAGES,
            AggregateValue::Count(summary.days_without_messages),
        );
        let (day, day_count) = summary
            .most_active_day
            .map_or((String::new(), 0), |(d, c)| (day_key(d), c));
        result.insert(metric::MOST_ACTIVE_DAY, AggregateValue::Text(day));
        result.insert(metric::MOST_ACTIVE_DAY_COUNT, AggregateValue::Count(day_count));
        result.insert(
            metric::AVERAGE_PER_DAY,
            AggregateValue::Scalar(summary.average_per_day),
        );
        result.insert(
            metric::LONGEST_PAUSE_SECS,
            AggregateValue::Count(
                summary
                    .longest_pause
                    .map_or(0, |p| p.duration().num_seconds().max(0) as u64),
            ),
        );
        result.insert(
            metric::LONGEST_PAUSE_START,
            rfc(summary.longest_pause.map(|p| p.start)),
        );
        result.insert(
            metric::LONGEST_PAUSE_END,
            rfc(summary.longest_pause.map(|p| p.end)),
        );
    }
}

/// Table of the top keys with a `total` column followed by one column per author.
fn per_author_table(
    top: &[(String, u64)],
    per_author: &BTreeMap<&str, BTreeMap<String, u64>>,
) -> AggregateValue {
    let columns = std::iter::once("total".to_string())
        .chain(per_author.keys().map(|a| (*a).to_string()))
        .collect();
    let rows = top
        .iter()
        .map(|(key, total)| TableRow {
            key: key.clone(),
            values: std::iter::once(*total as f64)
                .chain(
                    per_author
                        .values()
                        .map(|counts| counts.get(key).copied().unwrap_or(0) as f64),
                )
                .collect(),
        })
        .collect();
    AggregateValue::Table { columns, rows }
}
