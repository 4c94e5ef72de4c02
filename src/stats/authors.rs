//! Per-author statistics.
//!
//! A two-person dialogue is the common case, but nothing here assumes it:
//! every function reports all authors found in its input, in name order.

use std::collections::BTreeMap;

use chrono::{Datelike, FixedOffset, NaiveDate};
use serde::Serialize;

use super::temporal::{Period, local, local_date, period_starts};
use crate::core::filter::FilterConfig;
use crate::{Message, MessageKind};

/// Message count and share of one author.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthorShare {
    /// Author display name
    pub author: String,
    /// Messages sent
    pub count: u64,
    /// Fraction of all messages
    pub share: f64,
}

/// Counts messages per author.
pub fn author_breakdown<'a>(messages: impl IntoIterator<Item = &'a Message>) -> Vec<AuthorShare> {
    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    for msg in messages {
        *counts.entry(msg.author()).or_insert(0) += 1;
    }
    let total: u64 = counts.values().sum();
    counts
        .into_iter()
        .map(|(author, count)| AuthorShare {
            author: author.to_string(),
            count,
            share: count as f64 / total as f64,
        })
        .collect()
}

/// Groups messages by author, keeping input order inside each group.
pub fn group_by_author<'a>(
    messages: impl IntoIterator<Item = &'a Message>,
) -> BTreeMap<&'a str, Vec<&'a Message>> {
    let mut groups: BTreeMap<&str, Vec<&Message>> = BTreeMap::new();
    for msg in messages {
        groups.entry(msg.author()).or_default().push(msg);
    }
    groups
}

/// Message counts and average text length per author and timeline bucket.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AuthorTimeline {
    /// Bucket start days, zero-filled
    pub periods: Vec<NaiveDate>,
    /// Messages per author, aligned with `periods`
    pub counts: BTreeMap<String, Vec<u64>>,
    /// Mean text length per author, aligned with `periods` (0 without text)
    pub average_length: BTreeMap<String, Vec<f64>>,
}

#[derive(Default, Clone, Copy)]
struct Tally {
    messages: u64,
    texts: u64,
    characters: u64,
}

/// Builds the per-author timeline in one pass.
pub fn author_timeline<'a>(
    messages: impl IntoIterator<Item = &'a Message>,
    offset: FixedOffset,
    period: Period,
) -> AuthorTimeline {
    let mut tallies: BTreeMap<&str, BTreeMap<NaiveDate, Tally>> = BTreeMap::new();
    let mut bounds: Option<(NaiveDate, NaiveDate)> = None;

    for msg in messages {
        let start = period.start_of(local_date(msg.timestamp(), offset));
        bounds = Some(match bounds {
            None => (start, start),
            Some((lo, hi)) => (lo.min(start), hi.max(start)),
        });
        let tally = tallies
            .entry(msg.author())
            .or_default()
            .entry(start)
            .or_default();
        tally.messages += 1;
        if msg.kind().is_text() {
            tally.texts += 1;
            tally.characters += msg.length() as u64;
        }
    }

    let Some((first, last)) = bounds else {
        return AuthorTimeline::default();
    };
    let periods = period_starts(first, last, period);

    let mut timeline = AuthorTimeline {
        periods,
        ..AuthorTimeline::default()
    };
    for (author, per_period) in tallies {
        let row: Vec<Tally> = timeline
            .periods
            .iter()
            .map(|p| per_period.get(p).copied().unwrap_or_default())
            .collect();
        timeline
            .counts
            .insert(author.to_string(), row.iter().map(|t| t.messages).collect());
        timeline.average_length.insert(
            author.to_string(),
            row.iter()
                .map(|t| {
                    if t.texts == 0 {
                        0.0
                    } else {
                        t.characters as f64 / t.texts as f64
                    }
                })
                .collect(),
        );
    }
    timeline
}

/// Messages per author and day of the week, Monday first.
pub fn author_weekday<'a>(
    messages: impl IntoIterator<Item = &'a Message>,
    offset: FixedOffset,
) -> BTreeMap<String, [u64; 7]> {
    let mut counts: BTreeMap<String, [u64; 7]> = BTreeMap::new();
    for msg in messages {
        let day = local(msg.timestamp(), offset).weekday().num_days_from_monday() as usize;
        match counts.get_mut(msg.author()) {
            Some(row) => row[day] += 1,
            None => {
                let mut row = [0; 7];
                row[day] = 1;
                counts.insert(msg.author().to_string(), row);
            }
        }
    }
    counts
}

/// Content totals of one author (or of everyone).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuthorContent {
    /// Author display name, or `"TOTAL"` for [`content_totals`]
    pub author: String,
    /// All messages, unfiltered
    pub messages: u64,
    /// Characters of content-filtered text messages
    pub characters: u64,
    /// Content-filtered photos
    pub photos: u64,
    /// Content-filtered stickers
    pub stickers: u64,
    /// Content-filtered audio files
    pub audio: u64,
    /// Content-filtered voice notes
    pub voice: u64,
    /// Content-filtered video messages
    pub video: u64,
}

impl AuthorContent {
    fn named(author: &str) -> Self {
        Self {
            author: author.to_string(),
            ..Self::default()
        }
    }

    fn add_content(&mut self, msg: &Message) {
        match msg.kind() {
            MessageKind::Text => self.characters += msg.length() as u64,
            MessageKind::Photo => self.photos += 1,
            MessageKind::Sticker => self.stickers += 1,
            MessageKind::Audio => self.audio += 1,
            MessageKind::Voice => self.voice += 1,
            MessageKind::Video => self.video += 1,
            MessageKind::Other => {}
        }
    }

    /// Row labels and values in table order.
    pub fn values(&self) -> [(&'static str, u64); 7] {
        [
            ("messages", self.messages),
            ("characters", self.characters),
            ("photos", self.photos),
            ("stickers", self.stickers),
            ("audio", self.audio),
            ("voice", self.voice),
            ("video", self.video),
        ]
    }
}

/// Per-author content table.
///
/// `messages` counts everything; the other columns count only messages that
/// pass `filter` (by default forwards, bare links and over-long texts are
/// left out).
pub fn author_content<'a>(
    messages: impl IntoIterator<Item = &'a Message>,
    filter: &FilterConfig,
) -> Vec<AuthorContent> {
    let mut rows: BTreeMap<&str, AuthorContent> = BTreeMap::new();
    for msg in messages {
        let row = rows
            .entry(msg.author())
            .or_insert_with(|| AuthorContent::named(msg.author()));
        row.messages += 1;
        if filter.matches(msg) {
            row.add_content(msg);
        }
    }
    rows.into_values().collect()
}

/// Sums per-author rows into one `"TOTAL"` row.
pub fn content_totals(rows: &[AuthorContent]) -> AuthorContent {
    rows.iter().fold(AuthorContent::named("TOTAL"), |mut acc, row| {
        acc.messages += row.messages;
        acc.characters += row.characters;
        acc.photos += row.photos;
        acc.stickers += row.stickers;
        acc.audio += row.audio;
        acc.voice += row.voice;
        acc.video += row.video;
        acc
    })
}
