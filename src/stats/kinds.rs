//! Message kind ratios, overall and per timeline bucket.

use std::collections::BTreeMap;

use chrono::{FixedOffset, NaiveDate};

use super::temporal::{Period, local_date, period_starts};
use crate::{Message, MessageKind};

/// Label of the pseudo-kind for text messages that are a bare link.
pub const LINK: &str = "link";

/// Message counts of one timeline bucket, split by kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindBucket {
    /// First day of the bucket
    pub start: NaiveDate,
    /// Count per kind; every kind is present
    pub kinds: BTreeMap<MessageKind, u64>,
    /// Text messages that are a single URL (also counted as text)
    pub links: u64,
}

impl KindBucket {
    fn empty(start: NaiveDate) -> Self {
        Self {
            start,
            kinds: MessageKind::ALL.into_iter().map(|k| (k, 0)).collect(),
            links: 0,
        }
    }

    /// All messages of the bucket.
    pub fn total(&self) -> u64 {
        self.kinds.values().sum()
    }

    /// Fraction of the bucket's messages per kind, in [`MessageKind::ALL`]
    /// order. An empty bucket has all-zero shares.
    pub fn shares(&self) -> Vec<(MessageKind, f64)> {
        let total = self.total();
        MessageKind::ALL
            .into_iter()
            .map(|k| (k, ratio(self.kinds.get(&k).copied().unwrap_or(0), total)))
            .collect()
    }

    /// Non-text messages and links, normalized among themselves.
    ///
    /// Categories are [`MessageKind::NON_TEXT`] followed by [`LINK`]; they
    /// sum to 1 unless the bucket has none of them, in which case all are 0.
    pub fn non_text_shares(&self) -> Vec<(String, f64)> {
        let mut values: Vec<(String, u64)> = MessageKind::NON_TEXT
            .into_iter()
            .map(|k| (k.as_str().to_string(), self.kinds.get(&k).copied().unwrap_or(0)))
            .collect();
        values.push((LINK.to_string(), self.links));

        let total: u64 = values.iter().map(|(_, v)| v).sum();
        values
            .into_iter()
            .map(|(label, v)| (label, ratio(v, total)))
            .collect()
    }
}

fn ratio(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64
    }
}

/// Counts messages per kind for every timeline bucket, zero-filled from the
/// first to the last message.
pub fn kind_breakdown<'a>(
    messages: impl IntoIterator<Item = &'a Message>,
    offset: FixedOffset,
    period: Period,
) -> Vec<KindBucket> {
    let mut buckets: BTreeMap<NaiveDate, KindBucket> = BTreeMap::new();
    for msg in messages {
        let start = period.start_of(local_date(msg.timestamp(), offset));
        let bucket = buckets
            .entry(start)
            .or_insert_with(|| KindBucket::empty(start));
        *bucket.kinds.entry(msg.kind()).or_insert(0) += 1;
        if msg.kind().is_text() && msg.is_link() {
            bucket.links += 1;
        }
    }

    let (Some(&first), Some(&last)) = (buckets.keys().next(), buckets.keys().next_back()) else {
        return Vec::new();
    };
    period_starts(first, last, period)
        .into_iter()
        .map(|start| {
            buckets
                .remove(&start)
                .unwrap_or_else(|| KindBucket::empty(start))
        })
        .collect()
}

/// Overall fraction of messages per kind, in [`MessageKind::ALL`] order.
///
/// Empty input yields an empty vector.
pub fn kind_shares<'a>(messages: impl IntoIterator<Item = &'a Message>) -> Vec<(MessageKind, f64)> {
    let mut counts: BTreeMap<MessageKind, u64> = BTreeMap::new();
    for msg in messages {
        *counts.entry(msg.kind()).or_insert(0) += 1;
    }
    let total: u64 = counts.values().sum();
    if total == 0 {
        return Vec::new();
    }
    MessageKind::ALL
        .into_iter()
        .map(|k| (k, ratio(counts.get(&k).copied().unwrap_or(0), total)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Offset, TimeZone, Utc};

    fn at(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 1, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_kind_breakdown_per_week() {
        let msgs = vec![
            Message::new_text("A", at(6), "hi"),
            Message::non_text("A", at(6), MessageKind::Photo),
            Message::new_text("B", at(7), "https://example.com"),
            Message::non_text("B", at(21), MessageKind::Sticker),
        ];
        let buckets = kind_breakdown(&msgs, Utc.fix(), Period::Week);
        assert_eq!(buckets.len(), 3);
        assert_eq!(buckets[0].total(), 3);
        assert_eq!(buckets[0].links, 1);
        assert_eq!(buckets[1].total(), 0);
        assert_eq!(buckets[2].kinds[&MessageKind::Sticker], 1);
    }

    #[test]
    fn test_non_text_shares_normalized() {
        let msgs = vec![
            Message::new_text("A", at(6), "hello"),
            Message::non_text("A", at(6), MessageKind::Photo),
            Message::non_text("A", at(6), MessageKind::Photo),
            Message::non_text("A", at(6), MessageKind::Voice),
            Message::new_text("A", at(6), "https://example.com"),
        ];
        let buckets = kind_breakdown(&msgs, Utc.fix(), Period::Week);
        let shares = buckets[0].non_text_shares();
        let get = |label: &str| shares.iter().find(|(l, _)| l == label).unwrap().1;
        assert!((get("photo") - 0.5).abs() < 1e-9);
        assert!((get("voice") - 0.25).abs() < 1e-9);
        assert!((get(LINK) - 0.25).abs() < 1e-9);
        let sum: f64 = shares.iter().map(|(_, v)| v).sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_shares_of_text_only_bucket() {
        let msgs = vec![Message::new_text("A", at(6), "hello")];
        let buckets = kind_breakdown(&msgs, Utc.fix(), Period::Day);
        assert!(buckets[0].non_text_shares().iter().all(|(_, v)| v.abs() < f64::EPSILON));
        assert_eq!(buckets[0].shares()[0], (MessageKind::Text, 1.0));
    }

    #[test]
    fn test_kind_shares() {
        let msgs = vec![
            Message::new_text("A", at(6), "hello"),
            Message::non_text("A", at(6), MessageKind::Video),
        ];
        let shares = kind_shares(&msgs);
        assert_eq!(shares.len(), MessageKind::ALL.len());
        assert_eq!(shares[0], (MessageKind::Text, 0.5));
        assert!(kind_shares(&Vec::<Message>::new()).is_empty());
    }
}
