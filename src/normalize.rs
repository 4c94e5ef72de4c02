//! Message normalizer.
//!
//! Turns one or more parser batches of the same dialogue (for example a text
//! export plus several API pages) into one canonical [`Conversation`]:
//!
//! 1. messages outside the plausible time window of [`NormalizeConfig`] are
//!    excluded and reported as [`RecordError::Validation`];
//! 2. each batch is sorted by timestamp, stably, so equal timestamps keep
//!    their input order;
//! 3. the batches are merged. When heads of different batches share a
//!    timestamp the one with the smaller `(author, text, kind, forwarded)`
//!    goes first, and identical heads are consumed together, so the result
//!    does not depend on the order of the batches;
//! 4. duplicates (same author, timestamp and text) are dropped, keeping the
//!    first occurrence.
//!
//! Normalizing an already-canonical sequence returns it unchanged.
//!
//! # Example
//!
//! ```
//! use chatstat::config::NormalizeConfig;
//! use chatstat::normalize::normalize;
//! use chatstat::Message;
//! use chrono::{TimeZone, Utc};
//!
//! let t = |h| Utc.with_ymd_and_hms(2020, 1, 1, h, 0, 0).unwrap();
//! let page1 = vec![Message::new_text("Bob", t(12), "later"), Message::new_text("Alice", t(10), "hi")];
//! let page2 = vec![Message::new_text("Alice", t(10), "hi"), Message::new_text("Alice", t(11), "?")];
//!
//! let out = normalize(vec![page1, page2], &NormalizeConfig::default());
//! let texts: Vec<_> = out.conversation.messages().iter().map(|m| m.text()).collect();
//! assert_eq!(texts, vec!["hi", "?", "later"]);
//! assert_eq!(out.duplicates, 1);
//! ```

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashSet};

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

use crate::config::NormalizeConfig;
use crate::conversation::Conversation;
use crate::error::RecordError;
use crate::{Message, MessageKind};

/// Output of [`normalize`].
#[derive(Debug, Clone, Default)]
pub struct Normalized {
    /// The canonical conversation
    pub conversation: Conversation,
    /// Messages excluded by validation
    pub rejected: Vec<RecordError>,
    /// Number of duplicates dropped
    pub duplicates: usize,
}

fn merge_key(msg: &Message) -> (DateTime<Utc>, &str, &str, MessageKind, bool) {
    (
        msg.timestamp(),
        msg.author(),
        msg.text(),
        msg.kind(),
        msg.is_forwarded(),
    )
}

/// Head of one batch during the merge.
struct Head {
    msg: Message,
    batch: usize,
}

impl PartialEq for Head {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Head {}

impl PartialOrd for Head {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Head {
    fn cmp(&self, other: &Self) -> Ordering {
        merge_key(&self.msg)
            .cmp(&merge_key(&other.msg))
            .then(self.batch.cmp(&other.batch))
    }
}

fn check_bounds(
    msg: &Message,
    earliest: DateTime<Utc>,
    latest: DateTime<Utc>,
) -> Result<(), RecordError> {
    let ts = msg.timestamp();
    if ts < earliest {
        return Err(RecordError::validation(
            msg.author(),
            ts,
            format!("timestamp is before {}", earliest.to_rfc3339()),
        ));
    }
    if ts > latest {
        return Err(RecordError::validation(
            msg.author(),
            ts,
            format!("timestamp is after {}", latest.to_rfc3339()),
        ));
    }
    Ok(())
}

/// Merges parser batches into one canonical conversation.
///
/// Never fails: invalid messages are excluded and listed in
/// [`Normalized::rejected`].
#[instrument(skip_all, fields(batches = batches.len()))]
pub fn normalize(batches: Vec<Vec<Message>>, config: &NormalizeConfig) -> Normalized {
    merge_batches(batches, Some((config.earliest, config.latest())))
}

/// Sorts and deduplicates one sequence without the timestamp bounds.
///
/// Used for data that was validated when it was first normalized, such as
/// a [cache](crate::cache) file.
pub fn canonicalize(messages: Vec<Message>) -> Conversation {
    merge_batches(vec![messages], None).conversation
}

fn merge_batches(
    batches: Vec<Vec<Message>>,
    bounds: Option<(DateTime<Utc>, DateTime<Utc>)>,
) -> Normalized {
    let mut rejected = Vec::new();
    let mut total = 0usize;

    let mut sources: Vec<std::vec::IntoIter<Message>> = Vec::with_capacity(batches.len());
    for (index, batch) in batches.into_iter().enumerate() {
        total += batch.len();
        let mut valid: Vec<Message> = Vec::with_capacity(batch.len());
        for msg in batch {
            match bounds.map_or(Ok(()), |(earliest, latest)| check_bounds(&msg, earliest, latest)) {
                Ok(()) => valid.push(msg),
                Err(err) => rejected.push(err),
            }
        }
        // stable: equal timestamps keep input order
        valid.sort_by_key(Message::timestamp);
        debug!(batch = index, messages = valid.len(), "batch sorted");
        sources.push(valid.into_iter());
    }

    let mut heap = BinaryHeap::with_capacity(sources.len());
    for (batch, source) in sources.iter_mut().enumerate() {
        if let Some(msg) = source.next() {
            heap.push(Reverse(Head { msg, batch }));
        }
    }

    let mut messages: Vec<Message> = Vec::with_capacity(total);
    let mut duplicates = 0usize;
    // dedup keys of the current timestamp run; duplicates share a timestamp
    let mut run_ts: Option<DateTime<Utc>> = None;
    let mut run_keys: HashSet<(String, String)> = HashSet::new();

    while let Some(Reverse(Head { msg, batch })) = heap.pop() {
        if let Some(next) = sources[batch].next() {
            heap.push(Reverse(Head { msg: next, batch }));
        }
        // identical heads are one message delivered twice; advance them together
        while let Some(Reverse(twin)) = heap.peek() {
            if merge_key(&twin.msg) != merge_key(&msg) {
                break;
            }
            let Some(Reverse(Head { batch: twin_batch, .. })) = heap.pop() else {
                break;
            };
            if let Some(next) = sources[twin_batch].next() {
                heap.push(Reverse(Head {
                    msg: next,
                    batch: twin_batch,
                }));
            }
            duplicates += 1;
        }

        if run_ts != Some(msg.timestamp()) {
            run_ts = Some(msg.timestamp());
            run_keys.clear();
        }
        let (author, _, text) = msg.dedup_key();
        if !run_keys.insert((author.to_string(), text.to_string())) {
            duplicates += 1;
            continue;
        }
        messages.push(msg);
    }

    if !rejected.is_empty() {
        warn!(
            count = rejected.len(),
            "excluded messages with implausible timestamps"
        );
    }
    info!(
        input = total,
        output = messages.len(),
        duplicates,
        "normalization complete"
    );

    Normalized {
        conversation: Conversation::from_sorted(messages),
        rejected,
        duplicates,
    }
}
