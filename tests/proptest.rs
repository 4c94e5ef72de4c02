//! Property-based tests for chatstat.
//!
//! These tests generate random inputs to find edge cases.

use proptest::prelude::*;

use chatstat::config::{AnalysisConfig, NormalizeConfig};
use chatstat::core::{FilterConfig, apply_filters};
use chatstat::normalize::normalize;
use chatstat::stats::{Analyzer, metric};
use chatstat::{Message, MessageKind};
use chrono::{DateTime, Duration, TimeZone, Utc};

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()
}

fn config() -> NormalizeConfig {
    NormalizeConfig::default().with_now(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
}

/// Generate a random Message using fast strategies (no regex!)
fn arb_message() -> impl Strategy<Value = Message> {
    (
        prop::sample::select(vec!["Me", "Kate", "Иван"]),
        // coarse offsets so equal timestamps are common
        0i64..200,
        prop::sample::select(vec![
            "hello",
            "Hi there!",
            "Привет мир",
            "🎉🔥💀 emoji",
            "https://example.com",
            "",
        ]),
        prop::sample::select(MessageKind::ALL.to_vec()),
        any::<bool>(),
    )
        .prop_map(|(author, minutes, text, kind, forwarded)| {
            Message::new(author, base() + Duration::minutes(minutes * 37), kind, text)
                .with_forwarded(forwarded)
        })
}

/// Generate a vector of random messages
fn arb_messages(max_len: usize) -> impl Strategy<Value = Vec<Message>> {
    prop::collection::vec(arb_message(), 0..max_len)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // ============================================
    // NORMALIZE PROPERTIES
    // ============================================

    /// Output is sorted by timestamp
    #[test]
    fn normalize_output_is_sorted(a in arb_messages(30), b in arb_messages(30)) {
        let out = normalize(vec![a, b], &config());
        let messages = out.conversation.messages();
        prop_assert!(messages.windows(2).all(|w| w[0].timestamp() <= w[1].timestamp()));
    }

    /// Normalizing a normalized conversation changes nothing
    #[test]
    fn normalize_is_idempotent(a in arb_messages(30), b in arb_messages(30)) {
        let once = normalize(vec![a, b], &config()).conversation;
        let twice = normalize(vec![once.messages().to_vec()], &config());
        prop_assert_eq!(&twice.conversation, &once);
        prop_assert_eq!(twice.duplicates, 0);
    }

    /// Batch order does not affect the result
    #[test]
    fn normalize_is_commutative(a in arb_messages(30), b in arb_messages(30)) {
        let ab = normalize(vec![a.clone(), b.clone()], &config());
        let ba = normalize(vec![b, a], &config());
        prop_assert_eq!(ab.conversation, ba.conversation);
        prop_assert_eq!(ab.duplicates, ba.duplicates);
    }

    /// Every input message is kept, dropped as duplicate or rejected
    #[test]
    fn normalize_accounts_for_every_message(a in arb_messages(30), b in arb_messages(30)) {
        let total = a.len() + b.len();
        let out = normalize(vec![a, b], &config());
        prop_assert_eq!(out.conversation.len() + out.duplicates + out.rejected.len(), total);
    }

    /// No two messages share author, timestamp and text
    #[test]
    fn normalize_removes_duplicates(a in arb_messages(30)) {
        let doubled = [a.clone(), a].concat();
        let out = normalize(vec![doubled], &config());
        let messages = out.conversation.messages();
        for (i, x) in messages.iter().enumerate() {
            for y in &messages[i + 1..] {
                prop_assert!(
                    !(x.author() == y.author() && x.timestamp() == y.timestamp() && x.text() == y.text())
                );
            }
        }
    }

    // ============================================
    // AGGREGATE PROPERTIES
    // ============================================

    /// Day, hour and weekday buckets each sum to the total
    #[test]
    fn buckets_sum_to_total(a in arb_messages(60), offset in -720i32..=840) {
        let conversation = normalize(vec![a], &config()).conversation;
        let result = Analyzer::new(AnalysisConfig::default().with_utc_offset_minutes(offset))
            .analyze(&conversation);
        let total = result.count(metric::TOTAL_MESSAGES).unwrap();

        prop_assert_eq!(total, conversation.len() as u64);
        prop_assert_eq!(result.counts(metric::MESSAGES_PER_DAY).unwrap().values().sum::<u64>(), total);
        prop_assert_eq!(result.counts(metric::MESSAGES_PER_HOUR).unwrap().values().sum::<u64>(), total);
        prop_assert_eq!(result.counts(metric::MESSAGES_PER_MINUTES).unwrap().values().sum::<u64>(), total);
        let weekday: u64 = result.pairs(metric::MESSAGES_PER_WEEKDAY).unwrap().iter().map(|(_, c)| c).sum();
        prop_assert_eq!(weekday, total);
    }

    /// Author counts sum to the total
    #[test]
    fn author_counts_sum_to_total(a in arb_messages(60)) {
        let conversation = normalize(vec![a], &config()).conversation;
        let result = Analyzer::default().analyze(&conversation);
        let sum: u64 = result.counts(metric::MESSAGES_PER_AUTHOR).unwrap().values().sum();
        prop_assert_eq!(sum, conversation.len() as u64);
    }

    // ============================================
    // FILTER PROPERTIES
    // ============================================

    /// No filter means passthrough
    #[test]
    fn empty_filter_is_passthrough(a in arb_messages(30)) {
        let filtered = apply_filters(&a, &FilterConfig::new());
        prop_assert_eq!(filtered.len(), a.len());
    }

    /// Content defaults never keep forwards or bare links
    #[test]
    fn content_filter_drops_forwards_and_links(a in arb_messages(30)) {
        let filtered = apply_filters(&a, &FilterConfig::content_defaults());
        prop_assert!(filtered.len() <= a.len());
        prop_assert!(filtered.iter().all(|m| !m.is_forwarded() && !m.is_link()));
    }

    /// Author filter keeps only that author
    #[test]
    fn author_filter_keeps_only_author(a in arb_messages(30)) {
        let filtered = apply_filters(&a, &FilterConfig::new().with_author("Kate"));
        prop_assert!(filtered.iter().all(|m| m.author() == "Kate"));
    }
}
