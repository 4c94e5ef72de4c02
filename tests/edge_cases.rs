//! Edge case tests for chatstat
//!
//! These tests cover boundary conditions across parsing, normalization and
//! aggregation that unit tests of a single module do not reach.

use chatstat::cache::{from_cache_str, read_cache, to_cache_string, write_cache};
use chatstat::config::{AnalysisConfig, NormalizeConfig, TextEncoding, VkOptConfig};
use chatstat::conversation::Conversation;
use chatstat::core::filter::{CONTENT_MAX_LEN, FilterConfig};
use chatstat::normalize::normalize;
use chatstat::parser::Parser;
use chatstat::parsers::{TelegramParser, VkOptParser};
use chatstat::stats::{Analyzer, metric};
use chatstat::words::parse_words;
use chatstat::{ChatstatError, Message, MessageKind};
use chrono::{DateTime, Duration, TimeZone, Utc};
use tempfile::NamedTempFile;

fn ts(y: i32, mo: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, 0, 0).unwrap()
}

fn pinned() -> NormalizeConfig {
    NormalizeConfig::default().with_now(ts(2024, 1, 1, 0))
}

fn utf16le_with_bom(text: &str) -> Vec<u8> {
    let mut bytes = vec![0xFF, 0xFE];
    bytes.extend(text.encode_utf16().flat_map(u16::to_le_bytes));
    bytes
}

// =========================================================================
// Unicode and special character tests
// =========================================================================

#[test]
fn test_unicode_authors_and_lengths() {
    let cyrillic = Message::new_text("Иван", ts(2020, 1, 1, 0), "Привет мир!");
    assert_eq!(cyrillic.author(), "Иван");
    assert_eq!(cyrillic.length(), 11);

    // length counts characters, not bytes
    let emoji = Message::new_text("Kate", ts(2020, 1, 1, 0), "😀😀");
    assert_eq!(emoji.length(), 2);
}

#[test]
fn test_vkopt_header_with_parentheses_in_name() {
    let out = VkOptParser::new()
        .parse_str("Kate (work) (Jan 1, 2020):\nhi\n\n10:00:00 01/01/2020\n")
        .unwrap();
    assert_eq!(out.messages[0].author(), "Kate (work)");
}

#[test]
fn test_vkopt_crlf_line_endings() {
    let out = VkOptParser::new()
        .parse_str("Me (x):\r\nline one\r\nline two\r\n\r\n10:00:00 01/01/2020\r\n")
        .unwrap();
    assert_eq!(out.messages.len(), 1);
    assert_eq!(out.messages[0].text(), "line one\nline two");
}

// =========================================================================
// Encoding tests
// =========================================================================

#[test]
fn test_vkopt_utf16_detected_from_bom() {
    let bytes = utf16le_with_bom("Иван (x):\nПривет\n\n10:00:00 01/01/2020\n");
    let out = VkOptParser::new().parse_bytes(&bytes).unwrap();
    assert_eq!(out.messages[0].author(), "Иван");
    assert_eq!(out.messages[0].text(), "Привет");
}

#[test]
fn test_vkopt_declared_utf8_rejects_utf16() {
    let bytes = utf16le_with_bom("Me (x):\nhi\n\n10:00:00 01/01/2020\n");
    let parser = VkOptParser::with_config(VkOptConfig::new().with_encoding(TextEncoding::Utf8));
    let err = parser.parse_bytes(&bytes).unwrap_err();
    assert!(err.is_encoding());
}

#[test]
fn test_invalid_utf8_is_encoding_error() {
    let err = TelegramParser::new().parse_bytes(&[b'[', 0xC3, 0x28, b']']).unwrap_err();
    assert!(err.is_encoding());
}

// =========================================================================
// Normalization boundary tests
// =========================================================================

#[test]
fn test_timestamps_before_earliest_are_rejected() {
    let out = normalize(
        vec![vec![
            Message::new_text("Me", ts(2000, 1, 1, 0), "too early"),
            Message::new_text("Me", ts(2006, 10, 10, 0), "first valid day"),
        ]],
        &pinned(),
    );
    assert_eq!(out.conversation.len(), 1);
    assert_eq!(out.rejected.len(), 1);
    assert!(out.rejected[0].to_string().contains("before"));
}

#[test]
fn test_clock_skew_tolerance() {
    let now = ts(2024, 1, 1, 0);
    let out = normalize(
        vec![vec![
            Message::new_text("Me", now + Duration::hours(23), "within skew"),
            Message::new_text("Me", now + Duration::hours(25), "beyond skew"),
        ]],
        &pinned(),
    );
    assert_eq!(out.conversation.len(), 1);
    assert_eq!(out.conversation.messages()[0].text(), "within skew");
    assert_eq!(out.rejected.len(), 1);
}

#[test]
fn test_same_time_different_authors_are_kept() {
    let t = ts(2020, 1, 1, 10);
    let out = normalize(
        vec![vec![Message::new_text("Me", t, "ok"), Message::new_text("Kate", t, "ok")]],
        &pinned(),
    );
    assert_eq!(out.conversation.len(), 2);
    assert_eq!(out.duplicates, 0);
}

#[test]
fn test_all_batches_empty() {
    let out = normalize(vec![Vec::new(), Vec::new()], &pinned());
    assert!(out.conversation.is_empty());
    assert!(out.conversation.authors().is_empty());
}

// =========================================================================
// Aggregation boundary tests
// =========================================================================

#[test]
fn test_single_message_conversation() {
    let conv = normalize(vec![vec![Message::new_text("Me", ts(2020, 1, 1, 10), "hi")]], &pinned())
        .conversation;
    let result = Analyzer::default().analyze(&conv);

    assert_eq!(result.count(metric::TOTAL_MESSAGES), Some(1));
    assert_eq!(result.counts(metric::MESSAGES_PER_DAY).unwrap().len(), 1);
    assert_eq!(result.count(metric::DAYS_WITHOUT_MESSAGES), Some(0));
    assert_eq!(result.count(metric::LONGEST_PAUSE_SECS), Some(0));
}

#[test]
fn test_empty_conversation_is_all_identity() {
    let result = Analyzer::default().analyze(&Conversation::empty());
    assert!(!result.is_empty());
    for (id, value) in result.iter() {
        assert!(value.is_identity(), "{id} is not an identity value");
    }
}

#[test]
fn test_non_text_only_conversation() {
    let conv = normalize(
        vec![vec![
            Message::non_text("Me", ts(2020, 1, 1, 10), MessageKind::Photo),
            Message::non_text("Kate", ts(2020, 1, 1, 11), MessageKind::Sticker),
        ]],
        &pinned(),
    )
    .conversation;
    let result = Analyzer::default().analyze(&conv);

    assert_eq!(result.count(metric::TOTAL_MESSAGES), Some(2));
    assert!(result.pairs(metric::WORD_FREQUENCY).unwrap().is_empty());
    assert!(result.pairs(metric::EMOJI_FREQUENCY).unwrap().is_empty());
}

#[test]
fn test_overlong_text_excluded_from_content_stats() {
    let long = "word ".repeat(CONTENT_MAX_LEN);
    let conv = normalize(
        vec![vec![
            Message::new_text("Me", ts(2020, 1, 1, 10), long),
            Message::new_text("Kate", ts(2020, 1, 1, 11), "short"),
        ]],
        &pinned(),
    )
    .conversation;
    let result = Analyzer::default().analyze(&conv);

    let words = result.pairs(metric::WORD_FREQUENCY).unwrap();
    assert_eq!(words, &[("short".to_string(), 1)]);
    // still counted as a message
    assert_eq!(result.count(metric::TOTAL_MESSAGES), Some(2));
}

#[test]
fn test_forwards_kept_when_filter_disabled() {
    let conv = normalize(
        vec![vec![
            Message::new_text("Me", ts(2020, 1, 1, 10), "forwarded words").with_forwarded(true),
        ]],
        &pinned(),
    )
    .conversation;
    let result = Analyzer::new(AnalysisConfig::default().with_content_filter(FilterConfig::new()))
        .analyze(&conv);
    assert_eq!(result.pairs(metric::WORD_FREQUENCY).unwrap().len(), 2);
}

#[test]
fn test_words_of_interest_case_insensitive() {
    let words = parse_words("\u{feff}Cat\n\n  DOG  \n");
    assert_eq!(words.len(), 2);
    assert!(words.contains("cat"));
    assert!(words.contains("Dog"));
}

#[test]
fn test_invalid_analysis_config() {
    let config = AnalysisConfig::default().with_minute_bin(0);
    assert!(matches!(config.validate(), Err(ChatstatError::InvalidConfig(_))));
}

// =========================================================================
// Cache tests
// =========================================================================

#[test]
fn test_cache_file_roundtrip() {
    let conv = normalize(
        vec![vec![
            Message::new_text("Иван", ts(2020, 1, 1, 10), "Привет 😀"),
            Message::non_text("Kate", ts(2020, 1, 1, 11), MessageKind::Voice),
            Message::new_text("Kate", ts(2020, 1, 1, 12), "fwd").with_forwarded(true),
        ]],
        &pinned(),
    )
    .conversation;

    let file = NamedTempFile::new().unwrap();
    write_cache(&conv, file.path()).unwrap();
    assert_eq!(read_cache(file.path()).unwrap(), conv);
}

#[test]
fn test_cache_reorders_unsorted_input() {
    let conv = normalize(
        vec![vec![
            Message::new_text("Me", ts(2020, 1, 1, 10), "a"),
            Message::new_text("Me", ts(2020, 1, 1, 11), "b"),
        ]],
        &pinned(),
    )
    .conversation;
    let json = to_cache_string(&conv).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let mut messages = value.as_array().unwrap().clone();
    messages.reverse();

    let reloaded = from_cache_str(&serde_json::to_string(&messages).unwrap()).unwrap();
    assert_eq!(reloaded, conv);
}

#[test]
fn test_cache_garbage_is_parse_error() {
    let err = from_cache_str("{\"not\": \"a list\"}").unwrap_err();
    assert!(err.is_parse());
}
