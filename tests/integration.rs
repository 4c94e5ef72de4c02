//! Integration tests: parsers with real files, ingest and analysis end to end

use chatstat::config::{AnalysisConfig, NormalizeConfig, TelegramConfig, VkOptConfig};
use chatstat::ingest::{Ingestor, Source};
use chatstat::parser::{Platform, create_parser};
use chatstat::prelude::*;
use chrono::{TimeZone, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{TempDir, tempdir};

const VK_DIALOG: &str = "\
Me (Jan 1, 2020):
hello

10:00:00 01/01/2020

Kate (Jan 1, 2020):
hi!
how are you? 😀

10:01:30 01/01/2020

Me (Jan 2, 2020):
https://example.com/cat.jpg

09:15:00 02/01/2020

Kate (Feb 30, 2020):
this block has an impossible date

12:00:00 30/02/2020

Kate (Jan 3, 2020):


23:59:59 03/01/2020
";

const TG_MESSAGES: &str = r#"{
  "messages": [
    {"id": 1, "date": 1577872800, "from_id": 1, "message": "hello"},
    {"id": 2, "date": 1577872890, "from_id": 99990, "message": "hi!\nhow are you? 😀"},
    {"id": 3, "date": 1578049200, "from_id": 99990, "media": {"type": "photo"}},
    {"id": 4, "date": 1578049260, "from_id": 1, "media": {"type": "sticker", "alt": "😂"}},
    {"id": 5, "date": 1578049320, "from_id": 99990, "media": {"type": "document", "mime_type": "audio/ogg", "voice": true}},
    {"id": 6, "type": "service", "date": 1578049380, "from_id": 1},
    {"id": 7, "date": "not a date", "from_id": 1, "message": "lost"}
  ]
}"#;

fn write_fixture(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn pinned_normalize() -> NormalizeConfig {
    NormalizeConfig::default().with_now(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
}

fn ingestor() -> Ingestor {
    Ingestor::new()
        .with_telegram(TelegramConfig::new("Me", "Kate").with_target_id(99990))
        .with_vkopt(VkOptConfig::new())
        .with_normalize(pinned_normalize())
}

// ============================================================================
// vkOpt
// ============================================================================

mod vkopt_tests {
    use super::*;

    #[test]
    fn test_single_block() {
        let parser = VkOptParser::new();
        let out = parser
            .parse_str("Alice (Jan 1, 2020):\nhello\n\n10:00:00 01/01/2020\n")
            .unwrap();

        assert!(out.is_clean());
        assert_eq!(out.messages.len(), 1);
        let msg = &out.messages[0];
        assert_eq!(msg.author(), "Alice");
        assert_eq!(msg.timestamp(), Utc.with_ymd_and_hms(2020, 1, 1, 10, 0, 0).unwrap());
        assert_eq!(msg.kind(), MessageKind::Text);
        assert_eq!(msg.text(), "hello");
        assert_eq!(msg.length(), 5);
    }

    #[test]
    fn test_dialog_file() {
        let dir = tempdir().unwrap();
        let path = write_fixture(&dir, "vk.txt", VK_DIALOG);
        let out = VkOptParser::new().parse(&path).unwrap();

        assert_eq!(out.messages.len(), 4);
        assert_eq!(out.skipped.len(), 1);
        assert_eq!(out.messages[1].text(), "hi!\nhow are you? 😀");
        assert!(out.messages[2].is_link());
        assert_eq!(out.messages[3].kind(), MessageKind::Other);
    }

    #[test]
    fn test_n_blocks_give_n_messages() {
        let mut txt = String::new();
        for i in 0..50 {
            txt.push_str(&format!(
                "{} (today):\nmessage {}\n\n{:02}:{:02}:00 15/06/2021\n\n",
                if i % 2 == 0 { "Me" } else { "Kate" },
                i,
                i / 60,
                i % 60
            ));
        }
        let out = VkOptParser::new().parse_str(&txt).unwrap();
        assert_eq!(out.messages.len(), 50);
        assert!(out.is_clean());
    }

    #[test]
    fn test_utc_offset_shifts_timestamps() {
        let parser = VkOptParser::with_config(VkOptConfig::new().with_utc_offset_minutes(180));
        let out = parser
            .parse_str("Me (x):\nhi\n\n10:00:00 01/01/2020\n")
            .unwrap();
        assert_eq!(
            out.messages[0].timestamp(),
            Utc.with_ymd_and_hms(2020, 1, 1, 7, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_create_parser_reads_file() {
        let dir = tempdir().unwrap();
        let path = write_fixture(&dir, "vk.txt", VK_DIALOG);
        let parser = create_parser(Platform::VkOpt).unwrap();
        assert_eq!(parser.name(), "vkOpt");
        assert_eq!(parser.parse(&path).unwrap().messages.len(), 4);
    }
}

// ============================================================================
// Telegram
// ============================================================================

mod telegram_tests {
    use super::*;

    #[test]
    fn test_messages_object() {
        let parser = TelegramParser::with_config(TelegramConfig::new("Me", "Kate").with_target_id(99990));
        let out = parser.parse_str(TG_MESSAGES).unwrap();

        // service record dropped silently, undated record reported
        assert_eq!(out.messages.len(), 5);
        assert_eq!(out.skipped.len(), 1);

        let kinds: Vec<_> = out.messages.iter().map(Message::kind).collect();
        assert_eq!(
            kinds,
            vec![
                MessageKind::Text,
                MessageKind::Text,
                MessageKind::Photo,
                MessageKind::Sticker,
                MessageKind::Voice,
            ]
        );
        assert_eq!(out.messages[0].author(), "Me");
        assert_eq!(out.messages[1].author(), "Kate");
    }

    #[test]
    fn test_bare_array() {
        let out = TelegramParser::new()
            .parse_str(r#"[{"id": 1, "date": 1577872800, "from_id": 7, "sender_name": "Kate", "message": "hey"}]"#)
            .unwrap();
        assert_eq!(out.messages[0].author(), "Kate");
        assert_eq!(out.messages[0].text(), "hey");
    }

    #[test]
    fn test_not_json_fails_whole_source() {
        let err = TelegramParser::new().parse_str("definitely not json").unwrap_err();
        assert!(err.is_parse());
    }
}

// ============================================================================
// Ingest + Analysis
// ============================================================================

mod pipeline_tests {
    use super::*;

    #[test]
    fn test_overlapping_sources_are_deduplicated() {
        let dir = tempdir().unwrap();
        let vk = write_fixture(&dir, "vk.txt", VK_DIALOG);
        let tg = write_fixture(&dir, "tg.json", TG_MESSAGES);

        let ingested = ingestor()
            .ingest(vec![Source::VkOptFile(vk), Source::TelegramFile(tg)])
            .unwrap();

        // 4 vkOpt + 5 Telegram, the first two are the same messages
        assert_eq!(ingested.conversation.len(), 7);
        assert_eq!(ingested.duplicates, 2);
        assert_eq!(ingested.skipped.len(), 2);
        assert!(ingested.failures.is_empty());

        let ts: Vec<_> = ingested.conversation.messages().iter().map(Message::timestamp).collect();
        assert!(ts.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_source_order_does_not_matter() {
        let dir = tempdir().unwrap();
        let vk = write_fixture(&dir, "vk.txt", VK_DIALOG);
        let tg = write_fixture(&dir, "tg.json", TG_MESSAGES);

        let a = ingestor()
            .ingest(vec![Source::VkOptFile(vk.clone()), Source::TelegramFile(tg.clone())])
            .unwrap();
        let b = ingestor()
            .ingest(vec![Source::TelegramFile(tg), Source::VkOptFile(vk)])
            .unwrap();
        assert_eq!(a.conversation, b.conversation);
    }

    #[test]
    fn test_one_failing_source_is_reported() {
        let dir = tempdir().unwrap();
        let vk = write_fixture(&dir, "vk.txt", VK_DIALOG);
        let missing = dir.path().join("missing.json");

        let ingested = ingestor()
            .ingest(vec![Source::VkOptFile(vk), Source::TelegramFile(missing)])
            .unwrap();
        assert_eq!(ingested.conversation.len(), 4);
        assert_eq!(ingested.failures.len(), 1);
        assert!(ingested.failures[0].error.is_io());
    }

    #[test]
    fn test_all_sources_failing_is_an_error() {
        let err = ingestor()
            .ingest(vec![Source::VkOptFile(Path::new("/nonexistent/vk.txt").to_path_buf())])
            .unwrap_err();
        assert!(matches!(err, ChatstatError::NoUsableSource { count: 1, .. }));
    }

    #[test]
    fn test_analysis_of_ingested_dialog() {
        let dir = tempdir().unwrap();
        let tg = write_fixture(&dir, "tg.json", TG_MESSAGES);
        let ingested = ingestor().ingest(vec![Source::TelegramFile(tg)]).unwrap();

        let result = Analyzer::new(AnalysisConfig::default()).analyze(&ingested.conversation);

        assert_eq!(result.count(metric::TOTAL_MESSAGES), Some(5));
        let per_day = result.counts(metric::MESSAGES_PER_DAY).unwrap();
        assert_eq!(per_day.len(), 3);
        assert_eq!(per_day["2020-01-01"], 2);
        assert_eq!(per_day["2020-01-02"], 0);
        assert_eq!(per_day["2020-01-03"], 3);
        assert_eq!(per_day.values().sum::<u64>(), 5);

        let per_author = result.counts(metric::MESSAGES_PER_AUTHOR).unwrap();
        assert_eq!(per_author["Kate"], 3);
        assert_eq!(per_author["Me"], 2);
    }

    #[test]
    fn test_local_time_moves_day_buckets() {
        let msg = Message::new_text("Me", Utc.with_ymd_and_hms(2020, 1, 1, 23, 30, 0).unwrap(), "late");
        let conversation = normalize(vec![vec![msg]], &pinned_normalize()).conversation;

        let utc = Analyzer::new(AnalysisConfig::default()).analyze(&conversation);
        let msk = Analyzer::new(AnalysisConfig::default().with_utc_offset_minutes(180))
            .analyze(&conversation);

        assert!(utc.counts(metric::MESSAGES_PER_DAY).unwrap().contains_key("2020-01-01"));
        assert!(msk.counts(metric::MESSAGES_PER_DAY).unwrap().contains_key("2020-01-02"));
        assert_eq!(msk.counts(metric::MESSAGES_PER_HOUR).unwrap()["02:00"], 1);
    }
}

// ============================================================================
// Platform
// ============================================================================

mod platform_tests {
    use super::*;

    #[test]
    fn test_platform_names_roundtrip() {
        for name in Platform::all_names() {
            let platform: Platform = name.parse().unwrap();
            assert!(Platform::all().contains(&platform));
        }
        assert!("whatsapp".parse::<Platform>().is_err());
    }

    #[test]
    fn test_platform_serde_alias() {
        let platform: Platform = serde_json::from_str("\"tg\"").unwrap();
        assert_eq!(platform, Platform::Telegram);
    }
}
