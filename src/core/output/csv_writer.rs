//! CSV output writers.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::Message;
use crate::conversation::Conversation;
use crate::error::ChatstatError;
use crate::stats::authors::{AuthorContent, content_totals};
use crate::stats::content::{top_n, word_frequency};
use crate::stats::summary::{Summary, format_duration};

fn row_label(key: &str) -> &str {
    match key {
        "messages" => "All messages",
        "characters" => "Characters",
        "photos" => "Photos",
        "stickers" => "Stickers",
        "audio" => "Songs (audio files)",
        "voice" => "Voice messages",
        "video" => "Video messages",
        other => other,
    }
}

fn scalar_info_records(summary: &Summary, authors: &[AuthorContent]) -> Vec<Vec<String>> {
    let ts = |t: Option<chrono::DateTime<chrono::Utc>>| t.map(|t| t.to_rfc3339()).unwrap_or_default();

    let most_active = summary
        .most_active_day
        .map(|(day, count)| format!("{day} : {count} messages"))
        .unwrap_or_default();
    let pause = summary
        .longest_pause
        .map(|p| {
            format!(
                "{} From {} to {}",
                format_duration(p.duration().num_seconds()),
                p.start.to_rfc3339(),
                p.end.to_rfc3339()
            )
        })
        .unwrap_or_default();

    let mut records = vec![
        vec!["Start date:".to_string(), ts(summary.first_message)],
        vec!["End date:".to_string(), ts(summary.last_message)],
        vec![
            "Duration:".to_string(),
            format_duration(summary.duration_secs),
        ],
        vec![
            "Days without messages:".to_string(),
            summary.days_without_messages.to_string(),
        ],
        vec!["Most active day:".to_string(), most_active],
        vec![
            "Average messages per day:".to_string(),
            format!("{:.2}", summary.average_per_day),
        ],
        vec!["Longest pause:".to_string(), pause],
        Vec::new(),
    ];

    let total = content_totals(authors);
    let mut header = vec!["INFO".to_string(), total.author.clone()];
    header.extend(authors.iter().map(|a| a.author.clone()));
    records.push(header);

    let columns: Vec<_> = std::iter::once(&total)
        .chain(authors)
        .map(AuthorContent::values)
        .collect();
    for (i, (key, _)) in total.values().iter().enumerate() {
        let mut record = vec![row_label(key).to_string()];
        record.extend(columns.iter().map(|values| values[i].1.to_string()));
        records.push(record);
    }
    records
}

fn top_words_records(
    messages: &[Message],
    your_name: &str,
    target_name: &str,
    limit: usize,
) -> Vec<Vec<String>> {
    let total = word_frequency(messages, None);
    let yours = word_frequency(messages.iter().filter(|m| m.author() == your_name), None);
    let theirs = word_frequency(messages.iter().filter(|m| m.author() == target_name), None);

    let mut records = vec![vec![
        "word".to_string(),
        "total".to_string(),
        your_name.to_string(),
        target_name.to_string(),
    ]];
    for (word, count) in top_n(&total, limit) {
        let your_count = yours.get(&word).copied().unwrap_or(0);
        let their_count = theirs.get(&word).copied().unwrap_or(0);
        records.push(vec![
            word,
            count.to_string(),
            your_count.to_string(),
            their_count.to_string(),
        ]);
    }
    records
}

fn write_records<W: Write>(mut inner: W, records: &[Vec<String>]) -> Result<W, ChatstatError> {
    // an empty record separates sections with a bare blank line
    for (i, section) in records.split(Vec::is_empty).enumerate() {
        if i > 0 {
            inner.write_all(b"\n")?;
        }
        // rows inside a section may differ in width
        let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(inner);
        for record in section {
            writer.write_record(record)?;
        }
        inner = writer
            .into_inner()
            .map_err(|e| ChatstatError::from(e.into_error()))?;
    }
    inner.flush()?;
    Ok(inner)
}

fn records_to_string(records: &[Vec<String>]) -> Result<String, ChatstatError> {
    let bytes = write_records(Vec::new(), records)?;
    String::from_utf8(bytes).map_err(|e| ChatstatError::encoding("CSV output", e.to_string()))
}

/// Writes the scalar info table.
///
/// # Format
/// - Key/value lines: start and end date, duration, days without messages,
///   most active day, average per day, longest pause
/// - A blank line
/// - `INFO,TOTAL,<author>...` followed by one line per content counter
///   (all messages, characters, photos, stickers, audio, voice, video)
/// - Delimiter `,`, encoding UTF-8
pub fn write_scalar_info_csv(
    summary: &Summary,
    authors: &[AuthorContent],
    output_path: impl AsRef<Path>,
) -> Result<(), ChatstatError> {
    let file = File::create(output_path)?;
    write_records(file, &scalar_info_records(summary, authors))?;
    Ok(())
}

/// Renders the scalar info table as a string.
pub fn to_scalar_info_csv(summary: &Summary, authors: &[AuthorContent]) -> Result<String, ChatstatError> {
    records_to_string(&scalar_info_records(summary, authors))
}

/// Writes the most frequent words with per-participant counts.
///
/// Columns: `word,total,<your_name>,<target_name>`; at most `limit` rows,
/// most frequent first.
pub fn write_top_words_csv(
    conversation: &Conversation,
    your_name: &str,
    target_name: &str,
    limit: usize,
    output_path: impl AsRef<Path>,
) -> Result<(), ChatstatError> {
    let file = File::create(output_path)?;
    let records = top_words_records(conversation.messages(), your_name, target_name, limit);
    write_records(file, &records)?;
    Ok(())
}

/// Renders the top-words table as a string.
pub fn to_top_words_csv(
    conversation: &Conversation,
    your_name: &str,
    target_name: &str,
    limit: usize,
) -> Result<String, ChatstatError> {
    records_to_string(&top_words_records(
        conversation.messages(),
        your_name,
        target_name,
        limit,
    ))
}
