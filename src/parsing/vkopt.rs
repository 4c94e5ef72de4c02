//! vkOpt text export layout.
//!
//! The vkOpt browser extension saves a VK dialogue as plain text, one block
//! per message:
//!
//! ```text
//! Alice (Jan 1, 2020):
//! hello
//! second line
//!
//! 10:00:00 01/01/2020
//! ```
//!
//! The header date is informal and ignored; the trailing line after the blank
//! separator carries the real local wall-clock time (`HH:MM:SS dd/mm/yyyy`).

use std::sync::OnceLock;

use chrono::{FixedOffset, NaiveDateTime, TimeZone, Utc};
use regex::Regex;

use crate::error::RecordError;
use crate::parser::ParseOutcome;
use crate::{Message, MessageKind};

/// Format name used in record-level reports.
pub const FORMAT: &str = "vkOpt TXT";

const TIMESTAMP_FORMAT: &str = "%H:%M:%S %d/%m/%Y";

fn header_regex() -> &'static Regex {
    static HEADER: OnceLock<Regex> = OnceLock::new();
    // greedy name: everything up to the last " (" of the line
    HEADER.get_or_init(|| Regex::new(r"^(.+) \([^()]*\):$").expect("header pattern is valid"))
}

fn timestamp_regex() -> &'static Regex {
    static TIMESTAMP: OnceLock<Regex> = OnceLock::new();
    TIMESTAMP.get_or_init(|| {
        Regex::new(r"^\d{1,2}:\d{2}:\d{2} \d{1,2}/\d{1,2}/\d{4}$")
            .expect("timestamp pattern is valid")
    })
}

/// Returns the author name if `line` is a block header.
pub fn parse_header(line: &str) -> Option<&str> {
    header_regex()
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|name| !name.trim().is_empty())
}

/// Returns `true` if `line` has the shape of a block's timestamp line.
///
/// The shape says nothing about validity: `25:61:00 31/02/2020` is
/// timestamp-shaped but rejected by [`parse_timestamp`].
pub fn is_timestamp_line(line: &str) -> bool {
    timestamp_regex().is_match(line.trim())
}

/// Parses a timestamp line as local time at `offset`.
pub fn parse_timestamp(line: &str, offset: FixedOffset) -> Option<chrono::DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(line.trim(), TIMESTAMP_FORMAT).ok()?;
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

struct Block<'a> {
    header_line: usize,
    author: &'a str,
    body: Vec<&'a str>,
}

impl Block<'_> {
    fn into_message(self, timestamp: chrono::DateTime<Utc>) -> Message {
        let text = self.body.join("\n");
        if text.trim().is_empty() {
            Message::non_text(self.author, timestamp, MessageKind::Other)
        } else {
            Message::new_text(self.author, timestamp, text)
        }
    }
}

/// Parses a whole decoded export.
///
/// Malformed blocks become [`RecordError::Parse`] entries located at the
/// offending 1-based line; parsing always continues with the next block.
pub fn parse_export(content: &str, offset: FixedOffset) -> ParseOutcome {
    let lines: Vec<&str> = content
        .lines()
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .collect();

    let mut outcome = ParseOutcome::default();
    let mut block: Option<Block<'_>> = None;
    let mut preamble_reported = false;
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        let line_no = i + 1;

        let Some(current) = block.as_mut() else {
            if let Some(author) = parse_header(line) {
                block = Some(Block {
                    header_line: line_no,
                    author,
                    body: Vec::new(),
                });
            } else if !line.trim().is_empty() && !preamble_reported {
                outcome.skipped.push(RecordError::parse(
                    FORMAT,
                    line_no,
                    "text outside of a message block",
                ));
                preamble_reported = true;
            }
            i += 1;
            continue;
        };

        if line.trim().is_empty() && lines.get(i + 1).is_some_and(|l| is_timestamp_line(l)) {
            let ts_line = lines[i + 1];
            if let Some(finished) = block.take() {
                match parse_timestamp(ts_line, offset) {
                    Some(ts) => outcome.messages.push(finished.into_message(ts)),
                    None => outcome.skipped.push(RecordError::parse(
                        FORMAT,
                        line_no + 1,
                        format!("invalid date/time '{}'", ts_line.trim()),
                    )),
                }
            }
            i += 2;
            continue;
        }

        if let Some(author) = parse_header(line) {
            outcome.skipped.push(RecordError::parse(
                FORMAT,
                current.header_line,
                "next message header found before the timestamp line",
            ));
            block = Some(Block {
                header_line: line_no,
                author,
                body: Vec::new(),
            });
        } else {
            current.body.push(line);
        }
        i += 1;
    }

    if let Some(unfinished) = block {
        outcome.skipped.push(RecordError::parse(
            FORMAT,
            unfinished.header_line,
            "input ended before the timestamp line",
        ));
    }

    outcome
}
