//! Scalar facts about a whole conversation.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::Serialize;

use super::temporal::{Pause, longest_pause, messages_per_day};
use crate::Message;

/// Scalar summary of a conversation.
///
/// All fields are zero or `None` for an empty conversation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    /// Number of messages
    pub total_messages: u64,
    /// Timestamp of the first message
    pub first_message: Option<DateTime<Utc>>,
    /// Timestamp of the last message
    pub last_message: Option<DateTime<Utc>>,
    /// Seconds between the first and the last message
    pub duration_secs: i64,
    /// Calendar days between the first and last message with no message
    pub days_without_messages: u64,
    /// Day with the most messages (earliest on ties) and its count
    pub most_active_day: Option<(NaiveDate, u64)>,
    /// Messages per calendar day of the conversation's span
    pub average_per_day: f64,
    /// Longest gap between consecutive messages
    pub longest_pause: Option<Pause>,
}

/// Computes the summary of a time-ordered slice of messages.
pub fn summarize(messages: &[Message], offset: FixedOffset) -> Summary {
    let (Some(first), Some(last)) = (messages.first(), messages.last()) else {
        return Summary::default();
    };

    let days = messages_per_day(messages, offset, None);
    let most_active_day = days
        .iter()
        .fold(None::<(NaiveDate, u64)>, |best, (&day, &count)| match best {
            Some((_, best_count)) if best_count >= count => best,
            _ => Some((day, count)),
        });

    Summary {
        total_messages: messages.len() as u64,
        first_message: Some(first.timestamp()),
        last_message: Some(last.timestamp()),
        duration_secs: (last.timestamp() - first.timestamp()).num_seconds(),
        days_without_messages: days.values().filter(|&&c| c == 0).count() as u64,
        most_active_day,
        average_per_day: messages.len() as f64 / days.len().max(1) as f64,
        longest_pause: longest_pause(messages),
    }
}

/// Formats a number of seconds as `"3 days 04:05:06"`.
pub fn format_duration(secs: i64) -> String {
    let sign = if secs < 0 { "-" } else { "" };
    let secs = secs.unsigned_abs();
    let days = secs / 86_400;
    let rest = secs % 86_400;
    let clock = format!("{:02}:{:02}:{:02}", rest / 3600, rest % 3600 / 60, rest % 60);
    match days {
        0 => format!("{sign}{clock}"),
        1 => format!("{sign}1 day {clock}"),
        n => format!("{sign}{n} days {clock}"),
    }
}
