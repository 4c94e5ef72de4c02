//! Time-bucketed message counts.
//!
//! Every function here buckets by the **local** calendar of a fixed UTC
//! offset, takes any iterator of messages and makes a single pass over it.
//! Timelines (days, weeks, months) are zero-filled between the first and the
//! last bucket so a chart never has holes; cyclic buckets (weekday, hour,
//! minute-of-day) always cover the whole cycle. Empty input yields empty
//! collections.
//!
//! # Example
//!
//! ```
//! use chatstat::Message;
//! use chatstat::stats::temporal::messages_per_day;
//! use chrono::{NaiveDate, Offset, TimeZone, Utc};
//!
//! let utc = Utc.fix();
//! let msgs = vec![
//!     Message::new_text("A", Utc.with_ymd_and_hms(2020, 1, 1, 10, 0, 0).unwrap(), "hi"),
//!     Message::new_text("B", Utc.with_ymd_and_hms(2020, 1, 3, 10, 0, 0).unwrap(), "yo"),
//! ];
//! let days = messages_per_day(&msgs, utc, None);
//! assert_eq!(days.len(), 3);
//! assert_eq!(days[&NaiveDate::from_ymd_opt(2020, 1, 2).unwrap()], 0);
//! ```

use std::collections::BTreeMap;

use chrono::{
    DateTime, Datelike, Duration, FixedOffset, Months, NaiveDate, Timelike, Utc, Weekday,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::Message;
use crate::config::TimelineGranularity;
use crate::error::ChatstatError;

/// Weekdays in chart order.
pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Minutes in a day.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Conversations spanning more than this many calendar months are charted by
/// month, shorter ones by week.
pub const MONTHS_BORDER: u32 = 2;

/// An inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRange {
    /// First day (inclusive)
    pub start: NaiveDate,
    /// Last day (inclusive)
    pub end: NaiveDate,
}

impl DayRange {
    /// Creates a range, rejecting `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ChatstatError> {
        if start > end {
            return Err(ChatstatError::invalid_config(format!(
                "day range starts after it ends ({start} > {end})"
            )));
        }
        Ok(Self { start, end })
    }

    /// Parses two `YYYY-MM-DD` dates.
    pub fn parse(start: &str, end: &str) -> Result<Self, ChatstatError> {
        let parse = |s: &str| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| ChatstatError::invalid_date(s))
        };
        Self::new(parse(start)?, parse(end)?)
    }

    /// Returns `true` if `date` lies within the range.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Iterates over every day of the range.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take_while(move |d| *d <= self.end)
    }
}

/// Length of a timeline bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// Calendar day
    Day,
    /// Monday-aligned week
    Week,
    /// Calendar month, keyed by its first day
    Month,
}

impl Period {
    /// Returns the first day of the bucket containing `date`.
    pub fn start_of(self, date: NaiveDate) -> NaiveDate {
        match self {
            Period::Day => date,
            Period::Week => {
                date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
            }
            Period::Month => date.with_day(1).unwrap_or(date),
        }
    }

    /// Returns the first day of the following bucket.
    pub fn next(self, start: NaiveDate) -> Option<NaiveDate> {
        match self {
            Period::Day => start.succ_opt(),
            Period::Week => start.checked_add_signed(Duration::days(7)),
            Period::Month => start.checked_add_months(Months::new(1)),
        }
    }

    /// Stable lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Period::Day => "day",
            Period::Week => "week",
            Period::Month => "month",
        }
    }
}

/// Converts a timestamp to the local calendar.
pub fn local(ts: DateTime<Utc>, offset: FixedOffset) -> DateTime<FixedOffset> {
    ts.with_timezone(&offset)
}

/// Local calendar day of a timestamp.
pub fn local_date(ts: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    local(ts, offset).date_naive()
}

/// Zero-filled bucket starts from the bucket of `first` to the bucket of `last`.
pub fn period_starts(first: NaiveDate, last: NaiveDate, period: Period) -> Vec<NaiveDate> {
    let mut starts = Vec::new();
    let end = period.start_of(last);
    let mut current = Some(period.start_of(first));
    while let Some(day) = current {
        if day > end {
            break;
        }
        starts.push(day);
        current = period.next(day);
    }
    starts
}

fn fill(counts: &mut BTreeMap<NaiveDate, u64>, period: Period) {
    let (Some(&first), Some(&last)) = (counts.keys().next(), counts.keys().next_back()) else {
        return;
    };
    for start in period_starts(first, last, period) {
        counts.entry(start).or_insert(0);
    }
}

/// Counts messages per timeline bucket, zero-filled from the first to the
/// last occupied bucket.
pub fn messages_per_period<'a>(
    messages: impl IntoIterator<Item = &'a Message>,
    offset: FixedOffset,
    period: Period,
) -> BTreeMap<NaiveDate, u64> {
    let mut counts = BTreeMap::new();
    for msg in messages {
        let start = period.start_of(local_date(msg.timestamp(), offset));
        *counts.entry(start).or_insert(0) += 1;
    }
    fill(&mut counts, period);
    counts
}

/// Counts messages per calendar day.
///
/// Without a range, every day from the first to the last message is present.
/// With a range, exactly the days of the range are present and messages
/// outside it are ignored.
pub fn messages_per_day<'a>(
    messages: impl IntoIterator<Item = &'a Message>,
    offset: FixedOffset,
    range: Option<&DayRange>,
) -> BTreeMap<NaiveDate, u64> {
    let Some(range) = range else {
        return messages_per_period(messages, offset, Period::Day);
    };

    let mut counts: BTreeMap<NaiveDate, u64> = range.days().map(|d| (d, 0)).collect();
    for msg in messages {
        let day = local_date(msg.timestamp(), offset);
        if let Some(count) = counts.get_mut(&day) {
            *count += 1;
        }
    }
    counts
}

/// Counts messages per Monday-aligned week.
pub fn messages_per_week<'a>(
    messages: impl IntoIterator<Item = &'a Message>,
    offset: FixedOffset,
) -> BTreeMap<NaiveDate, u64> {
    messages_per_period(messages, offset, Period::Week)
}

/// Counts messages per calendar month (keyed by the first of the month).
pub fn messages_per_month<'a>(
    messages: impl IntoIterator<Item = &'a Message>,
    offset: FixedOffset,
) -> BTreeMap<NaiveDate, u64> {
    messages_per_period(messages, offset, Period::Month)
}

/// Counts messages per day of the week, Monday first.
pub fn messages_per_weekday<'a>(
    messages: impl IntoIterator<Item = &'a Message>,
    offset: FixedOffset,
) -> Vec<(Weekday, u64)> {
    let mut counts = [0u64; 7];
    let mut seen = false;
    for msg in messages {
        let day = local(msg.timestamp(), offset).weekday();
        counts[day.num_days_from_monday() as usize] += 1;
        seen = true;
    }
    if !seen {
        return Vec::new();
    }
    WEEKDAYS.into_iter().zip(counts).collect()
}

/// Counts messages per hour of the day (keys `0..24`).
pub fn messages_per_hour<'a>(
    messages: impl IntoIterator<Item = &'a Message>,
    offset: FixedOffset,
) -> BTreeMap<u32, u64> {
    messages_per_minutes(messages, offset, 60)
        .into_iter()
        .map(|(minute, count)| (minute / 60, count))
        .collect()
}

/// Counts messages per minute-of-day bin.
///
/// Keys are the first minute of each bin (`0, bin, 2*bin, ...`); `bin` is
/// clamped to `1..=1440`.
pub fn messages_per_minutes<'a>(
    messages: impl IntoIterator<Item = &'a Message>,
    offset: FixedOffset,
    bin: u32,
) -> BTreeMap<u32, u64> {
    let bin = bin.clamp(1, MINUTES_PER_DAY);
    let mut counts = BTreeMap::new();
    for msg in messages {
        let time = local(msg.timestamp(), offset);
        let minute = time.hour() * 60 + time.minute();
        *counts.entry(minute / bin * bin).or_insert(0) += 1;
    }
    if counts.is_empty() {
        return counts;
    }
    for start in (0..MINUTES_PER_DAY).step_by(bin as usize) {
        counts.entry(start).or_insert(0);
    }
    counts
}

/// Whole calendar months between two instants.
///
/// A month only counts once the day and time of `first` have been reached
/// again, so Jan 31 to Mar 30 is one month.
pub fn months_between(first: DateTime<FixedOffset>, last: DateTime<FixedOffset>) -> u32 {
    if last <= first {
        return 0;
    }
    let months = (last.year() - first.year()) * 12 + last.month() as i32 - first.month() as i32;
    let not_reached = (last.day(), last.time()) < (first.day(), first.time());
    let months = if not_reached { months - 1 } else { months };
    months.max(0) as u32
}

/// Resolves the trend timeline granularity for a time-ordered slice.
///
/// `Auto` picks months for conversations spanning more than
/// [`MONTHS_BORDER`] calendar months and weeks otherwise.
pub fn timeline_period(
    messages: &[Message],
    offset: FixedOffset,
    granularity: TimelineGranularity,
) -> Period {
    match granularity {
        TimelineGranularity::Day => Period::Day,
        TimelineGranularity::Week => Period::Week,
        TimelineGranularity::Month => Period::Month,
        TimelineGranularity::Auto => {
            let (Some(first), Some(last)) = (messages.first(), messages.last()) else {
                return Period::Week;
            };
            let months = months_between(
                local(first.timestamp(), offset),
                local(last.timestamp(), offset),
            );
            let period = if months > MONTHS_BORDER {
                Period::Month
            } else {
                Period::Week
            };
            debug!(months, period = period.as_str(), "resolved timeline granularity");
            period
        }
    }
}

/// The longest silence in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pause {
    /// Timestamp of the message before the pause
    pub start: DateTime<Utc>,
    /// Timestamp of the message after the pause
    pub end: DateTime<Utc>,
}

impl Pause {
    /// Length of the pause.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// Finds the longest gap between consecutive messages of a time-ordered
/// slice. The earliest of several equally long gaps wins.
///
/// Returns `None` for fewer than two messages.
pub fn longest_pause(messages: &[Message]) -> Option<Pause> {
    let mut best: Option<Pause> = None;
    for pair in messages.windows(2) {
        let candidate = Pause {
            start: pair[0].timestamp(),
            end: pair[1].timestamp(),
        };
        if best.is_none_or(|b| candidate.duration() > b.duration()) {
            best = Some(candidate);
        }
    }
    best
}

/// Messages per day of month for every month of the conversation.
///
/// Rows are months (first day), columns are days `1..=31`; days that do not
/// exist in a month stay zero.
pub fn heat_calendar<'a>(
    messages: impl IntoIterator<Item = &'a Message>,
    offset: FixedOffset,
) -> BTreeMap<NaiveDate, [u64; 31]> {
    let mut calendar: BTreeMap<NaiveDate, [u64; 31]> = BTreeMap::new();
    for msg in messages {
        let date = local_date(msg.timestamp(), offset);
        let row = calendar
            .entry(Period::Month.start_of(date))
            .or_insert([0; 31]);
        row[date.day0() as usize] += 1;
    }
    let (Some(&first), Some(&last)) = (calendar.keys().next(), calendar.keys().next_back()) else {
        return calendar;
    };
    for month in period_starts(first, last, Period::Month) {
        calendar.entry(month).or_insert([0; 31]);
    }
    calendar
}
