//! Content statistics: lengths, words and emoji.
//!
//! Words are runs of alphabetic characters (any script) plus the apostrophe
//! and backtick, lowercased. Emoji are recognised per character by Unicode
//! block membership, independent of locale.

use std::collections::BTreeMap;

use crate::Message;
use crate::words::WordSet;

/// Splits text into lowercased words.
///
/// # Example
///
/// ```
/// use chatstat::stats::content::tokenize;
///
/// assert_eq!(tokenize("Don't STOP, 2 me!"), vec!["don't", "stop", "me"]);
/// ```
pub fn tokenize(text: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    for c in text.chars() {
        if c.is_alphabetic() || c == '\'' || c == '`' {
            current.extend(c.to_lowercase());
        } else if !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// Counts words across messages.
///
/// With `interest`, only words contained in the set are counted.
pub fn word_frequency<'a>(
    messages: impl IntoIterator<Item = &'a Message>,
    interest: Option<&WordSet>,
) -> BTreeMap<String, u64> {
    let mut counts = BTreeMap::new();
    for msg in messages {
        for word in tokenize(msg.text()) {
            if interest.is_some_and(|set| !set.contains(&word)) {
                continue;
            }
            *counts.entry(word).or_insert(0) += 1;
        }
    }
    counts
}

/// Returns `true` if `c` is a pictographic emoji.
///
/// Skin-tone modifiers, variation selectors and joiners are not emoji on
/// their own and are not counted.
pub fn is_emoji(c: char) -> bool {
    if matches!(c, '\u{1F3FB}'..='\u{1F3FF}') {
        return false;
    }
    matches!(
        c,
        '\u{1F300}'..='\u{1F5FF}'
            | '\u{1F600}'..='\u{1F64F}'
            | '\u{1F680}'..='\u{1F6FF}'
            | '\u{1F900}'..='\u{1F9FF}'
            | '\u{1FA70}'..='\u{1FAFF}'
            | '\u{1F1E6}'..='\u{1F1FF}'
            | '\u{1F004}'
            | '\u{1F0CF}'
            | '\u{1F170}'..='\u{1F251}'
            | '\u{2600}'..='\u{27BF}'
            | '\u{2300}'..='\u{23FF}'
            | '\u{2B05}'..='\u{2B07}'
            | '\u{2B1B}'..='\u{2B1C}'
            | '\u{2B50}'
            | '\u{2B55}'
            | '\u{2934}'..='\u{2935}'
            | '\u{3030}'
            | '\u{303D}'
            | '\u{3297}'
            | '\u{3299}'
    )
}

/// Counts emoji characters across messages.
pub fn emoji_frequency<'a>(
    messages: impl IntoIterator<Item = &'a Message>,
) -> BTreeMap<char, u64> {
    let mut counts = BTreeMap::new();
    for msg in messages {
        for c in msg.text().chars().filter(|c| is_emoji(*c)) {
            *counts.entry(c).or_insert(0) += 1;
        }
    }
    counts
}

/// Full distribution of text message lengths: `length -> count`.
///
/// Non-text messages have no length and are not counted.
pub fn length_distribution<'a>(
    messages: impl IntoIterator<Item = &'a Message>,
) -> BTreeMap<usize, u64> {
    let mut counts = BTreeMap::new();
    for msg in messages.into_iter().filter(|m| m.kind().is_text()) {
        *counts.entry(msg.length()).or_insert(0) += 1;
    }
    counts
}

/// Mean text length, or `0.0` without text messages.
pub fn average_length<'a>(messages: impl IntoIterator<Item = &'a Message>) -> f64 {
    let (total, count) = messages
        .into_iter()
        .filter(|m| m.kind().is_text())
        .fold((0usize, 0usize), |(total, count), m| (total + m.length(), count + 1));
    if count == 0 {
        0.0
    } else {
        total as f64 / count as f64
    }
}

/// The `n` largest counts, by count descending then key ascending.
pub fn top_n<K: Ord + Clone>(counts: &BTreeMap<K, u64>, n: usize) -> Vec<(K, u64)> {
    let mut ranked: Vec<(K, u64)> = counts.iter().map(|(k, v)| (k.clone(), *v)).collect();
    // map order is key ascending, a stable sort keeps it among equal counts
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(n);
    ranked
}
