//! Words-of-interest lists.
//!
//! A words file is UTF-8 text with one word per line. Lines are trimmed,
//! blank lines are skipped and every word is lowercased so it can be
//! compared with the output of [`tokenize`](crate::stats::content::tokenize).

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

/// A set of lowercased words.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WordSet {
    words: BTreeSet<String>,
}

impl WordSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if `word` (compared lowercased) is in the set.
    pub fn contains(&self, word: &str) -> bool {
        if self.words.contains(word) {
            return true;
        }
        self.words.contains(&word.to_lowercase())
    }

    /// Number of distinct words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Returns `true` if the set has no words.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Iterates over the words in lexical order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }
}

impl<S: AsRef<str>> FromIterator<S> for WordSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let words = iter
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self { words }
    }
}

/// Parses the contents of a words file.
pub fn parse_words(content: &str) -> WordSet {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    content.lines().collect()
}

/// Loads a words file from disk.
pub fn load_words(path: impl AsRef<Path>) -> Result<WordSet> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let words = parse_words(&content);
    debug!(path = %path.display(), words = words.len(), "loaded words of interest");
    Ok(words)
}
