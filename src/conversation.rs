//! The normalized, time-ordered message sequence of one dialogue.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::Message;

/// An ordered sequence of messages plus the set of their authors.
///
/// Messages are sorted by timestamp and free of duplicates. Only the
/// [normalizer](crate::normalize) builds a non-empty conversation, so the
/// ordering can be relied on by every consumer. An empty conversation is
/// valid; every aggregate over it is an identity value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Conversation {
    messages: Vec<Message>,
    authors: BTreeSet<String>,
}

impl Conversation {
    /// Creates an empty conversation.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Wraps messages that are already canonical.
    pub(crate) fn from_sorted(messages: Vec<Message>) -> Self {
        let authors = messages.iter().map(|m| m.author().to_string()).collect();
        Self { messages, authors }
    }

    /// Returns the messages in time order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Returns the distinct authors in name order.
    pub fn authors(&self) -> &BTreeSet<String> {
        &self.authors
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns `true` if there are no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Consumes the conversation, returning its messages.
    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }
}

impl<'a> IntoIterator for &'a Conversation {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}
