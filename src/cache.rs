//! Intermediate cache of a normalized conversation.
//!
//! The cache is a pretty-printed JSON array of messages, oldest first:
//!
//! ```json
//! [
//!   {
//!     "author": "Alice",
//!     "timestamp": "2020-01-01T10:00:00Z",
//!     "kind": "text",
//!     "text": "hello",
//!     "length": 5
//!   }
//! ]
//! ```
//!
//! `length` is written for readers of the file but recomputed on load, and
//! the loaded messages are put back into canonical order, so a cache file
//! edited by hand still yields a valid [`Conversation`].

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use tracing::debug;

use crate::Message;
use crate::conversation::Conversation;
use crate::error::ChatstatError;
use crate::normalize::canonicalize;

/// Writes a conversation to a cache file.
pub fn write_cache(conversation: &Conversation, path: impl AsRef<Path>) -> Result<(), ChatstatError> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, conversation.messages())?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    debug!(path = %path.display(), messages = conversation.len(), "cache written");
    Ok(())
}

/// Serializes a conversation to the cache format in memory.
pub fn to_cache_string(conversation: &Conversation) -> Result<String, ChatstatError> {
    Ok(serde_json::to_string_pretty(conversation.messages())?)
}

/// Loads a conversation from a cache file.
///
/// # Errors
///
/// Returns [`ChatstatError::Io`] if the file cannot be read and
/// [`ChatstatError::Parse`] if it is not a JSON array of messages.
pub fn read_cache(path: impl AsRef<Path>) -> Result<Conversation, ChatstatError> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    let messages: Vec<Message> = serde_json::from_reader(reader)
        .map_err(|e| cache_error(e, Some(path)))?;
    debug!(path = %path.display(), messages = messages.len(), "cache loaded");
    Ok(canonicalize(messages))
}

/// Loads a conversation from cache-format text.
pub fn from_cache_str(content: &str) -> Result<Conversation, ChatstatError> {
    let messages: Vec<Message> = serde_json::from_str(content).map_err(|e| cache_error(e, None))?;
    Ok(canonicalize(messages))
}

fn cache_error(source: serde_json::Error, path: Option<&Path>) -> ChatstatError {
    ChatstatError::Parse {
        format: "message cache",
        source: source.into(),
        path: path.map(Path::to_path_buf),
    }
}
