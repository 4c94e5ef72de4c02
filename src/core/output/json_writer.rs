//! JSON output writer for the aggregate catalog.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::ChatstatError;
use crate::stats::AggregateResult;

/// Writes the aggregates to a JSON file.
///
/// # Format
/// One object keyed by metric id, each value tagged with its shape:
/// ```json
/// {
///   "messages_per_hour": {"type": "counts", "value": {"00:00": 0, "01:00": 3}},
///   "total_messages": {"type": "count", "value": 3}
/// }
/// ```
pub fn write_aggregates_json(
    result: &AggregateResult,
    output_path: impl AsRef<Path>,
) -> Result<(), ChatstatError> {
    let json = to_aggregates_json(result)?;
    let mut file = File::create(output_path)?;
    file.write_all(json.as_bytes())?;
    file.write_all(b"\n")?;
    Ok(())
}

/// Converts the aggregates to a pretty-printed JSON string.
///
/// Same format as [`write_aggregates_json`], but returns a `String`.
pub fn to_aggregates_json(result: &AggregateResult) -> Result<String, ChatstatError> {
    Ok(serde_json::to_string_pretty(result)?)
}
