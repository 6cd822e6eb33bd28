//! Bulk request assembly.
//!
//! Pure helpers that turn one [`SubmitRequest`](crate::models::SubmitRequest)
//! into the pieces of a bulk-indexing call: the date-suffixed index name,
//! the per-call document id, the target URL, the assembled record, and the
//! two-line newline-delimited body.
//!
//! # Record assembly
//!
//! Fields are merged last-write-wins, in this order:
//!
//! 1. `query` and `@timestamp` (local time, `YYYY-MM-DD HH:MM:SS`)
//! 2. `answer` and `preset`, plus any fields from an embedded block
//! 3. fields from the caller's extra-data object
//!
//! `preset` is the string `"true"` or `"false"`, matching the document
//! format already present in the target indices.

use chrono::{DateTime, Local};
use serde_json::{json, Map, Value};

use crate::answer::ParsedAnswer;

/// Compose the date-suffixed index name: `{base}_{YYYY.MM.DD}` in local time.
pub fn dated_index(base: &str, now: DateTime<Local>) -> String {
    format!("{}_{}", base, now.format("%Y.%m.%d"))
}

/// Compose the per-call document id: `{conversation_id}_{epoch_millis}`.
///
/// A missing or blank conversation id falls back to the epoch-millisecond
/// timestamp, so the id stays unique per call either way.
pub fn document_id(conversation_id: Option<&str>, now: DateTime<Local>) -> String {
    let millis = now.timestamp_millis();
    match conversation_id {
        Some(id) if !id.trim().is_empty() => format!("{}_{}", id, millis),
        _ => format!("{}_{}", millis, millis),
    }
}

/// Compose the bulk endpoint URL: `{server}/{index}/{index}/_bulk`.
///
/// The index name appears twice; the second segment is the legacy mapping
/// type still expected by the clusters this feeds.
pub fn target_url(server: &str, dated_index: &str) -> String {
    format!("{}/{}/{}/_bulk", server, dated_index, dated_index)
}

/// Assemble the QA record as a JSON object.
pub fn build_record(
    question: &str,
    parsed: &ParsedAnswer,
    extra: Option<&Map<String, Value>>,
    now: DateTime<Local>,
) -> Map<String, Value> {
    let mut record = Map::new();
    record.insert("query".to_string(), Value::String(question.to_string()));
    record.insert(
        "@timestamp".to_string(),
        Value::String(now.format("%Y-%m-%d %H:%M:%S").to_string()),
    );

    match parsed {
        ParsedAnswer::Plain(text) => {
            record.insert("preset".to_string(), Value::String("false".to_string()));
            record.insert("answer".to_string(), Value::String(text.clone()));
        }
        ParsedAnswer::Tagged { visible, fields } => {
            record.insert("answer".to_string(), Value::String(visible.clone()));
            record.insert("preset".to_string(), Value::String("true".to_string()));
            for (key, value) in fields {
                record.insert(key.clone(), value.clone());
            }
        }
    }

    if let Some(extra) = extra {
        for (key, value) in extra {
            record.insert(key.clone(), value.clone());
        }
    }

    record
}

/// Render the two-line bulk body: index command, CRLF, record, CRLF.
///
/// Both lines are compact JSON; non-ASCII characters are left unescaped.
pub fn bulk_body(document_id: &str, record: &Map<String, Value>) -> String {
    let command = json!({ "index": { "_id": document_id } });
    format!("{}\r\n{}\r\n", command, Value::Object(record.clone()))
}
