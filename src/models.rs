//! Core data types used throughout QA Relay.
//!
//! These types represent the indexing request that flows into the submitter
//! and the structured outcomes it emits back to the caller.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One QA record submission, immutable for the duration of a call.
#[derive(Debug, Clone)]
pub struct SubmitRequest {
    /// Base URL of the cluster, e.g. `http://localhost:9200`.
    pub server: String,
    /// Index base name; the current local date is appended at call time.
    pub index: String,
    /// Conversation identifier. Defaults to the current epoch-millisecond
    /// timestamp when absent.
    pub conversation_id: Option<String>,
    /// The question text, stored under `query`.
    pub question: String,
    /// The answer text, possibly carrying an embedded `<business>` block.
    pub answer: String,
    /// Extra fields as a JSON object string, merged into the record last.
    pub data: Option<String>,
}

/// Structured outcome emitted to the caller.
///
/// A single submission yields one or more of these: a recoverable failure
/// for a rejected `DATA` field, then exactly one final outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitOutcome {
    pub success: bool,
    pub message: String,
    /// Parsed JSON body of the cluster's reply; `null` on failure.
    pub response: Option<Value>,
}

impl SubmitOutcome {
    pub fn ok(message: impl Into<String>, response: Value) -> Self {
        Self {
            success: true,
            message: message.into(),
            response: Some(response),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            response: None,
        }
    }
}
