//! Answer tag scanner.
//!
//! Answers produced by a preset flow may carry a machine-readable block
//! between literal `<business>` and `</business>` markers:
//!
//! ```text
//! Your invoice is attached.<business>{"category":"billing","order":42}</business>
//! ```
//!
//! [`parse_answer`] splits such an answer into the visible text before the
//! start marker and the embedded JSON object, so the caller can index the
//! embedded fields alongside the record. Answers without both markers pass
//! through verbatim.

use serde_json::{Map, Value};
use thiserror::Error;

/// Literal start marker of an embedded block.
pub const START_TAG: &str = "<business>";
/// Literal end marker of an embedded block.
pub const END_TAG: &str = "</business>";

/// Result of scanning an answer for an embedded block.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedAnswer {
    /// No embedded block; the full answer text, verbatim.
    Plain(String),
    /// Both markers found and the block parsed as a JSON object.
    Tagged {
        /// Text before the start marker, untrimmed.
        visible: String,
        /// Fields of the embedded JSON object.
        fields: Map<String, Value>,
    },
}

#[derive(Debug, Error)]
pub enum AnswerError {
    #[error("embedded block is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("embedded block must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}

/// Scan `answer` for an embedded block.
///
/// The first occurrence of each marker wins. If either marker is absent the
/// whole input is returned as [`ParsedAnswer::Plain`]. If both are present
/// the substring between them must parse as a JSON object, otherwise an
/// [`AnswerError`] is returned.
pub fn parse_answer(answer: &str) -> Result<ParsedAnswer, AnswerError> {
    let (Some(start), Some(end)) = (answer.find(START_TAG), answer.find(END_TAG)) else {
        return Ok(ParsedAnswer::Plain(answer.to_string()));
    };

    let visible = &answer[..start];
    // An end marker before the block start leaves nothing to parse; the
    // empty string then fails JSON parsing like any other malformed block.
    let embedded = answer.get(start + START_TAG.len()..end).unwrap_or("");

    let value: Value = serde_json::from_str(embedded)?;
    match value {
        Value::Object(fields) => Ok(ParsedAnswer::Tagged {
            visible: visible.to_string(),
            fields,
        }),
        other => Err(AnswerError::NotAnObject(json_type_name(&other))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
