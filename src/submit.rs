//! Record submitter.
//!
//! Turns one [`SubmitRequest`] into a bulk-indexing POST against the target
//! cluster and maps every failure mode to a structured [`SubmitOutcome`]
//! instead of an error:
//!
//! - a rejected `DATA` object yields a failure outcome, then submission
//!   continues with the record as it stood before the merge;
//! - a rejected embedded answer block yields a failure outcome and stops —
//!   without the split there is no visible answer to index;
//! - transport errors, timeouts, and non-2xx statuses yield a failure
//!   outcome with the error text embedded in the message.
//!
//! The HTTP call is a single attempt with a configurable timeout. No
//! retries are performed.

use std::time::Duration;

use chrono::{DateTime, Local};
use serde_json::{json, Map, Value};
use tracing::{error, info};

use crate::answer::{parse_answer, AnswerError};
use crate::bulk;
use crate::models::{SubmitOutcome, SubmitRequest};

/// Everything derived from one request before the HTTP call.
#[derive(Debug, Clone)]
pub struct ComposedBulk {
    pub url: String,
    pub index: String,
    pub document_id: String,
    pub record: Map<String, Value>,
    pub body: String,
    /// Parse error text for a rejected `DATA` object, if any.
    pub data_error: Option<String>,
}

/// Compose the bulk request for `request` at the instant `now`.
///
/// Fails only when the answer carries a malformed embedded block. A
/// malformed `DATA` object is recorded in
/// [`data_error`](ComposedBulk::data_error) and the merge is skipped.
pub fn compose_bulk(
    request: &SubmitRequest,
    now: DateTime<Local>,
) -> Result<ComposedBulk, AnswerError> {
    let parsed = parse_answer(&request.answer)?;

    let mut data_error = None;
    let extra = match request.data.as_deref() {
        Some(data) if !data.is_empty() => {
            match serde_json::from_str::<Map<String, Value>>(data) {
                Ok(map) => Some(map),
                Err(e) => {
                    data_error = Some(e.to_string());
                    None
                }
            }
        }
        _ => None,
    };

    let index = bulk::dated_index(&request.index, now);
    let document_id = bulk::document_id(request.conversation_id.as_deref(), now);
    let url = bulk::target_url(&request.server, &index);
    let record = bulk::build_record(&request.question, &parsed, extra.as_ref(), now);
    let body = bulk::bulk_body(&document_id, &record);

    Ok(ComposedBulk {
        url,
        index,
        document_id,
        record,
        body,
        data_error,
    })
}

/// Submit one QA record to the cluster.
///
/// Returns the outcomes in emission order; the last element is always the
/// final outcome. See the module docs for the failure mapping.
pub async fn submit_record(request: &SubmitRequest, timeout_secs: u64) -> Vec<SubmitOutcome> {
    let mut outcomes = Vec::new();

    let composed = match compose_bulk(request, Local::now()) {
        Ok(composed) => composed,
        Err(e) => {
            error!(error = %e, "Rejected embedded answer block");
            outcomes.push(SubmitOutcome::failure(format!(
                "Failed to parse the embedded answer block: {}",
                e
            )));
            return outcomes;
        }
    };

    if let Some(parse_error) = &composed.data_error {
        error!(error = %parse_error, "Rejected DATA object");
        outcomes.push(SubmitOutcome::failure(format!(
            "Failed to parse DATA JSON: {}",
            parse_error
        )));
    }

    info!(
        url = %composed.url,
        document_id = %composed.document_id,
        "Sending bulk request"
    );

    outcomes.push(post_bulk(&composed.url, composed.body, timeout_secs).await);
    outcomes
}

/// Render a dry-run view of the composed request without sending it.
pub fn preview_bulk(request: &SubmitRequest) -> anyhow::Result<Value> {
    let composed = compose_bulk(request, Local::now())
        .map_err(|e| anyhow::anyhow!("invalid embedded answer block: {}", e))?;

    Ok(json!({
        "url": composed.url,
        "index": composed.index,
        "document_id": composed.document_id,
        "record": Value::Object(composed.record),
        "body": composed.body,
        "data_error": composed.data_error,
    }))
}

/// One POST to the bulk endpoint, mapped to a final outcome.
async fn post_bulk(url: &str, body: String, timeout_secs: u64) -> SubmitOutcome {
    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "Failed to build HTTP client");
            return SubmitOutcome::failure(format!("Failed to build HTTP client: {}", e));
        }
    };

    let result = client
        .post(url)
        .header("Content-Type", "application/json")
        .body(body)
        .send()
        .await;

    match result {
        Ok(response) => {
            let status = response.status();
            info!(status = %status, "Cluster responded");

            if !status.is_success() {
                let body_text = response.text().await.unwrap_or_default();
                error!(status = %status, "Bulk request rejected");
                return SubmitOutcome::failure(format!(
                    "Failed to send record to the cluster: HTTP {}: {}",
                    status, body_text
                ));
            }

            match response.json::<Value>().await {
                Ok(reply) => SubmitOutcome::ok("Record saved to the cluster", reply),
                Err(e) => {
                    error!(error = %e, "Cluster reply was not JSON");
                    SubmitOutcome::failure(format!("Failed to decode cluster response: {}", e))
                }
            }
        }
        Err(e) => {
            error!(error = %e, "Bulk request failed");
            SubmitOutcome::failure(format!("Failed to send record to the cluster: {}", e))
        }
    }
}
