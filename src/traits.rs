//! Tool trait, registry, and built-in tools.
//!
//! QA Relay exposes its functionality to agents as MCP-style tools. The
//! built-in tools — `index_qa` (submit a record) and `preview_bulk`
//! (dry-run the composition) — are registered in a [`ToolRegistry`] and
//! dispatched by the HTTP server through the same `POST /tools/{name}`
//! handler as any custom Rust tool.
//!
//! # Custom tools
//!
//! ```rust
//! use async_trait::async_trait;
//! use anyhow::Result;
//! use serde_json::{json, Value};
//! use qa_relay::traits::{Tool, ToolContext};
//!
//! pub struct ClusterNameTool;
//!
//! #[async_trait]
//! impl Tool for ClusterNameTool {
//!     fn name(&self) -> &str { "cluster_name" }
//!     fn description(&self) -> &str { "Report the configured cluster" }
//!
//!     fn parameters_schema(&self) -> Value {
//!         json!({ "type": "object", "properties": {} })
//!     }
//!
//!     async fn execute(&self, _params: Value, ctx: &ToolContext) -> Result<Value> {
//!         Ok(json!({ "server": ctx.config().cluster.server.clone() }))
//!     }
//! }
//! ```

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::config::Config;
use crate::models::{SubmitOutcome, SubmitRequest};
use crate::submit::{preview_bulk, submit_record};

/// An MCP tool that agents can discover and call.
///
/// Registered tools are exposed via `GET /tools/list` for discovery and
/// `POST /tools/{name}` for invocation.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name, used as the route path and in `GET /tools/list`.
    /// Should be a lowercase identifier with underscores.
    fn name(&self) -> &str;

    /// One-line description for agent discovery.
    fn description(&self) -> &str;

    /// Whether this tool ships with QA Relay. Defaults to `false`.
    fn is_builtin(&self) -> bool {
        false
    }

    /// OpenAI function-calling JSON Schema for the tool's parameters.
    fn parameters_schema(&self) -> Value;

    /// Execute the tool with validated parameters.
    ///
    /// The returned value is wrapped as `{ "result": ... }` in the HTTP
    /// response.
    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<Value>;
}

/// Serializable tool info for the `/tools/list` endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ToolInfo {
    pub name: String,
    pub description: String,
    pub builtin: bool,
    pub parameters: Value,
}

/// Context bridge for tool execution.
///
/// Created by the server for each invocation. Tools reach the submitter
/// and the application config through this, never directly.
pub struct ToolContext {
    config: Arc<Config>,
}

impl ToolContext {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    /// Application configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Submit one QA record to the cluster.
    ///
    /// Equivalent to `POST /tools/index_qa` or `qar submit`.
    pub async fn submit(&self, request: &SubmitRequest) -> Vec<SubmitOutcome> {
        submit_record(request, self.config.cluster.timeout_secs).await
    }
}

/// Shared parameter names of the submission tools.
///
/// `SERVER` and `INDEX` may be omitted when `[cluster]` defaults are
/// configured; `QUESTIONS` and `ANSWER` are always required.
fn submit_parameters_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "SERVER": { "type": "string", "description": "Cluster base URL, e.g. http://localhost:9200" },
            "INDEX": { "type": "string", "description": "Index base name; the current date is appended" },
            "CONVERSATION_ID": { "type": "string", "description": "Conversation identifier; defaults to the current epoch milliseconds" },
            "QUESTIONS": { "type": "string", "description": "The question text" },
            "ANSWER": { "type": "string", "description": "The answer text, optionally carrying a <business> block" },
            "DATA": { "type": "string", "description": "Extra fields as a JSON object string, merged into the record" }
        },
        "required": ["QUESTIONS", "ANSWER"]
    })
}

/// Build a [`SubmitRequest`] from tool parameters, falling back to the
/// configured cluster defaults for `SERVER` and `INDEX`.
fn request_from_params(params: &Value, config: &Config) -> Result<SubmitRequest> {
    let server = params
        .get("SERVER")
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| config.cluster.server.clone());
    let Some(server) = server else {
        bail!("SERVER must be provided or configured under [cluster].server");
    };

    let index = params
        .get("INDEX")
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| config.cluster.index.clone());
    let Some(index) = index else {
        bail!("INDEX must be provided or configured under [cluster].index");
    };

    let question = params.get("QUESTIONS").and_then(Value::as_str).unwrap_or("");
    if question.trim().is_empty() {
        bail!("QUESTIONS must not be empty");
    }

    let Some(answer) = params.get("ANSWER").and_then(Value::as_str) else {
        bail!("ANSWER must be provided");
    };

    Ok(SubmitRequest {
        server,
        index,
        conversation_id: params
            .get("CONVERSATION_ID")
            .and_then(Value::as_str)
            .map(str::to_string),
        question: question.to_string(),
        answer: answer.to_string(),
        data: params.get("DATA").and_then(Value::as_str).map(str::to_string),
    })
}

/// Built-in record submission tool. Delegates to [`ToolContext::submit`].
pub struct IndexQaTool;

#[async_trait]
impl Tool for IndexQaTool {
    fn name(&self) -> &str {
        "index_qa"
    }

    fn description(&self) -> &str {
        "Index a question/answer record into the cluster"
    }

    fn is_builtin(&self) -> bool {
        true
    }

    fn parameters_schema(&self) -> Value {
        submit_parameters_schema()
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<Value> {
        let request = request_from_params(&params, ctx.config())?;
        let outcomes = ctx.submit(&request).await;
        Ok(json!({ "results": outcomes }))
    }
}

/// Built-in dry-run tool. Composes the bulk request without sending it.
pub struct PreviewBulkTool;

#[async_trait]
impl Tool for PreviewBulkTool {
    fn name(&self) -> &str {
        "preview_bulk"
    }

    fn description(&self) -> &str {
        "Compose the bulk request for a record without sending it"
    }

    fn is_builtin(&self) -> bool {
        true
    }

    fn parameters_schema(&self) -> Value {
        submit_parameters_schema()
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<Value> {
        let request = request_from_params(&params, ctx.config())?;
        preview_bulk(&request)
    }
}

/// Registry for tools (built-in and custom Rust).
///
/// Use [`ToolRegistry::with_builtins`] to create a registry pre-loaded
/// with `index_qa` and `preview_bulk`, then optionally
/// [`register`](ToolRegistry::register) custom ones.
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    /// Create an empty tool registry.
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Create a tool registry pre-loaded with the built-in tools.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(IndexQaTool));
        registry.register(Box::new(PreviewBulkTool));
        registry
    }

    /// Register a tool.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        self.tools.push(tool);
    }

    /// Get all registered tools.
    pub fn tools(&self) -> &[Box<dyn Tool>] {
        &self.tools
    }

    /// Find a tool by name.
    pub fn find(&self, name: &str) -> Option<&dyn Tool> {
        self.tools
            .iter()
            .find(|t| t.name() == name)
            .map(|t| t.as_ref())
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Return the count of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
