//! End-to-end tests for the MCP tool server.
//!
//! These start the real HTTP server on a free port, point the `index_qa`
//! tool at a stub cluster, and drive everything over HTTP the way an
//! MCP client would.

use anyhow::Result;
use async_trait::async_trait;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

use qa_relay::config::Config;
use qa_relay::server::run_server_with_extensions;
use qa_relay::traits::{Tool, ToolContext, ToolRegistry};

// ─── Stub cluster ───────────────────────────────────────────────────

#[derive(Clone, Default)]
struct Captured {
    bodies: Arc<Mutex<Vec<String>>>,
}

async fn handle_bulk(State(captured): State<Captured>, body: String) -> Json<Value> {
    captured.bodies.lock().unwrap().push(body);
    Json(json!({ "result": "created" }))
}

async fn spawn_stub_cluster() -> (String, Captured) {
    let captured = Captured::default();
    let app = Router::new()
        .route("/{index}/{doc_type}/_bulk", post(handle_bulk))
        .with_state(captured.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), captured)
}

// ─── Test tool ──────────────────────────────────────────────────────

/// A custom tool that echoes its parameter back.
struct EchoTool;

#[async_trait]
impl Tool for EchoTool {
    fn name(&self) -> &str {
        "echo"
    }

    fn description(&self) -> &str {
        "Echo the given text"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "text": { "type": "string", "description": "Text to echo" }
            },
            "required": ["text"]
        })
    }

    async fn execute(&self, params: Value, _ctx: &ToolContext) -> Result<Value> {
        Ok(json!({ "echo": params["text"] }))
    }
}

// ─── Harness ────────────────────────────────────────────────────────

fn find_free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

fn test_config(port: u16, cluster: Option<(&str, &str)>) -> Config {
    let mut content = format!("[server]\nbind = \"127.0.0.1:{}\"\n", port);
    if let Some((server, index)) = cluster {
        content.push_str(&format!(
            "\n[cluster]\nserver = \"{}\"\nindex = \"{}\"\n",
            server, index
        ));
    }
    toml::from_str(&content).unwrap()
}

async fn wait_for_server(port: u16) {
    let client = reqwest::Client::new();
    let url = format!("http://127.0.0.1:{}/health", port);
    for _ in 0..50 {
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        if let Ok(resp) = client.get(&url).send().await {
            if resp.status().is_success() {
                return;
            }
        }
    }
    panic!("Server did not become ready within 5 seconds");
}

/// Start the tool server and return its base URL.
async fn start_server(cfg: Config, extras: ToolRegistry) -> String {
    let port: u16 = cfg.server.bind.rsplit(':').next().unwrap().parse().unwrap();
    tokio::spawn(async move {
        run_server_with_extensions(&cfg, Arc::new(extras))
            .await
            .unwrap();
    });
    wait_for_server(port).await;
    format!("http://127.0.0.1:{}", port)
}

// ─── Tests ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_tools_list_includes_builtins_and_extras() {
    let cfg = test_config(find_free_port(), None);
    let mut extras = ToolRegistry::new();
    extras.register(Box::new(EchoTool));
    let base = start_server(cfg, extras).await;

    let resp: Value = reqwest::get(format!("{}/tools/list", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let tools = resp["tools"].as_array().unwrap();
    let find = |name: &str| tools.iter().find(|t| t["name"] == json!(name));

    let index_qa = find("index_qa").expect("index_qa should be listed");
    assert_eq!(index_qa["builtin"], json!(true));
    let required = index_qa["parameters"]["required"].as_array().unwrap();
    assert!(required.contains(&json!("QUESTIONS")));
    assert!(required.contains(&json!("ANSWER")));

    assert!(find("preview_bulk").is_some());
    let echo = find("echo").expect("custom tool should be listed");
    assert_eq!(echo["builtin"], json!(false));
}

#[tokio::test]
async fn test_missing_required_param_is_bad_request() {
    let cfg = test_config(find_free_port(), None);
    let base = start_server(cfg, ToolRegistry::new()).await;

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{}/tools/index_qa", base))
        .json(&json!({ "QUESTIONS": "why?" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], json!("bad_request"));
    assert!(body["error"]["message"].as_str().unwrap().contains("ANSWER"));
}

#[tokio::test]
async fn test_missing_cluster_settings_is_bad_request() {
    // No [cluster] defaults and no SERVER parameter.
    let cfg = test_config(find_free_port(), None);
    let base = start_server(cfg, ToolRegistry::new()).await;

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{}/tools/index_qa", base))
        .json(&json!({ "QUESTIONS": "why?", "ANSWER": "because" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"]["message"].as_str().unwrap().contains("SERVER"));
}

#[tokio::test]
async fn test_unknown_tool_is_not_found() {
    let cfg = test_config(find_free_port(), None);
    let base = start_server(cfg, ToolRegistry::new()).await;

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{}/tools/nope", base))
        .json(&json!({}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], json!("not_found"));
}

#[tokio::test]
async fn test_index_qa_end_to_end() {
    let (cluster, captured) = spawn_stub_cluster().await;
    let cfg = test_config(find_free_port(), None);
    let base = start_server(cfg, ToolRegistry::new()).await;

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{}/tools/index_qa", base))
        .json(&json!({
            "SERVER": cluster,
            "INDEX": "qa_log",
            "CONVERSATION_ID": "conv-7",
            "QUESTIONS": "Invoice?",
            "ANSWER": "Attached."
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = resp.json().await.unwrap();
    let results = body["result"]["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["success"], json!(true));
    assert_eq!(results[0]["response"], json!({ "result": "created" }));

    assert_eq!(captured.bodies.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_cluster_defaults_fill_server_and_index() {
    let (cluster, captured) = spawn_stub_cluster().await;
    let cfg = test_config(find_free_port(), Some((&cluster, "qa_log")));
    let base = start_server(cfg, ToolRegistry::new()).await;

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{}/tools/index_qa", base))
        .json(&json!({ "QUESTIONS": "Invoice?", "ANSWER": "Attached." }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["result"]["results"][0]["success"], json!(true));
    assert_eq!(captured.bodies.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_preview_bulk_does_not_send() {
    let (cluster, captured) = spawn_stub_cluster().await;
    let cfg = test_config(find_free_port(), None);
    let base = start_server(cfg, ToolRegistry::new()).await;

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{}/tools/preview_bulk", base))
        .json(&json!({
            "SERVER": cluster,
            "INDEX": "qa_log",
            "QUESTIONS": "Invoice?",
            "ANSWER": "Attached.<business>{\"category\":\"billing\"}</business>"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = resp.json().await.unwrap();
    let result = &body["result"];
    assert!(result["url"].as_str().unwrap().ends_with("/_bulk"));
    assert!(result["body"].as_str().unwrap().ends_with("\r\n"));
    assert_eq!(result["record"]["preset"], json!("true"));
    assert_eq!(result["record"]["category"], json!("billing"));

    assert!(captured.bodies.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_custom_tool_dispatch() {
    let cfg = test_config(find_free_port(), None);
    let mut extras = ToolRegistry::new();
    extras.register(Box::new(EchoTool));
    let base = start_server(cfg, extras).await;

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{}/tools/echo", base))
        .json(&json!({ "text": "hello" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["result"]["echo"], json!("hello"));
}
