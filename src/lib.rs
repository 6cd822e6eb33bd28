//! # QA Relay
//!
//! A question/answer record relay for search-engine clusters.
//!
//! QA Relay takes one QA exchange at a time — question, answer, optional
//! conversation id and extra fields — assembles it into a bulk-indexing
//! request, and POSTs it to an Elasticsearch-compatible `_bulk` endpoint.
//! The submitter is exposed both as a CLI and as an MCP-compatible tool
//! server for AI agents.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐   ┌──────────────────┐   ┌─────────────┐
//! │  CLI      │──▶│  Record          │──▶│  Cluster     │
//! │  (qar)    │   │  Submitter       │   │  POST _bulk  │
//! └───────────┘   │  answer → bulk   │   └─────────────┘
//! ┌───────────┐   │  → outcomes      │
//! │  HTTP     │──▶│                  │
//! │  (MCP)    │   └──────────────────┘
//! └───────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! qar submit --server http://localhost:9200 --index qa_log \
//!     --question "How do I reset my password?" \
//!     --answer "Use the account page."
//! qar tools list                # list the MCP tools
//! qar serve mcp                 # start the tool server
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Request and outcome types |
//! | [`answer`] | Embedded `<business>` block scanner |
//! | [`bulk`] | Index name, document id, and bulk body assembly |
//! | [`submit`] | The HTTP submitter and outcome mapping |
//! | [`traits`] | Tool trait, registry, and built-in tools |
//! | [`server`] | MCP HTTP server |

pub mod answer;
pub mod bulk;
pub mod config;
pub mod models;
pub mod server;
pub mod submit;
pub mod traits;
