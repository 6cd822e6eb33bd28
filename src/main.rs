//! # QA Relay CLI (`qar`)
//!
//! The `qar` binary is the primary interface for QA Relay. It submits
//! question/answer records to the cluster, previews the composed bulk
//! request, lists the MCP tools, and starts the tool server.
//!
//! ## Usage
//!
//! ```bash
//! qar --config ./config/qar.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `qar submit` | Submit one QA record to the cluster |
//! | `qar tools list` | List all registered MCP tools with schemas |
//! | `qar serve mcp` | Start the MCP-compatible HTTP server |
//!
//! ## Examples
//!
//! ```bash
//! # Submit a record with explicit cluster settings
//! qar submit --server http://localhost:9200 --index qa_log \
//!     --question "How do I reset my password?" \
//!     --answer "Use the account page."
//!
//! # Attach a conversation id and extra fields
//! qar submit --conversation-id conv-42 \
//!     --question "Invoice?" --answer "Attached." \
//!     --data '{"channel":"web"}'
//!
//! # Show the composed bulk request without sending it
//! qar submit --question "Invoice?" --answer "Attached." --dry-run
//!
//! # Start the MCP server for agent integration
//! qar serve mcp --config ./config/qar.toml
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use qa_relay::config::{self, Config};
use qa_relay::models::SubmitRequest;
use qa_relay::server::run_server;
use qa_relay::submit::{preview_bulk, submit_record};
use qa_relay::traits::ToolRegistry;

/// QA Relay CLI — push question/answer records into a search cluster.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. When the file is absent, built-in defaults apply and the cluster
/// settings must be passed as flags.
#[derive(Parser)]
#[command(
    name = "qar",
    about = "QA Relay — push question/answer records into a search cluster",
    version,
    long_about = "QA Relay assembles question/answer exchanges into bulk-indexing requests \
    and submits them to an Elasticsearch-compatible cluster, as a CLI and as an \
    MCP-compatible tool server for AI agents."
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/qar.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Submit one QA record to the cluster.
    ///
    /// Composes the dated index name, document id, and two-line bulk body,
    /// POSTs it to the cluster, and prints each structured outcome as a
    /// JSON line. Exits non-zero when the final outcome is a failure.
    Submit {
        /// Cluster base URL (falls back to `[cluster].server`).
        #[arg(long)]
        server: Option<String>,

        /// Index base name; the current date is appended (falls back to `[cluster].index`).
        #[arg(long)]
        index: Option<String>,

        /// The question text.
        #[arg(long)]
        question: String,

        /// The answer text, optionally carrying a `<business>` block.
        #[arg(long)]
        answer: String,

        /// Conversation identifier; defaults to the current epoch milliseconds.
        #[arg(long)]
        conversation_id: Option<String>,

        /// Extra fields as a JSON object string, merged into the record last.
        #[arg(long)]
        data: Option<String>,

        /// Compose and print the bulk request without sending it.
        #[arg(long)]
        dry_run: bool,
    },

    /// Inspect the MCP tools.
    Tools {
        #[command(subcommand)]
        action: ToolsAction,
    },

    /// Start the MCP-compatible HTTP server.
    ///
    /// Exposes the tools via a JSON API for integration with Cursor,
    /// Claude, and other MCP-compatible AI tools.
    Serve {
        #[command(subcommand)]
        service: ServeService,
    },
}

/// Tool inspection subcommands.
#[derive(Subcommand)]
enum ToolsAction {
    /// List all registered tools with their parameter schemas.
    List,
}

/// Server subcommands.
#[derive(Subcommand)]
enum ServeService {
    /// Start the MCP tool server on the configured bind address.
    Mcp,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "qa_relay=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let cfg = if cli.config.exists() {
        config::load_config(&cli.config)?
    } else {
        Config::default()
    };

    match cli.command {
        Commands::Submit {
            server,
            index,
            question,
            answer,
            conversation_id,
            data,
            dry_run,
        } => {
            run_submit(
                &cfg,
                server,
                index,
                question,
                answer,
                conversation_id,
                data,
                dry_run,
            )
            .await?;
        }
        Commands::Tools { action } => match action {
            ToolsAction::List => {
                list_tools();
            }
        },
        Commands::Serve { service } => match service {
            ServeService::Mcp => {
                run_server(&cfg).await?;
            }
        },
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn run_submit(
    cfg: &Config,
    server: Option<String>,
    index: Option<String>,
    question: String,
    answer: String,
    conversation_id: Option<String>,
    data: Option<String>,
    dry_run: bool,
) -> anyhow::Result<()> {
    let server = server.or_else(|| cfg.cluster.server.clone());
    let Some(server) = server else {
        anyhow::bail!("no cluster server; pass --server or set [cluster].server in the config");
    };

    let index = index.or_else(|| cfg.cluster.index.clone());
    let Some(index) = index else {
        anyhow::bail!("no index; pass --index or set [cluster].index in the config");
    };

    let request = SubmitRequest {
        server,
        index,
        conversation_id,
        question,
        answer,
        data,
    };

    if dry_run {
        let preview = preview_bulk(&request)?;
        println!("{}", serde_json::to_string_pretty(&preview)?);
        return Ok(());
    }

    let outcomes = submit_record(&request, cfg.cluster.timeout_secs).await;
    for outcome in &outcomes {
        println!("{}", serde_json::to_string(outcome)?);
    }

    let failed = outcomes.last().map(|o| !o.success).unwrap_or(true);
    if failed {
        std::process::exit(1);
    }

    Ok(())
}

fn list_tools() {
    let registry = ToolRegistry::with_builtins();
    for tool in registry.tools() {
        let tag = if tool.is_builtin() { "builtin" } else { "rust" };
        println!("{} — {} ({})", tool.name(), tool.description(), tag);
        println!(
            "  parameters: {}",
            serde_json::to_string(&tool.parameters_schema()).unwrap_or_default()
        );
    }
}
