use std::net::SocketAddr;

use clap::{Parser, Subcommand};
use dbapp_core::logs::TransportKind;

/// dbapp - client for a deployed Databricks App and its workspace
#[derive(Parser, Debug)]
#[command(name = "dbapp")]
#[command(version)]
#[command(about = "Authenticated requests, log tailing and workspace checks for Databricks Apps")]
pub struct Cli {
    /// Base URL of the app (auto-detected from DATABRICKS_APP_NAME if omitted)
    #[arg(long, global = true, value_name = "URL")]
    pub app_url: Option<String>,

    /// Show debug logging on stderr
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Make an authenticated request against the app
    Request {
        /// Path on the app, e.g. /api/user/me
        endpoint: String,

        /// HTTP method (GET, POST, PUT, DELETE)
        #[arg(default_value = "GET")]
        method: String,

        /// JSON body for POST and PUT
        data: Option<String>,
    },

    /// Tail the app's logs
    Logs {
        /// Only show messages containing this text (case-insensitive)
        #[arg(long, default_value = "")]
        search: String,

        /// Seconds to keep streaming (0 = once, negative = until Ctrl+C)
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        duration: i64,

        /// Seconds between fetches when polling
        #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u64).range(1..))]
        interval: u64,

        /// How logs are retrieved: batch, sse or ws
        #[arg(long, default_value = "batch")]
        transport: TransportKind,
    },

    /// Run a SQL statement on a SQL warehouse
    Sql {
        /// Statement to execute
        query: String,

        /// Warehouse ID (defaults to the first warehouse listed)
        #[arg(long)]
        warehouse: Option<String>,
    },

    /// Check and query a model serving endpoint
    Serving {
        #[arg(long, default_value = "databricks-claude-sonnet-4")]
        endpoint: String,

        #[arg(long, default_value = "How tall is the eiffel tower?")]
        prompt: String,

        #[arg(long, default_value_t = 150)]
        max_tokens: u32,

        #[arg(long, default_value_t = 0.7)]
        temperature: f32,
    },

    /// Browse Unity Catalog: catalogs, then schemas, tables and one table's columns
    Tables {
        catalog: Option<String>,
        schema: Option<String>,
        table: Option<String>,
    },

    /// Show the identity behind the current credential
    Whoami,

    /// Serve the Web API
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:8000")]
        bind: SocketAddr,
    },
}
