//! dbapp - command line client for Databricks Apps.
//!
//! Makes authenticated requests against a deployed app, tails its logs,
//! runs workspace checks (SQL, model serving, catalogs, identity) and serves a small
//! Web API. Credentials come from the `databricks` CLI.

mod cli;
mod commands;
mod server;

use std::io;

use anyhow::Result;
use clap::Parser;
use dbapp_core::{AppContext, Config};
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Commands};
use commands::logs::LogsArgs;
use commands::serving::ServingArgs;
use commands::tables::CatalogPath;

/// Initialize the tracing subscriber for logging
fn init_tracing(verbose: bool) {
    // RUST_LOG wins; otherwise warn, or debug with --verbose
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .with(filter)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load();
    debug!(profile = ?config.profile, host = ?config.host, app = ?config.app_name, "Loaded configuration");
    let ctx = AppContext::new(config)?;
    let app_url = cli.app_url.as_deref();

    match cli.command {
        Commands::Request { endpoint, method, data } => {
            commands::request::run(&ctx, app_url, &endpoint, &method, data.as_deref()).await
        }
        Commands::Logs { search, duration, interval, transport } => {
            let args = LogsArgs { search, duration, interval, transport };
            commands::logs::run(&ctx, app_url, args).await
        }
        Commands::Sql { query, warehouse } => {
            commands::sql::run(&ctx, &query, warehouse.as_deref()).await
        }
        Commands::Serving { endpoint, prompt, max_tokens, temperature } => {
            let args = ServingArgs { endpoint, prompt, max_tokens, temperature };
            commands::serving::run(&ctx, args).await
        }
        Commands::Tables { catalog, schema, table } => {
            commands::tables::run(&ctx, CatalogPath::from_args(catalog, schema, table)).await
        }
        Commands::Whoami => commands::whoami::run(&ctx).await,
        Commands::Serve { bind } => server::serve(ctx.workspace()?, bind).await,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
