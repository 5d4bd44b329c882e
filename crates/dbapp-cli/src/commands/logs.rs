use std::io::{self, Write};
use std::time::Duration;

use anyhow::Result;
use dbapp_core::logs::{
    run_session, ConsoleSink, SessionEnd, SessionSummary, StreamBudget, StreamOptions,
    TransportKind,
};
use dbapp_core::AppContext;
use tracing::debug;

/// Width of the rule printed under the session header
const RULE_WIDTH: usize = 50;

#[derive(Debug, Clone)]
pub struct LogsArgs {
    pub search: String,
    pub duration: i64,
    pub interval: u64,
    pub transport: TransportKind,
}

impl LogsArgs {
    pub fn options(&self) -> StreamOptions {
        StreamOptions {
            search: self.search.clone(),
            budget: StreamBudget::from_duration_secs(self.duration),
            interval: Duration::from_secs(self.interval),
        }
    }
}

fn header_lines(endpoint: &str, kind: TransportKind, options: &StreamOptions) -> Vec<String> {
    let mut lines = vec![format!("Fetching logs from: {}", endpoint)];
    if !options.search.is_empty() {
        lines.push(format!("Search query: '{}'", options.search));
    }

    let interval = options.interval.as_secs();
    let polling = kind == TransportKind::Batch;
    lines.push(match (options.budget, polling) {
        (StreamBudget::Once, true) => "Fetching latest logs once...".to_string(),
        (StreamBudget::Once, false) => {
            "Streaming until the server closes (Ctrl+C to stop)...".to_string()
        }
        (StreamBudget::For(d), true) => format!(
            "Streaming for {} seconds (fetching every {}s)...",
            d.as_secs(),
            interval
        ),
        (StreamBudget::For(d), false) => format!("Streaming for {} seconds...", d.as_secs()),
        (StreamBudget::Forever, true) => format!(
            "Streaming continuously (fetching every {}s, Ctrl+C to stop)...",
            interval
        ),
        (StreamBudget::Forever, false) => "Streaming continuously (Ctrl+C to stop)...".to_string(),
    });
    lines.push("-".repeat(RULE_WIDTH));
    lines
}

fn summary_lines(end: Option<SessionEnd>, budget: StreamBudget, displayed: usize) -> Vec<String> {
    let mut lines = Vec::new();
    match (end, budget) {
        (Some(SessionEnd::Interrupted), _) => lines.push("\nStopped by user".to_string()),
        (Some(SessionEnd::TimedOut), StreamBudget::For(d)) => {
            lines.push(format!("\nCompleted after {} seconds", d.as_secs()))
        }
        _ => {}
    }
    lines.push(format!("Displayed {} log messages", displayed));
    lines
}

/// Resolves on Ctrl+C. Never resolves if the handler cannot be installed.
async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        debug!(error = %e, "Unable to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}

pub async fn run(ctx: &AppContext, app_url: Option<&str>, args: LogsArgs) -> Result<()> {
    let client = ctx.app_client(app_url).await?;
    let options = args.options();
    let mut transport = args.transport.build(client);

    let mut out = io::stdout();
    for line in header_lines(&transport.endpoint(), args.transport, &options) {
        writeln!(out, "{}", line)?;
    }

    let mut sink = ConsoleSink::stdout();
    let SessionSummary { outcome, displayed } =
        run_session(transport.as_mut(), &options, &mut sink, ctrl_c()).await;

    let end = outcome.as_ref().ok().copied();
    for line in summary_lines(end, options.budget, displayed) {
        writeln!(out, "{}", line)?;
    }
    outcome.map(|_| ())
}
