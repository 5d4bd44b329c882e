use std::future::Future;

use anyhow::Result;
use tracing::debug;

use super::sink::LogSink;
use super::transport::{LogTransport, SessionEnd, StreamOptions};

/// Outcome of one log session. `displayed` is valid even when the session failed.
#[derive(Debug)]
pub struct SessionSummary {
    pub outcome: Result<SessionEnd>,
    pub displayed: usize,
}

/// Run a transport until it finishes or `interrupt` resolves.
///
/// On interrupt the transport future is dropped, which closes its connection.
pub async fn run_session<F>(
    transport: &mut dyn LogTransport,
    options: &StreamOptions,
    sink: &mut dyn LogSink,
    interrupt: F,
) -> SessionSummary
where
    F: Future<Output = ()>,
{
    let outcome = {
        let session = transport.stream(options, sink);
        tokio::select! {
            result = session => result,
            _ = interrupt => {
                debug!("Log session interrupted");
                Ok(SessionEnd::Interrupted)
            }
        }
    };

    SessionSummary {
        outcome,
        displayed: sink.displayed(),
    }
}
