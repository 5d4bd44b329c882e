use anyhow::Result;
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::time::Instant;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{header, HeaderValue};
use tokio_tungstenite::tungstenite::{self, Message};
use tracing::debug;
use url::Url;

use crate::api::ApiClient;
use crate::error::Error;

use super::payload::PayloadHandler;
use super::sink::LogSink;
use super::sse::STREAM_PATH;
use super::transport::{LogTransport, SessionEnd, StreamOptions};

/// Map an app base URL onto its WebSocket equivalent (`https` → `wss`).
pub fn websocket_url(base_url: &str, path: &str) -> Result<Url> {
    let mut url = Url::parse(base_url)
        .map_err(|e| Error::Config(format!("Invalid app URL {}: {}", base_url, e)))?;
    let scheme = match url.scheme() {
        "https" | "wss" => "wss",
        "http" | "ws" => "ws",
        other => {
            return Err(Error::Config(format!("Unsupported URL scheme '{}'", other)).into());
        }
    };
    url.set_scheme(scheme)
        .map_err(|_| Error::Config(format!("Cannot use {} over WebSocket", base_url)))?;
    let joined = format!("{}{}", url.path().trim_end_matches('/'), path);
    url.set_path(&joined);
    Ok(url)
}

fn connect_error(e: tungstenite::Error) -> anyhow::Error {
    match e {
        tungstenite::Error::Http(response) => {
            let status = reqwest::StatusCode::from_u16(response.status().as_u16())
                .unwrap_or(reqwest::StatusCode::BAD_GATEWAY);
            let body = response
                .body()
                .as_deref()
                .map(String::from_utf8_lossy)
                .unwrap_or_default();
            Error::from_status(status, &body).into()
        }
        other => Error::Transport(format!("WebSocket connection failed: {}", other)).into(),
    }
}

/// Streams logs over a WebSocket. The search string is sent as the first
/// frame; the server filters and pushes matching lines.
#[derive(Debug, Clone)]
pub struct WebSocketTransport {
    client: ApiClient,
}

impl WebSocketTransport {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LogTransport for WebSocketTransport {
    fn endpoint(&self) -> String {
        websocket_url(self.client.base_url(), STREAM_PATH)
            .map(String::from)
            .unwrap_or_else(|_| self.client.url(STREAM_PATH))
    }

    async fn stream(&mut self, options: &StreamOptions, sink: &mut dyn LogSink) -> Result<SessionEnd> {
        let url = websocket_url(self.client.base_url(), STREAM_PATH)?;
        let credential = self.client.credential().await?;

        let mut request = url.as_str().into_client_request()?;
        request.headers_mut().insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&credential.bearer())?,
        );

        let (mut socket, response) = tokio_tungstenite::connect_async(request)
            .await
            .map_err(connect_error)?;
        debug!(status = %response.status(), %url, "WebSocket connected");

        socket
            .send(Message::Text(options.search.clone()))
            .await
            .map_err(|e| Error::Transport(format!("Failed to send search filter: {}", e)))?;

        let deadline = options.budget.deadline(Instant::now());
        let mut handler = PayloadHandler::unfiltered();

        loop {
            let next = match deadline {
                Some(deadline) => match tokio::time::timeout_at(deadline, socket.next()).await {
                    Ok(next) => next,
                    Err(_) => {
                        let _ = socket.close(None).await;
                        return Ok(SessionEnd::TimedOut);
                    }
                },
                None => socket.next().await,
            };

            match next {
                Some(Ok(Message::Text(text))) => handler.handle(&text, sink)?,
                Some(Ok(Message::Binary(bytes))) => {
                    handler.handle(&String::from_utf8_lossy(&bytes), sink)?
                }
                Some(Ok(Message::Close(frame))) => {
                    debug!(?frame, "Server closed the WebSocket");
                    return Ok(SessionEnd::Completed);
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    return Err(Error::Transport(format!("WebSocket read failed: {}", e)).into());
                }
                None => return Ok(SessionEnd::Completed),
            }
        }
    }
}
