use std::convert::Infallible;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use dbapp_core::api::ApiClient;
use dbapp_core::auth::CredentialProvider;
use dbapp_core::logs::{
    run_session, BatchTransport, ConsoleSink, LogSink, LogTransport, SessionEnd, SseTransport,
    StreamBudget, StreamOptions, WebSocketTransport,
};
use dbapp_core::Error;
use futures::{SinkExt, StreamExt};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::Message;

const TOKEN: &str = "test-token";

async fn spawn(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

fn client(base: &str) -> ApiClient {
    let credentials = Arc::new(Mutex::new(CredentialProvider::from_static(TOKEN)));
    ApiClient::new(base, credentials).unwrap()
}

fn output(sink: ConsoleSink<Vec<u8>>) -> Vec<String> {
    String::from_utf8(sink.into_inner())
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

fn options(search: &str, budget: StreamBudget) -> StreamOptions {
    StreamOptions {
        search: search.to_string(),
        budget,
        interval: Duration::from_millis(20),
    }
}

// ============================================================================
// Batch polling
// ============================================================================

fn batch_router(calls: Arc<AtomicUsize>) -> Router {
    Router::new()
        .route(
            "/logz/batch",
            get(|State(calls): State<Arc<AtomicUsize>>| async move {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                let body = match n {
                    0 => json!([
                        {"timestamp": 2, "source": "APP", "message": "b"},
                        {"timestamp": 1, "source": "SYSTEM", "message": "a"}
                    ]),
                    1 => json!([
                        {"timestamp": 1, "source": "SYSTEM", "message": "a"},
                        {"timestamp": 2, "source": "APP", "message": "b"},
                        {"timestamp": 3, "source": "APP", "message": "c error"}
                    ]),
                    _ => json!([
                        {"timestamp": 2, "source": "APP", "message": "b"},
                        {"timestamp": 3, "source": "APP", "message": "c error"},
                        {"timestamp": 4, "source": "APP", "message": "d ERROR"}
                    ]),
                };
                Json(body)
            }),
        )
        .with_state(calls)
}

#[tokio::test]
async fn test_batch_polling_never_repeats_records() {
    let calls = Arc::new(AtomicUsize::new(0));
    let base = spawn(batch_router(calls.clone())).await;
    let mut transport = BatchTransport::new(client(&base));
    let mut sink = ConsoleSink::new(Vec::new());

    let end = transport
        .stream(&options("", StreamBudget::For(Duration::from_millis(250))), &mut sink)
        .await
        .unwrap();

    assert_eq!(end, SessionEnd::TimedOut);
    assert!(calls.load(Ordering::SeqCst) >= 3);
    assert_eq!(sink.displayed(), 4);
    let lines = output(sink);
    let messages: Vec<&str> = lines.iter().map(|l| l.rsplit(": ").next().unwrap()).collect();
    assert_eq!(messages, vec!["a", "b", "c error", "d ERROR"]);
    assert!(lines[0].contains("] SYSTEM: a"));
}

#[tokio::test]
async fn test_batch_once_fetches_a_single_time_even_with_search() {
    let calls = Arc::new(AtomicUsize::new(2));
    let base = spawn(batch_router(calls.clone())).await;
    let mut transport = BatchTransport::new(client(&base));
    let mut sink = ConsoleSink::new(Vec::new());

    let end = transport
        .stream(&options("error", StreamBudget::Once), &mut sink)
        .await
        .unwrap();

    assert_eq!(end, SessionEnd::Completed);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(sink.displayed(), 2);
}

#[tokio::test]
async fn test_batch_non_list_body_yields_nothing() {
    let router = Router::new().route("/logz/batch", get(|| async { Json(json!({"detail": "x"})) }));
    let base = spawn(router).await;
    let transport = BatchTransport::new(client(&base));

    assert!(transport.fetch("").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_batch_keeps_records_with_null_fields() {
    let router = Router::new().route(
        "/logz/batch",
        get(|| async {
            Json(json!([
                {"timestamp": 3, "source": null, "message": "boot"},
                {"timestamp": 4, "source": "APP", "message": null}
            ]))
        }),
    );
    let base = spawn(router).await;
    let transport = BatchTransport::new(client(&base));

    let records = transport.fetch("").await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].message, "boot");
    assert_eq!(records[1].message, "");
}

// ============================================================================
// Server-Sent Events
// ============================================================================

fn sse_response(frames: Vec<&'static str>, hang: bool) -> impl IntoResponse {
    let frames = futures::stream::iter(frames.into_iter().map(Ok::<_, Infallible>));
    let body = if hang {
        Body::from_stream(frames.chain(futures::stream::pending()))
    } else {
        Body::from_stream(frames)
    };
    ([(header::CONTENT_TYPE, "text/event-stream")], body)
}

#[tokio::test]
async fn test_sse_heartbeat_records_and_raw_lines() {
    let router = Router::new().route(
        "/logz/stream",
        get(|| async {
            sse_response(
                vec![
                    "data: \0\n\n",
                    "data: \0\n\n",
                    "data: {\"timestamp\": 5, \"source\": \"APP\", \"message\": \"ready\"}\n\n",
                    "data: plain text line\n\n",
                ],
                false,
            )
        }),
    );
    let base = spawn(router).await;
    let mut transport = SseTransport::new(client(&base));
    let mut sink = ConsoleSink::new(Vec::new());

    let end = transport
        .stream(&options("", StreamBudget::Once), &mut sink)
        .await
        .unwrap();

    assert_eq!(end, SessionEnd::Completed);
    assert_eq!(sink.displayed(), 2);
    let lines = output(sink);
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("No logs available yet"));
    assert!(lines[1].ends_with("APP   : ready"));
    assert_eq!(lines[2], "plain text line");
}

#[tokio::test]
async fn test_sse_stops_at_duration() {
    let router = Router::new().route(
        "/logz/stream",
        get(|| async { sse_response(vec!["data: {\"message\": \"one\"}\n\n"], true) }),
    );
    let base = spawn(router).await;
    let mut transport = SseTransport::new(client(&base));
    let mut sink = ConsoleSink::new(Vec::new());

    let end = transport
        .stream(&options("", StreamBudget::For(Duration::from_millis(200))), &mut sink)
        .await
        .unwrap();

    assert_eq!(end, SessionEnd::TimedOut);
    assert_eq!(sink.displayed(), 1);
}

#[tokio::test]
async fn test_sse_rejected_handshake_is_http_error() {
    let router = Router::new().route(
        "/logz/stream",
        get(|| async { (StatusCode::FORBIDDEN, "not allowed") }),
    );
    let base = spawn(router).await;
    let mut transport = SseTransport::new(client(&base));
    let mut sink = ConsoleSink::new(Vec::new());

    let err = transport
        .stream(&options("", StreamBudget::Once), &mut sink)
        .await
        .unwrap_err();
    match err.downcast_ref::<Error>() {
        Some(Error::Http { status, .. }) => assert_eq!(status.as_u16(), 403),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_sse_session_interrupt() {
    let router = Router::new().route(
        "/logz/stream",
        get(|| async { sse_response(vec!["data: \0\n\n"], true) }),
    );
    let base = spawn(router).await;
    let mut transport = SseTransport::new(client(&base));
    let mut sink = ConsoleSink::new(Vec::new());

    let summary = run_session(
        &mut transport,
        &options("", StreamBudget::Forever),
        &mut sink,
        tokio::time::sleep(Duration::from_millis(150)),
    )
    .await;

    assert_eq!(summary.outcome.unwrap(), SessionEnd::Interrupted);
    assert_eq!(summary.displayed, 0);
}

// ============================================================================
// WebSocket
// ============================================================================

/// Accepts one connection, records the auth header and first inbound frame,
/// then pushes `frames` and closes.
async fn spawn_ws(frames: Vec<&'static str>) -> (String, tokio::task::JoinHandle<(Option<String>, Message)>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let auth = Arc::new(StdMutex::new(None));
        let captured = auth.clone();
        let mut ws = tokio_tungstenite::accept_hdr_async(
            stream,
            move |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
                *captured.lock().unwrap() = req
                    .headers()
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                Ok(resp)
            },
        )
        .await
        .unwrap();

        let first = ws.next().await.unwrap().unwrap();
        for frame in frames {
            ws.send(Message::Text(frame.to_string())).await.unwrap();
        }
        ws.close(None).await.unwrap();
        // Drain until the client acknowledges the close
        while let Some(Ok(_)) = ws.next().await {}

        let auth = auth.lock().unwrap().clone();
        (auth, first)
    });
    (format!("http://{}", addr), handle)
}

#[tokio::test]
async fn test_websocket_sends_search_first_then_reads_frames() {
    let (base, server) = spawn_ws(vec![
        r#"{"timestamp": 7, "source": "SYSTEM", "message": "restarted"}"#,
        "raw frame",
    ])
    .await;
    let mut transport = WebSocketTransport::new(client(&base));
    let mut sink = ConsoleSink::new(Vec::new());

    let end = transport
        .stream(&options("error", StreamBudget::Once), &mut sink)
        .await
        .unwrap();

    assert_eq!(end, SessionEnd::Completed);
    let (auth, first) = server.await.unwrap();
    assert_eq!(auth.as_deref(), Some("Bearer test-token"));
    assert_eq!(first, Message::Text("error".into()));
    // The server did the matching; frames it pushes are shown as-is
    let lines = output(sink);
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("SYSTEM: restarted"), "{:?}", lines);
    assert_eq!(lines[1], "raw frame");
}

#[tokio::test]
async fn test_websocket_sends_empty_search() {
    let (base, server) = spawn_ws(vec![r#"{"timestamp": 7, "source": "APP", "message": "hi"}"#]).await;
    let mut transport = WebSocketTransport::new(client(&base));
    let mut sink = ConsoleSink::new(Vec::new());

    transport
        .stream(&options("", StreamBudget::Once), &mut sink)
        .await
        .unwrap();

    let (_, first) = server.await.unwrap();
    assert_eq!(first, Message::Text(String::new()));
    assert_eq!(sink.displayed(), 1);
}

#[tokio::test]
async fn test_websocket_rejected_handshake_is_http_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let _ = tokio_tungstenite::accept_hdr_async(
            stream,
            |_req: &Request, _resp: Response| -> Result<Response, ErrorResponse> {
                let mut denied = ErrorResponse::new(Some("denied".to_string()));
                *denied.status_mut() = tokio_tungstenite::tungstenite::http::StatusCode::UNAUTHORIZED;
                Err(denied)
            },
        )
        .await;
    });

    let mut transport = WebSocketTransport::new(client(&format!("http://{}", addr)));
    let mut sink = ConsoleSink::new(Vec::new());
    let err = transport
        .stream(&options("", StreamBudget::Once), &mut sink)
        .await
        .unwrap_err();

    match err.downcast_ref::<Error>() {
        Some(Error::Http { status, .. }) => assert_eq!(status.as_u16(), 401),
        other => panic!("unexpected error: {other:?}"),
    }
}
