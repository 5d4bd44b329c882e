//! Log tailing for deployed apps.
//!
//! Three interchangeable transports implement `LogTransport`:
//!
//! - `BatchTransport`: polls `/logz/batch`, de-duplicating with a timestamp cursor
//! - `SseTransport`: reads `data:` frames from the `/logz/stream` event stream
//! - `WebSocketTransport`: sends the search string, then reads pushed frames
//!
//! All of them render records identically through a `LogSink`.

pub mod batch;
pub mod cursor;
pub mod format;
pub mod payload;
pub mod session;
pub mod sink;
pub mod sse;
pub mod transport;
pub mod websocket;

pub use batch::BatchTransport;
pub use cursor::{filter_records, matches_search, LogCursor};
pub use format::{format_record, source_label};
pub use session::{run_session, SessionSummary};
pub use sink::{ConsoleSink, LogSink};
pub use sse::{SseDecoder, SseTransport};
pub use transport::{LogTransport, SessionEnd, StreamBudget, StreamOptions, TransportKind};
pub use websocket::{websocket_url, WebSocketTransport};
