//! Network Layer
//!
//! Protocol messages, the commit/reveal adapter, and the transports that
//! feed it. Transports never touch the store directly; everything goes
//! through [`CommitRevealAdapter`].

pub mod adapter;
pub mod http;
pub mod protocol;
pub mod stdio;
pub mod transport;
pub mod ws;

pub use adapter::{log_startup, AdapterConfig, CommitRevealAdapter, RevealPolicy};
pub use http::{router, serve_http, HttpConfig};
pub use protocol::{
    BotRequest, BotResponse, CommitRequest, CommitResponse, ErrorCode, ErrorResponse,
    ProtocolError, RevealRequest, RevealResponse,
};
pub use stdio::{run_line_stream, run_stdio, StreamStats};
pub use transport::{shutdown_signal, TransportError};
pub use ws::run_websocket;
