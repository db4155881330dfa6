//! A client for Atlas, a reasoning server that answers chat messages while streaming the
//! steps it takes along the way.
//!
//! The crate is layered bottom-up:
//!
//! - [`types`]: the wire format of `POST /think` and `GET /chat-stream`
//! - [`client`]: [`AtlasClient`], the HTTP [`Transport`]
//! - [`sse`]: the server-sent events decoder
//! - [`markdown`], [`debug_log`], [`render`]: turning a conversation into safe HTML
//! - [`chat`]: the session state machine and the REPL pieces

// Public modules
pub mod chat;
pub mod client;
pub mod debug_log;
pub mod error;
pub mod exchange_logger;
pub mod markdown;
pub mod render;
pub mod sse;
pub mod transport;
pub mod types;

mod observability;

// Re-exports
pub use client::{AtlasClient, DEFAULT_SERVER_URL};
pub use debug_log::DebugLog;
pub use error::{Error, ErrorKind, Result};
pub use exchange_logger::{ExchangeLogger, TracingExchangeLogger};
pub use markdown::MarkdownMode;
pub use observability::register_biometrics;
pub use render::{Bubble, ChatView, HtmlView, MessageList};
pub use transport::{EventStream, Transport};
pub use types::*;
