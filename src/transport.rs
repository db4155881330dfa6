//! The seam between a chat session and the Atlas server.
//!
//! [`AtlasClient`](crate::AtlasClient) is the HTTP implementation.  Tests and embedders
//! substitute their own by implementing [`Transport`].

use std::pin::Pin;

use futures::Stream;

use crate::{Result, StreamEvent, ThinkResponse};

/// A stream of parsed server events for one exchange.
///
/// Dropping the stream closes the underlying connection.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>>;

/// How a chat session reaches the server.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Send `message` as a single request and wait for the complete reply.
    async fn think(&self, message: &str) -> Result<ThinkResponse>;

    /// Open an event stream scoped to `message`.
    ///
    /// Errors returned here mean the stream never opened; errors yielded by the stream
    /// mean it broke part-way.
    async fn open_stream(&self, message: &str) -> Result<EventStream>;
}
