//! Logging trait for chat exchanges.
//!
//! This module provides the [`ExchangeLogger`] trait that allows callers to capture every
//! message a [`ChatSession`](crate::chat::ChatSession) sends and every reply it receives.

use crate::types::{StreamEvent, ThinkResponse};

/// A trait for logging chat exchanges.
///
/// # Example
///
/// ```rust,ignore
/// use atlas_chat::{ExchangeLogger, StreamEvent, ThinkResponse};
/// use std::sync::Mutex;
///
/// struct FileLogger {
///     file: Mutex<std::fs::File>,
/// }
///
/// impl ExchangeLogger for FileLogger {
///     fn log_message(&self, message: &str) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "Sent: {message}").unwrap();
///     }
///
///     fn log_stream_event(&self, event: &StreamEvent) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "Event: {}", serde_json::to_string(event).unwrap()).unwrap();
///     }
///
///     fn log_response(&self, response: &ThinkResponse) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "Reply: {}", serde_json::to_string(response).unwrap()).unwrap();
///     }
/// }
/// ```
pub trait ExchangeLogger: Send + Sync {
    /// Log a user message as it is sent.
    fn log_message(&self, message: &str);

    /// Log an individual streaming event.
    ///
    /// Called for each [`StreamEvent`] received on `/chat-stream`, in arrival order.
    fn log_stream_event(&self, event: &StreamEvent);

    /// Log a complete reply from `/think`.
    fn log_response(&self, response: &ThinkResponse);
}

/// An [`ExchangeLogger`] that forwards everything to `tracing` at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingExchangeLogger;

impl ExchangeLogger for TracingExchangeLogger {
    fn log_message(&self, message: &str) {
        tracing::debug!(target: "atlas_chat::exchange", message, "sent message");
    }

    fn log_stream_event(&self, event: &StreamEvent) {
        match event {
            StreamEvent::Log(line) => {
                tracing::debug!(target: "atlas_chat::exchange", line = line.as_str(), "log event");
            }
            StreamEvent::FinalAnswer(answer) => {
                tracing::debug!(
                    target: "atlas_chat::exchange",
                    answer = answer.as_str(),
                    "final answer"
                );
            }
            StreamEvent::Error(error) => {
                tracing::debug!(
                    target: "atlas_chat::exchange",
                    error = error.as_str(),
                    "error event"
                );
            }
        }
    }

    fn log_response(&self, response: &ThinkResponse) {
        tracing::debug!(
            target: "atlas_chat::exchange",
            answer = response.answer.as_str(),
            log_lines = response.logs.lines().len(),
            "think response"
        );
    }
}
