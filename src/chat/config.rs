//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg` and configuration
//! structures for controlling chat behavior.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use arrrg_derive::CommandLine;

use crate::client::DEFAULT_SERVER_URL;
use crate::error::Error;
use crate::markdown::MarkdownMode;

/// Default time allowed for a whole `/think` round trip.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// How replies are fetched from the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportMode {
    /// `GET /chat-stream`: log events arrive as the server reasons.
    #[default]
    Streaming,
    /// `POST /think`: one JSON reply with the answer and the full log.
    RequestResponse,
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportMode::Streaming => write!(f, "stream"),
            TransportMode::RequestResponse => write!(f, "request"),
        }
    }
}

impl FromStr for TransportMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stream" | "streaming" => Ok(TransportMode::Streaming),
            "request" | "request-response" => Ok(TransportMode::RequestResponse),
            other => Err(Error::validation(
                format!("unknown transport '{other}', expected stream or request"),
                Some("transport".to_string()),
            )),
        }
    }
}

/// Command-line arguments for the atlas-chat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Base URL of the Atlas server.
    #[arrrg(optional, "Server URL (default: http://127.0.0.1:5001/)", "URL")]
    pub server: Option<String>,

    /// Transport to use.
    #[arrrg(optional, "Transport: stream or request (default: stream)", "MODE")]
    pub transport: Option<String>,

    /// Markdown converter to use.
    #[arrrg(optional, "Markdown converter: basic or full (default: full)", "MODE")]
    pub markdown: Option<String>,

    /// Seconds to wait for each streamed event.
    #[arrrg(optional, "Give up on a silent stream after SECONDS (default: never)", "SECONDS")]
    pub stream_timeout: Option<u64>,

    /// Seconds to wait for a `/think` reply.
    #[arrrg(optional, "Give up on a request after SECONDS (default: 120)", "SECONDS")]
    pub request_timeout: Option<u64>,

    /// Where to write the conversation as HTML on exit.
    #[arrrg(optional, "Write the conversation as an HTML page on exit", "PATH")]
    pub html: Option<String>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,
}

/// Configuration for a chat session.
///
/// This struct holds the resolved configuration values after processing
/// command-line arguments with appropriate defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatConfig {
    /// Base URL of the Atlas server.
    pub server_url: String,

    /// Transport used for new exchanges.
    pub transport: TransportMode,

    /// Markdown converter for message bubbles.
    pub markdown: MarkdownMode,

    /// Longest wait for the next streamed event; `None` waits forever.
    pub stream_timeout: Option<Duration>,

    /// Longest wait for a `/think` reply.
    pub request_timeout: Duration,

    /// Where to write the HTML transcript on exit.
    pub html_path: Option<PathBuf>,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Server: http://127.0.0.1:5001/
    /// - Transport: streaming
    /// - Markdown: full
    /// - Stream timeout: none
    /// - Request timeout: 120 seconds
    /// - Color: enabled
    pub fn new() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            transport: TransportMode::default(),
            markdown: MarkdownMode::default(),
            stream_timeout: None,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            html_path: None,
            use_color: true,
        }
    }

    /// Sets the server URL.
    pub fn with_server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = url.into();
        self
    }

    /// Sets the transport.
    pub fn with_transport(mut self, transport: TransportMode) -> Self {
        self.transport = transport;
        self
    }

    /// Sets the markdown converter.
    pub fn with_markdown(mut self, markdown: MarkdownMode) -> Self {
        self.markdown = markdown;
        self
    }

    /// Sets the per-event stream timeout.
    pub fn with_stream_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.stream_timeout = timeout;
        self
    }

    /// Sets the request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the HTML transcript path.
    pub fn with_html_path(mut self, path: Option<PathBuf>) -> Self {
        self.html_path = path;
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl TryFrom<ChatArgs> for ChatConfig {
    type Error = Error;

    fn try_from(args: ChatArgs) -> Result<Self, Self::Error> {
        let transport = args
            .transport
            .as_deref()
            .map(str::parse::<TransportMode>)
            .transpose()?
            .unwrap_or_default();
        let markdown = args
            .markdown
            .as_deref()
            .map(str::parse::<MarkdownMode>)
            .transpose()?
            .unwrap_or_default();
        let request_timeout = match args.request_timeout {
            Some(0) => {
                return Err(Error::validation(
                    "request timeout must be at least one second",
                    Some("request-timeout".to_string()),
                ));
            }
            Some(secs) => Duration::from_secs(secs),
            None => Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        };

        Ok(ChatConfig {
            server_url: args
                .server
                .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string()),
            transport,
            markdown,
            // Zero means no limit
            stream_timeout: args
                .stream_timeout
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
            request_timeout,
            html_path: args.html.map(PathBuf::from),
            use_color: !args.no_color,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ChatConfig::new();
        assert_eq!(config.server_url, "http://127.0.0.1:5001/");
        assert_eq!(config.transport, TransportMode::Streaming);
        assert_eq!(config.markdown, MarkdownMode::Full);
        assert!(config.stream_timeout.is_none());
        assert_eq!(config.request_timeout, Duration::from_secs(120));
        assert!(config.html_path.is_none());
        assert!(config.use_color);
    }

    #[test]
    fn config_from_args_defaults() {
        let config = ChatConfig::try_from(ChatArgs::default()).unwrap();
        assert_eq!(config, ChatConfig::new());
    }

    #[test]
    fn config_from_args_custom() {
        let args = ChatArgs {
            server: Some("http://atlas.local:8080/".to_string()),
            transport: Some("request".to_string()),
            markdown: Some("basic".to_string()),
            stream_timeout: Some(30),
            request_timeout: Some(10),
            html: Some("chat.html".to_string()),
            no_color: true,
        };
        let config = ChatConfig::try_from(args).unwrap();
        assert_eq!(config.server_url, "http://atlas.local:8080/");
        assert_eq!(config.transport, TransportMode::RequestResponse);
        assert_eq!(config.markdown, MarkdownMode::Basic);
        assert_eq!(config.stream_timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.html_path, Some(PathBuf::from("chat.html")));
        assert!(!config.use_color);
    }

    #[test]
    fn zero_stream_timeout_disables() {
        let args = ChatArgs {
            stream_timeout: Some(0),
            ..ChatArgs::default()
        };
        let config = ChatConfig::try_from(args).unwrap();
        assert!(config.stream_timeout.is_none());
    }

    #[test]
    fn config_from_args_rejects_bad_values() {
        let args = ChatArgs {
            transport: Some("carrier-pigeon".to_string()),
            ..ChatArgs::default()
        };
        assert!(ChatConfig::try_from(args).unwrap_err().is_validation());

        let args = ChatArgs {
            request_timeout: Some(0),
            ..ChatArgs::default()
        };
        assert!(ChatConfig::try_from(args).unwrap_err().is_validation());
    }

    #[test]
    fn config_builder_pattern() {
        let config = ChatConfig::new()
            .with_server_url("http://localhost:9000/")
            .with_transport(TransportMode::RequestResponse)
            .with_markdown(MarkdownMode::Basic)
            .with_stream_timeout(Some(Duration::from_secs(5)))
            .with_request_timeout(Duration::from_secs(7))
            .with_html_path(Some(PathBuf::from("out.html")))
            .without_color();

        assert_eq!(config.server_url, "http://localhost:9000/");
        assert_eq!(config.transport, TransportMode::RequestResponse);
        assert_eq!(config.markdown, MarkdownMode::Basic);
        assert_eq!(config.stream_timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.request_timeout, Duration::from_secs(7));
        assert_eq!(config.html_path, Some(PathBuf::from("out.html")));
        assert!(!config.use_color);
    }

    #[test]
    fn transport_mode_parsing() {
        assert_eq!(
            "streaming".parse::<TransportMode>().unwrap(),
            TransportMode::Streaming
        );
        assert_eq!(
            "Request".parse::<TransportMode>().unwrap(),
            TransportMode::RequestResponse
        );
        assert_eq!(TransportMode::RequestResponse.to_string(), "request");
    }
}
