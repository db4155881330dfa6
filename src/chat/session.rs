//! Core chat session management.
//!
//! This module provides the [`ChatSession`] struct which owns the conversation thread and
//! drives one exchange at a time against a [`Transport`].
//!
//! A session is a two-state machine:
//!
//! ```text
//!   Idle --submit--> Sending { placeholder } --final_answer | error | drop--> Idle
//!                        |  ^
//!                        +--+ log
//! ```
//!
//! Every way out of `Sending` finalizes the placeholder, releases the stream, and
//! re-enables input.  Submissions while `Sending` are rejected without side effects.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::StreamExt;

use crate::chat::config::{ChatConfig, TransportMode};
use crate::client::AtlasClient;
use crate::error::{Error, ErrorKind, Result};
use crate::exchange_logger::ExchangeLogger;
use crate::markdown::MarkdownMode;
use crate::observability::{
    EXCHANGE_DURATION, EXCHANGES_COMPLETED, EXCHANGES_FAILED, EXCHANGES_REJECTED,
    EXCHANGES_STARTED, STREAM_ERRORS, STREAM_EVENTS, STREAM_TIMEOUTS,
};
use crate::render::ChatView;
use crate::transport::{EventStream, Transport};
use crate::types::{ChatMessage, MessageId, Sender, StreamEvent};

/// Text shown in the assistant bubble while a streamed reply is pending.
pub const PLACEHOLDER_TEXT: &str = "Thinking...";

/// Shown when the stream or connection fails before a final answer.
pub const CONNECTION_LOST_MESSAGE: &str =
    "Connection to the server was lost before an answer arrived. Please try again.";

/// Shown when the server answers with a non-success status.
pub const REQUEST_FAILED_MESSAGE: &str = "Sorry, something went wrong. Please try again.";

/// Shown when a stream goes silent for longer than the configured timeout.
pub const TIMEOUT_MESSAGE: &str = "The server stopped responding. Please try again.";

/// Where the session is in its exchange cycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No exchange in flight; input is enabled.
    #[default]
    Idle,
    /// An exchange is in flight; input is disabled.
    Sending {
        /// The assistant message that will receive the answer.
        placeholder: MessageId,
    },
}

impl SessionState {
    /// Returns true if no exchange is in flight.
    pub fn is_idle(&self) -> bool {
        matches!(self, SessionState::Idle)
    }
}

/// The result of trying to start an exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// The input was empty after trimming; nothing happened.
    Empty,
    /// An exchange is already in flight; nothing happened.
    Busy,
    /// The exchange started and its reply will land in this message.
    Started(MessageId),
}

/// How an exchange ended.
#[derive(Debug, Clone)]
pub enum ExchangeOutcome {
    /// The input was empty after trimming.
    Ignored,
    /// An exchange was already in flight.
    Rejected,
    /// The server answered; the placeholder holds the answer.
    Answered,
    /// The exchange failed; the placeholder holds a user-facing message.
    Failed(Error),
}

impl ExchangeOutcome {
    /// Returns true if the server answered.
    pub fn is_answered(&self) -> bool {
        matches!(self, ExchangeOutcome::Answered)
    }

    /// The failure, if the exchange failed.
    pub fn error(&self) -> Option<&Error> {
        match self {
            ExchangeOutcome::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Aggregated stats for a chat session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStats {
    /// The server the session talks to.
    pub server_url: String,
    /// The transport used for new exchanges.
    pub transport: TransportMode,
    /// The markdown converter for new messages.
    pub markdown: MarkdownMode,
    /// The per-event stream timeout, if any.
    pub stream_timeout: Option<Duration>,
    /// The number of messages in the conversation.
    pub message_count: usize,
    /// Exchanges started.
    pub exchanges: u64,
    /// Exchanges that ended in a failure.
    pub failed_exchanges: u64,
    /// Stream events received.
    pub stream_events: u64,
}

/// A chat session that manages the conversation thread and server exchanges.
pub struct ChatSession<T: Transport = AtlasClient> {
    transport: T,
    config: ChatConfig,
    messages: Vec<ChatMessage>,
    state: SessionState,
    exchange_started: Option<Instant>,
    exchanges: u64,
    failed_exchanges: u64,
    stream_events: u64,
    logger: Option<Arc<dyn ExchangeLogger>>,
}

impl ChatSession<AtlasClient> {
    /// Creates a new chat session talking HTTP to `config.server_url`.
    pub fn new(config: ChatConfig) -> Result<Self> {
        let client =
            AtlasClient::with_options(&config.server_url, Some(config.request_timeout))?;
        Ok(Self::with_transport(client, config))
    }
}

impl<T: Transport> ChatSession<T> {
    /// Creates a new chat session over a custom transport.
    pub fn with_transport(transport: T, config: ChatConfig) -> Self {
        Self {
            transport,
            config,
            messages: Vec::new(),
            state: SessionState::Idle,
            exchange_started: None,
            exchanges: 0,
            failed_exchanges: 0,
            stream_events: 0,
            logger: None,
        }
    }

    /// Attaches a logger that sees every message and reply.
    pub fn with_logger(mut self, logger: Arc<dyn ExchangeLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// The current exchange state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Returns true if no exchange is in flight.
    pub fn is_idle(&self) -> bool {
        self.state.is_idle()
    }

    /// The conversation thread, oldest first.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// The active configuration.
    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// The transport this session sends through.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Switches the transport used for subsequent exchanges.
    pub fn set_transport_mode(&mut self, mode: TransportMode) {
        self.config.transport = mode;
    }

    /// Records the markdown converter; views are updated by the caller.
    pub fn set_markdown(&mut self, markdown: MarkdownMode) {
        self.config.markdown = markdown;
    }

    /// Sets or clears the per-event stream timeout.
    pub fn set_stream_timeout(&mut self, timeout: Option<Duration>) {
        self.config.stream_timeout = timeout;
    }

    /// Clears the conversation.  Refused while an exchange is in flight.
    pub fn clear(&mut self, view: &mut impl ChatView) -> bool {
        if !self.is_idle() {
            return false;
        }
        self.messages.clear();
        view.clear();
        true
    }

    /// Returns current session stats.
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            server_url: self.config.server_url.clone(),
            transport: self.config.transport,
            markdown: self.config.markdown,
            stream_timeout: self.config.stream_timeout,
            message_count: self.messages.len(),
            exchanges: self.exchanges,
            failed_exchanges: self.failed_exchanges,
            stream_events: self.stream_events,
        }
    }

    /// Sends `input` with the configured transport and drives the exchange to its end.
    pub async fn send(&mut self, input: &str, view: &mut impl ChatView) -> ExchangeOutcome {
        match self.config.transport {
            TransportMode::Streaming => self.send_streaming(input, view).await,
            TransportMode::RequestResponse => self.send_request(input, view).await,
        }
    }

    /// Sends `input` over `/chat-stream`, applying events until the exchange ends.
    pub async fn send_streaming(
        &mut self,
        input: &str,
        view: &mut impl ChatView,
    ) -> ExchangeOutcome {
        let message = input.trim();
        match self.begin(message, TransportMode::Streaming, view) {
            Submission::Empty => return ExchangeOutcome::Ignored,
            Submission::Busy => return ExchangeOutcome::Rejected,
            Submission::Started(_) => {}
        }

        let stream = match self.transport.open_stream(message).await {
            Ok(stream) => stream,
            Err(err) => return self.fail(err, view),
        };
        // The stream is dropped, closing the connection, on every return below.
        self.drive(stream, view).await
    }

    /// Sends `input` over `POST /think` and renders the complete reply.
    pub async fn send_request(&mut self, input: &str, view: &mut impl ChatView) -> ExchangeOutcome {
        let message = input.trim();
        match self.begin(message, TransportMode::RequestResponse, view) {
            Submission::Empty => return ExchangeOutcome::Ignored,
            Submission::Busy => return ExchangeOutcome::Rejected,
            Submission::Started(_) => {}
        }

        match self.transport.think(message).await {
            Ok(response) => {
                if let Some(logger) = &self.logger {
                    logger.log_response(&response);
                }
                view.replace_log(&response.logs);
                self.complete(&response.answer, view)
            }
            Err(err) => self.fail(err, view),
        }
    }

    /// Starts an exchange: records and renders the user message, clears the debug log,
    /// renders the placeholder (streaming only), and disables input.
    ///
    /// Nothing happens for empty input or while another exchange is in flight.
    pub fn begin(
        &mut self,
        input: &str,
        mode: TransportMode,
        view: &mut impl ChatView,
    ) -> Submission {
        let message = input.trim();
        if message.is_empty() {
            return Submission::Empty;
        }
        if !self.is_idle() {
            EXCHANGES_REJECTED.click();
            tracing::warn!("submission rejected: an exchange is already in flight");
            return Submission::Busy;
        }

        self.exchanges += 1;
        let placeholder = MessageId::assistant_reply(self.exchanges);
        EXCHANGES_STARTED.click();
        tracing::info!(exchange = self.exchanges, transport = %mode, "exchange started");
        if let Some(logger) = &self.logger {
            logger.log_message(message);
        }

        self.messages.push(ChatMessage::user(message));
        view.render(Sender::User, message, None);
        view.reset_log();
        if mode == TransportMode::Streaming {
            self.messages
                .push(ChatMessage::assistant(placeholder.clone(), PLACEHOLDER_TEXT));
            view.render(Sender::Assistant, PLACEHOLDER_TEXT, Some(&placeholder));
        }
        view.set_input_enabled(false);

        self.state = SessionState::Sending {
            placeholder: placeholder.clone(),
        };
        self.exchange_started = Some(Instant::now());
        Submission::Started(placeholder)
    }

    /// Applies one server event to the in-flight exchange.
    ///
    /// Returns `None` while the exchange continues and `Some` once it has ended.  Events
    /// that arrive while idle are ignored.
    pub fn apply(
        &mut self,
        event: StreamEvent,
        view: &mut impl ChatView,
    ) -> Option<ExchangeOutcome> {
        if self.is_idle() {
            tracing::debug!(event = event.type_name(), "ignoring event while idle");
            return None;
        }
        STREAM_EVENTS.click();
        self.stream_events += 1;
        if let Some(logger) = &self.logger {
            logger.log_stream_event(&event);
        }

        match event {
            StreamEvent::Log(line) => {
                view.append_log(&line);
                None
            }
            StreamEvent::FinalAnswer(answer) => Some(self.complete(&answer, view)),
            StreamEvent::Error(message) => Some(self.fail(Error::application(message), view)),
        }
    }

    /// Ends the in-flight exchange with `err`.
    pub fn abort(&mut self, err: Error, view: &mut impl ChatView) -> ExchangeOutcome {
        if self.is_idle() {
            return ExchangeOutcome::Failed(err);
        }
        self.fail(err, view)
    }

    async fn drive(&mut self, mut stream: EventStream, view: &mut impl ChatView) -> ExchangeOutcome {
        loop {
            let next = match self.config.stream_timeout {
                Some(limit) => match tokio::time::timeout(limit, stream.next()).await {
                    Ok(next) => next,
                    Err(_) => {
                        STREAM_TIMEOUTS.click();
                        let err = Error::timeout(
                            format!("no event from the server in {}s", limit.as_secs()),
                            Some(limit.as_secs_f64()),
                        );
                        return self.fail(err, view);
                    }
                },
                None => stream.next().await,
            };

            match next {
                Some(Ok(event)) => {
                    let terminal = event.is_terminal();
                    match self.apply(event, view) {
                        Some(outcome) => return outcome,
                        None => debug_assert!(!terminal, "terminal event left the exchange open"),
                    }
                }
                // A garbled event is skipped; the connection itself is still good.
                Some(Err(err @ Error::Serialization { .. })) => {
                    STREAM_ERRORS.click();
                    tracing::warn!(error = %err, "skipping malformed event");
                    view.append_log(&format!("[skipped malformed event] {err}"));
                }
                Some(Err(err)) => {
                    STREAM_ERRORS.click();
                    return self.fail(err, view);
                }
                None => {
                    STREAM_ERRORS.click();
                    let err = Error::connection("stream closed before a final answer", None);
                    return self.fail(err, view);
                }
            }
        }
    }

    fn complete(&mut self, answer: &str, view: &mut impl ChatView) -> ExchangeOutcome {
        EXCHANGES_COMPLETED.click();
        self.finalize(answer, view);
        ExchangeOutcome::Answered
    }

    fn fail(&mut self, err: Error, view: &mut impl ChatView) -> ExchangeOutcome {
        EXCHANGES_FAILED.click();
        self.failed_exchanges += 1;
        tracing::warn!(error = %err, kind = ?err.kind(), "exchange failed");
        view.append_log(&format!("[error] {err}"));
        self.finalize(&user_message(&err), view);
        ExchangeOutcome::Failed(err)
    }

    fn finalize(&mut self, text: &str, view: &mut impl ChatView) {
        let SessionState::Sending { placeholder } = std::mem::take(&mut self.state) else {
            return;
        };
        let existing = self
            .messages
            .iter()
            .position(|message| message.id.as_ref() == Some(&placeholder));
        match existing {
            Some(index) => self.messages[index].finalize(text),
            None => self
                .messages
                .push(ChatMessage::assistant(placeholder.clone(), text)),
        }
        view.render(Sender::Assistant, text, Some(&placeholder));
        view.set_input_enabled(true);

        if let Some(started) = self.exchange_started.take() {
            EXCHANGE_DURATION.add(started.elapsed().as_secs_f64());
        }
        tracing::info!(exchange = self.exchanges, "exchange finished");
    }
}

/// The text shown in the assistant bubble when an exchange fails with `err`.
pub fn user_message(err: &Error) -> String {
    match (err.kind(), err) {
        (ErrorKind::Application, Error::Application { message }) => message.clone(),
        (ErrorKind::Application, _) => REQUEST_FAILED_MESSAGE.to_string(),
        (ErrorKind::Status, _) => REQUEST_FAILED_MESSAGE.to_string(),
        (ErrorKind::Transport, Error::Timeout { .. }) => TIMEOUT_MESSAGE.to_string(),
        (ErrorKind::Transport, _) => CONNECTION_LOST_MESSAGE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use futures::stream;

    use super::*;
    use crate::render::HtmlView;
    use crate::types::{Logs, ThinkResponse};

    /// What the fake server does for every exchange.
    #[derive(Clone)]
    enum Script {
        Events(Vec<Result<StreamEvent>>),
        Stall,
        Refuse(Error),
        Reply(Result<ThinkResponse>),
    }

    struct FakeTransport {
        script: Script,
        received: Mutex<Vec<String>>,
    }

    impl FakeTransport {
        fn new(script: Script) -> Self {
            Self {
                script,
                received: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl Transport for FakeTransport {
        async fn think(&self, message: &str) -> Result<ThinkResponse> {
            self.received.lock().unwrap().push(message.to_string());
            match &self.script {
                Script::Reply(reply) => reply.clone(),
                Script::Refuse(err) => Err(err.clone()),
                _ => Err(Error::connection("no think endpoint", None)),
            }
        }

        async fn open_stream(&self, message: &str) -> Result<EventStream> {
            self.received.lock().unwrap().push(message.to_string());
            match &self.script {
                Script::Events(events) => Ok(Box::pin(stream::iter(events.clone()))),
                Script::Stall => Ok(Box::pin(stream::pending())),
                Script::Refuse(err) => Err(err.clone()),
                Script::Reply(_) => Err(Error::connection("no stream endpoint", None)),
            }
        }
    }

    fn log(line: &str) -> Result<StreamEvent> {
        Ok(StreamEvent::Log(line.to_string()))
    }

    fn answer(text: &str) -> Result<StreamEvent> {
        Ok(StreamEvent::FinalAnswer(text.to_string()))
    }

    fn session(script: Script) -> ChatSession<FakeTransport> {
        ChatSession::with_transport(FakeTransport::new(script), ChatConfig::new())
    }

    fn reply_text(view: &HtmlView, exchange: u64) -> String {
        view.messages()
            .find(&MessageId::assistant_reply(exchange))
            .map(|bubble| bubble.text.clone())
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn streamed_exchange_finalizes_placeholder() {
        let mut session = session(Script::Events(vec![
            log("step 1"),
            log("step 2"),
            answer("42"),
        ]));
        let mut view = HtmlView::default();

        let outcome = session.send("  What is 6*7?  ", &mut view).await;

        assert!(outcome.is_answered());
        assert_eq!(
            *session.transport().received.lock().unwrap(),
            ["What is 6*7?"]
        );
        assert_eq!(view.messages().len(), 2);
        assert_eq!(view.messages().bubbles()[0].text, "What is 6*7?");
        assert_eq!(reply_text(&view, 1), "42");
        assert_eq!(view.debug_log().lines(), ["step 1", "step 2"]);
        assert!(view.input_enabled());
        assert!(session.is_idle());
        assert_eq!(session.messages()[1].text, "42");
        assert_eq!(session.stats().stream_events, 3);
    }

    #[tokio::test]
    async fn empty_input_is_ignored() {
        let mut session = session(Script::Events(vec![answer("unused")]));
        let mut view = HtmlView::default();

        let outcome = session.send(" \n\t ", &mut view).await;

        assert!(matches!(outcome, ExchangeOutcome::Ignored));
        assert!(view.messages().is_empty());
        assert!(view.input_enabled());
        assert!(session.is_idle());
        assert!(session.transport().received.lock().unwrap().is_empty());
        assert_eq!(session.stats().exchanges, 0);
    }

    #[test]
    fn second_submission_while_sending_is_rejected() {
        let mut session = session(Script::Stall);
        let mut view = HtmlView::default();

        let first = session.begin("one", TransportMode::Streaming, &mut view);
        let second = session.begin("two", TransportMode::Streaming, &mut view);

        assert_eq!(first, Submission::Started(MessageId::assistant_reply(1)));
        assert_eq!(second, Submission::Busy);
        assert_eq!(view.messages().count(Sender::User), 1);
        assert_eq!(view.messages().count(Sender::Assistant), 1);
        assert_eq!(session.messages().len(), 2);
        assert!(!view.input_enabled());
    }

    #[test]
    fn log_events_are_self_loops() {
        let mut session = session(Script::Stall);
        let mut view = HtmlView::default();
        session.begin("q", TransportMode::Streaming, &mut view);

        for line in ["a", "b", "c"] {
            let step = session.apply(StreamEvent::Log(line.to_string()), &mut view);
            assert!(step.is_none());
        }

        assert!(!session.is_idle());
        assert_eq!(view.debug_log().lines(), ["a", "b", "c"]);
        assert!(view.debug_log().is_scrolled_to_end());
        assert_eq!(reply_text(&view, 1), PLACEHOLDER_TEXT);
    }

    #[test]
    fn error_event_finalizes_with_server_message() {
        let mut session = session(Script::Stall);
        let mut view = HtmlView::default();
        session.begin("q", TransportMode::Streaming, &mut view);

        let outcome = session
            .apply(StreamEvent::Error("tool crashed".to_string()), &mut view)
            .unwrap();

        assert_eq!(outcome.error().map(Error::kind), Some(ErrorKind::Application));
        assert_eq!(reply_text(&view, 1), "tool crashed");
        assert!(view.input_enabled());
        assert!(session.is_idle());
        let last = view.debug_log().lines().last().unwrap();
        assert!(last.starts_with("[error]"));
    }

    #[test]
    fn events_after_completion_are_ignored() {
        let mut session = session(Script::Stall);
        let mut view = HtmlView::default();
        session.begin("q", TransportMode::Streaming, &mut view);
        session.apply(StreamEvent::FinalAnswer("done".to_string()), &mut view);

        let late = session.apply(StreamEvent::FinalAnswer("late".to_string()), &mut view);

        assert!(late.is_none());
        assert_eq!(reply_text(&view, 1), "done");
    }

    #[tokio::test]
    async fn dropped_stream_is_treated_as_error() {
        let mut session = session(Script::Events(vec![
            log("working"),
            Err(Error::streaming("connection reset", None)),
            answer("never seen"),
        ]));
        let mut view = HtmlView::default();

        let outcome = session.send("q", &mut view).await;

        assert!(outcome.error().is_some_and(Error::is_transport));
        assert_eq!(reply_text(&view, 1), CONNECTION_LOST_MESSAGE);
        assert!(view.input_enabled());
        assert!(session.is_idle());
        assert_eq!(session.stats().failed_exchanges, 1);
    }

    #[tokio::test]
    async fn stream_ending_without_answer_is_treated_as_error() {
        let mut session = session(Script::Events(vec![log("working")]));
        let mut view = HtmlView::default();

        let outcome = session.send("q", &mut view).await;

        assert!(outcome.error().is_some_and(Error::is_connection));
        assert_eq!(reply_text(&view, 1), CONNECTION_LOST_MESSAGE);
        assert!(view.input_enabled());
    }

    #[tokio::test]
    async fn malformed_event_is_skipped() {
        let bad = serde_json::from_str::<StreamEvent>("{").unwrap_err();
        let mut session = session(Script::Events(vec![
            Err(Error::serialization("bad event", Some(Box::new(bad)))),
            answer("fine"),
        ]));
        let mut view = HtmlView::default();

        let outcome = session.send("q", &mut view).await;

        assert!(outcome.is_answered());
        assert_eq!(reply_text(&view, 1), "fine");
    }

    #[tokio::test]
    async fn refused_stream_is_treated_as_error() {
        let mut session = session(Script::Refuse(Error::connection("refused", None)));
        let mut view = HtmlView::default();

        let outcome = session.send("q", &mut view).await;

        assert!(outcome.error().is_some());
        assert_eq!(reply_text(&view, 1), CONNECTION_LOST_MESSAGE);
        assert!(view.input_enabled());
    }

    #[tokio::test(start_paused = true)]
    async fn silent_stream_times_out() {
        let config = ChatConfig::new().with_stream_timeout(Some(Duration::from_secs(5)));
        let mut session = ChatSession::with_transport(FakeTransport::new(Script::Stall), config);
        let mut view = HtmlView::default();

        let outcome = session.send("q", &mut view).await;

        assert!(outcome.error().is_some_and(Error::is_timeout));
        assert_eq!(reply_text(&view, 1), TIMEOUT_MESSAGE);
        assert!(view.input_enabled());
        assert!(session.is_idle());
    }

    #[tokio::test]
    async fn request_mode_renders_answer_and_logs() {
        let reply = ThinkResponse::new("Paris", Logs::Text("lookup\nanswer".to_string()));
        let config = ChatConfig::new().with_transport(TransportMode::RequestResponse);
        let mut session =
            ChatSession::with_transport(FakeTransport::new(Script::Reply(Ok(reply))), config);
        let mut view = HtmlView::default();

        let outcome = session.send("Capital of France?", &mut view).await;

        assert!(outcome.is_answered());
        assert_eq!(view.messages().len(), 2);
        assert_eq!(reply_text(&view, 1), "Paris");
        assert_eq!(view.debug_log().lines(), ["lookup", "answer"]);
        assert!(view.input_enabled());
    }

    #[tokio::test]
    async fn request_mode_failure_shows_generic_message() {
        let config = ChatConfig::new().with_transport(TransportMode::RequestResponse);
        let script = Script::Reply(Err(Error::internal_server("boom")));
        let mut session = ChatSession::with_transport(FakeTransport::new(script), config);
        let mut view = HtmlView::default();

        let outcome = session.send("q", &mut view).await;

        assert_eq!(outcome.error().and_then(Error::status_code), Some(500));
        assert_eq!(reply_text(&view, 1), REQUEST_FAILED_MESSAGE);
        assert!(view.debug_log().lines()[0].contains("boom"));
        assert!(view.input_enabled());
    }

    #[tokio::test]
    async fn consecutive_exchanges_get_distinct_placeholders() {
        let mut session = session(Script::Events(vec![answer("ok")]));
        let mut view = HtmlView::default();

        session.send("one", &mut view).await;
        session.send("two", &mut view).await;

        assert_eq!(view.messages().len(), 4);
        assert_eq!(reply_text(&view, 1), "ok");
        assert_eq!(reply_text(&view, 2), "ok");
        assert_eq!(session.stats().exchanges, 2);
    }

    #[tokio::test]
    async fn debug_log_is_reset_for_each_streamed_exchange() {
        let mut session = session(Script::Events(vec![log("a"), answer("first")]));
        let mut view = HtmlView::default();

        assert!(session.send("one", &mut view).await.is_answered());
        assert_eq!(view.debug_log().lines(), ["a"]);

        session.transport = FakeTransport::new(Script::Events(vec![log("b"), answer("second")]));
        assert!(session.send("two", &mut view).await.is_answered());

        assert_eq!(view.debug_log().lines(), ["b"]);
        assert_eq!(reply_text(&view, 1), "first");
        assert_eq!(reply_text(&view, 2), "second");
    }

    #[tokio::test]
    async fn debug_log_is_reset_for_each_request_exchange() {
        let reply = ThinkResponse::new("ok", Logs::Text("lookup\nanswer".to_string()));
        let config = ChatConfig::new().with_transport(TransportMode::RequestResponse);
        let mut session =
            ChatSession::with_transport(FakeTransport::new(Script::Reply(Ok(reply))), config);
        let mut view = HtmlView::default();

        assert!(session.send("one", &mut view).await.is_answered());
        assert_eq!(view.debug_log().lines(), ["lookup", "answer"]);

        session.transport = FakeTransport::new(Script::Reply(Err(Error::api(503, "busy"))));
        let outcome = session.send("two", &mut view).await;

        assert!(outcome.error().is_some());
        assert_eq!(view.debug_log().len(), 1);
        assert!(view.debug_log().lines()[0].starts_with("[error]"));
        assert!(view.debug_log().lines()[0].contains("busy"));
    }

    #[test]
    fn clear_is_refused_while_sending() {
        let mut session = session(Script::Stall);
        let mut view = HtmlView::default();
        session.begin("q", TransportMode::Streaming, &mut view);

        assert!(!session.clear(&mut view));
        assert_eq!(session.messages().len(), 2);

        session.abort(Error::connection("gone", None), &mut view);
        assert!(session.clear(&mut view));
        assert!(session.messages().is_empty());
        assert!(view.messages().is_empty());
    }

    #[test]
    fn abort_finalizes_like_a_lost_connection() {
        let mut session = session(Script::Stall);
        let mut view = HtmlView::default();
        session.begin("q", TransportMode::Streaming, &mut view);
        assert!(!view.input_enabled());

        let outcome = session.abort(Error::streaming("interrupted by user", None), &mut view);

        assert!(outcome.error().is_some());
        assert_eq!(reply_text(&view, 1), CONNECTION_LOST_MESSAGE);
        assert!(view.debug_log().lines()[0].starts_with("[error]"));
        assert!(view.input_enabled());
        assert!(session.is_idle());
    }

    #[test]
    fn user_messages_by_kind() {
        assert_eq!(user_message(&Error::application("nope")), "nope");
        assert_eq!(user_message(&Error::api(503, "busy")), REQUEST_FAILED_MESSAGE);
        assert_eq!(user_message(&Error::timeout("slow", None)), TIMEOUT_MESSAGE);
        assert_eq!(
            user_message(&Error::connection("refused", None)),
            CONNECTION_LOST_MESSAGE
        );
    }
}
