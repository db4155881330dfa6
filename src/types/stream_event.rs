use serde::{Deserialize, Serialize};

/// One event pushed by the `/chat-stream` endpoint.
///
/// On the wire each event is `{"type": "...", "data": "..."}`.  `Log` events may repeat;
/// `FinalAnswer` and `Error` end the exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum StreamEvent {
    /// A reasoning step for the debug panel.
    Log(String),

    /// The assistant's final answer.
    FinalAnswer(String),

    /// An error reported by the server.
    Error(String),
}

impl StreamEvent {
    /// Returns true if this event ends the exchange.
    pub fn is_terminal(&self) -> bool {
        match self {
            StreamEvent::Log(_) => false,
            StreamEvent::FinalAnswer(_) | StreamEvent::Error(_) => true,
        }
    }

    /// The wire name of this event's type.
    pub fn type_name(&self) -> &'static str {
        match self {
            StreamEvent::Log(_) => "log",
            StreamEvent::FinalAnswer(_) => "final_answer",
            StreamEvent::Error(_) => "error",
        }
    }
}
