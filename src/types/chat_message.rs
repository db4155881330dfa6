use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::Sender;

/// Stable identifier of a rendered message, used to update it in place.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    /// The identifier of the assistant reply for the `exchange`-th exchange.
    pub fn assistant_reply(exchange: u64) -> Self {
        Self(format!("assistant-{exchange}"))
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single message in the conversation thread.
///
/// Messages are never deleted during an exchange.  Only the assistant's placeholder is
/// mutated, and only through [`ChatMessage::finalize`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who wrote the message.
    pub sender: Sender,
    /// Raw (markdown) text of the message.
    pub text: String,
    /// Identifier for in-place updates, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<MessageId>,
}

impl ChatMessage {
    /// Create a message from the user.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
            id: None,
        }
    }

    /// Create an assistant message that can later be updated through `id`.
    pub fn assistant(id: MessageId, text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Assistant,
            text: text.into(),
            id: Some(id),
        }
    }

    /// Replace the text of this message with its final content.
    pub fn finalize(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }
}
