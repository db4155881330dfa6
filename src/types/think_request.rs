use serde::{Deserialize, Serialize};

/// Body of a `POST /think` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThinkRequest {
    /// The user's message, already trimmed.
    pub message: String,
}

impl ThinkRequest {
    /// Create a new `ThinkRequest`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
