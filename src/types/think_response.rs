use serde::{Deserialize, Serialize};

use crate::types::Logs;

/// A successful reply from `POST /think`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThinkResponse {
    /// The assistant's answer, as markdown.
    pub answer: String,

    /// Reasoning steps taken to produce the answer.
    #[serde(default)]
    pub logs: Logs,
}

impl ThinkResponse {
    /// Create a new `ThinkResponse`.
    pub fn new(answer: impl Into<String>, logs: impl Into<Logs>) -> Self {
        Self {
            answer: answer.into(),
            logs: logs.into(),
        }
    }
}
