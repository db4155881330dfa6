use serde::{Deserialize, Serialize};

/// Reasoning log returned by `POST /think`.
///
/// The server sends either a list of lines or a single block of text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Logs {
    /// One entry per reasoning step.
    Lines(Vec<String>),
    /// A single block of text; each line becomes one panel entry.
    Text(String),
}

impl Logs {
    /// The log as panel lines.
    pub fn lines(&self) -> Vec<String> {
        match self {
            Logs::Lines(lines) => lines.clone(),
            Logs::Text(text) => text.lines().map(String::from).collect(),
        }
    }

    /// Returns true if there is nothing to show.
    pub fn is_empty(&self) -> bool {
        match self {
            Logs::Lines(lines) => lines.is_empty(),
            Logs::Text(text) => text.trim().is_empty(),
        }
    }
}

impl Default for Logs {
    fn default() -> Self {
        Logs::Lines(Vec::new())
    }
}

impl From<Vec<String>> for Logs {
    fn from(lines: Vec<String>) -> Self {
        Logs::Lines(lines)
    }
}

impl From<&str> for Logs {
    fn from(text: &str) -> Self {
        Logs::Text(text.to_string())
    }
}
