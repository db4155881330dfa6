//! The debug log panel: server-reported reasoning steps for the current exchange.

use crate::markdown::escape_html;
use crate::types::Logs;

/// A rolling log of reasoning steps.
///
/// The panel is scrolled so the newest line is visible after every change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DebugLog {
    lines: Vec<String>,
    scroll_position: usize,
}

impl DebugLog {
    /// Create an empty panel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all prior lines.
    pub fn reset(&mut self) {
        self.lines.clear();
        self.scroll_position = 0;
    }

    /// Add one line and scroll it into view.
    pub fn append(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
        self.scroll_to_end();
    }

    /// Redraw the panel from a complete log.
    pub fn replace_all(&mut self, logs: &Logs) {
        self.lines = logs.lines();
        self.scroll_to_end();
    }

    /// The lines currently shown, oldest first.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Number of lines shown.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Returns true if the panel is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Scroll so that line `position` is the last one in view.
    pub fn scroll_to(&mut self, position: usize) {
        self.scroll_position = position.min(self.lines.len());
    }

    /// Returns true if the newest line is in view.
    pub fn is_scrolled_to_end(&self) -> bool {
        self.scroll_position == self.lines.len()
    }

    /// Render the panel body as HTML, one `<div>` per line.
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        for line in &self.lines {
            html.push_str("<div class=\"log-line\">");
            html.push_str(&escape_html(line));
            html.push_str("</div>\n");
        }
        html
    }

    fn scroll_to_end(&mut self) {
        self.scroll_position = self.lines.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_keeps_order_and_scrolls() {
        let mut log = DebugLog::new();
        log.append("a");
        log.append("b");
        assert_eq!(log.lines(), ["a", "b"]);
        assert!(log.is_scrolled_to_end());
    }

    #[test]
    fn new_line_scrolls_back_to_end() {
        let mut log = DebugLog::new();
        log.append("a");
        log.append("b");
        log.scroll_to(1);
        assert!(!log.is_scrolled_to_end());
        log.append("c");
        assert!(log.is_scrolled_to_end());

        log.scroll_to(0);
        log.replace_all(&Logs::Text("x".to_string()));
        assert!(log.is_scrolled_to_end());
    }

    #[test]
    fn reset_clears() {
        let mut log = DebugLog::new();
        log.append("a");
        log.reset();
        assert!(log.is_empty());
        assert!(log.is_scrolled_to_end());
    }

    #[test]
    fn replace_all_from_lines_or_text() {
        let mut log = DebugLog::new();
        log.append("stale");
        log.replace_all(&Logs::Lines(vec!["x".to_string(), "y".to_string()]));
        assert_eq!(log.lines(), ["x", "y"]);
        log.replace_all(&Logs::Text("one\ntwo\nthree".to_string()));
        assert_eq!(log.len(), 3);
        assert!(log.is_scrolled_to_end());
    }

    #[test]
    fn html_is_escaped() {
        let mut log = DebugLog::new();
        log.append("<b>tool</b>");
        assert_eq!(
            log.to_html(),
            "<div class=\"log-line\">&lt;b&gt;tool&lt;/b&gt;</div>\n"
        );
    }
}
