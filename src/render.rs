//! Views for chat output.
//!
//! This module provides the [`ChatView`] trait that a session draws into, and
//! [`HtmlView`], a headless document model of the chat page: a message list, a debug log
//! panel, and the enabled state of the input controls.  `HtmlView` can be serialized to a
//! standalone HTML page.

use std::fs;
use std::path::Path;

use crate::debug_log::DebugLog;
use crate::error::{Error, Result};
use crate::markdown::{MarkdownMode, escape_html};
use crate::types::{Logs, MessageId, Sender};

/// Trait for drawing a conversation.
///
/// This abstraction allows for different output strategies:
/// - A headless HTML document ([`HtmlView`])
/// - A terminal ([`TerminalView`](crate::chat::TerminalView))
/// - Both at once, via the tuple implementation
pub trait ChatView: Send {
    /// Append a message bubble, or update the bubble with identifier `id` in place if
    /// one exists.  The list is scrolled to its end afterwards.
    fn render(&mut self, sender: Sender, text: &str, id: Option<&MessageId>);

    /// Clear the debug log panel.
    fn reset_log(&mut self);

    /// Add one line to the debug log panel.
    fn append_log(&mut self, line: &str);

    /// Redraw the debug log panel from a complete log.
    fn replace_log(&mut self, logs: &Logs);

    /// Enable or disable the input field and send control.
    fn set_input_enabled(&mut self, enabled: bool);

    /// Remove every message and log line.
    fn clear(&mut self) {}
}

impl<A: ChatView, B: ChatView> ChatView for (A, B) {
    fn render(&mut self, sender: Sender, text: &str, id: Option<&MessageId>) {
        self.0.render(sender, text, id);
        self.1.render(sender, text, id);
    }

    fn reset_log(&mut self) {
        self.0.reset_log();
        self.1.reset_log();
    }

    fn append_log(&mut self, line: &str) {
        self.0.append_log(line);
        self.1.append_log(line);
    }

    fn replace_log(&mut self, logs: &Logs) {
        self.0.replace_log(logs);
        self.1.replace_log(logs);
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        self.0.set_input_enabled(enabled);
        self.1.set_input_enabled(enabled);
    }

    fn clear(&mut self) {
        self.0.clear();
        self.1.clear();
    }
}

/// One rendered message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bubble {
    /// Who wrote the message.
    pub sender: Sender,
    /// Identifier for in-place updates, if any.
    pub id: Option<MessageId>,
    /// The source text.
    pub text: String,
    /// The sanitized HTML shown to the user.
    pub html: String,
}

/// An ordered list of message bubbles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageList {
    bubbles: Vec<Bubble>,
    scroll_position: usize,
}

impl MessageList {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append or update a bubble, then scroll to the end.
    pub fn render(
        &mut self,
        sender: Sender,
        text: &str,
        id: Option<&MessageId>,
        mode: MarkdownMode,
    ) {
        let html = mode.to_html(text);
        let existing = id.and_then(|id| {
            self.bubbles
                .iter()
                .position(|bubble| bubble.id.as_ref() == Some(id))
        });
        match existing {
            Some(index) => {
                let bubble = &mut self.bubbles[index];
                bubble.sender = sender;
                bubble.text = text.to_string();
                bubble.html = html;
            }
            None => self.bubbles.push(Bubble {
                sender,
                id: id.cloned(),
                text: text.to_string(),
                html,
            }),
        }
        self.scroll_position = self.bubbles.len();
    }

    /// The bubble with identifier `id`, if any.
    pub fn find(&self, id: &MessageId) -> Option<&Bubble> {
        self.bubbles
            .iter()
            .find(|bubble| bubble.id.as_ref() == Some(id))
    }

    /// All bubbles, oldest first.
    pub fn bubbles(&self) -> &[Bubble] {
        &self.bubbles
    }

    /// Number of bubbles from `sender`.
    pub fn count(&self, sender: Sender) -> usize {
        self.bubbles
            .iter()
            .filter(|bubble| bubble.sender == sender)
            .count()
    }

    /// Number of bubbles.
    pub fn len(&self) -> usize {
        self.bubbles.len()
    }

    /// Returns true if there are no bubbles.
    pub fn is_empty(&self) -> bool {
        self.bubbles.is_empty()
    }

    /// Scroll so that bubble `position` is the last one in view.
    pub fn scroll_to(&mut self, position: usize) {
        self.scroll_position = position.min(self.bubbles.len());
    }

    /// Returns true if the newest bubble is in view.
    pub fn is_scrolled_to_end(&self) -> bool {
        self.scroll_position == self.bubbles.len()
    }

    /// Remove every bubble.
    pub fn clear(&mut self) {
        self.bubbles.clear();
        self.scroll_position = 0;
    }

    /// Render the list body as HTML.
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        for bubble in &self.bubbles {
            html.push_str("<div class=\"message ");
            html.push_str(bubble.sender.as_str());
            html.push('"');
            if let Some(id) = &bubble.id {
                html.push_str(" id=\"");
                html.push_str(&escape_html(id.as_str()));
                html.push('"');
            }
            html.push('>');
            html.push_str(&bubble.html);
            html.push_str("</div>\n");
        }
        html
    }
}

/// Headless model of the chat page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlView {
    messages: MessageList,
    debug_log: DebugLog,
    input_enabled: bool,
    markdown: MarkdownMode,
}

impl HtmlView {
    /// Creates a new, empty page with input enabled.
    pub fn new(markdown: MarkdownMode) -> Self {
        Self {
            messages: MessageList::new(),
            debug_log: DebugLog::new(),
            input_enabled: true,
            markdown,
        }
    }

    /// The message list.
    pub fn messages(&self) -> &MessageList {
        &self.messages
    }

    /// The debug log panel.
    pub fn debug_log(&self) -> &DebugLog {
        &self.debug_log
    }

    /// Whether the input field and send control accept input.
    pub fn input_enabled(&self) -> bool {
        self.input_enabled
    }

    /// The markdown converter used for new renders.
    pub fn markdown(&self) -> MarkdownMode {
        self.markdown
    }

    /// Change the markdown converter.  Existing bubbles keep their HTML.
    pub fn set_markdown(&mut self, markdown: MarkdownMode) {
        self.markdown = markdown;
    }

    /// Serialize the page as a standalone HTML document.
    pub fn to_html_page(&self, title: &str) -> String {
        let disabled = if self.input_enabled { "" } else { " disabled" };
        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
body{{font-family:sans-serif;margin:0;display:flex;height:100vh}}
#chat{{flex:2;display:flex;flex-direction:column}}
#chat-messages{{flex:1;overflow-y:auto;padding:12px}}
.message{{margin:8px 0;padding:8px 12px;border-radius:8px;max-width:80%}}
.message.user{{background:#dcf0ff;margin-left:auto}}
.message.assistant{{background:#f1f1f1}}
#debug-log{{flex:1;overflow-y:auto;background:#111;color:#9f9;font-family:monospace;padding:12px}}
</style>
</head>
<body>
<div id="chat">
<div id="chat-messages">
{messages}</div>
<div id="input-row">
<textarea id="user-input"{disabled}></textarea>
<button id="send-button"{disabled}>Send</button>
</div>
</div>
<div id="debug-log">
{log}</div>
</body>
</html>
"#,
            title = escape_html(title),
            messages = self.messages.to_html(),
            log = self.debug_log.to_html(),
        )
    }

    /// Write the page to `path`.
    pub fn write_page(&self, path: &Path, title: &str) -> Result<()> {
        fs::write(path, self.to_html_page(title)).map_err(|err| {
            Error::io(format!("failed to write {}", path.display()), err)
        })
    }
}

impl Default for HtmlView {
    fn default() -> Self {
        Self::new(MarkdownMode::default())
    }
}

impl ChatView for HtmlView {
    fn render(&mut self, sender: Sender, text: &str, id: Option<&MessageId>) {
        self.messages.render(sender, text, id, self.markdown);
    }

    fn reset_log(&mut self) {
        self.debug_log.reset();
    }

    fn append_log(&mut self, line: &str) {
        self.debug_log.append(line);
    }

    fn replace_log(&mut self, logs: &Logs) {
        self.debug_log.replace_all(logs);
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        self.input_enabled = enabled;
    }

    fn clear(&mut self) {
        self.messages.clear();
        self.debug_log.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_appends_and_scrolls() {
        let mut view = HtmlView::new(MarkdownMode::Basic);
        view.render(Sender::User, "hi", None);
        view.render(Sender::Assistant, "**hello**", None);
        assert_eq!(view.messages().len(), 2);
        assert_eq!(view.messages().bubbles()[1].html, "<strong>hello</strong>");
        assert!(view.messages().is_scrolled_to_end());
    }

    #[test]
    fn render_scrolls_back_to_end() {
        let mut list = MessageList::new();
        let id = MessageId::assistant_reply(1);
        list.render(Sender::User, "q", None, MarkdownMode::Basic);
        list.render(Sender::Assistant, "Thinking...", Some(&id), MarkdownMode::Basic);
        list.scroll_to(0);
        assert!(!list.is_scrolled_to_end());
        list.render(Sender::Assistant, "done", Some(&id), MarkdownMode::Basic);
        assert!(list.is_scrolled_to_end());
    }

    #[test]
    fn render_with_existing_id_updates_in_place() {
        let mut view = HtmlView::new(MarkdownMode::Basic);
        let id = MessageId::assistant_reply(1);
        view.render(Sender::User, "question", None);
        view.render(Sender::Assistant, "Thinking...", Some(&id));
        view.render(Sender::Assistant, "answer", Some(&id));
        assert_eq!(view.messages().len(), 2);
        assert_eq!(view.messages().find(&id).unwrap().text, "answer");
    }

    #[test]
    fn page_has_dom_contract() {
        let mut view = HtmlView::default();
        view.render(Sender::User, "<script>x</script>", None);
        view.append_log("step");
        view.set_input_enabled(false);
        let page = view.to_html_page("Atlas");
        for id in ["user-input", "send-button", "chat-messages", "debug-log"] {
            assert!(page.contains(&format!("id=\"{id}\"")), "missing {id}");
        }
        assert!(page.contains("<button id=\"send-button\" disabled>"));
        assert!(!page.contains("<script>"));
        assert!(page.contains("<div class=\"log-line\">step</div>"));
    }

    #[test]
    fn tuple_view_forwards() {
        let mut view = (HtmlView::default(), HtmlView::default());
        view.render(Sender::User, "hi", None);
        view.append_log("a");
        view.set_input_enabled(false);
        assert_eq!(view.0.messages().len(), 1);
        assert_eq!(view.1.debug_log().lines(), ["a"]);
        assert!(!view.1.input_enabled());
        view.clear();
        assert!(view.0.messages().is_empty());
        assert!(view.1.debug_log().is_empty());
    }
}
