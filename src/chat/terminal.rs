//! Terminal output for the chat application.
//!
//! [`TerminalView`] draws a conversation on stdout with optional ANSI styling.  The debug
//! log is shown inline as dimmed lines beneath the pending reply.

use std::io::{self, Stdout, Write};

use crate::chat::session::PLACEHOLDER_TEXT;
use crate::render::ChatView;
use crate::types::{Logs, MessageId, Sender};

/// ANSI escape code for dim text (used for log lines and placeholders).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code for italic text (used for placeholders).
const ANSI_ITALIC: &str = "\x1b[3m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for cyan text (used for the assistant label).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code for red text (used for errors).
const ANSI_RED: &str = "\x1b[31m";

/// Plain text view with optional ANSI styling.
pub struct TerminalView {
    stdout: Stdout,
    use_color: bool,
}

impl TerminalView {
    /// Creates a new TerminalView with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a new TerminalView with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self {
            stdout: io::stdout(),
            use_color,
        }
    }

    /// Print an error message.
    pub fn print_error(&mut self, error: &str) {
        if self.use_color {
            eprintln!("{ANSI_RED}Error: {error}{ANSI_RESET}");
        } else {
            eprintln!("Error: {error}");
        }
    }

    /// Print an informational message.
    pub fn print_info(&mut self, info: &str) {
        println!("{info}");
        self.flush();
    }

    /// Print the lines of a debug log panel.
    pub fn print_log(&mut self, lines: &[String]) {
        if lines.is_empty() {
            self.print_info("(debug log is empty)");
            return;
        }
        for line in lines {
            self.print_log_line(line);
        }
    }

    /// Flushes stdout to ensure immediate display of streamed content.
    fn flush(&mut self) {
        let _ = self.stdout.flush();
    }

    fn print_log_line(&mut self, line: &str) {
        if self.use_color {
            println!("{ANSI_DIM}  | {line}{ANSI_RESET}");
        } else {
            println!("  | {line}");
        }
        self.flush();
    }

    fn label(&self) -> String {
        if self.use_color {
            format!("{ANSI_CYAN}atlas>{ANSI_RESET}")
        } else {
            "atlas>".to_string()
        }
    }
}

impl Default for TerminalView {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatView for TerminalView {
    fn render(&mut self, sender: Sender, text: &str, _id: Option<&MessageId>) {
        // The user's line is already on screen from the prompt.
        if sender == Sender::User {
            return;
        }
        let label = self.label();
        if text == PLACEHOLDER_TEXT && self.use_color {
            println!("{label} {ANSI_DIM}{ANSI_ITALIC}{text}{ANSI_RESET}");
        } else if text == PLACEHOLDER_TEXT {
            println!("{label} {text}");
        } else {
            println!("{label} {text}\n");
        }
        self.flush();
    }

    fn reset_log(&mut self) {}

    fn append_log(&mut self, line: &str) {
        self.print_log_line(line);
    }

    fn replace_log(&mut self, logs: &Logs) {
        self.print_log(&logs.lines());
    }

    fn set_input_enabled(&mut self, _enabled: bool) {
        self.flush();
    }

    fn clear(&mut self) {
        if self.use_color {
            print!("\x1b[2J\x1b[H");
        }
        self.flush();
    }
}
