//! Slash command parsing for the chat application.
//!
//! This module handles parsing of special commands that start with `/`,
//! allowing users to control the chat session without sending messages
//! to the server.

use std::time::Duration;

use crate::chat::config::TransportMode;
use crate::markdown::MarkdownMode;

/// A parsed chat command.
///
/// These commands control the chat session and are not sent to the server.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatCommand {
    /// Clear the conversation and the debug log.
    Clear,

    /// Print the debug log panel.
    Log,

    /// Switch the transport used for new exchanges.
    Transport(TransportMode),

    /// Switch the markdown converter.
    Markdown(MarkdownMode),

    /// Set or clear the per-event stream timeout.
    Timeout(Option<Duration>),

    /// Write the conversation as an HTML page.
    Export(String),

    /// Display help information.
    Help,

    /// Exit the chat application.
    Quit,

    /// Display session statistics.
    Stats,

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// Parses user input for slash commands.
///
/// Returns `Some(ChatCommand)` if the input is a command,
/// or `None` if it should be treated as a regular message.
///
/// # Examples
///
/// ```
/// # use atlas_chat::chat::parse_command;
/// assert!(parse_command("/quit").is_some());
/// assert!(parse_command("/transport request").is_some());
/// assert!(parse_command("What's the weather?").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();

    let rest = input.strip_prefix('/')?;
    let mut parts = rest.splitn(2, ' ');
    let command = parts.next()?.to_lowercase();
    let argument = parts.next().map(|s| s.trim()).filter(|s| !s.is_empty());

    let result = match command.as_str() {
        "clear" => ChatCommand::Clear,
        "log" | "logs" => ChatCommand::Log,
        "help" | "?" => ChatCommand::Help,
        "quit" | "exit" | "q" => ChatCommand::Quit,
        "stats" | "status" => ChatCommand::Stats,
        "transport" => match argument {
            Some(arg) => match arg.parse() {
                Ok(mode) => ChatCommand::Transport(mode),
                Err(_) => ChatCommand::Invalid("/transport expects stream or request".to_string()),
            },
            None => ChatCommand::Invalid("/transport requires stream or request".to_string()),
        },
        "markdown" => match argument {
            Some(arg) => match arg.parse() {
                Ok(mode) => ChatCommand::Markdown(mode),
                Err(_) => ChatCommand::Invalid("/markdown expects basic or full".to_string()),
            },
            None => ChatCommand::Invalid("/markdown requires basic or full".to_string()),
        },
        "timeout" => match argument {
            Some(arg) if arg.eq_ignore_ascii_case("off") => ChatCommand::Timeout(None),
            Some(arg) => match arg.parse::<u64>() {
                Ok(0) => ChatCommand::Timeout(None),
                Ok(secs) => ChatCommand::Timeout(Some(Duration::from_secs(secs))),
                Err(_) => ChatCommand::Invalid(
                    "/timeout expects a number of seconds or off".to_string(),
                ),
            },
            None => ChatCommand::Invalid("/timeout requires a value".to_string()),
        },
        "export" => match argument {
            Some(path) => ChatCommand::Export(path.to_string()),
            None => ChatCommand::Invalid("/export requires a file path".to_string()),
        },
        _ => ChatCommand::Invalid(format!("Unknown command: /{command}")),
    };

    Some(result)
}

/// Returns the help text for available commands.
pub fn help_text() -> &'static str {
    r#"Available commands:
  /help, /?              Show this help message
  /quit, /exit, /q       Exit the chat
  /clear                 Clear the conversation and debug log
  /log                   Show the debug log for the last exchange
  /transport <mode>      Use stream or request for new messages
  /markdown <mode>       Render with basic or full markdown
  /timeout <secs|off>    Give up on a silent stream after <secs>
  /export <path>         Write the conversation as an HTML page
  /stats                 Show session statistics"#
}
