//! Chat application module for conversations with an Atlas server.
//!
//! This module provides the conversation layer built on top of the atlas-chat client
//! library. It supports:
//!
//! - Streaming replies with live reasoning steps in the debug log
//! - Single request/response exchanges over `POST /think`
//! - A one-exchange-at-a-time session with guaranteed input re-enabling
//! - Slash commands for session control
//!
//! # Architecture
//!
//! The module is organized into several components:
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`session`]: The exchange state machine
//! - [`input`]: Enter/Shift+Enter/click handling for the input field
//! - [`terminal`]: ANSI output for the REPL
//! - [`commands`]: Slash command parsing and handling

pub mod commands;
pub mod config;
pub mod input;
pub mod session;
pub mod terminal;

pub use commands::{ChatCommand, help_text, parse_command};
pub use config::{ChatArgs, ChatConfig, TransportMode};
pub use input::{InputController, InputEvent};
pub use session::{
    CONNECTION_LOST_MESSAGE, ChatSession, ExchangeOutcome, PLACEHOLDER_TEXT,
    REQUEST_FAILED_MESSAGE, SessionState, SessionStats, Submission, TIMEOUT_MESSAGE,
    user_message,
};
pub use terminal::TerminalView;
