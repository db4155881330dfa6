//! Interactive chat application for conversing with an Atlas server.
//!
//! This binary provides a REPL over an Atlas server. Replies stream in with the
//! server's reasoning steps shown as dimmed log lines beneath the pending answer.
//!
//! # Usage
//!
//! ```bash
//! # Talk to a local development server
//! atlas-chat
//!
//! # Talk to another server without streaming
//! atlas-chat --server http://atlas.internal:5001/ --transport request
//!
//! # Keep an HTML copy of the conversation
//! atlas-chat --html conversation.html
//!
//! # Disable colors (useful for piping output)
//! atlas-chat --no-color
//! ```
//!
//! Set `RUST_LOG=atlas_chat=debug` to trace every exchange on stderr.
//!
//! # Commands
//!
//! While chatting, you can use slash commands:
//! - `/help` - Show available commands
//! - `/clear` - Clear the conversation
//! - `/log` - Show the debug log for the last exchange
//! - `/transport <stream|request>` - Change how replies are fetched
//! - `/markdown <basic|full>` - Change how replies are rendered
//! - `/timeout <secs|off>` - Give up on a silent stream after `secs`
//! - `/export <path>` - Write the conversation as an HTML page
//! - `/stats` - Show session statistics
//! - `/quit` - Exit the application

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing_subscriber::EnvFilter;

use atlas_chat::chat::{
    ChatArgs, ChatCommand, ChatConfig, ChatSession, ExchangeOutcome, InputController,
    InputEvent, TerminalView, help_text, parse_command,
};
use atlas_chat::{Error, HtmlView, TracingExchangeLogger};

const PAGE_TITLE: &str = "Atlas Chat";

/// Main entry point for the atlas-chat application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, _) = ChatArgs::from_command_line_relaxed("atlas-chat [OPTIONS]");
    let config = ChatConfig::try_from(args)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let html_path = config.html_path.clone();
    let mut view = (
        TerminalView::with_color(config.use_color),
        HtmlView::new(config.markdown),
    );
    let mut session = ChatSession::new(config)?.with_logger(Arc::new(TracingExchangeLogger));
    let mut input = InputController::new();
    let mut rl = DefaultEditor::new()?;

    // Flag for interrupt handling during an exchange
    let interrupted = Arc::new(AtomicBool::new(false));

    // Set up Ctrl+C handler
    let interrupted_clone = interrupted.clone();
    ctrlc::set_handler(move || {
        interrupted_clone.store(true, Ordering::Relaxed);
    })?;

    println!("Atlas Chat (server: {})", session.config().server_url);
    println!("Type /help for commands, /quit to exit\n");

    loop {
        // Reset interrupt flag before each input
        interrupted.store(false, Ordering::Relaxed);

        let readline = rl.readline("You: ");

        match readline {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line.as_str());

                // Check for slash commands
                if let Some(cmd) = parse_command(&line) {
                    match cmd {
                        ChatCommand::Quit => {
                            println!("Goodbye!");
                            break;
                        }
                        ChatCommand::Clear => {
                            if session.clear(&mut view) {
                                view.0.print_info("Conversation cleared.");
                            }
                        }
                        ChatCommand::Log => {
                            let (terminal, page) = &mut view;
                            terminal.print_log(page.debug_log().lines());
                        }
                        ChatCommand::Help => {
                            for line in help_text().lines() {
                                println!("    {}", line);
                            }
                        }
                        ChatCommand::Transport(mode) => {
                            session.set_transport_mode(mode);
                            view.0.print_info(&format!("Transport set to {mode}."));
                        }
                        ChatCommand::Markdown(mode) => {
                            session.set_markdown(mode);
                            view.1.set_markdown(mode);
                            view.0.print_info(&format!("Markdown set to {mode}."));
                        }
                        ChatCommand::Timeout(timeout) => {
                            session.set_stream_timeout(timeout);
                            match timeout {
                                Some(limit) => view.0.print_info(&format!(
                                    "Stream timeout set to {}s.",
                                    limit.as_secs()
                                )),
                                None => view.0.print_info("Stream timeout disabled."),
                            }
                        }
                        ChatCommand::Export(path) => {
                            match view.1.write_page(Path::new(&path), PAGE_TITLE) {
                                Ok(()) => view
                                    .0
                                    .print_info(&format!("Conversation written to {path}")),
                                Err(err) => view.0.print_error(&err.to_string()),
                            }
                        }
                        ChatCommand::Stats => {
                            print_stats(&session);
                        }
                        ChatCommand::Invalid(message) => {
                            view.0.print_error(&message);
                        }
                    }
                    continue;
                }

                // Regular message - send to the server
                input.set_field(line);
                let Some(message) = input.handle(InputEvent::Enter { shift: false }, session.state())
                else {
                    continue;
                };
                let outcome = tokio::select! {
                    outcome = session.send(&message, &mut view) => Some(outcome),
                    _ = wait_for_interrupt(&interrupted) => None,
                };
                match outcome {
                    Some(ExchangeOutcome::Failed(err)) => {
                        tracing::debug!(error = %err, "exchange failed");
                    }
                    Some(_) => {}
                    None => {
                        session.abort(Error::streaming("interrupted by user", None), &mut view);
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C at prompt - soft interrupt
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D - exit
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                view.0.print_error(&format!("Input error: {}", err));
                break;
            }
        }
    }

    if let Some(path) = html_path {
        view.1.write_page(&path, PAGE_TITLE)?;
    }

    Ok(())
}

async fn wait_for_interrupt(flag: &AtomicBool) {
    while !flag.load(Ordering::Relaxed) {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

fn print_stats(session: &ChatSession) {
    let stats = session.stats();
    println!("    Session Statistics:");
    println!("      Server: {}", stats.server_url);
    println!("      Transport: {}", stats.transport);
    println!("      Markdown: {}", stats.markdown);
    match stats.stream_timeout {
        Some(limit) => println!("      Stream timeout: {}s", limit.as_secs()),
        None => println!("      Stream timeout: (none)"),
    }
    println!("      Messages: {}", stats.message_count);
    println!(
        "      Exchanges: {} ({} failed)",
        stats.exchanges, stats.failed_exchanges
    );
    println!("      Stream events: {}", stats.stream_events);
}
