//! The message input field and its send control.
//!
//! Pressing Enter or clicking send submits the field; Shift+Enter inserts a newline.
//! While an exchange is in flight the controls are disabled and submissions are dropped
//! without touching the field.

use crate::chat::session::SessionState;

/// A user action on the input controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// The send button was clicked.
    Click,
    /// Enter was pressed, with or without Shift held.
    Enter {
        /// Whether Shift was held.
        shift: bool,
    },
}

/// The input field contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputController {
    field: String,
}

impl InputController {
    /// Creates an empty input field.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current field contents.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Replaces the field contents, as typing would.
    pub fn set_field(&mut self, text: impl Into<String>) {
        self.field = text.into();
    }

    /// Whether the controls accept input in `state`.
    pub fn is_enabled(state: &SessionState) -> bool {
        state.is_idle()
    }

    /// Handles `event`, returning the trimmed message to send if it is a submission.
    ///
    /// The field is cleared only when a message is returned.
    pub fn handle(&mut self, event: InputEvent, state: &SessionState) -> Option<String> {
        match event {
            InputEvent::Enter { shift: true } => {
                self.field.push('\n');
                None
            }
            InputEvent::Click | InputEvent::Enter { shift: false } => {
                if !Self::is_enabled(state) {
                    return None;
                }
                let message = self.field.trim();
                if message.is_empty() {
                    return None;
                }
                let message = message.to_string();
                self.field.clear();
                Some(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MessageId;

    fn sending() -> SessionState {
        SessionState::Sending {
            placeholder: MessageId::assistant_reply(1),
        }
    }

    #[test]
    fn enter_and_click_submit_trimmed_text() {
        let mut input = InputController::new();
        input.set_field("  hello  ");
        assert_eq!(
            input.handle(InputEvent::Enter { shift: false }, &SessionState::Idle),
            Some("hello".to_string())
        );
        assert_eq!(input.field(), "");

        input.set_field("again");
        assert_eq!(
            input.handle(InputEvent::Click, &SessionState::Idle),
            Some("again".to_string())
        );
    }

    #[test]
    fn shift_enter_inserts_newline() {
        let mut input = InputController::new();
        input.set_field("line one");
        assert!(input.handle(InputEvent::Enter { shift: true }, &SessionState::Idle).is_none());
        assert_eq!(input.field(), "line one\n");
    }

    #[test]
    fn whitespace_only_is_not_submitted() {
        let mut input = InputController::new();
        input.set_field(" \n ");
        assert!(input.handle(InputEvent::Click, &SessionState::Idle).is_none());
        assert_eq!(input.field(), " \n ");
    }

    #[test]
    fn disabled_while_sending() {
        let mut input = InputController::new();
        input.set_field("second");
        assert!(!InputController::is_enabled(&sending()));
        assert!(input.handle(InputEvent::Enter { shift: false }, &sending()).is_none());
        assert!(input.handle(InputEvent::Click, &sending()).is_none());
        assert_eq!(input.field(), "second");
    }
}
