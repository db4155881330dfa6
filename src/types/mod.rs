// Public modules
pub mod chat_message;
pub mod logs;
pub mod sender;
pub mod stream_event;
pub mod think_request;
pub mod think_response;

// Re-exports
pub use chat_message::{ChatMessage, MessageId};
pub use logs::Logs;
pub use sender::Sender;
pub use stream_event::StreamEvent;
pub use think_request::ThinkRequest;
pub use think_response::ThinkResponse;
