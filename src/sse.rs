//! Server-Sent Events (SSE) processing for the `/chat-stream` endpoint.
//!
//! This module turns the raw byte stream of an HTTP response into a stream of
//! [`StreamEvent`]s.  The server follows the EventSource wire format: events are separated
//! by a blank line, payloads arrive on `data:` lines, and lines starting with `:` are
//! comments (keep-alives).  Each payload is the JSON object `{"type": ..., "data": ...}`.

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};

use crate::{Error, Result, StreamEvent};

/// Process a stream of bytes into a stream of server-sent events.
///
/// Malformed events are yielded as errors without ending the stream; the caller decides
/// whether an error is terminal.
pub fn process_sse<S>(byte_stream: S) -> impl Stream<Item = Result<StreamEvent>> + Send
where
    S: Stream<Item = std::result::Result<Bytes, reqwest::Error>> + Unpin + Send + 'static,
{
    // Convert reqwest errors to our error type
    let stream = byte_stream.map(|result| {
        result.map_err(|e| {
            Error::connection(format!("Error in HTTP stream: {e}"), Some(Box::new(e)))
        })
    });

    let decoder = Decoder::default();

    stream::unfold(
        (stream, decoder),
        move |(mut stream, mut decoder)| async move {
            loop {
                // First drain complete events already in the buffer
                if let Some(event) = decoder.next_event() {
                    return Some((event, (stream, decoder)));
                }
                if decoder.finished {
                    return None;
                }

                match stream.next().await {
                    Some(Ok(bytes)) => {
                        if let Err(e) = decoder.push(&bytes) {
                            return Some((Err(e), (stream, decoder)));
                        }
                    }
                    Some(Err(e)) => {
                        return Some((Err(e), (stream, decoder)));
                    }
                    None => {
                        // End of stream: a final event may lack its blank-line terminator
                        return decoder.finish().map(|event| (event, (stream, decoder)));
                    }
                }
            }
        },
    )
}

/// Incremental SSE decoder.
///
/// Bytes are accumulated until they form valid UTF-8, so multi-byte characters split
/// across network chunks survive.
#[derive(Debug, Default)]
struct Decoder {
    pending: Vec<u8>,
    buffer: String,
    finished: bool,
}

impl Decoder {
    fn push(&mut self, bytes: &[u8]) -> Result<()> {
        self.pending.extend_from_slice(bytes);
        let valid = match std::str::from_utf8(&self.pending) {
            Ok(text) => text.len(),
            // Incomplete sequence at the tail: keep it for the next chunk
            Err(e) if e.error_len().is_none() => e.valid_up_to(),
            Err(e) => {
                self.pending.clear();
                return Err(Error::encoding(
                    format!("Invalid UTF-8 in stream: {e}"),
                    Some(Box::new(e)),
                ));
            }
        };
        let tail = self.pending.split_off(valid);
        let text = std::str::from_utf8(&self.pending)?;
        self.buffer.push_str(text);
        self.pending = tail;
        Ok(())
    }

    fn next_event(&mut self) -> Option<Result<StreamEvent>> {
        if self.buffer.contains("\r\n") {
            self.buffer = self.buffer.replace("\r\n", "\n");
        }
        loop {
            let (block, rest) = self.buffer.split_once("\n\n")?;
            let parsed = parse_block(block);
            self.buffer = rest.to_string();
            if let Some(event) = parsed {
                return Some(event);
            }
        }
    }

    fn finish(&mut self) -> Option<Result<StreamEvent>> {
        if self.finished {
            return None;
        }
        self.finished = true;
        if !self.pending.is_empty() {
            self.pending.clear();
            return Some(Err(Error::encoding(
                "Stream ended inside a UTF-8 sequence",
                None,
            )));
        }
        let block = std::mem::take(&mut self.buffer).replace("\r\n", "\n");
        let block = block.trim_end_matches('\n');
        if block.is_empty() {
            return None;
        }
        parse_block(block)
    }
}

/// Parse one SSE event block.
///
/// Returns `None` for blocks that carry no data (comments, bare `id:`/`retry:` fields).
fn parse_block(block: &str) -> Option<Result<StreamEvent>> {
    let mut data: Option<String> = None;
    for line in block.lines() {
        if line.is_empty() || line.starts_with(':') {
            continue;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "data" => match data.as_mut() {
                Some(data) => {
                    data.push('\n');
                    data.push_str(value);
                }
                None => data = Some(value.to_string()),
            },
            "event" | "id" | "retry" => {}
            _ => {
                tracing::debug!(field, "ignoring unknown SSE field");
            }
        }
    }
    let data = data?;
    Some(parse_event_data(&data))
}

/// Parse the JSON payload of an event.
fn parse_event_data(data: &str) -> Result<StreamEvent> {
    serde_json::from_str::<StreamEvent>(data).map_err(|e| {
        Error::serialization(
            format!("Malformed stream event '{data}': {e}"),
            Some(Box::new(e)),
        )
    })
}
