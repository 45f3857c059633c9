//! Incremental consumer for the `/chat_stream` SSE feed.
//!
//! The backend replies with a chunked body of records shaped
//! `data: {"type":"thought","content":"..."}\n\n`. Chunk boundaries fall
//! anywhere — mid-record, mid-character — so the parser buffers raw bytes
//! and only decodes a segment once its `\n\n` delimiter has arrived. A
//! malformed record (bad JSON, unknown `type`) is dropped; one corrupt
//! event never aborts the session.

use futures::{Stream, StreamExt};

use super::client::ApiError;
use super::types::StreamEvent;

/// Stateful SSE record parser. Feed it chunks as they arrive; it hands back
/// every event completed by each chunk and keeps the unterminated tail
/// buffered for the next one.
#[derive(Debug, Default)]
pub struct SseParser {
    buf: Vec<u8>,
}

impl SseParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk of bytes, returning the events it completed, in order.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        self.buf.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(pos) = find_delimiter(&self.buf) {
            let segment: Vec<u8> = self.buf.drain(..pos + 2).collect();
            if let Some(event) = parse_segment(&segment[..pos]) {
                events.push(event);
            }
        }
        events
    }

    /// Flush the trailing segment at end of stream, if it parses as a
    /// complete record despite the missing delimiter.
    pub fn finish(&mut self) -> Option<StreamEvent> {
        let remaining = std::mem::take(&mut self.buf);
        parse_segment(&remaining)
    }
}

/// Position of the `\n\n` event delimiter, if a complete segment is buffered.
fn find_delimiter(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\n\n")
}

/// Parse one delimited segment into an event.
///
/// Only `data: ` field lines carry payloads; other SSE fields (`event:`,
/// comments) and undecodable payloads yield `None`.
fn parse_segment(segment: &[u8]) -> Option<StreamEvent> {
    let text = std::str::from_utf8(segment).ok()?;
    for line in text.lines() {
        let line = line.trim_end_matches('\r');
        if let Some(data) = line.strip_prefix("data: ") {
            return serde_json::from_str(data).ok();
        }
    }
    None
}

/// Adapt a chunked byte stream (a response body) into a stream of parsed
/// events. A transport error surfaces once as the terminal item; events
/// already yielded stand.
pub fn event_stream<S, B, E>(bytes: S) -> impl Stream<Item = Result<StreamEvent, ApiError>> + Send
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send,
    E: std::fmt::Display + Send,
{
    async_stream::stream! {
        let mut parser = SseParser::new();
        let mut bytes = Box::pin(bytes);

        while let Some(chunk) = bytes.next().await {
            match chunk {
                Ok(chunk) => {
                    for event in parser.push(chunk.as_ref()) {
                        yield Ok(event);
                    }
                }
                Err(e) => {
                    yield Err(ApiError::Stream(e.to_string()));
                    return;
                }
            }
        }

        if let Some(event) = parser.finish() {
            yield Ok(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    fn thought(content: &str) -> StreamEvent {
        StreamEvent::Thought {
            content: content.into(),
        }
    }

    fn answer(content: &str) -> StreamEvent {
        StreamEvent::Answer {
            content: content.into(),
        }
    }

    #[test]
    fn single_event_in_one_chunk() {
        let mut parser = SseParser::new();
        let events =
            parser.push(b"data: {\"type\":\"thought\",\"content\":\"checking vitals\"}\n\n");
        assert_eq!(events, vec![thought("checking vitals")]);
    }

    #[test]
    fn two_events_in_one_chunk() {
        let mut parser = SseParser::new();
        let events = parser.push(
            b"data: {\"type\":\"answer\",\"content\":\"Rest \"}\n\ndata: {\"type\":\"answer\",\"content\":\"well.\"}\n\n",
        );
        assert_eq!(events, vec![answer("Rest "), answer("well.")]);
    }

    #[test]
    fn record_split_across_chunks() {
        let mut parser = SseParser::new();
        assert!(parser.push(b"data: {\"type\":\"thou").is_empty());
        let events = parser.push(b"ght\",\"content\":\"hi\"}\n\n");
        assert_eq!(events, vec![thought("hi")]);
    }

    #[test]
    fn multibyte_char_split_across_chunks() {
        // "💧" is four bytes; split it down the middle.
        let raw = "data: {\"type\":\"answer\",\"content\":\"drink 💧 often\"}\n\n".as_bytes();
        let mid = raw.len() - 12; // lands inside the emoji
        let mut parser = SseParser::new();
        assert!(parser.push(&raw[..mid]).is_empty());
        let events = parser.push(&raw[mid..]);
        assert_eq!(events, vec![answer("drink 💧 often")]);
    }

    #[test]
    fn malformed_json_skipped_between_valid_events() {
        let mut parser = SseParser::new();
        let mut events = parser.push(b"data: {\"type\":\"thought\",\"content\":\"a\"}\n\n");
        events.extend(parser.push(b"data: {not json}\n\n"));
        events.extend(parser.push(b"data: {\"type\":\"answer\",\"content\":\"b\"}\n\n"));
        assert_eq!(events, vec![thought("a"), answer("b")]);
    }

    #[test]
    fn unknown_event_type_skipped() {
        let mut parser = SseParser::new();
        let events = parser.push(
            b"data: {\"type\":\"answer\",\"content\":\"x\"}\n\ndata: {\"type\":\"ping\",\"content\":\"y\"}\n\ndata: {\"type\":\"answer\",\"content\":\"z\"}\n\n",
        );
        assert_eq!(events, vec![answer("x"), answer("z")]);
    }

    #[test]
    fn non_data_lines_ignored() {
        let mut parser = SseParser::new();
        let events =
            parser.push(b"event: message\ndata: {\"type\":\"thought\",\"content\":\"ok\"}\n\n");
        assert_eq!(events, vec![thought("ok")]);
        assert!(parser.push(b": keep-alive comment\n\n").is_empty());
    }

    #[test]
    fn crlf_framing_tolerated() {
        let mut parser = SseParser::new();
        let events = parser.push(b"data: {\"type\":\"thought\",\"content\":\"ok\"}\r\n\n");
        assert_eq!(events, vec![thought("ok")]);
    }

    #[test]
    fn trailing_partial_retained_until_finish() {
        let mut parser = SseParser::new();
        let events = parser.push(b"data: {\"type\":\"answer\",\"content\":\"tail\"}");
        assert!(events.is_empty());
        assert_eq!(parser.finish(), Some(answer("tail")));
        // Buffer is consumed; a second finish yields nothing.
        assert_eq!(parser.finish(), None);
    }

    #[test]
    fn thought_then_batched_answers() {
        let mut parser = SseParser::new();
        let first = parser.push(b"data: {\"type\":\"thought\",\"content\":\"checking vitals\"}\n\n");
        let second = parser.push(
            b"data: {\"type\":\"answer\",\"content\":\"Rest \"}\n\ndata: {\"type\":\"answer\",\"content\":\"well.\"}\n\n",
        );
        assert_eq!(first, vec![thought("checking vitals")]);
        assert_eq!(second, vec![answer("Rest "), answer("well.")]);
    }

    #[tokio::test]
    async fn event_stream_yields_in_order() {
        let chunks: Vec<Result<&[u8], std::io::Error>> = vec![
            Ok(b"data: {\"type\":\"thought\",\"content\":\"checking vitals\"}\n\n"),
            Ok(b"data: {\"type\":\"answer\",\"content\":\"Rest \"}\n\ndata: {\"type\":\"answer\",\"content\":\"well.\"}\n\n"),
        ];
        let events: Vec<_> = event_stream(stream::iter(chunks)).collect().await;

        assert_eq!(events.len(), 3);
        assert_eq!(*events[0].as_ref().unwrap(), thought("checking vitals"));
        assert_eq!(*events[1].as_ref().unwrap(), answer("Rest "));
        assert_eq!(*events[2].as_ref().unwrap(), answer("well."));
    }

    #[tokio::test]
    async fn event_stream_transport_error_is_terminal() {
        let chunks: Vec<Result<&[u8], std::io::Error>> = vec![
            Ok(b"data: {\"type\":\"answer\",\"content\":\"Drink water\"}\n\n"),
            Err(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "connection reset",
            )),
        ];
        let items: Vec<_> = event_stream(stream::iter(chunks)).collect().await;

        // The valid event stands, then one terminal error, then nothing.
        assert_eq!(items.len(), 2);
        assert_eq!(*items[0].as_ref().unwrap(), answer("Drink water"));
        assert!(matches!(items[1], Err(ApiError::Stream(_))));
    }
}
