use std::fmt;
use std::sync::mpsc;

use bytes::Bytes;
use encoding_rs::{Decoder, DecoderResult, UTF_8};
use futures_util::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;

use crate::{EngineEvent, SessionId};

/// Protocol shape of a streaming body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamMode {
    /// Plain UTF-8 text; every decoded chunk is content verbatim.
    #[default]
    Raw,
    /// Newline-delimited `data: <payload>` records ending with `data: [DONE]`.
    Framed,
}

/// One semantic unit recovered from a framed stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Content(String),
    Done,
}

/// Observer for newly decoded content. Invoked synchronously on the decoding
/// task, so implementations must not block.
pub trait StreamSink: Send + Sync {
    fn emit(&self, delta: &str);
}

/// Forwards deltas for one session onto the engine event channel.
pub struct ChannelStreamSink {
    session_id: SessionId,
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelStreamSink {
    pub fn new(session_id: SessionId, tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { session_id, tx }
    }
}

impl StreamSink for ChannelStreamSink {
    fn emit(&self, delta: &str) {
        let _ = self.tx.send(EngineEvent::Chunk {
            session_id: self.session_id,
            delta: delta.to_string(),
        });
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamFailure {
    /// Invalid byte sequence mid-stream.
    MalformedUtf8,
    /// Incomplete multi-byte sequence left over at end of body.
    TruncatedUtf8,
    /// The underlying chunk read failed.
    Read,
}

impl fmt::Display for StreamFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamFailure::MalformedUtf8 => write!(f, "malformed utf-8 byte sequence in stream"),
            StreamFailure::TruncatedUtf8 => {
                write!(f, "truncated utf-8 sequence at end of stream")
            }
            StreamFailure::Read => write!(f, "stream read failed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct StreamError {
    pub failure: StreamFailure,
    pub message: String,
    /// Text decoded before the failure. Real partial output; the caller must
    /// not discard it.
    pub partial_text: String,
}

impl StreamError {
    fn new(failure: StreamFailure, partial_text: String) -> Self {
        Self {
            failure,
            message: failure.to_string(),
            partial_text,
        }
    }

    fn read(message: impl Into<String>, partial_text: String) -> Self {
        Self {
            failure: StreamFailure::Read,
            message: message.into(),
            partial_text,
        }
    }
}

/// How one consume loop ended. Cancellation is a normal exit, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEnd {
    Completed { text: String },
    Cancelled { text: String },
}

/// Incremental byte-to-text decoder.
///
/// A multi-byte sequence split across chunk boundaries is carried over inside
/// the `encoding_rs` decoder and completed by the next chunk; it never
/// produces replacement characters. Genuinely invalid bytes are an error.
pub struct Utf8StreamDecoder {
    inner: Decoder,
}

impl Default for Utf8StreamDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Utf8StreamDecoder {
    pub fn new() -> Self {
        // BOM removal only; no sniffing into other encodings.
        Self {
            inner: UTF_8.new_decoder_with_bom_removal(),
        }
    }

    /// Decodes one chunk, holding any incomplete trailing sequence for the
    /// next call.
    pub fn decode(&mut self, chunk: &[u8]) -> Result<String, StreamFailure> {
        self.run(chunk, false, StreamFailure::MalformedUtf8)
    }

    /// Signals end of body. An incomplete sequence still pending is an
    /// encoding error, not something to drop silently.
    pub fn finish(&mut self) -> Result<String, StreamFailure> {
        self.run(&[], true, StreamFailure::TruncatedUtf8)
    }

    fn run(
        &mut self,
        chunk: &[u8],
        last: bool,
        on_malformed: StreamFailure,
    ) -> Result<String, StreamFailure> {
        let mut out = String::new();
        let mut input = chunk;
        loop {
            let needed = self
                .inner
                .max_utf8_buffer_length_without_replacement(input.len())
                .unwrap_or(input.len() + 16);
            out.reserve(needed);
            let (result, read) =
                self.inner
                    .decode_to_string_without_replacement(input, &mut out, last);
            input = &input[read..];
            match result {
                DecoderResult::InputEmpty => return Ok(out),
                DecoderResult::OutputFull => continue,
                DecoderResult::Malformed(..) => return Err(on_malformed),
            }
        }
    }
}

const DATA_PREFIX: &str = "data: ";
const DONE_SENTINEL: &str = "[DONE]";

/// Splits decoded text into protocol records on newline boundaries.
///
/// The tail after the last newline is carried to the next push. Once the
/// done sentinel has been seen the framer emits nothing further, no matter
/// what bytes still arrive.
#[derive(Debug, Default)]
pub struct LineFramer {
    carry: String,
    done: bool,
}

impl LineFramer {
    pub fn push(&mut self, text: &str, records: &mut Vec<Record>) {
        if self.done {
            return;
        }
        self.carry.push_str(text);
        while let Some(pos) = self.carry.find('\n') {
            let line: String = self.carry.drain(..=pos).collect();
            let line = line.trim_end_matches(['\n', '\r']);
            // Lines without the data prefix are not records; skip them.
            let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
                continue;
            };
            let payload = payload.trim();
            if payload == DONE_SENTINEL {
                self.done = true;
                records.push(Record::Done);
                return;
            }
            records.push(Record::Content(payload.to_string()));
        }
    }
}

/// Drives one response body to completion.
///
/// Chunks are read strictly in arrival order; a chunk is fully decoded and
/// its carry state committed before the next read is polled. Every `Content`
/// record extends the running text and is reported to `sink` synchronously.
/// The body is owned by this function, so the underlying reader is released
/// on every exit path: done sentinel, exhaustion, error, and cancellation.
pub async fn consume<S, E>(
    mut body: S,
    mode: StreamMode,
    sink: &dyn StreamSink,
    cancel: &CancellationToken,
) -> Result<StreamEnd, StreamError>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: fmt::Display,
{
    let mut decoder = Utf8StreamDecoder::new();
    let mut framer = LineFramer::default();
    let mut text = String::new();

    loop {
        // Cancellation is checked at each chunk boundary.
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(StreamEnd::Cancelled { text }),
            next = body.next() => next,
        };
        let Some(chunk) = next else { break };
        let chunk = chunk.map_err(|err| StreamError::read(err.to_string(), text.clone()))?;

        let decoded = decoder
            .decode(&chunk)
            .map_err(|failure| StreamError::new(failure, text.clone()))?;
        if apply(mode, &mut framer, &decoded, &mut text, sink) {
            // Done sentinel: stop reading; dropping the body aborts the
            // connection, which is a normal early termination.
            return Ok(StreamEnd::Completed { text });
        }
    }

    // Body exhausted without a sentinel: flush the decoder carry.
    let tail = decoder
        .finish()
        .map_err(|failure| StreamError::new(failure, text.clone()))?;
    apply(mode, &mut framer, &tail, &mut text, sink);
    Ok(StreamEnd::Completed { text })
}

/// Routes decoded text through the framer (or straight out in raw mode).
/// Returns true when the done sentinel was reached.
fn apply(
    mode: StreamMode,
    framer: &mut LineFramer,
    decoded: &str,
    text: &mut String,
    sink: &dyn StreamSink,
) -> bool {
    match mode {
        StreamMode::Raw => {
            if !decoded.is_empty() {
                text.push_str(decoded);
                sink.emit(decoded);
            }
            false
        }
        StreamMode::Framed => {
            let mut records = Vec::new();
            framer.push(decoded, &mut records);
            for record in records {
                match record {
                    Record::Content(payload) => {
                        text.push_str(&payload);
                        sink.emit(&payload);
                    }
                    Record::Done => return true,
                }
            }
            false
        }
    }
}
