//! Brochure engine: transport initiator and streaming-response consumer.
mod client;
mod engine;
mod stream;
mod types;

pub use client::{BackendSettings, HttpBackendClient, Transport};
pub use engine::EngineHandle;
pub use stream::{
    consume, ChannelStreamSink, LineFramer, Record, StreamEnd, StreamError, StreamFailure,
    StreamMode, StreamSink, Utf8StreamDecoder,
};
pub use types::{
    BrochureDocument, EngineEvent, FailureKind, GenerationOutcome, Generator, SessionId,
    SessionResult, SubmitError, SubmitOutcome, SubmitRequest, SummaryDocument,
};
