use std::fmt;

use serde::Deserialize;

pub type SessionId = u64;

/// Which backend generator a submission targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Generator {
    Brochure,
    Summary,
}

/// Transport-level submission. Built by the caller from validated form input;
/// the engine re-checks nothing beyond URL parseability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitRequest {
    pub target_url: String,
    pub company_name: String,
    pub streaming: bool,
    pub generator: Generator,
}

/// Single-shot brochure response document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BrochureDocument {
    pub id: String,
    pub created_at: String,
    pub owner_id: Option<String>,
    pub url: String,
    pub company_name: String,
    pub content: String,
}

/// Single-shot summary response document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SummaryDocument {
    pub id: String,
    pub created_at: String,
    pub owner_id: Option<String>,
    pub url: String,
    pub title: String,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    Brochure(BrochureDocument),
    Summary(SummaryDocument),
    /// Full text of a streamed response, as accumulated chunk by chunk.
    Streamed { text: String },
}

/// Result of one submit call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Completed(GenerationOutcome),
    /// The session was cancelled mid-flight; not a failure.
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitError {
    pub kind: FailureKind,
    pub message: String,
    /// Text already streamed before the failure. Real partial output,
    /// preserved so the UI can keep displaying it.
    pub partial_text: String,
}

impl SubmitError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            partial_text: String::new(),
        }
    }

    pub(crate) fn with_partial(mut self, partial_text: String) -> Self {
        self.partial_text = partial_text;
        self
    }
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for SubmitError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    Network,
    /// The success body of a single-shot response did not parse.
    MalformedDocument,
    /// Invalid byte sequence mid-stream.
    MalformedUtf8,
    /// Incomplete multi-byte sequence at end of body.
    TruncatedUtf8,
    /// The underlying chunk read failed mid-stream.
    StreamRead,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::MalformedDocument => write!(f, "malformed response document"),
            FailureKind::MalformedUtf8 => write!(f, "malformed utf-8 in stream"),
            FailureKind::TruncatedUtf8 => write!(f, "truncated utf-8 at end of stream"),
            FailureKind::StreamRead => write!(f, "stream read failed"),
        }
    }
}

/// Outcome delivered over the event channel for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionResult {
    Succeeded(GenerationOutcome),
    Failed(SubmitError),
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Newly decoded text for an in-flight streaming session.
    Chunk { session_id: SessionId, delta: String },
    /// Terminal result for a session.
    Completed {
        session_id: SessionId,
        result: SessionResult,
    },
}
