#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User edited the URL input box.
    UrlChanged(String),
    /// User edited the company name input box.
    CompanyNameChanged(String),
    /// User flipped the streaming toggle.
    StreamingToggled(bool),
    /// User switched between brochure and summary mode.
    ModeSelected(crate::GenerationMode),
    /// User submitted the form.
    Submitted,
    /// Engine decoded new text for a streaming session.
    SessionChunk {
        session_id: crate::SessionId,
        delta: String,
    },
    /// Engine finished a session; the document is present for single-shot
    /// responses and absent when the result arrived as streamed text.
    SessionSucceeded {
        session_id: crate::SessionId,
        document: Option<crate::GeneratedDocument>,
    },
    /// Engine reports a failed session.
    SessionFailed {
        session_id: crate::SessionId,
        message: String,
    },
    /// Engine confirms a session was cancelled.
    SessionCancelled { session_id: crate::SessionId },
    /// Fallback for placeholder wiring.
    NoOp,
}
