use crate::{GeneratedDocument, GenerationMode, SessionStatus};

/// Snapshot of everything a UI needs to render the page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub target_url: String,
    pub company_name: String,
    pub streaming: bool,
    pub mode: GenerationMode,
    pub status: SessionStatus,
    /// Text accumulated so far; grows while streaming and is kept on failure.
    pub text: String,
    pub error: Option<String>,
    pub document: Option<GeneratedDocument>,
    pub validation_error: Option<String>,
    /// True while a request is in flight; disables the submit button.
    pub busy: bool,
    pub dirty: bool,
}
