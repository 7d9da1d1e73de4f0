use crate::request::{GenerationMode, GenerationRequest, ValidationError};
use crate::view_model::AppViewModel;

pub type SessionId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    #[default]
    Idle,
    Pending,
    Streaming,
    Succeeded,
    Failed,
    Cancelled,
}

impl SessionStatus {
    /// Pending or Streaming: the engine still owns an in-flight request.
    pub fn is_active(self) -> bool {
        matches!(self, SessionStatus::Pending | SessionStatus::Streaming)
    }

    /// Terminal states are absorbing; only a new session leaves them.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SessionStatus::Succeeded | SessionStatus::Failed | SessionStatus::Cancelled
        )
    }
}

/// Final document parsed from a single-shot response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratedDocument {
    Brochure { company_name: String, content: String },
    Summary { title: String, summary: String },
}

/// One request/response lifecycle, from submission to terminal state.
///
/// The accumulated text is append-only while the session is active and is
/// reset only when a new session replaces this one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
    pub id: SessionId,
    pub status: SessionStatus,
    text: String,
    error: Option<String>,
    document: Option<GeneratedDocument>,
}

impl Session {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn document(&self) -> Option<&GeneratedDocument> {
        self.document.as_ref()
    }
}

/// Form fields as currently edited in the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    pub target_url: String,
    pub company_name: String,
    pub streaming: bool,
    pub mode: GenerationMode,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            target_url: String::new(),
            company_name: String::new(),
            streaming: true,
            mode: GenerationMode::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    form: FormState,
    session: Session,
    next_session_id: SessionId,
    validation_error: Option<ValidationError>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            target_url: self.form.target_url.clone(),
            company_name: self.form.company_name.clone(),
            streaming: self.form.streaming,
            mode: self.form.mode,
            status: self.session.status,
            text: self.session.text.clone(),
            error: self.session.error.clone(),
            document: self.session.document.clone(),
            validation_error: self.validation_error.as_ref().map(ToString::to_string),
            busy: self.session.status.is_active(),
            dirty: self.dirty,
        }
    }

    /// Returns whether a redraw is needed, clearing the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn set_target_url(&mut self, url: String) {
        self.form.target_url = url;
        self.mark_dirty();
    }

    pub(crate) fn set_company_name(&mut self, name: String) {
        self.form.company_name = name;
        self.mark_dirty();
    }

    pub(crate) fn set_streaming(&mut self, enabled: bool) {
        self.form.streaming = enabled;
        self.mark_dirty();
    }

    pub(crate) fn set_mode(&mut self, mode: GenerationMode) {
        self.form.mode = mode;
        self.mark_dirty();
    }

    pub(crate) fn set_validation_error(&mut self, error: Option<ValidationError>) {
        self.validation_error = error;
        self.mark_dirty();
    }

    pub(crate) fn request_from_form(&self) -> GenerationRequest {
        GenerationRequest {
            target_url: self.form.target_url.trim().to_string(),
            company_name: self.form.company_name.trim().to_string(),
            streaming: self.form.streaming,
            mode: self.form.mode,
        }
    }

    /// Replaces the current session with a fresh Pending one.
    ///
    /// The accumulated text starts empty; the caller is responsible for
    /// cancelling the superseded session first.
    pub(crate) fn start_session(&mut self) -> SessionId {
        self.next_session_id += 1;
        self.session = Session {
            id: self.next_session_id,
            status: SessionStatus::Pending,
            ..Session::default()
        };
        self.mark_dirty();
        self.session.id
    }

    /// Appends newly streamed text. Ignores chunks for stale sessions and
    /// chunks arriving after a terminal state.
    pub(crate) fn apply_chunk(&mut self, session_id: SessionId, delta: &str) {
        if session_id != self.session.id || !self.session.status.is_active() {
            return;
        }
        self.session.status = SessionStatus::Streaming;
        self.session.text.push_str(delta);
        self.mark_dirty();
    }

    pub(crate) fn apply_succeeded(
        &mut self,
        session_id: SessionId,
        document: Option<GeneratedDocument>,
    ) {
        if session_id != self.session.id || !self.session.status.is_active() {
            return;
        }
        self.session.status = SessionStatus::Succeeded;
        self.session.document = document;
        self.mark_dirty();
    }

    /// Marks the session failed. The text streamed so far stays in place; it
    /// is real partial output and must not be erased.
    pub(crate) fn apply_failed(&mut self, session_id: SessionId, message: String) {
        if session_id != self.session.id || !self.session.status.is_active() {
            return;
        }
        self.session.status = SessionStatus::Failed;
        self.session.error = Some(message);
        self.mark_dirty();
    }

    pub(crate) fn apply_cancelled(&mut self, session_id: SessionId) {
        if session_id != self.session.id || !self.session.status.is_active() {
            return;
        }
        self.session.status = SessionStatus::Cancelled;
        self.mark_dirty();
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}
