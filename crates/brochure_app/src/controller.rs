use brochure_core::{
    update, AppState, AppViewModel, Effect, GeneratedDocument, GenerationMode, GenerationRequest,
    Msg,
};
use brochure_engine::{
    BackendSettings, EngineEvent, EngineHandle, GenerationOutcome, Generator, SessionResult,
    SubmitRequest,
};
use engine_logging::{engine_info, engine_warn};

/// Owns the session state and the engine handle.
///
/// `dispatch` runs the pure update function and executes the returned
/// effects; `pump` drains engine events into further dispatches. Both run on
/// the UI thread of control, so the view model is never observed mid-update.
pub struct Controller {
    state: AppState,
    engine: EngineHandle,
}

impl Controller {
    pub fn new(settings: BackendSettings) -> Self {
        Self {
            state: AppState::new(),
            engine: EngineHandle::new(settings),
        }
    }

    pub fn dispatch(&mut self, msg: Msg) {
        let (state, effects) = update(std::mem::take(&mut self.state), msg);
        self.state = state;
        self.run_effects(effects);
    }

    /// Drains pending engine events. Call once per UI tick.
    pub fn pump(&mut self) {
        while let Some(event) = self.engine.try_recv() {
            self.dispatch(map_event(event));
        }
    }

    pub fn view(&self) -> AppViewModel {
        self.state.view()
    }

    /// Returns whether a redraw is needed, clearing the flag.
    pub fn consume_dirty(&mut self) -> bool {
        self.state.consume_dirty()
    }

    fn run_effects(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::CancelSession { session_id } => {
                    engine_info!("cancel session {}", session_id);
                    self.engine.cancel(session_id);
                }
                Effect::Submit {
                    session_id,
                    request,
                } => {
                    engine_info!(
                        "submit session {} url={} streaming={}",
                        session_id,
                        request.target_url,
                        request.streaming
                    );
                    self.engine.submit(session_id, map_request(&request));
                }
            }
        }
    }
}

fn map_request(request: &GenerationRequest) -> SubmitRequest {
    SubmitRequest {
        target_url: request.target_url.clone(),
        company_name: request.company_name.clone(),
        streaming: request.streaming,
        generator: match request.mode {
            GenerationMode::Brochure => Generator::Brochure,
            GenerationMode::Summary => Generator::Summary,
        },
    }
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::Chunk { session_id, delta } => Msg::SessionChunk { session_id, delta },
        EngineEvent::Completed { session_id, result } => match result {
            SessionResult::Succeeded(outcome) => Msg::SessionSucceeded {
                session_id,
                document: map_outcome(outcome),
            },
            SessionResult::Failed(error) => {
                engine_warn!("session {} failed: {}", session_id, error);
                Msg::SessionFailed {
                    session_id,
                    message: error.message,
                }
            }
            SessionResult::Cancelled => Msg::SessionCancelled { session_id },
        },
    }
}

fn map_outcome(outcome: GenerationOutcome) -> Option<GeneratedDocument> {
    match outcome {
        GenerationOutcome::Brochure(doc) => Some(GeneratedDocument::Brochure {
            company_name: doc.company_name,
            content: doc.content,
        }),
        GenerationOutcome::Summary(doc) => Some(GeneratedDocument::Summary {
            title: doc.title,
            summary: doc.summary,
        }),
        // Streamed text was already folded in chunk by chunk.
        GenerationOutcome::Streamed { .. } => None,
    }
}
