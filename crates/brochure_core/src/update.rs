use crate::{validate, AppState, Effect, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::UrlChanged(url) => {
            state.set_target_url(url);
            Vec::new()
        }
        Msg::CompanyNameChanged(name) => {
            state.set_company_name(name);
            Vec::new()
        }
        Msg::StreamingToggled(enabled) => {
            state.set_streaming(enabled);
            Vec::new()
        }
        Msg::ModeSelected(mode) => {
            state.set_mode(mode);
            Vec::new()
        }
        Msg::Submitted => {
            let request = state.request_from_form();
            if let Err(error) = validate(&request) {
                // Recoverable: surface to the view model, make no network call.
                state.set_validation_error(Some(error));
                return (state, Vec::new());
            }
            state.set_validation_error(None);

            // At most one active session: supersede the old one before the
            // new submit so the engine releases its reader promptly.
            let superseded = state
                .session()
                .status
                .is_active()
                .then(|| state.session().id);

            let session_id = state.start_session();
            let mut effects = Vec::with_capacity(2);
            if let Some(old_id) = superseded {
                effects.push(Effect::CancelSession { session_id: old_id });
            }
            effects.push(Effect::Submit {
                session_id,
                request,
            });
            effects
        }
        Msg::SessionChunk { session_id, delta } => {
            state.apply_chunk(session_id, &delta);
            Vec::new()
        }
        Msg::SessionSucceeded {
            session_id,
            document,
        } => {
            state.apply_succeeded(session_id, document);
            Vec::new()
        }
        Msg::SessionFailed {
            session_id,
            message,
        } => {
            state.apply_failed(session_id, message);
            Vec::new()
        }
        Msg::SessionCancelled { session_id } => {
            state.apply_cancelled(session_id);
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
