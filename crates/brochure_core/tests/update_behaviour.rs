use std::sync::Once;

use brochure_core::{
    update, AppState, Effect, GenerationMode, GenerationRequest, Msg, SessionStatus,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

fn fill_form(state: AppState, url: &str, company: &str) -> AppState {
    let (state, _) = update(state, Msg::UrlChanged(url.to_string()));
    let (state, _) = update(state, Msg::CompanyNameChanged(company.to_string()));
    state
}

fn submit(state: AppState, url: &str, company: &str) -> (AppState, Vec<Effect>) {
    let state = fill_form(state, url, company);
    update(state, Msg::Submitted)
}

#[test]
fn relative_url_is_rejected_before_any_effect() {
    init_logging();
    let state = AppState::new();

    let (state, effects) = submit(state, "example.com", "Acme");
    let view = state.view();

    assert!(effects.is_empty());
    assert_eq!(view.status, SessionStatus::Idle);
    assert_eq!(
        view.validation_error.as_deref(),
        Some("enter a valid URL starting with http:// or https://")
    );
}

#[test]
fn unsupported_scheme_is_rejected() {
    init_logging();
    let (state, effects) = submit(AppState::new(), "ftp://example.com", "Acme");

    assert!(effects.is_empty());
    assert!(state
        .view()
        .validation_error
        .unwrap()
        .contains("unsupported URL scheme"));
}

#[test]
fn empty_company_name_is_rejected_in_brochure_mode() {
    init_logging();
    let (state, effects) = submit(AppState::new(), "https://example.com", "   ");

    assert!(effects.is_empty());
    assert_eq!(
        state.view().validation_error.as_deref(),
        Some("company name is required")
    );
}

#[test]
fn summary_mode_does_not_require_company_name() {
    init_logging();
    let state = AppState::new();
    let (state, _) = update(state, Msg::ModeSelected(GenerationMode::Summary));

    let (state, effects) = submit(state, "https://example.com", "");

    assert_eq!(state.view().status, SessionStatus::Pending);
    assert_eq!(effects.len(), 1);
    assert!(matches!(effects[0], Effect::Submit { session_id: 1, .. }));
}

#[test]
fn valid_submission_starts_pending_session() {
    init_logging();
    let (state, effects) = submit(AppState::new(), "https://example.com", "Acme");
    let view = state.view();

    assert_eq!(view.status, SessionStatus::Pending);
    assert!(view.busy);
    assert_eq!(view.text, "");
    assert_eq!(view.validation_error, None);
    assert_eq!(
        effects,
        vec![Effect::Submit {
            session_id: 1,
            request: GenerationRequest {
                target_url: "https://example.com".to_string(),
                company_name: "Acme".to_string(),
                streaming: true,
                mode: GenerationMode::Brochure,
            },
        }]
    );
}

#[test]
fn successful_submission_clears_stale_validation_error() {
    init_logging();
    let (state, _) = submit(AppState::new(), "example.com", "Acme");
    assert!(state.view().validation_error.is_some());

    let (state, effects) = submit(state, "https://example.com", "Acme");

    assert_eq!(state.view().validation_error, None);
    assert_eq!(effects.len(), 1);
}

#[test]
fn resubmit_supersedes_active_session() {
    init_logging();
    let (state, _) = submit(AppState::new(), "https://example.com", "Acme");
    let (state, _) = update(
        state,
        Msg::SessionChunk {
            session_id: 1,
            delta: "partial".to_string(),
        },
    );
    assert_eq!(state.view().status, SessionStatus::Streaming);

    let (state, effects) = submit(state, "https://other.example.com", "Acme");
    let view = state.view();

    // The old session is cancelled first, then the new one is submitted.
    assert!(matches!(
        effects[0],
        Effect::CancelSession { session_id: 1 }
    ));
    assert!(matches!(effects[1], Effect::Submit { session_id: 2, .. }));
    assert_eq!(effects.len(), 2);

    // Accumulated text resets only at the start of the new session.
    assert_eq!(view.status, SessionStatus::Pending);
    assert_eq!(view.text, "");
}

#[test]
fn resubmit_after_terminal_state_does_not_cancel() {
    init_logging();
    let (state, _) = submit(AppState::new(), "https://example.com", "Acme");
    let (state, _) = update(
        state,
        Msg::SessionSucceeded {
            session_id: 1,
            document: None,
        },
    );

    let (_state, effects) = submit(state, "https://example.com", "Acme");

    assert_eq!(effects.len(), 1);
    assert!(matches!(effects[0], Effect::Submit { session_id: 2, .. }));
}
