use std::sync::Once;
use std::time::Duration;

use brochure_app::Controller;
use brochure_core::{AppViewModel, Msg, SessionStatus};
use brochure_engine::BackendSettings;
use serde_json::json;
use wiremock::matchers::{any, body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

fn submit(controller: &mut Controller, url: &str, company: &str) {
    controller.dispatch(Msg::UrlChanged(url.to_string()));
    controller.dispatch(Msg::CompanyNameChanged(company.to_string()));
    controller.dispatch(Msg::Submitted);
}

async fn wait_terminal(controller: &mut Controller) -> AppViewModel {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
    loop {
        controller.pump();
        let view = controller.view();
        if view.status.is_terminal() {
            return view;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "session never reached a terminal state"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn streamed_text_reaches_the_view_model() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/brochures/public/brochure/stream"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Hello from backend"))
        .mount(&server)
        .await;

    let mut controller = Controller::new(BackendSettings::for_base_url(server.uri()));
    submit(&mut controller, "https://example.com", "Acme");
    assert!(controller.view().busy);

    let view = wait_terminal(&mut controller).await;
    assert_eq!(view.status, SessionStatus::Succeeded);
    assert_eq!(view.text, "Hello from backend");
    assert!(controller.consume_dirty());
}

#[tokio::test]
async fn backend_detail_reaches_the_view_model() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/brochures/public/brochure"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({ "detail": "invalid url" })),
        )
        .mount(&server)
        .await;

    let mut controller = Controller::new(BackendSettings::for_base_url(server.uri()));
    controller.dispatch(Msg::StreamingToggled(false));
    submit(&mut controller, "https://example.com", "Acme");

    let view = wait_terminal(&mut controller).await;
    assert_eq!(view.status, SessionStatus::Failed);
    assert_eq!(view.error.as_deref(), Some("invalid url"));
}

#[tokio::test]
async fn invalid_input_never_reaches_the_network() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let mut controller = Controller::new(BackendSettings::for_base_url(server.uri()));
    submit(&mut controller, "example.com", "Acme");

    // Give a wrongly issued request time to land before wiremock verifies.
    tokio::time::sleep(Duration::from_millis(100)).await;
    controller.pump();

    let view = controller.view();
    assert_eq!(view.status, SessionStatus::Idle);
    assert!(view.validation_error.is_some());
}

#[tokio::test]
async fn resubmission_supersedes_the_active_session() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/brochures/public/brochure/stream"))
        .and(body_json(json!({
            "url": "https://slow.example.com",
            "company_name": "Acme",
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(60))
                .set_body_string("slow result"),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/brochures/public/brochure/stream"))
        .and(body_json(json!({
            "url": "https://fast.example.com",
            "company_name": "Acme",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string("fast result"))
        .mount(&server)
        .await;

    let mut controller = Controller::new(BackendSettings::for_base_url(server.uri()));
    submit(&mut controller, "https://slow.example.com", "Acme");
    submit(&mut controller, "https://fast.example.com", "Acme");

    let view = wait_terminal(&mut controller).await;
    assert_eq!(view.status, SessionStatus::Succeeded);
    assert_eq!(view.text, "fast result");
}
