//! End-to-end tests over the relay's composed app: routing, the CORS
//! middleware and the handlers together, exactly as the binary wires them.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use actix_web::dev::ServiceResponse;
use actix_web::http::{Method, StatusCode};
use actix_web::{test, web, App};
use async_trait::async_trait;
use serde_json::{json, Value};

use examwise_buddy::error::RelayError;
use examwise_buddy::upstream::CompletionBackend;
use examwise_buddy::web::{cors_headers, routes, AppState};

/// Scripted upstream: counts calls and returns a canned outcome.
struct ScriptedBackend {
    calls: Arc<AtomicUsize>,
    outcome: Result<String, String>,
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    async fn complete(&self, _message: &str) -> Result<String, RelayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            Ok(reply) => Ok(reply.clone()),
            Err(message) => Err(RelayError::Upstream(message.clone())),
        }
    }
}

fn scripted_state(
    calls: &Arc<AtomicUsize>,
    outcome: Result<String, String>,
) -> web::Data<AppState> {
    web::Data::new(AppState {
        backend: Arc::new(ScriptedBackend {
            calls: Arc::clone(calls),
            outcome,
        }),
    })
}

fn assert_cors<B>(resp: &ServiceResponse<B>) {
    let headers = resp.response().headers();
    assert_eq!(headers.get("Access-Control-Allow-Origin").unwrap(), "*");
    assert_eq!(
        headers.get("Access-Control-Allow-Headers").unwrap(),
        "authorization, x-client-info, apikey, content-type"
    );
}

#[actix_web::test]
async fn relays_a_question_end_to_end() {
    let calls = Arc::new(AtomicUsize::new(0));
    let state = scripted_state(&calls, Ok("Concordância verbal é...".to_string()));
    let app = test::init_service(
        App::new()
            .app_data(state)
            .wrap(cors_headers())
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/chat")
        .set_json(json!({ "message": "o que é concordância verbal?" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_cors(&resp);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["response"], "Concordância verbal é...");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[actix_web::test]
async fn surfaces_the_upstream_error_message() {
    let calls = Arc::new(AtomicUsize::new(0));
    let state = scripted_state(&calls, Err("invalid api key".to_string()));
    let app = test::init_service(
        App::new()
            .app_data(state)
            .wrap(cors_headers())
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/chat")
        .set_json(json!({ "message": "o que é concordância verbal?" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_cors(&resp);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "invalid api key");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[actix_web::test]
async fn preflight_never_reaches_the_backend() {
    let calls = Arc::new(AtomicUsize::new(0));
    let state = scripted_state(&calls, Ok("unused".to_string()));
    let app = test::init_service(
        App::new()
            .app_data(state)
            .wrap(cors_headers())
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::default()
        .method(Method::OPTIONS)
        .uri("/api/chat")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert_cors(&resp);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    let body = test::read_body(resp).await;
    assert!(body.is_empty());
}

#[actix_web::test]
async fn error_responses_carry_the_cors_headers_too() {
    let calls = Arc::new(AtomicUsize::new(0));
    let state = scripted_state(&calls, Ok("unused".to_string()));
    let app = test::init_service(
        App::new()
            .app_data(state)
            .wrap(cors_headers())
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/chat")
        .set_json(json!({ "message": "   " }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_cors(&resp);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Mensagem é obrigatória");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[actix_web::test]
async fn health_check_carries_the_cors_headers() {
    let calls = Arc::new(AtomicUsize::new(0));
    let state = scripted_state(&calls, Ok("unused".to_string()));
    let app = test::init_service(
        App::new()
            .app_data(state)
            .wrap(cors_headers())
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_cors(&resp);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
}
