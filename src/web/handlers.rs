use actix_web::{web, HttpResponse, Responder};
use log::{error, info};
use serde_json::json;

use crate::error::RelayError;
use crate::web::models::{ChatRequest, ChatResponse};
use crate::web::AppState;

// Chat relay endpoint
pub async fn chat(state: web::Data<AppState>, body: web::Bytes) -> impl Responder {
    let message = match parse_message(&body) {
        Ok(message) => message,
        Err(e) => return error_response(&e),
    };

    info!("Chat request: {}", message);

    match state.backend.complete(&message).await {
        Ok(response) => HttpResponse::Ok().json(ChatResponse { response }),
        Err(e) => error_response(&e),
    }
}

// Pre-flight endpoint; answered before any business logic runs.
pub async fn preflight() -> impl Responder {
    HttpResponse::NoContent().finish()
}

// Health check endpoint
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

/// Validates the request body: JSON carrying a `message` that is non-empty
/// once trimmed. A missing or `null` field counts as empty. Parsed by hand
/// rather than through an extractor so that a malformed body still gets the
/// normalized error envelope, not a bare 400.
fn parse_message(body: &[u8]) -> Result<String, RelayError> {
    let request: ChatRequest = serde_json::from_slice(body)
        .map_err(|e| RelayError::Internal(format!("unreadable request body: {e}")))?;
    let message = request.message.as_deref().unwrap_or("").trim();
    if message.is_empty() {
        return Err(RelayError::InvalidRequest);
    }
    Ok(message.to_string())
}

/// Normalizes every failure into the single error envelope.
fn error_response(error: &RelayError) -> HttpResponse {
    error!("Chat relay error: {:?}", error);
    HttpResponse::InternalServerError().json(json!({ "error": error.to_string() }))
}
