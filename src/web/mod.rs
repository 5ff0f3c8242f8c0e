pub mod handlers;
pub mod models;
pub mod routes;

use std::sync::Arc;

use actix_web::middleware::DefaultHeaders;

use crate::upstream::CompletionBackend;

/// Shared handler state. The relay is stateless per request; the backend is
/// the only injected dependency.
pub struct AppState {
    pub backend: Arc<dyn CompletionBackend>,
}

/// Permissive CORS headers attached to every response, error and preflight
/// included, so browser clients can call the relay from any origin.
pub fn cors_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("Access-Control-Allow-Origin", "*"))
        .add((
            "Access-Control-Allow-Headers",
            "authorization, x-client-info, apikey, content-type",
        ))
}
