use actix_web::http::Method;
use actix_web::web;

use crate::web::handlers;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/chat", web::post().to(handlers::chat))
            .route("/chat", web::method(Method::OPTIONS).to(handlers::preflight)),
    )
    .route("/health", web::get().to(handlers::health_check));
}
