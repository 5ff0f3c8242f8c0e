use std::sync::Arc;

use actix_web::{web::Data, App, HttpServer};
use dotenv::dotenv;
use log::{error, info};

use examwise_buddy::config::RelayConfig;
use examwise_buddy::upstream::OpenAiClient;
use examwise_buddy::web::{cors_headers, routes, AppState};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize environment
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    info!("Starting chat relay");

    // Resolve the upstream configuration; a missing credential is fatal
    // here, not per-request.
    let config = match RelayConfig::from_env() {
        Ok(config) => {
            info!("Relaying to {} (model {})", config.base_url, config.model);
            config
        }
        Err(e) => {
            error!("Failed to load relay configuration: {:?}", e);
            std::process::exit(1);
        }
    };

    let state = Data::new(AppState {
        backend: Arc::new(OpenAiClient::new(config)),
    });

    // Start web server
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(cors_headers())
            .configure(routes::configure)
    })
    .bind(("127.0.0.1", 8080))?
    .run()
    .await
}
