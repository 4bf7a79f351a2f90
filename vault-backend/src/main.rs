use actix_cors::Cors;
use actix_files::{Files, NamedFile};
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::path::PathBuf;
use std::sync::Arc;

mod config;
mod controllers;
mod errors;
mod gateway;
mod notes;
mod vault;

#[cfg(test)]
mod test_support;

use config::Config;
use gateway::EventBroadcaster;
use vault::VaultSession;

pub struct AppState {
    pub session: Arc<VaultSession>,
    pub broadcaster: Arc<EventBroadcaster>,
    pub started_at: std::time::Instant,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env();
    log::info!("Vault backend v{}", env!("CARGO_PKG_VERSION"));

    let broadcaster = Arc::new(EventBroadcaster::new(config.gateway_client_buffer));
    let session = Arc::new(VaultSession::new(
        Arc::clone(&broadcaster),
        config.coalescer_config(),
    ));

    if let Some(path) = &config.initial_vault_path {
        match session.bind(path).await {
            Ok(binding) => log::info!("Bound vault from environment: {}", binding.path().display()),
            Err(e) => log::error!("Failed to bind vault from environment ({}): {}", path, e),
        }
    }

    match &config.frontend_dir {
        Some(dir) => log::info!("Serving frontend from: {}", dir),
        None => log::info!("Running in API-only mode"),
    }

    let port = config.port;
    let bind_address = config.bind_address.clone();
    log::info!("Starting server on {}:{}", bind_address, port);

    let started_at = std::time::Instant::now();
    let frontend_dir = config.frontend_dir.clone();
    let sess = Arc::clone(&session);
    let bcast = Arc::clone(&broadcaster);

    let server = HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        let mut app = App::new()
            .app_data(web::Data::new(AppState {
                session: Arc::clone(&sess),
                broadcaster: Arc::clone(&bcast),
                started_at,
            }))
            // WebSocket data for /ws route
            .app_data(web::Data::new(Arc::clone(&bcast)))
            .app_data(controllers::json_config())
            .wrap(Logger::default())
            .wrap(cors)
            .configure(controllers::health::config_routes)
            .configure(controllers::vault::config)
            .configure(controllers::notes::config)
            .configure(controllers::search::config)
            // Must follow every /api scope
            .configure(controllers::api_fallback)
            .route("/ws", web::get().to(gateway::actix_ws::ws_handler));

        if let Some(dir) = &frontend_dir {
            let index = PathBuf::from(dir).join("index.html");
            app = app.service(
                Files::new("/", dir.clone())
                    .index_file("index.html")
                    .default_handler(web::to(move || {
                        // SPA fallback for client-side routes
                        let index = index.clone();
                        async move { NamedFile::open_async(index).await }
                    })),
            );
        }

        app
    })
    .bind((bind_address.as_str(), port))?
    .run();

    let server_handle = server.handle();

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl+C: {}", e);
            return;
        }
        log::info!("Received Ctrl+C, shutting down...");

        log::info!("Stopping HTTP server...");
        let server_stop = server_handle.stop(true);
        if tokio::time::timeout(std::time::Duration::from_secs(5), server_stop).await.is_err() {
            log::warn!("Timeout waiting for HTTP server to stop, forcing exit...");
        }

        log::info!("Shutdown complete");
    });

    server.await
}
