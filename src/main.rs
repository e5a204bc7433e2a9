mod config;
mod constants;
mod domain;
mod ingest;
mod logging;
mod models;
mod routes;
mod services;
mod storage;
mod youtube;

use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use config::Config;
use ingest::IngestController;
use storage::{MemoryStore, PgVideoStore, VideoStore};
use youtube::YouTubeClient;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn VideoStore>,
}

/// Router with every API route, CORS open to any origin
pub fn build_app(state: Arc<AppState>) -> Router {
    routes::build_routes()
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    logging::init();

    let config = Config::from_env()?;

    let store: Arc<dyn VideoStore> = match &config.database_url {
        Some(url) => Arc::new(PgVideoStore::new(services::db::connect(url).await?)),
        None => {
            warn!("DATABASE_URL is not set; videos are kept in memory only");
            Arc::new(MemoryStore::new())
        }
    };

    let youtube = YouTubeClient::new(&config.youtube_api_key, &config.youtube_search_url);

    let mut ingest = IngestController::new();
    ingest.start(Arc::new(youtube), store.clone(), config.fetch_interval)?;

    let app = build_app(Arc::new(AppState { store }));

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Server running on http://localhost:{}", config.port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    ingest.stop().await?;
    info!("Server stopped");
    Ok(())
}
