pub mod handlers;
mod types;

pub use types::*;

use crate::{Error, Result, artifacts, config::Config, config::CorsConfig};
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use handlers::AppState;
use std::net::SocketAddr;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

pub async fn run(config: Config) -> Result<()> {
    // Artifact loading is blocking file and tensor work.
    let model_config = config.model.clone();
    let pipeline = tokio::task::spawn_blocking(move || artifacts::load_or_unavailable(&model_config))
        .await
        .map_err(|e| Error::internal(format!("artifact loading task failed: {e}")))??;

    if pipeline.is_loaded() {
        info!("Model loaded successfully!");
    }

    let app = create_router(AppState::new(pipeline), &config.server.cors)?;

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

pub fn create_router(state: AppState, cors: &CorsConfig) -> Result<Router> {
    Ok(Router::new()
        .route("/", get(handlers::home))
        .route("/health", get(handlers::health))
        .route("/predict", post(handlers::predict))
        .layer(cors_layer(cors)?)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

pub fn cors_layer(config: &CorsConfig) -> Result<CorsLayer> {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    // Wildcard origins cannot be combined with credentials.
    if config.allowed_origins.iter().any(|origin| origin == "*") {
        return Ok(layer.allow_origin(Any));
    }

    let origins = config
        .allowed_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin)
                .map_err(|_| Error::config(format!("invalid CORS origin: '{origin}'")))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(layer
        .allow_origin(origins)
        .allow_credentials(config.allow_credentials))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        }
        () = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
