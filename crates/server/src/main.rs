//! Inkpost server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use inkpost_api::{AppState, app, endpoints::MAX_BODY_SIZE};
use inkpost_common::{Config, LocalStorage, StorageBackend};
use inkpost_core::mailer_from_config;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "inkpost=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting inkpost server...");

    let config = Config::load()?;

    let db = inkpost_db::init(&config).await?;
    info!("Connected to database");

    info!("Running database migrations...");
    inkpost_db::migrate(&db).await?;
    info!("Migrations completed");

    let db = Arc::new(db);

    let mailer = mailer_from_config(config.email.as_ref())?;
    if config.email.is_none() {
        info!("SMTP not configured, verification codes will be logged");
    }

    tokio::fs::create_dir_all(&config.storage.base_path).await?;
    let storage: Arc<dyn StorageBackend> = Arc::new(LocalStorage::new(
        config.storage.base_path.clone(),
        config.storage.base_url.clone(),
    ));

    let state = AppState::build(&db, &config, mailer, storage);

    let purged = state.session_service.purge_expired().await?;
    if purged > 0 {
        info!(purged, "Removed expired sessions");
    }

    let seeded = state
        .blog_service
        .seed_categories(&config.blog.default_categories)
        .await?;
    info!(seeded, "Blog categories ready");

    let app = Router::new()
        .nest("/api", app(state))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
