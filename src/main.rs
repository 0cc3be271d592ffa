//! API server
//!
//! Serves the token-authenticated user API: login, refresh and the
//! protected `/users` endpoints.

use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;

use webapp_auth::auth::{AuthService, BcryptVerifier};
use webapp_auth::config::Config;
use webapp_auth::repository::{MemoryUserStore, PgUserStore, UserStore};
use webapp_auth::{app_router, db, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!(
        environment = config.environment.as_str(),
        domain = %config.domain,
        "Starting API server"
    );

    let users: Arc<dyn UserStore> = match &config.database_url {
        Some(database_url) => {
            tracing::info!(
                "Connecting to database at {}",
                config.database_url_masked().unwrap_or_default()
            );
            let pool = db::create_pool(database_url, config.db_max_connections).await?;
            db::run_migrations(&pool).await?;
            Arc::new(PgUserStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory user store");
            Arc::new(
                MemoryUserStore::with_default_admin()
                    .await
                    .context("seeding in-memory user store")?,
            )
        }
    };

    let auth_service = match AuthService::new(
        &config.auth_settings(),
        users.clone(),
        Arc::new(BcryptVerifier),
    ) {
        Ok(service) => Arc::new(service),
        Err(e) => {
            tracing::error!(error = %e, "Token issuer misconfigured");
            return Err(e.into());
        }
    };

    let app = app_router(AppState::new(auth_service, users));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
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
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
