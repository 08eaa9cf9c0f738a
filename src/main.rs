use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use townpost_api::config::Config;
use townpost_api::models::{Admin, ROLE_ADMINISTRATOR};
use townpost_api::security::{password, SystemClock};
use townpost_api::services::InMemoryAccountStore;
use townpost_api::{app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "townpost_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration; a missing signing secret aborts here.
    let config = Config::load()?;
    tracing::info!("Configuration loaded successfully");

    // Seed the bootstrap administrator account.
    let accounts = Arc::new(InMemoryAccountStore::new());
    if config.admin.password.is_empty() {
        tracing::warn!(
            "No bootstrap administrator configured (set ADMIN__EMAIL and ADMIN__PASSWORD); logins will all fail"
        );
    } else {
        accounts.insert(Admin {
            id: Uuid::new_v4(),
            email: config.admin.email.trim().to_lowercase(),
            password_hash: password::hash_password(&config.admin.password)?,
            name: config.admin.name.clone(),
            role: ROLE_ADMINISTRATOR.to_string(),
        });
        tracing::info!(email = %config.admin.email, "Bootstrap administrator account ready");
    }

    // Build application state and start the revocation sweeper.
    let state = AppState::new(config.clone(), accounts, Arc::new(SystemClock));
    let sweeper = state.revocations.clone().start_sweeper(Duration::from_secs(
        config.security.revocation_sweep_minutes * 60,
    ));

    let app = app(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    // The HTTP server is down; stop the background sweep before exiting.
    sweeper.shutdown().await;
    tracing::info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
