pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod security;
pub mod services;

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::Config;
use crate::security::{AttemptTracker, Clock, RevocationStore, TokenCodec};
use crate::services::AccountStore;

/// Process-wide state: the security core's owned stores plus the account
/// collaborator. Constructed once at startup and handed to every request.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub accounts: Arc<dyn AccountStore>,
    pub tokens: Arc<TokenCodec>,
    pub revocations: Arc<RevocationStore>,
    pub attempts: Arc<AttemptTracker>,
}

impl AppState {
    pub fn new(config: Config, accounts: Arc<dyn AccountStore>, clock: Arc<dyn Clock>) -> Self {
        let tokens = Arc::new(TokenCodec::new(
            &config.jwt.secret,
            chrono::Duration::hours(config.jwt.expiry_hours),
            Arc::clone(&clock),
        ));
        let revocations = Arc::new(RevocationStore::new(Arc::clone(&clock)));
        let attempts = Arc::new(AttemptTracker::new(
            config.security.max_login_attempts,
            chrono::Duration::minutes(config.security.attempt_window_minutes),
            chrono::Duration::minutes(config.security.lockout_duration_minutes),
            clock,
        ));

        Self {
            config,
            accounts,
            tokens,
            revocations,
            attempts,
        }
    }
}

/// Build the application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api::routes(&state))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
