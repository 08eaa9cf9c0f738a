mod auth;

use axum::Router;

use crate::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new().nest("/auth", auth::routes(state))
}
