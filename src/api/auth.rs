use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, State},
    http::HeaderMap,
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, Result};
use crate::middleware::{bearer_token, require_admin_role, require_auth, CurrentAdmin};
use crate::models::AdminInfo;
use crate::services::AuthService;
use crate::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/logout", post(logout))
        .route("/me", get(get_current_admin))
        .route_layer(middleware::from_fn(require_admin_role))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new().route("/login", post(login)).merge(protected)
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub admin: AdminInfo,
}

async fn login(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let auth_service = auth_service(&state);
    let (admin, token) = auth_service
        .authenticate(&payload.email, &payload.password, &addr.ip().to_string())
        .await?;

    Ok(Json(LoginResponse {
        token,
        admin: AdminInfo::from(&admin),
    }))
}

async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>> {
    // require_auth already vetted the token; pull it back out to revoke it.
    let token = bearer_token(&headers).ok_or(AppError::Unauthorized)?;

    auth_service(&state).logout(token);

    Ok(Json(serde_json::json!({ "message": "Logged out successfully" })))
}

/// Current identity straight from the verified claims; no store lookup.
async fn get_current_admin(
    Extension(current_admin): Extension<CurrentAdmin>,
) -> Result<Json<AdminInfo>> {
    Ok(Json(AdminInfo {
        id: current_admin.id,
        email: current_admin.email,
        name: current_admin.name,
        role: current_admin.role,
    }))
}

fn auth_service(state: &AppState) -> AuthService {
    AuthService::new(
        Arc::clone(&state.accounts),
        Arc::clone(&state.tokens),
        Arc::clone(&state.revocations),
        Arc::clone(&state.attempts),
    )
}
