use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    /// Deliberately covers both "no such account" and "wrong password";
    /// the two must stay indistinguishable on the wire.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The token was once valid and was explicitly invalidated. Clients
    /// should not retry it, unlike a token they may have mangled.
    #[error("Session has been revoked")]
    SessionRevoked,

    /// Malformed or expired token. The distinction exists only in logs.
    #[error("Invalid or expired session")]
    InvalidSession,

    #[error("Access denied")]
    Forbidden,

    #[error("Too many failed login attempts. Try again in {minutes} minutes.")]
    RateLimited { minutes: i64 },

    #[error("Invalid input: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", self.to_string()),
            AppError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS", self.to_string())
            }
            AppError::SessionRevoked => {
                (StatusCode::UNAUTHORIZED, "SESSION_REVOKED", self.to_string())
            }
            AppError::InvalidSession => {
                (StatusCode::UNAUTHORIZED, "INVALID_SESSION", self.to_string())
            }
            AppError::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN", self.to_string()),
            AppError::RateLimited { .. } => {
                (StatusCode::TOO_MANY_REQUESTS, "RATE_LIMITED", self.to_string())
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
