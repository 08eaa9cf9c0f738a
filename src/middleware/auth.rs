use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use crate::error::AppError;
use crate::models::ROLE_ADMINISTRATOR;
use crate::security::VerifyError;
use crate::AppState;

/// Identity decoded from a verified session token. Claims are
/// authoritative for the token's lifetime; handlers must not re-fetch the
/// account per request.
#[derive(Debug, Clone)]
pub struct CurrentAdmin {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
}

impl CurrentAdmin {
    pub fn is_administrator(&self) -> bool {
        self.role == ROLE_ADMINISTRATOR
    }
}

/// Pull the bearer token out of the Authorization header, if any.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
}

/// Authenticate the request: bearer extraction, revocation check, then
/// signature/expiry verification, in that order. On success the decoded
/// identity is attached to the request for downstream handlers.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers()).ok_or(AppError::Unauthorized)?;

    // Revoked tokens were once valid; clients get a distinct message so
    // they know not to retry the token.
    if state.revocations.is_revoked(token) {
        debug!("Rejected revoked session token");
        return Err(AppError::SessionRevoked);
    }

    let claims = match state.tokens.verify(token) {
        Ok(claims) => claims,
        Err(VerifyError::Expired) => {
            debug!("Rejected expired session token");
            return Err(AppError::InvalidSession);
        }
        Err(VerifyError::Malformed) => {
            // Unlike expiry this is not routine; it may be tampering.
            warn!("Rejected malformed session token");
            return Err(AppError::InvalidSession);
        }
    };

    let current_admin = CurrentAdmin {
        id: claims.sub,
        name: claims.name,
        email: claims.email,
        role: claims.role,
    };

    request.extensions_mut().insert(current_admin);

    Ok(next.run(request).await)
}

/// Pure claim check, no store lookup. Runs after `require_auth`.
pub async fn require_admin_role(request: Request, next: Next) -> Result<Response, AppError> {
    let current_admin = request
        .extensions()
        .get::<CurrentAdmin>()
        .ok_or(AppError::Unauthorized)?;

    if !current_admin.is_administrator() {
        return Err(AppError::Forbidden);
    }

    Ok(next.run(request).await)
}
