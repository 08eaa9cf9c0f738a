use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::clock::Clock;
use crate::error::{AppError, Result};
use crate::models::Admin;

/// Claims embedded in a session token. Authoritative for the token's
/// lifetime; the gate never re-reads the account store per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Admin ID
    pub sub: String,
    pub name: String,
    pub email: String,
    pub role: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Why a token failed verification. Callers must not collapse these
/// internally: `Expired` is routine, `Malformed` may be tampering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum VerifyError {
    #[error("token is malformed or its signature does not verify")]
    Malformed,
    #[error("token signature is valid but the token has expired")]
    Expired,
}

/// Signs and verifies session tokens (HS256). Stateless; safe to share
/// across request tasks without coordination.
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenCodec {
    /// The signing secret is validated as present at configuration load;
    /// construction itself cannot fail.
    pub fn new(secret: &str, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::default();
        // Expiry is checked against the injected clock in verify() so it
        // stays testable; signature and structure stay with jsonwebtoken.
        validation.validate_exp = false;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
            clock,
        }
    }

    /// Issue a signed session token for an authenticated administrator.
    pub fn issue(&self, admin: &Admin) -> Result<String> {
        let now = self.clock.now();

        let claims = Claims {
            sub: admin.id.to_string(),
            name: admin.name.clone(),
            email: admin.email.clone(),
            role: admin.role.clone(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Token generation failed: {}", e)))
    }

    /// Check signature integrity and expiry.
    pub fn verify(&self, token: &str) -> std::result::Result<Claims, VerifyError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|_| VerifyError::Malformed)?;

        if data.claims.exp <= self.clock.now().timestamp() {
            return Err(VerifyError::Expired);
        }

        Ok(data.claims)
    }
}
