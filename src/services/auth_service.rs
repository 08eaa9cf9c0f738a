use std::sync::Arc;

use chrono::DateTime;
use tracing::{debug, info, warn};

use crate::error::{AppError, Result};
use crate::models::Admin;
use crate::security::password::verify_password;
use crate::security::{AttemptTracker, RevocationStore, TokenCodec};
use crate::services::AccountStore;

pub struct AuthService {
    accounts: Arc<dyn AccountStore>,
    tokens: Arc<TokenCodec>,
    revocations: Arc<RevocationStore>,
    attempts: Arc<AttemptTracker>,
}

impl AuthService {
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        tokens: Arc<TokenCodec>,
        revocations: Arc<RevocationStore>,
        attempts: Arc<AttemptTracker>,
    ) -> Self {
        Self {
            accounts,
            tokens,
            revocations,
            attempts,
        }
    }

    /// Verify a login and issue a session token.
    ///
    /// The block check runs before the account is even looked up: a blocked
    /// caller never costs an argon2 verification. Unknown account and wrong
    /// password take the same failure path so the two stay
    /// indistinguishable to the caller.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
        origin: &str,
    ) -> Result<(Admin, String)> {
        let email = email.trim().to_lowercase();
        let identifier = attempt_key(&email, origin);

        if self.attempts.is_blocked(&identifier) {
            let minutes = self.attempts.remaining_block_minutes(&identifier);
            warn!(email = %email, origin = %origin, minutes, "Login rejected, identifier is blocked");
            return Err(AppError::RateLimited { minutes });
        }

        let Some(admin) = self.accounts.find_by_email(&email).await else {
            return Err(self.note_failure(&identifier, &email, origin));
        };

        if !verify_password(password, &admin.password_hash)? {
            return Err(self.note_failure(&identifier, &email, origin));
        }

        self.attempts.record_success(&identifier);
        let token = self.tokens.issue(&admin)?;

        info!(admin_id = %admin.id, email = %admin.email, origin = %origin, "Administrator logged in");

        Ok((admin, token))
    }

    /// Record the failure and pick the rejection: the attempt that engages
    /// the block is itself answered with the block, not with another
    /// invalid-credentials response.
    fn note_failure(&self, identifier: &str, email: &str, origin: &str) -> AppError {
        if self.attempts.record_failure(identifier) {
            warn!(email = %email, origin = %origin, "Identifier blocked after repeated login failures");
            AppError::RateLimited {
                minutes: self.attempts.remaining_block_minutes(identifier),
            }
        } else {
            debug!(email = %email, origin = %origin, "Recorded failed login");
            AppError::InvalidCredentials
        }
    }

    /// Invalidate a session token ahead of its natural expiry. Always
    /// succeeds from the caller's perspective: a token that no longer
    /// verifies cannot be used, so there is nothing to revoke.
    pub fn logout(&self, token: &str) {
        match self.tokens.verify(token) {
            Ok(claims) => {
                let Some(expires_at) = DateTime::from_timestamp(claims.exp, 0) else {
                    return;
                };
                self.revocations.revoke(token, expires_at);
                info!(admin_id = %claims.sub, "Administrator logged out");
            }
            Err(e) => {
                debug!(reason = %e, "Logout with an already unusable token, nothing to revoke");
            }
        }
    }
}

/// Compound tracking identifier: blocking is scoped per (account, source)
/// pair, not per account globally.
fn attempt_key(email: &str, origin: &str) -> String {
    format!("{email}|{origin}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ROLE_ADMINISTRATOR;
    use crate::security::clock::ManualClock;
    use crate::security::password::hash_password;
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    /// Account store that counts how often it is consulted.
    struct CountingStore {
        admin: Option<Admin>,
        lookups: AtomicUsize,
    }

    #[async_trait]
    impl AccountStore for CountingStore {
        async fn find_by_email(&self, email: &str) -> Option<Admin> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.admin
                .as_ref()
                .filter(|admin| admin.email == email)
                .cloned()
        }
    }

    fn service(
        admin: Option<Admin>,
        max_attempts: u32,
    ) -> (AuthService, Arc<CountingStore>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
        ));
        let store = Arc::new(CountingStore {
            admin,
            lookups: AtomicUsize::new(0),
        });
        let service = AuthService::new(
            store.clone(),
            Arc::new(TokenCodec::new(
                "test-signing-secret",
                Duration::hours(24),
                clock.clone(),
            )),
            Arc::new(RevocationStore::new(clock.clone())),
            Arc::new(AttemptTracker::new(
                max_attempts,
                Duration::minutes(15),
                Duration::minutes(60),
                clock.clone(),
            )),
        );
        (service, store, clock)
    }

    fn seeded_admin(password: &str) -> Admin {
        Admin {
            id: Uuid::new_v4(),
            email: "a@x.com".to_string(),
            password_hash: hash_password(password).unwrap(),
            name: "Town Clerk".to_string(),
            role: ROLE_ADMINISTRATOR.to_string(),
        }
    }

    #[tokio::test]
    async fn test_blocked_identifier_never_reaches_the_account_store() {
        let (service, store, _clock) = service(Some(seeded_admin("right-horse")), 2);

        let err = service
            .authenticate("a@x.com", "wrong", "203.0.113.9")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));

        // The failure that engages the block answers with the block.
        let err = service
            .authenticate("a@x.com", "wrong", "203.0.113.9")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::RateLimited { minutes: 60 }));

        let lookups_before_block = store.lookups.load(Ordering::SeqCst);

        let err = service
            .authenticate("a@x.com", "right-horse", "203.0.113.9")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::RateLimited { .. }));
        assert_eq!(store.lookups.load(Ordering::SeqCst), lookups_before_block);
    }

    #[tokio::test]
    async fn test_unknown_account_and_wrong_password_look_identical() {
        let (service, _store, _clock) = service(Some(seeded_admin("right-horse")), 5);

        let unknown = service
            .authenticate("nobody@x.com", "whatever", "203.0.113.9")
            .await
            .unwrap_err();
        let wrong = service
            .authenticate("a@x.com", "wrong", "203.0.113.9")
            .await
            .unwrap_err();

        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[tokio::test]
    async fn test_unknown_account_still_counts_toward_a_block() {
        let (service, _store, _clock) = service(None, 3);

        for _ in 0..3 {
            let _ = service
                .authenticate("ghost@x.com", "whatever", "203.0.113.9")
                .await;
        }

        let err = service
            .authenticate("ghost@x.com", "whatever", "203.0.113.9")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::RateLimited { .. }));
    }

    #[tokio::test]
    async fn test_success_issues_token_and_clears_failures() {
        let (service, _store, _clock) = service(Some(seeded_admin("right-horse")), 3);

        for _ in 0..2 {
            let _ = service
                .authenticate("a@x.com", "wrong", "203.0.113.9")
                .await;
        }

        let (admin, token) = service
            .authenticate("A@X.com", "right-horse", "203.0.113.9")
            .await
            .unwrap();
        assert_eq!(admin.email, "a@x.com");
        assert!(!token.is_empty());

        // History is gone; two more failures do not engage the block.
        for _ in 0..2 {
            let err = service
                .authenticate("a@x.com", "wrong", "203.0.113.9")
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::InvalidCredentials));
        }
    }

    #[tokio::test]
    async fn test_logout_revokes_until_natural_expiry() {
        let (service, _store, _clock) = service(Some(seeded_admin("right-horse")), 3);

        let (_admin, token) = service
            .authenticate("a@x.com", "right-horse", "203.0.113.9")
            .await
            .unwrap();

        service.logout(&token);
        assert!(service.revocations.is_revoked(&token));

        // Second logout and logout of garbage are both harmless.
        service.logout(&token);
        service.logout("not.a.token");
        assert!(service.revocations.is_revoked(&token));
    }
}
